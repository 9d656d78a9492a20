//! Stable music identifiers
//!
//! Every final entity is keyed by a [`MusicUid`] derived from its tags rather
//! than from insertion order, so the same file set produces the same UIDs on
//! every indexing run.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::date::Date;

/// Kind of item a UID points to. The hex codes are part of the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MusicKind {
    Song,
    Album,
    Artist,
    Genre,
    Playlist,
}

impl MusicKind {
    pub fn code(&self) -> u16 {
        match self {
            MusicKind::Song => 0xA10B,
            MusicKind::Album => 0xA10A,
            MusicKind::Artist => 0xA109,
            MusicKind::Genre => 0xA108,
            MusicKind::Playlist => 0xA107,
        }
    }

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0xA10B => Some(MusicKind::Song),
            0xA10A => Some(MusicKind::Album),
            0xA109 => Some(MusicKind::Artist),
            0xA108 => Some(MusicKind::Genre),
            0xA107 => Some(MusicKind::Playlist),
            _ => None,
        }
    }
}

/// Where the UUID part of a UID came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UidNamespace {
    /// Hashed from tags, or random for playlists
    Indexer,
    /// A MusicBrainz ID read from the file
    MusicBrainz,
}

impl UidNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            UidNamespace::Indexer => "music-indexer",
            UidNamespace::MusicBrainz => "org.musicbrainz",
        }
    }
}

/// Unique identifier for any music item.
///
/// String form: `<namespace>:<kind hex>-<uuid>`, e.g.
/// `org.musicbrainz:a10a-1b1c2f4e-...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MusicUid {
    namespace: UidNamespace,
    kind: MusicKind,
    uuid: Uuid,
}

impl MusicUid {
    /// UID backed by a MusicBrainz ID.
    pub fn musicbrainz(kind: MusicKind, mbid: Uuid) -> Self {
        Self {
            namespace: UidNamespace::MusicBrainz,
            kind,
            uuid: mbid,
        }
    }

    /// Random UID, used for user-created playlists.
    pub fn random(kind: MusicKind) -> Self {
        Self {
            namespace: UidNamespace::Indexer,
            kind,
            uuid: Uuid::new_v4(),
        }
    }

    /// UID hashed from the fields written by `updates`.
    ///
    /// The first 16 bytes of the SHA-256 digest become the UUID.
    pub fn hashed(kind: MusicKind, updates: impl FnOnce(&mut UidHasher)) -> Self {
        let mut hasher = UidHasher::default();
        updates(&mut hasher);
        let digest = hasher.digest.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self {
            namespace: UidNamespace::Indexer,
            kind,
            uuid: Uuid::from_bytes(bytes),
        }
    }

    pub fn kind(&self) -> MusicKind {
        self.kind
    }

    pub fn namespace(&self) -> UidNamespace {
        self.namespace
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl fmt::Display for MusicUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:x}-{}",
            self.namespace.as_str(),
            self.kind.code(),
            self.uuid
        )
    }
}

/// Error returned when a UID string does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUidError(pub String);

impl fmt::Display for ParseUidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid music UID: {}", self.0)
    }
}

impl std::error::Error for ParseUidError {}

impl FromStr for MusicUid {
    type Err = ParseUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseUidError(s.to_string());

        let (namespace, ids) = s.split_once(':').ok_or_else(invalid)?;
        let namespace = match namespace {
            ns if ns == UidNamespace::Indexer.as_str() => UidNamespace::Indexer,
            ns if ns == UidNamespace::MusicBrainz.as_str() => UidNamespace::MusicBrainz,
            _ => return Err(invalid()),
        };

        let (code, uuid) = ids.split_once('-').ok_or_else(invalid)?;
        let kind = u16::from_str_radix(code, 16)
            .ok()
            .and_then(MusicKind::from_code)
            .ok_or_else(invalid)?;
        let uuid = Uuid::parse_str(uuid).map_err(|_| invalid())?;

        Ok(Self {
            namespace,
            kind,
            uuid,
        })
    }
}

impl Serialize for MusicUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MusicUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Digest input for hashed UIDs.
///
/// Strings are lower-cased, integers are little-endian, and every absent
/// value contributes a single zero byte so that `None` never collides with
/// an empty value.
#[derive(Default)]
pub struct UidHasher {
    digest: Sha256,
}

impl UidHasher {
    pub fn str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(s) => self.digest.update(s.to_lowercase().as_bytes()),
            None => self.digest.update([0u8]),
        }
        self
    }

    pub fn strs<S: AsRef<str>>(&mut self, values: &[S]) -> &mut Self {
        for value in values {
            self.str(Some(value.as_ref()));
        }
        self
    }

    pub fn int(&mut self, value: Option<u32>) -> &mut Self {
        match value {
            Some(n) => self.digest.update(n.to_le_bytes()),
            None => self.digest.update([0u8]),
        }
        self
    }

    pub fn date(&mut self, value: Option<&Date>) -> &mut Self {
        match value {
            Some(date) => self.digest.update(date.to_string().as_bytes()),
            None => self.digest.update([0u8]),
        }
        self
    }
}

/// Parse an MBID tag value, discarding anything that is not a UUID.
pub fn parse_mbid(value: Option<&str>) -> Option<Uuid> {
    value.and_then(|v| Uuid::parse_str(v.trim()).ok())
}
