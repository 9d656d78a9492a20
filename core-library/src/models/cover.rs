//! Cover art references
//!
//! Covers are referenced by [`CoverId`]. Each source owns a prefixed ID space,
//! so a chain of sources can be searched in order and the first hit trusted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::uid::MusicUid;

const STORED_PREFIX: &str = "mcs:";
const FOLDER_PREFIX: &str = "mcf:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoverId {
    /// Content-addressed blob in the cover store
    Stored(String),
    /// Image file sitting next to the audio files
    Folder(PathBuf),
}

impl fmt::Display for CoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverId::Stored(id) => write!(f, "{}{}", STORED_PREFIX, id),
            CoverId::Folder(path) => write!(f, "{}{}", FOLDER_PREFIX, path.display()),
        }
    }
}

impl FromStr for CoverId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(STORED_PREFIX) {
            Ok(CoverId::Stored(id.to_string()))
        } else if let Some(path) = s.strip_prefix(FOLDER_PREFIX) {
            Ok(CoverId::Folder(PathBuf::from(path)))
        } else {
            Err(format!("unknown cover id: {}", s))
        }
    }
}

impl Serialize for CoverId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CoverId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One song version's cover.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SingleCover {
    pub song_uid: MusicUid,
    pub last_modified: i64,
    pub id: CoverId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cover {
    Single(SingleCover),
    /// Songs whose covers resolved to the same ID, in arrival order
    Multi { key: String, covers: Vec<SingleCover> },
}

impl Cover {
    /// The single cover to render for this group.
    pub fn representative(&self) -> Option<&SingleCover> {
        match self {
            Cover::Single(single) => Some(single),
            Cover::Multi { covers, .. } => covers.first(),
        }
    }

    pub fn id(&self) -> Option<&CoverId> {
        self.representative().map(|single| &single.id)
    }
}

/// Distinct covers of a group of songs, most common first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverCollection {
    pub covers: Vec<Cover>,
}

impl CoverCollection {
    /// Groups covers by ID, ordered by member count (desc) then ID (desc).
    pub fn from_singles<'a, I>(singles: I) -> Self
    where
        I: IntoIterator<Item = &'a SingleCover>,
    {
        let mut groups: HashMap<&CoverId, Vec<SingleCover>> = HashMap::new();
        for single in singles {
            groups.entry(&single.id).or_default().push(single.clone());
        }

        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort_by(|(a_id, a), (b_id, b)| b.len().cmp(&a.len()).then_with(|| b_id.cmp(a_id)));

        let covers = groups
            .into_iter()
            .filter_map(|(id, mut members)| {
                if members.len() == 1 {
                    members.pop().map(Cover::Single)
                } else {
                    Some(Cover::Multi {
                        key: id.to_string(),
                        covers: members,
                    })
                }
            })
            .collect();

        Self { covers }
    }

    pub fn first(&self) -> Option<&Cover> {
        self.covers.first()
    }

    pub fn is_empty(&self) -> bool {
        self.covers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.covers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::uid::MusicKind;

    fn single(name: &str, id: &str) -> SingleCover {
        SingleCover {
            song_uid: MusicUid::hashed(MusicKind::Song, |h| {
                h.str(Some(name));
            }),
            last_modified: 1,
            id: CoverId::Stored(id.to_string()),
        }
    }

    #[test]
    fn test_id_prefixes_round_trip() {
        let stored = CoverId::Stored("abc.img".into());
        let folder = CoverId::Folder(PathBuf::from("/music/Album/cover.jpg"));

        assert_eq!(stored.to_string(), "mcs:abc.img");
        assert_eq!(folder.to_string(), "mcf:/music/Album/cover.jpg");
        assert_eq!("mcs:abc.img".parse::<CoverId>().unwrap(), stored);
        assert_eq!("mcf:/music/Album/cover.jpg".parse::<CoverId>().unwrap(), folder);
        assert!("xyz:abc".parse::<CoverId>().is_err());
    }

    #[test]
    fn test_collection_orders_by_frequency_then_id() {
        let singles = vec![
            single("a", "aaa"),
            single("b", "bbb"),
            single("c", "bbb"),
            single("d", "ccc"),
        ];
        let collection = CoverCollection::from_singles(&singles);

        let ids: Vec<_> = collection
            .covers
            .iter()
            .filter_map(|c| c.id().map(|id| id.to_string()))
            .collect();
        assert_eq!(ids, vec!["mcs:bbb", "mcs:ccc", "mcs:aaa"]);
    }

    #[test]
    fn test_multi_representative_is_first_member() {
        let singles = vec![single("a", "same"), single("b", "same")];
        let collection = CoverCollection::from_singles(&singles);

        assert_eq!(collection.len(), 1);
        match collection.first().unwrap() {
            Cover::Multi { key, covers } => {
                assert_eq!(key, "mcs:same");
                assert_eq!(covers.len(), 2);
            }
            other => panic!("expected multi cover, got {:?}", other),
        }
        assert_eq!(collection.first().unwrap().representative(), Some(&singles[0]));
    }
}
