//! Release group types, following the MusicBrainz release group type list

use serde::{Deserialize, Serialize};

/// What kind of performance a release is. `None` means a plain studio release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refinement {
    Live,
    Remix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "refinement", rename_all = "snake_case")]
pub enum ReleaseType {
    Album(Option<Refinement>),
    Ep(Option<Refinement>),
    Single(Option<Refinement>),
    Compilation(Option<Refinement>),
    Soundtrack,
    Mix,
    Mixtape,
    Demo,
}

impl Default for ReleaseType {
    fn default() -> Self {
        ReleaseType::Album(None)
    }
}

impl ReleaseType {
    /// Parse a release type from an ordered primary/secondary type list.
    ///
    /// Secondary types without a primary type are treated as albums. Returns
    /// `None` only when the list is empty.
    pub fn parse<S: AsRef<str>>(types: &[S]) -> Option<ReleaseType> {
        let primary = types.first()?.as_ref();
        let parsed = if primary.eq_ignore_ascii_case("album") {
            parse_secondary(types, 1, ReleaseType::Album)
        } else if primary.eq_ignore_ascii_case("ep") {
            parse_secondary(types, 1, ReleaseType::Ep)
        } else if primary.eq_ignore_ascii_case("single") {
            parse_secondary(types, 1, ReleaseType::Single)
        } else {
            parse_secondary(types, 0, ReleaseType::Album)
        };
        Some(parsed)
    }

    pub fn refinement(&self) -> Option<Refinement> {
        match self {
            ReleaseType::Album(r)
            | ReleaseType::Ep(r)
            | ReleaseType::Single(r)
            | ReleaseType::Compilation(r) => *r,
            _ => None,
        }
    }
}

fn parse_secondary<S: AsRef<str>>(
    types: &[S],
    index: usize,
    refine: fn(Option<Refinement>) -> ReleaseType,
) -> ReleaseType {
    let secondary = types.get(index).map(AsRef::as_ref);
    match secondary {
        Some(s) if s.eq_ignore_ascii_case("compilation") => parse_leaf(
            types.get(index + 1).map(AsRef::as_ref),
            ReleaseType::Compilation,
        ),
        _ => parse_leaf(secondary, refine),
    }
}

fn parse_leaf(kind: Option<&str>, refine: fn(Option<Refinement>) -> ReleaseType) -> ReleaseType {
    let Some(kind) = kind else {
        return refine(None);
    };
    match kind.to_ascii_lowercase().as_str() {
        "soundtrack" => ReleaseType::Soundtrack,
        "mixtape/street" => ReleaseType::Mixtape,
        "dj-mix" => ReleaseType::Mix,
        "live" => refine(Some(Refinement::Live)),
        "remix" => refine(Some(Refinement::Remix)),
        "demo" => ReleaseType::Demo,
        _ => refine(None),
    }
}
