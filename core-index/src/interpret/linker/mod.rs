//! # Linkers
//!
//! Group songs into genres, artists and albums. Every linker works in two
//! phases:
//!
//! 1. `register` is called once per song and returns the vertices the song
//!    belongs to. A vertex is one distinct pre-link record (`PreGenre`,
//!    `PreArtist`, `PreAlbum`); equal records share a vertex.
//! 2. `resolve` is called once, after every song is registered. Vertices
//!    that denote the same real-world entity are merged and each surviving
//!    group becomes one entity with a stable UID.
//!
//! Linkers run in a fixed order, Genre, then Artist, then Album, because an
//! album is told apart from same-named albums by its resolved artists.
//!
//! ## Merge policy
//!
//! Vertices are clustered by raw name with only case folded; whitespace and
//! punctuation still tell names apart. When every vertex of
//! a cluster carries a MusicBrainz ID, the cluster is split by ID and
//! same-named entities with different IDs stay distinct. Otherwise the IDs are
//! dropped and the cluster is split by a linker-specific rule (a single group
//! for genres and artists). Each group is represented by its vertex with the
//! most songs, the first registered winning ties.
//!
//! Clusters never merge with each other. When one MusicBrainz ID shows up
//! under several names, each name keeps its own entity and their UIDs are
//! hashed from the ID together with the name.

pub mod album;
pub mod artist;
pub mod genre;

pub use album::AlbumLinker;
pub use artist::ArtistLinker;
pub use genre::GenreLinker;

use core_library::models::MusicUid;
use std::collections::HashMap;
use std::hash::Hash;
use uuid::Uuid;

/// Index of a vertex inside one linker, in registration order
pub type VertexId = usize;

/// Distinct pre-link records and how many songs reference each.
pub(crate) struct Vertices<P> {
    items: Vec<P>,
    songs: Vec<usize>,
    lookup: HashMap<P, VertexId>,
}

impl<P: Clone + Eq + Hash> Vertices<P> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            songs: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Vertex for `pre`, created on first sight.
    pub(crate) fn vertex(&mut self, pre: &P) -> VertexId {
        if let Some(&id) = self.lookup.get(pre) {
            return id;
        }
        let id = self.items.len();
        self.items.push(pre.clone());
        self.songs.push(0);
        self.lookup.insert(pre.clone(), id);
        id
    }

    /// Vertex for `pre`, counting one more song for it.
    pub(crate) fn attach(&mut self, pre: &P) -> VertexId {
        let id = self.vertex(pre);
        self.songs[id] += 1;
        id
    }

    /// Vertex of an already registered record
    pub(crate) fn id_of(&self, pre: &P) -> Option<VertexId> {
        self.lookup.get(pre).copied()
    }

    pub(crate) fn get(&self, id: VertexId) -> &P {
        &self.items[id]
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Merge vertices per the merge policy.
    ///
    /// `split_anonymous` divides a name cluster whose IDs were dropped into
    /// groups; vertices of one group are merged.
    pub(crate) fn resolve(
        &self,
        name: impl Fn(&P) -> Option<&str>,
        musicbrainz_id: impl Fn(&P) -> Option<Uuid>,
        split_anonymous: impl Fn(&[VertexId]) -> Vec<Vec<VertexId>>,
        uid: impl Fn(&P, Option<Uuid>) -> MusicUid,
    ) -> Resolved<P> {
        let clusters = group_by(0..self.len(), |&id| name(self.get(id)).map(str::to_lowercase));

        let mut groups: Vec<(Vec<VertexId>, Option<Uuid>)> = Vec::new();
        for cluster in clusters {
            let ids: Vec<Option<Uuid>> =
                cluster.iter().map(|&id| musicbrainz_id(self.get(id))).collect();
            if ids.iter().all(Option::is_some) {
                for group in group_by(cluster.iter().copied(), |&id| musicbrainz_id(self.get(id))) {
                    let id = musicbrainz_id(self.get(group[0]));
                    groups.push((group, id));
                }
            } else {
                groups.extend(split_anonymous(&cluster).into_iter().map(|group| (group, None)));
            }
        }

        // A cluster keeps at most one group per ID, so a repeated ID spans names
        let mut claims: HashMap<Uuid, usize> = HashMap::new();
        for id in groups.iter().filter_map(|(_, id)| *id) {
            *claims.entry(id).or_default() += 1;
        }

        let mut entities = Vec::with_capacity(groups.len());
        let mut entity_of = vec![0; self.len()];
        for (mut members, musicbrainz_id) in groups {
            members.sort_unstable();

            let representative = self.representative(&members);
            members.retain(|&id| id != representative);
            members.insert(0, representative);

            for &id in &members {
                entity_of[id] = entities.len();
            }
            let pre = self.get(representative).clone();
            let mut entity_uid = uid(&pre, musicbrainz_id);
            if musicbrainz_id.is_some_and(|id| claims.get(&id).is_some_and(|&n| n > 1)) {
                let base = entity_uid.to_string();
                entity_uid = MusicUid::hashed(entity_uid.kind(), |h| {
                    h.str(Some(base.as_str())).str(name(&pre));
                });
            }
            entities.push(ResolvedEntity {
                uid: entity_uid,
                pre,
                musicbrainz_id,
                members,
            });
        }

        // Entities in the order their first vertex was registered
        let first_seen: Vec<VertexId> = entities
            .iter()
            .map(|e| e.members.iter().copied().min().unwrap_or_default())
            .collect();
        let mut order: Vec<usize> = (0..entities.len()).collect();
        order.sort_by_key(|&e| first_seen[e]);
        let mut position = vec![0; entities.len()];
        for (new, &old) in order.iter().enumerate() {
            position[old] = new;
        }
        let mut slots: Vec<Option<ResolvedEntity<P>>> = entities.into_iter().map(Some).collect();
        let entities = order.iter().filter_map(|&old| slots[old].take()).collect();
        let entity_of = entity_of.into_iter().map(|e| position[e]).collect();

        Resolved {
            entities,
            entity_of,
        }
    }

    /// Most referenced vertex, the first registered on ties. `members` is
    /// sorted and never empty.
    fn representative(&self, members: &[VertexId]) -> VertexId {
        members
            .iter()
            .copied()
            .fold(members[0], |best, id| {
                if self.songs[id] > self.songs[best] {
                    id
                } else {
                    best
                }
            })
    }
}

/// Group `items` by `key`, keeping first-seen order for groups and items.
pub(crate) fn group_by<T, K, I>(items: I, key: impl Fn(&T) -> K) -> Vec<Vec<T>>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash,
{
    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&g) => groups[g].push(item),
            None => {
                index.insert(k, groups.len());
                groups.push(vec![item]);
            }
        }
    }
    groups
}

/// One entity produced by a linker.
#[derive(Debug, Clone)]
pub struct ResolvedEntity<P> {
    pub uid: MusicUid,
    /// The representative record; its name is the entity's name
    pub pre: P,
    /// Only kept when every merged record agreed on it
    pub musicbrainz_id: Option<Uuid>,
    /// Merged vertices, representative first
    pub members: Vec<VertexId>,
}

/// Outcome of a linker: entities in registration order and the entity each
/// vertex was merged into.
#[derive(Debug, Clone)]
pub struct Resolved<P> {
    entities: Vec<ResolvedEntity<P>>,
    entity_of: Vec<usize>,
}

impl<P> Resolved<P> {
    pub fn entities(&self) -> &[ResolvedEntity<P>] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Index into [`Self::entities`] of the entity `vertex` belongs to
    pub fn index_of(&self, vertex: VertexId) -> usize {
        self.entity_of[vertex]
    }

    pub fn uid_of(&self, vertex: VertexId) -> MusicUid {
        self.entities[self.index_of(vertex)].uid
    }

    /// Entity indices of `vertices`, without repeats, in order
    pub fn indices_of(&self, vertices: &[VertexId]) -> Vec<usize> {
        let mut indices = Vec::with_capacity(vertices.len());
        for &vertex in vertices {
            let index = self.index_of(vertex);
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
        indices
    }

    /// Entity UIDs of `vertices`, without repeats, in order
    pub fn uids_of(&self, vertices: &[VertexId]) -> Vec<MusicUid> {
        self.indices_of(vertices)
            .into_iter()
            .map(|index| self.entities[index].uid)
            .collect()
    }
}
