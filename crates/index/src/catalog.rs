//! Song catalog: maps dense song ids back to their source recordings.

use std::collections::BTreeMap;
use std::path::Path;

use fingerprint::SongId;
use serde::{Deserialize, Serialize};

/// Mapping from [`SongId`] to the path (or name) the recording was loaded from.
///
/// Built by the same pass as the [`FingerprintIndex`](crate::FingerprintIndex)
/// it accompanies; every id referenced by that index must be present here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongCatalog {
    songs: BTreeMap<SongId, String>,
}

impl SongCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a song. Returns the previous source if the id was taken.
    pub fn insert(&mut self, id: SongId, source: impl Into<String>) -> Option<String> {
        self.songs.insert(id, source.into())
    }

    /// Source path or name recorded for `id`.
    pub fn source(&self, id: SongId) -> Option<&str> {
        self.songs.get(&id).map(String::as_str)
    }

    /// Human-friendly title for `id`, derived from its source.
    pub fn display_name(&self, id: SongId) -> Option<String> {
        self.source(id).map(display_name)
    }

    pub fn contains(&self, id: SongId) -> bool {
        self.songs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (SongId, &str)> {
        self.songs.iter().map(|(id, src)| (*id, src.as_str()))
    }
}

/// File stem with `-` and `_` turned into spaces: `music/Take-Five.wav` -> `Take Five`.
pub fn display_name(source: &str) -> String {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source);
    stem.replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_directory_and_extension() {
        assert_eq!(display_name("database_songs/Take-Five.wav"), "Take Five");
        assert_eq!(display_name("so_what"), "so what");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn insert_and_lookup() {
        let mut catalog = SongCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.insert(SongId(0), "a/one.wav"), None);
        assert_eq!(catalog.insert(SongId(1), "a/two-three.wav"), None);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(SongId(1)));
        assert!(!catalog.contains(SongId(2)));
        assert_eq!(catalog.source(SongId(0)), Some("a/one.wav"));
        assert_eq!(catalog.display_name(SongId(1)).as_deref(), Some("two three"));
        assert_eq!(catalog.display_name(SongId(9)), None);

        let replaced = catalog.insert(SongId(0), "b/other.wav");
        assert_eq!(replaced.as_deref(), Some("a/one.wav"));
    }

    #[test]
    fn iteration_is_ordered_by_id() {
        let mut catalog = SongCatalog::new();
        catalog.insert(SongId(2), "c");
        catalog.insert(SongId(0), "a");
        catalog.insert(SongId(1), "b");
        let ids: Vec<u32> = catalog.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn serde_keeps_ids() {
        let mut catalog = SongCatalog::new();
        catalog.insert(SongId(0), "x.wav");
        catalog.insert(SongId(7), "y.wav");
        let json = serde_json::to_string(&catalog).unwrap();
        let back: SongCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
        assert_eq!(back.source(SongId(7)), Some("y.wav"));
    }
}
