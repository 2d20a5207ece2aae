use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::transfer::ImageTransfer;

/// `path` relative to `base`, `/`-separated. This is the key of both the
/// identifier mapping and a record's `source_path`.
pub fn relative_key(base: &Path, path: &Path) -> String {
    let rel = path
        .strip_prefix(base)
        .map(Path::to_path_buf)
        .ok()
        .or_else(|| {
            let base = base.canonicalize().ok()?;
            let path = path.canonicalize().ok()?;
            path.strip_prefix(base).map(Path::to_path_buf).ok()
        })
        .unwrap_or_else(|| path.to_path_buf());
    rel.to_string_lossy().replace('\\', "/")
}

/// Stable document identifiers, keyed by relative path. Read-only while a
/// batch runs.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    entries: BTreeMap<String, String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing file is an empty mapping.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = read_json_map(path)?;
        Ok(IdentifierMap { entries })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_map(path, &self.entries)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, id: impl Into<String>) {
        self.entries.insert(key.into(), id.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for IdentifierMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        IdentifierMap {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Original image reference → transferred reference. Shared by all
/// workers of a batch; the first successful transfer of a reference wins.
#[derive(Debug, Default)]
pub struct ImageStore {
    map: DashMap<String, String>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let map = read_json_map(path)?.into_iter().collect();
        Ok(ImageStore { map })
    }

    /// Saved sorted so unchanged mappings produce identical files.
    pub fn save(&self, path: &Path) -> Result<()> {
        let sorted: BTreeMap<String, String> = self
            .map
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        write_json_map(path, &sorted)
    }

    pub fn get(&self, reference: &str) -> Option<String> {
        self.map.get(reference).map(|v| v.value().clone())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Transferred reference for `reference`, transferring on first use.
    /// A failed transfer keeps the original reference and is not recorded.
    ///
    /// The transfer runs while the entry is held, so concurrent workers
    /// asking for the same reference wait for one transfer instead of
    /// each storing their own copy.
    pub fn resolve(&self, reference: &str, transfer: &dyn ImageTransfer) -> String {
        if let Some(hit) = self.get(reference) {
            return hit;
        }

        match self.map.entry(reference.to_string()) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(slot) => match transfer.transfer(reference) {
                Ok(new) if new != reference => {
                    debug!(reference, new = %new, "image transferred");
                    slot.insert(new).value().clone()
                }
                Ok(same) => same,
                Err(e) => {
                    warn!(reference, error = %e, "image transfer failed, keeping original reference");
                    reference.to_string()
                }
            },
        }
    }
}

fn read_json_map(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn write_json_map(path: &Path, map: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(map)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransferError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl ImageTransfer for Counting {
        fn transfer(&self, reference: &str) -> Result<String, TransferError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("cdn/{}", reference))
        }
    }

    struct Broken;

    impl ImageTransfer for Broken {
        fn transfer(&self, _: &str) -> Result<String, TransferError> {
            Err(TransferError::Status(404))
        }
    }

    #[test]
    fn relative_key_strips_base() {
        assert_eq!(
            relative_key(Path::new("/srv/cook"), Path::new("/srv/cook/dishes/soup/a.md")),
            "dishes/soup/a.md"
        );
    }

    #[test]
    fn relative_key_falls_back_to_path() {
        assert_eq!(
            relative_key(Path::new("/nowhere"), Path::new("dishes/soup/a.md")),
            "dishes/soup/a.md"
        );
    }

    #[test]
    fn resolve_transfers_once() {
        let store = ImageStore::new();
        let t = Counting { calls: AtomicUsize::new(0) };
        assert_eq!(store.resolve("a.jpg", &t), "cdn/a.jpg");
        assert_eq!(store.resolve("a.jpg", &t), "cdn/a.jpg");
        assert_eq!(t.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_misses_transfer_once() {
        let store = ImageStore::new();
        let t = Counting { calls: AtomicUsize::new(0) };
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(store.resolve("shared.jpg", &t), "cdn/shared.jpg"));
            }
        });
        assert_eq!(t.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_transfer_keeps_original() {
        let store = ImageStore::new();
        assert_eq!(store.resolve("https://x/a.jpg", &Broken), "https://x/a.jpg");
        assert!(store.is_empty());
    }

    #[test]
    fn maps_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uuid/uuid.json");

        let mut ids = IdentifierMap::new();
        ids.insert("dishes/soup/a.md", "id-1");
        ids.save(&path).unwrap();
        let loaded = IdentifierMap::load(&path).unwrap();
        assert_eq!(loaded.get("dishes/soup/a.md"), Some("id-1"));

        assert!(IdentifierMap::load(&dir.path().join("missing.json")).unwrap().is_empty());
    }

    #[test]
    fn image_store_save_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.json");
        let store = ImageStore::new();
        let t = Counting { calls: AtomicUsize::new(0) };
        store.resolve("b.jpg", &t);
        store.resolve("a.jpg", &t);
        store.save(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.find("a.jpg").unwrap() < raw.find("b.jpg").unwrap());
        assert_eq!(ImageStore::load(&path).unwrap().get("a.jpg").as_deref(), Some("cdn/a.jpg"));
    }
}
