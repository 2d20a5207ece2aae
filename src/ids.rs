use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::markdown_files;
use crate::store::{relative_key, IdentifierMap};

/// Give every Markdown file under `dirs` that has no identifier yet a fresh
/// one. Existing entries are never touched. Returns how many were added.
pub fn refresh(ids: &mut IdentifierMap, base: &Path, dirs: &[&Path]) -> usize {
    let mut added = 0;
    for dir in dirs {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "not a directory, skipped");
            continue;
        }
        for path in markdown_files(dir) {
            let key = relative_key(base, &path);
            if ids.contains(&key) {
                continue;
            }
            ids.insert(key, Uuid::new_v4().to_string());
            added += 1;
        }
    }
    info!(added, total = ids.len(), "identifier mapping refreshed");
    added
}
