use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]*)\)").unwrap());

/// Which part of a document feeds the record's image list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageScope {
    /// Images in the description; the whole document only when the
    /// description has none.
    #[default]
    Description,
    /// Every image in the document.
    Document,
}

pub fn extract(description: &str, text: &str, doc_dir: &Path, scope: ImageScope) -> Vec<String> {
    if scope == ImageScope::Description {
        let found = find_all(description, doc_dir);
        if !found.is_empty() {
            return found;
        }
    }
    find_all(text, doc_dir)
}

/// Every `![alt](ref)` in `text`, resolved, first occurrence kept.
pub fn find_all(text: &str, doc_dir: &Path) -> Vec<String> {
    let mut seen = HashSet::new();
    IMAGE_RE
        .captures_iter(text)
        .map(|caps| resolve(doc_dir, caps[1].trim()))
        .filter(|r| !r.is_empty() && seen.insert(r.clone()))
        .collect()
}

/// Remove image syntax from a line of prose.
pub fn strip(text: &str) -> String {
    IMAGE_RE.replace_all(text, "").trim().to_string()
}

/// `./x.jpg` becomes a path next to the document; URLs and anything else
/// are kept verbatim.
pub fn resolve(doc_dir: &Path, reference: &str) -> String {
    match reference.strip_prefix("./") {
        Some(rest) => doc_dir.join(rest).to_string_lossy().replace('\\', "/"),
        None => reference.to_string(),
    }
}
