use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use jwalk::WalkDir;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::model::{Category, Document, Recipe};
use crate::parser::{self, Context};

const CHUNK_SIZE: usize = 500;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Markdown files under a known category directory.
    pub found: usize,
    pub parsed: usize,
    pub failed: usize,
    /// Markdown files outside any known category directory.
    pub skipped: usize,
}

impl BatchReport {
    pub fn print(&self) {
        println!(
            "Parsed {} of {} documents ({} failed, {} skipped).",
            self.parsed, self.found, self.failed, self.skipped
        );
    }
}

pub struct Batch {
    pub recipes: BTreeMap<Category, Vec<Recipe>>,
    pub report: BatchReport,
}

/// Every `.md` file below `dir`, in sorted walk order. A missing directory
/// yields nothing.
pub fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect()
}

pub fn count(dir: &Path) -> usize {
    markdown_files(dir).len()
}

/// Parse every document under `root`, grouped by the category directory it
/// sits in. Only an unreadable `root` is fatal; per-document failures are
/// logged and counted.
pub fn run(root: &Path, ctx: &Context<'_>, limit: Option<usize>) -> Result<Batch> {
    fs::read_dir(root).with_context(|| format!("cannot read {}", root.display()))?;

    let mut report = BatchReport::default();
    let mut unknown = BTreeSet::new();
    let mut jobs = Vec::new();

    for path in markdown_files(root) {
        match Category::from_path(root, &path) {
            Some(category) => jobs.push((category, path)),
            None => {
                report.skipped += 1;
                if let Some(dir) = top_dir(root, &path) {
                    unknown.insert(dir);
                }
            }
        }
    }
    for dir in &unknown {
        warn!(dir = %dir, "skipping unknown category directory");
    }

    if let Some(n) = limit {
        jobs.truncate(n);
    }
    report.found = jobs.len();
    info!(documents = jobs.len(), root = %root.display(), "parsing");

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut recipes: BTreeMap<Category, Vec<Recipe>> = BTreeMap::new();
    for chunk in jobs.chunks(CHUNK_SIZE) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|(category, path)| {
                let parsed = Document::read(path)
                    .and_then(|doc| parser::process_document(&doc, *category, ctx));
                (*category, parsed)
            })
            .collect();

        for (category, parsed) in results {
            match parsed {
                Ok(recipe) => {
                    report.parsed += 1;
                    recipes.entry(category).or_default().push(recipe);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(error = %e, "document skipped");
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    Ok(Batch { recipes, report })
}

/// First directory below `root` for a file that is not directly in it.
fn top_dir(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut components = rel.components();
    let first = components.next()?;
    components.next()?;
    Some(first.as_os_str().to_string_lossy().into_owned())
}
