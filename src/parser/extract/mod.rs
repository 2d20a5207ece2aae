pub mod description;
pub mod difficulty;
pub mod images;
pub mod ingredients;
pub mod notes;
pub mod steps;
pub mod title;

use std::path::Path;

use super::blocks::Block;
use super::timing::{self, Timing};
use crate::model::{Document, Ingredient, Note, Step};
use images::ImageScope;

/// Everything read out of one document, before identifiers and image
/// transfer are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub name: String,
    pub description: String,
    pub difficulty: u8,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub timing: Timing,
    pub images: Vec<String>,
    pub notes: Vec<Note>,
}

/// `dir` is the directory image references are resolved against, normally
/// the document's directory relative to the repository root.
pub fn extract_all(doc: &Document, blocks: &[Block], dir: &Path, scope: ImageScope) -> Extracted {
    let description = description::extract(&doc.text);
    let steps = steps::extract(blocks, dir);

    let step_texts: Vec<&str> = steps
        .iter()
        .filter(|s| s.description != steps::PLACEHOLDER)
        .map(|s| s.description.as_str())
        .collect();
    let timing = timing::estimate(&doc.text, &step_texts);

    Extracted {
        name: title::extract(blocks, &doc.stem()),
        images: images::extract(&description, &doc.text, dir, scope),
        difficulty: difficulty::extract(&doc.text),
        ingredients: ingredients::extract(blocks),
        notes: notes::extract(blocks, dir),
        description,
        steps,
        timing,
    }
}

// ── Tests ──
