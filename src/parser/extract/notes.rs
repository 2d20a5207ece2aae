use std::path::Path;

use super::images;
use crate::model::Note;
use crate::parser::blocks::Block;
use crate::parser::sections::{locate, SpanEnd};

/// Invitation to report problems via Issue or Pull request.
pub const BOILERPLATE: &str =
    "如果您遵循本指南的制作流程而发现有问题或可以改进的流程，请提出 Issue 或 Pull request 。";

/// Headings tried in order: "references", then "additional content".
const SOURCES: &[(u8, &str)] = &[(3, "参考资料"), (2, "附加内容")];

/// Lines of the first non-empty notes section; the boilerplate sentence
/// otherwise. Never empty.
pub fn extract(blocks: &[Block], doc_dir: &Path) -> Vec<Note> {
    SOURCES
        .iter()
        .filter_map(|(level, title)| locate(blocks, *level, title, SpanEnd::AnyHeading))
        .map(|section| {
            section
                .blocks
                .iter()
                .filter_map(|b| to_note(b, doc_dir))
                .collect::<Vec<_>>()
        })
        .find(|notes| !notes.is_empty())
        .unwrap_or_else(|| vec![Note::Text(BOILERPLATE.to_string())])
}

fn to_note(block: &Block, doc_dir: &Path) -> Option<Note> {
    match block {
        Block::Text(t) => Some(Note::Text(t.clone())),
        Block::ListItem { line, .. } => Some(Note::Text(line.clone())),
        Block::Quote(t) => Some(Note::Text(format!("> {}", t))),
        Block::Image { reference, .. } => Some(Note::Image(images::resolve(doc_dir, reference))),
        Block::Heading { .. } | Block::Empty => None,
    }
}
