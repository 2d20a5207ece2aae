use std::path::Path;

use super::images;
use crate::model::Step;
use crate::parser::blocks::Block;
use crate::parser::sections::{locate, SpanEnd};

/// "Operations".
const STEPS_HEADING: &str = "操作";
/// "No detailed steps available."
pub const PLACEHOLDER: &str = "暂无详细步骤说明";

/// List items under the operations heading, numbered from 1. Images inline
/// in an item, or on their own lines right after it, belong to that step.
pub fn extract(blocks: &[Block], doc_dir: &Path) -> Vec<Step> {
    let mut steps: Vec<Step> = Vec::new();

    if let Some(section) = locate(blocks, 2, STEPS_HEADING, SpanEnd::SameLevel) {
        for block in section.blocks {
            match block {
                Block::ListItem { text, .. } => {
                    steps.push(Step {
                        step: steps.len() + 1,
                        description: images::strip(text),
                        images: images::find_all(text, doc_dir),
                    });
                }
                Block::Image { reference, .. } => {
                    if let Some(last) = steps.last_mut() {
                        let resolved = images::resolve(doc_dir, reference);
                        if !last.images.contains(&resolved) {
                            last.images.push(resolved);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if steps.is_empty() {
        steps.push(Step {
            step: 1,
            description: PLACEHOLDER.to_string(),
            images: Vec::new(),
        });
    }

    steps
}
