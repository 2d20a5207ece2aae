use std::collections::HashSet;

use crate::model::Ingredient;
use crate::parser::blocks::Block;
use crate::parser::quantity;
use crate::parser::sections::{locate, Section, SpanEnd};

/// "Required ingredients and tools".
const INGREDIENTS_HEADING: &str = "必备原料和工具";
/// "Calculation": per-serving amounts.
const CALCULATION_HEADING: &str = "计算";

/// Items indented deeper than this only count as children of a bundle.
const MAX_ITEM_INDENT: usize = 4;

#[derive(Default)]
struct IngredientList {
    seen: HashSet<String>,
    items: Vec<Ingredient>,
}

impl IngredientList {
    /// Parse and record one item unless its name was seen before.
    fn push(&mut self, text: &str, line: &str) {
        let q = quantity::parse(text);
        if q.name.is_empty() || !self.seen.insert(q.name.clone()) {
            return;
        }
        self.items
            .push(Ingredient::new(q.name, q.amount, q.unit, line.to_string()));
    }
}

/// Ingredients in discovery order: the main section (bundles followed by
/// their contents), then the calculation section. Later duplicates of a
/// name are dropped.
pub fn extract(blocks: &[Block]) -> Vec<Ingredient> {
    let mut list = IngredientList::default();

    if let Some(section) = locate(blocks, 2, INGREDIENTS_HEADING, SpanEnd::AnyHeading) {
        collect_main(&section, &mut list);
    }

    if let Some(section) = locate(blocks, 2, CALCULATION_HEADING, SpanEnd::AnyHeading) {
        for (_, text, line) in section.list_items() {
            list.push(text, line);
        }
    }

    list.items
}

fn collect_main(section: &Section, list: &mut IngredientList) {
    let blocks = section.blocks;
    let mut i = 0;

    while i < blocks.len() {
        let Block::ListItem { indent, text, line } = &blocks[i] else {
            i += 1;
            continue;
        };
        i += 1;
        if *indent > MAX_ITEM_INDENT {
            continue;
        }

        list.push(text, line);

        if is_bundle(text) {
            while let Some(Block::ListItem {
                indent: child_indent,
                text,
                line,
            }) = blocks.get(i)
            {
                if child_indent <= indent {
                    break;
                }
                list.push(text, line);
                i += 1;
            }
        }
    }
}

/// An item announcing a sub-list, e.g. "袋装螺蛳粉一包，其中应该包含：".
fn is_bundle(text: &str) -> bool {
    text.ends_with('：') || text.ends_with(':') || text.contains("包含")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;

    fn names(md: &str) -> Vec<String> {
        extract(&classify_lines(md)).into_iter().map(|i| i.name).collect()
    }

    #[test]
    fn plain_list() {
        let md = "## 必备原料和工具\n\n- 鸡蛋 2个\n* 盐\n\n## 操作\n- 煮";
        let items = extract(&classify_lines(md));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "鸡蛋");
        assert_eq!(items[0].quantity, Some(2.0));
        assert_eq!(items[0].unit.as_deref(), Some("个"));
        assert_eq!(items[0].text_quantity, "- 鸡蛋 2个");
        assert_eq!(items[1].notes, "量未指定");
    }

    #[test]
    fn quotes_and_subheadings_skipped() {
        let md = "## 必备原料和工具\n- 面粉\n> 可用中筋面粉\n### 工具\n- 擀面杖";
        assert_eq!(names(md), vec!["面粉"]);
    }

    #[test]
    fn bundle_children_follow_parent() {
        let md = "## 必备原料和工具\n- 调料包，包含：\n  - 盐 2g\n    - 海盐\n  - 糖\n- 水\n\n## 操作\n";
        assert_eq!(names(md), vec!["调料包，包含", "盐", "海盐", "糖", "水"]);
    }

    #[test]
    fn deep_items_ignored_outside_bundle() {
        let md = "## 必备原料和工具\n- 肉\n      - 五花肉\n- 葱";
        assert_eq!(names(md), vec!["肉", "葱"]);
    }

    #[test]
    fn calculation_adds_new_names_only() {
        let md = "## 必备原料和工具\n- 鸡蛋\n\n## 计算\n\n- 鸡蛋 2个\n- 白糖 5g\n\n## 操作\n";
        let items = extract(&classify_lines(md));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, None);
        assert_eq!(items[1].name, "白糖");
        assert_eq!(items[1].quantity, Some(5.0));
    }

    #[test]
    fn duplicates_keep_first() {
        let md = "## 必备原料和工具\n- 米粉 1包\n- 米粉 2包";
        let items = extract(&classify_lines(md));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, Some(1.0));
    }

    #[test]
    fn no_section() {
        assert!(names("# 白开水\n就是烧开的水").is_empty());
    }
}
