use crate::parser::blocks::Block;

/// "…的做法" ("how to make …") is dropped from titles.
const SUFFIX: &str = "的做法";

/// First `# ` heading, without the suffix. Falls back to `stem` (the file
/// name) when the document has no top-level heading.
pub fn extract(blocks: &[Block], stem: &str) -> String {
    blocks
        .iter()
        .find_map(|b| match b {
            Block::Heading { level: 1, text } => Some(text.as_str()),
            _ => None,
        })
        .map(|t| t.strip_suffix(SUFFIX).unwrap_or(t).trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;

    #[test]
    fn strips_suffix() {
        let blocks = classify_lines("# 红烧肉的做法\n\n正文");
        assert_eq!(extract(&blocks, "x"), "红烧肉");
    }

    #[test]
    fn keeps_title_without_suffix() {
        let blocks = classify_lines("# 白开水\n");
        assert_eq!(extract(&blocks, "x"), "白开水");
    }

    #[test]
    fn second_level_heading_is_not_a_title() {
        let blocks = classify_lines("## 操作\n- 煮");
        assert_eq!(extract(&blocks, "煮面"), "煮面");
    }

    #[test]
    fn bare_suffix_falls_back() {
        let blocks = classify_lines("# 的做法");
        assert_eq!(extract(&blocks, "无名菜"), "无名菜");
    }
}
