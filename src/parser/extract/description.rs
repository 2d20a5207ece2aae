use super::difficulty::MARKER;

/// Everything between the title line and the difficulty line, image lines
/// included. Empty when the difficulty line never appears.
pub fn extract(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.starts_with("# "))
        .map(|i| i + 1)
        .unwrap_or(0);

    // the rating line itself is not part of the description
    let Some(len) = lines[start..]
        .iter()
        .position(|l| l.trim_start().starts_with(MARKER))
    else {
        return String::new();
    };

    lines[start..start + len].join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn between_title_and_rating() {
        let md = "# 红烧肉的做法\n\n![红烧肉](./红烧肉.jpg)\n\n肥而不腻。\n\n预估烹饪难度：★★★★\n\n## 必备原料和工具";
        assert_eq!(extract(md), "![红烧肉](./红烧肉.jpg)\n\n肥而不腻。");
    }

    #[test]
    fn empty_without_rating() {
        assert_eq!(extract("# 白开水\n\n就是烧开的水。\n"), "");
    }

    #[test]
    fn no_title_starts_at_top() {
        assert_eq!(extract("一段介绍\n预估烹饪难度：★"), "一段介绍");
    }
}
