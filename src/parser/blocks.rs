use std::sync::LazyLock;

use regex::Regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([ \t]*)[-*][ \t]+(.*)$").unwrap());
static IMAGE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]*)\)$").unwrap());

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    /// `- text` / `* text`. `line` is the trimmed source line, marker included.
    ListItem { indent: usize, text: String, line: String },
    Quote(String),
    /// A line holding nothing but `![alt](reference)`.
    Image { alt: String, reference: String },
    Text(String),
    Empty,
}

pub fn classify_lines(markdown: &str) -> Vec<Block> {
    markdown.lines().map(classify_line).collect()
}

fn classify_line(raw: &str) -> Block {
    let line = raw.trim();

    if line.is_empty() {
        return Block::Empty;
    }

    // ── Heading: ## text ──
    if let Some(caps) = HEADING_RE.captures(line) {
        return Block::Heading {
            level: caps[1].len() as u8,
            text: caps[2].trim().to_string(),
        };
    }

    // ── Quote: > text ──
    if let Some(rest) = line.strip_prefix('>') {
        return Block::Quote(rest.trim().to_string());
    }

    // ── List item, indentation kept for nesting ──
    if let Some(caps) = LIST_RE.captures(raw.trim_end()) {
        return Block::ListItem {
            indent: indent_width(&caps[1]),
            text: caps[2].trim().to_string(),
            line: line.to_string(),
        };
    }

    // ── Standalone image ──
    if let Some(caps) = IMAGE_LINE_RE.captures(line) {
        return Block::Image {
            alt: caps[1].to_string(),
            reference: caps[2].trim().to_string(),
        };
    }

    Block::Text(line.to_string())
}

fn indent_width(prefix: &str) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}
