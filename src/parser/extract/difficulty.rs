use std::sync::LazyLock;

use regex::Regex;

/// Line prefix introducing the star rating ("estimated difficulty").
pub const MARKER: &str = "预估烹饪难度";

const MAX_STARS: usize = 5;

static DIFFICULTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"预估烹饪难度\s*[：:]\s*(★+)").unwrap());

/// Number of stars after the marker, 0 when there is no rating.
pub fn extract(text: &str) -> u8 {
    DIFFICULTY_RE
        .captures(text)
        .map(|caps| caps[1].chars().count().min(MAX_STARS) as u8)
        .unwrap_or(0)
}
