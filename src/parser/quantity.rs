use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Units recognised after a number, Latin and CJK.
pub const UNITS: &[&str] = &[
    "克", "g", "kg", "毫升", "ml", "升", "l", "个", "只", "块", "片", "根", "条", "把", "朵",
    "粒", "颗", "瓣", "滴", "勺", "杯", "碗", "包", "袋", "瓶", "罐", "盒", "斤", "两",
];

const NUMBER: &str = r"[0-9]+(?:\.[0-9]+)?";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({NUMBER})\s*-\s*({NUMBER})\s*({})", UNITS.join("|"))).unwrap()
});
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(.*?)({NUMBER})\s*({})", UNITS.join("|"))).unwrap()
});
static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(.*?)({NUMBER})$")).unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

type Rule = fn(&str) -> Option<Quantity>;

/// Tried in order; the first rule that matches wins.
const RULES: &[Rule] = &[range_with_unit, number_with_unit, trailing_number];

/// Fullwidth digits and decimal point (`１２．５`) folded to ASCII.
pub fn fold_digits(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| matches!(c, '０'..='９' | '．')) {
        return Cow::Borrowed(text);
    }
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// Split one ingredient line into name, amount and unit.
/// Never fails: unparseable text comes back whole as the name.
pub fn parse(text: &str) -> Quantity {
    let text = fold_digits(text.trim()).replace(['：', ':'], "");
    RULES.iter().find_map(|rule| rule(&text)).unwrap_or(Quantity {
        name: text,
        amount: None,
        unit: None,
    })
}

/// `面粉 70-230g` → mean of the bounds.
fn range_with_unit(text: &str) -> Option<Quantity> {
    let caps = RANGE_RE.captures(text)?;
    let low: f64 = caps[1].parse().ok()?;
    let high: f64 = caps[2].parse().ok()?;
    Some(Quantity {
        name: RANGE_RE.replace_all(text, "").trim().to_string(),
        amount: Some((low + high) / 2.0),
        unit: Some(caps[3].to_string()),
    })
}

fn number_with_unit(text: &str) -> Option<Quantity> {
    let caps = UNIT_RE.captures(text)?;
    Some(Quantity {
        name: caps[1].trim().to_string(),
        amount: Some(caps[2].parse().ok()?),
        unit: Some(caps[3].to_string()),
    })
}

fn trailing_number(text: &str) -> Option<Quantity> {
    let caps = BARE_NUMBER_RE.captures(text)?;
    Some(Quantity {
        name: caps[1].trim().to_string(),
        amount: Some(caps[2].parse().ok()?),
        unit: None,
    })
}
