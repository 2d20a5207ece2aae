use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::quantity::fold_digits;

/// Chinese numerals understood in time expressions. Compounds come first so
/// the alternation prefers `四十五` over `四十` over `四`.
const CN_NUMERALS: &[(&str, f64)] = &[
    ("二十五", 25.0),
    ("三十五", 35.0),
    ("四十五", 45.0),
    ("二十", 20.0),
    ("三十", 30.0),
    ("四十", 40.0),
    ("五十", 50.0),
    ("一", 1.0),
    ("二", 2.0),
    ("两", 2.0),
    ("三", 3.0),
    ("四", 4.0),
    ("五", 5.0),
    ("六", 6.0),
    ("七", 7.0),
    ("八", 8.0),
    ("九", 9.0),
    ("十", 10.0),
    ("半", 0.5),
];

const UNITS: &[(&str, f64)] = &[("分钟", 1.0), ("小时", 60.0), ("天", 1440.0)];

/// `<number> [个] <unit>` with the number and unit captured.
fn time_pattern() -> String {
    let cn: Vec<&str> = CN_NUMERALS.iter().map(|(k, _)| *k).collect();
    let units: Vec<&str> = UNITS.iter().map(|(k, _)| *k).collect();
    format!(
        r"([0-9]+(?:\.[0-9]+)?|{})\s*个?\s*({})",
        cn.join("|"),
        units.join("|")
    )
}

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"预估(准备|烹饪|总)时间\s*[：:]\s*{}", time_pattern())).unwrap()
});
static COMPLETION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{}\s*(?:完成|制作)", time_pattern())).unwrap());
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&time_pattern()).unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub prep: Option<i64>,
    pub cook: Option<i64>,
    pub total: Option<i64>,
}

impl Timing {
    fn is_empty(&self) -> bool {
        self.prep.is_none() && self.cook.is_none() && self.total.is_none()
    }
}

/// Estimate prep/cook/total minutes for one document.
///
/// Labelled fields win. Without any label, a "<time> 完成/制作" phrase in
/// the narrative gives the total. Whatever is still missing from prep/cook
/// is then filled from the sum of every time mentioned in `steps`: that sum
/// backs both total and cook, never prep.
pub fn estimate(text: &str, steps: &[&str]) -> Timing {
    let text = fold_digits(text);
    let mut timing = labelled(&text);

    if timing.is_empty() {
        timing.total = narrative_total(&text);
    }

    if timing.prep.is_none() || timing.cook.is_none() {
        let steps: Vec<Cow<'_, str>> = steps.iter().map(|s| fold_digits(s)).collect();
        if let Some(sum) = step_total(&steps) {
            timing.total.get_or_insert(sum);
            timing.cook.get_or_insert(sum);
        }
    }

    timing
}

fn labelled(text: &str) -> Timing {
    let mut timing = Timing::default();
    for caps in LABEL_RE.captures_iter(text) {
        let Some(minutes) = minutes_from(&caps, 2) else {
            continue;
        };
        // later labels overwrite earlier ones
        match &caps[1] {
            "准备" => timing.prep = Some(minutes),
            "烹饪" => timing.cook = Some(minutes),
            _ => timing.total = Some(minutes),
        }
    }
    timing
}

fn narrative_total(text: &str) -> Option<i64> {
    COMPLETION_RE
        .captures(text)
        .and_then(|caps| minutes_from(&caps, 1))
}

fn step_total(steps: &[Cow<'_, str>]) -> Option<i64> {
    let mut found = false;
    let mut sum = 0.0;
    for step in steps {
        for caps in MENTION_RE.captures_iter(step) {
            if let Some(value) = raw_minutes(&caps, 1) {
                sum += value;
                found = true;
            }
        }
    }
    found.then_some(sum as i64)
}

/// Minutes from the number at group `idx` and the unit right after it.
fn minutes_from(caps: &Captures, idx: usize) -> Option<i64> {
    raw_minutes(caps, idx).map(|m| m as i64)
}

fn raw_minutes(caps: &Captures, idx: usize) -> Option<f64> {
    let value = number_value(caps.get(idx)?.as_str())?;
    let unit = caps.get(idx + 1)?.as_str();
    let factor = UNITS.iter().find(|(u, _)| *u == unit).map(|(_, f)| *f)?;
    Some(value * factor)
}

fn number_value(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().or_else(|| {
        CN_NUMERALS
            .iter()
            .find(|(k, _)| *k == token)
            .map(|(_, v)| *v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_label_only() {
        let t = estimate("# 炖牛肉\n\n预估总时间：2 小时\n", &[]);
        assert_eq!(t, Timing { prep: None, cook: None, total: Some(120) });
    }

    #[test]
    fn all_labels_with_chinese_numerals() {
        let md = std::fs::read_to_string("tests/fixtures/luosifen.md").unwrap();
        let t = estimate(&md, &["放入米粉煮 8 分钟"]);
        assert_eq!(t, Timing { prep: Some(10), cook: Some(30), total: Some(45) });
    }

    #[test]
    fn last_label_wins() {
        let t = estimate("预估准备时间：5分钟\n预估准备时间：15分钟", &[]);
        assert_eq!(t.prep, Some(15));
    }

    #[test]
    fn counting_particle_and_days() {
        let t = estimate("预估准备时间：两个小时\n预估烹饪时间：1天", &[]);
        assert_eq!(t.prep, Some(120));
        assert_eq!(t.cook, Some(1440));
    }

    #[test]
    fn fractional_hours_truncate() {
        let t = estimate("预估总时间：1.51 小时", &[]);
        assert_eq!(t.total, Some(90));
    }

    #[test]
    fn narrative_completion() {
        let t = estimate("这道菜大约 20 分钟完成。", &[]);
        assert_eq!(t.total, Some(20));
        assert_eq!(t.cook, None);
    }

    #[test]
    fn steps_fill_total_and_cook() {
        let t = estimate("没有时间说明", &["翻炒 2 分钟", "焖五分钟", "静置 10 秒"]);
        assert_eq!(t, Timing { prep: None, cook: Some(7), total: Some(7) });
    }

    #[test]
    fn steps_do_not_override_labels() {
        let t = estimate("预估总时间：1 小时", &["煮 10 分钟"]);
        assert_eq!(t, Timing { prep: None, cook: Some(10), total: Some(60) });
    }

    #[test]
    fn fullwidth_digits() {
        let t = estimate("预估总时间：２ 小时", &[]);
        assert_eq!(t.total, Some(120));
        let t = estimate("没有时间说明", &["炖 １５ 分钟"]);
        assert_eq!(t.cook, Some(15));
    }

    #[test]
    fn nothing_found() {
        assert_eq!(estimate("就是烧开的水。", &["烧开"]), Timing::default());
    }
}
