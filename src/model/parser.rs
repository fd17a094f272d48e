// File: src/model/parser.rs
//! Due-date extraction: find the first date phrase in free text, resolve it
//! against "now" and return the text with the phrase cut out.
use crate::model::en::EnglishMatcher;
use crate::model::matcher::{PhraseMatch, PhraseMatcher};
use crate::model::zh::ChineseMatcher;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use std::ops::Range;

/// Matchers in priority order. The English grammar only runs when the
/// Chinese one found nothing anywhere in the text.
pub static MATCHERS: [&dyn PhraseMatcher; 2] = [&ChineseMatcher, &EnglishMatcher];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: DateTime<Utc>,
    pub original_text: String,
    pub clean_text: String,
    /// Byte range of the phrase inside `original_text`.
    pub span: Range<usize>,
    /// Name of the grammar that recognised the phrase.
    pub matcher: &'static str,
}

impl ParsedDate {
    pub fn matched_text(&self) -> &str {
        &self.original_text[self.span.clone()]
    }
}

pub fn extract(input: &str) -> Option<ParsedDate> {
    extract_at(input, &Local::now())
}

pub fn extract_at<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Option<ParsedDate> {
    extract_with(&MATCHERS, input, now)
}

/// Runs `matchers` in order and resolves the first hit in `now`'s time zone.
pub fn extract_with<Tz: TimeZone>(
    matchers: &[&dyn PhraseMatcher],
    input: &str,
    now: &DateTime<Tz>,
) -> Option<ParsedDate> {
    if input.trim().is_empty() {
        return None;
    }
    let wall = now.naive_local();
    let (matcher, found) = matchers
        .iter()
        .find_map(|m| m.try_match(input, wall).map(|found| (m.name(), found)))?;
    let PhraseMatch { start, end, when } = found;
    let date = localize(&now.timezone(), when)?;

    log::debug!("Date phrase {:?} ({}) -> {}", &input[start..end], matcher, date);
    Some(ParsedDate {
        date,
        original_text: input.to_string(),
        clean_text: clean_text(input, start..end),
        span: start..end,
        matcher,
    })
}

/// Wall-clock time to an instant. Ambiguous times take the earlier instant;
/// times that fall in a DST gap are pushed forward one hour.
pub(crate) fn localize<Tz: TimeZone>(tz: &Tz, wall: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&wall)
        .earliest()
        .or_else(|| {
            let later = wall.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&later).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

const EDGE_PUNCTUATION: &[char] = &[',', '，', '、', ';', '；', ':', '：'];

/// Removes the phrase once, collapses whitespace runs and strips separators
/// left dangling at either end ("明天, 交报告" -> "交报告").
pub fn clean_text(input: &str, span: Range<usize>) -> String {
    let mut rest = String::with_capacity(input.len());
    rest.push_str(&input[..span.start]);
    rest.push_str(&input[span.end..]);

    let collapsed = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || EDGE_PUNCTUATION.contains(&c))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 17, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_clean_text_joins_around_phrase() {
        assert_eq!(clean_text("a  b c", 2..3), "a c");
        assert_eq!(clean_text("明天下午3点开会", 0..16), "开会");
        assert_eq!(clean_text("交报告，明天", 12..18), "交报告");
        assert_eq!(clean_text("tomorrow", 0..8), "");
        assert_eq!(clean_text("我明天开会", 3..9), "我开会");
    }

    #[test]
    fn test_chinese_wins_over_english() {
        let parsed = extract_at("tomorrow 后天 report", &now()).unwrap();
        assert_eq!(parsed.matcher, "zh");
        assert_eq!(parsed.matched_text(), "后天");
        assert_eq!(parsed.clean_text, "tomorrow report");
    }

    #[test]
    fn test_english_fallback() {
        let parsed = extract_at("call mom tomorrow at 3pm", &now()).unwrap();
        assert_eq!(parsed.matcher, "en");
        assert_eq!(parsed.clean_text, "call mom");
        let expected = now().timezone().with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap();
        assert_eq!(parsed.date, expected.with_timezone(&Utc));
    }

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(extract_at("", &now()), None);
        assert_eq!(extract_at("   ", &now()), None);
        assert_eq!(extract_at("buy milk", &now()), None);
    }

    #[test]
    fn test_custom_matcher_list() {
        let only_en: [&dyn PhraseMatcher; 1] = [&EnglishMatcher];
        assert!(extract_with(&only_en, "明天", &now()).is_none());
        assert!(extract_with(&[], "tomorrow", &now()).is_none());
    }
}
