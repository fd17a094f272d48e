// File: tests/extractor_en.rs
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use glassflow::model::extract_at;
use glassflow::model::parser::extract_with;

fn zone() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

/// Saturday 2026-10-17 09:30 in UTC-5.
fn now() -> DateTime<FixedOffset> {
    zone().with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap()
}

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    zone()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn test_call_mom_tomorrow() {
    let parsed = extract_at("Call mom tomorrow at 3pm", &now()).unwrap();
    assert_eq!(parsed.date, local(2026, 10, 18, 15, 0));
    assert_eq!(parsed.clean_text, "Call mom");
    assert_eq!(parsed.matcher, "en");
}

#[test]
fn test_case_insensitive() {
    let parsed = extract_at("TOMORROW: submit report", &now()).unwrap();
    assert_eq!(parsed.matched_text(), "TOMORROW");
    assert_eq!(parsed.clean_text, "submit report");
}

#[test]
fn test_next_friday_evening() {
    let parsed = extract_at("party next friday evening", &now()).unwrap();
    assert_eq!(parsed.date, local(2026, 10, 23, 20, 0));
    assert_eq!(parsed.clean_text, "party");
}

#[test]
fn test_month_name_with_year() {
    let parsed = extract_at("Taxes due April 15th, 2027", &now()).unwrap();
    assert_eq!(parsed.date, local(2027, 4, 15, 12, 0));
    assert_eq!(parsed.clean_text, "Taxes due");
}

#[test]
fn test_relative_offsets() {
    assert_eq!(
        extract_at("water plants in 3 days", &now()).unwrap().date,
        local(2026, 10, 20, 9, 30)
    );
    assert_eq!(
        extract_at("check oven in 20 minutes", &now()).unwrap().date,
        local(2026, 10, 17, 9, 50)
    );
}

#[test]
fn test_midnight_and_noon() {
    assert_eq!(
        extract_at("deploy tomorrow midnight", &now()).unwrap().date,
        local(2026, 10, 18, 0, 0)
    );
    assert_eq!(
        extract_at("lunch at noon", &now()).unwrap().date,
        local(2026, 10, 17, 12, 0)
    );
}

#[test]
fn test_mixed_script_chinese_first() {
    // The English word comes first in the text but the Chinese grammar runs first.
    let parsed = extract_at("tomorrow 记得 下午4点 开会", &now()).unwrap();
    assert_eq!(parsed.matcher, "zh");
    assert_eq!(parsed.date, local(2026, 10, 17, 16, 0));
    assert_eq!(parsed.clean_text, "tomorrow 记得 开会");
}

#[test]
fn test_english_when_no_chinese_phrase() {
    let parsed = extract_at("开会 tomorrow 3pm", &now()).unwrap();
    assert_eq!(parsed.matcher, "en");
    assert_eq!(parsed.clean_text, "开会");
}

#[test]
fn test_english_phrase_inside_chinese_text() {
    let parsed = extract_at("开会tomorrow到", &now()).unwrap();
    assert_eq!(parsed.matcher, "en");
    assert_eq!(parsed.matched_text(), "tomorrow");
    assert_eq!(parsed.clean_text, "开会到");
}

#[test]
fn test_no_date_phrases() {
    for text in ["buy milk", "read chapter 3", "meet the team", "call sun wei", "fix bug #12"] {
        assert!(extract_at(text, &now()).is_none(), "{text}");
    }
}

#[test]
fn test_empty_matcher_list_finds_nothing() {
    assert!(extract_with(&[], "tomorrow", &now()).is_none());
}
