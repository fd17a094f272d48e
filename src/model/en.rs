// File: ./src/model/en.rs
//! General / English date phrases: tomorrow at 3pm, next friday, in 2 days,
//! Jan 16th, 2026-01-16, 3pm tomorrow.
use crate::model::matcher::{
    Anchor, Clock, DayPeriod, PhraseMatch, PhraseMatcher, compose, full_year, noon,
    previous_weekday, shift_days, shift_months, upcoming_weekday, weekday_in_week,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

pub struct EnglishMatcher;

impl PhraseMatcher for EnglishMatcher {
    fn name(&self) -> &'static str {
        "en"
    }

    fn try_match(&self, text: &str, now: NaiveDateTime) -> Option<PhraseMatch> {
        let tokens = tokenize(text);
        (0..tokens.len()).find_map(|i| {
            phrase_at(&tokens, i, now).map(|(end, when)| PhraseMatch {
                start: tokens[i].start,
                end: tokens[end - 1].end,
                when,
            })
        })
    }
}

#[derive(Debug)]
struct Token {
    start: usize,
    end: usize,
    word: String,
}

/// Splits on anything that is not ASCII alphanumeric or one of `: / - '`.
/// CJK text therefore acts as a separator. The joiners only count inside a
/// token ("10:30", "o'clock"), never at its edges ("tomorrow:").
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut push = |s: usize, e: usize| {
        let raw = &text[s..e];
        let trimmed = raw.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if trimmed.is_empty() {
            return;
        }
        let s = s + (raw.len() - raw.trim_start_matches(|c: char| !c.is_ascii_alphanumeric()).len());
        tokens.push(Token {
            start: s,
            end: s + trimmed.len(),
            word: trimmed.to_ascii_lowercase(),
        })
    };
    for (idx, c) in text.char_indices() {
        let is_word = c.is_ascii_alphanumeric() || matches!(c, ':' | '/' | '-' | '\'');
        match (is_word, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                push(s, idx);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        push(s, text.len());
    }
    tokens
}

fn word(t: &[Token], i: usize) -> Option<&str> {
    t.get(i).map(|tok| tok.word.as_str())
}

fn phrase_at(t: &[Token], i: usize, now: NaiveDateTime) -> Option<(usize, NaiveDateTime)> {
    // 1. Date first ("tomorrow at 3pm", "next friday evening")
    if let Some((anchor, j)) = date_at(t, i, now) {
        let (date, implied, mut period) = match anchor {
            Anchor::Instant(dt) => return Some((j, dt)),
            Anchor::Day {
                date,
                implied,
                period,
            } => (date, implied, period),
        };
        let mut end = j;
        if period.is_none()
            && let Some((p, e)) = period_at(t, end)
        {
            period = Some(p);
            end = e;
        }
        let mut clock = None;
        if let Some((c, e)) = time_at(t, end) {
            clock = Some(c);
            end = e;
        }
        return compose(date, implied, period, clock).map(|dt| (end, dt));
    }

    // 2. Time first ("3pm tomorrow", "at 5 on friday", "noon")
    let (clock, j) = time_at(t, i)?;
    let mut end = j;
    let mut date = now.date();
    let mut period = None;
    if let Some((
        Anchor::Day {
            date: d, period: p, ..
        },
        e,
    )) = date_at(t, end, now)
    {
        date = d;
        period = p;
        end = e;
    }
    compose(date, now.time(), period, Some(clock)).map(|dt| (end, dt))
}

// --- DATES ---

fn date_at(t: &[Token], i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    if word(t, i)? == "on" {
        return date_core(t, i + 1, now);
    }
    date_core(t, i, now)
}

fn date_core(t: &[Token], i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    let today = now.date();
    let w = word(t, i)?;
    let relative = |days: i64, period: Option<DayPeriod>, end: usize| {
        Some((
            Anchor::Day {
                date: shift_days(today, days)?,
                implied: now.time(),
                period,
            },
            end,
        ))
    };
    let at_noon = |date: NaiveDate, end: usize| {
        Some((
            Anchor::Day {
                date,
                implied: noon(),
                period: None,
            },
            end,
        ))
    };

    match w {
        "today" => return relative(0, None, i + 1),
        "tonight" => return relative(0, Some(DayPeriod::Night), i + 1),
        "tomorrow" | "tmr" | "tmrw" => return relative(1, None, i + 1),
        "yesterday" => return relative(-1, None, i + 1),
        "day" if word(t, i + 1) == Some("after") && word(t, i + 2) == Some("tomorrow") => {
            return relative(2, None, i + 3);
        }
        "this" => {
            let next = word(t, i + 1)?;
            if let Some(p) = period_word(next) {
                return relative(0, Some(p), i + 2);
            }
            let day = weekday_name(next, true)?;
            return at_noon(weekday_in_week(today, day, 0)?, i + 2);
        }
        "next" | "last" => {
            let sign = if w == "next" { 1 } else { -1 };
            let next = word(t, i + 1)?;
            if let Some(day) = weekday_name(next, true) {
                let date = if sign > 0 {
                    upcoming_weekday(today, day, false)?
                } else {
                    previous_weekday(today, day)?
                };
                return at_noon(date, i + 2);
            }
            let date = match next {
                "week" => shift_days(today, 7 * sign)?,
                "month" => shift_months(today, sign)?,
                "year" => shift_months(today, 12 * sign)?,
                _ => return None,
            };
            return Some((
                Anchor::Day {
                    date,
                    implied: now.time(),
                    period: None,
                },
                i + 2,
            ));
        }
        "in" => {
            let (amount, unit, consumed) = amount_and_unit(t, i + 1)?;
            return Some((offset(now, amount, unit)?, i + 1 + consumed));
        }
        _ => {}
    }

    // "3 days from now", "two weeks later"
    if let Some((amount, unit, consumed)) = amount_and_unit(t, i) {
        let k = i + consumed;
        let end = match (word(t, k), word(t, k + 1)) {
            (Some("from"), Some("now")) => k + 2,
            (Some("later"), _) => k + 1,
            _ => return None,
        };
        return Some((offset(now, amount, unit)?, end));
    }

    if let Some(day) = weekday_name(w, false) {
        return at_noon(upcoming_weekday(today, day, true)?, i + 1);
    }

    if let Some(date) = parse_numeric_date(w, today.year()) {
        return at_noon(date, i + 1);
    }

    // "Jan 16th [, 2026]"
    if let Some(month) = month_name(w)
        && let Some(day) = word(t, i + 1).and_then(parse_ordinal)
    {
        let (year, end) = trailing_year(t, i + 2).unwrap_or((today.year(), i + 2));
        return at_noon(NaiveDate::from_ymd_opt(year, month, day)?, end);
    }

    // "16 Jan [2026]"
    if let Some(day) = parse_ordinal(w)
        && let Some(month) = word(t, i + 1).and_then(month_name)
    {
        let (year, end) = trailing_year(t, i + 2).unwrap_or((today.year(), i + 2));
        return at_noon(NaiveDate::from_ymd_opt(year, month, day)?, end);
    }

    None
}

fn trailing_year(t: &[Token], i: usize) -> Option<(i32, usize)> {
    let w = word(t, i)?;
    if w.len() == 4 && w.chars().all(|c| c.is_ascii_digit()) {
        return w.parse::<i32>().ok().map(|y| (y, i + 1));
    }
    None
}

/// `2026-01-16`, `1/16`, `1/16/2026`, `1/16/26` (month first).
fn parse_numeric_date(w: &str, current_year: i32) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(w, "%Y-%m-%d") {
        return Some(date);
    }
    let parts: Vec<&str> = w.split('/').collect();
    let num = |s: &str| -> Option<u32> {
        (!s.is_empty() && s.len() <= 4 && s.chars().all(|c| c.is_ascii_digit()))
            .then(|| s.parse::<u32>().ok())
            .flatten()
    };
    match parts.as_slice() {
        [m, d] => NaiveDate::from_ymd_opt(current_year, num(m)?, num(d)?),
        [m, d, y] => NaiveDate::from_ymd_opt(full_year(num(y)?), num(m)?, num(d)?),
        _ => None,
    }
}

fn parse_ordinal(w: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| w.strip_suffix(suffix))
        .unwrap_or(w);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|d| (1..=31).contains(d))
}

fn month_name(w: &str) -> Option<u32> {
    match w {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" | "sept" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

/// Abbreviations ("sun", "sat", "wed") only after on/this/next/last.
fn weekday_name(w: &str, allow_short: bool) -> Option<Weekday> {
    let full = match w {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    };
    if full.is_some() || !allow_short {
        return full;
    }
    match w {
        "mon" => Some(Weekday::Mon),
        "tue" | "tues" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

// --- OFFSETS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

fn parse_unit(s: &str) -> Option<Unit> {
    match s {
        "m" | "min" | "mins" | "minute" | "minutes" => Some(Unit::Minute),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(Unit::Hour),
        "d" | "day" | "days" => Some(Unit::Day),
        "w" | "week" | "weeks" => Some(Unit::Week),
        "mo" | "month" | "months" => Some(Unit::Month),
        "y" | "year" | "years" => Some(Unit::Year),
        _ => None,
    }
}

fn parse_english_number(s: &str) -> Option<u32> {
    match s {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => s.parse::<u32>().ok(),
    }
}

/// "2 days" (two tokens) or "2d" (one token). Returns tokens consumed.
/// Single-letter units are only accepted in the compact form.
fn amount_and_unit(t: &[Token], i: usize) -> Option<(u32, Unit, usize)> {
    let first = word(t, i)?;
    if let Some(amount) = parse_english_number(first)
        && let Some(unit) = word(t, i + 1)
            .filter(|u| u.len() > 1)
            .and_then(parse_unit)
    {
        return Some((amount, unit, 2));
    }
    let idx = first.find(|c: char| !c.is_ascii_digit())?;
    let (amt_str, unit_str) = first.split_at(idx);
    let amount = amt_str.parse::<u32>().ok()?;
    Some((amount, parse_unit(unit_str)?, 1))
}

fn offset(now: NaiveDateTime, amount: u32, unit: Unit) -> Option<Anchor> {
    let n = i64::from(amount);
    let day = |date: NaiveDate| Anchor::Day {
        date,
        implied: now.time(),
        period: None,
    };
    Some(match unit {
        Unit::Minute => Anchor::Instant(now.checked_add_signed(Duration::minutes(n))?),
        Unit::Hour => Anchor::Instant(now.checked_add_signed(Duration::hours(n))?),
        Unit::Day => day(shift_days(now.date(), n)?),
        Unit::Week => day(shift_days(now.date(), n * 7)?),
        Unit::Month => day(shift_months(now.date(), n)?),
        Unit::Year => day(shift_months(now.date(), n * 12)?),
    })
}

// --- TIMES ---

fn period_word(w: &str) -> Option<DayPeriod> {
    match w {
        "morning" => Some(DayPeriod::Morning),
        "afternoon" => Some(DayPeriod::Afternoon),
        "evening" => Some(DayPeriod::Evening),
        "night" => Some(DayPeriod::Night),
        _ => None,
    }
}

fn period_at(t: &[Token], i: usize) -> Option<(DayPeriod, usize)> {
    word(t, i).and_then(period_word).map(|p| (p, i + 1))
}

/// Optional "at", then a clock.
fn time_at(t: &[Token], i: usize) -> Option<(Clock, usize)> {
    if word(t, i)? == "at" {
        return clock_at(t, i + 1, true);
    }
    clock_at(t, i, false)
}

/// Splits "3", "3:30", "3pm", "3:30am" into (hour, minute, meridiem).
fn parse_clock_token(w: &str) -> Option<(u32, u32, Option<bool>, bool)> {
    let (body, meridiem) = if let Some(s) = w.strip_suffix("am") {
        (s, Some(false))
    } else if let Some(s) = w.strip_suffix("pm") {
        (s, Some(true))
    } else {
        (w, None)
    };
    let is_digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit());
    if let Some((h, m)) = body.split_once(':') {
        if !is_digits(h) || m.len() != 2 || !is_digits(m) {
            return None;
        }
        return Some((h.parse().ok()?, m.parse().ok()?, meridiem, true));
    }
    if !is_digits(body) {
        return None;
    }
    Some((body.parse().ok()?, 0, meridiem, false))
}

fn clock_at(t: &[Token], i: usize, after_at: bool) -> Option<(Clock, usize)> {
    let w = word(t, i)?;
    match w {
        "noon" | "midday" => return Some((Clock::new(12, 0)?, i + 1)),
        "midnight" => return Some((Clock::new(0, 0)?, i + 1)),
        _ => {}
    }
    let (hour, minute, meridiem, has_colon) = parse_clock_token(w)?;
    if let Some(is_pm) = meridiem {
        return Some((Clock::meridiem(hour, minute, is_pm)?, i + 1));
    }
    match word(t, i + 1) {
        Some("am") => return Some((Clock::meridiem(hour, minute, false)?, i + 2)),
        Some("pm") => return Some((Clock::meridiem(hour, minute, true)?, i + 2)),
        Some("o'clock") => return Some((Clock::new(hour, minute)?, i + 2)),
        _ => {}
    }
    if has_colon || after_at {
        return Some((Clock::new(hour, minute)?, i + 1));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        // Saturday
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn hit(text: &str) -> Option<(String, NaiveDateTime)> {
        EnglishMatcher
            .try_match(text, now())
            .map(|m| (m.text(text).to_string(), m.when))
    }

    #[test]
    fn test_tomorrow_at_three_pm() {
        assert_eq!(
            hit("call mom tomorrow at 3pm"),
            Some(("tomorrow at 3pm".to_string(), at(2026, 10, 18, 15, 0)))
        );
    }

    #[test]
    fn test_time_before_date() {
        assert_eq!(
            hit("standup 9:15am Monday"),
            Some(("9:15am Monday".to_string(), at(2026, 10, 19, 9, 15)))
        );
        assert_eq!(
            hit("dinner at 7 tonight"),
            Some(("at 7 tonight".to_string(), at(2026, 10, 17, 19, 0)))
        );
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(hit("Today").map(|h| h.1), Some(at(2026, 10, 17, 9, 30)));
        assert_eq!(
            hit("pay rent the day after tomorrow").map(|h| h.0),
            Some("day after tomorrow".to_string())
        );
        assert_eq!(hit("tomorrow evening").map(|h| h.1), Some(at(2026, 10, 18, 20, 0)));
        assert_eq!(hit("this afternoon").map(|h| h.1), Some(at(2026, 10, 17, 15, 0)));
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(hit("on friday").map(|h| h.1), Some(at(2026, 10, 23, 12, 0)));
        assert_eq!(hit("next sat").map(|h| h.1), Some(at(2026, 10, 24, 12, 0)));
        assert_eq!(hit("last monday").map(|h| h.1), Some(at(2026, 10, 12, 12, 0)));
        assert_eq!(hit("enjoy the sun"), None);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(hit("in 2 days").map(|h| h.1), Some(at(2026, 10, 19, 9, 30)));
        assert_eq!(hit("in 45 minutes").map(|h| h.1), Some(at(2026, 10, 17, 10, 15)));
        assert_eq!(hit("in 2w").map(|h| h.1), Some(at(2026, 10, 31, 9, 30)));
        assert_eq!(
            hit("renew two weeks from now").map(|h| h.0),
            Some("two weeks from now".to_string())
        );
        assert_eq!(hit("next month").map(|h| h.1), Some(at(2026, 11, 17, 9, 30)));
    }

    #[test]
    fn test_calendar_dates() {
        assert_eq!(hit("2026-01-16").map(|h| h.1), Some(at(2026, 1, 16, 12, 0)));
        assert_eq!(hit("due 12/25").map(|h| h.1), Some(at(2026, 12, 25, 12, 0)));
        assert_eq!(
            hit("Jan 16th, 2027 at 10:00").map(|h| h.1),
            Some(at(2027, 1, 16, 10, 0))
        );
        assert_eq!(hit("3 March").map(|h| h.1), Some(at(2026, 3, 3, 12, 0)));
    }

    #[test]
    fn test_plain_clock_is_today() {
        assert_eq!(hit("sync at 10").map(|h| h.1), Some(at(2026, 10, 17, 10, 0)));
        assert_eq!(hit("lunch noon").map(|h| h.1), Some(at(2026, 10, 17, 12, 0)));
        assert_eq!(hit("deploy 18:45").map(|h| h.1), Some(at(2026, 10, 17, 18, 45)));
    }

    #[test]
    fn test_no_phrase() {
        assert_eq!(hit("buy milk"), None);
        assert_eq!(hit("I have 2 cats"), None);
        assert_eq!(hit("May the force be with you"), None);
        assert_eq!(hit("look at this"), None);
    }

    #[test]
    fn test_cjk_is_a_separator() {
        assert_eq!(
            hit("开会tomorrow"),
            Some(("tomorrow".to_string(), at(2026, 10, 18, 9, 30)))
        );
    }
}
