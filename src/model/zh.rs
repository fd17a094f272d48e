// File: ./src/model/zh.rs
//! Chinese date phrases: 明天下午3点, 下周五, 10月18日, 三天后, 今晚八点半.
use crate::model::matcher::{
    Anchor, Clock, DayPeriod, PhraseMatch, PhraseMatcher, compose, full_year, noon, shift_days,
    shift_months, upcoming_weekday, weekday_in_week,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

pub struct ChineseMatcher;

impl PhraseMatcher for ChineseMatcher {
    fn name(&self) -> &'static str {
        "zh"
    }

    fn try_match(&self, text: &str, now: NaiveDateTime) -> Option<PhraseMatch> {
        let s = Scanner::new(text);
        (0..s.len()).find_map(|i| {
            phrase_at(&s, i, now).map(|(end, when)| PhraseMatch {
                start: s.byte(i),
                end: s.byte(end),
                when,
            })
        })
    }
}

// --- WORD TABLES ---

const RELATIVE_DAYS: &[(&str, (i64, Option<DayPeriod>))] = &[
    ("今天", (0, None)),
    ("今日", (0, None)),
    ("明天", (1, None)),
    ("明日", (1, None)),
    ("后天", (2, None)),
    ("後天", (2, None)),
    ("大后天", (3, None)),
    ("大後天", (3, None)),
    ("昨天", (-1, None)),
    ("昨日", (-1, None)),
    ("前天", (-2, None)),
    ("大前天", (-3, None)),
    ("今早", (0, Some(DayPeriod::Morning))),
    ("今晚", (0, Some(DayPeriod::Night))),
    ("今夜", (0, Some(DayPeriod::Night))),
    ("明早", (1, Some(DayPeriod::Morning))),
    ("明晚", (1, Some(DayPeriod::Night))),
    ("昨晚", (-1, Some(DayPeriod::Night))),
];

const PERIODS: &[(&str, DayPeriod)] = &[
    ("凌晨", DayPeriod::SmallHours),
    ("早上", DayPeriod::Morning),
    ("早晨", DayPeriod::Morning),
    ("清晨", DayPeriod::Morning),
    ("上午", DayPeriod::Forenoon),
    ("中午", DayPeriod::Noon),
    ("下午", DayPeriod::Afternoon),
    ("午后", DayPeriod::Afternoon),
    ("傍晚", DayPeriod::Dusk),
    ("晚上", DayPeriod::Night),
    ("夜里", DayPeriod::Night),
    ("夜裡", DayPeriod::Night),
    ("夜间", DayPeriod::Night),
];

const WEEK_PREFIXES: &[(&str, i64)] = &[
    ("本", 0),
    ("这", 0),
    ("這", 0),
    ("这个", 0),
    ("下", 1),
    ("下个", 1),
    ("下個", 1),
    ("上", -1),
    ("上个", -1),
    ("上個", -1),
];

const WEEK_WORDS: &[(&str, ())] = &[
    ("周", ()),
    ("週", ()),
    ("星期", ()),
    ("礼拜", ()),
    ("禮拜", ()),
];

const MONTH_PREFIXES: &[(&str, i64)] = &[
    ("本月", 0),
    ("这个月", 0),
    ("這個月", 0),
    ("下月", 1),
    ("下个月", 1),
    ("下個月", 1),
    ("上月", -1),
    ("上个月", -1),
    ("上個月", -1),
];

#[derive(Debug, Clone, Copy)]
enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

const OFFSET_UNITS: &[(&str, Unit)] = &[
    ("分", Unit::Minute),
    ("分钟", Unit::Minute),
    ("分鐘", Unit::Minute),
    ("小时", Unit::Hour),
    ("小時", Unit::Hour),
    ("钟头", Unit::Hour),
    ("鐘頭", Unit::Hour),
    ("天", Unit::Day),
    ("日", Unit::Day),
    ("周", Unit::Week),
    ("週", Unit::Week),
    ("星期", Unit::Week),
    ("礼拜", Unit::Week),
    ("月", Unit::Month),
];

const AFTER_WORDS: &[(&str, ())] = &[
    ("后", ()),
    ("後", ()),
    ("以后", ()),
    ("以後", ()),
    ("之后", ()),
    ("之後", ()),
];

const HOUR_MARKS: &[(&str, ())] = &[("点", ()), ("點", ()), ("时", ()), ("時", ())];

const MINUTE_WORDS: &[(&str, u32)] = &[("半", 30), ("一刻", 15), ("三刻", 45)];

const DAY_SUFFIXES: &[(&str, ())] = &[("日", ()), ("号", ()), ("號", ())];

fn weekday_from_char(c: char) -> Option<Weekday> {
    match c {
        '一' => Some(Weekday::Mon),
        '二' => Some(Weekday::Tue),
        '三' => Some(Weekday::Wed),
        '四' => Some(Weekday::Thu),
        '五' => Some(Weekday::Fri),
        '六' => Some(Weekday::Sat),
        '日' | '天' | '七' => Some(Weekday::Sun),
        _ => None,
    }
}

fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

/// 十 is reported as 10; everything else as its digit.
fn numeral_value(c: char) -> Option<u32> {
    match c {
        '零' | '〇' => Some(0),
        '一' => Some(1),
        '二' | '两' | '兩' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        '十' => Some(10),
        _ => None,
    }
}

/// 三 → 3, 十二 → 12, 二十 → 20, 二十五 → 25, 二零二六 → 2026.
fn fold_numerals(run: &[u32]) -> Option<u32> {
    match run.iter().position(|&v| v == 10) {
        None => run
            .iter()
            .try_fold(0u32, |acc, &v| acc.checked_mul(10)?.checked_add(v)),
        Some(p) => {
            let tens = match &run[..p] {
                [] => 1,
                [t] => *t,
                _ => return None,
            };
            let units = match &run[p + 1..] {
                [] => 0,
                [u] => *u,
                _ => return None,
            };
            if tens == 10 || units == 10 {
                return None;
            }
            Some(tens * 10 + units)
        }
    }
}

// --- SCANNER ---

struct Scanner<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().collect(),
        }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn byte(&self, i: usize) -> usize {
        self.chars.get(i).map_or(self.text.len(), |(b, _)| *b)
    }

    fn at(&self, i: usize) -> Option<char> {
        self.chars.get(i).map(|(_, c)| *c)
    }

    fn lit(&self, i: usize, word: &str) -> Option<usize> {
        let mut j = i;
        for c in word.chars() {
            if self.at(j)? != c {
                return None;
            }
            j += 1;
        }
        Some(j)
    }

    /// Longest table entry starting at `i`.
    fn longest<T: Copy>(&self, i: usize, table: &[(&str, T)]) -> Option<(T, usize)> {
        table
            .iter()
            .filter_map(|(w, v)| self.lit(i, w).map(|e| (*v, e)))
            .max_by_key(|(_, e)| *e)
    }

    fn skip_spaces(&self, mut i: usize) -> usize {
        while self.at(i).is_some_and(char::is_whitespace) {
            i += 1;
        }
        i
    }

    /// Arabic (half or full width) or Chinese numerals. Never starts in the
    /// middle of a number.
    fn number(&self, i: usize) -> Option<(u32, usize)> {
        let first = self.at(i)?;
        let prev = i.checked_sub(1).and_then(|p| self.at(p));

        if digit_value(first).is_some() {
            if prev.and_then(digit_value).is_some() {
                return None;
            }
            let mut j = i;
            let mut value = 0u32;
            while let Some(v) = self.at(j).and_then(digit_value) {
                if j - i == 4 {
                    return None;
                }
                value = value * 10 + v;
                j += 1;
            }
            return Some((value, j));
        }

        if numeral_value(first).is_some() {
            if prev.and_then(numeral_value).is_some() {
                return None;
            }
            let mut run = Vec::new();
            let mut j = i;
            while let Some(v) = self.at(j).and_then(numeral_value) {
                run.push(v);
                j += 1;
            }
            if run.len() > 4 {
                return None;
            }
            return fold_numerals(&run).map(|v| (v, j));
        }
        None
    }
}

// --- PHRASE PARTS ---

fn phrase_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(usize, NaiveDateTime)> {
    let mut end = i;
    let mut cursor = i;
    let mut date = now.date();
    let mut implied = now.time();
    let mut period = None;
    let mut anchored = false;

    if let Some((anchor, e)) = anchor_at(s, i, now) {
        match anchor {
            Anchor::Instant(dt) => return Some((e, dt)),
            Anchor::Day {
                date: d,
                implied: t,
                period: p,
            } => {
                date = d;
                implied = t;
                period = p;
                anchored = true;
                end = e;
                cursor = s.skip_spaces(e);
            }
        }
    }

    if period.is_none()
        && let Some((p, e)) = s.longest(cursor, PERIODS)
    {
        period = Some(p);
        end = e;
        cursor = s.skip_spaces(e);
    }

    // A bare "15:30" is left to the general grammar unless a Chinese word came first.
    let allow_colon = anchored || period.is_some();
    let mut clock = None;
    if let Some((c, e)) = clock_at(s, cursor, allow_colon) {
        clock = Some(c);
        end = e;
    }

    if end == i {
        return None;
    }
    compose(date, implied, period, clock).map(|dt| (end, dt))
}

fn anchor_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    offset_at(s, i, now)
        .or_else(|| relative_day_at(s, i, now))
        .or_else(|| month_at(s, i, now))
        .or_else(|| weekday_at(s, i, now))
        .or_else(|| explicit_date_at(s, i, now))
}

fn relative_day_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    let ((days, period), end) = s.longest(i, RELATIVE_DAYS)?;
    let date = shift_days(now.date(), days)?;
    Some((
        Anchor::Day {
            date,
            implied: now.time(),
            period,
        },
        end,
    ))
}

/// 三天后, 两个小时以后, 半小时后, 2周之后.
fn offset_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    let (amount, j) = match s.lit(i, "半") {
        Some(e) => (None, e),
        None => {
            let (n, e) = s.number(i)?;
            (Some(i64::from(n)), e)
        }
    };
    let j = s.lit(j, "个").or_else(|| s.lit(j, "個")).unwrap_or(j);
    let (unit, j) = s.longest(j, OFFSET_UNITS)?;
    let (_, end) = s.longest(j, AFTER_WORDS)?;

    let anchor = match (unit, amount) {
        (Unit::Hour, None) => Anchor::Instant(now + Duration::minutes(30)),
        (_, None) => return None,
        (Unit::Minute, Some(n)) => Anchor::Instant(now + Duration::minutes(n)),
        (Unit::Hour, Some(n)) => Anchor::Instant(now + Duration::hours(n)),
        (Unit::Day, Some(n)) => day_anchor(shift_days(now.date(), n)?, now),
        (Unit::Week, Some(n)) => day_anchor(shift_days(now.date(), n * 7)?, now),
        (Unit::Month, Some(n)) => day_anchor(shift_months(now.date(), n)?, now),
    };
    Some((anchor, end))
}

fn day_anchor(date: NaiveDate, now: NaiveDateTime) -> Anchor {
    Anchor::Day {
        date,
        implied: now.time(),
        period: None,
    }
}

/// 下个月, 下个月5号, 本月20日.
fn month_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    let (offset, j) = s.longest(i, MONTH_PREFIXES)?;
    let base = shift_months(now.date(), offset)?;
    if let Some((day, e)) = s.number(j)
        && let Some((_, end)) = s.longest(e, DAY_SUFFIXES)
    {
        let date = base.with_day(day)?;
        return Some((
            Anchor::Day {
                date,
                implied: noon(),
                period: None,
            },
            end,
        ));
    }
    if offset == 0 {
        return None;
    }
    Some((day_anchor(base, now), j))
}

/// 周五, 下周一, 上个星期天, 下周.
fn weekday_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    let today = now.date();
    let (offset, j) = match s.longest(i, WEEK_PREFIXES) {
        Some((o, e)) => (Some(o), e),
        None => (None, i),
    };
    let (_, j) = s.longest(j, WEEK_WORDS)?;

    if let Some(day) = s.at(j).and_then(weekday_from_char) {
        let date = match offset {
            Some(o) => weekday_in_week(today, day, o)?,
            None => upcoming_weekday(today, day, true)?,
        };
        return Some((
            Anchor::Day {
                date,
                implied: noon(),
                period: None,
            },
            j + 1,
        ));
    }

    match offset {
        Some(o) if o != 0 => Some((day_anchor(shift_days(today, o * 7)?, now), j)),
        _ => None,
    }
}

/// 2026年10月18日, 10月18号, 十月十八. A day number needs its month.
fn explicit_date_at(s: &Scanner, i: usize, now: NaiveDateTime) -> Option<(Anchor, usize)> {
    // Never restart inside "2026年10月".
    if i > 0 && matches!(s.at(i - 1), Some('月' | '年')) {
        return None;
    }
    let (mut n, mut j) = s.number(i)?;
    let mut year = now.date().year();

    if let Some(e) = s.lit(j, "年") {
        year = full_year(n);
        (n, j) = s.number(e)?;
    }

    let e = s.lit(j, "月")?;
    let (day, e) = s.number(e)?;
    let end = s.longest(e, DAY_SUFFIXES).map_or(e, |(_, end)| end);
    let date = NaiveDate::from_ymd_opt(year, n, day)?;

    Some((
        Anchor::Day {
            date,
            implied: noon(),
            period: None,
        },
        end,
    ))
}

/// 3点, 三点半, 10点15分, 八点一刻, 9点钟, and 15:30 / 15：30 when allowed.
fn clock_at(s: &Scanner, i: usize, allow_colon: bool) -> Option<(Clock, usize)> {
    let (hour, j) = s.number(i)?;

    if let Some((_, e)) = s.longest(j, HOUR_MARKS) {
        if let Some(end) = s.lit(e, "钟").or_else(|| s.lit(e, "鐘")) {
            return Some((Clock::new(hour, 0)?, end));
        }
        if let Some((minute, end)) = s.longest(e, MINUTE_WORDS) {
            return Some((Clock::new(hour, minute)?, end));
        }
        if let Some((minute, e2)) = s.number(e) {
            let end = s.lit(e2, "分").unwrap_or(e2);
            return Some((Clock::new(hour, minute)?, end));
        }
        return Some((Clock::new(hour, 0)?, e));
    }

    if !allow_colon {
        return None;
    }
    let e = s.lit(j, ":").or_else(|| s.lit(j, "："))?;
    let (minute, end) = s.number(e)?;
    if end - e != 2 {
        return None;
    }
    Some((Clock::new(hour, minute)?, end))
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
        ChineseMatcher
            .try_match(text, now())
            .map(|m| (m.text(text).to_string(), m.when))
    }

    #[test]
    fn test_numerals() {
        assert_eq!(fold_numerals(&[3]), Some(3));
        assert_eq!(fold_numerals(&[10, 2]), Some(12));
        assert_eq!(fold_numerals(&[2, 10]), Some(20));
        assert_eq!(fold_numerals(&[2, 10, 5]), Some(25));
        assert_eq!(fold_numerals(&[2, 0, 2, 6]), Some(2026));
        assert_eq!(fold_numerals(&[10, 10]), None);
    }

    #[test]
    fn test_tomorrow_afternoon_three() {
        assert_eq!(
            hit("明天下午3点开会"),
            Some(("明天下午3点".to_string(), at(2026, 10, 18, 15, 0)))
        );
    }

    #[test]
    fn test_relative_day_keeps_current_time() {
        assert_eq!(
            hit("后天交报告"),
            Some(("后天".to_string(), at(2026, 10, 19, 9, 30)))
        );
    }

    #[test]
    fn test_fused_evening() {
        assert_eq!(
            hit("今晚八点半看电影"),
            Some(("今晚八点半".to_string(), at(2026, 10, 17, 20, 30)))
        );
    }

    #[test]
    fn test_next_week_friday() {
        assert_eq!(
            hit("下周五提交"),
            Some(("下周五".to_string(), at(2026, 10, 23, 12, 0)))
        );
    }

    #[test]
    fn test_bare_weekday_is_upcoming() {
        // Saturday itself counts; Friday already passed this week.
        assert_eq!(hit("星期六").map(|h| h.1), Some(at(2026, 10, 17, 12, 0)));
        assert_eq!(hit("周五").map(|h| h.1), Some(at(2026, 10, 23, 12, 0)));
    }

    #[test]
    fn test_explicit_dates() {
        assert_eq!(
            hit("10月20日 交房租").map(|h| h.1),
            Some(at(2026, 10, 20, 12, 0))
        );
        assert_eq!(
            hit("2027年1月5号上午10点").map(|h| h.1),
            Some(at(2027, 1, 5, 10, 0))
        );
        assert_eq!(hit("十二月二十五日").map(|h| h.1), Some(at(2026, 12, 25, 12, 0)));
        assert_eq!(hit("25号还信用卡"), None);
        assert_eq!(hit("坐5号线去公司"), None);
        assert_eq!(hit("三日游攻略"), None);
    }

    #[test]
    fn test_invalid_date_is_skipped() {
        assert_eq!(hit("2月30日"), None);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(hit("三天后").map(|h| h.1), Some(at(2026, 10, 20, 9, 30)));
        assert_eq!(hit("半小时后提醒我").map(|h| h.1), Some(at(2026, 10, 17, 10, 0)));
        assert_eq!(hit("2个小时以后").map(|h| h.1), Some(at(2026, 10, 17, 11, 30)));
    }

    #[test]
    fn test_clock_forms() {
        assert_eq!(hit("10点15分开会").map(|h| h.1), Some(at(2026, 10, 17, 10, 15)));
        assert_eq!(hit("八点一刻").map(|h| h.1), Some(at(2026, 10, 17, 8, 15)));
        assert_eq!(hit("明天 15:30").map(|h| h.1), Some(at(2026, 10, 18, 15, 30)));
    }

    #[test]
    fn test_bare_colon_clock_is_not_chinese() {
        assert_eq!(hit("call at 15:30"), None);
    }

    #[test]
    fn test_no_phrase() {
        assert_eq!(hit("买牛奶"), None);
        assert_eq!(hit("buy milk"), None);
    }

    #[test]
    fn test_numbers_are_not_split() {
        assert_eq!(hit("房间1234点"), None);
    }
}
