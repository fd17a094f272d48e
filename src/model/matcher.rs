// File: ./src/model/matcher.rs
//! Phrase matcher contract shared by the date grammars, plus the calendar
//! arithmetic both grammars resolve through.
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// A date/time phrase found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    /// Byte offset of the first matched character.
    pub start: usize,
    /// Byte offset one past the last matched character.
    pub end: usize,
    /// Resolved wall-clock time, in the same zone as the `now` it was resolved against.
    pub when: NaiveDateTime,
}

impl PhraseMatch {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// One family of date expressions.
///
/// Implementations scan the whole text and report the leftmost phrase they
/// recognise, resolved against the wall-clock `now`.
pub trait PhraseMatcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_match(&self, text: &str, now: NaiveDateTime) -> Option<PhraseMatch>;
}

// --- TIME OF DAY ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    /// 凌晨
    SmallHours,
    /// 早上, morning
    Morning,
    /// 上午
    Forenoon,
    /// 中午, noon
    Noon,
    /// 下午, afternoon
    Afternoon,
    /// 傍晚
    Dusk,
    /// evening
    Evening,
    /// 晚上, tonight, night
    Night,
}

impl DayPeriod {
    /// Hour used when the period is given without a clock time.
    pub fn anchor_hour(self) -> u32 {
        match self {
            DayPeriod::SmallHours => 0,
            DayPeriod::Morning => 6,
            DayPeriod::Forenoon => 9,
            DayPeriod::Noon => 12,
            DayPeriod::Afternoon => 15,
            DayPeriod::Dusk => 18,
            DayPeriod::Evening => 20,
            DayPeriod::Night => 22,
        }
    }

    /// Maps a 12h-style hour into this period. Returns (hour, extra days).
    fn place(self, hour: u32) -> (u32, i64) {
        match self {
            DayPeriod::SmallHours | DayPeriod::Morning | DayPeriod::Forenoon => {
                if hour == 12 {
                    (0, 0)
                } else {
                    (hour, 0)
                }
            }
            DayPeriod::Noon => {
                if hour < 11 {
                    (hour + 12, 0)
                } else {
                    (hour, 0)
                }
            }
            DayPeriod::Afternoon | DayPeriod::Dusk => {
                if hour < 12 {
                    (hour + 12, 0)
                } else {
                    (hour, 0)
                }
            }
            DayPeriod::Evening | DayPeriod::Night => {
                if hour == 12 {
                    (0, 1)
                } else if hour < 12 {
                    (hour + 12, 0)
                } else {
                    (hour, 0)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub hour: u32,
    pub minute: u32,
}

impl Clock {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(Self { hour, minute })
    }

    /// 12h clock with an explicit meridiem.
    pub fn meridiem(hour: u32, minute: u32, is_pm: bool) -> Option<Self> {
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        let h_24 = if hour == 12 {
            if is_pm { 12 } else { 0 }
        } else if is_pm {
            hour + 12
        } else {
            hour
        };
        Self::new(h_24, minute)
    }
}

/// Where a phrase pinned the calendar before any clock time is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Day {
        date: NaiveDate,
        /// Time used when neither a period nor a clock follows.
        implied: NaiveTime,
        period: Option<DayPeriod>,
    },
    /// Already a full instant ("in 20 minutes"); nothing may follow.
    Instant(NaiveDateTime),
}

pub fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Combines a calendar day with an optional period and clock time.
pub fn compose(
    date: NaiveDate,
    implied: NaiveTime,
    period: Option<DayPeriod>,
    clock: Option<Clock>,
) -> Option<NaiveDateTime> {
    match (period, clock) {
        (None, None) => Some(date.and_time(implied)),
        (Some(p), None) => date.and_hms_opt(p.anchor_hour(), 0, 0),
        (None, Some(c)) => date.and_hms_opt(c.hour, c.minute, 0),
        (Some(p), Some(c)) => {
            let (hour, shift) = p.place(c.hour);
            let day = date.checked_add_signed(Duration::days(shift))?;
            day.and_hms_opt(hour, c.minute, 0)
        }
    }
}

// --- CALENDAR ARITHMETIC ---

pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// Month arithmetic clamps to the last valid day (Jan 31 + 1 month = Feb 28/29).
pub fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let n = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(n)
    } else {
        date.checked_sub_months(n)
    }
}

/// Day `target` of the Monday-based week `week_offset` weeks away from `today`'s.
pub fn weekday_in_week(today: NaiveDate, target: Weekday, week_offset: i64) -> Option<NaiveDate> {
    let monday = shift_days(today, -i64::from(today.weekday().num_days_from_monday()))?;
    shift_days(
        monday,
        week_offset * 7 + i64::from(target.num_days_from_monday()),
    )
}

/// Nearest `target` on or after `today` (`include_today`) or strictly after it.
pub fn upcoming_weekday(today: NaiveDate, target: Weekday, include_today: bool) -> Option<NaiveDate> {
    let mut d = if include_today {
        today
    } else {
        shift_days(today, 1)?
    };
    while d.weekday() != target {
        d = shift_days(d, 1)?;
    }
    Some(d)
}

/// Nearest `target` strictly before `today`.
pub fn previous_weekday(today: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let mut d = shift_days(today, -1)?;
    while d.weekday() != target {
        d = shift_days(d, -1)?;
    }
    Some(d)
}

/// Two-digit years are read as 20xx.
pub fn full_year(year: u32) -> i32 {
    if year < 100 {
        2000 + year as i32
    } else {
        year as i32
    }
}
