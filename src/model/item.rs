// File: ./src/model/item.rs
use chrono::{DateTime, Local, NaiveDate, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

pub const DEFAULT_NOTE_COLOR: &str = "bg-yellow-200/80";

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Where a calendar entry came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    /// Created from a to-do (typed with a date, or dropped on a day).
    Todo,
    /// Created directly on the calendar.
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn new(text: impl Into<String>, due_date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            done: false,
            due_date,
        }
    }

    /// "Oct 18, 15:00" in local time, as shown under the title.
    pub fn due_label(&self) -> Option<String> {
        self.due_date
            .map(|d| d.with_timezone(&Local).format("%b %-d, %H:%M").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            date,
            kind,
        }
    }

    /// Calendar day of the event as seen from `tz`.
    pub fn local_day<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    /// Style class or hex colour, opaque to the core.
    pub color: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(content: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            color: color.into(),
            // Stored as epoch milliseconds.
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}
