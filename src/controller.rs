// File: src/controller.rs
//! What the widgets do with user input before it reaches the store.
//! Every UI layer goes through these helpers so typed input and drag/drop
//! behave the same everywhere.
use crate::config::Config;
use crate::context::AppContext;
use crate::model::parser::{self, ParsedDate};
use crate::model::{CalendarEvent, extract_at};
use crate::storage::LocalStorage;
use crate::store::TaskStore;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

/// Loads the state file (or starts from the config defaults) and returns a
/// store that saves itself after every change.
pub fn open_store(ctx: &dyn AppContext, config: &Config) -> Result<TaskStore> {
    let storage = LocalStorage::new(ctx)?;
    let state = match storage.load()? {
        Some(state) => state,
        None => {
            log::info!("No state file at {}, starting fresh", storage.path().display());
            config.initial_state()
        }
    };
    Ok(TaskStore::from_state(state)
        .with_note_color(config.default_note_color.clone())
        .with_persistence(storage))
}

/// The due date the input field shows while the user is typing.
pub fn preview(input: &str) -> Option<ParsedDate> {
    parser::extract(input)
}

pub fn submit_todo(store: &mut TaskStore, input: &str) -> Option<String> {
    submit_todo_at(store, input, &Local::now())
}

/// Runs the extractor and adds the to-do. Blank input adds nothing.
///
/// On a hit the phrase is cut from the title; if nothing is left the whole
/// input becomes the title. Returns the new to-do id.
pub fn submit_todo_at<Tz: TimeZone>(
    store: &mut TaskStore,
    input: &str,
    now: &DateTime<Tz>,
) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let id = match extract_at(input, now) {
        Some(parsed) => {
            let title = if parsed.clean_text.is_empty() {
                input.to_string()
            } else {
                parsed.clean_text
            };
            store.add_todo(title, Some(parsed.date))
        }
        None => store.add_todo(input, None),
    };
    Some(id)
}

/// A to-do dropped on a calendar cell becomes an event at the start of
/// that day, local time.
pub fn drop_on_day<Tz: TimeZone>(
    store: &mut TaskStore,
    todo_id: &str,
    day: NaiveDate,
    tz: &Tz,
) -> Option<CalendarEvent> {
    let date = parser::localize(tz, day.and_time(NaiveTime::MIN))?;
    store.convert_todo_to_event(todo_id, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn cst() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut store = TaskStore::new();
        let now = cst().with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        assert_eq!(submit_todo_at(&mut store, "   ", &now), None);
        assert!(store.state().todos.is_empty());
    }

    #[test]
    fn test_phrase_only_keeps_input_as_title() {
        let mut store = TaskStore::new();
        let now = cst().with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let id = submit_todo_at(&mut store, "明天", &now).unwrap();
        let todo = store.get_todo(&id).unwrap();
        assert_eq!(todo.text, "明天");
        assert!(todo.due_date.is_some());
        assert_eq!(store.state().events[0].title, "明天");
    }

    #[test]
    fn test_drop_uses_local_midnight() {
        let mut store = TaskStore::new();
        let id = store.add_todo("plan trip", None);
        let day = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let event = drop_on_day(&mut store, &id, day, &cst()).unwrap();
        assert_eq!(event.date, Utc.with_ymd_and_hms(2026, 10, 19, 16, 0, 0).unwrap());
        assert_eq!(event.local_day(&cst()), day);
        assert!(drop_on_day(&mut store, "nope", day, &cst()).is_none());
    }
}
