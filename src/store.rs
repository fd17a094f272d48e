// File: src/store.rs
use crate::backup::{ExportData, ImportData};
use crate::model::{CalendarEvent, DEFAULT_NOTE_COLOR, EventKind, Note, Todo};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_OPACITY: f32 = 0.6;
pub const DEFAULT_WEATHER_CITY: &str = "厦门市";

fn default_opacity() -> f32 {
    DEFAULT_OPACITY
}

fn default_weather_city() -> String {
    DEFAULT_WEATHER_CITY.to_string()
}

/// Everything the widgets display and the state file holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_weather_city")]
    pub weather_city: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(DEFAULT_OPACITY, DEFAULT_WEATHER_CITY)
    }
}

impl AppState {
    pub fn with_settings(opacity: f32, weather_city: impl Into<String>) -> Self {
        Self {
            todos: Vec::new(),
            events: Vec::new(),
            notes: Vec::new(),
            opacity,
            weather_city: weather_city.into(),
        }
    }
}

/// Receives every committed snapshot. Where it goes is up to the implementor.
pub trait Persist: Send {
    fn save(&self, state: &AppState) -> Result<()>;
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&Arc<AppState>) + Send>;

/// Single-writer container for [`AppState`].
///
/// Every mutation builds a new snapshot, swaps it in, then notifies
/// subscribers and hands the snapshot to the persistence collaborator.
/// Operations on unknown ids return `None` and commit nothing.
pub struct TaskStore {
    state: Arc<AppState>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    persist: Option<Box<dyn Persist>>,
    note_color: String,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// In-memory store with default settings.
    pub fn new() -> Self {
        Self::from_state(AppState::default())
    }

    pub fn from_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            listeners: Vec::new(),
            next_subscription: 1,
            persist: None,
            note_color: DEFAULT_NOTE_COLOR.to_string(),
        }
    }

    pub fn with_persistence(mut self, persist: impl Persist + 'static) -> Self {
        self.persist = Some(Box::new(persist));
        self
    }

    /// Colour given to notes added without one.
    pub fn with_note_color(mut self, color: impl Into<String>) -> Self {
        self.note_color = color.into();
        self
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    // --- Subscriptions ---

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Arc<AppState>) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Applies `f` to a copy of the state. `None` from `f` means nothing
    /// changed: the copy is dropped and nobody is notified.
    fn commit<R>(&mut self, action: &str, f: impl FnOnce(&mut AppState) -> Option<R>) -> Option<R> {
        let mut next = AppState::clone(&self.state);
        let result = f(&mut next)?;
        self.state = Arc::new(next);
        log::debug!("Committed {}", action);

        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state);
        }
        if let Some(persist) = &self.persist
            && let Err(e) = persist.save(&self.state)
        {
            log::warn!("Failed to persist state after {}: {:#}", action, e);
        }
        Some(result)
    }

    // --- Todos ---

    /// Appends a to-do. With a date, a matching `todo` event is appended in
    /// the same commit. Returns the new to-do id.
    pub fn add_todo(&mut self, text: impl Into<String>, due: Option<DateTime<Utc>>) -> String {
        let text = text.into();
        let todo = Todo::new(text.clone(), due);
        let id = todo.id.clone();
        self.commit("add_todo", move |state| {
            if let Some(date) = due {
                state
                    .events
                    .push(CalendarEvent::new(text, date, EventKind::Todo));
            }
            state.todos.push(todo);
            Some(())
        });
        id
    }

    pub fn toggle_todo(&mut self, id: &str) -> Option<Todo> {
        self.commit("toggle_todo", |state| {
            let todo = state.todos.iter_mut().find(|t| t.id == id)?;
            todo.done = !todo.done;
            Some(todo.clone())
        })
    }

    /// Removes the to-do only. Events created from it stay.
    pub fn remove_todo(&mut self, id: &str) -> Option<Todo> {
        self.commit("remove_todo", |state| {
            let idx = state.todos.iter().position(|t| t.id == id)?;
            Some(state.todos.remove(idx))
        })
    }

    /// Sets the to-do's due date and appends a new `todo` event. Repeated
    /// calls keep appending events.
    pub fn convert_todo_to_event(&mut self, id: &str, date: DateTime<Utc>) -> Option<CalendarEvent> {
        self.commit("convert_todo_to_event", |state| {
            let todo = state.todos.iter_mut().find(|t| t.id == id)?;
            todo.due_date = Some(date);
            let event = CalendarEvent::new(todo.text.clone(), date, EventKind::Todo);
            state.events.push(event.clone());
            Some(event)
        })
    }

    pub fn get_todo(&self, id: &str) -> Option<&Todo> {
        self.state.todos.iter().find(|t| t.id == id)
    }

    // --- Events ---

    pub fn add_event(
        &mut self,
        title: impl Into<String>,
        date: DateTime<Utc>,
        kind: EventKind,
    ) -> String {
        let event = CalendarEvent::new(title, date, kind);
        let id = event.id.clone();
        self.commit("add_event", move |state| {
            state.events.push(event);
            Some(())
        });
        id
    }

    // --- Notes ---

    /// `color` falls back to the store's default note colour.
    pub fn add_note(&mut self, content: impl Into<String>, color: Option<&str>) -> String {
        let note = Note::new(content, color.unwrap_or(&self.note_color));
        let id = note.id.clone();
        self.commit("add_note", move |state| {
            state.notes.push(note);
            Some(())
        });
        id
    }

    pub fn update_note(&mut self, id: &str, content: impl Into<String>) -> Option<Note> {
        let content = content.into();
        self.commit("update_note", |state| {
            let note = state.notes.iter_mut().find(|n| n.id == id)?;
            note.content = content;
            Some(note.clone())
        })
    }

    pub fn remove_note(&mut self, id: &str) -> Option<Note> {
        self.commit("remove_note", |state| {
            let idx = state.notes.iter().position(|n| n.id == id)?;
            Some(state.notes.remove(idx))
        })
    }

    // --- Settings ---

    /// Clamped to `0.0..=1.0`. Non-finite values and unchanged values are ignored.
    pub fn set_opacity(&mut self, opacity: f32) -> Option<f32> {
        if !opacity.is_finite() {
            return None;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        self.commit("set_opacity", |state| {
            if state.opacity == opacity {
                return None;
            }
            state.opacity = opacity;
            Some(opacity)
        })
    }

    pub fn set_weather_city(&mut self, city: &str) -> Option<String> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }
        self.commit("set_weather_city", |state| {
            if state.weather_city == city {
                return None;
            }
            state.weather_city = city.to_string();
            Some(state.weather_city.clone())
        })
    }

    // --- Backup ---

    pub fn export_data(&self) -> ExportData {
        log::info!(
            "Exporting {} todos, {} events, {} notes",
            self.state.todos.len(),
            self.state.events.len(),
            self.state.notes.len()
        );
        ExportData::from_state(&self.state, Utc::now())
    }

    /// Parses the whole document first; on error nothing is touched.
    /// Present fields replace the current value wholesale.
    pub fn import_data(&mut self, json: &str) -> Result<()> {
        let data = ImportData::parse(json)?;
        if data.is_empty() {
            log::info!("Import document carries no known fields; nothing to do");
            return Ok(());
        }
        log::info!("Importing backup document");
        self.commit("import_data", |state| {
            data.apply(state);
            Some(())
        });
        Ok(())
    }

    // --- Views ---

    pub fn active_todos(&self) -> Vec<&Todo> {
        self.state.todos.iter().filter(|t| !t.done).collect()
    }

    pub fn completed_todos(&self) -> Vec<&Todo> {
        self.state.todos.iter().filter(|t| t.done).collect()
    }

    /// Events whose local calendar day in `tz` is `day`.
    pub fn events_on<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&CalendarEvent> {
        self.state
            .events
            .iter()
            .filter(|e| e.local_day(tz) == day)
            .collect()
    }

    /// Events from the start of `day` onwards, earliest first.
    pub fn agenda_from<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&CalendarEvent> {
        let mut upcoming: Vec<&CalendarEvent> = self
            .state
            .events
            .iter()
            .filter(|e| e.local_day(tz) >= day)
            .collect();
        upcoming.sort_by_key(|e| e.date);
        upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn date(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap()
    }

    struct Recorder(Arc<Mutex<Vec<usize>>>);

    impl Persist for Recorder {
        fn save(&self, state: &AppState) -> Result<()> {
            self.0.lock().unwrap().push(state.todos.len());
            Ok(())
        }
    }

    struct Broken;

    impl Persist for Broken {
        fn save(&self, _: &AppState) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    #[test]
    fn test_commit_persists_each_mutation() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let mut store = TaskStore::new().with_persistence(Recorder(saved.clone()));
        let id = store.add_todo("a", None);
        store.add_todo("b", None);
        store.toggle_todo(&id);
        store.toggle_todo("missing");
        assert_eq!(*saved.lock().unwrap(), vec![1, 2, 2]);
    }

    #[test]
    fn test_failed_persist_keeps_mutation() {
        let mut store = TaskStore::new().with_persistence(Broken);
        store.add_todo("still here", None);
        assert_eq!(store.state().todos.len(), 1);
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let mut store = TaskStore::new();
        let before = store.snapshot();
        store.add_todo("x", Some(date(18, 7)));
        assert!(before.todos.is_empty());
        assert_eq!(store.snapshot().events.len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Arc::new(Mutex::new(0));
        let mut store = TaskStore::new();
        let h = hits.clone();
        let sub = store.subscribe(move |_| *h.lock().unwrap() += 1);
        store.add_todo("one", None);
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.add_todo("two", None);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_settings() {
        let mut store = TaskStore::new();
        assert_eq!(store.set_opacity(1.7), Some(1.0));
        assert_eq!(store.set_opacity(1.0), None);
        assert_eq!(store.set_opacity(f32::NAN), None);
        assert_eq!(store.set_weather_city("  "), None);
        assert_eq!(store.set_weather_city("北京市"), Some("北京市".to_string()));
        assert_eq!(store.set_weather_city("北京市"), None);
    }

    #[test]
    fn test_note_default_color() {
        let mut store = TaskStore::new().with_note_color("bg-blue-200/80");
        let a = store.add_note("plain", None);
        let b = store.add_note("red", Some("#ff0000"));
        let notes = &store.state().notes;
        assert_eq!(notes[0].id, a);
        assert_eq!(notes[0].color, "bg-blue-200/80");
        assert_eq!(notes[1].id, b);
        assert_eq!(notes[1].color, "#ff0000");
    }

    #[test]
    fn test_agenda_sorted_with_stable_ties() {
        let mut store = TaskStore::new();
        store.add_event("late", date(20, 9), EventKind::Event);
        store.add_event("past", date(10, 9), EventKind::Event);
        store.add_event("tie-a", date(19, 9), EventKind::Event);
        store.add_event("tie-b", date(19, 9), EventKind::Todo);
        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let titles: Vec<_> = store
            .agenda_from(day, &Utc)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["tie-a", "tie-b", "late"]);
    }
}
