// File: src/backup.rs
//! Backup documents: what "Export" writes and what "Import" accepts.
use crate::model::{CalendarEvent, Note, Todo};
use crate::storage::LocalStorage;
use crate::store::AppState;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const EXPORT_VERSION: &str = "1.0.0";

pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("glassflow-backup-{}.json", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub todos: Vec<Todo>,
    pub events: Vec<CalendarEvent>,
    pub notes: Vec<Note>,
    pub opacity: f32,
    pub weather_city: String,
    pub version: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl ExportData {
    pub fn from_state(state: &AppState, timestamp: DateTime<Utc>) -> Self {
        Self {
            todos: state.todos.clone(),
            events: state.events.clone(),
            notes: state.notes.clone(),
            opacity: state.opacity,
            weather_city: state.weather_city.clone(),
            version: EXPORT_VERSION.to_string(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        LocalStorage::atomic_write(path, self.to_json()?)
            .with_context(|| format!("Failed to write backup to {}", path.display()))?;
        log::info!("Backup written to {}", path.display());
        Ok(())
    }
}

/// Import document. Every field is optional; `null` counts as absent.
/// Unknown fields (`version`, `timestamp`, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportData {
    pub todos: Option<Vec<Todo>>,
    pub events: Option<Vec<CalendarEvent>>,
    pub notes: Option<Vec<Note>>,
    pub opacity: Option<f32>,
    pub weather_city: Option<String>,
}

impl ImportData {
    /// Validates the whole document up front.
    pub fn parse(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Backup is not valid JSON")?;
        if !value.is_object() {
            return Err(anyhow!("Backup must be a JSON object"));
        }
        let data: Self =
            serde_json::from_value(value).context("Backup has an unexpected shape")?;
        if let Some(opacity) = data.opacity
            && !opacity.is_finite()
        {
            return Err(anyhow!("Backup opacity is not a number"));
        }
        Ok(data)
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_none()
            && self.events.is_none()
            && self.notes.is_none()
            && self.opacity.is_none()
            && self.weather_city.is_none()
    }

    pub fn apply(self, state: &mut AppState) {
        if let Some(todos) = self.todos {
            state.todos = todos;
        }
        if let Some(events) = self.events {
            state.events = events;
        }
        if let Some(notes) = self.notes {
            state.notes = notes;
        }
        if let Some(opacity) = self.opacity {
            state.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(city) = self.weather_city {
            state.weather_city = city;
        }
    }
}
