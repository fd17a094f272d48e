// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::DEFAULT_NOTE_COLOR;
use crate::storage::LocalStorage;
use crate::store::{AppState, DEFAULT_OPACITY, DEFAULT_WEATHER_CITY};
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;

fn default_opacity() -> f32 {
    DEFAULT_OPACITY
}
fn default_weather_city() -> String {
    DEFAULT_WEATHER_CITY.to_string()
}
fn default_note_color() -> String {
    DEFAULT_NOTE_COLOR.to_string()
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Window opacity used until the user changes it.
    #[serde(default = "default_opacity")]
    pub default_opacity: f32,
    #[serde(default = "default_weather_city")]
    pub default_weather_city: String,
    #[serde(default = "default_note_color")]
    pub default_note_color: String,

    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,

    /// off, error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_opacity: default_opacity(),
            default_weather_city: default_weather_city(),
            default_note_color: default_note_color(),
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Defaults when there is no config file. A broken file is still an error.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }
        err.chain().any(|cause| {
            cause
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
        })
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })
    }

    /// The state a fresh install starts from.
    pub fn initial_state(&self) -> AppState {
        AppState::with_settings(
            self.default_opacity.clamp(0.0, 1.0),
            self.default_weather_city.clone(),
        )
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log_level '{}', using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}
