// File: src/focus.rs
//! Pomodoro timer behind the focus widget. Driven by one `tick()` per second
//! from whatever clock the UI has.
use crate::config::Config;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FocusMode {
    #[default]
    Focus,
    Break,
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    mode: FocusMode,
    focus_secs: u32,
    break_secs: u32,
    remaining: u32,
    running: bool,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(25, 5)
    }
}

impl FocusTimer {
    /// Lengths in minutes. Zero is bumped to one minute.
    pub fn new(focus_minutes: u32, break_minutes: u32) -> Self {
        let focus_secs = focus_minutes.max(1).saturating_mul(60);
        Self {
            mode: FocusMode::Focus,
            focus_secs,
            break_secs: break_minutes.max(1).saturating_mul(60),
            remaining: focus_secs,
            running: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.focus_minutes, config.break_minutes)
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn total(&self) -> u32 {
        match self.mode {
            FocusMode::Focus => self.focus_secs,
            FocusMode::Break => self.break_secs,
        }
    }

    /// Start or pause. A finished timer does not start again until reset.
    pub fn toggle(&mut self) {
        if self.remaining == 0 {
            self.running = false;
            return;
        }
        self.running = !self.running;
    }

    /// One second passes. Returns `true` on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.running = false;
            log::info!("{} session finished", self.mode);
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.remaining = self.total();
    }

    pub fn switch_mode(&mut self, mode: FocusMode) {
        self.mode = mode;
        self.reset();
    }

    /// Elapsed share of the session, `0.0` at the start and `1.0` when done.
    pub fn progress(&self) -> f32 {
        let total = self.total();
        (total - self.remaining) as f32 / total as f32
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_paused_timer_does_not_tick() {
        let mut timer = FocusTimer::default();
        assert!(!timer.tick());
        assert_eq!(timer.display(), "25:00");
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_runs_to_zero_once() {
        let mut timer = FocusTimer::new(1, 1);
        timer.toggle();
        let finished: Vec<bool> = (0..61).map(|_| timer.tick()).collect();
        assert_eq!(finished.iter().filter(|f| **f).count(), 1);
        assert!(finished[59]);
        assert_eq!(timer.display(), "00:00");
        assert!(!timer.is_running());
        assert_eq!(timer.progress(), 1.0);
        timer.toggle();
        assert!(!timer.is_running());
    }

    #[test]
    fn test_switch_mode_pauses_and_reloads() {
        let mut timer = FocusTimer::new(25, 5);
        timer.toggle();
        timer.tick();
        timer.switch_mode(FocusMode::Break);
        assert!(!timer.is_running());
        assert_eq!(timer.display(), "05:00");
        timer.toggle();
        timer.tick();
        timer.reset();
        assert_eq!(timer.remaining_secs(), 300);
        assert_eq!(FocusMode::from_str("break").unwrap(), FocusMode::Break);
    }
}
