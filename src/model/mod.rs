// File: ./src/model/mod.rs
pub mod en;
pub mod item;
pub mod matcher;
pub mod parser;
pub mod zh;

pub use item::{CalendarEvent, DEFAULT_NOTE_COLOR, EventKind, Note, Todo};
pub use parser::{ParsedDate, extract, extract_at};
