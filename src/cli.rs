// File: ./src/cli.rs
//! Shared command-line interface logic: help text, id lookup, table output.
use crate::model::{CalendarEvent, Note, Todo};
use anyhow::{Result, anyhow};
use chrono::Local;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ID_WIDTH: usize = 8;
const TEXT_WIDTH: usize = 40;

pub fn print_help(binary_name: &str) {
    println!(
        "Glassflow v{} - to-dos, calendar and sticky notes with natural date input",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] <command> [args]", binary_name);
    println!();
    println!("COMMANDS:");
    println!("    parse <text>                 Show the date found in <text>, add nothing");
    println!("    add <text>                   Add a to-do (dates in the text are picked up)");
    println!("    list [--all]                 Open to-dos (--all includes finished ones)");
    println!("    done <id>                    Toggle a to-do between open and done");
    println!("    rm <id>                      Remove a to-do (its calendar events stay)");
    println!("    schedule <id> <YYYY-MM-DD>   Put a to-do on a calendar day");
    println!("    event <YYYY-MM-DD> <title>   Add a calendar event");
    println!("    events [YYYY-MM-DD]          Agenda from a day on (default: today)");
    println!("    note add [--color <c>] <text>");
    println!("    note edit <id> <text>");
    println!("    note rm <id>");
    println!("    notes                        List sticky notes");
    println!("    set opacity <0.0-1.0>");
    println!("    set city <name>");
    println!("    export [file]                Write a backup (default: backups/ in the data dir)");
    println!("    import <file>                Restore a backup");
    println!("    focus [--break]              Run a focus (or break) timer in the terminal");
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("DATE INPUT:");
    println!("    明天下午3点开会              due tomorrow 15:00, title 开会");
    println!("    下周五 交报告                due next week's Friday 12:00");
    println!("    3天后 续费                   due in three days");
    println!("    call mom tomorrow at 3pm     English phrases work too");
    println!("    standup next mon 9:30am");
    println!();
    println!("Ids may be shortened to any unique prefix.");
}

/// Finds the one id starting with `prefix`.
pub fn resolve_id<'a, I>(ids: I, prefix: &str) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(anyhow!("Empty id"));
    }
    let matches: Vec<&str> = ids.into_iter().filter(|id| id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [one] => Ok(one.to_string()),
        [] => Err(anyhow!("No item with id '{}'", prefix)),
        many => {
            // An exact hit wins over longer ids sharing the prefix.
            if let Some(exact) = many.iter().find(|id| **id == prefix) {
                return Ok(exact.to_string());
            }
            Err(anyhow!("Id '{}' is ambiguous ({} matches)", prefix, many.len()))
        }
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(ID_WIDTH) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Cuts to `width` terminal columns (CJK counts double) and pads with spaces.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    if text.width() > width {
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('…');
        used += 1;
    } else {
        out.push_str(text);
        used = text.width();
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

pub fn render_todos(todos: &[&Todo]) -> String {
    if todos.is_empty() {
        return "No to-dos.".to_string();
    }
    todos
        .iter()
        .map(|t| {
            let check = if t.done { "[x]" } else { "[ ]" };
            let due = t.due_label().unwrap_or_default();
            format!("{} {:<8} {} {}", check, short_id(&t.id), fit(&t.text, TEXT_WIDTH), due)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_events(events: &[&CalendarEvent]) -> String {
    if events.is_empty() {
        return "Nothing scheduled.".to_string();
    }
    events
        .iter()
        .map(|e| {
            let when = e.date.with_timezone(&Local).format("%Y-%m-%d %a %H:%M");
            format!("{} {:<8} {} {}", when, short_id(&e.id), fit(&e.title, TEXT_WIDTH), e.kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes.".to_string();
    }
    notes
        .iter()
        .map(|n| {
            let first_line = n.content.lines().next().unwrap_or("");
            let created = n.created_at.with_timezone(&Local).format("%Y-%m-%d");
            format!("{:<8} {} {} {}", short_id(&n.id), created, fit(first_line, TEXT_WIDTH), n.color)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
