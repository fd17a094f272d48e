use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate, Utc};
use glassflow::backup::default_export_file_name;
use glassflow::cli::{self, print_help, resolve_id};
use glassflow::config::Config;
use glassflow::context::{AppContext, StandardContext};
use glassflow::controller;
use glassflow::focus::{FocusMode, FocusTimer};
use glassflow::logging;
use glassflow::model::EventKind;
use glassflow::store::TaskStore;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || matches!(args[0].as_str(), "--help" | "-h" | "help") {
        print_help("glassflow");
        return Ok(());
    }

    let mut root = None;
    if let Some(pos) = args.iter().position(|a| a == "--root" || a == "-r") {
        if pos + 1 >= args.len() {
            return Err(anyhow!("--root needs a path"));
        }
        root = Some(PathBuf::from(args.remove(pos + 1)));
        args.remove(pos);
    }

    let ctx = StandardContext::new(root);
    let config = Config::load_or_default(&ctx)?;
    logging::init(config.log_level(), Some(ctx.get_log_path()?.as_path()))?;

    let Some((command, rest)) = args.split_first() else {
        print_help("glassflow");
        return Ok(());
    };

    // Extraction preview and the timer never touch the state file.
    match command.as_str() {
        "parse" => return parse(&rest.join(" ")),
        "focus" => return focus(&config, rest.iter().any(|a| a == "--break")),
        _ => {}
    }

    let mut store = controller::open_store(&ctx, &config)?;
    run(&mut store, &ctx, command, rest)
}

fn run(store: &mut TaskStore, ctx: &dyn AppContext, command: &str, rest: &[String]) -> Result<()> {
    match command {
        "add" => {
            let input = rest.join(" ");
            let id = controller::submit_todo(store, &input)
                .ok_or_else(|| anyhow!("Nothing to add"))?;
            if let Some(todo) = store.get_todo(&id) {
                match todo.due_label() {
                    Some(due) => println!("Added '{}' (due {})", todo.text, due),
                    None => println!("Added '{}'", todo.text),
                }
            }
        }
        "list" => {
            let all = rest.iter().any(|a| a == "--all");
            let mut todos = store.active_todos();
            if all {
                todos.extend(store.completed_todos());
            }
            println!("{}", cli::render_todos(&todos));
        }
        "done" => {
            let id = todo_id(store, arg(rest, 0, "<id>")?)?;
            if let Some(todo) = store.toggle_todo(&id) {
                let state = if todo.done { "done" } else { "open" };
                println!("'{}' is {}", todo.text, state);
            }
        }
        "rm" => {
            let id = todo_id(store, arg(rest, 0, "<id>")?)?;
            if let Some(todo) = store.remove_todo(&id) {
                println!("Removed '{}'", todo.text);
            }
        }
        "schedule" => {
            let id = todo_id(store, arg(rest, 0, "<id>")?)?;
            let day = parse_day(arg(rest, 1, "<YYYY-MM-DD>")?)?;
            let event = controller::drop_on_day(store, &id, day, &Local)
                .ok_or_else(|| anyhow!("Could not schedule on {}", day))?;
            println!("Scheduled '{}' on {}", event.title, day);
        }
        "event" => {
            let day = parse_day(arg(rest, 0, "<YYYY-MM-DD>")?)?;
            let title = rest[1..].join(" ");
            if title.trim().is_empty() {
                return Err(anyhow!("Missing <title>"));
            }
            let date = day
                .and_hms_opt(0, 0, 0)
                .and_then(|dt| dt.and_local_timezone(Local).earliest())
                .ok_or_else(|| anyhow!("{} has no local midnight", day))?;
            store.add_event(title.trim(), date.with_timezone(&Utc), EventKind::Event);
            println!("Added event on {}", day);
        }
        "events" => {
            let day = match rest.first() {
                Some(d) => parse_day(d)?,
                None => Local::now().date_naive(),
            };
            println!("{}", cli::render_events(&store.agenda_from(day, &Local)));
        }
        "notes" => println!("{}", cli::render_notes(&store.state().notes)),
        "note" => note(store, rest)?,
        "set" => match (rest.first().map(String::as_str), rest.get(1)) {
            (Some("opacity"), Some(value)) => {
                let value: f32 = value.parse().context("Opacity must be a number")?;
                match store.set_opacity(value) {
                    Some(v) => println!("Opacity set to {:.2}", v),
                    None => println!("Opacity unchanged"),
                }
            }
            (Some("city"), Some(_)) => {
                let city = rest[1..].join(" ");
                match store.set_weather_city(&city) {
                    Some(c) => println!("Weather city set to {}", c),
                    None => println!("Weather city unchanged"),
                }
            }
            _ => return Err(anyhow!("Usage: set opacity <0.0-1.0> | set city <name>")),
        },
        "export" => {
            let path = match rest.first() {
                Some(p) => PathBuf::from(p),
                None => ctx
                    .get_backup_dir()?
                    .join(default_export_file_name(Local::now().date_naive())),
            };
            store.export_data().write_to(&path)?;
            println!("Exported to {}", path.display());
        }
        "import" => {
            let path = arg(rest, 0, "<file>")?;
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path))?;
            store.import_data(&json)?;
            println!("Imported {}", path);
        }
        other => {
            print_help("glassflow");
            return Err(anyhow!("Unknown command '{}'", other));
        }
    }
    Ok(())
}

fn note(store: &mut TaskStore, rest: &[String]) -> Result<()> {
    match rest.first().map(String::as_str) {
        Some("add") => {
            let mut words = &rest[1..];
            let mut color = None;
            if words.first().map(String::as_str) == Some("--color") {
                color = Some(arg(words, 1, "<color>")?.to_string());
                words = &words[2..];
            }
            let content = words.join(" ");
            if content.trim().is_empty() {
                return Err(anyhow!("Missing note text"));
            }
            let id = store.add_note(content, color.as_deref());
            println!("Added note {}", id);
        }
        Some("edit") => {
            let id = note_id(store, arg(rest, 1, "<id>")?)?;
            store.update_note(&id, rest[2..].join(" "));
            println!("Updated note {}", id);
        }
        Some("rm") => {
            let id = note_id(store, arg(rest, 1, "<id>")?)?;
            store.remove_note(&id);
            println!("Removed note {}", id);
        }
        _ => return Err(anyhow!("Usage: note add|edit|rm ...")),
    }
    Ok(())
}

fn parse(input: &str) -> Result<()> {
    match controller::preview(input) {
        Some(parsed) => {
            println!("match: {}", parsed.matched_text());
            println!("date:  {}", parsed.date.with_timezone(&Local).format("%Y-%m-%d %a %H:%M"));
            println!("title: {}", parsed.clean_text);
        }
        None => println!("No date found"),
    }
    Ok(())
}

fn focus(config: &Config, on_break: bool) -> Result<()> {
    let mut timer = FocusTimer::from_config(config);
    if on_break {
        timer.switch_mode(FocusMode::Break);
    }
    timer.toggle();
    let mut out = std::io::stdout();
    loop {
        write!(out, "\r{} {}", timer.mode(), timer.display())?;
        out.flush()?;
        std::thread::sleep(Duration::from_secs(1));
        if timer.tick() {
            writeln!(out, "\r{} {} - time is up", timer.mode(), timer.display())?;
            return Ok(());
        }
    }
}

fn arg<'a>(rest: &'a [String], idx: usize, name: &str) -> Result<&'a str> {
    rest.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing {}", name))
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("'{}' is not YYYY-MM-DD", s))
}

fn todo_id(store: &TaskStore, prefix: &str) -> Result<String> {
    resolve_id(store.state().todos.iter().map(|t| t.id.as_str()), prefix)
}

fn note_id(store: &TaskStore, prefix: &str) -> Result<String> {
    resolve_id(store.state().notes.iter().map(|n| n.id.as_str()), prefix)
}
