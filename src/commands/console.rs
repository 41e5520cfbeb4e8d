//! Console command parsing and rendering
//!
//! Handles: add, remove, list, next, help, quit
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::reminders::{Reminder, TimeOfDay};
use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;

pub const HELP: &str = "\
Commands:
  add <medication> <HH:MM>   remind me daily at HH:MM (24-hour clock)
  remove <id>                delete a reminder (an unambiguous id prefix is enough)
  list                       show all reminders
  next                       show upcoming reminders in firing order
  help                       show this help
  quit                       exit";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { name: String, time: TimeOfDay },
    Remove { id: String },
    List,
    Next,
    Help,
    Quit,
    Empty,
}

/// Parse one line of console input
pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Empty);
    };
    let rest: Vec<&str> = words.collect();

    match verb.to_lowercase().as_str() {
        "add" => {
            let (time, name) = rest
                .split_last()
                .filter(|(_, name)| !name.is_empty())
                .ok_or_else(|| anyhow!("Usage: add <medication> <HH:MM>"))?;
            let time: TimeOfDay = time.parse()?;
            Ok(Command::Add {
                name: name.join(" "),
                time,
            })
        }
        "remove" | "rm" | "delete" => match rest.as_slice() {
            [id] => Ok(Command::Remove { id: id.to_string() }),
            _ => Err(anyhow!("Usage: remove <id>")),
        },
        "list" | "ls" => Ok(Command::List),
        "next" | "upcoming" => Ok(Command::Next),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(anyhow!("Unknown command: {other}. Type `help` for a list")),
    }
}

/// Resolve a full id or a unique id prefix against the current reminders
pub fn resolve_id(input: &str, reminders: &[Reminder]) -> Result<String> {
    if let Some(exact) = reminders.iter().find(|r| r.id == input) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<&Reminder> = reminders.iter().filter(|r| r.id.starts_with(input)).collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(anyhow!("Reminder {input} not found")),
        _ => Err(anyhow!(
            "Reminder id {input} is ambiguous ({} matches)",
            matches.len()
        )),
    }
}

/// Short id shown in listings
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Render the reminder list
pub fn render_list(reminders: &[Reminder]) -> String {
    if reminders.is_empty() {
        return "📋 You don't have any reminders.\n\nUse `add <medication> <HH:MM>` to create one!"
            .to_string();
    }

    let mut out = String::from("📋 Your reminders:\n");
    for reminder in reminders {
        out.push_str(&format!(
            "  {}  {}  {}\n",
            short_id(&reminder.id),
            reminder.time_of_day,
            reminder.medication_name
        ));
    }
    out.push_str("\nUse `remove <id>` to delete a reminder.");
    out
}

/// Render upcoming reminders relative to `now`
pub fn render_upcoming(upcoming: &[(Reminder, NaiveDateTime)], now: NaiveDateTime) -> String {
    if upcoming.is_empty() {
        return "⏳ Nothing scheduled.".to_string();
    }

    let mut out = String::from("⏳ Upcoming:\n");
    for (reminder, at) in upcoming {
        let seconds = (*at - now).num_seconds();
        let when = if seconds > 0 {
            format!("in {}", format_duration(seconds))
        } else {
            "any moment now".to_string()
        };
        out.push_str(&format!(
            "  {}  {} ({})  {}\n",
            short_id(&reminder.id),
            at.format("%a %H:%M"),
            when,
            reminder.medication_name
        ));
    }
    out.trim_end().to_string()
}

/// Format a duration in seconds into a human-readable string
pub fn format_duration(seconds: i64) -> String {
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if seconds < 60 {
        format!("{} second{}", seconds, plural(seconds))
    } else if seconds < 3600 {
        let mins = seconds / 60;
        format!("{} minute{}", mins, plural(mins))
    } else {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        if mins > 0 {
            format!("{} hour{} {} minute{}", hours, plural(hours), mins, plural(mins))
        } else {
            format!("{} hour{}", hours, plural(hours))
        }
    }
}
