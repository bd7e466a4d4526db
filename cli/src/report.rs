//! Plain-text rendering of projects and tasks.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use todoist_core::{DueObject, Project, Task};

/// Whole minutes from `now` until the due time, rounded to nearest.
///
/// `None` when the task has no due time; the caller skips those.
pub fn minutes_until(due: &DueObject, now: DateTime<Utc>) -> Option<chrono::ParseResult<i64>> {
    let parsed = due.parse_datetime()?;
    Some(parsed.map(|at| {
        let seconds = (at.with_timezone(&Utc) - now).num_seconds();
        (seconds as f64 / 60.0).round() as i64
    }))
}

pub fn find_inbox(projects: &[Project]) -> Option<&Project> {
    projects.iter().rev().find(|p| p.inbox_project)
}

pub fn write_projects(out: &mut impl Write, projects: &[Project]) -> io::Result<()> {
    for (i, p) in projects.iter().enumerate() {
        writeln!(out, "{i}: {} ({}), inbox = {}", p.name, p.id, p.inbox_project)?;
    }
    Ok(())
}

pub fn write_tasks(out: &mut impl Write, tasks: &[Task]) -> io::Result<()> {
    for (i, t) in tasks.iter().enumerate() {
        let done = if t.completed { "x" } else { " " };
        write!(out, "{i}: [{done}] {} ({}) p{}", t.content, t.project_id, t.priority)?;
        if !t.due.string.is_empty() {
            write!(out, " due {}", t.due.string)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Tasks with a due time, each with the minutes left. Date-only tasks are
/// skipped; unparseable timestamps get a warning line.
pub fn write_upcoming(out: &mut impl Write, tasks: &[Task], now: DateTime<Utc>) -> io::Result<()> {
    for (i, t) in tasks.iter().enumerate() {
        match minutes_until(&t.due, now) {
            None => continue,
            Some(Ok(minutes)) => writeln!(
                out,
                "{i}: {} ({}) - {}, until {minutes} mins",
                t.content, t.project_id, t.due.datetime
            )?,
            Some(Err(_)) => writeln!(out, "\tCan't cast to time - {}", t.content)?,
        }
    }
    Ok(())
}
