//! Sessions command: list and inspect saved expense sessions.

use std::fmt::Write;

use anyhow::{Result, bail};

use ash_core::ExpenseSession;
use ash_db::Database;

use super::split::format_breakdown;

/// Lists saved sessions, newest first.
pub fn list(db: &Database, json: bool) -> Result<()> {
    let sessions = db.list_sessions()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else {
        print!("{}", format_sessions(&sessions));
    }
    Ok(())
}

/// Shows one saved session with its full breakdown.
///
/// Accepts either the full session ID or an unambiguous prefix.
pub fn show(db: &Database, id: &str) -> Result<()> {
    let session = match db.get_session(id)? {
        Some(session) => session,
        None => find_by_prefix(db, id)?,
    };

    println!("Session:  {}", session.name);
    println!("ID:       {}", session.id);
    println!("Total:    {:.2}", session.total_expense);
    println!("Mode:     {}", session.division_mode);
    if let Some(days) = session.global_days {
        println!("Days:     {days}");
    }
    println!("Created:  {}", session.created_at.format("%Y-%m-%d %H:%M"));
    println!();
    print!(
        "{}",
        format_breakdown(session.division_mode, &session.results)
    );
    Ok(())
}

fn find_by_prefix(db: &Database, prefix: &str) -> Result<ExpenseSession> {
    let mut matches: Vec<ExpenseSession> = db
        .list_sessions()?
        .into_iter()
        .filter(|session| session.id.as_str().starts_with(prefix))
        .collect();
    match matches.len() {
        0 => bail!("no session with ID {prefix}"),
        1 => Ok(matches.remove(0)),
        n => bail!("session ID prefix {prefix} is ambiguous ({n} matches)"),
    }
}

/// Formats the session list as a human-readable table.
fn format_sessions(sessions: &[ExpenseSession]) -> String {
    let mut output = String::new();

    if sessions.is_empty() {
        writeln!(output, "No saved sessions.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'ash split ... --save <name>' to save a computation."
        )
        .unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<10} {:<22} {:<12} {:>10}  {}",
        "ID", "Name", "Mode", "Total", "Created"
    )
    .unwrap();
    for session in sessions {
        let id_short: String = session.id.as_str().chars().take(8).collect();
        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let name_display = if session.name.chars().count() > 22 {
            format!("{}...", session.name.chars().take(19).collect::<String>())
        } else {
            session.name.clone()
        };
        writeln!(
            output,
            "{:<10} {:<22} {:<12} {:>10.2}  {}",
            id_short,
            name_display,
            session.division_mode.to_string(),
            session.total_expense,
            session.created_at.format("%Y-%m-%d")
        )
        .unwrap();
    }

    output
}
