//! Friends command: maintain the friends directory.

use std::fmt::Write;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use ash_core::{Friend, FriendId, days_until_birthday, sort_by_upcoming_birthday};
use ash_db::Database;

/// Adds a friend to the directory and prints the new ID.
pub fn add(
    db: &mut Database,
    name: &str,
    surname: &str,
    email: &str,
    birth_date: &str,
    description: Option<&str>,
) -> Result<()> {
    let birth_date: NaiveDate = birth_date
        .parse()
        .with_context(|| format!("invalid birth date {birth_date:?}, expected YYYY-MM-DD"))?;
    let now = Utc::now();
    let friend = Friend {
        id: FriendId::new(Uuid::new_v4().to_string()).expect("UUIDs are never empty"),
        name: name.to_string(),
        surname: surname.to_string(),
        email: email.to_string(),
        birth_date,
        description: description.map(ToString::to_string),
        created_at: now,
        updated_at: now,
    };
    db.insert_friend(&friend).context("failed to add friend")?;
    println!("Added friend {}", friend.id);
    Ok(())
}

/// Lists friends ordered by soonest upcoming birthday.
pub fn list(db: &Database, json: bool) -> Result<()> {
    let mut friends = db.list_friends()?;
    let today = Utc::now().date_naive();
    sort_by_upcoming_birthday(&mut friends, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&friends)?);
    } else {
        print!("{}", format_friends(&friends, today));
    }
    Ok(())
}

/// Removes a friend by ID.
pub fn remove(db: &mut Database, id: &str) -> Result<()> {
    if !db.delete_friend(id)? {
        bail!("no friend with ID {id}");
    }
    println!("Removed friend {id}");
    Ok(())
}

/// Formats the directory as a table with a days-until-birthday column.
fn format_friends(friends: &[Friend], today: NaiveDate) -> String {
    let mut output = String::new();

    if friends.is_empty() {
        writeln!(output, "No friends yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'ash friends add --help' to add one.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<10} {:<24} {:<12} {:>9}  {}",
        "ID", "Name", "Birthday", "In", "Email"
    )
    .unwrap();
    for friend in friends {
        let id_short: String = friend.id.as_str().chars().take(8).collect();
        let full_name = format!("{} {}", friend.name, friend.surname);
        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let name_display = if full_name.chars().count() > 24 {
            format!("{}...", full_name.chars().take(21).collect::<String>())
        } else {
            full_name
        };
        let days = days_until_birthday(friend.birth_date, today);
        let days_display = match days {
            0 => "today!".to_string(),
            1 => "1 day".to_string(),
            n => format!("{n} days"),
        };
        writeln!(
            output,
            "{:<10} {:<24} {:<12} {:>9}  {}",
            id_short,
            name_display,
            friend.birth_date.format("%Y-%m-%d"),
            days_display,
            friend.email
        )
        .unwrap();
    }

    output
}
