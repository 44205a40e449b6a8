//! Split command: compute a breakdown and optionally save it as a session.

use std::fmt::Write;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use uuid::Uuid;

use ash_core::{
    DivisionMode, ExpenseResult, ExpenseSession, Participant, ParticipantId, SessionId, SplitMode,
    SubExpense, SubExpenseId, compute_shares,
};
use ash_db::Database;

use crate::cli::SplitArgs;

/// Runs the split command.
///
/// A database handle is only needed when `--save` was given.
pub fn run(args: &SplitArgs, db: Option<&mut Database>) -> Result<()> {
    let participants = parse_participants(&args.participants)?;
    let sub_expenses = parse_surcharges(&args.surcharges, &participants)?;
    let global_days = args.days.unwrap_or(0.0);

    let results = compute_shares(
        args.total,
        &participants,
        &sub_expenses,
        args.mode,
        global_days,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_breakdown(args.mode, &results));
    }

    if let Some(name) = &args.save {
        let db = db.context("database required to save a session")?;
        let now = Utc::now();
        let session = ExpenseSession {
            id: SessionId::new(Uuid::new_v4().to_string()).expect("UUIDs are never empty"),
            name: name.clone(),
            total_expense: args.total,
            division_mode: args.mode,
            global_days: args.days,
            participants,
            sub_expenses,
            results,
            created_at: now,
            updated_at: now,
        };
        db.save_session(&session)
            .context("failed to save session")?;
        println!("Saved session {}", session.id);
    }

    Ok(())
}

/// Parses `NAME:DAYS` participant specs, assigning fresh IDs.
fn parse_participants(specs: &[String]) -> Result<Vec<Participant>> {
    specs
        .iter()
        .map(|spec| {
            let (name, days) = spec
                .rsplit_once(':')
                .with_context(|| format!("invalid participant {spec:?}, expected NAME:DAYS"))?;
            let days_staying: u32 = days
                .parse()
                .with_context(|| format!("invalid day count in participant {spec:?}"))?;
            Ok(Participant {
                id: ParticipantId::new(Uuid::new_v4().to_string())
                    .expect("UUIDs are never empty"),
                name: name.to_string(),
                days_staying,
            })
        })
        .collect()
}

/// Parses `NAME:AMOUNT:MODE[:P1,P2,...]` surcharge specs.
///
/// The trailing list names applicable participants; when omitted the
/// surcharge applies to everyone.
fn parse_surcharges(specs: &[String], participants: &[Participant]) -> Result<Vec<SubExpense>> {
    specs
        .iter()
        .map(|spec| {
            let mut parts = spec.splitn(4, ':');
            let (Some(name), Some(amount), Some(mode)) =
                (parts.next(), parts.next(), parts.next())
            else {
                bail!("invalid surcharge {spec:?}, expected NAME:AMOUNT:MODE[:NAMES]");
            };
            let amount: f64 = amount
                .parse()
                .with_context(|| format!("invalid amount in surcharge {spec:?}"))?;
            let split_mode: SplitMode = mode
                .parse()
                .with_context(|| format!("invalid mode in surcharge {spec:?}"))?;

            let applicable_participant_ids = match parts.next() {
                Some(names) => names
                    .split(',')
                    .map(|target| {
                        participants
                            .iter()
                            .find(|p| p.name == target)
                            .map(|p| p.id.clone())
                            .with_context(|| {
                                format!("surcharge {name:?} names unknown participant {target:?}")
                            })
                    })
                    .collect::<Result<Vec<_>>>()?,
                None => participants.iter().map(|p| p.id.clone()).collect(),
            };

            Ok(SubExpense {
                id: SubExpenseId::new(Uuid::new_v4().to_string())
                    .expect("UUIDs are never empty"),
                name: name.to_string(),
                amount,
                applicable_participant_ids,
                split_mode,
            })
        })
        .collect()
}

/// Formats a breakdown as a human-readable table.
pub(crate) fn format_breakdown(mode: DivisionMode, results: &[ExpenseResult]) -> String {
    let mut output = String::new();

    writeln!(output, "EXPENSE BREAKDOWN ({mode})").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<18} {:>4} {:>10} {:>10} {:>10} {:>7}",
        "Name", "Days", "Base", "Extras", "Total", "Share"
    )
    .unwrap();

    let mut base_sum = 0.0;
    let mut extras_sum = 0.0;
    let mut total_sum = 0.0;
    for result in results {
        let extras: f64 = result.sub_expense_charges.iter().map(|c| c.amount).sum();
        base_sum += result.base_share;
        extras_sum += extras;
        total_sum += result.total_share;

        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let name_display = if result.name.chars().count() > 18 {
            format!("{}...", result.name.chars().take(15).collect::<String>())
        } else {
            result.name.clone()
        };
        writeln!(
            output,
            "{:<18} {:>4} {:>10.2} {:>10.2} {:>10.2} {:>6.1}%",
            name_display,
            result.days_staying,
            result.base_share,
            extras,
            result.total_share,
            result.percentage
        )
        .unwrap();
        for charge in &result.sub_expense_charges {
            writeln!(
                output,
                "    + {} ({}): {:.2}",
                charge.name, charge.split_mode, charge.amount
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<18} {:>4} {:>10.2} {:>10.2} {:>10.2}",
        "Total", "", base_sum, extras_sum, total_sum
    )
    .unwrap();

    output
}
