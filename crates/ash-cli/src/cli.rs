//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use ash_core::DivisionMode;

/// Splits shared expenses and keeps a friends directory.
///
/// Computes per-participant breakdowns under three division policies,
/// optionally layered with surcharges, and persists named sessions locally.
#[derive(Debug, Parser)]
#[command(name = "ash", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute an expense breakdown.
    Split(SplitArgs),

    /// Work with saved expense sessions.
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },

    /// Manage the friends directory.
    Friends {
        #[command(subcommand)]
        action: FriendsAction,
    },
}

/// Arguments for the `split` subcommand.
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Total expense to divide. Must be a positive amount.
    #[arg(long)]
    pub total: f64,

    /// Division policy: individual (proportional to days), daily-split, or equal.
    #[arg(long, default_value = "individual", value_parser = parse_division_mode)]
    pub mode: DivisionMode,

    /// A participant as NAME:DAYS (e.g., Ana:3). Repeatable.
    #[arg(long = "participant", value_name = "NAME:DAYS", required = true)]
    pub participants: Vec<String>,

    /// A surcharge as NAME:AMOUNT:MODE[:P1,P2,...] where MODE is per-person
    /// or divided and the trailing list names applicable participants
    /// (defaults to everyone). Repeatable.
    #[arg(long = "surcharge", value_name = "NAME:AMOUNT:MODE[:NAMES]")]
    pub surcharges: Vec<String>,

    /// Informational day count, recorded alongside equal-mode sessions.
    #[arg(long)]
    pub days: Option<f64>,

    /// Output the breakdown as JSON.
    #[arg(long)]
    pub json: bool,

    /// Save the computation as a named session.
    #[arg(long, value_name = "SESSION_NAME")]
    pub save: Option<String>,
}

/// Actions on saved sessions.
#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    /// List saved sessions, newest first.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one saved session with its full breakdown.
    Show {
        /// The session ID (as printed by `split --save` or `sessions list`).
        id: String,
    },
}

/// Actions on the friends directory.
#[derive(Debug, Subcommand)]
pub enum FriendsAction {
    /// Add a friend.
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        surname: String,

        #[arg(long)]
        email: String,

        /// Birth date as YYYY-MM-DD.
        #[arg(long, value_name = "YYYY-MM-DD")]
        birth_date: String,

        #[arg(long)]
        description: Option<String>,
    },
    /// List friends ordered by upcoming birthday.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove a friend by ID.
    Remove {
        /// The friend ID (as printed by `friends add` or `friends list`).
        id: String,
    },
}

fn parse_division_mode(value: &str) -> Result<DivisionMode, String> {
    value.parse().map_err(|err| format!("{err}"))
}
