use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ash_cli::commands::{friends, sessions, split};
use ash_cli::{Cli, Commands, Config, FriendsAction, SessionsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ash_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ash_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Split(args)) => {
            // The database is only opened when the result should be saved
            let mut db = if args.save.is_some() {
                Some(open_database(cli.config.as_deref())?.0)
            } else {
                None
            };
            split::run(args, db.as_mut())?;
        }
        Some(Commands::Sessions { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                SessionsAction::List { json } => sessions::list(&db, *json)?,
                SessionsAction::Show { id } => sessions::show(&db, id)?,
            }
        }
        Some(Commands::Friends { action }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                FriendsAction::Add {
                    name,
                    surname,
                    email,
                    birth_date,
                    description,
                } => friends::add(
                    &mut db,
                    name,
                    surname,
                    email,
                    birth_date,
                    description.as_deref(),
                )?,
                FriendsAction::List { json } => friends::list(&db, *json)?,
                FriendsAction::Remove { id } => friends::remove(&mut db, id)?,
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
