//! Expense-splitting CLI library.
//!
//! This crate provides the CLI interface for AmigaShare.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, FriendsAction, SessionsAction, SplitArgs};
pub use config::Config;
