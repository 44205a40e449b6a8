//! Core domain logic for AmigaShare.
//!
//! This crate contains the fundamental types and logic for:
//! - Split: allocating a shared expense across participants under three
//!   division policies, with optional surcharges
//! - Sessions: named, reproducible records of a computed breakdown
//! - Friends: directory entries and upcoming-birthday ordering

pub mod friend;
pub mod session;
mod split;
pub mod types;

pub use friend::{Friend, days_until_birthday, next_birthday, sort_by_upcoming_birthday};
pub use session::ExpenseSession;
pub use split::{
    DivisionMode, ExpenseResult, Participant, SplitError, SplitMode, SubExpense,
    SubExpenseCharge, compute_shares,
};
pub use types::{FriendId, ParticipantId, SessionId, SubExpenseId, ValidationError};
