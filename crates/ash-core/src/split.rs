//! Expense allocation engine.
//!
//! Divides a shared cost among participants under one of three division
//! policies, then layers per-participant surcharges on top.
//!
//! # Algorithm Summary
//!
//! 1. Filter participants to the valid subset (non-blank name, at least one
//!    day staying)
//! 2. Compute each participant's base share according to the division mode
//! 3. Apply surcharges: `PerPerson` charges the full amount to every
//!    applicable participant, `Divided` splits it equally among them

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ParticipantId, SubExpenseId, ValidationError};

/// Errors produced when the engine is invoked with invalid input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    /// The total expense was zero, negative, or not finite.
    #[error("total expense must be a positive finite number, got {value}")]
    NonPositiveTotal { value: f64 },

    /// No participant survived the name/days validity filter.
    #[error("no valid participants: every participant needs a name and at least one day")]
    NoValidParticipants,

    /// A surcharge carried a negative or non-finite amount.
    #[error("surcharge {name:?} has invalid amount {value}")]
    InvalidSurchargeAmount { name: String, value: f64 },
}

/// A person taking part in the shared expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique identifier, assigned once at creation and never reused.
    pub id: ParticipantId,
    /// Display name. Names are not required to be unique.
    pub name: String,
    /// Number of days present. Participants with zero days are excluded.
    pub days_staying: u32,
}

impl Participant {
    /// Whether this participant takes part in the computation.
    ///
    /// Participants failing this filter are silently excluded, not an error.
    fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.days_staying > 0
    }
}

/// How a surcharge amount is applied to its applicable participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitMode {
    /// Every applicable participant pays the full amount.
    ///
    /// The wire token is `individual` for compatibility with sessions saved
    /// by the original web app.
    #[serde(rename = "individual")]
    PerPerson,
    /// The amount is divided equally among the applicable participants.
    #[serde(rename = "divided")]
    Divided,
}

impl SplitMode {
    /// String representation used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerPerson => "individual",
            Self::Divided => "divided",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SplitMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" | "per-person" => Ok(Self::PerPerson),
            "divided" => Ok(Self::Divided),
            _ => Err(ValidationError::InvalidSplitMode {
                value: s.to_string(),
            }),
        }
    }
}

/// The policy governing how the base total is allocated across participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DivisionMode {
    /// Each participant pays proportionally to their days staying.
    #[serde(rename = "individual")]
    Proportional,
    /// A fixed nightly cost is split among whoever is present that night.
    #[serde(rename = "daily-split")]
    DailySplit,
    /// Every participant pays the same amount regardless of days staying.
    #[serde(rename = "equal")]
    Equal,
}

impl DivisionMode {
    /// String representation used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Proportional => "individual",
            Self::DailySplit => "daily-split",
            Self::Equal => "equal",
        }
    }
}

impl fmt::Display for DivisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DivisionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" | "proportional" => Ok(Self::Proportional),
            "daily-split" => Ok(Self::DailySplit),
            "equal" => Ok(Self::Equal),
            _ => Err(ValidationError::InvalidDivisionMode {
                value: s.to_string(),
            }),
        }
    }
}

/// An additional charge applicable to a subset of participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubExpense {
    pub id: SubExpenseId,
    pub name: String,
    /// Non-negative amount. Validated by [`compute_shares`].
    pub amount: f64,
    /// The participants this surcharge applies to. May be empty, in which
    /// case the surcharge contributes zero to everyone.
    pub applicable_participant_ids: Vec<ParticipantId>,
    pub split_mode: SplitMode,
}

/// A surcharge as applied to a single participant, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubExpenseCharge {
    pub name: String,
    /// The per-participant amount after split-mode normalization.
    pub amount: f64,
    pub split_mode: SplitMode,
}

/// The computed breakdown for a single participant.
///
/// This is a derived, read-only snapshot: it holds no back-reference to the
/// source [`Participant`] and is never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResult {
    pub name: String,
    pub days_staying: u32,
    /// Portion of the total expense before surcharges.
    pub base_share: f64,
    /// Surcharge charges in the order the surcharges were defined.
    pub sub_expense_charges: Vec<SubExpenseCharge>,
    /// `base_share` plus all applicable surcharge contributions.
    pub total_share: f64,
    /// Share of the base total, in `[0, 100]`.
    pub percentage: f64,
}

/// Computes per-participant charge breakdowns for a shared expense.
///
/// Participants with a blank name or zero days are silently excluded before
/// computation. Output order follows the filtered input order, and identical
/// inputs always produce identical outputs.
///
/// `global_days` is informational only: it never affects the computed
/// amounts in any mode and is carried by callers purely for display and
/// record keeping.
///
/// # Errors
///
/// Returns [`SplitError::NonPositiveTotal`] if `total_expense` is not a
/// positive finite number, [`SplitError::NoValidParticipants`] if no
/// participant survives the validity filter, and
/// [`SplitError::InvalidSurchargeAmount`] if any surcharge amount is
/// negative or not finite.
#[expect(
    clippy::cast_precision_loss,
    reason = "participant and day counts are far below f64 mantissa range"
)]
pub fn compute_shares(
    total_expense: f64,
    participants: &[Participant],
    sub_expenses: &[SubExpense],
    mode: DivisionMode,
    global_days: f64,
) -> Result<Vec<ExpenseResult>, SplitError> {
    if !total_expense.is_finite() || total_expense <= 0.0 {
        return Err(SplitError::NonPositiveTotal {
            value: total_expense,
        });
    }
    for sub_expense in sub_expenses {
        if !sub_expense.amount.is_finite() || sub_expense.amount < 0.0 {
            return Err(SplitError::InvalidSurchargeAmount {
                name: sub_expense.name.clone(),
                value: sub_expense.amount,
            });
        }
    }

    let valid: Vec<&Participant> = participants.iter().filter(|p| p.is_valid()).collect();
    if valid.is_empty() {
        return Err(SplitError::NoValidParticipants);
    }

    tracing::debug!(
        total_expense,
        mode = %mode,
        global_days,
        participants = valid.len(),
        surcharges = sub_expenses.len(),
        "computing expense shares"
    );

    let base_shares = match mode {
        DivisionMode::Proportional => proportional_shares(total_expense, &valid),
        DivisionMode::DailySplit => daily_split_shares(total_expense, &valid),
        DivisionMode::Equal => {
            let count = valid.len() as f64;
            valid
                .iter()
                .map(|_| BaseShare {
                    amount: total_expense / count,
                    percentage: 100.0 / count,
                })
                .collect()
        }
    };

    let results = valid
        .iter()
        .zip(base_shares)
        .map(|(participant, base)| {
            let charges = surcharge_charges(participant, sub_expenses);
            let surcharge_total: f64 = charges.iter().map(|charge| charge.amount).sum();
            ExpenseResult {
                name: participant.name.clone(),
                days_staying: participant.days_staying,
                base_share: base.amount,
                sub_expense_charges: charges,
                total_share: base.amount + surcharge_total,
                percentage: base.percentage,
            }
        })
        .collect();

    Ok(results)
}

/// A participant's portion of the base total before surcharges.
struct BaseShare {
    amount: f64,
    percentage: f64,
}

/// Each participant pays `total * days / sum(days)`.
fn proportional_shares(total_expense: f64, valid: &[&Participant]) -> Vec<BaseShare> {
    let total_days: f64 = valid.iter().map(|p| f64::from(p.days_staying)).sum();
    valid
        .iter()
        .map(|p| {
            let days = f64::from(p.days_staying);
            BaseShare {
                amount: total_expense * days / total_days,
                percentage: days / total_days * 100.0,
            }
        })
        .collect()
}

/// Day-indexed split: the nightly cost is fixed at `total / max_days` and
/// divided among whoever is present that night.
///
/// Day `d` ranges over `1..=max_days`, and the participant with the maximum
/// stay is present on every one of those days, so the per-day headcount is
/// never zero. This is deliberately not equivalent to the proportional mode.
fn daily_split_shares(total_expense: f64, valid: &[&Participant]) -> Vec<BaseShare> {
    let max_days = valid
        .iter()
        .map(|p| p.days_staying)
        .max()
        .expect("valid participant list is non-empty");
    let cost_per_day = total_expense / f64::from(max_days);

    // present[d - 1] = how many participants are staying on day d
    let mut present = vec![0_u32; max_days as usize];
    for participant in valid {
        for slot in present.iter_mut().take(participant.days_staying as usize) {
            *slot += 1;
        }
    }

    valid
        .iter()
        .map(|p| {
            let amount: f64 = present
                .iter()
                .take(p.days_staying as usize)
                .map(|&count| cost_per_day / f64::from(count))
                .sum();
            BaseShare {
                amount,
                percentage: amount / total_expense * 100.0,
            }
        })
        .collect()
}

/// Collects the surcharges applicable to one participant, normalized to the
/// per-participant amount. Order matches the surcharge definition order.
#[expect(
    clippy::cast_precision_loss,
    reason = "applicable-participant counts are far below f64 mantissa range"
)]
fn surcharge_charges(participant: &Participant, sub_expenses: &[SubExpense]) -> Vec<SubExpenseCharge> {
    sub_expenses
        .iter()
        .filter(|se| se.applicable_participant_ids.contains(&participant.id))
        .map(|se| {
            // A participant can only match a non-empty applicable set, so the
            // Divided divisor is always at least one.
            let amount = match se.split_mode {
                SplitMode::PerPerson => se.amount,
                SplitMode::Divided => se.amount / se.applicable_participant_ids.len() as f64,
            };
            SubExpenseCharge {
                name: se.name.clone(),
                amount,
                split_mode: se.split_mode,
            }
        })
        .collect()
}
