//! Saved expense sessions.
//!
//! A session captures everything needed to reproduce a computed breakdown:
//! the inputs, the division mode, and the results snapshot. Sessions are
//! created by callers after a successful [`compute_shares`](crate::compute_shares)
//! invocation and persisted by the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::split::{DivisionMode, ExpenseResult, Participant, SubExpense};
use crate::types::SessionId;

/// A named record of one expense-splitting calculation.
///
/// JSON field names are camelCase to stay readable by records written by the
/// original web app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSession {
    pub id: SessionId,
    /// User-chosen session name (e.g., "beach house july").
    pub name: String,
    pub total_expense: f64,
    pub division_mode: DivisionMode,
    /// Informational day count shown alongside Equal-mode sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_days: Option<f64>,
    pub participants: Vec<Participant>,
    pub sub_expenses: Vec<SubExpense>,
    pub results: Vec<ExpenseResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_shares;
    use crate::types::ParticipantId;

    fn sample_session() -> ExpenseSession {
        let participants = vec![
            Participant {
                id: ParticipantId::new("p-1").unwrap(),
                name: "Ana".to_string(),
                days_staying: 3,
            },
            Participant {
                id: ParticipantId::new("p-2").unwrap(),
                name: "Bruno".to_string(),
                days_staying: 2,
            },
        ];
        let results = compute_shares(600.0, &participants, &[], DivisionMode::Proportional, 0.0)
            .expect("valid inputs");
        let now = "2025-06-01T12:00:00Z".parse().unwrap();
        ExpenseSession {
            id: SessionId::new("sess-1").unwrap(),
            name: "beach house".to_string(),
            total_expense: 600.0,
            division_mode: DivisionMode::Proportional,
            global_days: None,
            participants,
            sub_expenses: vec![],
            results,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn session_serde_roundtrip() {
        let session = sample_session();
        let json = serde_json::to_string(&session).unwrap();
        let parsed: ExpenseSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn session_json_uses_original_field_names() {
        let session = sample_session();
        let json = serde_json::to_value(&session).unwrap();

        assert!(json.get("totalExpense").is_some());
        assert!(json.get("divisionMode").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["divisionMode"], "individual");
        // globalDays is omitted entirely when unset.
        assert!(json.get("globalDays").is_none());
    }

    #[test]
    fn session_parses_record_without_global_days() {
        let json = r#"{
            "id": "sess-2",
            "name": "cabin",
            "totalExpense": 100.0,
            "divisionMode": "equal",
            "participants": [],
            "subExpenses": [],
            "results": [],
            "createdAt": "2025-06-01T12:00:00Z",
            "updatedAt": "2025-06-01T12:00:00Z"
        }"#;
        let session: ExpenseSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.division_mode, DivisionMode::Equal);
        assert!(session.global_days.is_none());
    }
}
