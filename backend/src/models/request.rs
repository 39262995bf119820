//! Shared approval-workflow types used by timesheet entries and day-off requests.

use serde::{Deserialize, Serialize};

/// Workflow status of a record that awaits an approver decision.
///
/// `Pending` is the only state a transition may start from; `Approved` and
/// `Rejected` are terminal. There is no path back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn db_value(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// True once the record has received its decision.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// The decision an approver hands down on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// The terminal status this decision transitions the record into.
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Payload for the decision endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_status_serde_snake_case() {
        let status: RequestStatus = serde_json::from_str("\"approved\"").unwrap();
        assert!(matches!(status, RequestStatus::Approved));
        let value = serde_json::to_value(RequestStatus::Pending).unwrap();
        assert_eq!(value, serde_json::json!("pending"));
    }

    #[test]
    fn terminal_states_are_exactly_the_decided_ones() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn decision_maps_to_its_terminal_status() {
        assert_eq!(Decision::Approved.target_status(), RequestStatus::Approved);
        assert_eq!(Decision::Rejected.target_status(), RequestStatus::Rejected);
    }
}
