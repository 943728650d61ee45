use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who performed a mutating call. Passed into every lifecycle operation
/// for history attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub user_name: String,
}

impl Actor {
    /// Attribution used for changes made by the scheduler/applier rather
    /// than a person.
    pub fn system() -> Self {
        Self {
            user_id: "system".into(),
            user_name: "Dokwerk automatisering".into(),
        }
    }
}

/// One entry in a document's append-only history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub performed_by: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
}

impl HistoryEntry {
    /// Entry for a status transition, capturing both endpoints.
    pub fn transition(
        at: DateTime<Utc>,
        actor: &Actor,
        from: impl Into<String>,
        to: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: at,
            action: "status_change".into(),
            performed_by: actor.user_name.clone(),
            description: description.into(),
            from_status: Some(from.into()),
            to_status: Some(to.into()),
        }
    }

    /// Entry for a non-transition action (conversion, edit, clone).
    pub fn action(
        at: DateTime<Utc>,
        actor: &Actor,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: at,
            action: action.into(),
            performed_by: actor.user_name.clone(),
            description: description.into(),
            from_status: None,
            to_status: None,
        }
    }
}
