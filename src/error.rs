use thiserror::Error;

/// Errors surfaced by the lifecycle engine.
///
/// Expected business conditions (a guard that says "no") are carried as
/// [`EngineError::Validation`] with the guard's human-readable message;
/// callers branch on them rather than crash. `Conflict` is retryable and
/// retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{message}")]
    Validation {
        message: String,
        suggested_action: Option<String>,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Work order {0} is completed; sync refused")]
    SyncRefused(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EngineError {
    /// Wraps a blocking validation outcome into an error for callers that
    /// want abort-on-reject semantics.
    pub fn validation(message: impl Into<String>, suggested_action: Option<String>) -> Self {
        Self::Validation {
            message: message.into(),
            suggested_action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_is_the_message() {
        let err = EngineError::validation("Offerte is nog niet goedgekeurd", None);
        assert_eq!(err.to_string(), "Offerte is nog niet goedgekeurd");
    }

    #[test]
    fn not_found_display() {
        let err = EngineError::NotFound {
            kind: "invoice",
            id: "inv-9".into(),
        };
        assert_eq!(err.to_string(), "invoice not found: inv-9");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }
}
