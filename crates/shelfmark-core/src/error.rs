use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ShelfError>;

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("cannot move {node_id} into its own subtree ({target_id})")]
    Cycle { node_id: String, target_id: String },

    #[error("store command failed: {0}")]
    Store(String),

    #[error("resort stopped after {applied} of {issued} moves: {message}")]
    ResortFailure {
        issued: usize,
        applied: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ShelfError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Cycle { .. } => "CYCLE_REJECTED",
            Self::Store(_) => "STORE_COMMAND_FAILED",
            Self::ResortFailure { .. } => "RESORT_PARTIAL_FAILURE",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Errors raised by the host store rather than by local validation.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::ResortFailure { .. })
    }

    pub fn to_payload(
        &self,
        operation: impl Into<String>,
        target_id: Option<String>,
    ) -> ErrorPayload {
        let details = match self {
            Self::Cycle { node_id, target_id } => Some(serde_json::json!({
                "node_id": node_id,
                "target_id": target_id,
            })),
            Self::ResortFailure {
                issued, applied, ..
            } => Some(serde_json::json!({
                "issued": issued,
                "applied": applied,
            })),
            _ => None,
        };
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            target_id,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_payload_carries_both_ids() {
        let err = ShelfError::Cycle {
            node_id: "a".to_string(),
            target_id: "c".to_string(),
        };
        let payload = err.to_payload("reparent", Some("a".to_string()));
        assert_eq!(payload.code, "CYCLE_REJECTED");
        assert_eq!(payload.operation, "reparent");
        let details = payload.details.expect("details");
        assert_eq!(details["node_id"], "a");
        assert_eq!(details["target_id"], "c");
        assert!(Uuid::parse_str(&payload.trace_id).is_ok());
    }

    #[test]
    fn store_failures_are_classified() {
        assert!(ShelfError::Store("offline".to_string()).is_store_failure());
        assert!(
            ShelfError::ResortFailure {
                issued: 3,
                applied: 1,
                message: "offline".to_string(),
            }
            .is_store_failure()
        );
        assert!(!ShelfError::Validation("bad".to_string()).is_store_failure());
    }

    #[test]
    fn domain_variants_map_to_distinct_codes() {
        let errors = [
            ShelfError::NotFound("x".to_string()),
            ShelfError::Validation("x".to_string()),
            ShelfError::Cycle {
                node_id: "a".to_string(),
                target_id: "b".to_string(),
            },
            ShelfError::Store("x".to_string()),
            ShelfError::ResortFailure {
                issued: 2,
                applied: 1,
                message: "x".to_string(),
            },
            ShelfError::Internal("x".to_string()),
        ];
        let codes = errors
            .iter()
            .map(ShelfError::code)
            .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains("CONFLICT"));
    }
}
