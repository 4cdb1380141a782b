use serde::{Deserialize, Serialize};

/// Message shown for infrastructure failures. Safe to retry.
pub const RETRY_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    NameMismatch,
    AddressMismatch,
    MissingFields,
    Unknown,
}

/// Result of an identity verification attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    Pass,
    #[serde(rename_all = "camelCase")]
    Fail {
        kind: FailureKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        affected_field: Option<String>,
    },
}

impl VerificationOutcome {
    pub fn fail(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            message: message.into(),
            affected_field: None,
        }
    }

    pub fn fail_on(kind: FailureKind, message: impl Into<String>, field: &str) -> Self {
        Self::Fail {
            kind,
            message: message.into(),
            affected_field: Some(field.to_string()),
        }
    }

    pub fn unknown() -> Self {
        Self::fail(FailureKind::Unknown, RETRY_MESSAGE)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Pass => None,
            Self::Fail { kind, .. } => Some(*kind),
        }
    }

    /// Only substantive rejections count toward the attempt cap.
    pub fn consumes_attempt(&self) -> bool {
        matches!(self.kind(), Some(kind) if kind != FailureKind::Unknown)
    }
}
