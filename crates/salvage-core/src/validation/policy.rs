use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use tracing::warn;

use super::{CategoryRejection, InfraError, ValidationOutcome};
use crate::CoreError;

/// What to do when the category graph cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log a warning and accept the edit
    #[default]
    FailOpen,
    /// Reject the edit until the store is reachable again
    FailClosed,
}

impl FailurePolicy {
    /// Turn a check result into an outcome
    pub fn resolve(&self, result: Result<ValidationOutcome, InfraError>) -> ValidationOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(err) => match self {
                FailurePolicy::FailOpen => {
                    warn!(error = %err, "Category graph unavailable, accepting sub-categories unchecked");
                    ValidationOutcome::Valid
                }
                FailurePolicy::FailClosed => {
                    warn!(error = %err, "Category graph unavailable, rejecting sub-categories");
                    ValidationOutcome::Rejected(CategoryRejection::ValidationUnavailable)
                }
            },
        }
    }
}

impl Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailOpen => f.write_str("fail-open"),
            FailurePolicy::FailClosed => f.write_str("fail-closed"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "open" => Ok(FailurePolicy::FailOpen),
            "fail-closed" | "closed" => Ok(FailurePolicy::FailClosed),
            other => Err(CoreError::ConfigurationError(format!(
                "Unknown validation failure policy: {}",
                other
            ))),
        }
    }
}
