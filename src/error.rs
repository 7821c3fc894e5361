//! Error types for portfolio data import and label parsing.

use thiserror::Error;

/// Failure modes of [`crate::transfer::import_data`].
///
/// Only malformed JSON and a missing `projects` array are rejected; every
/// other gap in the payload is defaulted.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to parse JSON file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid data file. {reason}")]
    Validation { reason: String },
}

/// A categorical label that does not name any variant of a closed enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind} '{label}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl ImportError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
