//! Rules errors
//!
//! Every failure the rules core reports is local and recoverable; the caller
//! decides whether to surface it or retry with corrected input.

use thiserror::Error;

/// Errors returned by rules operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid dice formula '{formula}': {reason}")]
    InvalidFormula { formula: String, reason: String },

    #[error("insufficient {name}: requested {requested}, {available} available")]
    InsufficientResource {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("{what} out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("no point-buy cost for score {0}")]
    UnsupportedScore(i32),

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("malformed entity key: {0}")]
    MalformedKey(String),

    #[error("reference data error: {0}")]
    ReferenceData(String),
}

impl RulesError {
    pub(crate) fn invalid_formula(formula: &str, reason: impl Into<String>) -> Self {
        RulesError::InvalidFormula {
            formula: formula.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(what: &'static str, value: i64, min: i64, max: i64) -> Self {
        RulesError::OutOfRange {
            what,
            value,
            min,
            max,
        }
    }
}

impl From<serde_json::Error> for RulesError {
    fn from(err: serde_json::Error) -> Self {
        RulesError::ReferenceData(err.to_string())
    }
}

/// Result alias for rules operations
pub type Result<T> = std::result::Result<T, RulesError>;
