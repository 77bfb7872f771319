//! Error types for zone-rules operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    #[error("Zone not found: {0}")]
    RuleNotFound(String),

    #[error("Invalid transition rule: {0}")]
    InvalidTransitionRule(String),

    #[error("Invalid rule data: {0}")]
    InvalidRuleData(String),

    #[error("Datetime out of range: {0}")]
    OutOfRange(String),

    #[error("Rule source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, ZoneError>;
