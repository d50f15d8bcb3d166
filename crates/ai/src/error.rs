//! Errors raised while parsing persisted engine input.
//!
//! Lookups never fail: an unknown strategy, action, trigger or value is
//! simply absent. These errors only cover text coming from storage or
//! from an operator, and callers log and drop the offending line.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AiError {
    #[error("invalid action line '{0}': expected 'trigger>action[!relevance],...'")]
    InvalidActionLine(String),

    #[error("invalid next action '{0}'")]
    InvalidNextAction(String),

    #[error("invalid relevance '{value}' in '{action}'")]
    InvalidRelevance { action: String, value: String },

    #[error("malformed value row '{0}': expected 'name>data'")]
    MalformedValueRow(String),

    #[error("value '{0}' rejected stored data")]
    ValueRejected(String),
}

pub type Result<T> = std::result::Result<T, AiError>;
