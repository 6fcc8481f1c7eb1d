// src/protocol/error.rs
//
// Reasons an operator-entered command text is rejected.
// Rejections are an expected outcome of validation, never a fault.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("command is empty")]
    Blank,

    #[error("command is too short")]
    TooShort,

    #[error("command must start with '$'")]
    MissingPrefix,

    #[error("command must end with ';'")]
    MissingTerminator,

    #[error("unknown command")]
    UnknownCommand,

    #[error("'{keyword}' takes no arguments")]
    UnexpectedArguments { keyword: &'static str },

    #[error("'{keyword}' expects {expected} argument(s), got {found}")]
    WrongArity {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("malformed '{keyword}' command")]
    Malformed { keyword: &'static str },

    #[error("'{value}' is not a valid integer for {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("unknown axis '{0}' (expected pitch, roll or yaw)")]
    UnknownAxis(String),
}
