//! Response definitions
//!
//! Classifies what the store answered to a write or a read.

use std::fmt;

/// Body the store returns on a read of a missing key (with status 200)
pub const KEY_NOT_FOUND_BODY: &str = "Key Not Found";

/// Result of submitting a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// HTTP 200
    Accepted { body: String },

    /// Any other HTTP status
    Rejected { status: u16, body: String },

    /// The request never got a response
    Unreachable { reason: String },

    /// The command could not be encoded; nothing was sent
    Invalid { reason: String },
}

impl WriteOutcome {
    /// Classify an HTTP response to a write
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 200 {
            WriteOutcome::Accepted { body }
        } else {
            WriteOutcome::Rejected { status, body }
        }
    }

    /// Only HTTP 200 counts as success
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Accepted { .. })
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOutcome::Accepted { body } => write!(f, "accepted ({})", body),
            WriteOutcome::Rejected { status, body } => {
                write!(f, "rejected with status {} ({})", status, body)
            }
            WriteOutcome::Unreachable { reason } => write!(f, "unreachable: {}", reason),
            WriteOutcome::Invalid { reason } => write!(f, "invalid command: {}", reason),
        }
    }
}

/// Result of a read-back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// HTTP 200 with a value
    Value(String),

    /// HTTP 404, or HTTP 200 carrying the store's not-found marker
    NotFound,

    /// Any other HTTP status
    Failed { status: u16, body: String },

    /// The request never got a response
    Unreachable { reason: String },
}

impl ReadOutcome {
    /// Classify an HTTP response to a read
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            200 if body == KEY_NOT_FOUND_BODY => ReadOutcome::NotFound,
            200 => ReadOutcome::Value(body),
            404 => ReadOutcome::NotFound,
            _ => ReadOutcome::Failed { status, body },
        }
    }

    /// The value read, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            ReadOutcome::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ReadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadOutcome::Value(v) => write!(f, "value {:?}", v),
            ReadOutcome::NotFound => write!(f, "not found"),
            ReadOutcome::Failed { status, body } => {
                write!(f, "failed with status {} ({})", status, body)
            }
            ReadOutcome::Unreachable { reason } => write!(f, "unreachable: {}", reason),
        }
    }
}
