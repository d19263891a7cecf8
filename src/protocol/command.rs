//! Command definitions
//!
//! Represents write commands sent to the store.

use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ProbeError, Result};

/// Write operation tag, serialized as its upper-case name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Set,
    Delete,
}

impl Operation {
    /// Wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Set => "SET",
            Operation::Delete => "DELETE",
        }
    }
}

impl FromStr for Operation {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SET" => Ok(Operation::Set),
            "DELETE" => Ok(Operation::Delete),
            other => Err(ProbeError::Protocol(format!("Unknown operation: {:?}", other))),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(de::Error::custom)
    }
}

/// A write command
///
/// Field order is the map order on the wire: `op`, `key`, `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteCommand {
    pub op: Operation,
    pub key: String,
    pub value: String,
}

impl WriteCommand {
    /// Associate `key` with `value`
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: Operation::Set,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Remove `key`
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            op: Operation::Delete,
            key: key.into(),
            value: String::new(),
        }
    }

    /// The store rejects commands with an empty key
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(ProbeError::Protocol(format!(
                "{} command: key must not be empty",
                self.op.as_str()
            )));
        }
        Ok(())
    }
}
