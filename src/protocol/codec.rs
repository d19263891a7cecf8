//! Protocol codec
//!
//! MessagePack encoding and decoding of write commands.

use crate::error::{ProbeError, Result};
use super::WriteCommand;

/// Content type announced for envelope bodies
pub const MSGPACK_CONTENT_TYPE: &str = "application/msgpack";

/// Maximum envelope size accepted by `decode_command` (16 MB)
pub const MAX_ENVELOPE_SIZE: usize = 16 * 1024 * 1024;

/// Serialized write command, ready to be used as a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    bytes: Vec<u8>,
}

impl Envelope {
    /// Raw envelope bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte length, i.e. the `Content-Length` of the request carrying it
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Encode a command as a MessagePack map keyed by field name
pub fn encode_command(command: &WriteCommand) -> Result<Envelope> {
    command.validate()?;
    let bytes = rmp_serde::to_vec_named(command)?;
    Ok(Envelope { bytes })
}

/// Decode a command from MessagePack bytes
pub fn decode_command(bytes: &[u8]) -> Result<WriteCommand> {
    if bytes.len() > MAX_ENVELOPE_SIZE {
        return Err(ProbeError::Protocol(format!(
            "Envelope too large: {} bytes (max {})",
            bytes.len(),
            MAX_ENVELOPE_SIZE
        )));
    }

    let command: WriteCommand = rmp_serde::from_slice(bytes)?;
    command.validate()?;
    Ok(command)
}
