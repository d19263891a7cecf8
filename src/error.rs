//! Error types for raftkv-probe
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ProbeError
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Unified error type for probe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("MsgPack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("MsgPack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
