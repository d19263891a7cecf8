//! # raftkv-probe
//!
//! Write-then-verify probe for a replicated key-value store:
//! - MessagePack-encoded `SET`/`DELETE` commands over HTTP
//! - Read-back through the store's plain-text GET endpoint
//! - Fixed-delay or poll-with-backoff wait for replication
//! - Tagged write/read outcomes instead of bare booleans
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Harness                              │
//! │          submit write → wait → verify read → report          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │   Network   │
//!   │  (MsgPack)  │          │ (HTTP/1.1)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                       ┌───────────────────────┐
//!                       │  Store (Raft cluster) │
//!                       │  /insert-val /get-val │
//!                       └───────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod harness;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ProbeError, Result};
pub use config::{Config, ConsistencyStrategy};
pub use harness::{Harness, RunReport};
pub use protocol::{ReadOutcome, WriteCommand, WriteOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of raftkv-probe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
