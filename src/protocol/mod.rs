//! Protocol Module
//!
//! Defines what goes over the wire to the store's HTTP front end.
//!
//! ## Write Envelope (MessagePack)
//!
//! ```text
//! ┌──────────┬────────────────┬────────────────┬──────────────────┐
//! │ map (3)  │ "op": "SET"    │ "key": <str>   │ "value": <str>   │
//! └──────────┴────────────────┴────────────────┴──────────────────┘
//! ```
//!
//! Strings use the MessagePack `str` family, so keys and values travel as
//! their raw UTF-8 bytes.
//!
//! ### Operations
//! - `SET`    - associate key with value
//! - `DELETE` - remove key (value is empty)
//!
//! ### Outcomes
//! - Write: accepted (HTTP 200), rejected (other status), unreachable
//! - Read:  value, not found, failed (error status), unreachable

mod command;
mod response;
mod codec;

pub use command::{Operation, WriteCommand};
pub use response::{ReadOutcome, WriteOutcome, KEY_NOT_FOUND_BODY};
pub use codec::{decode_command, encode_command, Envelope, MSGPACK_CONTENT_TYPE};
