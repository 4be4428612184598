//! Wire Protocol for the statpipe Telemetry Pipe
//!
//! This crate is the **single source of truth** for everything that crosses
//! the wire between the browser pipe and the telemetry backend:
//!
//! - **Frame tags** (`tags`) - one constant per command and response kind
//! - **Commands** (`command`) - typed outbound queries
//! - **Responses** (`response`) - typed inbound replies
//! - **Codec** (`codec`) - binary encode/decode for both directions
//!
//! # Frame Layout
//!
//! Every frame starts with a little-endian `u16` discriminant tag followed
//! by the variant's parameters in a fixed order:
//!
//! ```text
//! ┌─────────────┬──────────────────────────────┐
//! │ tag: u16 LE │ parameters (fixed order)     │
//! └─────────────┴──────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Strings and byte blobs are
//! length-prefixed (`u32` length, then the bytes) so variable-length
//! payloads need no delimiters. Date-range bounds are `i64` Unix seconds;
//! ids are `u64`.
//!
//! Command frames carry their parameters directly. Response frames carry a
//! single length-prefixed JSON body that deserializes into the kind's
//! payload struct.
//!
//! # Tag Range Allocation
//!
//! | Range           | Direction            |
//! |-----------------|----------------------|
//! | 0x0001-0x00FF   | Commands (outbound)  |
//! | 0x0101-0x01FF   | Responses (inbound)  |
//!
//! Byte order and layout are a contract with the backend peer; changing
//! either side alone breaks the pipe.

#![no_std]

extern crate alloc;

pub mod codec;
pub mod command;
pub mod response;
pub mod tags;

pub use codec::{decode_command, decode_response, encode_command, encode_response, ProtoError};
pub use command::{CircuitId, Command, DateRange, DeviceId, NodeId, SiteId};
pub use response::{Response, ResponseKind};
