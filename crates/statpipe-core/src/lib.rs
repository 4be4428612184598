//! statpipe Core - Pure Pipe State Machine
//!
//! This crate contains the platform-free heart of the telemetry pipe: the
//! connection lifecycle, the outbound queue, command dispatch, and the
//! response router. It performs no I/O and has no JS dependency - the
//! socket lives behind the `Transport` trait, and socket lifecycle arrives
//! as explicit `SocketEvent` values.
//!
//! # Design Principles
//!
//! 1. **No platform dependency**: browser wiring lives in `statpipe-web`
//! 2. **No I/O or side effects in `step`**: pure state transformations only
//! 3. **Deterministic**: same events in, same effects out
//! 4. **Testable without a socket**: drive `SocketEvent`s, record effects
//!
//! # Architecture
//!
//! ```text
//! UI call                     socket callback
//!    │                              │
//!    ▼                              ▼
//! ┌──────────────┐   encode   ┌───────────────┐
//! │  dispatcher  │──────────▶ │ step(state,   │
//! │  (Pipe::     │            │      event)   │
//! │  request_*)  │            └──────┬────────┘
//! └──────┬───────┘                   │ effects
//!        │ Connected? send : queue   ▼
//!        ▼                    ┌───────────────┐
//! ┌──────────────┐            │  Transmit /   │
//! │ OutboundQueue│◀──flush────│  Deliver /    │
//! └──────────────┘            │  Diagnostic   │
//!                             └───────────────┘
//! ```
//!
//! # Module Organization
//!
//! - `state` - `PipeState`: connection state, outbound queue, auth token
//! - `event` - `SocketEvent` and the pure `step` transition function
//! - `pipe` - `Transport` seam, `Pipe` driver, one dispatcher per query
//! - `error` - `PipeError`

#![no_std]

extern crate alloc;

pub mod error;
pub mod event;
pub mod pipe;
pub mod state;

pub use error::PipeError;
pub use event::{step, Effect, SocketEvent};
pub use pipe::{Delivery, Pipe, Transport};
pub use state::{ConnectionState, PipeState};
