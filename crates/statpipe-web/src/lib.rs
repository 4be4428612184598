//! Browser binding for the statpipe telemetry pipe
//!
//! This crate runs in the browser's main thread and owns the WebSocket.
//! It is a pure boundary layer: connection state, queueing, encoding and
//! routing all live in `statpipe-core`; this crate only moves bytes and
//! JS values across the wasm-bindgen boundary.
//!
//! ## Module Structure
//!
//! - `pipe` - `TelemetryPipe`, the JS-facing handle and consumer registry
//! - `transport` - `Transport` implementation over `web_sys::WebSocket`
//! - `buffer` - raw buffer exports for the JS loader
//!
//! ## Usage (from JS)
//!
//! ```text
//! const pipe = new TelemetryPipe();
//! pipe.register_consumer("RttChart", (data) => draw(data.points));
//! pipe.connect("wss://lts.example.net/ws", sessionToken);
//! pipe.request_rtt_chart(start, end);   // queued until the socket is up
//! ```

// =============================================================================
// Module declarations
// =============================================================================

pub(crate) mod buffer;
pub(crate) mod pipe;
pub(crate) mod transport;

// =============================================================================
// Public re-exports
// =============================================================================

// Re-export the TelemetryPipe (main public API)
pub use pipe::TelemetryPipe;

// Re-export the transport for hosts embedding the core directly
pub use transport::WebSocketTransport;

// Buffer exports stay reachable for the loader
pub use buffer::{pipe_buffer_alloc, pipe_buffer_grow, pipe_buffer_release};
