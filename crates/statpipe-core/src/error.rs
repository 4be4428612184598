//! Pipe errors
//!
//! Nothing in this crate is fatal to the host: every failure is scoped to
//! one pipe instance and recoverable by reconnecting.

use statpipe_proto::ProtoError;

/// Pipe failures, by recovery path:
///
/// - `ConnectionFailure` recovers locally (state machine transitions to
///   Disconnected, queue preserved)
/// - `MalformedFrame` recovers locally (frame dropped, connection kept)
/// - `InvalidParameters` / `AllocationFailure` surface synchronously to
///   the calling operation, which aborts without partial state mutation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeError {
    /// Handshake or transport-level send failure
    ConnectionFailure,
    /// An inbound frame did not decode
    MalformedFrame,
    /// A dispatcher was called with out-of-range or inconsistent parameters
    InvalidParameters,
    /// A cross-boundary buffer could not be obtained
    AllocationFailure,
}

impl PipeError {
    /// Human-readable error name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeError::ConnectionFailure => "connection failure",
            PipeError::MalformedFrame => "malformed frame",
            PipeError::InvalidParameters => "invalid parameters",
            PipeError::AllocationFailure => "allocation failure",
        }
    }
}

impl core::fmt::Display for PipeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProtoError> for PipeError {
    fn from(_: ProtoError) -> Self {
        PipeError::MalformedFrame
    }
}
