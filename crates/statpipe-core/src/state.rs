//! Pipe state - pure data, no I/O
//!
//! `PipeState` owns everything mutable about one pipe instance: the
//! connection state, the outbound queue of encoded frames, and the auth
//! token. All transitions go through the methods here or through
//! `event::step`; external code only observes.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Connection lifecycle state. Exactly one value exists per pipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket, initial state
    Disconnected,
    /// Handshake initiated, outcome not yet reported
    Connecting,
    /// Handshake completed, frames flow
    Connected,
}

/// All mutable state of one pipe instance.
pub struct PipeState {
    /// Current connection state
    connection: ConnectionState,
    /// Encoded frames awaiting a connection, oldest first
    queue: VecDeque<Vec<u8>>,
    /// Auth token held for this connection; cleared on disconnect
    token: Option<Vec<u8>>,
}

impl PipeState {
    /// Create a fresh disconnected pipe state.
    pub fn new() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            queue: VecDeque::new(),
            token: None,
        }
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Current connection state.
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// True while the handshake has completed.
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// True while a handshake is in flight.
    pub fn is_connecting(&self) -> bool {
        self.connection == ConnectionState::Connecting
    }

    /// Number of frames waiting in the outbound queue.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// The held auth token, if any.
    pub fn token(&self) -> Option<&[u8]> {
        self.token.as_deref()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Record a connect initiation: store the caller-supplied token (if
    /// any) and mark the handshake as in flight. The queue is untouched.
    pub fn begin_connect(&mut self, token: Option<&[u8]>) {
        if let Some(token) = token {
            self.token = Some(token.to_vec());
        }
        self.connection = ConnectionState::Connecting;
    }

    /// Force Connecting without side effects. Used when the host initiates
    /// the handshake itself and needs the state observable before the
    /// socket callback fires.
    pub fn mark_connecting(&mut self) {
        self.connection = ConnectionState::Connecting;
    }

    /// Handshake succeeded.
    pub fn mark_connected(&mut self) {
        self.connection = ConnectionState::Connected;
    }

    /// Handshake failed or the socket closed. The queue is preserved for
    /// the next connection; the token is not (the caller must resupply
    /// credentials explicitly - login is never auto-replayed).
    pub fn mark_disconnected(&mut self) {
        self.connection = ConnectionState::Disconnected;
        self.token = None;
    }

    // ========================================================================
    // Outbound queue
    // ========================================================================

    /// Append an encoded frame to the queue tail. Ownership transfers.
    pub fn enqueue(&mut self, frame: Vec<u8>) {
        self.queue.push_back(frame);
    }

    /// Drain the queue in insertion order, leaving it empty.
    pub fn drain_queue(&mut self) -> Vec<Vec<u8>> {
        self.queue.drain(..).collect()
    }

    /// Push a frame back to the queue head (send failed mid-flush; keep
    /// global order for the next attempt).
    pub fn requeue_front(&mut self, frame: Vec<u8>) {
        self.queue.push_front(frame);
    }
}

impl Default for PipeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural invariants, asserted by tests after every transition.
///
/// The queue may only hold frames while no connection is up (flush drains
/// it atomically inside the Connecting→Connected transition), and a held
/// token implies the pipe is not Disconnected.
pub fn check_invariants(state: &PipeState) -> Result<(), &'static str> {
    if state.is_connected() && state.queue_len() > 0 {
        return Err("outbound queue non-empty while connected");
    }
    if state.connection() == ConnectionState::Disconnected && state.token().is_some() {
        return Err("auth token retained while disconnected");
    }
    Ok(())
}
