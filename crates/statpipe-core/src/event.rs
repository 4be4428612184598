//! Socket events and the pure step function
//!
//! The host delivers socket lifecycle as explicit `SocketEvent` values;
//! `step` consumes one event and returns the effects the driver must
//! execute. `step` itself performs no I/O, so the whole lifecycle is
//! testable without a socket.
//!
//! Flush atomicity: the Connecting→Connected transition and the queue
//! drain happen inside one `step` call, so no new immediate send can
//! interleave with flushed frames and global send order is preserved.

use alloc::vec::Vec;

use statpipe_proto::{decode_response, encode_command, Command, Response};

use crate::error::PipeError;
use crate::state::PipeState;

/// Socket lifecycle as reported by the host environment.
#[derive(Clone, Debug, PartialEq)]
pub enum SocketEvent {
    /// The transport reports an open connection
    HandshakeSucceeded,
    /// The transport could not establish a connection
    HandshakeFailed,
    /// One raw inbound frame
    FrameReceived(Vec<u8>),
    /// The connection closed (either side)
    Closed,
}

/// What the driver must do after a step.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Hand this frame to the transport, in order
    Transmit(Vec<u8>),
    /// Route this response to its kind's consumer
    Deliver(Response),
    /// Surface a diagnostic to the host; no state was torn
    Diagnostic(PipeError),
}

/// Pure transition function: consume one socket event, mutate the pipe
/// state, and return the effects in execution order.
pub fn step(state: &mut PipeState, event: SocketEvent) -> Vec<Effect> {
    match event {
        SocketEvent::HandshakeSucceeded => {
            state.mark_connected();
            let mut effects = Vec::new();
            // Token first, so queued queries run authenticated.
            if let Some(token) = state.token() {
                let frame = encode_command(&Command::SetToken {
                    token: token.to_vec(),
                });
                effects.push(Effect::Transmit(frame));
            }
            for frame in state.drain_queue() {
                effects.push(Effect::Transmit(frame));
            }
            effects
        }
        SocketEvent::HandshakeFailed => {
            state.mark_disconnected();
            alloc::vec![Effect::Diagnostic(PipeError::ConnectionFailure)]
        }
        SocketEvent::Closed => {
            state.mark_disconnected();
            Vec::new()
        }
        SocketEvent::FrameReceived(frame) => match decode_response(&frame) {
            Ok(response) => alloc::vec![Effect::Deliver(response)],
            Err(_) => alloc::vec![Effect::Diagnostic(PipeError::MalformedFrame)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::check_invariants;
    use alloc::vec;
    use statpipe_proto::response::{RttHistogramData, RttSeries};
    use statpipe_proto::{encode_response, DateRange};

    fn frame(cmd: &Command) -> Vec<u8> {
        encode_command(cmd)
    }

    #[test]
    fn test_handshake_success_flushes_in_order() {
        let mut state = PipeState::new();
        let first = frame(&Command::NodeStatus);
        let second = frame(&Command::RttChart {
            range: DateRange::new(0, 604_800),
        });
        state.enqueue(first.clone());
        state.enqueue(second.clone());
        state.begin_connect(None);

        let effects = step(&mut state, SocketEvent::HandshakeSucceeded);
        assert_eq!(
            effects,
            vec![Effect::Transmit(first), Effect::Transmit(second)]
        );
        assert_eq!(state.queue_len(), 0);
        assert!(state.is_connected());
        assert!(check_invariants(&state).is_ok());
    }

    #[test]
    fn test_handshake_success_sends_token_before_queue() {
        let mut state = PipeState::new();
        let queued = frame(&Command::NodeStatus);
        state.enqueue(queued.clone());
        state.begin_connect(Some(b"session-token"));

        let effects = step(&mut state, SocketEvent::HandshakeSucceeded);
        let token_frame = frame(&Command::SetToken {
            token: b"session-token".to_vec(),
        });
        assert_eq!(
            effects,
            vec![Effect::Transmit(token_frame), Effect::Transmit(queued)]
        );
    }

    #[test]
    fn test_handshake_success_empty_queue_no_token() {
        let mut state = PipeState::new();
        state.begin_connect(None);
        assert_eq!(step(&mut state, SocketEvent::HandshakeSucceeded), vec![]);
        assert!(state.is_connected());
    }

    #[test]
    fn test_handshake_failure_preserves_queue() {
        let mut state = PipeState::new();
        state.enqueue(frame(&Command::NodeStatus));
        state.begin_connect(Some(b"tok"));

        let effects = step(&mut state, SocketEvent::HandshakeFailed);
        assert_eq!(
            effects,
            vec![Effect::Diagnostic(PipeError::ConnectionFailure)]
        );
        assert!(!state.is_connected());
        assert!(!state.is_connecting());
        assert!(state.token().is_none());
        assert_eq!(state.queue_len(), 1);
        assert!(check_invariants(&state).is_ok());
    }

    #[test]
    fn test_close_drops_token_silently() {
        let mut state = PipeState::new();
        state.begin_connect(Some(b"tok"));
        state.mark_connected();

        assert_eq!(step(&mut state, SocketEvent::Closed), vec![]);
        assert!(state.token().is_none());
    }

    #[test]
    fn test_frame_received_delivers_decoded_response() {
        let mut state = PipeState::new();
        state.mark_connected();

        let resp = Response::RttHistogram(RttHistogramData {
            buckets: vec![5, 9, 1],
        });
        let effects = step(&mut state, SocketEvent::FrameReceived(encode_response(&resp)));
        assert_eq!(effects, vec![Effect::Deliver(resp)]);
    }

    #[test]
    fn test_malformed_frame_dropped_connection_kept() {
        let mut state = PipeState::new();
        state.mark_connected();

        let effects = step(&mut state, SocketEvent::FrameReceived(vec![0xFF, 0xFF, 0x00]));
        assert_eq!(effects, vec![Effect::Diagnostic(PipeError::MalformedFrame)]);
        assert!(state.is_connected());
    }

    #[test]
    fn test_two_same_kind_frames_both_delivered() {
        let mut state = PipeState::new();
        state.mark_connected();

        let a = Response::RttChart(RttSeries { points: vec![] });
        let b = Response::RttChart(RttSeries { points: vec![] });
        let ea = step(&mut state, SocketEvent::FrameReceived(encode_response(&a)));
        let eb = step(&mut state, SocketEvent::FrameReceived(encode_response(&b)));
        assert_eq!(ea, vec![Effect::Deliver(a)]);
        assert_eq!(eb, vec![Effect::Deliver(b)]);
    }
}
