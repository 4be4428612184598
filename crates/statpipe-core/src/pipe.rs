//! Pipe driver and command dispatch
//!
//! `Pipe` binds the pure state machine to a `Transport` and exposes one
//! dispatcher method per query kind. Every dispatcher is fire-and-forget:
//! it validates, encodes, and either transmits (Connected) or enqueues
//! (otherwise). The eventual answer arrives later through `handle_event`
//! as a `Delivery` for the response router.

use alloc::vec::Vec;

use statpipe_proto::{
    encode_command, CircuitId, Command, DateRange, DeviceId, NodeId, Response, SiteId,
};

use crate::error::PipeError;
use crate::event::{step, Effect, SocketEvent};
use crate::state::{ConnectionState, PipeState};

/// Platform socket seam. The browser crate implements this over
/// `web_sys::WebSocket`; tests implement it with a recording mock.
pub trait Transport {
    /// Begin an asynchronous handshake to `endpoint`. Success or failure
    /// is reported later via `SocketEvent`, not by this call.
    fn open(&mut self, endpoint: &str) -> Result<(), PipeError>;

    /// Hand one encoded frame to the open socket.
    fn transmit(&mut self, frame: &[u8]) -> Result<(), PipeError>;

    /// Tear the socket down. Idempotent.
    fn close(&mut self);
}

/// Router-bound output of `handle_event`.
#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    /// A decoded response for the kind's registered consumer
    Response(Response),
    /// A diagnostic for the host (frame dropped, connection lost)
    Diagnostic(PipeError),
}

/// One telemetry pipe instance: pure state plus its transport.
///
/// All entry points are synchronous and return immediately; the only
/// asynchrony is the socket itself, observed via `handle_event`.
pub struct Pipe<T: Transport> {
    state: PipeState,
    transport: T,
}

impl<T: Transport> Pipe<T> {
    /// Create a disconnected pipe over `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            state: PipeState::new(),
            transport,
        }
    }

    /// Borrow the transport (the web crate needs the socket handle to
    /// attach its callbacks).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initiate a connection to `endpoint`, optionally presenting `token`
    /// once the handshake completes. Valid from Disconnected or Connected
    /// (reconnect); a no-op while a handshake is already in flight.
    ///
    /// Returns immediately; the transition to Connected or back to
    /// Disconnected happens on a later `SocketEvent`.
    pub fn connect(&mut self, endpoint: &str, token: Option<&[u8]>) -> Result<(), PipeError> {
        if self.state.is_connecting() {
            return Ok(());
        }
        if self.state.is_connected() {
            self.transport.close();
            self.state.mark_disconnected();
        }
        self.state.begin_connect(token);
        if self.transport.open(endpoint).is_err() {
            self.state.mark_disconnected();
            return Err(PipeError::ConnectionFailure);
        }
        Ok(())
    }

    /// Force Connecting without touching the transport. Used when the
    /// host opened the socket itself and needs the state observable
    /// before its open callback fires.
    pub fn mark_connecting(&mut self) {
        self.state.mark_connecting();
    }

    /// Close the connection and discard the auth token. Queued commands
    /// are preserved for the next connection.
    pub fn disconnect(&mut self) {
        self.transport.close();
        self.state.mark_disconnected();
    }

    /// True while the handshake has completed.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// True while a handshake is in flight.
    pub fn is_connecting(&self) -> bool {
        self.state.is_connecting()
    }

    /// Current connection state.
    pub fn connection(&self) -> ConnectionState {
        self.state.connection()
    }

    /// Number of frames waiting for a connection.
    pub fn queue_len(&self) -> usize {
        self.state.queue_len()
    }

    // ========================================================================
    // Socket events and flushing
    // ========================================================================

    /// Consume one socket event: run the pure step, execute its transmit
    /// effects against the transport, and return the deliveries for the
    /// response router.
    pub fn handle_event(&mut self, event: SocketEvent) -> Vec<Delivery> {
        let effects = step(&mut self.state, event);
        self.execute(effects)
    }

    /// Explicit flush entry point for hosts that drive the socket
    /// themselves and report "open" out of band. A no-op unless Connected
    /// with a non-empty queue.
    pub fn flush_queue(&mut self) -> Vec<Delivery> {
        if !self.state.is_connected() || self.state.queue_len() == 0 {
            return Vec::new();
        }
        let effects = self
            .state
            .drain_queue()
            .into_iter()
            .map(Effect::Transmit)
            .collect();
        self.execute(effects)
    }

    /// Execute effects in order. A transmit failure mid-flush re-queues
    /// the failed frame and everything behind it (nothing is dropped or
    /// reordered), transitions to Disconnected, and surfaces one
    /// diagnostic.
    fn execute(&mut self, effects: Vec<Effect>) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        let mut failed = false;
        for effect in effects {
            match effect {
                Effect::Transmit(frame) => {
                    if failed {
                        self.state.enqueue(frame);
                    } else if self.transport.transmit(&frame).is_err() {
                        failed = true;
                        self.state.enqueue(frame);
                        deliveries.push(Delivery::Diagnostic(PipeError::ConnectionFailure));
                    }
                }
                Effect::Deliver(response) => deliveries.push(Delivery::Response(response)),
                Effect::Diagnostic(err) => deliveries.push(Delivery::Diagnostic(err)),
            }
        }
        if failed {
            self.transport.close();
            self.state.mark_disconnected();
        }
        deliveries
    }

    // ========================================================================
    // Dispatch core
    // ========================================================================

    /// Encode and route one command: immediate send while Connected,
    /// queued otherwise.
    fn dispatch(&mut self, cmd: Command) -> Result<(), PipeError> {
        let frame = encode_command(&cmd);
        if self.state.is_connected() {
            if self.transport.transmit(&frame).is_err() {
                // Keep the command for the next connection.
                self.state.enqueue(frame);
                self.transport.close();
                self.state.mark_disconnected();
                return Err(PipeError::ConnectionFailure);
            }
            Ok(())
        } else {
            self.state.enqueue(frame);
            Ok(())
        }
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Present a session token. Sent immediately while Connected, queued
    /// like any other command otherwise - one frame either way. A token
    /// supplied to `connect` instead rides the handshake transition and
    /// is emitted ahead of the queue.
    pub fn send_token(&mut self, token: &[u8]) -> Result<(), PipeError> {
        if token.is_empty() {
            return Err(PipeError::InvalidParameters);
        }
        self.dispatch(Command::SetToken {
            token: token.to_vec(),
        })
    }

    /// Log in with a credential pair. The resulting session token arrives
    /// as a `LoginOk` response; it is not captured here.
    pub fn send_login(&mut self, username: &str, password: &str) -> Result<(), PipeError> {
        if username.is_empty() || password.is_empty() {
            return Err(PipeError::InvalidParameters);
        }
        self.dispatch(Command::Login {
            username: username.into(),
            password: password.into(),
        })
    }

    // ========================================================================
    // Query dispatchers - one per kind
    // ========================================================================

    /// Shaper node status.
    pub fn request_node_status(&mut self) -> Result<(), PipeError> {
        self.dispatch(Command::NodeStatus)
    }

    /// Packet-loss chart for the whole network.
    pub fn request_packet_chart(&mut self, range: DateRange) -> Result<(), PipeError> {
        valid_range(range)?;
        self.dispatch(Command::PacketChart { range })
    }

    /// Packet-loss chart for one node.
    pub fn request_packet_chart_for_node(
        &mut self,
        range: DateRange,
        node: NodeId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(node.0)?;
        self.dispatch(Command::PacketChartForNode { range, node })
    }

    /// Throughput chart for the whole network.
    pub fn request_throughput_chart(&mut self, range: DateRange) -> Result<(), PipeError> {
        valid_range(range)?;
        self.dispatch(Command::ThroughputChart { range })
    }

    /// Throughput chart for one site.
    pub fn request_throughput_chart_for_site(
        &mut self,
        range: DateRange,
        site: SiteId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(site.0)?;
        self.dispatch(Command::ThroughputChartForSite { range, site })
    }

    /// Throughput chart for one node.
    pub fn request_throughput_chart_for_node(
        &mut self,
        range: DateRange,
        node: NodeId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(node.0)?;
        self.dispatch(Command::ThroughputChartForNode { range, node })
    }

    /// Throughput chart for one circuit.
    pub fn request_throughput_chart_for_circuit(
        &mut self,
        range: DateRange,
        circuit: CircuitId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(circuit.0)?;
        self.dispatch(Command::ThroughputChartForCircuit { range, circuit })
    }

    /// RTT chart for the whole network.
    pub fn request_rtt_chart(&mut self, range: DateRange) -> Result<(), PipeError> {
        valid_range(range)?;
        self.dispatch(Command::RttChart { range })
    }

    /// RTT histogram for the whole network.
    pub fn request_rtt_histogram(&mut self, range: DateRange) -> Result<(), PipeError> {
        valid_range(range)?;
        self.dispatch(Command::RttHistogram { range })
    }

    /// RTT chart for one site.
    pub fn request_rtt_chart_for_site(
        &mut self,
        range: DateRange,
        site: SiteId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(site.0)?;
        self.dispatch(Command::RttChartForSite { range, site })
    }

    /// RTT chart for one node.
    pub fn request_rtt_chart_for_node(
        &mut self,
        range: DateRange,
        node: NodeId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(node.0)?;
        self.dispatch(Command::RttChartForNode { range, node })
    }

    /// RTT chart for one circuit.
    pub fn request_rtt_chart_for_circuit(
        &mut self,
        range: DateRange,
        circuit: CircuitId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(circuit.0)?;
        self.dispatch(Command::RttChartForCircuit { range, circuit })
    }

    /// CPU/RAM performance chart for one node.
    pub fn request_node_perf_chart(
        &mut self,
        range: DateRange,
        node: NodeId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(node.0)?;
        self.dispatch(Command::NodePerfChart { range, node })
    }

    /// Stacked per-child throughput under one site.
    pub fn request_site_stack(&mut self, range: DateRange, site: SiteId) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(site.0)?;
        self.dispatch(Command::SiteStack { range, site })
    }

    /// RTT heat map rooted at the network root.
    pub fn request_root_heat(&mut self, range: DateRange) -> Result<(), PipeError> {
        valid_range(range)?;
        self.dispatch(Command::RootHeat { range })
    }

    /// RTT heat map rooted at one site.
    pub fn request_site_heat(&mut self, range: DateRange, site: SiteId) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(site.0)?;
        self.dispatch(Command::SiteHeat { range, site })
    }

    /// Topology tree; `None` roots at the network root.
    pub fn request_tree(&mut self, parent: Option<SiteId>) -> Result<(), PipeError> {
        if let Some(site) = parent {
            valid_id(site.0)?;
        }
        self.dispatch(Command::Tree { parent })
    }

    /// Detail record for one site.
    pub fn request_site_info(&mut self, site: SiteId) -> Result<(), PipeError> {
        valid_id(site.0)?;
        self.dispatch(Command::SiteInfo { site })
    }

    /// Parent chain of one site.
    pub fn request_site_parents(&mut self, site: SiteId) -> Result<(), PipeError> {
        valid_id(site.0)?;
        self.dispatch(Command::SiteParents { site })
    }

    /// Parent chain of one circuit.
    pub fn request_circuit_parents(&mut self, circuit: CircuitId) -> Result<(), PipeError> {
        valid_id(circuit.0)?;
        self.dispatch(Command::CircuitParents { circuit })
    }

    /// Parent chain of the network root.
    pub fn request_root_parents(&mut self) -> Result<(), PipeError> {
        self.dispatch(Command::RootParents)
    }

    /// Free-text search over sites, circuits and devices.
    pub fn request_search(&mut self, term: &str) -> Result<(), PipeError> {
        if term.trim().is_empty() {
            return Err(PipeError::InvalidParameters);
        }
        self.dispatch(Command::Search { term: term.into() })
    }

    /// Detail record for one circuit.
    pub fn request_circuit_info(&mut self, circuit: CircuitId) -> Result<(), PipeError> {
        valid_id(circuit.0)?;
        self.dispatch(Command::CircuitInfo { circuit })
    }

    /// Vendor device records for one device.
    pub fn request_ext_device_info(&mut self, device: DeviceId) -> Result<(), PipeError> {
        valid_id(device.0)?;
        self.dispatch(Command::ExtDeviceInfo { device })
    }

    /// Signal/noise graph for one device.
    pub fn request_ext_snr_graph(
        &mut self,
        range: DateRange,
        device: DeviceId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(device.0)?;
        self.dispatch(Command::ExtSnrGraph { range, device })
    }

    /// Capacity graph for one device.
    pub fn request_ext_capacity_graph(
        &mut self,
        range: DateRange,
        device: DeviceId,
    ) -> Result<(), PipeError> {
        valid_range(range)?;
        valid_id(device.0)?;
        self.dispatch(Command::ExtCapacityGraph { range, device })
    }
}

fn valid_range(range: DateRange) -> Result<(), PipeError> {
    if range.is_well_formed() {
        Ok(())
    } else {
        Err(PipeError::InvalidParameters)
    }
}

fn valid_id(raw: u64) -> Result<(), PipeError> {
    if raw == 0 {
        Err(PipeError::InvalidParameters)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use statpipe_proto::decode_command;

    /// Records every frame handed to it; failures on demand.
    struct RecordingTransport {
        sent: Vec<Vec<u8>>,
        opened: Vec<alloc::string::String>,
        fail_open: bool,
        fail_transmit: bool,
        closed: usize,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                opened: Vec::new(),
                fail_open: false,
                fail_transmit: false,
                closed: 0,
            }
        }
    }

    impl Transport for RecordingTransport {
        fn open(&mut self, endpoint: &str) -> Result<(), PipeError> {
            if self.fail_open {
                return Err(PipeError::ConnectionFailure);
            }
            self.opened.push(endpoint.into());
            Ok(())
        }

        fn transmit(&mut self, frame: &[u8]) -> Result<(), PipeError> {
            if self.fail_transmit {
                return Err(PipeError::ConnectionFailure);
            }
            self.sent.push(frame.to_vec());
            Ok(())
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn connected_pipe() -> Pipe<RecordingTransport> {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.connect("wss://example.net/ws", None).unwrap();
        pipe.handle_event(SocketEvent::HandshakeSucceeded);
        pipe
    }

    #[test]
    fn test_connect_is_non_blocking() {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.connect("wss://example.net/ws", None).unwrap();
        assert!(pipe.is_connecting());
        assert!(!pipe.is_connected());
        assert_eq!(pipe.transport_mut().opened.len(), 1);
    }

    #[test]
    fn test_connect_while_connecting_is_noop() {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.connect("wss://a/ws", None).unwrap();
        pipe.connect("wss://b/ws", None).unwrap();
        assert_eq!(pipe.transport_mut().opened, vec!["wss://a/ws"]);
    }

    #[test]
    fn test_failed_open_returns_to_disconnected() {
        let mut transport = RecordingTransport::new();
        transport.fail_open = true;
        let mut pipe = Pipe::new(transport);
        assert_eq!(
            pipe.connect("wss://example.net/ws", None),
            Err(PipeError::ConnectionFailure)
        );
        assert!(!pipe.is_connecting());
        assert!(!pipe.is_connected());
    }

    #[test]
    fn test_dispatch_while_connected_sends_immediately() {
        let mut pipe = connected_pipe();
        pipe.request_node_status().unwrap();
        assert_eq!(pipe.queue_len(), 0);
        assert_eq!(pipe.transport_mut().sent.len(), 1);
        assert_eq!(
            decode_command(&pipe.transport_mut().sent[0]),
            Ok(Command::NodeStatus)
        );
    }

    #[test]
    fn test_dispatch_while_disconnected_queues() {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.request_rtt_chart(DateRange::new(0, 604_800)).unwrap();
        assert_eq!(pipe.queue_len(), 1);
        assert!(pipe.transport_mut().sent.is_empty());
    }

    #[test]
    fn test_login_then_status_sent_in_call_order() {
        let mut pipe = connected_pipe();
        pipe.send_login("alice", "secret").unwrap();
        pipe.request_node_status().unwrap();

        let sent = &pipe.transport_mut().sent;
        assert_eq!(sent.len(), 2);
        assert_eq!(
            decode_command(&sent[0]),
            Ok(Command::Login {
                username: "alice".into(),
                password: "secret".into(),
            })
        );
        assert_eq!(decode_command(&sent[1]), Ok(Command::NodeStatus));
    }

    #[test]
    fn test_invalid_parameters_rejected_before_send() {
        let mut pipe = connected_pipe();
        assert_eq!(
            pipe.request_rtt_chart(DateRange::new(10, 5)),
            Err(PipeError::InvalidParameters)
        );
        assert_eq!(
            pipe.request_site_info(SiteId(0)),
            Err(PipeError::InvalidParameters)
        );
        assert_eq!(pipe.request_search("   "), Err(PipeError::InvalidParameters));
        assert_eq!(pipe.send_token(b""), Err(PipeError::InvalidParameters));
        assert_eq!(
            pipe.send_login("", "secret"),
            Err(PipeError::InvalidParameters)
        );
        assert!(pipe.transport_mut().sent.is_empty());
        assert_eq!(pipe.queue_len(), 0);
    }

    #[test]
    fn test_transmit_failure_requeues_and_disconnects() {
        let mut pipe = connected_pipe();
        pipe.transport_mut().fail_transmit = true;
        assert_eq!(
            pipe.request_node_status(),
            Err(PipeError::ConnectionFailure)
        );
        assert!(!pipe.is_connected());
        assert_eq!(pipe.queue_len(), 1);
    }

    #[test]
    fn test_flush_queue_noop_when_not_connected() {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.request_node_status().unwrap();
        assert_eq!(pipe.flush_queue(), vec![]);
        assert_eq!(pipe.queue_len(), 1);
        assert!(pipe.transport_mut().sent.is_empty());
    }

    #[test]
    fn test_flush_queue_noop_when_empty() {
        let mut pipe = connected_pipe();
        assert_eq!(pipe.flush_queue(), vec![]);
        assert!(pipe.transport_mut().sent.is_empty());
    }

    #[test]
    fn test_offline_send_token_sends_one_frame_on_connect() {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.send_token(b"tok-1").unwrap();
        assert_eq!(pipe.queue_len(), 1);

        pipe.connect("wss://example.net/ws", None).unwrap();
        pipe.handle_event(SocketEvent::HandshakeSucceeded);

        let sent = &pipe.transport_mut().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(
            decode_command(&sent[0]),
            Ok(Command::SetToken {
                token: b"tok-1".to_vec()
            })
        );
    }

    #[test]
    fn test_disconnect_clears_token_keeps_queue() {
        let mut pipe = Pipe::new(RecordingTransport::new());
        pipe.request_node_status().unwrap();
        pipe.connect("wss://example.net/ws", Some(b"tok")).unwrap();
        pipe.disconnect();

        assert!(!pipe.is_connected());
        assert!(!pipe.is_connecting());
        assert_eq!(pipe.queue_len(), 1);
        assert_eq!(pipe.transport_mut().closed, 1);
    }
}
