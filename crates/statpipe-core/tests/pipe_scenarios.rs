//! End-to-end pipe scenarios over a mock transport
//!
//! These drive `Pipe` the way the browser host does: dispatcher calls on
//! one side, `SocketEvent`s on the other, with the mock recording every
//! frame that would hit the wire.

use statpipe_core::{Delivery, Pipe, PipeError, SocketEvent, Transport};
use statpipe_proto::response::{ChartPoint, NodeStatusData, NodeStatusEntry, RttSeries};
use statpipe_proto::{
    decode_command, encode_response, CircuitId, Command, DateRange, NodeId, Response, SiteId,
};

#[derive(Default)]
struct MockTransport {
    sent: Vec<Vec<u8>>,
    open_calls: usize,
}

impl Transport for MockTransport {
    fn open(&mut self, _endpoint: &str) -> Result<(), PipeError> {
        self.open_calls += 1;
        Ok(())
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), PipeError> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) {}
}

fn sent_commands(pipe: &mut Pipe<MockTransport>) -> Vec<Command> {
    pipe.transport_mut()
        .sent
        .iter()
        .map(|frame| decode_command(frame).expect("mock saw an undecodable frame"))
        .collect()
}

#[test]
fn queued_chart_flushes_with_original_parameters() {
    let mut pipe = Pipe::new(MockTransport::default());
    let range = DateRange::new(1_700_000_000, 1_700_604_800);

    // Issued before any connection exists: must queue, not error.
    pipe.request_rtt_chart(range).unwrap();
    pipe.request_throughput_chart_for_site(range, SiteId(42))
        .unwrap();
    assert_eq!(pipe.queue_len(), 2);
    assert!(pipe.transport_mut().sent.is_empty());

    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    assert_eq!(pipe.queue_len(), 0);
    assert_eq!(
        sent_commands(&mut pipe),
        vec![
            Command::RttChart { range },
            Command::ThroughputChartForSite {
                range,
                site: SiteId(42)
            },
        ]
    );
}

#[test]
fn token_precedes_flushed_queue() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.request_node_status().unwrap();
    pipe.connect("wss://example.net/ws", Some(b"session-abc"))
        .unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    assert_eq!(
        sent_commands(&mut pipe),
        vec![
            Command::SetToken {
                token: b"session-abc".to_vec()
            },
            Command::NodeStatus,
        ]
    );
}

#[test]
fn login_then_status_preserves_call_order() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    pipe.send_login("operator", "hunter2").unwrap();
    pipe.request_node_status().unwrap();

    assert_eq!(
        sent_commands(&mut pipe),
        vec![
            Command::Login {
                username: "operator".into(),
                password: "hunter2".into(),
            },
            Command::NodeStatus,
        ]
    );
}

#[test]
fn two_same_kind_responses_both_delivered_in_arrival_order() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    // Two in-flight RTT charts; answers are indistinguishable by kind,
    // so both go to the same consumer in arrival order.
    pipe.request_rtt_chart(DateRange::new(0, 3600)).unwrap();
    pipe.request_rtt_chart_for_node(DateRange::new(0, 3600), NodeId(7))
        .unwrap();

    let first = Response::RttChart(RttSeries {
        points: vec![ChartPoint {
            timestamp: 60,
            min: 1.0,
            max: 9.0,
            avg: 4.0,
        }],
    });
    let second = Response::RttChart(RttSeries { points: vec![] });

    let d1 = pipe.handle_event(SocketEvent::FrameReceived(encode_response(&first)));
    let d2 = pipe.handle_event(SocketEvent::FrameReceived(encode_response(&second)));

    assert_eq!(d1, vec![Delivery::Response(first)]);
    assert_eq!(d2, vec![Delivery::Response(second)]);
}

#[test]
fn offline_send_token_not_duplicated_by_flush() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.send_token(b"tok-1").unwrap();
    pipe.request_node_status().unwrap();

    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    // The queued token frame is the only one; the handshake transition
    // must not emit a second copy.
    let commands = sent_commands(&mut pipe);
    assert_eq!(
        commands,
        vec![
            Command::SetToken {
                token: b"tok-1".to_vec()
            },
            Command::NodeStatus,
        ]
    );
}

#[test]
fn reconnect_requires_fresh_token() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.connect("wss://example.net/ws", Some(b"tok-1")).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);
    pipe.handle_event(SocketEvent::Closed);

    // Queued while down, reconnect without resupplying a token.
    pipe.request_node_status().unwrap();
    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    // Only the first connection carried SetToken.
    let commands = sent_commands(&mut pipe);
    assert_eq!(
        commands,
        vec![
            Command::SetToken {
                token: b"tok-1".to_vec()
            },
            Command::NodeStatus,
        ]
    );
}

#[test]
fn handshake_failure_keeps_queue_for_retry() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.request_circuit_parents(CircuitId(9)).unwrap();
    pipe.connect("wss://example.net/ws", None).unwrap();

    let deliveries = pipe.handle_event(SocketEvent::HandshakeFailed);
    assert_eq!(
        deliveries,
        vec![Delivery::Diagnostic(PipeError::ConnectionFailure)]
    );
    assert_eq!(pipe.queue_len(), 1);

    // Retry succeeds and the original command goes out.
    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);
    assert_eq!(
        sent_commands(&mut pipe),
        vec![Command::CircuitParents {
            circuit: CircuitId(9)
        }]
    );
}

#[test]
fn malformed_inbound_frame_does_not_tear_connection() {
    let mut pipe = Pipe::new(MockTransport::default());
    pipe.connect("wss://example.net/ws", None).unwrap();
    pipe.handle_event(SocketEvent::HandshakeSucceeded);

    let deliveries = pipe.handle_event(SocketEvent::FrameReceived(vec![0xDE, 0xAD]));
    assert_eq!(
        deliveries,
        vec![Delivery::Diagnostic(PipeError::MalformedFrame)]
    );
    assert!(pipe.is_connected());

    // The next well-formed frame still flows.
    let resp = Response::NodeStatus(NodeStatusData {
        nodes: vec![NodeStatusEntry {
            node_id: 1,
            node_name: "edge-1".into(),
            last_seen_sec: 3,
        }],
    });
    let deliveries = pipe.handle_event(SocketEvent::FrameReceived(encode_response(&resp)));
    assert_eq!(deliveries, vec![Delivery::Response(resp)]);
}
