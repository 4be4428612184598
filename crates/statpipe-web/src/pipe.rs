//! JS-facing pipe boundary
//!
//! `TelemetryPipe` is the object the UI holds. It is a thin boundary
//! layer: it owns the core `Pipe` over a `WebSocketTransport`, keeps the
//! per-kind consumer registry, and converts between JS values and the
//! typed core API. All pipe logic lives in `statpipe-core`; nothing here
//! inspects frames or touches connection state directly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use statpipe_core::{Delivery, Pipe, PipeError, SocketEvent};
use statpipe_proto::{CircuitId, DateRange, DeviceId, NodeId, Response, ResponseKind, SiteId};

use crate::transport::{EventSink, WebSocketTransport};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

type ConsumerMap = Rc<RefCell<HashMap<ResponseKind, js_sys::Function>>>;
type ErrorCallback = Rc<RefCell<Option<js_sys::Function>>>;

fn err_js(err: PipeError) -> JsValue {
    JsValue::from_str(err.as_str())
}

/// Serialize a response payload for the JS consumer. Payload-less kinds
/// (AuthFail, LoginFail) deliver `null`.
fn response_to_js(response: &Response) -> JsValue {
    let json = match response {
        Response::AuthOk(d) => serde_json::to_string(d),
        Response::AuthFail | Response::LoginFail => return JsValue::NULL,
        Response::LoginOk(d) => serde_json::to_string(d),
        Response::NodeStatus(d) => serde_json::to_string(d),
        Response::PacketChart(d) => serde_json::to_string(d),
        Response::ThroughputChart(d) => serde_json::to_string(d),
        Response::RttChart(d) => serde_json::to_string(d),
        Response::RttHistogram(d) => serde_json::to_string(d),
        Response::NodePerfChart(d) => serde_json::to_string(d),
        Response::SiteStack(d) => serde_json::to_string(d),
        Response::RootHeat(d) => serde_json::to_string(d),
        Response::SiteHeat(d) => serde_json::to_string(d),
        Response::Tree(d) => serde_json::to_string(d),
        Response::SiteInfo(d) => serde_json::to_string(d),
        Response::SiteParents(d) => serde_json::to_string(d),
        Response::CircuitParents(d) => serde_json::to_string(d),
        Response::RootParents(d) => serde_json::to_string(d),
        Response::SearchResult(d) => serde_json::to_string(d),
        Response::CircuitInfo(d) => serde_json::to_string(d),
        Response::ExtDeviceInfo(d) => serde_json::to_string(d),
        Response::ExtSnrGraph(d) => serde_json::to_string(d),
        Response::ExtCapacityGraph(d) => serde_json::to_string(d),
    };
    match json {
        Ok(json) => js_sys::JSON::parse(&json).unwrap_or(JsValue::NULL),
        Err(_) => JsValue::NULL,
    }
}

/// Route deliveries to registered consumers. Consumer lookup clones the
/// function and drops the registry borrow before calling out, so a
/// consumer may freely re-enter the pipe (register, dispatch, reconnect).
fn route_deliveries(consumers: &ConsumerMap, error_callback: &ErrorCallback, deliveries: Vec<Delivery>) {
    for delivery in deliveries {
        match delivery {
            Delivery::Response(response) => {
                let kind = response.kind();
                let consumer = consumers.borrow().get(&kind).cloned();
                match consumer {
                    Some(consumer) => {
                        let payload = response_to_js(&response);
                        if consumer.call1(&JsValue::NULL, &payload).is_err() {
                            log(&format!("[statpipe] consumer for {} threw", kind.name()));
                        }
                    }
                    None => log(&format!(
                        "[statpipe] dropping {}: no consumer registered",
                        kind.name()
                    )),
                }
            }
            Delivery::Diagnostic(err) => {
                let callback = error_callback.borrow().clone();
                match callback {
                    Some(callback) => {
                        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(err.as_str()));
                    }
                    None => log(&format!("[statpipe] {}", err)),
                }
            }
        }
    }
}

/// Browser handle for one telemetry pipe.
///
/// Construct once, register consumers, then `connect`. Dispatchers may be
/// called in any connection state; commands issued before the socket is up
/// are queued and flushed on connect.
#[wasm_bindgen]
pub struct TelemetryPipe {
    pipe: Rc<RefCell<Pipe<WebSocketTransport>>>,
    consumers: ConsumerMap,
    error_callback: ErrorCallback,
}

#[wasm_bindgen]
impl TelemetryPipe {
    /// Create a disconnected pipe.
    #[wasm_bindgen(constructor)]
    pub fn new() -> TelemetryPipe {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        let pipe = Rc::new(RefCell::new(Pipe::new(WebSocketTransport::new())));
        let consumers: ConsumerMap = Rc::new(RefCell::new(HashMap::new()));
        let error_callback: ErrorCallback = Rc::new(RefCell::new(None));

        // Socket callbacks run the state machine first and call out to JS
        // only after the pipe borrow is released.
        let sink: EventSink = {
            let pipe = Rc::clone(&pipe);
            let consumers = Rc::clone(&consumers);
            let error_callback = Rc::clone(&error_callback);
            Rc::new(move |event: SocketEvent| {
                let deliveries = pipe.borrow_mut().handle_event(event);
                route_deliveries(&consumers, &error_callback, deliveries);
            })
        };
        pipe.borrow_mut().transport_mut().set_event_sink(sink);

        TelemetryPipe {
            pipe,
            consumers,
            error_callback,
        }
    }

    // ==========================================================================
    // Lifecycle
    // ==========================================================================

    /// Open a WebSocket to `endpoint`. Passing a token presents it once
    /// the handshake completes, before any queued command is flushed.
    /// No-op while a handshake is already in flight.
    pub fn connect(&self, endpoint: &str, token: Option<String>) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .connect(endpoint, token.as_deref().map(str::as_bytes))
            .map_err(err_js)
    }

    /// Close the socket and discard the auth token. Queued commands are
    /// kept for the next `connect`.
    pub fn disconnect(&self) {
        self.pipe.borrow_mut().disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.pipe.borrow().is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.pipe.borrow().is_connecting()
    }

    /// Number of commands waiting for a connection.
    pub fn queue_len(&self) -> usize {
        self.pipe.borrow().queue_len()
    }

    // ==========================================================================
    // Host-driven socket (external WebSocket ownership)
    // ==========================================================================

    /// Mark the handshake in flight when the host opened the socket
    /// itself instead of calling `connect`.
    pub fn mark_connecting(&self) {
        self.pipe.borrow_mut().mark_connecting();
    }

    /// Host-driven open notification.
    pub fn on_open(&self) {
        self.pump(SocketEvent::HandshakeSucceeded);
    }

    /// Host-driven error notification.
    pub fn on_error(&self) {
        self.pump(SocketEvent::HandshakeFailed);
    }

    /// Host-driven close notification.
    pub fn on_close(&self) {
        self.pump(SocketEvent::Closed);
    }

    /// Host-driven inbound frame.
    pub fn on_frame(&self, frame: &[u8]) {
        self.pump(SocketEvent::FrameReceived(frame.to_vec()));
    }

    /// Flush the outbound queue if connected. Normally implicit in the
    /// handshake transition; hosts driving the socket themselves may call
    /// it after `on_open`.
    pub fn flush_queue(&self) {
        let deliveries = self.pipe.borrow_mut().flush_queue();
        route_deliveries(&self.consumers, &self.error_callback, deliveries);
    }

    fn pump(&self, event: SocketEvent) {
        let deliveries = self.pipe.borrow_mut().handle_event(event);
        route_deliveries(&self.consumers, &self.error_callback, deliveries);
    }

    // ==========================================================================
    // Consumer registry
    // ==========================================================================

    /// Register the consumer for one response kind (by its stable name,
    /// e.g. `"RttChart"`). Replaces any previous consumer for that kind.
    pub fn register_consumer(&self, kind: &str, callback: js_sys::Function) -> Result<(), JsValue> {
        let kind = ResponseKind::from_name(kind)
            .ok_or_else(|| JsValue::from_str("unknown response kind"))?;
        self.consumers.borrow_mut().insert(kind, callback);
        Ok(())
    }

    /// Remove the consumer for one response kind, if registered.
    pub fn unregister_consumer(&self, kind: &str) -> Result<(), JsValue> {
        let kind = ResponseKind::from_name(kind)
            .ok_or_else(|| JsValue::from_str("unknown response kind"))?;
        self.consumers.borrow_mut().remove(&kind);
        Ok(())
    }

    /// Install the diagnostic callback (connection loss, dropped frames).
    pub fn set_error_callback(&self, callback: js_sys::Function) {
        *self.error_callback.borrow_mut() = Some(callback);
    }

    pub fn clear_error_callback(&self) {
        *self.error_callback.borrow_mut() = None;
    }

    // ==========================================================================
    // Auth
    // ==========================================================================

    pub fn send_token(&self, token: &str) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .send_token(token.as_bytes())
            .map_err(err_js)
    }

    pub fn send_login(&self, username: &str, password: &str) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .send_login(username, password)
            .map_err(err_js)
    }

    // ==========================================================================
    // Query dispatchers
    // ==========================================================================

    pub fn request_node_status(&self) -> Result<(), JsValue> {
        self.pipe.borrow_mut().request_node_status().map_err(err_js)
    }

    pub fn request_packet_chart(&self, start: i64, end: i64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_packet_chart(DateRange::new(start, end))
            .map_err(err_js)
    }

    pub fn request_packet_chart_for_node(
        &self,
        start: i64,
        end: i64,
        node: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_packet_chart_for_node(DateRange::new(start, end), NodeId(node))
            .map_err(err_js)
    }

    pub fn request_throughput_chart(&self, start: i64, end: i64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_throughput_chart(DateRange::new(start, end))
            .map_err(err_js)
    }

    pub fn request_throughput_chart_for_site(
        &self,
        start: i64,
        end: i64,
        site: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_throughput_chart_for_site(DateRange::new(start, end), SiteId(site))
            .map_err(err_js)
    }

    pub fn request_throughput_chart_for_node(
        &self,
        start: i64,
        end: i64,
        node: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_throughput_chart_for_node(DateRange::new(start, end), NodeId(node))
            .map_err(err_js)
    }

    pub fn request_throughput_chart_for_circuit(
        &self,
        start: i64,
        end: i64,
        circuit: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_throughput_chart_for_circuit(DateRange::new(start, end), CircuitId(circuit))
            .map_err(err_js)
    }

    pub fn request_rtt_chart(&self, start: i64, end: i64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_rtt_chart(DateRange::new(start, end))
            .map_err(err_js)
    }

    pub fn request_rtt_histogram(&self, start: i64, end: i64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_rtt_histogram(DateRange::new(start, end))
            .map_err(err_js)
    }

    pub fn request_rtt_chart_for_site(
        &self,
        start: i64,
        end: i64,
        site: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_rtt_chart_for_site(DateRange::new(start, end), SiteId(site))
            .map_err(err_js)
    }

    pub fn request_rtt_chart_for_node(
        &self,
        start: i64,
        end: i64,
        node: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_rtt_chart_for_node(DateRange::new(start, end), NodeId(node))
            .map_err(err_js)
    }

    pub fn request_rtt_chart_for_circuit(
        &self,
        start: i64,
        end: i64,
        circuit: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_rtt_chart_for_circuit(DateRange::new(start, end), CircuitId(circuit))
            .map_err(err_js)
    }

    pub fn request_node_perf_chart(&self, start: i64, end: i64, node: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_node_perf_chart(DateRange::new(start, end), NodeId(node))
            .map_err(err_js)
    }

    pub fn request_site_stack(&self, start: i64, end: i64, site: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_site_stack(DateRange::new(start, end), SiteId(site))
            .map_err(err_js)
    }

    pub fn request_root_heat(&self, start: i64, end: i64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_root_heat(DateRange::new(start, end))
            .map_err(err_js)
    }

    pub fn request_site_heat(&self, start: i64, end: i64, site: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_site_heat(DateRange::new(start, end), SiteId(site))
            .map_err(err_js)
    }

    /// Topology tree; omit `parent` to root at the network root.
    pub fn request_tree(&self, parent: Option<u64>) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_tree(parent.map(SiteId))
            .map_err(err_js)
    }

    pub fn request_site_info(&self, site: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_site_info(SiteId(site))
            .map_err(err_js)
    }

    pub fn request_site_parents(&self, site: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_site_parents(SiteId(site))
            .map_err(err_js)
    }

    pub fn request_circuit_parents(&self, circuit: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_circuit_parents(CircuitId(circuit))
            .map_err(err_js)
    }

    pub fn request_root_parents(&self) -> Result<(), JsValue> {
        self.pipe.borrow_mut().request_root_parents().map_err(err_js)
    }

    pub fn request_search(&self, term: &str) -> Result<(), JsValue> {
        self.pipe.borrow_mut().request_search(term).map_err(err_js)
    }

    pub fn request_circuit_info(&self, circuit: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_circuit_info(CircuitId(circuit))
            .map_err(err_js)
    }

    pub fn request_ext_device_info(&self, device: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_ext_device_info(DeviceId(device))
            .map_err(err_js)
    }

    pub fn request_ext_snr_graph(&self, start: i64, end: i64, device: u64) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_ext_snr_graph(DateRange::new(start, end), DeviceId(device))
            .map_err(err_js)
    }

    pub fn request_ext_capacity_graph(
        &self,
        start: i64,
        end: i64,
        device: u64,
    ) -> Result<(), JsValue> {
        self.pipe
            .borrow_mut()
            .request_ext_capacity_graph(DateRange::new(start, end), DeviceId(device))
            .map_err(err_js)
    }
}

impl Default for TelemetryPipe {
    fn default() -> Self {
        Self::new()
    }
}
