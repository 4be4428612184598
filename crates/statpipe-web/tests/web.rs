//! Boundary tests that run under wasm-bindgen-test
//!
//! These exercise the JS-facing surface without a live socket: queueing
//! while disconnected, consumer registry validation, and host-driven
//! lifecycle notifications.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use statpipe_proto::response::RttSeries;
use statpipe_proto::{encode_response, Response};
use statpipe_web::TelemetryPipe;

fn rtt_chart_frame() -> Vec<u8> {
    encode_response(&Response::RttChart(RttSeries { points: vec![] }))
}

fn counting_consumer(hits: &Rc<Cell<u32>>, bump: u32) -> (Closure<dyn FnMut(JsValue)>, js_sys::Function) {
    let hits = Rc::clone(hits);
    let closure = Closure::wrap(Box::new(move |_payload: JsValue| {
        hits.set(hits.get() + bump);
    }) as Box<dyn FnMut(JsValue)>);
    let function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    (closure, function)
}

#[wasm_bindgen_test]
fn new_pipe_starts_disconnected() {
    let pipe = TelemetryPipe::new();
    assert!(!pipe.is_connected());
    assert!(!pipe.is_connecting());
    assert_eq!(pipe.queue_len(), 0);
}

#[wasm_bindgen_test]
fn dispatch_while_disconnected_queues() {
    let pipe = TelemetryPipe::new();
    pipe.request_node_status().unwrap();
    pipe.request_rtt_chart(0, 604_800).unwrap();
    assert_eq!(pipe.queue_len(), 2);
}

#[wasm_bindgen_test]
fn invalid_parameters_rejected_at_boundary() {
    let pipe = TelemetryPipe::new();
    assert!(pipe.request_rtt_chart(100, 5).is_err());
    assert!(pipe.request_site_info(0).is_err());
    assert!(pipe.send_token("").is_err());
    assert_eq!(pipe.queue_len(), 0);
}

#[wasm_bindgen_test]
fn consumer_registry_validates_kind_names() {
    let pipe = TelemetryPipe::new();
    let noop = js_sys::Function::new_no_args("");
    pipe.register_consumer("RttChart", noop.clone()).unwrap();
    pipe.unregister_consumer("RttChart").unwrap();
    assert!(pipe.register_consumer("NoSuchKind", noop).is_err());
}

#[wasm_bindgen_test]
fn unregistered_kind_dropped_without_error() {
    let pipe = TelemetryPipe::new();
    let hits = Rc::new(Cell::new(0));
    let (_keep, consumer) = counting_consumer(&hits, 1);
    pipe.register_consumer("NodeStatus", consumer).unwrap();

    // RttChart has no consumer: the frame is dropped silently and no
    // other kind's consumer fires.
    pipe.on_frame(&rtt_chart_frame());
    assert_eq!(hits.get(), 0);
}

#[wasm_bindgen_test]
fn reregistering_replaces_consumer() {
    let pipe = TelemetryPipe::new();
    let hits = Rc::new(Cell::new(0));
    let (_keep_first, first) = counting_consumer(&hits, 1);
    let (_keep_second, second) = counting_consumer(&hits, 10);

    pipe.register_consumer("RttChart", first).unwrap();
    pipe.register_consumer("RttChart", second).unwrap();
    pipe.on_frame(&rtt_chart_frame());

    // Only the replacement fires.
    assert_eq!(hits.get(), 10);
}

#[wasm_bindgen_test]
fn host_driven_lifecycle_transitions() {
    let pipe = TelemetryPipe::new();
    pipe.mark_connecting();
    assert!(pipe.is_connecting());

    pipe.on_open();
    assert!(pipe.is_connected());

    pipe.on_close();
    assert!(!pipe.is_connected());
    assert!(!pipe.is_connecting());
}

#[wasm_bindgen_test]
fn host_driven_open_flushes_queue() {
    let pipe = TelemetryPipe::new();
    pipe.request_node_status().unwrap();
    assert_eq!(pipe.queue_len(), 1);

    pipe.mark_connecting();
    pipe.on_open();
    // Flushed frames go to the (absent) socket; the transmit failure
    // drops back to Disconnected but the command is not lost.
    assert_eq!(pipe.queue_len(), 1);
    assert!(!pipe.is_connected());
}
