//! WebSocket transport
//!
//! Implements the `Transport` seam over `web_sys::WebSocket`. Socket
//! callbacks are translated into `SocketEvent`s and pushed into the event
//! sink installed by `TelemetryPipe`; this module never touches pipe state
//! directly.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{BinaryType, CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

use statpipe_core::{PipeError, SocketEvent, Transport};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Where socket events go. The closure runs the pipe state machine and
/// routes deliveries; it must not be re-entered from itself.
pub(crate) type EventSink = Rc<dyn Fn(SocketEvent)>;

/// One browser WebSocket, lifecycle-managed.
pub struct WebSocketTransport {
    socket: Option<WebSocket>,
    sink: Option<EventSink>,
    /// Closures must be stored to prevent garbage collection
    _onopen: Option<Closure<dyn FnMut(Event)>>,
    _onmessage: Option<Closure<dyn FnMut(MessageEvent)>>,
    _onerror: Option<Closure<dyn FnMut(ErrorEvent)>>,
    _onclose: Option<Closure<dyn FnMut(CloseEvent)>>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self {
            socket: None,
            sink: None,
            _onopen: None,
            _onmessage: None,
            _onerror: None,
            _onclose: None,
        }
    }

    /// Install the event sink. Must happen before the first `open`.
    pub(crate) fn set_event_sink(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    fn attach_callbacks(&mut self, socket: &WebSocket, sink: &EventSink) {
        let onopen = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |_event: Event| {
                sink(SocketEvent::HandshakeSucceeded);
            }) as Box<dyn FnMut(Event)>)
        };
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let onmessage = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |event: MessageEvent| {
                // binaryType is arraybuffer; anything else is not ours.
                match event.data().dyn_into::<js_sys::ArrayBuffer>() {
                    Ok(buffer) => {
                        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                        sink(SocketEvent::FrameReceived(bytes));
                    }
                    Err(_) => log("[statpipe] ignoring non-binary socket message"),
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |_event: ErrorEvent| {
                sink(SocketEvent::HandshakeFailed);
            }) as Box<dyn FnMut(ErrorEvent)>)
        };
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let onclose = {
            let sink = Rc::clone(sink);
            Closure::wrap(Box::new(move |_event: CloseEvent| {
                sink(SocketEvent::Closed);
            }) as Box<dyn FnMut(CloseEvent)>)
        };
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        self._onopen = Some(onopen);
        self._onmessage = Some(onmessage);
        self._onerror = Some(onerror);
        self._onclose = Some(onclose);
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, endpoint: &str) -> Result<(), PipeError> {
        let sink = match self.sink.clone() {
            Some(sink) => sink,
            None => return Err(PipeError::ConnectionFailure),
        };
        let socket = WebSocket::new(endpoint).map_err(|_| PipeError::ConnectionFailure)?;
        socket.set_binary_type(BinaryType::Arraybuffer);
        self.attach_callbacks(&socket, &sink);
        self.socket = Some(socket);
        Ok(())
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), PipeError> {
        let socket = self.socket.as_ref().ok_or(PipeError::ConnectionFailure)?;
        socket
            .send_with_u8_array(frame)
            .map_err(|_| PipeError::ConnectionFailure)
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            // Detach first so the close event of a socket we are discarding
            // does not loop back through the sink.
            socket.set_onopen(None);
            socket.set_onmessage(None);
            socket.set_onerror(None);
            socket.set_onclose(None);
            let _ = socket.close();
        }
        self._onopen = None;
        self._onmessage = None;
        self._onerror = None;
        self._onclose = None;
    }
}
