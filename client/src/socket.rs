use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use townview_shared::{ClientMessage, PlayerUpdate, ServerMessage};

use crate::error::BootError;

const RECONNECT_BASE_MS: f64 = 500.0;
const RECONNECT_MAX_MS: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Connect,
    Disconnect,
    Sync(BTreeMap<String, PlayerUpdate>),
}

type Handler = Box<dyn Fn(&SocketEvent)>;

/// WebSocket link to the sync server. Reconnects with backoff until dropped.
pub struct ServerSocketConnector {
    inner: Rc<Inner>,
}

struct Inner {
    url: String,
    status: RwSignal<ConnectionStatus>,
    connection: RefCell<Option<SocketConnection>>,
    handlers: RefCell<Vec<Handler>>,
    consecutive_failures: Cell<u32>,
    shut_down: Cell<bool>,
}

struct SocketConnection {
    ws: WebSocket,
    _on_open: Closure<dyn Fn()>,
    _on_message: Closure<dyn Fn(MessageEvent)>,
    _on_close: Closure<dyn Fn(CloseEvent)>,
}

impl SocketConnection {
    fn close(self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.close().ok();
    }
}

impl ServerSocketConnector {
    pub fn connect(
        url: impl Into<String>,
        status: RwSignal<ConnectionStatus>,
    ) -> Result<Self, BootError> {
        let url = url.into();
        let inner = Rc::new(Inner {
            url: url.clone(),
            status,
            connection: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
            consecutive_failures: Cell::new(0),
            shut_down: Cell::new(false),
        });
        open(&inner).map_err(|reason| BootError::Socket { url, reason })?;
        Ok(Self { inner })
    }

    /// Register a handler for connection and sync events.
    /// Handlers must not register further handlers while running.
    pub fn on(&self, handler: impl Fn(&SocketEvent) + 'static) {
        self.inner.handlers.borrow_mut().push(Box::new(handler));
    }

    /// Ask the server for the next sync frame. Returns false when not connected.
    pub fn sync(&self) -> bool {
        let connection = self.inner.connection.borrow();
        let Some(connection) = connection.as_ref() else {
            return false;
        };
        if connection.ws.ready_state() != WebSocket::OPEN {
            return false;
        }
        let Ok(frame) = serde_json::to_string(&ClientMessage::Sync) else {
            return false;
        };
        connection.ws.send_with_str(&frame).is_ok()
    }
}

impl Drop for ServerSocketConnector {
    fn drop(&mut self) {
        self.inner.shut_down.set(true);
        if let Some(connection) = self.inner.connection.borrow_mut().take() {
            connection.close();
        }
        self.inner.handlers.borrow_mut().clear();
    }
}

impl Inner {
    fn emit(&self, event: &SocketEvent) {
        for handler in self.handlers.borrow().iter() {
            handler(event);
        }
    }
}

fn open(inner: &Rc<Inner>) -> Result<(), String> {
    let ws = WebSocket::new(&inner.url).map_err(|e| format!("{e:?}"))?;

    let weak = Rc::downgrade(inner);
    let on_open = Closure::<dyn Fn()>::new(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.consecutive_failures.set(0);
        inner.status.set(ConnectionStatus::Connected);
        inner.emit(&SocketEvent::Connect);
    });
    ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

    let weak = Rc::downgrade(inner);
    let on_message = Closure::<dyn Fn(MessageEvent)>::new(move |e: MessageEvent| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let Some(data) = e.data().as_string() else {
            return;
        };
        match decode_frame(&data) {
            Ok(event) => inner.emit(&event),
            Err(err) => {
                web_sys::console::warn_1(&format!("socket_frame_ignored error={err}").into());
            }
        }
    });
    ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    let weak = Rc::downgrade(inner);
    let on_close = Closure::<dyn Fn(CloseEvent)>::new(move |e: CloseEvent| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.shut_down.get() {
            return;
        }
        web_sys::console::info_1(
            &format!("socket_closed code={} reason={:?}", e.code(), e.reason()).into(),
        );
        inner.status.set(ConnectionStatus::Reconnecting);
        inner.emit(&SocketEvent::Disconnect);
        schedule_reconnect(Rc::downgrade(&inner));
    });
    ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    // Replace any previous connection, unregistering its handlers first.
    let previous = inner.connection.borrow_mut().replace(SocketConnection {
        ws,
        _on_open: on_open,
        _on_message: on_message,
        _on_close: on_close,
    });
    if let Some(previous) = previous {
        previous.close();
    }
    Ok(())
}

fn schedule_reconnect(weak: Weak<Inner>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let attempt = inner.consecutive_failures.get().saturating_add(1);
    inner.consecutive_failures.set(attempt);
    let backoff_ms = reconnect_backoff_ms(attempt);
    web_sys::console::warn_1(
        &format!("socket_reconnect attempt={attempt} backoff_ms={backoff_ms}").into(),
    );
    drop(inner);

    spawn_local(async move {
        TimeoutFuture::new(backoff_ms as u32).await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if inner.shut_down.get() {
            return;
        }
        inner.status.set(ConnectionStatus::Connecting);
        if let Err(reason) = open(&inner) {
            web_sys::console::warn_1(&format!("socket_open_failed reason={reason}").into());
            inner.status.set(ConnectionStatus::Reconnecting);
            schedule_reconnect(weak);
        }
    });
}

fn reconnect_backoff_ms(consecutive_failures: u32) -> f64 {
    let exponent = consecutive_failures.saturating_sub(1).min(6);
    let factor = 1u32 << exponent;
    (RECONNECT_BASE_MS * factor as f64).min(RECONNECT_MAX_MS)
}

fn decode_frame(data: &str) -> Result<SocketEvent, serde_json::Error> {
    let ServerMessage::Sync { players } = serde_json::from_str::<ServerMessage>(data)?;
    Ok(SocketEvent::Sync(players))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let delays: Vec<f64> = (1..=8).map(reconnect_backoff_ms).collect();
        assert_eq!(
            delays,
            vec![500.0, 1000.0, 2000.0, 4000.0, 8000.0, 10_000.0, 10_000.0, 10_000.0]
        );
        assert_eq!(reconnect_backoff_ms(0), 500.0);
    }

    #[test]
    fn decodes_sync_frames() {
        let event = decode_frame(r#"{"type":"sync","players":{"7":{"speed":{"x":1,"y":2}}}}"#)
            .unwrap();
        let SocketEvent::Sync(players) = event else {
            panic!("expected a sync event");
        };
        assert_eq!(players["7"].speed.map(|s| (s.x, s.y)), Some((1.0, 2.0)));
    }

    #[test]
    fn rejects_garbage_frames() {
        assert!(decode_frame("not json").is_err());
        assert!(decode_frame(r#"{"type":"hello"}"#).is_err());
    }
}
