//! Binds [`Comms`] to the browser's `WebSocket`.
//!
//! The socket's event handlers hold a `Weak` reference to the channel and are
//! leaked for the life of the page, like the socket itself.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use super::comms::{Comms, Transport, TransportError};

/// A browser `WebSocket` used as a [`Transport`].
pub struct BrowserSocket {
    socket: WebSocket,
}

impl Transport for BrowserSocket {
    fn transmit(&self, message: &str) -> Result<(), TransportError> {
        self.socket
            .send_with_str(message)
            .map_err(|err| TransportError(describe(&err)))
    }
}

/// Open a socket to `url` and return its channel in the Connecting state.
///
/// # Errors
///
/// Returns [`TransportError`] when the URL is rejected by the browser.
pub fn connect(url: &str) -> Result<Rc<Comms<BrowserSocket>>, TransportError> {
    let socket = WebSocket::new(url).map_err(|err| TransportError(describe(&err)))?;
    let comms = Rc::new(Comms::new(BrowserSocket { socket: socket.clone() }));
    log::info!("comms: connecting to {url}");

    let weak = Rc::downgrade(&comms);
    let on_open = Closure::<dyn FnMut()>::new(move || {
        if let Some(comms) = weak.upgrade() {
            comms.handle_open();
        }
    });
    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    on_open.forget();

    let weak = Rc::downgrade(&comms);
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let Some(comms) = weak.upgrade() else {
            return;
        };
        match event.data().as_string() {
            Some(text) => comms.handle_message(&text),
            None => log::debug!("comms: ignoring non-text frame"),
        }
    });
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    on_message.forget();

    let weak = Rc::downgrade(&comms);
    let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
        if let Some(comms) = weak.upgrade() {
            comms.handle_close(event.code(), &event.reason());
        }
    });
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
    on_close.forget();

    let weak = Rc::downgrade(&comms);
    let on_error = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(comms) = weak.upgrade() {
            comms.handle_error(&event.type_());
        }
    });
    socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();

    Ok(comms)
}

fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
