//! Queueing message channel over a persistent socket.
//!
//! STATE MACHINE
//! =============
//! ```text
//! Connecting --open--> Open --close--> Closed
//!      \____________close____________/
//! ```
//!
//! - `send` while Connecting queues; the queue is flushed in order, exactly
//!   once, when the socket opens.
//! - `send` while Open transmits immediately.
//! - `send` while Closed fails with [`CommsError::Closed`]. Closed is terminal;
//!   there is no reconnect.
//!
//! The socket binding drives the transitions through the `handle_*` methods.
//! Transport failures are logged and swallowed; they never reach callers or
//! listeners.

#[cfg(test)]
#[path = "comms_test.rs"]
mod comms_test;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use scene::events::Subscribers;
use serde::{Deserialize, Serialize};

/// Socket connection lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Handshake in progress; sends are queued.
    #[default]
    Connecting,
    /// Sends go straight to the transport.
    Open,
    /// Terminal. Sends fail.
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors returned to callers of [`Comms::send`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommsError {
    /// The socket is closed; the message was not queued.
    #[error("connection closed; message not sent: {0:?}")]
    Closed(String),
}

/// Failure reported by the underlying socket.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// The raw socket a [`Comms`] writes to.
pub trait Transport {
    /// Write one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the socket rejects the frame.
    fn transmit(&self, message: &str) -> Result<(), TransportError>;
}

pub struct Comms<T: Transport> {
    transport: T,
    state: Cell<ConnectionState>,
    queue: RefCell<VecDeque<String>>,
    listeners: Subscribers<String>,
    state_listeners: Subscribers<ConnectionState>,
}

impl<T: Transport> Comms<T> {
    /// A channel in the Connecting state with an empty queue.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Cell::new(ConnectionState::Connecting),
            queue: RefCell::new(VecDeque::new()),
            listeners: Subscribers::new(),
            state_listeners: Subscribers::new(),
        }
    }

    /// Send a text message, queueing it if the socket is still connecting.
    ///
    /// `Ok` means transmitted or queued, not delivered.
    ///
    /// # Errors
    ///
    /// Returns [`CommsError::Closed`] once the socket has closed.
    pub fn send(&self, message: impl Into<String>) -> Result<(), CommsError> {
        let message = message.into();
        match self.state.get() {
            ConnectionState::Open => {
                self.transmit(&message);
                Ok(())
            }
            ConnectionState::Connecting => {
                log::debug!("comms: queued {message:?} until open");
                self.queue.borrow_mut().push_back(message);
                Ok(())
            }
            ConnectionState::Closed => Err(CommsError::Closed(message)),
        }
    }

    /// Register a callback for every inbound message, in arrival order.
    pub fn add_listener(&self, listener: impl Fn(&str) + 'static) {
        self.listeners.subscribe(move |message: &String| listener(message.as_str()));
    }

    /// Register a callback for every state transition.
    pub fn on_state_change(&self, listener: impl Fn(ConnectionState) + 'static) {
        self.state_listeners.subscribe(move |state: &ConnectionState| listener(*state));
    }

    /// The socket finished its handshake.
    pub fn handle_open(&self) {
        if self.state.get() != ConnectionState::Connecting {
            log::warn!("comms: open event while {}", self.state.get());
            return;
        }
        self.state.set(ConnectionState::Open);

        let pending: Vec<String> = self.queue.borrow_mut().drain(..).collect();
        log::info!("comms: open; flushing {} queued message(s)", pending.len());
        for message in &pending {
            self.transmit(message);
        }
        self.state_listeners.publish(&ConnectionState::Open);
    }

    /// An inbound text frame arrived.
    pub fn handle_message(&self, payload: &str) {
        let delivered = self.listeners.publish(&payload.to_owned());
        log::debug!("comms: {payload:?} delivered to {delivered} listener(s)");
    }

    /// The socket closed, cleanly or not.
    pub fn handle_close(&self, code: u16, reason: &str) {
        if self.state.get() == ConnectionState::Closed {
            return;
        }
        self.state.set(ConnectionState::Closed);
        let dropped = std::mem::take(&mut *self.queue.borrow_mut());
        if dropped.is_empty() {
            log::info!("comms: closed ({code}) {reason}");
        } else {
            log::warn!("comms: closed ({code}) {reason}; dropped {} queued message(s)", dropped.len());
        }
        self.state_listeners.publish(&ConnectionState::Closed);
    }

    /// The socket reported an error. Logged only.
    pub fn handle_error(&self, description: &str) {
        log::warn!("comms: socket error while {}: {description}", self.state.get());
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Messages waiting for the socket to open.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn transmit(&self, message: &str) {
        if let Err(err) = self.transport.transmit(message) {
            log::warn!("comms: {err}");
        }
    }
}
