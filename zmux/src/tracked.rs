//! Sockets that remember their endpoints.
//!
//! A [`TrackedSocket`] wraps a [`Socket`] and records every endpoint it has
//! connected to or bound, so repeated `connect`/`bind` calls for the same DSN
//! are skipped and `disconnect`/`unbind` only act on endpoints it knows.

use std::cell::RefCell;
use std::ops::Deref;
use tracing::{debug, trace};
use zmux_core::monitor::{create_monitor, SocketEvent, SocketEventSender, SocketMonitor};
use zmux_core::socket_type::SocketType;
use zmux_core::Result;
use zmux_libzmq::{Context, Socket};

/// Endpoints a [`TrackedSocket`] is currently attached to, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    /// DSNs passed to successful `connect` calls
    pub connect: Vec<String>,
    /// DSNs passed to successful `bind` calls
    pub bind: Vec<String>,
}

/// A socket with endpoint bookkeeping and optional lifecycle events.
///
/// Dereferences to [`Socket`] for send, receive and options.
pub struct TrackedSocket {
    socket: Socket,
    persistent_id: Option<String>,
    endpoints: RefCell<Endpoints>,
    events: RefCell<Option<SocketEventSender>>,
}

impl TrackedSocket {
    /// Wrap an existing socket.
    pub fn new(socket: Socket, persistent_id: Option<String>) -> Self {
        Self {
            socket,
            persistent_id,
            endpoints: RefCell::new(Endpoints::default()),
            events: RefCell::new(None),
        }
    }

    /// Create a new, non-persistent socket in `context`.
    ///
    /// # Errors
    ///
    /// See [`Socket::create`].
    pub fn create(context: &Context, socket_type: SocketType) -> Result<Self> {
        Ok(Self::new(Socket::create(context, socket_type)?, None))
    }

    /// Create a socket and a monitor that has already seen its `Created` event.
    ///
    /// # Errors
    ///
    /// See [`Socket::create`].
    pub fn create_monitored(
        context: &Context,
        socket_type: SocketType,
    ) -> Result<(Self, SocketMonitor)> {
        let socket = Self::create(context, socket_type)?;
        let monitor = socket.monitor();
        socket.emit(SocketEvent::Created(socket_type));
        Ok((socket, monitor))
    }

    /// The wrapped socket.
    pub fn socket(&self) -> &Socket {
        &self.socket
    }

    /// Id this socket is cached under, if it is persistent.
    pub fn persistent_id(&self) -> Option<&str> {
        self.persistent_id.as_deref()
    }

    /// Whether the socket is cached by its context.
    pub fn is_persistent(&self) -> bool {
        self.persistent_id.is_some()
    }

    /// Connect unless `dsn` is already connected. Returns whether a new
    /// connection was made.
    ///
    /// # Errors
    ///
    /// The transport error of the underlying connect.
    pub fn connect(&self, dsn: &str) -> Result<bool> {
        self.connect_with(dsn, false)
    }

    /// Connect to `dsn`; with `force` the call reaches the transport even if
    /// the endpoint is already recorded.
    ///
    /// # Errors
    ///
    /// The transport error of the underlying connect.
    pub fn connect_with(&self, dsn: &str, force: bool) -> Result<bool> {
        if !force && self.endpoints.borrow().connect.iter().any(|e| e == dsn) {
            trace!("[SOCKET] Already connected to {}", dsn);
            return Ok(false);
        }

        if let Err(e) = self.socket.connect(dsn) {
            self.emit(SocketEvent::ConnectFailed {
                endpoint: dsn.to_owned(),
                reason: e.to_string(),
            });
            return Err(e);
        }

        record(&mut self.endpoints.borrow_mut().connect, dsn);
        self.emit(SocketEvent::Connected(dsn.to_owned()));
        Ok(true)
    }

    /// Bind unless `dsn` is already bound. Returns whether a new bind was
    /// made.
    ///
    /// # Errors
    ///
    /// The transport error of the underlying bind.
    pub fn bind(&self, dsn: &str) -> Result<bool> {
        self.bind_with(dsn, false)
    }

    /// Bind to `dsn`; with `force` the call reaches the transport even if the
    /// endpoint is already recorded.
    ///
    /// # Errors
    ///
    /// The transport error of the underlying bind.
    pub fn bind_with(&self, dsn: &str, force: bool) -> Result<bool> {
        if !force && self.endpoints.borrow().bind.iter().any(|e| e == dsn) {
            trace!("[SOCKET] Already bound to {}", dsn);
            return Ok(false);
        }

        if let Err(e) = self.socket.bind(dsn) {
            self.emit(SocketEvent::BindFailed {
                endpoint: dsn.to_owned(),
                reason: e.to_string(),
            });
            return Err(e);
        }

        record(&mut self.endpoints.borrow_mut().bind, dsn);
        self.emit(SocketEvent::Bound(dsn.to_owned()));
        Ok(true)
    }

    /// Disconnect from a recorded endpoint. Unknown endpoints are left alone
    /// and report `false`.
    ///
    /// # Errors
    ///
    /// The transport error of the underlying disconnect; the endpoint stays
    /// recorded.
    pub fn disconnect(&self, dsn: &str) -> Result<bool> {
        if !self.endpoints.borrow().connect.iter().any(|e| e == dsn) {
            debug!("[SOCKET] Not connected to {}, skipping disconnect", dsn);
            return Ok(false);
        }

        self.socket.disconnect(dsn)?;
        self.endpoints.borrow_mut().connect.retain(|e| e != dsn);
        self.emit(SocketEvent::Disconnected(dsn.to_owned()));
        Ok(true)
    }

    /// Unbind from a recorded endpoint. Unknown endpoints are left alone and
    /// report `false`.
    ///
    /// # Errors
    ///
    /// The transport error of the underlying unbind; the endpoint stays
    /// recorded.
    pub fn unbind(&self, dsn: &str) -> Result<bool> {
        if !self.endpoints.borrow().bind.iter().any(|e| e == dsn) {
            debug!("[SOCKET] Not bound to {}, skipping unbind", dsn);
            return Ok(false);
        }

        self.socket.unbind(dsn)?;
        self.endpoints.borrow_mut().bind.retain(|e| e != dsn);
        self.emit(SocketEvent::Unbound(dsn.to_owned()));
        Ok(true)
    }

    /// Snapshot of the recorded endpoints.
    pub fn endpoints(&self) -> Endpoints {
        self.endpoints.borrow().clone()
    }

    /// Start delivering lifecycle events to a new monitor.
    ///
    /// Replaces any previous monitor.
    pub fn monitor(&self) -> SocketMonitor {
        let (sender, receiver) = create_monitor();
        *self.events.borrow_mut() = Some(sender);
        receiver
    }

    fn emit(&self, event: SocketEvent) {
        if let Some(sender) = self.events.borrow().as_ref() {
            trace!("[SOCKET] Event: {}", event);
            // A dropped monitor just stops listening.
            let _ = sender.send(event);
        }
    }
}

fn record(list: &mut Vec<String>, dsn: &str) {
    if !list.iter().any(|e| e == dsn) {
        list.push(dsn.to_owned());
    }
}

impl Deref for TrackedSocket {
    type Target = Socket;

    fn deref(&self) -> &Socket {
        &self.socket
    }
}

impl Drop for TrackedSocket {
    fn drop(&mut self) {
        self.emit(SocketEvent::Closed);
    }
}

impl std::fmt::Debug for TrackedSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedSocket")
            .field("socket", &self.socket)
            .field("persistent_id", &self.persistent_id)
            .field("endpoints", &*self.endpoints.borrow())
            .finish()
    }
}
