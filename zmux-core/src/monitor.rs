//! Lifecycle events of tracked sockets.
//!
//! Events travel over an unbounded `flume` channel; a socket holds the
//! sender and the caller drains the receiver whenever convenient.

use crate::socket_type::SocketType;
use std::fmt;

/// Something that happened to a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// The socket was created with this pattern.
    Created(SocketType),
    Connected(String),
    Disconnected(String),
    Bound(String),
    Unbound(String),
    /// The transport refused a bind; `reason` is its error text.
    BindFailed { endpoint: String, reason: String },
    /// The transport refused a connect; `reason` is its error text.
    ConnectFailed { endpoint: String, reason: String },
    /// The socket was dropped.
    Closed,
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(t) => write!(f, "created {t}"),
            Self::Connected(ep) => write!(f, "connected {ep}"),
            Self::Disconnected(ep) => write!(f, "disconnected {ep}"),
            Self::Bound(ep) => write!(f, "bound {ep}"),
            Self::Unbound(ep) => write!(f, "unbound {ep}"),
            Self::BindFailed { endpoint, reason } => write!(f, "bind {endpoint} failed: {reason}"),
            Self::ConnectFailed { endpoint, reason } => {
                write!(f, "connect {endpoint} failed: {reason}")
            }
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Receiving end of a socket's event stream.
pub type SocketMonitor = flume::Receiver<SocketEvent>;

/// Sending end held by the socket.
pub type SocketEventSender = flume::Sender<SocketEvent>;

#[must_use]
pub fn create_monitor() -> (SocketEventSender, SocketMonitor) {
    flume::unbounded()
}
