//! zmux Error Types
//!
//! Every operation that touches the native transport converts the transport's
//! failure into one of these kinds at its own boundary.

use std::fmt;
use std::io;
use thiserror::Error;

/// A failure reported by the native transport (`errno` plus its message).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (errno {code})")]
pub struct NativeError {
    /// Raw errno value as reported by the transport
    pub code: i32,
    /// Human readable description from the transport
    pub message: String,
}

impl NativeError {
    /// Create a native error from an errno value and its description.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Map the errno onto the closest `io::ErrorKind`.
    ///
    /// Transport-specific codes (outside the OS range) have no matching kind.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        io::Error::from_raw_os_error(self.code).kind()
    }

    /// True when the call failed only because it would have blocked.
    #[must_use]
    pub fn is_would_block(&self) -> bool {
        self.kind() == io::ErrorKind::WouldBlock
    }
}

impl From<NativeError> for io::Error {
    fn from(err: NativeError) -> Self {
        io::Error::new(err.kind(), err)
    }
}

/// Owning resource named by lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A messaging context
    Context,
    /// A socket created against a context
    Socket,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context => f.write_str("context"),
            Self::Socket => f.write_str("socket"),
        }
    }
}

/// Endpoint operation that produced a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOp {
    Connect,
    Disconnect,
    Bind,
    Unbind,
}

impl fmt::Display for TransportOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::Disconnect => f.write_str("disconnect"),
            Self::Bind => f.write_str("bind"),
            Self::Unbind => f.write_str("unbind"),
        }
    }
}

/// Main error type for zmux operations
#[derive(Error, Debug)]
pub enum ZmuxError {
    /// Native context or socket construction failed
    #[error("Allocation of {resource} failed: {source}")]
    Allocation {
        resource: Resource,
        #[source]
        source: NativeError,
    },

    /// connect / disconnect / bind / unbind failed
    #[error("Transport error during {op} to {endpoint}: {source}")]
    Transport {
        op: TransportOp,
        endpoint: String,
        #[source]
        source: NativeError,
    },

    /// Transmission failed (including would-block under `DONTWAIT`)
    #[error("Send failed: {0}")]
    Send(#[source] NativeError),

    /// Reception failed (including would-block under `DONTWAIT`)
    #[error("Receive failed: {0}")]
    Receive(#[source] NativeError),

    /// The multiplex call itself faulted
    #[error("Poll failed: {0}")]
    Poll(#[source] NativeError),

    /// Option get/set hit a transport-level failure
    #[error("Invalid option {option}: {source}")]
    InvalidOption {
        option: i32,
        #[source]
        source: NativeError,
    },

    /// The resource was already closed
    #[error("{0} closed")]
    Closed(Resource),

    /// A caller argument cannot be passed to the transport
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for zmux operations
pub type Result<T> = std::result::Result<T, ZmuxError>;

impl ZmuxError {
    /// Create an allocation error for the given resource
    pub fn allocation(resource: Resource, source: NativeError) -> Self {
        Self::Allocation { resource, source }
    }

    /// Create a transport error for an endpoint operation
    pub fn transport(op: TransportOp, endpoint: impl Into<String>, source: NativeError) -> Self {
        Self::Transport {
            op,
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Create an invalid option error
    pub fn invalid_option(option: i32, source: NativeError) -> Self {
        Self::InvalidOption { option, source }
    }

    /// Create an invalid argument error with a message
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// The native failure behind this error, if any.
    #[must_use]
    pub fn native(&self) -> Option<&NativeError> {
        match self {
            Self::Allocation { source, .. }
            | Self::Transport { source, .. }
            | Self::InvalidOption { source, .. } => Some(source),
            Self::Send(e) | Self::Receive(e) | Self::Poll(e) => Some(e),
            Self::Closed(_) | Self::InvalidArgument(_) => None,
        }
    }

    /// True when the operation failed only because it would have blocked.
    #[must_use]
    pub fn is_would_block(&self) -> bool {
        match self {
            Self::Send(e) | Self::Receive(e) => e.is_would_block(),
            _ => false,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the handle usable; the caller may retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Send(e) | Self::Receive(e) | Self::Poll(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            Self::Allocation { .. }
            | Self::InvalidOption { .. }
            | Self::Closed(_)
            | Self::InvalidArgument(_) => false,
        }
    }

    /// Check if this error reports a closed resource
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}
