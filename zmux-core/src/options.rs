//! Socket configuration options
//!
//! A typed bundle of the commonly tuned libzmq socket options. Every field is
//! optional; only the fields that were set are written to the socket, in a
//! fixed order, through the option codec.

use crate::codec::{keys, OptionValue, MAX_BYTES_OPTION_LEN};
use crate::error::{Result, ZmuxError};
use bytes::Bytes;
use std::time::Duration;

/// Socket configuration options.
///
/// # Examples
///
/// ```
/// use zmux_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let opts = SocketOptions::default()
///     .with_recv_timeout(Duration::from_secs(5))
///     .with_linger(Some(Duration::ZERO));
/// assert_eq!(opts.entries().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketOptions {
    /// Receive timeout (ZMQ_RCVTIMEO)
    ///
    /// - `Some(None)`: Block indefinitely (-1)
    /// - `Some(Some(Duration::ZERO))`: Non-blocking
    /// - `Some(Some(duration))`: Wait up to duration
    pub recv_timeout: Option<Option<Duration>>,

    /// Send timeout (ZMQ_SNDTIMEO), same encoding as `recv_timeout`
    pub send_timeout: Option<Option<Duration>>,

    /// Linger timeout (ZMQ_LINGER)
    ///
    /// - `Some(None)`: Wait forever for pending messages on close (-1)
    /// - `Some(Some(Duration::ZERO))`: Discard pending messages
    pub linger: Option<Option<Duration>>,

    /// Reconnect interval (ZMQ_RECONNECT_IVL)
    pub reconnect_ivl: Option<Duration>,

    /// Maximum reconnect interval (ZMQ_RECONNECT_IVL_MAX)
    pub reconnect_ivl_max: Option<Duration>,

    /// High water mark for receiving (ZMQ_RCVHWM)
    pub recv_hwm: Option<i32>,

    /// High water mark for sending (ZMQ_SNDHWM)
    pub send_hwm: Option<i32>,

    /// Kernel send buffer size (ZMQ_SNDBUF)
    pub sndbuf: Option<i32>,

    /// Kernel receive buffer size (ZMQ_RCVBUF)
    pub rcvbuf: Option<i32>,

    /// Listen backlog (ZMQ_BACKLOG)
    pub backlog: Option<i32>,

    /// Maximum inbound message size (ZMQ_MAXMSGSIZE), -1 for no limit
    pub max_msg_size: Option<i64>,

    /// I/O thread affinity bitmap (ZMQ_AFFINITY)
    pub affinity: Option<u64>,

    /// Only queue messages to completed connections (ZMQ_IMMEDIATE)
    pub immediate: Option<bool>,

    /// TCP keepalive (ZMQ_TCP_KEEPALIVE): -1 OS default, 0 off, 1 on
    pub tcp_keepalive: Option<i32>,

    /// Socket identity / routing ID (ZMQ_IDENTITY)
    pub identity: Option<Bytes>,

    /// Subscription prefixes for SUB sockets (ZMQ_SUBSCRIBE)
    pub subscriptions: Vec<Bytes>,

    /// ROUTER mandatory mode (ZMQ_ROUTER_MANDATORY)
    pub router_mandatory: Option<bool>,

    /// XPUB verbose mode (ZMQ_XPUB_VERBOSE)
    pub xpub_verbose: Option<bool>,
}

impl SocketOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait at most `timeout` in `receive`; `Duration::ZERO` never waits.
    ///
    /// ```
    /// use zmux_core::options::SocketOptions;
    /// use std::time::Duration;
    ///
    /// let opts = SocketOptions::new().with_recv_timeout(Duration::ZERO);
    /// assert!(opts.is_recv_nonblocking());
    /// ```
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(Some(timeout));
        self
    }

    /// Let `receive` wait forever.
    pub fn with_recv_blocking(mut self) -> Self {
        self.recv_timeout = Some(None);
        self
    }

    /// Wait at most `timeout` in `send`.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(Some(timeout));
        self
    }

    /// How long close waits for queued messages; `None` waits forever.
    pub fn with_linger(mut self, linger: Option<Duration>) -> Self {
        self.linger = Some(linger);
        self
    }

    pub fn with_reconnect_ivl(mut self, ivl: Duration) -> Self {
        self.reconnect_ivl = Some(ivl);
        self
    }

    /// Upper bound for the reconnect backoff.
    pub fn with_reconnect_ivl_max(mut self, max: Duration) -> Self {
        self.reconnect_ivl_max = Some(max);
        self
    }

    pub fn with_recv_hwm(mut self, hwm: i32) -> Self {
        self.recv_hwm = Some(hwm);
        self
    }

    pub fn with_send_hwm(mut self, hwm: i32) -> Self {
        self.send_hwm = Some(hwm);
        self
    }

    /// Kernel socket buffer sizes in bytes.
    pub fn with_buffer_sizes(mut self, sndbuf: i32, rcvbuf: i32) -> Self {
        self.sndbuf = Some(sndbuf);
        self.rcvbuf = Some(rcvbuf);
        self
    }

    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = Some(backlog);
        self
    }

    /// Largest accepted inbound message; `None` means unlimited.
    pub fn with_max_msg_size(mut self, size: Option<i64>) -> Self {
        self.max_msg_size = Some(size.unwrap_or(-1));
        self
    }

    pub fn with_affinity(mut self, affinity: u64) -> Self {
        self.affinity = Some(affinity);
        self
    }

    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = Some(immediate);
        self
    }

    pub fn with_tcp_keepalive(mut self, keepalive: i32) -> Self {
        self.tcp_keepalive = Some(keepalive);
        self
    }

    /// Routing identity announced to ROUTER peers.
    ///
    /// ```
    /// use zmux_core::options::SocketOptions;
    /// use bytes::Bytes;
    ///
    /// let opts = SocketOptions::new().with_identity(Bytes::from_static(b"worker-01"));
    /// assert!(opts.identity.is_some());
    /// ```
    pub fn with_identity(mut self, id: Bytes) -> Self {
        self.identity = Some(id);
        self
    }

    /// Add a subscription prefix; an empty prefix matches everything.
    pub fn with_subscription(mut self, prefix: impl Into<Bytes>) -> Self {
        self.subscriptions.push(prefix.into());
        self
    }

    pub fn with_router_mandatory(mut self, enabled: bool) -> Self {
        self.router_mandatory = Some(enabled);
        self
    }

    pub fn with_xpub_verbose(mut self, enabled: bool) -> Self {
        self.xpub_verbose = Some(enabled);
        self
    }

    pub fn is_recv_nonblocking(&self) -> bool {
        matches!(self.recv_timeout, Some(Some(d)) if d.is_zero())
    }

    pub fn is_send_nonblocking(&self) -> bool {
        matches!(self.send_timeout, Some(Some(d)) if d.is_zero())
    }

    /// Check that `id` can be used as a routing identity: 1 to 255 bytes,
    /// not starting with a zero byte (libzmq reserves those for generated
    /// identities).
    ///
    /// # Errors
    ///
    /// `ZmuxError::InvalidArgument` describing the violated rule.
    pub fn validate_identity(id: &[u8]) -> Result<()> {
        match id {
            [] => Err(ZmuxError::invalid_argument("identity is empty")),
            [0, ..] => Err(ZmuxError::invalid_argument(
                "identity starts with a zero byte",
            )),
            _ if id.len() > MAX_BYTES_OPTION_LEN => Err(ZmuxError::invalid_argument(format!(
                "identity is {} bytes, limit is {MAX_BYTES_OPTION_LEN}",
                id.len()
            ))),
            _ => Ok(()),
        }
    }

    /// Flatten the set fields into `(key, value)` pairs in application order.
    ///
    /// Identity comes first since libzmq only honours it before connect/bind.
    pub fn entries(&self) -> Vec<(i32, OptionValue)> {
        let mut out = Vec::new();

        if let Some(id) = &self.identity {
            out.push((keys::IDENTITY, OptionValue::Bytes(id.clone())));
        }
        if let Some(v) = self.send_hwm {
            out.push((keys::SNDHWM, v.into()));
        }
        if let Some(v) = self.recv_hwm {
            out.push((keys::RCVHWM, v.into()));
        }
        if let Some(v) = self.affinity {
            out.push((keys::AFFINITY, v.into()));
        }
        if let Some(v) = self.sndbuf {
            out.push((keys::SNDBUF, v.into()));
        }
        if let Some(v) = self.rcvbuf {
            out.push((keys::RCVBUF, v.into()));
        }
        if let Some(v) = self.linger {
            out.push((keys::LINGER, millis_or_infinite(v).into()));
        }
        if let Some(v) = self.reconnect_ivl {
            out.push((keys::RECONNECT_IVL, millis(v).into()));
        }
        if let Some(v) = self.reconnect_ivl_max {
            out.push((keys::RECONNECT_IVL_MAX, millis(v).into()));
        }
        if let Some(v) = self.backlog {
            out.push((keys::BACKLOG, v.into()));
        }
        if let Some(v) = self.max_msg_size {
            out.push((keys::MAXMSGSIZE, v.into()));
        }
        if let Some(v) = self.recv_timeout {
            out.push((keys::RCVTIMEO, millis_or_infinite(v).into()));
        }
        if let Some(v) = self.send_timeout {
            out.push((keys::SNDTIMEO, millis_or_infinite(v).into()));
        }
        if let Some(v) = self.immediate {
            out.push((keys::IMMEDIATE, v.into()));
        }
        if let Some(v) = self.tcp_keepalive {
            out.push((keys::TCP_KEEPALIVE, v.into()));
        }
        if let Some(v) = self.router_mandatory {
            out.push((keys::ROUTER_MANDATORY, v.into()));
        }
        if let Some(v) = self.xpub_verbose {
            out.push((keys::XPUB_VERBOSE, v.into()));
        }
        for prefix in &self.subscriptions {
            out.push((keys::SUBSCRIBE, OptionValue::Bytes(prefix.clone())));
        }

        out
    }
}

/// Milliseconds, saturating at `i32::MAX`.
fn millis(d: Duration) -> i32 {
    i32::try_from(d.as_millis()).unwrap_or(i32::MAX)
}

fn millis_or_infinite(d: Option<Duration>) -> i32 {
    d.map_or(-1, millis)
}
