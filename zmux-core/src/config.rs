//! Context configuration
//!
//! Tunables applied to a native context right after it is allocated.

use crate::flags::context;

/// Default size of the I/O thread pool.
pub const DEFAULT_IO_THREADS: i32 = 1;

/// Context configuration.
///
/// # Examples
///
/// ```
/// use zmux_core::config::ContextConfig;
///
/// let cfg = ContextConfig::new()
///     .with_io_threads(2)
///     .with_max_sockets(64);
/// assert_eq!(cfg.io_threads, 2);
/// assert_eq!(cfg.tunables(), vec![(2, 64)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Size of the I/O thread pool (ZMQ_IO_THREADS)
    pub io_threads: i32,

    /// Whether sockets may be cached under a persistent id
    pub persistent: bool,

    /// Maximum number of sockets (ZMQ_MAX_SOCKETS)
    pub max_sockets: Option<i32>,

    /// Maximum message size (ZMQ_MAX_MSGSZ)
    pub max_msg_size: Option<i32>,

    /// Enable IPv6 on new sockets (ZMQ_IPV6)
    pub ipv6: Option<bool>,

    /// Block on terminate until pending messages are sent (ZMQ_BLOCKY)
    pub blocky: Option<bool>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            persistent: true,
            max_sockets: None,
            max_msg_size: None,
            ipv6: None,
            blocky: None,
        }
    }
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_io_threads(mut self, io_threads: i32) -> Self {
        self.io_threads = io_threads;
        self
    }

    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn with_max_sockets(mut self, max_sockets: i32) -> Self {
        self.max_sockets = Some(max_sockets);
        self
    }

    pub fn with_max_msg_size(mut self, max_msg_size: i32) -> Self {
        self.max_msg_size = Some(max_msg_size);
        self
    }

    pub fn with_ipv6(mut self, enabled: bool) -> Self {
        self.ipv6 = Some(enabled);
        self
    }

    pub fn with_blocky(mut self, enabled: bool) -> Self {
        self.blocky = Some(enabled);
        self
    }

    /// Context tunables to apply after allocation, excluding the thread count.
    pub fn tunables(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        if let Some(v) = self.max_sockets {
            out.push((context::MAX_SOCKETS, v));
        }
        if let Some(v) = self.max_msg_size {
            out.push((context::MAX_MSGSZ, v));
        }
        if let Some(v) = self.ipv6 {
            out.push((context::IPV6, i32::from(v)));
        }
        if let Some(v) = self.blocky {
            out.push((context::BLOCKY, i32::from(v)));
        }
        out
    }
}
