//! Messaging context.
//!
//! A `Context` owns the transport's I/O thread pool. Sockets created from it
//! hold a shared reference to the native context, so closing the `Context`
//! only releases the caller's reference: the native context is terminated
//! once the last socket created from it has closed as well.

use crate::sys::RawContext;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;
use zmux_core::config::ContextConfig;
use zmux_core::flags::context as keys;
use zmux_core::{Resource, Result, ZmuxError};

/// Handle to a native messaging context.
///
/// `Context` is `Send + Sync`; it can be shared between threads and closed
/// through a shared reference.
#[derive(Debug)]
pub struct Context {
    raw: RwLock<Option<Arc<RawContext>>>,
    io_threads: i32,
}

impl Context {
    /// Create a context with an I/O pool of `io_threads` threads.
    ///
    /// # Errors
    ///
    /// `ZmuxError::Allocation` when the transport refuses the context or the
    /// thread count.
    pub fn create(io_threads: i32) -> Result<Self> {
        Self::with_config(&ContextConfig::new().with_io_threads(io_threads))
    }

    /// Create a context and apply every tunable of `config`.
    ///
    /// # Errors
    ///
    /// `ZmuxError::Allocation` when allocation or any tunable fails. The
    /// half-built native context is terminated before returning.
    pub fn with_config(config: &ContextConfig) -> Result<Self> {
        let alloc = |source| ZmuxError::allocation(Resource::Context, source);

        let raw = RawContext::new().map_err(alloc)?;
        raw.set(keys::IO_THREADS, config.io_threads).map_err(alloc)?;
        for (key, value) in config.tunables() {
            raw.set(key, value).map_err(alloc)?;
        }

        debug!("[CONTEXT] Created with {} I/O threads", config.io_threads);
        Ok(Self {
            raw: RwLock::new(Some(Arc::new(raw))),
            io_threads: config.io_threads,
        })
    }

    /// Read a context-level option.
    ///
    /// # Errors
    ///
    /// `Closed(Context)` after `close`; `InvalidOption` when the transport
    /// rejects the key.
    pub fn get_option(&self, key: i32) -> Result<i32> {
        let raw = self.raw()?;
        raw.get(key)
            .map_err(|source| ZmuxError::invalid_option(key, source))
    }

    /// Write a context-level option. Returns the transport status (`0`).
    ///
    /// # Errors
    ///
    /// `Closed(Context)` after `close`; `InvalidOption` when the transport
    /// rejects the key or the value.
    pub fn set_option(&self, key: i32, value: i32) -> Result<i32> {
        let raw = self.raw()?;
        let rc = raw
            .set(key, value)
            .map_err(|source| ZmuxError::invalid_option(key, source))?;
        debug!("[CONTEXT] Option {} set to {}", key, value);
        Ok(rc)
    }

    /// Release this handle's reference to the native context.
    ///
    /// Idempotent. Sockets that are still open keep working; the native
    /// context terminates after the last of them closes.
    pub fn close(&self) {
        let taken = self.raw.write().take();
        if let Some(raw) = taken {
            let sockets = raw.socket_count();
            if sockets > 0 {
                debug!("[CONTEXT] Closed, {} open sockets keep it alive", sockets);
            } else {
                debug!("[CONTEXT] Closed");
            }
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.raw.read().is_none()
    }

    /// Thread count the context was created with.
    #[must_use]
    pub const fn io_threads(&self) -> i32 {
        self.io_threads
    }

    /// Number of open sockets sharing the native context (0 once closed).
    #[must_use]
    pub fn open_sockets(&self) -> usize {
        self.raw
            .read()
            .as_ref()
            .map_or(0, |raw| raw.socket_count())
    }

    pub(crate) fn raw(&self) -> Result<Arc<RawContext>> {
        self.raw
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(ZmuxError::Closed(Resource::Context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::Socket;
    use zmux_core::socket_type::SocketType;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_send_sync() {
        assert_send_sync::<Context>();
    }

    #[test]
    fn test_create_reports_threads() {
        let ctx = Context::create(2).unwrap();
        assert_eq!(ctx.io_threads(), 2);
        assert_eq!(ctx.get_option(keys::IO_THREADS).unwrap(), 2);
        assert!(!ctx.is_closed());
        assert_eq!(ctx.open_sockets(), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let ctx = Context::create(1).unwrap();
        ctx.close();
        ctx.close();
        assert!(ctx.is_closed());
        assert!(matches!(
            ctx.get_option(keys::IO_THREADS),
            Err(ZmuxError::Closed(Resource::Context))
        ));
        assert!(matches!(
            ctx.set_option(keys::MAX_SOCKETS, 8),
            Err(ZmuxError::Closed(Resource::Context))
        ));
    }

    #[test]
    fn test_negative_threads_rejected() {
        let err = Context::create(-1).unwrap_err();
        assert!(matches!(
            err,
            ZmuxError::Allocation {
                resource: Resource::Context,
                ..
            }
        ));
    }

    #[test]
    fn test_socket_count_ignores_handle_clones() {
        let ctx = Context::create(1).unwrap();
        let socket = Socket::create(&ctx, SocketType::Pair).unwrap();
        let held = ctx.raw().unwrap();
        assert_eq!(ctx.open_sockets(), 1);

        drop(socket);
        assert_eq!(ctx.open_sockets(), 0);
        drop(held);
    }
}
