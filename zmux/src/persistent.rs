//! Context with a persistent socket cache.
//!
//! Sockets requested under a persistent id are created once and handed back
//! on every later request for the same id, for as long as the context lives.

use crate::tracked::TrackedSocket;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};
use zmux_core::codec::keys;
use zmux_core::config::ContextConfig;
use zmux_core::socket_type::SocketType;
use zmux_core::{Result, ZmuxError};
use zmux_libzmq::{Context, Socket};

/// A [`Context`] that can cache sockets by id.
///
/// Cached sockets are shared through `Rc`, so a `PersistentContext` stays on
/// the thread that created it.
///
/// ```no_run
/// use zmux::prelude::*;
///
/// let ctx = PersistentContext::new(1, true)?;
/// let a = ctx.socket(SocketType::Dealer, Some("worker"))?;
/// let b = ctx.socket(SocketType::Dealer, Some("worker"))?;
/// assert!(std::rc::Rc::ptr_eq(&a, &b));
/// # Ok::<(), ZmuxError>(())
/// ```
pub struct PersistentContext {
    context: Context,
    persistent: bool,
    sockets: RefCell<HashMap<String, Rc<TrackedSocket>>>,
}

impl PersistentContext {
    /// Create a context with `io_threads` I/O threads.
    ///
    /// # Errors
    ///
    /// `Allocation` when the native context cannot be created.
    pub fn new(io_threads: i32, persistent: bool) -> Result<Self> {
        Self::with_config(
            &ContextConfig::new()
                .with_io_threads(io_threads)
                .with_persistent(persistent),
        )
    }

    /// Create a context from a full configuration.
    ///
    /// # Errors
    ///
    /// `Allocation` when the native context or a tunable is refused.
    pub fn with_config(config: &ContextConfig) -> Result<Self> {
        Ok(Self {
            context: Context::with_config(config)?,
            persistent: config.persistent,
            sockets: RefCell::new(HashMap::new()),
        })
    }

    /// The underlying context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Whether sockets may be cached under a persistent id.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Get a socket, reusing the cached one for `persistent_id` if any.
    ///
    /// An empty id is treated as no id. A cached socket is returned as is;
    /// `socket_type` is ignored in that case.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a persistent id on a non-persistent context,
    /// otherwise the errors of [`Socket::create`] and of setting the identity.
    pub fn socket(
        &self,
        socket_type: SocketType,
        persistent_id: Option<&str>,
    ) -> Result<Rc<TrackedSocket>> {
        self.socket_with(socket_type, persistent_id, |_| Ok(()))
    }

    /// Like [`PersistentContext::socket`], running `on_new` on a freshly
    /// created socket before it is cached.
    ///
    /// If `on_new` fails, the new socket is dropped and not cached.
    ///
    /// # Errors
    ///
    /// See [`PersistentContext::socket`], plus whatever `on_new` returns.
    pub fn socket_with<F>(
        &self,
        socket_type: SocketType,
        persistent_id: Option<&str>,
        on_new: F,
    ) -> Result<Rc<TrackedSocket>>
    where
        F: FnOnce(&TrackedSocket) -> Result<()>,
    {
        let persistent_id = persistent_id.filter(|id| !id.is_empty());

        if let Some(id) = persistent_id {
            if !self.persistent {
                return Err(ZmuxError::invalid_argument(format!(
                    "persistent id {id:?} requires a persistent context"
                )));
            }
            if let Some(cached) = self.sockets.borrow().get(id) {
                trace!("[CONTEXT] Reusing persistent socket {:?}", id);
                return Ok(Rc::clone(cached));
            }
        }

        let socket = Socket::create(&self.context, socket_type)?;
        if let Some(id) = persistent_id {
            socket.set_option(keys::IDENTITY, id)?;
        }

        let tracked = TrackedSocket::new(socket, persistent_id.map(str::to_owned));
        on_new(&tracked)?;
        let tracked = Rc::new(tracked);

        if let Some(id) = persistent_id {
            debug!("[CONTEXT] Cached {} socket as {:?}", socket_type, id);
            self.sockets
                .borrow_mut()
                .insert(id.to_owned(), Rc::clone(&tracked));
        }
        Ok(tracked)
    }

    /// Drop a socket from the cache. Outstanding handles stay usable.
    pub fn forget(&self, persistent_id: &str) -> Option<Rc<TrackedSocket>> {
        self.sockets.borrow_mut().remove(persistent_id)
    }

    /// Number of cached sockets.
    pub fn persistent_sockets(&self) -> usize {
        self.sockets.borrow().len()
    }

    /// Read a context-level option.
    ///
    /// # Errors
    ///
    /// See [`Context::get_option`].
    pub fn get_option(&self, key: i32) -> Result<i32> {
        self.context.get_option(key)
    }

    /// Write a context-level option.
    ///
    /// # Errors
    ///
    /// See [`Context::set_option`].
    pub fn set_option(&self, key: i32, value: i32) -> Result<i32> {
        self.context.set_option(key, value)
    }
}

impl std::fmt::Debug for PersistentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentContext")
            .field("context", &self.context)
            .field("persistent", &self.persistent)
            .field("cached", &self.sockets.borrow().len())
            .finish()
    }
}
