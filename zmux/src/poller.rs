//! Object-level poller.
//!
//! [`Poller`] registers [`TrackedSocket`]s directly instead of caller ids and
//! hands back the sockets themselves when they become ready. Each socket is
//! registered at most once.

use crate::tracked::TrackedSocket;
use hashbrown::HashMap;
use tracing::trace;
use zmux_core::events::PollEvents;
use zmux_core::Result;
use zmux_libzmq::PollSet;

/// Identifier of a socket registered with a [`Poller`].
///
/// Derived from the socket's address, so it is stable for as long as the
/// socket stays registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PollerId(usize);

impl PollerId {
    /// Id a given socket is (or would be) registered under.
    pub fn of(socket: &TrackedSocket) -> Self {
        Self(socket as *const TrackedSocket as usize)
    }
}

/// Sockets reported ready by one [`Poller::poll`] call.
#[derive(Debug, Default)]
pub struct Ready<'a> {
    /// Number of ready sockets returned by the transport
    pub count: i32,
    /// Sockets with at least one message to receive, in registration order
    pub readable: Vec<&'a TrackedSocket>,
    /// Sockets that can send without blocking, in registration order
    pub writable: Vec<&'a TrackedSocket>,
}

/// Readiness poller over tracked sockets.
#[derive(Default)]
pub struct Poller<'a> {
    set: PollSet<'a, PollerId>,
    sockets: HashMap<PollerId, &'a TrackedSocket>,
    last_errors: Vec<PollerId>,
}

impl<'a> Poller<'a> {
    /// Create an empty poller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `socket` for `events`.
    ///
    /// Adding a socket that is already registered returns its id and keeps
    /// the original interest mask and position.
    pub fn add(&mut self, socket: &'a TrackedSocket, events: PollEvents) -> PollerId {
        let id = PollerId::of(socket);
        if self.sockets.contains_key(&id) {
            trace!("[POLL] {:?} already registered", id);
            return id;
        }
        self.sockets.insert(id, socket);
        self.set.add(id, socket.socket(), events);
        trace!("[POLL] Registered {:?} for {}", id, events);
        id
    }

    /// Unregister `socket`. Returns `false` if it was not registered.
    pub fn remove(&mut self, socket: &TrackedSocket) -> bool {
        self.remove_id(PollerId::of(socket))
    }

    /// Unregister by id. Returns `false` if the id is unknown.
    pub fn remove_id(&mut self, id: PollerId) -> bool {
        if self.sockets.remove(&id).is_none() {
            return false;
        }
        self.set.remove(&id)
    }

    /// Number of registered sockets.
    pub fn count(&self) -> usize {
        self.set.len()
    }

    /// Unregister every socket and forget the last errors.
    pub fn clear(&mut self) {
        self.set.clear();
        self.sockets.clear();
        self.last_errors.clear();
    }

    /// Wait up to `timeout` milliseconds for registered sockets to become
    /// ready.
    ///
    /// An empty poller returns immediately with nothing ready, without
    /// waiting for the timeout.
    ///
    /// # Errors
    ///
    /// `Poll` when the native poll fails.
    pub fn poll(&mut self, timeout: i64) -> Result<Ready<'a>> {
        self.last_errors.clear();
        if self.set.is_empty() {
            return Ok(Ready::default());
        }

        let readiness = self.set.poll(timeout)?;
        self.last_errors = readiness.errored().to_vec();

        let lookup = |ids: &[PollerId]| -> Vec<&'a TrackedSocket> {
            ids.iter()
                .filter_map(|id| self.sockets.get(id).copied())
                .collect()
        };
        Ok(Ready {
            count: readiness.ready,
            readable: lookup(readiness.readable()),
            writable: lookup(readiness.writable()),
        })
    }

    /// Ids that reported an error condition on the last poll.
    pub fn last_errors(&self) -> &[PollerId] {
        &self.last_errors
    }
}

impl std::fmt::Debug for Poller<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("count", &self.count())
            .field("last_errors", &self.last_errors)
            .finish()
    }
}
