//! Readiness multiplexing over a set of sockets.
//!
//! A `PollSet` registers sockets under caller-chosen identifiers. Each call
//! to [`PollSet::poll`] builds a fresh native poll vector, waits once, and
//! partitions the registered identifiers into readable, writable and errored
//! sequences in registration order.

use crate::socket::Socket;
use crate::sys::{self, RawPollItem};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;
use std::os::raw::{c_int, c_long};
use tracing::{trace, warn};
use zmux_core::events::{PollEvents, Readiness, Wants};
use zmux_core::{Result, ZmuxError};

/// Poll vectors up to this size stay on the stack.
const INLINE_ITEMS: usize = 16;

/// Clamp a millisecond timeout into the native `long`, keeping its sign.
fn native_timeout(timeout: i64) -> c_long {
    c_long::try_from(timeout).unwrap_or(if timeout < 0 { -1 } else { c_long::MAX })
}

fn native_count(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| {
        ZmuxError::invalid_argument(format!("{len} poll items exceed the native limit"))
    })
}

/// One registration: identifier, borrowed socket, interest mask.
pub struct PollItem<'a, I> {
    id: I,
    socket: &'a Socket,
    events: PollEvents,
}

impl<'a, I> PollItem<'a, I> {
    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn socket(&self) -> &'a Socket {
        self.socket
    }

    pub fn events(&self) -> PollEvents {
        self.events
    }
}

impl<I: fmt::Debug> fmt::Debug for PollItem<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollItem")
            .field("id", &self.id)
            .field("socket", self.socket)
            .field("events", &self.events)
            .finish()
    }
}

/// Ordered set of poll registrations.
///
/// Sockets are borrowed for the lifetime of the set, so a registered socket
/// cannot be closed or dropped while the set still refers to it.
///
/// ```no_run
/// use zmux_libzmq::{Context, PollSet, Socket};
/// use zmux_core::prelude::*;
///
/// let ctx = Context::create(1)?;
/// let socket = Socket::create(&ctx, SocketType::Pull)?;
/// socket.bind("inproc://jobs")?;
///
/// let mut set = PollSet::new();
/// set.add("jobs".to_string(), &socket, PollEvents::POLLIN);
/// let ready = set.poll(100)?;
/// for id in ready.readable() {
///     println!("{id} is readable");
/// }
/// # Ok::<(), ZmuxError>(())
/// ```
pub struct PollSet<'a, I = String> {
    items: Vec<PollItem<'a, I>>,
}

impl<'a, I> PollSet<'a, I> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Register `socket` under `id`. Duplicate ids are kept as separate
    /// entries.
    pub fn add(&mut self, id: I, socket: &'a Socket, events: PollEvents) {
        self.items.push(PollItem { id, socket, events });
    }

    /// Remove the first registration with a matching id.
    ///
    /// Returns `false` and leaves the set untouched when nothing matches.
    pub fn remove<Q>(&mut self, id: &Q) -> bool
    where
        I: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        match self.items.iter().position(|item| item.id.borrow() == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PollItem<'a, I>> {
        self.items.iter()
    }

    /// Wait up to `timeout` milliseconds (`-1` waits forever, `0` returns
    /// immediately) and report every readiness category.
    ///
    /// # Errors
    ///
    /// `ZmuxError::Poll` when the native call fails.
    pub fn poll(&self, timeout: i64) -> Result<Readiness<I>>
    where
        I: Clone,
    {
        self.poll_with(timeout, Wants::all())
    }

    /// Like [`PollSet::poll`], but only fills the categories in `wants`.
    ///
    /// Sockets closed before they were registered are skipped. The native
    /// call is made even when no item is live, so a positive timeout still
    /// waits.
    ///
    /// # Errors
    ///
    /// `ZmuxError::Poll` when the native call fails, `InvalidArgument` when
    /// the set is larger than the native call accepts.
    pub fn poll_with(&self, timeout: i64, wants: Wants) -> Result<Readiness<I>>
    where
        I: Clone,
    {
        let mut native: SmallVec<[RawPollItem; INLINE_ITEMS]> = SmallVec::new();
        let mut slots: SmallVec<[usize; INLINE_ITEMS]> = SmallVec::new();

        for (index, item) in self.items.iter().enumerate() {
            match item.socket.raw_handle() {
                Some(handle) => {
                    native.push(handle.poll_item(item.events));
                    slots.push(index);
                }
                None => warn!("[POLL] Skipping closed socket at position {}", index),
            }
        }

        let count = native_count(native.len())?;
        trace!("[POLL] Waiting on {} items, timeout {}ms", count, timeout);
        let ready =
            sys::poll(&mut native, count, native_timeout(timeout)).map_err(ZmuxError::Poll)?;

        let mut readiness = Readiness::empty(wants);
        readiness.ready = ready;
        if ready > 0 {
            for (raw, &index) in native.iter().zip(slots.iter()) {
                readiness.record(&self.items[index].id, raw.revents());
            }
        }
        trace!("[POLL] {} items ready", ready);
        Ok(readiness)
    }
}

impl<I> Default for PollSet<'_, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: fmt::Debug> fmt::Debug for PollSet<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
