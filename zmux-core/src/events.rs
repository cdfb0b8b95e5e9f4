//! Poll interest masks and readiness results.
//!
//! `PollEvents` is the bit mask handed to and returned by the native poll
//! call. `Wants` selects which readiness categories a poll should report, and
//! `Readiness` carries the three ordered identifier sequences produced by one
//! multiplex call.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Readiness bit mask (ZMQ_POLLIN / ZMQ_POLLOUT / ZMQ_POLLERR / ZMQ_POLLPRI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PollEvents(i16);

impl PollEvents {
    /// No events.
    pub const NONE: Self = Self(0);
    /// At least one message may be received without blocking.
    pub const POLLIN: Self = Self(1);
    /// At least one message may be sent without blocking.
    pub const POLLOUT: Self = Self(2);
    /// An error condition is present (raw file descriptors only).
    pub const POLLERR: Self = Self(4);
    /// Urgent data (raw file descriptors only).
    pub const POLLPRI: Self = Self(8);

    /// Build a mask from raw bits, keeping unknown bits untouched.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: i16) -> Self {
        Self(bits)
    }

    /// Raw bits for the native poll vector.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> i16 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PollEvents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PollEvents {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PollEvents {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for PollEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::POLLIN) {
            names.push("POLLIN");
        }
        if self.contains(Self::POLLOUT) {
            names.push("POLLOUT");
        }
        if self.contains(Self::POLLERR) {
            names.push("POLLERR");
        }
        if self.contains(Self::POLLPRI) {
            names.push("POLLPRI");
        }
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// Which readiness categories a poll call should compute.
///
/// Unrequested categories are not computed and come back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wants {
    pub readable: bool,
    pub writable: bool,
    pub errored: bool,
}

impl Wants {
    /// Request all three categories.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            readable: true,
            writable: true,
            errored: true,
        }
    }

    /// Request nothing; only the ready count is reported.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            readable: false,
            writable: false,
            errored: false,
        }
    }

    #[must_use]
    pub const fn with_readable(mut self, yes: bool) -> Self {
        self.readable = yes;
        self
    }

    #[must_use]
    pub const fn with_writable(mut self, yes: bool) -> Self {
        self.writable = yes;
        self
    }

    #[must_use]
    pub const fn with_errored(mut self, yes: bool) -> Self {
        self.errored = yes;
        self
    }
}

impl Default for Wants {
    fn default() -> Self {
        Self::all()
    }
}

/// Result of one multiplex call.
///
/// Each requested sequence preserves registration order and is present even
/// when empty; an item can appear in several sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness<I> {
    /// Native return value: number of ready entries
    pub ready: i32,
    pub readable: Option<Vec<I>>,
    pub writable: Option<Vec<I>>,
    pub errored: Option<Vec<I>>,
}

impl<I> Readiness<I> {
    /// Empty result with a sequence allocated for every requested category.
    #[must_use]
    pub fn empty(wants: Wants) -> Self {
        Self {
            ready: 0,
            readable: wants.readable.then(Vec::new),
            writable: wants.writable.then(Vec::new),
            errored: wants.errored.then(Vec::new),
        }
    }

    /// Record the native revents of one item, in registration order.
    pub fn record(&mut self, id: &I, revents: PollEvents)
    where
        I: Clone,
    {
        if revents.contains(PollEvents::POLLIN) {
            if let Some(ids) = self.readable.as_mut() {
                ids.push(id.clone());
            }
        }
        if revents.contains(PollEvents::POLLOUT) {
            if let Some(ids) = self.writable.as_mut() {
                ids.push(id.clone());
            }
        }
        if revents.contains(PollEvents::POLLERR) {
            if let Some(ids) = self.errored.as_mut() {
                ids.push(id.clone());
            }
        }
    }

    /// Readable identifiers (empty when not requested).
    pub fn readable(&self) -> &[I] {
        self.readable.as_deref().unwrap_or(&[])
    }

    /// Writable identifiers (empty when not requested).
    pub fn writable(&self) -> &[I] {
        self.writable.as_deref().unwrap_or(&[])
    }

    /// Errored identifiers (empty when not requested).
    pub fn errored(&self) -> &[I] {
        self.errored.as_deref().unwrap_or(&[])
    }
}
