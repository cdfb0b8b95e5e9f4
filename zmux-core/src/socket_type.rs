//! Messaging patterns.
//!
//! Discriminants are the native `ZMQ_*` socket type numbers, so a
//! `SocketType` can be handed to the transport unchanged.

use std::fmt;

/// Messaging pattern of a socket; the value of the `TYPE` option (16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SocketType {
    /// Exclusive one-to-one link
    Pair = 0,
    /// Fan-out publisher
    Pub = 1,
    /// Prefix-filtered subscriber
    Sub = 2,
    /// Strict send/receive client
    Req = 3,
    /// Strict receive/send server
    Rep = 4,
    /// Asynchronous load-balancing client (XREQ)
    Dealer = 5,
    /// Identity-addressed server (XREP)
    Router = 6,
    /// Pipeline sink
    Pull = 7,
    /// Pipeline source
    Push = 8,
    /// Publisher that sees subscriptions
    XPub = 9,
    /// Subscriber that sends subscriptions as messages
    XSub = 10,
    /// Raw TCP peer
    Stream = 11,
}

impl SocketType {
    /// Every pattern, in native numbering order.
    pub const ALL: [SocketType; 12] = [
        Self::Pair,
        Self::Pub,
        Self::Sub,
        Self::Req,
        Self::Rep,
        Self::Dealer,
        Self::Router,
        Self::Pull,
        Self::Push,
        Self::XPub,
        Self::XSub,
        Self::Stream,
    ];

    const NAMES: [&'static str; 12] = [
        "PAIR", "PUB", "SUB", "REQ", "REP", "DEALER", "ROUTER", "PULL", "PUSH", "XPUB", "XSUB",
        "STREAM",
    ];

    /// Look up a pattern by its native number.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The native `ZMQ_*` number.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// Upper-case libzmq name, e.g. `"DEALER"`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        Self::NAMES[*self as usize]
    }
}

impl TryFrom<i32> for SocketType {
    type Error = i32;

    fn try_from(raw: i32) -> Result<Self, i32> {
        Self::from_raw(raw).ok_or(raw)
    }
}

impl From<SocketType> for i32 {
    fn from(t: SocketType) -> i32 {
        t.raw()
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
