//! Socket option codec.
//!
//! Maps an option key to an [`OptionDescriptor`] (`kind`, fixed size) and
//! translates an [`OptionValue`] to and from the fixed-width native layout
//! that `zmq_setsockopt` / `zmq_getsockopt` expect.
//!
//! The key table is a static slice indexed once on first use. Unknown keys
//! are not an error: callers treat them as a no-op on set and a zero value on
//! get.

use bytes::Bytes;
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::fmt;
use tracing::trace;

/// Read-back cap for byte-string options.
pub const MAX_BYTES_OPTION_LEN: usize = 255;

/// Native option keys (libzmq numbering).
pub mod keys {
    pub const AFFINITY: i32 = 4;
    pub const IDENTITY: i32 = 5;
    /// Same key as [`IDENTITY`] under its libzmq 4.2+ name
    pub const ROUTING_ID: i32 = IDENTITY;
    pub const SUBSCRIBE: i32 = 6;
    pub const UNSUBSCRIBE: i32 = 7;
    pub const RATE: i32 = 8;
    pub const RECOVERY_IVL: i32 = 9;
    pub const SNDBUF: i32 = 11;
    pub const RCVBUF: i32 = 12;
    pub const RCVMORE: i32 = 13;
    pub const TYPE: i32 = 16;
    pub const LINGER: i32 = 17;
    pub const RECONNECT_IVL: i32 = 18;
    pub const BACKLOG: i32 = 19;
    pub const RECONNECT_IVL_MAX: i32 = 21;
    pub const MAXMSGSIZE: i32 = 22;
    pub const SNDHWM: i32 = 23;
    pub const RCVHWM: i32 = 24;
    pub const MULTICAST_HOPS: i32 = 25;
    pub const RCVTIMEO: i32 = 27;
    pub const SNDTIMEO: i32 = 28;
    pub const IPV4ONLY: i32 = 31;
    pub const LAST_ENDPOINT: i32 = 32;
    pub const ROUTER_MANDATORY: i32 = 33;
    pub const TCP_KEEPALIVE: i32 = 34;
    pub const TCP_KEEPALIVE_CNT: i32 = 35;
    pub const TCP_KEEPALIVE_IDLE: i32 = 36;
    pub const TCP_KEEPALIVE_INTVL: i32 = 37;
    pub const TCP_ACCEPT_FILTER: i32 = 38;
    pub const DELAY_ATTACH_ON_CONNECT: i32 = 39;
    /// Same key as [`DELAY_ATTACH_ON_CONNECT`] under its libzmq 4.x name
    pub const IMMEDIATE: i32 = DELAY_ATTACH_ON_CONNECT;
    pub const XPUB_VERBOSE: i32 = 40;
}

/// Declared scalar kind of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// C `int`
    Int32,
    /// C `int64_t`
    Int64,
    /// C `uint64_t`
    UInt64,
    /// Variable-length byte string
    Bytes,
}

impl OptionKind {
    /// Buffer size used when reading the option back.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int32 => 4,
            Self::Int64 | Self::UInt64 => 8,
            Self::Bytes => MAX_BYTES_OPTION_LEN,
        }
    }
}

/// One entry of the option table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub key: i32,
    pub name: &'static str,
    pub kind: OptionKind,
}

const fn opt(key: i32, name: &'static str, kind: OptionKind) -> OptionDescriptor {
    OptionDescriptor { key, name, kind }
}

/// Every option key the codec recognises.
pub static SOCKET_OPTIONS: &[OptionDescriptor] = &[
    opt(keys::SNDHWM, "SNDHWM", OptionKind::Int32),
    opt(keys::RCVHWM, "RCVHWM", OptionKind::Int32),
    opt(keys::AFFINITY, "AFFINITY", OptionKind::UInt64),
    opt(keys::SUBSCRIBE, "SUBSCRIBE", OptionKind::Bytes),
    opt(keys::UNSUBSCRIBE, "UNSUBSCRIBE", OptionKind::Bytes),
    opt(keys::IDENTITY, "IDENTITY", OptionKind::Bytes),
    opt(keys::RATE, "RATE", OptionKind::Int32),
    opt(keys::RECOVERY_IVL, "RECOVERY_IVL", OptionKind::Int32),
    opt(keys::SNDBUF, "SNDBUF", OptionKind::Int32),
    opt(keys::RCVBUF, "RCVBUF", OptionKind::Int32),
    opt(keys::LINGER, "LINGER", OptionKind::Int32),
    opt(keys::RECONNECT_IVL, "RECONNECT_IVL", OptionKind::Int32),
    opt(keys::RECONNECT_IVL_MAX, "RECONNECT_IVL_MAX", OptionKind::Int32),
    opt(keys::BACKLOG, "BACKLOG", OptionKind::Int32),
    opt(keys::MAXMSGSIZE, "MAXMSGSIZE", OptionKind::Int64),
    opt(keys::MULTICAST_HOPS, "MULTICAST_HOPS", OptionKind::Int32),
    opt(keys::RCVTIMEO, "RCVTIMEO", OptionKind::Int32),
    opt(keys::SNDTIMEO, "SNDTIMEO", OptionKind::Int32),
    opt(keys::IPV4ONLY, "IPV4ONLY", OptionKind::Int32),
    opt(keys::DELAY_ATTACH_ON_CONNECT, "DELAY_ATTACH_ON_CONNECT", OptionKind::Int32),
    opt(keys::ROUTER_MANDATORY, "ROUTER_MANDATORY", OptionKind::Int32),
    opt(keys::XPUB_VERBOSE, "XPUB_VERBOSE", OptionKind::Int32),
    opt(keys::TCP_KEEPALIVE, "TCP_KEEPALIVE", OptionKind::Int32),
    opt(keys::TCP_KEEPALIVE_IDLE, "TCP_KEEPALIVE_IDLE", OptionKind::Int32),
    opt(keys::TCP_KEEPALIVE_CNT, "TCP_KEEPALIVE_CNT", OptionKind::Int32),
    opt(keys::TCP_KEEPALIVE_INTVL, "TCP_KEEPALIVE_INTVL", OptionKind::Int32),
    opt(keys::TCP_ACCEPT_FILTER, "TCP_ACCEPT_FILTER", OptionKind::Bytes),
    // libzmq >= 3 reports RCVMORE as a C int
    opt(keys::RCVMORE, "RCVMORE", OptionKind::Int32),
    opt(keys::TYPE, "TYPE", OptionKind::Int32),
    opt(keys::LAST_ENDPOINT, "LAST_ENDPOINT", OptionKind::Bytes),
];

static INDEX: Lazy<HashMap<i32, &'static OptionDescriptor>> =
    Lazy::new(|| SOCKET_OPTIONS.iter().map(|d| (d.key, d)).collect());

/// Look up the descriptor for an option key.
#[must_use]
pub fn descriptor(key: i32) -> Option<&'static OptionDescriptor> {
    INDEX.get(&key).copied()
}

/// An option value as supplied by, or returned to, the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Bytes(Bytes),
}

impl OptionValue {
    /// Integer view of the value.
    ///
    /// Byte strings are parsed as decimal text, yielding 0 when they do not
    /// hold a number. `UInt64` values above `i64::MAX` wrap.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Int32(v) => i64::from(*v),
            Self::Int64(v) => *v,
            Self::UInt64(v) => *v as i64,
            Self::Bytes(b) => std::str::from_utf8(b)
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(0),
        }
    }

    /// Byte-string view of the value; integers become their decimal text.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Bytes(b) => b.clone(),
            Self::Int32(v) => Bytes::from(v.to_string()),
            Self::Int64(v) => Bytes::from(v.to_string()),
            Self::UInt64(v) => Bytes::from(v.to_string()),
        }
    }

    /// Returns the contained bytes if this is a byte-string value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bytes(b) => b.is_empty(),
            _ => self.as_i64() == 0,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u64> for OptionValue {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Int32(i32::from(v))
    }
}

impl From<Bytes> for OptionValue {
    fn from(v: Bytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for OptionValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

/// Native layout of an option value, ready for `zmq_setsockopt`.
///
/// Integer layouts fit inline; byte strings spill to the heap.
pub type EncodedOption = SmallVec<[u8; 8]>;

impl OptionDescriptor {
    /// Convert a caller value to the native layout of this option.
    ///
    /// Integers are narrowed like a C cast when the declared kind is smaller.
    #[must_use]
    pub fn encode(&self, value: &OptionValue) -> EncodedOption {
        match self.kind {
            OptionKind::Int32 => {
                let v = value.as_i64() as i32;
                SmallVec::from_slice(&v.to_ne_bytes())
            }
            OptionKind::Int64 => SmallVec::from_slice(&value.as_i64().to_ne_bytes()),
            OptionKind::UInt64 => {
                let v = match value {
                    OptionValue::UInt64(v) => *v,
                    other => other.as_i64() as u64,
                };
                SmallVec::from_slice(&v.to_ne_bytes())
            }
            OptionKind::Bytes => SmallVec::from_slice(&value.to_bytes()),
        }
    }

    /// Convert the bytes read back by `zmq_getsockopt` to a value.
    ///
    /// `raw` must already be cut to the size the transport reported. Integer
    /// read-backs narrower than the declared kind are sign-extended.
    #[must_use]
    pub fn decode(&self, raw: &[u8]) -> OptionValue {
        if raw.len() != self.kind.size() && self.kind != OptionKind::Bytes {
            trace!(
                "[CODEC] {} read back {} bytes, declared {}",
                self.name,
                raw.len(),
                self.kind.size()
            );
        }
        match self.kind {
            OptionKind::Int32 => OptionValue::Int32(read_int(raw) as i32),
            OptionKind::Int64 => OptionValue::Int64(read_int(raw)),
            OptionKind::UInt64 => OptionValue::UInt64(read_int(raw) as u64),
            OptionKind::Bytes => {
                let len = raw.len().min(MAX_BYTES_OPTION_LEN);
                OptionValue::Bytes(Bytes::copy_from_slice(&raw[..len]))
            }
        }
    }

    /// Size of the buffer handed to `zmq_getsockopt`.
    #[must_use]
    pub const fn read_capacity(&self) -> usize {
        self.kind.size()
    }
}

/// Zero value reported for keys missing from the table.
#[must_use]
pub const fn unknown_value() -> OptionValue {
    OptionValue::Int32(0)
}

fn read_int(raw: &[u8]) -> i64 {
    match raw.len() {
        8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            i64::from_ne_bytes(buf)
        }
        4 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(raw);
            i64::from(i32::from_ne_bytes(buf))
        }
        _ => 0,
    }
}
