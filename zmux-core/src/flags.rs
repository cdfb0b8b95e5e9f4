//! Send / receive flags and context option keys.
//!
//! Values are the native libzmq numbers and are passed through unchanged.

/// Non-blocking mode: fail with would-block instead of waiting.
pub const DONTWAIT: i32 = 1;

/// Legacy alias of [`DONTWAIT`].
pub const NOBLOCK: i32 = DONTWAIT;

/// More frames of the same multipart message follow.
pub const SNDMORE: i32 = 2;

/// Context-level tunables (`zmq_ctx_get` / `zmq_ctx_set`).
pub mod context {
    /// Size of the I/O thread pool
    pub const IO_THREADS: i32 = 1;
    /// Maximum number of sockets
    pub const MAX_SOCKETS: i32 = 2;
    /// Largest configurable MAX_SOCKETS (read-only)
    pub const SOCKET_LIMIT: i32 = 3;
    /// Maximum message size
    pub const MAX_MSGSZ: i32 = 5;
    /// IPv6 on new sockets
    pub const IPV6: i32 = 42;
    /// Whether terminate blocks on pending messages
    pub const BLOCKY: i32 = 70;
}
