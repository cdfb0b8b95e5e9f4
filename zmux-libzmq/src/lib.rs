//! zmux libzmq binding
//!
//! Context, socket and poll-set implementations over the libzmq C ABI:
//! - `Context`: shared native context with an I/O thread pool
//! - `Socket`: one messaging pattern, options encoded through `zmux_core::codec`
//! - `PollSet`: readiness multiplexing keyed by caller identifiers
//!
//! All native calls live in the private `sys` module.

#![deny(unsafe_code)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod poll;
pub mod socket;

#[allow(unsafe_code)]
mod sys;

pub use context::Context;
pub use poll::{PollItem, PollSet};
pub use socket::Socket;

/// Version of the linked libzmq as `(major, minor, patch)`.
#[must_use]
pub fn libzmq_version() -> (i32, i32, i32) {
    sys::version()
}
