//! # zmux
//!
//! Synchronous ZeroMQ messaging with identifier-keyed readiness polling.
//!
//! ## Architecture
//!
//! - **`zmux-core`**: error taxonomy, socket types, option codec, poll masks
//! - **`zmux-libzmq`**: `Context`, `Socket` and `PollSet` over the libzmq C ABI
//! - **`zmux`**: public API surface (this crate), plus persistent contexts,
//!   endpoint-tracking sockets and an object-level poller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zmux::prelude::*;
//!
//! let ctx = Context::create(1)?;
//!
//! let publisher = Socket::create(&ctx, SocketType::Pub)?;
//! publisher.bind("inproc://feed")?;
//!
//! let subscriber = Socket::create(&ctx, SocketType::Sub)?;
//! subscriber.set_option(keys::SUBSCRIBE, "")?;
//! subscriber.connect("inproc://feed")?;
//!
//! let mut set = PollSet::new();
//! set.add("feed".to_string(), &subscriber, PollEvents::POLLIN);
//!
//! publisher.send(b"hello", 0)?;
//! let ready = set.poll(1000)?;
//! for id in ready.readable() {
//!     println!("{id}: {:?}", subscriber.receive(DONTWAIT)?);
//! }
//! # Ok::<(), ZmuxError>(())
//! ```
//!
//! ## Safety
//!
//! `unsafe` code is confined to the private `sys` module of `zmux-libzmq`.
//! Native contexts, sockets and messages are RAII handles.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Opt-in log output for tests and benches
pub mod dev_tracing;
pub mod persistent;
pub mod poller;
pub mod tracked;

// Re-export core types
pub use bytes::Bytes;
pub use zmux_core::{codec, config, error, events, flags, monitor, options, socket_type};
pub use zmux_core::{NativeError, Resource, Result, TransportOp, ZmuxError};
pub use zmux_libzmq::{libzmq_version, Context, PollItem, PollSet, Socket};

pub use persistent::PersistentContext;
pub use poller::{Poller, PollerId, Ready};
pub use tracked::{Endpoints, TrackedSocket};

/// Everything needed for typical use.
pub mod prelude {
    pub use crate::persistent::PersistentContext;
    pub use crate::poller::{Poller, PollerId};
    pub use crate::tracked::TrackedSocket;
    pub use bytes::Bytes;
    pub use zmux_core::prelude::*;
    pub use zmux_libzmq::{Context, PollSet, Socket};
}
