//! zmux Core
//!
//! This crate contains the transport-agnostic building blocks:
//! - Error taxonomy (`error`)
//! - Socket types (`socket_type`)
//! - Poll interest masks and readiness results (`events`)
//! - Send/receive flags and context keys (`flags`)
//! - Option key table and native layout codec (`codec`)
//! - Typed socket options (`options`) and context configuration (`config`)
//! - Lifecycle events (`monitor`)

#![cfg_attr(not(test), deny(unsafe_code))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod flags;
pub mod monitor;
pub mod options;
pub mod socket_type;

pub use error::{NativeError, Resource, Result, TransportOp, ZmuxError};

// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::codec::{keys, OptionDescriptor, OptionKind, OptionValue};
    pub use crate::config::ContextConfig;
    pub use crate::error::{NativeError, Result, ZmuxError};
    pub use crate::events::{PollEvents, Readiness, Wants};
    pub use crate::flags::{DONTWAIT, SNDMORE};
    pub use crate::monitor::{SocketEvent, SocketMonitor};
    pub use crate::options::SocketOptions;
    pub use crate::socket_type::SocketType;
}
