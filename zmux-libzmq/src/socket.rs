//! Messaging sockets.
//!
//! A `Socket` is created from a [`Context`] and carries one messaging
//! pattern. Payloads are opaque byte strings; options go through the option
//! table in `zmux_core::codec` so every key reaches the transport in its
//! native binary layout.

use crate::context::Context;
use crate::sys::RawSocket;
use bytes::Bytes;
use std::ffi::CString;
use std::fmt;
use tracing::{debug, trace};
use zmux_core::codec::{self, keys, OptionValue, MAX_BYTES_OPTION_LEN};
use zmux_core::flags::SNDMORE;
use zmux_core::options::SocketOptions;
use zmux_core::socket_type::SocketType;
use zmux_core::{Resource, Result, TransportOp, ZmuxError};

/// A messaging endpoint of one pattern.
///
/// `Socket` is `Send` but not `Sync`: it may move to another thread, but must
/// not be used from two threads at once. Dropping it closes it.
pub struct Socket {
    handle: Option<RawSocket>,
    kind: i32,
}

impl Socket {
    /// Create a socket of `socket_type` in `context`.
    ///
    /// # Errors
    ///
    /// `Closed(Context)` when the context was closed, `Allocation` when the
    /// transport refuses the socket.
    pub fn create(context: &Context, socket_type: SocketType) -> Result<Self> {
        Self::create_raw(context, socket_type.raw())
    }

    /// Create a socket from a raw transport type code.
    ///
    /// Unknown codes are passed through and rejected by the transport.
    ///
    /// # Errors
    ///
    /// See [`Socket::create`].
    pub fn create_raw(context: &Context, kind: i32) -> Result<Self> {
        let raw = context.raw()?;
        let handle = RawSocket::open(&raw, kind)
            .map_err(|source| ZmuxError::allocation(Resource::Socket, source))?;

        debug!("[SOCKET] Created {} socket", type_name(kind));
        Ok(Self {
            handle: Some(handle),
            kind,
        })
    }

    fn handle(&self) -> Result<&RawSocket> {
        self.handle
            .as_ref()
            .ok_or(ZmuxError::Closed(Resource::Socket))
    }

    pub(crate) fn raw_handle(&self) -> Option<&RawSocket> {
        self.handle.as_ref()
    }

    /// Connect to a remote endpoint (e.g. `tcp://127.0.0.1:5555`).
    ///
    /// # Errors
    ///
    /// `Transport` with the native cause when the endpoint is rejected.
    pub fn connect(&self, dsn: &str) -> Result<()> {
        self.endpoint_op(TransportOp::Connect, dsn)
    }

    /// Disconnect from a previously connected endpoint.
    ///
    /// # Errors
    ///
    /// `Transport` when the endpoint was never connected.
    pub fn disconnect(&self, dsn: &str) -> Result<()> {
        self.endpoint_op(TransportOp::Disconnect, dsn)
    }

    /// Accept connections on a local endpoint.
    ///
    /// # Errors
    ///
    /// `Transport` when the address is in use or malformed.
    pub fn bind(&self, dsn: &str) -> Result<()> {
        self.endpoint_op(TransportOp::Bind, dsn)
    }

    /// Stop accepting connections on a bound endpoint.
    ///
    /// # Errors
    ///
    /// `Transport` when the endpoint was never bound.
    pub fn unbind(&self, dsn: &str) -> Result<()> {
        self.endpoint_op(TransportOp::Unbind, dsn)
    }

    fn endpoint_op(&self, op: TransportOp, dsn: &str) -> Result<()> {
        let handle = self.handle()?;
        let endpoint = CString::new(dsn).map_err(|_| {
            ZmuxError::invalid_argument(format!("endpoint {dsn:?} contains a NUL byte"))
        })?;

        let result = match op {
            TransportOp::Connect => handle.connect(&endpoint),
            TransportOp::Disconnect => handle.disconnect(&endpoint),
            TransportOp::Bind => handle.bind(&endpoint),
            TransportOp::Unbind => handle.unbind(&endpoint),
        };
        result.map_err(|source| ZmuxError::transport(op, dsn, source))?;

        debug!("[SOCKET] {} {}", op, dsn);
        Ok(())
    }

    /// Send one frame. `flags` is a union of `DONTWAIT` and `SNDMORE`.
    ///
    /// # Errors
    ///
    /// `Send` with the native cause; under `DONTWAIT` a full queue yields an
    /// error for which `is_would_block()` holds.
    pub fn send(&self, payload: &[u8], flags: i32) -> Result<()> {
        let handle = self.handle()?;
        handle.send(payload, flags).map_err(ZmuxError::Send)?;
        trace!("[SOCKET] Sent {} bytes (flags {})", payload.len(), flags);
        Ok(())
    }

    /// Send every frame of a multipart message; all but the last carry
    /// `SNDMORE`. An empty iterator sends nothing.
    ///
    /// # Errors
    ///
    /// The first `Send` failure; earlier frames stay queued.
    pub fn send_multipart<I, T>(&self, frames: I, flags: i32) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut frames = frames.into_iter().peekable();
        while let Some(frame) = frames.next() {
            let more = if frames.peek().is_some() { SNDMORE } else { 0 };
            self.send(frame.as_ref(), flags | more)?;
        }
        Ok(())
    }

    /// Receive one frame. The result is exactly as long as the frame.
    ///
    /// # Errors
    ///
    /// `Receive` with the native cause; under `DONTWAIT` with nothing queued
    /// the error reports `is_would_block()`.
    pub fn receive(&self, flags: i32) -> Result<Bytes> {
        let handle = self.handle()?;
        let frame = handle.recv(flags).map_err(ZmuxError::Receive)?;
        trace!("[SOCKET] Received {} bytes", frame.len());
        Ok(frame)
    }

    /// Whether the last received frame is followed by more frames.
    ///
    /// # Errors
    ///
    /// `Closed(Socket)` or `InvalidOption`.
    pub fn has_more(&self) -> Result<bool> {
        Ok(!self.get_option(keys::RCVMORE)?.is_zero())
    }

    /// Receive every frame of the next multipart message.
    ///
    /// # Errors
    ///
    /// The first `Receive` failure.
    pub fn receive_multipart(&self, flags: i32) -> Result<Vec<Bytes>> {
        let mut frames = vec![self.receive(flags)?];
        while self.has_more()? {
            frames.push(self.receive(flags)?);
        }
        Ok(frames)
    }

    /// Read an option in its declared layout.
    ///
    /// Keys missing from the option table are not sent to the transport and
    /// read as `Int32(0)`.
    ///
    /// # Errors
    ///
    /// `Closed(Socket)`, or `InvalidOption` when the transport refuses the key.
    pub fn get_option(&self, key: i32) -> Result<OptionValue> {
        let handle = self.handle()?;
        let Some(desc) = codec::descriptor(key) else {
            debug!("[SOCKET] Unknown option {} read as 0", key);
            return Ok(codec::unknown_value());
        };

        let mut buf = [0u8; MAX_BYTES_OPTION_LEN];
        let buf = &mut buf[..desc.read_capacity()];
        let size = handle
            .get_option(key, buf)
            .map_err(|source| ZmuxError::invalid_option(key, source))?;
        Ok(desc.decode(&buf[..size.min(buf.len())]))
    }

    /// Write an option, converting `value` to the declared layout. Returns the
    /// transport status (`0`).
    ///
    /// Keys missing from the option table are ignored and report `0`.
    ///
    /// # Errors
    ///
    /// `Closed(Socket)`, or `InvalidOption` when the transport refuses the
    /// key or value.
    pub fn set_option(&self, key: i32, value: impl Into<OptionValue>) -> Result<i32> {
        let handle = self.handle()?;
        let value = value.into();
        let Some(desc) = codec::descriptor(key) else {
            debug!("[SOCKET] Unknown option {} ignored", key);
            return Ok(0);
        };

        let encoded = desc.encode(&value);
        handle
            .set_option(key, &encoded)
            .map_err(|source| ZmuxError::invalid_option(key, source))?;
        trace!("[SOCKET] {} = {}", desc.name, value);
        Ok(0)
    }

    /// Apply every option set in `options`, identity first.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unusable identity, otherwise the first option
    /// the transport refuses.
    pub fn apply_options(&self, options: &SocketOptions) -> Result<()> {
        if let Some(id) = &options.identity {
            SocketOptions::validate_identity(id)?;
        }
        for (key, value) in options.entries() {
            self.set_option(key, value)?;
        }
        Ok(())
    }

    /// Endpoint most recently bound or connected, with wildcards resolved.
    ///
    /// # Errors
    ///
    /// `Closed(Socket)` or `InvalidOption`.
    pub fn last_endpoint(&self) -> Result<String> {
        let value = self.get_option(keys::LAST_ENDPOINT)?;
        let raw = value.as_bytes().unwrap_or_default();
        let raw = raw.strip_suffix(b"\0").unwrap_or(raw);
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Close the socket. Idempotent; later operations report `Closed(Socket)`.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle);
            debug!("[SOCKET] Closed {} socket", type_name(self.kind));
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    #[must_use]
    pub fn socket_type(&self) -> Option<SocketType> {
        SocketType::from_raw(self.kind)
    }

    /// Raw transport type code the socket was created with.
    #[must_use]
    pub const fn raw_type(&self) -> i32 {
        self.kind
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket")
            .field("type", &type_name(self.kind))
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn type_name(kind: i32) -> &'static str {
    SocketType::from_raw(kind).map_or("UNKNOWN", |t| t.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zmux_core::flags::DONTWAIT;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_socket_is_send() {
        assert_send::<Socket>();
    }

    #[test]
    fn test_closed_socket_reports_closed() {
        let ctx = Context::create(1).unwrap();
        let mut socket = Socket::create(&ctx, SocketType::Pair).unwrap();
        socket.close();
        socket.close();

        assert!(socket.is_closed());
        assert!(matches!(
            socket.send(b"x", 0),
            Err(ZmuxError::Closed(Resource::Socket))
        ));
        assert!(matches!(
            socket.receive(DONTWAIT),
            Err(ZmuxError::Closed(Resource::Socket))
        ));
        assert!(matches!(
            socket.get_option(keys::LINGER),
            Err(ZmuxError::Closed(Resource::Socket))
        ));
        assert!(matches!(
            socket.bind("inproc://closed"),
            Err(ZmuxError::Closed(Resource::Socket))
        ));
    }

    #[test]
    fn test_nul_in_endpoint() {
        let ctx = Context::create(1).unwrap();
        let socket = Socket::create(&ctx, SocketType::Pair).unwrap();
        let err = socket.bind("inproc://a\0b").unwrap_err();
        assert!(matches!(err, ZmuxError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_option_is_lenient() {
        let ctx = Context::create(1).unwrap();
        let socket = Socket::create(&ctx, SocketType::Pair).unwrap();
        assert_eq!(socket.set_option(9999, 42).unwrap(), 0);
        assert_eq!(socket.get_option(9999).unwrap(), OptionValue::Int32(0));
    }

    #[test]
    fn test_type_round_trip() {
        let ctx = Context::create(1).unwrap();
        let socket = Socket::create(&ctx, SocketType::Dealer).unwrap();
        assert_eq!(socket.socket_type(), Some(SocketType::Dealer));
        assert_eq!(socket.raw_type(), 5);
        assert_eq!(
            socket.get_option(keys::TYPE).unwrap(),
            OptionValue::Int32(SocketType::Dealer.raw())
        );
    }

    #[test]
    fn test_socket_outlives_closed_context() {
        let ctx = Context::create(1).unwrap();
        let a = Socket::create(&ctx, SocketType::Pair).unwrap();
        let b = Socket::create(&ctx, SocketType::Pair).unwrap();
        assert_eq!(ctx.open_sockets(), 2);

        ctx.close();
        a.bind("inproc://outlive").unwrap();
        b.connect("inproc://outlive").unwrap();
        a.send(b"still here", 0).unwrap();
        assert_eq!(&b.receive(0).unwrap()[..], b"still here");

        assert!(matches!(
            Socket::create(&ctx, SocketType::Pair),
            Err(ZmuxError::Closed(Resource::Context))
        ));
    }
}
