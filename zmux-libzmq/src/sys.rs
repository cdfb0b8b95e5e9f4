//! Safe wrappers over the libzmq C ABI.
//!
//! This is the only module of the crate that contains `unsafe` code. Every
//! native handle is an RAII type: contexts are terminated, sockets closed and
//! messages released in `Drop`, so no failure path can leak them.

use bytes::Bytes;
use std::ffi::{c_void, CStr};
use std::io;
use std::mem::MaybeUninit;
use std::os::raw::{c_int, c_long, c_short};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;
use zmux_core::events::PollEvents;
use zmux_core::NativeError;

/// Capture the calling thread's transport error.
pub(crate) fn last_error() -> NativeError {
    // SAFETY: zmq_errno reads thread-local errno; zmq_strerror returns a
    // pointer to a static NUL-terminated string (or null).
    unsafe {
        let code = zmq_sys::zmq_errno();
        let msg = zmq_sys::zmq_strerror(code);
        let message = if msg.is_null() {
            String::from("unknown error")
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        };
        NativeError::new(code, message)
    }
}

pub(crate) fn version() -> (i32, i32, i32) {
    let (mut major, mut minor, mut patch): (c_int, c_int, c_int) = (0, 0, 0);
    // SAFETY: the three out-pointers are valid for writes.
    unsafe { zmq_sys::zmq_version(&mut major, &mut minor, &mut patch) };
    (major, minor, patch)
}

fn check(rc: c_int) -> Result<c_int, NativeError> {
    if rc == -1 {
        Err(last_error())
    } else {
        Ok(rc)
    }
}

/// Owned native context. Terminated when the last reference drops.
#[derive(Debug)]
pub(crate) struct RawContext {
    ptr: NonNull<c_void>,
    sockets: AtomicUsize,
}

// SAFETY: libzmq contexts are thread safe.
unsafe impl Send for RawContext {}
// SAFETY: as above; every method only passes the pointer to thread-safe calls.
unsafe impl Sync for RawContext {}

impl RawContext {
    pub(crate) fn new() -> Result<Self, NativeError> {
        // SAFETY: no preconditions.
        let ptr = unsafe { zmq_sys::zmq_ctx_new() };
        NonNull::new(ptr)
            .map(|ptr| Self {
                ptr,
                sockets: AtomicUsize::new(0),
            })
            .ok_or_else(last_error)
    }

    /// Sockets opened on this context and not yet closed.
    pub(crate) fn socket_count(&self) -> usize {
        self.sockets.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, option: i32, value: i32) -> Result<i32, NativeError> {
        // SAFETY: ptr is a live context.
        check(unsafe { zmq_sys::zmq_ctx_set(self.ptr.as_ptr(), option as c_int, value as c_int) })
    }

    pub(crate) fn get(&self, option: i32) -> Result<i32, NativeError> {
        // SAFETY: ptr is a live context.
        check(unsafe { zmq_sys::zmq_ctx_get(self.ptr.as_ptr(), option as c_int) })
    }
}

impl Drop for RawContext {
    fn drop(&mut self) {
        loop {
            // SAFETY: ptr is a live context and is never used after this.
            let rc = unsafe { zmq_sys::zmq_ctx_term(self.ptr.as_ptr()) };
            if rc == 0 {
                break;
            }
            let err = last_error();
            if err.kind() != io::ErrorKind::Interrupted {
                warn!("[CONTEXT] Terminate failed: {}", err);
                break;
            }
        }
    }
}

/// Owned native socket. Keeps its context alive until closed.
#[derive(Debug)]
pub(crate) struct RawSocket {
    ptr: NonNull<c_void>,
    // Dropped after `Drop::drop` has closed the socket.
    context: Arc<RawContext>,
}

// SAFETY: a libzmq socket may migrate between threads; it is not `Sync`.
unsafe impl Send for RawSocket {}

impl RawSocket {
    pub(crate) fn open(context: &Arc<RawContext>, kind: i32) -> Result<Self, NativeError> {
        // SAFETY: the context pointer is live for as long as `context` is.
        let ptr = unsafe { zmq_sys::zmq_socket(context.ptr.as_ptr(), kind as c_int) };
        let ptr = NonNull::new(ptr).ok_or_else(last_error)?;
        context.sockets.fetch_add(1, Ordering::AcqRel);
        Ok(Self {
            ptr,
            context: Arc::clone(context),
        })
    }

    pub(crate) fn connect(&self, endpoint: &CStr) -> Result<(), NativeError> {
        // SAFETY: ptr is a live socket; endpoint is NUL-terminated.
        check(unsafe { zmq_sys::zmq_connect(self.ptr.as_ptr(), endpoint.as_ptr()) }).map(drop)
    }

    pub(crate) fn disconnect(&self, endpoint: &CStr) -> Result<(), NativeError> {
        // SAFETY: ptr is a live socket; endpoint is NUL-terminated.
        check(unsafe { zmq_sys::zmq_disconnect(self.ptr.as_ptr(), endpoint.as_ptr()) }).map(drop)
    }

    pub(crate) fn bind(&self, endpoint: &CStr) -> Result<(), NativeError> {
        // SAFETY: ptr is a live socket; endpoint is NUL-terminated.
        check(unsafe { zmq_sys::zmq_bind(self.ptr.as_ptr(), endpoint.as_ptr()) }).map(drop)
    }

    pub(crate) fn unbind(&self, endpoint: &CStr) -> Result<(), NativeError> {
        // SAFETY: ptr is a live socket; endpoint is NUL-terminated.
        check(unsafe { zmq_sys::zmq_unbind(self.ptr.as_ptr(), endpoint.as_ptr()) }).map(drop)
    }

    pub(crate) fn set_option(&self, option: i32, value: &[u8]) -> Result<(), NativeError> {
        // SAFETY: value is valid for value.len() bytes for the whole call.
        check(unsafe {
            zmq_sys::zmq_setsockopt(
                self.ptr.as_ptr(),
                option as c_int,
                value.as_ptr().cast(),
                value.len(),
            )
        })
        .map(drop)
    }

    /// Read an option into `buf`, returning the size the transport reported.
    pub(crate) fn get_option(&self, option: i32, buf: &mut [u8]) -> Result<usize, NativeError> {
        let mut size = buf.len();
        // SAFETY: buf is writable for `size` bytes; libzmq writes at most
        // that many and stores the actual length back into `size`.
        check(unsafe {
            zmq_sys::zmq_getsockopt(
                self.ptr.as_ptr(),
                option as c_int,
                buf.as_mut_ptr().cast(),
                &mut size,
            )
        })?;
        Ok(size)
    }

    /// Copy `payload` into a message of exactly its length and send it.
    pub(crate) fn send(&self, payload: &[u8], flags: i32) -> Result<(), NativeError> {
        let mut msg = Message::with_size(payload.len())?;
        msg.data_mut().copy_from_slice(payload);
        // SAFETY: msg is initialised; on success libzmq takes its content and
        // leaves an empty message that `Message::drop` may still close.
        check(unsafe { zmq_sys::zmq_msg_send(msg.as_mut_ptr(), self.ptr.as_ptr(), flags as c_int) })
            .map(drop)
    }

    /// Receive one frame, copied into a buffer of the reported size.
    pub(crate) fn recv(&self, flags: i32) -> Result<Bytes, NativeError> {
        let mut msg = Message::empty()?;
        // SAFETY: msg is initialised and exclusively borrowed for the call.
        check(unsafe { zmq_sys::zmq_msg_recv(msg.as_mut_ptr(), self.ptr.as_ptr(), flags as c_int) })?;
        Ok(Bytes::copy_from_slice(msg.data_mut()))
    }

    pub(crate) fn poll_item(&self, events: PollEvents) -> RawPollItem {
        RawPollItem {
            socket: self.ptr.as_ptr(),
            fd: 0,
            events: events.bits() as c_short,
            revents: 0,
        }
    }
}

impl Drop for RawSocket {
    fn drop(&mut self) {
        // SAFETY: ptr is a live socket and is never used after this.
        let rc = unsafe { zmq_sys::zmq_close(self.ptr.as_ptr()) };
        if rc == -1 {
            warn!("[SOCKET] Close failed: {}", last_error());
        }
        self.context.sockets.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Initialised `zmq_msg_t`, closed on drop.
struct Message {
    msg: MaybeUninit<zmq_sys::zmq_msg_t>,
}

impl Message {
    fn empty() -> Result<Self, NativeError> {
        let mut msg = MaybeUninit::uninit();
        // SAFETY: zmq_msg_init initialises the storage it is given.
        check(unsafe { zmq_sys::zmq_msg_init(msg.as_mut_ptr()) })?;
        Ok(Self { msg })
    }

    fn with_size(len: usize) -> Result<Self, NativeError> {
        let mut msg = MaybeUninit::uninit();
        // SAFETY: zmq_msg_init_size initialises the storage it is given.
        check(unsafe { zmq_sys::zmq_msg_init_size(msg.as_mut_ptr(), len) })?;
        Ok(Self { msg })
    }

    fn as_mut_ptr(&mut self) -> *mut zmq_sys::zmq_msg_t {
        self.msg.as_mut_ptr()
    }

    fn data_mut(&mut self) -> &mut [u8] {
        // SAFETY: the message is initialised; data/size describe its buffer.
        unsafe {
            let len = zmq_sys::zmq_msg_size(self.as_mut_ptr());
            if len == 0 {
                return &mut [];
            }
            let data = zmq_sys::zmq_msg_data(self.as_mut_ptr()).cast::<u8>();
            std::slice::from_raw_parts_mut(data, len)
        }
    }
}

impl Drop for Message {
    fn drop(&mut self) {
        // SAFETY: the message was initialised by a constructor.
        unsafe {
            zmq_sys::zmq_msg_close(self.as_mut_ptr());
        }
    }
}

/// Layout-compatible mirror of `zmq_pollitem_t`.
#[repr(C)]
pub(crate) struct RawPollItem {
    socket: *mut c_void,
    #[cfg(unix)]
    fd: c_int,
    #[cfg(windows)]
    fd: usize,
    events: c_short,
    revents: c_short,
}

impl RawPollItem {
    pub(crate) fn revents(&self) -> PollEvents {
        PollEvents::from_bits(self.revents as i16)
    }
}

/// Block up to `timeout` milliseconds until one of the first `count` items
/// is ready.
pub(crate) fn poll(
    items: &mut [RawPollItem],
    count: c_int,
    timeout: c_long,
) -> Result<i32, NativeError> {
    debug_assert!(usize::try_from(count).is_ok_and(|n| n <= items.len()));
    // SAFETY: RawPollItem mirrors zmq_pollitem_t; `count` items are in
    // bounds and every socket pointer is borrowed from a live socket for
    // the duration of the call.
    check(unsafe { zmq_sys::zmq_poll(items.as_mut_ptr().cast(), count, timeout) })
}
