//! Socket options written through the codec read back unchanged.

use bytes::Bytes;
use std::time::Duration;
use zmux_core::prelude::*;
use zmux_libzmq::{Context, Socket};

fn socket(ctx: &Context, socket_type: SocketType) -> Socket {
    Socket::create(ctx, socket_type).unwrap()
}

#[test]
fn test_int32_options_round_trip() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    let cases = [
        keys::SNDHWM,
        keys::RCVHWM,
        keys::LINGER,
        keys::RCVTIMEO,
        keys::SNDTIMEO,
        keys::RECONNECT_IVL,
        keys::RECONNECT_IVL_MAX,
        keys::BACKLOG,
        keys::SNDBUF,
        keys::RCVBUF,
        keys::RECOVERY_IVL,
    ];

    for key in cases {
        for value in [0, i32::MAX] {
            assert_eq!(s.set_option(key, value).unwrap(), 0, "set {key} = {value}");
            assert_eq!(
                s.get_option(key).unwrap(),
                OptionValue::Int32(value),
                "get {key} after setting {value}"
            );
        }
    }
}

#[test]
fn test_int64_and_uint64_options() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    s.set_option(keys::MAXMSGSIZE, i64::MAX).unwrap();
    assert_eq!(s.get_option(keys::MAXMSGSIZE).unwrap(), OptionValue::Int64(i64::MAX));
    s.set_option(keys::MAXMSGSIZE, -1i64).unwrap();
    assert_eq!(s.get_option(keys::MAXMSGSIZE).unwrap(), OptionValue::Int64(-1));

    s.set_option(keys::AFFINITY, u64::MAX).unwrap();
    assert_eq!(s.get_option(keys::AFFINITY).unwrap(), OptionValue::UInt64(u64::MAX));
    s.set_option(keys::AFFINITY, 0u64).unwrap();
    assert_eq!(s.get_option(keys::AFFINITY).unwrap(), OptionValue::UInt64(0));
}

#[test]
fn test_int32_accepts_wider_input() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    s.set_option(keys::SNDHWM, 500i64).unwrap();
    assert_eq!(s.get_option(keys::SNDHWM).unwrap(), OptionValue::Int32(500));

    s.set_option(keys::LINGER, "250").unwrap();
    assert_eq!(s.get_option(keys::LINGER).unwrap(), OptionValue::Int32(250));
}

#[test]
fn test_identity_bytes() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    s.set_option(keys::IDENTITY, &b"worker-\x00\x01"[..]).unwrap();
    let value = s.get_option(keys::IDENTITY).unwrap();
    assert_eq!(value.as_bytes(), Some(&b"worker-\x00\x01"[..]));
}

#[test]
fn test_subscribe_and_unsubscribe() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Sub);

    assert_eq!(s.set_option(keys::SUBSCRIBE, "topic").unwrap(), 0);
    assert_eq!(s.set_option(keys::UNSUBSCRIBE, Bytes::from_static(b"topic")).unwrap(), 0);
}

#[test]
fn test_boolean_options() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    s.set_option(keys::IMMEDIATE, true).unwrap();
    assert_eq!(s.get_option(keys::IMMEDIATE).unwrap(), OptionValue::Int32(1));
    s.set_option(keys::IPV4ONLY, false).unwrap();
    assert_eq!(s.get_option(keys::IPV4ONLY).unwrap(), OptionValue::Int32(0));
}

#[test]
fn test_wrong_socket_type_option_rejected() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    let err = s.set_option(keys::SUBSCRIBE, "topic").unwrap_err();
    assert!(matches!(err, ZmuxError::InvalidOption { option, .. } if option == keys::SUBSCRIBE));
}

#[test]
fn test_apply_socket_options() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Sub);

    let opts = SocketOptions::new()
        .with_recv_timeout(Duration::from_millis(1500))
        .with_linger(Some(Duration::ZERO))
        .with_recv_hwm(42)
        .with_max_msg_size(None)
        .with_identity(Bytes::from_static(b"sub-1"))
        .with_subscription("alerts");
    s.apply_options(&opts).unwrap();

    assert_eq!(s.get_option(keys::RCVTIMEO).unwrap(), OptionValue::Int32(1500));
    assert_eq!(s.get_option(keys::LINGER).unwrap(), OptionValue::Int32(0));
    assert_eq!(s.get_option(keys::RCVHWM).unwrap(), OptionValue::Int32(42));
    assert_eq!(s.get_option(keys::MAXMSGSIZE).unwrap(), OptionValue::Int64(-1));
    assert_eq!(s.get_option(keys::IDENTITY).unwrap().as_bytes(), Some(&b"sub-1"[..]));
}

#[test]
fn test_type_is_read_only() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Push);

    assert_eq!(s.get_option(keys::TYPE).unwrap(), OptionValue::Int32(8));
    assert!(s.set_option(keys::TYPE, 1).is_err());
}

#[test]
fn test_apply_rejects_reserved_identity() {
    let ctx = Context::create(1).unwrap();
    let s = socket(&ctx, SocketType::Dealer);

    let opts = SocketOptions::new().with_identity(Bytes::from_static(b"\x00auto"));
    let err = s.apply_options(&opts).unwrap_err();
    assert!(matches!(err, ZmuxError::InvalidArgument(_)));
}
