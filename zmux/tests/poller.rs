//! Object-level poller over tracked sockets.

use std::time::{Duration, Instant};
use zmux::prelude::*;

fn pair(ctx: &Context, endpoint: &str) -> (TrackedSocket, TrackedSocket) {
    let server = TrackedSocket::create(ctx, SocketType::Pair).unwrap();
    server.bind(endpoint).unwrap();
    let client = TrackedSocket::create(ctx, SocketType::Pair).unwrap();
    client.connect(endpoint).unwrap();
    (server, client)
}

#[test]
fn test_empty_poller_returns_immediately() {
    let mut poller = Poller::new();
    let start = Instant::now();
    let ready = poller.poll(5_000).unwrap();
    assert_eq!(ready.count, 0);
    assert!(ready.readable.is_empty());
    assert!(ready.writable.is_empty());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_add_is_idempotent_per_socket() {
    let ctx = Context::create(1).unwrap();
    let socket = TrackedSocket::create(&ctx, SocketType::Pub).unwrap();

    let mut poller = Poller::new();
    let first = poller.add(&socket, PollEvents::POLLIN);
    let second = poller.add(&socket, PollEvents::POLLOUT);
    assert_eq!(first, second);
    assert_eq!(first, PollerId::of(&socket));
    assert_eq!(poller.count(), 1);

    // Still only interested in POLLIN, which a PUB never reports.
    let ready = poller.poll(0).unwrap();
    assert_eq!(ready.count, 0);
    assert!(ready.writable.is_empty());
}

#[test]
fn test_readd_keeps_mask_and_order() {
    let ctx = Context::create(1).unwrap();
    let a = TrackedSocket::create(&ctx, SocketType::Pub).unwrap();
    let b = TrackedSocket::create(&ctx, SocketType::Pub).unwrap();

    let mut poller = Poller::new();
    poller.add(&a, PollEvents::POLLOUT);
    poller.add(&b, PollEvents::POLLOUT);
    poller.add(&a, PollEvents::POLLIN);
    assert_eq!(poller.count(), 2);

    let ready = poller.poll(0).unwrap();
    assert_eq!(ready.count, 2);
    assert_eq!(ready.writable.len(), 2);
    assert!(std::ptr::eq(ready.writable[0], &a));
    assert!(std::ptr::eq(ready.writable[1], &b));
}

#[test]
fn test_remove_and_clear() {
    let ctx = Context::create(1).unwrap();
    let a = TrackedSocket::create(&ctx, SocketType::Pub).unwrap();
    let b = TrackedSocket::create(&ctx, SocketType::Pub).unwrap();

    let mut poller = Poller::new();
    poller.add(&a, PollEvents::POLLOUT);
    let b_id = poller.add(&b, PollEvents::POLLOUT);
    assert_eq!(poller.count(), 2);

    assert!(poller.remove(&a));
    assert!(!poller.remove(&a));
    assert_eq!(poller.count(), 1);

    poller.clear();
    assert_eq!(poller.count(), 0);
    assert!(!poller.remove_id(b_id));
}

#[test]
fn test_readable_sockets_returned() {
    let ctx = Context::create(1).unwrap();
    let (a_rx, a_tx) = pair(&ctx, "inproc://pa");
    let (b_rx, _b_tx) = pair(&ctx, "inproc://pb");

    let mut poller = Poller::new();
    poller.add(&a_rx, PollEvents::POLLIN);
    poller.add(&b_rx, PollEvents::POLLIN);

    a_tx.send(b"ping", 0).unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    let ready = loop {
        let ready = poller.poll(100).unwrap();
        if ready.count > 0 || Instant::now() >= deadline {
            break ready;
        }
    };

    assert_eq!(ready.count, 1);
    assert_eq!(ready.readable.len(), 1);
    assert!(std::ptr::eq(ready.readable[0], &a_rx));
    assert_eq!(&ready.readable[0].receive(0).unwrap()[..], b"ping");
    assert!(poller.last_errors().is_empty());
}
