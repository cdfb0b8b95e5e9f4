//! Poll set registration and readiness partitioning.

use std::time::{Duration, Instant};
use zmux_core::prelude::*;
use zmux_libzmq::{Context, PollSet, Socket};

fn pair(ctx: &Context, endpoint: &str) -> (Socket, Socket) {
    let server = Socket::create(ctx, SocketType::Pair).unwrap();
    server.bind(endpoint).unwrap();
    let client = Socket::create(ctx, SocketType::Pair).unwrap();
    client.connect(endpoint).unwrap();
    (server, client)
}

/// Poll until `expected` items report ready or two seconds pass.
fn poll_until<I: Clone>(set: &PollSet<'_, I>, expected: i32) -> Readiness<I> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let readiness = set.poll(100).unwrap();
        if readiness.ready >= expected || Instant::now() >= deadline {
            return readiness;
        }
    }
}

#[test]
fn test_readable_in_registration_order() {
    let ctx = Context::create(1).unwrap();
    let (a_rx, a_tx) = pair(&ctx, "inproc://a");
    let (b_rx, b_tx) = pair(&ctx, "inproc://b");
    let (c_rx, c_tx) = pair(&ctx, "inproc://c");

    let mut set = PollSet::new();
    set.add("a".to_string(), &a_rx, PollEvents::POLLIN);
    set.add("b".to_string(), &b_rx, PollEvents::POLLIN);
    set.add("c".to_string(), &c_rx, PollEvents::POLLIN);

    c_tx.send(b"3", 0).unwrap();
    b_tx.send(b"2", 0).unwrap();
    a_tx.send(b"1", 0).unwrap();

    let readiness = poll_until(&set, 3);
    assert_eq!(readiness.ready, 3);
    assert_eq!(readiness.readable(), &["a", "b", "c"]);
    assert!(readiness.writable().is_empty());
    assert!(readiness.errored().is_empty());
}

#[test]
fn test_only_ready_items_reported() {
    let ctx = Context::create(1).unwrap();
    let (a_rx, _a_tx) = pair(&ctx, "inproc://quiet");
    let (b_rx, b_tx) = pair(&ctx, "inproc://busy");

    let mut set = PollSet::new();
    set.add(10u64, &a_rx, PollEvents::POLLIN);
    set.add(20u64, &b_rx, PollEvents::POLLIN);

    b_tx.send(b"x", 0).unwrap();
    let readiness = poll_until(&set, 1);
    assert_eq!(readiness.ready, 1);
    assert_eq!(readiness.readable(), &[20]);
}

#[test]
fn test_empty_set_zero_timeout() {
    let set: PollSet<'_> = PollSet::new();
    let readiness = set.poll(0).unwrap();
    assert_eq!(readiness.ready, 0);
    assert!(readiness.readable.as_ref().is_some_and(Vec::is_empty));
    assert!(readiness.writable.as_ref().is_some_and(Vec::is_empty));
    assert!(readiness.errored.as_ref().is_some_and(Vec::is_empty));
}

#[test]
fn test_timeout_with_nothing_ready() {
    let ctx = Context::create(1).unwrap();
    let (rx, _tx) = pair(&ctx, "inproc://silent");

    let mut set = PollSet::new();
    set.add("rx".to_string(), &rx, PollEvents::POLLIN);

    let start = Instant::now();
    let readiness = set.poll(50).unwrap();
    assert_eq!(readiness.ready, 0);
    assert!(readiness.readable().is_empty());
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn test_writable_publisher() {
    let ctx = Context::create(1).unwrap();
    let publisher = Socket::create(&ctx, SocketType::Pub).unwrap();
    publisher.bind("inproc://feed").unwrap();

    let mut set = PollSet::new();
    set.add("pub".to_string(), &publisher, PollEvents::POLLIN | PollEvents::POLLOUT);

    let readiness = set.poll(0).unwrap();
    assert_eq!(readiness.ready, 1);
    assert_eq!(readiness.writable(), &["pub"]);
    assert!(readiness.readable().is_empty());
}

#[test]
fn test_item_in_several_sequences() {
    let ctx = Context::create(1).unwrap();
    let (rx, tx) = pair(&ctx, "inproc://both");

    let mut set = PollSet::new();
    set.add("rx".to_string(), &rx, PollEvents::POLLIN | PollEvents::POLLOUT);

    tx.send(b"x", 0).unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut readiness = set.poll(100).unwrap();
    while readiness.readable().is_empty() && Instant::now() < deadline {
        readiness = set.poll(100).unwrap();
    }

    assert_eq!(readiness.ready, 1);
    assert_eq!(readiness.readable(), &["rx"]);
    assert_eq!(readiness.writable(), &["rx"]);
}

#[test]
fn test_wants_limits_categories() {
    let ctx = Context::create(1).unwrap();
    let publisher = Socket::create(&ctx, SocketType::Pub).unwrap();

    let mut set = PollSet::new();
    set.add("pub".to_string(), &publisher, PollEvents::POLLOUT);

    let wants = Wants::none().with_readable(true);
    let readiness = set.poll_with(0, wants).unwrap();
    assert_eq!(readiness.ready, 1);
    assert_eq!(readiness.readable, Some(vec![]));
    assert_eq!(readiness.writable, None);
    assert_eq!(readiness.errored, None);
}

#[test]
fn test_duplicate_ids_reported_twice() {
    let ctx = Context::create(1).unwrap();
    let a = Socket::create(&ctx, SocketType::Pub).unwrap();
    let b = Socket::create(&ctx, SocketType::Pub).unwrap();

    let mut set = PollSet::new();
    set.add("dup".to_string(), &a, PollEvents::POLLOUT);
    set.add("dup".to_string(), &b, PollEvents::POLLOUT);

    let readiness = set.poll(0).unwrap();
    assert_eq!(readiness.ready, 2);
    assert_eq!(readiness.writable(), &["dup", "dup"]);
}

#[test]
fn test_add_remove_clear() {
    let ctx = Context::create(1).unwrap();
    let a = Socket::create(&ctx, SocketType::Pub).unwrap();
    let b = Socket::create(&ctx, SocketType::Pub).unwrap();

    let mut set = PollSet::new();
    assert!(set.is_empty());
    set.add("a".to_string(), &a, PollEvents::POLLOUT);
    set.add("b".to_string(), &b, PollEvents::POLLOUT);
    assert_eq!(set.len(), 2);

    assert!(set.remove("a"));
    let readiness = set.poll(0).unwrap();
    assert_eq!(readiness.writable(), &["b"]);

    assert!(!set.remove("a"));
    assert_eq!(set.len(), 1);

    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.poll(0).unwrap().ready, 0);
}

#[test]
fn test_ids_preserved_in_iteration() {
    let ctx = Context::create(1).unwrap();
    let a = Socket::create(&ctx, SocketType::Sub).unwrap();

    let mut set = PollSet::new();
    set.add(7i32, &a, PollEvents::POLLIN);
    let item = set.iter().next().unwrap();
    assert_eq!(*item.id(), 7);
    assert_eq!(item.events(), PollEvents::POLLIN);
    assert_eq!(item.socket().socket_type(), Some(SocketType::Sub));
}
