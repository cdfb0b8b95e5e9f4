//! Interop with the `zmq` crate over tcp.

use std::thread;
use std::time::Duration;
use zmux_core::prelude::*;
use zmux_libzmq::{Context, PollSet, Socket};

fn endpoint() -> String {
    let port = portpicker::pick_unused_port().expect("no free port");
    format!("tcp://127.0.0.1:{port}")
}

#[test]
fn test_zmux_pub_to_zmq_sub() {
    let addr = endpoint();

    let ctx = Context::create(1).unwrap();
    let publisher = Socket::create(&ctx, SocketType::Pub).unwrap();
    publisher.set_option(keys::LINGER, 0).unwrap();
    publisher.bind(&addr).unwrap();

    let zctx = zmq::Context::new();
    let sub = zctx.socket(zmq::SUB).unwrap();
    sub.set_linger(0).unwrap();
    sub.set_rcvtimeo(100).unwrap();
    sub.set_subscribe(b"topic").unwrap();
    sub.connect(&addr).unwrap();

    let mut received = None;
    for _ in 0..50 {
        publisher
            .send_multipart([&b"topic.test"[..], b"Hello PubSub!"], 0)
            .unwrap();
        if let Ok(frames) = sub.recv_multipart(0) {
            received = Some(frames);
            break;
        }
    }

    let frames = received.expect("subscriber never received a message");
    assert_eq!(frames, vec![b"topic.test".to_vec(), b"Hello PubSub!".to_vec()]);
}

#[test]
fn test_zmq_dealer_to_zmux_router() {
    let addr = endpoint();

    let ctx = Context::create(1).unwrap();
    let router = Socket::create(&ctx, SocketType::Router).unwrap();
    router.set_option(keys::LINGER, 0).unwrap();
    router.set_option(keys::RCVTIMEO, 2000).unwrap();
    router.bind(&addr).unwrap();

    let client = thread::spawn({
        let addr = addr.clone();
        move || {
            let zctx = zmq::Context::new();
            let dealer = zctx.socket(zmq::DEALER).unwrap();
            dealer.set_linger(0).unwrap();
            dealer.set_identity(b"client-1").unwrap();
            dealer.set_rcvtimeo(2000).unwrap();
            dealer.connect(&addr).unwrap();
            dealer.send("request", 0).unwrap();
            dealer.recv_bytes(0).unwrap()
        }
    });

    let frames = router.receive_multipart(0).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[0][..], b"client-1");
    assert_eq!(&frames[1][..], b"request");

    router.send_multipart([&frames[0][..], b"reply"], 0).unwrap();
    assert_eq!(client.join().unwrap(), b"reply".to_vec());
}

#[test]
fn test_poll_sees_zmq_push() {
    let addr = endpoint();

    let ctx = Context::create(1).unwrap();
    let pull = Socket::create(&ctx, SocketType::Pull).unwrap();
    pull.set_option(keys::LINGER, 0).unwrap();
    pull.bind(&addr).unwrap();

    let zctx = zmq::Context::new();
    let push = zctx.socket(zmq::PUSH).unwrap();
    push.set_linger(0).unwrap();
    push.connect(&addr).unwrap();
    push.send("job", 0).unwrap();

    let mut set = PollSet::new();
    set.add("pull".to_string(), &pull, PollEvents::POLLIN);

    let mut readiness = set.poll(100).unwrap();
    for _ in 0..20 {
        if readiness.ready > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(10));
        readiness = set.poll(100).unwrap();
    }

    assert_eq!(readiness.readable(), &["pull"]);
    assert_eq!(&pull.receive(DONTWAIT).unwrap()[..], b"job");
}
