//! End-to-end link-layer and ASDU scenarios, plus cross-module
//! invariants, driven directly against `Server::step` and the codec (no
//! real socket).

use iec101_slave::codec::{finalize_checksum, Frame};
use iec101_slave::server::ServerBuilder;
use iec101_slave::types::CaWidth;
use iec101_slave::{Point, PointRegistry};

fn fixed(fcode: u8, address: u8) -> Frame {
    Frame::Fixed {
        control: 0x40 | fcode,
        address,
    }
}

fn encode(frame: &Frame) -> Vec<u8> {
    finalize_checksum(frame.encode(CaWidth::One))
}

#[test]
fn reset_of_link() {
    let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
    let inbound = [0x10, 0x40, 0x01, 0x41, 0x16];
    let (frame, consumed) = Frame::decode(&inbound, CaWidth::One).unwrap();
    assert_eq!(consumed, 5);
    let reply = server.step(frame).unwrap();
    assert_eq!(encode(&reply), vec![0x10, 0x00, 0x01, 0x01, 0x16]);
}

#[test]
fn status_request_in_not_reset() {
    let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
    let inbound = [0x10, 0x49, 0x01, 0x4a, 0x16];
    let (frame, _) = Frame::decode(&inbound, CaWidth::One).unwrap();
    let reply = server.step(frame).unwrap();
    assert_eq!(encode(&reply), vec![0x10, 0x0b, 0x01, 0x0c, 0x16]);
    assert_eq!(
        server.link_state(),
        iec101_slave::server::LinkState::NotReset
    );
}

#[test]
fn class2_poll_empty() {
    let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
    server.step(fixed(0, 1));
    let reply = server.step(fixed(10, 1)).unwrap();
    assert_eq!(encode(&reply), vec![0x10, 0x09, 0x01, 0x0a, 0x16]);
}

#[test]
fn interrogation_then_class2_poll() {
    let registry = PointRegistry::new();
    registry.add(Point::new_single(1, true));

    let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
    server.step(fixed(0, 1));
    server.points = registry.attach_all(server.id);

    let interrogation = iec101_slave::asdu::Asdu::Interrogation {
        common_address: 1,
        qualifier: 20,
    };
    let ack = server
        .step(Frame::Variable {
            control: 0x43, // PRM=1, fcode=3 (user data, confirmed)
            address: 1,
            asdu: interrogation,
        })
        .unwrap();
    assert!(matches!(ack, Frame::Fixed { .. }));

    let reply = server.step(fixed(10, 1)).unwrap();
    match reply {
        Frame::Variable { asdu, .. } => {
            assert_eq!(asdu.encode(CaWidth::One), vec![1, 1, 20, 1, 1, 0, 0, 0x01]);
        }
        other => panic!("expected variable frame, got {other:?}"),
    }
}

#[test]
fn spontaneous_measured_value() {
    let registry = PointRegistry::new();
    let point = registry.add(Point::new_measured(1001, 0.0));

    let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
    server.step(fixed(0, 1));
    registry.register_server(server.id, server.event_queue_handle());
    point.borrow_mut().register(server.id);

    let events = point
        .borrow_mut()
        .set(Some(iec101_slave::PointValue::Float(1.0)), None, None);
    registry.deliver(events);

    let reply = server.step(fixed(11, 1)).unwrap();
    match reply {
        Frame::Variable { asdu, .. } => {
            let bytes = asdu.encode(CaWidth::One);
            assert_eq!(&bytes[0..3], &[13, 1, 3]);
            assert_eq!(&bytes[4..7], &[0xe9, 0x03, 0x00]);
            assert_eq!(&bytes[7..11], &1.0f32.to_le_bytes());
        }
        other => panic!("expected variable frame, got {other:?}"),
    }
}

#[test]
fn grinder_disabled_round_trip_identity() {
    let grinder = iec101_slave::grinder::Grinder::disabled();
    let frame = Frame::Fixed {
        control: 0x00,
        address: 1,
    };
    let bytes = encode(&frame);
    let ground = grinder.apply(bytes.clone());
    assert_eq!(ground, bytes);
    let (decoded, _) = Frame::decode(&ground, CaWidth::One).unwrap();
    assert_eq!(decoded, frame);
}

#[test]
fn class1_class2_exhaustion_then_nack() {
    let registry = PointRegistry::new();
    registry.add(Point::new_single(1, true));
    registry.add(Point::new_single(2, false));

    let mut server = ServerBuilder::new().asdu_addr(1).link_address(1).build();
    server.step(fixed(0, 1));
    server.points = registry.attach_all(server.id);

    server.step(Frame::Variable {
        control: 0x43, // PRM=1, fcode=3 (user data, confirmed)
        address: 1,
        asdu: iec101_slave::asdu::Asdu::Interrogation {
            common_address: 1,
            qualifier: 20,
        },
    });

    for _ in 0..2 {
        let reply = server.step(fixed(11, 1)).unwrap();
        assert!(matches!(reply, Frame::Variable { .. }));
    }

    let reply = server.step(fixed(11, 1)).unwrap();
    assert_eq!(encode(&reply), vec![0x10, 0x09, 0x01, 0x0a, 0x16]);
}

#[test]
fn subscriber_fanout_enqueues_one_event_per_subscriber() {
    let mut point = Point::new_single(1, false);
    let a = iec101_slave::ServerId::new(1);
    let b = iec101_slave::ServerId::new(2);
    point.register(a);
    point.register(b);
    let events = point.set(Some(iec101_slave::PointValue::Bool(true)), None, None);
    assert_eq!(events.len(), 2);
}
