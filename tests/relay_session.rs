//! End-to-end session scenarios against a scripted transport.
//!
//! The scripted link plays back a fixed sequence of session events and
//! records every wire operation the session performs, so each scenario can
//! assert the exact traffic order: connect, presence, subscription replay,
//! state sync and command handling.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_net::Ipv4Address;

use nodelink::config::{DeviceKind, RelayTopics, SessionOptions, Will};
use nodelink::drivers::RelayDriver;
use nodelink::error::SessionError;
use nodelink::message::{InboundMessage, MessageId, QoS};
use nodelink::presence::AddressSource;
use nodelink::relay::RelayController;
use nodelink::session::{
    MqttLink, NoopModule, PublishQueue, PublisherHandle, Session, SessionEvent,
};
use nodelink::PresenceAnnouncer;

const TOPICS: RelayTopics<'static> = RelayTopics {
    command: "home/boiler/control",
    ack: "home/boiler/ack",
    state_request: "home/boiler/state/request",
    state_response: "home/boiler/state/response",
    state_sync_ack: "home/boiler/state/sync_ack",
};

const STATUS_TOPIC: &str = "home/devices/relay/status";

const ONLINE_PAYLOAD: &[u8] =
    br#"{"status":"online","device_type":"relay","ip_address":"192.168.4.2"}"#;

#[derive(Debug, Clone, PartialEq)]
enum WireOp {
    Connect {
        client_id: String,
        will_topic: String,
    },
    Subscribe {
        topic: String,
        qos: QoS,
    },
    Publish {
        topic: String,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    },
}

fn publish(topic: &str, payload: &[u8], qos: QoS, retain: bool) -> WireOp {
    WireOp::Publish {
        topic: topic.into(),
        payload: payload.into(),
        qos,
        retain,
    }
}

fn subscribe(topic: &str) -> WireOp {
    WireOp::Subscribe {
        topic: topic.into(),
        qos: QoS::AtLeastOnce,
    }
}

type WireLog = Rc<RefCell<Vec<WireOp>>>;

struct ScriptedLink {
    script: VecDeque<SessionEvent>,
    wire: WireLog,
    refuse_connect: bool,
    hang_when_drained: bool,
    next_id: MessageId,
}

impl ScriptedLink {
    fn new(script: Vec<SessionEvent>, wire: WireLog) -> Self {
        Self {
            script: script.into(),
            wire,
            refuse_connect: false,
            hang_when_drained: false,
            next_id: 0,
        }
    }
}

impl MqttLink for ScriptedLink {
    type Error = &'static str;

    async fn connect(&mut self, options: &SessionOptions<'_>) -> Result<(), Self::Error> {
        if self.refuse_connect {
            return Err("connection refused");
        }
        self.wire.borrow_mut().push(WireOp::Connect {
            client_id: options.device_name.into(),
            will_topic: options.will.topic.into(),
        });
        Ok(())
    }

    async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<MessageId, Self::Error> {
        self.wire.borrow_mut().push(publish(topic, payload, qos, retain));
        self.next_id += 1;
        Ok(self.next_id)
    }

    async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), Self::Error> {
        self.wire.borrow_mut().push(WireOp::Subscribe {
            topic: topic.into(),
            qos,
        });
        Ok(())
    }

    async fn next_event(&mut self) -> Result<SessionEvent, Self::Error> {
        match self.script.pop_front() {
            Some(event) => Ok(event),
            None if self.hang_when_drained => core::future::pending().await,
            None => Err("transport closed"),
        }
    }
}

#[derive(Clone)]
struct SharedRelay {
    on: Rc<RefCell<bool>>,
}

impl RelayDriver for SharedRelay {
    type Error = core::convert::Infallible;

    fn set_output(&mut self, on: bool) -> Result<(), Self::Error> {
        *self.on.borrow_mut() = on;
        Ok(())
    }

    fn output(&self) -> bool {
        *self.on.borrow()
    }
}

struct FixedAddress;

impl AddressSource for FixedAddress {
    fn local_address(&self) -> Option<Ipv4Address> {
        Some(Ipv4Address::new(192, 168, 4, 2))
    }
}

fn message(topic: &str, payload: &[u8]) -> SessionEvent {
    SessionEvent::Message(InboundMessage::new(topic, payload).unwrap())
}

fn options() -> SessionOptions<'static> {
    SessionOptions::new("mqtt://broker.local:1883", "relay", Will::offline(STATUS_TOPIC))
        .with_credentials("device", "secret")
}

/// The full post-connect wire sequence for a relay endpoint, in order.
fn connect_sequence() -> Vec<WireOp> {
    vec![
        publish(STATUS_TOPIC, ONLINE_PAYLOAD, QoS::AtLeastOnce, true),
        subscribe(TOPICS.command),
        subscribe(TOPICS.state_response),
        publish(TOPICS.state_request, b"REQUEST", QoS::AtLeastOnce, false),
    ]
}

#[test]
fn boot_sync_applies_authoritative_state_once() {
    let wire: WireLog = Rc::default();
    let relay_on = Rc::new(RefCell::new(false));
    let link = ScriptedLink::new(
        vec![
            SessionEvent::Connected,
            message(TOPICS.state_response, b"ON"),
            // Late duplicate: no sync is pending any more, must not apply.
            message(TOPICS.state_response, b"OFF"),
        ],
        wire.clone(),
    );
    let queue = PublishQueue::new();
    let relay = RelayController::new(SharedRelay { on: relay_on.clone() }, TOPICS);
    let announcer = PresenceAnnouncer::new(STATUS_TOPIC, DeviceKind::Relay, FixedAddress);
    let mut session = Session::new(link, relay, announcer, options(), queue.receiver());

    let result = block_on(session.run());

    assert!(matches!(result, Err(SessionError::EventStream(_))));
    assert!(*relay_on.borrow(), "stale OFF must not override the sync");

    let mut expected = vec![WireOp::Connect {
        client_id: "relay".into(),
        will_topic: STATUS_TOPIC.into(),
    }];
    expected.extend(connect_sequence());
    expected.push(publish(TOPICS.state_sync_ack, b"ACK", QoS::AtLeastOnce, false));
    assert_eq!(*wire.borrow(), expected);
}

#[test]
fn reconnect_replays_presence_subscriptions_and_sync() {
    let wire: WireLog = Rc::default();
    let relay_on = Rc::new(RefCell::new(false));
    let link = ScriptedLink::new(
        vec![SessionEvent::Connected, SessionEvent::Connected],
        wire.clone(),
    );
    let queue = PublishQueue::new();
    let relay = RelayController::new(SharedRelay { on: relay_on }, TOPICS);
    let announcer = PresenceAnnouncer::new(STATUS_TOPIC, DeviceKind::Relay, FixedAddress);
    let mut session = Session::new(link, relay, announcer, options(), queue.receiver());

    let result = block_on(session.run());
    assert!(matches!(result, Err(SessionError::EventStream(_))));

    let mut expected = vec![WireOp::Connect {
        client_id: "relay".into(),
        will_topic: STATUS_TOPIC.into(),
    }];
    expected.extend(connect_sequence());
    expected.extend(connect_sequence());
    assert_eq!(*wire.borrow(), expected);
}

#[test]
fn commands_are_acknowledged_in_arrival_order() {
    let wire: WireLog = Rc::default();
    let relay_on = Rc::new(RefCell::new(false));
    let link = ScriptedLink::new(
        vec![
            SessionEvent::Connected,
            message(TOPICS.command, b"OFF"),
            message(TOPICS.command, b"ON"),
        ],
        wire.clone(),
    );
    let queue = PublishQueue::new();
    let relay = RelayController::new(SharedRelay { on: relay_on.clone() }, TOPICS);
    let announcer = PresenceAnnouncer::new(STATUS_TOPIC, DeviceKind::Relay, FixedAddress);
    let mut session = Session::new(link, relay, announcer, options(), queue.receiver());

    let result = block_on(session.run());
    assert!(matches!(result, Err(SessionError::EventStream(_))));
    assert!(*relay_on.borrow(), "final state follows the last command");

    // One acknowledgment per command, in arrival order, after the connect
    // sequence. Actuation itself never appears on the wire.
    let mut expected = vec![WireOp::Connect {
        client_id: "relay".into(),
        will_topic: STATUS_TOPIC.into(),
    }];
    expected.extend(connect_sequence());
    expected.push(publish(TOPICS.ack, b"ACK", QoS::AtLeastOnce, false));
    expected.push(publish(TOPICS.ack, b"ACK", QoS::AtLeastOnce, false));
    assert_eq!(*wire.borrow(), expected);
}

#[test]
fn refused_connect_is_fatal() {
    let wire: WireLog = Rc::default();
    let mut link = ScriptedLink::new(vec![], wire.clone());
    link.refuse_connect = true;
    let queue = PublishQueue::new();
    let relay = RelayController::new(
        SharedRelay {
            on: Rc::new(RefCell::new(false)),
        },
        TOPICS,
    );
    let announcer = PresenceAnnouncer::new(STATUS_TOPIC, DeviceKind::Relay, FixedAddress);
    let mut session = Session::new(link, relay, announcer, options(), queue.receiver());

    let result = block_on(session.run());

    assert!(matches!(result, Err(SessionError::Connect("connection refused"))));
    assert!(wire.borrow().is_empty());
}

#[test]
fn queued_publishes_are_forwarded_while_connected() {
    let wire: WireLog = Rc::default();
    let mut link = ScriptedLink::new(vec![SessionEvent::Connected], wire.clone());
    link.hang_when_drained = true;
    let queue = PublishQueue::new();
    let publisher = PublisherHandle::new(queue.sender());
    let announcer = PresenceAnnouncer::new(
        "home/devices/temp_sensor/status",
        DeviceKind::Sensor,
        FixedAddress,
    );
    let options = SessionOptions::new(
        "mqtt://broker.local:1883",
        "temp_sensor",
        Will::offline("home/devices/temp_sensor/status"),
    );
    let mut session = Session::new(link, NoopModule, announcer, options, queue.receiver());

    block_on(async {
        match select(session.run(), async {
            publisher
                .publish("home/sensor/temperature", b"20.4", QoS::AtMostOnce, false)
                .await;
            // Give the session loop a chance to drain the queue.
            for _ in 0..16 {
                yield_now().await;
            }
        })
        .await
        {
            Either::First(fatal) => panic!("session ended early: {:?}", fatal),
            Either::Second(()) => {}
        }
    });

    let last = wire.borrow().last().cloned().unwrap();
    assert_eq!(
        last,
        publish("home/sensor/temperature", b"20.4", QoS::AtMostOnce, false)
    );
}

#[test]
fn sensor_sessions_announce_without_subscribing() {
    let wire: WireLog = Rc::default();
    let link = ScriptedLink::new(vec![SessionEvent::Connected], wire.clone());
    let queue = PublishQueue::new();
    let announcer = PresenceAnnouncer::new(
        "home/devices/temp_sensor/status",
        DeviceKind::Sensor,
        FixedAddress,
    );
    let options = SessionOptions::new(
        "mqtt://broker.local:1883",
        "temp_sensor",
        Will::offline("home/devices/temp_sensor/status"),
    );
    let mut session = Session::new(link, NoopModule, announcer, options, queue.receiver());

    let result = block_on(session.run());
    assert!(matches!(result, Err(SessionError::EventStream(_))));

    assert_eq!(
        *wire.borrow(),
        vec![
            WireOp::Connect {
                client_id: "temp_sensor".into(),
                will_topic: "home/devices/temp_sensor/status".into(),
            },
            publish(
                "home/devices/temp_sensor/status",
                br#"{"status":"online","device_type":"sensor","ip_address":"192.168.4.2"}"#,
                QoS::AtLeastOnce,
                true
            ),
        ]
    );
}
