//! Session capability and module traits.
//!
//! Two seams meet here. Downward, [`MqttLink`] abstracts the platform's MQTT
//! client primitive (connect, publish, subscribe and an event stream) the
//! same way the transport under a protocol stack is abstracted: the core
//! never sees sockets or packet encodings. Upward, [`EndpointModule`] is the
//! device-specific protocol logic plugged into the session event loop.
//!
//! # Publishing Pattern
//!
//! Module callbacks receive a [`MessageSink`] and publish through it inline.
//! This keeps wire ordering under the module's control, which the command
//! protocol depends on: its acknowledgment must reach the link before the
//! actuator is touched. With Rust 2024's native `async fn` in traits the
//! callbacks stay plain async methods; the trait is monomorphized into the
//! session rather than boxed.

use crate::config::SessionOptions;
use crate::message::{InboundMessage, MessageId, QoS};

/// Session lifecycle events reported by the platform client.
///
/// Events must be delivered in the order the transport observed them; the
/// core introduces no reordering of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The broker accepted the session. Reported on the initial connect and
    /// on every transport-level reconnect.
    Connected,
    /// The session dropped. The platform client is expected to reconnect on
    /// its own and report `Connected` again.
    Disconnected,
    /// An inbound publish on a subscribed topic.
    Message(InboundMessage),
}

/// Capability interface over the platform's MQTT client primitive.
pub trait MqttLink {
    type Error: core::fmt::Debug;

    /// Establish the session, registering the Last-Will tuple from `options`.
    /// A failure here is fatal to the whole connection sequence.
    async fn connect(&mut self, options: &SessionOptions<'_>) -> Result<(), Self::Error>;

    async fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<MessageId, Self::Error>;

    async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), Self::Error>;

    /// Next session event.
    ///
    /// Must be cancel-safe: the session loop races this future against the
    /// outbound publish queue and drops the loser.
    async fn next_event(&mut self) -> Result<SessionEvent, Self::Error>;
}

/// Object-safe collector handed to modules during subscription registration.
pub trait TopicCollector {
    /// Add a topic to subscribe to. The string is copied internally.
    ///
    /// Returns `false` if the collector is full or the topic too long.
    fn add(&mut self, topic: &str, qos: QoS) -> bool;
}

/// Outbound publish seam handed to module callbacks.
///
/// The session's implementation forwards straight to the link, so a
/// completed `send` means the publish was handed to the transport in call
/// order. Tests substitute recording sinks.
pub trait MessageSink {
    type Error: core::fmt::Debug;

    async fn send(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<MessageId, Self::Error>;
}

/// Device-specific protocol logic driven by the session event loop.
///
/// The session calls `register` once at construction, `on_session_start`
/// after every completed (re)connect sequence, and `on_message` for every
/// inbound publish.
pub trait EndpointModule {
    /// Subscriptions this module needs. Re-issued on every connect, because
    /// a broker-side session loss clears them.
    fn register(&self, topics: &mut dyn TopicCollector);

    /// Called after presence has been announced and subscriptions re-issued.
    /// The default implementation does nothing.
    async fn on_session_start(&mut self, sink: &mut impl MessageSink) {
        let _ = sink;
    }

    /// Handle one inbound message. Messages on topics the module did not
    /// register may still arrive (retained leftovers, shared subscriptions)
    /// and must be ignored gracefully.
    async fn on_message(&mut self, msg: &InboundMessage, sink: &mut impl MessageSink);
}

/// A module that registers nothing and ignores everything.
///
/// Sensor-class devices run the session with this; their only traffic is
/// outbound telemetry and presence.
pub struct NoopModule;

impl EndpointModule for NoopModule {
    fn register(&self, _topics: &mut dyn TopicCollector) {}

    async fn on_message(&mut self, _msg: &InboundMessage, _sink: &mut impl MessageSink) {}
}
