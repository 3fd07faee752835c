//! MQTT Session Module
//!
//! Owns the broker session for one endpoint: connect with a Last-Will
//! registration, the fixed post-connect sequence, inbound dispatch and the
//! outbound publish queue.
//!
//! # Overview
//!
//! The pieces compose around two seams:
//!
//! - [`MqttLink`]: the platform's MQTT client primitive, reduced to
//!   connect/publish/subscribe plus an ordered event stream.
//! - [`EndpointModule`]: the device-specific protocol logic (for a relay,
//!   the command protocol; for a sensor, nothing).
//!
//! # Reconnection
//!
//! A broker-side disconnect clears subscriptions and leaves stale state on
//! both sides, so the post-connect sequence (presence announce, subscription
//! replay, module start exchange) runs on *every* `Connected` event, not
//! just the first. The Last-Will registered at connect time covers the
//! offline side without any action from the device.
//!
//! # Publishing Pattern
//!
//! Module callbacks publish inline through a [`MessageSink`] borrowed from
//! the event loop, preserving wire order relative to actuation. Independent
//! tasks queue [`OwnedPublishRequest`]s through a [`PublisherHandle`]; the
//! event loop drains the queue between transport events.

pub(crate) mod event_loop;
pub(crate) mod publisher;
pub(crate) mod registry;
pub(crate) mod traits;

pub use event_loop::{Session, SessionState};
pub use publisher::{
    OwnedPublishRequest, PUBLISH_QUEUE_DEPTH, PublishQueue, PublishRequestReceiver,
    PublishRequestSender, PublisherHandle,
};
pub use registry::{MAX_SUBSCRIPTIONS, TopicRegistry};
pub use traits::{EndpointModule, MessageSink, MqttLink, NoopModule, SessionEvent, TopicCollector};
