//! Channel-based publish requests.
//!
//! Tasks that are not the session event loop (the telemetry reporter, or
//! anything else the firmware runs) publish by queueing owned requests on a
//! channel. The session drains the channel between transport events and
//! performs the actual publish, so the link stays single-owner and no task
//! ever blocks on the radio.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use heapless::{String, Vec};

use crate::message::{MAX_PAYLOAD_LEN, MAX_TOPIC_LEN, QoS};

/// Depth of the publish request queue.
pub const PUBLISH_QUEUE_DEPTH: usize = 8;

pub type PublishQueue = Channel<CriticalSectionRawMutex, OwnedPublishRequest, PUBLISH_QUEUE_DEPTH>;

pub type PublishRequestSender<'a> =
    Sender<'a, CriticalSectionRawMutex, OwnedPublishRequest, PUBLISH_QUEUE_DEPTH>;

pub type PublishRequestReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, OwnedPublishRequest, PUBLISH_QUEUE_DEPTH>;

/// A publish request with inline storage for topic and payload, so the
/// original buffers do not need to outlive the request.
#[derive(Debug, Clone)]
pub struct OwnedPublishRequest {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    pub qos: QoS,
    pub retain: bool,
}

impl OwnedPublishRequest {
    /// Copies topic and payload into an owned request.
    ///
    /// Returns `None` if either exceeds the inline capacity.
    pub fn new(topic: &str, payload: &[u8], qos: QoS, retain: bool) -> Option<Self> {
        let mut owned_topic = String::new();
        owned_topic.push_str(topic).ok()?;
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self {
            topic: owned_topic,
            payload,
            qos,
            retain,
        })
    }
}

/// Cloneable handle for queueing publishes without access to the link.
#[derive(Clone, Copy)]
pub struct PublisherHandle<'a> {
    tx: PublishRequestSender<'a>,
}

impl<'a> PublisherHandle<'a> {
    pub fn new(tx: PublishRequestSender<'a>) -> Self {
        Self { tx }
    }

    /// Queue a publish, waiting for queue space if necessary.
    ///
    /// Returns `false` if topic or payload exceed the inline capacity, in
    /// which case nothing is queued.
    pub async fn publish(&self, topic: &str, payload: &[u8], qos: QoS, retain: bool) -> bool {
        match OwnedPublishRequest::new(topic, payload, qos, retain) {
            Some(req) => {
                self.tx.send(req).await;
                true
            }
            None => false,
        }
    }

    /// Queue a publish without waiting. Returns `false` if the queue is full
    /// or the data does not fit.
    pub fn try_publish(&self, topic: &str, payload: &[u8], qos: QoS, retain: bool) -> bool {
        match OwnedPublishRequest::new(topic, payload, qos, retain) {
            Some(req) => self.tx.try_send(req).is_ok(),
            None => false,
        }
    }
}
