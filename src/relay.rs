//! # Relay Command Protocol
//!
//! Maps inbound (topic, payload) pairs to actuator actions and outbound
//! acknowledgments, and reconciles the relay with the remote state authority
//! once per session connect.
//!
//! The boot-time exchange is deliberately minimal: publish `REQUEST`, flag
//! the pending sync, apply whatever `ON`/`OFF` comes back on the response
//! topic and acknowledge it. There is no timeout; if no response arrives the
//! relay simply keeps running from its power-on default, and the flag
//! guarantees a late or duplicated response can never be applied twice.

use crate::drivers::RelayDriver;
use crate::error::ProtocolViolation;
use crate::fmt::{debug, error, info, warn};
use crate::message::{InboundMessage, QoS, RelayState, TOKEN_ACK, TOKEN_REQUEST};
use crate::session::{EndpointModule, MessageSink, TopicCollector};

pub use crate::config::RelayTopics;

/// The relay endpoint module.
///
/// Holds the actuator driver, a cache of the last state the driver accepted,
/// and the pending-sync flag. The cache only moves on a successful drive, so
/// it always matches the physical output.
pub struct RelayController<'a, D: RelayDriver> {
    driver: D,
    topics: RelayTopics<'a>,
    last_known: RelayState,
    awaiting_state: bool,
}

impl<'a, D: RelayDriver> RelayController<'a, D> {
    pub fn new(driver: D, topics: RelayTopics<'a>) -> Self {
        let last_known = RelayState::from_output(driver.output());
        Self {
            driver,
            topics,
            last_known,
            awaiting_state: false,
        }
    }

    /// Last state the driver accepted; the power-on default until a command
    /// or sync response lands.
    pub fn last_known(&self) -> RelayState {
        self.last_known
    }

    /// True while a boot-sync response is outstanding.
    pub fn awaiting_state_response(&self) -> bool {
        self.awaiting_state
    }

    fn apply(&mut self, target: RelayState) {
        if let Err(e) = self.driver.set_output(target.is_on()) {
            error!("relay drive to {:?} failed: {:?}", target, e);
            return;
        }
        self.last_known = target;
        info!("relay switched {:?}", target);
    }
}

impl<D: RelayDriver> EndpointModule for RelayController<'_, D> {
    fn register(&self, topics: &mut dyn TopicCollector) {
        topics.add(self.topics.command, QoS::AtLeastOnce);
        topics.add(self.topics.state_response, QoS::AtLeastOnce);
    }

    /// Boot-time reconciliation, re-run on every session connect.
    async fn on_session_start(&mut self, sink: &mut impl MessageSink) {
        info!("requesting authoritative relay state");
        if let Err(e) = sink
            .send(self.topics.state_request, TOKEN_REQUEST, QoS::AtLeastOnce, false)
            .await
        {
            warn!("state sync request failed: {:?}", e);
        }
        self.awaiting_state = true;
    }

    /// Ordered matching, first match wins: a message is a sync response or a
    /// command, never both.
    async fn on_message(&mut self, msg: &InboundMessage, sink: &mut impl MessageSink) {
        if msg.topic.as_str() == self.topics.state_response {
            if !self.awaiting_state {
                info!("state response with no sync pending, ignoring");
                return;
            }
            match RelayState::decode(&msg.payload) {
                Some(target) => self.apply(target),
                None => warn!("{:?}", ProtocolViolation::UnknownStateToken),
            }
            self.awaiting_state = false;
            if let Err(e) = sink
                .send(self.topics.state_sync_ack, TOKEN_ACK, QoS::AtLeastOnce, false)
                .await
            {
                warn!("state sync ack failed: {:?}", e);
            }
            return;
        }

        if msg.topic.as_str() == self.topics.command {
            match RelayState::decode(&msg.payload) {
                Some(target) => {
                    // Receipt is acknowledged before actuation is attempted.
                    if let Err(e) = sink
                        .send(self.topics.ack, TOKEN_ACK, QoS::AtLeastOnce, false)
                        .await
                    {
                        warn!("command ack failed: {:?}", e);
                    }
                    self.apply(target);
                }
                None => warn!("{:?}", ProtocolViolation::UnknownCommandToken),
            }
            return;
        }

        debug!("ignoring message on {}", msg.topic.as_str());
    }
}
