//! # Presence Announcer
//!
//! Builds and publishes the device status payload. The online half is
//! published retained on every session connect so late subscribers always see
//! current status. The offline half is never published by the device at all:
//! it is the Last-Will payload the broker holds and releases on an ungraceful
//! drop.

use core::fmt::Write;

use embassy_net::Ipv4Address;
use heapless::String;

use crate::config::DeviceKind;
use crate::fmt::warn;
use crate::message::{MessageId, QoS};
use crate::session::MessageSink;

/// Retained Last-Will payload representing the offline state.
pub const OFFLINE_PAYLOAD: &str = "{\"status\":\"offline\"}";

/// Inline capacity for the online status payload. The longest possible
/// rendering (sensor kind, full dotted quad) is well under this.
pub const STATUS_PAYLOAD_CAP: usize = 96;

/// Where the device learns its own network address.
///
/// Resolution failure is expected early in boot; the announcer degrades to a
/// placeholder instead of failing.
pub trait AddressSource {
    fn local_address(&self) -> Option<Ipv4Address>;
}

/// The network stack itself is the usual address source.
impl AddressSource for embassy_net::Stack<'_> {
    fn local_address(&self) -> Option<Ipv4Address> {
        self.config_v4().map(|config| config.address.address())
    }
}

/// Builds and publishes the fixed-shape status payload.
pub struct PresenceAnnouncer<'a, A: AddressSource> {
    topic: &'a str,
    device: DeviceKind,
    addresses: A,
}

impl<'a, A: AddressSource> PresenceAnnouncer<'a, A> {
    pub fn new(topic: &'a str, device: DeviceKind, addresses: A) -> Self {
        Self {
            topic,
            device,
            addresses,
        }
    }

    pub fn topic(&self) -> &'a str {
        self.topic
    }

    /// Renders the online payload with the current address, or the `unknown`
    /// placeholder if resolution fails.
    pub fn online_payload(&self) -> String<STATUS_PAYLOAD_CAP> {
        let mut payload = String::new();
        match self.addresses.local_address() {
            Some(address) => {
                let _ = write!(
                    payload,
                    "{{\"status\":\"online\",\"device_type\":\"{}\",\"ip_address\":\"{}\"}}",
                    self.device.as_str(),
                    address
                );
            }
            None => {
                warn!("no local address, announcing placeholder");
                let _ = write!(
                    payload,
                    "{{\"status\":\"online\",\"device_type\":\"{}\",\"ip_address\":\"unknown\"}}",
                    self.device.as_str()
                );
            }
        }
        payload
    }

    /// Publishes the online status, retained at QoS1.
    pub async fn announce<S: MessageSink>(&self, sink: &mut S) -> Result<MessageId, S::Error> {
        let payload = self.online_payload();
        sink.send(self.topic, payload.as_bytes(), QoS::AtLeastOnce, true)
            .await
    }
}
