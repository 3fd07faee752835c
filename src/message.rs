//! # Message Types and Wire Tokens
//!
//! This module defines the owned message type delivered by the transport and
//! the plain-text token protocol spoken on the command and state topics.
//! Payloads are opaque byte sequences compared by exact match; the only
//! structure they carry is the closed token set below, decoded exactly once
//! at the transport boundary.

use heapless::{String, Vec};

/// Maximum length for a single topic string.
pub const MAX_TOPIC_LEN: usize = 128;

/// Maximum inbound payload size retained by the core.
pub const MAX_PAYLOAD_LEN: usize = 256;

/// Represents the Quality of Service levels used by this core.
///
/// QoS2 (exactly-once) is deliberately absent: status and acknowledgments use
/// at-least-once, telemetry uses at-most-once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
}

/// Identifier assigned by the transport to an outbound publish.
pub type MessageId = u16;

/// Payload token acknowledging receipt of a command or a completed state sync.
pub const TOKEN_ACK: &[u8] = b"ACK";

/// Payload token requesting authoritative relay state from the remote side.
pub const TOKEN_REQUEST: &[u8] = b"REQUEST";

/// An immutable (topic, payload) pair delivered from the transport.
///
/// The message owns its data so handlers can run after the transport's
/// receive buffer has been reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// Copies a topic/payload pair into an owned message.
    ///
    /// Returns `None` if either exceeds the inline capacity; the transport
    /// adapter should drop and log such messages rather than truncate them.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut owned_topic = String::new();
        owned_topic.push_str(topic).ok()?;
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self {
            topic: owned_topic,
            payload,
        })
    }
}

/// Logical state of the relay output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayState {
    On,
    Off,
}

impl RelayState {
    /// Decodes an `ON`/`OFF` token. Any other payload is not a state.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        match payload {
            b"ON" => Some(Self::On),
            b"OFF" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn from_output(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// The wire token for this state.
    pub fn token(self) -> &'static [u8] {
        match self {
            Self::On => b"ON",
            Self::Off => b"OFF",
        }
    }
}
