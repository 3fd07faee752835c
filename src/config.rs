//! # Boot-Time Configuration
//!
//! All connection parameters are supplied once at boot and stay immutable for
//! the process lifetime: broker address and credentials, keepalive, network
//! timeout, the Last-Will tuple, WiFi association bounds and the per-device
//! topic sets. Everything borrows `'static`-or-longer string data owned by
//! the firmware image.

use embassy_time::Duration;

use crate::message::QoS;
use crate::presence::OFFLINE_PAYLOAD;

/// Default broker keepalive. Short enough that a broker-side disconnect (and
/// therefore the LWT offline status) is detected within tens of seconds.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(20);

/// Default transport-level network timeout.
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on WiFi association retries.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default interval between telemetry readings.
pub const DEFAULT_TELEMETRY_INTERVAL: Duration = Duration::from_secs(10);

/// What kind of endpoint this firmware drives.
///
/// The kind is reported in the presence payload so observers can tell device
/// classes apart without a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceKind {
    Relay,
    Sensor,
}

impl DeviceKind {
    /// Wire name used in the status payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relay => "relay",
            Self::Sensor => "sensor",
        }
    }
}

/// Broker login credentials.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// The Last-Will tuple registered at connect time.
///
/// The broker publishes this on an ungraceful session drop, which is the only
/// offline signal this core ever produces: the device itself takes no action
/// on its own failure.
#[derive(Debug, Clone, Copy)]
pub struct Will<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

impl<'a> Will<'a> {
    /// The retained offline status will, published to the device status topic.
    pub fn offline(status_topic: &'a str) -> Self {
        Self {
            topic: status_topic,
            payload: OFFLINE_PAYLOAD.as_bytes(),
            qos: QoS::AtLeastOnce,
            retain: true,
        }
    }
}

/// MQTT session parameters handed to the platform client at connect time.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions<'a> {
    /// Broker URI, e.g. `mqtt://192.168.1.10:1883`.
    pub broker: &'a str,
    /// Device name, doubling as the MQTT client identifier.
    pub device_name: &'a str,
    pub credentials: Option<Credentials<'a>>,
    pub keepalive: Duration,
    pub network_timeout: Duration,
    pub will: Will<'a>,
}

impl<'a> SessionOptions<'a> {
    pub fn new(broker: &'a str, device_name: &'a str, will: Will<'a>) -> Self {
        Self {
            broker,
            device_name,
            credentials: None,
            keepalive: DEFAULT_KEEPALIVE,
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
            will,
        }
    }

    pub fn with_credentials(mut self, username: &'a str, password: &'a str) -> Self {
        self.credentials = Some(Credentials { username, password });
        self
    }

    pub fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = timeout;
        self
    }
}

/// WiFi station parameters. The SSID and passphrase are consumed by the
/// platform's association primitive; the retry bound by the supervisor.
#[derive(Debug, Clone, Copy)]
pub struct LinkConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub max_retries: u32,
}

impl<'a> LinkConfig<'a> {
    pub fn new(ssid: &'a str, password: &'a str) -> Self {
        Self {
            ssid,
            password,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Topic set for a relay endpoint.
///
/// ```ignore
/// let topics = RelayTopics {
///     command: "home/boiler/control",
///     ack: "home/boiler/ack",
///     state_request: "home/boiler/state/request",
///     state_response: "home/boiler/state/response",
///     state_sync_ack: "home/boiler/state/sync_ack",
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RelayTopics<'a> {
    /// Subscribed: receives `ON`/`OFF` commands.
    pub command: &'a str,
    /// Published: `ACK` after a command is received.
    pub ack: &'a str,
    /// Published: `REQUEST` once per session connect.
    pub state_request: &'a str,
    /// Subscribed: authoritative `ON`/`OFF` from the remote side.
    pub state_response: &'a str,
    /// Published: `ACK` after the state sync exchange completes.
    pub state_sync_ack: &'a str,
}

/// Topic set for a temperature sensor endpoint.
#[derive(Debug, Clone, Copy)]
pub struct SensorTopics<'a> {
    /// Published: one-decimal Celsius readings.
    pub temperature: &'a str,
}
