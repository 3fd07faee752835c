//! # Connectivity Core for MQTT-Connected IoT Endpoints
//!
//! `nodelink` is the `no_std` connectivity-and-coordination layer for a single
//! networked endpoint (a relay actuator or a temperature sensor), built upon
//! the [Embassy](https://embassy.dev/) async ecosystem.
//!
//! ## Core Features
//!
//! - **`no_std` & `no_alloc`:** Designed to run on bare-metal microcontrollers
//!   without a standard library or dynamic memory allocation. Buffers are
//!   managed using `heapless`.
//! - **Bounded WiFi supervision:** An event-driven association state machine
//!   with a hard retry bound; the boot sequence blocks on a signal until the
//!   link is up or terminally failed.
//! - **Resilient MQTT sessions:** Last-Will registration at connect time, and
//!   a fixed post-connect sequence (retained presence, subscription replay,
//!   state reconciliation) re-run on every reconnect, because broker-side
//!   session loss clears all of it.
//! - **Relay command protocol:** `ON`/`OFF` token commands acknowledged
//!   before actuation, plus a boot-time state-sync handshake guarded against
//!   late and duplicated responses.
//! - **Best-effort telemetry:** Periodic QoS0 readings queued through a
//!   publish channel, never blocking on the radio.
//! - **Capability seams everywhere:** The WiFi primitive, the MQTT client,
//!   the actuator, the sensor and the address source are all traits; the
//!   platform supplies adapters, tests supply scripts.
//!
//! ## Architecture
//!
//! Data flows one way: the link supervisor brings WiFi up, the session owns
//! the broker connection and dispatches inbound messages to the endpoint
//! module, and the module drives the actuator and answers through the
//! session's sink.
//!
//! ```text
//! radio events ─▶ LinkSupervisor ─▶ LinkStatus (boot blocks here)
//! broker events ─▶ Session ─▶ EndpointModule (RelayController | NoopModule)
//!                    ▲  │            │
//!   PublisherHandle ─┘  └─ PresenceAnnouncer, subscriptions
//! ```
//!
//! ## Wiring
//!
//! The firmware binary owns the platform adapters and the shared context
//! objects, and spawns one task per component:
//!
//! ```ignore
//! static LINK_EVENTS: LinkEventChannel = LinkEventChannel::new();
//! static LINK_STATUS: LinkStatus = LinkStatus::new();
//! static PUBLISH_QUEUE: PublishQueue = PublishQueue::new();
//!
//! // The platform's radio adapter feeds LINK_EVENTS.
//! let mut supervisor = LinkSupervisor::new(
//!     radio,
//!     LINK_EVENTS.receiver(),
//!     &LINK_STATUS,
//!     link_config.max_retries,
//! );
//! spawner.must_spawn(link_task(supervisor));
//! LINK_STATUS.wait_outcome().await?;
//!
//! let relay = RelayController::new(GpioRelay::new(relay_pin, true)?, topics);
//! let announcer = PresenceAnnouncer::new(status_topic, DeviceKind::Relay, stack);
//! let options = SessionOptions::new(broker, "relay", Will::offline(status_topic))
//!     .with_credentials(user, password);
//! let mut session = Session::new(mqtt, relay, announcer, options, PUBLISH_QUEUE.receiver());
//! session.run().await?;
//! ```
//!
//! A sensor endpoint runs the same session with [`session::NoopModule`] and a
//! [`TelemetryReporter`] task publishing through the queue.

#![no_std]

pub(crate) mod fmt;

pub mod config;
pub mod drivers;
pub mod error;
pub mod link;
pub mod message;
pub mod presence;
pub mod relay;
pub mod session;
pub mod telemetry;

// Re-export key types for easier access at the crate root.
pub use config::{DeviceKind, LinkConfig, RelayTopics, SensorTopics, SessionOptions, Will};
pub use link::{LinkStatus, LinkSupervisor};
pub use message::QoS;
pub use presence::PresenceAnnouncer;
pub use relay::RelayController;
pub use session::{PublisherHandle, Session};
pub use telemetry::TelemetryReporter;
