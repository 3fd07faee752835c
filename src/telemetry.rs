//! # Periodic Telemetry Reporter
//!
//! Samples the sensor on a fixed cadence and queues one-decimal Celsius
//! readings for the session to publish. Telemetry is best-effort: readings go
//! out at QoS0 and a failed sample or a full queue costs nothing but a log
//! line and one missed interval.

use core::fmt::Write;

use embassy_time::{Duration, Ticker};
use heapless::String;

use crate::drivers::SensorDriver;
use crate::fmt::{debug, warn};
use crate::message::QoS;
use crate::session::PublisherHandle;

/// Inline capacity for a formatted reading.
const READING_CAP: usize = 16;

/// Publishes sensor readings on a fixed interval.
pub struct TelemetryReporter<'a, S: SensorDriver> {
    sensor: S,
    topic: &'a str,
    interval: Duration,
    publisher: PublisherHandle<'a>,
}

impl<'a, S: SensorDriver> TelemetryReporter<'a, S> {
    pub fn new(
        sensor: S,
        topic: &'a str,
        interval: Duration,
        publisher: PublisherHandle<'a>,
    ) -> Self {
        Self {
            sensor,
            topic,
            interval,
            publisher,
        }
    }

    /// Samples and publishes forever. Run as its own task; the session loop
    /// picks the readings up from the publish queue.
    pub async fn run(&mut self) -> ! {
        let mut ticker = Ticker::every(self.interval);
        loop {
            ticker.next().await;
            self.report_once().await;
        }
    }

    /// One sample/publish cycle.
    pub async fn report_once(&mut self) {
        let sample = match self.sensor.read_sample() {
            Ok(sample) => sample,
            Err(e) => {
                warn!("sensor read failed: {:?}", e);
                return;
            }
        };

        let mut reading: String<READING_CAP> = String::new();
        let _ = write!(reading, "{:.1}", sample.celsius);
        debug!("publishing reading {} to {}", reading.as_str(), self.topic);

        if !self
            .publisher
            .publish(self.topic, reading.as_bytes(), QoS::AtMostOnce, false)
            .await
        {
            warn!("telemetry reading did not fit the publish queue entry");
        }
    }
}
