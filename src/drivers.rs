//! # Hardware Collaborator Seams
//!
//! The connectivity core never touches hardware directly. Actuators and
//! sensors sit behind the narrow traits in this module, keeping GPIO and bus
//! details out of the protocol logic and letting tests substitute scripted
//! drivers.
//!
//! Two concrete drivers are provided: a GPIO-backed relay that handles
//! active-low wiring, and a deterministic simulated temperature sensor for
//! bring-up without real hardware.

use embedded_hal::digital::OutputPin;

/// Relay actuator seam.
///
/// `set_output` drives the physical output; on success the driver's cached
/// state follows, on failure it must stay at the pre-call value so callers
/// can report the failure rather than silently assume it worked.
pub trait RelayDriver {
    type Error: core::fmt::Debug;

    fn set_output(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Last successfully driven state.
    fn output(&self) -> bool;
}

/// One temperature reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub celsius: f32,
}

/// Sensor seam. `read_sample` is a blocking call with bounded latency.
pub trait SensorDriver {
    type Error: core::fmt::Debug;

    fn read_sample(&mut self) -> Result<Sample, Self::Error>;
}

/// Relay driver over any [`OutputPin`].
///
/// Handles active-low wiring: with `active_low` set, logical ON drives the
/// pin low. Construction forces the output OFF, which is also the state the
/// protocol assumes after power-on reset.
pub struct GpioRelay<P: OutputPin> {
    pin: P,
    active_low: bool,
    state: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    pub fn new(mut pin: P, active_low: bool) -> Result<Self, P::Error> {
        drive(&mut pin, false, active_low)?;
        Ok(Self {
            pin,
            active_low,
            state: false,
        })
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool, active_low: bool) -> Result<(), P::Error> {
    if on != active_low {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

impl<P: OutputPin> RelayDriver for GpioRelay<P> {
    type Error = P::Error;

    fn set_output(&mut self, on: bool) -> Result<(), Self::Error> {
        drive(&mut self.pin, on, self.active_low)?;
        self.state = on;
        Ok(())
    }

    fn output(&self) -> bool {
        self.state
    }
}

/// Deterministic stand-in for a temperature sensor.
///
/// Ramps between 20.0 °C and 21.0 °C in 0.1 °C steps. Tracks tenths of a
/// degree internally so every step is exact.
pub struct SimulatedSensor {
    tenths: i32,
    rising: bool,
}

impl SimulatedSensor {
    pub const fn new() -> Self {
        Self {
            tenths: 200,
            rising: true,
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorDriver for SimulatedSensor {
    type Error = core::convert::Infallible;

    fn read_sample(&mut self) -> Result<Sample, Self::Error> {
        if self.rising {
            self.tenths += 1;
            if self.tenths >= 210 {
                self.tenths = 210;
                self.rising = false;
            }
        } else {
            self.tenths -= 1;
            if self.tenths <= 200 {
                self.tenths = 200;
                self.rising = true;
            }
        }
        Ok(Sample {
            celsius: self.tenths as f32 / 10.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;

    #[derive(Default)]
    struct FakePin {
        level: Option<bool>,
    }

    impl ErrorType for FakePin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.level = Some(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.level = Some(true);
            Ok(())
        }
    }

    #[test]
    fn active_low_relay_inverts_levels() {
        let mut relay = GpioRelay::new(FakePin::default(), true).unwrap();
        // OFF after init means the pin is held high on active-low wiring.
        assert_eq!(relay.pin.level, Some(true));
        assert!(!relay.output());

        relay.set_output(true).unwrap();
        assert_eq!(relay.pin.level, Some(false));
        assert!(relay.output());

        relay.set_output(false).unwrap();
        assert_eq!(relay.pin.level, Some(true));
        assert!(!relay.output());
    }

    #[test]
    fn active_high_relay_is_direct() {
        let mut relay = GpioRelay::new(FakePin::default(), false).unwrap();
        assert_eq!(relay.pin.level, Some(false));
        relay.set_output(true).unwrap();
        assert_eq!(relay.pin.level, Some(true));
    }

    #[test]
    fn simulated_sensor_ramps_and_reverses() {
        let mut sensor = SimulatedSensor::new();
        let first = sensor.read_sample().unwrap();
        assert_eq!(first.celsius, 20.1);

        // Climb to the top of the ramp.
        let mut last = first;
        for _ in 0..9 {
            last = sensor.read_sample().unwrap();
        }
        assert_eq!(last.celsius, 21.0);

        // Next reading heads back down.
        assert_eq!(sensor.read_sample().unwrap().celsius, 20.9);
    }
}
