//! Ports to the sensors, the plate servos and the clock, plus the sensor suite that
//! keeps the last good reading of every sensor.

use std::fmt;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use fixed_deque::Deque;
use nalgebra::{Quaternion, Vector3};

use crate::constants::BASELINE_ROLLING_WINDOW_SIZE;
use crate::error::{FlightError, Sensor};
use crate::logger::Logger;

/// Raw sensor access. Altitude in feet, acceleration in ft/s^2 in the body frame.
pub trait FlightSensors {
    fn read_altitude(&mut self) -> Result<f32, FlightError>;
    fn read_acceleration_body(&mut self) -> Result<Vector3<f32>, FlightError>;
    /// Attitude quaternion `(a, b, c, d)`, scalar first.
    fn read_orientation(&mut self) -> Result<Quaternion<f32>, FlightError>;
}

/// The drag plate servos. Angles are degrees in `[0, 180]`, 0 being fully retracted.
pub trait Actuator {
    fn set_angle(&mut self, degrees: f32) -> Result<(), FlightError>;
}

pub trait Clock {
    /// Monotonic time since some fixed point.
    fn now(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SensorDataPacket {
    pub timestamp: Duration,
    pub altitude: f32,
    pub acceleration_body: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl SensorDataPacket {
    fn initial() -> Self {
        SensorDataPacket {
            timestamp: Duration::ZERO,
            altitude: 0.0,
            acceleration_body: Vector3::zeros(),
            orientation: Quaternion::identity(),
        }
    }
}

pub struct SensorSuite<S, C> {
    sensors: S,
    clock: C,
    data_packet: SensorDataPacket,
}

impl<S: FlightSensors, C: Clock> SensorSuite<S, C> {
    pub fn new(sensors: S, clock: C) -> Self {
        SensorSuite {
            sensors,
            clock,
            data_packet: SensorDataPacket::initial(),
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn sleep(&mut self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Most recent packet, without touching the sensors.
    pub fn latest(&self) -> &SensorDataPacket {
        &self.data_packet
    }

    /// Reads every sensor and returns a copy of the refreshed packet.
    ///
    /// A sensor that fails to answer, or answers with NaN or infinity, keeps its
    /// previous value and the failure goes to the event log; nothing here stops the
    /// flight loop.
    pub fn get_data_packet<W: Write>(&mut self, event_log: &mut Logger<W>) -> SensorDataPacket {
        match self.sensors.read_altitude().and_then(|v| finite(Sensor::Altimeter, v)) {
            Ok(altitude) => self.data_packet.altitude = altitude,
            Err(e) => report(event_log, &e),
        }
        match self
            .sensors
            .read_acceleration_body()
            .and_then(|v| finite(Sensor::Accelerometer, v))
        {
            Ok(acceleration) => self.data_packet.acceleration_body = acceleration,
            Err(e) => report(event_log, &e),
        }
        match self
            .sensors
            .read_orientation()
            .and_then(|v| finite(Sensor::Orientation, v))
        {
            Ok(orientation) => self.data_packet.orientation = orientation,
            Err(e) => report(event_log, &e),
        }
        // Always the time of the last read attempt.
        self.data_packet.timestamp = self.clock.now();
        self.data_packet.clone()
    }

    /// Keeps sampling for `window` and reports whether `condition` held on every sample.
    /// Gives up at the first sample that breaks it.
    pub fn holds_for<W, F>(
        &mut self,
        window: Duration,
        sample_period: Duration,
        event_log: &mut Logger<W>,
        mut condition: F,
    ) -> bool
    where
        W: Write,
        F: FnMut(&SensorDataPacket) -> bool,
    {
        let start = self.clock.now();
        while self.clock.now().saturating_sub(start) < window {
            let packet = self.get_data_packet(event_log);
            if !condition(&packet) {
                return false;
            }
            self.clock.sleep(sample_period);
        }
        true
    }

    /// Averages the altimeter over `window` to find the altitude of the pad.
    pub fn ground_altitude<W: Write>(
        &mut self,
        window: Duration,
        sample_period: Duration,
        event_log: &mut Logger<W>,
    ) -> f32 {
        let mut samples = Deque::new(BASELINE_ROLLING_WINDOW_SIZE);
        let start = self.clock.now();
        loop {
            let packet = self.get_data_packet(event_log);
            samples.push_back(packet.altitude);
            if self.clock.now().saturating_sub(start) >= window {
                break;
            }
            self.clock.sleep(sample_period);
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }
}

/// Readings that can carry NaN or infinity.
trait Reading: fmt::Debug {
    fn all_finite(&self) -> bool;
}

impl Reading for f32 {
    fn all_finite(&self) -> bool {
        self.is_finite()
    }
}

impl Reading for Vector3<f32> {
    fn all_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}

impl Reading for Quaternion<f32> {
    fn all_finite(&self) -> bool {
        self.coords.iter().all(|v| v.is_finite())
    }
}

fn finite<T: Reading>(sensor: Sensor, reading: T) -> Result<T, FlightError> {
    if reading.all_finite() {
        Ok(reading)
    } else {
        Err(FlightError::sensor(sensor, format!("non-finite reading {reading:?}")))
    }
}

fn report<W: Write>(event_log: &mut Logger<W>, error: &FlightError) {
    log::warn!("{error}, keeping last known value");
    event_log.error(&error.to_string());
}
