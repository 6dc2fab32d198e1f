//! Fakes for the sensor, actuator and clock ports.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use nalgebra::{Quaternion, Vector3};

use crate::error::{FlightError, Sensor};
use crate::logger::Logger;
use crate::sensors::{Actuator, Clock, FlightSensors};

/// Clock that only moves when something sleeps on it. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&mut self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

/// One scripted sensor channel: values are handed out in order, and the last one is
/// repeated once the script runs dry.
struct Channel<T> {
    queue: VecDeque<T>,
    last: T,
    reads: usize,
    fail_after: Option<usize>,
}

impl<T: Clone> Channel<T> {
    fn new(initial: T) -> Self {
        Channel {
            queue: VecDeque::new(),
            last: initial,
            reads: 0,
            fail_after: None,
        }
    }

    /// Every read from here on fails.
    fn fail_now(&mut self) {
        self.fail_after = Some(self.reads);
    }

    fn next(&mut self, sensor: Sensor) -> Result<T, FlightError> {
        self.reads += 1;
        if self.fail_after.is_some_and(|n| self.reads > n) {
            return Err(FlightError::sensor(sensor, "no response on bus"));
        }
        if let Some(value) = self.queue.pop_front() {
            self.last = value;
        }
        Ok(self.last.clone())
    }
}

struct Channels {
    altitude: Channel<f32>,
    acceleration: Channel<Vector3<f32>>,
    orientation: Channel<Quaternion<f32>>,
}

/// Sensor port driven by scripts. Clones share the same scripts, so a test can keep a
/// handle and feed more readings while the flight computer owns the other one.
#[derive(Clone)]
pub struct ScriptedSensors {
    channels: Rc<RefCell<Channels>>,
}

impl Default for ScriptedSensors {
    fn default() -> Self {
        ScriptedSensors {
            channels: Rc::new(RefCell::new(Channels {
                altitude: Channel::new(0.0),
                acceleration: Channel::new(Vector3::zeros()),
                orientation: Channel::new(Quaternion::identity()),
            })),
        }
    }
}

impl ScriptedSensors {
    pub fn with_altitudes(self, altitudes: &[f32]) -> Self {
        self.push_altitudes(altitudes);
        self
    }

    pub fn fail_altitude_after(self, reads: usize) -> Self {
        self.channels.borrow_mut().altitude.fail_after = Some(reads);
        self
    }

    pub fn push_altitudes(&self, altitudes: &[f32]) {
        self.channels
            .borrow_mut()
            .altitude
            .queue
            .extend(altitudes.iter().copied());
    }

    pub fn push_acceleration(&self, acceleration: Vector3<f32>) {
        self.channels
            .borrow_mut()
            .acceleration
            .queue
            .push_back(acceleration);
    }

    pub fn push_orientation(&self, orientation: Quaternion<f32>) {
        self.channels
            .borrow_mut()
            .orientation
            .queue
            .push_back(orientation);
    }

    pub fn fail_altitude_now(&self) {
        self.channels.borrow_mut().altitude.fail_now();
    }

    pub fn fail_acceleration_now(&self) {
        self.channels.borrow_mut().acceleration.fail_now();
    }

    pub fn fail_orientation_now(&self) {
        self.channels.borrow_mut().orientation.fail_now();
    }

    pub fn altitude_reads(&self) -> usize {
        self.channels.borrow().altitude.reads
    }
}

impl FlightSensors for ScriptedSensors {
    fn read_altitude(&mut self) -> Result<f32, FlightError> {
        self.channels.borrow_mut().altitude.next(Sensor::Altimeter)
    }

    fn read_acceleration_body(&mut self) -> Result<Vector3<f32>, FlightError> {
        self.channels
            .borrow_mut()
            .acceleration
            .next(Sensor::Accelerometer)
    }

    fn read_orientation(&mut self) -> Result<Quaternion<f32>, FlightError> {
        self.channels
            .borrow_mut()
            .orientation
            .next(Sensor::Orientation)
    }
}

/// Sensor port that plays back a vertical flight profile against a [`ManualClock`].
/// Both closures take the clock time in seconds; the vehicle stays upright.
pub struct ProfileSensors {
    clock: ManualClock,
    altitude: Box<dyn Fn(f32) -> f32>,
    vertical_acceleration: Box<dyn Fn(f32) -> f32>,
}

impl ProfileSensors {
    pub fn new(
        clock: ManualClock,
        altitude: impl Fn(f32) -> f32 + 'static,
        vertical_acceleration: impl Fn(f32) -> f32 + 'static,
    ) -> Self {
        ProfileSensors {
            clock,
            altitude: Box::new(altitude),
            vertical_acceleration: Box::new(vertical_acceleration),
        }
    }

    fn seconds(&self) -> f32 {
        self.clock.now().as_secs_f32()
    }
}

impl FlightSensors for ProfileSensors {
    fn read_altitude(&mut self) -> Result<f32, FlightError> {
        Ok((self.altitude)(self.seconds()))
    }

    fn read_acceleration_body(&mut self) -> Result<Vector3<f32>, FlightError> {
        Ok(Vector3::new(0.0, 0.0, (self.vertical_acceleration)(self.seconds())))
    }

    fn read_orientation(&mut self) -> Result<Quaternion<f32>, FlightError> {
        Ok(Quaternion::identity())
    }
}

/// Remembers every angle it was commanded to.
#[derive(Default)]
pub struct RecordingActuator {
    pub angles: Vec<f32>,
    pub failing: bool,
}

impl Actuator for RecordingActuator {
    fn set_angle(&mut self, degrees: f32) -> Result<(), FlightError> {
        if self.failing {
            return Err(FlightError::actuator(degrees, "servo board not responding"));
        }
        self.angles.push(degrees);
        Ok(())
    }
}

pub fn memory_log() -> Logger<Vec<u8>> {
    Logger::new(Vec::new(), None).unwrap()
}

/// In-memory log sink that stays readable after the logger owning it is gone.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.bytes.borrow().clone()).unwrap()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
