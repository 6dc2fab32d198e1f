//! Linux I2C hookup of the flight hardware: a BMP280 altimeter, a BNO055 IMU and a
//! PCA9685 board driving the plate servos.

use std::thread;
use std::time::Duration;

use bmp280::{Bmp280, Bmp280Builder};
use bno055::{BNO055OperationMode, Bno055};
use embedded_hal::i2c::I2c;
use linux_embedded_hal::{Delay, I2cdev};
use nalgebra::{Quaternion, Vector3};

use crate::constants::{METERS_TO_FEET, PLATE_DEPLOYED_DEGREES, PLATE_RETRACTED_DEGREES};
use crate::error::{FlightError, Sensor};
use crate::sensors::{Actuator, FlightSensors};

const BMP280_CONNECT_ATTEMPTS: u32 = 5;

const PCA9685_ADDRESS: u8 = 0x40;
const PCA9685_MODE1: u8 = 0x00;
const PCA9685_PRESCALE: u8 = 0xFE;
const PCA9685_LED0_ON_L: u8 = 0x06;
const PCA9685_MODE1_SLEEP: u8 = 0x10;
const PCA9685_MODE1_AUTO_INCREMENT: u8 = 0x20;
/// 25 MHz / (4096 * 50 Hz) - 1
const PCA9685_PRESCALE_50HZ: u8 = 121;
const PCA9685_CHANNELS: u8 = 16;

const SERVO_PERIOD_MICROS: f32 = 20_000.0;
const SERVO_MIN_PULSE_MICROS: f32 = 750.0;
const SERVO_MAX_PULSE_MICROS: f32 = 2_250.0;

/// Altimeter plus IMU, read once per tick through [`FlightSensors`].
pub struct Avionics {
    bmp280: Bmp280,
    imu: Bno055<I2cdev>,
}

impl Avionics {
    pub fn new(bmp280: Bmp280, imu: Bno055<I2cdev>) -> Self {
        Avionics { bmp280, imu }
    }
}

/// Connects to the BMP280 and zeroes it against the pad pressure. Altitudes come out
/// relative to the pad from then on.
pub fn connect_altimeter() -> Result<Bmp280, FlightError> {
    let mut attempt = 0;
    let mut bmp280 = loop {
        attempt += 1;
        match Bmp280Builder::new().build() {
            Ok(dev) => break dev,
            Err(_) if attempt < BMP280_CONNECT_ATTEMPTS => {
                log::warn!("Waiting for BMP280 sensor to be ready...");
                thread::sleep(Duration::from_secs(1));
            }
            Err(_) => {
                return Err(FlightError::Connection {
                    device: "BMP280",
                    reason: format!("no answer after {attempt} attempts"),
                });
            }
        }
    };
    bmp280.zero().map_err(|e| FlightError::Connection {
        device: "BMP280",
        reason: format!("could not zero pressure: {e:?}"),
    })?;
    log::info!("BMP280 sensor initialized");
    Ok(bmp280)
}

/// Opens an I2C bus device such as `/dev/i2c-1`.
pub fn open_bus(path: &str, device: &'static str) -> Result<I2cdev, FlightError> {
    I2cdev::new(path).map_err(|e| FlightError::Connection {
        device,
        reason: format!("{path}: {e}"),
    })
}

impl FlightSensors for Avionics {
    fn read_altitude(&mut self) -> Result<f32, FlightError> {
        self.bmp280
            .altitude_m()
            .map(|meters| meters * METERS_TO_FEET)
            .map_err(|_| FlightError::sensor(Sensor::Altimeter, "BMP280 read failed"))
    }

    fn read_acceleration_body(&mut self) -> Result<Vector3<f32>, FlightError> {
        self.imu
            .accel_data()
            .map(|a| Vector3::new(a.x, a.y, a.z) * METERS_TO_FEET)
            .map_err(|e| FlightError::sensor(Sensor::Accelerometer, format!("{e:?}")))
    }

    fn read_orientation(&mut self) -> Result<Quaternion<f32>, FlightError> {
        self.imu
            .quaternion()
            .map(|q| Quaternion::new(q.s, q.v.x, q.v.y, q.v.z))
            .map_err(|e| FlightError::sensor(Sensor::Orientation, format!("{e:?}")))
    }
}

/// Brings up the BNO055 in its sensor fusion (NDOF) mode. The Adafruit breakout
/// answers on the alternative address, 0x28.
pub fn connect_imu(i2c: I2cdev) -> Result<Bno055<I2cdev>, FlightError> {
    let connection = |reason: String| FlightError::Connection {
        device: "BNO055",
        reason,
    };
    let mut delay = Delay;
    let mut imu = Bno055::new(i2c).with_alternative_address();
    imu.init(&mut delay)
        .map_err(|e| connection(format!("init failed: {e:?}")))?;
    imu.set_mode(BNO055OperationMode::NDOF, &mut delay)
        .map_err(|e| connection(format!("could not enter NDOF mode: {e:?}")))?;
    log::info!("BNO055 initialized in NDOF mode");
    Ok(imu)
}

/// Every servo on a PCA9685 board, all driven to the same angle.
pub struct ServoBank<I> {
    i2c: I,
}

impl<I: I2c> ServoBank<I> {
    /// Puts the board on a 50 Hz servo frame.
    pub fn new(mut i2c: I) -> Result<Self, FlightError> {
        let setup = [
            [PCA9685_MODE1, PCA9685_MODE1_SLEEP],
            [PCA9685_PRESCALE, PCA9685_PRESCALE_50HZ],
            [PCA9685_MODE1, PCA9685_MODE1_AUTO_INCREMENT],
        ];
        for command in setup {
            i2c.write(PCA9685_ADDRESS, &command)
                .map_err(|e| FlightError::Connection {
                    device: "PCA9685",
                    reason: format!("{e:?}"),
                })?;
        }
        // Oscillator restart.
        thread::sleep(Duration::from_millis(5));
        log::info!("PCA9685 servo board initialized");
        Ok(ServoBank { i2c })
    }
}

/// PCA9685 off-count for a servo angle, clamped to the plate range.
fn pulse_counts(degrees: f32) -> u16 {
    let degrees = degrees.clamp(PLATE_RETRACTED_DEGREES, PLATE_DEPLOYED_DEGREES);
    let span = PLATE_DEPLOYED_DEGREES - PLATE_RETRACTED_DEGREES;
    let micros = SERVO_MIN_PULSE_MICROS
        + (SERVO_MAX_PULSE_MICROS - SERVO_MIN_PULSE_MICROS) * (degrees - PLATE_RETRACTED_DEGREES) / span;
    (micros * 4096.0 / SERVO_PERIOD_MICROS).round() as u16
}

impl<I: I2c> Actuator for ServoBank<I> {
    fn set_angle(&mut self, degrees: f32) -> Result<(), FlightError> {
        let [off_l, off_h] = pulse_counts(degrees).to_le_bytes();
        for channel in 0..PCA9685_CHANNELS {
            let register = PCA9685_LED0_ON_L + 4 * channel;
            self.i2c
                .write(PCA9685_ADDRESS, &[register, 0, 0, off_l, off_h])
                .map_err(|e| FlightError::actuator(degrees, format!("channel {channel}: {e:?}")))?;
        }
        Ok(())
    }
}
