use std::fmt;
use std::io;

use thiserror::Error;

/// Which sensor a failed read came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sensor {
    Altimeter,
    Accelerometer,
    Orientation,
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sensor::Altimeter => "altimeter",
            Sensor::Accelerometer => "accelerometer",
            Sensor::Orientation => "orientation sensor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum FlightError {
    #[error("failed to read {sensor}: {reason}")]
    SensorReadFailure { sensor: Sensor, reason: String },

    #[error("failed to command plates to {degrees} degrees: {reason}")]
    ActuatorCommandFailure { degrees: f32, reason: String },

    /// Never leaves the apogee projector, which falls back to the current altitude.
    #[error("apogee projection undefined for acceleration {acceleration} ft/s^2")]
    MathDomainError { acceleration: f32 },

    #[error("failed to connect to {device}: {reason}")]
    Connection { device: &'static str, reason: String },

    #[error("log file error: {0}")]
    Io(#[from] io::Error),
}

impl FlightError {
    pub fn sensor(sensor: Sensor, reason: impl Into<String>) -> Self {
        FlightError::SensorReadFailure {
            sensor,
            reason: reason.into(),
        }
    }

    pub fn actuator(degrees: f32, reason: impl Into<String>) -> Self {
        FlightError::ActuatorCommandFailure {
            degrees,
            reason: reason.into(),
        }
    }
}
