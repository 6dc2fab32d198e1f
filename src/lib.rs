//! Flight computer for an airbrake equipped model rocket: tracks the flight phase and,
//! while coasting, steers the drag plates so the projected apogee meets the target.

pub mod apogee;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
#[cfg(feature = "hardware")]
pub mod hardware;
pub mod kinematics;
pub mod logger;
pub mod orientation;
pub mod pid;
pub mod sensors;
pub mod state;

#[cfg(test)]
mod test_util;

pub use config::{FlightConfig, PidGains};
pub use context::{Context, run_flight, scrub_flight};
pub use error::{FlightError, Sensor};
pub use logger::Logger;
pub use sensors::{Actuator, Clock, FlightSensors, MonotonicClock, SensorDataPacket, SensorSuite};
pub use state::{FlightPhase, FlightReadiness, RocketState};
