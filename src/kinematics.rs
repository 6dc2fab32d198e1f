//! Dead reckoning of the vehicle during coast.

use std::time::Duration;

use nalgebra::Vector3;

/// Kinematic state of the vehicle, in feet and seconds.
///
/// Only exists while the rocket is coasting: it is created zeroed when coast starts
/// and dropped when descent starts.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicState {
    pub acceleration_body: Vector3<f32>,
    pub acceleration_inertial: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub position: Vector3<f32>,
    pub altitude: f32,
    pub last_altitude: f32,
    pub timestamp: Duration,
}

impl KinematicState {
    pub fn new(altitude: f32, timestamp: Duration) -> Self {
        KinematicState {
            acceleration_body: Vector3::zeros(),
            acceleration_inertial: Vector3::zeros(),
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            altitude,
            last_altitude: altitude,
            timestamp,
        }
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.velocity.z
    }

    /// Forward Euler step of velocity then position.
    pub fn integrate_acceleration(&mut self, acceleration_inertial: Vector3<f32>, dt: f32) {
        self.acceleration_inertial = acceleration_inertial;
        self.velocity += acceleration_inertial * dt;
        self.position += self.velocity * dt;
    }

    /// Overwrites the vertical velocity with the rate measured by the altimeter.
    pub fn correct_vertical_velocity(&mut self, altitude: f32, dt: f32) {
        self.velocity.z = (altitude - self.last_altitude) / dt;
    }

    /// Runs one full tick: integrate, correct against the altimeter, and remember the
    /// altitude for the next tick. Ticks with no elapsed time only refresh the altitude.
    pub fn update(
        &mut self,
        acceleration_body: Vector3<f32>,
        acceleration_inertial: Vector3<f32>,
        altitude: f32,
        timestamp: Duration,
    ) {
        let dt = timestamp.saturating_sub(self.timestamp).as_secs_f32();
        self.acceleration_body = acceleration_body;

        if dt > 0.0 {
            self.integrate_acceleration(acceleration_inertial, dt);
            self.correct_vertical_velocity(altitude, dt);
        } else {
            self.acceleration_inertial = acceleration_inertial;
        }

        self.altitude = altitude;
        self.last_altitude = altitude;
        self.timestamp = timestamp;
    }
}
