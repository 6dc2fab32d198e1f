use std::io::Write;
use std::time::Duration;

use nalgebra::Vector3;

use crate::apogee::projected_apogee;
use crate::config::FlightConfig;
use crate::kinematics::KinematicState;
use crate::logger::Logger;
use crate::orientation::body_to_inertial;
use crate::pid::Pid;
use crate::sensors::{Clock, FlightSensors, SensorDataPacket, SensorSuite};

/// Phases of the flight, in the only order they can happen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlightPhase {
    Standby,
    Launch,
    Coast,
    Descent,
}

impl FlightPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FlightPhase::Standby => "STANDBY",
            FlightPhase::Launch => "LAUNCH",
            FlightPhase::Coast => "COAST",
            FlightPhase::Descent => "DESCENT",
        }
    }
}

/// Whether startup managed to reach every device. NoGo keeps the rocket dormant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightReadiness {
    Go,
    NoGo,
}

pub enum RocketState {
    Standby(StandbyState),
    Launch(LaunchState),
    Coast(CoastState),
    Descent,
}

/// On the pad, waiting for the altimeter to leave the ground behind.
pub struct StandbyState {
    pub baseline: f32,
    pub threshold: f32,
}

/// Motor burning.
pub struct LaunchState {}

/// Motor out, plates under PID control. Owns the dead reckoning for the coast.
pub struct CoastState {
    pub kinematics: KinematicState,
    pub started_at: Duration,
}

/// Everything computed during one coast tick.
#[derive(Clone, Debug, PartialEq)]
pub struct CoastTelemetry {
    pub elapsed: f32,
    pub acceleration: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub position: Vector3<f32>,
    pub altitude: f32,
    pub plate_angle: f32,
    pub projected_apogee: f32,
}

impl CoastTelemetry {
    /// Row for the data log, in header order.
    pub fn to_row(&self) -> [f32; 12] {
        [
            self.elapsed,
            self.acceleration.x,
            self.acceleration.y,
            self.acceleration.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
            self.position.x,
            self.position.y,
            self.altitude,
            self.plate_angle,
            self.projected_apogee,
        ]
    }
}

impl RocketState {
    pub fn phase(&self) -> FlightPhase {
        match self {
            RocketState::Standby(_) => FlightPhase::Standby,
            RocketState::Launch(_) => FlightPhase::Launch,
            RocketState::Coast(_) => FlightPhase::Coast,
            RocketState::Descent => FlightPhase::Descent,
        }
    }

    pub fn name(&self) -> &'static str {
        self.phase().name()
    }
}

impl StandbyState {
    pub fn new(baseline: f32, config: &FlightConfig) -> Self {
        StandbyState {
            baseline,
            threshold: config.launch_threshold(baseline),
        }
    }

    /// Launch once the altitude has climbed past the baseline and then stays above the
    /// threshold for a whole verification window.
    pub fn should_transition<S, C, W>(
        &self,
        packet: &SensorDataPacket,
        sensors: &mut SensorSuite<S, C>,
        event_log: &mut Logger<W>,
        config: &FlightConfig,
    ) -> Option<RocketState>
    where
        S: FlightSensors,
        C: Clock,
        W: Write,
    {
        if packet.altitude <= self.baseline {
            return None;
        }
        let threshold = self.threshold;
        sensors
            .holds_for(
                config.verification_window,
                config.verification_sample_period,
                event_log,
                |p| p.altitude >= threshold,
            )
            .then_some(RocketState::Launch(LaunchState {}))
    }
}

impl LaunchState {
    /// Burnout shows up as the vertical acceleration flipping sign. Checked on the
    /// current sample only.
    pub fn should_transition(&self, packet: &SensorDataPacket) -> Option<RocketState> {
        let acceleration = body_to_inertial(&packet.orientation, &packet.acceleration_body);
        (acceleration.z < 0.0).then(|| RocketState::Coast(CoastState::new(packet)))
    }
}

impl CoastState {
    pub fn new(packet: &SensorDataPacket) -> Self {
        CoastState {
            kinematics: KinematicState::new(packet.altitude, packet.timestamp),
            started_at: packet.timestamp,
        }
    }

    /// Runs the packet through orientation, integration, projection and the PID.
    pub fn update_internal(&mut self, packet: &SensorDataPacket, pid: &mut Pid) -> CoastTelemetry {
        let dt = packet
            .timestamp
            .saturating_sub(self.kinematics.timestamp)
            .as_secs_f32();
        let acceleration = body_to_inertial(&packet.orientation, &packet.acceleration_body);
        self.kinematics.update(
            packet.acceleration_body,
            acceleration,
            packet.altitude,
            packet.timestamp,
        );

        let projected = projected_apogee(
            acceleration.z,
            self.kinematics.vertical_velocity(),
            packet.altitude,
        );
        let plate_angle = pid.output(projected, dt);

        CoastTelemetry {
            elapsed: packet.timestamp.saturating_sub(self.started_at).as_secs_f32(),
            acceleration,
            velocity: self.kinematics.velocity,
            position: self.kinematics.position,
            altitude: packet.altitude,
            plate_angle,
            projected_apogee: projected,
        }
    }

    /// Apogee once the vehicle is sinking and the altimeter never reports a climb for a
    /// whole verification window. A flat sample does not cancel.
    pub fn should_transition<S, C, W>(
        &self,
        sensors: &mut SensorSuite<S, C>,
        event_log: &mut Logger<W>,
        config: &FlightConfig,
    ) -> Option<RocketState>
    where
        S: FlightSensors,
        C: Clock,
        W: Write,
    {
        if self.kinematics.vertical_velocity() >= 0.0 {
            return None;
        }

        // The first sample only sets the reference for the altimeter rate.
        let mut previous: Option<(f32, Duration)> = None;
        sensors
            .holds_for(
                config.verification_window,
                config.verification_sample_period,
                event_log,
                |p| {
                    let Some((altitude, timestamp)) = previous.replace((p.altitude, p.timestamp))
                    else {
                        return true;
                    };
                    let dt = p.timestamp.saturating_sub(timestamp).as_secs_f32();
                    dt <= 0.0 || (p.altitude - altitude) / dt <= 0.0
                },
            )
            .then_some(RocketState::Descent)
    }
}
