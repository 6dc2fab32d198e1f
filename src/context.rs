use std::io::Write;

use crate::config::FlightConfig;
use crate::constants::PLATE_RETRACTED_DEGREES;
use crate::kinematics::KinematicState;
use crate::logger::Logger;
use crate::pid::Pid;
use crate::sensors::{Actuator, Clock, FlightSensors, SensorSuite};
use crate::state::{FlightPhase, FlightReadiness, RocketState, StandbyState};

/// The flight computer: owns the phase, the sensors, the plates, the controller and
/// both logs, and advances them one tick at a time.
pub struct Context<S, A, C, W: Write> {
    pub state: RocketState,
    pub config: FlightConfig,
    pub sensors: SensorSuite<S, C>,
    actuator: A,
    pid: Pid,
    event_log: Logger<W>,
    data_log: Logger<W>,
}

impl<S, A, C, W> Context<S, A, C, W>
where
    S: FlightSensors,
    A: Actuator,
    C: Clock,
    W: Write,
{
    /// Sets up standby around an already measured ground altitude.
    pub fn new(
        config: FlightConfig,
        baseline: f32,
        sensors: SensorSuite<S, C>,
        actuator: A,
        event_log: Logger<W>,
        data_log: Logger<W>,
    ) -> Self {
        let pid = Pid::new(config.gains, config.target_apogee(baseline))
            .with_output_limits(config.min_plate_angle, config.max_plate_angle);
        Context {
            state: RocketState::Standby(StandbyState::new(baseline, &config)),
            config,
            sensors,
            actuator,
            pid,
            event_log,
            data_log,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.state.phase()
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn event_log(&self) -> &Logger<W> {
        &self.event_log
    }

    pub fn data_log(&self) -> &Logger<W> {
        &self.data_log
    }

    /// Dead reckoning state, only while coasting.
    pub fn kinematics(&self) -> Option<&KinematicState> {
        match &self.state {
            RocketState::Coast(coast) => Some(&coast.kinematics),
            _ => None,
        }
    }

    /// One pass of the main loop. Returns the phase we end up in.
    pub fn update(&mut self) -> FlightPhase {
        let packet = self.sensors.get_data_packet(&mut self.event_log);

        let next = match &mut self.state {
            RocketState::Standby(standby) => standby.should_transition(
                &packet,
                &mut self.sensors,
                &mut self.event_log,
                &self.config,
            ),
            RocketState::Launch(launch) => launch.should_transition(&packet),
            RocketState::Coast(coast) => {
                let telemetry = coast.update_internal(&packet, &mut self.pid);
                command_plates(&mut self.actuator, &mut self.event_log, telemetry.plate_angle);
                self.data_log.write_row(&telemetry.to_row());
                log::debug!(
                    "alt {:.1} ft, vz {:.1} ft/s, az {:.1} ft/s^2, projected {:.1} ft, plates {:.1} deg",
                    telemetry.altitude,
                    telemetry.velocity.z,
                    telemetry.acceleration.z,
                    telemetry.projected_apogee,
                    telemetry.plate_angle
                );
                coast.should_transition(&mut self.sensors, &mut self.event_log, &self.config)
            }
            RocketState::Descent => None,
        };

        if let Some(new_state) = next {
            self.transition(new_state);
        }

        if self.phase() != FlightPhase::Descent {
            self.sensors.sleep(self.config.tick_period);
        }
        self.phase()
    }

    /// Runs the loop until the rocket reaches descent.
    pub fn run(&mut self) {
        while self.update() != FlightPhase::Descent {}
    }

    fn transition(&mut self, new_state: RocketState) {
        log::info!("{} -> {}", self.state.name(), new_state.name());
        self.state = new_state;
        match self.phase() {
            FlightPhase::Standby => {}
            FlightPhase::Launch => self.event_log.event("Switching to LAUNCH mode"),
            FlightPhase::Coast => self.event_log.event("Entering drag mode (COAST)"),
            FlightPhase::Descent => self.descend(),
        }
    }

    /// Pulls the plates in and closes everything down.
    fn descend(&mut self) {
        let apogee = self.sensors.latest().altitude;
        self.event_log.event(&format!("Reached apogee: {apogee:.0} feet"));
        self.event_log.event("Switching to DESCENT mode");

        self.event_log.event("Closing data log");
        self.data_log.close();

        command_plates(&mut self.actuator, &mut self.event_log, PLATE_RETRACTED_DEGREES);
        self.event_log.event("Retracting plates");
        self.sensors.sleep(self.config.retract_settle_time);

        self.event_log.event("Flight complete, exiting program");
        self.event_log.close();
    }
}

fn command_plates<A: Actuator, W: Write>(actuator: &mut A, event_log: &mut Logger<W>, degrees: f32) {
    if let Err(e) = actuator.set_angle(degrees) {
        log::warn!("{e}");
        event_log.error(&e.to_string());
    }
}

/// Starts the flight if startup went well: calibrates the ground altitude, then runs
/// the loop to descent. A NoGo closes the logs and leaves the rocket dormant.
///
/// Returns the flight computer after descent so its state can still be inspected.
pub fn run_flight<S, A, C, W>(
    readiness: FlightReadiness,
    config: FlightConfig,
    mut sensors: SensorSuite<S, C>,
    actuator: A,
    mut event_log: Logger<W>,
    data_log: Logger<W>,
) -> Option<Context<S, A, C, W>>
where
    S: FlightSensors,
    A: Actuator,
    C: Clock,
    W: Write,
{
    if readiness == FlightReadiness::NoGo {
        scrub_flight(event_log, data_log);
        return None;
    }

    event_log.event("Reading current altitude");
    let baseline = sensors.ground_altitude(
        config.baseline_window,
        config.baseline_sample_period,
        &mut event_log,
    );
    let target = config.target_apogee(baseline);
    event_log.event(&format!(
        "Altitude initialized to {baseline:.1}, setting target to {target:.1}"
    ));
    event_log.event("Standing by for launch...");

    let mut context = Context::new(config, baseline, sensors, actuator, event_log, data_log);
    log::info!("Controller armed:\n{}", context.pid());
    context.run();
    Some(context)
}

/// Gives up before launch: records the no-go and closes both logs.
pub fn scrub_flight<W: Write>(mut event_log: Logger<W>, mut data_log: Logger<W>) {
    log::error!("Flight is a no go");
    event_log.event("Errors occurred, flight is a no go, closing files and exiting");
    event_log.close();
    data_log.close();
}
