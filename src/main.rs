use std::io::Write;
use std::path::PathBuf;

use airbrake::constants::{DATA_LOG_HEADERS, LAUNCH_THRESHOLD_MARGIN_FEET, TARGET_APOGEE_OFFSET_FEET};
use airbrake::hardware::{self, Avionics, ServoBank};
use airbrake::{
    FlightConfig, FlightError, FlightReadiness, Logger, MonotonicClock, SensorSuite, run_flight,
    scrub_flight,
};
use clap::Parser;

/// Airbrake flight computer
#[derive(Parser, Debug)]
#[command(name = "airbrake")]
#[command(about = "Holds a model rocket to its target apogee with deployable drag plates")]
#[command(version)]
struct Args {
    /// Directory for the event and data logs
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Target apogee above the pad, in feet
    #[arg(long, default_value_t = TARGET_APOGEE_OFFSET_FEET)]
    target_offset_feet: f32,

    /// Climb above the pad that counts as a launch, in feet
    #[arg(long, default_value_t = LAUNCH_THRESHOLD_MARGIN_FEET)]
    launch_margin_feet: f32,

    /// I2C bus shared by the IMU and the servo board
    #[arg(long, default_value = "/dev/i2c-1")]
    i2c_bus: String,
}

/// Logs how connecting to one device went. Any failure makes the flight a no go.
fn connect<T, W: Write>(
    result: Result<T, FlightError>,
    success: &str,
    event_log: &mut Logger<W>,
    readiness: &mut FlightReadiness,
) -> Option<T> {
    match result {
        Ok(device) => {
            event_log.event(success);
            Some(device)
        }
        Err(e) => {
            log::error!("{e}");
            event_log.error(&e.to_string());
            *readiness = FlightReadiness::NoGo;
            None
        }
    }
}

fn main() -> Result<(), FlightError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = FlightConfig {
        target_apogee_offset_feet: args.target_offset_feet,
        launch_margin_feet: args.launch_margin_feet,
        ..FlightConfig::default()
    };

    let mut event_log = Logger::create(&args.log_dir, "LOG", None)?;
    let data_log = Logger::create(&args.log_dir, "DATA", Some(&DATA_LOG_HEADERS[..]))?;
    event_log.event("Initializing connection to sensors");

    let mut readiness = FlightReadiness::Go;
    let imu = connect(
        hardware::open_bus(&args.i2c_bus, "BNO055").and_then(hardware::connect_imu),
        "Connection to BNO055 successful",
        &mut event_log,
        &mut readiness,
    );
    let altimeter = connect(
        hardware::connect_altimeter(),
        "Connection to BMP280 successful",
        &mut event_log,
        &mut readiness,
    );
    let servos = connect(
        hardware::open_bus(&args.i2c_bus, "PCA9685").and_then(ServoBank::new),
        "Connection to servos successful",
        &mut event_log,
        &mut readiness,
    );

    match (altimeter, imu, servos) {
        (Some(altimeter), Some(imu), Some(servos)) => {
            let sensors = SensorSuite::new(Avionics::new(altimeter, imu), MonotonicClock::new());
            if let Some(flight) = run_flight(readiness, config, sensors, servos, event_log, data_log) {
                log::info!("Flight ended in {}", flight.state.name());
            }
        }
        _ => scrub_flight(event_log, data_log),
    }
    Ok(())
}
