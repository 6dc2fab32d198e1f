//! Constants used throughout the program.

use std::time::Duration;

/// Standard gravity in feet per second squared:
pub const GRAVITY_FEET_PER_SECOND_SQUARED: f32 = 32.174;
pub const METERS_TO_FEET: f32 = 3.280_839_9;

/// Altitude gained over the ground baseline before we consider the rocket launched:
pub const LAUNCH_THRESHOLD_MARGIN_FEET: f32 = 100.0;
/// Apogee we are aiming for, measured from the ground baseline:
pub const TARGET_APOGEE_OFFSET_FEET: f32 = 10_000.0;

/// How long a launch or apogee condition has to hold before we believe it:
pub const VERIFICATION_WINDOW: Duration = Duration::from_millis(500);
/// Time between samples inside a verification window.
pub const VERIFICATION_SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// How long the altimeter is averaged on the pad to find the ground altitude:
pub const BASELINE_CALIBRATION_WINDOW: Duration = Duration::from_secs(3);
pub const BASELINE_SAMPLE_PERIOD: Duration = Duration::from_millis(50);
pub const BASELINE_ROLLING_WINDOW_SIZE: usize = 60;

/// Main loop pacing.
pub const TICK_PERIOD: Duration = Duration::from_millis(20);

pub const PID_PROPORTIONAL_GAIN: f32 = 0.1;
pub const PID_INTEGRAL_GAIN: f32 = 0.05;
pub const PID_DERIVATIVE_GAIN: f32 = 0.001;

/// Servo travel in degrees. 0 is fully retracted.
pub const PLATE_RETRACTED_DEGREES: f32 = 0.0;
pub const PLATE_DEPLOYED_DEGREES: f32 = 180.0;
/// Time given to the servos to pull the plates back in after apogee:
pub const RETRACT_SETTLE_TIME: Duration = Duration::from_secs(3);

pub const DATA_LOG_HEADERS: [&str; 12] = [
    "Time (seconds)",
    "Acceleration (x)",
    "Acceleration (y)",
    "Acceleration (z)",
    "Velocity (x)",
    "Velocity (y)",
    "Velocity (z)",
    "Position (x)",
    "Position (y)",
    "Altitude (z)",
    "PID Controller Output",
    "Projected Altitude",
];
