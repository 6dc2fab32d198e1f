//! Tunables for a single flight. Defaults come from [`crate::constants`].

use std::time::Duration;

use crate::constants::{
    BASELINE_CALIBRATION_WINDOW, BASELINE_SAMPLE_PERIOD, LAUNCH_THRESHOLD_MARGIN_FEET,
    PID_DERIVATIVE_GAIN, PID_INTEGRAL_GAIN, PID_PROPORTIONAL_GAIN, PLATE_DEPLOYED_DEGREES,
    PLATE_RETRACTED_DEGREES, RETRACT_SETTLE_TIME, TARGET_APOGEE_OFFSET_FEET, TICK_PERIOD,
    VERIFICATION_SAMPLE_PERIOD, VERIFICATION_WINDOW,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

#[derive(Clone, Debug)]
pub struct FlightConfig {
    pub launch_margin_feet: f32,
    pub target_apogee_offset_feet: f32,
    pub verification_window: Duration,
    pub verification_sample_period: Duration,
    pub baseline_window: Duration,
    pub baseline_sample_period: Duration,
    pub tick_period: Duration,
    pub gains: PidGains,
    pub min_plate_angle: f32,
    pub max_plate_angle: f32,
    pub retract_settle_time: Duration,
}

impl Default for FlightConfig {
    fn default() -> Self {
        FlightConfig {
            launch_margin_feet: LAUNCH_THRESHOLD_MARGIN_FEET,
            target_apogee_offset_feet: TARGET_APOGEE_OFFSET_FEET,
            verification_window: VERIFICATION_WINDOW,
            verification_sample_period: VERIFICATION_SAMPLE_PERIOD,
            baseline_window: BASELINE_CALIBRATION_WINDOW,
            baseline_sample_period: BASELINE_SAMPLE_PERIOD,
            tick_period: TICK_PERIOD,
            gains: PidGains {
                kp: PID_PROPORTIONAL_GAIN,
                ki: PID_INTEGRAL_GAIN,
                kd: PID_DERIVATIVE_GAIN,
            },
            min_plate_angle: PLATE_RETRACTED_DEGREES,
            max_plate_angle: PLATE_DEPLOYED_DEGREES,
            retract_settle_time: RETRACT_SETTLE_TIME,
        }
    }
}

impl FlightConfig {
    /// Altitude the rocket has to hold during the launch verification window.
    pub fn launch_threshold(&self, baseline_feet: f32) -> f32 {
        baseline_feet + self.launch_margin_feet
    }

    /// Absolute altitude the controller steers the apogee towards.
    pub fn target_apogee(&self, baseline_feet: f32) -> f32 {
        baseline_feet + self.target_apogee_offset_feet
    }
}
