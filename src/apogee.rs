//! Closed form apogee estimate for a coasting rocket under quadratic drag.

use crate::constants::GRAVITY_FEET_PER_SECOND_SQUARED;
use crate::error::FlightError;

/// Projected final altitude in feet, falling back to the current altitude whenever the
/// model has nothing to say (e.g. the motor is still pushing).
pub fn projected_apogee(acceleration: f32, velocity: f32, altitude: f32) -> f32 {
    try_projected_apogee(acceleration, velocity, altitude).unwrap_or_else(|err| {
        log::trace!("{err}, holding projection at {altitude} ft");
        altitude
    })
}

/// `h - v^2 / (2 (a + g)) * ln(-a / g)`, defined only for a decelerating vehicle.
pub fn try_projected_apogee(
    acceleration: f32,
    velocity: f32,
    altitude: f32,
) -> Result<f32, FlightError> {
    let g = GRAVITY_FEET_PER_SECOND_SQUARED;
    if !(acceleration < 0.0) {
        return Err(FlightError::MathDomainError { acceleration });
    }

    let projected =
        altitude - (velocity * velocity / (2.0 * (acceleration + g))) * (-acceleration / g).ln();

    if projected.is_finite() {
        Ok(projected)
    } else {
        Err(FlightError::MathDomainError { acceleration })
    }
}
