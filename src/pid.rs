//! Generic PID controller, usable for anything that needs controlling. Takes in gains,
//! a setpoint, and optional output bounds.

use std::fmt;

use crate::config::PidGains;

#[derive(Clone, Debug)]
pub struct Pid {
    pub gains: PidGains,
    setpoint: f32,
    integral: f32,
    previous_error: f32,
    output: f32,
    min_output: Option<f32>,
    max_output: Option<f32>,
}

impl Pid {
    pub fn new(gains: PidGains, setpoint: f32) -> Self {
        Pid {
            gains,
            setpoint,
            integral: 0.0,
            previous_error: 0.0,
            output: 0.0,
            min_output: None,
            max_output: None,
        }
    }

    pub fn with_output_limits(self, min: f32, max: f32) -> Self {
        self.with_min_output(min).with_max_output(max)
    }

    pub fn with_min_output(mut self, min: f32) -> Self {
        self.min_output = Some(min);
        self
    }

    pub fn with_max_output(mut self, max: f32) -> Self {
        self.max_output = Some(max);
        self
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Last value returned by [`Pid::output`].
    pub fn last_output(&self) -> f32 {
        self.output
    }

    /// Advances the controller by `dt` seconds and returns the new output.
    ///
    /// The returned value accumulates the control law across ticks: each call adds
    /// `kp * e + (ki * integral) * (kd * derivative)` to the running output before
    /// clamping. The derivative is the error change halved, independent of `dt`.
    /// A NaN or infinite `input` or `dt` leaves the controller untouched.
    pub fn output(&mut self, input: f32, dt: f32) -> f32 {
        if !input.is_finite() || !dt.is_finite() {
            return self.output;
        }
        let PidGains { kp, ki, kd } = self.gains;

        let error = input - self.setpoint;
        let integral = self.integral + error * dt;
        let derivative = (error - self.previous_error) / 2.0;

        self.output += kp * error + (ki * integral) * (kd * derivative);
        self.previous_error = error;
        self.integral = integral;

        if let Some(max) = self.max_output {
            self.output = self.output.min(max);
        }
        if let Some(min) = self.min_output {
            self.output = self.output.max(min);
        }

        self.output
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.output = 0.0;
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<f32>| b.map_or_else(|| "none".to_string(), |v| v.to_string());
        writeln!(f, "Setpoint:  {}", self.setpoint)?;
        writeln!(f, "Max:       {}", bound(self.max_output))?;
        writeln!(f, "Min:       {}", bound(self.min_output))?;
        writeln!(f, "KP:        {}", self.gains.kp)?;
        writeln!(f, "KI:        {}", self.gains.ki)?;
        write!(f, "KD:        {}", self.gains.kd)
    }
}
