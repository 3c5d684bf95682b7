//! Dead-zone filtering for joystick magnitude and roll
//!
//! Small readings near rest are sensor noise. Anything inside the dead zone
//! is reported as `None` so callers never act on it.

/// Pass `magnitude` through only when `|magnitude| > dead_threshold`
pub fn filter_magnitude(magnitude: f64, dead_threshold: f64) -> Option<f64> {
    if magnitude.abs() > dead_threshold {
        Some(magnitude)
    } else {
        None
    }
}

/// Shift roll toward zero by the dead band, or `None` inside it
///
/// The band edge is exclusive: a roll of exactly `dead_bend_threshold`
/// is still at rest.
pub fn filter_roll(roll: f64, dead_bend_threshold: f64) -> Option<f64> {
    if roll > dead_bend_threshold {
        Some(roll - dead_bend_threshold)
    } else if roll < -dead_bend_threshold {
        Some(roll + dead_bend_threshold)
    } else {
        None
    }
}

/// Wrap an angle difference into (-180, 180]
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Dead-zone filter with configured thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConditioner {
    dead_threshold: f64,
    dead_bend_threshold: f64,
}

impl SignalConditioner {
    /// Create a conditioner
    pub fn new(dead_threshold: f64, dead_bend_threshold: f64) -> Self {
        Self {
            dead_threshold,
            dead_bend_threshold,
        }
    }

    pub fn dead_threshold(&self) -> f64 {
        self.dead_threshold
    }

    pub fn dead_bend_threshold(&self) -> f64 {
        self.dead_bend_threshold
    }

    /// Joystick magnitude outside the dead zone
    pub fn magnitude(&self, magnitude: f64) -> Option<f64> {
        filter_magnitude(magnitude, self.dead_threshold)
    }

    /// Roll outside the dead band, shifted toward zero
    pub fn roll(&self, roll: f64) -> Option<f64> {
        filter_roll(roll, self.dead_bend_threshold)
    }
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self::new(0.1, 20.0)
    }
}
