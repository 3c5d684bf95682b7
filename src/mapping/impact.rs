//! Impact detection from a swung controller
//!
//! Tracks the first difference of an orientation signal and fires when it
//! drops sharply below the previous difference: the controller was moving
//! and suddenly decelerated, like a drumstick meeting a skin.

/// A detected strike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// MIDI velocity 0..=127
    pub force: u8,
    /// Sample that was current when the deceleration began
    pub peak: f64,
}

/// Two-sample derivative impact detector (stateful)
///
/// Idle until the first sample arrives, armed from then on. Only
/// [`ImpactDetector::reset`] returns it to idle.
#[derive(Debug, Clone)]
pub struct ImpactDetector {
    hit_limit: f64,
    hit_scale: f64,
    start: Option<f64>,
    last: Option<f64>,
    last_velocity: f64,
}

impl ImpactDetector {
    /// Create a detector
    ///
    /// `hit_limit` is how far the velocity must drop below the previous one
    /// to count as an impact. `hit_scale` turns the peak sample into a force.
    pub fn new(hit_limit: f64, hit_scale: f64) -> Self {
        Self {
            hit_limit,
            hit_scale,
            start: None,
            last: None,
            last_velocity: 0.0,
        }
    }

    /// Feed one sample, returning a hit if this sample completes an impact
    pub fn process(&mut self, sample: f64) -> Option<Hit> {
        let Some(last) = self.last else {
            self.start = Some(sample);
            self.last = Some(sample);
            return None;
        };

        let velocity = sample - last;
        let hit = if velocity + self.hit_limit < self.last_velocity {
            Some(Hit {
                force: self.force_for(last),
                peak: last,
            })
        } else {
            None
        };

        self.last = Some(sample);
        self.last_velocity = velocity;
        hit
    }

    /// Velocity for a peak sample, truncated and clamped to 0..=127
    pub fn force_for(&self, peak: f64) -> u8 {
        (peak * self.hit_scale).clamp(0.0, 127.0) as u8
    }

    /// Whether at least one sample has been recorded
    pub fn is_armed(&self) -> bool {
        self.last.is_some()
    }

    /// First sample seen since the last reset
    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn last_velocity(&self) -> f64 {
        self.last_velocity
    }

    /// Reset state
    pub fn reset(&mut self) {
        self.start = None;
        self.last = None;
        self.last_velocity = 0.0;
    }
}

impl Default for ImpactDetector {
    fn default() -> Self {
        Self::new(0.1, 250.0)
    }
}
