//! Motion frames and controller identity

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which physical unit produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerId {
    /// The hand-held remote itself
    Primary,
    /// An attachment plugged into the remote (joystick unit)
    Secondary,
}

impl ControllerId {
    /// All controller ids, primary first
    pub const ALL: [ControllerId; 2] = [ControllerId::Primary, ControllerId::Secondary];

    /// Get the name of this controller
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerId::Primary => "primary",
            ControllerId::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller buttons that can report a just-pressed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    A,
    B,
    One,
    Two,
    Plus,
    Minus,
    Home,
    Up,
    Down,
    Left,
    Right,
    C,
    Z,
}

/// One sample of controller motion
///
/// Angles are in degrees. `joystick_magnitude` is normalised to 0..1.
/// `buttons` holds the buttons that went down since the previous poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionFrame {
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub joystick_angle: f64,
    #[serde(default)]
    pub joystick_magnitude: f64,
    #[serde(default)]
    pub buttons: BTreeSet<Button>,
}

impl MotionFrame {
    /// Create a frame at rest
    pub fn new() -> Self {
        Self::default()
    }

    /// Set orientation (builder pattern)
    pub fn with_orientation(mut self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.roll = roll;
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    /// Set roll only
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }

    /// Set pitch only
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    /// Set joystick angle and magnitude
    pub fn with_joystick(mut self, angle: f64, magnitude: f64) -> Self {
        self.joystick_angle = angle;
        self.joystick_magnitude = magnitude;
        self
    }

    /// Mark a button as just pressed
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.insert(button);
        self
    }

    /// Check whether a button went down this frame
    pub fn just_pressed(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    /// Check that every reading is a finite number
    pub fn is_finite(&self) -> bool {
        [
            self.roll,
            self.pitch,
            self.yaw,
            self.joystick_angle,
            self.joystick_magnitude,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A frame together with the controller that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedFrame {
    pub controller: ControllerId,
    #[serde(flatten)]
    pub frame: MotionFrame,
}
