//! Roll to pitch-bend shaping

/// Pitch bend wire value for "no bend"
pub const BEND_CENTER: u16 = 8192;

const BEND_MIN: i32 = -8192;
const BEND_MAX: i32 = 8191;

/// Signed bend offset for a dead-zone-filtered roll
///
/// Scales a half turn (180 degrees) to `pitch_modulus` steps, floors,
/// and clamps to the 14-bit signed range.
pub fn bend_offset(signed_roll: f64, pitch_modulus: u16) -> i32 {
    let scaled = (signed_roll * pitch_modulus as f64 / 180.0).floor();
    (scaled as i32).clamp(BEND_MIN, BEND_MAX)
}

/// Maps filtered roll to 14-bit pitch-bend values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchBendShaper {
    pitch_modulus: u16,
}

impl PitchBendShaper {
    /// Create a shaper
    pub fn new(pitch_modulus: u16) -> Self {
        Self { pitch_modulus }
    }

    pub fn pitch_modulus(&self) -> u16 {
        self.pitch_modulus
    }

    /// Wire value (0..=16383, center 8192) for a filtered roll
    pub fn shape(&self, signed_roll: f64) -> u16 {
        (BEND_CENTER as i32 + bend_offset(signed_roll, self.pitch_modulus)) as u16
    }
}

impl Default for PitchBendShaper {
    fn default() -> Self {
        Self::new(2048)
    }
}
