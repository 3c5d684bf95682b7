//! Joystick direction to scale-degree quantization

use crate::error::{MappingError, Result};
use std::collections::BTreeMap;

/// Width of one joystick bucket in degrees
pub const BUCKET_DEGREES: i32 = 45;

const BUCKETS: i32 = 360 / BUCKET_DEGREES;

/// Musical scale definition (intervals in semitones from root)
#[derive(Debug, Clone)]
pub struct Scale {
    name: String,
    intervals: Vec<u8>,
}

impl Scale {
    /// Create a new scale
    pub fn new(name: &str, intervals: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            intervals,
        }
    }

    /// Minor pentatonic scale (root, m3, P4, P5, m7)
    pub fn minor_pentatonic() -> Self {
        Self::new("minor_pentatonic", vec![0, 3, 5, 7, 10])
    }

    /// Major pentatonic scale (root, M2, M3, P5, M6)
    pub fn major_pentatonic() -> Self {
        Self::new("major_pentatonic", vec![0, 2, 4, 7, 9])
    }

    /// Natural minor scale
    pub fn minor() -> Self {
        Self::new("minor", vec![0, 2, 3, 5, 7, 8, 10])
    }

    /// Major scale
    pub fn major() -> Self {
        Self::new("major", vec![0, 2, 4, 5, 7, 9, 11])
    }

    /// Dorian mode
    pub fn dorian() -> Self {
        Self::new("dorian", vec![0, 2, 3, 5, 7, 9, 10])
    }

    /// Whole tone scale
    pub fn whole_tone() -> Self {
        Self::new("whole_tone", vec![0, 2, 4, 6, 8, 10])
    }

    /// Get scale by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pentatonic" | "minor_pentatonic" | "minorpentatonic" => Some(Self::minor_pentatonic()),
            "major_pentatonic" | "majorpentatonic" => Some(Self::major_pentatonic()),
            "minor" | "natural_minor" => Some(Self::minor()),
            "major" => Some(Self::major()),
            "dorian" => Some(Self::dorian()),
            "whole_tone" | "wholetone" => Some(Self::whole_tone()),
            _ => None,
        }
    }

    /// Get the name of this scale
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the intervals
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }
}

/// Canonical bucket key for a multiple of 45 degrees, in (-180, 180]
pub fn canonical_bucket(degrees: i32) -> i32 {
    let index = (degrees / BUCKET_DEGREES).rem_euclid(BUCKETS);
    let key = index * BUCKET_DEGREES;
    if key > 180 {
        key - 360
    } else {
        key
    }
}

/// Snap a joystick angle to the nearest bucket key
///
/// The angle is wrapped into 0..360 first, so any finite reading is safe.
pub fn bucket_for_angle(angle: f64) -> i32 {
    let steps = (angle.rem_euclid(360.0) / BUCKET_DEGREES as f64).round() as i32;
    canonical_bucket(steps * BUCKET_DEGREES)
}

/// Sparse map from joystick bucket to semitone offset within an octave
///
/// Buckets without an entry are gaps; looking one up is an error rather
/// than a silent fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleTable {
    offsets: BTreeMap<i32, u8>,
}

impl ScaleTable {
    /// Build a table from `(bucket_degrees, offset)` pairs
    pub fn new(entries: impl IntoIterator<Item = (i32, u8)>) -> Result<Self> {
        let mut offsets = BTreeMap::new();
        for (degrees, offset) in entries {
            if degrees % BUCKET_DEGREES != 0 || !(-180..=180).contains(&degrees) {
                return Err(MappingError::InvalidConfiguration(format!(
                    "scale table key {} is not a multiple of {} in -180..180",
                    degrees, BUCKET_DEGREES
                )));
            }
            if offset > 127 {
                return Err(MappingError::InvalidConfiguration(format!(
                    "scale table offset {} for bucket {} exceeds 127",
                    offset, degrees
                )));
            }
            if offsets.insert(canonical_bucket(degrees), offset).is_some() {
                return Err(MappingError::InvalidConfiguration(format!(
                    "scale table bucket {} listed twice",
                    degrees
                )));
            }
        }
        if offsets.is_empty() {
            return Err(MappingError::InvalidConfiguration(
                "scale table is empty".to_string(),
            ));
        }
        Ok(Self { offsets })
    }

    /// The controller's stock layout: eight compass buckets walked
    /// counter-clockwise from 0 degrees, with the fifth (-135) left unmapped.
    pub fn compass() -> Self {
        let offsets = [(0, 0), (45, 1), (90, 2), (135, 3), (180, 4), (-90, 6), (-45, 7)]
            .into_iter()
            .collect();
        Self { offsets }
    }

    /// Spread a scale's degrees over all eight buckets
    ///
    /// Scales shorter than eight degrees continue into the next octave.
    pub fn from_scale(scale: &Scale) -> Self {
        let intervals = scale.intervals();
        let len = intervals.len().max(1);
        let offsets = (0..BUCKETS as usize)
            .map(|i| {
                let base = intervals.get(i % len).copied().unwrap_or(0);
                let octave = (i / len) as u8;
                (
                    canonical_bucket(i as i32 * BUCKET_DEGREES),
                    base + 12 * octave,
                )
            })
            .collect();
        Self { offsets }
    }

    /// Offset for a canonical bucket key
    pub fn lookup(&self, bucket: i32) -> Option<u8> {
        self.offsets.get(&canonical_bucket(bucket)).copied()
    }

    /// Largest offset in the table
    pub fn max_offset(&self) -> u8 {
        self.offsets.values().copied().max().unwrap_or(0)
    }

    /// Number of mapped buckets
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl Default for ScaleTable {
    fn default() -> Self {
        Self::compass()
    }
}

/// Quantizes joystick angles to MIDI note numbers
#[derive(Debug, Clone, Default)]
pub struct ScaleQuantizer {
    table: ScaleTable,
}

impl ScaleQuantizer {
    /// Create a quantizer over a scale table
    pub fn new(table: ScaleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ScaleTable {
        &self.table
    }

    /// Map a joystick angle in a given octave to a note number
    pub fn quantize(&self, angle: f64, octave: i32) -> Result<u8> {
        let bucket = bucket_for_angle(angle);
        let offset = self
            .table
            .lookup(bucket)
            .ok_or(MappingError::UnmappedAngleBucket { bucket })?;

        let note = octave * 12 + offset as i32;
        if !(0..=127).contains(&note) {
            return Err(MappingError::InvalidConfiguration(format!(
                "octave {} puts note {} outside 0..127",
                octave, note
            )));
        }
        Ok(note as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_from_name() {
        assert!(Scale::from_name("minor_pentatonic").is_some());
        assert!(Scale::from_name("Major").is_some());
        assert!(Scale::from_name("unknown").is_none());
    }

    #[test]
    fn test_canonical_bucket_wraps() {
        assert_eq!(canonical_bucket(0), 0);
        assert_eq!(canonical_bucket(180), 180);
        assert_eq!(canonical_bucket(-180), 180);
        assert_eq!(canonical_bucket(-135), -135);
        assert_eq!(canonical_bucket(225), -135);
        assert_eq!(canonical_bucket(270), -90);
        assert_eq!(canonical_bucket(360), 0);
    }

    #[test]
    fn test_bucket_for_angle_rounds() {
        assert_eq!(bucket_for_angle(0.0), 0);
        assert_eq!(bucket_for_angle(20.0), 0);
        assert_eq!(bucket_for_angle(30.0), 45);
        assert_eq!(bucket_for_angle(-100.0), -90);
        assert_eq!(bucket_for_angle(179.0), 180);
        assert_eq!(bucket_for_angle(-179.0), 180);
        assert_eq!(bucket_for_angle(315.0), -45);
        assert_eq!(bucket_for_angle(-720.0), 0);
    }

    #[test]
    fn test_bucket_for_huge_angles() {
        // 1e12 is 280 past a whole number of turns
        assert_eq!(bucket_for_angle(1e12), -90);
        assert_eq!(bucket_for_angle(-1e12), 90);
        assert_eq!(bucket_for_angle(3600.0 + 90.0), 90);
        assert_eq!(ScaleQuantizer::default().quantize(1e12, 4), Ok(54));
    }

    #[test]
    fn test_compass_table_has_gap() {
        let table = ScaleTable::compass();
        assert_eq!(table.len(), 7);
        assert_eq!(table.lookup(90), Some(2));
        assert_eq!(table.lookup(-45), Some(7));
        assert_eq!(table.lookup(-135), None);
        assert_eq!(table.max_offset(), 7);
    }

    #[test]
    fn test_table_from_major_scale() {
        let table = ScaleTable::from_scale(&Scale::major());
        assert_eq!(table.len(), 8);
        assert_eq!(table.lookup(0), Some(0));
        assert_eq!(table.lookup(45), Some(2));
        assert_eq!(table.lookup(180), Some(7));
        // Eighth bucket is the octave
        assert_eq!(table.lookup(-45), Some(12));
    }

    #[test]
    fn test_table_from_pentatonic_wraps_octave() {
        let table = ScaleTable::from_scale(&Scale::minor_pentatonic());
        assert_eq!(table.lookup(-135), Some(12));
        assert_eq!(table.lookup(-90), Some(15));
        assert_eq!(table.lookup(-45), Some(17));
    }

    #[test]
    fn test_table_rejects_bad_keys() {
        assert!(ScaleTable::new([(30, 1)]).is_err());
        assert!(ScaleTable::new([(0, 1), (360, 2)]).is_err());
        assert!(ScaleTable::new([(180, 1), (-180, 2)]).is_err());
        assert!(ScaleTable::new([(0, 200)]).is_err());
        assert!(ScaleTable::new([]).is_err());
    }

    #[test]
    fn test_quantize_scenario_octave_four() {
        let quantizer = ScaleQuantizer::default();
        assert_eq!(quantizer.quantize(0.0, 4), Ok(48));
        assert_eq!(quantizer.quantize(88.0, 4), Ok(50));
        assert_eq!(quantizer.quantize(-50.0, 5), Ok(67));
    }

    #[test]
    fn test_quantize_deterministic() {
        let quantizer = ScaleQuantizer::default();
        for angle in [-170.0, -95.0, -10.0, 0.0, 44.0, 91.0, 150.0, 180.0] {
            assert_eq!(quantizer.quantize(angle, 3), quantizer.quantize(angle, 3));
        }
    }

    #[test]
    fn test_quantize_unmapped_bucket() {
        let quantizer = ScaleQuantizer::default();
        assert_eq!(
            quantizer.quantize(-130.0, 4),
            Err(MappingError::UnmappedAngleBucket { bucket: -135 })
        );
    }

    #[test]
    fn test_quantize_out_of_midi_range() {
        let quantizer = ScaleQuantizer::default();
        assert!(quantizer.quantize(180.0, 11).is_err());
        assert!(quantizer.quantize(0.0, -1).is_err());
    }
}
