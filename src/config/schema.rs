//! Configuration schema definitions

use crate::error::{MappingError, Result};
use crate::mapping::{NoteModifier, Scale, ScaleTable};
use crate::sources::{Button, ControllerId, MotionFrame};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Main configuration for wiimidi
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WiiMidiConfig {
    /// MIDI output settings
    #[serde(default)]
    pub midi: MidiOutputConfig,

    /// Gesture mapping settings shared by all controllers
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Per-controller overrides
    #[serde(default)]
    pub controllers: HashMap<ControllerId, ControllerConfig>,
}

impl WiiMidiConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let m = &self.mapping;

        for (name, value) in [
            ("dead_threshold", m.dead_threshold),
            ("dead_bend_threshold", m.dead_bend_threshold),
            ("hit_limit", m.hit_limit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a finite value >= 0, got {}", name, value)));
            }
        }
        if !m.hit_scale.is_finite() || m.hit_scale <= 0.0 {
            return Err(invalid(format!("hit_scale must be positive, got {}", m.hit_scale)));
        }
        if m.pitch_modulus == 0 || m.pitch_modulus > 8192 {
            return Err(invalid(format!(
                "pitch_modulus must be between 1 and 8192, got {}",
                m.pitch_modulus
            )));
        }

        let table = self.scale_table()?;
        for id in ControllerId::ALL {
            let settings = self.settings_for(id);
            if settings.channel > 15 {
                return Err(invalid(format!(
                    "{}: channel must be between 0 and 15, got {}",
                    id, settings.channel
                )));
            }
            if settings.octave < 0 {
                return Err(invalid(format!(
                    "{}: octave must not be negative, got {}",
                    id, settings.octave
                )));
            }
            let highest = settings.octave * 12 + table.max_offset() as i32;
            if highest > 127 {
                return Err(invalid(format!(
                    "{}: octave {} reaches note {}, above 127",
                    id, settings.octave, highest
                )));
            }
        }

        Ok(())
    }

    /// Build the joystick scale table from `scale` or `scale_table`
    pub fn scale_table(&self) -> Result<ScaleTable> {
        match (&self.mapping.scale, &self.mapping.scale_table) {
            (Some(_), Some(_)) => Err(invalid(
                "scale and scale_table are mutually exclusive".to_string(),
            )),
            (Some(name), None) => Scale::from_name(name)
                .map(|scale| ScaleTable::from_scale(&scale))
                .ok_or_else(|| invalid(format!("unknown scale '{}'", name))),
            (None, Some(entries)) => ScaleTable::new(entries.iter().map(|(&k, &v)| (k, v))),
            (None, None) => Ok(ScaleTable::compass()),
        }
    }

    /// Mapping settings for one controller, overrides applied
    pub fn settings_for(&self, id: ControllerId) -> ControllerSettings {
        let overrides = self.controllers.get(&id);
        ControllerSettings {
            channel: overrides
                .and_then(|o| o.channel)
                .unwrap_or(self.mapping.channel),
            octave: overrides
                .and_then(|o| o.octave)
                .unwrap_or(self.mapping.octave),
            note_modifier: overrides
                .and_then(|o| o.note_modifier)
                .unwrap_or(self.mapping.note_modifier),
        }
    }
}

fn invalid(message: String) -> MappingError {
    MappingError::InvalidConfiguration(message)
}

/// MIDI output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiOutputConfig {
    /// Output port name (substring match, None = first port)
    pub port: Option<String>,

    /// Client name shown to other MIDI software
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

impl Default for MidiOutputConfig {
    fn default() -> Self {
        Self {
            port: None,
            client_name: default_client_name(),
        }
    }
}

fn default_client_name() -> String { "wiimidi".to_string() }

/// Gesture mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// MIDI channel 0-15 (default: 0)
    #[serde(default)]
    pub channel: u8,

    /// Octave of the joystick's root bucket (default: 4)
    #[serde(default = "default_octave")]
    pub octave: i32,

    /// Accidental applied to struck notes (default: none)
    #[serde(default)]
    pub note_modifier: NoteModifier,

    /// Joystick magnitude dead zone (default: 0.1)
    #[serde(default = "default_dead_threshold")]
    pub dead_threshold: f64,

    /// Roll dead band in degrees (default: 20)
    #[serde(default = "default_dead_bend_threshold")]
    pub dead_bend_threshold: f64,

    /// Deceleration needed to register a hit (default: 0.1)
    #[serde(default = "default_hit_limit")]
    pub hit_limit: f64,

    /// Peak sample to velocity factor (default: 250.0)
    #[serde(default = "default_hit_scale")]
    pub hit_scale: f64,

    /// Bend steps per half turn of roll (default: 2048)
    #[serde(default = "default_pitch_modulus")]
    pub pitch_modulus: u16,

    /// Rumble the remote on every hit (default: true)
    #[serde(default = "default_rumble_on_impact")]
    pub rumble_on_impact: bool,

    /// Orientation channel watched for hits (default: pitch)
    #[serde(default)]
    pub hit_axis: HitAxis,

    /// Named scale spread over the joystick buckets
    #[serde(default)]
    pub scale: Option<String>,

    /// Explicit bucket (degrees) -> semitone offset table
    #[serde(default)]
    pub scale_table: Option<BTreeMap<i32, u8>>,

    /// Button that recenters pitch bend at the current roll (default: home)
    #[serde(default = "default_recenter_button")]
    pub recenter_button: Option<Button>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            octave: default_octave(),
            note_modifier: NoteModifier::None,
            dead_threshold: default_dead_threshold(),
            dead_bend_threshold: default_dead_bend_threshold(),
            hit_limit: default_hit_limit(),
            hit_scale: default_hit_scale(),
            pitch_modulus: default_pitch_modulus(),
            rumble_on_impact: default_rumble_on_impact(),
            hit_axis: HitAxis::default(),
            scale: None,
            scale_table: None,
            recenter_button: default_recenter_button(),
        }
    }
}

fn default_octave() -> i32 { 4 }
fn default_dead_threshold() -> f64 { 0.1 }
fn default_dead_bend_threshold() -> f64 { 20.0 }
fn default_hit_limit() -> f64 { 0.1 }
fn default_hit_scale() -> f64 { 250.0 }
fn default_pitch_modulus() -> u16 { 2048 }
fn default_rumble_on_impact() -> bool { true }
fn default_recenter_button() -> Option<Button> { Some(Button::Home) }

/// Orientation channel fed to the impact detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HitAxis {
    #[default]
    Pitch,
    Roll,
    Yaw,
}

impl HitAxis {
    /// Read this axis from a frame
    pub fn sample(self, frame: &MotionFrame) -> f64 {
        match self {
            HitAxis::Pitch => frame.pitch,
            HitAxis::Roll => frame.roll,
            HitAxis::Yaw => frame.yaw,
        }
    }
}

/// Overrides for a single controller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub channel: Option<u8>,
    pub octave: Option<i32>,
    pub note_modifier: Option<NoteModifier>,
}

/// Resolved per-controller settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub channel: u8,
    pub octave: i32,
    pub note_modifier: NoteModifier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping_config() {
        let config: MappingConfig = serde_yaml::from_str("channel: 2").unwrap();
        assert_eq!(config.channel, 2);
        assert_eq!(config.octave, 4); // default
        assert_eq!(config.dead_threshold, 0.1);
        assert_eq!(config.dead_bend_threshold, 20.0);
        assert_eq!(config.hit_limit, 0.1);
        assert_eq!(config.hit_scale, 250.0);
        assert_eq!(config.pitch_modulus, 2048);
        assert!(config.rumble_on_impact);
        assert_eq!(config.hit_axis, HitAxis::Pitch);
        assert_eq!(config.recenter_button, Some(Button::Home));
    }

    #[test]
    fn test_controller_overrides() {
        let yaml = r#"
mapping:
  channel: 1
  octave: 5
  note_modifier: sharp
controllers:
  secondary:
    channel: 9
    note_modifier: flat
"#;
        let config: WiiMidiConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        let primary = config.settings_for(ControllerId::Primary);
        assert_eq!(primary.channel, 1);
        assert_eq!(primary.octave, 5);
        assert_eq!(primary.note_modifier, NoteModifier::Sharp);

        let secondary = config.settings_for(ControllerId::Secondary);
        assert_eq!(secondary.channel, 9);
        assert_eq!(secondary.octave, 5);
        assert_eq!(secondary.note_modifier, NoteModifier::Flat);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(WiiMidiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_channel() {
        let mut config = WiiMidiConfig::default();
        config.mapping.channel = 16;
        assert!(matches!(
            config.validate(),
            Err(MappingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_invalid_octave() {
        let mut config = WiiMidiConfig::default();
        config.mapping.octave = 11; // 132 + offsets
        assert!(config.validate().is_err());

        config.mapping.octave = -1;
        assert!(config.validate().is_err());

        config.mapping.octave = 10; // 120 + 7
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_override_channel() {
        let mut config = WiiMidiConfig::default();
        config.controllers.insert(
            ControllerId::Secondary,
            ControllerConfig {
                channel: Some(20),
                ..Default::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_thresholds() {
        let mut config = WiiMidiConfig::default();
        config.mapping.dead_threshold = -0.5;
        assert!(config.validate().is_err());

        let mut config = WiiMidiConfig::default();
        config.mapping.dead_bend_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = WiiMidiConfig::default();
        config.mapping.hit_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = WiiMidiConfig::default();
        config.mapping.pitch_modulus = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_named_scale_table() {
        let mut config = WiiMidiConfig::default();
        config.mapping.scale = Some("major".to_string());
        let table = config.scale_table().unwrap();
        assert_eq!(table.len(), 8);

        config.mapping.scale = Some("bebop".to_string());
        assert!(config.scale_table().is_err());
    }

    #[test]
    fn test_explicit_scale_table() {
        let yaml = r#"
mapping:
  scale_table:
    0: 0
    90: 4
    -90: 7
"#;
        let config: WiiMidiConfig = serde_yaml::from_str(yaml).unwrap();
        let table = config.scale_table().unwrap();
        assert_eq!(table.lookup(90), Some(4));
        assert_eq!(table.lookup(45), None);
    }

    #[test]
    fn test_scale_and_table_exclusive() {
        let mut config = WiiMidiConfig::default();
        config.mapping.scale = Some("major".to_string());
        config.mapping.scale_table = Some(BTreeMap::from([(0, 0)]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hit_axis_sample() {
        let frame = MotionFrame::new().with_orientation(1.0, 2.0, 3.0);
        assert_eq!(HitAxis::Pitch.sample(&frame), 2.0);
        assert_eq!(HitAxis::Roll.sample(&frame), 1.0);
        assert_eq!(HitAxis::Yaw.sample(&frame), 3.0);
    }
}
