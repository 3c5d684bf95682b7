//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::Result;
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<WiiMidiConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: WiiMidiConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ControllerId;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
midi:
  port: "FluidSynth"

mapping:
  octave: 3
  hit_scale: 200.0
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.midi.port.as_deref(), Some("FluidSynth"));
        assert_eq!(config.midi.client_name, "wiimidi");
        assert_eq!(config.mapping.octave, 3);
        assert_eq!(config.mapping.hit_scale, 200.0);
        assert_eq!(config.settings_for(ControllerId::Primary).channel, 0);
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mapping.pitch_modulus, 2048);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"mapping:\n  channel: 42\n").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("channel"));
    }
}
