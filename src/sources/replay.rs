//! Replay of recorded controller sessions
//!
//! A recording is a YAML (or JSON) document:
//!
//! ```yaml
//! interval_ms: 10
//! frames:
//!   - controller: secondary
//!     pitch: 0.5
//!     joystick_angle: 90.0
//!     joystick_magnitude: 0.8
//! ```

use super::{FrameSource, TaggedFrame};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A recorded session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Poll interval the frames were captured at (default: 10)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Frames in capture order
    #[serde(default)]
    pub frames: Vec<TaggedFrame>,
}

fn default_interval_ms() -> u64 { 10 }

impl Recording {
    /// Load a recording from a YAML or JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let recording: Recording = serde_yaml::from_str(&contents)?;
        if recording.frames.is_empty() {
            bail!("Recording {:?} has no frames", path);
        }
        Ok(recording)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Source that plays back a recording at its capture rate
pub struct ReplaySource {
    name: String,
    recording: Arc<Recording>,
    looping: bool,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<TaggedFrame>,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a new replay source
    pub fn new(name: impl Into<String>, recording: Recording) -> Self {
        let (sender, _) = broadcast::channel(256);
        Self {
            name: name.into(),
            recording: Arc::new(recording),
            looping: false,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }

    /// Start over from the first frame after the last one
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

impl FrameSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);

        let name = self.name.clone();
        let recording = Arc::clone(&self.recording);
        let looping = self.looping;
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let interval = recording.interval();
            'replay: loop {
                for (index, tagged) in recording.frames.iter().enumerate() {
                    if !running.load(Ordering::SeqCst) {
                        break 'replay;
                    }
                    if !tagged.frame.is_finite() {
                        warn!(source = %name, index, "skipping frame with non-finite readings");
                        continue;
                    }

                    // Send (ignore errors if no receivers)
                    let _ = sender.send(tagged.clone());

                    tokio::time::sleep(interval).await;
                }
                if !looping {
                    break;
                }
                debug!(source = %name, "replay looped");
            }
            running.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<TaggedFrame> {
        self.sender.subscribe()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ControllerId, MotionFrame};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn recording(pitches: &[f64]) -> Recording {
        Recording {
            interval_ms: 1,
            frames: pitches
                .iter()
                .map(|&p| TaggedFrame {
                    controller: ControllerId::Primary,
                    frame: MotionFrame::new().with_pitch(p),
                })
                .collect(),
        }
    }

    #[test]
    fn test_load_recording() {
        let yaml = r#"
interval_ms: 5
frames:
  - controller: primary
    pitch: 0.1
  - controller: secondary
    joystick_angle: 90.0
    joystick_magnitude: 0.8
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let recording = Recording::load(file.path()).unwrap();
        assert_eq!(recording.interval(), Duration::from_millis(5));
        assert_eq!(recording.frames.len(), 2);
        assert_eq!(recording.frames[1].controller, ControllerId::Secondary);
        assert_eq!(recording.frames[1].frame.joystick_magnitude, 0.8);
    }

    #[test]
    fn test_load_json_recording() {
        let json = r#"{"frames": [{"controller": "primary", "roll": 45.0}]}"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let recording = Recording::load(file.path()).unwrap();
        assert_eq!(recording.interval_ms, 10);
        assert_eq!(recording.frames[0].frame.roll, 45.0);
    }

    #[test]
    fn test_load_empty_recording_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"frames: []").unwrap();
        assert!(Recording::load(file.path()).is_err());
    }

    #[tokio::test]
    async fn test_replay_source_creation() {
        let source = ReplaySource::new("test_replay", recording(&[0.0]));
        assert_eq!(source.name(), "test_replay");
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_replay_emits_frames_in_order() {
        let mut source = ReplaySource::new("test_replay", recording(&[0.1, 0.2, 0.3]));
        let mut rx = source.subscribe();
        source.start().unwrap();

        for expected in [0.1, 0.2, 0.3] {
            let tagged = rx.recv().await.unwrap();
            assert_eq!(tagged.frame.pitch, expected);
        }

        // Finishes on its own
        while source.is_running() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    #[tokio::test]
    async fn test_replay_skips_non_finite_frames() {
        let mut source = ReplaySource::new("test_replay", recording(&[0.1, f64::NAN, 0.3]));
        let mut rx = source.subscribe();
        source.start().unwrap();

        assert_eq!(rx.recv().await.unwrap().frame.pitch, 0.1);
        assert_eq!(rx.recv().await.unwrap().frame.pitch, 0.3);
    }

    #[tokio::test]
    async fn test_replay_loops_until_stopped() {
        let mut source = ReplaySource::new("test_replay", recording(&[0.1, 0.2])).with_looping(true);
        let mut rx = source.subscribe();
        source.start().unwrap();

        let pitches: Vec<f64> = {
            let mut out = Vec::new();
            for _ in 0..5 {
                out.push(rx.recv().await.unwrap().frame.pitch);
            }
            out
        };
        assert_eq!(pitches, vec![0.1, 0.2, 0.1, 0.2, 0.1]);

        source.stop();
        assert!(!source.is_running());
    }

    #[test]
    fn test_demo_recording_through_engine() {
        use crate::engine::{MappingEngine, OutputEvent};
        use crate::WiiMidiConfig;

        let config: WiiMidiConfig =
            serde_yaml::from_str(include_str!("../../wiimidi.example.yaml")).unwrap();
        let recording: Recording =
            serde_yaml::from_str(include_str!("../../demo.recording.yaml")).unwrap();

        let mut engine = MappingEngine::new(config).unwrap();
        for id in ControllerId::ALL {
            engine.connect(id);
        }
        let events: Vec<_> = recording
            .frames
            .iter()
            .flat_map(|t| engine.process_frame(t.controller, &t.frame).unwrap())
            .collect();

        assert_eq!(
            events,
            vec![
                OutputEvent::NoteOn { channel: 1, note: 50, velocity: 127 },
                OutputEvent::NoteOn { channel: 1, note: 51, velocity: 127 },
                OutputEvent::PitchBend { channel: 1, value: 8533 },
                OutputEvent::NoteOff { channel: 1, note: 51 },
                OutputEvent::NoteOff { channel: 1, note: 50 },
            ]
        );
    }
}
