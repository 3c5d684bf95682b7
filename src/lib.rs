//! wiimidi - Play a synthesizer by swinging a motion controller
//!
//! Turns controller orientation and joystick readings into MIDI. The
//! joystick picks a scale degree, a sharp swing strikes it, and rolling
//! the controller bends the pitch.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod sources;

pub use config::WiiMidiConfig;
pub use engine::{MappingEngine, OutputEvent};
pub use error::{MappingError, MappingWarning};
