//! Error and warning types for the mapping engine

use crate::sources::ControllerId;
use std::fmt;
use thiserror::Error;

/// Mapping engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Joystick direction has no entry in the scale table
    #[error("no scale degree mapped for joystick bucket {bucket} degrees")]
    UnmappedAngleBucket { bucket: i32 },

    /// Rejected at setup, before any frame is processed
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The MIDI output could not accept an event
    #[error("MIDI transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Frame addressed to a controller with no mapping state
    #[error("controller {0} is not connected")]
    ControllerNotConnected(ControllerId),
}

/// Result type for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Conditions the engine recovered from while processing a frame
#[derive(Debug, Clone, PartialEq)]
pub enum MappingWarning {
    /// The previous note was held because the bucket is a gap in the table
    UnmappedAngleBucket {
        controller: ControllerId,
        bucket: i32,
        held_note: u8,
    },
    /// A note was struck while still sounding; the stale instance was released
    DuplicateNoteOn { controller: ControllerId, note: u8 },
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingWarning::UnmappedAngleBucket {
                controller,
                bucket,
                held_note,
            } => write!(
                f,
                "{}: joystick bucket {} is unmapped, holding note {}",
                controller, bucket, held_note
            ),
            MappingWarning::DuplicateNoteOn { controller, note } => write!(
                f,
                "{}: note {} struck while sounding, released stale instance",
                controller, note
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MappingError::UnmappedAngleBucket { bucket: -135 };
        assert_eq!(
            err.to_string(),
            "no scale degree mapped for joystick bucket -135 degrees"
        );

        let err = MappingError::ControllerNotConnected(ControllerId::Secondary);
        assert_eq!(err.to_string(), "controller secondary is not connected");
    }

    #[test]
    fn test_warning_display() {
        let warning = MappingWarning::DuplicateNoteOn {
            controller: ControllerId::Primary,
            note: 60,
        };
        assert!(warning.to_string().contains("note 60"));
    }
}
