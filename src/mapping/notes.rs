//! Sounding-note bookkeeping for one controller

use crate::engine::OutputEvent;
use crate::sources::ControllerId;
use serde::{Deserialize, Serialize};

/// Accidental applied to every struck note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteModifier {
    #[default]
    None,
    Sharp,
    Flat,
}

impl NoteModifier {
    /// Raise or lower a note by a semitone, staying inside 0..=127
    pub fn apply(self, note: u8) -> u8 {
        match self {
            NoteModifier::Sharp if note < 127 => note + 1,
            NoteModifier::Flat if note > 0 => note - 1,
            _ => note,
        }
    }
}

/// Events produced by striking a note
#[derive(Debug, Clone, PartialEq)]
pub struct Strike {
    /// Note-off for a stale instance of the same note, if it was still sounding
    pub released: Option<OutputEvent>,
    pub note_on: OutputEvent,
}

impl Strike {
    /// Events in emission order
    pub fn into_events(self) -> impl Iterator<Item = OutputEvent> {
        self.released.into_iter().chain(std::iter::once(self.note_on))
    }
}

/// Tracks the notes one controller has sounding
///
/// Each note value sounds at most once; notes are kept in the order they
/// were struck.
#[derive(Debug, Clone)]
pub struct NoteLifecycleManager {
    controller: ControllerId,
    channel: u8,
    active: Vec<u8>,
}

impl NoteLifecycleManager {
    /// Create a manager with nothing sounding
    pub fn new(controller: ControllerId, channel: u8) -> Self {
        Self {
            controller,
            channel,
            active: Vec::new(),
        }
    }

    pub fn controller(&self) -> ControllerId {
        self.controller
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Sounding notes, oldest first
    pub fn active_notes(&self) -> &[u8] {
        &self.active
    }

    pub fn is_sounding(&self, note: u8) -> bool {
        self.active.contains(&note)
    }

    /// Strike `note` (after applying `modifier`) at velocity `force`
    pub fn note_on(&mut self, note: u8, force: u8, modifier: NoteModifier) -> Strike {
        let note = modifier.apply(note);

        let released = self.active.iter().position(|&n| n == note).map(|idx| {
            self.active.remove(idx);
            OutputEvent::NoteOff {
                channel: self.channel,
                note,
            }
        });

        self.active.push(note);
        Strike {
            released,
            note_on: OutputEvent::NoteOn {
                channel: self.channel,
                note,
                velocity: force.min(127),
            },
        }
    }

    /// Release every sounding note, newest first
    pub fn end_all(&mut self) -> Vec<OutputEvent> {
        let channel = self.channel;
        self.active
            .drain(..)
            .rev()
            .map(|note| OutputEvent::NoteOff { channel, note })
            .collect()
    }
}
