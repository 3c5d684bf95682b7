//! Gesture-to-MIDI mapping engine
//!
//! Owns one [`MappingState`] per connected controller and turns each
//! incoming frame into an ordered list of MIDI events.

mod haptics;
mod midi;

pub use haptics::{Haptics, NullHaptics, TracingHaptics};
pub use midi::{list_midi_ports, JsonLinesTransport, MidiTransport, MidirTransport, OutputEvent};

use crate::config::{ControllerSettings, WiiMidiConfig};
use crate::error::{MappingError, MappingWarning, Result};
use crate::mapping::{wrap_degrees, ImpactDetector, NoteLifecycleManager, PitchBendShaper, ScaleQuantizer, SignalConditioner};
use crate::sources::{ControllerId, MotionFrame};
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// Note selected before the joystick first leaves its dead zone (middle C)
pub const INITIAL_NOTE: u8 = 60;

/// Mapping state for one controller
#[derive(Debug, Clone)]
pub struct MappingState {
    settings: ControllerSettings,
    current_note: u8,
    notes: NoteLifecycleManager,
    impact: ImpactDetector,
    pitch_bend_center: f64,
}

impl MappingState {
    fn new(controller: ControllerId, settings: ControllerSettings, impact: ImpactDetector) -> Self {
        Self {
            settings,
            current_note: INITIAL_NOTE,
            notes: NoteLifecycleManager::new(controller, settings.channel),
            impact,
            pitch_bend_center: 0.0,
        }
    }

    /// Note the next hit will strike (before the modifier)
    pub fn current_note(&self) -> u8 {
        self.current_note
    }

    pub fn channel(&self) -> u8 {
        self.settings.channel
    }

    pub fn octave(&self) -> i32 {
        self.settings.octave
    }

    /// Sounding notes, oldest first
    pub fn active_notes(&self) -> &[u8] {
        self.notes.active_notes()
    }

    pub fn impact(&self) -> &ImpactDetector {
        &self.impact
    }

    /// Roll treated as "no bend"
    pub fn pitch_bend_center(&self) -> f64 {
        self.pitch_bend_center
    }
}

/// The mapping engine
pub struct MappingEngine {
    config: WiiMidiConfig,
    conditioner: SignalConditioner,
    quantizer: ScaleQuantizer,
    shaper: PitchBendShaper,
    states: HashMap<ControllerId, MappingState>,
    haptics: Box<dyn Haptics>,
    rumbling: bool,
    warnings: Vec<MappingWarning>,
    unsent: Vec<OutputEvent>,
}

impl MappingEngine {
    /// Create an engine, rejecting invalid configuration up front
    pub fn new(config: WiiMidiConfig) -> Result<Self> {
        config.validate()?;
        let m = &config.mapping;

        Ok(Self {
            conditioner: SignalConditioner::new(m.dead_threshold, m.dead_bend_threshold),
            quantizer: ScaleQuantizer::new(config.scale_table()?),
            shaper: PitchBendShaper::new(m.pitch_modulus),
            states: HashMap::new(),
            haptics: Box::new(NullHaptics),
            rumbling: false,
            warnings: Vec::new(),
            unsent: Vec::new(),
            config,
        })
    }

    /// Route rumble requests to a haptics collaborator (builder pattern)
    pub fn with_haptics<H: Haptics + 'static>(mut self, haptics: H) -> Self {
        self.haptics = Box::new(haptics);
        self
    }

    pub fn config(&self) -> &WiiMidiConfig {
        &self.config
    }

    /// Create fresh state for a controller, replacing any existing state
    pub fn connect(&mut self, controller: ControllerId) {
        let m = &self.config.mapping;
        let settings = self.config.settings_for(controller);
        let impact = ImpactDetector::new(m.hit_limit, m.hit_scale);

        if self
            .states
            .insert(controller, MappingState::new(controller, settings, impact))
            .is_some()
        {
            info!(%controller, "controller reconnected, mapping state reset");
        } else {
            info!(%controller, channel = settings.channel, octave = settings.octave, "controller connected");
        }
    }

    /// Drop a controller's state, returning note-offs for whatever it had sounding
    pub fn disconnect(&mut self, controller: ControllerId) -> Vec<OutputEvent> {
        match self.states.remove(&controller) {
            Some(mut state) => {
                info!(%controller, "controller disconnected");
                state.notes.end_all()
            }
            None => Vec::new(),
        }
    }

    pub fn is_connected(&self, controller: ControllerId) -> bool {
        self.states.contains_key(&controller)
    }

    pub fn state(&self, controller: ControllerId) -> Option<&MappingState> {
        self.states.get(&controller)
    }

    /// Sounding notes for a controller
    pub fn active_notes(&self, controller: ControllerId) -> Option<&[u8]> {
        self.states.get(&controller).map(|s| s.active_notes())
    }

    /// Measure roll relative to `roll` from now on
    pub fn reset_pitch_bend_center(&mut self, controller: ControllerId, roll: f64) -> Result<()> {
        let state = self
            .states
            .get_mut(&controller)
            .ok_or(MappingError::ControllerNotConnected(controller))?;
        state.pitch_bend_center = roll;
        debug!(%controller, roll, "pitch bend recentered");
        Ok(())
    }

    /// Map one frame to MIDI events, in emission order
    ///
    /// The frame is assumed valid (finite readings).
    pub fn process_frame(&mut self, controller: ControllerId, frame: &MotionFrame) -> Result<Vec<OutputEvent>> {
        let m = &self.config.mapping;
        let state = self
            .states
            .get_mut(&controller)
            .ok_or(MappingError::ControllerNotConnected(controller))?;
        let mut events = Vec::new();

        if let Some(button) = m.recenter_button {
            if frame.just_pressed(button) {
                state.pitch_bend_center = frame.roll;
                debug!(%controller, roll = frame.roll, "pitch bend recentered");
            }
        }

        // Joystick: pick the note, or release everything at rest
        let joystick_active = self.conditioner.magnitude(frame.joystick_magnitude).is_some();
        if joystick_active {
            match self.quantizer.quantize(frame.joystick_angle, state.settings.octave) {
                Ok(note) => state.current_note = note,
                Err(MappingError::UnmappedAngleBucket { bucket }) => {
                    let warning = MappingWarning::UnmappedAngleBucket {
                        controller,
                        bucket,
                        held_note: state.current_note,
                    };
                    warn!("{}", warning);
                    self.warnings.push(warning);
                }
                Err(e) => return Err(e),
            }
        } else {
            events.extend(state.notes.end_all());
        }

        // Impact: strike the current note, unless the joystick is at rest.
        // The detector sees every sample so its derivative stays continuous.
        let hit = state.impact.process(m.hit_axis.sample(frame));
        let struck = hit.is_some() && joystick_active;
        if let Some(hit) = hit.filter(|_| joystick_active) {
            let strike = state
                .notes
                .note_on(state.current_note, hit.force, state.settings.note_modifier);
            if let Some(OutputEvent::NoteOff { note, .. }) = strike.released {
                let warning = MappingWarning::DuplicateNoteOn { controller, note };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
            trace!(%controller, force = hit.force, peak = hit.peak, "hit");
            events.extend(strike.into_events());
        }

        // Rumble pulses for the frame of the hit. Only the primary unit has a motor.
        if m.rumble_on_impact && struck != self.rumbling {
            self.haptics.set_rumble(ControllerId::Primary, struck);
            self.rumbling = struck;
        }

        // Roll: bend around the current center
        let relative_roll = wrap_degrees(frame.roll - state.pitch_bend_center);
        if let Some(signed_roll) = self.conditioner.roll(relative_roll) {
            events.push(OutputEvent::PitchBend {
                channel: state.settings.channel,
                value: self.shaper.shape(signed_roll),
            });
        }

        Ok(events)
    }

    /// Process a frame and hand its events to `transport` in order
    ///
    /// Mapping state advances even when the transport fails. The event that
    /// failed and everything after it are held and go out first on the next
    /// `dispatch` or `flush`. Returns the number of events delivered.
    pub fn dispatch(
        &mut self,
        controller: ControllerId,
        frame: &MotionFrame,
        transport: &mut dyn MidiTransport,
    ) -> Result<usize> {
        let events = self.process_frame(controller, frame)?;
        self.unsent.extend(events);
        self.flush(transport)
    }

    /// Retry events held back by an earlier transport failure
    pub fn flush(&mut self, transport: &mut dyn MidiTransport) -> Result<usize> {
        let mut sent = 0;
        while sent < self.unsent.len() {
            if let Err(e) = transport.send(&self.unsent[sent]) {
                self.unsent = self.unsent.split_off(sent);
                warn!(held = self.unsent.len(), "transport failed, holding events: {}", e);
                return Err(e);
            }
            sent += 1;
        }
        self.unsent.clear();
        Ok(sent)
    }

    /// Events computed but not yet delivered, oldest first
    pub fn unsent_events(&self) -> &[OutputEvent] {
        &self.unsent
    }

    /// End every sounding note on every controller and stop rumble
    ///
    /// Undelivered events come first, so held note-offs are not lost.
    pub fn release_all(&mut self) -> Vec<OutputEvent> {
        let mut events = std::mem::take(&mut self.unsent);
        for controller in ControllerId::ALL {
            if let Some(state) = self.states.get_mut(&controller) {
                events.extend(state.notes.end_all());
            }
        }
        if self.rumbling {
            self.haptics.set_rumble(ControllerId::Primary, false);
            self.rumbling = false;
        }
        events
    }

    /// Take the warnings recorded since the last call
    pub fn drain_warnings(&mut self) -> Vec<MappingWarning> {
        std::mem::take(&mut self.warnings)
    }
}
