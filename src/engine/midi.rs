//! MIDI output for wiimidi.
//!
//! Encodes mapping events as raw MIDI and hands them to an output port.

use std::io::Write;
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::anyhow;
use midir::MidiOutput;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{MappingError, Result};

/// A musical event produced by the mapping engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    /// Note on: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off: channel (0-15), note (0-127)
    NoteOff { channel: u8, note: u8 },
    /// Pitch bend: channel (0-15), value (0-16383, center at 8192)
    PitchBend { channel: u8, value: u16 },
}

impl OutputEvent {
    /// Channel this event is addressed to.
    pub fn channel(&self) -> u8 {
        match *self {
            OutputEvent::NoteOn { channel, .. }
            | OutputEvent::NoteOff { channel, .. }
            | OutputEvent::PitchBend { channel, .. } => channel,
        }
    }

    /// Convert to raw MIDI bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            OutputEvent::NoteOn {
                channel,
                note,
                velocity,
            } => vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            OutputEvent::NoteOff { channel, note } => vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
            OutputEvent::PitchBend { channel, value } => {
                let lsb = (value & 0x7F) as u8;
                let msb = ((value >> 7) & 0x7F) as u8;
                vec![0xE0 | (channel & 0x0F), lsb, msb]
            }
        }
    }
}

/// Destination for mapping events.
///
/// Sends are fire-and-forget: implementations deliver in order per channel
/// and report only that the destination is gone, never retry.
pub trait MidiTransport {
    /// Accept one event.
    fn send(&mut self, event: &OutputEvent) -> Result<()>;
}

enum WriterCommand {
    Send(OutputEvent),
    Stop,
}

/// MIDI output port driven by a writer thread.
pub struct MidirTransport {
    sender: Sender<WriterCommand>,
    port_name: String,
}

impl MidirTransport {
    /// Connect to the first output port whose name contains `port_name`,
    /// or the first port when `None`.
    pub fn connect(port_name: Option<&str>, client_name: &str) -> anyhow::Result<Self> {
        let midi_out = MidiOutput::new(client_name)?;
        let ports = midi_out.ports();

        if ports.is_empty() {
            return Err(anyhow!("No MIDI output ports available"));
        }

        let port = if let Some(name) = port_name {
            ports
                .iter()
                .find(|p| {
                    midi_out
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| anyhow!("MIDI port '{}' not found", name))?
                .clone()
        } else {
            ports[0].clone()
        };

        let port_name_actual = midi_out.port_name(&port)?;
        let conn = midi_out
            .connect(&port, "wiimidi-output")
            .map_err(|e| anyhow!("failed to connect to '{}': {}", port_name_actual, e))?;

        let (sender, receiver) = mpsc::channel::<WriterCommand>();

        thread::spawn(move || {
            let mut conn = conn;
            while let Ok(cmd) = receiver.recv() {
                match cmd {
                    WriterCommand::Send(event) => {
                        if let Err(e) = conn.send(&event.to_bytes()) {
                            error!("MIDI send failed, closing output: {}", e);
                            break;
                        }
                    }
                    WriterCommand::Stop => break,
                }
            }
            conn.close();
        });

        info!("MIDI output connected to: {}", port_name_actual);

        Ok(Self {
            sender,
            port_name: port_name_actual,
        })
    }

    /// Name of the connected port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Stop the writer thread.
    pub fn stop(&self) {
        let _ = self.sender.send(WriterCommand::Stop);
    }
}

impl MidiTransport for MidirTransport {
    fn send(&mut self, event: &OutputEvent) -> Result<()> {
        debug!(?event, "MIDI out");
        self.sender
            .send(WriterCommand::Send(*event))
            .map_err(|_| MappingError::TransportUnavailable(format!("{} is closed", self.port_name)))
    }
}

impl Drop for MidirTransport {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Writes each event as one JSON object per line.
pub struct JsonLinesTransport<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MidiTransport for JsonLinesTransport<W> {
    fn send(&mut self, event: &OutputEvent) -> Result<()> {
        let line = serde_json::to_string(event)
            .map_err(|e| MappingError::TransportUnavailable(e.to_string()))?;
        writeln!(self.writer, "{}", line)
            .map_err(|e| MappingError::TransportUnavailable(e.to_string()))
    }
}

/// List available MIDI output ports.
pub fn list_midi_ports() -> anyhow::Result<Vec<String>> {
    let midi_out = MidiOutput::new("wiimidi list")?;
    let ports = midi_out.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok(names)
}
