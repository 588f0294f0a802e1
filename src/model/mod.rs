// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Domain models and core data structures.
//!
//! This module defines the canonical form of a control surface event, the
//! shape every incoming MIDI message is reduced to before it is matched
//! against the mapping table or published to the message bus.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The category of a hardware event.
///
/// The names returned by [`EventKind::as_str`] are the tokens used in the
/// mapping file and in the `type` field of published messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum EventKind {
    NoteOff,
    NoteOn,
    PolyTouch,
    ControlChange,
    ProgramChange,
    Aftertouch,
    PitchWheel,
    SysEx,
    QuarterFrame,
    SongPosition,
    SongSelect,
    TuneRequest,
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
}

impl EventKind {
    pub(crate) const ALL: [EventKind; 18] = [
        EventKind::NoteOff,
        EventKind::NoteOn,
        EventKind::PolyTouch,
        EventKind::ControlChange,
        EventKind::ProgramChange,
        EventKind::Aftertouch,
        EventKind::PitchWheel,
        EventKind::SysEx,
        EventKind::QuarterFrame,
        EventKind::SongPosition,
        EventKind::SongSelect,
        EventKind::TuneRequest,
        EventKind::Clock,
        EventKind::Start,
        EventKind::Continue,
        EventKind::Stop,
        EventKind::ActiveSensing,
        EventKind::Reset,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EventKind::NoteOff => "note_off",
            EventKind::NoteOn => "note_on",
            EventKind::PolyTouch => "polytouch",
            EventKind::ControlChange => "control_change",
            EventKind::ProgramChange => "program_change",
            EventKind::Aftertouch => "aftertouch",
            EventKind::PitchWheel => "pitchwheel",
            EventKind::SysEx => "sysex",
            EventKind::QuarterFrame => "quarter_frame",
            EventKind::SongPosition => "songpos",
            EventKind::SongSelect => "song_select",
            EventKind::TuneRequest => "tune_request",
            EventKind::Clock => "clock",
            EventKind::Start => "start",
            EventKind::Continue => "continue",
            EventKind::Stop => "stop",
            EventKind::ActiveSensing => "active_sensing",
            EventKind::Reset => "reset",
        }
    }

    /// Pressure events arrive in dense bursts while a pad is held and are
    /// never routed to either sink.
    pub(crate) fn is_filtered(self) -> bool {
        matches!(self, EventKind::Aftertouch | EventKind::PolyTouch)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event kind: {0}")]
pub(crate) struct UnknownEventKind(pub(crate) String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Kind-dependent data carried by a [`CanonicalEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Payload {
    /// A key or pad, identified by its note number.
    Note {
        note: u8,
        velocity: Option<u8>,
        value: Option<u8>,
    },
    /// A knob, fader or button sending control changes.
    Control { control: u8, value: Option<u8> },
    /// A value with no control identifier, e.g. channel pressure.
    Pressure { value: u8 },
    Empty,
}

/// A normalized control surface event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CanonicalEvent {
    pub(crate) kind: EventKind,
    pub(crate) channel: Option<u8>,
    pub(crate) payload: Payload,
}

impl CanonicalEvent {
    pub(crate) fn new(kind: EventKind, channel: Option<u8>, payload: Payload) -> Self {
        Self {
            kind,
            channel,
            payload,
        }
    }

    /// The number identifying the physical control that produced the event,
    /// the note number for note-based events and the controller number for
    /// control changes.
    pub(crate) fn control_id(&self) -> Option<u32> {
        match self.payload {
            Payload::Note { note, .. } => Some(u32::from(note)),
            Payload::Control { control, .. } => Some(u32::from(control)),
            Payload::Pressure { .. } | Payload::Empty => None,
        }
    }

    pub(crate) fn note(&self) -> Option<u8> {
        match self.payload {
            Payload::Note { note, .. } => Some(note),
            _ => None,
        }
    }

    pub(crate) fn control(&self) -> Option<u8> {
        match self.payload {
            Payload::Control { control, .. } => Some(control),
            _ => None,
        }
    }

    pub(crate) fn velocity(&self) -> Option<u8> {
        match self.payload {
            Payload::Note { velocity, .. } => velocity,
            _ => None,
        }
    }

    pub(crate) fn value(&self) -> Option<u8> {
        match self.payload {
            Payload::Note { value, .. } | Payload::Control { value, .. } => value,
            Payload::Pressure { value } => Some(value),
            Payload::Empty => None,
        }
    }
}

impl fmt::Display for CanonicalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(channel) = self.channel {
            write!(f, " channel={}", channel)?;
        }
        if let Some(note) = self.note() {
            write!(f, " note={}", note)?;
        }
        if let Some(control) = self.control() {
            write!(f, " control={}", control)?;
        }
        if let Some(velocity) = self.velocity() {
            write!(f, " velocity={}", velocity)?;
        }
        if let Some(value) = self.value() {
            write!(f, " value={}", value)?;
        }
        Ok(())
    }
}
