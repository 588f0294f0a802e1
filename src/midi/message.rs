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

use std::fmt;

use crate::model::EventKind;

/// A decoded MIDI message, one variant per message kind.
///
/// Channels are zero based, as they appear on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MidiMessage {
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    PolyTouch { channel: u8, note: u8, value: u8 },
    ControlChange { channel: u8, control: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    Aftertouch { channel: u8, value: u8 },
    PitchWheel { channel: u8, pitch: i16 },
    SysEx { data: Vec<u8> },
    QuarterFrame { frame_type: u8, frame_value: u8 },
    SongPosition { pos: u16 },
    SongSelect { song: u8 },
    TuneRequest,
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
}

impl MidiMessage {
    pub(crate) fn kind(&self) -> EventKind {
        match self {
            MidiMessage::NoteOff { .. } => EventKind::NoteOff,
            MidiMessage::NoteOn { .. } => EventKind::NoteOn,
            MidiMessage::PolyTouch { .. } => EventKind::PolyTouch,
            MidiMessage::ControlChange { .. } => EventKind::ControlChange,
            MidiMessage::ProgramChange { .. } => EventKind::ProgramChange,
            MidiMessage::Aftertouch { .. } => EventKind::Aftertouch,
            MidiMessage::PitchWheel { .. } => EventKind::PitchWheel,
            MidiMessage::SysEx { .. } => EventKind::SysEx,
            MidiMessage::QuarterFrame { .. } => EventKind::QuarterFrame,
            MidiMessage::SongPosition { .. } => EventKind::SongPosition,
            MidiMessage::SongSelect { .. } => EventKind::SongSelect,
            MidiMessage::TuneRequest => EventKind::TuneRequest,
            MidiMessage::Clock => EventKind::Clock,
            MidiMessage::Start => EventKind::Start,
            MidiMessage::Continue => EventKind::Continue,
            MidiMessage::Stop => EventKind::Stop,
            MidiMessage::ActiveSensing => EventKind::ActiveSensing,
            MidiMessage::Reset => EventKind::Reset,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            }
            | MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => write!(f, "{kind} channel={channel} note={note} velocity={velocity}"),
            MidiMessage::PolyTouch {
                channel,
                note,
                value,
            } => write!(f, "{kind} channel={channel} note={note} value={value}"),
            MidiMessage::ControlChange {
                channel,
                control,
                value,
            } => write!(f, "{kind} channel={channel} control={control} value={value}"),
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "{kind} channel={channel} program={program}")
            }
            MidiMessage::Aftertouch { channel, value } => {
                write!(f, "{kind} channel={channel} value={value}")
            }
            MidiMessage::PitchWheel { channel, pitch } => {
                write!(f, "{kind} channel={channel} pitch={pitch}")
            }
            MidiMessage::SysEx { data } => {
                write!(f, "{kind} data=(")?;
                for (idx, byte) in data.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{byte}")?;
                }
                f.write_str(")")
            }
            MidiMessage::QuarterFrame {
                frame_type,
                frame_value,
            } => write!(f, "{kind} frame_type={frame_type} frame_value={frame_value}"),
            MidiMessage::SongPosition { pos } => write!(f, "{kind} pos={pos}"),
            MidiMessage::SongSelect { song } => write!(f, "{kind} song={song}"),
            MidiMessage::TuneRequest
            | MidiMessage::Clock
            | MidiMessage::Start
            | MidiMessage::Continue
            | MidiMessage::Stop
            | MidiMessage::ActiveSensing
            | MidiMessage::Reset => write!(f, "{kind}"),
        }
    }
}
