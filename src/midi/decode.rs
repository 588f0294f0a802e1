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

//! MIDI wire format decoding.
//!
//! Parsing is done by `midi_msg`; this module only maps its message types
//! onto [`MidiMessage`]. The input driver delivers one complete message per
//! callback, with running status already expanded, so decoding never has to
//! carry state between calls.

use midi_msg::{
    ChannelVoiceMsg, ControlChange, MidiMsg, ParseError, SystemCommonMsg, SystemRealTimeMsg,
};
use thiserror::Error;

use crate::midi::message::MidiMessage;

const SYSEX_START: u8 = 0xf0;
const SYSEX_END: u8 = 0xf7;

// Pitch bend values are sent offset so that 8192 is the centre position.
const PITCH_BEND_CENTRE: i16 = 8192;

#[derive(Debug, Error)]
pub(crate) enum DecodeError {
    #[error("empty message")]
    Empty,
    #[error("invalid MIDI message: {0:?}")]
    Parse(ParseError),
    #[error("unsupported MIDI message")]
    Unsupported,
}

/// Decodes a single MIDI message.
pub(crate) fn decode(bytes: &[u8]) -> Result<MidiMessage, DecodeError> {
    let &status = bytes.first().ok_or(DecodeError::Empty)?;

    // System exclusive payloads are passed through as raw data.
    if status == SYSEX_START {
        let data = &bytes[1..];
        let data = data.strip_suffix(&[SYSEX_END]).unwrap_or(data);
        return Ok(MidiMessage::SysEx {
            data: data.to_vec(),
        });
    }

    let (msg, _len) = MidiMsg::from_midi(bytes).map_err(DecodeError::Parse)?;

    let message = match msg {
        MidiMsg::ChannelVoice { channel, msg } => {
            let channel = channel as u8;
            match msg {
                ChannelVoiceMsg::NoteOff { note, velocity } => MidiMessage::NoteOff {
                    channel,
                    note,
                    velocity,
                },
                ChannelVoiceMsg::NoteOn { note, velocity } => MidiMessage::NoteOn {
                    channel,
                    note,
                    velocity,
                },
                ChannelVoiceMsg::PolyPressure { note, pressure } => MidiMessage::PolyTouch {
                    channel,
                    note,
                    value: pressure,
                },
                ChannelVoiceMsg::ControlChange {
                    control: ControlChange::CC { control, value },
                } => MidiMessage::ControlChange {
                    channel,
                    control,
                    value,
                },
                ChannelVoiceMsg::ControlChange { .. } => raw_control_change(channel, bytes)?,
                ChannelVoiceMsg::ProgramChange { program } => {
                    MidiMessage::ProgramChange { channel, program }
                }
                ChannelVoiceMsg::ChannelPressure { pressure } => MidiMessage::Aftertouch {
                    channel,
                    value: pressure,
                },
                ChannelVoiceMsg::PitchBend { bend } => MidiMessage::PitchWheel {
                    channel,
                    pitch: bend as i16 - PITCH_BEND_CENTRE,
                },
                _ => return Err(DecodeError::Unsupported),
            }
        }
        // Channel mode messages are control changes 120 to 127 on the wire.
        MidiMsg::ChannelMode { channel, .. } => raw_control_change(channel as u8, bytes)?,
        MidiMsg::SystemCommon { msg } => match msg {
            SystemCommonMsg::SongPosition(pos) => MidiMessage::SongPosition { pos },
            SystemCommonMsg::SongSelect(song) => MidiMessage::SongSelect { song },
            SystemCommonMsg::TuneRequest => MidiMessage::TuneRequest,
            // Every remaining system common message is a time code quarter frame.
            _ => {
                let data = *bytes.get(1).ok_or(DecodeError::Unsupported)?;
                MidiMessage::QuarterFrame {
                    frame_type: data >> 4,
                    frame_value: data & 0x0f,
                }
            }
        },
        MidiMsg::SystemRealTime { msg } => match msg {
            SystemRealTimeMsg::TimingClock => MidiMessage::Clock,
            SystemRealTimeMsg::Start => MidiMessage::Start,
            SystemRealTimeMsg::Continue => MidiMessage::Continue,
            SystemRealTimeMsg::Stop => MidiMessage::Stop,
            SystemRealTimeMsg::ActiveSensing => MidiMessage::ActiveSensing,
            SystemRealTimeMsg::SystemReset => MidiMessage::Reset,
        },
        _ => return Err(DecodeError::Unsupported),
    };

    Ok(message)
}

// Controller number and value as sent, for controllers that `midi_msg`
// parses into a richer representation.
fn raw_control_change(channel: u8, bytes: &[u8]) -> Result<MidiMessage, DecodeError> {
    match *bytes {
        [_, control, value, ..] => Ok(MidiMessage::ControlChange {
            channel,
            control,
            value,
        }),
        _ => Err(DecodeError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_notes_and_controls() {
        assert_eq!(
            decode(&[0x90, 64, 100]).unwrap(),
            MidiMessage::NoteOn {
                channel: 0,
                note: 64,
                velocity: 100
            }
        );
        assert_eq!(
            decode(&[0x83, 64, 0]).unwrap(),
            MidiMessage::NoteOff {
                channel: 3,
                note: 64,
                velocity: 0
            }
        );
        assert_eq!(
            decode(&[0xb1, 21, 127]).unwrap(),
            MidiMessage::ControlChange {
                channel: 1,
                control: 21,
                value: 127
            }
        );
        assert_eq!(
            decode(&[0xc2, 5]).unwrap(),
            MidiMessage::ProgramChange {
                channel: 2,
                program: 5
            }
        );
    }

    #[test]
    fn pressure_messages_keep_their_kind() {
        assert_eq!(
            decode(&[0xaf, 60, 12]).unwrap(),
            MidiMessage::PolyTouch {
                channel: 15,
                note: 60,
                value: 12
            }
        );
        assert_eq!(
            decode(&[0xd0, 33]).unwrap(),
            MidiMessage::Aftertouch {
                channel: 0,
                value: 33
            }
        );
    }

    #[test]
    fn pitch_wheel_is_centred() {
        assert_eq!(
            decode(&[0xe0, 0x00, 0x40]).unwrap(),
            MidiMessage::PitchWheel {
                channel: 0,
                pitch: 0
            }
        );
    }

    #[test]
    fn decodes_realtime_and_sysex() {
        assert_eq!(decode(&[0xf8]).unwrap(), MidiMessage::Clock);
        assert_eq!(decode(&[0xfa]).unwrap(), MidiMessage::Start);
        assert_eq!(decode(&[0xfc]).unwrap(), MidiMessage::Stop);
        assert_eq!(
            decode(&[0xf0, 0x7e, 0x7f, 0x06, 0x01, 0xf7]).unwrap(),
            MidiMessage::SysEx {
                data: vec![0x7e, 0x7f, 0x06, 0x01]
            }
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(decode(&[]), Err(DecodeError::Empty)));
        assert!(decode(&[0x90, 64]).is_err());
        assert!(decode(&[0x40, 0x10]).is_err());
    }
}
