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

use crate::{
    midi::MidiMessage,
    model::{CanonicalEvent, Payload},
};

/// Reduces a MIDI message to its canonical form.
pub(crate) fn normalize(message: &MidiMessage) -> CanonicalEvent {
    let kind = message.kind();

    let (channel, payload) = match *message {
        MidiMessage::NoteOff {
            channel,
            note,
            velocity,
        }
        | MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        } => (
            Some(channel),
            Payload::Note {
                note,
                velocity: Some(velocity),
                value: None,
            },
        ),
        MidiMessage::PolyTouch {
            channel,
            note,
            value,
        } => (
            Some(channel),
            Payload::Note {
                note,
                velocity: None,
                value: Some(value),
            },
        ),
        MidiMessage::ControlChange {
            channel,
            control,
            value,
        } => (
            Some(channel),
            Payload::Control {
                control,
                value: Some(value),
            },
        ),
        MidiMessage::Aftertouch { channel, value } => (Some(channel), Payload::Pressure { value }),
        MidiMessage::ProgramChange { channel, .. } | MidiMessage::PitchWheel { channel, .. } => {
            (Some(channel), Payload::Empty)
        }
        MidiMessage::SysEx { .. }
        | MidiMessage::QuarterFrame { .. }
        | MidiMessage::SongPosition { .. }
        | MidiMessage::SongSelect { .. }
        | MidiMessage::TuneRequest
        | MidiMessage::Clock
        | MidiMessage::Start
        | MidiMessage::Continue
        | MidiMessage::Stop
        | MidiMessage::ActiveSensing
        | MidiMessage::Reset => (None, Payload::Empty),
    };

    CanonicalEvent::new(kind, channel, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;

    #[test]
    fn note_messages_use_note_as_control_id() {
        let event = normalize(&MidiMessage::NoteOn {
            channel: 9,
            note: 36,
            velocity: 90,
        });

        assert_eq!(event.kind, EventKind::NoteOn);
        assert_eq!(event.channel, Some(9));
        assert_eq!(event.control_id(), Some(36));
        assert_eq!(event.note(), Some(36));
        assert_eq!(event.velocity(), Some(90));
        assert_eq!(event.value(), None);
        assert_eq!(event.control(), None);
    }

    #[test]
    fn control_change_uses_control_as_control_id() {
        let event = normalize(&MidiMessage::ControlChange {
            channel: 0,
            control: 14,
            value: 65,
        });

        assert_eq!(event.kind, EventKind::ControlChange);
        assert_eq!(event.control_id(), Some(14));
        assert_eq!(event.control(), Some(14));
        assert_eq!(event.value(), Some(65));
        assert_eq!(event.note(), None);
        assert_eq!(event.velocity(), None);
    }

    #[test]
    fn messages_without_identifier_have_empty_payload() {
        let event = normalize(&MidiMessage::ProgramChange {
            channel: 3,
            program: 12,
        });
        assert_eq!(event.kind, EventKind::ProgramChange);
        assert_eq!(event.payload, Payload::Empty);
        assert_eq!(event.channel, Some(3));

        let event = normalize(&MidiMessage::Start);
        assert_eq!(event.kind, EventKind::Start);
        assert_eq!(event.channel, None);
        assert_eq!(event.control_id(), None);
    }

    #[test]
    fn pressure_keeps_its_value() {
        let event = normalize(&MidiMessage::Aftertouch {
            channel: 0,
            value: 70,
        });
        assert_eq!(event.control_id(), None);
        assert_eq!(event.value(), Some(70));

        let event = normalize(&MidiMessage::PolyTouch {
            channel: 0,
            note: 48,
            value: 20,
        });
        assert_eq!(event.control_id(), Some(48));
        assert_eq!(event.value(), Some(20));
    }
}
