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

//! Application events and the main event loop.
//!
//! Events are produced on the MIDI driver's thread and consumed here, on the
//! main thread, strictly in the order they arrived. Each event is handed to a
//! single [`EventHandler`], which decides what the event means for the
//! current operating mode.
//!
//! # Organization
//!
//! * [`normalize`]: Conversion of decoded MIDI messages to canonical events.

pub(crate) mod normalize;

use std::sync::mpsc::Receiver;

use tracing::{debug, info, warn};

use crate::{
    midi::{MidiMessage, decode::DecodeError},
    model::CanonicalEvent,
};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Midi(MidiMessage),
    Undecodable(Vec<u8>, DecodeError),
}

/// Receives every canonical event that survives filtering.
///
/// Implementations deal with their own failures, a handler never stops the
/// event loop.
pub(crate) trait EventHandler {
    fn handle_event(&self, event: &CanonicalEvent);
}

/// Runs the main event loop.
///
/// This function blocks until the event channel is closed, which only happens
/// once every sender, including the one owned by the MIDI input connection,
/// has been dropped. Returns the number of events passed to `handler`.
pub(crate) fn process_events(event_rx: &Receiver<AppEvent>, handler: &dyn EventHandler) -> usize {
    let mut handled = 0;

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Midi(message) => {
                if message.kind().is_filtered() {
                    debug!(event = %message, "Dropped");
                    continue;
                }

                info!(event = %message, "Received");

                handler.handle_event(&normalize::normalize(&message));
                handled += 1;
            }
            AppEvent::Undecodable(bytes, e) => {
                warn!(bytes = ?bytes, error = %e, "Ignoring undecodable MIDI message");
            }
        }
    }

    handled
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, sync::mpsc};

    use super::*;
    use crate::model::EventKind;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<CanonicalEvent>>,
    }

    impl EventHandler for Recorder {
        fn handle_event(&self, event: &CanonicalEvent) {
            self.events.borrow_mut().push(*event);
        }
    }

    #[test]
    fn events_are_handled_in_arrival_order_without_pressure() {
        let (tx, rx) = mpsc::channel();
        let messages = [
            MidiMessage::NoteOn {
                channel: 0,
                note: 1,
                velocity: 10,
            },
            MidiMessage::Aftertouch {
                channel: 0,
                value: 5,
            },
            MidiMessage::ControlChange {
                channel: 0,
                control: 2,
                value: 20,
            },
            MidiMessage::PolyTouch {
                channel: 0,
                note: 1,
                value: 7,
            },
            MidiMessage::NoteOff {
                channel: 0,
                note: 1,
                velocity: 0,
            },
            MidiMessage::Clock,
        ];
        for message in messages {
            tx.send(AppEvent::Midi(message)).unwrap();
        }
        drop(tx);

        let recorder = Recorder::default();
        let handled = process_events(&rx, &recorder);

        let kinds: Vec<_> = recorder.events.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(handled, 4);
        assert_eq!(
            kinds,
            vec![
                EventKind::NoteOn,
                EventKind::ControlChange,
                EventKind::NoteOff,
                EventKind::Clock
            ]
        );
    }

    #[test]
    fn undecodable_input_is_skipped() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Undecodable(vec![0x90], DecodeError::Empty))
            .unwrap();
        tx.send(AppEvent::Midi(MidiMessage::Start)).unwrap();
        drop(tx);

        let recorder = Recorder::default();

        assert_eq!(process_events(&rx, &recorder), 1);
        assert_eq!(recorder.events.borrow()[0].kind, EventKind::Start);
    }

    #[test]
    fn closed_channel_ends_the_loop() {
        let (tx, rx) = mpsc::channel::<AppEvent>();
        drop(tx);

        assert_eq!(process_events(&rx, &Recorder::default()), 0);
    }
}
