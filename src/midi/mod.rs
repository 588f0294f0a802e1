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

//! MIDI input.
//!
//! This module owns the connection to the control surface. The driver invokes
//! a callback on its own thread for every incoming message; the callback only
//! decodes the bytes and forwards the result over a channel, so all routing
//! happens on the consuming side in arrival order.
//!
//! # Sub-modules
//!
//! * [`decode`]: Conversion of raw bytes to [`MidiMessage`] via `midi_msg`.
//! * [`message`]: The typed message representation.

pub(crate) mod decode;
pub(crate) mod message;

pub(crate) use message::MidiMessage;

use std::sync::mpsc::Sender;

use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use thiserror::Error;

use crate::events::AppEvent;

const CLIENT_NAME: &str = "rebutton";
const CONNECTION_NAME: &str = "rebutton-input";

#[derive(Debug, Error)]
pub(crate) enum MidiError {
    #[error("failed to initialise MIDI input: {0}")]
    Init(#[from] midir::InitError),
    #[error("no MIDI input ports available")]
    NoPorts,
    #[error("no MIDI input port matches '{0}'")]
    PortNotFound(String),
    #[error("failed to read MIDI port name: {0}")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("failed to connect to MIDI port '{port}': {reason}")]
    Connect { port: String, reason: String },
}

/// A live input connection.
///
/// Messages flow for as long as this value is alive, dropping it closes the
/// port and eventually the event channel.
pub(crate) struct MidiSource {
    pub(crate) port_name: String,
    _connection: MidiInputConnection<Sender<AppEvent>>,
}

/// Returns the names of all available input ports, in driver order.
pub(crate) fn list_ports() -> Result<Vec<String>, MidiError> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;

    midi_in
        .ports()
        .iter()
        .map(|port| midi_in.port_name(port).map_err(MidiError::from))
        .collect()
}

/// Connects to an input port and forwards every message to `event_tx`.
///
/// # Arguments
///
/// * `selector` - Port index or a substring of the port name, the first port
///   is used when `None`.
/// * `event_tx` - The sending end of the application event channel.
pub(crate) fn open_input(
    selector: Option<&str>,
    event_tx: Sender<AppEvent>,
) -> Result<MidiSource, MidiError> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(Ignore::ActiveSense);

    let ports = midi_in.ports();
    let names = ports
        .iter()
        .map(|port| midi_in.port_name(port))
        .collect::<Result<Vec<_>, _>>()?;

    let idx = select_port(&names, selector)?;
    let port: &MidiInputPort = &ports[idx];
    let port_name = names[idx].clone();

    let connection = midi_in
        .connect(
            port,
            CONNECTION_NAME,
            |_stamp, bytes, event_tx| {
                let event = match decode::decode(bytes) {
                    Ok(message) => AppEvent::Midi(message),
                    Err(e) => AppEvent::Undecodable(bytes.to_vec(), e),
                };
                // The receiver only goes away on shutdown.
                let _ = event_tx.send(event);
            },
            event_tx,
        )
        .map_err(|e| MidiError::Connect {
            port: port_name.clone(),
            reason: e.to_string(),
        })?;

    Ok(MidiSource {
        port_name,
        _connection: connection,
    })
}

/// Picks a port index from `names`.
///
/// An all-digit selector is an index, anything else matches the first name
/// containing it.
fn select_port(names: &[String], selector: Option<&str>) -> Result<usize, MidiError> {
    if names.is_empty() {
        return Err(MidiError::NoPorts);
    }

    let Some(selector) = selector else {
        return Ok(0);
    };

    let found = if !selector.is_empty() && selector.chars().all(|c| c.is_ascii_digit()) {
        selector.parse::<usize>().ok().filter(|&idx| idx < names.len())
    } else {
        names.iter().position(|name| name.contains(selector))
    };

    found.ok_or_else(|| MidiError::PortNotFound(selector.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "Midi Through:Midi Through Port-0 14:0".to_string(),
            "nanoKONTROL2:nanoKONTROL2 MIDI 1 20:0".to_string(),
            "ATOM:ATOM MIDI 1 24:0".to_string(),
        ]
    }

    #[test]
    fn defaults_to_first_port() {
        assert_eq!(select_port(&names(), None).unwrap(), 0);
    }

    #[test]
    fn selects_by_index() {
        assert_eq!(select_port(&names(), Some("2")).unwrap(), 2);
        assert!(matches!(
            select_port(&names(), Some("3")),
            Err(MidiError::PortNotFound(s)) if s == "3"
        ));
    }

    #[test]
    fn selects_by_name() {
        assert_eq!(select_port(&names(), Some("ATOM")).unwrap(), 2);
        assert_eq!(select_port(&names(), Some("nanoKONTROL")).unwrap(), 1);
        assert!(matches!(
            select_port(&names(), Some("Launchpad")),
            Err(MidiError::PortNotFound(_))
        ));
    }

    #[test]
    fn no_ports_is_an_error() {
        assert!(matches!(select_port(&[], None), Err(MidiError::NoPorts)));
    }
}
