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

//! Event to command dispatch.
//!
//! The [`Dispatcher`] matches a canonical event against the mapping table and
//! expands the matched template into a concrete command line. Templates may
//! reference the following placeholders:
//!
//! | Placeholder | Replaced with                          |
//! |-------------|----------------------------------------|
//! | `$value`    | control value or pressure              |
//! | `$velocity` | note velocity                          |
//! | `$note`     | note number                            |
//! | `$control`  | controller number                      |
//! | `$channel`  | MIDI channel, zero based               |
//! | `$type`     | event kind, e.g. `note_on`             |
//!
//! A placeholder for a field the event does not carry expands to nothing.
//!
//! Substituted values are inserted verbatim, no quoting or escaping is
//! applied before the command reaches the shell. Every value is numeric or a
//! fixed kind name, but templates themselves are executed as written.

use tracing::{debug, error, info};

use crate::{
    events::EventHandler,
    mapping::MappingTable,
    model::CanonicalEvent,
    sinks::CommandRunner,
};

/// Matches events to command templates.
pub(crate) struct Dispatcher {
    table: MappingTable,
}

impl Dispatcher {
    pub(crate) fn new(table: MappingTable) -> Self {
        Self { table }
    }

    /// Returns the concrete command for `event`, or `None` when nothing is
    /// mapped to it.
    ///
    /// Events without a control identifier never match. An entry with an empty
    /// template is treated as if it were absent.
    pub(crate) fn dispatch(&self, event: &CanonicalEvent) -> Option<String> {
        let template = event
            .control_id()
            .and_then(|id| self.table.get(id, event.kind))
            .filter(|template| !template.is_empty());

        let Some(template) = template else {
            debug!(event = %event, "No mapping");
            return None;
        };

        let command = substitute(template, event);
        info!(command = %command, "Executing");

        Some(command)
    }
}

/// Replaces every placeholder in `template` with the matching event field.
pub(crate) fn substitute(template: &str, event: &CanonicalEvent) -> String {
    let placeholders = [
        ("$value", opt_to_string(event.value())),
        ("$velocity", opt_to_string(event.velocity())),
        ("$note", opt_to_string(event.note())),
        ("$control", opt_to_string(event.control())),
        ("$channel", opt_to_string(event.channel)),
        ("$type", event.kind.as_str().to_string()),
    ];

    placeholders
        .iter()
        .fold(template.to_string(), |command, (placeholder, value)| {
            command.replace(placeholder, value)
        })
}

fn opt_to_string(value: Option<u8>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Command dispatch mode: every matching event runs its command.
pub(crate) struct CommandPipeline<'a> {
    dispatcher: &'a Dispatcher,
    runner: &'a dyn CommandRunner,
}

impl<'a> CommandPipeline<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, runner: &'a dyn CommandRunner) -> Self {
        Self { dispatcher, runner }
    }
}

impl EventHandler for CommandPipeline<'_> {
    fn handle_event(&self, event: &CanonicalEvent) {
        if let Some(command) = self.dispatcher.dispatch(event) {
            if let Err(e) = self.runner.run(&command) {
                error!(command = %command, error = %e, "Failed to start command");
            }
        }
    }
}
