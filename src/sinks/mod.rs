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

//! Action sinks.
//!
//! A sink is the terminal effect of a dispatched event. Both sinks return as
//! soon as the effect has been started, neither waits for it to complete.
//!
//! # Sub-modules
//!
//! * [`process`]: Runs shell commands as detached child processes.
//! * [`publish`]: Serializes events and publishes them to the message bus.
//! * [`mqtt`]: The MQTT transport used by the publish sink.

pub(crate) mod mqtt;
pub(crate) mod process;
pub(crate) mod publish;

use crate::sinks::{process::SpawnError, publish::PublishError};

/// Starts a command without waiting for it.
pub(crate) trait CommandRunner {
    fn run(&self, command: &str) -> Result<(), SpawnError>;
}

/// Sends a payload to a topic on the message bus, at most once.
pub(crate) trait BusClient {
    fn send(&self, topic: &str, payload: String) -> Result<(), PublishError>;
}
