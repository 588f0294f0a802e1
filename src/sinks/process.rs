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

//! Fire-and-forget command execution.
//!
//! Commands run through the configured shell as independent child processes.
//! There is no limit on how many may be running at once, and a long running
//! command never delays the next event.

use std::{
    io,
    process::{Command, Stdio},
    thread,
};

use thiserror::Error;

use crate::sinks::CommandRunner;

#[derive(Debug, Error)]
pub(crate) enum SpawnError {
    #[error("no shell configured")]
    EmptyShell,
    #[error("failed to start {shell}")]
    Io {
        shell: String,
        #[source]
        source: io::Error,
    },
}

/// Runs commands as detached child processes.
pub(crate) struct ProcessSink {
    shell: Vec<String>,
}

impl ProcessSink {
    /// # Arguments
    ///
    /// * `shell` - The interpreter followed by its arguments, e.g. `sh -c`. The
    ///   command line is passed as the final argument.
    pub(crate) fn new(shell: Vec<String>) -> Self {
        Self { shell }
    }
}

impl CommandRunner for ProcessSink {
    /// Starts `command` and returns immediately.
    ///
    /// Output goes wherever this process's output goes. The child's exit
    /// status is never inspected; a helper thread only waits on it so the
    /// finished process is reaped.
    fn run(&self, command: &str) -> Result<(), SpawnError> {
        let (program, args) = self.shell.split_first().ok_or(SpawnError::EmptyShell)?;

        let mut child = Command::new(program)
            .args(args)
            .arg(command)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| SpawnError::Io {
                shell: program.clone(),
                source,
            })?;

        thread::spawn(move || {
            let _ = child.wait();
        });

        Ok(())
    }
}
