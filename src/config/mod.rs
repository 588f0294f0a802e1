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

//! Application configuration.
//!
//! This module manages the application configuration file. The configuration
//! is read once at startup and passed by reference to whichever component
//! needs it, nothing reads it afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_NAME: &str = "rebutton";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) version: u32,
    /// Mapping file read in exec mode, relative paths resolve against the
    /// working directory.
    pub(crate) mapping_file: PathBuf,
    /// Input port selector, the first available port is used when unset.
    pub(crate) midi_port: Option<String>,
    /// Interpreter and its arguments, the command string is appended last.
    pub(crate) shell: Vec<String>,
    pub(crate) mqtt: MqttConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct MqttConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) topic: String,
    pub(crate) client_id: String,
    pub(crate) keep_alive_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            mapping_file: PathBuf::from("rebutton-config.md"),
            midi_port: None,
            shell: default_shell(),
            mqtt: MqttConfig::default(),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            topic: "reos/key/atom".to_string(),
            client_id: "rebutton".to_string(),
            keep_alive_secs: 60,
        }
    }
}

#[cfg(windows)]
fn default_shell() -> Vec<String> {
    vec!["cmd".to_string(), "/C".to_string()]
}

#[cfg(not(windows))]
fn default_shell() -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string()]
}

/// Loads the configuration, from `path` if given or from the per-user
/// configuration directory otherwise.
///
/// A configuration file that cannot be read or parsed is reported and the
/// defaults are used instead.
pub(crate) fn load_config(path: Option<&Path>) -> AppConfig {
    let result = match path {
        Some(path) => confy::load_path(path),
        None => confy::load(CONFIG_NAME, None),
    };

    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load configuration, using defaults");
        AppConfig::default()
    })
}

pub(crate) fn config_path() -> Result<PathBuf, confy::ConfyError> {
    confy::get_configuration_file_path(CONFIG_NAME, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_broker_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.mqtt.host, "localhost");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.topic, "reos/key/atom");
        assert_eq!(config.mapping_file, PathBuf::from("rebutton-config.md"));
        assert!(config.midi_port.is_none());
        assert!(!config.shell.is_empty());
    }

    #[test]
    fn load_path_creates_and_reads_back_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rebutton.toml");

        let config = load_config(Some(&path));

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rebutton.toml");
        std::fs::write(&path, "midi_port = \"nanoKONTROL\"\n\n[mqtt]\nport = 1884\n").unwrap();

        let config = load_config(Some(&path));

        assert_eq!(config.midi_port.as_deref(), Some("nanoKONTROL"));
        assert_eq!(config.mqtt.port, 1884);
        assert_eq!(config.mqtt.host, "localhost");
        assert_eq!(config.version, 1);
    }
}
