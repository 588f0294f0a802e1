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

//! Mapping file loading.
//!
//! The mapping file is a human-edited document, typically Markdown, in which
//! list items bind a control to a shell command:
//!
//! ```text
//! # Transport
//!
//! - 41[note_on]=playerctl play-pause
//! - 7[control_change]=pactl set-sink-volume @DEFAULT_SINK@ $value%
//! ```
//!
//! Every line that does not have this exact shape (headings, prose, blank
//! lines) is ignored, so the file can carry its own documentation.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::EventKind;

static ENTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-\s*([0-9]+)\[(\w+)\]=(.+)$").expect("mapping entry pattern is valid")
});

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to open mapping file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read mapping file at line {line}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Lookup key of a mapping entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EventKey {
    pub(crate) control_id: u32,
    pub(crate) kind: String,
}

impl EventKey {
    pub(crate) fn new(control_id: u32, kind: impl Into<String>) -> Self {
        Self {
            control_id,
            kind: kind.into(),
        }
    }
}

/// Command templates keyed by control and event kind.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Default, Clone)]
pub(crate) struct MappingTable {
    entries: HashMap<EventKey, String>,
}

impl MappingTable {
    pub(crate) fn get(&self, control_id: u32, kind: EventKind) -> Option<&str> {
        self.entries
            .get(&EventKey::new(control_id, kind.as_str()))
            .map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an entry, replacing any earlier template for the same key.
    fn insert(&mut self, key: EventKey, template: String) -> Option<String> {
        self.entries.insert(key, template)
    }
}

/// Loads the mapping table from the file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Open`] if the file cannot be opened and
/// [`ConfigError::Read`] if reading it fails part way through.
pub(crate) fn load(path: &Path) -> Result<MappingTable, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    parse(BufReader::new(file))
}

/// Parses mapping entries from any line-oriented source.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// stray Latin-1 character in a heading only affects its own line.
pub(crate) fn parse<R: BufRead>(mut reader: R) -> Result<MappingTable, ConfigError> {
    let mut table = MappingTable::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        line_no += 1;
        let read = reader.read_until(b'\n', &mut buf).map_err(|source| ConfigError::Read {
            line: line_no,
            source,
        })?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);

        let Some((key, template)) = parse_line(&line, line_no) else {
            continue;
        };

        if key.kind.parse::<EventKind>().is_err() {
            warn!(
                line = line_no,
                kind = %key.kind,
                "Mapping entry uses an unknown event kind and will never match"
            );
        }

        if let Some(previous) = table.insert(key.clone(), template) {
            debug!(
                line = line_no,
                control_id = key.control_id,
                kind = %key.kind,
                previous = %previous,
                "Mapping entry overrides an earlier one"
            );
        }
    }

    Ok(table)
}

fn parse_line(line: &str, line_no: usize) -> Option<(EventKey, String)> {
    let captures = ENTRY_PATTERN.captures(line.trim())?;

    let control_id = match captures[1].parse::<u32>() {
        Ok(id) => id,
        Err(e) => {
            warn!(
                line = line_no,
                id = &captures[1],
                error = %e,
                "Skipping mapping entry with invalid control id"
            );
            return None;
        }
    };

    let key = EventKey::new(control_id, &captures[2]);
    let template = captures[3].trim().to_string();

    Some((key, template))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn parse_str(source: &str) -> MappingTable {
        parse(source.as_bytes()).unwrap()
    }

    #[test]
    fn well_formed_lines_produce_entries() {
        let table = parse_str(
            "- 64[note_on]=echo $value\n\
             -12[control_change]=  notify-send knob $value  \n\
             \t- 3[note_off]=true\n",
        );

        assert_eq!(table.len(), 3);
        assert_eq!(table.get(64, EventKind::NoteOn), Some("echo $value"));
        assert_eq!(
            table.get(12, EventKind::ControlChange),
            Some("notify-send knob $value")
        );
        assert_eq!(table.get(3, EventKind::NoteOff), Some("true"));
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let table = parse_str(
            "# Buttons\n\
             \n\
             Some prose about the surface.\n\
             * 1[note_on]=wrong marker\n\
             - x[note_on]=not a number\n\
             - 2[note on]=space in kind\n\
             - 3note_on=no brackets\n\
             - 4[note_on]\n\
             - 5[note_on]=\n\
             - -6[note_on]=negative\n",
        );

        assert!(table.is_empty());
    }

    #[test]
    fn later_duplicate_wins() {
        let table = parse_str(
            "- 64[note_on]=first\n\
             - 64[note_off]=other kind\n\
             - 64[note_on]=second\n",
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(64, EventKind::NoteOn), Some("second"));
        assert_eq!(table.get(64, EventKind::NoteOff), Some("other kind"));
    }

    #[test]
    fn overflowing_control_id_is_skipped() {
        let table = parse_str(
            "- 99999999999[note_on]=too big\n\
             - 1[note_on]=fine\n",
        );

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1, EventKind::NoteOn), Some("fine"));
    }

    #[test]
    fn unknown_kinds_are_kept() {
        let table = parse_str("- 1[knob_twist]=echo hi\n");

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1, EventKind::NoteOn), None);
    }

    #[test]
    fn template_keeps_inner_text_verbatim() {
        let table = parse_str("- 9[note_on]=sh -c 'echo a=b [c]' && echo $velocity\n");

        assert_eq!(
            table.get(9, EventKind::NoteOn),
            Some("sh -c 'echo a=b [c]' && echo $velocity")
        );
    }

    #[test]
    fn invalid_utf8_only_affects_its_own_line() {
        let source = b"# Caf\xe9 controls\n- 41[note_on]=playerctl play-pause\n";

        let table = parse(&source[..]).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(41, EventKind::NoteOn), Some("playerctl play-pause"));
    }

    #[test]
    fn invalid_utf8_in_template_is_replaced() {
        let table = parse(&b"- 2[note_on]=echo \xff\n"[..]).unwrap();

        assert_eq!(table.get(2, EventKind::NoteOn), Some("echo \u{fffd}"));
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let table = parse_str("- 5[note_off]=true");

        assert_eq!(table.get(5, EventKind::NoteOff), Some("true"));
    }

    #[test]
    fn control_id_must_be_ascii_digits() {
        let table = parse_str("- \u{663}[note_on]=arabic indic three\n");

        assert!(table.is_empty());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# Pads").unwrap();
        writeln!(file, "- 36[note_on]=aplay kick.wav").unwrap();

        let table = load(file.path()).unwrap();

        assert_eq!(table.get(36, EventKind::NoteOn), Some("aplay kick.wav"));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let err = load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Open { path: p, .. } if p == path));
    }
}
