// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! JSON Lines event files.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;
use trackline_core::Event;

/// One non-blank line of an event file.
#[derive(Debug)]
pub struct EventLine {
    /// 1-based line number.
    pub line: usize,
    pub event: std::result::Result<Event, String>,
}

/// Read every non-blank line of `path` as a JSON event.
pub fn read_events(path: &Path) -> Result<Vec<EventLine>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open event file {}", path.display()))?;

    let mut lines = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        lines.push(EventLine {
            line: index + 1,
            event: serde_json::from_str::<Event>(&line).map_err(|e| e.to_string()),
        });
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_events_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"category":"cicd","action":"build","label":"Nightly"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(
            file,
            r#"{{"category":"search","action":"search","properties":{{"query":"payments","results":3}}}}"#
        )
        .unwrap();

        let lines = read_events(file.path()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].line, 1);
        assert_eq!(lines[0].event.as_ref().unwrap().name(), "cicd.build.nightly");
        assert_eq!(lines[1].line, 3);
        assert!(lines[1].event.is_err());
        assert_eq!(lines[2].line, 4);
        let event = lines[2].event.as_ref().unwrap();
        assert_eq!(event.property("results").and_then(|v| v.as_f64()), Some(3.0));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_events(Path::new("/nonexistent/events.jsonl")).is_err());
    }
}
