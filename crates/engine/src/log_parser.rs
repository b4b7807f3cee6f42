// TDB - TON Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Tokenizer for verbose TVM logs.
//!
//! The engine only needs three kinds of lines out of a VM log: code location
//! markers, exception handler markers and everything else. [`VmLogParser`] is
//! the seam through which any toolchain tokenizer can be plugged in;
//! [`TvmLogParser`] understands the plain-text format printed by the TVM at
//! verbosity level 4 and above.

use regex::Regex;
use tdb_common::types::VmLogLine;
use tracing::trace;

/// Turns raw VM log text into typed lines, in log order.
pub trait VmLogParser {
    /// Tokenize the whole log
    fn parse(&self, log: &str) -> Vec<VmLogLine>;
}

/// Regex-based tokenizer for TVM text logs.
///
/// Recognized lines:
/// - `code cell hash: <HEX> offset: <N>`
/// - `handling exception code <N>: <message>`
#[derive(Debug, Clone)]
pub struct TvmLogParser {
    location: Regex,
    exception: Regex,
}

impl TvmLogParser {
    /// Create a parser
    pub fn new() -> Self {
        Self {
            location: Regex::new(r"^code cell hash:\s*([0-9A-Fa-f]+)\s+offset:\s*(\d+)")
                .expect("location pattern is valid"),
            exception: Regex::new(r"^handling exception code\s+(-?\d+)(?::\s*(.*))?$")
                .expect("exception pattern is valid"),
        }
    }

    fn parse_line(&self, line: &str) -> VmLogLine {
        if let Some(caps) = self.location.captures(line) {
            if let Ok(offset) = caps[2].parse() {
                return VmLogLine::Location { hash: caps[1].to_string(), offset };
            }
        }

        if let Some(caps) = self.exception.captures(line) {
            if let Ok(errno) = caps[1].parse() {
                let message = caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
                return VmLogLine::ExceptHandler { errno, message };
            }
        }

        VmLogLine::unknown(line)
    }
}

impl Default for TvmLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VmLogParser for TvmLogParser {
    fn parse(&self, log: &str) -> Vec<VmLogLine> {
        let lines: Vec<_> = log
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.parse_line(line))
            .collect();
        trace!(count = lines.len(), "tokenized vm log");
        lines
    }
}
