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


//! Exit code resolution from VM logs.
//!
//! The exception marker and the last executed location are not guaranteed to
//! be adjacent in the log. The faulting instruction is the last location seen
//! before the last exception, so the log is scanned backwards twice: once for
//! the exception and then, from that point, for the location.

use tdb_common::types::{
    exit_code_description, ExitCode, MappingInfo, VmLogLine, OUT_OF_GAS_EXIT_CODE,
};
use tracing::debug;

use crate::log_parser::VmLogParser;

/// Text the VM prints when it runs out of gas without a handler
pub const OUT_OF_GAS_MARKER: &str = "unhandled out-of-gas exception";

/// Resolve the exit code of a tokenized VM log.
///
/// Returns `None` when the log contains no exception marker. A log that was
/// truncated before its exception looks exactly like a successful run.
pub fn resolve_exit_code(lines: &[VmLogLine], mapping: &impl MappingInfo) -> Option<ExitCode> {
    let mut reversed = lines.iter().rev();

    let (num, message) = reversed.by_ref().find_map(|line| match line {
        VmLogLine::ExceptHandler { errno, message } => Some((*errno, message.as_str())),
        VmLogLine::Unknown { text } if text.contains(OUT_OF_GAS_MARKER) => {
            Some((OUT_OF_GAS_EXIT_CODE, ""))
        }
        _ => None,
    })?;

    let Some((hash, offset)) = reversed.find_map(|line| match line {
        VmLogLine::Location { hash, offset } => Some((hash.as_str(), *offset)),
        _ => None,
    }) else {
        debug!(num, "exception marker has no preceding code location");
        return None;
    };

    let info = match mapping.resolve(hash, offset) {
        Some((instructions, index)) => instructions.get(index).cloned(),
        None => None,
    };
    if info.is_none() {
        debug!(num, hash, offset, "faulting instruction could not be resolved");
    }

    let description = if message.is_empty() {
        exit_code_description(num).to_string()
    } else {
        message.to_string()
    };

    Some(ExitCode { num, description, info })
}

/// Tokenize a raw VM log with `parser` and resolve its exit code.
pub fn find_exit_code(
    log: &str,
    parser: &impl VmLogParser,
    mapping: &impl MappingInfo,
) -> Option<ExitCode> {
    resolve_exit_code(&parser.parse(log), mapping)
}
