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


use serde::{Deserialize, Serialize};

/// One tokenized line of a verbose VM log.
///
/// The serialized form keeps the toolchain's `$` discriminant so that logs
/// tokenized elsewhere can be fed to the engine unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$")]
pub enum VmLogLine {
    /// The VM entered a code location
    #[serde(rename = "VmLoc")]
    Location {
        /// Hex-encoded hash of the executing code cell
        hash: String,
        /// Bit offset inside the code cell
        offset: u32,
    },
    /// The VM started handling an exception
    #[serde(rename = "VmExceptionHandler")]
    ExceptHandler {
        /// Exit code carried by the exception
        errno: i32,
        /// Message printed next to the code, if any
        #[serde(default)]
        message: String,
    },
    /// Any other log output
    #[serde(rename = "VmUnknown")]
    Unknown {
        /// Raw line text
        text: String,
    },
}

impl VmLogLine {
    /// Create a location marker
    pub fn location(hash: impl Into<String>, offset: u32) -> Self {
        Self::Location { hash: hash.into(), offset }
    }

    /// Create an exception handler marker without a message
    pub fn except_handler(errno: i32) -> Self {
        Self::ExceptHandler { errno, message: String::new() }
    }

    /// Create an unrecognized line
    pub fn unknown(text: impl Into<String>) -> Self {
        Self::Unknown { text: text.into() }
    }
}
