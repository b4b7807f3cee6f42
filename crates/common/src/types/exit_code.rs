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

use super::InstructionInfo;

/// Exit code the VM reports for an unhandled out-of-gas exception. It is
/// negative so that contract code cannot throw it on purpose.
pub const OUT_OF_GAS_EXIT_CODE: i32 = -14;

/// Failure of a transaction's compute phase, localized to an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitCode {
    /// Signed exit code
    pub num: i32,
    /// Human-readable description
    pub description: String,
    /// Instruction that raised the exception, when it could be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<InstructionInfo>,
}

/// Description of a standard TVM exit code.
///
/// Codes outside the reserved ranges are user-defined and described generically.
pub fn exit_code_description(num: i32) -> &'static str {
    match num {
        0 => "Standard successful execution",
        1 => "Alternative successful execution",
        2 => "Stack underflow",
        3 => "Stack overflow",
        4 => "Integer overflow",
        5 => "Integer out of expected range",
        6 => "Invalid opcode",
        7 => "Type check error",
        8 => "Cell overflow",
        9 => "Cell underflow",
        10 => "Dictionary error",
        11 => "Unknown error",
        12 => "Fatal error",
        13 | OUT_OF_GAS_EXIT_CODE => "Out of gas error",
        14 => "Virtualization error",
        32 => "Action list is invalid",
        33 => "Action list is too long",
        34 => "Action is invalid or not supported",
        35 => "Invalid source address in outbound message",
        36 => "Invalid destination address in outbound message",
        37 => "Not enough Toncoin",
        38 => "Not enough extra currencies",
        39 => "Outbound message does not fit into a cell after rewriting",
        40 => "Cannot process a message",
        41 => "Library reference is null",
        42 => "Library change action error",
        43 => "Exceeded maximum number of cells in the library or maximum depth of the Merkle tree",
        50 => "Account state size exceeded limits",
        _ => "User-defined error",
    }
}
