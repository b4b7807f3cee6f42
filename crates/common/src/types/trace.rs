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


use std::{fmt, ops::Deref};

use derive_more::From;
use serde::{Deserialize, Serialize};

/// A single entry of a TVM stack snapshot.
///
/// The engine never interprets stack entries; they are carried through so
/// that the UI can render the stack of the selected step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StackElement {
    /// The `null` value
    Null,
    /// Not-a-number integer produced by a quiet arithmetic overflow
    #[serde(rename = "nan")]
    NaN,
    /// Integer, kept in its decimal textual form (up to 257 bits)
    Int {
        /// Decimal representation
        value: String,
    },
    /// Cell, identified by its representation hash
    Cell {
        /// Hex-encoded cell hash
        hash: String,
    },
    /// Slice over a cell
    Slice {
        /// Hex-encoded hash of the underlying cell
        hash: String,
    },
    /// Cell builder
    Builder {
        /// Hex-encoded hash of the cell built so far
        hash: String,
    },
    /// Continuation
    Cont {
        /// Continuation kind as reported by the VM
        name: String,
    },
    /// Tuple of nested stack entries
    Tuple {
        /// Tuple components
        items: Vec<StackElement>,
    },
    /// Anything the toolchain could not classify
    Unknown {
        /// Raw textual form
        text: String,
    },
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::NaN => write!(f, "NaN"),
            Self::Int { value } => write!(f, "{value}"),
            Self::Cell { hash } => write!(f, "C{{{hash}}}"),
            Self::Slice { hash } => write!(f, "CS{{{hash}}}"),
            Self::Builder { hash } => write!(f, "BC{{{hash}}}"),
            Self::Cont { name } => write!(f, "Cont{{{name}}}"),
            Self::Tuple { items } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Unknown { text } => write!(f, "{text}"),
        }
    }
}

/// Assembly location attached to an executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepLocation {
    /// 0-based line in the generated assembly text
    pub line: u32,
}

/// One executed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Mnemonic of the executed instruction
    pub instruction_name: String,
    /// Stack snapshot after the instruction; top-of-stack is the last element
    #[serde(default)]
    pub stack: Vec<StackElement>,
    /// Gas charged for the instruction as reported by the VM
    pub gas_cost: u64,
    /// Present only when the instruction carried debug info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<StepLocation>,
}

impl Step {
    /// Create a step without a stack snapshot or location
    pub fn new(instruction_name: impl Into<String>, gas_cost: u64) -> Self {
        Self { instruction_name: instruction_name.into(), stack: Vec::new(), gas_cost, loc: None }
    }

    /// Attach a 0-based assembly line
    pub fn with_line(mut self, line: u32) -> Self {
        self.loc = Some(StepLocation { line });
        self
    }

    /// Attach a stack snapshot
    pub fn with_stack(mut self, stack: Vec<StackElement>) -> Self {
        self.stack = stack;
        self
    }

    /// 1-based assembly line of this step, if it has one
    pub fn asm_line(&self) -> Option<u32> {
        self.loc.map(|loc| loc.line + 1)
    }
}

/// One transaction's execution, in program order.
///
/// The position of a step in `steps` is its only identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, From)]
pub struct TraceInfo {
    /// Executed steps
    pub steps: Vec<Step>,
}

impl Deref for TraceInfo {
    type Target = [Step];

    fn deref(&self) -> &Self::Target {
        &self.steps
    }
}
