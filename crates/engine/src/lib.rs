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


//! Trace correlation and stepping engine for TVM executions.
//!
//! The engine never runs the VM. It takes a recorded trace, the VM log and the
//! compiler's debug maps, and derives everything a debugger view needs from
//! them: normalized gas totals, the instruction that raised the terminating
//! exception, assembly/source highlight groups and cycling step cursors.

pub mod correlation;
pub use correlation::*;

pub mod exit_code;
pub use exit_code::*;

pub mod gas;
pub use gas::*;

pub mod log_parser;
pub use log_parser::*;

pub mod memo;
pub use memo::*;

pub mod stepper;
pub use stepper::*;
