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


//! Domain types shared by the engine and the `tdb` binary.

/// Execution trace types: steps, stack snapshots and whole-transaction traces
pub mod trace;
pub use trace::*;

/// Compiler debug maps linking assembly instructions to higher-level source
pub mod mapping;
pub use mapping::*;

/// Tokenized VM log lines
pub mod log;
pub use log::*;

/// Exit codes and the standard TVM exit code table
pub mod exit_code;
pub use exit_code::*;
