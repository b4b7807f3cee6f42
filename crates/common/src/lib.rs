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


//! TDB Common - Shared types and configuration for TDB components
//!
//! This crate holds the data produced by the external TVM toolchain (traces,
//! debug maps, tokenized VM logs) together with the user configuration, so
//! that the engine and the `tdb` binary agree on one vocabulary.

/// Domain types: execution traces, debug maps, VM log lines and exit codes
pub mod types;

/// User configuration loaded from `~/.tdb.toml`
pub mod config;

pub use config::*;
