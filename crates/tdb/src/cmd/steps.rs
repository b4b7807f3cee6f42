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


//! List the steps of a trace

use std::path::Path;

use eyre::Result;
use tdb_common::config::TdbConfig;
use tdb_engine::normalize_gas;

use super::open_stepper;
use crate::{session::SessionBundle, SourceArgs};

/// Print every bytecode step, or one line per source step in source mode
pub fn list_steps(path: &Path, args: &SourceArgs, config: &TdbConfig) -> Result<()> {
    let bundle = SessionBundle::load(path)?;
    let stepper = open_stepper(bundle, args, config);

    if stepper.is_source_mode() {
        for func_step in stepper.func_steps() {
            println!(
                "{}:{} -> step {}",
                stepper.primary_file(),
                func_step.line,
                func_step.step_index
            );
        }
        return Ok(());
    }

    let Some(trace) = stepper.inner().trace() else { return Ok(()) };
    let mut used = 0;
    for (index, step) in trace.iter().enumerate() {
        let gas = normalize_gas(step);
        used += gas;
        let line = step.asm_line().map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{index:>5}  {:<16} line {line:>5}  gas {gas:>5}  total {used}",
            step.instruction_name
        );
    }

    Ok(())
}
