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


//! Show the debugger view at one position of the trace

use std::path::Path;

use eyre::Result;
use tdb_common::config::TdbConfig;
use tdb_engine::SourceLineStepper;

use super::open_stepper;
use crate::{
    session::{SessionBundle, SessionError},
    SourceArgs,
};

/// Where to put the cursor before printing
#[derive(Debug, Clone, Default)]
pub struct Position {
    /// Bytecode step index
    pub step: Option<usize>,
    /// 1-based assembly line to click
    pub asm_line: Option<u32>,
    /// How many times to click `asm_line`
    pub clicks: usize,
    /// Source line to jump to
    pub source_line: Option<u32>,
}

/// Print the step under the cursor, its stack and gas, and the exit code
pub fn inspect_step(
    path: &Path,
    args: &SourceArgs,
    position: &Position,
    config: &TdbConfig,
) -> Result<()> {
    let bundle = SessionBundle::load(path)?;
    let exit_code = bundle.vm_log.is_some().then(|| bundle.exit_code()).transpose()?.flatten();

    let mut stepper = open_stepper(bundle, args, config);
    move_cursor(&mut stepper, position)?;

    let total = stepper.total_steps();
    let Some(step) = stepper.current_step() else {
        println!("Trace is empty");
        return Ok(());
    };

    println!("Step {}/{}: {}", stepper.selected_step() + 1, total, step.instruction_name);
    match stepper.highlight_line() {
        Some(line) => println!("  asm line: {line}"),
        None => println!("  asm line: -"),
    }
    println!("  gas used: {}", stepper.used_gas());

    if stepper.is_source_mode() {
        if let Some(line) = stepper.func_highlight_line() {
            println!(
                "  source: {}:{} ({}/{})",
                stepper.primary_file(),
                line,
                stepper.current_func_step_index() + 1,
                stepper.total_func_steps()
            );
        }
    }

    let stack = stepper.current_stack();
    println!("  stack ({}):", stack.len());
    for (i, element) in stack.iter().enumerate() {
        println!("    [{i}] {element}");
    }

    if let Some(exit) = exit_code {
        println!("Exit code {}: {}", exit.num, exit.description);
    }

    Ok(())
}

fn move_cursor(stepper: &mut SourceLineStepper, position: &Position) -> Result<()> {
    if let Some(step) = position.step {
        if !stepper.select_step(step) {
            return Err(SessionError::StepOutOfRange { step, total: stepper.total_steps() }.into());
        }
    }

    if let Some(line) = position.asm_line {
        for _ in 0..position.clicks {
            if !stepper.find_step_by_line(line) {
                tracing::warn!(line, "assembly line was never executed");
                break;
            }
        }
    }

    if let Some(line) = position.source_line {
        if !stepper.find_func_step_by_line(line) {
            tracing::warn!(line, "source line was never executed");
        }
    }

    Ok(())
}
