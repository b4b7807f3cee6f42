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


//! Resolve the exit code of a recorded execution

use std::path::Path;

use eyre::Result;

use crate::session::SessionBundle;

/// Print the exit code and the instruction that raised it
pub fn show_exit_code(path: &Path, json: bool) -> Result<()> {
    let bundle = SessionBundle::load(path)?;
    let exit_code = bundle.exit_code()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&exit_code)?);
        return Ok(());
    }

    let Some(exit) = exit_code else {
        println!("No unhandled exception, the compute phase completed");
        return Ok(());
    };

    println!("Exit code {}: {}", exit.num, exit.description);
    match exit.info {
        Some(info) => match info.asm_line() {
            Some(line) => println!("  raised by {} at asm line {line}", info.name),
            None => println!("  raised by {}", info.name),
        },
        None => println!("  the faulting instruction could not be resolved"),
    }

    Ok(())
}
