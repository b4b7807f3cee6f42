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


//! Print the assembly/source highlight groups

use std::path::Path;

use eyre::Result;
use itertools::Itertools;
use tdb_common::config::TdbConfig;

use crate::session::SessionBundle;

/// Print one line per correlation group
pub fn show_groups(path: &Path, json: bool, config: &TdbConfig) -> Result<()> {
    let bundle = SessionBundle::load(path)?;
    let correlation = bundle.correlation(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&correlation.groups)?);
        return Ok(());
    }

    if correlation.groups.is_empty() {
        println!("No source line maps to assembly");
        return Ok(());
    }

    for group in &correlation.groups {
        println!(
            "{} {}  source [{}]  asm [{}]",
            group.class_name,
            group.color,
            group.func_lines.iter().join(", "),
            group.asm_lines.iter().join(", ")
        );
    }

    Ok(())
}
