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


//! TDB - TON Debugger
//!
//! Step through a recorded TVM execution alongside the assembly and the
//! FunC / Tolk source that produced it.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use tdb_common::config::TdbConfig;

mod cmd;
mod session;

/// Command-line interface for TDB
#[derive(Debug, Parser)]
#[command(name = "tdb")]
#[command(about = "TON Debugger - Step through TVM execution traces alongside their source")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ~/.tdb.toml)
    #[arg(long, env = "TDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to a daily rolling file in the temp directory
    #[arg(long)]
    pub log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Source stepping flags shared by the stepping commands
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Step over source lines instead of single instructions
    #[arg(long)]
    pub source: bool,

    /// Source file to step through (default: stepper.primary_source_file)
    #[arg(long, requires = "source")]
    pub source_file: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the step under the cursor with its stack and gas
    Inspect {
        /// Session bundle (JSON)
        bundle: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Select a bytecode step by index
        #[arg(long, conflicts_with_all = ["line", "source_line"])]
        step: Option<usize>,

        /// Click a 1-based assembly line
        #[arg(long, conflicts_with = "source_line")]
        line: Option<u32>,

        /// How many times to click --line
        #[arg(long, default_value = "1", requires = "line")]
        clicks: usize,

        /// Jump to a source line
        #[arg(long, requires = "source")]
        source_line: Option<u32>,
    },
    /// List the steps of the trace
    Steps {
        /// Session bundle (JSON)
        bundle: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Resolve the exit code and the instruction that raised it
    ExitCode {
        /// Session bundle (JSON)
        bundle: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which source lines correlate with which assembly lines
    Groups {
        /// Session bundle (JSON)
        bundle: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = tdb_utils::init_logging("tdb", cli.log_file)?;

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Inspect { bundle, source, step, line, clicks, source_line } => {
            tracing::info!("Inspecting {:?}", bundle);
            let position = cmd::Position {
                step: *step,
                asm_line: *line,
                clicks: *clicks,
                source_line: *source_line,
            };
            cmd::inspect_step(bundle, source, &position, &config)
        }
        Commands::Steps { bundle, source } => cmd::list_steps(bundle, source, &config),
        Commands::ExitCode { bundle, json } => cmd::show_exit_code(bundle, *json),
        Commands::Groups { bundle, json } => cmd::show_groups(bundle, *json, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<TdbConfig> {
    match path {
        Some(path) => TdbConfig::load_from(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path:?}")),
        None => TdbConfig::load(),
    }
}
