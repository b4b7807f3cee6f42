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


//! Session bundles: everything one debugging session needs, in one JSON file.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tdb_common::{
    config::TdbConfig,
    types::{CellMapping, DebugSectionInstructions, ExitCode, FuncMapping, TraceInfo},
};
use tdb_engine::{find_exit_code, SourceCorrelation, SourceLineStepper, TvmLogParser};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading or querying a session bundle
#[derive(Debug, Error)]
pub enum SessionError {
    /// The bundle file could not be read
    #[error("failed to read session bundle {path:?}")]
    Read {
        /// Bundle path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The bundle is not valid JSON or does not have the expected shape
    #[error("invalid session bundle {path:?}")]
    Decode {
        /// Bundle path
        path: PathBuf,
        /// Underlying decoding error
        #[source]
        source: serde_json::Error,
    },

    /// A command needs a part of the bundle that is absent
    #[error("session bundle has no `{0}`")]
    Missing(&'static str),

    /// The requested step does not exist
    #[error("step {step} is out of range, the trace has {total} steps")]
    StepOutOfRange {
        /// Requested step index
        step: usize,
        /// Number of steps in the trace
        total: usize,
    },
}

/// A recorded transaction together with its VM log and debug maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionBundle {
    /// Executed steps
    pub trace: TraceInfo,
    /// Raw verbose VM log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_log: Option<String>,
    /// Code locations reported by the VM, resolved to instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_mapping: Option<CellMapping>,
    /// Debug sections to source locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func_mapping: Option<FuncMapping>,
    /// Debug sections to emitted instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_sections: Option<DebugSectionInstructions>,
}

impl SessionBundle {
    /// Load a bundle from a JSON file
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = fs::read_to_string(path)
            .map_err(|source| SessionError::Read { path: path.to_path_buf(), source })?;
        let bundle: Self = serde_json::from_str(&content)
            .map_err(|source| SessionError::Decode { path: path.to_path_buf(), source })?;

        info!(steps = bundle.trace.len(), "loaded session bundle from {:?}", path);
        Ok(bundle)
    }

    /// Exit code of the recorded execution, `None` when it completed
    pub fn exit_code(&self) -> Result<Option<ExitCode>, SessionError> {
        let log = self.vm_log.as_deref().ok_or(SessionError::Missing("vm_log"))?;
        let mapping = self.cell_mapping.clone().unwrap_or_default();
        Ok(find_exit_code(log, &TvmLogParser::new(), &mapping))
    }

    /// Correlation graph of the debug maps, if both are present
    pub fn correlation(&self, config: &TdbConfig) -> Result<SourceCorrelation, SessionError> {
        let mapping = self.func_mapping.as_ref().ok_or(SessionError::Missing("func_mapping"))?;
        let sections =
            self.debug_sections.as_ref().ok_or(SessionError::Missing("debug_sections"))?;
        Ok(SourceCorrelation::build(mapping, sections, &config.correlation))
    }

    /// Consume the bundle into a stepper positioned at the first step
    pub fn into_stepper(self, config: &TdbConfig) -> SourceLineStepper {
        let mut stepper = SourceLineStepper::new(&config.stepper);
        stepper.set_trace(Some(Arc::new(self.trace)));
        stepper.set_debug_info(self.func_mapping.map(Arc::new), self.debug_sections.map(Arc::new));
        debug!(steps = stepper.total_steps(), "stepper ready");
        stepper
    }
}
