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


//! Configuration system for TDB
//!
//! Manages user preferences for correlation highlighting and stepping. The
//! configuration lives in `~/.tdb.toml` and is created with defaults on first
//! load.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::DEFAULT_STDLIB_MARKERS;

/// Default highlight palette, one color per correlation group
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
    "#6366f1", "#84cc16",
];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TdbConfig {
    /// Correlation graph settings
    pub correlation: CorrelationConfig,
    /// Stepper settings
    pub stepper: StepperConfig,
}

/// Correlation graph configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Colors assigned to highlight groups, cycled in order
    pub palette: Vec<String>,
    /// Substrings marking standard-library files excluded from correlation
    pub stdlib_markers: Vec<String>,
}

/// Stepper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepperConfig {
    /// How long a transition tag stays visible, in milliseconds
    pub transition_reset_ms: u64,
    /// Source file whose lines drive source-level stepping
    pub primary_source_file: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            stdlib_markers: DEFAULT_STDLIB_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self { transition_reset_ms: 300, primary_source_file: "main.tolk".to_string() }
    }
}

impl StepperConfig {
    /// Transition reset delay as a duration
    pub fn transition_reset(&self) -> Duration {
        Duration::from_millis(self.transition_reset_ms)
    }
}

impl TdbConfig {
    /// Get the config file path (~/.tdb.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".tdb.toml"))
    }

    /// Load configuration from the default path, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found, creating default at {:?}", config_path);
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {path:?}"))?;

        let config: Self =
            toml::from_str(&content).wrap_err("Failed to parse config file as TOML")?;
        config.validate()?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).wrap_err("Failed to serialize config to TOML")?;

        fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.correlation.palette.is_empty() {
            eyre::bail!("correlation.palette must contain at least one color");
        }
        Ok(())
    }
}
