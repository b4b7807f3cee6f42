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


//! Command modules for the TDB CLI

pub mod exit_code;
pub mod groups;
pub mod inspect;
pub mod steps;

pub use exit_code::show_exit_code;
pub use groups::show_groups;
pub use inspect::{inspect_step, Position};
pub use steps::list_steps;

use tdb_common::config::TdbConfig;
use tdb_engine::SourceLineStepper;

use crate::{session::SessionBundle, SourceArgs};

/// Build the stepper for a bundle, honoring the source stepping flags
fn open_stepper(bundle: SessionBundle, args: &SourceArgs, config: &TdbConfig) -> SourceLineStepper {
    let mut stepper = bundle.into_stepper(config);
    if let Some(file) = &args.source_file {
        stepper.set_primary_file(file.clone());
    }
    stepper.set_enabled(args.source);
    if args.source && !stepper.is_source_mode() {
        tracing::warn!(
            file = stepper.primary_file(),
            "no source line of the primary file was executed, stepping bytecode instead"
        );
    }
    stepper
}
