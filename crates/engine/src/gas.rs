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


//! Gas accounting over execution steps.
//!
//! The VM occasionally reports an inflated gas delta for a few instructions.
//! Such values are clamped to a nominal cost before being summed so that the
//! cumulative total stays meaningful.

use tdb_common::types::Step;

/// Gas costs above this value are treated as bogus
pub const GAS_CLAMP_THRESHOLD: u64 = 5000;

/// Nominal cost used in place of a clamped gas value
pub const CLAMPED_GAS_COST: u64 = 26;

/// Gas cost of a single step, with bogus values clamped.
pub fn normalize_gas(step: &Step) -> u64 {
    if step.gas_cost > GAS_CLAMP_THRESHOLD {
        CLAMPED_GAS_COST
    } else {
        step.gas_cost
    }
}

/// Sum of normalized gas over `steps[..upto_exclusive]`.
pub fn cumulative_gas(steps: &[Step], upto_exclusive: usize) -> u64 {
    steps.iter().take(upto_exclusive).map(normalize_gas).sum()
}

/// Normalized gas of the whole trace
pub fn total_gas(steps: &[Step]) -> u64 {
    cumulative_gas(steps, steps.len())
}
