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


use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use tdb_common::{
    config::StepperConfig,
    types::{DebugSectionId, DebugSectionInstructions, FuncMapping, StackElement, Step, TraceInfo},
};
use tracing::{debug, trace};

use super::{KeyFocus, NavigationKey, TraceStepper, TransitionType};
use crate::memo::{InputId, Memo};

/// The single bytecode step that represents one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuncStep {
    /// Line in the primary source file
    pub line: u32,
    /// Index of the representative step in the trace
    pub step_index: usize,
}

/// Condense a trace into one step per line of `primary_file`.
///
/// Each step's assembly line is resolved to the first debug section (in id
/// order) whose instructions contain that line, then to the section's source
/// location. Lines are listed in the order they are first executed and are
/// represented by the last step that executed them.
pub fn condense_steps(
    trace: &TraceInfo,
    mapping: &FuncMapping,
    instructions: &DebugSectionInstructions,
    primary_file: &str,
) -> Vec<FuncStep> {
    let mut section_of_line: HashMap<u32, DebugSectionId> = HashMap::new();
    for (&id, instrs) in instructions {
        for line in instrs.iter().filter_map(|i| i.asm_line()) {
            section_of_line.entry(line).or_insert(id);
        }
    }

    let mut order: Vec<u32> = Vec::new();
    let mut last_step: HashMap<u32, usize> = HashMap::new();
    for (index, step) in trace.iter().enumerate() {
        let Some(location) = step
            .asm_line()
            .and_then(|line| section_of_line.get(&line))
            .and_then(|&id| mapping.get(id))
            .filter(|loc| loc.is_in_file(primary_file))
        else {
            continue;
        };

        if last_step.insert(location.line, index).is_none() {
            order.push(location.line);
        }
    }

    order.into_iter().map(|line| FuncStep { line, step_index: last_step[&line] }).collect()
}

type CondensedKey = (InputId, InputId, InputId, String);

/// Source-level cursor wrapping a [`TraceStepper`].
///
/// While enabled and the condensed list is non-empty, bytecode navigation
/// follows the condensed cursor. Otherwise every call goes straight to the
/// wrapped stepper.
#[derive(Debug)]
pub struct SourceLineStepper {
    inner: TraceStepper,
    enabled: bool,
    primary_file: String,
    mapping: Option<Arc<FuncMapping>>,
    instructions: Option<Arc<DebugSectionInstructions>>,
    func_steps: Memo<CondensedKey, Vec<FuncStep>>,
    current_func_step_index: usize,
}

impl SourceLineStepper {
    /// Create a disabled stepper with no inputs
    pub fn new(config: &StepperConfig) -> Self {
        Self {
            inner: TraceStepper::new(config),
            enabled: false,
            primary_file: config.primary_source_file.clone(),
            mapping: None,
            instructions: None,
            func_steps: Memo::new(),
            current_func_step_index: 0,
        }
    }

    /// Turn source stepping on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!(enabled, "source stepping toggled");
            self.enabled = enabled;
            self.refresh();
        }
    }

    /// Whether source stepping is on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the debug pair
    pub fn set_debug_info(
        &mut self,
        mapping: Option<Arc<FuncMapping>>,
        instructions: Option<Arc<DebugSectionInstructions>>,
    ) {
        self.mapping = mapping;
        self.instructions = instructions;
        self.refresh();
    }

    /// Replace the trace. See [`TraceStepper::set_trace`].
    pub fn set_trace(&mut self, trace: Option<Arc<TraceInfo>>) {
        self.inner.set_trace(trace);
        self.refresh();
    }

    /// Change which source file is stepped through
    pub fn set_primary_file(&mut self, primary_file: impl Into<String>) {
        self.primary_file = primary_file.into();
        self.refresh();
    }

    /// Source file whose lines drive source stepping
    pub fn primary_file(&self) -> &str {
        &self.primary_file
    }

    /// The wrapped bytecode stepper
    pub fn inner(&self) -> &TraceStepper {
        &self.inner
    }

    /// Rebuild the condensed list if any input changed. A rebuild moves the
    /// func cursor back to the start.
    fn refresh(&mut self) {
        let (true, Some(trace), Some(mapping), Some(instructions)) =
            (self.enabled, self.inner.trace(), &self.mapping, &self.instructions)
        else {
            if self.func_steps.is_initialized() {
                trace!("source stepping unavailable, dropping condensed steps");
                self.func_steps.reset();
                self.current_func_step_index = 0;
            }
            return;
        };

        let key = (
            InputId::of(trace),
            InputId::of(mapping),
            InputId::of(instructions),
            self.primary_file.clone(),
        );
        if self.func_steps.get(&key).is_some() {
            return;
        }

        let primary_file = &self.primary_file;
        let steps = self
            .func_steps
            .get_or_compute(key, || condense_steps(trace, mapping, instructions, primary_file));
        debug!(lines = steps.len(), "condensed trace into source steps");
        self.current_func_step_index = 0;
        self.sync_inner();
    }

    fn active_func_steps(&self) -> Option<&[FuncStep]> {
        self.func_steps.current().map(Vec::as_slice).filter(|steps| !steps.is_empty())
    }

    fn sync_inner(&mut self) {
        let target = self
            .active_func_steps()
            .and_then(|steps| steps.get(self.current_func_step_index))
            .map(|step| step.step_index);
        if let Some(index) = target {
            self.inner.select_step(index);
        }
    }

    fn move_func_cursor(&mut self, index: usize, kind: TransitionType) -> bool {
        let total = self.total_func_steps();
        if index >= total || index == self.current_func_step_index {
            return false;
        }
        self.current_func_step_index = index;
        self.sync_inner();
        self.inner.mark_transition(kind);
        true
    }

    /// Condensed steps, empty when source stepping is off or unavailable
    pub fn func_steps(&self) -> &[FuncStep] {
        self.func_steps.current().map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of condensed steps
    pub fn total_func_steps(&self) -> usize {
        self.func_steps().len()
    }

    /// Position of the func cursor in the condensed list
    pub fn current_func_step_index(&self) -> usize {
        self.current_func_step_index
    }

    /// Source line of the condensed step under the cursor
    pub fn func_highlight_line(&self) -> Option<u32> {
        self.func_steps().get(self.current_func_step_index).map(|step| step.line)
    }

    /// Whether source stepping currently drives navigation
    pub fn is_source_mode(&self) -> bool {
        self.enabled && self.active_func_steps().is_some()
    }

    /// Move to the previous source line
    pub fn handle_prev_func(&mut self) -> bool {
        self.current_func_step_index > 0 &&
            self.move_func_cursor(self.current_func_step_index - 1, TransitionType::Button)
    }

    /// Move to the next source line
    pub fn handle_next_func(&mut self) -> bool {
        self.move_func_cursor(self.current_func_step_index + 1, TransitionType::Button)
    }

    /// Move to the first source line
    pub fn go_to_first_func_step(&mut self) -> bool {
        self.move_func_cursor(0, TransitionType::Button)
    }

    /// Move to the last source line
    pub fn go_to_last_func_step(&mut self) -> bool {
        let total = self.total_func_steps();
        total > 0 && self.move_func_cursor(total - 1, TransitionType::Button)
    }

    /// Jump to the condensed step of a source line
    pub fn find_func_step_by_line(&mut self, line: u32) -> bool {
        let Some(index) = self.func_steps().iter().position(|step| step.line == line) else {
            trace!(line, "source line was never executed");
            return false;
        };
        self.current_func_step_index = index;
        self.sync_inner();
        self.inner.mark_transition(TransitionType::Click);
        true
    }

    /// Index of the selected bytecode step
    pub fn selected_step(&self) -> usize {
        self.inner.selected_step()
    }

    /// The selected bytecode step
    pub fn current_step(&self) -> Option<&Step> {
        self.inner.current_step()
    }

    /// Stack snapshot of the selected step
    pub fn current_stack(&self) -> &[StackElement] {
        self.inner.current_stack()
    }

    /// Number of bytecode steps
    pub fn total_steps(&self) -> usize {
        self.inner.total_steps()
    }

    /// Normalized gas spent before the selected step
    pub fn used_gas(&self) -> u64 {
        self.inner.used_gas()
    }

    /// 1-based assembly line of the selected step
    pub fn highlight_line(&self) -> Option<u32> {
        self.inner.highlight_line()
    }

    /// What caused the last move, until the reset delay has passed
    pub fn transition_type(&self) -> Option<TransitionType> {
        self.inner.transition_type()
    }

    /// Whether there is a step, or a source line in source mode, before the current one
    pub fn can_go_prev(&self) -> bool {
        if self.is_source_mode() {
            self.current_func_step_index > 0
        } else {
            self.inner.can_go_prev()
        }
    }

    /// Whether there is a step, or a source line in source mode, after the current one
    pub fn can_go_next(&self) -> bool {
        if self.is_source_mode() {
            self.current_func_step_index + 1 < self.total_func_steps()
        } else {
            self.inner.can_go_next()
        }
    }

    /// Step backwards
    pub fn handle_prev(&mut self) -> bool {
        if self.is_source_mode() { self.handle_prev_func() } else { self.inner.handle_prev() }
    }

    /// Step forwards
    pub fn handle_next(&mut self) -> bool {
        if self.is_source_mode() { self.handle_next_func() } else { self.inner.handle_next() }
    }

    /// Jump to the first step
    pub fn go_to_first_step(&mut self) -> bool {
        if self.is_source_mode() {
            self.go_to_first_func_step()
        } else {
            self.inner.go_to_first_step()
        }
    }

    /// Jump to the last step
    pub fn go_to_last_step(&mut self) -> bool {
        if self.is_source_mode() {
            self.go_to_last_func_step()
        } else {
            self.inner.go_to_last_step()
        }
    }

    /// Jump to a step that executed a 1-based assembly line, cycling on
    /// repeated clicks. In source mode the func cursor follows when the new
    /// step is a condensed one.
    pub fn find_step_by_line(&mut self, line: u32) -> bool {
        if !self.inner.find_step_by_line(line) {
            return false;
        }
        self.follow_selected_step();
        true
    }

    /// Select a bytecode step by index. Out-of-range indices are ignored.
    pub fn select_step(&mut self, index: usize) -> bool {
        if !self.inner.select_step(index) {
            return false;
        }
        self.follow_selected_step();
        true
    }

    fn follow_selected_step(&mut self) {
        let selected = self.inner.selected_step();
        if let Some(index) =
            self.active_func_steps().and_then(|s| s.iter().position(|f| f.step_index == selected))
        {
            self.current_func_step_index = index;
        }
    }

    /// Arrow-key navigation, ignored while a text field has focus
    pub fn handle_key(&mut self, key: NavigationKey, focus: KeyFocus) -> bool {
        if focus.is_text_entry() {
            return false;
        }
        match key {
            NavigationKey::ArrowLeft => self.handle_prev(),
            NavigationKey::ArrowRight => self.handle_next(),
            NavigationKey::Other => false,
        }
    }
}
