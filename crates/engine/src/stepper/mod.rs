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


//! Step cursors over an execution trace.
//!
//! [`TraceStepper`] walks the bytecode-level steps one by one.
//! [`SourceLineStepper`] condenses them into one step per higher-level source
//! line and falls back to the bytecode cursor whenever source stepping is off.
//!
//! Navigation never fails: moves past either end, on an empty trace or to a
//! line nothing executed are ignored.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use itertools::Itertools;
use serde::Serialize;
use tdb_common::{
    config::StepperConfig,
    types::{StackElement, Step, TraceInfo},
};
use tracing::{debug, trace};

use crate::{
    gas,
    memo::{InputId, Memo},
};

mod source;
pub use source::*;

/// What caused the last cursor move. Purely a rendering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    /// Prev / next / first / last buttons or arrow keys
    Button,
    /// Clicking a line in an editor
    Click,
}

/// Keys the steppers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKey {
    /// Step backwards
    ArrowLeft,
    /// Step forwards
    ArrowRight,
    /// Anything else
    Other,
}

/// Where keyboard focus is when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFocus {
    /// Focus is on the page or an editor in read-only mode
    #[default]
    Document,
    /// Focus is inside a single-line text input
    TextInput,
    /// Focus is inside a multi-line text area
    TextArea,
}

impl KeyFocus {
    /// Whether arrow keys belong to a text field rather than to navigation
    pub fn is_text_entry(&self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea)
    }
}

/// Map from 1-based assembly line to the indices of the steps that executed it
pub type LineIndex = HashMap<u32, Vec<usize>>;

/// Build the line index of a trace
pub fn build_line_index(steps: &[Step]) -> LineIndex {
    steps
        .iter()
        .enumerate()
        .filter_map(|(index, step)| step.asm_line().map(|line| (line, index)))
        .into_group_map()
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    kind: TransitionType,
    at: Instant,
}

/// Bytecode-level cursor over one trace.
///
/// # Invariants
///
/// - `selected_step < total_steps()` whenever the trace is non-empty
/// - replacing the trace with a different allocation resets the cursor to `0`
#[derive(Debug)]
pub struct TraceStepper {
    trace: Option<Arc<TraceInfo>>,
    selected_step: usize,
    transition: Option<Transition>,
    transition_reset: Duration,
    line_index: Memo<InputId, LineIndex>,
}

impl TraceStepper {
    /// Create a stepper with no trace
    pub fn new(config: &StepperConfig) -> Self {
        Self {
            trace: None,
            selected_step: 0,
            transition: None,
            transition_reset: config.transition_reset(),
            line_index: Memo::new(),
        }
    }

    /// Create a stepper over `trace`
    pub fn with_trace(trace: Arc<TraceInfo>, config: &StepperConfig) -> Self {
        let mut stepper = Self::new(config);
        stepper.set_trace(Some(trace));
        stepper
    }

    /// Replace the trace. A different allocation resets the cursor and drops
    /// everything derived from the old trace.
    pub fn set_trace(&mut self, trace: Option<Arc<TraceInfo>>) {
        let same = match (&self.trace, &trace) {
            (Some(old), Some(new)) => Arc::ptr_eq(old, new),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }

        debug!(steps = trace.as_ref().map(|t| t.len()), "trace changed, resetting stepper");
        self.trace = trace;
        self.selected_step = 0;
        self.transition = None;
        self.line_index.reset();
    }

    /// The trace being stepped through
    pub fn trace(&self) -> Option<&Arc<TraceInfo>> {
        self.trace.as_ref()
    }

    fn steps(&self) -> &[Step] {
        self.trace.as_deref().map(|t| &t.steps[..]).unwrap_or_default()
    }

    /// Number of steps in the trace
    pub fn total_steps(&self) -> usize {
        self.steps().len()
    }

    /// Index of the selected step
    pub fn selected_step(&self) -> usize {
        self.selected_step
    }

    /// The selected step
    pub fn current_step(&self) -> Option<&Step> {
        self.steps().get(self.selected_step)
    }

    /// Stack snapshot of the selected step
    pub fn current_stack(&self) -> &[StackElement] {
        self.current_step().map(|s| &s.stack[..]).unwrap_or_default()
    }

    /// 1-based assembly line of the selected step
    pub fn highlight_line(&self) -> Option<u32> {
        self.current_step().and_then(Step::asm_line)
    }

    /// Normalized gas spent before the selected step
    pub fn used_gas(&self) -> u64 {
        gas::cumulative_gas(self.steps(), self.selected_step)
    }

    /// Whether there is a step before the selected one
    pub fn can_go_prev(&self) -> bool {
        self.total_steps() > 0 && self.selected_step > 0
    }

    /// Whether there is a step after the selected one
    pub fn can_go_next(&self) -> bool {
        self.selected_step + 1 < self.total_steps()
    }

    /// What caused the last move, until the reset delay has passed
    pub fn transition_type(&self) -> Option<TransitionType> {
        self.transition.filter(|t| t.at.elapsed() < self.transition_reset).map(|t| t.kind)
    }

    pub(crate) fn mark_transition(&mut self, kind: TransitionType) {
        self.transition = Some(Transition { kind, at: Instant::now() });
    }

    fn move_to(&mut self, index: usize, kind: TransitionType) -> bool {
        if index >= self.total_steps() || index == self.selected_step {
            return false;
        }
        trace!(from = self.selected_step, to = index, ?kind, "moving cursor");
        self.selected_step = index;
        self.mark_transition(kind);
        true
    }

    /// Select `index` without tagging a transition. Out-of-range indices are ignored.
    pub fn select_step(&mut self, index: usize) -> bool {
        if index >= self.total_steps() {
            return false;
        }
        self.selected_step = index;
        true
    }

    /// Step backwards
    pub fn handle_prev(&mut self) -> bool {
        self.can_go_prev() && self.move_to(self.selected_step - 1, TransitionType::Button)
    }

    /// Step forwards
    pub fn handle_next(&mut self) -> bool {
        self.can_go_next() && self.move_to(self.selected_step + 1, TransitionType::Button)
    }

    /// Jump to the first step
    pub fn go_to_first_step(&mut self) -> bool {
        self.can_go_prev() && self.move_to(0, TransitionType::Button)
    }

    /// Jump to the last step
    pub fn go_to_last_step(&mut self) -> bool {
        self.can_go_next() && self.move_to(self.total_steps() - 1, TransitionType::Button)
    }

    /// Indices of the steps that executed a 1-based assembly line
    pub fn steps_at_line(&mut self, line: u32) -> &[usize] {
        let Some(trace) = &self.trace else { return &[] };
        let key = InputId::of(trace);
        let index = self.line_index.get_or_compute(key, || build_line_index(&trace.steps));
        index.get(&line).map(Vec::as_slice).unwrap_or_default()
    }

    /// Jump to a step that executed a 1-based assembly line.
    ///
    /// Clicking the same line repeatedly walks through every step that
    /// executed it, wrapping around after the last one.
    pub fn find_step_by_line(&mut self, line: u32) -> bool {
        let selected = self.selected_step;
        let steps = self.steps_at_line(line);
        let Some(&first) = steps.first() else {
            trace!(line, "no step executed this line");
            return false;
        };

        let target = match steps.iter().position(|&s| s == selected) {
            Some(pos) if pos + 1 < steps.len() => steps[pos + 1],
            _ => first,
        };

        self.selected_step = target;
        self.mark_transition(TransitionType::Click);
        true
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
