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


use std::{collections::BTreeSet, sync::Arc};

use tdb_common::{
    config::CorrelationConfig,
    types::{DebugSectionInstructions, FuncMapping},
};
use tracing::debug;

use super::{HighlightGroup, SourceCorrelation};
use crate::memo::{InputId, Memo};

/// The line currently under the pointer, in either editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoveredLine {
    /// A line of the higher-level source
    Func(u32),
    /// A line of the assembly listing
    Asm(u32),
}

/// Inclusive range of lines currently visible in an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line
    pub first_visible: u32,
    /// Last visible line
    pub last_visible: u32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(first_visible: u32, last_visible: u32) -> Self {
        Self { first_visible, last_visible }
    }

    /// Whether `line` is on screen
    pub fn contains(&self, line: u32) -> bool {
        (self.first_visible..=self.last_visible).contains(&line)
    }
}

/// Line an editor should scroll to so that `lines` become visible.
///
/// The first (smallest) line is the target, and only when it is off screen.
pub fn scroll_target<'a>(
    lines: impl IntoIterator<Item = &'a u32>,
    viewport: Viewport,
) -> Option<u32> {
    let target = lines.into_iter().min().copied()?;
    (!viewport.contains(target)).then_some(target)
}

type GraphKey = (InputId, InputId);

/// Stateful correlation view shared by the source and assembly editors.
///
/// Owns the debug inputs it was given, the memoized graph built from them and
/// the hover position. The graph is rebuilt only when one of the inputs is
/// replaced by a different allocation.
#[derive(Debug)]
pub struct SourceCorrelationGraph {
    config: CorrelationConfig,
    inputs: Option<(Arc<FuncMapping>, Arc<DebugSectionInstructions>)>,
    graph: Memo<GraphKey, SourceCorrelation>,
    hovered: Option<HoveredLine>,
}

impl SourceCorrelationGraph {
    /// Create an empty view
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config, inputs: None, graph: Memo::new(), hovered: None }
    }

    /// Replace the debug inputs.
    ///
    /// Passing `None` for either input clears the view. Hover state is dropped
    /// whenever the graph changes.
    pub fn set_inputs(
        &mut self,
        mapping: Option<Arc<FuncMapping>>,
        instructions: Option<Arc<DebugSectionInstructions>>,
    ) {
        let (Some(mapping), Some(instructions)) = (mapping, instructions) else {
            if self.inputs.take().is_some() {
                debug!("correlation inputs cleared");
            }
            self.graph.reset();
            self.hovered = None;
            return;
        };

        let key = (InputId::of(&mapping), InputId::of(&instructions));
        if self.graph.get(&key).is_none() {
            self.hovered = None;
        }

        let config = &self.config;
        self.graph.get_or_compute(key, || SourceCorrelation::build(&mapping, &instructions, config));
        self.inputs = Some((mapping, instructions));
    }

    /// The current graph, if inputs are present
    pub fn correlation(&self) -> Option<&SourceCorrelation> {
        self.inputs.as_ref().and(self.graph.current())
    }

    /// Highlight groups for the source editor
    pub fn func_highlight_groups(&self) -> Vec<HighlightGroup> {
        self.correlation().map(SourceCorrelation::func_highlight_groups).unwrap_or_default()
    }

    /// Highlight groups for the assembly editor
    pub fn asm_highlight_groups(&self) -> Vec<HighlightGroup> {
        self.correlation().map(SourceCorrelation::asm_highlight_groups).unwrap_or_default()
    }

    /// Pointer entered (`Some`) or left (`None`) a source line
    pub fn handle_func_line_hover(&mut self, line: Option<u32>) {
        self.hovered = line.map(HoveredLine::Func);
    }

    /// Pointer entered (`Some`) or left (`None`) an assembly line
    pub fn handle_asm_line_hover(&mut self, line: Option<u32>) {
        self.hovered = line.map(HoveredLine::Asm);
    }

    /// The line currently hovered
    pub fn hovered(&self) -> Option<HoveredLine> {
        self.hovered
    }

    /// Source lines to emphasize for the current hover
    pub fn func_hovered_lines(&self) -> Vec<u32> {
        let Some(graph) = self.correlation() else { return Vec::new() };
        match self.hovered {
            Some(HoveredLine::Func(line)) if graph.func_to_asm.contains_key(&line) => vec![line],
            Some(HoveredLine::Asm(line)) => lines_of(graph.func_lines_for(line)),
            _ => Vec::new(),
        }
    }

    /// Assembly lines to emphasize for the current hover
    pub fn asm_hovered_lines(&self) -> Vec<u32> {
        let Some(graph) = self.correlation() else { return Vec::new() };
        match self.hovered {
            Some(HoveredLine::Asm(line)) if graph.asm_to_func.contains_key(&line) => vec![line],
            Some(HoveredLine::Func(line)) => lines_of(graph.asm_lines_for(line)),
            _ => Vec::new(),
        }
    }

    /// Where the assembly editor should scroll while a source line is hovered
    pub fn asm_scroll_target(&self, viewport: Viewport) -> Option<u32> {
        match self.hovered? {
            HoveredLine::Func(line) => scroll_target(self.correlation()?.asm_lines_for(line)?, viewport),
            HoveredLine::Asm(_) => None,
        }
    }

    /// Where the source editor should scroll while an assembly line is hovered
    pub fn func_scroll_target(&self, viewport: Viewport) -> Option<u32> {
        match self.hovered? {
            HoveredLine::Asm(line) => scroll_target(self.correlation()?.func_lines_for(line)?, viewport),
            HoveredLine::Func(_) => None,
        }
    }
}

fn lines_of(lines: Option<&BTreeSet<u32>>) -> Vec<u32> {
    lines.map(|lines| lines.iter().copied().collect()).unwrap_or_default()
}
