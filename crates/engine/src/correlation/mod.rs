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


//! Correlation between assembly lines and higher-level source lines.
//!
//! The compiler's debug map links debug sections to source locations, and the
//! assembler links debug sections to emitted instructions. Joining both gives
//! a bipartite graph between source ("func") lines and assembly lines. Its
//! connected components become highlight groups: hovering any line of a group
//! lights up its counterparts in the other editor.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde::Serialize;
use tdb_common::{
    config::{CorrelationConfig, DEFAULT_PALETTE},
    types::{DebugLocation, DebugSectionInstructions, FuncMapping},
};
use tracing::{debug, trace};

mod view;
pub use view::*;

/// Number of distinct CSS classes highlight groups cycle through
pub const GROUP_CLASS_COUNT: usize = 10;

/// Adjacency from a line on one side to the lines it is linked to on the other
pub type LineAdjacency = BTreeMap<u32, BTreeSet<u32>>;

/// One connected cluster of the correlation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingGroup {
    /// Source lines of the cluster, ascending
    pub func_lines: Vec<u32>,
    /// Assembly lines of the cluster, ascending
    pub asm_lines: Vec<u32>,
    /// Highlight color
    pub color: String,
    /// Stable CSS class name, `source-map-group-{n}`
    pub class_name: String,
}

/// One side of a [`MappingGroup`], as rendered by a single editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightGroup {
    /// Lines to highlight, ascending
    pub lines: Vec<u32>,
    /// Highlight color
    pub color: String,
    /// CSS class name
    pub class_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Func(u32),
    Asm(u32),
}

/// The correlation graph of one compiled contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCorrelation {
    /// Connected components with both a source and an assembly side
    pub groups: Vec<MappingGroup>,
    /// Source line to linked assembly lines
    pub func_to_asm: LineAdjacency,
    /// Assembly line to linked source lines
    pub asm_to_func: LineAdjacency,
}

impl SourceCorrelation {
    /// Build the graph and partition it into highlight groups.
    pub fn build(
        mapping: &FuncMapping,
        instructions: &DebugSectionInstructions,
        config: &CorrelationConfig,
    ) -> Self {
        let (func_to_asm, asm_to_func) =
            build_adjacency(mapping, instructions, &config.stdlib_markers);
        let groups = partition(&func_to_asm, &asm_to_func, &config.palette);

        debug!(
            func_lines = func_to_asm.len(),
            asm_lines = asm_to_func.len(),
            groups = groups.len(),
            "built source correlation"
        );

        Self { groups, func_to_asm, asm_to_func }
    }

    /// Assembly lines linked to a source line
    pub fn asm_lines_for(&self, func_line: u32) -> Option<&BTreeSet<u32>> {
        self.func_to_asm.get(&func_line)
    }

    /// Source lines linked to an assembly line
    pub fn func_lines_for(&self, asm_line: u32) -> Option<&BTreeSet<u32>> {
        self.asm_to_func.get(&asm_line)
    }

    /// Highlight groups for the source editor
    pub fn func_highlight_groups(&self) -> Vec<HighlightGroup> {
        self.groups
            .iter()
            .map(|g| HighlightGroup {
                lines: g.func_lines.clone(),
                color: g.color.clone(),
                class_name: g.class_name.clone(),
            })
            .collect()
    }

    /// Highlight groups for the assembly editor
    pub fn asm_highlight_groups(&self) -> Vec<HighlightGroup> {
        self.groups
            .iter()
            .map(|g| HighlightGroup {
                lines: g.asm_lines.clone(),
                color: g.color.clone(),
                class_name: g.class_name.clone(),
            })
            .collect()
    }
}

fn link(func_to_asm: &mut LineAdjacency, asm_to_func: &mut LineAdjacency, func: u32, asm: u32) {
    func_to_asm.entry(func).or_default().insert(asm);
    asm_to_func.entry(asm).or_default().insert(func);
}

/// Join debug sections with their instructions into the two adjacency maps.
///
/// Sections without instructions (inlined call boundaries and the like) are
/// parked until the next section that does emit instructions, and are then
/// linked to that section's assembly lines as well.
fn build_adjacency<S: AsRef<str>>(
    mapping: &FuncMapping,
    instructions: &DebugSectionInstructions,
    stdlib_markers: &[S],
) -> (LineAdjacency, LineAdjacency) {
    let mut func_to_asm = LineAdjacency::new();
    let mut asm_to_func = LineAdjacency::new();
    let mut waiting_sections: Vec<&DebugLocation> = Vec::new();

    for (id, location) in &mapping.locations {
        let section_instructions = instructions.get(id).filter(|instrs| !instrs.is_empty());

        let Some(section_instructions) = section_instructions else {
            if location.is_excluded(stdlib_markers) {
                trace!(section = id, file = %location.file, "skipping excluded section");
            } else {
                waiting_sections.push(location);
            }
            continue;
        };

        let asm_lines: Vec<u32> =
            section_instructions.iter().filter_map(|instr| instr.asm_line()).collect();

        if asm_lines.is_empty() {
            if !waiting_sections.is_empty() {
                trace!(section = id, dropped = waiting_sections.len(), "resetting waiting sections");
                waiting_sections.clear();
            }
            continue;
        }

        for &asm_line in &asm_lines {
            link(&mut func_to_asm, &mut asm_to_func, location.line, asm_line);
            for waiting in &waiting_sections {
                link(&mut func_to_asm, &mut asm_to_func, waiting.line, asm_line);
            }
        }
        waiting_sections.clear();
    }

    (func_to_asm, asm_to_func)
}

/// Split the bipartite graph into connected components.
fn partition(
    func_to_asm: &LineAdjacency,
    asm_to_func: &LineAdjacency,
    palette: &[String],
) -> Vec<MappingGroup> {
    let mut visited: HashSet<Node> = HashSet::new();
    let mut groups = Vec::new();

    for &start in func_to_asm.keys() {
        if visited.contains(&Node::Func(start)) {
            continue;
        }

        let mut func_lines = BTreeSet::new();
        let mut asm_lines = BTreeSet::new();
        let mut queue = VecDeque::from([Node::Func(start)]);
        visited.insert(Node::Func(start));

        while let Some(node) = queue.pop_front() {
            let neighbors: Vec<Node> = match node {
                Node::Func(line) => {
                    func_lines.insert(line);
                    func_to_asm.get(&line).into_iter().flatten().map(|&n| Node::Asm(n)).collect()
                }
                Node::Asm(line) => {
                    asm_lines.insert(line);
                    asm_to_func.get(&line).into_iter().flatten().map(|&n| Node::Func(n)).collect()
                }
            };
            for neighbor in neighbors {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        if func_lines.is_empty() || asm_lines.is_empty() {
            continue;
        }

        let color_index = groups.len();
        groups.push(MappingGroup {
            func_lines: func_lines.into_iter().collect(),
            asm_lines: asm_lines.into_iter().collect(),
            color: group_color(palette, color_index),
            class_name: format!("source-map-group-{}", color_index % GROUP_CLASS_COUNT),
        });
    }

    groups
}

fn group_color(palette: &[String], color_index: usize) -> String {
    if palette.is_empty() {
        DEFAULT_PALETTE[color_index % DEFAULT_PALETTE.len()].to_string()
    } else {
        palette[color_index % palette.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdb_common::types::InstructionInfo;

    fn instrs(asm_lines: &[u32]) -> Vec<InstructionInfo> {
        // 1-based asm lines in, 0-based locations stored
        asm_lines.iter().map(|&l| InstructionInfo::at_line("NOP", l - 1)).collect()
    }

    #[test]
    fn test_waiting_sections_are_merged() {
        tdb_utils::logging::ensure_test_logging(None);

        let mapping = FuncMapping::from_iter([
            (1, DebugLocation::new("main.fc", 4)),
            (2, DebugLocation::new("@stdlib/tvm-dicts", 90)),
            (3, DebugLocation::new("main.fc", 5)),
        ]);
        let instructions = DebugSectionInstructions::from([(3, instrs(&[10, 11]))]);

        let graph = SourceCorrelation::build(&mapping, &instructions, &CorrelationConfig::default());

        assert_eq!(graph.asm_lines_for(4), Some(&BTreeSet::from([10, 11])));
        assert_eq!(graph.asm_lines_for(5), Some(&BTreeSet::from([10, 11])));
        assert_eq!(graph.asm_lines_for(90), None);
        assert_eq!(graph.func_lines_for(10), Some(&BTreeSet::from([4, 5])));
    }

    #[test]
    fn test_section_without_asm_lines_resets_waiting_sections() {
        tdb_utils::logging::ensure_test_logging(None);

        let mapping = FuncMapping::from_iter([
            (1, DebugLocation::new("main.fc", 4)),
            (2, DebugLocation::new("main.fc", 6)),
            (3, DebugLocation::new("main.fc", 8)),
        ]);
        let instructions = DebugSectionInstructions::from([
            (2, vec![InstructionInfo { name: "INLINE".into(), loc: None }]),
            (3, instrs(&[20])),
        ]);

        let graph = SourceCorrelation::build(&mapping, &instructions, &CorrelationConfig::default());

        assert_eq!(graph.asm_lines_for(4), None);
        assert_eq!(graph.asm_lines_for(6), None);
        assert_eq!(graph.asm_lines_for(8), Some(&BTreeSet::from([20])));
    }

    #[test]
    fn test_components_are_connected_through_shared_lines() {
        tdb_utils::logging::ensure_test_logging(None);

        let mapping = FuncMapping::from_iter([
            (1, DebugLocation::new("main.fc", 2)),
            (2, DebugLocation::new("main.fc", 3)),
            (3, DebugLocation::new("main.fc", 9)),
        ]);
        // line 2 -> {1, 2}, line 3 -> {2, 3}: one component; line 9 -> {7}: another
        let instructions = DebugSectionInstructions::from([
            (1, instrs(&[1, 2])),
            (2, instrs(&[2, 3])),
            (3, instrs(&[7])),
        ]);

        let graph = SourceCorrelation::build(&mapping, &instructions, &CorrelationConfig::default());

        assert_eq!(graph.groups.len(), 2);
        assert_eq!(graph.groups[0].func_lines, vec![2, 3]);
        assert_eq!(graph.groups[0].asm_lines, vec![1, 2, 3]);
        assert_eq!(graph.groups[0].class_name, "source-map-group-0");
        assert_eq!(graph.groups[1].func_lines, vec![9]);
        assert_eq!(graph.groups[1].asm_lines, vec![7]);
        assert_eq!(graph.groups[1].color, DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_colors_and_classes_cycle() {
        tdb_utils::logging::ensure_test_logging(None);

        let mapping: FuncMapping =
            (0..12).map(|i| (i, DebugLocation::new("main.fc", i * 10 + 1))).collect();
        let instructions: DebugSectionInstructions =
            (0..12).map(|i| (i, instrs(&[i * 10 + 1]))).collect();
        let config = CorrelationConfig {
            palette: vec!["red".into(), "green".into(), "blue".into()],
            ..Default::default()
        };

        let graph = SourceCorrelation::build(&mapping, &instructions, &config);

        assert_eq!(graph.groups.len(), 12);
        assert_eq!(graph.groups[3].color, "red");
        assert_eq!(graph.groups[10].class_name, "source-map-group-0");
        assert_eq!(graph.groups[11].class_name, "source-map-group-1");
        assert_eq!(graph.groups[11].color, "blue");
    }

    #[test]
    fn test_highlight_groups_split_sides() {
        tdb_utils::logging::ensure_test_logging(None);

        let mapping = FuncMapping::from_iter([(1, DebugLocation::new("main.fc", 2))]);
        let instructions = DebugSectionInstructions::from([(1, instrs(&[5, 4]))]);

        let graph = SourceCorrelation::build(&mapping, &instructions, &CorrelationConfig::default());

        let func = graph.func_highlight_groups();
        let asm = graph.asm_highlight_groups();
        assert_eq!(func[0].lines, vec![2]);
        assert_eq!(asm[0].lines, vec![4, 5]);
        assert_eq!(func[0].color, asm[0].color);
        assert_eq!(func[0].class_name, asm[0].class_name);
    }
}
