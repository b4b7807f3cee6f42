use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use tdb_common::{
    config::CorrelationConfig,
    types::{DebugLocation, DebugSectionInstructions, FuncMapping, InstructionInfo},
};
use tdb_engine::{SourceCorrelation, SourceCorrelationGraph, Viewport};
use tracing::info;

/// A contract with a helper inlined twice and an inlined stdlib call
fn contract() -> (FuncMapping, DebugSectionInstructions) {
    let mapping = FuncMapping::from_iter([
        (1, DebugLocation::new("main.tolk", 2)),
        (2, DebugLocation::new("main.tolk", 3)),
        (3, DebugLocation::new("@stdlib/common.tolk", 10)),
        (4, DebugLocation::new("main.tolk", 5)),
        (5, DebugLocation::new("main.tolk", 8)),
        (6, DebugLocation::new("main.tolk", 5)),
        (7, DebugLocation::new("main.tolk", 12)),
    ]);
    let instructions = BTreeMap::from([
        (1, vec![InstructionInfo::at_line("SETCP", 0)]),
        (4, vec![InstructionInfo::at_line("PUSHINT", 2), InstructionInfo::at_line("ADD", 3)]),
        (5, vec![InstructionInfo::at_line("DUP", 4)]),
        (6, vec![InstructionInfo::at_line("PUSHINT", 6)]),
        (7, vec![InstructionInfo { name: "IMPLICIT".to_string(), loc: None }]),
    ]);
    (mapping, instructions)
}

#[test]
fn test_groups_form_a_disjoint_cover() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");

    let (mapping, instructions) = contract();
    let correlation = SourceCorrelation::build(&mapping, &instructions, &Default::default());

    let mut seen_func = BTreeSet::new();
    let mut seen_asm = BTreeSet::new();
    for group in &correlation.groups {
        assert!(!group.func_lines.is_empty());
        assert!(!group.asm_lines.is_empty());
        assert!(group.func_lines.windows(2).all(|w| w[0] < w[1]));
        assert!(group.asm_lines.windows(2).all(|w| w[0] < w[1]));
        assert!(group.func_lines.iter().all(|l| seen_func.insert(*l)));
        assert!(group.asm_lines.iter().all(|l| seen_asm.insert(*l)));
    }

    let linked_func = correlation.func_to_asm.keys().copied().collect::<BTreeSet<_>>();
    let linked_asm = correlation.asm_to_func.keys().copied().collect::<BTreeSet<_>>();
    assert_eq!(seen_func, linked_func);
    assert_eq!(seen_asm, linked_asm);
}

#[test]
fn test_shared_source_line_joins_groups() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");

    let (mapping, instructions) = contract();
    let correlation = SourceCorrelation::build(&mapping, &instructions, &Default::default());

    // line 3 has no instructions of its own and is linked to the next emitted
    // section, line 5, which is itself emitted twice
    let groups = correlation
        .groups
        .iter()
        .map(|g| (g.func_lines.clone(), g.asm_lines.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        groups,
        vec![(vec![2], vec![1]), (vec![3, 5], vec![3, 4, 7]), (vec![8], vec![5])]
    );
    assert_eq!(correlation.groups[1].class_name, "source-map-group-1");
    assert!(correlation.asm_lines_for(12).is_none());
    assert!(correlation.asm_lines_for(10).is_none());
}

#[test]
fn test_custom_palette_is_cycled() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");

    let (mapping, instructions) = contract();
    let config = CorrelationConfig {
        palette: vec!["#111".to_string(), "#222".to_string()],
        ..Default::default()
    };
    let correlation = SourceCorrelation::build(&mapping, &instructions, &config);

    let colors = correlation.groups.iter().map(|g| g.color.as_str()).collect::<Vec<_>>();
    assert_eq!(colors, vec!["#111", "#222", "#111"]);
}

#[test]
fn test_hover_and_scroll_through_view() {
    tdb_utils::logging::ensure_test_logging(None);
    info!("Running test");

    let (mapping, instructions) = contract();
    let mut graph = SourceCorrelationGraph::new(CorrelationConfig::default());
    graph.set_inputs(Some(Arc::new(mapping)), Some(Arc::new(instructions)));
    assert_eq!(graph.func_highlight_groups().len(), 3);

    graph.handle_func_line_hover(Some(5));
    assert_eq!(graph.func_hovered_lines(), vec![5]);
    assert_eq!(graph.asm_hovered_lines(), vec![3, 4, 7]);
    assert_eq!(graph.asm_scroll_target(Viewport::new(1, 2)), Some(3));
    assert_eq!(graph.asm_scroll_target(Viewport::new(1, 10)), None);

    graph.handle_asm_line_hover(Some(4));
    assert_eq!(graph.func_hovered_lines(), vec![3, 5]);
    assert_eq!(graph.asm_hovered_lines(), vec![4]);

    graph.set_inputs(None, None);
    assert!(graph.correlation().is_none());
    assert!(graph.func_hovered_lines().is_empty());
    assert!(graph.asm_highlight_groups().is_empty());
}
