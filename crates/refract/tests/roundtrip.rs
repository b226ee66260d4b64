//! Round-trip structural preservation: A→B→A keeps every slot, handler,
//! and render node up to the documented fidelity losses.

use refract::{translate, Framework, MapOptions};
use refract_core::ir::{Component, RenderNode};

const TASK_BOARD_SWIFT: &str = include_str!("fixtures/TaskBoard.swift");
const TASK_MANAGER_TSX: &str = include_str!("fixtures/TaskManager.tsx");

fn extract(source: &str, from: Framework) -> Component {
    refract::extract_ir(source, from).unwrap()
}

fn slot_names(component: &Component) -> Vec<String> {
    component.slots.iter().map(|s| s.name.clone()).collect()
}

fn count_lists(node: &RenderNode) -> usize {
    match node {
        RenderNode::List { row, .. } => 1 + count_lists(row),
        RenderNode::Container { children, .. } => children.iter().map(count_lists).sum(),
        RenderNode::Conditional {
            then_node,
            else_node,
            ..
        } => {
            count_lists(then_node)
                + else_node.as_deref().map(count_lists).unwrap_or(0)
        }
        _ => 0,
    }
}

#[test]
fn swiftui_survives_the_react_round_trip() {
    let original = extract(TASK_BOARD_SWIFT, Framework::SwiftUi);

    let react = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    let back = translate(
        &react.output,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    let recovered = extract(&back.output, Framework::SwiftUi);

    // Slots survive in order; ownership was downgraded (a recorded loss).
    assert_eq!(slot_names(&original), slot_names(&recovered));

    // Source handlers survive; the dismissal handler synthesized for the
    // banner (the error-surface rewrite, also recorded) may join them.
    for handler in &original.handlers {
        let twin = recovered
            .handler(&handler.name)
            .unwrap_or_else(|| panic!("handler `{}` dropped", handler.name));
        assert_eq!(twin.is_async(), handler.is_async());
        assert_eq!(twin.trigger, handler.trigger);
    }

    // The dynamic list is still a list, not an unrolled container.
    assert_eq!(count_lists(&original.root), 1);
    assert_eq!(count_lists(&recovered.root), 1);

    // The error slot keeps its role through the banner rewrite.
    assert_eq!(
        recovered.error_slot().map(|s| s.name.as_str()),
        Some("errorMessage")
    );
}

#[test]
fn react_survives_the_swiftui_round_trip() {
    let original = extract(TASK_MANAGER_TSX, Framework::React);

    let swift = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    assert!(swift.notes.is_empty());

    let back = translate(
        &swift.output,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    assert!(back.notes.is_empty());
    let recovered = extract(&back.output, Framework::React);

    assert_eq!(slot_names(&original), slot_names(&recovered));
    assert_eq!(original.handlers.len(), recovered.handlers.len());
    assert_eq!(count_lists(&original.root), count_lists(&recovered.root));
}

#[test]
fn round_trip_emission_is_stable() {
    // Once through the pipeline, a second pass reproduces the same text:
    // the emitters write exactly the subset the adapters read.
    let swift = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    let react = translate(
        &swift.output,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    let swift_again = translate(
        &react.output,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    assert_eq!(swift.output, swift_again.output);
}
