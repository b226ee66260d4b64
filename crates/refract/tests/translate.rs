//! End-to-end translation tests against the fixture corpus.

use refract::{translate, Framework, MapOptions, TranslationError};
use refract_core::Stage;

const TASK_BOARD_SWIFT: &str = include_str!("fixtures/TaskBoard.swift");
const TASK_MANAGER_TSX: &str = include_str!("fixtures/TaskManager.tsx");
const TASK_BOARD_GOLD: &str = include_str!("gold/TaskBoard.react.tsx");
const TASK_MANAGER_GOLD: &str = include_str!("gold/TaskManager.swiftui.swift");

fn normalized(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn swiftui_task_board_translates_to_react_gold() {
    let result = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    assert_eq!(normalized(&result.output), normalized(TASK_BOARD_GOLD));
}

#[test]
fn react_task_manager_translates_to_swiftui_gold() {
    let result = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    assert_eq!(normalized(&result.output), normalized(TASK_MANAGER_GOLD));
}

#[test]
fn translation_is_deterministic() {
    let options = MapOptions::default();
    let a = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &options,
    )
    .unwrap();
    let b = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &options,
    )
    .unwrap();
    assert_eq!(a.output, b.output);
    assert_eq!(a.notes, b.notes);
}

#[test]
fn ownership_downgrade_records_a_note_per_slot() {
    let result = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    let downgrades: Vec<_> = result
        .notes
        .iter()
        .filter(|n| n.rule == "ownership-downgrade")
        .collect();
    // tasks, isLoading, errorMessage, draft.
    assert_eq!(downgrades.len(), 4);
    assert!(result
        .notes
        .iter()
        .any(|n| n.rule == "error-surface-banner"));
}

#[test]
fn strict_ownership_mode_fails_the_map_stage() {
    let err = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions {
            strict_ownership: true,
        },
    )
    .unwrap_err();
    assert_eq!(err.stage(), Stage::Map);
    assert!(matches!(err, TranslationError::Map(_)));
}

#[test]
fn react_to_swiftui_loses_nothing_and_notes_nothing() {
    // Local state, async, dynamic lists: SwiftUI expresses all of it.
    let result = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    assert!(result.notes.is_empty(), "unexpected notes: {:?}", result.notes);
}

#[test]
fn emitted_state_order_matches_source_declaration_order() {
    let result = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    let tasks = result.output.find("@State private var tasks").unwrap();
    let input = result.output.find("@State private var input").unwrap();
    let loading = result.output.find("@State private var loading").unwrap();
    assert!(tasks < input && input < loading);
}

#[test]
fn emitted_child_order_matches_source_child_order() {
    let result = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    let heading = result.output.find("Text(\"Task Manager\")").unwrap();
    let field = result.output.find("TextField(\"New task\"").unwrap();
    let button = result.output.find("Button(action: handleSubmit)").unwrap();
    let list = result.output.find("List(tasks.indices").unwrap();
    assert!(heading < field && field < button && button < list);
}

#[test]
fn async_mutations_are_emitted_after_the_suspension() {
    // Single-flight: state mutations belonging to the async outcome must
    // follow the suspension point in the emitted handler.
    let result = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    let awaited = result.output.find("await new Promise").unwrap();
    let populate = result.output.find("setTasks([{ id:").unwrap();
    assert!(awaited < populate);

    let swift = translate(
        TASK_MANAGER_TSX,
        Framework::React,
        Framework::SwiftUi,
        &MapOptions::default(),
    )
    .unwrap();
    let awaited = swift.output.find("await submitForm").unwrap();
    let append = swift.output.find("self.tasks.append").unwrap();
    let reset = swift.output.find("self.loading = false").unwrap();
    assert!(awaited < append && append < reset);
}

#[test]
fn error_banner_renders_conditionally_and_clears_once() {
    let result = translate(
        TASK_BOARD_SWIFT,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap();
    // Rendered only while the slot is non-empty.
    assert!(result.output.contains("{errorMessage !== null && ("));
    // Acknowledged exactly once through the synthesized dismissal handler.
    assert_eq!(result.output.matches("setErrorMessage(null)").count(), 1);
    assert!(result.output.contains("function dismissError()"));
}

#[test]
fn unmapped_render_construct_fails_the_extract_stage() {
    let source = "struct Broken: View {\n    var body: some View {\n        VStack {\n            Spacer()\n        }\n    }\n}\n";
    let err = translate(
        source,
        Framework::SwiftUi,
        Framework::React,
        &MapOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.stage(), Stage::Extract);
    let TranslationError::Extract(inner) = err else {
        panic!("expected extraction error");
    };
    assert!(inner.reason.contains("no mapping rule"), "{inner}");
    assert_eq!(inner.location.line, 4);
}
