//! SwiftUI frontend — extracts observable-object components into the
//! neutral IR.
//!
//! `@Published` properties of an `ObservableObject` become shared-observable
//! slots, `@State` properties become local slots, `Task { do/catch }`
//! regions flatten into async action chains, and the view DSL reduces to
//! the render tree. The `.alert` modifier maps to the dedicated error
//! surface.

pub mod ast;
pub mod expr;
pub mod extract;
pub mod parser;

use refract_core::error::{ExtractionError, Location};
use refract_core::ir::Component;
use refract_core::{Framework, SourceAdapter};

pub struct SwiftUiAdapter;

impl SourceAdapter for SwiftUiAdapter {
    fn framework(&self) -> Framework {
        Framework::SwiftUi
    }

    fn extract(&self, source: &str) -> Result<Component, ExtractionError> {
        let file = parser::parse_file(source)
            .map_err(|e| ExtractionError::new(e.message, Location::line(e.line)))?;
        extract::extract_file(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::ir::{
        Action, AsyncOp, Expr, Ownership, RenderNode, SlotRole, Trigger,
    };

    const FIXTURE: &str = include_str!("../tests/fixtures/TaskBoard.swift");

    #[test]
    fn published_slots_are_shared_observable_in_order() {
        let component = SwiftUiAdapter.extract(FIXTURE).unwrap();
        let names: Vec<&str> = component.slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["tasks", "isLoading", "errorMessage", "draft"]);
        assert!(component
            .slots
            .iter()
            .all(|s| s.ownership == Ownership::SharedObservable));
    }

    #[test]
    fn error_slot_is_marked_by_alert_and_catch() {
        let component = SwiftUiAdapter.extract(FIXTURE).unwrap();
        let slot = component.slot("errorMessage").unwrap();
        assert_eq!(slot.role, SlotRole::ErrorMessage);
        assert_eq!(component.error_slot().unwrap().name, "errorMessage");
    }

    #[test]
    fn init_invoked_loader_is_lifecycle_triggered() {
        let component = SwiftUiAdapter.extract(FIXTURE).unwrap();
        let load = component.handler("loadTasks").unwrap();
        assert_eq!(load.trigger, Trigger::LifecycleInit);
        assert!(load.is_async());
        let add = component.handler("addTask").unwrap();
        assert_eq!(add.trigger, Trigger::UserEvent);
        assert!(!add.is_async());
    }

    #[test]
    fn guarded_sleep_becomes_async_call_with_both_branches() {
        let component = SwiftUiAdapter.extract(FIXTURE).unwrap();
        let load = component.handler("loadTasks").unwrap();
        match &load.actions[1] {
            Action::AsyncCall {
                operation: AsyncOp::Sleep { nanos },
                on_success,
                on_failure,
            } => {
                assert_eq!(*nanos, 500_000_000);
                assert_eq!(on_success.len(), 2);
                assert_eq!(on_failure.len(), 2);
                assert!(matches!(
                    &on_failure[0],
                    Action::Mutate { slot, value }
                        if slot == "errorMessage" && *value == Expr::ErrorMessage
                ));
            }
            other => panic!("expected guarded sleep, got {other:?}"),
        }
    }

    #[test]
    fn toggle_and_delete_lower_to_keyed_list_rewrites() {
        let component = SwiftUiAdapter.extract(FIXTURE).unwrap();
        let toggle = component.handler("toggleTask").unwrap();
        match &toggle.actions[0] {
            Action::Mutate { slot, value } => {
                assert_eq!(slot, "tasks");
                assert!(matches!(value, Expr::ToggleWhere { field, .. } if field == "isCompleted"));
            }
            other => panic!("expected toggle mutate, got {other:?}"),
        }
        let delete = component.handler("deleteTask").unwrap();
        match &delete.actions[0] {
            Action::Mutate { value, .. } => {
                assert!(matches!(value, Expr::RemoveWhere { .. }));
            }
            other => panic!("expected remove mutate, got {other:?}"),
        }
    }

    #[test]
    fn render_tree_has_list_and_error_alert() {
        let component = SwiftUiAdapter.extract(FIXTURE).unwrap();
        let RenderNode::Container { children, .. } = &component.root else {
            panic!("expected container root");
        };
        let alert = children
            .iter()
            .find(|n| matches!(n, RenderNode::ErrorAlert { .. }))
            .expect("alert node");
        match alert {
            RenderNode::ErrorAlert { slot, title } => {
                assert_eq!(slot, "errorMessage");
                assert_eq!(title, "Error");
            }
            _ => unreachable!(),
        }

        fn find_list(node: &RenderNode) -> Option<&RenderNode> {
            match node {
                RenderNode::List { .. } => Some(node),
                RenderNode::Container { children, .. } => children.iter().find_map(find_list),
                RenderNode::Conditional {
                    then_node,
                    else_node,
                    ..
                } => find_list(then_node).or_else(|| else_node.as_deref().and_then(find_list)),
                _ => None,
            }
        }
        let list = find_list(&component.root).expect("list node");
        match list {
            RenderNode::List { items, binding, .. } => {
                assert_eq!(items, "tasks");
                assert_eq!(binding, "task");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn plain_stored_property_fails_extraction() {
        let source = r#"
import SwiftUI

class BadModel: ObservableObject {
    @Published var value: String = ""
    private var cancellables = 0
}

struct BadView: View {
    @StateObject private var model = BadModel()

    var body: some View {
        VStack {
            Text("x")
        }
    }
}
"#;
        let err = SwiftUiAdapter.extract(source).unwrap_err();
        assert!(err.reason.contains("ownership idiom"), "unexpected: {err}");
    }
}
