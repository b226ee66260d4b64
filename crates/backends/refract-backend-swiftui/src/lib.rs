//! SwiftUI backend — renders target-ready IR as an observable-object
//! component (or a single `@State` view when every slot is local).

pub mod emit;

use refract_core::error::EmissionError;
use refract_core::ir::Component;
use refract_core::{Framework, TargetEmitter};

pub struct SwiftUiBackend;

impl TargetEmitter for SwiftUiBackend {
    fn framework(&self) -> Framework {
        Framework::SwiftUi
    }

    fn emit(&self, component: &Component) -> Result<String, EmissionError> {
        emit::emit_component(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::ir::{
        Action, AsyncOp, Expr, Handler, Layout, Literal, Ownership, RecordDecl, RenderNode,
        SlotRole, StateSlot, TextStyle, Trigger, ValueType,
    };

    fn local_slot(name: &str, ty: ValueType, initial: Expr) -> StateSlot {
        StateSlot {
            name: name.into(),
            ty,
            ownership: Ownership::Local,
            initial,
            role: SlotRole::Plain,
        }
    }

    fn submit_component() -> Component {
        Component {
            name: "TaskManager".into(),
            records: Vec::new(),
            slots: vec![
                local_slot(
                    "tasks",
                    ValueType::List(Box::new(ValueType::Str)),
                    Expr::ListLit(Vec::new()),
                ),
                local_slot("input", ValueType::Str, Expr::Literal(Literal::Str("".into()))),
                local_slot(
                    "loading",
                    ValueType::Bool,
                    Expr::Literal(Literal::Bool(false)),
                ),
            ],
            handlers: vec![Handler {
                name: "handleSubmit".into(),
                trigger: Trigger::UserEvent,
                params: Vec::new(),
                actions: vec![
                    Action::Mutate {
                        slot: "loading".into(),
                        value: Expr::Literal(Literal::Bool(true)),
                    },
                    Action::Delay {
                        nanos: 500_000_000,
                    },
                    Action::Mutate {
                        slot: "tasks".into(),
                        value: Expr::Append {
                            list: Box::new(Expr::Slot("tasks".into())),
                            item: Box::new(Expr::Slot("input".into())),
                        },
                    },
                    Action::Mutate {
                        slot: "input".into(),
                        value: Expr::Literal(Literal::Str("".into())),
                    },
                    Action::Mutate {
                        slot: "loading".into(),
                        value: Expr::Literal(Literal::Bool(false)),
                    },
                ],
            }],
            root: RenderNode::Container {
                layout: Layout::Column,
                children: vec![
                    RenderNode::Text {
                        content: Expr::Literal(Literal::Str("Task Manager".into())),
                        style: TextStyle {
                            heading: true,
                            strikethrough_when: None,
                        },
                    },
                    RenderNode::Input {
                        binding: "input".into(),
                        placeholder: "New task".into(),
                        disabled_when: Some(Expr::Slot("loading".into())),
                    },
                    RenderNode::Button {
                        label: Expr::Ternary {
                            cond: Box::new(Expr::Slot("loading".into())),
                            then_val: Box::new(Expr::Literal(Literal::Str("Adding...".into()))),
                            else_val: Box::new(Expr::Literal(Literal::Str("Add Task".into()))),
                        },
                        on_trigger: "handleSubmit".into(),
                        args: Vec::new(),
                        disabled_when: Some(Expr::Slot("loading".into())),
                    },
                    RenderNode::List {
                        items: "tasks".into(),
                        binding: "task".into(),
                        row: Box::new(RenderNode::Text {
                            content: Expr::Item,
                            style: TextStyle::default(),
                        }),
                    },
                ],
            },
        }
    }

    #[test]
    fn all_local_component_emits_state_view() {
        let out = SwiftUiBackend.emit(&submit_component()).unwrap();
        assert!(out.contains("struct TaskManager: View {"));
        assert!(out.contains("@State private var tasks: [String] = []"));
        assert!(out.contains("@State private var loading: Bool = false"));
        assert!(!out.contains("ObservableObject"));
    }

    #[test]
    fn async_chain_wraps_in_a_task() {
        let out = SwiftUiBackend.emit(&submit_component()).unwrap();
        let loading = out.find("loading = true").unwrap();
        let task = out.find("Task {").unwrap();
        let sleep = out
            .find("try? await Task.sleep(nanoseconds: 500_000_000)")
            .unwrap();
        let append = out.find("self.tasks.append(self.input)").unwrap();
        assert!(loading < task && task < sleep && sleep < append);
    }

    #[test]
    fn action_button_takes_the_ternary_label() {
        let out = SwiftUiBackend.emit(&submit_component()).unwrap();
        assert!(out.contains("Button(action: handleSubmit) {"));
        assert!(out.contains("Text(loading ? \"Adding...\" : \"Add Task\")"));
        assert!(out.contains(".disabled(loading)"));
    }

    #[test]
    fn primitive_list_renders_by_indices() {
        let out = SwiftUiBackend.emit(&submit_component()).unwrap();
        assert!(out.contains("List(tasks.indices, id: \\.self) { index in"));
        assert!(out.contains("Text(tasks[index])"));
    }

    #[test]
    fn shared_slots_emit_the_model_view_pair() {
        let mut component = submit_component();
        for slot in &mut component.slots {
            slot.ownership = Ownership::SharedObservable;
        }
        component.records.push(RecordDecl {
            name: "TaskItem".into(),
            fields: vec![
                ("id".into(), ValueType::Uuid),
                ("title".into(), ValueType::Str),
            ],
            identifiable: true,
        });
        let out = SwiftUiBackend.emit(&component).unwrap();
        assert!(out.contains("class TaskManagerModel: ObservableObject {"));
        assert!(out.contains("@Published var tasks: [String] = []"));
        assert!(out.contains("struct TaskManagerView: View {"));
        assert!(out.contains("@StateObject private var model = TaskManagerModel()"));
        assert!(out.contains("struct TaskItem: Identifiable {"));
        assert!(out.contains("model.handleSubmit"));
    }

    #[test]
    fn root_alert_becomes_the_alert_modifier() {
        let mut component = submit_component();
        component.slots.push(local_slot(
            "errorMessage",
            ValueType::Optional(Box::new(ValueType::Str)),
            Expr::Literal(Literal::Nil),
        ));
        if let RenderNode::Container { children, .. } = &mut component.root {
            children.push(RenderNode::ErrorAlert {
                slot: "errorMessage".into(),
                title: "Error".into(),
            });
        }
        let out = SwiftUiBackend.emit(&component).unwrap();
        assert!(out.contains(".alert(\"Error\", isPresented: Binding("));
        assert!(out.contains("set: { _ in errorMessage = nil }"));
        assert!(out.contains("Text(errorMessage ?? \"\")"));
    }

    #[test]
    fn emission_is_deterministic() {
        let component = submit_component();
        let a = SwiftUiBackend.emit(&component).unwrap();
        let b = SwiftUiBackend.emit(&component).unwrap();
        assert_eq!(a, b);
    }
}
