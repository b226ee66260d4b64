//! React backend — renders target-ready IR as a hook-based TSX component.

pub mod emit;

use refract_core::error::EmissionError;
use refract_core::ir::Component;
use refract_core::{Framework, TargetEmitter};

pub struct ReactBackend;

impl TargetEmitter for ReactBackend {
    fn framework(&self) -> Framework {
        Framework::React
    }

    fn emit(&self, component: &Component) -> Result<String, EmissionError> {
        emit::emit_component(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::ir::{
        Action, AsyncOp, Expr, Handler, Layout, Literal, Ownership, RenderNode, SlotRole,
        StateSlot, TextStyle, Trigger, ValueType,
    };

    fn slot(name: &str, ty: ValueType, initial: Expr) -> StateSlot {
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
                slot(
                    "tasks",
                    ValueType::List(Box::new(ValueType::Str)),
                    Expr::ListLit(Vec::new()),
                ),
                slot("input", ValueType::Str, Expr::Literal(Literal::Str("".into()))),
                slot("loading", ValueType::Bool, Expr::Literal(Literal::Bool(false))),
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
                    Action::AsyncCall {
                        operation: AsyncOp::Invoke {
                            name: "submitForm".into(),
                            args: vec![Expr::Slot("input".into())],
                        },
                        on_success: vec![
                            Action::Conditional {
                                pred: Expr::Field {
                                    object: Box::new(Expr::AsyncResult),
                                    field: "success".into(),
                                },
                                then_actions: vec![
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
                                ],
                                else_actions: Vec::new(),
                            },
                            Action::Mutate {
                                slot: "loading".into(),
                                value: Expr::Literal(Literal::Bool(false)),
                            },
                        ],
                        on_failure: Vec::new(),
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
    fn emits_hooks_in_slot_order() {
        let out = ReactBackend.emit(&submit_component()).unwrap();
        let tasks = out.find("const [tasks, setTasks]").unwrap();
        let input = out.find("const [input, setInput]").unwrap();
        let loading = out.find("const [loading, setLoading]").unwrap();
        assert!(tasks < input && input < loading);
        assert!(out.contains("useState<string[]>([])"));
        assert!(out.contains("useState(false)"));
    }

    #[test]
    fn mutations_follow_the_await() {
        let out = ReactBackend.emit(&submit_component()).unwrap();
        let awaited = out.find("const result = await submitForm(input)").unwrap();
        let mutation = out.find("setTasks([...tasks, input])").unwrap();
        let reset = out.find("setLoading(false)").unwrap();
        assert!(awaited < mutation && mutation < reset);
    }

    #[test]
    fn emits_jsx_with_conditional_label() {
        let out = ReactBackend.emit(&submit_component()).unwrap();
        assert!(out.contains("'use client'"));
        assert!(out.contains("<h1>Task Manager</h1>"));
        assert!(out.contains("{loading ? 'Adding...' : 'Add Task'}"));
        assert!(out.contains("disabled={loading}"));
        assert!(out.contains("{tasks.map((task, index) => ("));
    }

    #[test]
    fn shared_ownership_is_an_emitter_defect() {
        let mut component = submit_component();
        component.slots[0].ownership = Ownership::SharedObservable;
        let err = ReactBackend.emit(&component).unwrap_err();
        assert!(err.0.contains("shared-observable"));
    }

    #[test]
    fn alert_surface_is_an_emitter_defect() {
        let mut component = submit_component();
        component.root = RenderNode::Container {
            layout: Layout::Column,
            children: vec![RenderNode::ErrorAlert {
                slot: "error".into(),
                title: "Error".into(),
            }],
        };
        component.slots.push(slot(
            "error",
            ValueType::Optional(Box::new(ValueType::Str)),
            Expr::Literal(Literal::Nil),
        ));
        let err = ReactBackend.emit(&component).unwrap_err();
        assert!(err.0.contains("error-surface mapping"));
    }

    #[test]
    fn emission_is_deterministic() {
        let component = submit_component();
        let a = ReactBackend.emit(&component).unwrap();
        let b = ReactBackend.emit(&component).unwrap();
        assert_eq!(a, b);
    }
}
