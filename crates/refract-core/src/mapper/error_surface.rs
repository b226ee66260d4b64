//! Rule 5 — error-surface mapping.
//!
//! An `ErrorAlert` node stands for the source framework's dedicated error
//! dialog, bound to the error-message slot. Targets with an alert idiom keep
//! the node; targets without one get an inline banner: a `Conditional`
//! rendered only while the slot is non-nil, showing the message next to a
//! dismiss button wired to a synthesized handler that clears the slot
//! exactly once.

use crate::error::UnsupportedConstruct;
use crate::ir::{
    Action, Component, Expr, FidelityNote, Handler, Layout, Literal, RenderNode, TextStyle,
    Trigger,
};

use super::{MapContext, MapPass};

/// Name of the synthesized dismissal handler.
pub const DISMISS_HANDLER: &str = "dismissError";

pub struct ErrorSurfaceMap;

impl MapPass for ErrorSurfaceMap {
    fn name(&self) -> &'static str {
        "error-surface"
    }

    fn apply(
        &self,
        mut component: Component,
        ctx: &mut MapContext<'_>,
    ) -> Result<Component, UnsupportedConstruct> {
        if ctx.caps.alert_surface {
            return Ok(component);
        }
        let root = std::mem::replace(
            &mut component.root,
            RenderNode::Container {
                layout: Layout::Plain,
                children: Vec::new(),
            },
        );
        let mut rewrote = Vec::new();
        component.root = rewrite(root, &mut rewrote);

        for slot in rewrote {
            ctx.notes.push(FidelityNote::new(
                "error-surface-banner",
                format!(
                    "alert on `{slot}` rewritten to an inline banner; {} has no \
                     dialog idiom",
                    ctx.caps.framework
                ),
            ));
            if component.handler(DISMISS_HANDLER).is_none() {
                component.handlers.push(Handler {
                    name: DISMISS_HANDLER.into(),
                    trigger: Trigger::UserEvent,
                    params: Vec::new(),
                    actions: vec![Action::Mutate {
                        slot,
                        value: Expr::Literal(Literal::Nil),
                    }],
                });
            }
        }
        Ok(component)
    }
}

fn rewrite(node: RenderNode, rewrote: &mut Vec<String>) -> RenderNode {
    match node {
        RenderNode::ErrorAlert { slot, title } => {
            rewrote.push(slot.clone());
            RenderNode::Conditional {
                pred: Expr::Not(Box::new(Expr::IsNil(Box::new(Expr::Slot(slot.clone()))))),
                then_node: Box::new(RenderNode::Container {
                    layout: Layout::Row,
                    children: vec![
                        RenderNode::Text {
                            content: Expr::Slot(slot),
                            style: TextStyle::default(),
                        },
                        RenderNode::Button {
                            label: Expr::Literal(Literal::Str(format!("Dismiss {title}"))),
                            on_trigger: DISMISS_HANDLER.into(),
                            args: Vec::new(),
                            disabled_when: None,
                        },
                    ],
                }),
                else_node: None,
            }
        }
        RenderNode::Container { layout, children } => RenderNode::Container {
            layout,
            children: children.into_iter().map(|c| rewrite(c, rewrote)).collect(),
        },
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => RenderNode::Conditional {
            pred,
            then_node: Box::new(rewrite(*then_node, rewrote)),
            else_node: else_node.map(|n| Box::new(rewrite(*n, rewrote))),
        },
        RenderNode::List {
            items,
            binding,
            row,
        } => RenderNode::List {
            items,
            binding,
            row: Box::new(rewrite(*row, rewrote)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, Framework};
    use crate::ir::{Ownership, SlotRole, StateSlot, ValueType};
    use crate::pipeline::MapOptions;

    fn bannered_caps() -> Capabilities {
        Capabilities {
            framework: Framework::React,
            version: 1,
            shared_observable: false,
            local_state: true,
            async_handlers: true,
            delay: true,
            dynamic_list: true,
            alert_surface: false,
        }
    }

    fn alert_component() -> Component {
        Component {
            name: "C".into(),
            records: Vec::new(),
            slots: vec![StateSlot {
                name: "errorMessage".into(),
                ty: ValueType::Optional(Box::new(ValueType::Str)),
                ownership: Ownership::Local,
                initial: Expr::Literal(Literal::Nil),
                role: SlotRole::ErrorMessage,
            }],
            handlers: Vec::new(),
            root: RenderNode::Container {
                layout: Layout::Column,
                children: vec![RenderNode::ErrorAlert {
                    slot: "errorMessage".into(),
                    title: "Error".into(),
                }],
            },
        }
    }

    #[test]
    fn alert_becomes_banner_with_dismiss_handler() {
        let caps = bannered_caps();
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let out = ErrorSurfaceMap.apply(alert_component(), &mut ctx).unwrap();

        let dismiss = out.handler(DISMISS_HANDLER).expect("dismiss synthesized");
        assert_eq!(
            dismiss.actions,
            vec![Action::Mutate {
                slot: "errorMessage".into(),
                value: Expr::Literal(Literal::Nil),
            }]
        );

        match &out.root {
            RenderNode::Container { children, .. } => match &children[0] {
                RenderNode::Conditional { pred, .. } => {
                    assert_eq!(
                        *pred,
                        Expr::Not(Box::new(Expr::IsNil(Box::new(Expr::Slot(
                            "errorMessage".into()
                        )))))
                    );
                }
                other => panic!("expected Conditional banner, got {other:?}"),
            },
            other => panic!("expected Container, got {other:?}"),
        }
        assert_eq!(ctx.notes[0].rule, "error-surface-banner");
    }

    #[test]
    fn alert_capable_target_keeps_alert() {
        let caps = Capabilities {
            alert_surface: true,
            ..bannered_caps()
        };
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let out = ErrorSurfaceMap.apply(alert_component(), &mut ctx).unwrap();
        match &out.root {
            RenderNode::Container { children, .. } => {
                assert!(matches!(children[0], RenderNode::ErrorAlert { .. }));
            }
            other => panic!("expected Container, got {other:?}"),
        }
        assert!(out.handler(DISMISS_HANDLER).is_none());
    }
}
