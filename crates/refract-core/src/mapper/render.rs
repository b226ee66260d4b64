//! Rule 4 — render-tree reduction.
//!
//! `List` nodes survive structurally when the target renders homogeneous
//! dynamic lists. Otherwise a list may be statically unrolled into a
//! `Container` of rows — but only when its item collection is
//! compile-time-constant (literal initializer, never mutated). A
//! runtime-populated list on such a target has no safe rendering and fails
//! with `UnsupportedConstruct`; silent unrolling would freeze the row count
//! and change observable behavior.

use crate::error::UnsupportedConstruct;
use crate::ir::{Action, Component, Expr, FidelityNote, Layout, RenderNode};

use super::{MapContext, MapPass};

pub struct RenderTreeReduce;

impl MapPass for RenderTreeReduce {
    fn name(&self) -> &'static str {
        "render-reduce"
    }

    fn apply(
        &self,
        mut component: Component,
        ctx: &mut MapContext<'_>,
    ) -> Result<Component, UnsupportedConstruct> {
        if ctx.caps.dynamic_list {
            return Ok(component);
        }
        let root = std::mem::replace(
            &mut component.root,
            RenderNode::Container {
                layout: Layout::Plain,
                children: Vec::new(),
            },
        );
        let reduced = reduce(root, &component, ctx)?;
        component.root = reduced;
        Ok(component)
    }
}

fn reduce(
    node: RenderNode,
    component: &Component,
    ctx: &mut MapContext<'_>,
) -> Result<RenderNode, UnsupportedConstruct> {
    match node {
        RenderNode::List {
            items,
            binding,
            row,
        } => {
            let Some(elements) = constant_elements(component, &items) else {
                return Err(UnsupportedConstruct::new(
                    "list",
                    format!(
                        "list over `{items}` is runtime-populated and {} cannot render \
                         dynamic lists; refusing to unroll",
                        ctx.caps.framework
                    ),
                ));
            };
            ctx.notes.push(FidelityNote::new(
                "list-unrolled",
                format!(
                    "constant list over `{items}` unrolled into {} static rows",
                    elements.len()
                ),
            ));
            let children = elements
                .iter()
                .map(|element| substitute_item(row.as_ref().clone(), element))
                .collect();
            let _ = binding;
            Ok(RenderNode::Container {
                layout: Layout::Column,
                children,
            })
        }
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => Ok(RenderNode::Conditional {
            pred,
            then_node: Box::new(reduce(*then_node, component, ctx)?),
            else_node: match else_node {
                Some(n) => Some(Box::new(reduce(*n, component, ctx)?)),
                None => None,
            },
        }),
        RenderNode::Container { layout, children } => Ok(RenderNode::Container {
            layout,
            children: children
                .into_iter()
                .map(|c| reduce(c, component, ctx))
                .collect::<Result<_, _>>()?,
        }),
        other => Ok(other),
    }
}

/// The literal elements of `slot`, if it is compile-time-constant: a list
/// literal initializer that no handler ever mutates.
fn constant_elements(component: &Component, slot: &str) -> Option<Vec<Expr>> {
    let decl = component.slot(slot)?;
    let Expr::ListLit(elements) = &decl.initial else {
        return None;
    };
    let mutated = component
        .handlers
        .iter()
        .any(|h| mutates_slot(&h.actions, slot));
    if mutated {
        return None;
    }
    Some(elements.clone())
}

fn mutates_slot(actions: &[Action], slot: &str) -> bool {
    actions.iter().any(|a| match a {
        Action::Mutate { slot: s, .. } => s == slot,
        Action::AsyncCall {
            on_success,
            on_failure,
            ..
        } => mutates_slot(on_success, slot) || mutates_slot(on_failure, slot),
        Action::Conditional {
            then_actions,
            else_actions,
            ..
        } => mutates_slot(then_actions, slot) || mutates_slot(else_actions, slot),
        Action::Delay { .. } => false,
    })
}

/// Replace the `Item` binding in a row template with a concrete element.
fn substitute_item(node: RenderNode, element: &Expr) -> RenderNode {
    match node {
        RenderNode::Text { content, mut style } => {
            if let Some(when) = style.strikethrough_when.take() {
                style.strikethrough_when = Some(subst_expr(when, element));
            }
            RenderNode::Text {
                content: subst_expr(content, element),
                style,
            }
        }
        RenderNode::Button {
            label,
            on_trigger,
            args,
            disabled_when,
        } => RenderNode::Button {
            label: subst_expr(label, element),
            on_trigger,
            args: args.into_iter().map(|a| subst_expr(a, element)).collect(),
            disabled_when: disabled_when.map(|e| subst_expr(e, element)),
        },
        RenderNode::Container { layout, children } => RenderNode::Container {
            layout,
            children: children
                .into_iter()
                .map(|c| substitute_item(c, element))
                .collect(),
        },
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => RenderNode::Conditional {
            pred: subst_expr(pred, element),
            then_node: Box::new(substitute_item(*then_node, element)),
            else_node: else_node.map(|n| Box::new(substitute_item(*n, element))),
        },
        other => other,
    }
}

fn subst_expr(expr: Expr, element: &Expr) -> Expr {
    match expr {
        Expr::Item => element.clone(),
        Expr::Field { object, field } => {
            let object = subst_expr(*object, element);
            // Project a field out of a record literal directly.
            if let Expr::MakeRecord { fields, .. } = &object {
                if let Some((_, value)) = fields.iter().find(|(name, _)| *name == field) {
                    return value.clone();
                }
            }
            Expr::Field {
                object: Box::new(object),
                field,
            }
        }
        Expr::Not(e) => Expr::Not(Box::new(subst_expr(*e, element))),
        Expr::IsEmpty(e) => Expr::IsEmpty(Box::new(subst_expr(*e, element))),
        Expr::IsNil(e) => Expr::IsNil(Box::new(subst_expr(*e, element))),
        Expr::Ternary {
            cond,
            then_val,
            else_val,
        } => Expr::Ternary {
            cond: Box::new(subst_expr(*cond, element)),
            then_val: Box::new(subst_expr(*then_val, element)),
            else_val: Box::new(subst_expr(*else_val, element)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, Framework};
    use crate::ir::{
        Handler, Literal, Ownership, SlotRole, StateSlot, TextStyle, Trigger, ValueType,
    };
    use crate::pipeline::MapOptions;

    fn no_list_caps() -> Capabilities {
        Capabilities {
            framework: Framework::SwiftUi,
            version: 1,
            shared_observable: true,
            local_state: true,
            async_handlers: true,
            delay: true,
            dynamic_list: false,
            alert_surface: true,
        }
    }

    fn list_component(initial: Expr, handlers: Vec<Handler>) -> Component {
        Component {
            name: "C".into(),
            records: Vec::new(),
            slots: vec![StateSlot {
                name: "labels".into(),
                ty: ValueType::List(Box::new(ValueType::Str)),
                ownership: Ownership::Local,
                initial,
                role: SlotRole::Plain,
            }],
            handlers,
            root: RenderNode::List {
                items: "labels".into(),
                binding: "label".into(),
                row: Box::new(RenderNode::Text {
                    content: Expr::Item,
                    style: TextStyle::default(),
                }),
            },
        }
    }

    #[test]
    fn constant_list_unrolls_into_container() {
        let caps = no_list_caps();
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let component = list_component(
            Expr::ListLit(vec![
                Expr::Literal(Literal::Str("one".into())),
                Expr::Literal(Literal::Str("two".into())),
            ]),
            Vec::new(),
        );
        let out = RenderTreeReduce.apply(component, &mut ctx).unwrap();
        match &out.root {
            RenderNode::Container { children, .. } => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    RenderNode::Text { content, .. } => {
                        assert_eq!(*content, Expr::Literal(Literal::Str("one".into())));
                    }
                    other => panic!("expected Text row, got {other:?}"),
                }
            }
            other => panic!("expected Container, got {other:?}"),
        }
        assert_eq!(ctx.notes[0].rule, "list-unrolled");
    }

    #[test]
    fn runtime_populated_list_is_refused() {
        let caps = no_list_caps();
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        // The handler appends to the list, so it is not compile-time-constant.
        let component = list_component(
            Expr::ListLit(Vec::new()),
            vec![Handler {
                name: "add".into(),
                trigger: Trigger::UserEvent,
                params: Vec::new(),
                actions: vec![Action::Mutate {
                    slot: "labels".into(),
                    value: Expr::Append {
                        list: Box::new(Expr::Slot("labels".into())),
                        item: Box::new(Expr::Literal(Literal::Str("x".into()))),
                    },
                }],
            }],
        );
        let err = RenderTreeReduce.apply(component, &mut ctx).unwrap_err();
        assert_eq!(err.node_kind, "list");
    }

    #[test]
    fn list_capable_target_keeps_structure() {
        let caps = Capabilities {
            dynamic_list: true,
            ..no_list_caps()
        };
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let component = list_component(Expr::ListLit(Vec::new()), Vec::new());
        let out = RenderTreeReduce.apply(component, &mut ctx).unwrap();
        assert!(matches!(out.root, RenderNode::List { .. }));
    }
}
