//! Rule 3 — delay materialization.
//!
//! A `Delay` maps to the target's closest "wait N without blocking the
//! render loop" primitive. On a target with no such primitive the delay is
//! rewritten to an immediate no-op that preserves end-state: a bare `Delay`
//! is dropped, and a guarded sleep (`AsyncOp::Sleep`) collapses into its
//! success branch, its failure branch becoming unreachable. Both rewrites
//! record a fidelity note — tests treat them as expected lossy behavior.

use crate::error::UnsupportedConstruct;
use crate::ir::{Action, AsyncOp, Component, FidelityNote};

use super::{MapContext, MapPass};

pub struct DelayMaterialize;

impl MapPass for DelayMaterialize {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn apply(
        &self,
        mut component: Component,
        ctx: &mut MapContext<'_>,
    ) -> Result<Component, UnsupportedConstruct> {
        if ctx.caps.delay {
            return Ok(component);
        }
        for handler in &mut component.handlers {
            let name = handler.name.clone();
            handler.actions = degrade(std::mem::take(&mut handler.actions), &name, ctx);
        }
        Ok(component)
    }
}

fn degrade(actions: Vec<Action>, handler: &str, ctx: &mut MapContext<'_>) -> Vec<Action> {
    let mut out = Vec::with_capacity(actions.len());
    for action in actions {
        match action {
            Action::Delay { nanos } => {
                ctx.notes.push(FidelityNote::new(
                    "delay-degraded",
                    format!(
                        "{}ns delay in handler `{handler}` dropped; {} has no \
                         non-blocking wait primitive",
                        nanos, ctx.caps.framework
                    ),
                ));
            }
            Action::AsyncCall {
                operation: AsyncOp::Sleep { nanos },
                on_success,
                on_failure,
            } => {
                ctx.notes.push(FidelityNote::new(
                    "delay-degraded",
                    format!(
                        "guarded {nanos}ns sleep in handler `{handler}` collapsed to its \
                         success branch; the failure branch is unreachable without a \
                         wait primitive"
                    ),
                ));
                let _ = on_failure;
                out.extend(degrade(on_success, handler, ctx));
            }
            Action::AsyncCall {
                operation,
                on_success,
                on_failure,
            } => out.push(Action::AsyncCall {
                operation,
                on_success: degrade(on_success, handler, ctx),
                on_failure: degrade(on_failure, handler, ctx),
            }),
            Action::Conditional {
                pred,
                then_actions,
                else_actions,
            } => out.push(Action::Conditional {
                pred,
                then_actions: degrade(then_actions, handler, ctx),
                else_actions: degrade(else_actions, handler, ctx),
            }),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, Framework};
    use crate::ir::{
        Expr, Handler, Literal, RenderNode, TextStyle, Trigger,
    };
    use crate::pipeline::MapOptions;

    fn no_delay_caps() -> Capabilities {
        Capabilities {
            framework: Framework::React,
            version: 1,
            shared_observable: false,
            local_state: true,
            async_handlers: true,
            delay: false,
            dynamic_list: true,
            alert_surface: false,
        }
    }

    fn component_with(actions: Vec<Action>) -> Component {
        Component {
            name: "C".into(),
            records: Vec::new(),
            slots: Vec::new(),
            handlers: vec![Handler {
                name: "go".into(),
                trigger: Trigger::UserEvent,
                params: Vec::new(),
                actions,
            }],
            root: RenderNode::Text {
                content: Expr::Literal(Literal::Str("x".into())),
                style: TextStyle::default(),
            },
        }
    }

    #[test]
    fn bare_delay_becomes_noop_with_note() {
        let caps = no_delay_caps();
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let component = component_with(vec![
            Action::Delay { nanos: 500_000_000 },
            Action::Mutate {
                slot: "done".into(),
                value: Expr::Literal(Literal::Bool(true)),
            },
        ]);
        let out = DelayMaterialize.apply(component, &mut ctx).unwrap();
        // End-state preserved: the mutation survives, the wait does not.
        assert_eq!(out.handlers[0].actions.len(), 1);
        assert_eq!(ctx.notes.len(), 1);
        assert_eq!(ctx.notes[0].rule, "delay-degraded");
    }

    #[test]
    fn guarded_sleep_collapses_to_success_branch() {
        let caps = no_delay_caps();
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let component = component_with(vec![Action::AsyncCall {
            operation: AsyncOp::Sleep { nanos: 1000 },
            on_success: vec![Action::Mutate {
                slot: "done".into(),
                value: Expr::Literal(Literal::Bool(true)),
            }],
            on_failure: vec![Action::Mutate {
                slot: "failed".into(),
                value: Expr::Literal(Literal::Bool(true)),
            }],
        }]);
        let out = DelayMaterialize.apply(component, &mut ctx).unwrap();
        match &out.handlers[0].actions[0] {
            Action::Mutate { slot, .. } => assert_eq!(slot, "done"),
            other => panic!("expected inlined success mutate, got {other:?}"),
        }
    }

    #[test]
    fn delay_capable_target_is_untouched() {
        let caps = Capabilities {
            delay: true,
            ..no_delay_caps()
        };
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let component = component_with(vec![Action::Delay { nanos: 42 }]);
        let out = DelayMaterialize.apply(component, &mut ctx).unwrap();
        assert_eq!(out.handlers[0].actions, vec![Action::Delay { nanos: 42 }]);
        assert!(ctx.notes.is_empty());
    }
}
