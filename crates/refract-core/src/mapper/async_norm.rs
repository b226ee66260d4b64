//! Rule 2 — async normalization.
//!
//! Both source idioms (structured-concurrency tasks, promise chains) reduce
//! to the same abstract operation: suspend the enclosing handler, resume
//! into exactly one of two outcome branches, and start no concurrent
//! invocation of the same handler in between. The normal form this pass
//! establishes is that an `AsyncCall` is the *last* action in its sequence:
//! any trailing actions are folded into the tail of both outcome branches,
//! so every emitter gets single-flight ordering for free — a state mutation
//! can only ever be emitted after the suspension that precedes it.

use crate::error::UnsupportedConstruct;
use crate::ir::{Action, Component};

use super::{MapContext, MapPass};

pub struct AsyncNormalize;

impl MapPass for AsyncNormalize {
    fn name(&self) -> &'static str {
        "async-normalize"
    }

    fn apply(
        &self,
        mut component: Component,
        ctx: &mut MapContext<'_>,
    ) -> Result<Component, UnsupportedConstruct> {
        for handler in &mut component.handlers {
            if handler.is_async() && !ctx.caps.async_handlers {
                return Err(UnsupportedConstruct::new(
                    "async-call",
                    format!(
                        "handler `{}` suspends, but {} has no async handler idiom",
                        handler.name, ctx.caps.framework
                    ),
                ));
            }
            handler.actions = normalize(std::mem::take(&mut handler.actions));
        }
        Ok(component)
    }
}

/// Rewrite a sequence so that no action follows an `AsyncCall`: everything
/// after one is moved into the tail of both its outcome branches. Applied
/// recursively to nested sequences.
fn normalize(actions: Vec<Action>) -> Vec<Action> {
    let mut out = Vec::with_capacity(actions.len());
    let mut iter = actions.into_iter();

    while let Some(action) = iter.next() {
        match action {
            Action::AsyncCall {
                operation,
                on_success,
                on_failure,
            } => {
                let trailing: Vec<Action> = iter.collect();
                let mut on_success = normalize(on_success);
                let mut on_failure = normalize(on_failure);
                if !trailing.is_empty() {
                    // Trailing actions run after resumption. With a failure
                    // branch both outcomes fall through to them; without one
                    // a failure propagates out of the handler, so only the
                    // success path reaches them.
                    on_success.extend(trailing.clone());
                    on_success = normalize(on_success);
                    if !on_failure.is_empty() {
                        on_failure.extend(trailing);
                        on_failure = normalize(on_failure);
                    }
                }
                out.push(Action::AsyncCall {
                    operation,
                    on_success,
                    on_failure,
                });
                return out;
            }
            Action::Conditional {
                pred,
                then_actions,
                else_actions,
            } => {
                out.push(Action::Conditional {
                    pred,
                    then_actions: normalize(then_actions),
                    else_actions: normalize(else_actions),
                });
            }
            other => out.push(other),
        }
    }

    out
}

/// True when no action follows an `AsyncCall` anywhere in the sequence —
/// the invariant emitters rely on for single-flight ordering.
pub fn is_normalized(actions: &[Action]) -> bool {
    for (i, action) in actions.iter().enumerate() {
        match action {
            Action::AsyncCall {
                on_success,
                on_failure,
                ..
            } => {
                if i + 1 != actions.len() {
                    return false;
                }
                return is_normalized(on_success) && is_normalized(on_failure);
            }
            Action::Conditional {
                then_actions,
                else_actions,
                ..
            } => {
                if !is_normalized(then_actions) || !is_normalized(else_actions) {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AsyncOp, Expr, Literal};

    fn mutate(slot: &str, b: bool) -> Action {
        Action::Mutate {
            slot: slot.into(),
            value: Expr::Literal(Literal::Bool(b)),
        }
    }

    #[test]
    fn trailing_actions_fold_into_both_branches_when_guarded() {
        let actions = vec![
            mutate("loading", true),
            Action::AsyncCall {
                operation: AsyncOp::Invoke {
                    name: "submit".into(),
                    args: Vec::new(),
                },
                on_success: vec![mutate("done", true)],
                on_failure: vec![mutate("failed", true)],
            },
            mutate("loading", false),
        ];
        let normalized = normalize(actions);
        assert!(is_normalized(&normalized));
        assert_eq!(normalized.len(), 2);
        match &normalized[1] {
            Action::AsyncCall {
                on_success,
                on_failure,
                ..
            } => {
                assert_eq!(on_success.len(), 2);
                assert_eq!(on_failure.len(), 2);
                assert_eq!(on_success[1], mutate("loading", false));
                assert_eq!(on_failure[1], mutate("loading", false));
            }
            other => panic!("expected AsyncCall, got {other:?}"),
        }
    }

    #[test]
    fn unguarded_call_folds_trailing_into_success_only() {
        let actions = vec![
            Action::AsyncCall {
                operation: AsyncOp::Invoke {
                    name: "submit".into(),
                    args: Vec::new(),
                },
                on_success: Vec::new(),
                on_failure: Vec::new(),
            },
            mutate("loading", false),
        ];
        let normalized = normalize(actions);
        assert!(is_normalized(&normalized));
        match &normalized[0] {
            Action::AsyncCall {
                on_success,
                on_failure,
                ..
            } => {
                assert_eq!(on_success.len(), 1);
                assert!(on_failure.is_empty());
            }
            other => panic!("expected AsyncCall, got {other:?}"),
        }
    }

    #[test]
    fn already_normalized_chain_is_unchanged() {
        let actions = vec![
            mutate("loading", true),
            Action::AsyncCall {
                operation: AsyncOp::Sleep { nanos: 1_000_000 },
                on_success: vec![mutate("loading", false)],
                on_failure: vec![mutate("failed", true)],
            },
        ];
        let normalized = normalize(actions.clone());
        assert_eq!(normalized, actions);
    }

    #[test]
    fn nested_conditionals_are_normalized() {
        let actions = vec![Action::Conditional {
            pred: Expr::Slot("ready".into()),
            then_actions: vec![
                Action::AsyncCall {
                    operation: AsyncOp::Invoke {
                        name: "go".into(),
                        args: Vec::new(),
                    },
                    on_success: Vec::new(),
                    on_failure: Vec::new(),
                },
                mutate("ready", false),
            ],
            else_actions: Vec::new(),
        }];
        let normalized = normalize(actions);
        assert!(is_normalized(&normalized));
    }
}
