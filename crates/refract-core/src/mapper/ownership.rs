//! Rule 1 — ownership downgrade/upgrade.
//!
//! When the target framework has no equivalent of a slot's declared
//! ownership, the slot is rewritten to the nearest supported kind and a
//! fidelity note is recorded. In strict mode the downgrade becomes a
//! failure instead (a per-translation option; the default is to downgrade).

use crate::error::UnsupportedConstruct;
use crate::ir::{Component, FidelityNote, Ownership};

use super::{MapContext, MapPass};

pub struct OwnershipRewrite;

impl MapPass for OwnershipRewrite {
    fn name(&self) -> &'static str {
        "ownership"
    }

    fn apply(
        &self,
        mut component: Component,
        ctx: &mut MapContext<'_>,
    ) -> Result<Component, UnsupportedConstruct> {
        for slot in &mut component.slots {
            match slot.ownership {
                Ownership::SharedObservable if !ctx.caps.shared_observable => {
                    if ctx.options.strict_ownership {
                        return Err(UnsupportedConstruct::new(
                            "state-slot",
                            format!(
                                "slot `{}` is shared-observable and {} has no observable \
                                 state container (strict ownership mode)",
                                slot.name, ctx.caps.framework
                            ),
                        ));
                    }
                    if !ctx.caps.local_state {
                        return Err(UnsupportedConstruct::new(
                            "state-slot",
                            format!(
                                "{} supports neither shared-observable nor local state",
                                ctx.caps.framework
                            ),
                        ));
                    }
                    slot.ownership = Ownership::Local;
                    ctx.notes.push(FidelityNote::new(
                        "ownership-downgrade",
                        format!(
                            "slot `{}` downgraded from shared-observable to local; \
                             external observers of this state are lost",
                            slot.name
                        ),
                    ));
                }
                Ownership::Local if !ctx.caps.local_state => {
                    if !ctx.caps.shared_observable {
                        return Err(UnsupportedConstruct::new(
                            "state-slot",
                            format!("{} has no state container at all", ctx.caps.framework),
                        ));
                    }
                    slot.ownership = Ownership::SharedObservable;
                    ctx.notes.push(FidelityNote::new(
                        "ownership-upgrade",
                        format!(
                            "slot `{}` upgraded from local to shared-observable; \
                             the slot becomes externally visible",
                            slot.name
                        ),
                    ));
                }
                _ => {}
            }
        }
        Ok(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capabilities, Framework};
    use crate::ir::{Expr, Literal, RenderNode, SlotRole, StateSlot, TextStyle, ValueType};
    use crate::pipeline::MapOptions;

    fn shared_slot_component() -> Component {
        Component {
            name: "C".into(),
            records: Vec::new(),
            slots: vec![StateSlot {
                name: "items".into(),
                ty: ValueType::List(Box::new(ValueType::Str)),
                ownership: Ownership::SharedObservable,
                initial: Expr::ListLit(Vec::new()),
                role: SlotRole::Plain,
            }],
            handlers: Vec::new(),
            root: RenderNode::Text {
                content: Expr::Literal(Literal::Str("x".into())),
                style: TextStyle::default(),
            },
        }
    }

    fn local_only_caps() -> Capabilities {
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

    #[test]
    fn downgrades_and_records_note() {
        let caps = local_only_caps();
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let out = OwnershipRewrite
            .apply(shared_slot_component(), &mut ctx)
            .unwrap();
        assert_eq!(out.slots[0].ownership, Ownership::Local);
        assert_eq!(ctx.notes.len(), 1);
        assert_eq!(ctx.notes[0].rule, "ownership-downgrade");
    }

    #[test]
    fn strict_mode_fails_instead_of_downgrading() {
        let caps = local_only_caps();
        let options = MapOptions {
            strict_ownership: true,
        };
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let err = OwnershipRewrite
            .apply(shared_slot_component(), &mut ctx)
            .unwrap_err();
        assert_eq!(err.node_kind, "state-slot");
    }

    #[test]
    fn supported_ownership_is_untouched() {
        let caps = Capabilities {
            shared_observable: true,
            ..local_only_caps()
        };
        let options = MapOptions::default();
        let mut ctx = MapContext {
            caps: &caps,
            options: &options,
            notes: Vec::new(),
        };
        let out = OwnershipRewrite
            .apply(shared_slot_component(), &mut ctx)
            .unwrap();
        assert_eq!(out.slots[0].ownership, Ownership::SharedObservable);
        assert!(ctx.notes.is_empty());
    }
}
