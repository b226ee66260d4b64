//! Extraction: parsed TSX surface AST → neutral IR component.

use refract_core::error::{ExtractionError, Location};
use refract_core::ir::{
    Action, AsyncOp, Component, Expr, Handler, Layout, Literal, Ownership, RecordDecl,
    RenderNode, SlotRole, StateSlot, TextStyle, Trigger, ValueType,
};

use crate::ast::{AttrValue, JsxNode, TsxFunction, TsxModule, TsxState, TsxStmt};
use crate::expr::{parse_expr, ExprCtx};

pub fn extract_module(module: &TsxModule) -> Result<Component, ExtractionError> {
    let records: Vec<RecordDecl> = module
        .interfaces
        .iter()
        .map(|iface| {
            let fields = iface
                .fields
                .iter()
                .map(|(name, ty)| Ok((name.clone(), parse_type(ty, iface.line)?)))
                .collect::<Result<Vec<_>, ExtractionError>>()?;
            Ok(RecordDecl {
                name: iface.name.clone(),
                identifiable: fields.iter().any(|(name, _)| name == "id"),
                fields,
            })
        })
        .collect::<Result<_, ExtractionError>>()?;
    let record_names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();

    let slot_names: Vec<String> = module.states.iter().map(|s| s.name.clone()).collect();
    let setters: Vec<(String, String)> = module
        .states
        .iter()
        .map(|s| (s.setter.clone(), s.name.clone()))
        .collect();

    let mut slots = Vec::new();
    for state in &module.states {
        slots.push(extract_slot(state, &slot_names, &record_names)?);
    }

    let mut handlers = Vec::new();
    for function in &module.functions {
        let trigger = if module.effects.iter().any(|e| e.callee == function.name) {
            Trigger::LifecycleInit
        } else {
            Trigger::UserEvent
        };
        handlers.push(extract_handler(
            function,
            trigger,
            &slot_names,
            &setters,
            &record_names,
        )?);
    }
    for effect in &module.effects {
        if !module.functions.iter().any(|f| f.name == effect.callee) {
            return Err(ExtractionError::new(
                format!("mount effect calls undeclared function `{}`", effect.callee),
                Location::line(effect.line),
            ));
        }
    }

    // Slots assigned the caught error message hold the error surface.
    for handler in &handlers {
        for slot in error_assigned_slots(&handler.actions) {
            if let Some(decl) = slots.iter_mut().find(|s| s.name == slot) {
                decl.role = SlotRole::ErrorMessage;
            }
        }
    }

    let handler_names: Vec<String> = handlers.iter().map(|h| h.name.clone()).collect();
    let root = extract_node(
        &module.jsx,
        &slot_names,
        &handler_names,
        &record_names,
        None,
    )?;

    let component = Component {
        name: module.component_name.clone(),
        records,
        slots,
        handlers,
        root,
    };

    // Declaration invariant: everything referenced must be declared.
    for name in component.referenced_slots() {
        if component.slot(&name).is_none() {
            return Err(ExtractionError::new(
                format!("reference to undeclared slot `{name}`"),
                Location::line(1),
            ));
        }
    }

    Ok(component)
}

fn extract_slot(
    state: &TsxState,
    slots: &[String],
    records: &[String],
) -> Result<StateSlot, ExtractionError> {
    let ty = match &state.ty {
        Some(ty) => parse_type(ty, state.line)?,
        None => infer_type(&state.init, state.line)?,
    };
    let ctx = ExprCtx {
        slots,
        records,
        ..Default::default()
    };
    let initial = parse_expr(&state.init, &ctx, state.line)?;
    Ok(StateSlot {
        name: state.name.clone(),
        ty,
        // `useState` is the local-state primitive; React has no observable
        // ownership idiom to recognize.
        ownership: Ownership::Local,
        initial,
        role: SlotRole::Plain,
    })
}

fn parse_type(text: &str, line: usize) -> Result<ValueType, ExtractionError> {
    let text = text.trim();
    if let Some(elem) = text.strip_suffix("[]") {
        return Ok(ValueType::List(Box::new(parse_type(elem, line)?)));
    }
    if let Some(base) = text.strip_suffix("| null").or_else(|| text.strip_suffix("|null")) {
        return Ok(ValueType::Optional(Box::new(parse_type(base, line)?)));
    }
    match text {
        "string" => Ok(ValueType::Str),
        "boolean" => Ok(ValueType::Bool),
        "number" => Ok(ValueType::Int),
        name if name.chars().all(|c| c.is_alphanumeric() || c == '_') && !name.is_empty() => {
            Ok(ValueType::Record(name.to_string()))
        }
        other => Err(ExtractionError::new(
            format!("unsupported type annotation `{other}`"),
            Location::line(line),
        )),
    }
}

fn infer_type(init: &str, line: usize) -> Result<ValueType, ExtractionError> {
    let init = init.trim();
    if init.starts_with('\'') || init.starts_with('"') {
        Ok(ValueType::Str)
    } else if init == "true" || init == "false" {
        Ok(ValueType::Bool)
    } else if init.parse::<i64>().is_ok() {
        Ok(ValueType::Int)
    } else if init == "[]" {
        Ok(ValueType::List(Box::new(ValueType::Str)))
    } else {
        Err(ExtractionError::new(
            format!("cannot infer state type from initializer `{init}`"),
            Location::line(line),
        ))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn extract_handler(
    function: &TsxFunction,
    trigger: Trigger,
    slots: &[String],
    setters: &[(String, String)],
    records: &[String],
) -> Result<Handler, ExtractionError> {
    let params = function
        .params
        .iter()
        .map(|(name, ty)| {
            let ty = match ty {
                Some(ty) => parse_type(ty, function.line)?,
                None => ValueType::Str,
            };
            Ok((name.clone(), ty))
        })
        .collect::<Result<Vec<_>, ExtractionError>>()?;
    let param_names: Vec<String> = params.iter().map(|(n, _)| n.clone()).collect();

    let mut scope = Scope {
        slots,
        params: &param_names,
        setters,
        records,
        result: None,
        error: None,
    };
    let actions = extract_stmts(&function.body, &mut scope)?;

    Ok(Handler {
        name: function.name.clone(),
        trigger,
        params,
        actions,
    })
}

struct Scope<'a> {
    slots: &'a [String],
    params: &'a [String],
    setters: &'a [(String, String)],
    records: &'a [String],
    result: Option<String>,
    error: Option<String>,
}

impl Scope<'_> {
    fn expr_ctx(&self) -> ExprCtx<'_> {
        ExprCtx {
            slots: self.slots,
            params: self.params,
            item: None,
            result: self.result.as_deref(),
            error: self.error.as_deref(),
            records: self.records,
        }
    }
}

fn extract_stmts(stmts: &[TsxStmt], scope: &mut Scope<'_>) -> Result<Vec<Action>, ExtractionError> {
    let mut actions = Vec::new();
    for stmt in stmts {
        match stmt {
            TsxStmt::Call { callee, args, line } => {
                let Some((_, slot)) = scope.setters.iter().find(|(s, _)| s == callee) else {
                    return Err(ExtractionError::new(
                        format!("call to `{callee}` is not a state setter"),
                        Location::line(*line),
                    ));
                };
                if args.len() != 1 {
                    return Err(ExtractionError::new(
                        format!("setter `{callee}` takes exactly one argument"),
                        Location::line(*line),
                    ));
                }
                let value = parse_expr(&args[0], &scope.expr_ctx(), *line)?;
                actions.push(Action::Mutate {
                    slot: slot.clone(),
                    value,
                });
            }
            TsxStmt::ConstAwait {
                binding,
                callee,
                args,
                line,
            } => {
                let args = args
                    .iter()
                    .map(|a| parse_expr(a, &scope.expr_ctx(), *line))
                    .collect::<Result<Vec<_>, _>>()?;
                actions.push(Action::AsyncCall {
                    operation: AsyncOp::Invoke {
                        name: callee.clone(),
                        args,
                    },
                    on_success: Vec::new(),
                    on_failure: Vec::new(),
                });
                // The result binding is visible to the rest of the block; the
                // async-normalization pass folds those trailing statements
                // into the success branch.
                scope.result = Some(binding.clone());
            }
            TsxStmt::Await { callee, args, line } => {
                let args = args
                    .iter()
                    .map(|a| parse_expr(a, &scope.expr_ctx(), *line))
                    .collect::<Result<Vec<_>, _>>()?;
                actions.push(Action::AsyncCall {
                    operation: AsyncOp::Invoke {
                        name: callee.clone(),
                        args,
                    },
                    on_success: Vec::new(),
                    on_failure: Vec::new(),
                });
            }
            TsxStmt::AwaitTimeout { millis, .. } => {
                actions.push(Action::Delay {
                    nanos: millis * 1_000_000,
                });
            }
            TsxStmt::If {
                cond,
                then_body,
                else_body,
                line,
            } => {
                let pred = parse_expr(cond, &scope.expr_ctx(), *line)?;
                let then_actions = extract_stmts(then_body, scope)?;
                let else_actions = extract_stmts(else_body, scope)?;
                actions.push(Action::Conditional {
                    pred,
                    then_actions,
                    else_actions,
                });
            }
            TsxStmt::Try {
                body,
                catch_binding,
                catch_body,
                line,
            } => {
                actions.extend(extract_try(body, catch_binding, catch_body, scope, *line)?);
            }
        }
    }
    Ok(actions)
}

/// A `try`/`catch` is the promise-chain form of a guarded suspension: the
/// first awaited operation becomes the `AsyncCall`, the rest of the `try`
/// body its success branch, the `catch` body its failure branch.
fn extract_try(
    body: &[TsxStmt],
    catch_binding: &str,
    catch_body: &[TsxStmt],
    scope: &mut Scope<'_>,
    line: usize,
) -> Result<Vec<Action>, ExtractionError> {
    let split = body.iter().position(|s| {
        matches!(
            s,
            TsxStmt::Await { .. } | TsxStmt::AwaitTimeout { .. } | TsxStmt::ConstAwait { .. }
        )
    });
    let Some(split) = split else {
        return Err(ExtractionError::new(
            "try block without an awaited operation",
            Location::line(line),
        ));
    };

    let mut actions = extract_stmts(&body[..split], scope)?;

    let operation = match &body[split] {
        TsxStmt::AwaitTimeout { millis, .. } => AsyncOp::Sleep {
            nanos: millis * 1_000_000,
        },
        TsxStmt::Await { callee, args, line } | TsxStmt::ConstAwait { callee, args, line, .. } => {
            let args = args
                .iter()
                .map(|a| parse_expr(a, &scope.expr_ctx(), *line))
                .collect::<Result<Vec<_>, _>>()?;
            AsyncOp::Invoke {
                name: callee.clone(),
                args,
            }
        }
        _ => unreachable!("split matched an awaited statement"),
    };
    if let TsxStmt::ConstAwait { binding, .. } = &body[split] {
        scope.result = Some(binding.clone());
    }

    let on_success = extract_stmts(&body[split + 1..], scope)?;

    let saved_error = scope.error.replace(catch_binding.to_string());
    let on_failure = extract_stmts(catch_body, scope)?;
    scope.error = saved_error;

    actions.push(Action::AsyncCall {
        operation,
        on_success,
        on_failure,
    });
    Ok(actions)
}

fn error_assigned_slots(actions: &[Action]) -> Vec<String> {
    let mut out = Vec::new();
    for action in actions {
        match action {
            Action::Mutate { slot, value } if *value == Expr::ErrorMessage => {
                out.push(slot.clone());
            }
            Action::AsyncCall {
                on_success,
                on_failure,
                ..
            } => {
                out.extend(error_assigned_slots(on_success));
                out.extend(error_assigned_slots(on_failure));
            }
            Action::Conditional {
                then_actions,
                else_actions,
                ..
            } => {
                out.extend(error_assigned_slots(then_actions));
                out.extend(error_assigned_slots(else_actions));
            }
            _ => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Render tree
// ---------------------------------------------------------------------------

fn extract_node(
    node: &JsxNode,
    slots: &[String],
    handlers: &[String],
    records: &[String],
    item: Option<&str>,
) -> Result<RenderNode, ExtractionError> {
    let ctx = ExprCtx {
        slots,
        records,
        item,
        ..Default::default()
    };
    match node {
        JsxNode::Element {
            tag,
            attrs,
            children,
            line,
        } => extract_element(tag, attrs, children, *line, slots, handlers, records, item),
        JsxNode::Text(text, _) => Ok(RenderNode::Text {
            content: Expr::Literal(Literal::Str(text.clone())),
            style: TextStyle::default(),
        }),
        JsxNode::ExprText(text, line) => Ok(RenderNode::Text {
            content: parse_expr(text, &ctx, *line)?,
            style: TextStyle::default(),
        }),
        JsxNode::ListMap {
            items,
            binding,
            row,
            line,
        } => {
            if !slots.iter().any(|s| s == items) {
                return Err(ExtractionError::new(
                    format!("list renders undeclared slot `{items}`"),
                    Location::line(*line),
                ));
            }
            let row = extract_node(row, slots, handlers, records, Some(binding))?;
            Ok(RenderNode::List {
                items: items.clone(),
                binding: binding.clone(),
                row: Box::new(unwrap_list_row(row)),
            })
        }
        JsxNode::CondExpr {
            cond,
            then_node,
            else_node,
            line,
        } => {
            let pred = parse_expr(cond, &ctx, *line)?;
            let then_node = extract_node(then_node, slots, handlers, records, item)?;
            let else_node = match else_node {
                Some(n) => Some(Box::new(extract_node(n, slots, handlers, records, item)?)),
                None => None,
            };
            Ok(RenderNode::Conditional {
                pred,
                then_node: Box::new(then_node),
                else_node,
            })
        }
    }
}

/// An `<li>` wrapper exists only for list markup; its single child (or a row
/// of children) is the actual row template.
fn unwrap_list_row(row: RenderNode) -> RenderNode {
    match row {
        RenderNode::Container { children, .. } if children.len() == 1 => {
            children.into_iter().next().unwrap()
        }
        other => other,
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_element(
    tag: &str,
    attrs: &[(String, AttrValue)],
    children: &[JsxNode],
    line: usize,
    slots: &[String],
    handlers: &[String],
    records: &[String],
    item: Option<&str>,
) -> Result<RenderNode, ExtractionError> {
    let ctx = ExprCtx {
        slots,
        records,
        item,
        ..Default::default()
    };
    let class = attrs.iter().find_map(|(name, value)| match value {
        AttrValue::Str(s) if name == "className" => Some(s.as_str()),
        _ => None,
    });

    match tag {
        "div" => {
            let layout = match class {
                Some("row") => Layout::Row,
                _ => Layout::Column,
            };
            let children = children
                .iter()
                .map(|c| extract_node(c, slots, handlers, records, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RenderNode::Container { layout, children })
        }
        "h1" | "h2" | "h3" => {
            let content = single_text_content(children, &ctx, line)?;
            Ok(RenderNode::Text {
                content,
                style: TextStyle {
                    heading: true,
                    strikethrough_when: None,
                },
            })
        }
        "p" if class == Some("progress") => {
            let label = match children.first() {
                Some(JsxNode::Text(text, _)) => Some(text.clone()),
                None => None,
                _ => {
                    return Err(ExtractionError::new(
                        "progress indicator must have a literal label",
                        Location::line(line),
                    ))
                }
            };
            Ok(RenderNode::Progress { label })
        }
        "p" | "span" => {
            let strikethrough_when = attrs.iter().find_map(|(name, value)| {
                match (name.as_str(), value) {
                    // `className={cond ? 'done' : ''}` marks completed rows.
                    ("className", AttrValue::Expr(expr)) => expr
                        .split_once('?')
                        .map(|(cond, _)| cond.trim().to_string()),
                    _ => None,
                }
            });
            let strikethrough_when = match strikethrough_when {
                Some(cond) => Some(parse_expr(&cond, &ctx, line)?),
                None => None,
            };
            let content = single_text_content(children, &ctx, line)?;
            Ok(RenderNode::Text {
                content,
                style: TextStyle {
                    heading: false,
                    strikethrough_when,
                },
            })
        }
        "input" => extract_input(attrs, line, &ctx),
        "button" => extract_button(attrs, children, line, handlers, &ctx),
        "ul" | "ol" => {
            let [child] = children else {
                return Err(ExtractionError::new(
                    "list element must contain exactly one `.map` template",
                    Location::line(line),
                ));
            };
            extract_node(child, slots, handlers, records, item)
        }
        "li" => {
            let children = children
                .iter()
                .map(|c| extract_node(c, slots, handlers, records, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RenderNode::Container {
                layout: Layout::Row,
                children,
            })
        }
        other => Err(ExtractionError::new(
            format!("render construct `<{other}>` has no mapping rule"),
            Location::line(line),
        )),
    }
}

fn single_text_content(
    children: &[JsxNode],
    ctx: &ExprCtx<'_>,
    line: usize,
) -> Result<Expr, ExtractionError> {
    match children {
        [JsxNode::Text(text, _)] => Ok(Expr::Literal(Literal::Str(text.clone()))),
        [JsxNode::ExprText(text, line)] => parse_expr(text, ctx, *line),
        _ => Err(ExtractionError::new(
            "expected a single text child",
            Location::line(line),
        )),
    }
}

fn extract_input(
    attrs: &[(String, AttrValue)],
    line: usize,
    ctx: &ExprCtx<'_>,
) -> Result<RenderNode, ExtractionError> {
    let mut binding = None;
    let mut placeholder = String::new();
    let mut disabled_when = None;
    for (name, value) in attrs {
        match (name.as_str(), value) {
            ("value", AttrValue::Expr(expr)) => binding = Some(expr.clone()),
            ("placeholder", AttrValue::Str(s)) => placeholder = s.clone(),
            ("disabled", AttrValue::Expr(expr)) => {
                disabled_when = Some(parse_expr(expr, ctx, line)?);
            }
            ("onChange", _) | ("key", _) => {}
            (other, _) => {
                return Err(ExtractionError::new(
                    format!("unsupported input attribute `{other}`"),
                    Location::line(line),
                ))
            }
        }
    }
    let binding = binding.ok_or_else(|| {
        ExtractionError::new("input without a `value` binding", Location::line(line))
    })?;
    if !ctx.slots.iter().any(|s| *s == binding) {
        return Err(ExtractionError::new(
            format!("input binds undeclared slot `{binding}`"),
            Location::line(line),
        ));
    }
    Ok(RenderNode::Input {
        binding,
        placeholder,
        disabled_when,
    })
}

fn extract_button(
    attrs: &[(String, AttrValue)],
    children: &[JsxNode],
    line: usize,
    handlers: &[String],
    ctx: &ExprCtx<'_>,
) -> Result<RenderNode, ExtractionError> {
    let mut on_trigger = None;
    let mut args = Vec::new();
    let mut disabled_when = None;
    for (name, value) in attrs {
        match (name.as_str(), value) {
            ("onClick", AttrValue::Expr(expr)) => {
                let expr = expr.trim();
                // Either a bare handler reference or `() => handler(args)`.
                if let Some(arrow) = expr.strip_prefix("() =>") {
                    let call = arrow.trim();
                    let open = call.find('(').ok_or_else(|| {
                        ExtractionError::new("onClick arrow must call a handler", Location::line(line))
                    })?;
                    on_trigger = Some(call[..open].trim().to_string());
                    let inner = call[open + 1..].trim_end_matches(')');
                    for arg in crate::parser::split_top_commas(inner) {
                        args.push(parse_expr(&arg, ctx, line)?);
                    }
                } else {
                    on_trigger = Some(expr.to_string());
                }
            }
            ("disabled", AttrValue::Expr(expr)) => {
                disabled_when = Some(parse_expr(expr, ctx, line)?);
            }
            ("key", _) => {}
            (other, _) => {
                return Err(ExtractionError::new(
                    format!("unsupported button attribute `{other}`"),
                    Location::line(line),
                ))
            }
        }
    }
    let on_trigger = on_trigger.ok_or_else(|| {
        ExtractionError::new("button without an onClick handler", Location::line(line))
    })?;
    if !handlers.iter().any(|h| *h == on_trigger) {
        return Err(ExtractionError::new(
            format!("button triggers undeclared handler `{on_trigger}`"),
            Location::line(line),
        ));
    }
    let label = single_text_content(children, ctx, line)?;
    Ok(RenderNode::Button {
        label,
        on_trigger,
        args,
        disabled_when,
    })
}
