//! Extraction: parsed SwiftUI surface AST → neutral IR component.
//!
//! `@Published` view-model properties become shared-observable slots,
//! `@State` view properties become local slots, `Task { do/catch }` regions
//! flatten into async action chains, and the view DSL reduces to the render
//! tree. The `.alert` modifier becomes the `ErrorAlert` node bound to the
//! error-message slot.

use refract_core::error::{ExtractionError, Location};
use refract_core::ir::{
    Action, AsyncOp, Component, Expr, Handler, Layout, Literal, Ownership, RecordDecl,
    RenderNode, SlotRole, StateSlot, TextStyle, Trigger, ValueType,
};

use crate::ast::{SwiftFile, SwiftFunc, SwiftProperty, SwiftStmt, SwiftViewNode};
use crate::expr::{parse_expr, ExprCtx};

pub fn extract_file(file: &SwiftFile) -> Result<Component, ExtractionError> {
    let records: Vec<RecordDecl> = file
        .records
        .iter()
        .map(|record| {
            let fields = record
                .fields
                .iter()
                .map(|(name, ty)| Ok((name.clone(), parse_type(ty, record.line)?)))
                .collect::<Result<Vec<_>, ExtractionError>>()?;
            Ok(RecordDecl {
                name: record.name.clone(),
                identifiable: record.identifiable,
                fields,
            })
        })
        .collect::<Result<_, ExtractionError>>()?;
    let record_names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();

    // Slot order: published view-model state first, then view-local state —
    // matching source declaration order.
    let mut slot_names = Vec::new();
    if let Some(model) = &file.model {
        for prop in &model.published {
            slot_names.push(prop.name.clone());
        }
    }
    for prop in &file.view.states {
        slot_names.push(prop.name.clone());
    }

    let mut slots = Vec::new();
    if let Some(model) = &file.model {
        for prop in &model.published {
            slots.push(extract_slot(
                prop,
                Ownership::SharedObservable,
                &slot_names,
                &record_names,
            )?);
        }
    }
    for prop in &file.view.states {
        slots.push(extract_slot(
            prop,
            Ownership::Local,
            &slot_names,
            &record_names,
        )?);
    }

    // Lifecycle triggers: view-model `init()` calls and `.onAppear`.
    let mut init_calls: Vec<String> = file
        .model
        .as_ref()
        .map(|m| m.init_calls.clone())
        .unwrap_or_default();
    if let Some(on_appear) = &file.view.on_appear {
        init_calls.push(on_appear_callee(on_appear, file.view.line)?);
    }

    let model_var = file.view.state_object.as_ref().map(|(v, _)| v.as_str());
    let mut handlers = Vec::new();
    let model_funcs = file.model.as_ref().map(|m| &m.funcs[..]).unwrap_or(&[]);
    for func in model_funcs.iter().chain(&file.view.funcs) {
        let trigger = if init_calls.iter().any(|c| c == &func.name) {
            Trigger::LifecycleInit
        } else {
            Trigger::UserEvent
        };
        handlers.push(extract_handler(
            func,
            trigger,
            &slot_names,
            &record_names,
            model_var,
        )?);
    }

    // Slots assigned the caught error message hold the error surface.
    let mut error_slots: Vec<String> = Vec::new();
    for handler in &handlers {
        error_slots.extend(error_assigned_slots(&handler.actions));
    }
    for slot in &mut slots {
        if error_slots.contains(&slot.name) {
            slot.role = SlotRole::ErrorMessage;
        }
    }

    let handler_names: Vec<String> = handlers.iter().map(|h| h.name.clone()).collect();
    let view_ctx = ViewCtx {
        slots: &slot_names,
        handlers: &handler_names,
        records: &record_names,
        model_var,
    };
    let mut root_children = extract_nodes(&file.view.body, &view_ctx, None)?;

    // The `.alert` modifier renders through the dedicated error surface.
    if let Some(alert) = &file.view.alert {
        let slot = alert_slot(alert, &slots, file.view.line)?;
        if let Some(decl) = slots.iter_mut().find(|s| s.name == slot) {
            decl.role = SlotRole::ErrorMessage;
        }
        root_children.push(RenderNode::ErrorAlert {
            slot,
            title: first_string_literal(alert).unwrap_or_else(|| "Error".to_string()),
        });
    }

    let root = wrap_children(root_children);

    let component = Component {
        name: file.view.name.clone(),
        records,
        slots,
        handlers,
        root,
    };

    for name in component.referenced_slots() {
        if component.slot(&name).is_none() {
            return Err(ExtractionError::new(
                format!("reference to undeclared slot `{name}`"),
                Location::line(file.view.line),
            ));
        }
    }

    Ok(component)
}

fn extract_slot(
    prop: &SwiftProperty,
    ownership: Ownership,
    slots: &[String],
    records: &[String],
) -> Result<StateSlot, ExtractionError> {
    let ty = match &prop.ty {
        Some(ty) => parse_type(ty, prop.line)?,
        None => infer_type(prop.init.as_deref(), prop.line)?,
    };
    let ctx = ExprCtx {
        slots,
        records,
        ..Default::default()
    };
    let initial = match &prop.init {
        Some(init) => parse_expr(init, &ctx, prop.line)?,
        // Optionals without an initializer start nil.
        None if matches!(ty, ValueType::Optional(_)) => Expr::Literal(Literal::Nil),
        None => {
            return Err(ExtractionError::new(
                format!("state `{}` has no initial value", prop.name),
                Location::line(prop.line),
            ))
        }
    };
    Ok(StateSlot {
        name: prop.name.clone(),
        ty,
        ownership,
        initial,
        role: SlotRole::Plain,
    })
}

fn parse_type(text: &str, line: usize) -> Result<ValueType, ExtractionError> {
    let text = text.trim();
    if let Some(base) = text.strip_suffix('?') {
        return Ok(ValueType::Optional(Box::new(parse_type(base, line)?)));
    }
    if text.starts_with('[') && text.ends_with(']') {
        return Ok(ValueType::List(Box::new(parse_type(
            &text[1..text.len() - 1],
            line,
        )?)));
    }
    match text {
        "String" => Ok(ValueType::Str),
        "Bool" => Ok(ValueType::Bool),
        "Int" => Ok(ValueType::Int),
        "Double" => Ok(ValueType::Double),
        "UUID" => Ok(ValueType::Uuid),
        name if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') => {
            Ok(ValueType::Record(name.to_string()))
        }
        other => Err(ExtractionError::new(
            format!("unsupported type annotation `{other}`"),
            Location::line(line),
        )),
    }
}

fn infer_type(init: Option<&str>, line: usize) -> Result<ValueType, ExtractionError> {
    match init.map(str::trim) {
        Some(init) if init.starts_with('"') => Ok(ValueType::Str),
        Some("true") | Some("false") => Ok(ValueType::Bool),
        Some(init) if init.parse::<i64>().is_ok() => Ok(ValueType::Int),
        Some("[]") => Ok(ValueType::List(Box::new(ValueType::Str))),
        other => Err(ExtractionError::new(
            format!("cannot infer state type from initializer `{other:?}`"),
            Location::line(line),
        )),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn extract_handler(
    func: &SwiftFunc,
    trigger: Trigger,
    slots: &[String],
    records: &[String],
    model_var: Option<&str>,
) -> Result<Handler, ExtractionError> {
    let params = func
        .params
        .iter()
        .map(|(name, ty)| Ok((name.clone(), parse_type(ty, func.line)?)))
        .collect::<Result<Vec<_>, ExtractionError>>()?;
    let param_names: Vec<String> = params.iter().map(|(n, _)| n.clone()).collect();

    let mut scope = Scope {
        slots,
        params: &param_names,
        records,
        model_var,
        result: None,
        in_catch: false,
    };
    let actions = extract_stmts(&func.body, &mut scope)?;

    Ok(Handler {
        name: func.name.clone(),
        trigger,
        params,
        actions,
    })
}

struct Scope<'a> {
    slots: &'a [String],
    params: &'a [String],
    records: &'a [String],
    model_var: Option<&'a str>,
    result: Option<String>,
    in_catch: bool,
}

impl Scope<'_> {
    fn expr_ctx(&self) -> ExprCtx<'_> {
        ExprCtx {
            slots: self.slots,
            params: self.params,
            model_var: self.model_var,
            item: None,
            item_list: None,
            result: self.result.as_deref(),
            in_catch: self.in_catch,
            records: self.records,
        }
    }

    fn slot_target(&self, target: &str, line: usize) -> Result<String, ExtractionError> {
        let target = target.trim();
        let name = match self.model_var {
            Some(model) => target
                .strip_prefix(&format!("{model}."))
                .unwrap_or(target),
            None => target,
        };
        if self.slots.iter().any(|s| s == name) {
            Ok(name.to_string())
        } else {
            Err(ExtractionError::new(
                format!("mutation of undeclared slot `{name}`"),
                Location::line(line),
            ))
        }
    }
}

fn extract_stmts(
    stmts: &[SwiftStmt],
    scope: &mut Scope<'_>,
) -> Result<Vec<Action>, ExtractionError> {
    let mut actions = Vec::new();
    for stmt in stmts {
        match stmt {
            SwiftStmt::Assign {
                target,
                value,
                line,
            } => {
                let slot = scope.slot_target(target, *line)?;
                let value = parse_expr(value, &scope.expr_ctx(), *line)?;
                actions.push(Action::Mutate { slot, value });
            }
            SwiftStmt::Append { list, value, line } => {
                let slot = scope.slot_target(list, *line)?;
                let item = parse_expr(value, &scope.expr_ctx(), *line)?;
                actions.push(Action::Mutate {
                    slot: slot.clone(),
                    value: Expr::Append {
                        list: Box::new(Expr::Slot(slot)),
                        item: Box::new(item),
                    },
                });
            }
            SwiftStmt::RemoveAll { list, id, line } => {
                let slot = scope.slot_target(list, *line)?;
                let id = parse_expr(id, &scope.expr_ctx(), *line)?;
                actions.push(Action::Mutate {
                    slot: slot.clone(),
                    value: Expr::RemoveWhere {
                        list: Box::new(Expr::Slot(slot)),
                        id: Box::new(id),
                    },
                });
            }
            SwiftStmt::ToggleAt {
                list,
                id,
                field,
                line,
            } => {
                let slot = scope.slot_target(list, *line)?;
                let id = parse_expr(id, &scope.expr_ctx(), *line)?;
                actions.push(Action::Mutate {
                    slot: slot.clone(),
                    value: Expr::ToggleWhere {
                        list: Box::new(Expr::Slot(slot)),
                        id: Box::new(id),
                        field: field.clone(),
                    },
                });
            }
            SwiftStmt::Call { callee, line, .. } => {
                return Err(ExtractionError::new(
                    format!("handler bodies may not call `{callee}` directly"),
                    Location::line(*line),
                ));
            }
            // The task block is the async boundary; its body is the chain.
            SwiftStmt::TaskBlock { body, .. } => {
                actions.extend(extract_stmts(body, scope)?);
            }
            SwiftStmt::DoCatch {
                body,
                catch_body,
                line,
            } => {
                actions.extend(extract_do_catch(body, catch_body, scope, *line)?);
            }
            SwiftStmt::TrySleep { nanos, .. } => {
                actions.push(Action::Delay { nanos: *nanos });
            }
            SwiftStmt::AwaitCall {
                binding,
                callee,
                args,
                line,
            } => {
                let args = args
                    .iter()
                    .map(|a| parse_expr(strip_arg_label(a), &scope.expr_ctx(), *line))
                    .collect::<Result<Vec<_>, _>>()?;
                actions.push(Action::AsyncCall {
                    operation: AsyncOp::Invoke {
                        name: callee.clone(),
                        args,
                    },
                    on_success: Vec::new(),
                    on_failure: Vec::new(),
                });
                if let Some(binding) = binding {
                    scope.result = Some(binding.clone());
                }
            }
            SwiftStmt::If {
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
        }
    }
    Ok(actions)
}

/// A `do`/`catch` is the structured-concurrency form of a guarded
/// suspension: the first throwing await becomes the `AsyncCall`, the rest
/// of the `do` body its success branch, the `catch` body its failure branch.
fn extract_do_catch(
    body: &[SwiftStmt],
    catch_body: &[SwiftStmt],
    scope: &mut Scope<'_>,
    line: usize,
) -> Result<Vec<Action>, ExtractionError> {
    let split = body.iter().position(|s| {
        matches!(s, SwiftStmt::TrySleep { .. } | SwiftStmt::AwaitCall { .. })
    });
    let Some(split) = split else {
        return Err(ExtractionError::new(
            "do block without an awaited operation",
            Location::line(line),
        ));
    };

    let mut actions = extract_stmts(&body[..split], scope)?;

    let operation = match &body[split] {
        SwiftStmt::TrySleep { nanos, .. } => AsyncOp::Sleep { nanos: *nanos },
        SwiftStmt::AwaitCall {
            callee, args, line, ..
        } => {
            let args = args
                .iter()
                .map(|a| parse_expr(strip_arg_label(a), &scope.expr_ctx(), *line))
                .collect::<Result<Vec<_>, _>>()?;
            AsyncOp::Invoke {
                name: callee.clone(),
                args,
            }
        }
        _ => unreachable!("split matched an awaited statement"),
    };
    if let SwiftStmt::AwaitCall {
        binding: Some(binding),
        ..
    } = &body[split]
    {
        scope.result = Some(binding.clone());
    }

    let on_success = extract_stmts(&body[split + 1..], scope)?;

    let was_in_catch = std::mem::replace(&mut scope.in_catch, true);
    let on_failure = extract_stmts(catch_body, scope)?;
    scope.in_catch = was_in_catch;

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

/// `label: value` call arguments drop the label; the parameter order binds.
fn strip_arg_label(arg: &str) -> &str {
    match arg.split_once(':') {
        Some((label, value))
            if label
                .trim()
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_') =>
        {
            value.trim()
        }
        _ => arg.trim(),
    }
}

// ---------------------------------------------------------------------------
// Render tree
// ---------------------------------------------------------------------------

struct ViewCtx<'a> {
    slots: &'a [String],
    handlers: &'a [String],
    records: &'a [String],
    model_var: Option<&'a str>,
}

impl ViewCtx<'_> {
    fn expr_ctx<'b>(&'b self, item: Option<&'b ItemCtx>) -> ExprCtx<'b> {
        ExprCtx {
            slots: self.slots,
            params: &[],
            model_var: self.model_var,
            item: item.map(|i| i.binding.as_str()),
            item_list: item.and_then(|i| i.list.as_deref()),
            result: None,
            in_catch: false,
            records: self.records,
        }
    }

    /// Strip the view-model variable off a slot path (`model.tasks` → `tasks`).
    fn slot_path(&self, text: &str) -> String {
        let text = text.trim();
        match self.model_var {
            Some(model) => text
                .strip_prefix(&format!("{model}."))
                .unwrap_or(text)
                .to_string(),
            None => text.to_string(),
        }
    }
}

struct ItemCtx {
    binding: String,
    /// Items slot when rows are read as `items[index]`.
    list: Option<String>,
}

fn wrap_children(mut children: Vec<RenderNode>) -> RenderNode {
    if children.len() == 1 {
        children.pop().unwrap()
    } else {
        RenderNode::Container {
            layout: Layout::Column,
            children,
        }
    }
}

fn extract_nodes(
    nodes: &[SwiftViewNode],
    ctx: &ViewCtx<'_>,
    item: Option<&ItemCtx>,
) -> Result<Vec<RenderNode>, ExtractionError> {
    nodes.iter().map(|n| extract_node(n, ctx, item)).collect()
}

fn extract_node(
    node: &SwiftViewNode,
    ctx: &ViewCtx<'_>,
    item: Option<&ItemCtx>,
) -> Result<RenderNode, ExtractionError> {
    match node {
        SwiftViewNode::Stack {
            horizontal,
            children,
            line: _,
        } => Ok(RenderNode::Container {
            layout: if *horizontal {
                Layout::Row
            } else {
                Layout::Column
            },
            children: extract_nodes(children, ctx, item)?,
        }),
        SwiftViewNode::Text {
            expr,
            heading,
            strikethrough,
            line,
        } => {
            let content = parse_expr(expr, &ctx.expr_ctx(item), *line)?;
            let strikethrough_when = match strikethrough {
                Some(s) => Some(parse_expr(s, &ctx.expr_ctx(item), *line)?),
                None => None,
            };
            Ok(RenderNode::Text {
                content,
                style: TextStyle {
                    heading: *heading,
                    strikethrough_when,
                },
            })
        }
        SwiftViewNode::TextField {
            placeholder,
            binding,
            disabled,
            line,
        } => {
            let slot = ctx.slot_path(binding);
            if !ctx.slots.iter().any(|s| *s == slot) {
                return Err(ExtractionError::new(
                    format!("text field binds undeclared slot `{slot}`"),
                    Location::line(*line),
                ));
            }
            let disabled_when = match disabled {
                Some(d) => Some(parse_expr(d, &ctx.expr_ctx(item), *line)?),
                None => None,
            };
            Ok(RenderNode::Input {
                binding: slot,
                placeholder: placeholder.clone(),
                disabled_when,
            })
        }
        SwiftViewNode::Button {
            label,
            action,
            label_expr,
            body,
            disabled,
            line,
        } => extract_button(
            label.as_deref(),
            action.as_deref(),
            label_expr.as_deref(),
            body,
            disabled.as_deref(),
            *line,
            ctx,
            item,
        ),
        SwiftViewNode::List {
            items,
            binding,
            indices,
            children,
            line,
        } => {
            let slot = ctx.slot_path(items);
            if !ctx.slots.iter().any(|s| *s == slot) {
                return Err(ExtractionError::new(
                    format!("list renders undeclared slot `{slot}`"),
                    Location::line(*line),
                ));
            }
            let row_item = ItemCtx {
                binding: binding.clone(),
                list: indices.then(|| slot.clone()),
            };
            let rows = extract_nodes(children, ctx, Some(&row_item))?;
            Ok(RenderNode::List {
                items: slot,
                binding: if *indices {
                    "item".to_string()
                } else {
                    binding.clone()
                },
                row: Box::new(match rows.len() {
                    1 => rows.into_iter().next().unwrap(),
                    _ => RenderNode::Container {
                        layout: Layout::Row,
                        children: rows,
                    },
                }),
            })
        }
        SwiftViewNode::If {
            cond,
            then_children,
            else_children,
            line,
        } => {
            let pred = parse_expr(cond, &ctx.expr_ctx(item), *line)?;
            let then_node = wrap_children(extract_nodes(then_children, ctx, item)?);
            let else_node = if else_children.is_empty() {
                None
            } else {
                Some(Box::new(wrap_children(extract_nodes(
                    else_children,
                    ctx,
                    item,
                )?)))
            };
            Ok(RenderNode::Conditional {
                pred,
                then_node: Box::new(then_node),
                else_node,
            })
        }
        SwiftViewNode::Progress { label, line: _ } => Ok(RenderNode::Progress {
            label: label.clone(),
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_button(
    label: Option<&str>,
    action: Option<&str>,
    label_expr: Option<&str>,
    body: &[SwiftStmt],
    disabled: Option<&str>,
    line: usize,
    ctx: &ViewCtx<'_>,
    item: Option<&ItemCtx>,
) -> Result<RenderNode, ExtractionError> {
    let label = match (label, label_expr) {
        (Some(text), _) => Expr::Literal(Literal::Str(text.to_string())),
        (None, Some(expr)) => parse_expr(expr, &ctx.expr_ctx(item), line)?,
        (None, None) => {
            return Err(ExtractionError::new(
                "button without a label",
                Location::line(line),
            ))
        }
    };

    let (on_trigger, args) = match action {
        Some(name) => (ctx.slot_path(name), Vec::new()),
        None => {
            // The closure must invoke exactly one declared handler; anything
            // richer belongs in a named func.
            let [SwiftStmt::Call { callee, args, line }] = body else {
                return Err(ExtractionError::new(
                    "button closure must be a single handler call",
                    Location::line(line),
                ));
            };
            let name = ctx.slot_path(callee);
            let args = args
                .iter()
                .map(|a| parse_expr(strip_arg_label(a), &ctx.expr_ctx(item), *line))
                .collect::<Result<Vec<_>, _>>()?;
            (name, args)
        }
    };
    if !ctx.handlers.iter().any(|h| *h == on_trigger) {
        return Err(ExtractionError::new(
            format!("button triggers undeclared handler `{on_trigger}`"),
            Location::line(line),
        ));
    }

    let disabled_when = match disabled {
        Some(d) => Some(parse_expr(d, &ctx.expr_ctx(item), line)?),
        None => None,
    };
    Ok(RenderNode::Button {
        label,
        on_trigger,
        args,
        disabled_when,
    })
}

// ---------------------------------------------------------------------------
// View-level modifiers
// ---------------------------------------------------------------------------

/// `onAppear { callee() }` → the invoked function name.
fn on_appear_callee(text: &str, line: usize) -> Result<String, ExtractionError> {
    let open = text.find('{').ok_or_else(|| {
        ExtractionError::new("onAppear without a body", Location::line(line))
    })?;
    let close = text.rfind('}').ok_or_else(|| {
        ExtractionError::new("unterminated onAppear body", Location::line(line))
    })?;
    let body = text[open + 1..close].trim();
    body.strip_suffix("()")
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            ExtractionError::new(
                "onAppear body must be a single zero-arg call",
                Location::line(line),
            )
        })
}

/// The error-message slot an `.alert` modifier is bound to: the declared
/// optional-string slot referenced inside the modifier text.
fn alert_slot(
    alert: &str,
    slots: &[StateSlot],
    line: usize,
) -> Result<String, ExtractionError> {
    for slot in slots {
        if matches!(&slot.ty, ValueType::Optional(inner) if **inner == ValueType::Str)
            && alert.contains(slot.name.as_str())
        {
            return Ok(slot.name.clone());
        }
    }
    Err(ExtractionError::new(
        "alert modifier does not reference an optional string slot",
        Location::line(line),
    ))
}

fn first_string_literal(text: &str) -> Option<String> {
    let start = text.find('"')?;
    let end = text[start + 1..].find('"')? + start + 1;
    Some(text[start + 1..end].to_string())
}
