//! React emission.
//!
//! Pure printer from target-ready IR to a `'use client'` hook component:
//! interfaces, `useState` hooks in slot order, handlers in declaration
//! order (async chains as `await` + `try`/`catch`), mount effects, then
//! the JSX tree. Any construct the mapper should have rewritten (shared
//! ownership, alert surfaces) is an `EmissionError` — a mapper bug, not a
//! recoverable condition.

use std::fmt::Write;

use refract_core::error::EmissionError;
use refract_core::ir::{
    Action, AsyncOp, Component, Expr, Handler, Layout, Literal, Ownership, RenderNode, Trigger,
    ValueType,
};

pub fn emit_component(component: &Component) -> Result<String, EmissionError> {
    if let Some(slot) = component
        .slots
        .iter()
        .find(|s| s.ownership == Ownership::SharedObservable)
    {
        return Err(EmissionError(format!(
            "slot `{}` is still shared-observable; ownership mapping did not run",
            slot.name
        )));
    }

    let mut out = String::new();
    out.push_str("'use client'\n\n");

    let mut react_imports = vec!["useState"];
    if component
        .handlers
        .iter()
        .any(|h| h.trigger == Trigger::LifecycleInit)
    {
        react_imports.push("useEffect");
    }
    let _ = writeln!(out, "import {{ {} }} from 'react'", react_imports.join(", "));
    let services = service_operations(component);
    if !services.is_empty() {
        let _ = writeln!(out, "import {{ {} }} from './actions'", services.join(", "));
    }
    out.push('\n');

    for record in &component.records {
        let _ = writeln!(out, "interface {} {{", record.name);
        for (name, ty) in &record.fields {
            let _ = writeln!(out, "  {name}: {}", ts_type(ty)?);
        }
        out.push_str("}\n\n");
    }

    let _ = writeln!(out, "export default function {}() {{", component.name);

    for slot in &component.slots {
        let setter = setter_name(&slot.name);
        let init = expr(&slot.initial, &Ctx::default())?;
        match hook_generic(&slot.ty)? {
            Some(generic) => {
                let _ = writeln!(
                    out,
                    "  const [{}, {setter}] = useState<{generic}>({init})",
                    slot.name
                );
            }
            None => {
                let _ = writeln!(out, "  const [{}, {setter}] = useState({init})", slot.name);
            }
        }
    }
    out.push('\n');

    for handler in &component.handlers {
        emit_handler(handler, &mut out)?;
        out.push('\n');
    }

    for handler in &component.handlers {
        if handler.trigger == Trigger::LifecycleInit {
            let _ = writeln!(out, "  useEffect(() => {{ {}() }}, [])", handler.name);
            out.push('\n');
        }
    }

    out.push_str("  return (\n");
    emit_node(&component.root, &mut out, "    ", &Ctx::default())?;
    out.push_str("  )\n");
    out.push_str("}\n");
    Ok(out)
}

/// Invoke operations become named imports from the service module.
fn service_operations(component: &Component) -> Vec<String> {
    fn walk(actions: &[Action], out: &mut Vec<String>) {
        for action in actions {
            match action {
                Action::AsyncCall {
                    operation,
                    on_success,
                    on_failure,
                } => {
                    if let AsyncOp::Invoke { name, .. } = operation {
                        if !out.contains(name) {
                            out.push(name.clone());
                        }
                    }
                    walk(on_success, out);
                    walk(on_failure, out);
                }
                Action::Conditional {
                    then_actions,
                    else_actions,
                    ..
                } => {
                    walk(then_actions, out);
                    walk(else_actions, out);
                }
                _ => {}
            }
        }
    }
    let mut out = Vec::new();
    for handler in &component.handlers {
        walk(&handler.actions, &mut out);
    }
    out
}

fn setter_name(slot: &str) -> String {
    let mut chars = slot.chars();
    match chars.next() {
        Some(first) => format!("set{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "set".to_string(),
    }
}

fn ts_type(ty: &ValueType) -> Result<String, EmissionError> {
    Ok(match ty {
        ValueType::Str | ValueType::Uuid => "string".to_string(),
        ValueType::Bool => "boolean".to_string(),
        ValueType::Int | ValueType::Double => "number".to_string(),
        ValueType::Optional(inner) => format!("{} | null", ts_type(inner)?),
        ValueType::List(elem) => format!("{}[]", ts_type(elem)?),
        ValueType::Record(name) => name.clone(),
    })
}

/// The generic to pin on `useState`, if inference from the initializer is
/// not enough (lists, optionals, records).
fn hook_generic(ty: &ValueType) -> Result<Option<String>, EmissionError> {
    Ok(match ty {
        ValueType::Str | ValueType::Bool | ValueType::Int | ValueType::Double => None,
        other => Some(ts_type(other)?),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Expression-rendering context: active bindings for the async result, the
/// caught error, and the list row.
#[derive(Debug, Clone, Default)]
struct Ctx {
    result: bool,
    in_catch: bool,
    item: Option<String>,
}

fn emit_handler(handler: &Handler, out: &mut String) -> Result<(), EmissionError> {
    let is_async = handler.is_async();
    let kw = if is_async { "async function" } else { "function" };
    let params = handler
        .params
        .iter()
        .map(|(name, ty)| Ok(format!("{name}: {}", ts_type(ty)?)))
        .collect::<Result<Vec<_>, EmissionError>>()?
        .join(", ");
    let _ = writeln!(out, "  {kw} {}({params}) {{", handler.name);
    emit_actions(&handler.actions, out, "    ", &Ctx::default())?;
    out.push_str("  }\n");
    Ok(())
}

fn emit_actions(
    actions: &[Action],
    out: &mut String,
    indent: &str,
    ctx: &Ctx,
) -> Result<(), EmissionError> {
    for (i, action) in actions.iter().enumerate() {
        match action {
            Action::Mutate { slot, value } => {
                let _ = writeln!(
                    out,
                    "{indent}{}({})",
                    setter_name(slot),
                    expr(value, ctx)?
                );
            }
            Action::AsyncCall {
                operation,
                on_success,
                on_failure,
            } => {
                if i + 1 != actions.len() {
                    return Err(EmissionError(
                        "async call is not in tail position; normalization did not run".into(),
                    ));
                }
                emit_async_call(operation, on_success, on_failure, out, indent, ctx)?;
            }
            Action::Delay { nanos } => {
                let _ = writeln!(
                    out,
                    "{indent}await new Promise((resolve) => setTimeout(resolve, {}))",
                    millis(*nanos)
                );
            }
            Action::Conditional {
                pred,
                then_actions,
                else_actions,
            } => {
                let _ = writeln!(out, "{indent}if ({}) {{", expr(pred, ctx)?);
                let inner = format!("{indent}  ");
                emit_actions(then_actions, out, &inner, ctx)?;
                if else_actions.is_empty() {
                    let _ = writeln!(out, "{indent}}}");
                } else {
                    let _ = writeln!(out, "{indent}}} else {{");
                    emit_actions(else_actions, out, &inner, ctx)?;
                    let _ = writeln!(out, "{indent}}}");
                }
            }
        }
    }
    Ok(())
}

fn emit_async_call(
    operation: &AsyncOp,
    on_success: &[Action],
    on_failure: &[Action],
    out: &mut String,
    indent: &str,
    ctx: &Ctx,
) -> Result<(), EmissionError> {
    let guarded = !on_failure.is_empty();
    let (body_indent, await_indent) = if guarded {
        let _ = writeln!(out, "{indent}try {{");
        (format!("{indent}  "), format!("{indent}  "))
    } else {
        (indent.to_string(), indent.to_string())
    };

    let mut success_ctx = ctx.clone();
    match operation {
        AsyncOp::Invoke { name, args } => {
            let args = args
                .iter()
                .map(|a| expr(a, ctx))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            if references_result(on_success) {
                let _ = writeln!(out, "{await_indent}const result = await {name}({args})");
                success_ctx.result = true;
            } else {
                let _ = writeln!(out, "{await_indent}await {name}({args})");
            }
        }
        AsyncOp::Sleep { nanos } => {
            let _ = writeln!(
                out,
                "{await_indent}await new Promise((resolve) => setTimeout(resolve, {}))",
                millis(*nanos)
            );
        }
    }
    emit_actions(on_success, out, &body_indent, &success_ctx)?;

    if guarded {
        let _ = writeln!(out, "{indent}}} catch (err) {{");
        let mut failure_ctx = ctx.clone();
        failure_ctx.in_catch = true;
        emit_actions(on_failure, out, &format!("{indent}  "), &failure_ctx)?;
        let _ = writeln!(out, "{indent}}}");
    }
    Ok(())
}

fn references_result(actions: &[Action]) -> bool {
    fn in_expr(e: &Expr) -> bool {
        match e {
            Expr::AsyncResult => true,
            Expr::Field { object, .. } => in_expr(object),
            Expr::Not(e) | Expr::IsEmpty(e) | Expr::IsNil(e) => in_expr(e),
            Expr::Ternary {
                cond,
                then_val,
                else_val,
            } => in_expr(cond) || in_expr(then_val) || in_expr(else_val),
            Expr::ListLit(items) => items.iter().any(in_expr),
            Expr::Append { list, item } => in_expr(list) || in_expr(item),
            Expr::ToggleWhere { list, id, .. } | Expr::RemoveWhere { list, id } => {
                in_expr(list) || in_expr(id)
            }
            Expr::MakeRecord { fields, .. } => fields.iter().any(|(_, v)| in_expr(v)),
            _ => false,
        }
    }
    actions.iter().any(|a| match a {
        Action::Mutate { value, .. } => in_expr(value),
        Action::Conditional {
            pred,
            then_actions,
            else_actions,
        } => in_expr(pred) || references_result(then_actions) || references_result(else_actions),
        Action::AsyncCall {
            operation,
            on_success,
            on_failure,
        } => {
            let in_op = match operation {
                AsyncOp::Invoke { args, .. } => args.iter().any(in_expr),
                AsyncOp::Sleep { .. } => false,
            };
            in_op || references_result(on_success) || references_result(on_failure)
        }
        Action::Delay { .. } => false,
    })
}

fn millis(nanos: u64) -> u64 {
    // Promise timers resolve in milliseconds; round sub-millisecond delays up.
    nanos.div_ceil(1_000_000)
}

// ---------------------------------------------------------------------------
// Render tree
// ---------------------------------------------------------------------------

fn emit_node(
    node: &RenderNode,
    out: &mut String,
    indent: &str,
    ctx: &Ctx,
) -> Result<(), EmissionError> {
    match node {
        RenderNode::Container { layout, children } => {
            let class = match layout {
                Layout::Row => "row",
                Layout::Column | Layout::Plain => "column",
            };
            let _ = writeln!(out, "{indent}<div className=\"{class}\">");
            for child in children {
                emit_node(child, out, &format!("{indent}  "), ctx)?;
            }
            let _ = writeln!(out, "{indent}</div>");
        }
        RenderNode::Text { content, style } => {
            if style.heading {
                let _ = writeln!(out, "{indent}<h1>{}</h1>", text_content(content, ctx)?);
            } else if let Some(when) = &style.strikethrough_when {
                let _ = writeln!(
                    out,
                    "{indent}<span className={{{} ? 'done' : ''}}>{}</span>",
                    expr(when, ctx)?,
                    text_content(content, ctx)?
                );
            } else {
                let _ = writeln!(out, "{indent}<p>{}</p>", text_content(content, ctx)?);
            }
        }
        RenderNode::Input {
            binding,
            placeholder,
            disabled_when,
        } => {
            let _ = writeln!(out, "{indent}<input");
            let _ = writeln!(out, "{indent}  value={{{binding}}}");
            let _ = writeln!(
                out,
                "{indent}  onChange={{(e) => {}(e.target.value)}}",
                setter_name(binding)
            );
            let _ = writeln!(out, "{indent}  placeholder=\"{placeholder}\"");
            if let Some(when) = disabled_when {
                let _ = writeln!(out, "{indent}  disabled={{{}}}", expr(when, ctx)?);
            }
            let _ = writeln!(out, "{indent}/>");
        }
        RenderNode::Button {
            label,
            on_trigger,
            args,
            disabled_when,
        } => {
            let click = if args.is_empty() {
                on_trigger.clone()
            } else {
                let args = args
                    .iter()
                    .map(|a| expr(a, ctx))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(", ");
                format!("() => {on_trigger}({args})")
            };
            let disabled = match disabled_when {
                Some(when) => format!(" disabled={{{}}}", expr(when, ctx)?),
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "{indent}<button onClick={{{click}}}{disabled}>{}</button>",
                text_content(label, ctx)?
            );
        }
        RenderNode::List {
            items,
            binding,
            row,
        } => {
            let _ = writeln!(out, "{indent}<ul>");
            let _ = writeln!(
                out,
                "{indent}  {{{items}.map(({binding}, index) => ("
            );
            let mut row_ctx = ctx.clone();
            row_ctx.item = Some(binding.clone());
            let _ = writeln!(out, "{indent}    <li key={{index}}>");
            emit_node(row, out, &format!("{indent}      "), &row_ctx)?;
            let _ = writeln!(out, "{indent}    </li>");
            let _ = writeln!(out, "{indent}  ))}}");
            let _ = writeln!(out, "{indent}</ul>");
        }
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => {
            match else_node {
                Some(else_node) => {
                    let _ = writeln!(out, "{indent}{{{} ? (", expr(pred, ctx)?);
                    emit_node(then_node, out, &format!("{indent}  "), ctx)?;
                    let _ = writeln!(out, "{indent}) : (");
                    emit_node(else_node, out, &format!("{indent}  "), ctx)?;
                    let _ = writeln!(out, "{indent})}}");
                }
                None => {
                    let _ = writeln!(out, "{indent}{{{} && (", expr(pred, ctx)?);
                    emit_node(then_node, out, &format!("{indent}  "), ctx)?;
                    let _ = writeln!(out, "{indent})}}");
                }
            }
        }
        RenderNode::Progress { label } => {
            let label = label.as_deref().unwrap_or("Loading...");
            let _ = writeln!(out, "{indent}<p className=\"progress\">{label}</p>");
        }
        RenderNode::ErrorAlert { slot, .. } => {
            return Err(EmissionError(format!(
                "alert surface on `{slot}` reached the React emitter; \
                 error-surface mapping did not run"
            )));
        }
    }
    Ok(())
}

/// Element text content: literal text stays bare, anything else is a JSX
/// expression child.
fn text_content(e: &Expr, ctx: &Ctx) -> Result<String, EmissionError> {
    match e {
        Expr::Literal(Literal::Str(s)) => Ok(s.clone()),
        other => Ok(format!("{{{}}}", expr(other, ctx)?)),
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn expr(e: &Expr, ctx: &Ctx) -> Result<String, EmissionError> {
    Ok(match e {
        Expr::Literal(Literal::Str(s)) => format!("'{}'", s.replace('\'', "\\'")),
        Expr::Literal(Literal::Int(n)) => n.to_string(),
        Expr::Literal(Literal::Bool(b)) => b.to_string(),
        Expr::Literal(Literal::Nil) => "null".to_string(),
        Expr::Slot(name) | Expr::Param(name) => name.clone(),
        Expr::AsyncResult => {
            if !ctx.result {
                return Err(EmissionError("async result referenced outside a call".into()));
            }
            "result".to_string()
        }
        Expr::ErrorMessage => {
            if !ctx.in_catch {
                return Err(EmissionError(
                    "error message referenced outside a failure branch".into(),
                ));
            }
            "String(err)".to_string()
        }
        Expr::Item => ctx
            .item
            .clone()
            .ok_or_else(|| EmissionError("row binding referenced outside a list".into()))?,
        Expr::NewUuid => "crypto.randomUUID()".to_string(),
        Expr::Field { object, field } => format!("{}.{field}", expr(object, ctx)?),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::IsNil(e) => format!("{} !== null", expr(e, ctx)?),
            Expr::IsEmpty(e) => format!("{} !== ''", expr(e, ctx)?),
            other => format!("!{}", expr(other, ctx)?),
        },
        Expr::IsEmpty(e) => format!("{} === ''", expr(e, ctx)?),
        Expr::IsNil(e) => format!("{} === null", expr(e, ctx)?),
        Expr::Ternary {
            cond,
            then_val,
            else_val,
        } => format!(
            "{} ? {} : {}",
            expr(cond, ctx)?,
            expr(then_val, ctx)?,
            expr(else_val, ctx)?
        ),
        Expr::ListLit(items) => {
            let items = items
                .iter()
                .map(|i| expr(i, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            format!("[{}]", items.join(", "))
        }
        Expr::Append { list, item } => {
            format!("[...{}, {}]", expr(list, ctx)?, expr(item, ctx)?)
        }
        Expr::ToggleWhere { list, id, field } => format!(
            "{}.map((item) => item.id === {} ? {{ ...item, {field}: !item.{field} }} : item)",
            expr(list, ctx)?,
            expr(id, ctx)?
        ),
        Expr::RemoveWhere { list, id } => format!(
            "{}.filter((item) => item.id !== {})",
            expr(list, ctx)?,
            expr(id, ctx)?
        ),
        Expr::MakeRecord { fields, .. } => {
            let fields = fields
                .iter()
                .map(|(name, value)| Ok(format!("{name}: {}", expr(value, ctx)?)))
                .collect::<Result<Vec<_>, EmissionError>>()?;
            format!("{{ {} }}", fields.join(", "))
        }
    })
}
