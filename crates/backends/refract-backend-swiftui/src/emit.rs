//! SwiftUI emission.
//!
//! Pure printer from target-ready IR. Components with any shared-observable
//! slot emit an `ObservableObject` view-model plus a view bound through
//! `@StateObject`; all-local components emit a single `@State` view. Async
//! chains become `Task { do/catch }` regions; lifecycle-init handlers become
//! an `init()` call on the model or an `.onAppear` on the view.

use std::fmt::Write;

use refract_core::error::EmissionError;
use refract_core::ir::{
    Action, AsyncOp, Component, Expr, Handler, Layout, Literal, Ownership, RenderNode,
    Trigger, ValueType,
};

pub fn emit_component(component: &Component) -> Result<String, EmissionError> {
    let shared = component
        .slots
        .iter()
        .any(|s| s.ownership == Ownership::SharedObservable);

    let mut out = String::new();
    out.push_str("import SwiftUI\nimport Combine\n\n");

    for record in &component.records {
        emit_record(record, &mut out)?;
    }

    if shared {
        emit_model_shape(component, &mut out)?;
    } else {
        emit_state_shape(component, &mut out)?;
    }
    Ok(out)
}

fn emit_record(
    record: &refract_core::ir::RecordDecl,
    out: &mut String,
) -> Result<(), EmissionError> {
    let protocol = if record.identifiable {
        ": Identifiable"
    } else {
        ""
    };
    let _ = writeln!(out, "struct {}{protocol} {{", record.name);
    for (i, (name, ty)) in record.fields.iter().enumerate() {
        // The id is immutable; remaining fields stay mutable for row edits.
        let kw = if i == 0 && name == "id" { "let" } else { "var" };
        let _ = writeln!(out, "    {kw} {name}: {}", swift_type(ty)?);
    }
    out.push_str("}\n\n");
    Ok(())
}

/// Shared-observable slots: `ObservableObject` view-model + view.
fn emit_model_shape(component: &Component, out: &mut String) -> Result<(), EmissionError> {
    let model_name = format!("{}Model", component.name);
    let init_handlers: Vec<&Handler> = component
        .handlers
        .iter()
        .filter(|h| h.trigger == Trigger::LifecycleInit)
        .collect();

    out.push_str("@MainActor\n");
    let _ = writeln!(out, "class {model_name}: ObservableObject {{");
    for slot in &component.slots {
        if slot.ownership != Ownership::SharedObservable {
            return Err(EmissionError(format!(
                "slot `{}` mixes local ownership into an observable component",
                slot.name
            )));
        }
        let ctx = Ctx::default();
        match (&slot.ty, &slot.initial) {
            (ValueType::Optional(inner), Expr::Literal(Literal::Nil)) => {
                let _ = writeln!(
                    out,
                    "    @Published var {}: {}?",
                    slot.name,
                    swift_type(inner)?
                );
            }
            (ty, initial) => {
                let _ = writeln!(
                    out,
                    "    @Published var {}: {} = {}",
                    slot.name,
                    swift_type(ty)?,
                    expr(initial, &ctx)?
                );
            }
        }
    }
    out.push('\n');

    if !init_handlers.is_empty() {
        out.push_str("    init() {\n");
        for handler in &init_handlers {
            let _ = writeln!(out, "        {}()", handler.name);
        }
        out.push_str("    }\n\n");
    }

    for handler in &component.handlers {
        emit_func(handler, out, "    ")?;
        out.push('\n');
    }
    // Drop the trailing blank line inside the class body.
    if out.ends_with("\n\n") {
        out.pop();
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "struct {}View: View {{", component.name);
    let _ = writeln!(
        out,
        "    @StateObject private var model = {model_name}()"
    );
    out.push('\n');
    emit_body(component, out, Some("model"))?;
    out.push_str("}\n");
    Ok(())
}

/// All-local slots: a single `@State` view.
fn emit_state_shape(component: &Component, out: &mut String) -> Result<(), EmissionError> {
    let _ = writeln!(out, "struct {}: View {{", component.name);
    for slot in &component.slots {
        let ctx = Ctx::default();
        match (&slot.ty, &slot.initial) {
            (ValueType::Optional(inner), Expr::Literal(Literal::Nil)) => {
                let _ = writeln!(
                    out,
                    "    @State private var {}: {}?",
                    slot.name,
                    swift_type(inner)?
                );
            }
            (ty, initial) => {
                let _ = writeln!(
                    out,
                    "    @State private var {}: {} = {}",
                    slot.name,
                    swift_type(ty)?,
                    expr(initial, &ctx)?
                );
            }
        }
    }
    out.push('\n');

    emit_body(component, out, None)?;
    out.push('\n');

    for handler in &component.handlers {
        emit_func(handler, out, "    ")?;
        out.push('\n');
    }
    if out.ends_with("\n\n") {
        out.pop();
    }
    out.push_str("}\n");
    Ok(())
}

/// The `var body: some View` block, with `.alert` and `.onAppear`
/// modifiers attached to the root.
fn emit_body(
    component: &Component,
    out: &mut String,
    model_var: Option<&str>,
) -> Result<(), EmissionError> {
    // The alert surface renders as a root modifier, not a child view.
    let (root_children, alert) = split_alert(&component.root);

    out.push_str("    var body: some View {\n");
    let ctx = Ctx {
        model_var: model_var.map(str::to_string),
        ..Ctx::default()
    };
    out.push_str("        VStack {\n");
    for child in &root_children {
        emit_node(child, component, out, "            ", &ctx)?;
    }
    out.push_str("        }\n");

    if let Some((slot, title)) = alert {
        let slot_ref = ctx.slot_ref(&slot);
        let _ = writeln!(
            out,
            "        .alert(\"{title}\", isPresented: Binding("
        );
        let _ = writeln!(out, "            get: {{ {slot_ref} != nil }},");
        let _ = writeln!(out, "            set: {{ _ in {slot_ref} = nil }}");
        out.push_str("        )) {\n");
        out.push_str("            Button(\"OK\", role: .cancel) { }\n");
        out.push_str("        } message: {\n");
        let _ = writeln!(out, "            Text({slot_ref} ?? \"\")");
        out.push_str("        }\n");
    }

    // View-only components run lifecycle-init handlers on appearance; model
    // components run them from the model's `init()`.
    if model_var.is_none() {
        for handler in &component.handlers {
            if handler.trigger == Trigger::LifecycleInit {
                let _ = writeln!(out, "        .onAppear {{ {}() }}", handler.name);
            }
        }
    }
    out.push_str("    }\n");
    Ok(())
}

/// Pull the `ErrorAlert` out of the root container, leaving the visible
/// children.
fn split_alert(root: &RenderNode) -> (Vec<RenderNode>, Option<(String, String)>) {
    match root {
        RenderNode::Container { children, .. } => {
            let mut alert = None;
            let mut rest = Vec::new();
            for child in children {
                match child {
                    RenderNode::ErrorAlert { slot, title } => {
                        alert = Some((slot.clone(), title.clone()));
                    }
                    other => rest.push(other.clone()),
                }
            }
            (rest, alert)
        }
        RenderNode::ErrorAlert { slot, title } => {
            (Vec::new(), Some((slot.clone(), title.clone())))
        }
        other => (vec![other.clone()], None),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Expression-rendering context.
#[derive(Debug, Clone, Default)]
struct Ctx {
    /// View-model variable to qualify slot references with (view scope).
    model_var: Option<String>,
    /// Qualify slot references with `self.` (inside escaping closures).
    in_task: bool,
    result: bool,
    in_catch: bool,
    /// Row binding plus, for primitive lists, the `items[index]` read form.
    item: Option<String>,
    item_indexed: Option<String>,
}

impl Ctx {
    fn slot_ref(&self, slot: &str) -> String {
        match &self.model_var {
            Some(model) => format!("{model}.{slot}"),
            None if self.in_task => format!("self.{slot}"),
            None => slot.to_string(),
        }
    }
}

fn emit_func(handler: &Handler, out: &mut String, indent: &str) -> Result<(), EmissionError> {
    let params = handler
        .params
        .iter()
        .map(|(name, ty)| Ok(format!("{name}: {}", swift_type(ty)?)))
        .collect::<Result<Vec<_>, EmissionError>>()?
        .join(", ");
    let _ = writeln!(out, "{indent}func {}({params}) {{", handler.name);

    let inner = format!("{indent}    ");
    if handler.is_async() {
        // Leading synchronous mutations run before the task spawns.
        let split = handler
            .actions
            .iter()
            .position(is_async_action)
            .unwrap_or(handler.actions.len());
        let ctx = Ctx::default();
        emit_actions(&handler.actions[..split], out, &inner, &ctx)?;
        let _ = writeln!(out, "{inner}Task {{");
        let task_ctx = Ctx {
            in_task: true,
            ..Ctx::default()
        };
        emit_actions(
            &handler.actions[split..],
            out,
            &format!("{inner}    "),
            &task_ctx,
        )?;
        let _ = writeln!(out, "{inner}}}");
    } else {
        emit_actions(&handler.actions, out, &inner, &Ctx::default())?;
    }
    let _ = writeln!(out, "{indent}}}");
    Ok(())
}

fn is_async_action(action: &Action) -> bool {
    match action {
        Action::AsyncCall { .. } | Action::Delay { .. } => true,
        Action::Conditional {
            then_actions,
            else_actions,
            ..
        } => {
            then_actions.iter().any(is_async_action) || else_actions.iter().any(is_async_action)
        }
        Action::Mutate { .. } => false,
    }
}

fn emit_actions(
    actions: &[Action],
    out: &mut String,
    indent: &str,
    ctx: &Ctx,
) -> Result<(), EmissionError> {
    for (i, action) in actions.iter().enumerate() {
        match action {
            Action::Mutate { slot, value } => emit_mutate(slot, value, out, indent, ctx)?,
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
                    "{indent}try? await Task.sleep(nanoseconds: {})",
                    group_digits(*nanos)
                );
            }
            Action::Conditional {
                pred,
                then_actions,
                else_actions,
            } => {
                let _ = writeln!(out, "{indent}if {} {{", expr(pred, ctx)?);
                let inner = format!("{indent}    ");
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

/// Keyed-list rewrites re-surface as their idiomatic mutation statements.
fn emit_mutate(
    slot: &str,
    value: &Expr,
    out: &mut String,
    indent: &str,
    ctx: &Ctx,
) -> Result<(), EmissionError> {
    let target = ctx.slot_ref(slot);
    match value {
        Expr::Append { item, .. } => {
            let _ = writeln!(out, "{indent}{target}.append({})", expr(item, ctx)?);
        }
        Expr::RemoveWhere { id, .. } => {
            let _ = writeln!(
                out,
                "{indent}{target}.removeAll(where: {{ $0.id == {} }})",
                expr(id, ctx)?
            );
        }
        Expr::ToggleWhere { id, field, .. } => {
            let _ = writeln!(
                out,
                "{indent}if let index = {target}.firstIndex(where: {{ $0.id == {} }}) {{",
                expr(id, ctx)?
            );
            let _ = writeln!(out, "{indent}    {target}[index].{field}.toggle()");
            let _ = writeln!(out, "{indent}}}");
        }
        other => {
            let _ = writeln!(out, "{indent}{target} = {}", expr(other, ctx)?);
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
    let body_indent = if guarded {
        let _ = writeln!(out, "{indent}do {{");
        format!("{indent}    ")
    } else {
        indent.to_string()
    };

    let mut success_ctx = ctx.clone();
    match operation {
        AsyncOp::Sleep { nanos } => {
            let kw = if guarded { "try" } else { "try?" };
            let _ = writeln!(
                out,
                "{body_indent}{kw} await Task.sleep(nanoseconds: {})",
                group_digits(*nanos)
            );
        }
        AsyncOp::Invoke { name, args } => {
            let args = args
                .iter()
                .map(|a| expr(a, ctx))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            let kw = if guarded { "try await" } else { "await" };
            if references_result(on_success) {
                let _ = writeln!(out, "{body_indent}let result = {kw} {name}({args})");
                success_ctx.result = true;
            } else {
                let _ = writeln!(out, "{body_indent}_ = {kw} {name}({args})");
            }
        }
    }
    emit_actions(on_success, out, &body_indent, &success_ctx)?;

    if guarded {
        let _ = writeln!(out, "{indent}}} catch {{");
        let mut failure_ctx = ctx.clone();
        failure_ctx.in_catch = true;
        emit_actions(on_failure, out, &format!("{indent}    "), &failure_ctx)?;
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

/// `500000000` → `500_000_000`, matching hand-written sleep durations.
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Render tree
// ---------------------------------------------------------------------------

fn emit_node(
    node: &RenderNode,
    component: &Component,
    out: &mut String,
    indent: &str,
    ctx: &Ctx,
) -> Result<(), EmissionError> {
    match node {
        RenderNode::Container { layout, children } => {
            let stack = match layout {
                Layout::Row => "HStack",
                Layout::Column | Layout::Plain => "VStack",
            };
            let _ = writeln!(out, "{indent}{stack} {{");
            for child in children {
                emit_node(child, component, out, &format!("{indent}    "), ctx)?;
            }
            let _ = writeln!(out, "{indent}}}");
        }
        RenderNode::Text { content, style } => {
            let _ = writeln!(out, "{indent}Text({})", text_arg(content, ctx)?);
            if style.heading {
                let _ = writeln!(out, "{indent}    .font(.largeTitle)");
                let _ = writeln!(out, "{indent}    .bold()");
            }
            if let Some(when) = &style.strikethrough_when {
                let _ = writeln!(out, "{indent}    .strikethrough({})", expr(when, ctx)?);
            }
        }
        RenderNode::Input {
            binding,
            placeholder,
            disabled_when,
        } => {
            let _ = writeln!(
                out,
                "{indent}TextField(\"{placeholder}\", text: ${})",
                ctx.slot_ref(binding)
            );
            let _ = writeln!(
                out,
                "{indent}    .textFieldStyle(RoundedBorderTextFieldStyle())"
            );
            if let Some(when) = disabled_when {
                let _ = writeln!(out, "{indent}    .disabled({})", expr(when, ctx)?);
            }
        }
        RenderNode::Button {
            label,
            on_trigger,
            args,
            disabled_when,
        } => {
            let target = trigger_ref(on_trigger, ctx);
            if args.is_empty() {
                if let Expr::Literal(Literal::Str(text)) = label {
                    let _ = writeln!(out, "{indent}Button(\"{text}\") {{");
                    let _ = writeln!(out, "{indent}    {target}()");
                    let _ = writeln!(out, "{indent}}}");
                } else {
                    let _ = writeln!(out, "{indent}Button(action: {target}) {{");
                    let _ = writeln!(out, "{indent}    Text({})", text_arg(label, ctx)?);
                    let _ = writeln!(out, "{indent}}}");
                }
            } else {
                let handler = component.handler(on_trigger).ok_or_else(|| {
                    EmissionError(format!("button triggers unknown handler `{on_trigger}`"))
                })?;
                if handler.params.len() != args.len() {
                    return Err(EmissionError(format!(
                        "button passes {} argument(s) to `{on_trigger}` which takes {}",
                        args.len(),
                        handler.params.len()
                    )));
                }
                let labeled = handler
                    .params
                    .iter()
                    .zip(args)
                    .map(|((param, _), arg)| Ok(format!("{param}: {}", expr(arg, ctx)?)))
                    .collect::<Result<Vec<_>, EmissionError>>()?
                    .join(", ");
                let _ = writeln!(out, "{indent}Button({}) {{", text_arg(label, ctx)?);
                let _ = writeln!(out, "{indent}    {target}({labeled})");
                let _ = writeln!(out, "{indent}}}");
            }
            if let Some(when) = disabled_when {
                let _ = writeln!(out, "{indent}.disabled({})", expr(when, ctx)?);
            }
        }
        RenderNode::List {
            items,
            binding,
            row,
        } => {
            let items_ref = ctx.slot_ref(items);
            let primitive = !matches!(
                component.slot(items).map(|s| &s.ty),
                Some(ValueType::List(elem)) if matches!(**elem, ValueType::Record(_))
            );
            let mut row_ctx = ctx.clone();
            if primitive {
                // Primitive rows have no identity; key by index.
                let _ = writeln!(
                    out,
                    "{indent}List({items_ref}.indices, id: \\.self) {{ index in"
                );
                row_ctx.item = Some("index".to_string());
                row_ctx.item_indexed = Some(items_ref.clone());
            } else {
                let _ = writeln!(out, "{indent}List({items_ref}) {{ {binding} in");
                row_ctx.item = Some(binding.clone());
                row_ctx.item_indexed = None;
            }
            emit_node(row, component, out, &format!("{indent}    "), &row_ctx)?;
            let _ = writeln!(out, "{indent}}}");
        }
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => {
            let _ = writeln!(out, "{indent}if {} {{", expr(pred, ctx)?);
            emit_node(then_node, component, out, &format!("{indent}    "), ctx)?;
            match else_node {
                Some(else_node) => {
                    let _ = writeln!(out, "{indent}}} else {{");
                    emit_node(else_node, component, out, &format!("{indent}    "), ctx)?;
                    let _ = writeln!(out, "{indent}}}");
                }
                None => {
                    let _ = writeln!(out, "{indent}}}");
                }
            }
        }
        RenderNode::Progress { label } => match label {
            Some(label) => {
                let _ = writeln!(out, "{indent}ProgressView(\"{label}\")");
            }
            None => {
                let _ = writeln!(out, "{indent}ProgressView()");
            }
        },
        RenderNode::ErrorAlert { .. } => {
            // split_alert hoists the root alert; one anywhere else is a
            // mapper bug.
            return Err(EmissionError(
                "alert surface outside the root container".into(),
            ));
        }
    }
    Ok(())
}

/// Handler references from the view qualify through the model when present.
fn trigger_ref(handler: &str, ctx: &Ctx) -> String {
    match &ctx.model_var {
        Some(model) => format!("{model}.{handler}"),
        None => handler.to_string(),
    }
}

/// `Text(...)`/`Button(...)` label argument: quoted for literals, the
/// expression otherwise.
fn text_arg(e: &Expr, ctx: &Ctx) -> Result<String, EmissionError> {
    match e {
        Expr::Literal(Literal::Str(s)) => Ok(format!("\"{s}\"")),
        other => expr(other, ctx),
    }
}

// ---------------------------------------------------------------------------
// Expressions and types
// ---------------------------------------------------------------------------

fn swift_type(ty: &ValueType) -> Result<String, EmissionError> {
    Ok(match ty {
        ValueType::Str => "String".to_string(),
        ValueType::Bool => "Bool".to_string(),
        ValueType::Int => "Int".to_string(),
        ValueType::Double => "Double".to_string(),
        ValueType::Uuid => "UUID".to_string(),
        ValueType::Optional(inner) => format!("{}?", swift_type(inner)?),
        ValueType::List(elem) => format!("[{}]", swift_type(elem)?),
        ValueType::Record(name) => name.clone(),
    })
}

fn expr(e: &Expr, ctx: &Ctx) -> Result<String, EmissionError> {
    Ok(match e {
        Expr::Literal(Literal::Str(s)) => format!("\"{s}\""),
        Expr::Literal(Literal::Int(n)) => n.to_string(),
        Expr::Literal(Literal::Bool(b)) => b.to_string(),
        Expr::Literal(Literal::Nil) => "nil".to_string(),
        Expr::Slot(name) => ctx.slot_ref(name),
        Expr::Param(name) => name.clone(),
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
            "error.localizedDescription".to_string()
        }
        Expr::Item => match (&ctx.item, &ctx.item_indexed) {
            (Some(index), Some(items)) => format!("{items}[{index}]"),
            (Some(binding), None) => binding.clone(),
            _ => {
                return Err(EmissionError(
                    "row binding referenced outside a list".into(),
                ))
            }
        },
        Expr::NewUuid => "UUID()".to_string(),
        Expr::Field { object, field } => format!("{}.{field}", expr(object, ctx)?),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::IsNil(e) => format!("{} != nil", expr(e, ctx)?),
            Expr::IsEmpty(e) => format!("!{}.isEmpty", expr(e, ctx)?),
            other => format!("!{}", expr(other, ctx)?),
        },
        Expr::IsEmpty(e) => format!("{}.isEmpty", expr(e, ctx)?),
        Expr::IsNil(e) => format!("{} == nil", expr(e, ctx)?),
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
        Expr::MakeRecord { record, fields } => {
            let fields = fields
                .iter()
                .map(|(name, value)| Ok(format!("{name}: {}", expr(value, ctx)?)))
                .collect::<Result<Vec<_>, EmissionError>>()?;
            format!("{record}({})", fields.join(", "))
        }
        Expr::Append { .. } | Expr::ToggleWhere { .. } | Expr::RemoveWhere { .. } => {
            return Err(EmissionError(
                "keyed-list rewrite used outside a mutation".into(),
            ))
        }
    })
}
