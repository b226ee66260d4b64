//! Human-readable display for IR components (`print-ir` output).

use std::fmt;

use super::{
    Action, AsyncOp, Component, Expr, Handler, Layout, Literal, Ownership, RenderNode, Trigger,
    ValueType,
};

fn fmt_type(ty: &ValueType, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        ValueType::Str => write!(f, "string"),
        ValueType::Bool => write!(f, "bool"),
        ValueType::Int => write!(f, "int"),
        ValueType::Double => write!(f, "double"),
        ValueType::Uuid => write!(f, "uuid"),
        ValueType::Optional(inner) => {
            write!(f, "?")?;
            fmt_type(inner, f)
        }
        ValueType::List(elem) => {
            write!(f, "[")?;
            fmt_type(elem, f)?;
            write!(f, "]")
        }
        ValueType::Record(name) => write!(f, "{name}"),
    }
}

fn fmt_expr(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::Literal(Literal::Str(s)) => write!(f, "{s:?}"),
        Expr::Literal(Literal::Int(i)) => write!(f, "{i}"),
        Expr::Literal(Literal::Bool(b)) => write!(f, "{b}"),
        Expr::Literal(Literal::Nil) => write!(f, "nil"),
        Expr::Slot(name) => write!(f, "${name}"),
        Expr::Param(name) => write!(f, "%{name}"),
        Expr::AsyncResult => write!(f, "@result"),
        Expr::ErrorMessage => write!(f, "@error"),
        Expr::Item => write!(f, "@item"),
        Expr::NewUuid => write!(f, "uuid()"),
        Expr::Field { object, field } => {
            fmt_expr(object, f)?;
            write!(f, ".{field}")
        }
        Expr::Not(e) => {
            write!(f, "!")?;
            fmt_expr(e, f)
        }
        Expr::IsEmpty(e) => {
            fmt_expr(e, f)?;
            write!(f, ".empty?")
        }
        Expr::IsNil(e) => {
            fmt_expr(e, f)?;
            write!(f, ".nil?")
        }
        Expr::Ternary {
            cond,
            then_val,
            else_val,
        } => {
            fmt_expr(cond, f)?;
            write!(f, " ? ")?;
            fmt_expr(then_val, f)?;
            write!(f, " : ")?;
            fmt_expr(else_val, f)
        }
        Expr::ListLit(items) => {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_expr(item, f)?;
            }
            write!(f, "]")
        }
        Expr::Append { list, item } => {
            write!(f, "append(")?;
            fmt_expr(list, f)?;
            write!(f, ", ")?;
            fmt_expr(item, f)?;
            write!(f, ")")
        }
        Expr::ToggleWhere { list, id, field } => {
            write!(f, "toggle(")?;
            fmt_expr(list, f)?;
            write!(f, ", id=")?;
            fmt_expr(id, f)?;
            write!(f, ", .{field})")
        }
        Expr::RemoveWhere { list, id } => {
            write!(f, "remove(")?;
            fmt_expr(list, f)?;
            write!(f, ", id=")?;
            fmt_expr(id, f)?;
            write!(f, ")")
        }
        Expr::MakeRecord { record, fields } => {
            write!(f, "{record}(")?;
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name}: ")?;
                fmt_expr(value, f)?;
            }
            write!(f, ")")
        }
    }
}

fn fmt_actions(actions: &[Action], indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let pad = "  ".repeat(indent);
    for action in actions {
        match action {
            Action::Mutate { slot, value } => {
                write!(f, "{pad}${slot} <- ")?;
                fmt_expr(value, f)?;
                writeln!(f)?;
            }
            Action::AsyncCall {
                operation,
                on_success,
                on_failure,
            } => {
                match operation {
                    AsyncOp::Invoke { name, args } => {
                        write!(f, "{pad}await {name}(")?;
                        for (i, arg) in args.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            fmt_expr(arg, f)?;
                        }
                        writeln!(f, ")")?;
                    }
                    AsyncOp::Sleep { nanos } => writeln!(f, "{pad}await sleep({nanos}ns)")?,
                }
                if !on_success.is_empty() {
                    writeln!(f, "{pad}on success:")?;
                    fmt_actions(on_success, indent + 1, f)?;
                }
                if !on_failure.is_empty() {
                    writeln!(f, "{pad}on failure:")?;
                    fmt_actions(on_failure, indent + 1, f)?;
                }
            }
            Action::Delay { nanos } => writeln!(f, "{pad}delay {nanos}ns")?,
            Action::Conditional {
                pred,
                then_actions,
                else_actions,
            } => {
                write!(f, "{pad}if ")?;
                fmt_expr(pred, f)?;
                writeln!(f, ":")?;
                fmt_actions(then_actions, indent + 1, f)?;
                if !else_actions.is_empty() {
                    writeln!(f, "{pad}else:")?;
                    fmt_actions(else_actions, indent + 1, f)?;
                }
            }
        }
    }
    Ok(())
}

fn fmt_node(node: &RenderNode, indent: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let pad = "  ".repeat(indent);
    match node {
        RenderNode::Text { content, style } => {
            write!(f, "{pad}text ")?;
            fmt_expr(content, f)?;
            if style.heading {
                write!(f, " [heading]")?;
            }
            if let Some(when) = &style.strikethrough_when {
                write!(f, " [strike when ")?;
                fmt_expr(when, f)?;
                write!(f, "]")?;
            }
            writeln!(f)
        }
        RenderNode::Input {
            binding,
            placeholder,
            disabled_when,
        } => {
            write!(f, "{pad}input ${binding} placeholder={placeholder:?}")?;
            if let Some(expr) = disabled_when {
                write!(f, " disabled-when ")?;
                fmt_expr(expr, f)?;
            }
            writeln!(f)
        }
        RenderNode::Button {
            label,
            on_trigger,
            args,
            disabled_when,
        } => {
            write!(f, "{pad}button ")?;
            fmt_expr(label, f)?;
            write!(f, " -> {on_trigger}(")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_expr(arg, f)?;
            }
            write!(f, ")")?;
            if let Some(expr) = disabled_when {
                write!(f, " disabled-when ")?;
                fmt_expr(expr, f)?;
            }
            writeln!(f)
        }
        RenderNode::List {
            items,
            binding,
            row,
        } => {
            writeln!(f, "{pad}list ${items} as {binding}:")?;
            fmt_node(row, indent + 1, f)
        }
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => {
            write!(f, "{pad}if ")?;
            fmt_expr(pred, f)?;
            writeln!(f, ":")?;
            fmt_node(then_node, indent + 1, f)?;
            if let Some(node) = else_node {
                writeln!(f, "{pad}else:")?;
                fmt_node(node, indent + 1, f)?;
            }
            Ok(())
        }
        RenderNode::Container { layout, children } => {
            let kind = match layout {
                Layout::Column => "column",
                Layout::Row => "row",
                Layout::Plain => "group",
            };
            writeln!(f, "{pad}{kind}:")?;
            for child in children {
                fmt_node(child, indent + 1, f)?;
            }
            Ok(())
        }
        RenderNode::ErrorAlert { slot, title } => {
            writeln!(f, "{pad}alert {title:?} on ${slot}")
        }
        RenderNode::Progress { label } => match label {
            Some(label) => writeln!(f, "{pad}progress {label:?}"),
            None => writeln!(f, "{pad}progress"),
        },
    }
}

fn fmt_handler(handler: &Handler, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let trigger = match handler.trigger {
        Trigger::UserEvent => "on event",
        Trigger::LifecycleInit => "on init",
    };
    write!(f, "  handler {}(", handler.name)?;
    for (i, (name, ty)) in handler.params.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{name}: ")?;
        fmt_type(ty, f)?;
    }
    writeln!(f, ") {trigger}:")?;
    fmt_actions(&handler.actions, 2, f)
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "component {} {{", self.name)?;
        for record in &self.records {
            write!(f, "  record {}(", record.name)?;
            for (i, (name, ty)) in record.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name}: ")?;
                fmt_type(ty, f)?;
            }
            write!(f, ")")?;
            if record.identifiable {
                write!(f, " identifiable")?;
            }
            writeln!(f)?;
        }
        for slot in &self.slots {
            let own = match slot.ownership {
                Ownership::Local => "local",
                Ownership::SharedObservable => "observable",
            };
            write!(f, "  state {} {}: ", own, slot.name)?;
            fmt_type(&slot.ty, f)?;
            write!(f, " = ")?;
            fmt_expr(&slot.initial, f)?;
            writeln!(f)?;
        }
        for handler in &self.handlers {
            fmt_handler(handler, f)?;
        }
        writeln!(f, "  render:")?;
        fmt_node(&self.root, 2, f)?;
        writeln!(f, "}}")
    }
}
