//! Swift expression translation.
//!
//! Turns raw Swift expression texts into IR expressions, resolving
//! identifiers against the component's slots (directly or through the
//! view-model variable), handler parameters, and the active row binding.

use refract_core::error::{ExtractionError, Location};
use refract_core::ir::{Expr, Literal};

use crate::parser::{find_matching, find_top_level, split_top_commas};

/// Name-resolution context for one expression site.
#[derive(Debug, Clone, Default)]
pub struct ExprCtx<'a> {
    pub slots: &'a [String],
    pub params: &'a [String],
    /// The view's `@StateObject` variable (slot refs look like `model.x`).
    pub model_var: Option<&'a str>,
    /// Active list-row binding.
    pub item: Option<&'a str>,
    /// The items slot of an indices-keyed list (`items[index]` reads the row).
    pub item_list: Option<&'a str>,
    /// Binding of the pending async result.
    pub result: Option<&'a str>,
    /// Inside a `catch` block, where `error` is implicitly bound.
    pub in_catch: bool,
    /// Declared record names.
    pub records: &'a [String],
}

impl ExprCtx<'_> {
    fn err(&self, reason: impl Into<String>, line: usize) -> ExtractionError {
        ExtractionError::new(reason, Location::line(line))
    }
}

pub fn parse_expr(text: &str, ctx: &ExprCtx<'_>, line: usize) -> Result<Expr, ExtractionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ctx.err("empty expression", line));
    }

    // Ternary.
    if let Some(q) = find_top_level(text, "? ") {
        if let Some(c) = find_top_level(&text[q + 1..], ":") {
            let cond = parse_expr(&text[..q], ctx, line)?;
            let then_val = parse_expr(&text[q + 1..q + 1 + c], ctx, line)?;
            let else_val = parse_expr(&text[q + 2 + c..], ctx, line)?;
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_val: Box::new(then_val),
                else_val: Box::new(else_val),
            });
        }
    }

    // Nil tests.
    if let Some(lhs) = text.strip_suffix("== nil") {
        return Ok(Expr::IsNil(Box::new(parse_expr(lhs, ctx, line)?)));
    }
    if let Some(lhs) = text.strip_suffix("!= nil") {
        return Ok(Expr::Not(Box::new(Expr::IsNil(Box::new(parse_expr(
            lhs, ctx, line,
        )?)))));
    }

    if let Some(rest) = text.strip_prefix('!') {
        return Ok(Expr::Not(Box::new(parse_expr(rest, ctx, line)?)));
    }

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Ok(Expr::Literal(Literal::Str(text[1..text.len() - 1].into())));
    }

    match text {
        "true" => return Ok(Expr::Literal(Literal::Bool(true))),
        "false" => return Ok(Expr::Literal(Literal::Bool(false))),
        "nil" => return Ok(Expr::Literal(Literal::Nil)),
        _ => {}
    }
    let plain: String = text.chars().filter(|c| *c != '_').collect();
    if let Ok(n) = plain.parse::<i64>() {
        return Ok(Expr::Literal(Literal::Int(n)));
    }

    if text.starts_with('[') && text.ends_with(']') {
        let items = split_top_commas(&text[1..text.len() - 1])
            .iter()
            .map(|p| parse_expr(p, ctx, line))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expr::ListLit(items));
    }

    if let Some(lhs) = text.strip_suffix(".isEmpty") {
        return Ok(Expr::IsEmpty(Box::new(parse_expr(lhs, ctx, line)?)));
    }

    if text == "UUID()" {
        return Ok(Expr::NewUuid);
    }

    // Record construction: `Rec(field: value, ...)`.
    if let Some(open) = text.find('(') {
        let callee = text[..open].trim();
        if ctx.records.iter().any(|r| r == callee) {
            let close = find_matching(text, open, b'(', b')')
                .ok_or_else(|| ctx.err("unterminated record constructor", line))?;
            if close == text.len() - 1 {
                let mut fields = Vec::new();
                for part in split_top_commas(&text[open + 1..close]) {
                    let (name, value) = part
                        .split_once(':')
                        .ok_or_else(|| ctx.err(format!("unlabeled record field `{part}`"), line))?;
                    fields.push((name.trim().to_string(), parse_expr(value, ctx, line)?));
                }
                return Ok(Expr::MakeRecord {
                    record: callee.to_string(),
                    fields,
                });
            }
        }
    }

    // `items[index]` reads the row of an indices-keyed list.
    if let (Some(item), Some(item_list)) = (ctx.item, ctx.item_list) {
        if text == format!("{item_list}[{item}]") {
            return Ok(Expr::Item);
        }
    }

    parse_reference(text, ctx, line)
}

/// Resolve `base.field.field` member chains and bare identifiers.
fn parse_reference(text: &str, ctx: &ExprCtx<'_>, line: usize) -> Result<Expr, ExtractionError> {
    let text = text.strip_prefix("self.").unwrap_or(text);
    let mut parts = text.split('.');
    let base = parts.next().unwrap_or_default().trim();
    if base.is_empty() || !base.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ctx.err(format!("unsupported expression `{text}`"), line));
    }

    // `error` is the implicit catch binding; any projection of it (e.g.
    // `.localizedDescription`) renders the message.
    if ctx.in_catch && base == "error" {
        return Ok(Expr::ErrorMessage);
    }

    let mut expr = if ctx.model_var == Some(base) {
        let slot = parts
            .next()
            .ok_or_else(|| ctx.err("view-model reference without a property", line))?
            .trim();
        if !ctx.slots.iter().any(|s| s == slot) {
            return Err(ctx.err(format!("reference to undeclared slot `{slot}`"), line));
        }
        Expr::Slot(slot.to_string())
    } else if ctx.item == Some(base) {
        Expr::Item
    } else if ctx.result == Some(base) {
        Expr::AsyncResult
    } else if ctx.params.iter().any(|p| p == base) {
        Expr::Param(base.to_string())
    } else if ctx.slots.iter().any(|s| s == base) {
        Expr::Slot(base.to_string())
    } else {
        return Err(ctx.err(
            format!("reference to undeclared identifier `{base}`"),
            line,
        ));
    };

    for field in parts {
        expr = Expr::Field {
            object: Box::new(expr),
            field: field.trim().to_string(),
        };
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_qualified_slot() {
        let slots = vec!["isLoading".to_string()];
        let ctx = ExprCtx {
            slots: &slots,
            model_var: Some("model"),
            ..Default::default()
        };
        assert_eq!(
            parse_expr("model.isLoading", &ctx, 1).unwrap(),
            Expr::Slot("isLoading".into())
        );
    }

    #[test]
    fn item_field_with_ternary() {
        let slots = Vec::new();
        let ctx = ExprCtx {
            slots: &slots,
            item: Some("task"),
            ..Default::default()
        };
        let expr = parse_expr("task.isCompleted ? \"Done\" : \"Todo\"", &ctx, 1).unwrap();
        match expr {
            Expr::Ternary { cond, .. } => assert_eq!(
                *cond,
                Expr::Field {
                    object: Box::new(Expr::Item),
                    field: "isCompleted".into(),
                }
            ),
            other => panic!("expected ternary, got {other:?}"),
        }
    }

    #[test]
    fn record_constructor() {
        let slots = Vec::new();
        let params = vec!["title".to_string()];
        let records = vec!["TaskItem".to_string()];
        let ctx = ExprCtx {
            slots: &slots,
            params: &params,
            records: &records,
            ..Default::default()
        };
        let expr = parse_expr(
            "TaskItem(id: UUID(), title: title, isCompleted: false)",
            &ctx,
            1,
        )
        .unwrap();
        assert_eq!(
            expr,
            Expr::MakeRecord {
                record: "TaskItem".into(),
                fields: vec![
                    ("id".into(), Expr::NewUuid),
                    ("title".into(), Expr::Param("title".into())),
                    ("isCompleted".into(), Expr::Literal(Literal::Bool(false))),
                ],
            }
        );
    }

    #[test]
    fn indices_row_read() {
        let slots = vec!["tasks".to_string()];
        let ctx = ExprCtx {
            slots: &slots,
            item: Some("index"),
            item_list: Some("tasks"),
            ..Default::default()
        };
        assert_eq!(parse_expr("tasks[index]", &ctx, 1).unwrap(), Expr::Item);
    }

    #[test]
    fn catch_error_projection() {
        let slots = Vec::new();
        let ctx = ExprCtx {
            slots: &slots,
            in_catch: true,
            ..Default::default()
        };
        assert_eq!(
            parse_expr("error.localizedDescription", &ctx, 1).unwrap(),
            Expr::ErrorMessage
        );
    }

    #[test]
    fn nil_literal_and_test() {
        let slots = vec!["errorMessage".to_string()];
        let ctx = ExprCtx {
            slots: &slots,
            ..Default::default()
        };
        assert_eq!(
            parse_expr("nil", &ctx, 1).unwrap(),
            Expr::Literal(Literal::Nil)
        );
        assert_eq!(
            parse_expr("errorMessage != nil", &ctx, 1).unwrap(),
            Expr::Not(Box::new(Expr::IsNil(Box::new(Expr::Slot(
                "errorMessage".into()
            )))))
        );
    }
}
