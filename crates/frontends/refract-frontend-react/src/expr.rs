//! TypeScript expression translation.
//!
//! Turns the raw expression texts the surface parser collected into IR
//! expressions, resolving identifiers against the component's slots,
//! the enclosing handler's parameters, and the active JSX/lambda bindings.
//! Unknown identifiers and unsupported forms are extraction errors.

use refract_core::error::{ExtractionError, Location};
use refract_core::ir::{Expr, Literal};

use crate::parser::{find_top_level, split_top_commas};

/// Name-resolution context for one expression site.
#[derive(Debug, Clone, Default)]
pub struct ExprCtx<'a> {
    pub slots: &'a [String],
    pub params: &'a [String],
    /// Active list-row binding (inside a `.map` template).
    pub item: Option<&'a str>,
    /// Binding of the pending async result (`const r = await ...`).
    pub result: Option<&'a str>,
    /// Catch-clause error binding.
    pub error: Option<&'a str>,
    /// Declared record (interface) names.
    pub records: &'a [String],
}

impl<'a> ExprCtx<'a> {
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
    if let Some(q) = find_top_level(text, "?") {
        // `??` and `?.` are not ternaries.
        if !text[q..].starts_with("??") && !text[q..].starts_with("?.") {
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
    }

    // Comparisons against null / the empty string.
    for (op, negated) in [("!==", true), ("===", false), ("!=", true), ("==", false)] {
        if let Some(pos) = find_top_level(text, op) {
            let lhs = text[..pos].trim();
            let rhs = text[pos + op.len()..].trim();
            let base = if rhs == "null" || rhs == "undefined" {
                Expr::IsNil(Box::new(parse_expr(lhs, ctx, line)?))
            } else if rhs == "''" || rhs == "\"\"" {
                Expr::IsEmpty(Box::new(parse_expr(lhs, ctx, line)?))
            } else {
                return Err(ctx.err(
                    format!("unsupported comparison `{text}` (only null/empty tests)"),
                    line,
                ));
            };
            return Ok(if negated {
                Expr::Not(Box::new(base))
            } else {
                base
            });
        }
    }

    if let Some(rest) = text.strip_prefix('!') {
        return Ok(Expr::Not(Box::new(parse_expr(rest, ctx, line)?)));
    }

    // String literals.
    if (text.starts_with('\'') && text.ends_with('\'') && text.len() >= 2)
        || (text.starts_with('"') && text.ends_with('"') && text.len() >= 2)
    {
        return Ok(Expr::Literal(Literal::Str(text[1..text.len() - 1].into())));
    }

    match text {
        "true" => return Ok(Expr::Literal(Literal::Bool(true))),
        "false" => return Ok(Expr::Literal(Literal::Bool(false))),
        "null" | "undefined" => return Ok(Expr::Literal(Literal::Nil)),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Expr::Literal(Literal::Int(n)));
    }

    // Array literals and spread-append.
    if text.starts_with('[') && text.ends_with(']') {
        let inner = &text[1..text.len() - 1];
        let parts = split_top_commas(inner);
        if let Some(first) = parts.first() {
            if let Some(spread) = first.strip_prefix("...") {
                if parts.len() != 2 {
                    return Err(ctx.err(
                        format!("unsupported spread form `{text}` (expected `[...list, item]`)"),
                        line,
                    ));
                }
                return Ok(Expr::Append {
                    list: Box::new(parse_expr(spread, ctx, line)?),
                    item: Box::new(parse_expr(&parts[1], ctx, line)?),
                });
            }
        }
        let items = parts
            .iter()
            .map(|p| parse_expr(p, ctx, line))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Expr::ListLit(items));
    }

    // Object literals construct record values.
    if text.starts_with('{') && text.ends_with('}') {
        return parse_record_literal(&text[1..text.len() - 1], ctx, line);
    }

    if text == "crypto.randomUUID()" {
        return Ok(Expr::NewUuid);
    }

    // `String(err)` renders the caught error.
    if let Some(inner) = text
        .strip_prefix("String(")
        .and_then(|r| r.strip_suffix(')'))
    {
        if ctx.error == Some(inner.trim()) {
            return Ok(Expr::ErrorMessage);
        }
    }

    // Keyed list rewrites: `.map` toggle and `.filter` removal.
    if let Some(pos) = find_top_level(text, ".map(") {
        return parse_toggle_map(text, pos, ctx, line);
    }
    if let Some(pos) = find_top_level(text, ".filter(") {
        return parse_filter_remove(text, pos, ctx, line);
    }

    // Member chains and plain identifiers.
    parse_reference(text, ctx, line)
}

/// `{ id: crypto.randomUUID(), title: input, isCompleted: false }`.
fn parse_record_literal(
    inner: &str,
    ctx: &ExprCtx<'_>,
    line: usize,
) -> Result<Expr, ExtractionError> {
    let mut fields = Vec::new();
    for part in split_top_commas(inner) {
        let (name, value) = part
            .split_once(':')
            .ok_or_else(|| ctx.err(format!("malformed object field `{part}`"), line))?;
        fields.push((name.trim().to_string(), parse_expr(value, ctx, line)?));
    }
    // The record is identified by its field names.
    let record = ctx
        .records
        .first()
        .cloned()
        .ok_or_else(|| ctx.err("object literal with no record type declared", line))?;
    Ok(Expr::MakeRecord { record, fields })
}

/// `list.map((b) => b.id === idExpr ? { ...b, field: !b.field } : b)`.
fn parse_toggle_map(
    text: &str,
    map_pos: usize,
    ctx: &ExprCtx<'_>,
    line: usize,
) -> Result<Expr, ExtractionError> {
    let list = parse_expr(&text[..map_pos], ctx, line)?;
    let lambda = text[map_pos + ".map(".len()..]
        .strip_suffix(')')
        .ok_or_else(|| ctx.err("unterminated `.map` call", line))?;
    let arrow =
        find_top_level(lambda, "=>").ok_or_else(|| ctx.err("`.map` without arrow", line))?;
    let binding = lambda[..arrow]
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string();
    let body = lambda[arrow + 2..].trim();

    let q = find_top_level(body, "?")
        .ok_or_else(|| ctx.err("only toggle-by-id `.map` rewrites are supported", line))?;
    let cond = body[..q].trim();
    let eq = find_top_level(cond, "===")
        .ok_or_else(|| ctx.err("`.map` condition must compare `id`", line))?;
    let lhs = cond[..eq].trim();
    if lhs != format!("{binding}.id") {
        return Err(ctx.err(
            format!("`.map` condition must test `{binding}.id`, found `{lhs}`"),
            line,
        ));
    }
    let id = parse_expr(&cond[eq + 3..], ctx, line)?;

    let colon = find_top_level(&body[q + 1..], ":")
        .ok_or_else(|| ctx.err("`.map` ternary without `:`", line))?;
    let then_text = body[q + 1..q + 1 + colon].trim();
    let inner = then_text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| ctx.err("`.map` then-branch must be a spread object", line))?;
    let mut field = None;
    for part in split_top_commas(inner) {
        if part.starts_with("...") {
            continue;
        }
        let (name, value) = part
            .split_once(':')
            .ok_or_else(|| ctx.err(format!("malformed spread field `{part}`"), line))?;
        let name = name.trim();
        if value.trim() == format!("!{binding}.{name}") {
            field = Some(name.to_string());
        }
    }
    let field =
        field.ok_or_else(|| ctx.err("`.map` rewrite does not flip a boolean field", line))?;

    Ok(Expr::ToggleWhere {
        list: Box::new(list),
        id: Box::new(id),
        field,
    })
}

/// `list.filter((b) => b.id !== idExpr)`.
fn parse_filter_remove(
    text: &str,
    filter_pos: usize,
    ctx: &ExprCtx<'_>,
    line: usize,
) -> Result<Expr, ExtractionError> {
    let list = parse_expr(&text[..filter_pos], ctx, line)?;
    let lambda = text[filter_pos + ".filter(".len()..]
        .strip_suffix(')')
        .ok_or_else(|| ctx.err("unterminated `.filter` call", line))?;
    let arrow =
        find_top_level(lambda, "=>").ok_or_else(|| ctx.err("`.filter` without arrow", line))?;
    let binding = lambda[..arrow]
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string();
    let body = lambda[arrow + 2..].trim();
    let neq = find_top_level(body, "!==")
        .ok_or_else(|| ctx.err("only remove-by-id `.filter` rewrites are supported", line))?;
    let lhs = body[..neq].trim();
    if lhs != format!("{binding}.id") {
        return Err(ctx.err(
            format!("`.filter` condition must test `{binding}.id`, found `{lhs}`"),
            line,
        ));
    }
    let id = parse_expr(&body[neq + 3..], ctx, line)?;
    Ok(Expr::RemoveWhere {
        list: Box::new(list),
        id: Box::new(id),
    })
}

/// Resolve `base.field.field` member chains and bare identifiers.
fn parse_reference(text: &str, ctx: &ExprCtx<'_>, line: usize) -> Result<Expr, ExtractionError> {
    let mut parts = text.split('.');
    let base = parts.next().unwrap_or_default().trim();
    if base.is_empty() || !base.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ctx.err(format!("unsupported expression `{text}`"), line));
    }

    let mut expr = if ctx.item == Some(base) {
        Expr::Item
    } else if ctx.result == Some(base) {
        Expr::AsyncResult
    } else if ctx.error == Some(base) {
        // `err.message` and bare `err` both render the message.
        return Ok(Expr::ErrorMessage);
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

    fn ctx_with(slots: &[&str]) -> (Vec<String>, Vec<String>) {
        (
            slots.iter().map(|s| s.to_string()).collect(),
            vec!["TaskItem".to_string()],
        )
    }

    #[test]
    fn spread_append() {
        let (slots, records) = ctx_with(&["tasks", "input"]);
        let ctx = ExprCtx {
            slots: &slots,
            records: &records,
            ..Default::default()
        };
        let expr = parse_expr("[...tasks, input]", &ctx, 1).unwrap();
        assert_eq!(
            expr,
            Expr::Append {
                list: Box::new(Expr::Slot("tasks".into())),
                item: Box::new(Expr::Slot("input".into())),
            }
        );
    }

    #[test]
    fn toggle_map_rewrite() {
        let (slots, records) = ctx_with(&["tasks"]);
        let params = vec!["id".to_string()];
        let ctx = ExprCtx {
            slots: &slots,
            params: &params,
            records: &records,
            ..Default::default()
        };
        let expr = parse_expr(
            "tasks.map((item) => item.id === id ? { ...item, isCompleted: !item.isCompleted } : item)",
            &ctx,
            1,
        )
        .unwrap();
        assert_eq!(
            expr,
            Expr::ToggleWhere {
                list: Box::new(Expr::Slot("tasks".into())),
                id: Box::new(Expr::Param("id".into())),
                field: "isCompleted".into(),
            }
        );
    }

    #[test]
    fn filter_remove_rewrite() {
        let (slots, records) = ctx_with(&["tasks"]);
        let params = vec!["id".to_string()];
        let ctx = ExprCtx {
            slots: &slots,
            params: &params,
            records: &records,
            ..Default::default()
        };
        let expr = parse_expr("tasks.filter((item) => item.id !== id)", &ctx, 1).unwrap();
        assert_eq!(
            expr,
            Expr::RemoveWhere {
                list: Box::new(Expr::Slot("tasks".into())),
                id: Box::new(Expr::Param("id".into())),
            }
        );
    }

    #[test]
    fn null_test_on_optional_slot() {
        let (slots, records) = ctx_with(&["errorMessage"]);
        let ctx = ExprCtx {
            slots: &slots,
            records: &records,
            ..Default::default()
        };
        let expr = parse_expr("errorMessage !== null", &ctx, 1).unwrap();
        assert_eq!(
            expr,
            Expr::Not(Box::new(Expr::IsNil(Box::new(Expr::Slot(
                "errorMessage".into()
            )))))
        );
    }

    #[test]
    fn undeclared_identifier_is_reported() {
        let ctx = ExprCtx::default();
        let err = parse_expr("ghost", &ctx, 7).unwrap_err();
        assert!(err.reason.contains("undeclared"));
        assert_eq!(err.location.line, 7);
    }

    #[test]
    fn ternary_label() {
        let (slots, records) = ctx_with(&["loading"]);
        let ctx = ExprCtx {
            slots: &slots,
            records: &records,
            ..Default::default()
        };
        let expr = parse_expr("loading ? 'Adding...' : 'Add Task'", &ctx, 1).unwrap();
        match expr {
            Expr::Ternary { cond, .. } => assert_eq!(*cond, Expr::Slot("loading".into())),
            other => panic!("expected ternary, got {other:?}"),
        }
    }
}
