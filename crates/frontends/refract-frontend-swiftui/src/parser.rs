//! Minimal SwiftUI surface parser.
//!
//! Parses the component subset the adapter understands: an optional
//! `ObservableObject` view-model class (with `@Published` state, nested
//! record structs, `init`, and methods) and a `View` struct (with `@State`
//! properties, a `body` view DSL, and helper funcs). The parser is
//! line-oriented: physical lines are first joined into logical lines so
//! multi-line initializers and argument lists read as one statement, while
//! `{`-terminated block openers keep their own line. Anything outside the
//! subset is a parse error carrying its line — never skipped.

use crate::ast::{
    SwiftClass, SwiftFile, SwiftFunc, SwiftProperty, SwiftRecord, SwiftStmt, SwiftView,
    SwiftViewNode,
};

/// Parse failure, reported with a 1-based source line.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} (line {line})")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// A logical source line: joined text plus the first physical line number.
#[derive(Debug, Clone)]
struct Line {
    text: String,
    num: usize,
}

struct P {
    lines: Vec<Line>,
    idx: usize,
}

impl P {
    fn peek(&self) -> Option<&Line> {
        self.lines.get(self.idx)
    }

    fn next(&mut self) -> Option<Line> {
        let line = self.lines.get(self.idx).cloned();
        if line.is_some() {
            self.idx += 1;
        }
        line
    }

    fn line_no(&self) -> usize {
        self.peek().map(|l| l.num).unwrap_or(0)
    }
}

pub fn parse_file(source: &str) -> Result<SwiftFile, ParseError> {
    let mut p = P {
        lines: logical_lines(source),
        idx: 0,
    };

    let mut model = None;
    let mut view = None;
    let mut records = Vec::new();

    while let Some(line) = p.peek().cloned() {
        let text = line.text.as_str();
        if text.starts_with("import ") || text == "@MainActor" {
            p.next();
        } else if text.starts_with("class ") && text.contains("ObservableObject") {
            p.next();
            let parsed = parse_class(text, line.num, &mut p)?;
            records.extend(parsed.1);
            model = Some(parsed.0);
        } else if text.starts_with("struct ") && text.contains(": View") {
            p.next();
            view = Some(parse_view(text, line.num, &mut p)?);
        } else if text.starts_with("struct ") {
            p.next();
            records.push(parse_record(text, line.num, &mut p)?);
        } else {
            return Err(ParseError::new(
                format!("unrecognized top-level construct: `{text}`"),
                line.num,
            ));
        }
    }

    let view = view.ok_or_else(|| ParseError::new("no `View` struct found", 1))?;
    Ok(SwiftFile {
        model,
        records,
        view,
    })
}

// ---------------------------------------------------------------------------
// Class (view-model)
// ---------------------------------------------------------------------------

fn parse_class(
    header: &str,
    header_line: usize,
    p: &mut P,
) -> Result<(SwiftClass, Vec<SwiftRecord>), ParseError> {
    let name = header
        .trim_start_matches("class ")
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut published = Vec::new();
    let mut records = Vec::new();
    let mut init_calls = Vec::new();
    let mut funcs = Vec::new();

    while let Some(line) = p.next() {
        let text = line.text.as_str();
        if text == "}" {
            let class = SwiftClass {
                name,
                published,
                init_calls,
                funcs,
                line: header_line,
            };
            return Ok((class, records));
        } else if let Some(rest) = text.strip_prefix("@Published var ") {
            published.push(parse_property(rest, line.num)?);
        } else if text.starts_with("struct ") {
            records.push(parse_record(text, line.num, p)?);
        } else if text.starts_with("init()") {
            for stmt in parse_stmts(p)? {
                match stmt {
                    SwiftStmt::Call { callee, args, line } => {
                        if !args.is_empty() {
                            return Err(ParseError::new(
                                "init may only invoke zero-argument loaders",
                                line,
                            ));
                        }
                        init_calls.push(callee);
                    }
                    _ => {
                        return Err(ParseError::new(
                            "init body must only call declared methods",
                            line.num,
                        ))
                    }
                }
            }
        } else if text.starts_with("func ") {
            funcs.push(parse_func(text, line.num, p)?);
        } else if text.starts_with("var ") || text.starts_with("let ") || text.contains(" var ") {
            // A stored property with no recognized ownership idiom.
            return Err(ParseError::new(
                format!("state declaration has no recognized ownership idiom: `{text}`"),
                line.num,
            ));
        } else {
            return Err(ParseError::new(
                format!("unrecognized class member: `{text}`"),
                line.num,
            ));
        }
    }
    Err(ParseError::new("unterminated class body", header_line))
}

/// `name: Type = init` or `name: Type?` (optionals default to nil).
fn parse_property(rest: &str, line: usize) -> Result<SwiftProperty, ParseError> {
    let (decl, init) = match find_top_level(rest, "=") {
        Some(eq) => (rest[..eq].trim(), Some(rest[eq + 1..].trim().to_string())),
        None => (rest.trim(), None),
    };
    let (name, ty) = match decl.split_once(':') {
        Some((n, t)) => (n.trim().to_string(), Some(t.trim().to_string())),
        None => (decl.to_string(), None),
    };
    if name.is_empty() {
        return Err(ParseError::new("property without a name", line));
    }
    Ok(SwiftProperty {
        name,
        ty,
        init,
        line,
    })
}

fn parse_record(header: &str, header_line: usize, p: &mut P) -> Result<SwiftRecord, ParseError> {
    let decl = header.trim_start_matches("struct ").trim_end_matches('{');
    let (name, protocols) = match decl.split_once(':') {
        Some((n, rest)) => (n.trim().to_string(), rest),
        None => (decl.trim().to_string(), ""),
    };
    let identifiable = protocols.contains("Identifiable");

    let mut fields = Vec::new();
    while let Some(line) = p.next() {
        let text = line.text.as_str();
        if text == "}" {
            return Ok(SwiftRecord {
                name,
                identifiable,
                fields,
                line: header_line,
            });
        }
        let field = text
            .strip_prefix("let ")
            .or_else(|| text.strip_prefix("var "))
            .ok_or_else(|| {
                ParseError::new(format!("unrecognized record member: `{text}`"), line.num)
            })?;
        let (fname, fty) = field.split_once(':').ok_or_else(|| {
            ParseError::new(format!("record field without a type: `{field}`"), line.num)
        })?;
        fields.push((fname.trim().to_string(), fty.trim().to_string()));
    }
    Err(ParseError::new("unterminated record struct", header_line))
}

fn parse_func(header: &str, header_line: usize, p: &mut P) -> Result<SwiftFunc, ParseError> {
    let sig = header.trim_start_matches("func ");
    let open = sig
        .find('(')
        .ok_or_else(|| ParseError::new("func without parameter list", header_line))?;
    let name = sig[..open].trim().to_string();
    let close = find_matching(sig, open, b'(', b')')
        .ok_or_else(|| ParseError::new("unterminated parameter list", header_line))?;
    let params = split_top_commas(&sig[open + 1..close])
        .into_iter()
        .map(|param| match param.split_once(':') {
            Some((label, ty)) => Ok((label.trim().to_string(), ty.trim().to_string())),
            None => Err(ParseError::new(
                format!("parameter without a type: `{param}`"),
                header_line,
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let body = parse_stmts(p)?;
    Ok(SwiftFunc {
        name,
        params,
        body,
        line: header_line,
    })
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// Parse statements until the block's closing `}` (consumed). Returns at
/// `} catch {` and `} else {` without consuming.
fn parse_stmts(p: &mut P) -> Result<Vec<SwiftStmt>, ParseError> {
    let mut stmts = Vec::new();
    while let Some(line) = p.peek().cloned() {
        let text = line.text.as_str();
        let num = line.num;
        if text == "}" {
            p.next();
            return Ok(stmts);
        }
        if text.starts_with("} catch") || text.starts_with("} else") {
            return Ok(stmts);
        }
        p.next();

        if text == "Task {" {
            stmts.push(SwiftStmt::TaskBlock {
                body: parse_stmts(p)?,
                line: num,
            });
        } else if text == "do {" {
            let body = parse_stmts(p)?;
            let catch_line = p.peek().map(|l| l.text.clone()).unwrap_or_default();
            if !catch_line.starts_with("} catch") {
                return Err(ParseError::new("do block without catch", p.line_no()));
            }
            p.next();
            let catch_body = parse_stmts(p)?;
            stmts.push(SwiftStmt::DoCatch {
                body,
                catch_body,
                line: num,
            });
        } else if text.starts_with("await MainActor.run {") {
            // Main-actor hops are transparent to the action chain.
            stmts.extend(parse_stmts(p)?);
        } else if let Some(rest) = strip_any(text, &["try await Task.sleep(", "try? await Task.sleep("]) {
            let optional = text.starts_with("try?");
            let nanos = parse_nanos(rest, num)?;
            stmts.push(SwiftStmt::TrySleep {
                nanos,
                optional,
                line: num,
            });
        } else if text.starts_with("if let index = ") && text.ends_with('{') {
            stmts.push(parse_toggle_at(text, num, p)?);
        } else if text.starts_with("if ") && text.ends_with('{') {
            let cond = text[3..text.len() - 1].trim().to_string();
            let then_body = parse_stmts(p)?;
            let mut else_body = Vec::new();
            if p.peek().map(|l| l.text.starts_with("} else")) == Some(true) {
                p.next();
                else_body = parse_stmts(p)?;
            }
            stmts.push(SwiftStmt::If {
                cond,
                then_body,
                else_body,
                line: num,
            });
        } else if let Some(stmt) = parse_await_call(text, num)? {
            stmts.push(stmt);
        } else if let Some(pos) = find_top_level(text, ".removeAll(where:") {
            let list = normalize_target(&text[..pos]);
            let id = closure_id_test(text, num)?;
            stmts.push(SwiftStmt::RemoveAll { list, id, line: num });
        } else if let Some(pos) = find_top_level(text, ".append(") {
            let list = normalize_target(&text[..pos]);
            let inner = text[pos + ".append(".len()..]
                .strip_suffix(')')
                .ok_or_else(|| ParseError::new("unterminated append call", num))?;
            stmts.push(SwiftStmt::Append {
                list,
                value: inner.trim().to_string(),
                line: num,
            });
        } else if let Some(eq) = find_top_level(text, "= ") {
            let target = normalize_target(&text[..eq]);
            let value = text[eq + 1..].trim().to_string();
            stmts.push(SwiftStmt::Assign {
                target,
                value,
                line: num,
            });
        } else if text.contains('(') && text.ends_with(')') {
            let open = text.find('(').unwrap();
            let close = find_matching(text, open, b'(', b')')
                .ok_or_else(|| ParseError::new("unterminated call", num))?;
            let callee = normalize_target(&text[..open]);
            let args = split_top_commas(&text[open + 1..close]);
            stmts.push(SwiftStmt::Call {
                callee,
                args,
                line: num,
            });
        } else {
            return Err(ParseError::new(
                format!("unrecognized statement: `{text}`"),
                num,
            ));
        }
    }
    Err(ParseError::new("unterminated block", p.line_no()))
}

/// `[let binding =] try/await call` forms. Returns `None` when `text` is not
/// an awaited call.
fn parse_await_call(text: &str, num: usize) -> Result<Option<SwiftStmt>, ParseError> {
    let (binding, rest) = match text.strip_prefix("let ") {
        Some(rest) => {
            let Some(eq) = find_top_level(rest, "=") else {
                return Ok(None);
            };
            (
                Some(rest[..eq].trim().to_string()),
                rest[eq + 1..].trim().to_string(),
            )
        }
        // `_ = await f(...)` discards the result.
        None => match text.strip_prefix("_ =") {
            Some(rest) => (None, rest.trim().to_string()),
            None => (None, text.to_string()),
        },
    };
    let call = rest
        .trim_start_matches("try ")
        .trim_start_matches("try? ")
        .trim();
    let Some(call) = call.strip_prefix("await ") else {
        return Ok(None);
    };
    let open = call
        .find('(')
        .ok_or_else(|| ParseError::new("awaited expression is not a call", num))?;
    let close = find_matching(call, open, b'(', b')')
        .ok_or_else(|| ParseError::new("unterminated awaited call", num))?;
    Ok(Some(SwiftStmt::AwaitCall {
        binding,
        callee: call[..open].trim().to_string(),
        args: split_top_commas(&call[open + 1..close]),
        line: num,
    }))
}

/// `if let index = list.firstIndex(where: { $0.id == idExpr }) {` followed by
/// `list[index].field.toggle()` and the closing brace.
fn parse_toggle_at(header: &str, num: usize, p: &mut P) -> Result<SwiftStmt, ParseError> {
    let fi = find_top_level(header, ".firstIndex(where:")
        .ok_or_else(|| ParseError::new("only firstIndex(where:) index bindings are supported", num))?;
    let list = header["if let index = ".len()..fi].trim().to_string();
    let id = closure_id_test(header, num)?;

    let body_line = p
        .next()
        .ok_or_else(|| ParseError::new("unterminated index block", num))?;
    let body = body_line.text.as_str();
    let toggled = body
        .strip_prefix(&format!("{list}[index]."))
        .and_then(|r| r.strip_suffix(".toggle()"))
        .ok_or_else(|| {
            ParseError::new(
                format!("expected `{list}[index].<field>.toggle()`, found `{body}`"),
                body_line.num,
            )
        })?;
    let close = p
        .next()
        .ok_or_else(|| ParseError::new("unterminated index block", num))?;
    if close.text != "}" {
        return Err(ParseError::new(
            "index block must contain a single toggle",
            close.num,
        ));
    }
    Ok(SwiftStmt::ToggleAt {
        list,
        id,
        field: toggled.trim().to_string(),
        line: num,
    })
}

/// The `idExpr` of a `{ $0.id == idExpr }` closure.
fn closure_id_test(text: &str, num: usize) -> Result<String, ParseError> {
    let start = text
        .find("{ $0.id == ")
        .ok_or_else(|| ParseError::new("only `$0.id ==` row predicates are supported", num))?;
    let rest = &text[start + "{ $0.id == ".len()..];
    let end = rest
        .find('}')
        .ok_or_else(|| ParseError::new("unterminated row predicate", num))?;
    Ok(rest[..end].trim().to_string())
}

/// `Task.sleep(nanoseconds: 500_000_000)` argument.
fn parse_nanos(rest: &str, num: usize) -> Result<u64, ParseError> {
    let digits: String = rest
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse()
        .map_err(|_| ParseError::new("sleep duration is not a literal number", num))
}

fn normalize_target(text: &str) -> String {
    text.trim()
        .trim_start_matches("self.")
        .trim()
        .to_string()
}

fn strip_any<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| text.strip_prefix(p))
}

// ---------------------------------------------------------------------------
// View struct
// ---------------------------------------------------------------------------

fn parse_view(header: &str, header_line: usize, p: &mut P) -> Result<SwiftView, ParseError> {
    let name = header
        .trim_start_matches("struct ")
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut state_object = None;
    let mut states = Vec::new();
    let mut body = None;
    let mut alert = None;
    let mut on_appear = None;
    let mut funcs = Vec::new();

    while let Some(line) = p.next() {
        let text = line.text.as_str();
        if text == "}" {
            let body = body
                .ok_or_else(|| ParseError::new("view struct has no `body`", header_line))?;
            return Ok(SwiftView {
                name,
                state_object,
                states,
                body,
                alert,
                on_appear,
                funcs,
                line: header_line,
            });
        } else if text.contains("@StateObject") {
            // `@StateObject private var model = ClassName()`
            let rest = text
                .split("var ")
                .nth(1)
                .ok_or_else(|| ParseError::new("malformed @StateObject property", line.num))?;
            let (vname, init) = rest
                .split_once('=')
                .ok_or_else(|| ParseError::new("@StateObject without initializer", line.num))?;
            let class = init.trim().trim_end_matches("()").to_string();
            state_object = Some((vname.trim().to_string(), class));
        } else if text.contains("@State") {
            let rest = text
                .split("var ")
                .nth(1)
                .ok_or_else(|| ParseError::new("malformed @State property", line.num))?;
            states.push(parse_property(rest, line.num)?);
        } else if text.starts_with("var body: some View {") {
            let (nodes, view_alert, view_appear) = parse_view_block(p)?;
            body = Some(nodes);
            alert = alert.or(view_alert);
            on_appear = on_appear.or(view_appear);
        } else if text.starts_with("func ") {
            funcs.push(parse_func(text, line.num, p)?);
        } else if text.starts_with("var ") || text.starts_with("let ") {
            return Err(ParseError::new(
                format!("state declaration has no recognized ownership idiom: `{text}`"),
                line.num,
            ));
        } else {
            return Err(ParseError::new(
                format!("unrecognized view member: `{text}`"),
                line.num,
            ));
        }
    }
    Err(ParseError::new("unterminated view struct", header_line))
}

type ViewBlock = (Vec<SwiftViewNode>, Option<String>, Option<String>);

/// Parse view DSL nodes until the closing `}` (consumed). Modifier lines
/// attach to the node just parsed; `.alert`/`.onAppear` bubble up to the
/// view level.
fn parse_view_block(p: &mut P) -> Result<ViewBlock, ParseError> {
    let mut nodes = Vec::new();
    let mut alert = None;
    let mut on_appear = None;

    while let Some(line) = p.peek().cloned() {
        let text = line.text.as_str();
        let num = line.num;
        if text == "}" {
            p.next();
            return Ok((nodes, alert, on_appear));
        }
        if text.starts_with("} else") {
            return Ok((nodes, alert, on_appear));
        }

        if let Some(rest) = text.strip_prefix('.') {
            p.next();
            apply_modifier(rest, num, nodes.last_mut(), &mut alert, &mut on_appear)?;
            continue;
        }
        p.next();

        if text.starts_with("VStack") || text.starts_with("HStack") {
            if !text.ends_with('{') {
                return Err(ParseError::new("stack without a body", num));
            }
            let (children, a, o) = parse_view_block(p)?;
            alert = alert.or(a);
            on_appear = on_appear.or(o);
            nodes.push(SwiftViewNode::Stack {
                horizontal: text.starts_with("HStack"),
                children,
                line: num,
            });
        } else if let Some(inner) = call_arg(text, "Text") {
            nodes.push(SwiftViewNode::Text {
                expr: inner,
                heading: false,
                strikethrough: None,
                line: num,
            });
        } else if let Some(inner) = call_arg(text, "TextField") {
            let parts = split_top_commas(&inner);
            let [placeholder, binding] = parts.as_slice() else {
                return Err(ParseError::new(
                    "TextField takes a placeholder and a binding",
                    num,
                ));
            };
            let binding = binding
                .strip_prefix("text: $")
                .ok_or_else(|| ParseError::new("TextField without `text:` binding", num))?;
            nodes.push(SwiftViewNode::TextField {
                placeholder: unquote(placeholder, num)?,
                binding: binding.trim().to_string(),
                disabled: None,
                line: num,
            });
        } else if let Some(inner) = call_arg(text, "ProgressView") {
            nodes.push(SwiftViewNode::Progress {
                label: Some(unquote(&inner, num)?),
                line: num,
            });
        } else if text == "ProgressView()" {
            nodes.push(SwiftViewNode::Progress {
                label: None,
                line: num,
            });
        } else if text.starts_with("Button(") && text.ends_with('{') {
            nodes.push(parse_button(text, num, p)?);
        } else if text.starts_with("List(") {
            nodes.push(parse_list(text, num, p)?);
        } else if text.starts_with("if ") && text.ends_with('{') {
            let cond = text[3..text.len() - 1].trim().to_string();
            let (then_children, a1, o1) = parse_view_block(p)?;
            let mut else_children = Vec::new();
            let mut a2 = None;
            let mut o2 = None;
            if p.peek().map(|l| l.text.starts_with("} else")) == Some(true) {
                p.next();
                let parsed = parse_view_block(p)?;
                else_children = parsed.0;
                a2 = parsed.1;
                o2 = parsed.2;
            }
            alert = alert.or(a1).or(a2);
            on_appear = on_appear.or(o1).or(o2);
            nodes.push(SwiftViewNode::If {
                cond,
                then_children,
                else_children,
                line: num,
            });
        } else {
            return Err(ParseError::new(
                format!("render construct has no mapping rule: `{text}`"),
                num,
            ));
        }
    }
    Err(ParseError::new("unterminated view block", p.line_no()))
}

/// `Button("label") {`, `Button(action: f) {`.
fn parse_button(header: &str, num: usize, p: &mut P) -> Result<SwiftViewNode, ParseError> {
    let open = header.find('(').unwrap();
    let close = find_matching(header, open, b'(', b')')
        .ok_or_else(|| ParseError::new("unterminated Button arguments", num))?;
    let arg = header[open + 1..close].trim();

    if let Some(action) = arg.strip_prefix("action:") {
        // Trailing closure holds the label view.
        let label_line = p
            .next()
            .ok_or_else(|| ParseError::new("unterminated Button label", num))?;
        let label_expr = call_arg(&label_line.text, "Text").ok_or_else(|| {
            ParseError::new("Button(action:) label must be a Text view", label_line.num)
        })?;
        let close_line = p
            .next()
            .ok_or_else(|| ParseError::new("unterminated Button label", num))?;
        if close_line.text != "}" {
            return Err(ParseError::new(
                "Button(action:) label must be a single Text view",
                close_line.num,
            ));
        }
        Ok(SwiftViewNode::Button {
            label: None,
            action: Some(action.trim().to_string()),
            label_expr: Some(label_expr),
            body: Vec::new(),
            disabled: None,
            line: num,
        })
    } else {
        // `Button("label") { ... }` or `Button(labelExpr) { ... }`.
        let (label, label_expr) = match unquote(arg, num) {
            Ok(label) => (Some(label), None),
            Err(_) => (None, Some(arg.to_string())),
        };
        let body = parse_stmts(p)?;
        Ok(SwiftViewNode::Button {
            label,
            action: None,
            label_expr,
            body,
            disabled: None,
            line: num,
        })
    }
}

/// `List(items) { binding in` and `List(items.indices, id: \.self) { index in`.
fn parse_list(header: &str, num: usize, p: &mut P) -> Result<SwiftViewNode, ParseError> {
    let open = header.find('(').unwrap();
    let close = find_matching(header, open, b'(', b')')
        .ok_or_else(|| ParseError::new("unterminated List arguments", num))?;
    let args = split_top_commas(&header[open + 1..close]);
    let after = header[close + 1..].trim();
    let binding = after
        .strip_prefix('{')
        .and_then(|r| r.trim().strip_suffix("in"))
        .ok_or_else(|| ParseError::new("List without a row closure", num))?
        .trim()
        .to_string();

    let (items, indices) = match args.as_slice() {
        [items] => (items.clone(), false),
        [items, id] if id.trim() == "id: \\.self" => {
            let items = items
                .strip_suffix(".indices")
                .ok_or_else(|| ParseError::new("keyed List must iterate `.indices`", num))?;
            (items.to_string(), true)
        }
        _ => return Err(ParseError::new("unsupported List arguments", num)),
    };

    let (children, _, _) = parse_view_block(p)?;
    Ok(SwiftViewNode::List {
        items,
        binding,
        indices,
        children,
        line: num,
    })
}

fn apply_modifier(
    rest: &str,
    num: usize,
    node: Option<&mut SwiftViewNode>,
    alert: &mut Option<String>,
    on_appear: &mut Option<String>,
) -> Result<(), ParseError> {
    if rest.starts_with("alert(") {
        *alert = Some(rest.to_string());
        return Ok(());
    }
    if rest.starts_with("onAppear") {
        *on_appear = Some(rest.to_string());
        return Ok(());
    }
    let Some(node) = node else {
        // Styling modifiers on an empty block are meaningless but harmless.
        return Ok(());
    };
    match node {
        SwiftViewNode::Text {
            heading,
            strikethrough,
            ..
        } => {
            if rest.starts_with("font(.largeTitle)") || rest.starts_with("font(.title") {
                *heading = true;
            } else if let Some(inner) = rest
                .strip_prefix("strikethrough(")
                .and_then(|r| r.strip_suffix(')'))
            {
                *strikethrough = Some(inner.trim().to_string());
            }
            // .bold(), .foregroundColor(...) etc. are styling-only.
        }
        SwiftViewNode::TextField { disabled, .. } => {
            if let Some(inner) = rest
                .strip_prefix("disabled(")
                .and_then(|r| r.strip_suffix(')'))
            {
                *disabled = Some(inner.trim().to_string());
            }
        }
        SwiftViewNode::Button { disabled, .. } => {
            if let Some(inner) = rest
                .strip_prefix("disabled(")
                .and_then(|r| r.strip_suffix(')'))
            {
                *disabled = Some(inner.trim().to_string());
            }
        }
        _ => {}
    }
    let _ = num;
    Ok(())
}

/// `Name("...")` / `Name(expr)` — the single argument of a one-arg call
/// with nothing after the closing paren.
fn call_arg(text: &str, name: &str) -> Option<String> {
    let rest = text.strip_prefix(name)?;
    let rest = rest.strip_prefix('(')?;
    let mut depth = 1i32;
    let mut quote = false;
    for (i, b) in rest.bytes().enumerate() {
        match b {
            b'"' => quote = !quote,
            b'(' if !quote => depth += 1,
            b')' if !quote => {
                depth -= 1;
                if depth == 0 {
                    if rest[i + 1..].trim().is_empty() {
                        return Some(rest[..i].trim().to_string());
                    }
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}

fn unquote(text: &str, num: usize) -> Result<String, ParseError> {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        Ok(text[1..text.len() - 1].to_string())
    } else {
        Err(ParseError::new(
            format!("expected a string literal, found `{text}`"),
            num,
        ))
    }
}

// ---------------------------------------------------------------------------
// Logical lines and text helpers
// ---------------------------------------------------------------------------

/// Join physical lines into logical lines. A line with unbalanced brackets
/// absorbs following lines until balanced — unless the imbalance is a single
/// trailing `{` (a block opener, possibly with a closure parameter list,
/// e.g. `List(tasks) { task in`). Modifier lines (leading `.`) join on pure
/// balance so multi-line modifiers like `.alert(...)` stay whole.
fn logical_lines(source: &str) -> Vec<Line> {
    let mut out = Vec::new();
    let mut lines = source.lines().enumerate().peekable();

    while let Some((i, raw)) = lines.next() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let mut text = trimmed.to_string();
        let num = i + 1;
        let is_modifier = trimmed.starts_with('.');

        loop {
            let balance = net_balance(&text);
            if balance <= 0 {
                break;
            }
            if !is_modifier && balance == 1 && is_block_opener(&text) {
                break;
            }
            let Some((_, next_raw)) = lines.next() else {
                break;
            };
            let next = next_raw.trim();
            if !next.is_empty() && !next.starts_with("//") {
                text.push(' ');
                text.push_str(next);
            }
        }
        out.push(Line { text, num });
    }
    out
}

/// Net `([{` vs `)]}` balance, ignoring bracket characters inside strings.
fn net_balance(text: &str) -> i32 {
    let mut depth = 0i32;
    let mut quote = false;
    let mut prev = b' ';
    for b in text.bytes() {
        if quote {
            if b == b'"' && prev != b'\\' {
                quote = false;
            }
        } else {
            match b {
                b'"' => quote = true,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                _ => {}
            }
        }
        prev = b;
    }
    depth
}

/// True when the line's last `{` opens a block: it is the final character,
/// or is followed only by a closure parameter list ending in `in`.
fn is_block_opener(text: &str) -> bool {
    if text.ends_with('{') {
        return true;
    }
    if let Some(pos) = text.rfind('{') {
        let after = text[pos + 1..].trim();
        if let Some(params) = after.strip_suffix(" in").or(if after == "in" {
            Some("")
        } else {
            None
        }) {
            return params
                .split(',')
                .all(|p| p.trim().chars().all(|c| c.is_alphanumeric() || c == '_'));
        }
    }
    false
}

/// Byte offset of `pat` at depth zero, outside string literals.
pub fn find_top_level(s: &str, pat: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote = false;
    let mut prev = b' ';
    for i in 0..bytes.len() {
        let b = bytes[i];
        if quote {
            if b == b'"' && prev != b'\\' {
                quote = false;
            }
        } else {
            match b {
                b'"' => quote = true,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                _ => {
                    if depth == 0 && s[i..].starts_with(pat) {
                        return Some(i);
                    }
                }
            }
        }
        prev = b;
    }
    None
}

/// Split on top-level commas, trimming each piece.
pub fn split_top_commas(s: &str) -> Vec<String> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote = false;
    let mut prev = b' ';
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if quote {
            if b == b'"' && prev != b'\\' {
                quote = false;
            }
        } else {
            match b {
                b'"' => quote = true,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    parts.push(s[start..i].trim().to_string());
                    start = i + 1;
                }
                _ => {}
            }
        }
        prev = b;
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Index of the bracket matching the one at `open`.
pub fn find_matching(s: &str, open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote = false;
    let mut prev = b' ';
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if quote {
            if b == b'"' && prev != b'\\' {
                quote = false;
            }
        } else if b == b'"' {
            quote = true;
        } else if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        prev = b;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_lines_join_multiline_initializers() {
        let src = "self.tasks = [\n    TaskItem(id: UUID(), title: \"a\", isCompleted: true),\n    TaskItem(id: UUID(), title: \"b\", isCompleted: false)\n]";
        let lines = logical_lines(src);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.ends_with(']'));
    }

    #[test]
    fn block_openers_keep_their_own_line() {
        let src = "Task {\n    isLoading = false\n}";
        let lines = logical_lines(src);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "Task {");
    }

    #[test]
    fn closure_headers_are_openers() {
        assert!(is_block_opener("List(model.tasks) { task in"));
        assert!(is_block_opener("List(tasks.indices, id: \\.self) { index in"));
        assert!(is_block_opener("var body: some View {"));
        assert!(!is_block_opener("tasks.removeAll(where: { $0.id == id })"));
    }

    #[test]
    fn sleep_statement_parses_nanos() {
        assert_eq!(
            parse_nanos("nanoseconds: 500_000_000)", 1).unwrap(),
            500_000_000
        );
    }

    #[test]
    fn toggle_pattern_parses() {
        let src = "func toggleTask(id: UUID) {\n    if let index = tasks.firstIndex(where: { $0.id == id }) {\n        tasks[index].isCompleted.toggle()\n    }\n}";
        let mut p = P {
            lines: logical_lines(src),
            idx: 2,
        };
        let header = "if let index = tasks.firstIndex(where: { $0.id == id }) {";
        let stmt = parse_toggle_at(header, 2, &mut p).unwrap();
        match stmt {
            SwiftStmt::ToggleAt {
                list, id, field, ..
            } => {
                assert_eq!(list, "tasks");
                assert_eq!(id, "id");
                assert_eq!(field, "isCompleted");
            }
            other => panic!("expected ToggleAt, got {other:?}"),
        }
    }

    #[test]
    fn unowned_property_is_rejected() {
        let src = "import SwiftUI\n\nclass M: ObservableObject {\n    private var cancellables = 0\n}\n\nstruct V: View {\n    var body: some View {\n        VStack {\n        }\n    }\n}";
        let err = parse_file(src).unwrap_err();
        assert!(err.message.contains("ownership idiom"), "{err:?}");
    }
}
