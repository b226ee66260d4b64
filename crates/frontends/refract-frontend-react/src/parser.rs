//! Minimal TSX surface parser.
//!
//! Parses the hook-component subset the adapter understands: imports,
//! interfaces, `useState` hooks, component-level functions, `useEffect`
//! mount effects, and the returned JSX tree. Declarations and statements
//! are line-oriented; JSX is parsed with a character cursor. Anything
//! outside the subset is a parse error, reported with its line — never
//! skipped.

use crate::ast::{
    AttrValue, JsxNode, TsxEffect, TsxFunction, TsxImport, TsxInterface, TsxModule, TsxState,
    TsxStmt,
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

pub fn parse_module(source: &str) -> Result<TsxModule, ParseError> {
    let lines: Vec<&str> = source.lines().collect();
    let mut imports = Vec::new();
    let mut interfaces = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        let lineno = i + 1;
        if line.is_empty()
            || line == "'use client'"
            || line == "\"use client\""
            || line.starts_with("//")
        {
            i += 1;
        } else if line.starts_with("import ") {
            imports.push(parse_import(line));
            i += 1;
        } else if let Some(rest) = line.strip_prefix("interface ") {
            let name = rest
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            let mut fields = Vec::new();
            i += 1;
            while i < lines.len() && lines[i].trim() != "}" {
                let field_line = lines[i].trim().trim_end_matches(';');
                if let Some((fname, fty)) = field_line.split_once(':') {
                    fields.push((fname.trim().to_string(), fty.trim().to_string()));
                } else {
                    return Err(ParseError::new(
                        format!("malformed interface field: `{field_line}`"),
                        i + 1,
                    ));
                }
                i += 1;
            }
            i += 1; // closing brace
            interfaces.push(TsxInterface {
                name,
                fields,
                line: lineno,
            });
        } else if line.starts_with("export default function") {
            let name = line
                .trim_start_matches("export default function")
                .trim()
                .split('(')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            if name.is_empty() {
                return Err(ParseError::new("component function has no name", lineno));
            }
            i += 1;
            let (states, functions, effects, jsx) = parse_component_body(&lines, &mut i)?;
            return Ok(TsxModule {
                imports,
                interfaces,
                component_name: name,
                states,
                functions,
                effects,
                jsx,
            });
        } else {
            return Err(ParseError::new(
                format!("unrecognized top-level construct: `{line}`"),
                lineno,
            ));
        }
    }

    Err(ParseError::new(
        "no `export default function` component found",
        lines.len(),
    ))
}

fn parse_import(line: &str) -> TsxImport {
    let names = match (line.find('{'), line.find('}')) {
        (Some(open), Some(close)) if open < close => line[open + 1..close]
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    let from = line
        .split(" from ")
        .nth(1)
        .map(|s| s.trim().trim_matches(|c| c == '\'' || c == '"' || c == ';'))
        .unwrap_or_default()
        .to_string();
    TsxImport { names, from }
}

type ComponentBody = (Vec<TsxState>, Vec<TsxFunction>, Vec<TsxEffect>, JsxNode);

fn parse_component_body(lines: &[&str], i: &mut usize) -> Result<ComponentBody, ParseError> {
    let mut states = Vec::new();
    let mut functions = Vec::new();
    let mut effects = Vec::new();
    let mut jsx = None;

    while *i < lines.len() {
        let line = lines[*i].trim();
        let lineno = *i + 1;
        if line.is_empty() || line.starts_with("//") {
            *i += 1;
        } else if line == "}" {
            *i += 1;
            break;
        } else if line.contains("useState") {
            states.push(parse_use_state(line, lineno)?);
            *i += 1;
        } else if line.starts_with("useEffect") {
            effects.push(parse_use_effect(line, lineno)?);
            *i += 1;
        } else if line.starts_with("function ") || line.starts_with("async function ") {
            functions.push(parse_function(lines, i)?);
        } else if line.starts_with("return (") || line == "return (" {
            let text = collect_balanced(lines, i, lineno)?;
            jsx = Some(parse_jsx_text(&text, lineno)?);
        } else {
            return Err(ParseError::new(
                format!("unrecognized component-level construct: `{line}`"),
                lineno,
            ));
        }
    }

    let jsx = jsx.ok_or_else(|| ParseError::new("component has no `return (...)` JSX", *i))?;
    Ok((states, functions, effects, jsx))
}

/// `const [name, setName] = useState<T>(init)`.
fn parse_use_state(line: &str, lineno: usize) -> Result<TsxState, ParseError> {
    let open = line
        .find('[')
        .ok_or_else(|| ParseError::new("useState without destructuring pattern", lineno))?;
    let close = line
        .find(']')
        .ok_or_else(|| ParseError::new("unterminated destructuring pattern", lineno))?;
    let mut names = line[open + 1..close].split(',').map(|s| s.trim());
    let name = names.next().unwrap_or_default().to_string();
    let setter = names.next().unwrap_or_default().to_string();
    if name.is_empty() || setter.is_empty() {
        return Err(ParseError::new("useState needs `[value, setter]`", lineno));
    }

    let call = &line[close..];
    let us = call
        .find("useState")
        .ok_or_else(|| ParseError::new("missing useState call", lineno))?;
    let after = &call[us + "useState".len()..];
    let (ty, rest) = if let Some(stripped) = after.strip_prefix('<') {
        let end = find_top_level(stripped, ">")
            .ok_or_else(|| ParseError::new("unterminated useState generic", lineno))?;
        (
            Some(stripped[..end].trim().to_string()),
            &stripped[end + 1..],
        )
    } else {
        (None, after)
    };
    let popen = rest
        .find('(')
        .ok_or_else(|| ParseError::new("useState is not called", lineno))?;
    let pclose = find_matching(rest, popen, '(', ')')
        .ok_or_else(|| ParseError::new("unterminated useState call", lineno))?;
    let init = rest[popen + 1..pclose].trim().to_string();

    Ok(TsxState {
        name,
        setter,
        ty,
        init,
        line: lineno,
    })
}

/// `useEffect(() => { callee() }, [])` — only the empty-deps mount form.
fn parse_use_effect(line: &str, lineno: usize) -> Result<TsxEffect, ParseError> {
    if !line.replace(' ', "").ends_with(",[])") {
        return Err(ParseError::new(
            "only mount effects (`useEffect(..., [])`) are supported",
            lineno,
        ));
    }
    let open = line
        .find('{')
        .ok_or_else(|| ParseError::new("useEffect without a body", lineno))?;
    let close = line
        .rfind('}')
        .ok_or_else(|| ParseError::new("unterminated useEffect body", lineno))?;
    let body = line[open + 1..close].trim().trim_end_matches(';');
    let callee = body
        .strip_suffix("()")
        .ok_or_else(|| {
            ParseError::new("useEffect body must be a single zero-arg call", lineno)
        })?
        .trim()
        .to_string();
    Ok(TsxEffect {
        callee,
        line: lineno,
    })
}

fn parse_function(lines: &[&str], i: &mut usize) -> Result<TsxFunction, ParseError> {
    let line = lines[*i].trim();
    let lineno = *i + 1;
    let is_async = line.starts_with("async ");
    let sig = line
        .trim_start_matches("async ")
        .trim_start_matches("function ");
    let popen = sig
        .find('(')
        .ok_or_else(|| ParseError::new("function without parameter list", lineno))?;
    let name = sig[..popen].trim().to_string();
    let pclose = sig[popen..]
        .find(')')
        .map(|p| popen + p)
        .ok_or_else(|| ParseError::new("unterminated parameter list", lineno))?;
    let params = sig[popen + 1..pclose]
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once(':') {
            Some((n, t)) => (n.trim().to_string(), Some(t.trim().to_string())),
            None => (p.to_string(), None),
        })
        .collect();

    *i += 1;
    let body = parse_stmts(lines, i)?;
    Ok(TsxFunction {
        name,
        is_async,
        params,
        body,
        line: lineno,
    })
}

/// Parse statements until the block's closing `}` (consumed). Returns at
/// `} else {` and `} catch ... {` without consuming, so callers can chain.
fn parse_stmts(lines: &[&str], i: &mut usize) -> Result<Vec<TsxStmt>, ParseError> {
    let mut stmts = Vec::new();
    while *i < lines.len() {
        let line = lines[*i].trim().trim_end_matches(';');
        let lineno = *i + 1;
        if line.is_empty() || line.starts_with("//") {
            *i += 1;
            continue;
        }
        if line == "}" {
            *i += 1;
            return Ok(stmts);
        }
        if line.starts_with("} else") || line.starts_with("} catch") {
            return Ok(stmts);
        }
        if line.starts_with("if (") {
            let open = line.find('(').unwrap();
            let close = find_matching(line, open, '(', ')')
                .ok_or_else(|| ParseError::new("unterminated if condition", lineno))?;
            let cond = line[open + 1..close].trim().to_string();
            *i += 1;
            let then_body = parse_stmts(lines, i)?;
            let mut else_body = Vec::new();
            if *i < lines.len() && lines[*i].trim().starts_with("} else") {
                *i += 1;
                else_body = parse_stmts(lines, i)?;
            }
            stmts.push(TsxStmt::If {
                cond,
                then_body,
                else_body,
                line: lineno,
            });
        } else if line == "try {" {
            *i += 1;
            let body = parse_stmts(lines, i)?;
            let catch_line = lines.get(*i).map(|l| l.trim()).unwrap_or_default();
            let catch_binding = catch_line
                .strip_prefix("} catch (")
                .and_then(|r| r.split(')').next())
                .unwrap_or("err")
                .trim()
                .to_string();
            if !catch_line.starts_with("} catch") {
                return Err(ParseError::new("try without catch", *i + 1));
            }
            *i += 1;
            let catch_body = parse_stmts(lines, i)?;
            stmts.push(TsxStmt::Try {
                body,
                catch_binding,
                catch_body,
                line: lineno,
            });
        } else if let Some(rest) = line.strip_prefix("const ") {
            let (binding, value) = rest
                .split_once('=')
                .ok_or_else(|| ParseError::new("malformed const binding", lineno))?;
            let value = value.trim();
            let awaited = value
                .strip_prefix("await ")
                .ok_or_else(|| ParseError::new("only `const x = await f(...)` bindings are supported", lineno))?;
            let (callee, args) = split_call(awaited, lineno)?;
            stmts.push(TsxStmt::ConstAwait {
                binding: binding.trim().to_string(),
                callee,
                args,
                line: lineno,
            });
            *i += 1;
        } else if let Some(rest) = line.strip_prefix("await ") {
            if rest.contains("new Promise") && rest.contains("setTimeout") {
                let millis = trailing_number(rest).ok_or_else(|| {
                    ParseError::new("setTimeout delay is not a literal number", lineno)
                })?;
                stmts.push(TsxStmt::AwaitTimeout {
                    millis,
                    line: lineno,
                });
            } else {
                let (callee, args) = split_call(rest, lineno)?;
                stmts.push(TsxStmt::Await {
                    callee,
                    args,
                    line: lineno,
                });
            }
            *i += 1;
        } else if line.contains('(') && line.ends_with(')') {
            let (callee, args) = split_call(line, lineno)?;
            stmts.push(TsxStmt::Call {
                callee,
                args,
                line: lineno,
            });
            *i += 1;
        } else {
            return Err(ParseError::new(
                format!("unrecognized statement: `{line}`"),
                lineno,
            ));
        }
    }
    Err(ParseError::new("unterminated block", *i))
}

/// Split `callee(arg, arg)` into callee and top-level argument texts.
fn split_call(text: &str, lineno: usize) -> Result<(String, Vec<String>), ParseError> {
    let open = text
        .find('(')
        .ok_or_else(|| ParseError::new(format!("expected a call, found `{text}`"), lineno))?;
    let close = find_matching(text, open, '(', ')')
        .ok_or_else(|| ParseError::new("unterminated call", lineno))?;
    let callee = text[..open].trim().to_string();
    let args = split_top_commas(&text[open + 1..close]);
    Ok((callee, args))
}

/// `return (` ... `)` — concatenate lines until the opening paren closes.
fn collect_balanced(lines: &[&str], i: &mut usize, lineno: usize) -> Result<String, ParseError> {
    let mut depth = 0i32;
    let mut text = String::new();
    let mut started = false;
    while *i < lines.len() {
        let line = lines[*i];
        for ch in line.chars() {
            match ch {
                '(' => {
                    depth += 1;
                    if !started {
                        started = true;
                        continue;
                    }
                }
                ')' => {
                    depth -= 1;
                    if started && depth == 0 {
                        *i += 1;
                        return Ok(text);
                    }
                }
                _ => {}
            }
            if started {
                text.push(ch);
            }
        }
        text.push('\n');
        *i += 1;
    }
    Err(ParseError::new("unterminated return expression", lineno))
}

// ---------------------------------------------------------------------------
// JSX parsing (character cursor)
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
    /// Line offset of the cursor's first byte in the original source.
    base_line: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, base_line: usize) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            base_line,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn line(&self) -> usize {
        let newlines = self.src[..self.pos].iter().filter(|&&b| b == b'\n').count();
        self.base_line + newlines
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.pos..].starts_with(s.as_bytes())
    }

    fn text_until(&mut self, stop: &[u8]) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stop.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }
}

pub fn parse_jsx_text(text: &str, base_line: usize) -> Result<JsxNode, ParseError> {
    let mut cursor = Cursor::new(text, base_line);
    cursor.skip_ws();
    parse_jsx_element(&mut cursor)
}

fn parse_jsx_element(cursor: &mut Cursor<'_>) -> Result<JsxNode, ParseError> {
    let line = cursor.line();
    if cursor.bump() != Some(b'<') {
        return Err(ParseError::new("expected `<` to open a JSX element", line));
    }
    let tag = cursor.text_until(b" \t\n\r/>");
    if tag.is_empty() {
        return Err(ParseError::new("JSX element has no tag name", line));
    }

    let mut attrs = Vec::new();
    loop {
        cursor.skip_ws();
        match cursor.peek() {
            Some(b'>') => {
                cursor.bump();
                break;
            }
            Some(b'/') => {
                cursor.bump();
                if cursor.bump() != Some(b'>') {
                    return Err(ParseError::new("malformed self-closing tag", cursor.line()));
                }
                return Ok(JsxNode::Element {
                    tag,
                    attrs,
                    children: Vec::new(),
                    line,
                });
            }
            Some(_) => attrs.push(parse_jsx_attr(cursor)?),
            None => return Err(ParseError::new("unterminated JSX tag", cursor.line())),
        }
    }

    let mut children = Vec::new();
    loop {
        cursor.skip_ws();
        if cursor.starts_with("</") {
            cursor.pos += 2;
            let close = cursor.text_until(b">");
            cursor.bump();
            if close.trim() != tag {
                return Err(ParseError::new(
                    format!("mismatched closing tag: expected </{tag}>, found </{close}>"),
                    cursor.line(),
                ));
            }
            return Ok(JsxNode::Element {
                tag,
                attrs,
                children,
                line,
            });
        }
        match cursor.peek() {
            Some(b'<') => children.push(parse_jsx_element(cursor)?),
            Some(b'{') => children.push(parse_jsx_expr_child(cursor)?),
            Some(_) => {
                let text_line = cursor.line();
                let text = cursor.text_until(b"<{");
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    children.push(JsxNode::Text(trimmed.to_string(), text_line));
                }
            }
            None => {
                return Err(ParseError::new(
                    format!("unterminated JSX element <{tag}>"),
                    cursor.line(),
                ))
            }
        }
    }
}

fn parse_jsx_attr(cursor: &mut Cursor<'_>) -> Result<(String, AttrValue), ParseError> {
    let name = cursor.text_until(b"= \t\n\r/>");
    if cursor.peek() != Some(b'=') {
        return Ok((name, AttrValue::Flag));
    }
    cursor.bump();
    match cursor.peek() {
        Some(b'"') | Some(b'\'') => {
            let quote = cursor.bump().unwrap();
            let start = cursor.pos;
            while cursor.peek().is_some() && cursor.peek() != Some(quote) {
                cursor.pos += 1;
            }
            let value = String::from_utf8_lossy(&cursor.src[start..cursor.pos]).into_owned();
            cursor.bump();
            Ok((name, AttrValue::Str(value)))
        }
        Some(b'{') => {
            let inner = balanced_braces(cursor)?;
            Ok((name, AttrValue::Expr(inner.trim().to_string())))
        }
        _ => Err(ParseError::new(
            format!("malformed value for attribute `{name}`"),
            cursor.line(),
        )),
    }
}

/// A `{...}` child: a list `.map`, a conditional, or plain expression text.
fn parse_jsx_expr_child(cursor: &mut Cursor<'_>) -> Result<JsxNode, ParseError> {
    let line = cursor.line();
    let inner = balanced_braces(cursor)?;
    let inner = inner.trim();

    if let Some(map_pos) = find_top_level(inner, ".map(") {
        let items = inner[..map_pos].trim().to_string();
        let after = &inner[map_pos + ".map(".len()..];
        let arrow = find_top_level(after, "=>")
            .ok_or_else(|| ParseError::new("`.map` without an arrow function", line))?;
        let binding = after[..arrow]
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let body = after[arrow + 2..].trim();
        // Drop the map call's closing paren, and the optional wrapping parens
        // around the row JSX.
        let body = body.strip_suffix(')').unwrap_or(body).trim();
        let body = strip_outer_parens(body);
        let row = parse_jsx_text(body, line)?;
        return Ok(JsxNode::ListMap {
            items,
            binding,
            row: Box::new(row),
            line,
        });
    }

    if let Some(q) = find_top_level(inner, "?") {
        let after = &inner[q + 1..];
        if after.trim_start().starts_with('(') || after.trim_start().starts_with('<') {
            let cond = inner[..q].trim().to_string();
            let colon = find_top_level(after, ":")
                .ok_or_else(|| ParseError::new("conditional JSX without `:`", line))?;
            let then_node = parse_jsx_text(strip_outer_parens(after[..colon].trim()), line)?;
            let else_node = parse_jsx_text(strip_outer_parens(after[colon + 1..].trim()), line)?;
            return Ok(JsxNode::CondExpr {
                cond,
                then_node: Box::new(then_node),
                else_node: Some(Box::new(else_node)),
                line,
            });
        }
    }

    if let Some(a) = find_top_level(inner, "&&") {
        let after = inner[a + 2..].trim();
        if after.starts_with('(') || after.starts_with('<') {
            let cond = inner[..a].trim().to_string();
            let then_node = parse_jsx_text(strip_outer_parens(after), line)?;
            return Ok(JsxNode::CondExpr {
                cond,
                then_node: Box::new(then_node),
                else_node: None,
                line,
            });
        }
    }

    Ok(JsxNode::ExprText(inner.to_string(), line))
}

/// Consume a balanced `{...}` group, returning the inner text.
fn balanced_braces(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    let line = cursor.line();
    if cursor.bump() != Some(b'{') {
        return Err(ParseError::new("expected `{`", line));
    }
    let start = cursor.pos;
    let mut depth = 1i32;
    let mut quote: Option<u8> = None;
    while let Some(b) = cursor.bump() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner =
                            String::from_utf8_lossy(&cursor.src[start..cursor.pos - 1]);
                        return Ok(inner.into_owned());
                    }
                }
                _ => {}
            },
        }
    }
    Err(ParseError::new("unterminated `{...}` expression", line))
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Byte offset of `pat` at nesting depth zero (outside quotes and brackets).
pub fn find_top_level(s: &str, pat: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                _ => {
                    if depth == 0 && s[i..].starts_with(pat) {
                        return Some(i);
                    }
                }
            },
        }
        i += 1;
    }
    None
}

/// Split on top-level commas, trimming each piece.
pub fn split_top_commas(s: &str) -> Vec<String> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    parts.push(s[start..i].trim().to_string());
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

/// Index of the bracket matching the one at `open`.
fn find_matching(s: &str, open: usize, open_ch: char, close_ch: char) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' || b == b'`' {
                    quote = Some(b);
                } else if b == open_ch as u8 {
                    depth += 1;
                } else if b == close_ch as u8 {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        }
    }
    None
}

fn strip_outer_parens(s: &str) -> &str {
    let t = s.trim();
    if t.starts_with('(') && t.ends_with(')') && find_matching(t, 0, '(', ')') == Some(t.len() - 1)
    {
        t[1..t.len() - 1].trim()
    } else {
        t
    }
}

/// The last integer literal in `s` (for `setTimeout(resolve, 500)`).
fn trailing_number(s: &str) -> Option<u64> {
    let digits: String = s
        .chars()
        .rev()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.chars().rev().collect::<String>().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_state_with_generic() {
        let s = parse_use_state("const [tasks, setTasks] = useState<string[]>([])", 1).unwrap();
        assert_eq!(s.name, "tasks");
        assert_eq!(s.setter, "setTasks");
        assert_eq!(s.ty.as_deref(), Some("string[]"));
        assert_eq!(s.init, "[]");
    }

    #[test]
    fn use_state_inferred() {
        let s = parse_use_state("const [loading, setLoading] = useState(false)", 1).unwrap();
        assert_eq!(s.ty, None);
        assert_eq!(s.init, "false");
    }

    #[test]
    fn jsx_element_with_attrs_and_children() {
        let jsx = parse_jsx_text(
            "<div className=\"container\">\n  <h1>Tasks</h1>\n</div>",
            1,
        )
        .unwrap();
        match jsx {
            JsxNode::Element {
                tag,
                attrs,
                children,
                ..
            } => {
                assert_eq!(tag, "div");
                assert_eq!(attrs.len(), 1);
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn jsx_map_child() {
        let jsx = parse_jsx_text(
            "<ul>{tasks.map((task) => (<li key={task.id}>{task.title}</li>))}</ul>",
            1,
        )
        .unwrap();
        let JsxNode::Element { children, .. } = jsx else {
            panic!("expected element");
        };
        match &children[0] {
            JsxNode::ListMap { items, binding, .. } => {
                assert_eq!(items, "tasks");
                assert_eq!(binding, "task");
            }
            other => panic!("expected ListMap, got {other:?}"),
        }
    }

    #[test]
    fn jsx_ternary_child() {
        let jsx =
            parse_jsx_text("<div>{loading ? (<p>Wait</p>) : (<p>Go</p>)}</div>", 1).unwrap();
        let JsxNode::Element { children, .. } = jsx else {
            panic!("expected element");
        };
        match &children[0] {
            JsxNode::CondExpr {
                cond, else_node, ..
            } => {
                assert_eq!(cond, "loading");
                assert!(else_node.is_some());
            }
            other => panic!("expected CondExpr, got {other:?}"),
        }
    }

    #[test]
    fn unknown_statement_is_an_error() {
        let src = "export default function C() {\n  label: while (true) {}\n";
        let err = parse_module(src).unwrap_err();
        assert!(err.message.contains("unrecognized"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn trailing_number_extracts_delay() {
        assert_eq!(
            trailing_number("new Promise((resolve) => setTimeout(resolve, 500))"),
            Some(500)
        );
    }
}
