//! Surface AST for a React function component.
//!
//! This is the output of the minimal TSX parser and the input to IR
//! extraction. Expressions are kept as raw text here; `expr` translates
//! them during extraction, when slot/param context is known.

/// One `import { a, b } from 'mod'` line.
#[derive(Debug, Clone)]
pub struct TsxImport {
    pub names: Vec<String>,
    pub from: String,
}

/// A `interface Name { field: type; ... }` declaration.
#[derive(Debug, Clone)]
pub struct TsxInterface {
    pub name: String,
    pub fields: Vec<(String, String)>,
    pub line: usize,
}

/// One `const [name, setName] = useState<T>(init)` hook.
#[derive(Debug, Clone)]
pub struct TsxState {
    pub name: String,
    pub setter: String,
    /// Text inside the generic argument, if present (e.g. `string[]`).
    pub ty: Option<String>,
    /// Raw initializer text.
    pub init: String,
    pub line: usize,
}

/// A statement inside a component-level function.
#[derive(Debug, Clone)]
pub enum TsxStmt {
    /// `callee(args)` — setter invocation or plain call.
    Call {
        callee: String,
        args: Vec<String>,
        line: usize,
    },
    /// `const binding = await callee(args)`.
    ConstAwait {
        binding: String,
        callee: String,
        args: Vec<String>,
        line: usize,
    },
    /// `await callee(args)` with a discarded result.
    Await {
        callee: String,
        args: Vec<String>,
        line: usize,
    },
    /// `await new Promise((resolve) => setTimeout(resolve, N))`.
    AwaitTimeout { millis: u64, line: usize },
    /// `if (cond) { ... } else { ... }`.
    If {
        cond: String,
        then_body: Vec<TsxStmt>,
        else_body: Vec<TsxStmt>,
        line: usize,
    },
    /// `try { ... } catch (binding) { ... }`.
    Try {
        body: Vec<TsxStmt>,
        catch_binding: String,
        catch_body: Vec<TsxStmt>,
        line: usize,
    },
}

/// A component-level `function` / `async function` declaration.
#[derive(Debug, Clone)]
pub struct TsxFunction {
    pub name: String,
    pub is_async: bool,
    /// `(name, type-text)` pairs.
    pub params: Vec<(String, Option<String>)>,
    pub body: Vec<TsxStmt>,
    pub line: usize,
}

/// A parsed JSX node.
#[derive(Debug, Clone)]
pub enum JsxNode {
    Element {
        tag: String,
        attrs: Vec<(String, AttrValue)>,
        children: Vec<JsxNode>,
        line: usize,
    },
    /// Literal text content.
    Text(String, usize),
    /// `{expr}` text content.
    ExprText(String, usize),
    /// `{items.map((binding) => ( <row/> ))}`.
    ListMap {
        items: String,
        binding: String,
        row: Box<JsxNode>,
        line: usize,
    },
    /// `{cond ? <a/> : <b/>}` or `{cond && <a/>}`.
    CondExpr {
        cond: String,
        then_node: Box<JsxNode>,
        else_node: Option<Box<JsxNode>>,
        line: usize,
    },
}

impl JsxNode {
    pub fn line(&self) -> usize {
        match self {
            JsxNode::Element { line, .. }
            | JsxNode::Text(_, line)
            | JsxNode::ExprText(_, line)
            | JsxNode::ListMap { line, .. }
            | JsxNode::CondExpr { line, .. } => *line,
        }
    }
}

/// A JSX attribute value.
#[derive(Debug, Clone)]
pub enum AttrValue {
    /// `attr="literal"`.
    Str(String),
    /// `attr={expr}`.
    Expr(String),
    /// Bare boolean attribute.
    Flag,
}

/// `useEffect(() => { call() }, [])` — a mount effect invoking one function.
#[derive(Debug, Clone)]
pub struct TsxEffect {
    pub callee: String,
    pub line: usize,
}

/// The whole parsed component module.
#[derive(Debug, Clone)]
pub struct TsxModule {
    pub imports: Vec<TsxImport>,
    pub interfaces: Vec<TsxInterface>,
    pub component_name: String,
    pub states: Vec<TsxState>,
    pub functions: Vec<TsxFunction>,
    pub effects: Vec<TsxEffect>,
    pub jsx: JsxNode,
}
