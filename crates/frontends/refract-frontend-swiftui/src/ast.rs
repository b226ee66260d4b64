//! Surface AST for a SwiftUI component.
//!
//! A component file is an optional `ObservableObject` view-model class plus
//! a `View` struct (a view alone is also a complete component). Expressions
//! are raw text; `expr` translates them during extraction.

/// A `@Published` (class) or `@State` (view) stored property.
#[derive(Debug, Clone)]
pub struct SwiftProperty {
    pub name: String,
    /// Declared type text (e.g. `[TaskItem]`, `Bool`, `String?`).
    pub ty: Option<String>,
    /// Raw initializer text, if present.
    pub init: Option<String>,
    pub line: usize,
}

/// A nested record struct (e.g. `struct TaskItem: Identifiable`).
#[derive(Debug, Clone)]
pub struct SwiftRecord {
    pub name: String,
    pub identifiable: bool,
    pub fields: Vec<(String, String)>,
    pub line: usize,
}

/// A statement inside a function body.
#[derive(Debug, Clone)]
pub enum SwiftStmt {
    /// `[self.]target = value`.
    Assign {
        target: String,
        value: String,
        line: usize,
    },
    /// `list.append(value)`.
    Append {
        list: String,
        value: String,
        line: usize,
    },
    /// `list.removeAll(where: { $0.id == idExpr })`.
    RemoveAll {
        list: String,
        id: String,
        line: usize,
    },
    /// `if let index = list.firstIndex(where: { $0.id == idExpr }) {
    ///      list[index].field.toggle()
    ///  }`
    ToggleAt {
        list: String,
        id: String,
        field: String,
        line: usize,
    },
    /// `callee(label: arg, ...)` — a call to another declared function.
    Call {
        callee: String,
        args: Vec<String>,
        line: usize,
    },
    /// `Task { ... }` — a structured-concurrency region.
    TaskBlock { body: Vec<SwiftStmt>, line: usize },
    /// `do { ... } catch { ... }`.
    DoCatch {
        body: Vec<SwiftStmt>,
        catch_body: Vec<SwiftStmt>,
        line: usize,
    },
    /// `try await Task.sleep(nanoseconds: N)`; `optional` for `try?`.
    TrySleep {
        nanos: u64,
        optional: bool,
        line: usize,
    },
    /// `[let binding =] [try] await callee(args)`.
    AwaitCall {
        binding: Option<String>,
        callee: String,
        args: Vec<String>,
        line: usize,
    },
    /// `if cond { ... } else { ... }`.
    If {
        cond: String,
        then_body: Vec<SwiftStmt>,
        else_body: Vec<SwiftStmt>,
        line: usize,
    },
}

/// A `func` declaration (view-model method or view helper).
#[derive(Debug, Clone)]
pub struct SwiftFunc {
    pub name: String,
    /// `(label, type)` pairs; the label doubles as the parameter name.
    pub params: Vec<(String, String)>,
    pub body: Vec<SwiftStmt>,
    pub line: usize,
}

/// The view-model class (`class Name: ObservableObject`).
#[derive(Debug, Clone)]
pub struct SwiftClass {
    pub name: String,
    pub published: Vec<SwiftProperty>,
    /// Functions invoked from `init()` (lifecycle-init triggers).
    pub init_calls: Vec<String>,
    pub funcs: Vec<SwiftFunc>,
    pub line: usize,
}

/// A node of the view DSL tree.
#[derive(Debug, Clone)]
pub enum SwiftViewNode {
    /// `VStack { ... }` / `HStack { ... }`.
    Stack {
        horizontal: bool,
        children: Vec<SwiftViewNode>,
        line: usize,
    },
    /// `Text(expr)` with its modifiers.
    Text {
        expr: String,
        heading: bool,
        strikethrough: Option<String>,
        line: usize,
    },
    /// `TextField("placeholder", text: $binding)`.
    TextField {
        placeholder: String,
        binding: String,
        disabled: Option<String>,
        line: usize,
    },
    /// `Button("label") { stmts }` or `Button(action: f) { Text(expr) }`.
    Button {
        label: Option<String>,
        action: Option<String>,
        label_expr: Option<String>,
        body: Vec<SwiftStmt>,
        disabled: Option<String>,
        line: usize,
    },
    /// `List(items) { binding in ... }`; `indices` for the
    /// `List(items.indices, id: \.self)` form.
    List {
        items: String,
        binding: String,
        indices: bool,
        children: Vec<SwiftViewNode>,
        line: usize,
    },
    /// `if cond { ... } else { ... }`.
    If {
        cond: String,
        then_children: Vec<SwiftViewNode>,
        else_children: Vec<SwiftViewNode>,
        line: usize,
    },
    /// `ProgressView("label")`.
    Progress { label: Option<String>, line: usize },
}

/// The `View` struct.
#[derive(Debug, Clone)]
pub struct SwiftView {
    pub name: String,
    /// `@StateObject private var model = ClassName()`.
    pub state_object: Option<(String, String)>,
    pub states: Vec<SwiftProperty>,
    pub body: Vec<SwiftViewNode>,
    /// `.alert(...)` modifier text attached to the body, if any.
    pub alert: Option<String>,
    /// `.onAppear { callee() }` modifier attached to the body, if any.
    pub on_appear: Option<String>,
    pub funcs: Vec<SwiftFunc>,
    pub line: usize,
}

/// A whole parsed component file.
#[derive(Debug, Clone)]
pub struct SwiftFile {
    pub model: Option<SwiftClass>,
    /// Record structs, whether nested in the class or at the top level.
    pub records: Vec<SwiftRecord>,
    pub view: SwiftView,
}
