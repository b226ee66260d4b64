//! The framework-neutral component model.
//!
//! IR nodes are constructed once per translation run by a source adapter,
//! rewritten only by the semantic mapper (which produces a new tree rather
//! than mutating destructively in place), and consumed read-only by a target
//! emitter. No IR node outlives a single translation invocation.

mod printer;

use serde::{Deserialize, Serialize};

/// Who owns a state slot's storage, and who gets told when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    /// Contained within the component instance (React `useState`,
    /// SwiftUI `@State`).
    Local,
    /// Externally observable: changes must be published to any renderer
    /// (SwiftUI `@Published` on an `ObservableObject`).
    SharedObservable,
}

/// Distinguishes ordinary state from the dedicated error-surface slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotRole {
    Plain,
    /// The component's error-message slot, materialized via the source
    /// framework's error-surface idiom (e.g. a SwiftUI alert).
    ErrorMessage,
}

/// The small type vocabulary the translator preserves across frameworks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Str,
    Bool,
    Int,
    Double,
    Uuid,
    Optional(Box<ValueType>),
    List(Box<ValueType>),
    /// Reference to a `RecordDecl` by name.
    Record(String),
}

/// A single unit of component state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSlot {
    pub name: String,
    pub ty: ValueType,
    pub ownership: Ownership,
    pub initial: Expr,
    #[serde(default = "SlotRole::plain")]
    pub role: SlotRole,
}

impl SlotRole {
    fn plain() -> Self {
        SlotRole::Plain
    }
}

/// A plain data record rendered per-row in lists (e.g. a task item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<(String, ValueType)>,
    /// Identifiable records carry an `id` field used for keyed list
    /// rendering, toggle-by-id, and delete-by-id.
    #[serde(default)]
    pub identifiable: bool,
}

/// What causes a handler to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// A user interaction (button press, form submit).
    UserEvent,
    /// Component initialization (SwiftUI `init()`, React mount effect).
    LifecycleInit,
}

/// An event-bound callable: an ordered action chain run on a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    pub name: String,
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<(String, ValueType)>,
    pub actions: Vec<Action>,
}

impl Handler {
    /// A handler is asynchronous iff its chain contains a suspension point.
    pub fn is_async(&self) -> bool {
        fn any_async(actions: &[Action]) -> bool {
            actions.iter().any(|a| match a {
                Action::AsyncCall { .. } | Action::Delay { .. } => true,
                Action::Conditional {
                    then_actions,
                    else_actions,
                    ..
                } => any_async(then_actions) || any_async(else_actions),
                Action::Mutate { .. } => false,
            })
        }
        any_async(&self.actions)
    }
}

/// The operation an `AsyncCall` suspends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AsyncOp {
    /// A service/server call (React server action, injected service).
    Invoke { name: String, args: Vec<Expr> },
    /// A throwing suspension for a fixed duration (SwiftUI's guarded
    /// `try await Task.sleep`).
    Sleep { nanos: u64 },
}

/// One step in a handler's body.
///
/// `AsyncCall` branches are themselves ordered action sequences, so nested
/// async chains (sleep, then mutate, then mutate) flatten naturally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Assign a new value to a state slot.
    Mutate { slot: String, value: Expr },
    /// Suspend the enclosing handler; resume into exactly one branch.
    AsyncCall {
        operation: AsyncOp,
        on_success: Vec<Action>,
        on_failure: Vec<Action>,
    },
    /// Unguarded suspension with no failure path. Duration is opaque to the
    /// translator and carried in nanoseconds.
    Delay { nanos: u64 },
    /// Branch on a predicate.
    Conditional {
        pred: Expr,
        then_actions: Vec<Action>,
        else_actions: Vec<Action>,
    },
}

/// Literal values appearing in expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
}

/// The framework-neutral expression language.
///
/// Deliberately small: just the forms the declarative/reactive component
/// family actually uses in state initializers, predicates, labels, and
/// mutation values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// Reference to a declared state slot.
    Slot(String),
    /// Reference to a handler parameter.
    Param(String),
    /// The value produced by the enclosing `AsyncCall` (visible only inside
    /// its `on_success` branch).
    AsyncResult,
    /// The thrown error's message (visible only inside an `on_failure`
    /// branch).
    ErrorMessage,
    /// The row binding inside a `List` template.
    Item,
    /// A freshly generated unique id.
    NewUuid,
    Field {
        object: Box<Expr>,
        field: String,
    },
    Not(Box<Expr>),
    /// String/collection emptiness test.
    IsEmpty(Box<Expr>),
    /// Nil/null test on an optional.
    IsNil(Box<Expr>),
    Ternary {
        cond: Box<Expr>,
        then_val: Box<Expr>,
        else_val: Box<Expr>,
    },
    /// List literal: `[a, b, ...]`.
    ListLit(Vec<Expr>),
    /// `list` with `item` appended.
    Append {
        list: Box<Expr>,
        item: Box<Expr>,
    },
    /// Flip boolean `field` on the row of `list` whose id equals `id`.
    ToggleWhere {
        list: Box<Expr>,
        id: Box<Expr>,
        field: String,
    },
    /// Drop the rows of `list` whose id equals `id`.
    RemoveWhere {
        list: Box<Expr>,
        id: Box<Expr>,
    },
    /// Construct a record value: `Rec(field: value, ...)`.
    MakeRecord {
        record: String,
        fields: Vec<(String, Expr)>,
    },
}

/// Layout hint for containers. Styling fidelity is a non-goal; this is the
/// one structural distinction both frameworks express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    Column,
    Row,
    Plain,
}

/// Presentation hints on a `Text` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub heading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough_when: Option<Expr>,
}

/// A node of the render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderNode {
    Text {
        content: Expr,
        #[serde(default)]
        style: TextStyle,
    },
    /// A text field two-way bound to a state slot.
    Input {
        binding: String,
        placeholder: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disabled_when: Option<Expr>,
    },
    /// A button triggering a named handler.
    Button {
        label: Expr,
        on_trigger: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        disabled_when: Option<Expr>,
    },
    /// Homogeneous list over a slot, with a row template parameterized by
    /// `Expr::Item`.
    List {
        items: String,
        /// Source-level name of the row binding (kept for readable output).
        binding: String,
        row: Box<RenderNode>,
    },
    Conditional {
        pred: Expr,
        then_node: Box<RenderNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_node: Option<Box<RenderNode>>,
    },
    Container {
        layout: Layout,
        children: Vec<RenderNode>,
    },
    /// The source framework's dedicated error-surface idiom, bound to the
    /// error-message slot. Mapped per capability to the target's alert
    /// idiom or to an inline banner.
    ErrorAlert { slot: String, title: String },
    /// A loading indicator.
    Progress { label: Option<String> },
}

/// A named component: the top-level translation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordDecl>,
    pub slots: Vec<StateSlot>,
    pub handlers: Vec<Handler>,
    pub root: RenderNode,
}

/// Non-fatal diagnostic recording an intentional, lossy rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FidelityNote {
    /// Which mapping rule produced the note (e.g. "ownership-downgrade").
    pub rule: String,
    pub detail: String,
}

impl FidelityNote {
    pub fn new(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            detail: detail.into(),
        }
    }
}

impl Component {
    /// Look up a slot by name.
    pub fn slot(&self, name: &str) -> Option<&StateSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Look up a handler by name.
    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.iter().find(|h| h.name == name)
    }

    /// The error-message slot, if the component declares one.
    pub fn error_slot(&self) -> Option<&StateSlot> {
        self.slots.iter().find(|s| s.role == SlotRole::ErrorMessage)
    }

    /// Every slot name referenced by the render tree and the handlers.
    ///
    /// Used by adapters to enforce the declaration invariant: a reference to
    /// an undeclared slot is an extraction error, not something to drop.
    pub fn referenced_slots(&self) -> Vec<String> {
        let mut out = Vec::new();
        for handler in &self.handlers {
            collect_action_slots(&handler.actions, &mut out);
        }
        collect_node_slots(&self.root, &mut out);
        out.sort();
        out.dedup();
        out
    }
}

fn collect_expr_slots(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Slot(name) => out.push(name.clone()),
        Expr::Field { object, .. } => collect_expr_slots(object, out),
        Expr::Not(e) | Expr::IsEmpty(e) | Expr::IsNil(e) => collect_expr_slots(e, out),
        Expr::Ternary {
            cond,
            then_val,
            else_val,
        } => {
            collect_expr_slots(cond, out);
            collect_expr_slots(then_val, out);
            collect_expr_slots(else_val, out);
        }
        Expr::ListLit(items) => {
            for item in items {
                collect_expr_slots(item, out);
            }
        }
        Expr::Append { list, item } => {
            collect_expr_slots(list, out);
            collect_expr_slots(item, out);
        }
        Expr::ToggleWhere { list, id, .. } | Expr::RemoveWhere { list, id } => {
            collect_expr_slots(list, out);
            collect_expr_slots(id, out);
        }
        Expr::MakeRecord { fields, .. } => {
            for (_, value) in fields {
                collect_expr_slots(value, out);
            }
        }
        Expr::Literal(_)
        | Expr::Param(_)
        | Expr::AsyncResult
        | Expr::ErrorMessage
        | Expr::Item
        | Expr::NewUuid => {}
    }
}

fn collect_action_slots(actions: &[Action], out: &mut Vec<String>) {
    for action in actions {
        match action {
            Action::Mutate { slot, value } => {
                out.push(slot.clone());
                collect_expr_slots(value, out);
            }
            Action::AsyncCall {
                operation,
                on_success,
                on_failure,
            } => {
                if let AsyncOp::Invoke { args, .. } = operation {
                    for arg in args {
                        collect_expr_slots(arg, out);
                    }
                }
                collect_action_slots(on_success, out);
                collect_action_slots(on_failure, out);
            }
            Action::Delay { .. } => {}
            Action::Conditional {
                pred,
                then_actions,
                else_actions,
            } => {
                collect_expr_slots(pred, out);
                collect_action_slots(then_actions, out);
                collect_action_slots(else_actions, out);
            }
        }
    }
}

fn collect_node_slots(node: &RenderNode, out: &mut Vec<String>) {
    match node {
        RenderNode::Text { content, style } => {
            collect_expr_slots(content, out);
            if let Some(when) = &style.strikethrough_when {
                collect_expr_slots(when, out);
            }
        }
        RenderNode::Input {
            binding,
            disabled_when,
            ..
        } => {
            out.push(binding.clone());
            if let Some(expr) = disabled_when {
                collect_expr_slots(expr, out);
            }
        }
        RenderNode::Button {
            label,
            args,
            disabled_when,
            ..
        } => {
            collect_expr_slots(label, out);
            for arg in args {
                collect_expr_slots(arg, out);
            }
            if let Some(expr) = disabled_when {
                collect_expr_slots(expr, out);
            }
        }
        RenderNode::List { items, row, .. } => {
            out.push(items.clone());
            collect_node_slots(row, out);
        }
        RenderNode::Conditional {
            pred,
            then_node,
            else_node,
        } => {
            collect_expr_slots(pred, out);
            collect_node_slots(then_node, out);
            if let Some(node) = else_node {
                collect_node_slots(node, out);
            }
        }
        RenderNode::Container { children, .. } => {
            for child in children {
                collect_node_slots(child, out);
            }
        }
        RenderNode::ErrorAlert { slot, .. } => out.push(slot.clone()),
        RenderNode::Progress { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_component() -> Component {
        Component {
            name: "Sample".into(),
            records: Vec::new(),
            slots: vec![
                StateSlot {
                    name: "input".into(),
                    ty: ValueType::Str,
                    ownership: Ownership::Local,
                    initial: Expr::Literal(Literal::Str(String::new())),
                    role: SlotRole::Plain,
                },
                StateSlot {
                    name: "loading".into(),
                    ty: ValueType::Bool,
                    ownership: Ownership::Local,
                    initial: Expr::Literal(Literal::Bool(false)),
                    role: SlotRole::Plain,
                },
            ],
            handlers: vec![Handler {
                name: "submit".into(),
                trigger: Trigger::UserEvent,
                params: Vec::new(),
                actions: vec![
                    Action::Mutate {
                        slot: "loading".into(),
                        value: Expr::Literal(Literal::Bool(true)),
                    },
                    Action::Delay { nanos: 500_000_000 },
                    Action::Mutate {
                        slot: "loading".into(),
                        value: Expr::Literal(Literal::Bool(false)),
                    },
                ],
            }],
            root: RenderNode::Input {
                binding: "input".into(),
                placeholder: "New task".into(),
                disabled_when: Some(Expr::Slot("loading".into())),
            },
        }
    }

    #[test]
    fn handler_with_delay_is_async() {
        let component = sample_component();
        assert!(component.handlers[0].is_async());
    }

    #[test]
    fn sync_handler_is_not_async() {
        let handler = Handler {
            name: "clear".into(),
            trigger: Trigger::UserEvent,
            params: Vec::new(),
            actions: vec![Action::Mutate {
                slot: "input".into(),
                value: Expr::Literal(Literal::Str(String::new())),
            }],
        };
        assert!(!handler.is_async());
    }

    #[test]
    fn referenced_slots_cover_handlers_and_render_tree() {
        let refs = sample_component().referenced_slots();
        assert_eq!(refs, vec!["input".to_string(), "loading".to_string()]);
    }

    #[test]
    fn ir_round_trips_through_json() {
        let component = sample_component();
        let json = serde_json::to_string(&component).unwrap();
        let back: Component = serde_json::from_str(&json).unwrap();
        assert_eq!(component, back);
    }
}
