//! React frontend — extracts hook-based function components into the
//! neutral IR.
//!
//! `useState` hooks become local state slots, component-level functions
//! become handlers (with `await`/`try`/`catch` flattened into async action
//! chains), `useEffect(..., [])` marks lifecycle-init triggers, and the
//! returned JSX reduces to the render tree.

pub mod ast;
pub mod expr;
pub mod extract;
pub mod parser;

use refract_core::error::{ExtractionError, Location};
use refract_core::ir::Component;
use refract_core::{Framework, SourceAdapter};

pub struct ReactAdapter;

impl SourceAdapter for ReactAdapter {
    fn framework(&self) -> Framework {
        Framework::React
    }

    fn extract(&self, source: &str) -> Result<Component, ExtractionError> {
        let module = parser::parse_module(source)
            .map_err(|e| ExtractionError::new(e.message, Location::line(e.line)))?;
        extract::extract_module(&module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::ir::{Action, AsyncOp, Expr, Ownership, RenderNode, Trigger};

    const FIXTURE: &str = r#"'use client'

import { useState } from 'react'
import { submitForm } from './actions'

export default function TaskManager() {
  const [tasks, setTasks] = useState<string[]>([])
  const [input, setInput] = useState('')
  const [loading, setLoading] = useState(false)

  async function handleSubmit() {
    setLoading(true)
    const result = await submitForm(input)
    if (result.success) {
      setTasks([...tasks, input])
      setInput('')
    }
    setLoading(false)
  }

  return (
    <div className="container">
      <h1>Task Manager</h1>
      <input
        value={input}
        onChange={(e) => setInput(e.target.value)}
        placeholder="New task"
        disabled={loading}
      />
      <button onClick={handleSubmit} disabled={loading}>
        {loading ? 'Adding...' : 'Add Task'}
      </button>
      <ul>
        {tasks.map((task, index) => (
          <li key={index}>{task}</li>
        ))}
      </ul>
    </div>
  )
}
"#;

    #[test]
    fn extracts_hook_states_in_declaration_order() {
        let component = ReactAdapter.extract(FIXTURE).unwrap();
        let names: Vec<&str> = component.slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["tasks", "input", "loading"]);
        assert!(component
            .slots
            .iter()
            .all(|s| s.ownership == Ownership::Local));
    }

    #[test]
    fn extracts_async_submit_handler() {
        let component = ReactAdapter.extract(FIXTURE).unwrap();
        let handler = component.handler("handleSubmit").unwrap();
        assert_eq!(handler.trigger, Trigger::UserEvent);
        assert!(handler.is_async());
        // setLoading(true), await submitForm(...), trailing setLoading(false).
        assert_eq!(handler.actions.len(), 4);
        match &handler.actions[1] {
            Action::AsyncCall {
                operation: AsyncOp::Invoke { name, args },
                ..
            } => {
                assert_eq!(name, "submitForm");
                assert_eq!(args, &[Expr::Slot("input".into())]);
            }
            other => panic!("expected AsyncCall, got {other:?}"),
        }
        match &handler.actions[2] {
            Action::Conditional { pred, .. } => {
                assert_eq!(
                    *pred,
                    Expr::Field {
                        object: Box::new(Expr::AsyncResult),
                        field: "success".into(),
                    }
                );
            }
            other => panic!("expected Conditional on the result, got {other:?}"),
        }
    }

    #[test]
    fn extracts_render_tree_shape() {
        let component = ReactAdapter.extract(FIXTURE).unwrap();
        let RenderNode::Container { children, .. } = &component.root else {
            panic!("expected container root");
        };
        assert_eq!(children.len(), 4);
        assert!(matches!(children[0], RenderNode::Text { .. }));
        assert!(matches!(children[1], RenderNode::Input { .. }));
        assert!(matches!(children[2], RenderNode::Button { .. }));
        assert!(matches!(children[3], RenderNode::List { .. }));
    }

    #[test]
    fn undeclared_slot_reference_fails_extraction() {
        let source = r#"
export default function Broken() {
  const [input, setInput] = useState('')

  return (
    <div className="container">
      <input value={ghost} onChange={(e) => setInput(e.target.value)} placeholder="x" />
    </div>
  )
}
"#;
        let err = ReactAdapter.extract(source).unwrap_err();
        assert!(err.reason.contains("ghost"), "unexpected: {err}");
    }
}
