//! The static capability table.
//!
//! One entry per framework, describing which IR constructs it can express.
//! The semantic mapper consults this table to decide between a structural
//! rewrite, a recorded fidelity loss, and an `UnsupportedConstruct` failure.
//! Adding a target framework means adding one entry here plus one emitter
//! crate; existing adapters are untouched.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A supported framework, used to select adapters and emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Framework {
    SwiftUi,
    React,
}

impl Framework {
    /// Parse a user-facing tag ("swiftui", "react").
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "swiftui" | "swift" => Some(Framework::SwiftUi),
            "react" | "tsx" => Some(Framework::React),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Framework::SwiftUi => "swiftui",
            Framework::React => "react",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// What one framework can express. Consulted read-only by the mapper;
/// initialized once at startup and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub framework: Framework,
    /// Table entry version, bumped when an entry's semantics change.
    pub version: u32,
    /// Observable state containers scoped smaller than the whole component
    /// (SwiftUI `ObservableObject`/`@Published`).
    pub shared_observable: bool,
    /// Instance-local state slots (`@State`, `useState`).
    pub local_state: bool,
    /// Handlers that suspend and resume with a success/failure outcome.
    pub async_handlers: bool,
    /// A "wait N without blocking the render loop" primitive.
    pub delay: bool,
    /// Homogeneous rendering of runtime-populated lists.
    pub dynamic_list: bool,
    /// A dedicated alert/dialog error surface.
    pub alert_surface: bool,
}

static TABLE: Lazy<Vec<Capabilities>> = Lazy::new(|| {
    vec![
        Capabilities {
            framework: Framework::SwiftUi,
            version: 1,
            shared_observable: true,
            local_state: true,
            async_handlers: true,
            delay: true,
            dynamic_list: true,
            alert_surface: true,
        },
        Capabilities {
            framework: Framework::React,
            version: 1,
            shared_observable: false,
            local_state: true,
            async_handlers: true,
            delay: true,
            dynamic_list: true,
            alert_surface: false,
        },
    ]
});

/// The capability entry for `framework`.
pub fn capabilities(framework: Framework) -> &'static Capabilities {
    TABLE
        .iter()
        .find(|c| c.framework == framework)
        .expect("every Framework variant has a table entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_framework_has_an_entry() {
        for fw in [Framework::SwiftUi, Framework::React] {
            assert_eq!(capabilities(fw).framework, fw);
        }
    }

    #[test]
    fn react_has_no_shared_observable_state() {
        assert!(!capabilities(Framework::React).shared_observable);
        assert!(capabilities(Framework::SwiftUi).shared_observable);
    }

    #[test]
    fn tags_round_trip() {
        assert_eq!(Framework::from_tag("swiftui"), Some(Framework::SwiftUi));
        assert_eq!(Framework::from_tag("REACT"), Some(Framework::React));
        assert_eq!(Framework::from_tag("vue"), None);
    }
}
