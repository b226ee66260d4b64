pub mod adapter;
pub mod emitter;

pub use adapter::SourceAdapter;
pub use emitter::TargetEmitter;

/// Per-translation configuration consumed by the semantic mapper.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Fail with `UnsupportedConstruct` instead of downgrading slot
    /// ownership when the target cannot express shared-observable state.
    pub strict_ownership: bool,
}
