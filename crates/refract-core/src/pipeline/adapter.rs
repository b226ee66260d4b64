use crate::capability::Framework;
use crate::error::ExtractionError;
use crate::ir::Component;

/// Source adapter trait — parses one framework's component source and
/// extracts the neutral IR.
///
/// Each frontend crate pairs a minimal surface parser (the black box that
/// turns source text into a framework-specific AST) with an extraction walk
/// over that AST. Unrecognized constructs are reported as
/// `ExtractionError`s, never silently dropped.
pub trait SourceAdapter {
    /// Which framework this adapter reads.
    fn framework(&self) -> Framework;

    /// Parse `source` and extract the component IR.
    fn extract(&self, source: &str) -> Result<Component, ExtractionError>;
}
