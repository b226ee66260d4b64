use crate::capability::Framework;
use crate::error::EmissionError;
use crate::ir::Component;

/// Target emitter trait — renders target-ready IR into framework source.
///
/// Emission is a pure, order-preserving function of the IR: record
/// declarations, then state slots in declaration order, then handlers in
/// declaration order, then the render tree depth-first. No mapper logic
/// lives here; a construct the emitter cannot render is a mapper bug and
/// surfaces as `EmissionError`.
pub trait TargetEmitter {
    /// Which framework this emitter writes.
    fn framework(&self) -> Framework;

    /// Render the component to target source text.
    fn emit(&self, component: &Component) -> Result<String, EmissionError>;
}
