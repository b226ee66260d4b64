//! Translation orchestrator.
//!
//! Selects the source adapter and target emitter by framework tag, then
//! drives the pipeline: extract → map → emit. The first failure is wrapped
//! into a `TranslationError` carrying its stage and halts the run; partial
//! output is never returned. Adding a framework means registering one
//! adapter/emitter pair here plus one capability entry — existing crates
//! are untouched.

use refract_core::capability::capabilities;
use refract_core::ir::{Component, FidelityNote};
use refract_core::mapper::map_component;
pub use refract_core::{Framework, MapOptions, TranslationError};
use refract_core::{SourceAdapter, TargetEmitter};

use refract_backend_react::ReactBackend;
use refract_backend_swiftui::SwiftUiBackend;
use refract_frontend_react::ReactAdapter;
use refract_frontend_swiftui::SwiftUiAdapter;

/// A successful translation: the emitted target source plus any fidelity
/// notes the mapper recorded.
#[derive(Debug, Clone)]
pub struct Translation {
    pub output: String,
    pub notes: Vec<FidelityNote>,
}

/// The registered source adapter for `framework`.
pub fn adapter_for(framework: Framework) -> Box<dyn SourceAdapter> {
    match framework {
        Framework::SwiftUi => Box::new(SwiftUiAdapter),
        Framework::React => Box::new(ReactAdapter),
    }
}

/// The registered target emitter for `framework`.
pub fn emitter_for(framework: Framework) -> Box<dyn TargetEmitter> {
    match framework {
        Framework::SwiftUi => Box::new(SwiftUiBackend),
        Framework::React => Box::new(ReactBackend),
    }
}

/// Extract the neutral IR without mapping or emitting (`print-ir`).
pub fn extract_ir(source: &str, from: Framework) -> Result<Component, TranslationError> {
    Ok(adapter_for(from).extract(source)?)
}

/// Translate one component between frameworks.
pub fn translate(
    source: &str,
    from: Framework,
    to: Framework,
    options: &MapOptions,
) -> Result<Translation, TranslationError> {
    let component = adapter_for(from).extract(source)?;
    let mapped = map_component(component, capabilities(to), options)?;
    let output = emitter_for(to).emit(&mapped.component)?;
    Ok(Translation {
        output,
        notes: mapped.notes,
    })
}
