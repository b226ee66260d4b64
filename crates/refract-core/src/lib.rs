//! Core of the refract cross-framework UI component translator.
//!
//! Holds the framework-neutral IR, the static capability table, the shared
//! adapter/emitter contracts, and the semantic mapper. Frontend crates
//! produce IR components, the mapper rewrites them for a target capability
//! entry, and backend crates render the result as source text.

pub mod capability;
pub mod error;
pub mod ir;
pub mod mapper;
pub mod pipeline;

pub use capability::{capabilities, Capabilities, Framework};
pub use error::{
    EmissionError, ExtractionError, Location, Stage, TranslationError, UnsupportedConstruct,
};
pub use mapper::{map_component, Mapped};
pub use pipeline::{MapOptions, SourceAdapter, TargetEmitter};
