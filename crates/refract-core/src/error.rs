/// A location in the source text, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
}

impl Location {
    pub fn line(line: usize) -> Self {
        Self { line }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// A malformed or unrecognized source construct. Raised by source adapters;
/// never recovered from within a single translation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("extraction error at {location}: {reason}")]
pub struct ExtractionError {
    pub reason: String,
    pub location: Location,
}

impl ExtractionError {
    pub fn new(reason: impl Into<String>, location: Location) -> Self {
        Self {
            reason: reason.into(),
            location,
        }
    }
}

/// Valid IR with no safe mapping onto the target framework. Raised by the
/// semantic mapper when no rewrite rule applies and no safe default exists
/// (e.g. unrolling a runtime-populated list).
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported construct {node_kind}: {reason}")]
pub struct UnsupportedConstruct {
    pub node_kind: String,
    pub reason: String,
}

impl UnsupportedConstruct {
    pub fn new(node_kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            node_kind: node_kind.into(),
            reason: reason.into(),
        }
    }
}

/// Target-ready IR that violates the emitter's invariants. Always a mapper
/// defect, never a user-facing condition.
#[derive(Debug, Clone, thiserror::Error)]
#[error("emission error: {0}")]
pub struct EmissionError(pub String);

/// The pipeline stage at which a translation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Map,
    Emit,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Extract => "extract",
            Stage::Map => "map",
            Stage::Emit => "emit",
        };
        f.write_str(s)
    }
}

/// Error surfaced to the caller of `translate`, tagging which stage failed.
/// The first failure halts the pipeline; no partial output is ever returned.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslationError {
    #[error("extract stage failed: {0}")]
    Extract(#[from] ExtractionError),

    #[error("map stage failed: {0}")]
    Map(#[from] UnsupportedConstruct),

    #[error("emit stage failed: {0}")]
    Emit(#[from] EmissionError),

    #[error("no source adapter registered for framework {0}")]
    NoAdapter(String),

    #[error("no target emitter registered for framework {0}")]
    NoEmitter(String),
}

impl TranslationError {
    /// Which stage of the pipeline produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            TranslationError::Extract(_) | TranslationError::NoAdapter(_) => Stage::Extract,
            TranslationError::Map(_) => Stage::Map,
            TranslationError::Emit(_) | TranslationError::NoEmitter(_) => Stage::Emit,
        }
    }
}
