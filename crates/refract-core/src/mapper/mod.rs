//! The semantic mapper — the algorithmic core of the translator.
//!
//! Rewrites IR idioms with no 1:1 counterpart in the target framework,
//! governed by a fixed precedence of rules (first matching rule wins):
//! ownership downgrade/upgrade, async normalization, delay materialization,
//! render-tree reduction, error-surface mapping. Lossy-but-intentional
//! rewrites append a `FidelityNote`; a construct with no rule and no safe
//! default fails with `UnsupportedConstruct` rather than emitting
//! silently-wrong code.

pub mod async_norm;
pub mod delay;
pub mod error_surface;
pub mod ownership;
pub mod render;

pub use async_norm::AsyncNormalize;
pub use delay::DelayMaterialize;
pub use error_surface::ErrorSurfaceMap;
pub use ownership::OwnershipRewrite;
pub use render::RenderTreeReduce;

use crate::capability::Capabilities;
use crate::error::UnsupportedConstruct;
use crate::ir::{Component, FidelityNote};
use crate::pipeline::MapOptions;

/// Shared state threaded through the mapping passes.
pub struct MapContext<'a> {
    pub caps: &'a Capabilities,
    pub options: &'a MapOptions,
    pub notes: Vec<FidelityNote>,
}

/// One mapping pass. Passes consume the component and return a rewritten
/// copy; the input tree is never mutated in place.
pub trait MapPass {
    /// Name of this pass (matches the fidelity-note rule tag).
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        component: Component,
        ctx: &mut MapContext<'_>,
    ) -> Result<Component, UnsupportedConstruct>;
}

/// A successfully mapped component plus its accumulated fidelity notes.
#[derive(Debug, Clone)]
pub struct Mapped {
    pub component: Component,
    pub notes: Vec<FidelityNote>,
}

/// Run the full mapping pipeline against a target capability entry.
///
/// Pass order is the rule precedence and is fixed; it is not configurable
/// per translation (only `MapOptions` knobs are).
pub fn map_component(
    component: Component,
    caps: &Capabilities,
    options: &MapOptions,
) -> Result<Mapped, UnsupportedConstruct> {
    let passes: [&dyn MapPass; 5] = [
        &OwnershipRewrite,
        &AsyncNormalize,
        &DelayMaterialize,
        &RenderTreeReduce,
        &ErrorSurfaceMap,
    ];

    let mut ctx = MapContext {
        caps,
        options,
        notes: Vec::new(),
    };

    let mut component = component;
    for pass in passes {
        component = pass.apply(component, &mut ctx)?;
    }

    Ok(Mapped {
        component,
        notes: ctx.notes,
    })
}
