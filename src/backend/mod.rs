//! Backend executors behind one strategy trait.
//!
//! The plan engine and renderer are written once against [`PlanBackend`];
//! each executor maps the primitive vocabulary onto its host surface and
//! manages its own resource lifecycle through the plan hooks.

pub mod canvas;
pub mod gpu;
pub mod vector;

use crate::foundation::error::MathplotResult;
use crate::plan::UsageCounts;
use crate::primitives::RendererPrimitives;

pub use canvas::{Canvas2dBackend, Canvas2dContext};
pub use gpu::{GpuBackend, GpuSurface, parse_css_color};
pub use vector::{VectorBackend, VectorElementKind, VectorSurface};

/// Which executor a backend instance is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BackendKind {
    /// Immediate-mode 2D canvas, redrawn every visible frame.
    Canvas2d,
    /// Retained vector/DOM surface; plans own persistent groups.
    Vector,
    /// Batched GPU line/point drawing.
    Gpu,
}

/// Host-provided surface handle for [`create_backend`].
pub enum SurfaceHandle {
    /// A 2D raster context.
    Canvas2d(Box<dyn Canvas2dContext>),
    /// A retained vector document root.
    Vector(Box<dyn VectorSurface>),
    /// A GPU drawing context.
    Gpu(Box<dyn GpuSurface>),
}

/// Strategy trait implemented by every backend executor.
///
/// Plans replay through the [`RendererPrimitives`] supertrait; the hooks
/// below cover retained-resource lifecycle and cheap repositioning.
pub trait PlanBackend: RendererPrimitives {
    /// Which executor this is.
    fn kind(&self) -> BackendKind;

    /// True when drawn plans persist as addressable resources across frames.
    fn is_retained(&self) -> bool {
        false
    }

    /// Prepare resources for applying the named plan. Retained backends
    /// ensure the plan's group exists and pre-size element pools from
    /// `usage`. An error means the plan should be skipped this frame and
    /// retried on the next one.
    fn begin_plan(&mut self, _key: &str, _usage: &UsageCounts) -> MathplotResult<()> {
        Ok(())
    }

    /// Finish applying the named plan.
    fn end_plan(&mut self, _key: &str) {}

    /// Cheap reposition of a retained plan: `new = scale * old + (tx, ty)`
    /// per axis. Returns false when the backend cannot reposition and the
    /// caller must re-apply instead.
    fn set_plan_transform(&mut self, _key: &str, _scale: f64, _tx: f64, _ty: f64) -> bool {
        false
    }

    /// Move the named plan's resources to the top of the z-order.
    fn raise_plan(&mut self, _key: &str) {}

    /// Release every resource owned by the named plan. Called exactly once
    /// per replaced, pruned, or torn-down plan.
    fn release_plan(&mut self, _key: &str) {}
}

/// Build the executor matching the surface handle.
///
/// Fails when the surface reports itself unusable (zero-sized viewport or
/// an unavailable context).
pub fn create_backend(surface: SurfaceHandle) -> MathplotResult<Box<dyn PlanBackend>> {
    match surface {
        SurfaceHandle::Canvas2d(ctx) => Ok(Box::new(Canvas2dBackend::new(ctx)?)),
        SurfaceHandle::Vector(root) => Ok(Box::new(VectorBackend::new(root)?)),
        SurfaceHandle::Gpu(ctx) => Ok(Box::new(GpuBackend::new(ctx)?)),
    }
}
