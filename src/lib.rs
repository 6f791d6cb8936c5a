//! Mathplot is a plan-based 2D math rendering engine.
//!
//! It turns a list of named drawables (points, curves, polygons, labels)
//! plus a view transform and a style configuration into draw calls on one
//! of three backend executors, caching the intermediate command lists so
//! unchanged geometry is never recomputed.
//!
//! # Pipeline overview
//!
//! 1. **Reference render**: `Drawable + CoordinateMapper + StyleConfig ->
//!    primitive calls` (the visual ground truth, uncached)
//! 2. **Record**: the same calls captured as a [`Plan`] command list with
//!    math-space payloads
//! 3. **Resolve**: [`PlanCache`] reuses a plan while its signature holds and
//!    repositions it for view changes, rebuilding only on real change
//! 4. **Execute**: plans replay onto a [`PlanBackend`] (immediate 2D canvas,
//!    retained vector groups, or batched GPU lines)
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: reference rendering and plan recording
//!   are pure for a given input.
//! - **Degenerate geometry never errors**: non-finite or empty inputs
//!   render as no-ops.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod curve;
mod drawable;
mod foundation;
mod mapper;
mod plan;
mod primitives;
mod reference;
mod renderer;
mod style;

pub use backend::{
    BackendKind, Canvas2dBackend, Canvas2dContext, GpuBackend, GpuSurface, PlanBackend,
    SurfaceHandle, VectorBackend, VectorElementKind, VectorSurface, create_backend,
    parse_css_color,
};
pub use drawable::{CurveFn, Drawable, DrawableKind, Signature};
pub use foundation::core::{Point, Rect, Rgba, Vec2, Viewport};
pub use foundation::error::{MathplotError, MathplotResult};
pub use mapper::{CoordinateMapper, MAP_STATE_TOLERANCE, MAX_SCALE, MIN_SCALE, MapState};
pub use plan::{DEFAULT_CULL_MARGIN, Plan, PlanCache, UsageCounts};
pub use primitives::{
    FillStyle, FontStyle, FontWeight, HorizontalAlign, LineCap, LineJoin, RendererPrimitives,
    StrokeStyle, TextAlignment, VerticalAlign,
};
pub use reference::{
    current_tick_spacing, format_tick_label, render_cartesian_grid, render_drawable,
    render_polar_grid,
};
pub use renderer::{GridKind, PassStats, PlanRenderer, RenderSettings};
pub use style::StyleConfig;
