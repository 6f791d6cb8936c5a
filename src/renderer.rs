//! Frame orchestration over a plan cache and one backend executor.

use tracing::{debug, warn};

use crate::backend::PlanBackend;
use crate::drawable::Drawable;
use crate::mapper::CoordinateMapper;
use crate::plan::{DEFAULT_CULL_MARGIN, PlanCache};
use crate::reference;
use crate::style::StyleConfig;

/// Reserved plan key for the background grid.
const GRID_KEY: &str = "__grid";

/// Which background grid to draw before the drawables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GridKind {
    /// Axis-aligned grid lines with axes and tick labels.
    Cartesian,
    /// Concentric rings and 30-degree spokes.
    Polar,
}

/// Per-renderer settings.
#[derive(Clone, Copy, Debug)]
pub struct RenderSettings {
    /// Padding around the viewport inside which plans still count as visible.
    pub cull_margin: f64,
    /// Background grid, if any.
    pub grid: Option<GridKind>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cull_margin: DEFAULT_CULL_MARGIN,
            grid: Some(GridKind::Cartesian),
        }
    }
}

/// Counters for one completed draw pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Plans applied or repositioned on the backend.
    pub drawn: usize,
    /// Plans kept current but not drawn because they were off screen.
    pub culled: usize,
    /// Plans the backend refused this frame.
    pub skipped: usize,
    /// Cache entries released at end of pass.
    pub pruned: usize,
}

/// The renderer: owns the plan cache, the mapper, and the backend, and
/// turns a drawable list into one frame per [`PlanRenderer::draw_pass`].
pub struct PlanRenderer {
    backend: Box<dyn PlanBackend>,
    cache: PlanCache,
    mapper: CoordinateMapper,
    style: StyleConfig,
    settings: RenderSettings,
    draw_enabled: bool,
    grid_active: bool,
}

impl PlanRenderer {
    /// Build a renderer over an executor, sizing the mapper from nothing
    /// but the given canvas dimensions.
    pub fn new(
        backend: Box<dyn PlanBackend>,
        canvas_width: f64,
        canvas_height: f64,
        initial_scale: f64,
        style: StyleConfig,
        settings: RenderSettings,
    ) -> Self {
        Self {
            backend,
            cache: PlanCache::new(),
            mapper: CoordinateMapper::new(canvas_width, canvas_height, initial_scale),
            style,
            settings,
            draw_enabled: true,
            grid_active: false,
        }
    }

    /// The view transform, for panning and zooming between passes.
    pub fn mapper_mut(&mut self) -> &mut CoordinateMapper {
        &mut self.mapper
    }

    /// Read-only view transform.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Current style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Replace the style configuration. Plans whose appearance depends on
    /// the changed fields rebuild on the next pass through their signatures.
    pub fn set_style(&mut self, style: StyleConfig) {
        self.style = style;
    }

    /// The plan cache, for inspection.
    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Gate drawing without losing cached plans. While disabled,
    /// [`PlanRenderer::draw_pass`] returns immediately.
    pub fn set_draw_enabled(&mut self, enabled: bool) {
        self.draw_enabled = enabled;
    }

    /// Whether passes currently draw.
    pub fn draw_enabled(&self) -> bool {
        self.draw_enabled
    }

    /// Resize the surface and recentre the view transform.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.mapper.update_canvas_size(width, height);
        self.backend.resize_surface(width, height);
    }

    /// Render one frame from the given drawables, in order.
    ///
    /// Every listed drawable's plan is resolved and kept current even when
    /// culled, so panning it back on screen needs no rebuild. Entries for
    /// drawables absent from the list are pruned and released at the end.
    pub fn draw_pass(&mut self, drawables: &[Drawable]) -> PassStats {
        let mut stats = PassStats::default();
        if !self.draw_enabled {
            return stats;
        }

        let backend = &mut *self.backend;
        let retained = backend.is_retained();
        backend.begin_frame();

        if let Some(grid) = self.settings.grid {
            self.grid_active |=
                Self::draw_grid(backend, &self.mapper, &self.style, grid, &mut stats);
        }

        let w = self.mapper.canvas_width();
        let h = self.mapper.canvas_height();
        let margin = self.settings.cull_margin;
        let state = self.mapper.map_state();
        let mut z_dirty = false;

        for drawable in drawables {
            let mut release = |key: &str| backend.release_plan(key);
            let plan = if retained {
                self.cache
                    .resolve_plan_deferred(drawable, &self.mapper, &self.style, &mut release)
            } else {
                self.cache
                    .resolve_plan(drawable, &self.mapper, &self.style, &mut release)
            };

            // Deferred reuse leaves screen geometry where it was built, so
            // retained plans cull against their bounds mapped onto the live
            // transform, not the stale recorded ones.
            let visible = if retained {
                plan.is_visible_under(&state, w, h, margin)
            } else {
                plan.is_visible(w, h, margin)
            };
            if !visible {
                stats.culled += 1;
                continue;
            }

            if retained {
                if plan.needs_apply() {
                    if let Err(err) = backend.begin_plan(&drawable.name, plan.usage_counts()) {
                        warn!(name = %drawable.name, %err, "backend refused plan, skipping");
                        stats.skipped += 1;
                        continue;
                    }
                    plan.apply(backend);
                    backend.end_plan(&drawable.name);
                    backend.set_plan_transform(&drawable.name, 1.0, 0.0, 0.0);
                    z_dirty = true;
                    stats.drawn += 1;
                } else if plan.supports_transform() {
                    let (ratio, tx, ty) = plan.transform_params(&state);
                    if backend.set_plan_transform(&drawable.name, ratio, tx, ty) {
                        stats.drawn += 1;
                    } else {
                        // Backend cannot reposition; fall back to a rewrite.
                        plan.update_map_state(&state);
                        if let Err(err) = backend.begin_plan(&drawable.name, plan.usage_counts()) {
                            warn!(name = %drawable.name, %err, "backend refused plan, skipping");
                            stats.skipped += 1;
                            continue;
                        }
                        plan.apply(backend);
                        backend.end_plan(&drawable.name);
                        stats.drawn += 1;
                    }
                } else {
                    stats.drawn += 1;
                }
            } else {
                plan.apply(backend);
                stats.drawn += 1;
            }
        }

        // A rebuild re-creates resources above everything drawn since; put
        // the whole list back in listed order.
        if retained && z_dirty {
            for drawable in drawables {
                backend.raise_plan(&drawable.name);
            }
        }

        let mut release = |key: &str| {
            backend.release_plan(key);
            stats.pruned += 1;
        };
        self.cache.prune_unused_plan_entries(&mut release);

        backend.end_frame();
        debug!(
            drawn = stats.drawn,
            culled = stats.culled,
            skipped = stats.skipped,
            pruned = stats.pruned,
            "draw pass complete"
        );
        stats
    }

    fn draw_grid(
        backend: &mut dyn PlanBackend,
        mapper: &CoordinateMapper,
        style: &StyleConfig,
        grid: GridKind,
        stats: &mut PassStats,
    ) -> bool {
        // The grid depends on the live transform, so it replays every frame
        // through a reserved plan slot rather than the cache.
        if let Err(err) = backend.begin_plan(GRID_KEY, &Default::default()) {
            warn!(%err, "backend refused grid plan, skipping");
            stats.skipped += 1;
            return false;
        }
        match grid {
            GridKind::Cartesian => reference::render_cartesian_grid(backend, mapper, style),
            GridKind::Polar => reference::render_polar_grid(backend, mapper, style),
        }
        backend.end_plan(GRID_KEY);
        true
    }

    /// Release every backend resource and drop all cached plans. The
    /// renderer is reusable afterwards; the next pass rebuilds from scratch.
    pub fn teardown(&mut self) {
        let backend = &mut *self.backend;
        if self.grid_active {
            backend.release_plan(GRID_KEY);
            self.grid_active = false;
        }
        let mut release = |key: &str| backend.release_plan(key);
        self.cache.clear(&mut release);
        debug!("renderer torn down");
    }
}

impl Drop for PlanRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../tests/unit/renderer.rs"]
mod tests;
