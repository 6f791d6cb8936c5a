//! Plan construction, caching, invalidation, and replay.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::drawable::{Drawable, DrawableKind, Signature};
use crate::foundation::core::Point;
use crate::mapper::{CoordinateMapper, MapState};
use crate::plan::command::PlanCommand;
use crate::plan::record::{RecordingPrimitives, UsageCounts};
use crate::primitives::RendererPrimitives;
use crate::reference;
use crate::style::StyleConfig;

/// Default culling margin in pixels.
pub const DEFAULT_CULL_MARGIN: f64 = 50.0;

/// Zoom ratio band within which sampled curves keep their recorded point
/// density instead of resampling.
const RESAMPLE_RATIO_MIN: f64 = 0.8;
const RESAMPLE_RATIO_MAX: f64 = 1.2;

/// How a plan's recorded geometry depends on the view it was built under.
#[derive(Clone, Copy, Debug)]
enum ResamplePolicy {
    /// Fixed parameter range; only the sampling density follows the zoom.
    ScaleOnly,
    /// Samples the x-range visible at build time; moving the view past it
    /// leaves the recorded paths wrong, not merely mispositioned.
    VisibleX { left: f64, right: f64 },
}

fn resample_policy(drawable: &Drawable, mapper: &CoordinateMapper) -> Option<ResamplePolicy> {
    match &drawable.kind {
        DrawableKind::Function { .. } => Some(ResamplePolicy::VisibleX {
            left: mapper.visible_left_bound(),
            right: mapper.visible_right_bound(),
        }),
        DrawableKind::ParametricFunction { .. } | DrawableKind::FunctionArea { .. } => {
            Some(ResamplePolicy::ScaleOnly)
        }
        _ => None,
    }
}

/// A cached, backend-ready rendering result for one drawable at one
/// geometry/style signature.
#[derive(Debug)]
pub struct Plan {
    commands: Vec<PlanCommand>,
    /// Transform the math payloads were recorded under.
    base_state: MapState,
    /// Transform the screen payloads currently reflect.
    current_state: MapState,
    bounds: Option<(Point, Point)>,
    supports_transform: bool,
    needs_apply: bool,
    uses_screen_space: bool,
    usage: UsageCounts,
    resample: Option<ResamplePolicy>,
    label_min_px: f64,
    label_vanish_px: f64,
    update_calls: u64,
    reprojections: u64,
}

impl Plan {
    fn from_recording(
        rec: RecordingPrimitives,
        state: MapState,
        style: &StyleConfig,
        resample: Option<ResamplePolicy>,
    ) -> Self {
        let mut plan = Self {
            uses_screen_space: rec.saw_screen_space,
            supports_transform: !rec.saw_screen_space,
            usage: rec.usage,
            commands: rec.commands,
            base_state: state,
            current_state: state,
            bounds: None,
            needs_apply: true,
            resample,
            label_min_px: style.min_label_font_px,
            label_vanish_px: style.label_vanish_threshold_px,
            update_calls: 0,
            reprojections: 0,
        };
        plan.recompute_bounds();
        plan
    }

    fn recompute_bounds(&mut self) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for cmd in &self.commands {
            cmd.extend_bounds(&mut min, &mut max);
        }
        self.bounds = (min.x <= max.x && min.y <= max.y).then_some((min, max));
    }

    /// Reposition the screen-space payloads for a new transform snapshot.
    ///
    /// A no-op (aside from bookkeeping) when the snapshot is within
    /// [`crate::mapper::MAP_STATE_TOLERANCE`] of the current one.
    pub fn update_map_state(&mut self, state: &MapState) {
        self.update_calls += 1;
        if state.approx_eq(&self.current_state) {
            return;
        }
        let ratio = state.scale / self.base_state.scale;
        for cmd in &mut self.commands {
            cmd.reproject(state, ratio, self.label_min_px, self.label_vanish_px);
        }
        self.current_state = *state;
        self.reprojections += 1;
        self.needs_apply = true;
        self.recompute_bounds();
    }

    /// Screen-space bounding-box test against the padded viewport.
    pub fn is_visible(&self, viewport_w: f64, viewport_h: f64, margin: f64) -> bool {
        match self.bounds {
            Some((min, max)) => Self::box_visible(min, max, viewport_w, viewport_h, margin),
            None => true,
        }
    }

    /// Visibility test with the bounds mapped onto `target` first, for plans
    /// whose screen geometry is repositioned by transform rather than
    /// rewritten. The stored bounds reflect `current_state`, which may be
    /// stale relative to the live view.
    pub fn is_visible_under(
        &self,
        target: &MapState,
        viewport_w: f64,
        viewport_h: f64,
        margin: f64,
    ) -> bool {
        if !self.supports_transform {
            return self.is_visible(viewport_w, viewport_h, margin);
        }
        let Some((min, max)) = self.bounds else {
            return true;
        };
        let ratio = target.scale / self.current_state.scale;
        let tx = (target.origin_x + target.offset_x)
            - ratio * (self.current_state.origin_x + self.current_state.offset_x);
        let ty = (target.origin_y + target.offset_y)
            - ratio * (self.current_state.origin_y + self.current_state.offset_y);
        // Scale is clamped positive, so min/max ordering survives the map.
        let min = Point::new(ratio * min.x + tx, ratio * min.y + ty);
        let max = Point::new(ratio * max.x + tx, ratio * max.y + ty);
        Self::box_visible(min, max, viewport_w, viewport_h, margin)
    }

    fn box_visible(min: Point, max: Point, viewport_w: f64, viewport_h: f64, margin: f64) -> bool {
        !(max.x < -margin
            || max.y < -margin
            || min.x > viewport_w + margin
            || min.y > viewport_h + margin)
    }

    /// Whether a sampled-curve plan must be rebuilt for the current view.
    ///
    /// Reprojection can move recorded points but cannot add or remove them,
    /// so curves resample once the zoom ratio leaves the tolerated band, and
    /// explicit functions also resample whenever the visible x-range moves.
    pub fn needs_resample(&self, mapper: &CoordinateMapper) -> bool {
        let Some(policy) = self.resample else {
            return false;
        };
        let ratio = mapper.scale_factor() / self.base_state.scale;
        if !(RESAMPLE_RATIO_MIN..=RESAMPLE_RATIO_MAX).contains(&ratio) {
            return true;
        }
        match policy {
            ResamplePolicy::ScaleOnly => false,
            ResamplePolicy::VisibleX { left, right } => {
                left != mapper.visible_left_bound() || right != mapper.visible_right_bound()
            }
        }
    }

    /// Replay the command list against a primitive sink, bracketed by
    /// `begin_batch`/`end_batch`.
    pub fn apply(&mut self, out: &mut dyn RendererPrimitives) {
        out.begin_batch();
        for cmd in &self.commands {
            match cmd {
                PlanCommand::Line { screen, stroke, .. } => {
                    out.stroke_line(screen.0, screen.1, stroke);
                }
                PlanCommand::Polyline { screen, stroke, .. } => {
                    out.stroke_polyline(screen, stroke);
                }
                PlanCommand::StrokeCircle {
                    screen_center,
                    screen_radius,
                    stroke,
                    ..
                } => out.stroke_circle(*screen_center, *screen_radius, stroke),
                PlanCommand::FillCircle {
                    math,
                    screen_center,
                    screen_radius,
                    fill,
                    stroke,
                } => out.fill_circle(
                    *screen_center,
                    *screen_radius,
                    fill,
                    stroke.as_ref(),
                    math.is_none(),
                ),
                PlanCommand::Ellipse {
                    rotation_rad,
                    screen_center,
                    screen_radius_x,
                    screen_radius_y,
                    stroke,
                    ..
                } => out.stroke_ellipse(
                    *screen_center,
                    *screen_radius_x,
                    *screen_radius_y,
                    *rotation_rad,
                    stroke,
                ),
                PlanCommand::Polygon {
                    math,
                    screen,
                    fill,
                    stroke,
                } => out.fill_polygon(screen, fill, stroke.as_ref(), math.is_none()),
                PlanCommand::JoinedArea {
                    screen_forward,
                    screen_reverse,
                    fill,
                    ..
                } => out.fill_joined_area(screen_forward, screen_reverse, fill),
                PlanCommand::Arc {
                    math,
                    screen_center,
                    screen_radius,
                    start_angle_rad,
                    end_angle_rad,
                    sweep_clockwise,
                    stroke,
                } => out.stroke_arc(
                    *screen_center,
                    *screen_radius,
                    *start_angle_rad,
                    *end_angle_rad,
                    *sweep_clockwise,
                    stroke,
                    math.is_none(),
                ),
                PlanCommand::Text {
                    math_position,
                    screen_position,
                    text,
                    font,
                    color,
                    alignment,
                    rotation_rad,
                    ..
                } => {
                    // Zoomed-out past the vanish threshold.
                    if font.size_px > 0.0 {
                        out.draw_text(
                            text,
                            *screen_position,
                            font,
                            color,
                            *alignment,
                            *rotation_rad,
                            math_position.is_none(),
                        );
                    }
                }
            }
        }
        out.end_batch();
        self.needs_apply = false;
    }

    /// CSS-matrix style cheap reposition parameters for retained backends:
    /// `(scale_ratio, tx, ty)` such that `new = ratio * old + t` per axis,
    /// relative to the plan's base transform.
    pub fn transform_params(&self, target: &MapState) -> (f64, f64, f64) {
        let ratio = target.scale / self.base_state.scale;
        let tx = (target.origin_x + target.offset_x)
            - ratio * (self.base_state.origin_x + self.base_state.offset_x);
        let ty = (target.origin_y + target.offset_y)
            - ratio * (self.base_state.origin_y + self.base_state.offset_y);
        (ratio, tx, ty)
    }

    /// Whether the plan can be repositioned from a MapState change alone.
    pub fn supports_transform(&self) -> bool {
        self.supports_transform
    }

    /// Whether the plan has unreplayed changes.
    pub fn needs_apply(&self) -> bool {
        self.needs_apply
    }

    /// Whether any primitive was authored in screen space.
    pub fn uses_screen_space(&self) -> bool {
        self.uses_screen_space
    }

    /// Per-kind primitive counts for pool pre-sizing.
    pub fn usage_counts(&self) -> &UsageCounts {
        &self.usage
    }

    /// Number of recorded commands.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// How many times [`Plan::update_map_state`] was called.
    pub fn update_calls(&self) -> u64 {
        self.update_calls
    }

    /// How many of those calls actually rewrote screen geometry.
    pub fn reprojections(&self) -> u64 {
        self.reprojections
    }
}

#[derive(Debug)]
struct CacheEntry {
    plan: Plan,
    signature: Signature,
    generation: u64,
}

/// Per-drawable-name plan cache with end-of-pass pruning.
///
/// Owned by exactly one renderer instance; entries are created on first
/// encounter, rebuilt on signature change, and removed when their drawable
/// is absent from a pass's touched set.
#[derive(Debug, Default)]
pub struct PlanCache {
    entries: HashMap<String, CacheEntry>,
    seen: HashSet<String>,
}

impl PlanCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the plan for `drawable`, reusing the cached one when the
    /// signature is unchanged and rebuilding otherwise. `release` is invoked
    /// with the drawable name before a stale plan is replaced, so backends
    /// can drop retained resources.
    pub fn resolve_plan(
        &mut self,
        drawable: &Drawable,
        mapper: &CoordinateMapper,
        style: &StyleConfig,
        release: &mut dyn FnMut(&str),
    ) -> &mut Plan {
        self.resolve_inner(drawable, mapper, style, release, true)
    }

    /// Like [`PlanCache::resolve_plan`], but a reused plan keeps its current
    /// screen geometry. Retained backends reposition the plan's persistent
    /// resources from [`Plan::transform_params`] instead of rewriting every
    /// command.
    pub fn resolve_plan_deferred(
        &mut self,
        drawable: &Drawable,
        mapper: &CoordinateMapper,
        style: &StyleConfig,
        release: &mut dyn FnMut(&str),
    ) -> &mut Plan {
        self.resolve_inner(drawable, mapper, style, release, false)
    }

    fn resolve_inner(
        &mut self,
        drawable: &Drawable,
        mapper: &CoordinateMapper,
        style: &StyleConfig,
        release: &mut dyn FnMut(&str),
        reproject_on_reuse: bool,
    ) -> &mut Plan {
        let signature = drawable.signature(style);
        let state = mapper.map_state();
        self.seen.insert(drawable.name.clone());

        match self.entries.entry(drawable.name.clone()) {
            Entry::Occupied(entry)
                if entry.get().signature == signature
                    && !entry.get().plan.needs_resample(mapper) =>
            {
                trace!(name = %drawable.name, "plan reused");
                let plan = &mut entry.into_mut().plan;
                if reproject_on_reuse && plan.supports_transform() {
                    plan.update_map_state(&state);
                }
                plan
            }
            Entry::Occupied(mut entry) => {
                release(&drawable.name);
                debug!(name = %drawable.name, "plan rebuilt");
                let generation = entry.get().generation + 1;
                let mut rec = RecordingPrimitives::new(state);
                reference::render_drawable(&mut rec, drawable, mapper, style);
                let policy = resample_policy(drawable, mapper);
                entry.insert(CacheEntry {
                    plan: Plan::from_recording(rec, state, style, policy),
                    signature,
                    generation,
                });
                &mut entry.into_mut().plan
            }
            Entry::Vacant(entry) => {
                debug!(name = %drawable.name, "plan built");
                let mut rec = RecordingPrimitives::new(state);
                reference::render_drawable(&mut rec, drawable, mapper, style);
                let policy = resample_policy(drawable, mapper);
                &mut entry
                    .insert(CacheEntry {
                        plan: Plan::from_recording(rec, state, style, policy),
                        signature,
                        generation: 0,
                    })
                    .plan
            }
        }
    }

    /// Remove every entry not touched since the last prune, invoking
    /// `release` once per removed entry, then reset the touched set.
    pub fn prune_unused_plan_entries(&mut self, release: &mut dyn FnMut(&str)) {
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|k| !self.seen.contains(*k))
            .cloned()
            .collect();
        for key in stale {
            self.entries.remove(&key);
            release(&key);
            debug!(name = %key, "plan pruned");
        }
        self.seen.clear();
    }

    /// Release every entry. Used at renderer teardown.
    pub fn clear(&mut self, release: &mut dyn FnMut(&str)) {
        for key in self.entries.keys() {
            release(key);
        }
        self.entries.clear();
        self.seen.clear();
    }

    /// Rebuild generation of a cached entry, if present.
    pub fn generation_of(&self, name: &str) -> Option<u64> {
        self.entries.get(name).map(|e| e.generation)
    }

    /// Look up a cached plan without touching the seen set.
    pub fn get(&self, name: &str) -> Option<&Plan> {
        self.entries.get(name).map(|e| &e.plan)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/engine.rs"]
mod tests;
