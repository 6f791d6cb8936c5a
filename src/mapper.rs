//! Conversion between math-space coordinates and screen-space pixels.
//!
//! The mapper owns the pan/zoom state. Screen space has its origin at the
//! top-left corner with y growing downward, so the y axis flips on the way
//! through.

use crate::foundation::core::Point;

/// Smallest and largest allowed zoom scale, in pixels per math unit.
pub const MIN_SCALE: f64 = 0.01;
/// Upper zoom clamp.
pub const MAX_SCALE: f64 = 100.0;

/// Absolute per-field tolerance under which two [`MapState`] snapshots are
/// treated as equal for plan reuse. Absorbs floating-point jitter from
/// repeated pan/zoom arithmetic without letting visibly stale transforms
/// through.
pub const MAP_STATE_TOLERANCE: f64 = 1e-6;

/// Snapshot of the view transform at one instant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl MapState {
    /// Tolerant equality used for plan reuse. Signatures never go through
    /// this; only the view transform does.
    pub fn approx_eq(&self, other: &MapState) -> bool {
        (self.scale - other.scale).abs() <= MAP_STATE_TOLERANCE
            && (self.offset_x - other.offset_x).abs() <= MAP_STATE_TOLERANCE
            && (self.offset_y - other.offset_y).abs() <= MAP_STATE_TOLERANCE
            && (self.origin_x - other.origin_x).abs() <= MAP_STATE_TOLERANCE
            && (self.origin_y - other.origin_y).abs() <= MAP_STATE_TOLERANCE
    }
}

/// Math-space to screen-space mapper owning the pan/zoom state.
#[derive(Clone, Debug)]
pub struct CoordinateMapper {
    scale_factor: f64,
    offset_x: f64,
    offset_y: f64,
    origin_x: f64,
    origin_y: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl CoordinateMapper {
    /// Zoom step used by [`CoordinateMapper::zoom_in`] / `zoom_out`.
    const ZOOM_STEP: f64 = 1.1;

    /// Build a mapper for a canvas of the given pixel size with the origin
    /// at the canvas center and the given initial scale.
    pub fn new(canvas_width: f64, canvas_height: f64, scale: f64) -> Self {
        Self {
            scale_factor: scale.clamp(MIN_SCALE, MAX_SCALE),
            offset_x: 0.0,
            offset_y: 0.0,
            origin_x: canvas_width / 2.0,
            origin_y: canvas_height / 2.0,
            canvas_width,
            canvas_height,
        }
    }

    /// Current zoom scale in pixels per math unit.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Canvas width in pixels.
    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    /// Canvas height in pixels.
    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Snapshot the current transform.
    pub fn map_state(&self) -> MapState {
        MapState {
            scale: self.scale_factor,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            origin_x: self.origin_x,
            origin_y: self.origin_y,
        }
    }

    /// Convert a math-space point to screen pixels.
    pub fn math_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_x + x * self.scale_factor + self.offset_x,
            self.origin_y - y * self.scale_factor + self.offset_y,
        )
    }

    /// Exact inverse of [`CoordinateMapper::math_to_screen`].
    pub fn screen_to_math(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.origin_x - self.offset_x) / self.scale_factor,
            (self.origin_y + self.offset_y - sy) / self.scale_factor,
        )
    }

    /// Scale a math-space length to pixels. Offsets do not apply to lengths.
    pub fn scale_value(&self, v: f64) -> f64 {
        v * self.scale_factor
    }

    /// Convert a pixel length back to math units.
    pub fn unscale_value(&self, v: f64) -> f64 {
        v / self.scale_factor
    }

    /// Pan the view by a screen-space delta.
    pub fn apply_pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Multiply the zoom scale by `factor`, holding the math point under
    /// `screen_pivot` fixed on screen. The scale is clamped to
    /// `[MIN_SCALE, MAX_SCALE]`.
    pub fn apply_zoom(&mut self, factor: f64, screen_pivot: (f64, f64)) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (px, py) = screen_pivot;
        let (mx, my) = self.screen_to_math(px, py);

        let new_scale = (self.scale_factor * factor).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == self.scale_factor {
            return;
        }
        self.scale_factor = new_scale;

        // Re-anchor the offsets so the pivot's math point stays put.
        self.offset_x = px - self.origin_x - mx * self.scale_factor;
        self.offset_y = py - self.origin_y + my * self.scale_factor;
    }

    /// One zoom-in step about the canvas center.
    pub fn zoom_in(&mut self) {
        let center = (self.canvas_width / 2.0, self.canvas_height / 2.0);
        self.apply_zoom(Self::ZOOM_STEP, center);
    }

    /// One zoom-out step about the canvas center.
    pub fn zoom_out(&mut self) {
        let center = (self.canvas_width / 2.0, self.canvas_height / 2.0);
        self.apply_zoom(1.0 / Self::ZOOM_STEP, center);
    }

    /// Resize the canvas, recentering the origin.
    pub fn update_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
        self.origin_x = width / 2.0;
        self.origin_y = height / 2.0;
    }

    /// Math x of the left screen edge.
    pub fn visible_left_bound(&self) -> f64 {
        self.screen_to_math(0.0, 0.0).0
    }

    /// Math x of the right screen edge.
    pub fn visible_right_bound(&self) -> f64 {
        self.screen_to_math(self.canvas_width, 0.0).0
    }

    /// Math y of the top screen edge.
    pub fn visible_top_bound(&self) -> f64 {
        self.screen_to_math(0.0, 0.0).1
    }

    /// Math y of the bottom screen edge.
    pub fn visible_bottom_bound(&self) -> f64 {
        self.screen_to_math(0.0, self.canvas_height).1
    }

    /// Convenience point-in, point-out projection.
    pub fn project(&self, p: Point) -> Point {
        let (sx, sy) = self.math_to_screen(p.x, p.y);
        Point::new(sx, sy)
    }
}

#[cfg(test)]
#[path = "../tests/unit/mapper.rs"]
mod tests;
