//! Immediate-mode 2D canvas executor.
//!
//! Replays plan command lists into a host 2D context every visible frame.
//! The context trait mirrors the familiar 2D canvas API surface so hosts
//! can forward calls directly.

use std::f64::consts::TAU;

use crate::backend::{BackendKind, PlanBackend};
use crate::foundation::core::Point;
use crate::foundation::error::{MathplotError, MathplotResult};
use crate::primitives::{
    FillStyle, FontStyle, FontWeight, HorizontalAlign, LineCap, LineJoin, RendererPrimitives,
    StrokeStyle, TextAlignment, VerticalAlign,
};

/// Host-provided 2D raster context.
pub trait Canvas2dContext {
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, anticlockwise: bool);
    fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start: f64,
        end: f64,
    );
    fn close_path(&mut self);
    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_join(&mut self, join: LineJoin);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_global_alpha(&mut self, alpha: f64);
    fn stroke(&mut self);
    fn fill(&mut self);
    fn set_font(&mut self, css_font: &str);
    fn set_text_align(&mut self, align: HorizontalAlign);
    fn set_text_baseline(&mut self, baseline: VerticalAlign);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_size(&mut self, width: f64, height: f64);
    fn width(&self) -> f64;
    fn height(&self) -> f64;
}

/// Immediate canvas executor over a [`Canvas2dContext`].
pub struct Canvas2dBackend {
    ctx: Box<dyn Canvas2dContext>,
}

impl Canvas2dBackend {
    /// Wrap a host context. Fails when the surface has no area.
    pub fn new(ctx: Box<dyn Canvas2dContext>) -> MathplotResult<Self> {
        if ctx.width() <= 0.0 || ctx.height() <= 0.0 {
            return Err(MathplotError::backend("2d context has a zero-sized surface"));
        }
        Ok(Self { ctx })
    }

    fn apply_stroke(&mut self, stroke: &StrokeStyle) {
        self.ctx.set_stroke_style(&stroke.color);
        self.ctx.set_line_width(stroke.width);
        self.ctx.set_line_join(stroke.line_join);
        self.ctx.set_line_cap(stroke.line_cap);
    }

    fn trace_polyline(&mut self, points: &[Point]) {
        self.ctx.begin_path();
        self.ctx.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            self.ctx.line_to(p.x, p.y);
        }
    }

    fn css_font(font: &FontStyle) -> String {
        let weight = match font.weight {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        };
        format!("{} {}px {}", weight, font.size_px, font.family)
    }
}

impl RendererPrimitives for Canvas2dBackend {
    fn stroke_line(&mut self, start: Point, end: Point, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(start.x, start.y);
        self.ctx.line_to(end.x, end.y);
        self.ctx.stroke();
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        self.apply_stroke(stroke);
        self.trace_polyline(points);
        self.ctx.stroke();
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius.abs(), 0.0, TAU, false);
        self.ctx.stroke();
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius.abs(), 0.0, TAU, false);
        self.ctx.set_fill_style(&fill.color);
        self.ctx.set_global_alpha(fill.opacity.clamp(0.0, 1.0));
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
        if let Some(s) = stroke {
            self.apply_stroke(s);
            self.ctx.stroke();
        }
    }

    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        rotation_rad: f64,
        stroke: &StrokeStyle,
    ) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.ellipse(
            center.x,
            center.y,
            radius_x.abs(),
            radius_y.abs(),
            rotation_rad,
            0.0,
            TAU,
        );
        self.ctx.stroke();
    }

    fn fill_polygon(
        &mut self,
        points: &[Point],
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        if points.len() < 2 {
            return;
        }
        self.trace_polyline(points);
        self.ctx.close_path();
        self.ctx.set_fill_style(&fill.color);
        self.ctx.set_global_alpha(fill.opacity.clamp(0.0, 1.0));
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
        if let Some(s) = stroke {
            self.apply_stroke(s);
            self.ctx.stroke();
        }
    }

    fn fill_joined_area(&mut self, forward: &[Point], reverse: &[Point], fill: &FillStyle) {
        if forward.len() < 2 || reverse.is_empty() {
            return;
        }
        self.trace_polyline(forward);
        for p in reverse {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style(&fill.color);
        self.ctx.set_global_alpha(fill.opacity.clamp(0.0, 1.0));
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
    }

    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle_rad: f64,
        end_angle_rad: f64,
        sweep_clockwise: bool,
        stroke: &StrokeStyle,
        _screen_space: bool,
    ) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        // The 2D canvas convention is anticlockwise=true for negative sweep.
        self.ctx.arc(
            center.x,
            center.y,
            radius.abs(),
            start_angle_rad,
            end_angle_rad,
            !sweep_clockwise,
        );
        self.ctx.stroke();
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        font: &FontStyle,
        color: &str,
        alignment: TextAlignment,
        rotation_rad: f64,
        _screen_space: bool,
    ) {
        self.ctx.set_font(&Self::css_font(font));
        self.ctx.set_fill_style(color);
        self.ctx.set_text_align(alignment.horizontal);
        self.ctx.set_text_baseline(alignment.vertical);
        if rotation_rad != 0.0 {
            self.ctx.save();
            self.ctx.translate(position.x, position.y);
            self.ctx.rotate(rotation_rad);
            self.ctx.fill_text(text, 0.0, 0.0);
            self.ctx.restore();
        } else {
            self.ctx.fill_text(text, position.x, position.y);
        }
    }

    fn clear_surface(&mut self) {
        let (w, h) = (self.ctx.width(), self.ctx.height());
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn resize_surface(&mut self, width: f64, height: f64) {
        self.ctx.set_size(width, height);
    }

    fn begin_frame(&mut self) {
        self.clear_surface();
    }
}

impl PlanBackend for Canvas2dBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Canvas2d
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/canvas.rs"]
mod tests;
