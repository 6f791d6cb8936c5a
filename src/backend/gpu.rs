//! Batched GPU line/point executor.
//!
//! The GPU surface only knows points and line strips, so circles, ellipses,
//! and arcs are approximated by sampling. Filled circles become point
//! sprites and polygons become closed outlines. Text is not representable
//! and is dropped. CSS color strings are parsed once per distinct color and
//! cached.

use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::backend::{BackendKind, PlanBackend};
use crate::foundation::core::{Point, Rgba};
use crate::foundation::error::{MathplotError, MathplotResult};
use crate::primitives::{
    FillStyle, FontStyle, RendererPrimitives, StrokeStyle, TextAlignment,
};

/// Samples around a full circle or ellipse outline.
const CIRCLE_SEGMENTS: usize = 64;
/// Samples along an arc.
const ARC_SEGMENTS: usize = 32;

/// Host-provided GPU drawing context. Vertices are NDC `(x, y)` pairs.
pub trait GpuSurface {
    /// Current drawable size in pixels.
    fn viewport_size(&self) -> (f64, f64);
    /// Draw disconnected line segments (pairs of vertices).
    fn draw_lines(&mut self, vertices: &[f32], color: Rgba);
    /// Draw a connected line strip.
    fn draw_line_strip(&mut self, vertices: &[f32], color: Rgba);
    /// Draw point sprites of the given pixel size.
    fn draw_points(&mut self, vertices: &[f32], color: Rgba, size_px: f32);
    /// Clear the drawable.
    fn clear(&mut self);
    /// Re-read the drawable size after a host resize.
    fn resize_viewport(&mut self);
}

/// Parse a CSS-style color string into normalized RGBA.
///
/// Supports `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)`, and a
/// small named set. Unrecognized input falls back to opaque black.
pub fn parse_css_color(s: &str) -> Rgba {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(Rgba::BLACK);
    }
    if let Some(body) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|b| b.strip_suffix(')'))
    {
        return parse_rgb_body(body).unwrap_or(Rgba::BLACK);
    }
    match s.to_ascii_lowercase().as_str() {
        "white" => Rgba::new(1.0, 1.0, 1.0, 1.0),
        "red" => Rgba::new(1.0, 0.0, 0.0, 1.0),
        "green" => Rgba::new(0.0, 0.5, 0.0, 1.0),
        "lime" => Rgba::new(0.0, 1.0, 0.0, 1.0),
        "blue" => Rgba::new(0.0, 0.0, 1.0, 1.0),
        "yellow" => Rgba::new(1.0, 1.0, 0.0, 1.0),
        "orange" => Rgba::new(1.0, 165.0 / 255.0, 0.0, 1.0),
        "purple" => Rgba::new(0.5, 0.0, 0.5, 1.0),
        "gray" | "grey" => Rgba::new(0.5, 0.5, 0.5, 1.0),
        _ => Rgba::BLACK,
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    match hex.len() {
        3 => {
            let mut c = [0u8; 3];
            for (i, ch) in hex.chars().enumerate() {
                let v = ch.to_digit(16)? as u8;
                c[i] = v * 16 + v;
            }
            Some(Rgba::from_rgb8(c[0], c[1], c[2]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba::from_rgb8(r, g, b))
        }
        _ => None,
    }
}

fn parse_rgb_body(body: &str) -> Option<Rgba> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r: f32 = parts[0].parse().ok()?;
    let g: f32 = parts[1].parse().ok()?;
    let b: f32 = parts[2].parse().ok()?;
    let a: f32 = if parts.len() == 4 {
        parts[3].parse().ok()?
    } else {
        1.0
    };
    Some(Rgba::new(r / 255.0, g / 255.0, b / 255.0, a))
}

/// Batched GPU executor over a [`GpuSurface`].
pub struct GpuBackend {
    ctx: Box<dyn GpuSurface>,
    color_cache: HashMap<String, Rgba>,
}

impl GpuBackend {
    /// Wrap a host GPU context. Fails when the viewport has no area.
    pub fn new(ctx: Box<dyn GpuSurface>) -> MathplotResult<Self> {
        let (w, h) = ctx.viewport_size();
        if w <= 0.0 || h <= 0.0 {
            return Err(MathplotError::backend("gpu context has a zero-sized viewport"));
        }
        Ok(Self {
            ctx,
            color_cache: HashMap::new(),
        })
    }

    /// Number of distinct colors parsed so far.
    pub fn cached_color_count(&self) -> usize {
        self.color_cache.len()
    }

    fn color(&mut self, css: &str) -> Rgba {
        if let Some(c) = self.color_cache.get(css) {
            return *c;
        }
        let parsed = parse_css_color(css);
        self.color_cache.insert(css.to_string(), parsed);
        parsed
    }

    fn to_ndc(&self, p: Point) -> (f32, f32) {
        let (w, h) = self.ctx.viewport_size();
        (
            (2.0 * p.x / w - 1.0) as f32,
            (1.0 - 2.0 * p.y / h) as f32,
        )
    }

    fn strip_vertices(&self, points: &[Point]) -> Vec<f32> {
        let mut out = Vec::with_capacity(points.len() * 2);
        for p in points {
            let (x, y) = self.to_ndc(*p);
            out.push(x);
            out.push(y);
        }
        out
    }

    fn draw_strip(&mut self, points: &[Point], css: &str) {
        if points.len() < 2 {
            return;
        }
        let color = self.color(css);
        let vertices = self.strip_vertices(points);
        self.ctx.draw_line_strip(&vertices, color);
    }

    fn sample_circle(center: Point, radius: f64) -> Vec<Point> {
        let mut samples = Vec::with_capacity(CIRCLE_SEGMENTS + 1);
        for i in 0..=CIRCLE_SEGMENTS {
            let theta = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            samples.push(Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            ));
        }
        samples
    }

    fn sample_ellipse(center: Point, rx: f64, ry: f64, rotation: f64) -> Vec<Point> {
        let (sin_r, cos_r) = rotation.sin_cos();
        let mut samples = Vec::with_capacity(CIRCLE_SEGMENTS + 1);
        for i in 0..=CIRCLE_SEGMENTS {
            let theta = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            let x = rx * theta.cos();
            let y = ry * theta.sin();
            samples.push(Point::new(
                center.x + x * cos_r - y * sin_r,
                center.y + x * sin_r + y * cos_r,
            ));
        }
        samples
    }

    fn sample_arc(
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        sweep_clockwise: bool,
    ) -> Vec<Point> {
        // Normalize the sweep so the sampled direction matches the flag.
        // Clockwise on a y-down surface means increasing angle.
        let mut total = end - start;
        if sweep_clockwise && total < 0.0 {
            total += TAU;
        } else if !sweep_clockwise && total > 0.0 {
            total -= TAU;
        }
        let step = total / ARC_SEGMENTS as f64;
        let mut samples = Vec::with_capacity(ARC_SEGMENTS + 1);
        for i in 0..=ARC_SEGMENTS {
            let theta = start + step * i as f64;
            samples.push(Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            ));
        }
        samples
    }
}

impl RendererPrimitives for GpuBackend {
    fn stroke_line(&mut self, start: Point, end: Point, stroke: &StrokeStyle) {
        let color = self.color(&stroke.color);
        let (x0, y0) = self.to_ndc(start);
        let (x1, y1) = self.to_ndc(end);
        self.ctx.draw_lines(&[x0, y0, x1, y1], color);
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle) {
        self.draw_strip(points, &stroke.color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        let samples = Self::sample_circle(center, radius.abs());
        self.draw_strip(&samples, &stroke.color);
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        let size = (radius.abs() * 2.0).max(1.0);
        let color = self.color(&fill.color);
        let (x, y) = self.to_ndc(center);
        self.ctx.draw_points(&[x, y], color, size as f32);
        if let Some(s) = stroke {
            self.stroke_circle(center, radius, s);
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
        let samples = Self::sample_ellipse(center, radius_x.abs(), radius_y.abs(), rotation_rad);
        self.draw_strip(&samples, &stroke.color);
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
        // Outline only; solid polygon fills are not available here.
        let css = stroke.map_or(fill.color.as_str(), |s| s.color.as_str()).to_string();
        let mut closed = points.to_vec();
        if closed.first() != closed.last() {
            closed.push(closed[0]);
        }
        self.draw_strip(&closed, &css);
    }

    fn fill_joined_area(&mut self, forward: &[Point], reverse: &[Point], fill: &FillStyle) {
        if forward.len() < 2 || reverse.is_empty() {
            return;
        }
        let mut outline: Vec<Point> = forward.to_vec();
        outline.extend_from_slice(reverse);
        if outline.first() != outline.last() {
            outline.push(outline[0]);
        }
        self.draw_strip(&outline, &fill.color);
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
        let samples = Self::sample_arc(
            center,
            radius.abs(),
            start_angle_rad,
            end_angle_rad,
            sweep_clockwise,
        );
        self.draw_strip(&samples, &stroke.color);
    }

    fn draw_text(
        &mut self,
        _text: &str,
        _position: Point,
        _font: &FontStyle,
        _color: &str,
        _alignment: TextAlignment,
        _rotation_rad: f64,
        _screen_space: bool,
    ) {
        // No text pipeline on this backend.
    }

    fn clear_surface(&mut self) {
        self.ctx.clear();
    }

    fn resize_surface(&mut self, _width: f64, _height: f64) {
        self.ctx.resize_viewport();
    }

    fn begin_frame(&mut self) {
        self.ctx.clear();
    }
}

impl PlanBackend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/gpu.rs"]
mod tests;
