//! Retained vector/DOM executor.
//!
//! Each plan owns one retained group on the host surface. Elements inside a
//! group are pooled per primitive kind and indexed; attribute writes go
//! through a last-written cache so an unchanged plan touches nothing.
//! Dropping a group is the backend's release hook.

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::warn;

use crate::backend::{BackendKind, PlanBackend};
use crate::foundation::core::Point;
use crate::foundation::error::{MathplotError, MathplotResult};
use crate::plan::UsageCounts;
use crate::primitives::{
    FillStyle, FontStyle, FontWeight, RendererPrimitives, StrokeStyle, TextAlignment,
};

/// Retained element kinds pooled inside a plan group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VectorElementKind {
    Line,
    Polyline,
    Circle,
    Ellipse,
    /// Arbitrary path data (arcs, joined areas).
    Path,
    Polygon,
    Text,
}

/// Host-provided retained vector document.
pub trait VectorSurface {
    /// Create (or re-attach) the named group. Groups stack in creation
    /// order; later groups draw above earlier ones.
    fn ensure_group(&mut self, key: &str) -> MathplotResult<()>;
    /// Remove the named group and everything in it.
    fn drop_group(&mut self, key: &str);
    /// Apply `new = scale * old + (tx, ty)` to the whole group.
    fn set_group_transform(&mut self, key: &str, scale: f64, tx: f64, ty: f64);
    /// Move the named group above all others.
    fn raise_group(&mut self, key: &str);
    /// Make sure element `index` of `kind` exists in the group.
    fn ensure_element(&mut self, key: &str, kind: VectorElementKind, index: usize);
    /// Write one attribute of one element.
    fn set_attr(&mut self, key: &str, kind: VectorElementKind, index: usize, name: &str, value: &str);
    /// Replace the text content of a text element.
    fn set_text_content(&mut self, key: &str, kind: VectorElementKind, index: usize, text: &str);
    /// Hide pooled elements of `kind` at indices `>= active`.
    fn set_active_count(&mut self, key: &str, kind: VectorElementKind, active: usize);
}

/// Hard per-kind pool ceiling; a plan asking for more is skipped.
const MAX_POOL: u32 = 4096;

type AttrKey = (String, VectorElementKind, usize, &'static str);

/// Retained executor over a [`VectorSurface`].
pub struct VectorBackend {
    root: Box<dyn VectorSurface>,
    current: Option<String>,
    cursors: HashMap<VectorElementKind, usize>,
    attr_cache: HashMap<AttrKey, String>,
}

impl VectorBackend {
    /// Wrap a host vector surface, verifying it can host a group.
    pub fn new(mut root: Box<dyn VectorSurface>) -> MathplotResult<Self> {
        root.ensure_group("__probe")?;
        root.drop_group("__probe");
        Ok(Self {
            root,
            current: None,
            cursors: HashMap::new(),
            attr_cache: HashMap::new(),
        })
    }

    fn next_index(&mut self, kind: VectorElementKind) -> Option<(String, usize)> {
        let key = self.current.clone()?;
        let cursor = self.cursors.entry(kind).or_insert(0);
        let index = *cursor;
        *cursor += 1;
        self.root.ensure_element(&key, kind, index);
        Some((key, index))
    }

    /// Write an attribute unless it already holds this value.
    fn put(
        &mut self,
        group: &str,
        kind: VectorElementKind,
        index: usize,
        name: &'static str,
        value: String,
    ) {
        let cache_key = (group.to_string(), kind, index, name);
        if self.attr_cache.get(&cache_key).is_some_and(|v| *v == value) {
            return;
        }
        self.root.set_attr(group, kind, index, name, &value);
        self.attr_cache.insert(cache_key, value);
    }

    fn put_stroke(&mut self, group: &str, kind: VectorElementKind, index: usize, s: &StrokeStyle) {
        self.put(group, kind, index, "stroke", s.color.clone());
        self.put(group, kind, index, "stroke-width", fmt_f64(s.width));
    }

    fn put_fill(&mut self, group: &str, kind: VectorElementKind, index: usize, f: &FillStyle) {
        self.put(group, kind, index, "fill", f.color.clone());
        self.put(group, kind, index, "fill-opacity", fmt_f64(f.opacity));
    }

    fn points_attr(points: &[Point]) -> String {
        let mut out = String::with_capacity(points.len() * 12);
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&fmt_f64(p.x));
            out.push(',');
            out.push_str(&fmt_f64(p.y));
        }
        out
    }

    fn arc_path_data(
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        sweep_clockwise: bool,
    ) -> String {
        let mut total = end - start;
        if sweep_clockwise && total < 0.0 {
            total += 2.0 * PI;
        } else if !sweep_clockwise && total > 0.0 {
            total -= 2.0 * PI;
        }
        let sx = center.x + radius * start.cos();
        let sy = center.y + radius * start.sin();
        let ex = center.x + radius * (start + total).cos();
        let ey = center.y + radius * (start + total).sin();
        let large = u8::from(total.abs() > PI);
        let sweep = u8::from(sweep_clockwise);
        format!(
            "M {} {} A {} {} 0 {} {} {} {}",
            fmt_f64(sx),
            fmt_f64(sy),
            fmt_f64(radius),
            fmt_f64(radius),
            large,
            sweep,
            fmt_f64(ex),
            fmt_f64(ey),
        )
    }
}

fn fmt_f64(v: f64) -> String {
    // Fixed precision keeps attribute strings stable across reprojection
    // no-ops.
    format!("{v:.3}")
}

impl RendererPrimitives for VectorBackend {
    fn stroke_line(&mut self, start: Point, end: Point, stroke: &StrokeStyle) {
        let Some((group, i)) = self.next_index(VectorElementKind::Line) else {
            return;
        };
        self.put(&group, VectorElementKind::Line, i, "x1", fmt_f64(start.x));
        self.put(&group, VectorElementKind::Line, i, "y1", fmt_f64(start.y));
        self.put(&group, VectorElementKind::Line, i, "x2", fmt_f64(end.x));
        self.put(&group, VectorElementKind::Line, i, "y2", fmt_f64(end.y));
        self.put_stroke(&group, VectorElementKind::Line, i, stroke);
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        let Some((group, i)) = self.next_index(VectorElementKind::Polyline) else {
            return;
        };
        self.put(
            &group,
            VectorElementKind::Polyline,
            i,
            "points",
            Self::points_attr(points),
        );
        self.put(&group, VectorElementKind::Polyline, i, "fill", "none".to_string());
        self.put_stroke(&group, VectorElementKind::Polyline, i, stroke);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        let Some((group, i)) = self.next_index(VectorElementKind::Circle) else {
            return;
        };
        self.put(&group, VectorElementKind::Circle, i, "cx", fmt_f64(center.x));
        self.put(&group, VectorElementKind::Circle, i, "cy", fmt_f64(center.y));
        self.put(&group, VectorElementKind::Circle, i, "r", fmt_f64(radius.abs()));
        self.put(&group, VectorElementKind::Circle, i, "fill", "none".to_string());
        self.put_stroke(&group, VectorElementKind::Circle, i, stroke);
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        let Some((group, i)) = self.next_index(VectorElementKind::Circle) else {
            return;
        };
        self.put(&group, VectorElementKind::Circle, i, "cx", fmt_f64(center.x));
        self.put(&group, VectorElementKind::Circle, i, "cy", fmt_f64(center.y));
        self.put(&group, VectorElementKind::Circle, i, "r", fmt_f64(radius.abs()));
        self.put_fill(&group, VectorElementKind::Circle, i, fill);
        match stroke {
            Some(s) => self.put_stroke(&group, VectorElementKind::Circle, i, s),
            None => self.put(&group, VectorElementKind::Circle, i, "stroke", "none".to_string()),
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
        let Some((group, i)) = self.next_index(VectorElementKind::Ellipse) else {
            return;
        };
        let k = VectorElementKind::Ellipse;
        self.put(&group, k, i, "cx", fmt_f64(center.x));
        self.put(&group, k, i, "cy", fmt_f64(center.y));
        self.put(&group, k, i, "rx", fmt_f64(radius_x.abs()));
        self.put(&group, k, i, "ry", fmt_f64(radius_y.abs()));
        self.put(
            &group,
            k,
            i,
            "transform",
            format!(
                "rotate({} {} {})",
                fmt_f64(rotation_rad.to_degrees()),
                fmt_f64(center.x),
                fmt_f64(center.y)
            ),
        );
        self.put(&group, k, i, "fill", "none".to_string());
        self.put_stroke(&group, k, i, stroke);
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
        let Some((group, i)) = self.next_index(VectorElementKind::Polygon) else {
            return;
        };
        let k = VectorElementKind::Polygon;
        self.put(&group, k, i, "points", Self::points_attr(points));
        self.put_fill(&group, k, i, fill);
        match stroke {
            Some(s) => self.put_stroke(&group, k, i, s),
            None => self.put(&group, k, i, "stroke", "none".to_string()),
        }
    }

    fn fill_joined_area(&mut self, forward: &[Point], reverse: &[Point], fill: &FillStyle) {
        if forward.len() < 2 || reverse.is_empty() {
            return;
        }
        let Some((group, i)) = self.next_index(VectorElementKind::Path) else {
            return;
        };
        let mut d = String::with_capacity((forward.len() + reverse.len()) * 12);
        d.push_str("M ");
        d.push_str(&fmt_f64(forward[0].x));
        d.push(' ');
        d.push_str(&fmt_f64(forward[0].y));
        for p in forward[1..].iter().chain(reverse.iter()) {
            d.push_str(" L ");
            d.push_str(&fmt_f64(p.x));
            d.push(' ');
            d.push_str(&fmt_f64(p.y));
        }
        d.push_str(" Z");
        let k = VectorElementKind::Path;
        self.put(&group, k, i, "d", d);
        self.put_fill(&group, k, i, fill);
        self.put(&group, k, i, "stroke", "none".to_string());
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
        let Some((group, i)) = self.next_index(VectorElementKind::Path) else {
            return;
        };
        let k = VectorElementKind::Path;
        self.put(
            &group,
            k,
            i,
            "d",
            Self::arc_path_data(
                center,
                radius.abs(),
                start_angle_rad,
                end_angle_rad,
                sweep_clockwise,
            ),
        );
        self.put(&group, k, i, "fill", "none".to_string());
        self.put_stroke(&group, k, i, stroke);
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
        let Some((group, i)) = self.next_index(VectorElementKind::Text) else {
            return;
        };
        let k = VectorElementKind::Text;
        self.put(&group, k, i, "x", fmt_f64(position.x));
        self.put(&group, k, i, "y", fmt_f64(position.y));
        self.put(&group, k, i, "fill", color.to_string());
        self.put(&group, k, i, "font-family", font.family.clone());
        self.put(&group, k, i, "font-size", fmt_f64(font.size_px));
        self.put(
            &group,
            k,
            i,
            "font-weight",
            match font.weight {
                FontWeight::Normal => "normal".to_string(),
                FontWeight::Bold => "bold".to_string(),
            },
        );
        self.put(
            &group,
            k,
            i,
            "text-anchor",
            match alignment.horizontal {
                crate::primitives::HorizontalAlign::Left => "start".to_string(),
                crate::primitives::HorizontalAlign::Center => "middle".to_string(),
                crate::primitives::HorizontalAlign::Right => "end".to_string(),
            },
        );
        if rotation_rad != 0.0 {
            self.put(
                &group,
                k,
                i,
                "transform",
                format!(
                    "rotate({} {} {})",
                    fmt_f64(rotation_rad.to_degrees()),
                    fmt_f64(position.x),
                    fmt_f64(position.y)
                ),
            );
        }
        self.root.set_text_content(&group, k, i, text);
    }

    fn clear_surface(&mut self) {
        // Retained content persists; nothing to clear per frame.
    }

    fn resize_surface(&mut self, _width: f64, _height: f64) {}
}

impl PlanBackend for VectorBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Vector
    }

    fn is_retained(&self) -> bool {
        true
    }

    fn begin_plan(&mut self, key: &str, usage: &UsageCounts) -> MathplotResult<()> {
        let pools = [
            (VectorElementKind::Line, usage.lines),
            (VectorElementKind::Polyline, usage.polylines),
            (VectorElementKind::Circle, usage.circles + usage.filled_circles),
            (VectorElementKind::Ellipse, usage.ellipses),
            (VectorElementKind::Path, usage.arcs + usage.joined_areas),
            (VectorElementKind::Polygon, usage.polygons),
            (VectorElementKind::Text, usage.texts),
        ];
        if let Some((kind, n)) = pools.iter().find(|(_, n)| *n > MAX_POOL) {
            warn!(key, ?kind, count = n, "element pool ceiling exceeded");
            return Err(MathplotError::backend(format!(
                "plan '{key}' needs {n} retained elements (max {MAX_POOL})"
            )));
        }

        self.root.ensure_group(key)?;
        // Pre-size pools so application never allocates mid-replay.
        for (kind, n) in pools {
            for index in 0..n as usize {
                self.root.ensure_element(key, kind, index);
            }
        }
        self.current = Some(key.to_string());
        self.cursors.clear();
        Ok(())
    }

    fn end_plan(&mut self, key: &str) {
        for kind in [
            VectorElementKind::Line,
            VectorElementKind::Polyline,
            VectorElementKind::Circle,
            VectorElementKind::Ellipse,
            VectorElementKind::Path,
            VectorElementKind::Polygon,
            VectorElementKind::Text,
        ] {
            let active = self.cursors.get(&kind).copied().unwrap_or(0);
            self.root.set_active_count(key, kind, active);
        }
        self.current = None;
    }

    fn set_plan_transform(&mut self, key: &str, scale: f64, tx: f64, ty: f64) -> bool {
        self.root.set_group_transform(key, scale, tx, ty);
        true
    }

    fn raise_plan(&mut self, key: &str) {
        self.root.raise_group(key);
    }

    fn release_plan(&mut self, key: &str) {
        self.root.drop_group(key);
        self.attr_cache.retain(|(group, _, _, _), _| group != key);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/vector.rs"]
mod tests;
