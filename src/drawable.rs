//! The closed drawable vocabulary and its geometry/style signatures.
//!
//! Drawables are owned by the surrounding application; the engine sees them
//! as immutable values for the duration of a draw pass. Kind selection is a
//! closed enum so builder dispatch is a `match`, resolved at compile time
//! rather than through type-name strings.

use std::fmt;
use std::sync::Arc;

use crate::foundation::math::{Fnv1a64, quant4};
use crate::style::StyleConfig;

/// Shared scalar function `f(v) -> f64` used by curve drawables.
#[derive(Clone)]
pub struct CurveFn(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl CurveFn {
    /// Wrap a closure as a curve evaluator.
    pub fn new(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate at `v`.
    pub fn eval(&self, v: f64) -> f64 {
        (self.0)(v)
    }
}

impl fmt::Debug for CurveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CurveFn")
    }
}

/// A named drawable: stable name (the plan cache key) plus kind payload.
#[derive(Clone, Debug)]
pub struct Drawable {
    /// Unique name within the workspace; plans are cached per name.
    pub name: String,
    /// Kind payload.
    pub kind: DrawableKind,
}

impl Drawable {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, kind: DrawableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Geometry payload per drawable kind. Coordinates are math-space.
#[derive(Clone, Debug)]
pub enum DrawableKind {
    /// A point marker.
    Point {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
    /// A straight segment between two endpoints.
    Segment {
        /// First endpoint x.
        x1: f64,
        /// First endpoint y.
        y1: f64,
        /// Second endpoint x.
        x2: f64,
        /// Second endpoint y.
        y2: f64,
    },
    /// A circle outline.
    Circle {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius in math units.
        radius: f64,
    },
    /// An arc of a circle between two boundary angles.
    CircleArc {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius in math units.
        radius: f64,
        /// Angle of the first boundary point, radians counter-clockwise.
        start_angle_rad: f64,
        /// Angle of the second boundary point, radians counter-clockwise.
        end_angle_rad: f64,
        /// Sweep across the larger of the two angular spans.
        use_major_arc: bool,
    },
    /// An ellipse outline.
    Ellipse {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Semi-axis along x before rotation.
        radius_x: f64,
        /// Semi-axis along y before rotation.
        radius_y: f64,
        /// Counter-clockwise rotation of the axes.
        rotation_rad: f64,
    },
    /// A directed segment drawn with an arrowhead at the tip.
    Vector {
        /// Tail x.
        x1: f64,
        /// Tail y.
        y1: f64,
        /// Tip x.
        x2: f64,
        /// Tip y.
        y2: f64,
    },
    /// An angle mark at the vertex between the rays toward two arm points.
    Angle {
        /// Vertex x.
        vx: f64,
        /// Vertex y.
        vy: f64,
        /// First arm point x.
        ax: f64,
        /// First arm point y.
        ay: f64,
        /// Second arm point x.
        bx: f64,
        /// Second arm point y.
        by: f64,
    },
    /// An explicit function `y = f(x)`.
    Function {
        /// Source expression; stands in for the closure in signatures.
        expr: String,
        /// Evaluator for `f(x)`.
        eval: CurveFn,
        /// Optional lower x limit; the visible range applies otherwise.
        left_bound: Option<f64>,
        /// Optional upper x limit; the visible range applies otherwise.
        right_bound: Option<f64>,
        /// Precomputed vertical-asymptote x locations, ascending.
        asymptotes: Vec<f64>,
    },
    /// A parametric curve `(x(t), y(t))` over a finite `t` interval.
    ParametricFunction {
        /// Source expression; stands in for the closures in signatures.
        expr: String,
        /// Evaluator for `x(t)`.
        eval_x: CurveFn,
        /// Evaluator for `y(t)`.
        eval_y: CurveFn,
        /// Start of the parameter interval.
        t_min: f64,
        /// End of the parameter interval.
        t_max: f64,
    },
    /// A filled closed polygon.
    Polygon {
        /// Vertices in drawing order; the last closes back to the first.
        points: Vec<(f64, f64)>,
    },
    /// The filled region between an upper and a lower curve over `[left, right]`.
    FunctionArea {
        /// Source expression of the upper curve.
        upper_expr: String,
        /// Evaluator for the upper curve.
        upper: CurveFn,
        /// Source expression of the lower curve.
        lower_expr: String,
        /// Evaluator for the lower curve.
        lower: CurveFn,
        /// Left x limit of the region.
        left: f64,
        /// Right x limit of the region.
        right: f64,
    },
    /// A vertical bar from the x axis, centered on `x`.
    Bar {
        /// Center of the bar on the x axis.
        x: f64,
        /// Bar width in math units.
        width: f64,
        /// Signed bar height; negative bars extend below the axis.
        height: f64,
    },
    /// A text label, possibly multi-line and rotated.
    Label {
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
        /// Label text; newlines stack lines downward.
        text: String,
        /// Counter-clockwise rotation about the anchor.
        rotation_rad: f64,
        /// Multiplier on the configured font size.
        font_scale: f64,
        /// Positioned in screen pixels rather than math space.
        screen_space: bool,
    },
}

/// 128-bit geometry/style signature. Exact equality only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    hi: u64,
    lo: u64,
}

struct SigWriter {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl SigWriter {
    fn new() -> Self {
        Self {
            a: Fnv1a64::new_default(),
            b: Fnv1a64::new(Fnv1a64::SECOND_SEED),
        }
    }

    fn u8(&mut self, v: u8) {
        self.a.write_u8(v);
        self.b.write_u8(v);
    }

    fn f64(&mut self, v: f64) {
        let bits = quant4(v).to_bits();
        self.a.write_u64(bits);
        self.b.write_u64(bits);
    }

    fn opt_f64(&mut self, v: Option<f64>) {
        match v {
            Some(x) => {
                self.u8(1);
                self.f64(x);
            }
            None => self.u8(0),
        }
    }

    fn str(&mut self, s: &str) {
        self.a.write_u64(s.len() as u64);
        self.b.write_u64(s.len() as u64);
        self.a.write_bytes(s.as_bytes());
        self.b.write_bytes(s.as_bytes());
    }

    fn finish(self) -> Signature {
        Signature {
            hi: self.a.finish(),
            lo: self.b.finish(),
        }
    }
}

impl Drawable {
    /// Derive the signature over every field that affects rendered geometry
    /// or style. The view transform never enters a signature.
    pub fn signature(&self, style: &StyleConfig) -> Signature {
        let mut w = SigWriter::new();
        match &self.kind {
            DrawableKind::Point { x, y } => {
                w.u8(0);
                w.f64(*x);
                w.f64(*y);
                w.f64(style.point_radius);
                w.str(&style.point_color);
            }
            DrawableKind::Segment { x1, y1, x2, y2 } => {
                w.u8(1);
                for v in [x1, y1, x2, y2] {
                    w.f64(*v);
                }
                w.str(&style.segment_color);
                w.f64(style.segment_width);
            }
            DrawableKind::Circle { cx, cy, radius } => {
                w.u8(2);
                w.f64(*cx);
                w.f64(*cy);
                w.f64(*radius);
                w.str(&style.circle_color);
                w.f64(style.segment_width);
            }
            DrawableKind::CircleArc {
                cx,
                cy,
                radius,
                start_angle_rad,
                end_angle_rad,
                use_major_arc,
            } => {
                w.u8(3);
                for v in [cx, cy, radius, start_angle_rad, end_angle_rad] {
                    w.f64(*v);
                }
                w.u8(u8::from(*use_major_arc));
                w.str(&style.circle_color);
                w.f64(style.segment_width);
            }
            DrawableKind::Ellipse {
                cx,
                cy,
                radius_x,
                radius_y,
                rotation_rad,
            } => {
                w.u8(4);
                for v in [cx, cy, radius_x, radius_y, rotation_rad] {
                    w.f64(*v);
                }
                w.str(&style.circle_color);
                w.f64(style.segment_width);
            }
            DrawableKind::Vector { x1, y1, x2, y2 } => {
                w.u8(5);
                for v in [x1, y1, x2, y2] {
                    w.f64(*v);
                }
                w.str(&style.vector_color);
                w.f64(style.vector_tip_size);
                w.f64(style.segment_width);
            }
            DrawableKind::Angle {
                vx,
                vy,
                ax,
                ay,
                bx,
                by,
            } => {
                w.u8(6);
                for v in [vx, vy, ax, ay, bx, by] {
                    w.f64(*v);
                }
                w.str(&style.angle_color);
                w.f64(style.angle_arc_radius);
                w.f64(style.angle_text_arc_radius_factor);
            }
            DrawableKind::Function {
                expr,
                eval: _,
                left_bound,
                right_bound,
                asymptotes,
            } => {
                w.u8(7);
                w.str(expr);
                w.opt_f64(*left_bound);
                w.opt_f64(*right_bound);
                w.a.write_u64(asymptotes.len() as u64);
                w.b.write_u64(asymptotes.len() as u64);
                for a in asymptotes {
                    w.f64(*a);
                }
                w.str(&style.function_color);
                w.f64(style.function_width);
            }
            DrawableKind::ParametricFunction {
                expr,
                eval_x: _,
                eval_y: _,
                t_min,
                t_max,
            } => {
                w.u8(8);
                w.str(expr);
                w.f64(*t_min);
                w.f64(*t_max);
                w.str(&style.function_color);
                w.f64(style.function_width);
            }
            DrawableKind::Polygon { points } => {
                w.u8(9);
                w.a.write_u64(points.len() as u64);
                w.b.write_u64(points.len() as u64);
                for (x, y) in points {
                    w.f64(*x);
                    w.f64(*y);
                }
                w.str(&style.area_fill_color);
                w.f64(style.area_fill_opacity);
            }
            DrawableKind::FunctionArea {
                upper_expr,
                upper: _,
                lower_expr,
                lower: _,
                left,
                right,
            } => {
                w.u8(10);
                w.str(upper_expr);
                w.str(lower_expr);
                w.f64(*left);
                w.f64(*right);
                w.str(&style.area_fill_color);
                w.f64(style.area_fill_opacity);
            }
            DrawableKind::Bar { x, width, height } => {
                w.u8(11);
                w.f64(*x);
                w.f64(*width);
                w.f64(*height);
                w.str(&style.bar_fill_color);
            }
            DrawableKind::Label {
                x,
                y,
                text,
                rotation_rad,
                font_scale,
                screen_space,
            } => {
                w.u8(12);
                w.f64(*x);
                w.f64(*y);
                w.str(text);
                w.f64(*rotation_rad);
                w.f64(*font_scale);
                w.u8(u8::from(*screen_space));
                w.str(&style.label_color);
                w.f64(style.label_font_size);
                w.str(&style.label_font_family);
            }
        }
        w.finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/drawable.rs"]
mod tests;
