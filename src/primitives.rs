//! The abstract primitive vocabulary every backend implements.
//!
//! Drawable renderers and replayed plans only ever talk to this trait; the
//! three backends translate the calls into their own surface models.

use crate::foundation::core::Point;

/// Line join style for stroked paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineJoin {
    /// Sharp corners.
    Miter,
    /// Rounded corners.
    Round,
    /// Cut-off corners.
    Bevel,
}

/// Line cap style for stroked paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LineCap {
    /// Flat end at the endpoint.
    Butt,
    /// Rounded end.
    Round,
    /// Flat end extended by half the width.
    Square,
}

/// Stroke appearance for line-like primitives.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// CSS-style color string (`#rrggbb`, `rgb(..)`, or a named color).
    pub color: String,
    /// Stroke width in pixels.
    pub width: f64,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
}

impl StrokeStyle {
    /// A solid stroke with round joins and caps.
    pub fn solid(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
            line_join: LineJoin::Round,
            line_cap: LineCap::Round,
        }
    }
}

/// Fill appearance for area-like primitives.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillStyle {
    /// CSS-style color string.
    pub color: String,
    /// Fill opacity in [0, 1], applied on top of any alpha in `color`.
    pub opacity: f64,
}

impl FillStyle {
    /// An opaque fill.
    pub fn opaque(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            opacity: 1.0,
        }
    }
}

/// Font weight for text primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Font description for text primitives.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontStyle {
    pub family: String,
    /// Size in screen pixels.
    pub size_px: f64,
    pub weight: FontWeight,
}

/// Horizontal text anchoring relative to the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical text anchoring relative to the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum VerticalAlign {
    Top,
    Middle,
    Baseline,
    Bottom,
}

/// Combined text anchoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TextAlignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl TextAlignment {
    /// Center in both axes.
    pub const CENTER: Self = Self {
        horizontal: HorizontalAlign::Center,
        vertical: VerticalAlign::Middle,
    };
}

/// The capability set every rendering backend implements.
///
/// All positions are screen-space pixels by the time they reach this trait;
/// the `screen_space` flags only mark primitives that were *authored* in
/// screen space and therefore must not be re-projected when the view
/// transform changes.
pub trait RendererPrimitives {
    /// Stroke a single line segment.
    fn stroke_line(&mut self, start: Point, end: Point, stroke: &StrokeStyle);

    /// Stroke an open polyline through `points`.
    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle);

    /// Stroke a circle outline.
    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle);

    /// Fill a circle, optionally stroking its outline.
    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        screen_space: bool,
    );

    /// Stroke an axis-aligned ellipse rotated by `rotation_rad`.
    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        rotation_rad: f64,
        stroke: &StrokeStyle,
    );

    /// Fill a closed polygon, optionally stroking its outline.
    fn fill_polygon(
        &mut self,
        points: &[Point],
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        screen_space: bool,
    );

    /// Fill the region enclosed by a forward path followed by a reverse path.
    fn fill_joined_area(&mut self, forward: &[Point], reverse: &[Point], fill: &FillStyle);

    /// Stroke a circular arc between two angles.
    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle_rad: f64,
        end_angle_rad: f64,
        sweep_clockwise: bool,
        stroke: &StrokeStyle,
        screen_space: bool,
    );

    /// Draw a single line of text anchored at `position`.
    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        font: &FontStyle,
        color: &str,
        alignment: TextAlignment,
        rotation_rad: f64,
        screen_space: bool,
    );

    /// Clear the whole surface.
    fn clear_surface(&mut self);

    /// Resize the surface to the given pixel dimensions.
    fn resize_surface(&mut self, width: f64, height: f64);

    /// Mark the start of one logical drawable's primitives.
    fn begin_shape(&mut self) {}

    /// Mark the end of one logical drawable's primitives.
    fn end_shape(&mut self) {}

    /// Mark the start of a draw pass.
    fn begin_frame(&mut self) {}

    /// Mark the end of a draw pass.
    fn end_frame(&mut self) {}

    /// Mark the start of a replayed plan batch.
    fn begin_batch(&mut self) {}

    /// Mark the end of a replayed plan batch.
    fn end_batch(&mut self) {}
}
