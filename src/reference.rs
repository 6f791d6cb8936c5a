//! Shared reference renderers: one pure function per drawable kind.
//!
//! These are the visual ground truth. They take a drawable, a mapper, and a
//! style configuration and issue ordered primitive calls with no caching.
//! The plan engine records exactly these calls; tests compare optimized
//! output against them.
//!
//! Degenerate geometry (non-finite coordinates, non-positive radii,
//! zero-length segments) renders as a no-op or a harmless degenerate shape,
//! never an error.

use std::f64::consts::{PI, TAU};

use crate::curve::{DEFAULT_MAX_POINTS, build_function_paths, build_parametric_path};
use crate::drawable::{Drawable, DrawableKind};
use crate::foundation::core::Point;
use crate::mapper::CoordinateMapper;
use crate::primitives::{
    FillStyle, FontStyle, FontWeight, RendererPrimitives, StrokeStyle, TextAlignment,
};
use crate::style::StyleConfig;

/// Render one drawable through the primitive interface.
pub fn render_drawable(
    out: &mut dyn RendererPrimitives,
    drawable: &Drawable,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    out.begin_shape();
    match &drawable.kind {
        DrawableKind::Point { x, y } => render_point(out, *x, *y, mapper, style),
        DrawableKind::Segment { x1, y1, x2, y2 } => {
            render_segment(out, *x1, *y1, *x2, *y2, mapper, style);
        }
        DrawableKind::Circle { cx, cy, radius } => {
            render_circle(out, *cx, *cy, *radius, mapper, style);
        }
        DrawableKind::CircleArc {
            cx,
            cy,
            radius,
            start_angle_rad,
            end_angle_rad,
            use_major_arc,
        } => render_circle_arc(
            out,
            *cx,
            *cy,
            *radius,
            *start_angle_rad,
            *end_angle_rad,
            *use_major_arc,
            mapper,
            style,
        ),
        DrawableKind::Ellipse {
            cx,
            cy,
            radius_x,
            radius_y,
            rotation_rad,
        } => render_ellipse(out, *cx, *cy, *radius_x, *radius_y, *rotation_rad, mapper, style),
        DrawableKind::Vector { x1, y1, x2, y2 } => {
            render_vector(out, *x1, *y1, *x2, *y2, mapper, style);
        }
        DrawableKind::Angle {
            vx,
            vy,
            ax,
            ay,
            bx,
            by,
        } => render_angle(out, *vx, *vy, *ax, *ay, *bx, *by, mapper, style),
        DrawableKind::Function {
            eval,
            left_bound,
            right_bound,
            asymptotes,
            ..
        } => render_function(out, eval, *left_bound, *right_bound, asymptotes, mapper, style),
        DrawableKind::ParametricFunction {
            eval_x,
            eval_y,
            t_min,
            t_max,
            ..
        } => render_parametric(out, eval_x, eval_y, *t_min, *t_max, mapper, style),
        DrawableKind::Polygon { points } => render_polygon(out, points, mapper, style),
        DrawableKind::FunctionArea {
            upper,
            lower,
            left,
            right,
            ..
        } => render_function_area(out, upper, lower, *left, *right, mapper, style),
        DrawableKind::Bar { x, width, height } => {
            render_bar(out, *x, *width, *height, mapper, style);
        }
        DrawableKind::Label {
            x,
            y,
            text,
            rotation_rad,
            font_scale,
            screen_space,
        } => render_label(
            out,
            *x,
            *y,
            text,
            *rotation_rad,
            *font_scale,
            *screen_space,
            mapper,
            style,
        ),
    }
    out.end_shape();
}

fn finite2(x: f64, y: f64) -> bool {
    x.is_finite() && y.is_finite()
}

/// Convert a math-space arc to screen convention. Screen y grows downward,
/// so angles negate; the negation already reverses the traversal direction,
/// so the sweep flag carries over unchanged.
fn arc_to_screen(start: f64, end: f64, clockwise: bool) -> (f64, f64, bool) {
    (-start, -end, clockwise)
}

/// Zoom rule for label text. At or above the reference zoom (`ratio >= 1`)
/// the base size holds; below it the size shrinks with the ratio, clamped
/// up to `min_px` while readable and collapsing to zero at `vanish_px`.
/// A zero return means the label is not drawn at all.
pub(crate) fn zoom_scaled_font_px(
    base_px: f64,
    scale_ratio: f64,
    min_px: f64,
    vanish_px: f64,
) -> f64 {
    let ratio = if scale_ratio.is_finite() && scale_ratio > 0.0 {
        scale_ratio.min(1.0)
    } else {
        1.0
    };
    let scaled = base_px * ratio;
    if scaled <= vanish_px {
        0.0
    } else {
        scaled.max(min_px)
    }
}

fn label_font(style: &StyleConfig, size_px: f64) -> FontStyle {
    FontStyle {
        family: style.label_font_family.clone(),
        size_px,
        weight: FontWeight::Normal,
    }
}

fn render_point(
    out: &mut dyn RendererPrimitives,
    x: f64,
    y: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(x, y) || style.point_radius <= 0.0 {
        return;
    }
    let center = mapper.project(Point::new(x, y));
    let radius = mapper.scale_value(style.point_radius);
    out.fill_circle(
        center,
        radius,
        &FillStyle::opaque(style.point_color.clone()),
        None,
        false,
    );
}

fn render_segment(
    out: &mut dyn RendererPrimitives,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(x1, y1) || !finite2(x2, y2) {
        return;
    }
    let stroke = StrokeStyle::solid(style.segment_color.clone(), style.segment_width);
    out.stroke_line(
        mapper.project(Point::new(x1, y1)),
        mapper.project(Point::new(x2, y2)),
        &stroke,
    );
}

fn render_circle(
    out: &mut dyn RendererPrimitives,
    cx: f64,
    cy: f64,
    radius: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(cx, cy) || !radius.is_finite() || radius <= 0.0 {
        return;
    }
    let stroke = StrokeStyle::solid(style.circle_color.clone(), style.segment_width);
    out.stroke_circle(
        mapper.project(Point::new(cx, cy)),
        mapper.scale_value(radius),
        &stroke,
    );
}

#[allow(clippy::too_many_arguments)]
fn render_circle_arc(
    out: &mut dyn RendererPrimitives,
    cx: f64,
    cy: f64,
    radius: f64,
    start_angle_rad: f64,
    end_angle_rad: f64,
    use_major_arc: bool,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(cx, cy)
        || !radius.is_finite()
        || radius <= 0.0
        || !finite2(start_angle_rad, end_angle_rad)
    {
        return;
    }

    // The two angular spans between the boundary points.
    let delta_ccw = (end_angle_rad - start_angle_rad).rem_euclid(TAU);
    let delta_cw = (start_angle_rad - end_angle_rad).rem_euclid(TAU);

    // Minor arc sweeps counter-clockwise across the smaller span; major arc
    // sweeps clockwise across the complement.
    let (from, to, clockwise) = if delta_ccw <= delta_cw {
        if use_major_arc {
            (start_angle_rad, end_angle_rad, true)
        } else {
            (start_angle_rad, end_angle_rad, false)
        }
    } else if use_major_arc {
        (end_angle_rad, start_angle_rad, true)
    } else {
        (end_angle_rad, start_angle_rad, false)
    };

    let stroke = StrokeStyle::solid(style.circle_color.clone(), style.segment_width);
    let (s, e, cw) = arc_to_screen(from, to, clockwise);
    out.stroke_arc(
        mapper.project(Point::new(cx, cy)),
        mapper.scale_value(radius),
        s,
        e,
        cw,
        &stroke,
        false,
    );
}

#[allow(clippy::too_many_arguments)]
fn render_ellipse(
    out: &mut dyn RendererPrimitives,
    cx: f64,
    cy: f64,
    radius_x: f64,
    radius_y: f64,
    rotation_rad: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(cx, cy)
        || !finite2(radius_x, radius_y)
        || radius_x <= 0.0
        || radius_y <= 0.0
        || !rotation_rad.is_finite()
    {
        return;
    }
    let stroke = StrokeStyle::solid(style.circle_color.clone(), style.segment_width);
    out.stroke_ellipse(
        mapper.project(Point::new(cx, cy)),
        mapper.scale_value(radius_x),
        mapper.scale_value(radius_y),
        -rotation_rad,
        &stroke,
    );
}

fn render_vector(
    out: &mut dyn RendererPrimitives,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(x1, y1) || !finite2(x2, y2) {
        return;
    }
    let start = mapper.project(Point::new(x1, y1));
    let end = mapper.project(Point::new(x2, y2));
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len = dx.hypot(dy);
    if len <= 0.0 {
        return;
    }

    let tip = mapper.scale_value(style.vector_tip_size).abs();
    // Isosceles arrowhead: edge length `tip`, height clamped to the shaft.
    let height = (tip * tip - (tip / 2.0) * (tip / 2.0)).max(0.0).sqrt().min(len);
    let ux = dx / len;
    let uy = dy / len;
    let base = Point::new(end.x - ux * height, end.y - uy * height);

    let stroke = StrokeStyle::solid(style.vector_color.clone(), style.segment_width);
    out.stroke_line(start, base, &stroke);

    let half = tip / 2.0;
    let px = -uy;
    let py = ux;
    let head = [
        end,
        Point::new(base.x + px * half, base.y + py * half),
        Point::new(base.x - px * half, base.y - py * half),
    ];
    out.fill_polygon(
        &head,
        &FillStyle::opaque(style.vector_color.clone()),
        None,
        false,
    );
}

#[allow(clippy::too_many_arguments)]
fn render_angle(
    out: &mut dyn RendererPrimitives,
    vx: f64,
    vy: f64,
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(vx, vy) || !finite2(ax, ay) || !finite2(bx, by) {
        return;
    }
    let len_a = (ax - vx).hypot(ay - vy);
    let len_b = (bx - vx).hypot(by - vy);
    if len_a <= 0.0 || len_b <= 0.0 {
        return;
    }

    let theta_a = (ay - vy).atan2(ax - vx);
    let theta_b = (by - vy).atan2(bx - vx);

    // Always mark the smaller span between the arms.
    let delta_ccw = (theta_b - theta_a).rem_euclid(TAU);
    let (from, span) = if delta_ccw <= PI {
        (theta_a, delta_ccw)
    } else {
        (theta_b, TAU - delta_ccw)
    };
    if span <= 0.0 {
        return;
    }

    // Arc radius clamps to the shorter arm so the mark stays inside.
    let radius = style.angle_arc_radius.min(len_a).min(len_b);
    if radius <= 0.0 {
        return;
    }

    let stroke = StrokeStyle::solid(style.angle_color.clone(), style.segment_width);
    let (s, e, cw) = arc_to_screen(from, from + span, false);
    out.stroke_arc(
        mapper.project(Point::new(vx, vy)),
        mapper.scale_value(radius),
        s,
        e,
        cw,
        &stroke,
        false,
    );

    let bisector = from + span / 2.0;
    let text_radius = radius * style.angle_text_arc_radius_factor;
    let pos = Point::new(
        vx + text_radius * bisector.cos(),
        vy + text_radius * bisector.sin(),
    );
    let degrees = span.to_degrees();
    let font = label_font(style, style.label_font_size.max(style.min_label_font_px));
    out.draw_text(
        &format!("{degrees:.0}\u{b0}"),
        mapper.project(pos),
        &font,
        &style.angle_color,
        TextAlignment::CENTER,
        0.0,
        false,
    );
}

fn render_function(
    out: &mut dyn RendererPrimitives,
    eval: &crate::drawable::CurveFn,
    left_bound: Option<f64>,
    right_bound: Option<f64>,
    asymptotes: &[f64],
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    let mut left = mapper.visible_left_bound();
    let mut right = mapper.visible_right_bound();
    if let Some(lb) = left_bound {
        left = left.max(lb);
    }
    if let Some(rb) = right_bound {
        right = right.min(rb);
    }

    let stroke = StrokeStyle::solid(style.function_color.clone(), style.function_width);
    for path in build_function_paths(eval, left, right, asymptotes, DEFAULT_MAX_POINTS) {
        let screen: Vec<Point> = path.iter().map(|p| mapper.project(*p)).collect();
        out.stroke_polyline(&screen, &stroke);
    }
}

fn render_parametric(
    out: &mut dyn RendererPrimitives,
    eval_x: &crate::drawable::CurveFn,
    eval_y: &crate::drawable::CurveFn,
    t_min: f64,
    t_max: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    let path = build_parametric_path(eval_x, eval_y, t_min, t_max, DEFAULT_MAX_POINTS);
    if path.len() < 2 {
        return;
    }
    let screen: Vec<Point> = path.iter().map(|p| mapper.project(*p)).collect();
    let stroke = StrokeStyle::solid(style.function_color.clone(), style.function_width);
    out.stroke_polyline(&screen, &stroke);
}

fn render_polygon(
    out: &mut dyn RendererPrimitives,
    points: &[(f64, f64)],
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if points.len() < 3 || points.iter().any(|(x, y)| !finite2(*x, *y)) {
        return;
    }
    let screen: Vec<Point> = points
        .iter()
        .map(|(x, y)| mapper.project(Point::new(*x, *y)))
        .collect();
    let fill = FillStyle {
        color: style.area_fill_color.clone(),
        opacity: style.area_fill_opacity,
    };
    let stroke = StrokeStyle::solid(style.segment_color.clone(), 1.0);
    out.fill_polygon(&screen, &fill, Some(&stroke), false);
}

fn render_function_area(
    out: &mut dyn RendererPrimitives,
    upper: &crate::drawable::CurveFn,
    lower: &crate::drawable::CurveFn,
    left: f64,
    right: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(left, right) || right <= left {
        return;
    }
    let upper_paths = build_function_paths(upper, left, right, &[], DEFAULT_MAX_POINTS);
    let lower_paths = build_function_paths(lower, left, right, &[], DEFAULT_MAX_POINTS);

    let forward: Vec<Point> = upper_paths
        .iter()
        .flatten()
        .map(|p| mapper.project(*p))
        .collect();
    let mut reverse: Vec<Point> = lower_paths
        .iter()
        .flatten()
        .map(|p| mapper.project(*p))
        .collect();
    reverse.reverse();

    if forward.len() < 2 || reverse.is_empty() {
        return;
    }
    let fill = FillStyle {
        color: style.area_fill_color.clone(),
        opacity: style.area_fill_opacity,
    };
    out.fill_joined_area(&forward, &reverse, &fill);
}

fn render_bar(
    out: &mut dyn RendererPrimitives,
    x: f64,
    width: f64,
    height: f64,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(x, width) || !height.is_finite() || width <= 0.0 || height == 0.0 {
        return;
    }
    let half = width / 2.0;
    let corners = [
        (x - half, 0.0),
        (x + half, 0.0),
        (x + half, height),
        (x - half, height),
    ];
    let screen: Vec<Point> = corners
        .iter()
        .map(|(px, py)| mapper.project(Point::new(*px, *py)))
        .collect();
    let fill = FillStyle::opaque(style.bar_fill_color.clone());
    out.fill_polygon(&screen, &fill, None, false);
}

#[allow(clippy::too_many_arguments)]
fn render_label(
    out: &mut dyn RendererPrimitives,
    x: f64,
    y: f64,
    text: &str,
    rotation_rad: f64,
    font_scale: f64,
    screen_space: bool,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    if !finite2(x, y) || !font_scale.is_finite() || font_scale <= 0.0 {
        return;
    }
    let size_px = zoom_scaled_font_px(
        style.label_font_size * font_scale,
        1.0,
        style.min_label_font_px,
        style.label_vanish_threshold_px,
    );
    // Vanish rather than draw unreadable glyphs.
    if size_px <= 0.0 {
        return;
    }

    let anchor = if screen_space {
        Point::new(x, y)
    } else {
        mapper.project(Point::new(x, y))
    };
    let font = label_font(style, size_px);
    let line_height = 1.2 * size_px;

    for (i, line) in text.split('\n').enumerate() {
        let pos = Point::new(anchor.x, anchor.y + i as f64 * line_height);
        out.draw_text(
            line,
            pos,
            &font,
            &style.label_color,
            TextAlignment::CENTER,
            rotation_rad,
            screen_space,
        );
    }
}

/// Tick spacing for the current zoom: the smallest value from the 1-2-5
/// ladder (times the default spacing's magnitude) that keeps ticks at least
/// `MIN_TICK_PX` apart on screen.
pub fn current_tick_spacing(scale: f64, default_spacing: f64) -> f64 {
    const MIN_TICK_PX: f64 = 40.0;
    if !scale.is_finite() || scale <= 0.0 || !default_spacing.is_finite() || default_spacing <= 0.0
    {
        return default_spacing.max(1.0);
    }
    let raw = MIN_TICK_PX / scale;
    let base = default_spacing * 10f64.powf((raw / default_spacing).log10().floor());
    for mult in [1.0, 2.0, 5.0, 10.0] {
        let candidate = base * mult;
        if candidate * scale >= MIN_TICK_PX {
            return candidate;
        }
    }
    base * 10.0
}

/// Format a tick value for the given spacing: fixed precision derived from
/// the spacing, scientific notation for extreme magnitudes.
pub fn format_tick_label(value: f64, spacing: f64) -> String {
    let v = if value == 0.0 { 0.0 } else { value };
    if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-4) {
        return format!("{v:.1e}");
    }
    let precision = (-spacing.log10()).ceil().max(0.0) as usize;
    format!("{v:.precision$}")
}

/// Draw the cartesian grid, axes, and tick labels for the visible region.
pub fn render_cartesian_grid(
    out: &mut dyn RendererPrimitives,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    let spacing = current_tick_spacing(mapper.scale_factor(), style.grid_default_tick_spacing);
    let left = mapper.visible_left_bound();
    let right = mapper.visible_right_bound();
    let top = mapper.visible_top_bound();
    let bottom = mapper.visible_bottom_bound();

    let grid = StrokeStyle::solid(style.grid_color.clone(), 1.0);
    let axis = StrokeStyle::solid(style.axis_color.clone(), 1.5);
    let font = label_font(style, style.label_font_size.max(style.min_label_font_px));

    let is_axis = |v: f64| v.abs() < spacing * 1e-9;

    let mut x = (left / spacing).floor() * spacing;
    while x <= right {
        let stroke = if is_axis(x) { &axis } else { &grid };
        out.stroke_line(
            mapper.project(Point::new(x, bottom)),
            mapper.project(Point::new(x, top)),
            stroke,
        );
        if !is_axis(x) {
            out.draw_text(
                &format_tick_label(x, spacing),
                mapper.project(Point::new(x, 0.0)),
                &font,
                &style.axis_label_color,
                TextAlignment::CENTER,
                0.0,
                false,
            );
        }
        x += spacing;
    }

    let mut y = (bottom / spacing).floor() * spacing;
    while y <= top {
        let stroke = if is_axis(y) { &axis } else { &grid };
        out.stroke_line(
            mapper.project(Point::new(left, y)),
            mapper.project(Point::new(right, y)),
            stroke,
        );
        if !is_axis(y) {
            out.draw_text(
                &format_tick_label(y, spacing),
                mapper.project(Point::new(0.0, y)),
                &font,
                &style.axis_label_color,
                TextAlignment::CENTER,
                0.0,
                false,
            );
        }
        y += spacing;
    }
}

/// Draw concentric rings at the current tick spacing plus radial spokes
/// every 30 degrees.
pub fn render_polar_grid(
    out: &mut dyn RendererPrimitives,
    mapper: &CoordinateMapper,
    style: &StyleConfig,
) {
    let spacing = current_tick_spacing(mapper.scale_factor(), style.grid_default_tick_spacing);
    let left = mapper.visible_left_bound();
    let right = mapper.visible_right_bound();
    let top = mapper.visible_top_bound();
    let bottom = mapper.visible_bottom_bound();
    let max_radius = [left, right]
        .into_iter()
        .flat_map(|x| [top, bottom].into_iter().map(move |y| x.hypot(y)))
        .fold(0.0_f64, f64::max);

    let stroke = StrokeStyle::solid(style.polar_axis_color.clone(), 1.0);
    let center = mapper.project(Point::new(0.0, 0.0));

    let mut r = spacing;
    while r <= max_radius {
        out.stroke_circle(center, mapper.scale_value(r), &stroke);
        r += spacing;
    }

    for i in 0..12 {
        let theta = f64::from(i) * PI / 6.0;
        let end = Point::new(max_radius * theta.cos(), max_radius * theta.sin());
        out.stroke_line(center, mapper.project(end), &stroke);
    }
}

#[cfg(test)]
#[path = "../tests/unit/reference.rs"]
mod tests;
