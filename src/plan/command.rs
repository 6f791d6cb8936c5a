//! Recorded primitive commands.
//!
//! Each command keeps its math-space payload next to the screen-space
//! projection it was last rendered with. Repositioning a plan under a new
//! view transform rewrites only the screen side; math payloads are fixed at
//! build time. Commands authored in screen space carry no math payload and
//! are never reprojected.

use crate::foundation::core::Point;
use crate::mapper::MapState;
use crate::primitives::{FillStyle, FontStyle, StrokeStyle, TextAlignment};

/// Project a math point through a transform snapshot.
pub(crate) fn project(state: &MapState, p: Point) -> Point {
    Point::new(
        state.origin_x + p.x * state.scale + state.offset_x,
        state.origin_y - p.y * state.scale + state.offset_y,
    )
}

/// Invert [`project`].
pub(crate) fn unproject(state: &MapState, p: Point) -> Point {
    Point::new(
        (p.x - state.origin_x - state.offset_x) / state.scale,
        (state.origin_y + state.offset_y - p.y) / state.scale,
    )
}

#[derive(Clone, Debug)]
pub(crate) enum PlanCommand {
    Line {
        math: (Point, Point),
        screen: (Point, Point),
        stroke: StrokeStyle,
    },
    Polyline {
        math: Vec<Point>,
        screen: Vec<Point>,
        stroke: StrokeStyle,
    },
    StrokeCircle {
        math_center: Point,
        math_radius: f64,
        screen_center: Point,
        screen_radius: f64,
        stroke: StrokeStyle,
    },
    FillCircle {
        /// Absent for screen-space circles.
        math: Option<(Point, f64)>,
        screen_center: Point,
        screen_radius: f64,
        fill: FillStyle,
        stroke: Option<StrokeStyle>,
    },
    Ellipse {
        math_center: Point,
        math_radius_x: f64,
        math_radius_y: f64,
        rotation_rad: f64,
        screen_center: Point,
        screen_radius_x: f64,
        screen_radius_y: f64,
        stroke: StrokeStyle,
    },
    Polygon {
        math: Option<Vec<Point>>,
        screen: Vec<Point>,
        fill: FillStyle,
        stroke: Option<StrokeStyle>,
    },
    JoinedArea {
        math_forward: Vec<Point>,
        math_reverse: Vec<Point>,
        screen_forward: Vec<Point>,
        screen_reverse: Vec<Point>,
        fill: FillStyle,
    },
    Arc {
        math: Option<(Point, f64)>,
        screen_center: Point,
        screen_radius: f64,
        start_angle_rad: f64,
        end_angle_rad: f64,
        sweep_clockwise: bool,
        stroke: StrokeStyle,
    },
    Text {
        math_position: Option<Point>,
        screen_position: Point,
        text: String,
        font: FontStyle,
        /// Font size at the plan's base scale; the live size in `font`
        /// follows the zoom ratio.
        base_size_px: f64,
        color: String,
        alignment: TextAlignment,
        rotation_rad: f64,
    },
}

impl PlanCommand {
    /// Rewrite the screen-space side for a new transform snapshot.
    ///
    /// `scale_ratio` is `state.scale / base_scale` and only matters for
    /// zoom-following font sizes, which shrink on zoom-out per
    /// [`crate::reference::zoom_scaled_font_px`].
    pub(crate) fn reproject(
        &mut self,
        state: &MapState,
        scale_ratio: f64,
        label_min_px: f64,
        label_vanish_px: f64,
    ) {
        match self {
            PlanCommand::Line { math, screen, .. } => {
                *screen = (project(state, math.0), project(state, math.1));
            }
            PlanCommand::Polyline { math, screen, .. } => {
                screen.clear();
                screen.extend(math.iter().map(|p| project(state, *p)));
            }
            PlanCommand::StrokeCircle {
                math_center,
                math_radius,
                screen_center,
                screen_radius,
                ..
            } => {
                *screen_center = project(state, *math_center);
                *screen_radius = *math_radius * state.scale;
            }
            PlanCommand::FillCircle {
                math,
                screen_center,
                screen_radius,
                ..
            } => {
                if let Some((c, r)) = math {
                    *screen_center = project(state, *c);
                    *screen_radius = *r * state.scale;
                }
            }
            PlanCommand::Ellipse {
                math_center,
                math_radius_x,
                math_radius_y,
                screen_center,
                screen_radius_x,
                screen_radius_y,
                ..
            } => {
                *screen_center = project(state, *math_center);
                *screen_radius_x = *math_radius_x * state.scale;
                *screen_radius_y = *math_radius_y * state.scale;
            }
            PlanCommand::Polygon { math, screen, .. } => {
                if let Some(math) = math {
                    screen.clear();
                    screen.extend(math.iter().map(|p| project(state, *p)));
                }
            }
            PlanCommand::JoinedArea {
                math_forward,
                math_reverse,
                screen_forward,
                screen_reverse,
                ..
            } => {
                screen_forward.clear();
                screen_forward.extend(math_forward.iter().map(|p| project(state, *p)));
                screen_reverse.clear();
                screen_reverse.extend(math_reverse.iter().map(|p| project(state, *p)));
            }
            PlanCommand::Arc {
                math,
                screen_center,
                screen_radius,
                ..
            } => {
                if let Some((c, r)) = math {
                    *screen_center = project(state, *c);
                    *screen_radius = *r * state.scale;
                }
            }
            PlanCommand::Text {
                math_position,
                screen_position,
                font,
                base_size_px,
                ..
            } => {
                if let Some(p) = math_position {
                    *screen_position = project(state, *p);
                    font.size_px = crate::reference::zoom_scaled_font_px(
                        *base_size_px,
                        scale_ratio,
                        label_min_px,
                        label_vanish_px,
                    );
                }
            }
        }
    }

    /// Accumulate this command's screen-space extent into `(min, max)`.
    pub(crate) fn extend_bounds(&self, min: &mut Point, max: &mut Point) {
        let mut take = |p: Point| {
            if p.x.is_finite() && p.y.is_finite() {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
        };
        match self {
            PlanCommand::Line { screen, .. } => {
                take(screen.0);
                take(screen.1);
            }
            PlanCommand::Polyline { screen, .. } => {
                for p in screen {
                    take(*p);
                }
            }
            PlanCommand::StrokeCircle {
                screen_center,
                screen_radius,
                ..
            }
            | PlanCommand::FillCircle {
                screen_center,
                screen_radius,
                ..
            }
            | PlanCommand::Arc {
                screen_center,
                screen_radius,
                ..
            } => {
                let r = screen_radius.abs();
                take(Point::new(screen_center.x - r, screen_center.y - r));
                take(Point::new(screen_center.x + r, screen_center.y + r));
            }
            PlanCommand::Ellipse {
                screen_center,
                screen_radius_x,
                screen_radius_y,
                ..
            } => {
                let r = screen_radius_x.abs().max(screen_radius_y.abs());
                take(Point::new(screen_center.x - r, screen_center.y - r));
                take(Point::new(screen_center.x + r, screen_center.y + r));
            }
            PlanCommand::Polygon { screen, .. } => {
                for p in screen {
                    take(*p);
                }
            }
            PlanCommand::JoinedArea {
                screen_forward,
                screen_reverse,
                ..
            } => {
                for p in screen_forward.iter().chain(screen_reverse.iter()) {
                    take(*p);
                }
            }
            PlanCommand::Text {
                screen_position, ..
            } => take(*screen_position),
        }
    }
}
