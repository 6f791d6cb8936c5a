//! A [`RendererPrimitives`] implementation that records commands for a plan.

use crate::foundation::core::Point;
use crate::mapper::MapState;
use crate::plan::command::{PlanCommand, unproject};
use crate::primitives::{
    FillStyle, FontStyle, RendererPrimitives, StrokeStyle, TextAlignment,
};

/// Per-kind primitive counts, used by retained backends to pre-size their
/// element pools before a plan is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsageCounts {
    pub lines: u32,
    pub polylines: u32,
    pub circles: u32,
    pub filled_circles: u32,
    pub ellipses: u32,
    pub polygons: u32,
    pub joined_areas: u32,
    pub arcs: u32,
    pub texts: u32,
}

/// Records primitive calls into a command list, unprojecting screen input
/// back to math space through the build-time transform so the plan can be
/// repositioned later.
pub(crate) struct RecordingPrimitives {
    state: MapState,
    pub(crate) commands: Vec<PlanCommand>,
    pub(crate) usage: UsageCounts,
    pub(crate) saw_screen_space: bool,
}

impl RecordingPrimitives {
    pub(crate) fn new(state: MapState) -> Self {
        Self {
            state,
            commands: Vec::new(),
            usage: UsageCounts::default(),
            saw_screen_space: false,
        }
    }

    fn unproject_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| unproject(&self.state, *p)).collect()
    }
}

impl RendererPrimitives for RecordingPrimitives {
    fn stroke_line(&mut self, start: Point, end: Point, stroke: &StrokeStyle) {
        self.usage.lines += 1;
        self.commands.push(PlanCommand::Line {
            math: (unproject(&self.state, start), unproject(&self.state, end)),
            screen: (start, end),
            stroke: stroke.clone(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        self.usage.polylines += 1;
        self.commands.push(PlanCommand::Polyline {
            math: self.unproject_points(points),
            screen: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &StrokeStyle) {
        self.usage.circles += 1;
        self.commands.push(PlanCommand::StrokeCircle {
            math_center: unproject(&self.state, center),
            math_radius: radius / self.state.scale,
            screen_center: center,
            screen_radius: radius,
            stroke: stroke.clone(),
        });
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        screen_space: bool,
    ) {
        self.usage.filled_circles += 1;
        self.saw_screen_space |= screen_space;
        let math = if screen_space {
            None
        } else {
            Some((unproject(&self.state, center), radius / self.state.scale))
        };
        self.commands.push(PlanCommand::FillCircle {
            math,
            screen_center: center,
            screen_radius: radius,
            fill: fill.clone(),
            stroke: stroke.cloned(),
        });
    }

    fn stroke_ellipse(
        &mut self,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        rotation_rad: f64,
        stroke: &StrokeStyle,
    ) {
        self.usage.ellipses += 1;
        self.commands.push(PlanCommand::Ellipse {
            math_center: unproject(&self.state, center),
            math_radius_x: radius_x / self.state.scale,
            math_radius_y: radius_y / self.state.scale,
            rotation_rad,
            screen_center: center,
            screen_radius_x: radius_x,
            screen_radius_y: radius_y,
            stroke: stroke.clone(),
        });
    }

    fn fill_polygon(
        &mut self,
        points: &[Point],
        fill: &FillStyle,
        stroke: Option<&StrokeStyle>,
        screen_space: bool,
    ) {
        if points.len() < 2 {
            return;
        }
        self.usage.polygons += 1;
        self.saw_screen_space |= screen_space;
        let math = if screen_space {
            None
        } else {
            Some(self.unproject_points(points))
        };
        self.commands.push(PlanCommand::Polygon {
            math,
            screen: points.to_vec(),
            fill: fill.clone(),
            stroke: stroke.cloned(),
        });
    }

    fn fill_joined_area(&mut self, forward: &[Point], reverse: &[Point], fill: &FillStyle) {
        if forward.len() < 2 || reverse.is_empty() {
            return;
        }
        self.usage.joined_areas += 1;
        self.commands.push(PlanCommand::JoinedArea {
            math_forward: self.unproject_points(forward),
            math_reverse: self.unproject_points(reverse),
            screen_forward: forward.to_vec(),
            screen_reverse: reverse.to_vec(),
            fill: fill.clone(),
        });
    }

    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle_rad: f64,
        end_angle_rad: f64,
        sweep_clockwise: bool,
        stroke: &StrokeStyle,
        screen_space: bool,
    ) {
        self.usage.arcs += 1;
        self.saw_screen_space |= screen_space;
        let math = if screen_space {
            None
        } else {
            Some((unproject(&self.state, center), radius / self.state.scale))
        };
        self.commands.push(PlanCommand::Arc {
            math,
            screen_center: center,
            screen_radius: radius,
            start_angle_rad,
            end_angle_rad,
            sweep_clockwise,
            stroke: stroke.clone(),
        });
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        font: &FontStyle,
        color: &str,
        alignment: TextAlignment,
        rotation_rad: f64,
        screen_space: bool,
    ) {
        self.usage.texts += 1;
        self.saw_screen_space |= screen_space;
        let math_position = if screen_space {
            None
        } else {
            Some(unproject(&self.state, position))
        };
        self.commands.push(PlanCommand::Text {
            math_position,
            screen_position: position,
            text: text.to_string(),
            font: font.clone(),
            base_size_px: font.size_px,
            color: color.to_string(),
            alignment,
            rotation_rad,
        });
    }

    fn clear_surface(&mut self) {
        // Plans never record whole-surface operations.
    }

    fn resize_surface(&mut self, _width: f64, _height: f64) {}
}
