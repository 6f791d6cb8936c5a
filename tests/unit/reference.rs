use super::*;
use crate::drawable::{CurveFn, Drawable, DrawableKind};

#[derive(Debug)]
enum Event {
    Line { a: Point, b: Point, width: f64 },
    Polyline { len: usize },
    Circle { center: Point, radius: f64 },
    FillCircle { center: Point, radius: f64 },
    Ellipse { rotation: f64 },
    Polygon { points: Vec<Point> },
    JoinedArea { forward: usize, reverse: usize },
    Arc { start: f64, end: f64, clockwise: bool },
    Text { text: String, pos: Point },
}

#[derive(Default)]
struct EventSink {
    events: Vec<Event>,
}

impl EventSink {
    fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| f(e)).count()
    }
}

impl RendererPrimitives for EventSink {
    fn stroke_line(&mut self, start: Point, end: Point, stroke: &StrokeStyle) {
        self.events.push(Event::Line {
            a: start,
            b: end,
            width: stroke.width,
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], _stroke: &StrokeStyle) {
        self.events.push(Event::Polyline { len: points.len() });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, _stroke: &StrokeStyle) {
        self.events.push(Event::Circle { center, radius });
    }

    fn fill_circle(
        &mut self,
        center: Point,
        radius: f64,
        _fill: &FillStyle,
        _stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        self.events.push(Event::FillCircle { center, radius });
    }

    fn stroke_ellipse(
        &mut self,
        _center: Point,
        _radius_x: f64,
        _radius_y: f64,
        rotation_rad: f64,
        _stroke: &StrokeStyle,
    ) {
        self.events.push(Event::Ellipse {
            rotation: rotation_rad,
        });
    }

    fn fill_polygon(
        &mut self,
        points: &[Point],
        _fill: &FillStyle,
        _stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        self.events.push(Event::Polygon {
            points: points.to_vec(),
        });
    }

    fn fill_joined_area(&mut self, forward: &[Point], reverse: &[Point], _fill: &FillStyle) {
        self.events.push(Event::JoinedArea {
            forward: forward.len(),
            reverse: reverse.len(),
        });
    }

    fn stroke_arc(
        &mut self,
        _center: Point,
        _radius: f64,
        start_angle_rad: f64,
        end_angle_rad: f64,
        sweep_clockwise: bool,
        _stroke: &StrokeStyle,
        _screen_space: bool,
    ) {
        self.events.push(Event::Arc {
            start: start_angle_rad,
            end: end_angle_rad,
            clockwise: sweep_clockwise,
        });
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        _font: &FontStyle,
        _color: &str,
        _alignment: TextAlignment,
        _rotation_rad: f64,
        _screen_space: bool,
    ) {
        self.events.push(Event::Text {
            text: text.to_string(),
            pos: position,
        });
    }

    fn clear_surface(&mut self) {}

    fn resize_surface(&mut self, _width: f64, _height: f64) {}
}

fn mapper() -> CoordinateMapper {
    CoordinateMapper::new(800.0, 600.0, 50.0)
}

fn render(kind: DrawableKind) -> EventSink {
    let mut sink = EventSink::default();
    render_drawable(
        &mut sink,
        &Drawable::new("d", kind),
        &mapper(),
        &StyleConfig::default(),
    );
    sink
}

#[test]
fn point_projects_through_the_mapper() {
    let sink = render(DrawableKind::Point { x: 1.0, y: 2.0 });
    match &sink.events[..] {
        [Event::FillCircle { center, radius }] => {
            assert!((center.x - 450.0).abs() < 1e-9);
            assert!((center.y - 200.0).abs() < 1e-9);
            assert!((radius - 5.0).abs() < 1e-9);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn degenerate_inputs_render_nothing() {
    let degenerate = [
        DrawableKind::Point {
            x: f64::NAN,
            y: 0.0,
        },
        DrawableKind::Segment {
            x1: 0.0,
            y1: f64::INFINITY,
            x2: 1.0,
            y2: 1.0,
        },
        DrawableKind::Circle {
            cx: 0.0,
            cy: 0.0,
            radius: 0.0,
        },
        DrawableKind::Ellipse {
            cx: 0.0,
            cy: 0.0,
            radius_x: -1.0,
            radius_y: 1.0,
            rotation_rad: 0.0,
        },
        DrawableKind::Vector {
            x1: 2.0,
            y1: 2.0,
            x2: 2.0,
            y2: 2.0,
        },
        DrawableKind::Angle {
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            bx: 1.0,
            by: 0.0,
        },
        DrawableKind::Polygon {
            points: vec![(0.0, 0.0), (1.0, 0.0)],
        },
        DrawableKind::Bar {
            x: 0.0,
            width: 0.0,
            height: 1.0,
        },
        DrawableKind::Bar {
            x: 0.0,
            width: 1.0,
            height: 0.0,
        },
        DrawableKind::Label {
            x: 0.0,
            y: 0.0,
            text: "hi".to_string(),
            rotation_rad: 0.0,
            font_scale: 0.0,
            screen_space: false,
        },
    ];
    for kind in degenerate {
        let sink = render(kind);
        assert!(sink.events.is_empty(), "leaked events: {:?}", sink.events);
    }
}

#[test]
fn minor_arc_sweeps_counter_clockwise_on_screen() {
    let sink = render(DrawableKind::CircleArc {
        cx: 0.0,
        cy: 0.0,
        radius: 2.0,
        start_angle_rad: 0.0,
        end_angle_rad: PI / 2.0,
        use_major_arc: false,
    });
    match &sink.events[..] {
        [Event::Arc {
            start,
            end,
            clockwise,
        }] => {
            assert!(!clockwise);
            assert!(start.abs() < 1e-9);
            assert!((end + PI / 2.0).abs() < 1e-9);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn major_arc_sweeps_the_complement_clockwise() {
    let sink = render(DrawableKind::CircleArc {
        cx: 0.0,
        cy: 0.0,
        radius: 2.0,
        start_angle_rad: 0.0,
        end_angle_rad: PI / 2.0,
        use_major_arc: true,
    });
    match &sink.events[..] {
        [Event::Arc { clockwise, .. }] => assert!(clockwise),
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn ellipse_rotation_flips_sign_for_screen_space() {
    let sink = render(DrawableKind::Ellipse {
        cx: 0.0,
        cy: 0.0,
        radius_x: 2.0,
        radius_y: 1.0,
        rotation_rad: 0.3,
    });
    match &sink.events[..] {
        [Event::Ellipse { rotation }] => assert!((rotation + 0.3).abs() < 1e-12),
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn vector_draws_shaft_then_arrowhead() {
    let sink = render(DrawableKind::Vector {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 0.0,
    });
    match &sink.events[..] {
        [Event::Line { a, b, .. }, Event::Polygon { points }] => {
            assert!((a.x - 400.0).abs() < 1e-9);
            // The shaft stops at the arrowhead base, left of the tip.
            assert!(b.x < 450.0);
            assert_eq!(points.len(), 3);
            assert!((points[0].x - 450.0).abs() < 1e-9);
            assert!((points[0].y - 300.0).abs() < 1e-9);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn right_angle_is_labeled_ninety_degrees() {
    let sink = render(DrawableKind::Angle {
        vx: 0.0,
        vy: 0.0,
        ax: 1.0,
        ay: 0.0,
        bx: 0.0,
        by: 1.0,
    });
    assert_eq!(sink.count(|e| matches!(e, Event::Arc { .. })), 1);
    assert_eq!(sink.texts(), vec!["90\u{b0}"]);
}

#[test]
fn function_splits_into_one_polyline_per_branch() {
    let sink = render(DrawableKind::Function {
        expr: "1/x".to_string(),
        eval: CurveFn::new(|x| 1.0 / x),
        left_bound: Some(-2.0),
        right_bound: Some(2.0),
        asymptotes: vec![0.0],
    });
    assert_eq!(sink.count(|e| matches!(e, Event::Polyline { .. })), 2);
}

#[test]
fn function_area_joins_upper_and_reversed_lower() {
    let sink = render(DrawableKind::FunctionArea {
        upper_expr: "x^2".to_string(),
        upper: CurveFn::new(|x| x * x),
        lower_expr: "0".to_string(),
        lower: CurveFn::new(|_| 0.0),
        left: -1.0,
        right: 1.0,
    });
    match &sink.events[..] {
        [Event::JoinedArea { forward, reverse }] => {
            assert!(*forward >= 2);
            assert!(*reverse >= 2);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn bar_rises_from_the_x_axis() {
    let sink = render(DrawableKind::Bar {
        x: 1.0,
        width: 1.0,
        height: 2.0,
    });
    match &sink.events[..] {
        [Event::Polygon { points }] => {
            assert_eq!(points.len(), 4);
            // First two corners sit on y = 0, i.e. screen y 300.
            assert!((points[0].y - 300.0).abs() < 1e-9);
            assert!((points[1].y - 300.0).abs() < 1e-9);
            // Top edge is 2 math units up, 100 pixels above the axis.
            assert!((points[2].y - 200.0).abs() < 1e-9);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn multiline_label_stacks_lines_downward() {
    let style = StyleConfig::default();
    let sink = render(DrawableKind::Label {
        x: 0.0,
        y: 0.0,
        text: "first\nsecond".to_string(),
        rotation_rad: 0.0,
        font_scale: 1.0,
        screen_space: false,
    });
    assert_eq!(sink.texts(), vec!["first", "second"]);
    let ys: Vec<f64> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Text { pos, .. } => Some(pos.y),
            _ => None,
        })
        .collect();
    let line_height = 1.2 * style.label_font_size;
    assert!((ys[1] - ys[0] - line_height).abs() < 1e-9);
}

#[test]
fn tiny_labels_vanish_instead_of_rendering() {
    let style = StyleConfig::default();
    let scale = (style.min_label_font_px / style.label_font_size) * 0.5;
    let sink = render(DrawableKind::Label {
        x: 0.0,
        y: 0.0,
        text: "hi".to_string(),
        rotation_rad: 0.0,
        font_scale: scale,
        screen_space: false,
    });
    assert!(sink.events.is_empty());
}

#[test]
fn tick_spacing_walks_the_one_two_five_ladder() {
    assert!((current_tick_spacing(50.0, 1.0) - 1.0).abs() < 1e-12);
    assert!((current_tick_spacing(5.0, 1.0) - 10.0).abs() < 1e-12);
    assert!((current_tick_spacing(100.0, 1.0) - 0.5).abs() < 1e-12);
}

#[test]
fn tick_labels_use_spacing_derived_precision() {
    assert_eq!(format_tick_label(2.0, 1.0), "2");
    assert_eq!(format_tick_label(0.5, 0.5), "0.5");
    assert_eq!(format_tick_label(0.0, 1.0), "0");
    assert_eq!(format_tick_label(2e7, 1e6), "2.0e7");
}

#[test]
fn cartesian_grid_covers_the_visible_region() {
    let mut sink = EventSink::default();
    render_cartesian_grid(&mut sink, &mapper(), &StyleConfig::default());

    // Visible math range is [-8, 8] x [-6, 6] at spacing 1.
    let lines = sink.count(|e| matches!(e, Event::Line { .. }));
    assert_eq!(lines, 17 + 13);
    // Both axes draw heavier than grid lines.
    let axes = sink.count(|e| matches!(e, Event::Line { width, .. } if *width > 1.0));
    assert_eq!(axes, 2);
    // Every non-axis tick gets a label.
    assert_eq!(sink.texts().len(), 16 + 12);
}

#[test]
fn polar_grid_draws_rings_to_the_corner_and_twelve_spokes() {
    let mut sink = EventSink::default();
    render_polar_grid(&mut sink, &mapper(), &StyleConfig::default());

    // Corner distance is hypot(8, 6) = 10 math units.
    assert_eq!(sink.count(|e| matches!(e, Event::Circle { .. })), 10);
    assert_eq!(sink.count(|e| matches!(e, Event::Line { .. })), 12);
}
