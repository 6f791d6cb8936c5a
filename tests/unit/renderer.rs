use super::*;
use crate::backend::BackendKind;
use crate::drawable::{CurveFn, DrawableKind};
use crate::foundation::core::Point;
use crate::plan::UsageCounts;
use crate::primitives::{
    FillStyle, FontStyle, RendererPrimitives, StrokeStyle, TextAlignment,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Default)]
struct BackendLog {
    frames: usize,
    primitives: usize,
    begun_plans: Vec<String>,
    ended_plans: Vec<String>,
    transforms: Vec<(String, f64, f64, f64)>,
    raised: Vec<String>,
    released: Vec<String>,
}

struct MockBackend {
    log: Rc<RefCell<BackendLog>>,
    retained: bool,
    refuse: HashSet<String>,
}

impl MockBackend {
    fn new(retained: bool) -> (Box<dyn PlanBackend>, Rc<RefCell<BackendLog>>) {
        Self::refusing(retained, [])
    }

    fn refusing<const N: usize>(
        retained: bool,
        refuse: [&str; N],
    ) -> (Box<dyn PlanBackend>, Rc<RefCell<BackendLog>>) {
        let log = Rc::new(RefCell::new(BackendLog::default()));
        (
            Box::new(Self {
                log: Rc::clone(&log),
                retained,
                refuse: refuse.iter().map(|s| s.to_string()).collect(),
            }),
            log,
        )
    }

    fn count(&mut self) {
        self.log.borrow_mut().primitives += 1;
    }
}

impl RendererPrimitives for MockBackend {
    fn stroke_line(&mut self, _start: Point, _end: Point, _stroke: &StrokeStyle) {
        self.count();
    }

    fn stroke_polyline(&mut self, _points: &[Point], _stroke: &StrokeStyle) {
        self.count();
    }

    fn stroke_circle(&mut self, _center: Point, _radius: f64, _stroke: &StrokeStyle) {
        self.count();
    }

    fn fill_circle(
        &mut self,
        _center: Point,
        _radius: f64,
        _fill: &FillStyle,
        _stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        self.count();
    }

    fn stroke_ellipse(
        &mut self,
        _center: Point,
        _radius_x: f64,
        _radius_y: f64,
        _rotation_rad: f64,
        _stroke: &StrokeStyle,
    ) {
        self.count();
    }

    fn fill_polygon(
        &mut self,
        _points: &[Point],
        _fill: &FillStyle,
        _stroke: Option<&StrokeStyle>,
        _screen_space: bool,
    ) {
        self.count();
    }

    fn fill_joined_area(&mut self, _forward: &[Point], _reverse: &[Point], _fill: &FillStyle) {
        self.count();
    }

    fn stroke_arc(
        &mut self,
        _center: Point,
        _radius: f64,
        _start_angle_rad: f64,
        _end_angle_rad: f64,
        _sweep_clockwise: bool,
        _stroke: &StrokeStyle,
        _screen_space: bool,
    ) {
        self.count();
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
        self.count();
    }

    fn clear_surface(&mut self) {}

    fn resize_surface(&mut self, _width: f64, _height: f64) {}

    fn begin_frame(&mut self) {
        self.log.borrow_mut().frames += 1;
    }
}

impl PlanBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Canvas2d
    }

    fn is_retained(&self) -> bool {
        self.retained
    }

    fn begin_plan(&mut self, key: &str, _usage: &UsageCounts) -> crate::foundation::error::MathplotResult<()> {
        if self.refuse.contains(key) {
            return Err(crate::foundation::error::MathplotError::backend(
                "no room for this plan",
            ));
        }
        self.log.borrow_mut().begun_plans.push(key.to_string());
        Ok(())
    }

    fn end_plan(&mut self, key: &str) {
        self.log.borrow_mut().ended_plans.push(key.to_string());
    }

    fn set_plan_transform(&mut self, key: &str, scale: f64, tx: f64, ty: f64) -> bool {
        self.log
            .borrow_mut()
            .transforms
            .push((key.to_string(), scale, tx, ty));
        true
    }

    fn raise_plan(&mut self, key: &str) {
        self.log.borrow_mut().raised.push(key.to_string());
    }

    fn release_plan(&mut self, key: &str) {
        self.log.borrow_mut().released.push(key.to_string());
    }
}

fn renderer(backend: Box<dyn PlanBackend>) -> PlanRenderer {
    let settings = RenderSettings {
        cull_margin: DEFAULT_CULL_MARGIN,
        grid: None,
    };
    PlanRenderer::new(backend, 800.0, 600.0, 50.0, StyleConfig::default(), settings)
}

fn point(name: &str, x: f64, y: f64) -> Drawable {
    Drawable::new(name, DrawableKind::Point { x, y })
}

#[test]
fn disabled_renderer_draws_nothing() {
    let (backend, log) = MockBackend::new(false);
    let mut renderer = renderer(backend);
    renderer.set_draw_enabled(false);

    let stats = renderer.draw_pass(&[point("a", 0.0, 0.0)]);
    assert_eq!(stats, PassStats::default());
    assert_eq!(log.borrow().frames, 0);
    assert!(renderer.cache().is_empty());
}

#[test]
fn immediate_pass_replays_every_visible_plan() {
    let (backend, log) = MockBackend::new(false);
    let mut renderer = renderer(backend);

    let stats = renderer.draw_pass(&[point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
    assert_eq!(stats.drawn, 2);
    assert_eq!(stats.culled, 0);
    assert_eq!(log.borrow().frames, 1);
    assert!(log.borrow().primitives >= 2);
}

#[test]
fn absent_drawables_are_pruned_and_released() {
    let (backend, log) = MockBackend::new(false);
    let mut renderer = renderer(backend);

    renderer.draw_pass(&[point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
    let stats = renderer.draw_pass(&[point("a", 0.0, 0.0)]);

    assert_eq!(stats.pruned, 1);
    assert_eq!(log.borrow().released, vec!["b".to_string()]);
    assert_eq!(renderer.cache().len(), 1);
}

#[test]
fn off_screen_plans_are_culled_but_kept_cached() {
    let (backend, _log) = MockBackend::new(false);
    let mut renderer = renderer(backend);
    let scene = [point("a", 0.0, 0.0)];

    renderer.draw_pass(&scene);
    renderer.mapper_mut().apply_pan(2000.0, 2000.0);
    let stats = renderer.draw_pass(&scene);

    assert_eq!(stats.culled, 1);
    assert_eq!(stats.drawn, 0);
    assert!(renderer.cache().get("a").is_some());

    renderer.mapper_mut().apply_pan(-2000.0, -2000.0);
    let stats = renderer.draw_pass(&scene);
    assert_eq!(stats.drawn, 1);
    assert_eq!(renderer.cache().generation_of("a"), Some(0));
}

#[test]
fn functions_keep_drawing_after_a_long_pan() {
    let (backend, _log) = MockBackend::new(false);
    let mut renderer = renderer(backend);
    let scene = [Drawable::new(
        "f",
        DrawableKind::Function {
            expr: "0".to_string(),
            eval: CurveFn::new(|_| 0.0),
            left_bound: None,
            right_bound: None,
            asymptotes: vec![],
        },
    )];

    assert_eq!(renderer.draw_pass(&scene).drawn, 1);

    // Far past the originally sampled x-range; the curve must resample
    // rather than getting culled or truncated.
    renderer.mapper_mut().apply_pan(-900.0, 0.0);
    let stats = renderer.draw_pass(&scene);
    assert_eq!(stats.drawn, 1);
    assert_eq!(stats.culled, 0);
    assert_eq!(renderer.cache().generation_of("f"), Some(1));
}

#[test]
fn retained_plans_first_seen_off_screen_appear_after_panning_in() {
    let (backend, log) = MockBackend::new(true);
    let mut renderer = renderer(backend);
    let scene = [point("far", 50.0, 0.0)];

    let stats = renderer.draw_pass(&scene);
    assert_eq!(stats.culled, 1);
    assert!(log.borrow().begun_plans.is_empty());

    renderer.mapper_mut().apply_pan(-2500.0, 0.0);
    let stats = renderer.draw_pass(&scene);
    assert_eq!(stats.drawn, 1);
    assert_eq!(stats.culled, 0);
    assert_eq!(log.borrow().begun_plans, vec!["far".to_string()]);
}

#[test]
fn retained_plans_reposition_instead_of_reapplying() {
    let (backend, log) = MockBackend::new(true);
    let mut renderer = renderer(backend);
    let scene = [point("a", 0.0, 0.0)];

    renderer.draw_pass(&scene);
    assert_eq!(log.borrow().begun_plans, vec!["a".to_string()]);
    assert_eq!(log.borrow().ended_plans, vec!["a".to_string()]);

    renderer.mapper_mut().apply_pan(30.0, -10.0);
    let stats = renderer.draw_pass(&scene);
    assert_eq!(stats.drawn, 1);

    let log = log.borrow();
    // No second build: only the transform moved.
    assert_eq!(log.begun_plans.len(), 1);
    let (key, ratio, tx, ty) = log.transforms.last().unwrap().clone();
    assert_eq!(key, "a");
    assert!((ratio - 1.0).abs() < 1e-12);
    assert!((tx - 30.0).abs() < 1e-9);
    assert!((ty + 10.0).abs() < 1e-9);
}

#[test]
fn refused_plans_are_skipped_and_retried() {
    let (backend, log) = MockBackend::refusing(true, ["a"]);
    let mut renderer = renderer(backend);

    let stats = renderer.draw_pass(&[point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.drawn, 1);
    assert_eq!(log.borrow().begun_plans, vec!["b".to_string()]);

    // The skipped plan stays dirty, so the next pass tries again.
    let stats = renderer.draw_pass(&[point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.drawn, 1);
}

#[test]
fn rebuilds_restack_the_scene_in_listed_order() {
    let (backend, log) = MockBackend::new(true);
    let mut renderer = renderer(backend);
    let scene = [point("a", 0.0, 0.0), point("b", 1.0, 1.0)];

    renderer.draw_pass(&scene);
    log.borrow_mut().raised.clear();

    // A style change rebuilds both plans and re-creates their resources.
    let style = renderer.style().clone().with_point_radius(0.3);
    renderer.set_style(style);
    renderer.draw_pass(&scene);

    assert_eq!(
        log.borrow().raised,
        vec!["a".to_string(), "b".to_string()]
    );
    assert_eq!(renderer.cache().generation_of("a"), Some(1));
}

#[test]
fn grid_replays_through_its_reserved_slot_each_frame() {
    let (backend, log) = MockBackend::new(true);
    let settings = RenderSettings {
        cull_margin: DEFAULT_CULL_MARGIN,
        grid: Some(GridKind::Cartesian),
    };
    let mut renderer = PlanRenderer::new(
        backend,
        800.0,
        600.0,
        50.0,
        StyleConfig::default(),
        settings,
    );

    renderer.draw_pass(&[]);
    renderer.draw_pass(&[]);
    let grid_begins = log
        .borrow()
        .begun_plans
        .iter()
        .filter(|k| *k == GRID_KEY)
        .count();
    assert_eq!(grid_begins, 2);
}

#[test]
fn teardown_releases_everything_exactly_once() {
    let (backend, log) = MockBackend::new(true);
    let mut renderer = renderer(backend);

    renderer.draw_pass(&[point("a", 0.0, 0.0), point("b", 1.0, 1.0)]);
    renderer.teardown();

    {
        let mut released = log.borrow().released.clone();
        released.sort();
        assert_eq!(released, vec!["a".to_string(), "b".to_string()]);
    }

    // Explicit teardown plus drop must not double-release.
    drop(renderer);
    assert_eq!(log.borrow().released.len(), 2);
}
