//! Sampling of explicit and parametric functions into polylines.
//!
//! The invariant for explicit functions: no output path's x-range straddles
//! a vertical asymptote. Sampling walks left to right; an asymptote between
//! the cursor and the next sample terminates the current path just before
//! the asymptote and restarts just after it.

use crate::drawable::CurveFn;
use crate::foundation::core::Point;

/// Default sample budget across the sampled range.
pub const DEFAULT_MAX_POINTS: usize = 200;

/// Find the first asymptote strictly inside `(lo, hi)`, if any.
fn asymptote_between(asymptotes: &[f64], lo: f64, hi: f64) -> Option<f64> {
    asymptotes.iter().copied().find(|a| lo < *a && *a < hi)
}

/// Sample `y = f(x)` over `[left, right]` into math-space polylines, split
/// at asymptotes and at non-finite samples.
pub fn build_function_paths(
    eval: &CurveFn,
    left: f64,
    right: f64,
    asymptotes: &[f64],
    max_points: usize,
) -> Vec<Vec<Point>> {
    let mut paths: Vec<Vec<Point>> = Vec::new();
    if !left.is_finite() || !right.is_finite() || right <= left {
        return paths;
    }

    let budget = max_points.max(2);
    let step = (right - left) / budget as f64;

    let mut current: Vec<Point> = Vec::new();
    let mut x = left;

    while x < right - 1e-12 {
        if let Some(a) = asymptote_between(asymptotes, x, x + step) {
            // Evaluate close to the asymptote from the left, then break the
            // path and continue from just past it.
            let eps = 1e-3_f64.min(step / 10.0);
            let near = a - eps;
            let y = eval.eval(near);
            if y.is_finite() && near > x {
                current.push(Point::new(near, y));
            }
            if !current.is_empty() {
                paths.push(std::mem::take(&mut current));
            }
            x = a + eps;
            continue;
        }

        let y = eval.eval(x);
        if !y.is_finite() {
            if !current.is_empty() {
                paths.push(std::mem::take(&mut current));
            }
            x += step;
            continue;
        }

        current.push(Point::new(x, y));
        x += step;
    }

    if !current.is_empty() {
        paths.push(current);
    }

    paths
}

/// Sample a parametric curve `(x(t), y(t))` over `[t_min, t_max]` uniformly
/// into one path. Non-finite samples are skipped, not split on; the domain
/// is continuous by construction.
pub fn build_parametric_path(
    eval_x: &CurveFn,
    eval_y: &CurveFn,
    t_min: f64,
    t_max: f64,
    max_points: usize,
) -> Vec<Point> {
    let mut path = Vec::new();
    if !t_min.is_finite() || !t_max.is_finite() || t_max <= t_min {
        return path;
    }

    let n = max_points.max(2);
    let step = (t_max - t_min) / (n - 1) as f64;
    for i in 0..n {
        let t = t_min + step * i as f64;
        let x = eval_x.eval(t);
        let y = eval_y.eval(t);
        if x.is_finite() && y.is_finite() {
            path.push(Point::new(x, y));
        }
    }
    path
}

#[cfg(test)]
#[path = "../tests/unit/curve.rs"]
mod tests;
