//! Easing curves over the normalized domain [0,1].
//!
//! - Linear: identity
//! - Bezier: CSS-style cubic-bezier timing (x inverted by bisection)
//! - Keys: piecewise-linear through sorted (x, y) keys
//! - EaseIn / EaseOut / EaseInOut: cubic-bezier presets

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Curve {
    #[default]
    Linear,
    Bezier {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Keys {
        points: Vec<[f32; 2]>,
    },
    EaseIn,
    EaseOut,
    EaseInOut,
}

const EASE_IN: [f32; 4] = [0.42, 0.0, 1.0, 1.0];
const EASE_OUT: [f32; 4] = [0.0, 0.0, 0.58, 1.0];
const EASE_IN_OUT: [f32; 4] = [0.42, 0.0, 0.58, 1.0];

impl Curve {
    /// Build a piecewise-linear curve; keys are sorted by x.
    pub fn keys(points: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut points: Vec<[f32; 2]> = points.into_iter().map(|(x, y)| [x, y]).collect();
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Curve::Keys { points }
    }

    /// Evaluate at x; x is clamped into [0,1] first.
    pub fn evaluate(&self, x: f32) -> f32 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        match self {
            Curve::Linear => x,
            Curve::Bezier { x1, y1, x2, y2 } => bezier_ease_t(x, *x1, *y1, *x2, *y2),
            Curve::Keys { points } => keyed_value(points, x),
            Curve::EaseIn => bezier_ease_t(x, EASE_IN[0], EASE_IN[1], EASE_IN[2], EASE_IN[3]),
            Curve::EaseOut => bezier_ease_t(x, EASE_OUT[0], EASE_OUT[1], EASE_OUT[2], EASE_OUT[3]),
            Curve::EaseInOut => bezier_ease_t(
                x,
                EASE_IN_OUT[0],
                EASE_IN_OUT[1],
                EASE_IN_OUT[2],
                EASE_IN_OUT[3],
            ),
        }
    }
}

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

fn keyed_value(points: &[[f32; 2]], x: f32) -> f32 {
    let n = points.len();
    match n {
        0 => x,
        1 => points[0][1],
        _ => {
            if x <= points[0][0] {
                return points[0][1];
            }
            if x >= points[n - 1][0] {
                return points[n - 1][1];
            }
            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if x >= a[0] && x <= b[0] {
                    let span = b[0] - a[0];
                    if span <= f32::EPSILON {
                        return b[1];
                    }
                    return lerp_f32(a[1], b[1], (x - a[0]) / span);
                }
            }
            points[n - 1][1]
        }
    }
}
