//! Wire geometry.
//!
//! Connections are cubic Béziers in window space. The control points pull
//! horizontally so curves leave outputs rightward and enter inputs leftward,
//! flattening as the endpoints approach each other.

use fideo_graph::Vec2;

/// Squared window-space distance under which a wire counts as hovered.
pub const WIRE_HIT_DISTANCE_SQ: f32 = 100.0;

/// Horizontal control-point pull is capped at this many canvas units.
const MAX_WIGGLE: f32 = 64.0;

/// Control points for a wire from `p0` (output side) to `p3` (input side).
/// Endpoints are swapped when needed so the curve always runs left to right.
pub fn wire_bezier(p0: Vec2, p3: Vec2, scale: f32) -> [Vec2; 4] {
    let (p0, p3) = if p0.x > p3.x { (p3, p0) } else { (p0, p3) };
    let span = (p3 - p0).length();
    let wiggle = (p3.x - p0.x).abs().min(span.min(MAX_WIGGLE) * scale);
    [
        p0,
        p0 + Vec2::new(wiggle, 0.0),
        p3 - Vec2::new(wiggle, 0.0),
        p3,
    ]
}

/// Evaluates the cubic at `t` by de Casteljau reduction.
pub fn bezier_point(points: &[Vec2; 4], t: f32) -> Vec2 {
    let lerp = |a: Vec2, b: Vec2| a + (b - a) * t;
    let q0 = lerp(points[0], points[1]);
    let q1 = lerp(points[1], points[2]);
    let q2 = lerp(points[2], points[3]);
    let r0 = lerp(q0, q1);
    let r1 = lerp(q1, q2);
    lerp(r0, r1)
}

/// Squared distance from `p` to the closest point on the cubic, found by a
/// coarse parameter scan refined with interval halving. Plenty for a hover
/// threshold.
pub fn closest_distance_sq(points: &[Vec2; 4], p: Vec2) -> f32 {
    const COARSE_STEPS: u32 = 16;
    let mut best_t = 0.0;
    let mut best = f32::MAX;
    for i in 0..=COARSE_STEPS {
        let t = i as f32 / COARSE_STEPS as f32;
        let d = (bezier_point(points, t) - p).length_sq();
        if d < best {
            best = d;
            best_t = t;
        }
    }
    let mut radius = 1.0 / COARSE_STEPS as f32;
    for _ in 0..12 {
        radius *= 0.5;
        for t in [best_t - radius, best_t + radius] {
            let t = t.clamp(0.0, 1.0);
            let d = (bezier_point(points, t) - p).length_sq();
            if d < best {
                best = d;
                best_t = t;
            }
        }
    }
    best
}
