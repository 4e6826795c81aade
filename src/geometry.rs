//! 2D geometry helpers shared by movement, steering and pathfinding.
//!
//! Everything works on [`glam::Vec2`] in world units with the y axis pointing
//! up and angles in radians measured counter-clockwise from +x.

use glam::Vec2;
use std::f32::consts::PI;

/// Minimum thumbstick displacement that counts as a directional press.
pub const CONTROL_DIRECTION_THRESHOLD: f32 = 0.5;

/// Closest point to `point` on the segment `start..end`.
///
/// Degenerate segments collapse to `start`.
pub fn nearest_point_on_segment(point: Vec2, start: Vec2, end: Vec2) -> Vec2 {
    let segment = end - start;
    let length_squared = segment.length_squared();
    if length_squared == 0.0 {
        return start;
    }
    let t = ((point - start).dot(segment) / length_squared).clamp(0.0, 1.0);
    start + segment * t
}

/// Unit vector for an angle.
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector, `atan2(y, x)`.
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Signed shortest rotation that turns a body at `position` facing `rotation`
/// towards `target`.
///
/// Positive values turn counter-clockwise. Returns `0.0` when the target sits
/// on top of the body.
pub fn shortest_angle_to_target(position: Vec2, rotation: f32, target: Vec2) -> f32 {
    let to_target = target - position;
    let magnitude = to_target.length();
    if magnitude == 0.0 {
        return 0.0;
    }
    let facing = heading(rotation);
    let cosine = (to_target.dot(facing) / magnitude).clamp(-1.0, 1.0);
    let angle = cosine.acos();
    // perp_dot is the z of facing x to_target
    if facing.perp_dot(to_target) > 0.0 {
        angle
    } else {
        -angle
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// True when the open segments `a1..a2` and `b1..b2` cross.
///
/// Touching endpoints and collinear overlap do not count as crossing, so two
/// edges that share a vertex are not reported.
pub fn segments_cross(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Even-odd point-in-polygon test. Points on the boundary may go either way.
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when the segment `start..end` enters the polygon, either by crossing
/// one of its edges or by lying entirely inside it.
pub fn segment_hits_polygon(start: Vec2, end: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 2 {
        return false;
    }
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if segments_cross(start, end, a, b) {
            return true;
        }
    }
    point_in_polygon((start + end) * 0.5, vertices)
}

/// Signed area of a polygon. Positive for counter-clockwise winding.
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    let mut area = 0.0;
    for i in 0..n {
        area += vertices[i].perp_dot(vertices[(i + 1) % n]);
    }
    area * 0.5
}

/// Axis-aligned bounds `(min, max)` of a point set.
pub fn bounds(vertices: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *vertices.first()?;
    Some(
        vertices
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
    )
}

/// Coarse direction of a control displacement, used by menu-like focus
/// navigation on top of the analog input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlInputDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ControlInputDirection {
    /// Pick the dominant axis of `vector`, or `None` for small displacements.
    pub fn from_vector(vector: Vec2) -> Option<Self> {
        if vector.length() < CONTROL_DIRECTION_THRESHOLD {
            return None;
        }
        if vector.x.abs() > vector.y.abs() {
            Some(if vector.x > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if vector.y > 0.0 { Self::Up } else { Self::Down })
        }
    }
}
