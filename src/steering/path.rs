//! Polyline paths followed by steering agents.

use glam::Vec2;

use crate::geometry::nearest_point_on_segment;

/// A polyline with a corridor radius. Cyclical paths close back to their
/// first point.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringPath {
    points: Vec<Vec2>,
    pub radius: f32,
    pub cyclical: bool,
    length: f32,
}

impl SteeringPath {
    pub fn new(points: Vec<Vec2>, radius: f32, cyclical: bool) -> Self {
        let mut path = Self {
            points,
            radius,
            cyclical,
            length: 0.0,
        };
        path.length = path.segments().map(|(a, b)| a.distance(b)).sum();
        path
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        let count = if self.cyclical && n > 2 { n } else { n.saturating_sub(1) };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Arc-length parameter of the path point closest to `point`, together
    /// with that point.
    pub fn closest(&self, point: Vec2) -> Option<(f32, Vec2)> {
        if self.points.len() == 1 {
            return Some((0.0, self.points[0]));
        }
        let mut travelled = 0.0;
        let mut best: Option<(f32, f32, Vec2)> = None;
        for (a, b) in self.segments() {
            let nearest = nearest_point_on_segment(point, a, b);
            let distance_squared = point.distance_squared(nearest);
            if best.is_none_or(|(d, _, _)| distance_squared < d) {
                best = Some((distance_squared, travelled + a.distance(nearest), nearest));
            }
            travelled += a.distance(b);
        }
        best.map(|(_, parameter, nearest)| (parameter, nearest))
    }

    /// Point at arc length `parameter`. Cyclical paths wrap, others clamp.
    pub fn point_at(&self, parameter: f32) -> Option<Vec2> {
        let first = *self.points.first()?;
        if self.length <= 0.0 {
            return Some(first);
        }
        let mut remaining = if self.cyclical {
            parameter.rem_euclid(self.length)
        } else {
            parameter.clamp(0.0, self.length)
        };
        let mut last = first;
        for (a, b) in self.segments() {
            let segment_length = a.distance(b);
            if remaining <= segment_length {
                if segment_length == 0.0 {
                    return Some(a);
                }
                return Some(a.lerp(b, remaining / segment_length));
            }
            remaining -= segment_length;
            last = b;
        }
        Some(last)
    }

    /// Distance from `point` to the polyline.
    pub fn distance_to(&self, point: Vec2) -> Option<f32> {
        self.closest(point).map(|(_, nearest)| point.distance(nearest))
    }
}
