//! Static polygon obstacles read from the level.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{bounds, nearest_point_on_segment, point_in_polygon, signed_area};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonObstacle {
    pub vertices: Vec<Vec2>,
}

impl PolygonObstacle {
    /// Build an obstacle, normalising the winding to counter-clockwise.
    pub fn new(mut vertices: Vec<Vec2>) -> Self {
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point_in_polygon(point, &self.vertices)
    }

    /// Closest point on the polygon outline.
    pub fn closest_boundary_point(&self, point: Vec2) -> Option<Vec2> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| nearest_point_on_segment(point, self.vertices[i], self.vertices[(i + 1) % n]))
            .min_by(|a, b| point.distance_squared(*a).total_cmp(&point.distance_squared(*b)))
    }

    /// Vertices pushed outwards by `radius` along each corner's miter.
    pub fn buffered_vertices(&self, radius: f32) -> Vec<Vec2> {
        let n = self.vertices.len();
        if n < 3 || radius == 0.0 {
            return self.vertices.clone();
        }
        (0..n)
            .map(|i| {
                let prev = self.vertices[(i + n - 1) % n];
                let current = self.vertices[i];
                let next = self.vertices[(i + 1) % n];
                let n1 = outward_normal(prev, current);
                let n2 = outward_normal(current, next);
                let Some(miter) = (n1 + n2).try_normalize() else {
                    return current + n1 * radius;
                };
                // limit spikes on very sharp corners
                let scale = radius / miter.dot(n1).max(0.3);
                current + miter * scale
            })
            .collect()
    }

    /// Bounding box grown by `extrusion` on every side contains `point`
    /// (strictly).
    pub fn extruded_bounds_contain(&self, point: Vec2, extrusion: f32) -> bool {
        let Some((min, max)) = bounds(&self.vertices) else {
            return false;
        };
        let min = min - Vec2::splat(extrusion);
        let max = max + Vec2::splat(extrusion);
        point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
    }
}

/// Outward normal of a counter-clockwise edge.
fn outward_normal(a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    Vec2::new(edge.y, -edge.x).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> PolygonObstacle {
        PolygonObstacle::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 0.0),
        ])
    }

    #[test]
    fn winding_is_normalised() {
        let obstacle = square();
        assert!(signed_area(&obstacle.vertices) > 0.0);
    }

    #[test]
    fn buffered_square_grows_outwards() {
        let buffered = square().buffered_vertices(2.0);
        assert_eq!(buffered.len(), 4);
        for vertex in buffered {
            assert!(!square().contains(vertex));
            assert!(vertex.x < 0.0 || vertex.x > 10.0);
            assert!(vertex.y < 0.0 || vertex.y > 10.0);
        }
    }

    #[test]
    fn extruded_bounds() {
        let obstacle = square();
        assert!(obstacle.extruded_bounds_contain(Vec2::new(-20.0, 5.0), 35.0));
        assert!(!obstacle.extruded_bounds_contain(Vec2::new(-50.0, 5.0), 35.0));
    }

    #[test]
    fn closest_boundary_point_on_edge() {
        let point = square().closest_boundary_point(Vec2::new(5.0, 14.0));
        assert_eq!(point, Some(Vec2::new(5.0, 10.0)));
    }
}
