//! Navigation graph over the buffered corners of the level's obstacles.
//!
//! The static part of the graph is built once per level. Path queries insert
//! a start and an end node, connect them to every node they can see, run A*
//! and remove both nodes again. Query nodes are owned by a
//! [`TransientNodes`] guard that truncates the node arena when dropped, so
//! the graph never grows across queries, whatever path the query takes out.

use bevy_ecs::prelude::Resource;
use glam::Vec2;
use log::debug;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::geometry::{point_in_polygon, segment_hits_polygon};
use crate::steering::obstacles::PolygonObstacle;

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub position: Vec2,
    /// `(obstacle, vertex)` this node was generated from.
    pub corner: Option<(usize, usize)>,
    pub connections: SmallVec<[usize; 8]>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleGraph {
    obstacles: Arc<[PolygonObstacle]>,
    buffered: Vec<Vec<Vec2>>,
    buffer_radius: f32,
    nodes: Vec<GraphNode>,
}

impl ObstacleGraph {
    pub fn new(obstacles: impl Into<Arc<[PolygonObstacle]>>, buffer_radius: f32) -> Self {
        let obstacles: Arc<[PolygonObstacle]> = obstacles.into();
        let buffered: Vec<Vec<Vec2>> = obstacles
            .iter()
            .map(|obstacle| obstacle.buffered_vertices(buffer_radius))
            .collect();

        let mut graph = Self {
            obstacles,
            buffered,
            buffer_radius,
            nodes: Vec::new(),
        };

        for (obstacle_index, vertices) in graph.buffered.iter().enumerate() {
            for (vertex_index, vertex) in vertices.iter().enumerate() {
                let enclosed = graph
                    .buffered
                    .iter()
                    .enumerate()
                    .any(|(other, polygon)| other != obstacle_index && point_in_polygon(*vertex, polygon));
                if enclosed {
                    continue;
                }
                graph.nodes.push(GraphNode {
                    position: *vertex,
                    corner: Some((obstacle_index, vertex_index)),
                    connections: SmallVec::new(),
                });
            }
        }

        for a in 0..graph.nodes.len() {
            for b in (a + 1)..graph.nodes.len() {
                if graph.can_connect(a, b, &[]) {
                    graph.nodes[a].connections.push(b);
                    graph.nodes[b].connections.push(a);
                }
            }
        }

        debug!(
            "Obstacle graph built: {} obstacles, {} nodes",
            graph.obstacles.len(),
            graph.nodes.len()
        );
        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn obstacles(&self) -> &Arc<[PolygonObstacle]> {
        &self.obstacles
    }

    pub fn buffer_radius(&self) -> f32 {
        self.buffer_radius
    }

    /// Obstacles whose bounds, grown by `extrusion`, contain `point`.
    pub fn extruded_obstacles_containing(&self, point: Vec2, extrusion: f32) -> Vec<usize> {
        self.obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| obstacle.extruded_bounds_contain(point, extrusion))
            .map(|(index, _)| index)
            .collect()
    }

    /// True when no obstacle blocks the straight segment `start..end`.
    pub fn has_line_of_sight(&self, start: Vec2, end: Vec2) -> bool {
        !self
            .obstacles
            .iter()
            .any(|obstacle| segment_hits_polygon(start, end, &obstacle.vertices))
    }

    fn can_connect(&self, a: usize, b: usize, ignoring_buffer_of: &[usize]) -> bool {
        let (node_a, node_b) = (&self.nodes[a], &self.nodes[b]);
        for (index, buffered) in self.buffered.iter().enumerate() {
            let ignored = ignoring_buffer_of.contains(&index);
            let polygon = if ignored {
                &self.obstacles[index].vertices
            } else {
                buffered
            };
            if !ignored {
                if let (Some((oa, va)), Some((ob, vb))) = (node_a.corner, node_b.corner) {
                    let n = buffered.len();
                    if oa == index && ob == index && ((va + 1) % n == vb || (vb + 1) % n == va) {
                        // an edge of this polygon
                        continue;
                    }
                }
            }
            if segment_hits_polygon(node_a.position, node_b.position, polygon) {
                return false;
            }
        }
        true
    }

    /// Open a query scope. Nodes added through the guard are removed when it
    /// drops.
    pub fn transient(&mut self) -> TransientNodes<'_> {
        let base = self.nodes.len();
        TransientNodes { graph: self, base }
    }

    /// A* over node indices. Returns the node sequence including both ends.
    pub fn find_path(&self, start: usize, end: usize) -> Option<Vec<usize>> {
        if start >= self.nodes.len() || end >= self.nodes.len() {
            return None;
        }
        if start == end {
            return Some(vec![start]);
        }

        let goal = self.nodes[end].position;
        let mut open_set = BinaryHeap::new();
        let mut came_from: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut g_scores: Vec<f32> = vec![f32::INFINITY; self.nodes.len()];

        g_scores[start] = 0.0;
        open_set.push(OpenNode {
            index: start,
            f_cost: self.nodes[start].position.distance(goal),
        });

        while let Some(current) = open_set.pop() {
            if current.index == end {
                let mut path = vec![end];
                let mut cursor = end;
                while let Some(previous) = came_from[cursor] {
                    path.push(previous);
                    cursor = previous;
                }
                path.reverse();
                return Some(path);
            }

            let current_position = self.nodes[current.index].position;
            let current_g = g_scores[current.index];
            for &neighbor in &self.nodes[current.index].connections {
                let neighbor_position = self.nodes[neighbor].position;
                let tentative_g = current_g + current_position.distance(neighbor_position);
                if tentative_g < g_scores[neighbor] {
                    came_from[neighbor] = Some(current.index);
                    g_scores[neighbor] = tentative_g;
                    open_set.push(OpenNode {
                        index: neighbor,
                        f_cost: tentative_g + neighbor_position.distance(goal),
                    });
                }
            }
        }

        None
    }

    /// Waypoints from `start` to `end`, routed around obstacles.
    ///
    /// Each endpoint is first connected respecting buffer radii; if it sees no
    /// node, it is connected again ignoring the buffer of the obstacles whose
    /// bounds grown by `extrusion` contain it. An empty result means no usable
    /// path, which includes a path of a single node.
    pub fn path_points(&mut self, start: Vec2, end: Vec2, extrusion: f32) -> Vec<Vec2> {
        let mut query = self.transient();
        let Some(start_node) = query.connected_node(start, extrusion) else {
            return Vec::new();
        };
        let Some(end_node) = query.connected_node(end, extrusion) else {
            return Vec::new();
        };
        let Some(path) = query.graph().find_path(start_node, end_node) else {
            return Vec::new();
        };
        if path.len() <= 1 {
            return Vec::new();
        }
        path.into_iter()
            .map(|index| query.graph().nodes[index].position)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    index: usize,
    f_cost: f32,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on f_cost
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Query-scoped nodes. Dropping the guard removes every node it added and
/// every connection to them.
pub struct TransientNodes<'a> {
    graph: &'a mut ObstacleGraph,
    base: usize,
}

impl TransientNodes<'_> {
    pub fn graph(&self) -> &ObstacleGraph {
        self.graph
    }

    /// Add `point` and connect it to every visible node, returning its index.
    /// Returns `None` (and removes the node) when nothing is visible.
    pub fn connect(&mut self, point: Vec2, ignoring_buffer_of: &[usize]) -> Option<usize> {
        let index = self.graph.nodes.len();
        self.graph.nodes.push(GraphNode {
            position: point,
            corner: None,
            connections: SmallVec::new(),
        });
        for other in 0..index {
            if self.graph.can_connect(index, other, ignoring_buffer_of) {
                self.graph.nodes[index].connections.push(other);
                self.graph.nodes[other].connections.push(index);
            }
        }
        if self.graph.nodes[index].connections.is_empty() {
            self.remove_last();
            return None;
        }
        Some(index)
    }

    fn connected_node(&mut self, point: Vec2, extrusion: f32) -> Option<usize> {
        if let Some(index) = self.connect(point, &[]) {
            return Some(index);
        }
        let intersecting = self.graph.extruded_obstacles_containing(point, extrusion);
        self.connect(point, &intersecting)
    }

    fn remove_last(&mut self) {
        if self.graph.nodes.len() > self.base {
            self.graph.truncate_nodes(self.graph.nodes.len() - 1);
        }
    }
}

impl ObstacleGraph {
    fn truncate_nodes(&mut self, len: usize) {
        self.nodes.truncate(len);
        for node in &mut self.nodes {
            node.connections.retain(|other| *other < len);
        }
    }
}

impl Drop for TransientNodes<'_> {
    fn drop(&mut self) {
        self.graph.truncate_nodes(self.base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> PolygonObstacle {
        PolygonObstacle::new(vec![
            Vec2::new(-20.0, -200.0),
            Vec2::new(20.0, -200.0),
            Vec2::new(20.0, 200.0),
            Vec2::new(-20.0, 200.0),
        ])
    }

    #[test]
    fn static_nodes_come_from_buffered_corners() {
        let graph = ObstacleGraph::new(vec![wall()], 30.0);
        assert_eq!(graph.node_count(), 4);
        for index in 0..graph.node_count() {
            assert!(!graph.node(index).unwrap().connections.is_empty());
        }
    }

    #[test]
    fn path_routes_around_wall_and_releases_nodes() {
        let mut graph = ObstacleGraph::new(vec![wall()], 30.0);
        let before = graph.node_count();
        let points = graph.path_points(Vec2::new(-300.0, 0.0), Vec2::new(300.0, 0.0), 35.0);
        assert_eq!(graph.node_count(), before);
        assert!(points.len() >= 3);
        assert_eq!(points.first(), Some(&Vec2::new(-300.0, 0.0)));
        assert_eq!(points.last(), Some(&Vec2::new(300.0, 0.0)));
        for window in points.windows(2) {
            assert!(graph.has_line_of_sight(window[0], window[1]));
        }
    }

    #[test]
    fn clear_line_gives_direct_two_point_path() {
        let mut graph = ObstacleGraph::new(vec![wall()], 30.0);
        let points = graph.path_points(Vec2::new(100.0, 0.0), Vec2::new(300.0, 50.0), 35.0);
        assert_eq!(points, vec![Vec2::new(100.0, 0.0), Vec2::new(300.0, 50.0)]);
    }

    #[test]
    fn failed_query_releases_nodes() {
        // no obstacles, so no static node to connect the start to
        let mut graph = ObstacleGraph::new(Vec::<PolygonObstacle>::new(), 30.0);
        let points = graph.path_points(Vec2::ZERO, Vec2::new(10.0, 0.0), 35.0);
        assert!(points.is_empty());
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn start_connected_end_unreachable_still_cleans_up() {
        let mut graph = ObstacleGraph::new(vec![wall()], 30.0);
        let before = graph.node_count();
        // end point deep inside the wall: the buffered fallback still sees
        // nothing through the raw polygon edges
        let points = graph.path_points(Vec2::new(-300.0, 0.0), Vec2::new(0.0, 0.0), 35.0);
        assert!(points.is_empty());
        assert_eq!(graph.node_count(), before);
    }

    #[test]
    fn point_inside_buffer_connects_through_fallback() {
        let mut graph = ObstacleGraph::new(vec![wall()], 30.0);
        // inside the buffer zone of the wall but outside the wall itself
        let start = Vec2::new(30.0, 0.0);
        let mut query = graph.transient();
        assert!(query.connect(start, &[]).is_none());
        let ignoring = query.graph().extruded_obstacles_containing(start, 35.0);
        assert_eq!(ignoring, vec![0]);
        assert!(query.connect(start, &ignoring).is_some());
    }

    #[test]
    fn line_of_sight_is_blocked_by_obstacle() {
        let graph = ObstacleGraph::new(vec![wall()], 30.0);
        assert!(!graph.has_line_of_sight(Vec2::new(-100.0, 0.0), Vec2::new(100.0, 0.0)));
        assert!(graph.has_line_of_sight(Vec2::new(-100.0, 300.0), Vec2::new(100.0, 300.0)));
    }
}
