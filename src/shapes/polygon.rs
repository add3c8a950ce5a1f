use crate::core::CushionId;
use crate::error::PhysicsError;
use crate::math::{Aabb, Vector3, EPSILON};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A cushion is a convex quadrilateral rail segment
pub type Cushion = Polygon;

/// A directed polygon edge with its outward normal in the table plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Vector3,
    pub end: Vector3,
    pub normal: Vector3,
}

impl Edge {
    pub fn direction(&self) -> Vector3 {
        (self.end - self.start).horizontal()
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Segment parameter of the point's projection, unclamped
    pub fn project(&self, point: Vector3) -> f64 {
        let d = self.direction();
        let len_sq = d.length_squared();
        if len_sq <= EPSILON {
            return 0.0;
        }
        (point - self.start).horizontal().dot(&d) / len_sq
    }

    /// Closest point on the segment to `point`, ignoring height
    pub fn closest_point_xy(&self, point: Vector3) -> Vector3 {
        let s = self.project(point).clamp(0.0, 1.0);
        let on_edge = self.start + self.direction() * s;
        Vector3::new(on_edge.x, on_edge.y, 0.0)
    }

    /// Signed distance from the edge's supporting line, positive outside
    pub fn signed_distance(&self, point: Vector3) -> f64 {
        (point - self.start).horizontal().dot(&self.normal)
    }
}

/// Transport form of a cushion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CushionData {
    pub id: CushionId,
    pub vertices: [Vector3; 4],
}

/// A convex quadrilateral with its derived bounds and edges
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    id: CushionId,
    vertices: [Vector3; 4],
    edges: [Edge; 4],
    bounds: Aabb,
    centroid: Vector3,
}

impl Polygon {
    /// Builds a polygon from four vertices in either winding order.
    ///
    /// Fails when two consecutive vertices coincide, three are collinear,
    /// or the outline is not convex.
    pub fn new(id: CushionId, vertices: [Vector3; 4]) -> Result<Self> {
        let mut turn_sign = 0.0;
        for i in 0..4 {
            let a = vertices[i];
            let b = vertices[(i + 1) % 4];
            let c = vertices[(i + 2) % 4];
            let ab = (b - a).horizontal();
            let bc = (c - b).horizontal();
            if ab.length() <= EPSILON {
                return Err(PhysicsError::InvalidParameter(format!(
                    "{} has a degenerate edge at vertex {}",
                    id, i
                )));
            }

            let turn = ab.cross(&bc).z;
            if turn.abs() <= EPSILON {
                return Err(PhysicsError::InvalidParameter(format!(
                    "{} has collinear vertices around vertex {}",
                    id,
                    (i + 1) % 4
                )));
            }
            if turn_sign != 0.0 && turn.signum() != turn_sign {
                return Err(PhysicsError::InvalidParameter(format!("{} is not convex", id)));
            }
            turn_sign = turn.signum();
        }

        let centroid = vertices.iter().fold(Vector3::ZERO, |sum, v| sum + *v) * 0.25;
        let edges = std::array::from_fn(|i| {
            let start = vertices[i];
            let end = vertices[(i + 1) % 4];
            let d = (end - start).horizontal();
            let mut normal = Vector3::new(d.y, -d.x, 0.0).normalize();
            let midpoint = (start + end) * 0.5;
            if (midpoint - centroid).horizontal().dot(&normal) < 0.0 {
                normal = -normal;
            }
            Edge { start, end, normal }
        });

        let bounds = Aabb::from_points(&vertices)
            .ok_or_else(|| PhysicsError::InvalidParameter(format!("{} has no vertices", id)))?;

        Ok(Self {
            id,
            vertices,
            edges,
            bounds,
            centroid,
        })
    }

    pub fn from_data(data: &CushionData) -> Result<Self> {
        Self::new(data.id, data.vertices)
    }

    pub fn get_id(&self) -> CushionId {
        self.id
    }

    pub fn get_vertices(&self) -> &[Vector3; 4] {
        &self.vertices
    }

    pub fn get_edges(&self) -> &[Edge; 4] {
        &self.edges
    }

    pub fn get_bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn get_centroid(&self) -> Vector3 {
        self.centroid
    }

    /// Closest boundary point to `point` in the table plane, over all edges
    pub fn closest_point_xy(&self, point: Vector3) -> (Vector3, &Edge) {
        let flat = point.horizontal();
        let mut best = (self.edges[0].closest_point_xy(point), &self.edges[0]);
        let mut best_dist = best.0.distance(&flat);
        for edge in &self.edges[1..] {
            let candidate = edge.closest_point_xy(point);
            let dist = candidate.distance(&flat);
            if dist < best_dist {
                best = (candidate, edge);
                best_dist = dist;
            }
        }
        best
    }

    pub fn serialize(&self) -> CushionData {
        CushionData {
            id: self.id,
            vertices: self.vertices,
        }
    }

    /// Rebuilds the derived geometry from transported data
    pub fn sync(&mut self, data: &CushionData) -> Result<()> {
        *self = Self::from_data(data)?;
        Ok(())
    }
}
