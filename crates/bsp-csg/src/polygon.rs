//! Convex polygons tagged with the solid they came from.

use nalgebra::{Point3, Vector3};

use crate::{Classification, Plane3D, PlaneSide, Vertex};

/// Identifies which input solid a polygon originated from.
///
/// Only used to route output triangles into submeshes, never for geometric
/// decisions.
pub type SourceId = usize;

/// A convex polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices should be coplanar and in counter-clockwise winding order
/// when viewed from the front (the direction the plane normal points).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane3D,
    source_id: SourceId,
}

impl Polygon {
    /// Creates a new polygon, deriving its plane from the first three vertices.
    ///
    /// # Panics
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(vertices: Vec<Vertex>, source_id: SourceId) -> Self {
        assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        let plane = Plane3D::from_three_points(
            vertices[0].position,
            vertices[1].position,
            vertices[2].position,
        );
        Self {
            vertices,
            plane,
            source_id,
        }
    }

    /// Creates a polygon that shares an already known supporting plane.
    /// Split fragments use this so they stay on their parent's plane.
    pub(crate) fn with_plane(vertices: Vec<Vertex>, plane: Plane3D, source_id: SourceId) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self {
            vertices,
            plane,
            source_id,
        }
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the plane that this polygon lies on.
    #[inline]
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    /// Returns the id of the solid this polygon came from.
    #[inline]
    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// Reverses the winding and negates the plane and every vertex normal.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for vertex in &mut self.vertices {
            vertex.flip();
        }
        self.plane.flip();
    }

    /// Computes the centroid (average of all vertex positions).
    pub fn centroid(&self) -> Point3<f32> {
        let sum: Vector3<f32> = self.vertices.iter().map(|v| v.position.coords).sum();
        Point3::from(sum / self.vertices.len() as f32)
    }

    /// Computes the area of the polygon by summing its fan triangles.
    pub fn area(&self) -> f32 {
        let origin = self.vertices[0].position;
        self.vertices
            .windows(2)
            .skip(1)
            .map(|pair| {
                let ab = pair[0].position - origin;
                let ac = pair[1].position - origin;
                ab.cross(&ac).norm() * 0.5
            })
            .sum()
    }

    /// Classifies every vertex of this polygon against a plane.
    pub fn vertex_sides(&self, plane: &Plane3D, epsilon: f32) -> Vec<PlaneSide> {
        self.vertices
            .iter()
            .map(|v| plane.classify_point(v.position, epsilon))
            .collect()
    }

    /// Classifies this polygon relative to a plane.
    ///
    /// Returns:
    /// - `Front` if no vertex is behind the plane and at least one is in front
    /// - `Back` if no vertex is in front of the plane and at least one is behind
    /// - `Coplanar` if all vertices lie on the plane
    /// - `Spanning` if vertices are on both sides
    pub fn classify(&self, plane: &Plane3D, epsilon: f32) -> Classification {
        Classification::from_sides(&self.vertex_sides(plane, epsilon))
    }

    pub(crate) fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}
