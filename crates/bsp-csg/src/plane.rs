//! Plane representation and point classification for BSP trees.

use nalgebra::{Point3, Vector3};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices are in front of the plane or on it
    Front,
    /// All vertices are behind the plane or on it
    Back,
    /// All vertices are on the plane
    Coplanar,
    /// Vertices are strictly on both sides
    Spanning,
}

impl Classification {
    /// Combines per-vertex sides into a polygon class.
    ///
    /// Equivalent to OR-ing `Front = 1`, `Back = 2` bit flags with
    /// on-plane vertices contributing nothing.
    pub fn from_sides(sides: &[PlaneSide]) -> Self {
        let front = sides.contains(&PlaneSide::Front);
        let back = sides.contains(&PlaneSide::Back);
        match (front, back) {
            (true, true) => Classification::Spanning,
            (true, false) => Classification::Front,
            (false, true) => Classification::Back,
            (false, false) => Classification::Coplanar,
        }
    }
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates a plane from a unit normal and offset. The normal is used as-is.
    pub fn new(normal: Vector3<f32>, offset: f32) -> Self {
        Self { normal, offset }
    }

    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal is normalized.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let unit_normal = normal.normalize();
        let offset = unit_normal.dot(&point.coords);
        Self {
            normal: unit_normal,
            offset,
        }
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Collinear points produce a NaN normal. This is not checked: callers
    /// feeding degenerate triangles get degenerate (but non-panicking) output.
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let ab = b - a;
        let ac = c - a;
        Self::from_point_and_normal(a, ab.cross(&ac))
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    pub fn classify_point(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Flips the plane in place (normal and offset negated).
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Interpolation parameter of the segment `start -> end` where it meets
    /// the plane.
    ///
    /// Only meaningful when the endpoints lie strictly on opposite sides;
    /// a segment parallel to the plane divides by zero.
    #[inline]
    pub fn intersect_parameter(&self, start: Point3<f32>, end: Point3<f32>) -> f32 {
        (self.offset - self.normal.dot(&start.coords)) / self.normal.dot(&(end - start))
    }
}
