//! Interpolatable polygon vertices.

use nalgebra::{Point2, Point3, Vector3};

/// A polygon vertex carrying position, normal and texture coordinate.
///
/// The normal is not renormalized after interpolation, so it may drift from
/// unit length on split vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Point2<f32>,
}

impl Vertex {
    /// Creates a new vertex.
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, uv: Point2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Creates a vertex with a zero uv.
    pub fn with_normal(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self::new(position, normal, Point2::origin())
    }

    /// Linearly interpolates every attribute between `self` (`t = 0`) and
    /// `other` (`t = 1`).
    ///
    /// `t` is not clamped. A `t` outside `[0, 1]` extrapolates.
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        Vertex {
            position: self.position + (other.position - self.position) * t,
            normal: self.normal + (other.normal - self.normal) * t,
            uv: self.uv + (other.uv - self.uv) * t,
        }
    }

    /// Negates the normal. Position and uv are untouched.
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }
}
