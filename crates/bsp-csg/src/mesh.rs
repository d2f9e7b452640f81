//! Indexed triangle meshes: the input and output format of boolean operations.

use nalgebra::{Point2, Point3, Vector3, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CsgError, Result};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }
}

impl Aabb {
    /// Smallest box containing every point, or a zero box at the origin if
    /// there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::default();
        };
        points.fold(
            Self {
                min: *first,
                max: *first,
            },
            |acc, p| Self {
                min: acc.min.inf(p),
                max: acc.max.sup(p),
            },
        )
    }

    /// Extent along each axis.
    #[inline]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Triangle mesh with one shared vertex buffer and one index buffer per
/// submesh (material slot).
///
/// `normals` and `uvs` are either empty or the same length as `positions`.
/// An empty `normals` buffer means flat face normals are used on import; an
/// empty `uvs` buffer means all texture coordinates are zero.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Point2<f32>>,
    /// Tangents with handedness in `w`. Empty until computed.
    pub tangents: Vec<Vector4<f32>>,
    pub submeshes: Vec<Vec<u32>>,
    bounds: Aabb,
}

impl Mesh {
    /// Creates a mesh with a single submesh.
    pub fn new(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        uvs: Vec<Point2<f32>>,
        indices: Vec<u32>,
    ) -> Self {
        Self::with_submeshes(positions, normals, uvs, vec![indices])
    }

    /// Creates a mesh with any number of submeshes.
    pub fn with_submeshes(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        uvs: Vec<Point2<f32>>,
        submeshes: Vec<Vec<u32>>,
    ) -> Self {
        let bounds = Aabb::from_points(&positions);
        Self {
            positions,
            normals,
            uvs,
            tangents: Vec::new(),
            submeshes,
            bounds,
        }
    }

    /// Axis-aligned box with hard edges: 24 vertices, 12 triangles, one
    /// submesh. Each face maps the full `[0, 1]²` uv square.
    pub fn cuboid(center: Point3<f32>, size: Vector3<f32>) -> Self {
        let half = size / 2.0;

        // (normal, u axis, v axis) per face; u × v == normal
        let faces = [
            (Vector3::x(), -Vector3::z(), Vector3::y()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::x(), -Vector3::z()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), -Vector3::x(), Vector3::y()),
        ];
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in corners {
                let offset = normal + u * su + v * sv;
                positions.push(center + offset.component_mul(&half));
                normals.push(normal);
                uvs.push(Point2::new((su + 1.0) / 2.0, (sv + 1.0) / 2.0));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        let mut mesh = Self::new(positions, normals, uvs, indices);
        mesh.recalculate_tangents();
        mesh
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles across all submeshes.
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.len() / 3).sum()
    }

    /// Returns true if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Returns the index buffer of a submesh, or an empty slice if it does not exist.
    pub fn submesh(&self, index: usize) -> &[u32] {
        self.submeshes.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over every triangle of every submesh as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.submeshes
            .iter()
            .flat_map(|s| s.chunks_exact(3).map(|t| [t[0], t[1], t[2]]))
    }

    /// Returns the cached bounding box.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Recomputes the bounding box from the vertex positions.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.positions);
    }

    /// Checks that the buffers can be read as triangles.
    ///
    /// Only structural problems are reported. Degenerate or open geometry
    /// passes.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.positions.len();

        for (attribute, len) in [("normals", self.normals.len()), ("uvs", self.uvs.len())] {
            if len != 0 && len != vertex_count {
                return Err(CsgError::AttributeLengthMismatch {
                    attribute,
                    expected: vertex_count,
                    actual: len,
                });
            }
        }

        for (submesh, indices) in self.submeshes.iter().enumerate() {
            if indices.len() % 3 != 0 {
                return Err(CsgError::IndexCountNotTriangles {
                    submesh,
                    count: indices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(CsgError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Enclosed volume as a sum of signed tetrahedra against the origin.
    ///
    /// Only meaningful for closed, consistently wound meshes. Outward
    /// winding gives a positive volume.
    pub fn volume(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| {
                let a = self.positions[a as usize].coords;
                let b = self.positions[b as usize].coords;
                let c = self.positions[c as usize].coords;
                a.dot(&b.cross(&c)) / 6.0
            })
            .sum()
    }

    /// Total area of all triangles.
    pub fn surface_area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| {
                let a = self.positions[a as usize];
                let b = self.positions[b as usize];
                let c = self.positions[c as usize];
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Recomputes per-vertex tangents from uv gradients.
    ///
    /// Tangents are accumulated per triangle, orthogonalized against the
    /// vertex normal, and carry handedness in `w`. Vertices without a usable
    /// uv gradient get an arbitrary tangent perpendicular to the normal.
    /// Requires normals and uvs; otherwise the tangent buffer is cleared.
    pub fn recalculate_tangents(&mut self) {
        let vertex_count = self.positions.len();
        if self.normals.len() != vertex_count || self.uvs.len() != vertex_count {
            self.tangents.clear();
            return;
        }

        let mut tangents = vec![Vector3::<f32>::zeros(); vertex_count];
        let mut bitangents = vec![Vector3::<f32>::zeros(); vertex_count];

        for [i0, i1, i2] in self.triangles() {
            let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);

            let dp1 = self.positions[i1] - self.positions[i0];
            let dp2 = self.positions[i2] - self.positions[i0];
            let duv1 = self.uvs[i1] - self.uvs[i0];
            let duv2 = self.uvs[i2] - self.uvs[i0];

            let det = duv1.x * duv2.y - duv1.y * duv2.x;
            if det.abs() < 1e-8 {
                continue;
            }

            let inv_det = 1.0 / det;
            let t = (dp1 * duv2.y - dp2 * duv1.y) * inv_det;
            let b = (dp2 * duv1.x - dp1 * duv2.x) * inv_det;

            for i in [i0, i1, i2] {
                tangents[i] += t;
                bitangents[i] += b;
            }
        }

        self.tangents = (0..vertex_count)
            .map(|i| {
                let n = self.normals[i];
                let t = tangents[i] - n * n.dot(&tangents[i]);
                match t.try_normalize(1e-10) {
                    Some(t) => {
                        let w = if n.cross(&t).dot(&bitangents[i]) < 0.0 {
                            -1.0
                        } else {
                            1.0
                        };
                        Vector4::new(t.x, t.y, t.z, w)
                    }
                    None => fallback_tangent(&n),
                }
            })
            .collect();
    }
}

/// Tangent perpendicular to `normal`, picked from the axis least aligned with it.
fn fallback_tangent(normal: &Vector3<f32>) -> Vector4<f32> {
    let axis = if normal.x.abs() > 0.9 {
        Vector3::y()
    } else {
        Vector3::x()
    };
    let t = (axis - normal * normal.dot(&axis))
        .try_normalize(1e-10)
        .unwrap_or(axis);
    Vector4::new(t.x, t.y, t.z, 1.0)
}
