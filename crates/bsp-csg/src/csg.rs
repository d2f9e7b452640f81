//! Boolean operations on triangle meshes.
//!
//! Each operation converts two meshes to BSP trees in world space, runs a
//! fixed sequence of [`BspNode::clip_to`], [`BspNode::invert`] and
//! [`BspNode::build`] calls on them, and turns the surviving polygons back
//! into a welded mesh with one submesh per input.
//!
//! The call sequences are not interchangeable: reordering any step silently
//! produces wrong geometry.

use std::fmt;

use nalgebra::{Matrix4, Point2, Vector3};
use tracing::{debug, debug_span, trace};

use crate::error::{CsgError, Result};
use crate::weld::VertexWelder;
use crate::{BspNode, CsgConfig, Mesh, Polygon, SourceId, Vertex};

/// Submesh index of polygons coming from the first operand.
pub const SOURCE_A: SourceId = 0;

/// Submesh index of polygons coming from the second operand.
pub const SOURCE_B: SourceId = 1;

/// The three boolean operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Everything inside either solid.
    Union,
    /// Everything inside the first solid but not the second.
    Subtract,
    /// Everything inside both solids.
    Intersect,
}

impl BooleanOp {
    /// All operations, in declaration order.
    pub const ALL: [BooleanOp; 3] = [
        BooleanOp::Union,
        BooleanOp::Subtract,
        BooleanOp::Intersect,
    ];

    /// Combines two solids, consuming both trees.
    pub fn combine(self, a: BspNode, b: BspNode) -> BspNode {
        match self {
            BooleanOp::Union => union(a, b),
            BooleanOp::Subtract => subtract(a, b),
            BooleanOp::Intersect => intersect(a, b),
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BooleanOp::Union => "union",
            BooleanOp::Subtract => "subtract",
            BooleanOp::Intersect => "intersect",
        };
        f.write_str(name)
    }
}

/// A mesh placed in the world by a transform.
#[derive(Debug, Clone, Copy)]
pub struct Solid<'a> {
    pub mesh: &'a Mesh,
    pub transform: Matrix4<f32>,
}

impl<'a> Solid<'a> {
    /// A mesh at the identity transform.
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            transform: Matrix4::identity(),
        }
    }

    /// Sets the local-to-world transform.
    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }
}

impl<'a> From<&'a Mesh> for Solid<'a> {
    fn from(mesh: &'a Mesh) -> Self {
        Self::new(mesh)
    }
}

/// Runs boolean operations with a fixed configuration.
///
/// Holds no state between calls; every call builds and discards its own
/// trees, so a single `Csg` can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Csg {
    config: CsgConfig,
}

impl Csg {
    pub fn new(config: CsgConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &CsgConfig {
        &self.config
    }

    /// `a ∪ b`
    pub fn union(&self, a: &Solid<'_>, b: &Solid<'_>) -> Result<Mesh> {
        self.apply(BooleanOp::Union, a, b)
    }

    /// `a − b`
    pub fn subtract(&self, a: &Solid<'_>, b: &Solid<'_>) -> Result<Mesh> {
        self.apply(BooleanOp::Subtract, a, b)
    }

    /// `a ∩ b`
    pub fn intersect(&self, a: &Solid<'_>, b: &Solid<'_>) -> Result<Mesh> {
        self.apply(BooleanOp::Intersect, a, b)
    }

    /// Runs `op` on two solids and returns the combined mesh.
    ///
    /// Submesh 0 holds the triangles from `a` (including cut seams filled by
    /// `a`'s surface), submesh 1 those from `b`. An empty result is a valid
    /// mesh with no triangles. Fails before any work if the configuration
    /// or either input is invalid.
    pub fn apply(&self, op: BooleanOp, a: &Solid<'_>, b: &Solid<'_>) -> Result<Mesh> {
        let span = debug_span!("csg", %op);
        let _guard = span.enter();

        let tree_a = self.to_bsp(a, SOURCE_A)?;
        let tree_b = self.to_bsp(b, SOURCE_B)?;

        let mesh = self.to_mesh(op.combine(tree_a, tree_b))?;
        debug!(
            input_triangles = a.mesh.triangle_count() + b.mesh.triangle_count(),
            output_triangles = mesh.triangle_count(),
            output_vertices = mesh.vertex_count(),
            "Boolean operation complete"
        );
        Ok(mesh)
    }

    /// Converts a placed mesh to world-space triangle polygons.
    ///
    /// Positions go through the full transform. Normals go through its
    /// linear part only (no inverse-transpose), then are renormalized, so
    /// non-uniform scale skews them.
    pub fn to_polygons(&self, solid: &Solid<'_>, source_id: SourceId) -> Result<Vec<Polygon>> {
        let mesh = solid.mesh;
        mesh.validate()?;
        if solid.transform.iter().any(|v| !v.is_finite()) {
            return Err(CsgError::NonFiniteTransform);
        }

        let vertex = |index: u32, face_normal: &Vector3<f32>| -> Vertex {
            let i = index as usize;
            let position = solid.transform.transform_point(&mesh.positions[i]);
            let normal = match mesh.normals.get(i) {
                Some(n) => {
                    let n = solid.transform.transform_vector(n);
                    n.try_normalize(f32::EPSILON).unwrap_or(n)
                }
                None => *face_normal,
            };
            let uv = mesh.uvs.get(i).copied().unwrap_or_else(Point2::origin);
            Vertex::new(position, normal, uv)
        };

        let polygons = mesh
            .triangles()
            .map(|[a, b, c]| {
                let face_normal = face_normal(solid, [a, b, c]);
                Polygon::new(
                    vec![
                        vertex(a, &face_normal),
                        vertex(b, &face_normal),
                        vertex(c, &face_normal),
                    ],
                    source_id,
                )
            })
            .collect();

        Ok(polygons)
    }

    /// Builds a fresh tree from a placed mesh.
    pub fn to_bsp(&self, solid: &Solid<'_>, source_id: SourceId) -> Result<BspNode> {
        self.config.validate()?;
        let polygons = self.to_polygons(solid, source_id)?;
        Ok(BspNode::from_polygons(polygons, self.config.epsilon))
    }

    /// Flattens a tree into a welded mesh.
    ///
    /// Polygons are fan-triangulated as `(v0, v[i-1], v[i])` and routed to
    /// the submesh matching their source id. Vertices are welded on snapped
    /// position and exact normal. Fails with [`CsgError::InvalidConfig`] if
    /// the weld tolerance is not a positive finite number.
    pub fn to_mesh(&self, tree: BspNode) -> Result<Mesh> {
        self.config.validate()?;
        let polygons = tree.into_polygons();

        let submesh_count = polygons
            .iter()
            .map(|p| p.source_id() + 1)
            .max()
            .unwrap_or(0)
            .max(SOURCE_B + 1);
        let mut submeshes = vec![Vec::new(); submesh_count];
        let mut welder = VertexWelder::new(self.config.weld_tolerance);
        let mut corner_count = 0usize;

        for polygon in &polygons {
            let indices: Vec<u32> = polygon
                .vertices()
                .iter()
                .map(|v| welder.insert(v))
                .collect();
            corner_count += indices.len();

            let submesh = &mut submeshes[polygon.source_id()];
            for i in 2..indices.len() {
                submesh.extend_from_slice(&[indices[0], indices[i - 1], indices[i]]);
            }
        }

        trace!(
            polygons = polygons.len(),
            corners = corner_count,
            welded = welder.len(),
            "Welded output vertices"
        );

        let (positions, normals, uvs) = welder.into_buffers();
        let mut mesh = Mesh::with_submeshes(positions, normals, uvs, submeshes);
        if self.config.recompute_tangents {
            mesh.recalculate_tangents();
        }
        Ok(mesh)
    }
}

/// Flat normal of a placed triangle, used when the mesh has no normals.
fn face_normal(solid: &Solid<'_>, [a, b, c]: [u32; 3]) -> Vector3<f32> {
    let p = |i: u32| solid.transform.transform_point(&solid.mesh.positions[i as usize]);
    let (pa, pb, pc) = (p(a), p(b), p(c));
    let n = (pb - pa).cross(&(pc - pa));
    n.try_normalize(f32::EPSILON).unwrap_or(n)
}

/// `a ∪ b` on trees.
pub fn union(mut a: BspNode, mut b: BspNode) -> BspNode {
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.into_polygons());
    a
}

/// `a − b` on trees.
pub fn subtract(mut a: BspNode, mut b: BspNode) -> BspNode {
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.into_polygons());
    a.invert();
    a
}

/// `a ∩ b` on trees.
pub fn intersect(mut a: BspNode, mut b: BspNode) -> BspNode {
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.into_polygons());
    a.invert();
    a
}
