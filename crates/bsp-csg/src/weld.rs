//! Vertex welding for output meshes.

use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::Vertex;

/// Hash key: position snapped to the weld grid plus the exact normal bits.
///
/// Vertices at the same place but with different normals stay distinct, so
/// hard edges along cut seams survive welding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WeldKey {
    cell: [i64; 3],
    normal: [u32; 3],
}

impl WeldKey {
    fn new(vertex: &Vertex, inv_tolerance: f32) -> Self {
        let p = vertex.position;
        let n = vertex.normal;
        Self {
            cell: [
                quantize(p.x, inv_tolerance),
                quantize(p.y, inv_tolerance),
                quantize(p.z, inv_tolerance),
            ],
            normal: [normal_bits(n.x), normal_bits(n.y), normal_bits(n.z)],
        }
    }
}

#[inline]
fn quantize(value: f32, inv_tolerance: f32) -> i64 {
    (value * inv_tolerance).round() as i64
}

/// Bit pattern of a normal component with `-0.0` folded into `0.0`, so the
/// key agrees with float equality.
#[inline]
fn normal_bits(value: f32) -> u32 {
    if value == 0.0 { 0.0f32.to_bits() } else { value.to_bits() }
}

/// Accumulates a deduplicated vertex buffer.
///
/// The first vertex inserted for a key defines the stored position, normal
/// and uv.
#[derive(Debug)]
pub struct VertexWelder {
    inv_tolerance: f32,
    lookup: FxHashMap<WeldKey, u32>,
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    uvs: Vec<Point2<f32>>,
}

impl VertexWelder {
    /// Creates a welder snapping positions to a grid of `tolerance` units.
    ///
    /// `tolerance` must be finite and positive; [`CsgConfig::validate`]
    /// checks this for the combinator.
    ///
    /// [`CsgConfig::validate`]: crate::CsgConfig::validate
    pub fn new(tolerance: f32) -> Self {
        debug_assert!(
            tolerance.is_finite() && tolerance > 0.0,
            "weld tolerance must be finite and positive"
        );
        Self {
            inv_tolerance: 1.0 / tolerance,
            lookup: FxHashMap::default(),
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    /// Returns the index of an equivalent vertex, inserting it if new.
    pub fn insert(&mut self, vertex: &Vertex) -> u32 {
        let key = WeldKey::new(vertex, self.inv_tolerance);
        *self.lookup.entry(key).or_insert_with(|| {
            let index = self.positions.len() as u32;
            self.positions.push(vertex.position);
            self.normals.push(vertex.normal);
            self.uvs.push(vertex.uv);
            index
        })
    }

    /// Number of distinct vertices so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the welded `(positions, normals, uvs)` buffers.
    pub fn into_buffers(self) -> (Vec<Point3<f32>>, Vec<Vector3<f32>>, Vec<Point2<f32>>) {
        (self.positions, self.normals, self.uvs)
    }
}
