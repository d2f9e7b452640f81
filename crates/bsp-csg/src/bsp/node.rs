//! BSP tree node implementation.

use tracing::debug;

use crate::{Plane3D, Polygon, Split, PLANE_EPSILON};

/// A node in the BSP tree, and by extension the solid it bounds.
///
/// Each node partitions space using a splitting plane and stores the
/// polygons that lie on that plane. A node with no plane and no children is
/// the empty solid.
///
/// # Ownership
///
/// Children are owned outright; there is no sharing between trees. Boolean
/// operations mutate trees destructively ([`BspNode::clip_to`],
/// [`BspNode::invert`]), so a tree is built once per operation and thrown
/// away afterwards.
#[derive(Debug, Clone)]
pub struct BspNode {
    /// The splitting plane for this node, adopted from the first polygon built into it.
    plane: Option<Plane3D>,

    /// Polygons coplanar with the plane, in either facing.
    polygons: Vec<Polygon>,

    /// Subtree containing polygons in FRONT of the splitting plane.
    front: Option<Box<BspNode>>,

    /// Subtree containing polygons BEHIND the splitting plane.
    back: Option<Box<BspNode>>,

    /// Plane classification tolerance, inherited by every child.
    epsilon: f32,
}

impl Default for BspNode {
    fn default() -> Self {
        Self::new()
    }
}

impl BspNode {
    /// Creates an empty node (the empty solid) using [`PLANE_EPSILON`].
    pub fn new() -> Self {
        Self::with_epsilon(PLANE_EPSILON)
    }

    /// Creates an empty node with a custom classification tolerance.
    pub fn with_epsilon(epsilon: f32) -> Self {
        Self {
            plane: None,
            polygons: Vec::new(),
            front: None,
            back: None,
            epsilon,
        }
    }

    /// Builds a tree from a list of polygons.
    pub fn from_polygons(polygons: Vec<Polygon>, epsilon: f32) -> Self {
        let mut node = Self::with_epsilon(epsilon);
        node.build(polygons);
        debug!(
            polygons = node.polygon_count(),
            depth = node.depth(),
            "Built BSP tree"
        );
        node
    }

    /// Returns the splitting plane, if any polygon has been built into this node.
    #[inline]
    pub fn plane(&self) -> Option<&Plane3D> {
        self.plane.as_ref()
    }

    /// Returns the polygons stored at this node.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Returns the classification tolerance used by this node.
    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Returns true for the empty solid: no plane and no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plane.is_none() && self.is_leaf()
    }

    /// Returns the total number of polygons in this subtree.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
            + self.front.as_ref().map_or(0, |n| n.polygon_count())
            + self.back.as_ref().map_or(0, |n| n.polygon_count())
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let front_depth = self.front.as_ref().map_or(0, |n| n.depth());
        let back_depth = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front_depth.max(back_depth)
    }

    /// Inserts polygons into the tree.
    ///
    /// The first polygon's plane becomes this node's plane if it has none.
    /// Coplanar polygons of either facing stay at this node; the rest are
    /// split and pushed into lazily created children.
    ///
    /// Building is additive: an existing plane, polygon list and children
    /// are kept and the new polygons merged in. The final step of every
    /// boolean operation relies on this.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = self
            .plane
            .get_or_insert_with(|| first.plane().clone())
            .clone();

        let mut front_list = Vec::new();
        let mut back_list = Vec::new();

        for polygon in polygons {
            match plane.split(polygon, self.epsilon) {
                Split::CoplanarFront(p) | Split::CoplanarBack(p) => self.polygons.push(p),
                Split::Front(p) => front_list.push(p),
                Split::Back(p) => back_list.push(p),
                Split::Spanning { front, back } => {
                    front_list.extend(front);
                    back_list.extend(back);
                }
            }
        }

        let epsilon = self.epsilon;
        if !front_list.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(BspNode::with_epsilon(epsilon)))
                .build(front_list);
        }
        if !back_list.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(BspNode::with_epsilon(epsilon)))
                .build(back_list);
        }
    }

    /// Removes the parts of `polygons` that lie inside the solid this tree
    /// bounds.
    ///
    /// Coplanar polygons follow their facing: same-facing ones are treated
    /// as front, opposed ones as back. Anything that reaches a missing back
    /// child is inside the solid and dropped; anything that reaches a
    /// missing front child is kept.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };

        let mut front_list = Vec::new();
        let mut back_list = Vec::new();

        for polygon in polygons {
            match plane.split(polygon, self.epsilon) {
                Split::CoplanarFront(p) | Split::Front(p) => front_list.push(p),
                Split::CoplanarBack(p) | Split::Back(p) => back_list.push(p),
                Split::Spanning { front, back } => {
                    front_list.extend(front);
                    back_list.extend(back);
                }
            }
        }

        let mut result = match &self.front {
            Some(front) => front.clip_polygons(front_list),
            None => front_list,
        };
        if let Some(back) = &self.back {
            result.extend(back.clip_polygons(back_list));
        }

        result
    }

    /// Removes every polygon in this tree that lies inside `other`.
    pub fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));

        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// Turns the solid inside out.
    ///
    /// Flips every polygon and the plane, inverts both subtrees, and only
    /// then swaps them.
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }

        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }

        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Collects all polygons in this subtree, depth-first: this node's own
    /// polygons, then the front subtree, then the back subtree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        self.collect_polygons(&mut result);
        result
    }

    fn collect_polygons(&self, result: &mut Vec<Polygon>) {
        result.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_polygons(result);
        }
        if let Some(back) = &self.back {
            back.collect_polygons(result);
        }
    }

    /// Consumes the tree and returns all of its polygons in
    /// [`BspNode::all_polygons`] order.
    pub fn into_polygons(self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        self.drain_into(&mut result);
        result
    }

    fn drain_into(self, result: &mut Vec<Polygon>) {
        result.extend(self.polygons);
        if let Some(front) = self.front {
            front.drain_into(result);
        }
        if let Some(back) = self.back {
            back.drain_into(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point3, Vector3};

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Polygon {
        let v = |p: [f32; 3]| Vertex::with_normal(Point3::new(p[0], p[1], p[2]), Vector3::zeros());
        Polygon::new(vec![v(a), v(b), v(c)], 0)
    }

    /// Axis-aligned box `[min, max]` as 12 outward-facing triangles.
    fn make_box(min: [f32; 3], max: [f32; 3]) -> Vec<Polygon> {
        let c = |i: usize| {
            [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ]
        };
        // Quads wound counter-clockwise seen from outside
        let faces: [[usize; 4]; 6] = [
            [0, 4, 6, 2], // -X
            [1, 3, 7, 5], // +X
            [0, 1, 5, 4], // -Y
            [2, 6, 7, 3], // +Y
            [0, 2, 3, 1], // -Z
            [4, 5, 7, 6], // +Z
        ];
        faces
            .iter()
            .flat_map(|f| {
                [
                    make_triangle(c(f[0]), c(f[1]), c(f[2])),
                    make_triangle(c(f[0]), c(f[2]), c(f[3])),
                ]
            })
            .collect()
    }

    fn total_area(polygons: &[Polygon]) -> f32 {
        polygons.iter().map(Polygon::area).sum()
    }

    #[test]
    fn new_node_is_empty_solid() {
        let node = BspNode::new();
        assert!(node.is_empty());
        assert!(node.is_leaf());
        assert_eq!(node.polygon_count(), 0);
        assert_eq!(node.depth(), 1);
        assert_eq!(node.epsilon(), PLANE_EPSILON);
    }

    #[test]
    fn build_empty_is_noop() {
        let mut node = BspNode::new();
        node.build(vec![]);
        assert!(node.is_empty());
    }

    #[test]
    fn build_single_polygon() {
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let node = BspNode::from_polygons(vec![poly.clone()], PLANE_EPSILON);

        assert_eq!(node.plane(), Some(poly.plane()));
        assert_eq!(node.polygons().len(), 1);
        assert!(node.is_leaf());
    }

    #[test]
    fn build_keeps_both_facings_at_node() {
        let up = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let down = make_triangle([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
        let node = BspNode::from_polygons(vec![up, down], PLANE_EPSILON);

        assert_eq!(node.polygons().len(), 2);
        assert!(node.is_leaf());
    }

    #[test]
    fn build_spanning_polygon_gets_split() {
        // First polygon on Y=0 plane
        let splitter = make_triangle([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        // Second polygon spans the Y=0 plane
        let spanning = make_triangle([-0.5, -1.0, 0.5], [0.5, -1.0, 0.5], [0.5, 1.0, 0.5]);

        let node = BspNode::from_polygons(vec![splitter, spanning], PLANE_EPSILON);

        assert_eq!(node.polygon_count(), 3);
        assert_eq!(node.front().map(BspNode::polygon_count), Some(1));
        assert_eq!(node.back().map(BspNode::polygon_count), Some(1));
    }

    #[test]
    fn build_is_additive() {
        let first = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let mut node = BspNode::from_polygons(vec![first.clone()], PLANE_EPSILON);

        let above = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        node.build(vec![above]);

        // Original plane and polygon are kept, new one lands in the front child
        assert_eq!(node.plane(), Some(first.plane()));
        assert_eq!(node.polygons().len(), 1);
        assert_eq!(node.polygon_count(), 2);
        assert!(node.front().is_some());

        let below = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);
        node.build(vec![below]);
        assert_eq!(node.polygon_count(), 3);
        assert!(node.back().is_some());
    }

    #[test]
    fn clip_polygons_without_plane_returns_input() {
        let node = BspNode::new();
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(node.clip_polygons(vec![poly.clone()]), vec![poly]);
    }

    #[test]
    fn clip_polygons_drops_inside_keeps_outside() {
        let solid = BspNode::from_polygons(make_box([0.0; 3], [1.0; 3]), PLANE_EPSILON);

        let inside = make_triangle([0.2, 0.2, 0.5], [0.8, 0.2, 0.5], [0.2, 0.8, 0.5]);
        let outside = make_triangle([2.0, 2.0, 2.0], [3.0, 2.0, 2.0], [2.0, 3.0, 2.0]);

        let result = solid.clip_polygons(vec![inside, outside.clone()]);
        assert_eq!(result, vec![outside]);
    }

    #[test]
    fn clip_polygons_trims_straddling_polygon() {
        let solid = BspNode::from_polygons(make_box([0.0; 3], [1.0; 3]), PLANE_EPSILON);

        // Square at z = 0.5 covering x in [0.5, 1.5], y in [0.25, 0.75]
        let v = |x: f32, y: f32| Vertex::with_normal(Point3::new(x, y, 0.5), Vector3::z());
        let quad = Polygon::new(vec![v(0.5, 0.25), v(1.5, 0.25), v(1.5, 0.75), v(0.5, 0.75)], 0);

        let result = solid.clip_polygons(vec![quad]);
        assert_abs_diff_eq!(total_area(&result), 0.25, epsilon = 1e-5);
        for p in &result {
            for v in p.vertices() {
                assert!(v.position.x >= 1.0 - 1e-5);
            }
        }
    }

    #[test]
    fn clip_to_removes_overlapping_surface() {
        let mut a = BspNode::from_polygons(make_box([0.0; 3], [1.0; 3]), PLANE_EPSILON);
        let b = BspNode::from_polygons(make_box([0.5, -1.0, -1.0], [2.0, 2.0, 2.0]), PLANE_EPSILON);

        a.clip_to(&b);

        // Half of the -Y, +Y, -Z, +Z faces and the whole +X face are inside b
        let remaining = a.all_polygons();
        assert_abs_diff_eq!(total_area(&remaining), 1.0 + 4.0 * 0.5, epsilon = 1e-4);
        for p in &remaining {
            for v in p.vertices() {
                assert!(v.position.x <= 0.5 + 1e-5);
            }
        }
    }

    #[test]
    fn invert_flips_and_swaps_children() {
        let splitter = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let above = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let mut node = BspNode::from_polygons(vec![splitter, above], PLANE_EPSILON);
        assert!(node.front().is_some());
        assert!(node.back().is_none());

        node.invert();

        assert_eq!(node.plane().map(Plane3D::normal), Some(Vector3::new(0.0, 0.0, -1.0)));
        assert!(node.front().is_none());
        let back = node.back().expect("front subtree moved to back");
        // Child was itself inverted before the swap
        assert_eq!(
            back.polygons()[0].plane().normal(),
            Vector3::new(0.0, 0.0, -1.0)
        );
        // With the plane flipped, the child must still be on its back side
        let plane = node.plane().expect("plane");
        assert!(plane.signed_distance(back.polygons()[0].centroid()) < 0.0);
    }

    #[test]
    fn invert_twice_restores_tree() {
        let polygons = make_box([0.0; 3], [1.0; 3]);
        let mut node = BspNode::from_polygons(polygons, PLANE_EPSILON);
        let original = node.all_polygons();

        node.invert();
        assert_ne!(node.all_polygons(), original);
        node.invert();
        assert_eq!(node.all_polygons(), original);
    }

    #[test]
    fn inverted_solid_keeps_inside_drops_outside() {
        let mut solid = BspNode::from_polygons(make_box([0.0; 3], [1.0; 3]), PLANE_EPSILON);
        solid.invert();

        let inside = make_triangle([0.2, 0.2, 0.5], [0.8, 0.2, 0.5], [0.2, 0.8, 0.5]);
        let outside = make_triangle([2.0, 2.0, 2.0], [3.0, 2.0, 2.0], [2.0, 3.0, 2.0]);

        let result = solid.clip_polygons(vec![inside.clone(), outside]);
        assert_eq!(result, vec![inside]);
    }

    #[test]
    fn all_polygons_depth_first_order() {
        let root = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let above = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let below = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);

        let node = BspNode::from_polygons(
            vec![root.clone(), below.clone(), above.clone()],
            PLANE_EPSILON,
        );

        assert_eq!(node.all_polygons(), vec![root.clone(), above.clone(), below.clone()]);
        assert_eq!(node.into_polygons(), vec![root, above, below]);
    }
}
