//! Binary Space Partitioning tree for solid modelling.
//!
//! A BSP tree built from the closed surface of a solid encodes both the
//! surface (the polygons stored at each node) and the solid's interior: a
//! point that ends up behind a node with no back child is inside. This
//! makes the tree usable for boolean operations:
//!
//! - [`BspNode::clip_polygons`] removes the parts of a polygon list inside the solid
//! - [`BspNode::clip_to`] removes the parts of one tree inside another
//! - [`BspNode::invert`] swaps inside and outside
//! - [`BspNode::build`] merges more polygons into an existing tree
//!
//! # Example
//!
//! ```ignore
//! use bsp_csg::{BspNode, PLANE_EPSILON};
//!
//! let mut a = BspNode::from_polygons(polygons_a, PLANE_EPSILON);
//! let b = BspNode::from_polygons(polygons_b, PLANE_EPSILON);
//!
//! // Drop every surface of `a` that lies inside `b`
//! a.clip_to(&b);
//! let remaining = a.all_polygons();
//! ```

mod node;

pub use node::BspNode;
