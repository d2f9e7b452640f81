//! Constructive solid geometry on triangle meshes using BSP trees.
//!
//! Two meshes are turned into BSP trees of convex polygons, combined with
//! [`BooleanOp::Union`], [`BooleanOp::Subtract`] or [`BooleanOp::Intersect`],
//! and flattened back into a welded [`Mesh`] whose submesh `0` holds the
//! surviving surface of the first operand and submesh `1` that of the second.
//!
//! ```ignore
//! use bsp_csg::{Csg, Mesh, Solid};
//! use nalgebra::{Point3, Translation3, Vector3};
//!
//! let cube = Mesh::cuboid(Point3::origin(), Vector3::repeat(1.0));
//! let offset = Translation3::new(0.5, 0.5, 0.5).to_homogeneous();
//!
//! let notched = Csg::default().subtract(
//!     &Solid::new(&cube),
//!     &Solid::new(&cube).with_transform(offset),
//! )?;
//! ```

pub mod bsp;
mod config;
pub mod csg;
mod error;
mod mesh;
mod plane;
mod polygon;
mod split;
mod vertex;
mod weld;

pub use bsp::BspNode;
pub use config::{CsgConfig, PLANE_EPSILON, WELD_TOLERANCE};
pub use csg::{BooleanOp, Csg, Solid, SOURCE_A, SOURCE_B};
pub use error::{CsgError, Result};
pub use mesh::{Aabb, Mesh};
pub use plane::{Classification, Plane3D, PlaneSide};
pub use polygon::{Polygon, SourceId};
pub use split::Split;
pub use vertex::Vertex;
pub use weld::VertexWelder;
