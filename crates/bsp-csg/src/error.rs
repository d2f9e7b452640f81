//! Errors for malformed mesh buffers and out-of-range tolerances.
//!
//! Degenerate geometry (collinear triangles, open or non-manifold meshes) is
//! never an error. Only buffers that cannot be read as triangles at all are.

use thiserror::Error;

/// Result type for CSG operations.
pub type Result<T> = std::result::Result<T, CsgError>;

/// Errors raised while reading input meshes or configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsgError {
    #[error("submesh {submesh} has {count} indices, which is not a multiple of 3")]
    IndexCountNotTriangles { submesh: usize, count: usize },

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{attribute} buffer has {actual} entries, expected {expected}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("world transform contains non-finite values")]
    NonFiniteTransform,

    #[error("invalid {parameter}: {value}")]
    InvalidConfig { parameter: &'static str, value: f32 },
}
