//! Tunable numeric parameters for boolean operations.
//!
//! The classification epsilon is the real error boundary of the engine: too
//! tight and near-coplanar slivers get split into micro-fragments, too loose
//! and distinct surfaces get merged. It is exposed here rather than caught.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CsgError, Result};

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f32 = 1e-5;

/// Default quantization step used when welding output vertices.
pub const WELD_TOLERANCE: f32 = 1e-4;

/// Parameters shared by every stage of a boolean operation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CsgConfig {
    /// Distance under which a point is classified as lying on a plane.
    pub epsilon: f32,
    /// Grid size of the spatial hash used to weld output vertices.
    pub weld_tolerance: f32,
    /// Whether tangents are recomputed on the output mesh.
    pub recompute_tangents: bool,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            epsilon: PLANE_EPSILON,
            weld_tolerance: WELD_TOLERANCE,
            recompute_tangents: true,
        }
    }
}

impl CsgConfig {
    /// Tighter tolerances for small, carefully modelled inputs.
    pub fn precise() -> Self {
        Self {
            epsilon: 1e-6,
            weld_tolerance: 1e-5,
            ..Self::default()
        }
    }

    /// Looser tolerances for large or noisy inputs.
    pub fn loose() -> Self {
        Self {
            epsilon: 1e-4,
            weld_tolerance: 1e-3,
            ..Self::default()
        }
    }

    /// Sets the plane classification epsilon.
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the welding grid size.
    pub fn with_weld_tolerance(mut self, weld_tolerance: f32) -> Self {
        self.weld_tolerance = weld_tolerance;
        self
    }

    /// Enables or disables tangent recomputation on output meshes.
    pub fn with_tangents(mut self, recompute_tangents: bool) -> Self {
        self.recompute_tangents = recompute_tangents;
        self
    }

    /// Checks that both tolerances are usable.
    ///
    /// `epsilon` must be finite and non-negative. `weld_tolerance` must be
    /// finite and strictly positive, since it is inverted to get the grid
    /// scale.
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(CsgError::InvalidConfig {
                parameter: "epsilon",
                value: self.epsilon,
            });
        }
        if !(self.weld_tolerance.is_finite() && self.weld_tolerance > 0.0) {
            return Err(CsgError::InvalidConfig {
                parameter: "weld_tolerance",
                value: self.weld_tolerance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_crate_constants() {
        let config = CsgConfig::default();
        assert_eq!(config.epsilon, PLANE_EPSILON);
        assert_eq!(config.weld_tolerance, WELD_TOLERANCE);
        assert!(config.recompute_tangents);
    }

    #[test]
    fn presets_order_tolerances() {
        let precise = CsgConfig::precise();
        let loose = CsgConfig::loose();
        assert!(precise.epsilon < PLANE_EPSILON);
        assert!(loose.epsilon > PLANE_EPSILON);
        assert!(precise.weld_tolerance < loose.weld_tolerance);
    }

    #[test]
    fn builders_override_fields() {
        let config = CsgConfig::default()
            .with_epsilon(0.5)
            .with_weld_tolerance(0.25)
            .with_tangents(false);
        assert_eq!(config.epsilon, 0.5);
        assert_eq!(config.weld_tolerance, 0.25);
        assert!(!config.recompute_tangents);
    }

    #[test]
    fn validate_accepts_presets() {
        assert!(CsgConfig::default().validate().is_ok());
        assert!(CsgConfig::precise().validate().is_ok());
        assert!(CsgConfig::loose().validate().is_ok());
        assert!(CsgConfig::default().with_epsilon(0.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_weld_tolerance() {
        for value in [0.0, -1e-4, f32::INFINITY] {
            let config = CsgConfig::default().with_weld_tolerance(value);
            assert_eq!(
                config.validate(),
                Err(CsgError::InvalidConfig {
                    parameter: "weld_tolerance",
                    value,
                })
            );
        }
        let nan = CsgConfig::default().with_weld_tolerance(f32::NAN);
        assert!(matches!(
            nan.validate(),
            Err(CsgError::InvalidConfig {
                parameter: "weld_tolerance",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_bad_epsilon() {
        for value in [-1e-5, f32::NEG_INFINITY] {
            let config = CsgConfig::default().with_epsilon(value);
            assert!(matches!(
                config.validate(),
                Err(CsgError::InvalidConfig {
                    parameter: "epsilon",
                    ..
                })
            ));
        }
    }
}
