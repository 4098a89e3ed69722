//! Simulation parameters and partial updates.
//!
//! Parameters change only through [`SimulationParameters::apply`], which
//! validates a [`ParamsPatch`] as a whole before merging it.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Tunable constants of the force simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Inverse-square repulsion numerator (default: 500.0).
    pub repulsion_strength: f32,
    /// Pairs farther apart than this do not repel; also the grid cell size (default: 100.0).
    pub repulsion_radius: f32,
    /// Spring stiffness before edge weight (default: 0.02).
    pub spring_constant: f32,
    /// Length at which springs exert no force (default: 40.0).
    pub spring_rest_length: f32,
    /// Pull toward the origin per unit distance (default: 0.03).
    pub centering_coefficient: f32,
    /// Velocity retained per tick, in `[0, 1]` (default: 0.85).
    pub damping: f32,
    /// Speed clamp applied after damping (default: 20.0).
    pub max_speed: f32,
    /// Milliseconds between ticks when hosted on a timer (default: 16).
    pub tick_interval_ms: u64,
    /// Minimum milliseconds between published snapshots (default: 33).
    pub publish_interval_ms: u64,
    /// Seed for initial and reset placement (default: 0x5EED).
    pub seed: u64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            repulsion_strength: 500.0,
            repulsion_radius: 100.0,
            spring_constant: 0.02,
            spring_rest_length: 40.0,
            centering_coefficient: 0.03,
            damping: 0.85,
            max_speed: 20.0,
            tick_interval_ms: 16,
            publish_interval_ms: 33,
            seed: 0x5EED,
        }
    }
}

impl SimulationParameters {
    /// Check every field is finite and within range.
    pub fn validate(&self) -> Result<(), LayoutError> {
        non_negative("repulsionStrength", self.repulsion_strength)?;
        positive("repulsionRadius", self.repulsion_radius)?;
        non_negative("springConstant", self.spring_constant)?;
        non_negative("springRestLength", self.spring_rest_length)?;
        non_negative("centeringCoefficient", self.centering_coefficient)?;
        non_negative("damping", self.damping)?;
        if self.damping > 1.0 {
            return Err(LayoutError::InvalidParameter {
                name: "damping",
                reason: "must not exceed 1",
            });
        }
        positive("maxSpeed", self.max_speed)?;
        if self.tick_interval_ms == 0 {
            return Err(LayoutError::InvalidParameter {
                name: "tickIntervalMs",
                reason: "must be at least 1",
            });
        }
        if self.publish_interval_ms == 0 {
            return Err(LayoutError::InvalidParameter {
                name: "publishIntervalMs",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Merge `patch` into a copy of these parameters and validate the result.
    ///
    /// On error `self` is left untouched.
    pub fn apply(&mut self, patch: &ParamsPatch) -> Result<(), LayoutError> {
        let mut merged = *self;
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    merged.$field = value;
                })*
            };
        }
        merge!(
            repulsion_strength,
            repulsion_radius,
            spring_constant,
            spring_rest_length,
            centering_coefficient,
            damping,
            max_speed,
            tick_interval_ms,
            publish_interval_ms,
            seed,
        );
        merged.validate()?;
        *self = merged;
        Ok(())
    }
}

/// A partial update to [`SimulationParameters`]; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParamsPatch {
    pub repulsion_strength: Option<f32>,
    pub repulsion_radius: Option<f32>,
    pub spring_constant: Option<f32>,
    pub spring_rest_length: Option<f32>,
    pub centering_coefficient: Option<f32>,
    pub damping: Option<f32>,
    pub max_speed: Option<f32>,
    pub tick_interval_ms: Option<u64>,
    pub publish_interval_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl ParamsPatch {
    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidParameter {
            name,
            reason: "must be a finite, non-negative number",
        })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidParameter {
            name,
            reason: "must be a finite, positive number",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut params = SimulationParameters::default();
        let patch = ParamsPatch {
            damping: Some(0.5),
            ..Default::default()
        };
        params.apply(&patch).unwrap();
        assert_eq!(params.damping, 0.5);
        assert_eq!(params.repulsion_radius, 100.0);
    }

    #[test]
    fn test_rejected_patch_leaves_params_unchanged() {
        let mut params = SimulationParameters::default();
        let patch = ParamsPatch {
            damping: Some(0.5),
            max_speed: Some(f32::NAN),
            ..Default::default()
        };
        let err = params.apply(&patch).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidParameter { name: "maxSpeed", .. }));
        assert_eq!(params, SimulationParameters::default());
    }

    #[test]
    fn test_damping_above_one_rejected() {
        let mut params = SimulationParameters::default();
        let patch = ParamsPatch {
            damping: Some(1.5),
            ..Default::default()
        };
        assert!(params.apply(&patch).is_err());
    }

    #[test]
    fn test_patch_from_json() {
        let patch: ParamsPatch = serde_json::from_str(r#"{"damping":0.5}"#).unwrap();
        assert_eq!(patch.damping, Some(0.5));
        assert!(patch.repulsion_radius.is_none());
        assert!(!patch.is_empty());
        assert!(ParamsPatch::default().is_empty());
    }
}
