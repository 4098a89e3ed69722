//! Engine configuration.
//!
//! Every section and field has a default, so `{}` is a complete config and
//! callers only spell out what they change:
//!
//! ```json
//! { "simulation": { "damping": 0.8 }, "sampler": { "edgeBudget": 200 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::layout::SimulationParameters;
use crate::sampler::SamplerConfig;

/// Top-level configuration for sampling and simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Force simulation parameters.
    pub simulation: SimulationParameters,
    /// Edge sampling limits and thresholds.
    pub sampler: SamplerConfig,
}

impl LayoutConfig {
    /// Parse and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check both sections.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.simulation.validate()?;
        self.sampler.validate()
    }
}
