//! Visibility Collector Settings
//!
//! Configuration consumed once by [`VisibilityCollector::new`] to size the
//! per-kind record buffers and pick the culling behaviour.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prism::renderer::{VisibilitySettings, VisibilityCollector};
//! use prism::resources::GrowthPolicy;
//!
//! // Default: 8 records per light kind, doubling growth, culling on
//! let settings = VisibilitySettings::default();
//!
//! // Tight memory budget, lights never culled (debug view)
//! let settings = VisibilitySettings {
//!     growth: GrowthPolicy::Fit,
//!     cull_lights: false,
//!     ..Default::default()
//! };
//!
//! let collector = VisibilityCollector::new(settings)?;
//! ```
//!
//! [`VisibilityCollector::new`]: crate::renderer::VisibilityCollector::new

use serde::{Deserialize, Serialize};

use crate::errors::{PrismError, Result};
use crate::resources::GrowthPolicy;

/// Upper bound accepted for any initial buffer capacity.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Configuration of a [`VisibilityCollector`](crate::renderer::VisibilityCollector).
///
/// | Field                          | Description                          | Default  |
/// |--------------------------------|--------------------------------------|----------|
/// | `initial_directional_capacity` | Directional light records            | 8        |
/// | `initial_omni_capacity`        | Omni light records                   | 8        |
/// | `initial_spot_capacity`        | Spot light records                   | 8        |
/// | `initial_model_capacity`       | Model uniform records                | 64       |
/// | `growth`                       | Buffer growth policy                 | `Double` |
/// | `max_buffer_records`           | Record limit per buffer (`None` = ∞) | `None`   |
/// | `cull_lights`                  | Frustum-cull omni and spot lights    | `true`   |
/// | `cull_models`                  | Frustum-cull models                  | `true`   |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    // === Buffer sizing ===
    pub initial_directional_capacity: usize,
    pub initial_omni_capacity: usize,
    pub initial_spot_capacity: usize,
    pub initial_model_capacity: usize,

    /// How buffers grow when a frame outgrows them.
    pub growth: GrowthPolicy,
    /// Device limit on records per light or model buffer. A frame that
    /// needs more fails with [`PrismError::BufferLimit`].
    pub max_buffer_records: Option<usize>,

    // === Culling ===
    /// When `false`, every active light reaches the shading stage.
    pub cull_lights: bool,
    /// When `false`, every active non-degenerate model is drawn.
    pub cull_models: bool,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            initial_directional_capacity: 8,
            initial_omni_capacity: 8,
            initial_spot_capacity: 8,
            initial_model_capacity: 64,
            growth: GrowthPolicy::Double,
            max_buffer_records: None,
            cull_lights: true,
            cull_models: true,
        }
    }
}

impl VisibilitySettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects capacities above [`MAX_INITIAL_CAPACITY`] or above
    /// `max_buffer_records`.
    pub fn validate(&self) -> Result<()> {
        let capacities = [
            ("initial_directional_capacity", self.initial_directional_capacity),
            ("initial_omni_capacity", self.initial_omni_capacity),
            ("initial_spot_capacity", self.initial_spot_capacity),
            ("initial_model_capacity", self.initial_model_capacity),
        ];
        for (name, value) in capacities {
            if value > MAX_INITIAL_CAPACITY {
                return Err(PrismError::InvalidSettings(format!(
                    "{name} = {value} exceeds the maximum of {MAX_INITIAL_CAPACITY}"
                )));
            }
            if let Some(limit) = self.max_buffer_records
                && value > limit
            {
                return Err(PrismError::InvalidSettings(format!(
                    "{name} = {value} exceeds max_buffer_records = {limit}"
                )));
            }
        }
        Ok(())
    }
}
