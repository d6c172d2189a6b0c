//! Per-camera visibility and light assembly
//!
//! - [`VisibilityCollector`]: gather, cull, transform and pack per camera
//! - [`ShadingStage`]: the consumer of each prepared [`CameraFrame`]
//! - [`VisibilitySettings`]: buffer sizing and culling toggles
//! - `light_packer`: view-space record construction

pub mod light_packer;
pub mod settings;
pub mod visibility;

pub use settings::VisibilitySettings;
pub use visibility::{
    CameraFrame, CullStats, ModelDraw, ShadingStage, SpriteDraw, VisibilityCollector,
};
