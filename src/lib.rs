#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Hierarchical transform cache, view-frustum culling and per-camera light
//! assembly for a real-time 3D renderer.

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{PrismError, Result};
pub use renderer::{CameraFrame, ShadingStage, VisibilityCollector, VisibilitySettings};
pub use resources::{BoundingBox, BoundingSphere, BoundingVolume, GpuBuffer, GrowthPolicy};
pub use scene::{
    Camera, Coverage, Light, LocalTransform, Model, Node, NodeHandle, Scene, ViewFrustum,
};
