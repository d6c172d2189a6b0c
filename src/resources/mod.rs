//! Resource definitions shared by the scene and the visibility collector.
//!
//! - Bounds: bounding boxes, spheres and the tagged [`BoundingVolume`]
//! - Buffer: growable frame-reused record buffers
//! - Uniforms: fixed-layout GPU records
//! - Handles: opaque keys into the (external) asset storage

pub mod bounds;
pub mod buffer;
pub mod uniforms;

pub use bounds::{BoundingBox, BoundingSphere, BoundingVolume};
pub use buffer::{GpuBuffer, GrowthPolicy};
pub use uniforms::{
    DirectionalLightUniforms, ModelUniforms, OmniLightUniforms, SceneSummaryUniforms,
    SpotLightUniforms, UniformArray, WgslStruct, WgslType,
};

use slotmap::new_key_type;

new_key_type! {
    /// Mesh owned by the asset system.
    pub struct MeshHandle;
    /// Material owned by the asset system.
    pub struct MaterialHandle;
    /// Texture owned by the asset system.
    pub struct TextureHandle;
}
