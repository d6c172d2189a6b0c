//! Scene graph module
//!
//! Holds the hierarchy and its components:
//! - Node: identity, lifecycle state and the owned transform
//! - Transform: local TRS with memoized world / inverse-world matrices
//! - TransformSystem: lazy resolution and subtree invalidation
//! - Scene: the owning container
//! - Camera / Light / Model / Sprite: per-node components
//! - ViewFrustum: six-plane coverage tests

pub mod camera;
pub mod environment;
pub mod frustum;
pub mod light;
pub mod model;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod sprite;
pub mod transform;
pub mod transform_system;

pub use camera::{Camera, Projection, Viewport};
pub use environment::{Environment, Fog};
pub use frustum::{Coverage, FrustumPlane, FrustumShape, PlaneSpan, ViewFrustum};
pub use light::{ConeCutoff, DistanceFalloff, Light, LightKind, OmniLight, SpotLight};
pub use model::{Model, ModelCategory, ModelFlags};
pub use node::{Node, NodeId, NodeState, StateChange};
pub use scene::{NodeBuilder, RemovalPolicy, Scene};
pub use sprite::Sprite;
pub use transform::{LocalTransform, Transform};

use slotmap::new_key_type;

new_key_type! {
    /// Handle of a node inside a [`Scene`].
    pub struct NodeHandle;
}
