use glam::{Vec2, Vec4};

use crate::resources::TextureHandle;

/// Screen-space textured quad anchored at its node's origin.
///
/// Sprites are collected per frame but never frustum-culled.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub texture: TextureHandle,
    pub size: Vec2,
    pub tint: Vec4,
}

impl Sprite {
    #[must_use]
    pub fn new(texture: TextureHandle, size: Vec2) -> Self {
        Self {
            texture,
            size,
            tint: Vec4::ONE,
        }
    }

    #[must_use]
    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = tint;
        self
    }
}
