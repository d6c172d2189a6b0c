use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of the given half extents centred on `center`.
    #[must_use]
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }
}

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        debug_assert!(radius >= 0.0, "bounding sphere radius must be non-negative");
        Self { center, radius }
    }
}

/// Object-space bounding volume of a cullable entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingVolume {
    Box(BoundingBox),
    Sphere(BoundingSphere),
}

impl From<BoundingBox> for BoundingVolume {
    fn from(aabb: BoundingBox) -> Self {
        BoundingVolume::Box(aabb)
    }
}

impl From<BoundingSphere> for BoundingVolume {
    fn from(sphere: BoundingSphere) -> Self {
        BoundingVolume::Sphere(sphere)
    }
}
