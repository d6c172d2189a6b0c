use std::cell::Cell;

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Local translation / rotation / scale of a node, relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    #[must_use]
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    /// Euler angles in radians, XYZ order.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Current rotation as XYZ Euler angles.
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Rotates so the local +Z axis points at `target`.
    ///
    /// `target` and `up` are expressed in the parent space. Leaves the
    /// rotation unchanged if the target coincides with the translation or
    /// the view direction is parallel to `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(forward) = (target - self.translation).try_normalize() else {
            return;
        };
        let Some(right) = up.cross(forward).try_normalize() else {
            return;
        };
        let up = forward.cross(right);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, forward));
    }

    /// `T * R * S`.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// `S⁻¹ * R⁻¹ * T⁻¹`, assembled from the components rather than by
    /// general inversion. A zero scale component yields non-finite entries.
    #[must_use]
    pub fn inverse_matrix(&self) -> Mat4 {
        Mat4::from_scale(self.scale.recip())
            * Mat4::from_quat(self.rotation.inverse())
            * Mat4::from_translation(-self.translation)
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A memoized derived matrix. `Stale` is the dirty flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Cached {
    Fresh(Mat4),
    Stale,
}

impl Cached {
    #[inline]
    pub(crate) fn fresh(self) -> Option<Mat4> {
        match self {
            Cached::Fresh(m) => Some(m),
            Cached::Stale => None,
        }
    }
}

/// Transform component of a [`Node`](crate::scene::Node).
///
/// Holds the local TRS and the lazily derived object-to-world and
/// world-to-object matrices. Local state is mutated through the
/// [`Scene`](crate::scene::Scene) setters so that the subtree can be
/// invalidated in the same call; derived state is resolved on query by
/// [`Scene::object_to_world`](crate::scene::Scene::object_to_world) and
/// [`Scene::world_to_object`](crate::scene::Scene::world_to_object).
///
/// The caches sit in [`Cell`]s so queries only need `&Scene`.
#[derive(Debug, Clone)]
pub struct Transform {
    local: LocalTransform,

    object_to_world: Cell<Cached>,
    world_to_object: Cell<Cached>,

    world_recomputations: Cell<u64>,
    inverse_recomputations: Cell<u64>,
}

impl Transform {
    #[must_use]
    pub fn new(local: LocalTransform) -> Self {
        Self {
            local,
            object_to_world: Cell::new(Cached::Stale),
            world_to_object: Cell::new(Cached::Stale),
            world_recomputations: Cell::new(0),
            inverse_recomputations: Cell::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn local(&self) -> &LocalTransform {
        &self.local
    }

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.local.translation
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.local.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.local.scale
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        self.local.matrix()
    }

    #[inline]
    #[must_use]
    pub fn local_inverse_matrix(&self) -> Mat4 {
        self.local.inverse_matrix()
    }

    /// Cached object-to-world matrix, if it is up to date.
    #[inline]
    #[must_use]
    pub fn cached_object_to_world(&self) -> Option<Mat4> {
        self.object_to_world.get().fresh()
    }

    /// Cached world-to-object matrix, if it is up to date.
    #[inline]
    #[must_use]
    pub fn cached_world_to_object(&self) -> Option<Mat4> {
        self.world_to_object.get().fresh()
    }

    /// Number of times the object-to-world matrix has been recomputed.
    #[inline]
    #[must_use]
    pub fn world_recomputations(&self) -> u64 {
        self.world_recomputations.get()
    }

    /// Number of times the world-to-object matrix has been recomputed.
    #[inline]
    #[must_use]
    pub fn inverse_recomputations(&self) -> u64 {
        self.inverse_recomputations.get()
    }

    #[inline]
    pub(crate) fn local_mut(&mut self) -> &mut LocalTransform {
        &mut self.local
    }

    /// Marks both caches stale. Returns `false` if both already were.
    pub(crate) fn invalidate(&self) -> bool {
        let was_stale = self.object_to_world.get() == Cached::Stale
            && self.world_to_object.get() == Cached::Stale;
        self.object_to_world.set(Cached::Stale);
        self.world_to_object.set(Cached::Stale);
        !was_stale
    }

    pub(crate) fn store_object_to_world(&self, matrix: Mat4) {
        self.object_to_world.set(Cached::Fresh(matrix));
        self.world_recomputations.set(self.world_recomputations.get() + 1);
    }

    pub(crate) fn store_world_to_object(&self, matrix: Mat4) {
        self.world_to_object.set(Cached::Fresh(matrix));
        self.inverse_recomputations.set(self.inverse_recomputations.get() + 1);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(LocalTransform::IDENTITY)
    }
}
