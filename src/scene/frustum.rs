//! View Frustum
//!
//! A six-plane convex volume extracted from any 4×4 transform, plus the
//! coverage tests used for culling.
//!
//! # Plane Space
//!
//! [`ViewFrustum::new`] accepts a view-to-projection, world-to-projection or
//! object-to-projection transform. The planes come out in the *source* space
//! of that transform, so the same type serves view-space tests, world-space
//! tests and (the collector's hot path) object-space tests against untouched
//! local bounding volumes.
//!
//! # Predicates
//!
//! Every shape reduces, per plane, to a signed-distance interval
//! `[nearest, farthest]` ([`PlaneSpan`]). All predicates are expressed on
//! those intervals:
//!
//! | Predicate            | Holds when                                                    |
//! |----------------------|---------------------------------------------------------------|
//! | `encloses`           | every `nearest >= 0`                                          |
//! | `encloses_strict`    | every `nearest > 0`                                           |
//! | `overlaps`           | every `farthest >= 0`                                         |
//! | `overlaps_strict`    | every `farthest > 0`                                          |
//! | `intersects(ε)`      | every `farthest >= -ε` and some `nearest < ε`                 |
//! | `intersects_strict(ε)` | every `farthest >= -ε` and some `nearest <= ε`             |
//!
//! The non-strict family treats exact contact as being inside; the strict
//! family treats it as crossing the boundary. Pick the family matching
//! whether boundary-touching geometry should render.
//!
//! Distances are linear (never squared). A NaN distance is replaced by
//! `-∞`, so degenerate input classifies as [`Coverage::NoCoverage`].

use glam::{Mat4, Vec3, Vec4};

use crate::resources::{BoundingBox, BoundingSphere, BoundingVolume};

/// How much of a shape lies inside a frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    NoCoverage,
    PartialCoverage,
    FullCoverage,
}

impl Coverage {
    /// `true` for partial or full coverage.
    #[inline]
    #[must_use]
    pub fn is_visible(self) -> bool {
        self != Coverage::NoCoverage
    }
}

/// Index of a frustum plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

impl FrustumPlane {
    pub const ALL: [FrustumPlane; 6] = [
        FrustumPlane::Left,
        FrustumPlane::Right,
        FrustumPlane::Bottom,
        FrustumPlane::Top,
        FrustumPlane::Near,
        FrustumPlane::Far,
    ];
}

/// Signed-distance interval of a shape relative to one plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSpan {
    /// Distance of the point of the shape deepest on the outward side.
    pub nearest: f32,
    /// Distance of the point of the shape deepest on the inward side.
    pub farthest: f32,
}

impl PlaneSpan {
    #[inline]
    #[must_use]
    pub fn new(nearest: f32, farthest: f32) -> Self {
        if nearest.is_nan() || farthest.is_nan() {
            return Self {
                nearest: f32::NEG_INFINITY,
                farthest: f32::NEG_INFINITY,
            };
        }
        Self { nearest, farthest }
    }
}

/// A shape that can be tested against frustum planes.
pub trait FrustumShape {
    /// Signed-distance interval of the shape w.r.t. a normalized plane.
    fn plane_span(&self, plane: Vec4) -> PlaneSpan;
}

#[inline]
fn plane_distance(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

impl FrustumShape for Vec3 {
    #[inline]
    fn plane_span(&self, plane: Vec4) -> PlaneSpan {
        let d = plane_distance(plane, *self);
        PlaneSpan::new(d, d)
    }
}

impl FrustumShape for BoundingBox {
    #[inline]
    fn plane_span(&self, plane: Vec4) -> PlaneSpan {
        // Corner selection per plane: along the normal the max corner is the
        // deepest inside, the min corner the deepest outside.
        let positive = plane.truncate().cmpge(Vec3::ZERO);
        let inward_corner = Vec3::select(positive, self.max, self.min);
        let outward_corner = Vec3::select(positive, self.min, self.max);
        PlaneSpan::new(
            plane_distance(plane, outward_corner),
            plane_distance(plane, inward_corner),
        )
    }
}

impl FrustumShape for BoundingSphere {
    #[inline]
    fn plane_span(&self, plane: Vec4) -> PlaneSpan {
        let d = plane_distance(plane, self.center);
        PlaneSpan::new(d - self.radius, d + self.radius)
    }
}

impl FrustumShape for BoundingVolume {
    #[inline]
    fn plane_span(&self, plane: Vec4) -> PlaneSpan {
        match self {
            BoundingVolume::Box(aabb) => aabb.plane_span(plane),
            BoundingVolume::Sphere(sphere) => sphere.plane_span(plane),
        }
    }
}

/// Six inward-facing normalized planes: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrustum {
    planes: [Vec4; 6],
}

impl ViewFrustum {
    /// Extracts the frustum planes of `transform` (Gribb-Hartmann).
    ///
    /// With clip coordinates `(x', y', z', w') = transform * p`, the planes
    /// are the half-spaces `-w'≤x'`, `x'≤w'`, `-w'≤y'`, `y'≤w'`, `0≤z'` and
    /// `z'≤w'`, i.e. sums and differences of the transform's rows.
    #[must_use]
    pub fn new(transform: &Mat4) -> Self {
        let rows = [
            transform.row(0),
            transform.row(1),
            transform.row(2),
            transform.row(3),
        ];

        let mut planes = [
            rows[3] + rows[0], // Left
            rows[3] - rows[0], // Right
            rows[3] + rows[1], // Bottom
            rows[3] - rows[1], // Top
            rows[2],           // Near
            rows[3] - rows[2], // Far
        ];

        for plane in &mut planes {
            let length = plane.truncate().length();
            // Degenerate transforms keep their raw plane.
            if length > 0.0 && length.is_finite() {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[inline]
    #[must_use]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    #[inline]
    #[must_use]
    pub fn plane(&self, which: FrustumPlane) -> Vec4 {
        self.planes[which as usize]
    }

    /// Signed distance of `point` to one plane (positive inside).
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, which: FrustumPlane, point: Vec3) -> f32 {
        plane_distance(self.plane(which), point)
    }

    // ========================================================================
    // Full coverage
    // ========================================================================

    /// `true` if the shape lies entirely on the inward side of every plane.
    /// Contact counts as inside.
    pub fn encloses<S: FrustumShape + ?Sized>(&self, shape: &S) -> bool {
        self.planes.iter().all(|&p| shape.plane_span(p).nearest >= 0.0)
    }

    /// Like [`encloses`](Self::encloses) but contact counts as outside.
    pub fn encloses_strict<S: FrustumShape + ?Sized>(&self, shape: &S) -> bool {
        self.planes.iter().all(|&p| shape.plane_span(p).nearest > 0.0)
    }

    // ========================================================================
    // Partial or full coverage
    // ========================================================================

    /// `true` unless the shape lies entirely outside at least one plane.
    pub fn overlaps<S: FrustumShape + ?Sized>(&self, shape: &S) -> bool {
        self.planes.iter().all(|&p| shape.plane_span(p).farthest >= 0.0)
    }

    /// Like [`overlaps`](Self::overlaps) but a shape that only touches a
    /// plane from outside does not overlap.
    pub fn overlaps_strict<S: FrustumShape + ?Sized>(&self, shape: &S) -> bool {
        self.planes.iter().all(|&p| shape.plane_span(p).farthest > 0.0)
    }

    // ========================================================================
    // Strict partial coverage
    // ========================================================================

    /// `true` if the shape is not outside any plane by more than `epsilon`
    /// and reaches within `epsilon` of at least one plane.
    pub fn intersects<S: FrustumShape + ?Sized>(&self, shape: &S, epsilon: f32) -> bool {
        self.intersects_impl(shape, epsilon, false)
    }

    /// Like [`intersects`](Self::intersects) but exact contact with a plane
    /// counts as intersecting.
    pub fn intersects_strict<S: FrustumShape + ?Sized>(&self, shape: &S, epsilon: f32) -> bool {
        self.intersects_impl(shape, epsilon, true)
    }

    fn intersects_impl<S: FrustumShape + ?Sized>(&self, shape: &S, epsilon: f32, strict: bool) -> bool {
        debug_assert!(epsilon >= 0.0, "frustum epsilon must be non-negative, got {epsilon}");

        let mut on_boundary = false;
        for &plane in &self.planes {
            let span = shape.plane_span(plane);
            if span.farthest < -epsilon {
                return false;
            }
            on_boundary |= if strict {
                span.nearest <= epsilon
            } else {
                span.nearest < epsilon
            };
        }
        on_boundary
    }

    // ========================================================================
    // Classification
    // ========================================================================

    /// Classifies the shape in a single pass over the planes.
    pub fn classify<S: FrustumShape + ?Sized>(&self, shape: &S) -> Coverage {
        self.classify_impl(shape, false)
    }

    /// Classification where contact with a plane yields partial coverage.
    pub fn classify_strict<S: FrustumShape + ?Sized>(&self, shape: &S) -> Coverage {
        self.classify_impl(shape, true)
    }

    fn classify_impl<S: FrustumShape + ?Sized>(&self, shape: &S, strict: bool) -> Coverage {
        let mut partial = false;
        for &plane in &self.planes {
            let span = shape.plane_span(plane);
            if span.farthest < 0.0 {
                return Coverage::NoCoverage;
            }
            partial |= if strict {
                span.nearest <= 0.0
            } else {
                span.nearest < 0.0
            };
        }

        if partial {
            Coverage::PartialCoverage
        } else {
            Coverage::FullCoverage
        }
    }

    // ========================================================================
    // Culling helpers
    // ========================================================================

    /// `true` if a shape given in object space is invisible under
    /// `object_to_projection`.
    pub fn cull<S: FrustumShape + ?Sized>(object_to_projection: &Mat4, shape: &S) -> bool {
        !Self::new(object_to_projection).overlaps(shape)
    }

    /// Like [`cull`](Self::cull) but also culls shapes that only touch the
    /// frustum from outside.
    pub fn cull_strict<S: FrustumShape + ?Sized>(object_to_projection: &Mat4, shape: &S) -> bool {
        !Self::new(object_to_projection).overlaps_strict(shape)
    }
}

impl From<Mat4> for ViewFrustum {
    fn from(transform: Mat4) -> Self {
        Self::new(&transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_clip_frustum() -> ViewFrustum {
        // Identity transform: -1<=x<=1, -1<=y<=1, 0<=z<=1.
        ViewFrustum::new(&Mat4::IDENTITY)
    }

    #[test]
    fn identity_planes_are_unit_normals() {
        let f = unit_clip_frustum();
        assert_eq!(f.plane(FrustumPlane::Left), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(f.plane(FrustumPlane::Top), Vec4::new(0.0, -1.0, 0.0, 1.0));
        assert_eq!(f.plane(FrustumPlane::Near), Vec4::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(f.plane(FrustumPlane::Far), Vec4::new(0.0, 0.0, -1.0, 1.0));
    }

    #[test]
    fn box_corner_selection_follows_normal_sign() {
        let aabb = BoundingBox::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let span = aabb.plane_span(Vec4::new(0.0, -1.0, 0.0, 0.0));
        assert_eq!(span.nearest, -2.0);
        assert_eq!(span.farthest, 2.0);
    }

    #[test]
    fn nan_shape_is_not_covered() {
        let f = unit_clip_frustum();
        let p = Vec3::new(f32::NAN, 0.0, 0.5);
        assert_eq!(f.classify(&p), Coverage::NoCoverage);
        assert!(!f.overlaps(&p));
        assert!(!f.encloses(&p));
        assert!(!f.intersects(&p, 0.1));
    }

    #[test]
    fn zero_radius_sphere_behaves_like_point() {
        let f = unit_clip_frustum();
        let s = BoundingSphere::new(Vec3::new(0.0, 0.0, 0.5), 0.0);
        assert_eq!(f.classify(&s), Coverage::FullCoverage);
        assert_eq!(f.classify(&Vec3::new(0.0, 0.0, 0.5)), Coverage::FullCoverage);
    }
}
