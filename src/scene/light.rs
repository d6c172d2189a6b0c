use glam::Vec3;

use crate::resources::{BoundingBox, BoundingSphere, BoundingVolume};

/// Distance attenuation: full intensity up to `start`, zero from `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceFalloff {
    pub start: f32,
    pub end: f32,
}

impl DistanceFalloff {
    #[must_use]
    pub fn new(start: f32, end: f32) -> Self {
        debug_assert!(0.0 <= start && start <= end, "invalid falloff [{start}, {end}]");
        Self { start, end }
    }

    /// `1 / (end - start)`, with a zero-width range clamped to `f32::EPSILON`.
    #[must_use]
    pub fn inv_range(&self) -> f32 {
        1.0 / (self.end - self.start).max(f32::EPSILON)
    }
}

/// Angular attenuation of a spot light, stored as cosines of the half angles.
///
/// Inside the penumbra cone the light is at full intensity; outside the
/// umbra cone it is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeCutoff {
    pub cos_penumbra: f32,
    pub cos_umbra: f32,
}

impl ConeCutoff {
    /// Half angles in radians, `penumbra <= umbra`.
    #[must_use]
    pub fn from_angles(penumbra: f32, umbra: f32) -> Self {
        debug_assert!(penumbra <= umbra, "penumbra {penumbra} wider than umbra {umbra}");
        Self {
            cos_penumbra: penumbra.cos(),
            cos_umbra: umbra.cos(),
        }
    }

    #[must_use]
    pub fn cos_inv_range(&self) -> f32 {
        1.0 / (self.cos_penumbra - self.cos_umbra).max(f32::EPSILON)
    }
}

#[derive(Debug, Clone)]
pub struct OmniLight {
    pub falloff: DistanceFalloff,
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub falloff: DistanceFalloff,
    pub cutoff: ConeCutoff,
}

// Lights emit along their node's local +Z axis.
#[derive(Debug, Clone)]
pub enum LightKind {
    Directional,
    Omni(OmniLight),
    Spot(SpotLight),
}

#[derive(Debug, Clone)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    #[must_use]
    pub fn new_omni(color: Vec3, intensity: f32, falloff: DistanceFalloff) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Omni(OmniLight { falloff }),
        }
    }

    #[must_use]
    pub fn new_spot(color: Vec3, intensity: f32, falloff: DistanceFalloff, cutoff: ConeCutoff) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Spot(SpotLight { falloff, cutoff }),
        }
    }

    /// Radiant intensity packed for the shading stage (`color * intensity`).
    #[inline]
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }

    #[must_use]
    pub fn falloff(&self) -> Option<DistanceFalloff> {
        match &self.kind {
            LightKind::Directional => None,
            LightKind::Omni(omni) => Some(omni.falloff),
            LightKind::Spot(spot) => Some(spot.falloff),
        }
    }

    #[must_use]
    pub fn cutoff(&self) -> Option<ConeCutoff> {
        match &self.kind {
            LightKind::Spot(spot) => Some(spot.cutoff),
            _ => None,
        }
    }

    /// Local-space volume outside of which the light contributes nothing.
    ///
    /// Omni lights are bounded by their falloff sphere. Spot lights are
    /// bounded by the box around their umbra cone truncated by the falloff
    /// sphere. Directional lights are unbounded.
    #[must_use]
    pub fn bounding_volume(&self) -> Option<BoundingVolume> {
        match &self.kind {
            LightKind::Directional => None,
            LightKind::Omni(omni) => {
                Some(BoundingSphere::new(Vec3::ZERO, omni.falloff.end).into())
            }
            LightKind::Spot(spot) => {
                let end = spot.falloff.end;
                let cos = spot.cutoff.cos_umbra.clamp(-1.0, 1.0);
                let (lateral, back) = if cos >= 0.0 {
                    (end * (1.0 - cos * cos).sqrt(), 0.0)
                } else {
                    (end, end * cos)
                };
                Some(
                    BoundingBox::new(
                        Vec3::new(-lateral, -lateral, back),
                        Vec3::new(lateral, lateral, end),
                    )
                    .into(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn omni_bounds_are_falloff_sphere() {
        let light = Light::new_omni(Vec3::ONE, 2.0, DistanceFalloff::new(1.0, 5.0));
        let Some(BoundingVolume::Sphere(sphere)) = light.bounding_volume() else {
            panic!("omni light should be bounded by a sphere");
        };
        assert_eq!(sphere.center, Vec3::ZERO);
        assert_eq!(sphere.radius, 5.0);
        assert_eq!(light.radiance(), Vec3::splat(2.0));
    }

    #[test]
    fn spot_bounds_enclose_cone() {
        let light = Light::new_spot(
            Vec3::ONE,
            1.0,
            DistanceFalloff::new(0.0, 10.0),
            ConeCutoff::from_angles(0.5 * FRAC_PI_4, FRAC_PI_4),
        );
        let Some(BoundingVolume::Box(aabb)) = light.bounding_volume() else {
            panic!("spot light should be bounded by a box");
        };
        assert_eq!(aabb.min.z, 0.0);
        assert_eq!(aabb.max.z, 10.0);
        assert!((aabb.max.x - 10.0 * FRAC_PI_4.sin()).abs() < 1e-4);

        let rim = Vec3::new(FRAC_PI_4.sin(), 0.0, FRAC_PI_4.cos()) * 9.99;
        assert!(aabb.min.cmple(rim).all() && rim.cmple(aabb.max).all());
    }

    #[test]
    fn wide_spot_extends_backwards() {
        let light = Light::new_spot(
            Vec3::ONE,
            1.0,
            DistanceFalloff::new(0.0, 4.0),
            ConeCutoff::from_angles(1.0, 2.0),
        );
        let Some(BoundingVolume::Box(aabb)) = light.bounding_volume() else {
            panic!("spot light should be bounded by a box");
        };
        assert_eq!(aabb.max.x, 4.0);
        assert!(aabb.min.z < 0.0);
    }

    #[test]
    fn degenerate_ranges_stay_finite() {
        assert!(DistanceFalloff::new(3.0, 3.0).inv_range().is_finite());
        let cutoff = ConeCutoff { cos_penumbra: 0.5, cos_umbra: 0.5 };
        assert!(cutoff.cos_inv_range().is_finite());
        assert!(Light::new_directional(Vec3::ONE, 1.0).bounding_volume().is_none());
    }
}
