//! Record packing
//!
//! Pure functions turning scene data into view-space GPU records. Every
//! direction is taken along the object's local +Z axis.

use glam::{Mat4, Vec3};

use crate::resources::uniforms::{
    DirectionalLightUniforms, ModelUniforms, OmniLightUniforms, SceneSummaryUniforms,
    SpotLightUniforms,
};
use crate::scene::environment::Environment;
use crate::scene::light::{ConeCutoff, DistanceFalloff};

/// View-space direction *towards* the light. Zero if the axis collapsed.
#[inline]
fn neg_direction(object_to_view: &Mat4) -> Vec3 {
    -object_to_view.transform_vector3(Vec3::Z).normalize_or_zero()
}

#[inline]
fn view_position(object_to_view: &Mat4) -> Vec3 {
    object_to_view.transform_point3(Vec3::ZERO)
}

pub fn pack_directional(radiance: Vec3, object_to_view: &Mat4) -> DirectionalLightUniforms {
    DirectionalLightUniforms {
        intensity: radiance,
        neg_direction: neg_direction(object_to_view),
        ..Default::default()
    }
}

pub fn pack_omni(radiance: Vec3, falloff: DistanceFalloff, object_to_view: &Mat4) -> OmniLightUniforms {
    OmniLightUniforms {
        position: view_position(object_to_view),
        distance_falloff_end: falloff.end,
        intensity: radiance,
        distance_falloff_inv_range: falloff.inv_range(),
    }
}

pub fn pack_spot(
    radiance: Vec3,
    falloff: DistanceFalloff,
    cutoff: ConeCutoff,
    object_to_view: &Mat4,
) -> SpotLightUniforms {
    SpotLightUniforms {
        position: view_position(object_to_view),
        distance_falloff_end: falloff.end,
        intensity: radiance,
        distance_falloff_inv_range: falloff.inv_range(),
        neg_direction: neg_direction(object_to_view),
        cos_umbra: cutoff.cos_umbra,
        cos_inv_range: cutoff.cos_inv_range(),
        ..Default::default()
    }
}

/// Normals use the inverse transpose; a singular transform keeps identity.
pub fn pack_model(object_to_view: &Mat4) -> ModelUniforms {
    let det = object_to_view.determinant();
    let normal_to_view = if det != 0.0 && det.is_finite() {
        object_to_view.inverse().transpose()
    } else {
        Mat4::IDENTITY
    };
    ModelUniforms {
        object_to_view: *object_to_view,
        normal_to_view,
    }
}

pub fn pack_summary(environment: &Environment, counts: [usize; 3]) -> SceneSummaryUniforms {
    let [directional, omni, spot] = counts;
    let mut summary = SceneSummaryUniforms {
        ambient: environment.ambient_color,
        nb_directional_lights: directional as u32,
        nb_omni_lights: omni as u32,
        nb_spot_lights: spot as u32,
        ..Default::default()
    };
    if let Some(fog) = &environment.fog {
        summary.fog_color = fog.color;
        summary.fog_distance_falloff_start = fog.distance_falloff_start;
        summary.fog_distance_falloff_range = fog.distance_falloff_range();
    }
    summary
}
