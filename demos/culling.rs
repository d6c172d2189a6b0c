use std::f32::consts::FRAC_PI_6;

use glam::{Quat, Vec3};

use prism::renderer::{CameraFrame, VisibilityCollector, VisibilitySettings};
use prism::resources::{BoundingBox, MaterialHandle, MeshHandle};
use prism::scene::{
    Camera, ConeCutoff, DistanceFalloff, Fog, Light, Model, ModelCategory, ModelFlags, Scene,
};

/// Run with `RUST_LOG=debug` to see the per-camera culling summary.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut scene = Scene::new();
    scene.environment.set_ambient_color(Vec3::splat(0.03));
    scene.environment.set_fog(Some(Fog::new(Vec3::splat(0.6), 20.0, 80.0)));

    // === 1. Cameras ===
    let main_camera = scene.add_camera(Camera::new_perspective(60.0, 16.0 / 9.0, 0.1, 100.0));
    scene.set_translation(main_camera, Vec3::new(0.0, 3.0, -10.0));
    scene.look_at(main_camera, Vec3::ZERO, Vec3::Y);

    let mut rear = Camera::new_perspective(90.0, 1.0, 0.1, 30.0);
    rear.name = "RearView".into();
    let rear_camera = scene.add_camera(rear);
    scene.set_rotation(rear_camera, Quat::from_rotation_y(std::f32::consts::PI));

    // === 2. Lights: a ring of lamps around a spinning platform ===
    scene.add_light(Light::new_directional(Vec3::new(1.0, 0.95, 0.9), 3.0));

    let platform = scene.create_node("Platform");
    for i in 0..12 {
        let angle = i as f32 * std::f32::consts::TAU / 12.0;
        let position = Vec3::new(angle.cos() * 15.0, 2.0, angle.sin() * 15.0);
        let light = if i % 3 == 0 {
            Light::new_spot(
                Vec3::ONE,
                50.0,
                DistanceFalloff::new(1.0, 12.0),
                ConeCutoff::from_angles(FRAC_PI_6 * 0.5, FRAC_PI_6),
            )
        } else {
            Light::new_omni(Vec3::new(1.0, 0.6, 0.3), 20.0, DistanceFalloff::new(0.5, 4.0))
        };
        let lamp = scene
            .build_node("Lamp")
            .with_parent(platform)
            .with_translation(position)
            .with_light(light)
            .build();
        scene.look_at(lamp, Vec3::ZERO, Vec3::Y);
    }

    // === 3. Models ===
    let crate_bounds = BoundingBox::from_center_extents(Vec3::ZERO, Vec3::splat(0.5));
    for i in 0..8 {
        let flags = if i % 2 == 0 { ModelFlags::empty() } else { ModelFlags::TRANSPARENT };
        let model = Model::new(MeshHandle::default(), MaterialHandle::default(), 36, crate_bounds.into())
            .with_flags(flags);
        scene
            .build_node("Crate")
            .with_parent(platform)
            .with_translation(Vec3::new(i as f32 * 3.0 - 10.5, 0.5, 0.0))
            .with_model(model)
            .build();
    }

    // === 4. Frames ===
    let mut collector = VisibilityCollector::new(VisibilitySettings::default())?;
    let mut stage = |frame: &CameraFrame<'_>| {
        let summary = frame.summary_record();
        println!(
            "camera {:?}: {} directional, {} omni, {} spot, {} opaque / {} transparent model(s), {} culled",
            frame.camera,
            summary.nb_directional_lights,
            summary.nb_omni_lights,
            summary.nb_spot_lights,
            frame.draws(ModelCategory::OpaqueBrdf).len(),
            frame.draws(ModelCategory::TransparentBrdf).len(),
            frame.stats.lights_culled + frame.stats.models_culled,
        );
    };

    for frame in 0..4 {
        scene.set_rotation(platform, Quat::from_rotation_y(frame as f32 * 0.4));
        let rendered = collector.collect(&scene, &mut stage)?;
        log::info!("Frame {frame}: {rendered} camera(s) rendered");
    }

    Ok(())
}
