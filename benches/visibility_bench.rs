use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::Vec3;

use prism::renderer::{CameraFrame, VisibilityCollector, VisibilitySettings};
use prism::resources::{BoundingSphere, MaterialHandle, MeshHandle};
use prism::scene::{Camera, DistanceFalloff, Light, Model, NodeHandle, Scene, ViewFrustum};

/// A grid of omni lights and models, half of them behind the camera.
fn build_scene(side: usize) -> (Scene, NodeHandle, Vec<NodeHandle>) {
    let mut scene = Scene::new();
    scene.add_camera(Camera::new_perspective(60.0, 16.0 / 9.0, 0.1, 200.0));

    let root = scene.create_node("grid");
    let mut leaves = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let half = side as f32 * 2.0;
            let position = Vec3::new(i as f32 * 4.0 - half, 0.0, j as f32 * 4.0 - half);
            let light = scene
                .build_node("light")
                .with_parent(root)
                .with_translation(position)
                .with_light(Light::new_omni(Vec3::ONE, 1.0, DistanceFalloff::new(0.0, 3.0)))
                .build();
            let model = Model::new(
                MeshHandle::default(),
                MaterialHandle::default(),
                36,
                BoundingSphere::new(Vec3::ZERO, 1.0).into(),
            );
            scene.build_node("model").with_parent(light).with_model(model).build();
            leaves.push(light);
        }
    }
    (scene, root, leaves)
}

// ---------------------------------------------------------------------------
// Transform cache
// ---------------------------------------------------------------------------

fn bench_world_matrix_cached(c: &mut Criterion) {
    let (scene, _, leaves) = build_scene(32);
    for &leaf in &leaves {
        scene.object_to_world(leaf);
    }
    c.bench_function("object_to_world_cached_1024", |b| {
        b.iter(|| {
            for &leaf in &leaves {
                black_box(scene.object_to_world(leaf));
            }
        });
    });
}

fn bench_world_matrix_after_root_edit(c: &mut Criterion) {
    let (mut scene, root, leaves) = build_scene(32);
    let mut t = 0.0_f32;
    c.bench_function("object_to_world_after_root_edit_1024", |b| {
        b.iter(|| {
            t += 0.01;
            scene.set_translation(root, Vec3::new(t.sin(), 0.0, 0.0));
            for &leaf in &leaves {
                black_box(scene.object_to_world(leaf));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Frustum
// ---------------------------------------------------------------------------

fn bench_frustum_cull(c: &mut Criterion) {
    let projection = Camera::new_perspective(60.0, 1.0, 0.1, 100.0).view_to_projection();
    let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
    c.bench_function("frustum_cull_sphere", |b| {
        b.iter(|| ViewFrustum::cull(black_box(&projection), black_box(&sphere)));
    });
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

fn bench_collect(c: &mut Criterion) {
    let (scene, _, _) = build_scene(32);
    let mut collector = VisibilityCollector::new(VisibilitySettings::default()).unwrap();
    let mut stage = |frame: &CameraFrame<'_>| {
        black_box(frame.omni_lights.len());
    };
    c.bench_function("collect_1024_lights_1024_models", |b| {
        b.iter(|| collector.collect(&scene, &mut stage).unwrap());
    });
}

criterion_group!(
    benches,
    bench_world_matrix_cached,
    bench_world_matrix_after_root_edit,
    bench_frustum_cull,
    bench_collect,
);
criterion_main!(benches);
