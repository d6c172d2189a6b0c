//! Visibility Collector
//!
//! Per frame, per active camera: culls the scene and packs the survivors
//! into view-space record buffers for the shading stage.
//!
//! # Data flow
//! ```text
//! Scene ─ gather ─> scratch lists ─┬─ camera 0: cull → transform → pack → ShadingStage
//!                                  ├─ camera 1: ...
//!                                  └─ ...
//! ```
//!
//! # Ordering
//! - Light kinds: directional, omni, spot
//! - Model categories: opaque-emissive, opaque-BRDF, transparent-emissive,
//!   transparent-BRDF
//! - Within one kind: scene insertion order
//! - Cameras: registration order, each independent of the others
//!
//! All buffers are rewritten from index 0 for every camera. A
//! [`CameraFrame`] borrows them read-only for one `render_view` call.

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::{debug, error, trace};

use crate::errors::Result;
use crate::renderer::light_packer;
use crate::renderer::settings::VisibilitySettings;
use crate::resources::buffer::GpuBuffer;
use crate::resources::uniforms::{
    DirectionalLightUniforms, ModelUniforms, OmniLightUniforms, SceneSummaryUniforms,
    SpotLightUniforms,
};
use crate::resources::{BoundingVolume, MaterialHandle, MeshHandle, TextureHandle};
use crate::scene::camera::Viewport;
use crate::scene::frustum::ViewFrustum;
use crate::scene::light::{ConeCutoff, DistanceFalloff, LightKind};
use crate::scene::model::ModelCategory;
use crate::scene::{NodeHandle, Scene};

// ============================================================================
// Shading stage interface
// ============================================================================

/// Consumer of the per-camera buffers (the GPU shading stage).
pub trait ShadingStage {
    fn render_view(&mut self, frame: &CameraFrame<'_>);
}

impl<F> ShadingStage for F
where
    F: FnMut(&CameraFrame<'_>),
{
    fn render_view(&mut self, frame: &CameraFrame<'_>) {
        self(frame);
    }
}

/// One surviving model, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelDraw {
    pub node: NodeHandle,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub start_index: u32,
    pub index_count: u32,
    /// Index of this draw's record in [`CameraFrame::model_uniforms`].
    pub uniform_index: u32,
}

/// One active sprite, anchored at its view-space origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub node: NodeHandle,
    pub texture: TextureHandle,
    pub size: Vec2,
    pub tint: Vec4,
    pub view_position: Vec3,
}

/// Culling counters of one camera pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    pub lights_tested: usize,
    pub lights_culled: usize,
    pub models_tested: usize,
    pub models_culled: usize,
}

/// Everything the shading stage needs for one camera, borrowed read-only.
#[derive(Debug)]
pub struct CameraFrame<'a> {
    pub camera: NodeHandle,
    pub viewport: Viewport,

    pub world_to_view: Mat4,
    pub view_to_projection: Mat4,
    pub world_to_projection: Mat4,

    pub summary: &'a GpuBuffer<SceneSummaryUniforms>,
    pub directional_lights: &'a GpuBuffer<DirectionalLightUniforms>,
    pub omni_lights: &'a GpuBuffer<OmniLightUniforms>,
    pub spot_lights: &'a GpuBuffer<SpotLightUniforms>,
    pub model_uniforms: &'a GpuBuffer<ModelUniforms>,

    draws: &'a [Vec<ModelDraw>; ModelCategory::COUNT],
    pub sprites: &'a [SpriteDraw],

    pub stats: CullStats,
}

impl CameraFrame<'_> {
    /// The summary record of this frame.
    #[must_use]
    pub fn summary_record(&self) -> SceneSummaryUniforms {
        self.summary.as_slice().first().copied().unwrap_or_default()
    }

    /// Surviving models of one category, in scene order.
    #[must_use]
    pub fn draws(&self, category: ModelCategory) -> &[ModelDraw] {
        &self.draws[category.index()]
    }

    /// All surviving models, category by category.
    pub fn all_draws(&self) -> impl Iterator<Item = &ModelDraw> {
        self.draws.iter().flatten()
    }
}

// ============================================================================
// Scratch lists
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct LightCandidate {
    node: NodeHandle,
    object_to_world: Mat4,
    radiance: Vec3,
    falloff: DistanceFalloff,
    cutoff: ConeCutoff,
    bounds: Option<BoundingVolume>,
}

#[derive(Debug, Clone, Copy)]
struct ModelCandidate {
    node: NodeHandle,
    object_to_world: Mat4,
    mesh: MeshHandle,
    material: MaterialHandle,
    start_index: u32,
    index_count: u32,
    bounds: BoundingVolume,
}

#[derive(Debug, Clone, Copy)]
struct SpriteCandidate {
    node: NodeHandle,
    object_to_world: Mat4,
    texture: TextureHandle,
    size: Vec2,
    tint: Vec4,
}

/// Active entities of the current frame, gathered once and shared by all
/// cameras. Cleared (not freed) every frame.
#[derive(Debug, Default)]
struct Scratch {
    cameras: Vec<NodeHandle>,
    directional: Vec<LightCandidate>,
    omni: Vec<LightCandidate>,
    spot: Vec<LightCandidate>,
    models: [Vec<ModelCandidate>; ModelCategory::COUNT],
    sprites: Vec<SpriteCandidate>,
}

impl Scratch {
    fn clear(&mut self) {
        self.cameras.clear();
        self.directional.clear();
        self.omni.clear();
        self.spot.clear();
        self.models.iter_mut().for_each(Vec::clear);
        self.sprites.clear();
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Per-camera culling and light assembly.
///
/// Owns the backing buffers exclusively. Buffer capacity only grows;
/// logical lengths are this camera's counts.
pub struct VisibilityCollector {
    settings: VisibilitySettings,
    scratch: Scratch,

    // === Backing buffers ===
    summary: GpuBuffer<SceneSummaryUniforms>,
    directional_lights: GpuBuffer<DirectionalLightUniforms>,
    omni_lights: GpuBuffer<OmniLightUniforms>,
    spot_lights: GpuBuffer<SpotLightUniforms>,
    model_uniforms: GpuBuffer<ModelUniforms>,

    // === Per-camera staging ===
    directional_records: Vec<DirectionalLightUniforms>,
    omni_records: Vec<OmniLightUniforms>,
    spot_records: Vec<SpotLightUniforms>,
    model_records: Vec<ModelUniforms>,
    draws: [Vec<ModelDraw>; ModelCategory::COUNT],
    sprites: Vec<SpriteDraw>,
}

impl VisibilityCollector {
    pub fn new(settings: VisibilitySettings) -> Result<Self> {
        settings.validate()?;
        let growth = settings.growth;
        let limit = settings.max_buffer_records.unwrap_or(usize::MAX);
        Ok(Self {
            summary: GpuBuffer::with_capacity("SceneSummary", 1, growth)?,
            directional_lights: GpuBuffer::with_capacity(
                "DirectionalLights",
                settings.initial_directional_capacity,
                growth,
            )?
            .with_max_capacity(limit),
            omni_lights: GpuBuffer::with_capacity("OmniLights", settings.initial_omni_capacity, growth)?
                .with_max_capacity(limit),
            spot_lights: GpuBuffer::with_capacity("SpotLights", settings.initial_spot_capacity, growth)?
                .with_max_capacity(limit),
            model_uniforms: GpuBuffer::with_capacity(
                "ModelUniforms",
                settings.initial_model_capacity,
                growth,
            )?
            .with_max_capacity(limit),
            scratch: Scratch::default(),
            directional_records: Vec::new(),
            omni_records: Vec::new(),
            spot_records: Vec::new(),
            model_records: Vec::new(),
            draws: Default::default(),
            sprites: Vec::new(),
            settings,
        })
    }

    #[inline]
    pub fn settings(&self) -> &VisibilitySettings {
        &self.settings
    }

    /// Runs a full frame: gathers the scene once, then prepares and hands
    /// off every active camera in registration order.
    ///
    /// Returns the number of cameras rendered. A buffer growth failure
    /// aborts the frame.
    pub fn collect(&mut self, scene: &Scene, stage: &mut dyn ShadingStage) -> Result<usize> {
        self.gather(scene);

        let mut rendered = 0;
        for i in 0..self.scratch.cameras.len() {
            let camera = self.scratch.cameras[i];
            let Some(frame) = self.prepare_camera(scene, camera)? else { continue };
            stage.render_view(&frame);
            rendered += 1;
        }
        debug!("Visibility frame done: {rendered} camera(s)");
        Ok(rendered)
    }

    /// Collect step: fills the scratch lists from the scene's active
    /// entities. Degenerate models are skipped.
    pub fn gather(&mut self, scene: &Scene) {
        let scratch = &mut self.scratch;
        scratch.clear();

        scene.for_each_active_camera(|handle, _, _| scratch.cameras.push(handle));

        scene.for_each_active_light(|handle, _, light| {
            let Some(object_to_world) = scene.object_to_world(handle) else { return };
            let candidate = LightCandidate {
                node: handle,
                object_to_world,
                radiance: light.radiance(),
                falloff: light.falloff().unwrap_or(DistanceFalloff { start: 0.0, end: 0.0 }),
                cutoff: light.cutoff().unwrap_or(ConeCutoff { cos_penumbra: 1.0, cos_umbra: 1.0 }),
                bounds: light.bounding_volume(),
            };
            match light.kind {
                LightKind::Directional => scratch.directional.push(candidate),
                LightKind::Omni(_) => scratch.omni.push(candidate),
                LightKind::Spot(_) => scratch.spot.push(candidate),
            }
        });

        scene.for_each_active_model(|handle, _, model| {
            if model.is_degenerate() {
                trace!("Skipping model {handle:?}: no indices");
                return;
            }
            let Some(object_to_world) = scene.object_to_world(handle) else { return };
            scratch.models[model.category().index()].push(ModelCandidate {
                node: handle,
                object_to_world,
                mesh: model.mesh,
                material: model.material,
                start_index: model.start_index,
                index_count: model.index_count,
                bounds: model.bounds,
            });
        });

        scene.for_each_active_sprite(|handle, _, sprite| {
            let Some(object_to_world) = scene.object_to_world(handle) else { return };
            scratch.sprites.push(SpriteCandidate {
                node: handle,
                object_to_world,
                texture: sprite.texture,
                size: sprite.size,
                tint: sprite.tint,
            });
        });

        trace!(
            "Gathered {} camera(s), {} light(s), {} model(s), {} sprite(s)",
            scratch.cameras.len(),
            scratch.directional.len() + scratch.omni.len() + scratch.spot.len(),
            scratch.models.iter().map(Vec::len).sum::<usize>(),
            scratch.sprites.len()
        );
    }

    /// Cull, transform and pack steps for one camera, using the lists from
    /// the last [`gather`](Self::gather).
    ///
    /// Returns `Ok(None)` if `camera` has no camera component (a caller
    /// bug, asserted in debug builds).
    pub fn prepare_camera(&mut self, scene: &Scene, camera: NodeHandle) -> Result<Option<CameraFrame<'_>>> {
        debug_assert!(scene.camera(camera).is_some(), "prepare_camera called with non-camera node {camera:?}");
        let (Some(cam), Some(world_to_view)) = (scene.camera(camera), scene.world_to_object(camera)) else {
            error!("Node {camera:?} is not a camera; skipping");
            return Ok(None);
        };
        let view_to_projection = cam.view_to_projection();
        let world_to_projection = view_to_projection * world_to_view;
        let mut stats = CullStats::default();

        // === Lights ===
        self.directional_records.clear();
        for light in &self.scratch.directional {
            let object_to_view = world_to_view * light.object_to_world;
            self.directional_records
                .push(light_packer::pack_directional(light.radiance, &object_to_view));
        }

        self.omni_records.clear();
        for light in &self.scratch.omni {
            stats.lights_tested += 1;
            if self.settings.cull_lights && is_culled(&world_to_projection, light.object_to_world, light.bounds) {
                trace!("Culled omni light {:?}", light.node);
                stats.lights_culled += 1;
                continue;
            }
            let object_to_view = world_to_view * light.object_to_world;
            self.omni_records
                .push(light_packer::pack_omni(light.radiance, light.falloff, &object_to_view));
        }

        self.spot_records.clear();
        for light in &self.scratch.spot {
            stats.lights_tested += 1;
            if self.settings.cull_lights && is_culled(&world_to_projection, light.object_to_world, light.bounds) {
                trace!("Culled spot light {:?}", light.node);
                stats.lights_culled += 1;
                continue;
            }
            let object_to_view = world_to_view * light.object_to_world;
            self.spot_records.push(light_packer::pack_spot(
                light.radiance,
                light.falloff,
                light.cutoff,
                &object_to_view,
            ));
        }

        // === Models ===
        self.model_records.clear();
        for (draws, candidates) in self.draws.iter_mut().zip(&self.scratch.models) {
            draws.clear();
            for model in candidates {
                stats.models_tested += 1;
                if self.settings.cull_models
                    && is_culled(&world_to_projection, model.object_to_world, Some(model.bounds))
                {
                    trace!("Culled model {:?}", model.node);
                    stats.models_culled += 1;
                    continue;
                }
                let object_to_view = world_to_view * model.object_to_world;
                draws.push(ModelDraw {
                    node: model.node,
                    mesh: model.mesh,
                    material: model.material,
                    start_index: model.start_index,
                    index_count: model.index_count,
                    uniform_index: self.model_records.len() as u32,
                });
                self.model_records.push(light_packer::pack_model(&object_to_view));
            }
        }

        // === Sprites ===
        self.sprites.clear();
        self.sprites.extend(self.scratch.sprites.iter().map(|s| SpriteDraw {
            node: s.node,
            texture: s.texture,
            size: s.size,
            tint: s.tint,
            view_position: (world_to_view * s.object_to_world).transform_point3(Vec3::ZERO),
        }));

        // === Pack ===
        self.upload().inspect_err(|e| error!("Visibility frame aborted: {e}"))?;

        let summary = light_packer::pack_summary(
            &scene.environment,
            [self.directional_records.len(), self.omni_records.len(), self.spot_records.len()],
        );
        self.summary.write(&[summary])?;

        debug!(
            "Camera {camera:?}: {} directional / {} omni / {} spot light(s), {} model(s), {} culled",
            self.directional_records.len(),
            self.omni_records.len(),
            self.spot_records.len(),
            self.model_records.len(),
            stats.lights_culled + stats.models_culled
        );

        Ok(Some(CameraFrame {
            camera,
            viewport: cam.viewport,
            world_to_view,
            view_to_projection,
            world_to_projection,
            summary: &self.summary,
            directional_lights: &self.directional_lights,
            omni_lights: &self.omni_lights,
            spot_lights: &self.spot_lights,
            model_uniforms: &self.model_uniforms,
            draws: &self.draws,
            sprites: &self.sprites,
            stats,
        }))
    }

    /// Reserves every buffer before writing any, so a failed growth leaves
    /// all of them holding the previous camera's records.
    fn upload(&mut self) -> Result<()> {
        self.directional_lights.ensure_capacity(self.directional_records.len())?;
        self.omni_lights.ensure_capacity(self.omni_records.len())?;
        self.spot_lights.ensure_capacity(self.spot_records.len())?;
        self.model_uniforms.ensure_capacity(self.model_records.len())?;

        self.directional_lights.write(&self.directional_records)?;
        self.omni_lights.write(&self.omni_records)?;
        self.spot_lights.write(&self.spot_records)?;
        self.model_uniforms.write(&self.model_records)?;
        Ok(())
    }

    // === Last prepared camera ===

    pub fn summary(&self) -> &GpuBuffer<SceneSummaryUniforms> {
        &self.summary
    }

    pub fn directional_lights(&self) -> &GpuBuffer<DirectionalLightUniforms> {
        &self.directional_lights
    }

    pub fn omni_lights(&self) -> &GpuBuffer<OmniLightUniforms> {
        &self.omni_lights
    }

    pub fn spot_lights(&self) -> &GpuBuffer<SpotLightUniforms> {
        &self.spot_lights
    }

    pub fn model_uniforms(&self) -> &GpuBuffer<ModelUniforms> {
        &self.model_uniforms
    }
}

/// `true` if the object-space bounds lie entirely outside the camera
/// frustum. Unbounded entities are never culled.
#[inline]
fn is_culled(world_to_projection: &Mat4, object_to_world: Mat4, bounds: Option<BoundingVolume>) -> bool {
    bounds.is_some_and(|b| ViewFrustum::cull(&(*world_to_projection * object_to_world), &b))
}
