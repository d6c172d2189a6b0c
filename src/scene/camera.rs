use std::borrow::Cow;

use glam::{Mat4, Vec4};

use crate::scene::frustum::ViewFrustum;

/// Projection model of a camera.
///
/// View space is left-handed with +Z forward; clip depth spans `[0, w]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    #[must_use]
    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    #[must_use]
    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    /// View-to-projection (clip) matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                debug_assert!(near > 0.0 && far > near, "invalid perspective depth range [{near}, {far}]");
                let (sin_fov, cos_fov) = (0.5 * fov_y).sin_cos();
                let h = cos_fov / sin_fov;
                let w = h / aspect;
                // Clip space is scaled by (far - near): NDC is unchanged, and
                // the near/far planes extract exactly as z = near and z = far.
                let range = far - near;
                Mat4::from_cols(
                    Vec4::new(w * range, 0.0, 0.0, 0.0),
                    Vec4::new(0.0, h * range, 0.0, 0.0),
                    Vec4::new(0.0, 0.0, far, range),
                    Vec4::new(0.0, 0.0, -far * near, 0.0),
                )
            }
            Projection::Orthographic { width, height, near, far } => {
                debug_assert!(far > near, "invalid orthographic depth range [{near}, {far}]");
                let (hw, hh) = (0.5 * width, 0.5 * height);
                Mat4::orthographic_lh(-hw, hw, -hh, hh, near, far)
            }
        }
    }
}

/// Pixel rectangle and depth range a camera renders into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Camera component. Its world placement is the owning node's transform.
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: Cow<'static, str>,
    pub projection: Projection,
    pub viewport: Viewport,
}

impl Camera {
    /// Perspective camera. `fov` is the vertical field of view in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            name: Cow::Borrowed("Camera"),
            projection: Projection::Perspective {
                fov_y: fov.to_radians(),
                aspect,
                near,
                far,
            },
            viewport: Viewport::default(),
        }
    }

    #[must_use]
    pub fn new_orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self {
            name: Cow::Borrowed("Camera"),
            projection: Projection::Orthographic { width, height, near, far },
            viewport: Viewport::default(),
        }
    }

    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    #[inline]
    #[must_use]
    pub fn view_to_projection(&self) -> Mat4 {
        self.projection.matrix()
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Keeps a perspective projection's aspect ratio in sync with the
    /// viewport.
    pub fn fit_aspect_to_viewport(&mut self) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = self.viewport.aspect_ratio();
        }
    }

    /// Frustum with planes in this camera's view space.
    #[must_use]
    pub fn view_frustum(&self) -> ViewFrustum {
        ViewFrustum::new(&self.view_to_projection())
    }
}
