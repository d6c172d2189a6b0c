//! Environment - scene-wide lighting terms
//!
//! Ambient light and distance fog, copied into every camera's summary record.

use glam::Vec3;

/// Linear distance fog between `distance_falloff_start` and
/// `distance_falloff_end`, measured in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub distance_falloff_start: f32,
    pub distance_falloff_end: f32,
}

impl Fog {
    #[must_use]
    pub fn new(color: Vec3, start: f32, end: f32) -> Self {
        debug_assert!(start <= end, "fog starts after it ends ({start} > {end})");
        Self {
            color,
            distance_falloff_start: start,
            distance_falloff_end: end,
        }
    }

    /// `end - start`, never zero.
    #[must_use]
    pub fn distance_falloff_range(&self) -> f32 {
        (self.distance_falloff_end - self.distance_falloff_start).max(f32::EPSILON)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Ambient radiance.
    pub ambient_color: Vec3,
    pub fog: Option<Fog>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ambient_color: Vec3::ZERO,
            fog: None,
        }
    }

    pub fn set_ambient_color(&mut self, color: Vec3) {
        self.ambient_color = color;
    }

    pub fn set_fog(&mut self, fog: Option<Fog>) {
        self.fog = fog;
    }

    #[must_use]
    pub fn has_fog(&self) -> bool {
        self.fog.is_some()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
