use bitflags::bitflags;

use crate::resources::{BoundingVolume, MaterialHandle, MeshHandle};

bitflags! {
    /// Shading traits of a model that decide its draw category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModelFlags: u32 {
        const EMISSIVE    = 1 << 0;
        const TRANSPARENT = 1 << 1;
    }
}

/// Draw category, in the order the collector emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelCategory {
    OpaqueEmissive = 0,
    OpaqueBrdf = 1,
    TransparentEmissive = 2,
    TransparentBrdf = 3,
}

impl ModelCategory {
    pub const COUNT: usize = 4;

    pub const ALL: [ModelCategory; Self::COUNT] = [
        ModelCategory::OpaqueEmissive,
        ModelCategory::OpaqueBrdf,
        ModelCategory::TransparentEmissive,
        ModelCategory::TransparentBrdf,
    ];

    #[must_use]
    pub fn from_flags(flags: ModelFlags) -> Self {
        match (
            flags.contains(ModelFlags::TRANSPARENT),
            flags.contains(ModelFlags::EMISSIVE),
        ) {
            (false, true) => ModelCategory::OpaqueEmissive,
            (false, false) => ModelCategory::OpaqueBrdf,
            (true, true) => ModelCategory::TransparentEmissive,
            (true, false) => ModelCategory::TransparentBrdf,
        }
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A drawable index range of a mesh, shaded with one material.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub start_index: u32,
    pub index_count: u32,
    pub flags: ModelFlags,
    /// Object-space bounds used for culling.
    pub bounds: BoundingVolume,
}

impl Model {
    #[must_use]
    pub fn new(mesh: MeshHandle, material: MaterialHandle, index_count: u32, bounds: BoundingVolume) -> Self {
        Self {
            mesh,
            material,
            start_index: 0,
            index_count,
            flags: ModelFlags::empty(),
            bounds,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ModelFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_index_range(mut self, start_index: u32, index_count: u32) -> Self {
        self.start_index = start_index;
        self.index_count = index_count;
        self
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> ModelCategory {
        ModelCategory::from_flags(self.flags)
    }

    /// A model without indices draws nothing.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.index_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_flags() {
        assert_eq!(ModelCategory::from_flags(ModelFlags::empty()), ModelCategory::OpaqueBrdf);
        assert_eq!(ModelCategory::from_flags(ModelFlags::EMISSIVE), ModelCategory::OpaqueEmissive);
        assert_eq!(
            ModelCategory::from_flags(ModelFlags::EMISSIVE | ModelFlags::TRANSPARENT),
            ModelCategory::TransparentEmissive
        );
        assert_eq!(ModelCategory::from_flags(ModelFlags::TRANSPARENT), ModelCategory::TransparentBrdf);
    }

    #[test]
    fn category_order_is_emission_order() {
        for (i, category) in ModelCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }
}
