//! GPU Record Layouts
//!
//! Every record handed to the shading stage is declared once through
//! [`define_uniform_struct!`], which generates:
//! - the `#[repr(C)]` Pod struct
//! - a `Default` impl honouring per-field defaults
//! - [`WgslType`] / [`WgslStruct`] impls emitting the matching WGSL struct
//!
//! Fields whose name starts with `__` are explicit padding. They are kept in
//! the Rust layout and omitted from the WGSL declaration, so they may only
//! sit where WGSL's own alignment rules insert the same gap (before a
//! 16-byte aligned member or at the tail of the struct).
//!
//! All sizes are checked at compile time at the bottom of this file.

use std::borrow::Cow;
use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

// ============================================================================
// 1. Rust type -> WGSL type name
// ============================================================================
pub trait WgslType {
    fn wgsl_type_name() -> Cow<'static, str>;

    fn collect_wgsl_defs(_defs: &mut Vec<String>, _inserted: &mut HashSet<String>) {}
}

impl WgslType for f32 { fn wgsl_type_name() -> Cow<'static, str> { "f32".into() } }
impl WgslType for u32 { fn wgsl_type_name() -> Cow<'static, str> { "u32".into() } }
impl WgslType for Vec3 { fn wgsl_type_name() -> Cow<'static, str> { "vec3<f32>".into() } }
impl WgslType for Mat4 { fn wgsl_type_name() -> Cow<'static, str> { "mat4x4<f32>".into() } }

/// Fixed-size array usable as a record field (mostly for padding).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformArray<T: Pod, const N: usize>(pub [T; N]);

// SAFETY: `[T; N]` of a Pod `T` is Pod and the wrapper is `repr(transparent)`.
unsafe impl<T: Pod, const N: usize> Zeroable for UniformArray<T, N> {}
unsafe impl<T: Pod, const N: usize> Pod for UniformArray<T, N> {}

impl<T: WgslType + Pod, const N: usize> WgslType for UniformArray<T, N> {
    fn wgsl_type_name() -> Cow<'static, str> {
        format!("array<{}, {}>", T::wgsl_type_name(), N).into()
    }

    fn collect_wgsl_defs(defs: &mut Vec<String>, inserted: &mut HashSet<String>) {
        T::collect_wgsl_defs(defs, inserted);
    }
}

impl<T: Default + Pod, const N: usize> Default for UniformArray<T, N> {
    fn default() -> Self {
        Self([T::default(); N])
    }
}

pub trait WgslStruct: Pod + Zeroable {
    fn wgsl_struct_def(struct_name: &str) -> String;
}

// ============================================================================
// 2. Single source of truth for record layouts
// ============================================================================

macro_rules! define_uniform_struct {
    (
        $(#[$meta:meta])* struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $vis:vis $field_name:ident : $field_type:ty $(= $default_val:expr)?
            ),* $(,)?
        }
    ) => {
        define_uniform_struct!(@def_struct
            $(#[$meta])* struct $name {
                $( $(#[$field_meta])* $vis $field_name : $field_type ),* }
        );

        define_uniform_struct!(@impl_default
            $name {
                $( $field_name : $field_type $(= $default_val)? ),* }
        );

        define_uniform_struct!(@impl_wgsl_type
            $name {
                $( $field_name : $field_type ),* }
        );

        define_uniform_struct!(@impl_uniform_block
            $name {
                $( $field_name : $field_type ),* }
        );
    };

    (@def_struct $(#[$meta:meta])* struct $name:ident {
        $( $(#[$field_meta:meta])* $vis:vis $field_name:ident : $field_type:ty ),*
    }) => {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        $(#[$meta])*
        pub struct $name {
            $( $(#[$field_meta])* $vis $field_name : $field_type, )*
        }
    };

    (@impl_default $name:ident { $( $field_name:ident : $field_type:ty $(= $default_val:expr)? ),* }) => {
        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field_name: define_uniform_struct!(@val_or_default $field_type $(, $default_val)?), )*
                }
            }
        }
    };
    (@val_or_default $type:ty, $val:expr) => { $val };
    (@val_or_default $type:ty) => { <$type as Default>::default() };

    (@gen_body $name_str:expr, { $( $field_name:ident : $field_type:ty ),* }) => {{
        let mut code = format!("struct {} {{\n", $name_str);
        $(
            if !stringify!($field_name).starts_with("__") {
                code.push_str(&format!(
                    "    {}: {},\n",
                    stringify!($field_name),
                    <$field_type as WgslType>::wgsl_type_name()
                ));
            }
        )*
        code.push_str("};\n");
        code
    }};

    (@impl_wgsl_type $name:ident { $( $field_name:ident : $field_type:ty ),* }) => {
        impl WgslType for $name {
            fn wgsl_type_name() -> Cow<'static, str> {
                stringify!($name).into()
            }

            fn collect_wgsl_defs(defs: &mut Vec<String>, inserted: &mut HashSet<String>) {
                $(
                    <$field_type as WgslType>::collect_wgsl_defs(defs, inserted);
                )*

                let my_name = stringify!($name);
                if !inserted.contains(my_name) {
                    let my_def = define_uniform_struct!(@gen_body my_name, { $( $field_name : $field_type ),* });
                    defs.push(my_def);
                    inserted.insert(my_name.to_string());
                }
            }
        }
    };

    (@impl_uniform_block $name:ident { $( $field_name:ident : $field_type:ty ),* }) => {
        impl WgslStruct for $name {
            fn wgsl_struct_def(struct_name: &str) -> String {
                let mut defs = Vec::new();
                let mut inserted = HashSet::new();

                $(
                    <$field_type as WgslType>::collect_wgsl_defs(&mut defs, &mut inserted);
                )*

                let top_def = define_uniform_struct!(@gen_body struct_name, { $( $field_name : $field_type ),* });

                defs.push(top_def);
                defs.join("\n")
            }
        }
    };
}

// ============================================================================
// 3. Records
// ============================================================================

define_uniform_struct!(
    /// Per-camera lighting summary: ambient term, light counts and fog.
    struct SceneSummaryUniforms {
        pub ambient: Vec3 = Vec3::ZERO,
        pub nb_directional_lights: u32 = 0,

        pub nb_omni_lights: u32 = 0,
        pub nb_spot_lights: u32 = 0,
        pub(crate) __padding0: UniformArray<u32, 2>,

        pub fog_color: Vec3 = Vec3::ONE,
        pub fog_distance_falloff_start: f32 = 0.0,

        pub fog_distance_falloff_range: f32 = f32::MAX,
        pub(crate) __padding1: UniformArray<f32, 3>,
    }
);

define_uniform_struct!(
    /// Directional light, view space.
    struct DirectionalLightUniforms {
        pub intensity: Vec3,
        pub(crate) __padding0: f32,

        /// Direction towards the light.
        pub neg_direction: Vec3 = Vec3::NEG_Z,
        pub(crate) __padding1: f32,
    }
);

define_uniform_struct!(
    /// Omni (point) light, view space.
    struct OmniLightUniforms {
        pub position: Vec3,
        pub distance_falloff_end: f32,

        pub intensity: Vec3,
        pub distance_falloff_inv_range: f32,
    }
);

define_uniform_struct!(
    /// Spot light, view space.
    struct SpotLightUniforms {
        pub position: Vec3,
        pub distance_falloff_end: f32,

        pub intensity: Vec3,
        pub distance_falloff_inv_range: f32,

        /// Direction towards the light (opposite of the cone axis).
        pub neg_direction: Vec3 = Vec3::NEG_Z,
        pub cos_umbra: f32,

        pub cos_inv_range: f32,
        pub(crate) __padding0: UniformArray<f32, 3>,
    }
);

define_uniform_struct!(
    /// Per-model transforms, view space.
    struct ModelUniforms {
        pub object_to_view: Mat4 = Mat4::IDENTITY,
        pub normal_to_view: Mat4 = Mat4::IDENTITY,
    }
);

const _: () = assert!(size_of::<SceneSummaryUniforms>() == 64);
const _: () = assert!(size_of::<DirectionalLightUniforms>() == 32);
const _: () = assert!(size_of::<OmniLightUniforms>() == 32);
const _: () = assert!(size_of::<SpotLightUniforms>() == 64);
const _: () = assert!(size_of::<ModelUniforms>() % 16 == 0);
