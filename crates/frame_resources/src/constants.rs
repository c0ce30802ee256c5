use bevy_math::Mat4;
use bevy_math::Vec2;
use bevy_math::Vec3;
use bevy_math::Vec4;

pub const LIGHT_COUNT: usize = 3;

/// Plain data that is copied byte-for-byte into GPU constant memory.
///
/// # Safety
/// Implementors must be `#[repr(C)]`, contain no padding, and accept every bit pattern.
pub unsafe trait ConstantData: Copy + Default + 'static {
    fn as_bytes(&self) -> &[u8] {
        // SAFETY: the trait contract guarantees a padding-free repr(C) layout.
        unsafe {
            std::slice::from_raw_parts((self as *const Self).cast::<u8>(), size_of::<Self>())
        }
    }

    /// Reads a record from the front of `bytes`; missing trailing bytes keep their defaults.
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut value = Self::default();
        let len = bytes.len().min(size_of::<Self>());
        // SAFETY: every bit pattern is valid and `len` never exceeds the record size.
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                (&mut value as *mut Self).cast::<u8>(),
                len,
            );
        }
        value
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectConstants {
    pub world: [f32; 16],
    pub tex_transform: [f32; 16],
}

impl ObjectConstants {
    pub fn new(world: Mat4, tex_transform: Mat4) -> Self {
        Self {
            world: world.to_cols_array(),
            tex_transform: tex_transform.to_cols_array(),
        }
    }

    pub fn world(&self) -> Mat4 {
        Mat4::from_cols_array(&self.world)
    }
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

unsafe impl ConstantData for ObjectConstants {}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialConstants {
    pub diffuse_albedo: [f32; 4],
    pub fresnel_r0: [f32; 3],
    pub roughness: f32,
    pub mat_transform: [f32; 16],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0; 4],
            fresnel_r0: [0.01; 3],
            roughness: 0.25,
            mat_transform: Mat4::IDENTITY.to_cols_array(),
        }
    }
}

unsafe impl ConstantData for MaterialConstants {}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub strength: [f32; 3],
    pub falloff_start: f32,
    pub direction: [f32; 3],
    pub falloff_end: f32,
    pub position: [f32; 3],
    pub spot_power: f32,
}

impl Light {
    pub fn directional(direction: Vec3, strength: Vec3) -> Self {
        Self {
            direction: direction.to_array(),
            strength: strength.to_array(),
            ..Self::default()
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            strength: [0.5; 3],
            falloff_start: 1.0,
            direction: [0.0, -1.0, 0.0],
            falloff_end: 10.0,
            position: [0.0; 3],
            spot_power: 64.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassConstants {
    pub view: [f32; 16],
    pub inv_view: [f32; 16],
    pub proj: [f32; 16],
    pub inv_proj: [f32; 16],
    pub view_proj: [f32; 16],
    pub inv_view_proj: [f32; 16],
    pub eye_pos: [f32; 3],
    pub pad0: f32,
    pub render_target_size: [f32; 2],
    pub inv_render_target_size: [f32; 2],
    pub near_z: f32,
    pub far_z: f32,
    pub total_time: f32,
    pub delta_time: f32,
    pub ambient_light: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_start: f32,
    pub fog_range: f32,
    pub pad1: [f32; 2],
    pub lights: [Light; LIGHT_COUNT],
}

impl PassConstants {
    pub fn set_camera(&mut self, view: Mat4, proj: Mat4, eye_pos: Vec3) {
        let view_proj = proj * view;
        self.view = view.to_cols_array();
        self.inv_view = view.inverse().to_cols_array();
        self.proj = proj.to_cols_array();
        self.inv_proj = proj.inverse().to_cols_array();
        self.view_proj = view_proj.to_cols_array();
        self.inv_view_proj = view_proj.inverse().to_cols_array();
        self.eye_pos = eye_pos.to_array();
    }

    pub fn set_render_target_size(&mut self, size: Vec2) {
        self.render_target_size = size.to_array();
        self.inv_render_target_size = size.recip().to_array();
    }

    pub fn ambient_light(&self) -> Vec4 {
        Vec4::from_array(self.ambient_light)
    }
}

impl Default for PassConstants {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array();
        Self {
            view: identity,
            inv_view: identity,
            proj: identity,
            inv_proj: identity,
            view_proj: identity,
            inv_view_proj: identity,
            eye_pos: [0.0; 3],
            pad0: 0.0,
            render_target_size: [0.0; 2],
            inv_render_target_size: [0.0; 2],
            near_z: 1.0,
            far_z: 1000.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: [0.25, 0.25, 0.35, 1.0],
            fog_color: [0.7, 0.7, 0.7, 1.0],
            fog_start: 5.0,
            fog_range: 150.0,
            pad1: [0.0; 2],
            lights: [Light::default(); LIGHT_COUNT],
        }
    }
}

unsafe impl ConstantData for PassConstants {}
