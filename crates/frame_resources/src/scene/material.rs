use bevy_math::Mat4;
use bevy_math::Vec3;
use bevy_math::Vec4;

use crate::constants::MaterialConstants;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Editable surface parameters of a material.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    pub diffuse_albedo: Vec4,
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    pub mat_transform: Mat4,
}

impl MaterialDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_albedo: Vec4::ONE,
            fresnel_r0: Vec3::splat(0.01),
            roughness: 0.25,
            mat_transform: Mat4::IDENTITY,
        }
    }

    pub fn with_albedo(mut self, diffuse_albedo: Vec4) -> Self {
        self.diffuse_albedo = diffuse_albedo;
        self
    }

    pub fn with_fresnel(mut self, fresnel_r0: Vec3) -> Self {
        self.fresnel_r0 = fresnel_r0;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }
}

pub struct Material {
    desc: MaterialDesc,
    constant_index: usize,
    pub(crate) frames_dirty: usize,
}

impl Material {
    pub(crate) fn new(desc: MaterialDesc, constant_index: usize, frames_dirty: usize) -> Self {
        Self {
            desc,
            constant_index,
            frames_dirty,
        }
    }

    pub fn desc(&self) -> &MaterialDesc {
        &self.desc
    }

    pub(crate) fn desc_mut(&mut self) -> &mut MaterialDesc {
        &mut self.desc
    }

    pub fn constant_index(&self) -> usize {
        self.constant_index
    }

    /// Frames whose material constants still hold a stale copy.
    pub fn frames_dirty(&self) -> usize {
        self.frames_dirty
    }

    pub fn constants(&self) -> MaterialConstants {
        MaterialConstants {
            diffuse_albedo: self.desc.diffuse_albedo.to_array(),
            fresnel_r0: self.desc.fresnel_r0.to_array(),
            roughness: self.desc.roughness,
            mat_transform: self.desc.mat_transform.to_cols_array(),
        }
    }
}
