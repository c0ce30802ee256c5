use bevy_math::Mat4;

use super::DrawArgs;
use super::GeometryId;
use super::MaterialId;
use crate::constants::ObjectConstants;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderItemId(pub(crate) usize);

impl RenderItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItemDesc {
    pub world: Mat4,
    pub tex_transform: Mat4,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub args: DrawArgs,
}

impl RenderItemDesc {
    pub fn new(geometry: GeometryId, material: MaterialId, args: DrawArgs) -> Self {
        Self {
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
            geometry,
            material,
            args,
        }
    }

    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }
}

/// One drawable instance. Its object constant index equals its position in the scene.
pub struct RenderItem {
    desc: RenderItemDesc,
    object_index: usize,
    pub(crate) frames_dirty: usize,
}

impl RenderItem {
    pub(crate) fn new(desc: RenderItemDesc, object_index: usize, frames_dirty: usize) -> Self {
        Self {
            desc,
            object_index,
            frames_dirty,
        }
    }

    pub fn world(&self) -> Mat4 {
        self.desc.world
    }

    pub fn tex_transform(&self) -> Mat4 {
        self.desc.tex_transform
    }

    pub fn geometry(&self) -> GeometryId {
        self.desc.geometry
    }

    pub fn material(&self) -> MaterialId {
        self.desc.material
    }

    pub fn args(&self) -> DrawArgs {
        self.desc.args
    }

    pub fn object_index(&self) -> usize {
        self.object_index
    }

    pub fn frames_dirty(&self) -> usize {
        self.frames_dirty
    }

    pub(crate) fn desc_mut(&mut self) -> &mut RenderItemDesc {
        &mut self.desc
    }

    pub fn constants(&self) -> ObjectConstants {
        ObjectConstants::new(self.desc.world, self.desc.tex_transform)
    }
}
