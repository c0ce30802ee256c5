//! Render items, materials and geometry, owned by the caller and lent to the scheduler.

mod frame_timer;
mod geometry;
mod material;
mod render_item;
mod scene_context;

pub use frame_timer::FrameTimer;
pub use geometry::DrawArgs;
pub use geometry::GeometryId;
pub use geometry::MeshGeometry;
pub use material::Material;
pub use material::MaterialDesc;
pub use material::MaterialId;
pub use render_item::RenderItem;
pub use render_item::RenderItemDesc;
pub use render_item::RenderItemId;
pub use scene_context::SceneContext;

use bevy_math::Mat4;
use eyre::eyre;

use crate::config::FrameConfig;
use crate::error::FrameResult;

/// Arena of scene entities.
///
/// Every change marks the entity dirty for `frame_count` frames so that each frame slot's
/// copy of its constants gets rewritten exactly once.
pub struct Scene {
    frame_count: usize,
    object_capacity: usize,
    material_capacity: usize,
    geometries: Vec<MeshGeometry>,
    materials: Vec<Material>,
    items: Vec<RenderItem>,
}

impl Scene {
    pub fn new(config: &FrameConfig, frame_count: usize) -> Self {
        Self {
            frame_count,
            object_capacity: config.object_capacity,
            material_capacity: config.material_capacity,
            geometries: Vec::new(),
            materials: Vec::with_capacity(config.material_capacity),
            items: Vec::with_capacity(config.object_capacity),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn add_geometry(&mut self, geometry: MeshGeometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, desc: MaterialDesc) -> FrameResult<MaterialId> {
        if self.materials.len() >= self.material_capacity {
            return Err(eyre!(
                "material {:?} exceeds the capacity of {} materials",
                desc.name,
                self.material_capacity
            )
            .into());
        }
        let index = self.materials.len();
        self.materials
            .push(Material::new(desc, index, self.frame_count));
        Ok(MaterialId(index))
    }

    pub fn add_render_item(&mut self, desc: RenderItemDesc) -> FrameResult<RenderItemId> {
        if self.items.len() >= self.object_capacity {
            return Err(eyre!(
                "render item exceeds the capacity of {} objects",
                self.object_capacity
            )
            .into());
        }
        self.geometry(desc.geometry)?;
        self.material(desc.material)?;
        let index = self.items.len();
        self.items
            .push(RenderItem::new(desc, index, self.frame_count));
        Ok(RenderItemId(index))
    }

    pub fn geometry(&self, id: GeometryId) -> FrameResult<&MeshGeometry> {
        self.geometries
            .get(id.0)
            .ok_or_else(|| eyre!("unknown geometry {id:?}").into())
    }

    pub fn material(&self, id: MaterialId) -> FrameResult<&Material> {
        self.materials
            .get(id.0)
            .ok_or_else(|| eyre!("unknown material {id:?}").into())
    }

    pub fn render_item(&self, id: RenderItemId) -> FrameResult<&RenderItem> {
        self.items
            .get(id.0)
            .ok_or_else(|| eyre!("unknown render item {id:?}").into())
    }

    fn render_item_mut(&mut self, id: RenderItemId) -> FrameResult<&mut RenderItem> {
        self.items
            .get_mut(id.0)
            .ok_or_else(|| eyre!("unknown render item {id:?}").into())
    }

    pub fn set_world(&mut self, id: RenderItemId, world: Mat4) -> FrameResult<()> {
        let frame_count = self.frame_count;
        let item = self.render_item_mut(id)?;
        item.desc_mut().world = world;
        item.frames_dirty = frame_count;
        Ok(())
    }

    pub fn set_tex_transform(&mut self, id: RenderItemId, tex_transform: Mat4) -> FrameResult<()> {
        let frame_count = self.frame_count;
        let item = self.render_item_mut(id)?;
        item.desc_mut().tex_transform = tex_transform;
        item.frames_dirty = frame_count;
        Ok(())
    }

    /// Points a render item at another material.
    pub fn set_material(&mut self, id: RenderItemId, material: MaterialId) -> FrameResult<()> {
        self.material(material)?;
        let frame_count = self.frame_count;
        let item = self.render_item_mut(id)?;
        item.desc_mut().material = material;
        item.frames_dirty = frame_count;
        Ok(())
    }

    pub fn update_material(
        &mut self,
        id: MaterialId,
        update: impl FnOnce(&mut MaterialDesc),
    ) -> FrameResult<()> {
        let frame_count = self.frame_count;
        let material = self
            .materials
            .get_mut(id.0)
            .ok_or_else(|| eyre!("unknown material {id:?}"))?;
        update(material.desc_mut());
        material.frames_dirty = frame_count;
        Ok(())
    }

    pub fn render_items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub(crate) fn render_items_mut(&mut self) -> &mut [RenderItem] {
        &mut self.items
    }

    pub(crate) fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;

    use super::*;

    fn scene_with_one_item() -> eyre::Result<(Scene, RenderItemId, MaterialId)> {
        let mut scene = Scene::new(&FrameConfig::default(), 3);
        let geometry = scene.add_geometry(MeshGeometry::new("room").with_submesh(
            "floor",
            DrawArgs {
                index_count: 6,
                start_index: 0,
                base_vertex: 0,
            },
        ));
        let material = scene.add_material(MaterialDesc::new("checkertile"))?;
        let args = scene.geometry(geometry)?.submesh("floor").unwrap_or_default();
        let item = scene.add_render_item(RenderItemDesc::new(geometry, material, args))?;
        Ok((scene, item, material))
    }

    #[test]
    fn new_entities_start_dirty_for_every_frame() -> eyre::Result<()> {
        let (scene, item, material) = scene_with_one_item()?;
        assert_eq!(scene.render_item(item)?.frames_dirty(), 3);
        assert_eq!(scene.material(material)?.frames_dirty(), 3);
        assert_eq!(scene.render_item(item)?.args().index_count, 6);
        Ok(())
    }

    #[test]
    fn changes_mark_entities_dirty_again() -> eyre::Result<()> {
        let (mut scene, item, material) = scene_with_one_item()?;
        scene.render_items_mut()[0].frames_dirty = 0;
        scene.materials_mut()[0].frames_dirty = 0;

        scene.set_world(item, Mat4::from_translation(Vec3::X))?;
        scene.update_material(material, |desc| desc.roughness = 0.9)?;
        assert_eq!(scene.render_item(item)?.frames_dirty(), 3);
        assert_eq!(scene.material(material)?.frames_dirty(), 3);
        assert_eq!(scene.material(material)?.constants().roughness, 0.9);
        Ok(())
    }

    #[test]
    fn capacity_is_enforced() -> eyre::Result<()> {
        let config = FrameConfig::default()
            .with_object_capacity(1)
            .with_material_capacity(1);
        let mut scene = Scene::new(&config, 2);
        let geometry = scene.add_geometry(MeshGeometry::new("quad"));
        let material = scene.add_material(MaterialDesc::new("bricks"))?;
        assert!(scene.add_material(MaterialDesc::new("ice")).is_err());

        let desc = RenderItemDesc::new(geometry, material, DrawArgs::default());
        scene.add_render_item(desc)?;
        assert!(scene.add_render_item(desc).is_err());
        Ok(())
    }

    #[test]
    fn unknown_references_are_rejected() -> eyre::Result<()> {
        let (mut scene, item, _) = scene_with_one_item()?;
        assert!(scene.set_material(item, MaterialId(7)).is_err());
        let desc = RenderItemDesc::new(GeometryId(9), MaterialId(0), DrawArgs::default());
        assert!(scene.add_render_item(desc).is_err());
        Ok(())
    }
}
