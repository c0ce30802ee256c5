use std::f32::consts::FRAC_PI_2;

use bevy_math::Mat4;
use bevy_math::Vec3;
use bevy_math::Vec4;
use frame_resources::FramePlan;
use frame_resources::FrameResult;
use frame_resources::scene::DrawArgs;
use frame_resources::scene::GeometryId;
use frame_resources::scene::MaterialDesc;
use frame_resources::scene::MeshGeometry;
use frame_resources::scene::RenderItemDesc;
use frame_resources::scene::RenderItemId;
use frame_resources::scene::Scene;

const SKULL_INDEX_COUNT: u32 = 93_228;

/// Reflection across the mirror, which lies in the xy plane.
pub fn mirror_reflection() -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0, 1.0, -1.0))
}

/// Projects geometry onto `plane` along the direction towards a light.
/// A `to_light.w` of 0 is a directional light.
pub fn planar_shadow(plane: Vec4, to_light: Vec4) -> Mat4 {
    let plane = plane / plane.truncate().length();
    let d = plane.dot(to_light);
    Mat4::from_diagonal(Vec4::splat(d))
        - Mat4::from_cols(
            to_light * plane.x,
            to_light * plane.y,
            to_light * plane.z,
            to_light * plane.w,
        )
}

/// The room with a mirror, a skull, its reflection and planar shadows.
pub struct MirrorScene {
    pub scene: Scene,
    pub plan: FramePlan,
    skull: RenderItemId,
    reflected_skull: RenderItemId,
    shadowed_skull: RenderItemId,
    reflected_shadow: RenderItemId,
    skull_translation: Vec3,
}

impl MirrorScene {
    /// Populates `scene`, which should come from the scheduler that will draw it.
    pub fn new(mut scene: Scene, main_light: Vec3) -> FrameResult<Self> {
        let room = scene.add_geometry(
            MeshGeometry::new("room")
                .with_submesh("floor", draw(6, 0))
                .with_submesh("wall", draw(18, 6))
                .with_submesh("mirror", draw(6, 24)),
        );
        let skull_mesh =
            scene.add_geometry(MeshGeometry::new("skull").with_submesh("skull", draw(SKULL_INDEX_COUNT, 0)));

        let bricks = scene.add_material(MaterialDesc::new("bricks").with_fresnel(Vec3::splat(0.05)))?;
        let checker_tile = scene.add_material(
            MaterialDesc::new("checkertile")
                .with_fresnel(Vec3::splat(0.07))
                .with_roughness(0.3),
        )?;
        let ice_mirror = scene.add_material(
            MaterialDesc::new("icemirror")
                .with_albedo(Vec4::new(1.0, 1.0, 1.0, 0.3))
                .with_fresnel(Vec3::splat(0.1))
                .with_roughness(0.5),
        )?;
        let skull_material = scene.add_material(
            MaterialDesc::new("skullmat")
                .with_fresnel(Vec3::splat(0.05))
                .with_roughness(0.3),
        )?;
        let shadow_material = scene.add_material(
            MaterialDesc::new("shadowmat")
                .with_albedo(Vec4::new(0.0, 0.0, 0.0, 0.5))
                .with_fresnel(Vec3::splat(0.001))
                .with_roughness(0.0),
        )?;

        let floor_args = submesh(&scene, room, "floor")?;
        let floor = scene.add_render_item(RenderItemDesc::new(room, checker_tile, floor_args))?;
        let wall = scene.add_render_item(RenderItemDesc::new(room, bricks, submesh(&scene, room, "wall")?))?;
        let skull_args = submesh(&scene, skull_mesh, "skull")?;
        let skull = scene.add_render_item(RenderItemDesc::new(skull_mesh, skull_material, skull_args))?;
        let reflected_skull =
            scene.add_render_item(RenderItemDesc::new(skull_mesh, skull_material, skull_args))?;
        let reflected_floor = scene.add_render_item(
            RenderItemDesc::new(room, checker_tile, floor_args).with_world(mirror_reflection()),
        )?;
        let shadowed_skull =
            scene.add_render_item(RenderItemDesc::new(skull_mesh, shadow_material, skull_args))?;
        let reflected_shadow =
            scene.add_render_item(RenderItemDesc::new(skull_mesh, shadow_material, skull_args))?;
        let mirror = scene.add_render_item(RenderItemDesc::new(
            room,
            ice_mirror,
            submesh(&scene, room, "mirror")?,
        ))?;

        let plan = FramePlan::stenciled_mirror(
            [floor, wall, skull],
            [mirror],
            [reflected_skull, reflected_floor],
            [reflected_shadow],
            [shadowed_skull],
        );

        let mut mirror_scene = Self {
            scene,
            plan,
            skull,
            reflected_skull,
            shadowed_skull,
            reflected_shadow,
            skull_translation: Vec3::new(0.0, 1.0, -5.0),
        };
        mirror_scene.move_skull(Vec3::ZERO, main_light)?;
        Ok(mirror_scene)
    }

    pub fn skull_translation(&self) -> Vec3 {
        self.skull_translation
    }

    /// Moves the skull and updates everything derived from it.
    pub fn move_skull(&mut self, delta: Vec3, main_light: Vec3) -> FrameResult<()> {
        let mut translation = self.skull_translation + delta;
        // Don't let the skull sink below the floor.
        translation.y = translation.y.max(0.0);
        self.skull_translation = translation;

        let skull_world = Mat4::from_translation(translation)
            * Mat4::from_scale(Vec3::splat(0.45))
            * Mat4::from_rotation_y(FRAC_PI_2);
        let reflect = mirror_reflection();
        let shadow = Mat4::from_translation(Vec3::new(0.0, 0.001, 0.0))
            * planar_shadow(Vec4::new(0.0, 1.0, 0.0, 0.0), (-main_light).extend(0.0))
            * skull_world;

        self.scene.set_world(self.skull, skull_world)?;
        self.scene.set_world(self.reflected_skull, reflect * skull_world)?;
        self.scene.set_world(self.shadowed_skull, shadow)?;
        self.scene.set_world(self.reflected_shadow, reflect * shadow)?;
        Ok(())
    }
}

fn draw(index_count: u32, start_index: u32) -> DrawArgs {
    DrawArgs {
        index_count,
        start_index,
        base_vertex: 0,
    }
}

fn submesh(
    scene: &Scene,
    geometry: GeometryId,
    name: &str,
) -> FrameResult<DrawArgs> {
    scene
        .geometry(geometry)?
        .submesh(name)
        .ok_or_else(|| eyre::eyre!("geometry has no submesh named {name:?}").into())
}
