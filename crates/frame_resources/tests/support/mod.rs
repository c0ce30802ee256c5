#![allow(dead_code)]

use bevy_math::Mat4;
use bevy_math::Vec3;
use frame_resources::FrameConfig;
use frame_resources::FramePlan;
use frame_resources::Technique;
use frame_resources::constants::PassConstants;
use frame_resources::scene::DrawArgs;
use frame_resources::scene::MaterialDesc;
use frame_resources::scene::MaterialId;
use frame_resources::scene::MeshGeometry;
use frame_resources::scene::RenderItemDesc;
use frame_resources::scene::RenderItemId;
use frame_resources::scene::Scene;

pub fn init_tracing() {
    // Several tests in one binary race to install; only the first one wins.
    let _ = color_eyre::install();
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub struct Fixture {
    pub scene: Scene,
    pub crate_item: RenderItemId,
    pub floor_item: RenderItemId,
    pub material: MaterialId,
    pub plan: FramePlan,
    pub passes: [PassConstants; 2],
}

pub fn fixture(frame_count: usize) -> eyre::Result<Fixture> {
    fixture_in(Scene::new(&FrameConfig::default(), frame_count))
}

/// Adds a box and a floor grid sharing one material to `scene`.
pub fn fixture_in(mut scene: Scene) -> eyre::Result<Fixture> {
    let geometry = scene.add_geometry(
        MeshGeometry::new("shapes")
            .with_submesh(
                "box",
                DrawArgs {
                    index_count: 36,
                    start_index: 0,
                    base_vertex: 0,
                },
            )
            .with_submesh(
                "grid",
                DrawArgs {
                    index_count: 6,
                    start_index: 36,
                    base_vertex: 24,
                },
            ),
    );
    let material = scene.add_material(MaterialDesc::new("bricks").with_roughness(0.25))?;
    let crate_item = scene.add_render_item(RenderItemDesc::new(
        geometry,
        material,
        scene.geometry(geometry)?.submesh("box").unwrap_or_default(),
    ))?;
    let floor_item = scene.add_render_item(RenderItemDesc::new(
        geometry,
        material,
        scene.geometry(geometry)?.submesh("grid").unwrap_or_default(),
    ))?;
    let plan = FramePlan::new().batch(Technique::Opaque, [crate_item, floor_item]);
    Ok(Fixture {
        scene,
        crate_item,
        floor_item,
        material,
        plan,
        passes: [PassConstants::default(); 2],
    })
}

pub fn translation(x: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, 0.0, 0.0))
}
