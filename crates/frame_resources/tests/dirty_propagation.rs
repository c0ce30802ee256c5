mod support;

use frame_resources::FrameConfig;
use frame_resources::FrameScheduler;
use frame_resources::FrameState;
use frame_resources::scene::RenderItemDesc;
use frame_resources::scene::Scene;
use frame_resources::gpu::software::SoftwareDevice;
use frame_resources::gpu::software::SoftwareGpu;
use support::fixture;
use support::fixture_in;
use support::init_tracing;
use support::translation;

#[test]
fn a_change_reaches_every_slot_after_n_frames() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;
    let item = fixture.crate_item;

    for _ in 0..3 {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    assert_eq!(fixture.scene.render_item(item)?.frames_dirty(), 0);

    let moved = translation(4.0);
    fixture.scene.set_world(item, moved)?;
    assert_eq!(fixture.scene.render_item(item)?.frames_dirty(), 3);

    let object_index = fixture.scene.render_item(item)?.object_index();
    for frame in 0..3 {
        let slot = scheduler.slot_index();
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
        assert_eq!(fixture.scene.render_item(item)?.frames_dirty(), 2 - frame);

        let written = scheduler.slots().slot(slot)?.object_constants().read(object_index)?;
        assert_eq!(written.world(), moved);

        // Slots not yet visited still hold the previous transform.
        for stale in (frame + 1)..3 {
            let stale_slot = (slot + stale - frame) % 3;
            let old = scheduler
                .slots()
                .slot(stale_slot)?
                .object_constants()
                .read(object_index)?;
            assert_eq!(old.world(), translation(0.0));
        }
    }

    for slot in scheduler.slots().iter() {
        assert_eq!(slot.object_constants().read(object_index)?.world(), moved);
    }

    // A fourth frame has nothing left to propagate.
    scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    assert_eq!(fixture.scene.render_item(item)?.frames_dirty(), 0);
    scheduler.shutdown()?;
    assert!(gpu.violations().is_empty());
    Ok(())
}

#[test]
fn material_edits_propagate_like_transforms() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let mut fixture = fixture(2)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 2>::new(&gpu.device(), FrameConfig::default())?;

    for _ in 0..2 {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    fixture
        .scene
        .update_material(fixture.material, |desc| desc.roughness = 0.75)?;
    let constant_index = fixture.scene.material(fixture.material)?.constant_index();

    for _ in 0..2 {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    assert_eq!(fixture.scene.material(fixture.material)?.frames_dirty(), 0);
    for slot in scheduler.slots().iter() {
        assert_eq!(slot.material_constants().read(constant_index)?.roughness, 0.75);
    }

    // The GPU saw the edit in the last two frames only.
    let roughness: Vec<f32> = gpu
        .executed_lists()
        .iter()
        .map(|list| list.draws[0].material_as::<frame_resources::constants::MaterialConstants>().roughness)
        .collect();
    assert_eq!(roughness, [0.25, 0.25, 0.75, 0.75]);
    scheduler.shutdown()?;
    Ok(())
}

#[test]
fn pass_records_are_rewritten_every_frame() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;

    for frame in 0..4 {
        fixture.passes[0].total_time = frame as f32;
        fixture.passes[1].total_time = frame as f32 + 0.5;
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    let times: Vec<f32> = gpu
        .executed_lists()
        .iter()
        .map(|list| list.draws[0].pass_as::<frame_resources::constants::PassConstants>().total_time)
        .collect();
    assert_eq!(times, [0.0, 1.0, 2.0, 3.0]);
    scheduler.shutdown()?;
    Ok(())
}

#[test]
fn scene_built_for_another_frame_count_is_rejected() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let mut fixture = fixture(5)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;

    scheduler.begin_frame()?;
    assert!(
        scheduler
            .update_constants(&mut fixture.scene, &fixture.passes)
            .is_err()
    );
    assert_eq!(fixture.scene.render_item(fixture.crate_item)?.frames_dirty(), 5);
    assert_eq!(fixture.scene.material(fixture.material)?.frames_dirty(), 5);

    // A scene made by the scheduler always agrees with it.
    let scene = scheduler.create_scene();
    assert_eq!(scene.frame_count(), 3);
    Ok(())
}

#[test]
fn oversized_scene_fails_before_any_dirty_count_is_consumed() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let config = FrameConfig::default();
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), config)?;

    let roomy = Scene::new(&config.with_object_capacity(config.object_capacity + 1), 3);
    let mut fixture = fixture_in(roomy)?;
    let crate_item = fixture.scene.render_item(fixture.crate_item)?;
    let desc = RenderItemDesc::new(crate_item.geometry(), crate_item.material(), crate_item.args());
    while fixture.scene.render_items().len() <= config.object_capacity {
        fixture.scene.add_render_item(desc)?;
    }

    scheduler.begin_frame()?;
    for _ in 0..2 {
        assert!(
            scheduler
                .update_constants(&mut fixture.scene, &fixture.passes)
                .is_err()
        );
        assert_eq!(scheduler.frame_state(), FrameState::Recording);
        assert!(
            fixture
                .scene
                .render_items()
                .iter()
                .all(|item| item.frames_dirty() == 3)
        );
    }
    Ok(())
}

#[test]
fn scheduler_scene_is_capped_at_the_slot_capacity() -> eyre::Result<()> {
    let gpu = SoftwareGpu::immediate();
    let config = FrameConfig::default().with_object_capacity(2);
    let scheduler = FrameScheduler::<SoftwareDevice, 2>::new(&gpu.device(), config)?;

    let mut fixture = fixture_in(scheduler.create_scene())?;
    let floor = fixture.scene.render_item(fixture.floor_item)?;
    let desc = RenderItemDesc::new(floor.geometry(), floor.material(), floor.args());
    assert!(fixture.scene.add_render_item(desc).is_err());
    assert_eq!(fixture.scene.frame_count(), 2);
    scheduler.shutdown()?;
    Ok(())
}
