mod support;

use std::time::Duration;

use frame_resources::FrameConfig;
use frame_resources::FrameScheduler;
use frame_resources::ResizeState;
use frame_resources::gpu::software::SoftwareDevice;
use frame_resources::gpu::software::SoftwareGpu;
use support::fixture;
use support::init_tracing;

#[test]
fn resize_drains_the_gpu_and_keeps_slot_order() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::threaded(Duration::from_millis(3));
    let mut surface = gpu.surface(800, 600);
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;

    for _ in 0..4 {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    let slot_before = scheduler.slot_index();
    let fence_before = scheduler.next_fence_value();
    assert_eq!(slot_before, 1);
    assert_eq!(scheduler.backbuffer_index(), 0);
    scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    assert_eq!(scheduler.backbuffer_index(), 1);

    scheduler.resize(&mut surface, 1024, 768)?;
    assert_eq!(gpu.violations(), Vec::<String>::new());
    assert_eq!(surface.size(), (1024, 768));
    assert_eq!(surface.generation(), 1);
    assert_eq!(scheduler.resize_state(), ResizeState::Running);
    assert_eq!(scheduler.backbuffer_index(), 0);
    assert_eq!(scheduler.slot_index(), 2);
    assert!(scheduler.next_fence_value() > fence_before + 1);
    assert!(scheduler.completed_fence_value()? >= scheduler.next_fence_value());

    // Round-robin continues from where it was.
    for expected_slot in [2, 0, 1, 2] {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
        assert_eq!(scheduler.slot_index(), (expected_slot + 1) % 3);
    }
    scheduler.shutdown()?;
    assert!(gpu.violations().is_empty());
    Ok(())
}

#[test]
fn resize_is_rejected_while_recording() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let mut surface = gpu.surface(640, 480);
    let mut scheduler = FrameScheduler::<SoftwareDevice, 2>::new(&gpu.device(), FrameConfig::default())?;

    scheduler.begin_frame()?;
    assert!(scheduler.resize(&mut surface, 320, 240).is_err());
    assert_eq!(scheduler.resize_state(), ResizeState::Running);
    assert_eq!(surface.generation(), 0);
    scheduler.end_frame()?;

    scheduler.resize(&mut surface, 320, 240)?;
    assert_eq!(surface.size(), (320, 240));
    scheduler.shutdown()?;
    Ok(())
}

#[test]
fn releasing_surface_resources_under_load_is_detected() -> eyre::Result<()> {
    use frame_resources::gpu::SurfaceResources;

    init_tracing();
    let gpu = SoftwareGpu::manual();
    let mut surface = gpu.surface(640, 480);
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;
    scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;

    // Bypassing the scheduler's drain leaves the frame in flight.
    assert!(surface.release().is_err());
    assert_eq!(gpu.violations().len(), 1);

    gpu.retire_immediately();
    scheduler.shutdown()?;
    Ok(())
}
