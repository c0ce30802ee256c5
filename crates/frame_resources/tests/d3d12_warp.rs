#![cfg(windows)]

mod support;

use frame_resources::FrameConfig;
use frame_resources::FramePlan;
use frame_resources::FrameScheduler;
use frame_resources::gpu::d3d12::D3d12Device;
use frame_resources::gpu::d3d12::D3d12Surface;
use support::fixture;
use support::init_tracing;

#[test]
fn warp_device_paces_frames_with_its_fence() -> eyre::Result<()> {
    init_tracing();
    let device = D3d12Device::new(true)?;
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<D3d12Device, 3>::new(&device, FrameConfig::default())?;

    // No pipelines are registered, so only constant uploads and fence pacing are exercised.
    let plan = FramePlan::new();
    for frame in 0..8 {
        fixture.passes[0].total_time = frame as f32;
        let value = scheduler.render_frame(&mut fixture.scene, &fixture.passes, &plan)?;
        assert_eq!(value, frame + 1);
    }

    let retired = scheduler.wait_for_gpu_idle()?;
    assert!(scheduler.completed_fence_value()? >= retired.value());

    // Slot 1 was used last by frame 7.
    let pass = scheduler.slots().slot(1)?.pass_constants().read(0)?;
    assert_eq!(pass.total_time, 7.0);
    scheduler.shutdown()?;
    Ok(())
}

#[test]
fn swap_chain_buffers_are_rebuilt_on_resize() -> eyre::Result<()> {
    init_tracing();
    let device = D3d12Device::new(true)?;
    let mut fixture = fixture(3)?;
    let config = FrameConfig::default();
    let buffer_count = config.backbuffer_count;
    let mut scheduler = FrameScheduler::<D3d12Device, 3>::new(&device, config)?;
    let mut surface = D3d12Surface::new(&device, scheduler.queue(), 640, 480, buffer_count)?;
    assert_eq!(surface.render_targets().len(), buffer_count as usize);

    let plan = FramePlan::new();
    for _ in 0..3 {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &plan)?;
    }

    scheduler.resize(&mut surface, 320, 200)?;
    assert_eq!(surface.size(), (320, 200));
    assert_eq!(surface.render_targets().len(), buffer_count as usize);
    assert_eq!(surface.current_back_buffer_index(), scheduler.backbuffer_index());
    let desc = unsafe { surface.render_targets()[0].GetDesc() };
    assert_eq!((desc.Width, desc.Height), (320, 200));
    assert!(surface.render_target_view(buffer_count).is_err());

    scheduler.render_frame(&mut fixture.scene, &fixture.passes, &plan)?;
    scheduler.shutdown()?;
    Ok(())
}
