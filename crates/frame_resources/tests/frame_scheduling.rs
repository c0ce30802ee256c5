mod support;

use std::time::Duration;

use eyre::eyre;
use frame_resources::FrameConfig;
use frame_resources::FrameScheduler;
use frame_resources::FrameState;
use frame_resources::constants::ObjectConstants;
use frame_resources::gpu::software::AllocatorReset;
use frame_resources::gpu::software::HISTORY_LIMIT;
use frame_resources::gpu::software::SoftwareDevice;
use frame_resources::gpu::software::SoftwareGpu;
use support::fixture;
use support::init_tracing;
use support::translation;

#[test]
fn fourth_frame_blocks_until_the_first_retires() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::manual();
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;

    for expected in 1..=3 {
        let value = scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
        assert_eq!(value, expected);
    }
    assert!(gpu.blocking_waits().is_empty());
    assert_eq!(scheduler.slot_index(), 0);
    assert_eq!(scheduler.completed_fence_value()?, 0);

    std::thread::scope(|scope| -> eyre::Result<()> {
        let frame = scope.spawn(|| {
            scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)
        });
        while gpu.blocking_waits().is_empty() {
            std::thread::yield_now();
        }
        assert_eq!(gpu.blocking_waits(), [1]);
        assert!(!frame.is_finished());

        assert_eq!(gpu.retire_next_signal(), Some(1));
        let value = frame
            .join()
            .map_err(|_| eyre!("frame thread panicked"))??;
        assert_eq!(value, 4);
        Ok(())
    })?;

    assert_eq!(
        gpu.allocator_resets().last(),
        Some(&AllocatorReset {
            allocator: 0,
            completed_value: 1,
        })
    );

    gpu.retire_immediately();
    scheduler.shutdown()?;
    assert!(gpu.violations().is_empty());
    assert!(gpu.is_idle());
    Ok(())
}

fn run_threaded<const N: usize>(frames: usize) -> eyre::Result<()> {
    let gpu = SoftwareGpu::threaded(Duration::from_millis(1));
    let mut fixture = fixture(N)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, N>::new(&gpu.device(), FrameConfig::default())?;

    for frame in 0..frames {
        fixture
            .scene
            .set_world(fixture.crate_item, translation(frame as f32))?;
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
        assert_eq!(scheduler.slot_index(), (frame + 1) % N);
    }
    scheduler.shutdown()?;

    assert_eq!(gpu.violations(), Vec::<String>::new());
    let executed = gpu.executed_lists();
    assert_eq!(executed.len(), frames);
    for (frame, list) in executed.iter().enumerate() {
        // Each list must observe the transform written for its own frame.
        let object: ObjectConstants = list.draws[0].object_as();
        assert_eq!(object.world(), translation(frame as f32));
        assert_eq!(list.allocator, frame % N);
    }
    Ok(())
}

#[test]
fn allocators_are_never_reset_while_in_flight() -> eyre::Result<()> {
    init_tracing();
    run_threaded::<2>(10)?;
    run_threaded::<3>(12)?;
    run_threaded::<4>(12)?;
    Ok(())
}

#[test]
fn single_slot_waits_every_frame_without_deadlock() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::threaded(Duration::from_millis(2));
    let mut fixture = fixture(1)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 1>::new(&gpu.device(), FrameConfig::default())?;

    for frame in 0..5 {
        assert_eq!(
            scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?,
            frame + 1
        );
        assert_eq!(scheduler.slot_index(), 0);
    }
    scheduler.shutdown()?;

    let resets = gpu.allocator_resets();
    assert_eq!(resets.len(), 5);
    for (frame, reset) in resets.iter().enumerate() {
        assert!(reset.completed_value >= frame as u64);
    }
    assert!(gpu.violations().is_empty());
    Ok(())
}

#[test]
fn device_loss_during_slot_wait_is_fatal() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::manual();
    let mut fixture = fixture(2)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 2>::new(&gpu.device(), FrameConfig::default())?;
    scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;

    let result = std::thread::scope(|scope| {
        let frame = scope.spawn(|| {
            scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)
        });
        while gpu.blocking_waits().is_empty() {
            std::thread::yield_now();
        }
        gpu.lose_device();
        frame.join()
    })
    .map_err(|_| eyre!("frame thread panicked"))?;

    let report = result.err().ok_or_else(|| eyre!("frame completed on a lost device"))?;
    assert!(report.is_device_lost());
    assert_eq!(scheduler.frame_state(), FrameState::WaitingForSlot);
    assert!(scheduler.begin_frame().is_err());
    Ok(())
}

#[test]
fn operations_out_of_order_are_rejected() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::immediate();
    let mut fixture = fixture(3)?;
    let mut surface = gpu.surface(800, 600);
    let mut scheduler = FrameScheduler::<SoftwareDevice>::new(&gpu.device(), FrameConfig::default())?;

    assert!(scheduler.end_frame().is_err());
    assert!(scheduler.record(&fixture.plan, &fixture.scene).is_err());
    assert!(
        scheduler
            .update_constants(&mut fixture.scene, &fixture.passes)
            .is_err()
    );

    scheduler.begin_frame()?;
    assert_eq!(scheduler.frame_state(), FrameState::Recording);
    assert!(scheduler.begin_frame().is_err());
    assert!(scheduler.resize(&mut surface, 1024, 768).is_err());
    scheduler.end_frame()?;
    assert_eq!(scheduler.frame_state(), FrameState::Submitted);

    // Nothing from the rejected calls consumed a dirty frame.
    assert_eq!(fixture.scene.render_item(fixture.crate_item)?.frames_dirty(), 3);
    scheduler.shutdown()?;
    Ok(())
}

#[test]
fn dropping_without_shutdown_drains_the_gpu() -> eyre::Result<()> {
    init_tracing();
    let gpu = SoftwareGpu::threaded(Duration::from_millis(5));
    let mut fixture = fixture(3)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 3>::new(&gpu.device(), FrameConfig::default())?;

    for _ in 0..3 {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    let submitted = scheduler.next_fence_value();
    drop(scheduler);

    assert!(gpu.is_idle());
    assert!(gpu.highest_completed_value() > submitted);
    assert_eq!(gpu.executed_count(), 3);
    assert_eq!(gpu.violation_count(), 0);
    Ok(())
}

#[test]
fn long_runs_keep_bounded_diagnostics() -> eyre::Result<()> {
    let gpu = SoftwareGpu::immediate();
    let mut fixture = fixture(2)?;
    let mut scheduler = FrameScheduler::<SoftwareDevice, 2>::new(&gpu.device(), FrameConfig::default())?;

    let frames = HISTORY_LIMIT + 44;
    for _ in 0..frames {
        scheduler.render_frame(&mut fixture.scene, &fixture.passes, &fixture.plan)?;
    }
    scheduler.shutdown()?;

    assert_eq!(gpu.executed_lists().len(), HISTORY_LIMIT);
    assert_eq!(gpu.executed_count(), frames as u64);
    assert_eq!(gpu.allocator_resets().len(), HISTORY_LIMIT);
    assert_eq!(gpu.allocator_reset_count(), frames as u64);
    assert_eq!(gpu.presents(), frames as u64);
    Ok(())
}
