mod command_line;
mod mirror_scene;

use std::time::Duration;

use bevy_math::Vec3;
use command_line::build_command_line;
use eyre::bail;
use frame_resources::FrameConfig;
use frame_resources::FrameScheduler;
use frame_resources::gpu::software::SoftwareDevice;
use frame_resources::gpu::software::SoftwareGpu;
use frame_resources::scene::SceneContext;
use mirror_scene::MirrorScene;
use tracing::debug;
use tracing::info;
use tracing::warn;

const SIZES: [(u32, u32); 2] = [(1280, 720), (960, 540)];

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .init();

    let command_line = build_command_line()?;
    info!(?command_line, "Starting stenciled mirror demo");
    if command_line.use_warp_device {
        warn!("-warp has no effect, frames are retired by the software GPU");
    }

    let gpu = SoftwareGpu::threaded(Duration::from_millis(command_line.latency_ms));
    let device = gpu.device();
    let (width, height) = SIZES[0];
    let mut surface = gpu.surface(width, height);
    let mut context = SceneContext::new(width, height);

    let mut scheduler = FrameScheduler::<SoftwareDevice>::new(&device, FrameConfig::default())?;
    let main_light = Vec3::from_array(context.lights[0].direction);
    let mut mirror = MirrorScene::new(scheduler.create_scene(), main_light)?;

    context.timer.reset();
    for frame in 0..command_line.frames {
        context.timer.tick();
        let dt = context.timer.delta_seconds();

        context.orbit(0.25 * dt, 0.0);
        context.update_camera();

        // Walk the skull back and forth in front of the mirror.
        let direction = if (frame / 60) % 2 == 0 { 1.0 } else { -1.0 };
        mirror.move_skull(Vec3::new(direction * 0.05, 0.0, 0.0), main_light)?;

        if let Some(every) = command_line.resize_every {
            if frame > 0 && frame % every == 0 {
                let (width, height) = SIZES[((frame / every) % 2) as usize];
                scheduler.resize(&mut surface, width, height)?;
                context.on_resize(width, height);
            }
        }

        let passes = context.pass_constants();
        let fence_value = scheduler.render_frame(&mut mirror.scene, &passes, &mirror.plan)?;
        debug!(frame, fence_value, slot = scheduler.slot_index(), "Submitted frame");
    }

    let frames_submitted = scheduler.frames_submitted();
    scheduler.shutdown()?;

    info!(
        frames_submitted,
        presents = gpu.presents(),
        executed = gpu.executed_count(),
        blocking_waits = gpu.blocking_wait_count(),
        allocator_resets = gpu.allocator_reset_count(),
        surface_generation = surface.generation(),
        "Finished"
    );

    let violation_count = gpu.violation_count();
    if violation_count > 0 {
        for violation in gpu.violations() {
            warn!(%violation, "GPU hazard");
        }
        bail!("{violation_count} GPU hazards were detected");
    }
    Ok(())
}
