use tracing::info;

use super::FrameScheduler;
use super::FrameState;
use super::ResizeState;
use crate::error::FrameResult;
use crate::gpu::Device;
use crate::gpu::SurfaceResources;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// Rebuilds the size-dependent surface resources.
    ///
    /// Every slot may still be referenced by the GPU, so all of them are drained first.
    /// The slot index and fence value carry on; the backbuffer index restarts at 0.
    pub fn resize<R: SurfaceResources>(&mut self, surface: &mut R, width: u32, height: u32) -> FrameResult<()> {
        self.expect_state("resize", &[FrameState::Idle, FrameState::Submitted])?;
        info!(width, height, "resizing surface resources");

        self.resize_state = ResizeState::FlushPending;
        self.wait_for_gpu_idle()?;

        self.resize_state = ResizeState::ResourceRebuild;
        surface.release()?;
        surface.recreate(width, height)?;
        self.backbuffer_index = 0;

        // Drain again so nothing recorded against the old resources is still in flight.
        self.wait_for_gpu_idle()?;
        self.resize_state = ResizeState::Running;
        Ok(())
    }
}
