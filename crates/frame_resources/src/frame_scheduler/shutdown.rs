use tracing::error;
use tracing::info;

use super::FrameScheduler;
use crate::error::FrameResult;
use crate::gpu::Device;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// Drains the GPU so every frame slot can be released safely.
    pub fn shutdown(mut self) -> FrameResult<()> {
        let result = self.wait_for_gpu_idle();
        self.shut_down = true;
        let retired = result?;
        info!(
            frames = self.frames_submitted,
            fence = retired.value(),
            "frame scheduler shut down"
        );
        Ok(())
    }
}

impl<D: Device, const N: usize> Drop for FrameScheduler<D, N> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if let Err(error) = self.wait_for_gpu_idle() {
            error!("failed to drain the GPU before releasing frame resources: {error}");
        }
    }
}
