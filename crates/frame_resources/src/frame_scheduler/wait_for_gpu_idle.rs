use tracing::debug;

use super::FrameScheduler;
use crate::error::FrameResult;
use crate::fence_counter::Retired;
use crate::gpu::Device;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// Waits until every frame submitted so far has finished on the GPU.
    pub fn wait_for_gpu_idle(&mut self) -> FrameResult<Retired> {
        // Signal a fresh value so the wait also covers work submitted after the last frame.
        let retired = self.fence.flush(&self.queue)?;
        debug!(value = retired.value(), "GPU idle");
        Ok(retired)
    }
}
