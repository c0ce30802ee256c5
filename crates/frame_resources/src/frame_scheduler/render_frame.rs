use super::FrameScheduler;
use crate::constants::PassConstants;
use crate::error::FrameResult;
use crate::frame_plan::FramePlan;
use crate::gpu::Device;
use crate::scene::Scene;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// One full frame: wait for the slot, write constants, record, submit.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        passes: &[PassConstants],
        plan: &FramePlan,
    ) -> FrameResult<u64> {
        self.begin_frame()?;
        self.update_constants(scene, passes)?;
        self.record(plan, scene)?;
        self.end_frame()
    }
}
