use super::FrameScheduler;
use super::FrameState;
use crate::error::FrameResult;
use crate::frame_plan::FramePlan;
use crate::gpu::Device;
use crate::populate_command_list::populate_command_list;
use crate::scene::Scene;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    pub fn record(&mut self, plan: &FramePlan, scene: &Scene) -> FrameResult<()> {
        self.expect_state("record", &[FrameState::Recording])?;
        let slot = self.slots.slot(self.slot_index)?;
        populate_command_list(&mut self.command_list, slot, plan, scene)
    }
}
