use tracing::debug;

use super::FrameScheduler;
use super::FrameState;
use crate::error::FrameResult;
use crate::gpu::CommandList;
use crate::gpu::Device;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// Waits until the current slot is free, then opens its command list for recording.
    pub fn begin_frame(&mut self) -> FrameResult<()> {
        self.expect_state("begin_frame", &[FrameState::Idle, FrameState::Submitted])?;

        // The slot was last submitted N frames ago; its checkpoint proves the GPU is done with it.
        self.frame_state = FrameState::WaitingForSlot;
        let checkpoint = self.slots.slot(self.slot_index)?.checkpoint_value();
        let retired = self.fence.wait_until(checkpoint)?;
        self.frame_state = FrameState::Idle;

        debug!(
            slot = self.slot_index,
            checkpoint,
            "slot retired, resetting allocator"
        );
        self.slots.reset_allocator(self.slot_index, &retired)?;
        self.command_list
            .reset(self.slots.slot(self.slot_index)?.allocator())?;
        self.frame_state = FrameState::Recording;
        Ok(())
    }
}
