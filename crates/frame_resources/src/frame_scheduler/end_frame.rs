use tracing::debug;

use super::FrameScheduler;
use super::FrameState;
use crate::error::FrameResult;
use crate::frame_slot_pool::FrameSlotPool;
use crate::gpu::CommandList;
use crate::gpu::CommandQueue;
use crate::gpu::Device;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// Submits the recorded frame and moves on to the next slot.
    ///
    /// Returns the fence value that becomes the submitted slot's checkpoint.
    pub fn end_frame(&mut self) -> FrameResult<u64> {
        self.expect_state("end_frame", &[FrameState::Recording])?;

        self.command_list.close()?;
        self.queue.execute_command_list(&self.command_list)?;
        self.queue.present()?;

        // Schedule a Signal command in the queue behind this frame's work.
        let checkpoint = self.fence.advance(&self.queue)?;
        self.slots.set_checkpoint(self.slot_index, checkpoint)?;
        self.frame_state = FrameState::Submitted;
        self.frames_submitted += 1;

        debug!(slot = self.slot_index, checkpoint, "submitted frame");

        // Blocking on the next slot happens in begin_frame.
        self.slot_index = FrameSlotPool::<D, N>::acquire_next(self.slot_index);
        self.backbuffer_index = (self.backbuffer_index + 1) % self.config.backbuffer_count;
        Ok(checkpoint)
    }
}
