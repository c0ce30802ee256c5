use std::sync::Arc;

use eyre::eyre;

use super::SoftwareCommandList;
use super::SoftwareFence;
use super::timeline::Submission;
use super::timeline::Timeline;
use super::timeline::Work;
use crate::error::FrameResult;
use crate::gpu::CommandQueue;

pub struct SoftwareQueue {
    pub(super) timeline: Arc<Timeline>,
}

impl CommandQueue for SoftwareQueue {
    type Fence = SoftwareFence;
    type CommandList = SoftwareCommandList;

    fn execute_command_list(&self, list: &SoftwareCommandList) -> FrameResult<()> {
        if list.open {
            return Err(eyre!("command list executed before it was closed").into());
        }
        let submission = Submission {
            commands: list.commands.clone(),
            allocator: list.allocator.clone(),
            buffers: self.timeline.buffers_for(&list.commands),
        };
        self.timeline.submit(Work::Execute(submission))
    }

    fn signal(&self, fence: &SoftwareFence, value: u64) -> FrameResult<()> {
        if !Arc::ptr_eq(&self.timeline, &fence.timeline) {
            return Err(eyre!("fence belongs to a different software GPU").into());
        }
        self.timeline.submit(Work::Signal {
            fence: fence.id,
            value,
        })
    }

    fn present(&self) -> FrameResult<()> {
        self.timeline.submit(Work::Present)
    }
}
