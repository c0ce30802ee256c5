use std::sync::Arc;

use tracing::debug;

use super::SoftwareAllocator;
use super::SoftwareCommandList;
use super::SoftwareFence;
use super::SoftwareQueue;
use super::SoftwareUploadBuffer;
use super::timeline::Timeline;
use crate::error::DeviceLost;
use crate::error::FrameResult;
use crate::gpu::Device;

#[derive(Clone)]
pub struct SoftwareDevice {
    timeline: Arc<Timeline>,
}

impl SoftwareDevice {
    pub(super) fn new(timeline: Arc<Timeline>) -> Self {
        Self { timeline }
    }

    fn ensure_present(&self) -> FrameResult<()> {
        if self.timeline.lock().device_lost {
            return Err(DeviceLost {
                awaited_value: None,
            }
            .into());
        }
        Ok(())
    }
}

impl Device for SoftwareDevice {
    type Allocator = SoftwareAllocator;
    type CommandList = SoftwareCommandList;
    type Fence = SoftwareFence;
    type UploadBuffer = SoftwareUploadBuffer;
    type Queue = SoftwareQueue;

    fn create_command_queue(&self) -> FrameResult<SoftwareQueue> {
        self.ensure_present()?;
        Ok(SoftwareQueue {
            timeline: self.timeline.clone(),
        })
    }

    fn create_command_allocator(&self) -> FrameResult<SoftwareAllocator> {
        self.ensure_present()?;
        Ok(SoftwareAllocator {
            timeline: self.timeline.clone(),
            state: self.timeline.register_allocator(),
        })
    }

    fn create_command_list(&self, allocator: &SoftwareAllocator) -> FrameResult<SoftwareCommandList> {
        self.ensure_present()?;
        Ok(SoftwareCommandList {
            allocator: allocator.state.clone(),
            commands: Vec::new(),
            open: false,
        })
    }

    fn create_fence(&self, initial_value: u64) -> FrameResult<SoftwareFence> {
        self.ensure_present()?;
        Ok(SoftwareFence {
            timeline: self.timeline.clone(),
            id: self.timeline.register_fence(initial_value),
        })
    }

    fn create_upload_buffer(&self, size_bytes: usize) -> FrameResult<SoftwareUploadBuffer> {
        self.ensure_present()?;
        let memory = self.timeline.register_buffer(size_bytes);
        debug!(
            size_bytes,
            address = memory.base,
            "created software upload buffer"
        );
        Ok(SoftwareUploadBuffer {
            timeline: self.timeline.clone(),
            memory,
        })
    }
}
