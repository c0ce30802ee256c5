use std::sync::Arc;
use std::sync::atomic::Ordering;

use eyre::eyre;

use super::AllocatorReset;
use super::timeline::AllocatorState;
use super::timeline::Timeline;
use crate::error::FrameResult;
use crate::gpu::Command;
use crate::gpu::CommandAllocator;
use crate::gpu::CommandList;

pub struct SoftwareAllocator {
    pub(super) timeline: Arc<Timeline>,
    pub(super) state: Arc<AllocatorState>,
}

impl SoftwareAllocator {
    pub fn id(&self) -> usize {
        self.state.id
    }
}

impl CommandAllocator for SoftwareAllocator {
    fn reset(&mut self) -> FrameResult<()> {
        let in_flight = self.state.in_flight.load(Ordering::SeqCst);
        if in_flight > 0 {
            let violation = format!(
                "command allocator {} reset while {in_flight} submitted list(s) are still executing",
                self.state.id
            );
            self.timeline.record_violation(violation.clone());
            return Err(eyre!(violation).into());
        }
        let mut state = self.timeline.lock();
        let completed_value = state.highest_completed();
        state.allocator_resets.push(AllocatorReset {
            allocator: self.state.id,
            completed_value,
        });
        Ok(())
    }
}

pub struct SoftwareCommandList {
    pub(super) allocator: Arc<AllocatorState>,
    pub(super) commands: Vec<Command>,
    pub(super) open: bool,
}

impl SoftwareCommandList {
    /// Commands recorded since the last reset.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl CommandList for SoftwareCommandList {
    type Allocator = SoftwareAllocator;

    fn reset(&mut self, allocator: &SoftwareAllocator) -> FrameResult<()> {
        if self.open {
            return Err(eyre!("command list reset while still recording").into());
        }
        self.allocator = allocator.state.clone();
        self.commands.clear();
        self.open = true;
        Ok(())
    }

    fn record(&mut self, command: Command) -> FrameResult<()> {
        if !self.open {
            return Err(eyre!("command recorded into a closed command list").into());
        }
        self.commands.push(command);
        Ok(())
    }

    fn close(&mut self) -> FrameResult<()> {
        if !self.open {
            return Err(eyre!("command list closed twice").into());
        }
        self.open = false;
        Ok(())
    }
}
