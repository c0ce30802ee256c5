//! Drives the per-frame CPU/GPU handshake.
//!
//! A frame goes `Idle -> Recording -> Submitted`, and the next `begin_frame` passes
//! through `WaitingForSlot` until the reused slot's checkpoint has retired. Resizes go
//! `Running -> FlushPending -> ResourceRebuild -> Running`.

mod begin_frame;
mod end_frame;
mod record;
mod render_frame;
mod resize;
mod shutdown;
mod update_constants;
mod wait_for_gpu_idle;

use eyre::eyre;
use tracing::info;

use crate::FRAME_COUNT;
use crate::config::FrameConfig;
use crate::error::FrameResult;
use crate::fence_counter::FenceCounter;
use crate::frame_slot_pool::FrameSlotPool;
use crate::gpu::Device;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    WaitingForSlot,
    Recording,
    Submitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeState {
    Running,
    FlushPending,
    ResourceRebuild,
}

pub struct FrameScheduler<D: Device, const N: usize = FRAME_COUNT> {
    config: FrameConfig,
    queue: D::Queue,
    fence: FenceCounter<D::Fence>,
    slots: FrameSlotPool<D, N>,
    command_list: D::CommandList,
    slot_index: usize,
    backbuffer_index: u32,
    frame_state: FrameState,
    resize_state: ResizeState,
    frames_submitted: u64,
    shut_down: bool,
}

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    pub fn new(device: &D, config: FrameConfig) -> FrameResult<Self> {
        if config.backbuffer_count == 0 {
            return Err(eyre!("at least one backbuffer is required").into());
        }
        let queue = device.create_command_queue()?;
        let fence = FenceCounter::new(device, 0)?;
        let slots = FrameSlotPool::new(device, &config)?;

        // Command lists are created in the recording state in D3D12; ours start closed
        // so the first begin_frame can reset it like every other frame.
        let command_list = device.create_command_list(slots.slot(0)?.allocator())?;

        info!(
            frame_count = N,
            backbuffer_count = config.backbuffer_count,
            object_capacity = config.object_capacity,
            material_capacity = config.material_capacity,
            pass_count = config.pass_count,
            "created frame scheduler"
        );

        Ok(Self {
            config,
            queue,
            fence,
            slots,
            command_list,
            slot_index: 0,
            backbuffer_index: 0,
            frame_state: FrameState::Idle,
            resize_state: ResizeState::Running,
            frames_submitted: 0,
            shut_down: false,
        })
    }

    /// An empty scene sized for this scheduler's capacities and frame count.
    pub fn create_scene(&self) -> Scene {
        Scene::new(&self.config, N)
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn slot_index(&self) -> usize {
        self.slot_index
    }

    pub fn backbuffer_index(&self) -> u32 {
        self.backbuffer_index
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame_state
    }

    pub fn resize_state(&self) -> ResizeState {
        self.resize_state
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Last fence value scheduled on the queue.
    pub fn next_fence_value(&self) -> u64 {
        self.fence.next_value()
    }

    pub fn completed_fence_value(&self) -> FrameResult<u64> {
        self.fence.completed_value()
    }

    pub fn slots(&self) -> &FrameSlotPool<D, N> {
        &self.slots
    }

    pub fn queue(&self) -> &D::Queue {
        &self.queue
    }

    fn expect_state(&self, operation: &str, allowed: &[FrameState]) -> FrameResult<()> {
        if self.shut_down {
            return Err(eyre!("{operation} called after shutdown").into());
        }
        if !allowed.contains(&self.frame_state) {
            return Err(eyre!(
                "{operation} called in frame state {:?}, expected one of {allowed:?}",
                self.frame_state
            )
            .into());
        }
        Ok(())
    }
}
