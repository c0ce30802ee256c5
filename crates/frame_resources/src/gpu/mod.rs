//! The narrow slice of a graphics device this crate depends on.
//!
//! The frame scheduler only ever needs to submit command lists, signal and wait on a
//! monotonic fence, and allocate persistently mapped upload memory. Backends implement
//! these traits; [`software`] is an in-process timeline, `d3d12` wraps Direct3D 12 on Windows.

pub mod command;
#[cfg(windows)]
pub mod d3d12;
pub mod software;

use crate::error::FrameResult;
pub use command::Command;
pub use command::ConstantView;

/// Creates the GPU objects owned by the frame resources.
pub trait Device {
    type Allocator: CommandAllocator;
    type CommandList: CommandList<Allocator = Self::Allocator>;
    type Fence: Fence;
    type UploadBuffer: UploadBuffer;
    type Queue: CommandQueue<Fence = Self::Fence, CommandList = Self::CommandList>;

    fn create_command_queue(&self) -> FrameResult<Self::Queue>;
    fn create_command_allocator(&self) -> FrameResult<Self::Allocator>;

    /// Creates a command list in the closed state, recording into `allocator` once reset.
    fn create_command_list(&self, allocator: &Self::Allocator) -> FrameResult<Self::CommandList>;
    fn create_fence(&self, initial_value: u64) -> FrameResult<Self::Fence>;

    /// Allocates CPU-writable, GPU-readable memory that stays mapped for its whole lifetime.
    fn create_upload_buffer(&self, size_bytes: usize) -> FrameResult<Self::UploadBuffer>;
}

pub trait CommandQueue {
    type Fence;
    type CommandList;

    fn execute_command_list(&self, list: &Self::CommandList) -> FrameResult<()>;

    /// Enqueues a signal; the fence reaches `value` once all prior work has retired.
    fn signal(&self, fence: &Self::Fence, value: u64) -> FrameResult<()>;
    fn present(&self) -> FrameResult<()>;
}

/// Backing memory for recorded commands.
///
/// Resetting while a list recorded into it is still executing frees memory the GPU is
/// reading, so callers must only reset after the matching fence value retired.
pub trait CommandAllocator {
    fn reset(&mut self) -> FrameResult<()>;
}

pub trait CommandList {
    type Allocator;

    fn reset(&mut self, allocator: &Self::Allocator) -> FrameResult<()>;
    fn record(&mut self, command: Command) -> FrameResult<()>;
    fn close(&mut self) -> FrameResult<()>;
}

pub trait Fence {
    type Event: FenceEvent;

    /// Last value retired by the GPU. `u64::MAX` means the device was removed.
    fn completed_value(&self) -> u64;
    fn create_event(&self) -> FrameResult<Self::Event>;

    /// Arranges for `event` to be signaled once the fence reaches `value`.
    /// Signals immediately if the value has already been reached.
    fn set_event_on_completion(&self, value: u64, event: &Self::Event) -> FrameResult<()>;
}

/// Auto-reset OS event used to block on fence completion.
pub trait FenceEvent {
    /// Blocks without timeout until the event is signaled.
    fn wait(&self) -> FrameResult<()>;
}

pub trait UploadBuffer {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> FrameResult<()>;
    fn read(&self, offset: usize, out: &mut [u8]) -> FrameResult<()>;
    fn gpu_virtual_address(&self) -> u64;
}

/// Size-dependent resources shared by every frame slot (backbuffers, depth/stencil buffer).
pub trait SurfaceResources {
    fn release(&mut self) -> FrameResult<()>;
    fn recreate(&mut self, width: u32, height: u32) -> FrameResult<()>;
}
