//! Multiple-buffered frame resources with fence-based CPU/GPU synchronization.
//!
//! The CPU records frame `n` while the GPU is still executing frames `n - 1 .. n - N + 1`.
//! Each of the `N` [`FrameSlot`](frame_slot::FrameSlot)s owns a command allocator and
//! its own copy of every constant record; a slot is only reused after the fence value
//! recorded at its last submission has retired.

pub mod config;
pub mod constant_region;
pub mod constants;
pub mod error;
pub mod fence_counter;
pub mod frame_plan;
pub mod frame_scheduler;
pub mod frame_slot;
pub mod frame_slot_pool;
pub mod gpu;
pub mod populate_command_list;
pub mod scene;
pub mod technique;

pub use config::FrameConfig;
pub use error::DeviceLost;
pub use error::FrameReport;
pub use error::FrameResult;
pub use fence_counter::FenceCounter;
pub use fence_counter::Retired;
pub use frame_plan::DrawBatch;
pub use frame_plan::FramePlan;
pub use frame_scheduler::FrameScheduler;
pub use frame_scheduler::FrameState;
pub use frame_scheduler::ResizeState;
pub use technique::PassKind;
pub use technique::PipelineKey;
pub use technique::Technique;

/// Number of frames the CPU may run ahead of the GPU.
pub const FRAME_COUNT: usize = 3;
