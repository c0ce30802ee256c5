//! In-process GPU timeline.
//!
//! Executes submitted command lists strictly in order, retires fence signals, and records
//! every synchronization violation it can observe: resetting an allocator whose commands
//! are still executing, writing upload memory a pending list reads, and releasing surface
//! resources while work is outstanding.

mod command_list;
mod device;
mod fence;
mod queue;
mod surface;
mod timeline;
mod upload_buffer;

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

pub use command_list::SoftwareAllocator;
pub use command_list::SoftwareCommandList;
pub use device::SoftwareDevice;
pub use fence::SoftwareEvent;
pub use fence::SoftwareFence;
pub use queue::SoftwareQueue;
pub use surface::SoftwareSurface;
pub use timeline::AllocatorReset;
pub use timeline::HISTORY_LIMIT;
pub use upload_buffer::SoftwareUploadBuffer;

use crate::constants::ConstantData;
use crate::gpu::Command;
use crate::scene::DrawArgs;
use crate::scene::GeometryId;
use crate::technique::PipelineKey;
use timeline::Processed;
use timeline::Timeline;

/// When submitted work retires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retirement {
    /// Work executes on the submitting thread before `submit` returns.
    Immediate,
    /// Work waits until the owner calls [`SoftwareGpu::step`] and friends.
    Manual,
    /// A worker thread executes work, sleeping `latency` per command list.
    Threaded { latency: Duration },
}

/// One command list as the GPU executed it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutedList {
    pub allocator: usize,
    pub commands: Vec<Command>,
    pub draws: Vec<ExecutedDraw>,
}

/// Pipeline state and constant bytes observed by one indexed draw at execution time.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutedDraw {
    pub pipeline: Option<PipelineKey>,
    pub stencil_ref: u32,
    pub geometry: GeometryId,
    pub args: DrawArgs,
    pub pass: Vec<u8>,
    pub object: Vec<u8>,
    pub material: Vec<u8>,
}

impl ExecutedDraw {
    pub fn pass_as<T: ConstantData>(&self) -> T {
        T::from_bytes(&self.pass)
    }

    pub fn object_as<T: ConstantData>(&self) -> T {
        T::from_bytes(&self.object)
    }

    pub fn material_as<T: ConstantData>(&self) -> T {
        T::from_bytes(&self.material)
    }
}

pub struct SoftwareGpu {
    timeline: Arc<Timeline>,
    worker: Option<JoinHandle<()>>,
}

impl SoftwareGpu {
    pub fn new(retirement: Retirement) -> Self {
        let timeline = Arc::new(Timeline::new(retirement));
        let worker = match retirement {
            Retirement::Threaded { latency } => {
                let timeline = timeline.clone();
                std::thread::Builder::new()
                    .name("software-gpu".to_owned())
                    .spawn(move || timeline.run_worker(latency))
                    .ok()
            }
            _ => None,
        };
        if matches!(retirement, Retirement::Threaded { .. }) && worker.is_none() {
            tracing::warn!("failed to spawn software GPU worker, falling back to immediate retirement");
            timeline.lock().retirement = Retirement::Immediate;
        }
        Self { timeline, worker }
    }

    pub fn immediate() -> Self {
        Self::new(Retirement::Immediate)
    }

    pub fn manual() -> Self {
        Self::new(Retirement::Manual)
    }

    pub fn threaded(latency: Duration) -> Self {
        Self::new(Retirement::Threaded { latency })
    }

    pub fn device(&self) -> SoftwareDevice {
        SoftwareDevice::new(self.timeline.clone())
    }

    pub fn surface(&self, width: u32, height: u32) -> SoftwareSurface {
        SoftwareSurface::new(self.timeline.clone(), width, height)
    }

    /// Executes the oldest pending work item. Returns false when nothing was pending.
    pub fn step(&self) -> bool {
        self.timeline.step().is_some()
    }

    /// Executes pending work up to and including the next fence signal, returning its value.
    pub fn retire_next_signal(&self) -> Option<u64> {
        loop {
            match self.timeline.step()? {
                Processed::Signaled(value) => return Some(value),
                Processed::Executed | Processed::Presented | Processed::Dropped => {}
            }
        }
    }

    /// Drains all pending work, on this thread or by waiting for the worker.
    pub fn run_until_idle(&self) {
        let retirement = self.timeline.lock().retirement;
        match retirement {
            Retirement::Threaded { .. } => self.timeline.wait_idle(),
            Retirement::Immediate | Retirement::Manual => while self.timeline.step().is_some() {},
        }
    }

    /// Switches a manual GPU to immediate retirement and drains whatever is pending.
    pub fn retire_immediately(&self) {
        {
            let mut state = self.timeline.lock();
            if state.retirement == Retirement::Manual {
                state.retirement = Retirement::Immediate;
            }
        }
        self.run_until_idle();
    }

    pub fn is_idle(&self) -> bool {
        self.timeline.is_idle()
    }

    /// Simulates device removal: every fence reports `u64::MAX` and pending waits wake up.
    pub fn lose_device(&self) {
        self.timeline.lose_device();
    }

    /// The most recent command lists the GPU executed, oldest first.
    ///
    /// Only the last [`HISTORY_LIMIT`] entries of each log are kept; the `*_count`
    /// accessors report totals.
    pub fn executed_lists(&self) -> Vec<ExecutedList> {
        self.timeline.lock().executed.recent()
    }

    pub fn executed_count(&self) -> u64 {
        self.timeline.lock().executed.total()
    }

    /// Fence values a CPU thread had to block on, in order.
    pub fn blocking_waits(&self) -> Vec<u64> {
        self.timeline.lock().blocking_waits.recent()
    }

    pub fn blocking_wait_count(&self) -> u64 {
        self.timeline.lock().blocking_waits.total()
    }

    pub fn allocator_resets(&self) -> Vec<AllocatorReset> {
        self.timeline.lock().allocator_resets.recent()
    }

    pub fn allocator_reset_count(&self) -> u64 {
        self.timeline.lock().allocator_resets.total()
    }

    pub fn violations(&self) -> Vec<String> {
        self.timeline.lock().violations.recent()
    }

    pub fn violation_count(&self) -> u64 {
        self.timeline.lock().violations.total()
    }

    pub fn presents(&self) -> u64 {
        self.timeline.lock().presents
    }

    pub fn highest_completed_value(&self) -> u64 {
        self.timeline.lock().highest_completed()
    }
}

impl Drop for SoftwareGpu {
    fn drop(&mut self) {
        self.timeline.shut_down();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("software GPU worker panicked");
            }
        }
    }
}
