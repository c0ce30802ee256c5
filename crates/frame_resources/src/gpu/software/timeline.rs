use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::trace;
use tracing::warn;

use super::ExecutedDraw;
use super::ExecutedList;
use super::Retirement;
use super::fence::EventSignal;
use crate::error::DeviceLost;
use crate::error::FrameResult;
use crate::gpu::Command;
use crate::gpu::ConstantView;

const FIRST_GPU_ADDRESS: u64 = 0x1000_0000;
const RESOURCE_PLACEMENT_ALIGNMENT: u64 = 64 * 1024;

/// Entries kept per diagnostic log; older ones are dropped but still counted.
pub const HISTORY_LIMIT: usize = 256;

/// Most recent entries of a diagnostic log plus the number ever recorded.
pub(super) struct History<T> {
    recent: VecDeque<T>,
    total: u64,
}

impl<T: Clone> History<T> {
    fn new() -> Self {
        Self {
            recent: VecDeque::new(),
            total: 0,
        }
    }

    pub(super) fn push(&mut self, entry: T) {
        if self.recent.len() == HISTORY_LIMIT {
            self.recent.pop_front();
        }
        self.recent.push_back(entry);
        self.total += 1;
    }

    pub(super) fn recent(&self) -> Vec<T> {
        self.recent.iter().cloned().collect()
    }

    pub(super) fn total(&self) -> u64 {
        self.total
    }
}

/// Shared state behind every software GPU handle.
pub(super) struct Timeline {
    state: Mutex<TimelineState>,
    work_ready: Condvar,
    progress: Condvar,
}

pub(super) struct TimelineState {
    pub(super) retirement: Retirement,
    pending: VecDeque<Work>,
    busy: bool,
    pub(super) shutdown: bool,
    pub(super) device_lost: bool,
    pub(super) fences: Vec<u64>,
    watchers: Vec<Watcher>,
    buffers: Vec<Arc<BufferMemory>>,
    next_address: u64,
    next_allocator_id: usize,
    pub(super) executed: History<ExecutedList>,
    pub(super) presents: u64,
    pub(super) blocking_waits: History<u64>,
    pub(super) allocator_resets: History<AllocatorReset>,
    pub(super) violations: History<String>,
}

/// Log entry written every time a command allocator is reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatorReset {
    pub allocator: usize,
    /// Highest completed fence value at the moment of the reset.
    pub completed_value: u64,
}

struct Watcher {
    fence: usize,
    value: u64,
    event: Arc<EventSignal>,
}

pub(super) enum Work {
    Execute(Submission),
    Signal { fence: usize, value: u64 },
    Present,
}

pub(super) struct Submission {
    pub(super) commands: Vec<Command>,
    pub(super) allocator: Arc<AllocatorState>,
    pub(super) buffers: Vec<Arc<BufferMemory>>,
}

pub(super) struct AllocatorState {
    pub(super) id: usize,
    pub(super) in_flight: AtomicUsize,
}

pub(super) struct BufferMemory {
    pub(super) base: u64,
    pub(super) bytes: Mutex<Vec<u8>>,
    /// Number of submitted, not yet executed command lists that read this buffer.
    pub(super) pending_reads: AtomicUsize,
}

impl BufferMemory {
    pub(super) fn len(&self) -> usize {
        lock(&self.bytes).len()
    }

    fn contains(&self, view: ConstantView) -> bool {
        let len = self.len() as u64;
        view.address >= self.base && view.address + u64::from(view.size) <= self.base + len
    }

    fn read(&self, view: ConstantView) -> Vec<u8> {
        let start = (view.address - self.base) as usize;
        lock(&self.bytes)[start..start + view.size as usize].to_vec()
    }
}

pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Timeline {
    pub(super) fn new(retirement: Retirement) -> Self {
        Self {
            state: Mutex::new(TimelineState {
                retirement,
                pending: VecDeque::new(),
                busy: false,
                shutdown: false,
                device_lost: false,
                fences: Vec::new(),
                watchers: Vec::new(),
                buffers: Vec::new(),
                next_address: FIRST_GPU_ADDRESS,
                next_allocator_id: 0,
                executed: History::new(),
                presents: 0,
                blocking_waits: History::new(),
                allocator_resets: History::new(),
                violations: History::new(),
            }),
            work_ready: Condvar::new(),
            progress: Condvar::new(),
        }
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, TimelineState> {
        lock(&self.state)
    }

    pub(super) fn record_violation(&self, violation: String) {
        warn!("software GPU detected a synchronization violation: {violation}");
        self.lock().violations.push(violation);
    }

    pub(super) fn register_buffer(&self, size_bytes: usize) -> Arc<BufferMemory> {
        let mut state = self.lock();
        let base = state.next_address;
        let span = (size_bytes as u64).div_ceil(RESOURCE_PLACEMENT_ALIGNMENT).max(1)
            * RESOURCE_PLACEMENT_ALIGNMENT;
        state.next_address += span;
        let memory = Arc::new(BufferMemory {
            base,
            bytes: Mutex::new(vec![0; size_bytes]),
            pending_reads: AtomicUsize::new(0),
        });
        state.buffers.push(memory.clone());
        memory
    }

    pub(super) fn register_allocator(&self) -> Arc<AllocatorState> {
        let mut state = self.lock();
        let id = state.next_allocator_id;
        state.next_allocator_id += 1;
        Arc::new(AllocatorState {
            id,
            in_flight: AtomicUsize::new(0),
        })
    }

    pub(super) fn register_fence(&self, initial_value: u64) -> usize {
        let mut state = self.lock();
        state.fences.push(initial_value);
        state.fences.len() - 1
    }

    pub(super) fn completed_value(&self, fence: usize) -> u64 {
        let state = self.lock();
        if state.device_lost {
            u64::MAX
        } else {
            state.fences[fence]
        }
    }

    pub(super) fn set_event_on_completion(&self, fence: usize, value: u64, event: Arc<EventSignal>) {
        let mut state = self.lock();
        if state.device_lost || state.fences[fence] >= value {
            event.signal();
            return;
        }
        state.blocking_waits.push(value);
        state.watchers.push(Watcher {
            fence,
            value,
            event,
        });
    }

    /// Queues work for the GPU timeline.
    pub(super) fn submit(&self, work: Work) -> FrameResult<()> {
        let mut state = self.lock();
        if state.device_lost {
            return Err(DeviceLost {
                awaited_value: None,
            }
            .into());
        }
        if state.shutdown {
            return Err(eyre::eyre!("software GPU has shut down").into());
        }
        if let Work::Execute(submission) = &work {
            submission.allocator.in_flight.fetch_add(1, Ordering::SeqCst);
            for buffer in &submission.buffers {
                buffer.pending_reads.fetch_add(1, Ordering::SeqCst);
            }
        }
        state.pending.push_back(work);
        let retirement = state.retirement;
        drop(state);

        match retirement {
            Retirement::Immediate => while self.step().is_some() {},
            Retirement::Manual => {}
            Retirement::Threaded { .. } => self.work_ready.notify_one(),
        }
        Ok(())
    }

    /// Resolves the upload buffers a command stream reads from.
    pub(super) fn buffers_for(&self, commands: &[Command]) -> Vec<Arc<BufferMemory>> {
        let state = self.lock();
        let mut buffers: Vec<Arc<BufferMemory>> = Vec::new();
        for command in commands {
            let view = match command {
                Command::SetPassConstants(view)
                | Command::SetObjectConstants(view)
                | Command::SetMaterialConstants(view) => *view,
                _ => continue,
            };
            if let Some(buffer) = state.buffers.iter().find(|b| b.contains(view)) {
                if !buffers.iter().any(|known| Arc::ptr_eq(known, buffer)) {
                    buffers.push(buffer.clone());
                }
            }
        }
        buffers
    }

    /// Processes the oldest pending work item on the calling thread.
    pub(super) fn step(&self) -> Option<Processed> {
        let work = {
            let mut state = self.lock();
            let work = state.pending.pop_front()?;
            state.busy = true;
            work
        };
        Some(self.process(work))
    }

    fn process(&self, work: Work) -> Processed {
        // `busy` is cleared under the same lock that publishes the result.
        let processed = match work {
            Work::Execute(submission) => {
                let (draws, violations) = replay(&submission);
                submission.allocator.in_flight.fetch_sub(1, Ordering::SeqCst);
                for buffer in &submission.buffers {
                    buffer.pending_reads.fetch_sub(1, Ordering::SeqCst);
                }
                let mut state = self.lock();
                state.busy = false;
                for violation in violations {
                    warn!("software GPU detected a synchronization violation: {violation}");
                    state.violations.push(violation);
                }
                if state.device_lost {
                    Processed::Dropped
                } else {
                    state.executed.push(ExecutedList {
                        allocator: submission.allocator.id,
                        commands: submission.commands,
                        draws,
                    });
                    Processed::Executed
                }
            }
            Work::Signal { fence, value } => {
                let mut state = self.lock();
                state.busy = false;
                if state.device_lost {
                    Processed::Dropped
                } else {
                    let completed = &mut state.fences[fence];
                    *completed = (*completed).max(value);
                    trace!(fence, value, "software GPU retired fence value");
                    state.fire_watchers();
                    Processed::Signaled(value)
                }
            }
            Work::Present => {
                let mut state = self.lock();
                state.busy = false;
                state.presents += 1;
                Processed::Presented
            }
        };
        self.progress.notify_all();
        processed
    }

    pub(super) fn is_idle(&self) -> bool {
        let state = self.lock();
        state.pending.is_empty() && !state.busy
    }

    /// Blocks until a worker thread has drained every pending work item.
    pub(super) fn wait_idle(&self) {
        let mut state = self.lock();
        while !(state.pending.is_empty() && !state.busy) && !state.device_lost {
            state = self
                .progress
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(super) fn lose_device(&self) {
        let mut state = self.lock();
        warn!("software GPU device removed");
        state.device_lost = true;
        state.pending.clear();
        state.fire_watchers();
        drop(state);
        self.progress.notify_all();
        self.work_ready.notify_all();
    }

    pub(super) fn shut_down(&self) {
        self.lock().shutdown = true;
        self.work_ready.notify_all();
    }

    pub(super) fn run_worker(&self, latency: Duration) {
        loop {
            let work = {
                let mut state = self.lock();
                loop {
                    if let Some(work) = state.pending.pop_front() {
                        state.busy = true;
                        break Some(work);
                    }
                    if state.shutdown || state.device_lost {
                        break None;
                    }
                    state = self
                        .work_ready
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };
            let Some(work) = work else {
                return;
            };
            if matches!(work, Work::Execute(_)) {
                std::thread::sleep(latency);
            }
            self.process(work);
        }
    }
}

impl TimelineState {
    fn fire_watchers(&mut self) {
        let device_lost = self.device_lost;
        let fences = &self.fences;
        self.watchers.retain(|watcher| {
            if device_lost || fences[watcher.fence] >= watcher.value {
                watcher.event.signal();
                false
            } else {
                true
            }
        });
    }

    pub(super) fn highest_completed(&self) -> u64 {
        self.fences.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Processed {
    Executed,
    Signaled(u64),
    Presented,
    Dropped,
}

/// Walks a command stream the way the GPU would, capturing the constant data each draw reads.
fn replay(submission: &Submission) -> (Vec<ExecutedDraw>, Vec<String>) {
    let mut draws = Vec::new();
    let mut violations = Vec::new();
    let mut pipeline = None;
    let mut stencil_ref = 0;
    let mut pass = None;
    let mut object = None;
    let mut material = None;

    let read = |view: Option<ConstantView>, what: &str, violations: &mut Vec<String>| {
        let Some(view) = view else {
            violations.push(format!("draw issued without {what} constants bound"));
            return Vec::new();
        };
        match submission.buffers.iter().find(|b| b.contains(view)) {
            Some(buffer) => buffer.read(view),
            None => {
                violations.push(format!(
                    "{what} constants bound at unmapped address {:#x}",
                    view.address
                ));
                Vec::new()
            }
        }
    };

    for command in &submission.commands {
        match *command {
            Command::SetPipelineState(key) => pipeline = Some(key),
            Command::SetStencilRef(value) => stencil_ref = value,
            Command::SetPassConstants(view) => pass = Some(view),
            Command::SetObjectConstants(view) => object = Some(view),
            Command::SetMaterialConstants(view) => material = Some(view),
            Command::DrawIndexed { geometry, args } => {
                let pass_bytes = read(pass, "pass", &mut violations);
                let object_bytes = read(object, "object", &mut violations);
                let material_bytes = read(material, "material", &mut violations);
                draws.push(ExecutedDraw {
                    pipeline,
                    stencil_ref,
                    geometry,
                    args,
                    pass: pass_bytes,
                    object: object_bytes,
                    material: material_bytes,
                });
            }
        }
    }
    (draws, violations)
}
