use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::PoisonError;

use super::timeline::Timeline;
use super::timeline::lock;
use crate::error::FrameResult;
use crate::gpu::Fence;
use crate::gpu::FenceEvent;

pub struct SoftwareFence {
    pub(super) timeline: Arc<Timeline>,
    pub(super) id: usize,
}

impl Fence for SoftwareFence {
    type Event = SoftwareEvent;

    fn completed_value(&self) -> u64 {
        self.timeline.completed_value(self.id)
    }

    fn create_event(&self) -> FrameResult<SoftwareEvent> {
        Ok(SoftwareEvent {
            signal: Arc::new(EventSignal::default()),
        })
    }

    fn set_event_on_completion(&self, value: u64, event: &SoftwareEvent) -> FrameResult<()> {
        self.timeline
            .set_event_on_completion(self.id, value, event.signal.clone());
        Ok(())
    }
}

/// Auto-reset event.
pub struct SoftwareEvent {
    signal: Arc<EventSignal>,
}

impl FenceEvent for SoftwareEvent {
    fn wait(&self) -> FrameResult<()> {
        self.signal.wait();
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct EventSignal {
    signaled: Mutex<bool>,
    wake: Condvar,
}

impl EventSignal {
    pub(super) fn signal(&self) {
        *lock(&self.signaled) = true;
        self.wake.notify_all();
    }

    fn wait(&self) {
        let mut signaled = lock(&self.signaled);
        while !*signaled {
            signaled = self
                .wake
                .wait(signaled)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *signaled = false;
    }
}
