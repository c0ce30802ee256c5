use tracing::debug;
use tracing::error;

use crate::error::DeviceLost;
use crate::error::FrameResult;
use crate::gpu::CommandQueue;
use crate::gpu::Device;
use crate::gpu::Fence;
use crate::gpu::FenceEvent;

/// Proof that every GPU command submitted before the fence reached `value` has finished.
///
/// Only [`FenceCounter::wait_until`] can produce one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Retired {
    value: u64,
}

impl Retired {
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// CPU side of the monotonic fence shared with the GPU timeline.
pub struct FenceCounter<F: Fence> {
    fence: F,
    event: F::Event,
    next_value: u64,
}

impl<F: Fence> FenceCounter<F> {
    pub fn new<D>(device: &D, initial_value: u64) -> FrameResult<Self>
    where
        D: Device<Fence = F>,
    {
        let fence = device.create_fence(initial_value)?;
        let event = fence.create_event()?;
        Ok(Self {
            fence,
            event,
            next_value: initial_value,
        })
    }

    /// Last value handed to [`advance`](Self::advance).
    pub fn next_value(&self) -> u64 {
        self.next_value
    }

    pub fn fence(&self) -> &F {
        &self.fence
    }

    /// Schedules a signal for a fresh value behind everything already queued.
    pub fn advance<Q>(&mut self, queue: &Q) -> FrameResult<u64>
    where
        Q: CommandQueue<Fence = F>,
    {
        let value = self.next_value + 1;
        queue.signal(&self.fence, value)?;
        self.next_value = value;
        Ok(value)
    }

    pub fn completed_value(&self) -> FrameResult<u64> {
        let completed = self.fence.completed_value();
        if completed == u64::MAX {
            error!("fence reports device removal");
            return Err(DeviceLost {
                awaited_value: None,
            }
            .into());
        }
        Ok(completed)
    }

    pub fn is_reached(&self, value: u64) -> FrameResult<bool> {
        Ok(self.completed_value()? >= value)
    }

    /// Blocks until the GPU has retired `value`.
    pub fn wait_until(&self, value: u64) -> FrameResult<Retired> {
        let lost = DeviceLost {
            awaited_value: Some(value),
        };
        let completed = self.fence.completed_value();
        if completed == u64::MAX {
            return Err(lost.into());
        }
        if completed < value {
            debug!(value, completed, "waiting for fence");
            self.fence.set_event_on_completion(value, &self.event)?;
            self.event.wait()?;

            // The event also fires when the device is removed.
            let completed = self.fence.completed_value();
            if completed == u64::MAX {
                error!(value, "device removed while waiting for fence");
                return Err(lost.into());
            }
            debug_assert!(completed >= value);
        }
        Ok(Retired { value })
    }

    /// Schedules a fresh signal and waits for it, draining all submitted work.
    pub fn flush<Q>(&mut self, queue: &Q) -> FrameResult<Retired>
    where
        Q: CommandQueue<Fence = F>,
    {
        let value = self.advance(queue)?;
        self.wait_until(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::software::SoftwareGpu;

    #[test]
    fn advance_is_monotonic_and_non_blocking() -> eyre::Result<()> {
        let gpu = SoftwareGpu::manual();
        let device = gpu.device();
        let queue = device.create_command_queue()?;
        let mut counter = FenceCounter::new(&device, 0)?;

        assert_eq!(counter.advance(&queue)?, 1);
        assert_eq!(counter.advance(&queue)?, 2);
        assert_eq!(counter.next_value(), 2);
        assert_eq!(counter.completed_value()?, 0);
        assert!(!counter.is_reached(1)?);

        assert_eq!(gpu.retire_next_signal(), Some(1));
        assert!(counter.is_reached(1)?);
        assert!(!counter.is_reached(2)?);
        Ok(())
    }

    #[test]
    fn waiting_on_a_reached_value_returns_immediately() -> eyre::Result<()> {
        let gpu = SoftwareGpu::immediate();
        let device = gpu.device();
        let queue = device.create_command_queue()?;
        let mut counter = FenceCounter::new(&device, 0)?;

        let retired = counter.flush(&queue)?;
        assert_eq!(retired.value(), 1);
        assert_eq!(counter.wait_until(0)?.value(), 0);
        assert!(gpu.blocking_waits().is_empty());
        Ok(())
    }

    #[test]
    fn device_removal_is_fatal() -> eyre::Result<()> {
        let gpu = SoftwareGpu::manual();
        let device = gpu.device();
        let queue = device.create_command_queue()?;
        let mut counter = FenceCounter::new(&device, 0)?;
        let value = counter.advance(&queue)?;

        gpu.lose_device();
        let report = counter.wait_until(value).unwrap_err();
        assert!(report.is_device_lost());
        assert!(counter.is_reached(value).unwrap_err().is_device_lost());
        Ok(())
    }
}
