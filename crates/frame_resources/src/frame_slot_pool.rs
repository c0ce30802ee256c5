use eyre::eyre;
use tracing::trace;

use crate::config::FrameConfig;
use crate::error::FrameResult;
use crate::fence_counter::Retired;
use crate::frame_slot::FrameSlot;
use crate::gpu::CommandAllocator;
use crate::gpu::Device;

/// `N` frame slots reused in strict round-robin order.
pub struct FrameSlotPool<D: Device, const N: usize> {
    slots: [FrameSlot<D>; N],
}

impl<D: Device, const N: usize> FrameSlotPool<D, N> {
    pub fn new(device: &D, config: &FrameConfig) -> FrameResult<Self> {
        const { assert!(N >= 1, "a frame slot pool needs at least one slot") };
        let slots = array_init::try_array_init(|_| FrameSlot::new(device, config))?;
        Ok(Self { slots })
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Index of the slot used after `current`.
    pub const fn acquire_next(current: usize) -> usize {
        (current + 1) % N
    }

    pub fn slot(&self, index: usize) -> FrameResult<&FrameSlot<D>> {
        self.slots
            .get(index)
            .ok_or_else(|| eyre!("frame slot {index} out of range for {N} slots").into())
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> FrameResult<&mut FrameSlot<D>> {
        self.slots
            .get_mut(index)
            .ok_or_else(|| eyre!("frame slot {index} out of range for {N} slots").into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameSlot<D>> {
        self.slots.iter()
    }

    pub(crate) fn set_checkpoint(&mut self, index: usize, value: u64) -> FrameResult<()> {
        let slot = self.slot_mut(index)?;
        debug_assert!(value > slot.checkpoint_value);
        slot.checkpoint_value = value;
        Ok(())
    }

    /// Resets a slot's command allocator; `retired` proves its last submission finished.
    pub(crate) fn reset_allocator(&mut self, index: usize, retired: &Retired) -> FrameResult<()> {
        let slot = self.slot_mut(index)?;
        if retired.value() < slot.checkpoint_value {
            return Err(eyre!(
                "slot {index} checkpoint {} has not retired (proof covers {})",
                slot.checkpoint_value,
                retired.value()
            )
            .into());
        }
        trace!(index, checkpoint = slot.checkpoint_value, "resetting command allocator");
        slot.allocator.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::software::SoftwareGpu;

    #[test]
    fn slots_rotate_round_robin() {
        assert_eq!(FrameSlotPool::<crate::gpu::software::SoftwareDevice, 3>::acquire_next(0), 1);
        assert_eq!(FrameSlotPool::<crate::gpu::software::SoftwareDevice, 3>::acquire_next(2), 0);
        assert_eq!(FrameSlotPool::<crate::gpu::software::SoftwareDevice, 1>::acquire_next(0), 0);
    }

    #[test]
    fn every_slot_owns_its_own_memory() -> eyre::Result<()> {
        let gpu = SoftwareGpu::immediate();
        let pool = FrameSlotPool::<_, 3>::new(&gpu.device(), &FrameConfig::default())?;
        let addresses: Vec<u64> = pool
            .iter()
            .map(|slot| slot.object_constants().view(0).map(|view| view.address))
            .collect::<FrameResult<_>>()?;
        assert_eq!(addresses.len(), 3);
        assert!(addresses[0] != addresses[1] && addresses[1] != addresses[2]);
        assert!(pool.iter().all(|slot| slot.checkpoint_value() == 0));
        assert_eq!(pool.len(), 3);
        Ok(())
    }
}
