use std::sync::Arc;
use std::sync::atomic::Ordering;

use eyre::eyre;

use super::timeline::BufferMemory;
use super::timeline::Timeline;
use super::timeline::lock;
use crate::error::FrameResult;
use crate::gpu::UploadBuffer;

pub struct SoftwareUploadBuffer {
    pub(super) timeline: Arc<Timeline>,
    pub(super) memory: Arc<BufferMemory>,
}

impl SoftwareUploadBuffer {
    fn check_range(&self, offset: usize, len: usize) -> FrameResult<()> {
        let size = self.memory.len();
        if offset.checked_add(len).is_none_or(|end| end > size) {
            return Err(eyre!(
                "access of {len} bytes at offset {offset} overruns upload buffer of {size} bytes"
            )
            .into());
        }
        Ok(())
    }
}

impl UploadBuffer for SoftwareUploadBuffer {
    fn len(&self) -> usize {
        self.memory.len()
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> FrameResult<()> {
        self.check_range(offset, bytes.len())?;
        let pending_reads = self.memory.pending_reads.load(Ordering::SeqCst);
        if pending_reads > 0 {
            let violation = format!(
                "CPU wrote {} bytes at {:#x} while {pending_reads} submitted list(s) read this buffer",
                bytes.len(),
                self.memory.base + offset as u64
            );
            self.timeline.record_violation(violation.clone());
            return Err(eyre!(violation).into());
        }
        lock(&self.memory.bytes)[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn read(&self, offset: usize, out: &mut [u8]) -> FrameResult<()> {
        self.check_range(offset, out.len())?;
        out.copy_from_slice(&lock(&self.memory.bytes)[offset..offset + out.len()]);
        Ok(())
    }

    fn gpu_virtual_address(&self) -> u64 {
        self.memory.base
    }
}
