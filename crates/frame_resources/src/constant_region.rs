use std::marker::PhantomData;

use eyre::eyre;

use crate::constants::ConstantData;
use crate::error::FrameResult;
use crate::gpu::ConstantView;
use crate::gpu::Device;
use crate::gpu::UploadBuffer;

/// D3D12_CONSTANT_BUFFER_DATA_PLACEMENT_ALIGNMENT
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

pub const fn constant_stride(size_bytes: usize) -> usize {
    size_bytes.div_ceil(CONSTANT_BUFFER_ALIGNMENT) * CONSTANT_BUFFER_ALIGNMENT
}

/// Fixed-capacity array of `T` records inside one persistently mapped upload buffer.
pub struct ConstantRegion<B, T> {
    buffer: B,
    capacity: usize,
    _record: PhantomData<T>,
}

impl<B: UploadBuffer, T: ConstantData> ConstantRegion<B, T> {
    pub const STRIDE: usize = constant_stride(size_of::<T>());

    pub fn new<D>(device: &D, capacity: usize) -> FrameResult<Self>
    where
        D: Device<UploadBuffer = B>,
    {
        // Zero-capacity regions still get one record so every slot owns a valid address.
        let buffer = device.create_upload_buffer(Self::STRIDE * capacity.max(1))?;
        Ok(Self {
            buffer,
            capacity,
            _record: PhantomData,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn offset(&self, index: usize) -> FrameResult<usize> {
        if index >= self.capacity {
            return Err(eyre!(
                "constant record {index} is outside a region of {} records",
                self.capacity
            )
            .into());
        }
        Ok(index * Self::STRIDE)
    }

    pub fn write(&mut self, index: usize, record: &T) -> FrameResult<()> {
        let offset = self.offset(index)?;
        self.buffer.write(offset, record.as_bytes())
    }

    pub fn read(&self, index: usize) -> FrameResult<T> {
        let offset = self.offset(index)?;
        let mut bytes = vec![0; size_of::<T>()];
        self.buffer.read(offset, &mut bytes)?;
        Ok(T::from_bytes(&bytes))
    }

    /// GPU view of record `index`, covering the full aligned stride.
    pub fn view(&self, index: usize) -> FrameResult<ConstantView> {
        let offset = self.offset(index)?;
        Ok(ConstantView {
            address: self.buffer.gpu_virtual_address() + offset as u64,
            size: Self::STRIDE as u32,
        })
    }
}
