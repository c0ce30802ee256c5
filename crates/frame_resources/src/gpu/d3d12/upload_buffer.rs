use eyre::eyre;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

use crate::error::FrameResult;
use crate::gpu::UploadBuffer;

/// Committed buffer on the upload heap, mapped once for its whole lifetime.
pub struct D3d12UploadBuffer {
    resource: ID3D12Resource,
    mapped: *mut u8,
    len: usize,
}

impl D3d12UploadBuffer {
    pub(super) fn new(device: &ID3D12Device, len: usize) -> FrameResult<Self> {
        let heap_props = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_UPLOAD,
            ..Default::default()
        };
        let resource_desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Alignment: 0,
            Width: len.max(1) as u64,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_UNKNOWN,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: D3D12_RESOURCE_FLAG_NONE,
        };

        let mut resource: Option<ID3D12Resource> = None;
        unsafe {
            device.CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &resource_desc,
                D3D12_RESOURCE_STATE_GENERIC_READ,
                None,
                &mut resource,
            )?
        };
        let resource = resource.ok_or_else(|| eyre!("CreateCommittedResource returned no buffer"))?;

        // Upload heap memory stays mapped; the CPU never reads it back through the GPU.
        let mut mapped = std::ptr::null_mut();
        let read_range = D3D12_RANGE { Begin: 0, End: 0 };
        unsafe { resource.Map(0, Some(&read_range), Some(&mut mapped))? };

        Ok(Self {
            resource,
            mapped: mapped.cast::<u8>(),
            len,
        })
    }

    fn check_range(&self, offset: usize, len: usize) -> FrameResult<()> {
        if offset.checked_add(len).is_none_or(|end| end > self.len) {
            return Err(eyre!(
                "access of {len} bytes at offset {offset} overruns upload buffer of {} bytes",
                self.len
            )
            .into());
        }
        Ok(())
    }
}

impl UploadBuffer for D3d12UploadBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> FrameResult<()> {
        self.check_range(offset, bytes.len())?;
        // SAFETY: the range was checked against the mapped allocation.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.mapped.add(offset), bytes.len()) };
        Ok(())
    }

    fn read(&self, offset: usize, out: &mut [u8]) -> FrameResult<()> {
        self.check_range(offset, out.len())?;
        // SAFETY: the range was checked against the mapped allocation.
        unsafe { std::ptr::copy_nonoverlapping(self.mapped.add(offset), out.as_mut_ptr(), out.len()) };
        Ok(())
    }

    fn gpu_virtual_address(&self) -> u64 {
        unsafe { self.resource.GetGPUVirtualAddress() }
    }
}

impl Drop for D3d12UploadBuffer {
    fn drop(&mut self) {
        unsafe { self.resource.Unmap(0, None) };
    }
}
