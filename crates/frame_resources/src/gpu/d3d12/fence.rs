use eyre::eyre;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::*;

use crate::error::FrameResult;
use crate::gpu::Fence;
use crate::gpu::FenceEvent;

pub struct D3d12Fence {
    pub(super) fence: ID3D12Fence,
}

impl Fence for D3d12Fence {
    type Event = D3d12Event;

    fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    fn create_event(&self) -> FrameResult<D3d12Event> {
        let handle = unsafe { CreateEventA(None, false, false, None)? };
        if handle.is_invalid() {
            return Err(windows::core::Error::from_win32().into());
        }
        Ok(D3d12Event { handle })
    }

    fn set_event_on_completion(&self, value: u64, event: &D3d12Event) -> FrameResult<()> {
        unsafe { self.fence.SetEventOnCompletion(value, event.handle)? };
        Ok(())
    }
}

/// Auto-reset Win32 event.
pub struct D3d12Event {
    handle: HANDLE,
}

impl FenceEvent for D3d12Event {
    fn wait(&self) -> FrameResult<()> {
        let result = unsafe { WaitForSingleObjectEx(self.handle, INFINITE, false) };
        if result != WAIT_OBJECT_0 {
            return Err(eyre!("waiting on fence event failed with {result:?}").into());
        }
        Ok(())
    }
}

impl Drop for D3d12Event {
    fn drop(&mut self) {
        unsafe { CloseHandle(self.handle).ok() };
    }
}
