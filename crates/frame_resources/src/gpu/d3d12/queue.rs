use std::cell::RefCell;

use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::core::Interface;

use super::D3d12CommandList;
use super::D3d12Fence;
use crate::error::FrameResult;
use crate::gpu::CommandQueue;

pub struct D3d12Queue {
    queue: ID3D12CommandQueue,
    swap_chain: RefCell<Option<IDXGISwapChain3>>,
}

impl D3d12Queue {
    pub(super) fn new(queue: ID3D12CommandQueue) -> Self {
        Self {
            queue,
            swap_chain: RefCell::new(None),
        }
    }

    pub fn raw(&self) -> &ID3D12CommandQueue {
        &self.queue
    }

    /// Swap chain presented at the end of every frame. Without one, presenting is a no-op.
    pub fn attach_swap_chain(&self, swap_chain: IDXGISwapChain3) {
        *self.swap_chain.borrow_mut() = Some(swap_chain);
    }
}

impl CommandQueue for D3d12Queue {
    type Fence = D3d12Fence;
    type CommandList = D3d12CommandList;

    fn execute_command_list(&self, list: &D3d12CommandList) -> FrameResult<()> {
        let command_lists = [Some(list.list.cast::<ID3D12CommandList>()?)];
        unsafe { self.queue.ExecuteCommandLists(&command_lists) };
        Ok(())
    }

    fn signal(&self, fence: &D3d12Fence, value: u64) -> FrameResult<()> {
        unsafe { self.queue.Signal(&fence.fence, value)? };
        Ok(())
    }

    fn present(&self) -> FrameResult<()> {
        if let Some(swap_chain) = self.swap_chain.borrow().as_ref() {
            // Present the frame (vsync enabled with interval 1)
            unsafe { swap_chain.Present(1, DXGI_PRESENT(0)) }.ok()?;
        }
        Ok(())
    }
}
