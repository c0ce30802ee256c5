use eyre::eyre;
use tracing::debug;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::core::Interface;

use super::D3d12Device;
use super::D3d12Queue;
use crate::error::FrameResult;
use crate::gpu::SurfaceResources;

const BACKBUFFER_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;

/// Flip-model swap chain plus one render target view per backbuffer.
///
/// The swap chain is created for composition, so it needs no window handle.
pub struct D3d12Surface {
    device: ID3D12Device,
    swap_chain: IDXGISwapChain3,
    rtv_heap: ID3D12DescriptorHeap,
    rtv_descriptor_size: u32,
    buffer_count: u32,
    render_targets: Vec<ID3D12Resource>,
    size: (u32, u32),
}

impl D3d12Surface {
    /// Creates a swap chain presented by `queue` and attaches it, so the queue's
    /// `present` flips it.
    pub fn new(
        device: &D3d12Device,
        queue: &D3d12Queue,
        width: u32,
        height: u32,
        buffer_count: u32,
    ) -> FrameResult<Self> {
        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: buffer_count,
            Width: width,
            Height: height,
            Format: BACKBUFFER_FORMAT,
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Scaling: DXGI_SCALING_STRETCH,
            ..Default::default()
        };
        let factory: IDXGIFactory2 = device.factory().cast()?;
        let swap_chain: IDXGISwapChain1 =
            unsafe { factory.CreateSwapChainForComposition(queue.raw(), &swap_chain_desc, None)? };
        let swap_chain: IDXGISwapChain3 = swap_chain.cast()?;

        let raw = device.raw();
        let rtv_heap: ID3D12DescriptorHeap = unsafe {
            raw.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: buffer_count,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                ..Default::default()
            })
        }?;
        let rtv_descriptor_size =
            unsafe { raw.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) };

        queue.attach_swap_chain(swap_chain.clone());
        let mut surface = Self {
            device: raw.clone(),
            swap_chain,
            rtv_heap,
            rtv_descriptor_size,
            buffer_count,
            render_targets: Vec::new(),
            size: (width, height),
        };
        surface.create_render_targets()?;
        Ok(surface)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn swap_chain(&self) -> &IDXGISwapChain3 {
        &self.swap_chain
    }

    pub fn current_back_buffer_index(&self) -> u32 {
        unsafe { self.swap_chain.GetCurrentBackBufferIndex() }
    }

    pub fn render_targets(&self) -> &[ID3D12Resource] {
        &self.render_targets
    }

    pub fn render_target_view(&self, index: u32) -> FrameResult<D3D12_CPU_DESCRIPTOR_HANDLE> {
        if index >= self.render_targets.len() as u32 {
            return Err(eyre!("no render target {index}, {} are live", self.render_targets.len()).into());
        }
        let start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() };
        Ok(D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: start.ptr + (index * self.rtv_descriptor_size) as usize,
        })
    }

    fn create_render_targets(&mut self) -> FrameResult<()> {
        let start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() };
        for i in 0..self.buffer_count {
            let resource: ID3D12Resource = unsafe { self.swap_chain.GetBuffer(i)? };
            let handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                ptr: start.ptr + (i * self.rtv_descriptor_size) as usize,
            };
            unsafe { self.device.CreateRenderTargetView(&resource, None, handle) };
            self.render_targets.push(resource);
        }
        Ok(())
    }
}

impl SurfaceResources for D3d12Surface {
    fn release(&mut self) -> FrameResult<()> {
        // ResizeBuffers fails while any backbuffer reference is alive.
        self.render_targets.clear();
        Ok(())
    }

    fn recreate(&mut self, width: u32, height: u32) -> FrameResult<()> {
        self.render_targets.clear();
        unsafe {
            self.swap_chain.ResizeBuffers(
                self.buffer_count,
                width,
                height,
                BACKBUFFER_FORMAT,
                DXGI_SWAP_CHAIN_FLAG(0),
            )?
        };
        self.size = (width, height);
        self.create_render_targets()?;
        debug!(width, height, buffers = self.buffer_count, "recreated swap chain buffers");
        Ok(())
    }
}
