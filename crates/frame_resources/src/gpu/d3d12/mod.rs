//! Direct3D 12 implementation of the device traits, plus a swap-chain backed
//! [`D3d12Surface`] for resizes.

mod command_list;
mod fence;
mod queue;
mod surface;
mod upload_buffer;

use std::cell::RefCell;
use std::rc::Rc;

use eyre::eyre;
use tracing::info;
use tracing::warn;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

pub use command_list::D3d12Allocator;
pub use command_list::D3d12CommandList;
pub use command_list::PipelineBindings;
pub use fence::D3d12Event;
pub use fence::D3d12Fence;
pub use queue::D3d12Queue;
pub use surface::D3d12Surface;
pub use upload_buffer::D3d12UploadBuffer;

use crate::error::FrameResult;
use crate::gpu::Device;
use crate::scene::GeometryId;
use crate::technique::PipelineKey;

pub struct D3d12Device {
    factory: IDXGIFactory4,
    device: ID3D12Device,
    bindings: Rc<RefCell<PipelineBindings>>,
}

impl D3d12Device {
    /// Creates a device on the first hardware adapter, or on WARP when `use_warp` is set.
    pub fn new(use_warp: bool) -> FrameResult<Self> {
        let mut factory_flags = DXGI_CREATE_FACTORY_FLAGS(0);
        if cfg!(debug_assertions) {
            let mut debug: Option<ID3D12Debug> = None;
            if unsafe { D3D12GetDebugInterface(&mut debug) }.is_ok() {
                if let Some(debug) = debug {
                    info!("D3D12 debug layer enabled");
                    unsafe { debug.EnableDebugLayer() };
                    factory_flags |= DXGI_CREATE_FACTORY_DEBUG;
                }
            } else {
                warn!("D3D12 debug layer unavailable");
            }
        }

        let factory: IDXGIFactory4 = unsafe { CreateDXGIFactory2(factory_flags) }?;
        let adapter: IDXGIAdapter1 = if use_warp {
            info!("using WARP adapter");
            unsafe { factory.EnumWarpAdapter()? }
        } else {
            hardware_adapter(&factory)?
        };

        let mut device: Option<ID3D12Device> = None;
        unsafe { D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_11_0, &mut device) }?;
        let device = device.ok_or_else(|| eyre!("D3D12CreateDevice returned no device"))?;

        Ok(Self {
            factory,
            device,
            bindings: Rc::new(RefCell::new(PipelineBindings::default())),
        })
    }

    pub fn raw(&self) -> &ID3D12Device {
        &self.device
    }

    pub fn factory(&self) -> &IDXGIFactory4 {
        &self.factory
    }

    /// Root signature bound on every command list reset. Constant views use root
    /// parameters 1 (object), 2 (pass) and 3 (material).
    pub fn set_root_signature(&self, root_signature: ID3D12RootSignature) {
        self.bindings.borrow_mut().root_signature = Some(root_signature);
    }

    pub fn register_pipeline(&self, key: PipelineKey, pipeline: ID3D12PipelineState) {
        self.bindings.borrow_mut().pipelines.insert(key, pipeline);
    }

    pub fn register_geometry(
        &self,
        id: GeometryId,
        vertex_buffer: D3D12_VERTEX_BUFFER_VIEW,
        index_buffer: D3D12_INDEX_BUFFER_VIEW,
    ) {
        self.bindings
            .borrow_mut()
            .geometries
            .insert(id, (vertex_buffer, index_buffer));
    }
}

/// First hardware adapter that supports feature level 11.0.
fn hardware_adapter(factory: &IDXGIFactory4) -> FrameResult<IDXGIAdapter1> {
    for i in 0.. {
        let adapter = match unsafe { factory.EnumAdapters1(i) } {
            Ok(adapter) => adapter,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(e.into()),
        };

        let desc = unsafe { adapter.GetDesc1()? };
        let name = String::from_utf16_lossy(&desc.Description);
        let name = name.trim_end_matches('\0');
        if (DXGI_ADAPTER_FLAG(desc.Flags as i32) & DXGI_ADAPTER_FLAG_SOFTWARE) != DXGI_ADAPTER_FLAG_NONE {
            info!(adapter = i, name, "skipping software adapter");
            continue;
        }

        if unsafe {
            D3D12CreateDevice(
                &adapter,
                D3D_FEATURE_LEVEL_11_0,
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_ok()
        {
            info!(adapter = i, name, "selected adapter");
            return Ok(adapter);
        }
        info!(adapter = i, name, "adapter does not support feature level 11.0");
    }
    Err(eyre!("no D3D12 capable hardware adapter found").into())
}

impl Device for D3d12Device {
    type Allocator = D3d12Allocator;
    type CommandList = D3d12CommandList;
    type Fence = D3d12Fence;
    type UploadBuffer = D3d12UploadBuffer;
    type Queue = D3d12Queue;

    fn create_command_queue(&self) -> FrameResult<D3d12Queue> {
        let queue: ID3D12CommandQueue = unsafe {
            self.device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                ..Default::default()
            })?
        };
        Ok(D3d12Queue::new(queue))
    }

    fn create_command_allocator(&self) -> FrameResult<D3d12Allocator> {
        let allocator: ID3D12CommandAllocator = unsafe {
            self.device
                .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)?
        };
        Ok(D3d12Allocator { allocator })
    }

    fn create_command_list(&self, allocator: &D3d12Allocator) -> FrameResult<D3d12CommandList> {
        let list: ID3D12GraphicsCommandList = unsafe {
            self.device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                &allocator.allocator,
                None::<&ID3D12PipelineState>,
            )
        }?;
        // Lists are created open; close it so the first frame can reset it.
        unsafe { list.Close()? };
        Ok(D3d12CommandList::new(list, self.bindings.clone()))
    }

    fn create_fence(&self, initial_value: u64) -> FrameResult<D3d12Fence> {
        let fence: ID3D12Fence = unsafe { self.device.CreateFence(initial_value, D3D12_FENCE_FLAG_NONE)? };
        Ok(D3d12Fence { fence })
    }

    fn create_upload_buffer(&self, size_bytes: usize) -> FrameResult<D3d12UploadBuffer> {
        D3d12UploadBuffer::new(&self.device, size_bytes)
    }
}
