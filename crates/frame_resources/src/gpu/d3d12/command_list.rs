use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use eyre::eyre;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;

use crate::error::FrameResult;
use crate::gpu::Command;
use crate::gpu::CommandAllocator;
use crate::gpu::CommandList;
use crate::scene::GeometryId;
use crate::technique::PipelineKey;

const OBJECT_CONSTANTS_PARAMETER: u32 = 1;
const PASS_CONSTANTS_PARAMETER: u32 = 2;
const MATERIAL_CONSTANTS_PARAMETER: u32 = 3;

/// Device objects that recorded commands refer to by key.
#[derive(Default)]
pub struct PipelineBindings {
    pub root_signature: Option<ID3D12RootSignature>,
    pub pipelines: HashMap<PipelineKey, ID3D12PipelineState>,
    pub geometries: HashMap<GeometryId, (D3D12_VERTEX_BUFFER_VIEW, D3D12_INDEX_BUFFER_VIEW)>,
}

pub struct D3d12Allocator {
    pub(super) allocator: ID3D12CommandAllocator,
}

impl CommandAllocator for D3d12Allocator {
    fn reset(&mut self) -> FrameResult<()> {
        unsafe { self.allocator.Reset()? };
        Ok(())
    }
}

pub struct D3d12CommandList {
    pub(super) list: ID3D12GraphicsCommandList,
    bindings: Rc<RefCell<PipelineBindings>>,
}

impl D3d12CommandList {
    pub(super) fn new(list: ID3D12GraphicsCommandList, bindings: Rc<RefCell<PipelineBindings>>) -> Self {
        Self { list, bindings }
    }

    pub fn raw(&self) -> &ID3D12GraphicsCommandList {
        &self.list
    }

    fn require_root_signature(&self) -> FrameResult<()> {
        if self.bindings.borrow().root_signature.is_none() {
            return Err(eyre!("constant views bound without a root signature").into());
        }
        Ok(())
    }
}

impl CommandList for D3d12CommandList {
    type Allocator = D3d12Allocator;

    fn reset(&mut self, allocator: &D3d12Allocator) -> FrameResult<()> {
        unsafe {
            self.list
                .Reset(&allocator.allocator, None::<&ID3D12PipelineState>)?
        };
        if let Some(root_signature) = &self.bindings.borrow().root_signature {
            unsafe { self.list.SetGraphicsRootSignature(root_signature) };
        }
        Ok(())
    }

    fn record(&mut self, command: Command) -> FrameResult<()> {
        match command {
            Command::SetPipelineState(key) => {
                let bindings = self.bindings.borrow();
                let pipeline = bindings
                    .pipelines
                    .get(&key)
                    .ok_or_else(|| eyre!("no pipeline state registered for {key:?}"))?;
                unsafe { self.list.SetPipelineState(pipeline) };
            }
            Command::SetStencilRef(value) => unsafe { self.list.OMSetStencilRef(value) },
            Command::SetPassConstants(view) => {
                self.require_root_signature()?;
                unsafe {
                    self.list
                        .SetGraphicsRootConstantBufferView(PASS_CONSTANTS_PARAMETER, view.address)
                };
            }
            Command::SetObjectConstants(view) => {
                self.require_root_signature()?;
                unsafe {
                    self.list
                        .SetGraphicsRootConstantBufferView(OBJECT_CONSTANTS_PARAMETER, view.address)
                };
            }
            Command::SetMaterialConstants(view) => {
                self.require_root_signature()?;
                unsafe {
                    self.list
                        .SetGraphicsRootConstantBufferView(MATERIAL_CONSTANTS_PARAMETER, view.address)
                };
            }
            Command::DrawIndexed { geometry, args } => {
                let bindings = self.bindings.borrow();
                let (vbv, ibv) = bindings
                    .geometries
                    .get(&geometry)
                    .ok_or_else(|| eyre!("no buffers registered for {geometry:?}"))?;
                unsafe {
                    self.list.IASetVertexBuffers(0, Some(&[*vbv]));
                    self.list.IASetIndexBuffer(Some(ibv as *const D3D12_INDEX_BUFFER_VIEW));
                    self.list
                        .IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
                    self.list.DrawIndexedInstanced(
                        args.index_count,
                        1,
                        args.start_index,
                        args.base_vertex,
                        0,
                    );
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> FrameResult<()> {
        unsafe { self.list.Close()? };
        Ok(())
    }
}
