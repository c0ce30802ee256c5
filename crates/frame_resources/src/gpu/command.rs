use crate::scene::DrawArgs;
use crate::scene::GeometryId;
use crate::technique::PipelineKey;

/// GPU address and byte size of one constant record inside an upload buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstantView {
    pub address: u64,
    pub size: u32,
}

/// One recorded GPU command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SetPipelineState(PipelineKey),
    SetStencilRef(u32),
    SetPassConstants(ConstantView),
    SetObjectConstants(ConstantView),
    SetMaterialConstants(ConstantView),
    DrawIndexed {
        geometry: GeometryId,
        args: DrawArgs,
    },
}
