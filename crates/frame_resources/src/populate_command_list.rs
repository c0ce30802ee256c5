use tracing::trace;

use crate::error::FrameResult;
use crate::frame_plan::FramePlan;
use crate::frame_slot::FrameSlot;
use crate::gpu::Command;
use crate::gpu::CommandList;
use crate::gpu::Device;
use crate::scene::Scene;

/// Records every batch of `plan` into `command_list`, binding only constants owned by `slot`.
///
/// The command list must already be reset against the slot's allocator.
pub fn populate_command_list<D: Device>(
    command_list: &mut D::CommandList,
    slot: &FrameSlot<D>,
    plan: &FramePlan,
    scene: &Scene,
) -> FrameResult<()> {
    // The depth/stencil clear at the start of the frame leaves the reference at 0.
    let mut stencil_ref = 0;

    for batch in plan.batches() {
        let technique = batch.technique;
        command_list.record(Command::SetPipelineState(technique.pipeline()))?;
        if let Some(wanted) = technique.stencil_ref() {
            if wanted != stencil_ref {
                command_list.record(Command::SetStencilRef(wanted))?;
                stencil_ref = wanted;
            }
        }

        // Pass records live in the same slot; the reflected pass is one stride further in.
        let pass = slot.pass_constants.view(technique.pass().index())?;
        command_list.record(Command::SetPassConstants(pass))?;

        trace!(?technique, items = batch.items.len(), "recording draw batch");
        for &id in &batch.items {
            let item = scene.render_item(id)?;
            let material = scene.material(item.material())?;
            command_list.record(Command::SetObjectConstants(
                slot.object_constants.view(item.object_index())?,
            ))?;
            command_list.record(Command::SetMaterialConstants(
                slot.material_constants.view(material.constant_index())?,
            ))?;
            command_list.record(Command::DrawIndexed {
                geometry: item.geometry(),
                args: item.args(),
            })?;
        }
    }
    Ok(())
}
