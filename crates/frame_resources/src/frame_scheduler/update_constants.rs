use eyre::eyre;
use tracing::trace;

use super::FrameScheduler;
use super::FrameState;
use crate::constants::PassConstants;
use crate::error::FrameResult;
use crate::gpu::Device;
use crate::scene::Scene;

impl<D: Device, const N: usize> FrameScheduler<D, N> {
    /// Writes this frame's constants into the current slot.
    ///
    /// Pass records are rewritten every frame. Object and material records are only written
    /// while their entity is still dirty, and each write consumes one dirty frame.
    pub fn update_constants(&mut self, scene: &mut Scene, passes: &[PassConstants]) -> FrameResult<()> {
        self.expect_state("update_constants", &[FrameState::Recording])?;
        self.check_scene_fits(scene, passes)?;

        let slot = self.slots.slot_mut(self.slot_index)?;
        for (index, pass) in passes.iter().enumerate() {
            slot.pass_constants.write(index, pass)?;
        }

        for item in scene.render_items_mut() {
            if item.frames_dirty > 0 {
                slot.object_constants
                    .write(item.object_index(), &item.constants())?;
                item.frames_dirty -= 1;
                trace!(
                    object = item.object_index(),
                    remaining = item.frames_dirty,
                    "wrote object constants"
                );
            }
        }

        for material in scene.materials_mut() {
            if material.frames_dirty > 0 {
                slot.material_constants
                    .write(material.constant_index(), &material.constants())?;
                material.frames_dirty -= 1;
            }
        }
        Ok(())
    }

    /// Rejects a scene the slots cannot hold before anything is written or marked clean.
    fn check_scene_fits(&self, scene: &Scene, passes: &[PassConstants]) -> FrameResult<()> {
        if scene.frame_count() != N {
            return Err(eyre!(
                "scene marks changes dirty for {} frames but {N} frame slots are in use",
                scene.frame_count()
            )
            .into());
        }
        let slot = self.slots.slot(self.slot_index)?;
        let counts = [
            ("pass", passes.len(), slot.pass_constants().capacity()),
            ("object", scene.render_items().len(), slot.object_constants().capacity()),
            ("material", scene.materials().len(), slot.material_constants().capacity()),
        ];
        for (what, count, capacity) in counts {
            if count > capacity {
                return Err(eyre!("{count} {what} records exceed the capacity of {capacity}").into());
            }
        }
        Ok(())
    }
}
