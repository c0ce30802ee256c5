use std::sync::Arc;

use eyre::eyre;
use tracing::debug;

use super::timeline::Timeline;
use crate::error::FrameResult;
use crate::gpu::SurfaceResources;

/// Stand-in for the swap chain backbuffers and the depth/stencil buffer.
pub struct SoftwareSurface {
    timeline: Arc<Timeline>,
    width: u32,
    height: u32,
    released: bool,
    generation: u32,
}

impl SoftwareSurface {
    pub(super) fn new(timeline: Arc<Timeline>, width: u32, height: u32) -> Self {
        Self {
            timeline,
            width,
            height,
            released: false,
            generation: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of times the resources were rebuilt.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl SurfaceResources for SoftwareSurface {
    fn release(&mut self) -> FrameResult<()> {
        if !self.timeline.is_idle() {
            let violation = "surface resources released while GPU work is outstanding".to_owned();
            self.timeline.record_violation(violation.clone());
            return Err(eyre!(violation).into());
        }
        self.released = true;
        Ok(())
    }

    fn recreate(&mut self, width: u32, height: u32) -> FrameResult<()> {
        if !self.released {
            return Err(eyre!("surface resources recreated without being released").into());
        }
        self.width = width;
        self.height = height;
        self.released = false;
        self.generation += 1;
        debug!(width, height, generation = self.generation, "rebuilt software surface");
        Ok(())
    }
}
