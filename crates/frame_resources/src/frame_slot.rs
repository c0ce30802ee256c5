use crate::config::FrameConfig;
use crate::constant_region::ConstantRegion;
use crate::constants::MaterialConstants;
use crate::constants::ObjectConstants;
use crate::constants::PassConstants;
use crate::error::FrameResult;
use crate::gpu::Device;

/// Everything the CPU writes for one frame while the GPU may still read older frames.
pub struct FrameSlot<D: Device> {
    pub(crate) allocator: D::Allocator,
    /// Fence value that proves the last submission recorded from this slot has retired.
    pub(crate) checkpoint_value: u64,
    pub(crate) object_constants: ConstantRegion<D::UploadBuffer, ObjectConstants>,
    pub(crate) material_constants: ConstantRegion<D::UploadBuffer, MaterialConstants>,
    pub(crate) pass_constants: ConstantRegion<D::UploadBuffer, PassConstants>,
}

impl<D: Device> FrameSlot<D> {
    pub fn new(device: &D, config: &FrameConfig) -> FrameResult<Self> {
        Ok(Self {
            allocator: device.create_command_allocator()?,
            checkpoint_value: 0,
            object_constants: ConstantRegion::new(device, config.object_capacity)?,
            material_constants: ConstantRegion::new(device, config.material_capacity)?,
            pass_constants: ConstantRegion::new(device, config.pass_count)?,
        })
    }

    pub fn checkpoint_value(&self) -> u64 {
        self.checkpoint_value
    }

    pub fn allocator(&self) -> &D::Allocator {
        &self.allocator
    }

    pub fn object_constants(&self) -> &ConstantRegion<D::UploadBuffer, ObjectConstants> {
        &self.object_constants
    }

    pub fn material_constants(&self) -> &ConstantRegion<D::UploadBuffer, MaterialConstants> {
        &self.material_constants
    }

    pub fn pass_constants(&self) -> &ConstantRegion<D::UploadBuffer, PassConstants> {
        &self.pass_constants
    }
}
