/// Capacities fixed at startup. Constant regions are sized from these and never grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    pub object_capacity: usize,
    pub material_capacity: usize,
    /// Pass records per slot; index 0 is the main pass, index 1 the reflected pass.
    pub pass_count: usize,
    pub backbuffer_count: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            object_capacity: 8,
            material_capacity: 5,
            pass_count: 2,
            backbuffer_count: 2,
        }
    }
}

impl FrameConfig {
    pub fn with_object_capacity(mut self, object_capacity: usize) -> Self {
        self.object_capacity = object_capacity;
        self
    }

    pub fn with_material_capacity(mut self, material_capacity: usize) -> Self {
        self.material_capacity = material_capacity;
        self
    }

    pub fn with_pass_count(mut self, pass_count: usize) -> Self {
        self.pass_count = pass_count;
        self
    }
}
