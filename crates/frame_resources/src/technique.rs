/// Which per-pass constant record a technique reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    Main,
    /// Lights mirrored across the mirror plane.
    Reflected,
}

impl PassKind {
    /// Record index inside a slot's pass constant region.
    pub fn index(self) -> usize {
        match self {
            PassKind::Main => 0,
            PassKind::Reflected => 1,
        }
    }
}

/// Pipeline state objects the command stream can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineKey {
    Opaque,
    Transparent,
    /// Writes stencil only, no color or depth.
    StencilMirrors,
    /// Draws where stencil equals the reference, with flipped winding.
    StencilReflections,
    /// Blended, stencil-tested against double blending.
    Shadow,
}

/// Pipeline configuration a draw batch is recorded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Technique {
    Opaque,
    /// Drawn with the main pass and stencil reference 0.
    Transparent,
    MarkMirrors { stencil_ref: u32 },
    Reflected { stencil_ref: u32 },
    /// The reflected shadow reuses the shadow pipeline with the reflected pass record.
    Shadow { pass: PassKind },
}

impl Technique {
    pub fn pipeline(self) -> PipelineKey {
        match self {
            Technique::Opaque => PipelineKey::Opaque,
            Technique::Transparent => PipelineKey::Transparent,
            Technique::MarkMirrors { .. } => PipelineKey::StencilMirrors,
            Technique::Reflected { .. } => PipelineKey::StencilReflections,
            Technique::Shadow { .. } => PipelineKey::Shadow,
        }
    }

    pub fn pass(self) -> PassKind {
        match self {
            Technique::Reflected { .. } => PassKind::Reflected,
            Technique::Shadow { pass } => pass,
            _ => PassKind::Main,
        }
    }

    /// Stencil reference the batch needs, if it sets one.
    pub fn stencil_ref(self) -> Option<u32> {
        match self {
            Technique::MarkMirrors { stencil_ref } | Technique::Reflected { stencil_ref } => {
                Some(stencil_ref)
            }
            Technique::Transparent => Some(0),
            _ => None,
        }
    }
}
