use crate::scene::RenderItemId;
use crate::technique::PassKind;
use crate::technique::Technique;

/// Render items drawn back to back with one pipeline configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch {
    pub technique: Technique,
    pub items: Vec<RenderItemId>,
}

/// Ordered list of draw batches for one frame. Batches are recorded in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePlan {
    batches: Vec<DrawBatch>,
}

impl FramePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(mut self, technique: Technique, items: impl IntoIterator<Item = RenderItemId>) -> Self {
        self.push(technique, items);
        self
    }

    pub fn push(&mut self, technique: Technique, items: impl IntoIterator<Item = RenderItemId>) {
        self.batches.push(DrawBatch {
            technique,
            items: items.into_iter().collect(),
        });
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// The stenciled mirror sequence: opaque, mark mirrors (stencil 1), reflections,
    /// reflected shadow, transparent mirror (stencil 0), shadow.
    pub fn stenciled_mirror(
        opaque: impl IntoIterator<Item = RenderItemId>,
        mirrors: impl IntoIterator<Item = RenderItemId>,
        reflected: impl IntoIterator<Item = RenderItemId>,
        reflected_shadow: impl IntoIterator<Item = RenderItemId>,
        shadow: impl IntoIterator<Item = RenderItemId>,
    ) -> Self {
        let mirrors: Vec<RenderItemId> = mirrors.into_iter().collect();
        Self::new()
            .batch(Technique::Opaque, opaque)
            .batch(Technique::MarkMirrors { stencil_ref: 1 }, mirrors.iter().copied())
            .batch(Technique::Reflected { stencil_ref: 1 }, reflected)
            .batch(
                Technique::Shadow {
                    pass: PassKind::Reflected,
                },
                reflected_shadow,
            )
            .batch(Technique::Transparent, mirrors)
            .batch(
                Technique::Shadow {
                    pass: PassKind::Main,
                },
                shadow,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique::PipelineKey;

    #[test]
    fn mirror_plan_selects_every_pipeline_in_draw_order() {
        let plan = FramePlan::stenciled_mirror(
            [RenderItemId(0)],
            [RenderItemId(1)],
            [RenderItemId(2)],
            [RenderItemId(3)],
            [RenderItemId(4)],
        );
        let pipelines: Vec<PipelineKey> = plan
            .batches()
            .iter()
            .map(|batch| batch.technique.pipeline())
            .collect();
        assert_eq!(
            pipelines,
            [
                PipelineKey::Opaque,
                PipelineKey::StencilMirrors,
                PipelineKey::StencilReflections,
                PipelineKey::Shadow,
                PipelineKey::Transparent,
                PipelineKey::Shadow,
            ]
        );
        // The mirror is drawn twice: once into the stencil, once blended.
        assert_eq!(plan.batches()[1].items, plan.batches()[4].items);
    }
}
