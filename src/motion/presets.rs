//! Ready-made entrance sequences.
//!
//! [`EntrancePreset`] covers the usual section layout: a header fades up,
//! the content block follows while the header is still moving, and the
//! section's items stagger in on top of that. Each part is optional.

use super::entrance::SequenceBuilder;
use super::sequence::{self, AnimationStep, Stagger, StepOffset};
use super::target::{AnimatableTarget, Mutation, Property};
use crate::options::EntranceOptions;

/// Header, content and items of one section, revealed in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntrancePreset {
    header: Option<AnimatableTarget>,
    content: Option<AnimatableTarget>,
    items: Option<AnimatableTarget>,
    options: EntranceOptions,
}

impl EntrancePreset {
    /// An empty preset using `options` for every step.
    pub fn new(options: EntranceOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Set the header target.
    #[must_use]
    pub fn header(mut self, target: AnimatableTarget) -> Self {
        self.header = Some(target);
        self
    }

    /// Set the content target.
    #[must_use]
    pub fn content(mut self, target: AnimatableTarget) -> Self {
        self.content = Some(target);
        self
    }

    /// Set the staggered items, usually a group target.
    #[must_use]
    pub fn items(mut self, target: AnimatableTarget) -> Self {
        self.items = Some(target);
        self
    }

    /// The steps for the parts that are set.
    ///
    /// The first step present starts at zero; every later one overlaps the
    /// previous by `overlap_ms`.
    pub fn steps(&self) -> Vec<AnimationStep> {
        let mut steps = Vec::with_capacity(3);
        let overlap = StepOffset::After(-(self.options.overlap_ms as i64));

        if let Some(header) = &self.header {
            steps.push(fade_up(header.clone(), &self.options));
        }
        if let Some(content) = &self.content {
            let step = fade_up(content.clone(), &self.options);
            steps.push(if steps.is_empty() { step } else { step.offset(overlap) });
        }
        if let Some(items) = &self.items {
            let step = fade_up(items.clone(), &self.options)
                .stagger(Stagger::new(self.options.stagger()));
            steps.push(if steps.is_empty() { step } else { step.offset(overlap) });
        }
        steps
    }
}

impl SequenceBuilder for EntrancePreset {
    fn initial_state(&self) -> Vec<Mutation> {
        sequence::initial_state(&self.steps())
    }

    fn final_state(&self) -> Vec<Mutation> {
        sequence::final_state(&self.steps())
    }

    fn build(&mut self) -> Vec<AnimationStep> {
        self.steps()
    }

    fn name(&self) -> &'static str {
        "section"
    }
}

/// Fade in while rising `distance_px`.
pub fn fade_up(target: AnimatableTarget, options: &EntranceOptions) -> AnimationStep {
    AnimationStep::new(target, options.duration())
        .animate(Property::Opacity, 0.0, 1.0)
        .animate(Property::TranslateY, options.distance_px, 0.0)
        .ease(options.ease)
}

/// Fade in while growing from 92% scale.
pub fn scale_in(target: AnimatableTarget, options: &EntranceOptions) -> AnimationStep {
    AnimationStep::new(target, options.duration())
        .animate(Property::Opacity, 0.0, 1.0)
        .animate(Property::Scale, 0.92, 1.0)
        .ease(options.ease)
}
