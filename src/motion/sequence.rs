//! Declarative step sequences with relative offsets.
//!
//! Each step starts relative to the end of the step declared before it
//! (negative offsets overlap the two) or, with [`StepOffset::Start`], in
//! parallel with it. Group steps may stagger their members. A resolved
//! [`Sequence`] is played through a [`PlayHandle`], which writes property
//! values on every tick and reports completion exactly once.
//!
//! # Timing
//!
//! For `[A(800ms, Start), B(700ms, -400ms), C(600ms, -300ms)]`:
//! - A starts at 0 and ends at 800
//! - B starts 400ms before A ends: 400, ends at 1100
//! - C starts 300ms before B ends: 800, ends at 1400
//!
//! Steps that resolve to the same start run in declaration order.

use web_time::{Duration, Instant};

use super::target::{AnimatableTarget, Mutation, Property, PropertyDelta, Renderer};
use crate::error::RevealError;
use crate::util::easing::EasingFunction;

/// Where a step starts relative to the step declared before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOffset {
    /// Same start as the previous step.
    Start,
    /// Signed milliseconds after the previous step's end.
    After(i64),
}

impl Default for StepOffset {
    fn default() -> Self {
        StepOffset::After(0)
    }
}

/// Order in which group members start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerDirection {
    /// First member first.
    #[default]
    Forward,
    /// Last member first.
    Reverse,
    /// Middle member first, spreading outward.
    FromCenter,
}

/// Per-member delay for group steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagger {
    /// Delay between consecutive members.
    pub each: Duration,
    /// Start order.
    pub direction: StaggerDirection,
}

impl Stagger {
    /// Forward stagger with the given interval.
    pub const fn new(each: Duration) -> Self {
        Self {
            each,
            direction: StaggerDirection::Forward,
        }
    }

    /// Stagger from last to first.
    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.direction = StaggerDirection::Reverse;
        self
    }

    /// Stagger from center outward.
    #[must_use]
    pub fn from_center(mut self) -> Self {
        self.direction = StaggerDirection::FromCenter;
        self
    }

    /// Position of member `index` in start order.
    pub fn rank(&self, index: usize, total: usize) -> usize {
        match self.direction {
            StaggerDirection::Forward => index,
            StaggerDirection::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerDirection::FromCenter => (total / 2).abs_diff(index),
        }
    }

    /// Largest rank among `total` members.
    pub fn max_rank(&self, total: usize) -> usize {
        (0..total).map(|i| self.rank(i, total)).max().unwrap_or(0)
    }

    /// Delay for a member at `rank`, saturating at [`Duration::MAX`].
    pub fn delay_for(&self, rank: usize) -> Duration {
        u32::try_from(rank)
            .ok()
            .and_then(|rank| self.each.checked_mul(rank))
            .unwrap_or(Duration::MAX)
    }
}

/// One step of an entrance sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationStep {
    /// What the step animates.
    pub target: AnimatableTarget,
    /// Properties animated together.
    pub properties: Vec<PropertyDelta>,
    /// Duration of one member's animation.
    pub duration: Duration,
    /// Easing curve.
    pub ease: EasingFunction,
    /// Start relative to the previous step.
    pub offset: StepOffset,
    /// Member stagger for group targets.
    pub stagger: Option<Stagger>,
}

impl AnimationStep {
    /// A step with no properties, default easing, starting when the previous
    /// step ends.
    pub fn new(target: AnimatableTarget, duration: Duration) -> Self {
        Self {
            target,
            properties: Vec::new(),
            duration,
            ease: EasingFunction::DEFAULT,
            offset: StepOffset::default(),
            stagger: None,
        }
    }

    /// Animate `property` from `from` to `to`.
    #[must_use]
    pub fn animate(mut self, property: Property, from: f32, to: f32) -> Self {
        self.properties.push(PropertyDelta::new(property, from, to));
        self
    }

    /// Set the easing curve.
    #[must_use]
    pub fn ease(mut self, ease: EasingFunction) -> Self {
        self.ease = ease;
        self
    }

    /// Set the start offset.
    #[must_use]
    pub fn offset(mut self, offset: StepOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Stagger group members.
    #[must_use]
    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = Some(stagger);
        self
    }

    /// Delay of member `index` from the step start.
    pub fn member_delay(&self, index: usize) -> Duration {
        self.stagger
            .map_or(Duration::ZERO, |s| s.delay_for(s.rank(index, self.target.len())))
    }

    /// Time from the step start until its last member finishes.
    pub fn span(&self) -> Duration {
        let tail = self
            .stagger
            .map_or(Duration::ZERO, |s| s.delay_for(s.max_rank(self.target.len())));
        self.duration.saturating_add(tail)
    }

    fn writes(&self, value: impl Fn(&PropertyDelta) -> f32) -> impl Iterator<Item = Mutation> + '_ {
        let values: Vec<(Property, f32)> = self
            .properties
            .iter()
            .map(|delta| (delta.property, value(delta)))
            .collect();
        self.target.members().flat_map(move |target| {
            values
                .clone()
                .into_iter()
                .map(move |(property, value)| Mutation {
                    target,
                    property,
                    value,
                })
        })
    }
}

/// Writes that put every step's target in its pre-entrance state.
///
/// When several steps animate the same property, the earliest declared
/// `from` wins.
pub fn initial_state(steps: &[AnimationStep]) -> Vec<Mutation> {
    steps
        .iter()
        .rev()
        .flat_map(|step| step.writes(|delta| delta.from).collect::<Vec<_>>())
        .collect()
}

/// Writes that put every step's target in its final state.
///
/// When several steps animate the same property, the latest declared `to`
/// wins.
pub fn final_state(steps: &[AnimationStep]) -> Vec<Mutation> {
    steps
        .iter()
        .flat_map(|step| step.writes(|delta| delta.to).collect::<Vec<_>>())
        .collect()
}

/// A step with its absolute start time resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStep {
    /// The declared step.
    pub step: AnimationStep,
    /// Absolute start from sequence start.
    pub start: Duration,
}

impl ResolvedStep {
    /// Absolute end from sequence start.
    pub fn end(&self) -> Duration {
        self.start.saturating_add(self.step.span())
    }
}

/// An ordered list of steps with resolved start times.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    steps: Vec<ResolvedStep>,
    total: Duration,
}

impl Sequence {
    /// Resolve each step's absolute start from its offset.
    ///
    /// Fails when any step would start before the sequence does, or when an
    /// offset pushes a step past the representable timeline.
    pub fn build(steps: Vec<AnimationStep>) -> Result<Self, RevealError> {
        let mut resolved = Vec::with_capacity(steps.len());
        let mut prev_start: i64 = 0;
        let mut prev_end: i64 = 0;
        let mut total = Duration::ZERO;

        for (index, step) in steps.into_iter().enumerate() {
            let start_us = match step.offset {
                StepOffset::Start => prev_start,
                StepOffset::After(ms) => ms
                    .checked_mul(1000)
                    .and_then(|us| prev_end.checked_add(us))
                    .ok_or(RevealError::TimelineOverflow { index })?,
            };
            let Ok(start_micros) = u64::try_from(start_us) else {
                return Err(RevealError::NegativeStepStart {
                    index,
                    start_ms: start_us / 1000,
                });
            };
            let start = Duration::from_micros(start_micros);
            prev_end = i64::try_from(step.span().as_micros())
                .ok()
                .and_then(|span_us| start_us.checked_add(span_us))
                .ok_or(RevealError::TimelineOverflow { index })?;
            prev_start = start_us;

            let resolved_step = ResolvedStep { step, start };
            total = total.max(resolved_step.end());
            resolved.push(resolved_step);
        }

        Ok(Self {
            steps: resolved,
            total,
        })
    }

    /// Resolved steps in declaration order.
    pub fn steps(&self) -> &[ResolvedStep] {
        &self.steps
    }

    /// Absolute start of every step, in declaration order.
    pub fn starts(&self) -> Vec<Duration> {
        self.steps.iter().map(|s| s.start).collect()
    }

    /// Time until the last step finishes.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Write the values for `elapsed` time into the sequence.
    ///
    /// Members that have not started are left alone (they still carry their
    /// initial state). Returns `true` when every step has finished.
    fn write<R: Renderer + ?Sized>(
        &self,
        elapsed: Duration,
        finished: &mut [bool],
        renderer: &mut R,
    ) -> bool {
        for (resolved, done) in self.steps.iter().zip(finished.iter_mut()) {
            if *done || elapsed < resolved.start {
                continue;
            }
            let step = &resolved.step;
            let local = elapsed - resolved.start;

            for (index, target) in step.target.members().enumerate() {
                let delay = step.member_delay(index);
                if local < delay {
                    continue;
                }
                let t = if step.duration.is_zero() {
                    1.0
                } else {
                    ((local - delay).as_secs_f32() / step.duration.as_secs_f32())
                        .min(1.0)
                };
                let eased = step.ease.evaluate(t);
                for delta in &step.properties {
                    let value = if t >= 1.0 { delta.to } else { delta.sample(eased) };
                    renderer.apply(Mutation {
                        target,
                        property: delta.property,
                        value,
                    });
                }
            }

            if local >= step.span() {
                *done = true;
            }
        }
        finished.iter().all(|done| *done)
    }
}

/// Lifecycle of a playing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatus {
    /// Steps still running.
    Running,
    /// All steps finished; completion has been reported.
    Completed,
    /// Aborted before completion; completion is never reported.
    Cancelled,
}

/// A sequence being played from a fixed start instant.
///
/// There is no pause: entrance sequences are short and one-shot. The only
/// interruption is [`cancel`](Self::cancel), which drops the whole sequence.
#[derive(Debug)]
pub struct PlayHandle {
    sequence: Sequence,
    started_at: Instant,
    finished: Vec<bool>,
    status: PlayStatus,
}

impl PlayHandle {
    /// Begin playing `sequence` at `now`.
    pub fn start(sequence: Sequence, now: Instant) -> Self {
        let finished = vec![false; sequence.len()];
        Self {
            sequence,
            started_at: now,
            finished,
            status: PlayStatus::Running,
        }
    }

    /// Resolve `steps` and begin playing them at `now`.
    pub fn build(steps: Vec<AnimationStep>, now: Instant) -> Result<Self, RevealError> {
        Ok(Self::start(Sequence::build(steps)?, now))
    }

    /// Advance to `now`, writing current values.
    ///
    /// Returns `true` exactly once: on the tick that completes the sequence.
    pub fn tick<R: Renderer + ?Sized>(&mut self, now: Instant, renderer: &mut R) -> bool {
        if self.status != PlayStatus::Running {
            return false;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        let all_done = self.sequence.write(elapsed, &mut self.finished, renderer);
        if all_done && elapsed >= self.sequence.total() {
            self.status = PlayStatus::Completed;
            return true;
        }
        false
    }

    /// Abort the sequence. No further writes, no completion.
    pub fn cancel(&mut self) {
        if self.status == PlayStatus::Running {
            self.status = PlayStatus::Cancelled;
        }
    }

    /// Current status.
    pub fn status(&self) -> PlayStatus {
        self.status
    }

    /// When playback began.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// The sequence being played.
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::target::{NodeId, TargetRef};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn fade(node: u64, duration: u64, offset: StepOffset) -> AnimationStep {
        AnimationStep::new(AnimatableTarget::Node(NodeId(node)), ms(duration))
            .animate(Property::Opacity, 0.0, 1.0)
            .ease(EasingFunction::Linear)
            .offset(offset)
    }

    #[test]
    fn negative_offsets_overlap_previous_step() {
        let sequence = Sequence::build(vec![
            fade(1, 800, StepOffset::Start),
            fade(2, 700, StepOffset::After(-400)),
            fade(3, 600, StepOffset::After(-300)),
        ])
        .unwrap();

        assert_eq!(sequence.starts(), vec![ms(0), ms(400), ms(800)]);
        assert_eq!(sequence.total(), ms(1400));
    }

    #[test]
    fn start_offset_runs_parallel_with_previous() {
        let sequence = Sequence::build(vec![
            fade(1, 500, StepOffset::After(200)),
            fade(2, 300, StepOffset::Start),
            fade(3, 100, StepOffset::After(0)),
        ])
        .unwrap();
        assert_eq!(sequence.starts(), vec![ms(200), ms(200), ms(500)]);
        assert_eq!(sequence.total(), ms(700));
    }

    #[test]
    fn rejects_steps_starting_before_zero() {
        let err = Sequence::build(vec![
            fade(1, 300, StepOffset::Start),
            fade(2, 300, StepOffset::After(-500)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            RevealError::NegativeStepStart {
                index: 1,
                start_ms: -200
            }
        ));
    }

    #[test]
    fn huge_offsets_are_rejected_instead_of_overflowing() {
        for offset in [i64::MAX / 500, i64::MAX / 1000, i64::MIN / 999] {
            let err = Sequence::build(vec![
                fade(1, 300, StepOffset::Start),
                fade(2, 300, StepOffset::After(offset)),
            ])
            .unwrap_err();
            assert!(
                matches!(err, RevealError::TimelineOverflow { index: 1 }),
                "offset {offset}: {err}"
            );
        }
    }

    #[test]
    fn huge_stagger_saturates_instead_of_overflowing() {
        let items = AnimatableTarget::group(NodeId(9), ".item", 3);
        let step = AnimationStep::new(items, ms(400)).stagger(Stagger::new(Duration::MAX));
        assert_eq!(step.member_delay(0), ms(0));
        assert_eq!(step.member_delay(2), Duration::MAX);
        assert_eq!(step.span(), Duration::MAX);

        let err = Sequence::build(vec![step]).unwrap_err();
        assert!(matches!(err, RevealError::TimelineOverflow { index: 0 }));
    }

    #[test]
    fn stagger_extends_the_step_span() {
        let items = AnimatableTarget::group(NodeId(9), ".item", 4);
        let step = AnimationStep::new(items, ms(400)).stagger(Stagger::new(ms(100)));
        assert_eq!(step.span(), ms(700));
        assert_eq!(step.member_delay(0), ms(0));
        assert_eq!(step.member_delay(3), ms(300));

        let reversed = step.clone().stagger(Stagger::new(ms(100)).reverse());
        assert_eq!(reversed.member_delay(0), ms(300));

        let centered = step.stagger(Stagger::new(ms(100)).from_center());
        assert_eq!(centered.member_delay(2), ms(0));
        assert_eq!(centered.member_delay(0), ms(200));
        assert_eq!(centered.span(), ms(600));
    }

    #[test]
    fn equal_starts_execute_in_declaration_order() {
        let t0 = Instant::now();
        let mut handle = PlayHandle::build(
            vec![
                fade(1, 0, StepOffset::Start),
                fade(2, 0, StepOffset::Start),
                fade(3, 0, StepOffset::Start),
            ],
            t0,
        )
        .unwrap();

        let mut writes: Vec<Mutation> = Vec::new();
        assert!(handle.tick(t0, &mut writes));
        let order: Vec<NodeId> = writes.iter().map(|m| m.target.node).collect();
        assert_eq!(order, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let t0 = Instant::now();
        let mut handle = PlayHandle::build(
            vec![fade(1, 200, StepOffset::Start), fade(2, 200, StepOffset::After(-100))],
            t0,
        )
        .unwrap();
        let mut writes: Vec<Mutation> = Vec::new();

        assert!(!handle.tick(t0 + ms(100), &mut writes));
        assert!(!handle.tick(t0 + ms(250), &mut writes));
        assert!(handle.tick(t0 + ms(300), &mut writes));
        assert!(!handle.tick(t0 + ms(400), &mut writes));
        assert_eq!(handle.status(), PlayStatus::Completed);
    }

    #[test]
    fn unstarted_members_are_not_written() {
        let t0 = Instant::now();
        let items = AnimatableTarget::group(NodeId(4), ".item", 3);
        let step = AnimationStep::new(items, ms(100))
            .animate(Property::Opacity, 0.0, 1.0)
            .ease(EasingFunction::Linear)
            .stagger(Stagger::new(ms(100)));
        let mut handle = PlayHandle::build(vec![step], t0).unwrap();

        let mut writes: Vec<Mutation> = Vec::new();
        assert!(!handle.tick(t0 + ms(150), &mut writes));
        let items: Vec<Option<usize>> = writes.iter().map(|m| m.target.item).collect();
        assert_eq!(items, vec![Some(0), Some(1)]);
        assert_eq!(writes[0].value, 1.0);
        assert!((writes[1].value - 0.5).abs() < 1e-4);
    }

    #[test]
    fn final_tick_lands_exactly_on_target_values() {
        let t0 = Instant::now();
        let step = AnimationStep::new(AnimatableTarget::Node(NodeId(1)), ms(300))
            .animate(Property::TranslateY, 40.0, 0.0)
            .ease(EasingFunction::BackOut { overshoot: 1.7 });
        let mut handle = PlayHandle::build(vec![step], t0).unwrap();
        let mut writes: Vec<Mutation> = Vec::new();
        assert!(handle.tick(t0 + ms(1000), &mut writes));
        assert_eq!(writes.last().map(|m| m.value), Some(0.0));
    }

    #[test]
    fn cancelled_handle_never_writes_or_completes() {
        let t0 = Instant::now();
        let mut handle =
            PlayHandle::build(vec![fade(1, 200, StepOffset::Start)], t0).unwrap();
        let mut writes: Vec<Mutation> = Vec::new();
        assert!(!handle.tick(t0 + ms(50), &mut writes));
        let before = writes.len();

        handle.cancel();
        assert!(!handle.tick(t0 + ms(500), &mut writes));
        assert_eq!(writes.len(), before);
        assert_eq!(handle.status(), PlayStatus::Cancelled);
    }

    #[test]
    fn endpoint_states_resolve_overlapping_properties() {
        let node = AnimatableTarget::Node(NodeId(1));
        let steps = vec![
            AnimationStep::new(node.clone(), ms(100)).animate(Property::Scale, 0.8, 1.1),
            AnimationStep::new(node, ms(100)).animate(Property::Scale, 1.1, 1.0),
        ];
        let target = TargetRef { node: NodeId(1), item: None };

        let initial = initial_state(&steps);
        assert_eq!(initial.last().map(|m| (m.target, m.value)), Some((target, 0.8)));

        let finals = final_state(&steps);
        assert_eq!(finals.last().map(|m| m.value), Some(1.0));
    }

    #[test]
    fn empty_sequence_completes_immediately() {
        let t0 = Instant::now();
        let mut handle = PlayHandle::build(Vec::new(), t0).unwrap();
        let mut writes: Vec<Mutation> = Vec::new();
        assert!(handle.tick(t0, &mut writes));
        assert!(writes.is_empty());
    }
}
