//! Entrance controller: plays a subtree's entrance sequence at most once.
//!
//! Three independent sources race to trigger the entrance:
//! - **Observer**: the visibility tracker reports the root in view
//! - **Poll fallback**: right after mount, and again after a short delay, the
//!   root's bounding box is tested against the viewport directly
//! - **Safety timeout**: an unconditional trigger after a fixed bound, so
//!   content is never left hidden when the other two never fire
//!
//! Every source funnels into [`EntranceController::signal`], where the state
//! check and the state write happen in the same synchronous step. The first
//! signal wins; all later ones are discarded.

use web_time::{Duration, Instant};

use super::preference::MotionPreference;
use super::sequence::{self, AnimationStep, PlayHandle};
use super::target::{AnimatableTarget, LayoutProbe, Mutation, Renderer};

/// Lifecycle of one mounted subtree's entrance. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntranceState {
    /// Created, not mounted.
    Unset,
    /// Initial (hidden) state applied; waiting for a trigger.
    Initialized,
    /// A trigger was accepted and the sequence is running.
    Playing,
    /// The final state is in place. Terminal.
    Committed,
}

/// The mechanism that produced a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerSource {
    /// Visibility tracker reported the root in view.
    Observer,
    /// Synchronous bounding-box poll found the root on screen.
    PollFallback,
    /// The safety timer elapsed.
    SafetyTimeout,
}

/// A trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSignal {
    /// Which source fired.
    pub source: TriggerSource,
    /// When it fired. Playback starts from this instant.
    pub observed_at: Instant,
}

impl TriggerSignal {
    /// Create a signal.
    pub const fn new(source: TriggerSource, observed_at: Instant) -> Self {
        Self {
            source,
            observed_at,
        }
    }
}

/// What the controller reports back to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntranceEvent {
    /// A trigger was accepted and the sequence started.
    Triggered(TriggerSource),
    /// The final state is in place.
    Committed {
        /// `false` when the final state was written directly (reduced motion,
        /// or a sequence that could not be resolved).
        animated: bool,
    },
}

/// Supplies the entrance sequence and its endpoint states.
///
/// `initial_state` is written at mount, `final_state` when motion is not
/// allowed. `build` is called at most once per mounted instance, when the
/// first trigger is accepted.
pub trait SequenceBuilder {
    /// Writes for the hidden, pre-entrance state.
    fn initial_state(&self) -> Vec<Mutation>;

    /// Writes for the final state.
    fn final_state(&self) -> Vec<Mutation>;

    /// Build the steps to play.
    fn build(&mut self) -> Vec<AnimationStep>;

    /// Optional name for debugging/logging.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}

/// A fixed list of steps is its own builder.
impl SequenceBuilder for Vec<AnimationStep> {
    fn initial_state(&self) -> Vec<Mutation> {
        sequence::initial_state(self)
    }

    fn final_state(&self) -> Vec<Mutation> {
        sequence::final_state(self)
    }

    fn build(&mut self) -> Vec<AnimationStep> {
        self.clone()
    }

    fn name(&self) -> &'static str {
        "steps"
    }
}

/// Type alias for owned builder references.
pub type BoxedBuilder = Box<dyn SequenceBuilder>;

/// Timer settings for the fallback sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntranceTimings {
    /// Delay before the second bounding-box poll.
    pub poll_retry_delay: Duration,
    /// Upper bound after which the entrance triggers unconditionally.
    pub safety_timeout: Duration,
}

impl Default for EntranceTimings {
    fn default() -> Self {
        Self {
            poll_retry_delay: Duration::from_millis(100),
            safety_timeout: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Poll,
    Safety,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Instant,
    kind: TimerKind,
}

/// Decides when one subtree's entrance plays, and plays it once.
pub struct EntranceController {
    target: AnimatableTarget,
    builder: BoxedBuilder,
    timings: EntranceTimings,
    state: EntranceState,
    accepted: Option<TriggerSignal>,
    /// Pending fallback timers, ordered by due time.
    timers: Vec<Timer>,
    playback: Option<PlayHandle>,
    unmounted: bool,
}

impl EntranceController {
    /// Create an unmounted controller.
    pub fn new(target: AnimatableTarget, builder: BoxedBuilder, timings: EntranceTimings) -> Self {
        Self {
            target,
            builder,
            timings,
            state: EntranceState::Unset,
            accepted: None,
            timers: Vec::new(),
            playback: None,
            unmounted: false,
        }
    }

    /// Mount at `now`.
    ///
    /// With motion disallowed the final state is written directly and the
    /// controller commits. Otherwise the initial state is written and the
    /// poll and safety timers are armed; the first poll is due immediately
    /// and runs on the next [`advance`](Self::advance).
    pub fn mount<G, R>(&mut self, now: Instant, gate: &G, renderer: &mut R) -> Option<EntranceEvent>
    where
        G: MotionPreference + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.unmounted {
            log::warn!("entrance {}: mount after unmount ignored", self.target.root());
            return None;
        }
        if self.state != EntranceState::Unset {
            log::warn!("entrance {} mounted twice", self.target.root());
            return None;
        }

        if !gate.allowed() {
            log::debug!("entrance {} skipped: reduced motion", self.target.root());
            return Some(self.commit_without_animation(renderer));
        }

        for mutation in self.builder.initial_state() {
            renderer.apply(mutation);
        }
        self.state = EntranceState::Initialized;

        self.timers = vec![
            Timer {
                due: now,
                kind: TimerKind::Poll,
            },
            Timer {
                due: now + self.timings.poll_retry_delay,
                kind: TimerKind::Poll,
            },
            Timer {
                due: now + self.timings.safety_timeout,
                kind: TimerKind::Safety,
            },
        ];
        self.timers.sort_by_key(|timer| timer.due);
        None
    }

    /// Offer a trigger. The single guarded entry point for every source.
    ///
    /// Accepted only while `Initialized`; anything else is discarded. The
    /// gate is consulted again here: if motion became disallowed since
    /// mount, the final state is written without building a sequence.
    pub fn signal<G, R>(
        &mut self,
        signal: TriggerSignal,
        gate: &G,
        renderer: &mut R,
    ) -> Option<EntranceEvent>
    where
        G: MotionPreference + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.unmounted || self.state != EntranceState::Initialized {
            log::trace!(
                "entrance {}: discarding {:?} in state {:?}",
                self.target.root(),
                signal.source,
                self.state
            );
            return None;
        }
        self.state = EntranceState::Playing;
        self.accepted = Some(signal);
        self.timers.clear();

        log::debug!(
            "entrance {} ({}) triggered by {:?}",
            self.target.root(),
            self.builder.name(),
            signal.source
        );

        if !gate.allowed() {
            return Some(self.commit_without_animation(renderer));
        }

        let mut handle = match PlayHandle::build(self.builder.build(), signal.observed_at) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("entrance {}: {e}; showing final state", self.target.root());
                return Some(self.commit_without_animation(renderer));
            }
        };

        if handle.tick(signal.observed_at, renderer) {
            self.commit();
            return Some(EntranceEvent::Committed { animated: true });
        }
        self.playback = Some(handle);
        Some(EntranceEvent::Triggered(signal.source))
    }

    /// Forward a visibility transition from the tracker.
    pub fn on_visibility<G, R>(
        &mut self,
        in_view: bool,
        now: Instant,
        gate: &G,
        renderer: &mut R,
    ) -> Option<EntranceEvent>
    where
        G: MotionPreference + ?Sized,
        R: Renderer + ?Sized,
    {
        if !in_view {
            return None;
        }
        self.signal(TriggerSignal::new(TriggerSource::Observer, now), gate, renderer)
    }

    /// Run due timers and advance a playing sequence to `now`.
    ///
    /// Overdue timers fire in due order, each stamped with its own due time,
    /// so a late frame still starts playback from the moment the trigger
    /// should have happened.
    pub fn advance<P, G, R>(
        &mut self,
        now: Instant,
        probe: &P,
        gate: &G,
        renderer: &mut R,
    ) -> Option<EntranceEvent>
    where
        P: LayoutProbe + ?Sized,
        G: MotionPreference + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.unmounted {
            return None;
        }
        let mut event = None;

        while self.state == EntranceState::Initialized {
            let Some(timer) = self.timers.first().copied() else {
                break;
            };
            if timer.due > now {
                break;
            }
            let _ = self.timers.remove(0);

            let source = match timer.kind {
                TimerKind::Poll if self.root_on_screen(probe) => TriggerSource::PollFallback,
                TimerKind::Poll => continue,
                TimerKind::Safety => {
                    log::debug!("entrance {}: safety timeout reached", self.target.root());
                    TriggerSource::SafetyTimeout
                }
            };
            event = self
                .signal(TriggerSignal::new(source, timer.due), gate, renderer)
                .or(event);
        }

        if self.state == EntranceState::Playing {
            if let Some(handle) = self.playback.as_mut() {
                if handle.tick(now, renderer) {
                    self.commit();
                    event = Some(EntranceEvent::Committed { animated: true });
                }
            }
        }
        event
    }

    /// Cancel timers and any running sequence. Nothing is written afterwards
    /// and the controller never commits.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.timers.clear();
        if let Some(mut handle) = self.playback.take() {
            handle.cancel();
        }
        log::trace!("entrance {} unmounted in state {:?}", self.target.root(), self.state);
    }

    /// Current state.
    pub fn state(&self) -> EntranceState {
        self.state
    }

    /// The signal that won the race, if any.
    pub fn accepted(&self) -> Option<TriggerSignal> {
        self.accepted
    }

    /// The animated subtree.
    pub fn target(&self) -> &AnimatableTarget {
        &self.target
    }

    /// Whether the controller has been unmounted.
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Earliest pending timer, for hosts that schedule wake-ups.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.first().map(|timer| timer.due)
    }

    /// Whether a sequence is currently playing.
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    fn root_on_screen<P: LayoutProbe + ?Sized>(&self, probe: &P) -> bool {
        probe
            .bounding_rect(self.target.root())
            .and_then(|rect| rect.intersection(&probe.viewport()))
            .is_some_and(|overlap| overlap.area() > 0.0)
    }

    fn commit(&mut self) {
        self.state = EntranceState::Committed;
        self.playback = None;
        log::debug!("entrance {} committed", self.target.root());
    }

    fn commit_without_animation<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
    ) -> EntranceEvent {
        for mutation in self.builder.final_state() {
            renderer.apply(mutation);
        }
        self.commit();
        EntranceEvent::Committed { animated: false }
    }
}

impl std::fmt::Debug for EntranceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntranceController")
            .field("target", &self.target)
            .field("builder", &self.builder.name())
            .field("state", &self.state)
            .field("accepted", &self.accepted)
            .field("pending_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::motion::preference::{FixedPreference, PreferenceCell};
    use crate::motion::target::{NodeId, Property};
    use crate::util::easing::EasingFunction;
    use crate::util::geometry::Rect;

    struct CountingBuilder {
        steps: Vec<AnimationStep>,
        builds: Rc<Cell<u32>>,
    }

    impl SequenceBuilder for CountingBuilder {
        fn initial_state(&self) -> Vec<Mutation> {
            sequence::initial_state(&self.steps)
        }

        fn final_state(&self) -> Vec<Mutation> {
            sequence::final_state(&self.steps)
        }

        fn build(&mut self) -> Vec<AnimationStep> {
            self.builds.set(self.builds.get() + 1);
            self.steps.clone()
        }
    }

    struct Page {
        root: Option<Rect>,
    }

    impl LayoutProbe for Page {
        fn bounding_rect(&self, _node: NodeId) -> Option<Rect> {
            self.root
        }

        fn viewport(&self) -> Rect {
            Rect::new(0.0, 0.0, 1280.0, 800.0)
        }
    }

    const OFFSCREEN: Page = Page {
        root: Some(Rect::new(0.0, 3000.0, 600.0, 300.0)),
    };
    const ONSCREEN: Page = Page {
        root: Some(Rect::new(0.0, 200.0, 600.0, 300.0)),
    };

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn controller(duration: u64) -> (EntranceController, Rc<Cell<u32>>) {
        let builds = Rc::new(Cell::new(0));
        let steps = vec![AnimationStep::new(AnimatableTarget::Node(NodeId(1)), ms(duration))
            .animate(Property::Opacity, 0.0, 1.0)
            .animate(Property::TranslateY, 40.0, 0.0)
            .ease(EasingFunction::Linear)];
        let builder = CountingBuilder {
            steps,
            builds: Rc::clone(&builds),
        };
        (
            EntranceController::new(
                AnimatableTarget::Node(NodeId(1)),
                Box::new(builder),
                EntranceTimings::default(),
            ),
            builds,
        )
    }

    #[test]
    fn mount_applies_initial_state() {
        let (mut entrance, _) = controller(600);
        let mut writes: Vec<Mutation> = Vec::new();
        assert_eq!(entrance.mount(Instant::now(), &FixedPreference::ALLOW, &mut writes), None);
        assert_eq!(entrance.state(), EntranceState::Initialized);
        let values: Vec<f32> = writes.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![0.0, 40.0]);
    }

    #[test]
    fn reduced_motion_writes_final_state_directly() {
        let (mut entrance, builds) = controller(600);
        let t0 = Instant::now();
        let mut writes: Vec<Mutation> = Vec::new();

        let event = entrance.mount(t0, &FixedPreference::DENY, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: false }));
        assert_eq!(entrance.state(), EntranceState::Committed);
        let values: Vec<f32> = writes.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![1.0, 0.0]);

        // Nothing else ever happens for this instance.
        let _ = entrance.on_visibility(true, t0, &FixedPreference::ALLOW, &mut writes);
        let _ = entrance.advance(t0 + ms(2000), &ONSCREEN, &FixedPreference::ALLOW, &mut writes);
        assert_eq!(builds.get(), 0);
        assert_eq!(writes.len(), 2);
    }

    #[test]
    fn unknown_preference_counts_as_reduced_motion() {
        let (mut entrance, _) = controller(600);
        let mut writes: Vec<Mutation> = Vec::new();
        let gate = PreferenceCell::unknown();
        let event = entrance.mount(Instant::now(), &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: false }));
    }

    #[test]
    fn every_source_ordering_builds_exactly_once() {
        let orders = [
            [TriggerSource::Observer, TriggerSource::PollFallback, TriggerSource::SafetyTimeout],
            [TriggerSource::Observer, TriggerSource::SafetyTimeout, TriggerSource::PollFallback],
            [TriggerSource::PollFallback, TriggerSource::Observer, TriggerSource::SafetyTimeout],
            [TriggerSource::PollFallback, TriggerSource::SafetyTimeout, TriggerSource::Observer],
            [TriggerSource::SafetyTimeout, TriggerSource::Observer, TriggerSource::PollFallback],
            [TriggerSource::SafetyTimeout, TriggerSource::PollFallback, TriggerSource::Observer],
        ];
        for order in orders {
            let (mut entrance, builds) = controller(600);
            let t0 = Instant::now();
            let gate = FixedPreference::ALLOW;
            let mut writes: Vec<Mutation> = Vec::new();
            let _ = entrance.mount(t0, &gate, &mut writes);

            // All three arrive in the same turn.
            let events: Vec<_> = order
                .iter()
                .map(|source| entrance.signal(TriggerSignal::new(*source, t0), &gate, &mut writes))
                .collect();

            assert_eq!(builds.get(), 1, "order {order:?}");
            assert_eq!(events[0], Some(EntranceEvent::Triggered(order[0])));
            assert_eq!(events[1], None);
            assert_eq!(events[2], None);
            assert_eq!(entrance.accepted().map(|s| s.source), Some(order[0]));

            // Timers were cancelled by the accepted trigger.
            assert_eq!(entrance.next_deadline(), None);
            let _ = entrance.advance(t0 + ms(5000), &ONSCREEN, &gate, &mut writes);
            assert_eq!(builds.get(), 1);
            assert_eq!(entrance.state(), EntranceState::Committed);
        }
    }

    #[test]
    fn poll_on_mount_triggers_when_already_visible() {
        let (mut entrance, _) = controller(600);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);

        let event = entrance.advance(t0, &ONSCREEN, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Triggered(TriggerSource::PollFallback)));
        assert_eq!(entrance.state(), EntranceState::Playing);
    }

    #[test]
    fn poll_retry_catches_late_layout() {
        let (mut entrance, _) = controller(600);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);

        assert_eq!(entrance.advance(t0, &OFFSCREEN, &gate, &mut writes), None);
        assert_eq!(entrance.advance(t0 + ms(50), &ONSCREEN, &gate, &mut writes), None);

        let event = entrance.advance(t0 + ms(100), &ONSCREEN, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Triggered(TriggerSource::PollFallback)));
        assert_eq!(entrance.accepted().map(|s| s.observed_at), Some(t0 + ms(100)));
    }

    #[test]
    fn zero_size_root_never_passes_the_poll() {
        let (mut entrance, _) = controller(600);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);

        let collapsed = Page {
            root: Some(Rect::new(0.0, 100.0, 600.0, 0.0)),
        };
        assert_eq!(entrance.advance(t0 + ms(150), &collapsed, &gate, &mut writes), None);
        assert_eq!(entrance.state(), EntranceState::Initialized);
    }

    #[test]
    fn safety_timeout_commits_when_nothing_else_fires() {
        let (mut entrance, builds) = controller(300);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let detached = Page { root: None };
        let _ = entrance.mount(t0, &gate, &mut writes);

        assert_eq!(entrance.advance(t0 + ms(499), &detached, &gate, &mut writes), None);
        assert_eq!(entrance.state(), EntranceState::Initialized);

        let event = entrance.advance(t0 + ms(500), &detached, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Triggered(TriggerSource::SafetyTimeout)));

        let event = entrance.advance(t0 + ms(800), &detached, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: true }));
        assert_eq!(builds.get(), 1);
    }

    #[test]
    fn overdue_timers_fire_in_due_order() {
        let (mut entrance, _) = controller(300);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);

        // A frame that arrives very late: the mount poll wins, and playback
        // started at mount so it has already finished.
        let event = entrance.advance(t0 + ms(1000), &ONSCREEN, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: true }));
        assert_eq!(entrance.accepted(), Some(TriggerSignal::new(TriggerSource::PollFallback, t0)));
    }

    #[test]
    fn unmount_before_trigger_prevents_all_writes() {
        let (mut entrance, builds) = controller(300);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);
        let after_mount = writes.len();

        entrance.unmount();
        let _ = entrance.on_visibility(true, t0 + ms(10), &gate, &mut writes);
        let _ = entrance.advance(t0 + ms(2000), &ONSCREEN, &gate, &mut writes);

        assert_eq!(writes.len(), after_mount);
        assert_eq!(builds.get(), 0);
        assert_eq!(entrance.state(), EntranceState::Initialized);
    }

    #[test]
    fn unmount_mid_sequence_aborts_without_commit() {
        let (mut entrance, _) = controller(600);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);
        let _ = entrance.on_visibility(true, t0, &gate, &mut writes);
        let _ = entrance.advance(t0 + ms(200), &ONSCREEN, &gate, &mut writes);
        let before = writes.len();

        entrance.unmount();
        entrance.unmount();
        assert_eq!(entrance.advance(t0 + ms(1000), &ONSCREEN, &gate, &mut writes), None);

        assert_eq!(writes.len(), before);
        assert_eq!(entrance.state(), EntranceState::Playing);
        assert!(!entrance.is_playing());
    }

    #[test]
    fn mount_after_unmount_is_ignored() {
        let (mut entrance, builds) = controller(300);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();

        entrance.unmount();
        assert_eq!(entrance.mount(t0, &gate, &mut writes), None);
        assert_eq!(entrance.advance(t0 + ms(2000), &ONSCREEN, &gate, &mut writes), None);

        assert!(writes.is_empty());
        assert_eq!(builds.get(), 0);
        assert_eq!(entrance.state(), EntranceState::Unset);
        assert_eq!(entrance.next_deadline(), None);
    }

    #[test]
    fn second_mount_keeps_the_first() {
        let (mut entrance, _) = controller(300);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);
        let after_mount = writes.len();
        let deadline = entrance.next_deadline();

        assert_eq!(entrance.mount(t0 + ms(50), &gate, &mut writes), None);
        assert_eq!(writes.len(), after_mount);
        assert_eq!(entrance.state(), EntranceState::Initialized);
        assert_eq!(entrance.next_deadline(), deadline);
    }

    #[test]
    fn preference_change_before_trigger_snaps_to_final() {
        let (mut entrance, builds) = controller(600);
        let t0 = Instant::now();
        let gate = PreferenceCell::with_reduced_motion(false);
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);

        gate.set_reduced_motion(true);
        let event = entrance.on_visibility(true, t0 + ms(50), &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: false }));
        assert_eq!(builds.get(), 0);
        assert_eq!(writes.last().map(|m| m.value), Some(0.0));
    }

    #[test]
    fn unresolvable_sequence_still_shows_content() {
        let node = AnimatableTarget::Node(NodeId(1));
        let steps = vec![
            AnimationStep::new(node.clone(), ms(100)).animate(Property::Opacity, 0.0, 1.0),
            AnimationStep::new(node.clone(), ms(100))
                .animate(Property::Scale, 0.9, 1.0)
                .offset(sequence::StepOffset::After(-500)),
        ];
        let timings = EntranceTimings::default();
        let mut entrance = EntranceController::new(node, Box::new(steps), timings);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);

        let event = entrance.on_visibility(true, t0, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: false }));
        assert_eq!(entrance.state(), EntranceState::Committed);
    }

    #[test]
    fn zero_length_sequence_commits_on_trigger() {
        let (mut entrance, _) = controller(0);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let _ = entrance.mount(t0, &gate, &mut writes);
        let event = entrance.on_visibility(true, t0, &gate, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: true }));
    }

    #[test]
    fn states_only_move_forward() {
        assert!(EntranceState::Unset < EntranceState::Initialized);
        assert!(EntranceState::Initialized < EntranceState::Playing);
        assert!(EntranceState::Playing < EntranceState::Committed);

        let (mut entrance, _) = controller(100);
        let t0 = Instant::now();
        let gate = FixedPreference::ALLOW;
        let mut writes: Vec<Mutation> = Vec::new();
        let mut seen = vec![entrance.state()];
        let _ = entrance.mount(t0, &gate, &mut writes);
        seen.push(entrance.state());
        for step in 0..20_u64 {
            let _ = entrance.advance(t0 + ms(step * 50), &ONSCREEN, &gate, &mut writes);
            seen.push(entrance.state());
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(entrance.mount(t0, &gate, &mut writes), None);
        assert_eq!(seen.last(), Some(&EntranceState::Committed));
    }
}
