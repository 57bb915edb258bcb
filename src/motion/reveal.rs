//! One mounted section ([`Reveal`]) and the page-wide collection of them
//! ([`RevealStage`]).
//!
//! A reveal wires the visibility tracker into both controllers: `inView`
//! edges trigger the entrance and pause/resume ambient loops. Ambient loops
//! are registered once the entrance has committed.

use rustc_hash::FxHashMap;
use web_time::Instant;

use super::ambient::{AmbientMotionController, LoopSpec};
use super::entrance::{BoxedBuilder, EntranceController, EntranceEvent, EntranceState};
use super::preference::SharedPreference;
use super::target::{AnimatableTarget, LayoutProbe, NodeId, Renderer};
use super::visibility::VisibilityTracker;
use crate::options::TriggerOptions;

/// Visibility, entrance and ambient motion for one mounted subtree.
pub struct Reveal {
    root: NodeId,
    tracker: VisibilityTracker,
    entrance: EntranceController,
    ambient: AmbientMotionController,
    /// Loops registered once the entrance commits.
    pending_loops: Vec<(AnimatableTarget, LoopSpec)>,
    gate: SharedPreference,
}

impl Reveal {
    /// A reveal for the subtree under `root`, not yet mounted.
    pub fn new(
        root: NodeId,
        builder: BoxedBuilder,
        options: &TriggerOptions,
        gate: SharedPreference,
    ) -> Self {
        Self {
            root,
            tracker: VisibilityTracker::new(options.observer_config()),
            entrance: EntranceController::new(
                AnimatableTarget::Node(root),
                builder,
                options.timings(),
            ),
            ambient: AmbientMotionController::new(false),
            pending_loops: Vec::new(),
            gate,
        }
    }

    /// Add an ambient loop to run after the entrance.
    #[must_use]
    pub fn with_loop(mut self, target: AnimatableTarget, spec: LoopSpec) -> Self {
        self.pending_loops.push((target, spec));
        self
    }

    /// Mount: apply the initial state, start observing and run the first
    /// poll.
    pub fn mount<P, R>(
        &mut self,
        now: Instant,
        probe: &P,
        renderer: &mut R,
    ) -> Option<EntranceEvent>
    where
        P: LayoutProbe + ?Sized,
        R: Renderer + ?Sized,
    {
        let _ = self.tracker.attach(Some(self.root));
        let mounted = self.entrance.mount(now, &*self.gate, renderer);
        self.start_loops_on_commit(EntranceState::Unset, now);
        self.frame(now, probe, renderer).or(mounted)
    }

    /// Process one frame: geometry changes, due timers, playback and loops.
    pub fn frame<P, R>(
        &mut self,
        now: Instant,
        probe: &P,
        renderer: &mut R,
    ) -> Option<EntranceEvent>
    where
        P: LayoutProbe + ?Sized,
        R: Renderer + ?Sized,
    {
        let before = self.entrance.state();
        let mut event = None;

        if let Some(in_view) = self.tracker.observe(probe) {
            event = self
                .entrance
                .on_visibility(in_view, now, &*self.gate, renderer)
                .or(event);
            self.ambient.on_visibility(in_view, now);
        }
        event = self
            .entrance
            .advance(now, probe, &*self.gate, renderer)
            .or(event);

        self.start_loops_on_commit(before, now);
        self.ambient.tick(now, &*self.gate, renderer);
        event
    }

    /// Re-check the gate after a platform preference change.
    pub fn on_preference_change<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.ambient.on_preference_change(&*self.gate, renderer);
    }

    /// Cancel everything. No writes happen after this returns.
    pub fn unmount(&mut self) {
        self.tracker.detach();
        self.entrance.unmount();
        self.ambient.unmount();
        self.pending_loops.clear();
    }

    /// Subtree root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Entrance state.
    pub fn state(&self) -> EntranceState {
        self.entrance.state()
    }

    /// Entrance controller.
    pub fn entrance(&self) -> &EntranceController {
        &self.entrance
    }

    /// Ambient controller.
    pub fn ambient(&self) -> &AmbientMotionController {
        &self.ambient
    }

    /// Visibility tracker.
    pub fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    fn start_loops_on_commit(&mut self, before: EntranceState, now: Instant) {
        if before == EntranceState::Committed
            || self.entrance.state() != EntranceState::Committed
        {
            return;
        }
        for (target, spec) in self.pending_loops.drain(..) {
            let _ = self.ambient.manage(target, spec, now, &*self.gate);
        }
    }
}

impl std::fmt::Debug for Reveal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reveal")
            .field("root", &self.root)
            .field("entrance", &self.entrance)
            .field("in_view", &self.tracker.in_view())
            .field("loops", &self.ambient.running())
            .finish_non_exhaustive()
    }
}

/// Every mounted reveal on a page, keyed by subtree root.
pub struct RevealStage {
    reveals: FxHashMap<NodeId, Reveal>,
    options: TriggerOptions,
    gate: SharedPreference,
}

impl RevealStage {
    /// An empty stage sharing one gate and one set of trigger options.
    pub fn new(options: TriggerOptions, gate: SharedPreference) -> Self {
        Self {
            reveals: FxHashMap::default(),
            options,
            gate,
        }
    }

    /// A reveal configured with the stage's options and gate, for
    /// [`insert`](Self::insert).
    pub fn create(&self, root: NodeId, builder: BoxedBuilder) -> Reveal {
        Reveal::new(root, builder, &self.options, self.gate.clone())
    }

    /// Mount `reveal`, replacing (and unmounting) any reveal on the same root.
    pub fn insert<P, R>(
        &mut self,
        mut reveal: Reveal,
        now: Instant,
        probe: &P,
        renderer: &mut R,
    ) -> Option<EntranceEvent>
    where
        P: LayoutProbe + ?Sized,
        R: Renderer + ?Sized,
    {
        if let Some(mut previous) = self.reveals.remove(&reveal.root()) {
            log::debug!("replacing reveal on {}", previous.root());
            previous.unmount();
        }
        let event = reveal.mount(now, probe, renderer);
        let _ = self.reveals.insert(reveal.root(), reveal);
        event
    }

    /// Unmount and drop the reveal on `root`. Returns whether one existed.
    pub fn remove(&mut self, root: NodeId) -> bool {
        let Some(mut reveal) = self.reveals.remove(&root) else {
            return false;
        };
        reveal.unmount();
        true
    }

    /// Run one frame for every reveal. Events are ordered by root.
    pub fn frame<P, R>(
        &mut self,
        now: Instant,
        probe: &P,
        renderer: &mut R,
    ) -> Vec<(NodeId, EntranceEvent)>
    where
        P: LayoutProbe + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut events: Vec<_> = self
            .reveals
            .values_mut()
            .filter_map(|reveal| {
                reveal
                    .frame(now, probe, renderer)
                    .map(|event| (reveal.root(), event))
            })
            .collect();
        events.sort_by_key(|(root, _)| *root);
        events
    }

    /// Forward a preference change to every reveal.
    pub fn on_preference_change<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for reveal in self.reveals.values_mut() {
            reveal.on_preference_change(renderer);
        }
    }

    /// Unmount everything.
    pub fn clear(&mut self) {
        for (_, mut reveal) in self.reveals.drain() {
            reveal.unmount();
        }
    }

    /// The reveal on `root`.
    pub fn get(&self, root: NodeId) -> Option<&Reveal> {
        self.reveals.get(&root)
    }

    /// Number of mounted reveals.
    pub fn len(&self) -> usize {
        self.reveals.len()
    }

    /// Whether nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.reveals.is_empty()
    }
}

impl std::fmt::Debug for RevealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealStage")
            .field("reveals", &self.reveals.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use web_time::Duration;

    use super::*;
    use crate::motion::entrance::TriggerSource;
    use crate::motion::preference::{self, FixedPreference, PreferenceCell};
    use crate::motion::presets::EntrancePreset;
    use crate::motion::target::{Mutation, Property};
    use crate::options::EntranceOptions;
    use crate::util::geometry::Rect;

    struct Page {
        scroll: f32,
    }

    impl LayoutProbe for Page {
        fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
            // Sections stacked 1000px apart.
            let top = node.0 as f32 * 1000.0 - self.scroll;
            Some(Rect::new(0.0, top, 1280.0, 600.0))
        }

        fn viewport(&self) -> Rect {
            Rect::new(0.0, 0.0, 1280.0, 800.0)
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn section(root: u64) -> BoxedBuilder {
        Box::new(
            EntrancePreset::new(EntranceOptions::default())
                .header(AnimatableTarget::Node(NodeId(root))),
        )
    }

    #[test]
    fn scrolling_into_view_reveals_then_starts_loops() {
        let t0 = Instant::now();
        let gate = preference::shared(FixedPreference::ALLOW);
        let mut reveal = Reveal::new(NodeId(2), section(2), &TriggerOptions::default(), gate)
            .with_loop(AnimatableTarget::Node(NodeId(2)), LoopSpec::glow());
        let mut writes: Vec<Mutation> = Vec::new();

        assert_eq!(reveal.mount(t0, &Page { scroll: 0.0 }, &mut writes), None);
        assert_eq!(reveal.state(), EntranceState::Initialized);

        let event = reveal.frame(t0 + ms(200), &Page { scroll: 1500.0 }, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Triggered(TriggerSource::Observer)));
        assert_eq!(reveal.ambient().running(), 0);

        let event = reveal.frame(t0 + ms(1000), &Page { scroll: 1500.0 }, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: true }));
        assert_eq!(reveal.ambient().running(), 1);
        assert!(reveal.ambient().in_view());
        assert_eq!(writes.last().map(|m| m.property), Some(Property::Glow));
    }

    #[test]
    fn reduced_motion_reveal_commits_at_mount_without_loops() {
        let t0 = Instant::now();
        let gate = preference::shared(FixedPreference::DENY);
        let mut reveal = Reveal::new(NodeId(1), section(1), &TriggerOptions::default(), gate)
            .with_loop(AnimatableTarget::Node(NodeId(1)), LoopSpec::breathing());
        let mut writes: Vec<Mutation> = Vec::new();

        let event = reveal.mount(t0, &Page { scroll: 0.0 }, &mut writes);
        assert_eq!(event, Some(EntranceEvent::Committed { animated: false }));
        assert_eq!(reveal.ambient().running(), 0);

        let count = writes.len();
        let _ = reveal.frame(t0 + ms(5000), &Page { scroll: 0.0 }, &mut writes);
        assert_eq!(writes.len(), count);
    }

    #[test]
    fn off_screen_reveal_still_commits_via_safety_timeout() {
        let t0 = Instant::now();
        let gate = preference::shared(FixedPreference::ALLOW);
        let mut reveal = Reveal::new(NodeId(5), section(5), &TriggerOptions::default(), gate);
        let mut writes: Vec<Mutation> = Vec::new();
        let page = Page { scroll: 0.0 };

        let _ = reveal.mount(t0, &page, &mut writes);
        let _ = reveal.frame(t0 + ms(500), &page, &mut writes);
        assert_eq!(reveal.state(), EntranceState::Playing);
        let _ = reveal.frame(t0 + ms(1300), &page, &mut writes);
        assert_eq!(reveal.state(), EntranceState::Committed);
    }

    #[test]
    fn stage_replaces_and_removes_by_root() {
        let t0 = Instant::now();
        let mut stage = RevealStage::new(
            TriggerOptions::default(),
            preference::shared(FixedPreference::ALLOW),
        );
        let mut writes: Vec<Mutation> = Vec::new();
        let page = Page { scroll: 0.0 };

        for root in [0, 3] {
            let reveal = stage.create(NodeId(root), section(root));
            let _ = stage.insert(reveal, t0, &page, &mut writes);
        }
        assert_eq!(stage.len(), 2);
        assert_eq!(stage.get(NodeId(0)).map(Reveal::state), Some(EntranceState::Playing));

        let replacement = stage.create(NodeId(3), section(3));
        let _ = stage.insert(replacement, t0, &page, &mut writes);
        assert_eq!(stage.len(), 2);

        assert!(stage.remove(NodeId(3)));
        assert!(!stage.remove(NodeId(3)));

        let events = stage.frame(t0 + ms(1000), &page, &mut writes);
        assert_eq!(events, vec![(NodeId(0), EntranceEvent::Committed { animated: true })]);

        stage.clear();
        assert!(stage.is_empty());
    }

    #[test]
    fn stage_preference_change_stops_loops() {
        let t0 = Instant::now();
        let cell = Rc::new(PreferenceCell::with_reduced_motion(false));
        let mut stage = RevealStage::new(TriggerOptions::default(), cell.clone());
        let mut writes: Vec<Mutation> = Vec::new();
        let page = Page { scroll: 0.0 };

        let reveal = stage
            .create(NodeId(0), section(0))
            .with_loop(AnimatableTarget::Node(NodeId(0)), LoopSpec::floating());
        let _ = stage.insert(reveal, t0, &page, &mut writes);
        let _ = stage.frame(t0 + ms(900), &page, &mut writes);
        assert_eq!(stage.get(NodeId(0)).map(|r| r.ambient().running()), Some(1));

        cell.set_reduced_motion(true);
        stage.on_preference_change(&mut writes);
        assert_eq!(stage.get(NodeId(0)).map(|r| r.ambient().running()), Some(0));
        assert_eq!(writes.last().map(|m| m.value), Some(0.0));
    }

    #[test]
    fn frames_alone_stop_loops_after_reduced_motion() {
        let t0 = Instant::now();
        let cell = Rc::new(PreferenceCell::with_reduced_motion(false));
        let options = TriggerOptions::default();
        let mut reveal = Reveal::new(NodeId(0), section(0), &options, cell.clone())
            .with_loop(AnimatableTarget::Node(NodeId(0)), LoopSpec::floating());
        let mut writes: Vec<Mutation> = Vec::new();
        let page = Page { scroll: 0.0 };
        let _ = reveal.mount(t0, &page, &mut writes);
        let _ = reveal.frame(t0 + ms(900), &page, &mut writes);
        assert_eq!(reveal.ambient().running(), 1);

        // The host never forwards the preference change.
        cell.set_reduced_motion(true);
        writes.clear();
        let _ = reveal.frame(t0 + ms(1500), &page, &mut writes);
        assert_eq!(reveal.ambient().running(), 0);
        assert_eq!(writes.len(), 1);
        assert_eq!((writes[0].property, writes[0].value), (Property::TranslateY, 0.0));

        writes.clear();
        let _ = reveal.frame(t0 + ms(2500), &page, &mut writes);
        assert!(writes.is_empty());
    }

    #[test]
    fn unmounted_reveal_writes_nothing() {
        let t0 = Instant::now();
        let gate = preference::shared(FixedPreference::ALLOW);
        let mut reveal = Reveal::new(NodeId(0), section(0), &TriggerOptions::default(), gate);
        let mut writes: Vec<Mutation> = Vec::new();
        let page = Page { scroll: 0.0 };
        let _ = reveal.mount(t0, &page, &mut writes);
        let _ = reveal.frame(t0 + ms(100), &page, &mut writes);

        reveal.unmount();
        let count = writes.len();
        let _ = reveal.frame(t0 + ms(400), &page, &mut writes);
        let _ = reveal.frame(t0 + ms(2000), &page, &mut writes);
        assert_eq!(writes.len(), count);
        assert!(!reveal.tracker().is_attached());
    }
}
