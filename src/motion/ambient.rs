//! Continuous decorative loops (breathing, floating, glow, rotation) that
//! only run while their subtree is on screen.
//!
//! Loops accumulate phase from unpaused time only, so a loop that scrolls
//! out of view and back resumes exactly where it stopped. A loop is never
//! started when motion is disallowed, and is torn down (back to its rest
//! value) if the preference flips to reduced motion while it runs.

use web_time::{Duration, Instant};

use super::preference::MotionPreference;
use super::target::{AnimatableTarget, Mutation, Property, PropertyDelta, Renderer};
use crate::util::easing::EasingFunction;

/// Named loop flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// Slow scale pulse.
    Breathing,
    /// Vertical bob.
    Floating,
    /// Glow intensity pulse.
    Glow,
    /// Continuous rotation.
    Rotation,
    /// Anything else.
    Custom,
}

/// One looping property animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSpec {
    /// Flavour, for logging.
    pub kind: LoopKind,
    /// Property range covered by one cycle. `from` is the rest value.
    pub delta: PropertyDelta,
    /// Length of one full cycle.
    pub period: Duration,
    /// Easing within one leg of the cycle.
    pub ease: EasingFunction,
    /// Ping-pong (`from -> to -> from`) instead of wrapping (`from -> to`).
    pub yoyo: bool,
}

impl LoopSpec {
    /// A custom loop.
    pub fn new(property: Property, from: f32, to: f32, period: Duration) -> Self {
        Self {
            kind: LoopKind::Custom,
            delta: PropertyDelta::new(property, from, to),
            period,
            ease: EasingFunction::SineInOut,
            yoyo: true,
        }
    }

    /// Scale pulse, 1.0 to 1.03 over four seconds.
    pub fn breathing() -> Self {
        Self {
            kind: LoopKind::Breathing,
            ..Self::new(Property::Scale, 1.0, 1.03, Duration::from_secs(4))
        }
    }

    /// Vertical bob of 8px over three seconds.
    pub fn floating() -> Self {
        Self {
            kind: LoopKind::Floating,
            ..Self::new(Property::TranslateY, 0.0, -8.0, Duration::from_secs(3))
        }
    }

    /// Glow pulse between 0.3 and 1.0.
    pub fn glow() -> Self {
        Self {
            kind: LoopKind::Glow,
            ..Self::new(Property::Glow, 0.3, 1.0, Duration::from_millis(2500))
        }
    }

    /// One full turn every twenty seconds, linear and wrapping.
    pub fn rotation() -> Self {
        Self {
            kind: LoopKind::Rotation,
            ease: EasingFunction::Linear,
            yoyo: false,
            ..Self::new(Property::Rotation, 0.0, 360.0, Duration::from_secs(20))
        }
    }

    /// Override the period.
    #[must_use]
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Override the easing curve.
    #[must_use]
    pub fn ease(mut self, ease: EasingFunction) -> Self {
        self.ease = ease;
        self
    }

    /// Fraction of a cycle covered after `elapsed` unpaused time.
    pub fn phase(&self, elapsed: Duration) -> f32 {
        if self.period.is_zero() {
            return 0.0;
        }
        (elapsed.as_secs_f64() / self.period.as_secs_f64()).fract() as f32
    }

    /// Property value at cycle fraction `phase`.
    pub fn value_at(&self, phase: f32) -> f32 {
        let t = if self.yoyo {
            1.0 - (2.0 * phase - 1.0).abs()
        } else {
            phase
        };
        self.delta.sample(self.ease.evaluate(t))
    }
}

/// Observable state of one managed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbientLoopState {
    /// Started and not yet stopped.
    pub running: bool,
    /// Running but halted because the subtree is off screen.
    pub paused: bool,
}

/// Handle to a managed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopId(usize);

#[derive(Debug)]
struct ManagedLoop {
    target: AnimatableTarget,
    spec: LoopSpec,
    state: AmbientLoopState,
    elapsed: Duration,
    last_tick: Option<Instant>,
}

impl ManagedLoop {
    /// Fold time since the last tick into `elapsed`.
    fn accumulate(&mut self, now: Instant) {
        if let Some(last) = self.last_tick {
            self.elapsed += now.saturating_duration_since(last);
        }
        self.last_tick = Some(now);
    }

    fn write<R: Renderer + ?Sized>(&self, value: f32, renderer: &mut R) {
        for target in self.target.members() {
            renderer.apply(Mutation {
                target,
                property: self.spec.delta.property,
                value,
            });
        }
    }

    fn stop(&mut self) {
        self.state = AmbientLoopState {
            running: false,
            paused: false,
        };
        self.last_tick = None;
    }
}

/// Runs the ambient loops of one mounted subtree.
#[derive(Debug, Default)]
pub struct AmbientMotionController {
    loops: Vec<ManagedLoop>,
    in_view: bool,
    unmounted: bool,
}

impl AmbientMotionController {
    /// Create a controller whose subtree starts `in_view` or not.
    pub fn new(in_view: bool) -> Self {
        Self {
            in_view,
            ..Self::default()
        }
    }

    /// Start a loop on `target`.
    ///
    /// Returns `None` without creating any loop state when motion is not
    /// allowed or the controller was unmounted. A loop registered while the
    /// subtree is off screen starts paused.
    pub fn manage<G: MotionPreference + ?Sized>(
        &mut self,
        target: AnimatableTarget,
        spec: LoopSpec,
        now: Instant,
        gate: &G,
    ) -> Option<LoopId> {
        if self.unmounted || !gate.allowed() {
            log::debug!("ambient {:?} on {} not started", spec.kind, target.root());
            return None;
        }
        let paused = !self.in_view;
        log::trace!("ambient {:?} on {} started (paused: {paused})", spec.kind, target.root());
        self.loops.push(ManagedLoop {
            target,
            spec,
            state: AmbientLoopState {
                running: true,
                paused,
            },
            elapsed: Duration::ZERO,
            last_tick: (!paused).then_some(now),
        });
        Some(LoopId(self.loops.len() - 1))
    }

    /// Pause on leaving the viewport, resume on entering it.
    pub fn on_visibility(&mut self, in_view: bool, now: Instant) {
        if in_view == self.in_view {
            return;
        }
        self.in_view = in_view;
        for managed in self.loops.iter_mut().filter(|l| l.state.running) {
            if in_view {
                managed.last_tick = Some(now);
            } else {
                managed.accumulate(now);
                managed.last_tick = None;
            }
            managed.state.paused = !in_view;
        }
    }

    /// Advance unpaused loops to `now` and write their values.
    ///
    /// The gate is checked on every tick: once motion is disallowed every
    /// running loop is torn down, as in
    /// [`on_preference_change`](Self::on_preference_change).
    pub fn tick<G, R>(&mut self, now: Instant, gate: &G, renderer: &mut R)
    where
        G: MotionPreference + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.unmounted {
            return;
        }
        if !gate.allowed() {
            self.tear_down(renderer);
            return;
        }
        for managed in &mut self.loops {
            if !managed.state.running || managed.state.paused {
                continue;
            }
            managed.accumulate(now);
            let value = managed.spec.value_at(managed.spec.phase(managed.elapsed));
            managed.write(value, renderer);
        }
    }

    /// Re-check the gate after the platform reported a preference change.
    ///
    /// When motion is no longer allowed every running loop stops and its
    /// target is put back at the rest value.
    pub fn on_preference_change<G, R>(&mut self, gate: &G, renderer: &mut R)
    where
        G: MotionPreference + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.unmounted || gate.allowed() {
            return;
        }
        self.tear_down(renderer);
    }

    fn tear_down<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for managed in self.loops.iter_mut().filter(|l| l.state.running) {
            log::debug!(
                "ambient {:?} on {} stopped: reduced motion",
                managed.spec.kind,
                managed.target.root()
            );
            managed.stop();
            managed.write(managed.spec.delta.from, renderer);
        }
    }

    /// Stop one loop without touching its target.
    pub fn stop(&mut self, id: LoopId) {
        if let Some(managed) = self.loops.get_mut(id.0) {
            managed.stop();
        }
    }

    /// Stop and release every loop. Nothing can be registered afterwards,
    /// and existing [`LoopId`]s resolve to nothing.
    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.loops.clear();
    }

    /// State of a loop.
    pub fn loop_state(&self, id: LoopId) -> Option<AmbientLoopState> {
        self.loops.get(id.0).map(|l| l.state)
    }

    /// Current cycle fraction of a loop.
    pub fn phase(&self, id: LoopId) -> Option<f32> {
        self.loops.get(id.0).map(|l| l.spec.phase(l.elapsed))
    }

    /// Number of running loops.
    pub fn running(&self) -> usize {
        self.loops.iter().filter(|l| l.state.running).count()
    }

    /// Whether the subtree is currently considered on screen.
    pub fn in_view(&self) -> bool {
        self.in_view
    }
}
