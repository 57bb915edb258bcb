//! Viewport visibility tracking for one subtree root.
//!
//! The host pushes geometry changes (mount, scroll, resize, DOM attachment) by
//! calling [`VisibilityTracker::observe`]; the tracker reports `inView`
//! transitions. Attaching to a root that does not exist yet is a no-op the
//! caller retries once the node is available.

use super::target::{LayoutProbe, NodeId};
use crate::util::geometry::{is_intersecting, RootMargin};

/// Observer configuration: fraction visible plus a viewport margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverConfig {
    /// Fraction of the element that must be visible, 0.0 to 1.0.
    pub threshold: f32,
    /// Margin added to the viewport bounds before testing.
    pub root_margin: RootMargin,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::default(),
        }
    }
}

/// Tracks whether one root is inside the (margin-grown) viewport.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    config: ObserverConfig,
    root: Option<NodeId>,
    in_view: bool,
}

impl VisibilityTracker {
    /// Create a detached tracker.
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            root: None,
            in_view: false,
        }
    }

    /// Start tracking `root`.
    ///
    /// `None` (ref not assigned yet) leaves the tracker detached and returns
    /// `false`; call again once the node exists. Re-attaching to a different
    /// root resets `in_view`.
    pub fn attach(&mut self, root: Option<NodeId>) -> bool {
        let Some(root) = root else {
            log::trace!("visibility attach deferred: root not mounted");
            return false;
        };
        if self.root != Some(root) {
            self.root = Some(root);
            self.in_view = false;
        }
        true
    }

    /// Stop all updates. Safe to call any number of times.
    pub fn detach(&mut self) {
        self.root = None;
    }

    /// Whether a root is attached.
    pub fn is_attached(&self) -> bool {
        self.root.is_some()
    }

    /// The attached root.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Last computed visibility. `false` until the first positive observation.
    pub fn in_view(&self) -> bool {
        self.in_view
    }

    /// Observer configuration.
    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// Recompute visibility from current geometry.
    ///
    /// Returns the new value when it changed, `None` when unchanged or
    /// detached. A root without layout counts as out of view.
    pub fn observe<P: LayoutProbe + ?Sized>(&mut self, probe: &P) -> Option<bool> {
        let root = self.root?;
        let visible = probe.bounding_rect(root).is_some_and(|rect| {
            is_intersecting(
                &rect,
                &probe.viewport(),
                &self.config.root_margin,
                self.config.threshold,
            )
        });
        if visible == self.in_view {
            return None;
        }
        self.in_view = visible;
        log::trace!("{root} in_view -> {visible}");
        Some(visible)
    }
}
