//! Reduced-motion gate.
//!
//! The gate is a capability queried at every decision point (initial state,
//! entrance trigger, ambient registration). Implementations must not cache:
//! the OS setting can change while the page is open. When the preference
//! cannot be determined the gate answers "not allowed".

use std::cell::Cell;
use std::rc::Rc;

/// Answers "is non-essential animation allowed right now?".
pub trait MotionPreference {
    /// Whether animation is allowed. Unknown preference means `false`.
    fn allowed(&self) -> bool;
}

/// Type alias for shared gate references.
pub type SharedPreference = Rc<dyn MotionPreference>;

/// Create a shared gate from any MotionPreference implementation.
pub fn shared<P: MotionPreference + 'static>(preference: P) -> SharedPreference {
    Rc::new(preference)
}

/// A gate with a constant answer. Useful for server rendering and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPreference {
    /// The constant answer.
    pub allowed: bool,
}

impl FixedPreference {
    /// Motion always allowed.
    pub const ALLOW: FixedPreference = FixedPreference { allowed: true };
    /// Motion never allowed.
    pub const DENY: FixedPreference = FixedPreference { allowed: false };
}

impl MotionPreference for FixedPreference {
    fn allowed(&self) -> bool {
        self.allowed
    }
}

/// A gate whose reduced-motion flag is pushed in by the host.
///
/// Starts unknown (motion disallowed) until the host reports the setting,
/// e.g. from a media-query change listener.
#[derive(Debug, Default)]
pub struct PreferenceCell {
    reduce_motion: Cell<Option<bool>>,
}

impl PreferenceCell {
    /// A cell whose preference is not yet known.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// A cell with a known reduced-motion flag.
    pub fn with_reduced_motion(reduce: bool) -> Self {
        Self {
            reduce_motion: Cell::new(Some(reduce)),
        }
    }

    /// Record the user's reduced-motion setting.
    pub fn set_reduced_motion(&self, reduce: bool) {
        self.reduce_motion.set(Some(reduce));
    }

    /// Forget the setting (the query became unavailable).
    pub fn clear(&self) {
        self.reduce_motion.set(None);
    }
}

impl MotionPreference for PreferenceCell {
    fn allowed(&self) -> bool {
        self.reduce_motion.get() == Some(false)
    }
}

/// A gate backed by a live query returning the reduced-motion flag, or `None`
/// when the platform cannot answer.
pub struct QueryPreference<F> {
    query: F,
}

impl<F: Fn() -> Option<bool>> QueryPreference<F> {
    /// Wrap a reduced-motion query.
    pub fn new(query: F) -> Self {
        Self { query }
    }
}

impl<F: Fn() -> Option<bool>> MotionPreference for QueryPreference<F> {
    fn allowed(&self) -> bool {
        (self.query)() == Some(false)
    }
}

impl<F> std::fmt::Debug for QueryPreference<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPreference").finish_non_exhaustive()
    }
}
