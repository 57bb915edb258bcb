//! Entrance and ambient motion controllers.
//!
//! - [`preference`]: the reduced-motion gate
//! - [`visibility`]: viewport tracking for one subtree root
//! - [`entrance`]: the once-only entrance state machine
//! - [`sequence`]: step offset resolution and playback
//! - [`ambient`]: looping decorations, paused off screen
//! - [`presets`]: header/content/items entrance sequences
//! - [`reveal`]: one section wired together, and the page-wide stage

pub mod ambient;
pub mod entrance;
pub mod preference;
pub mod presets;
pub mod reveal;
pub mod sequence;
pub mod target;
pub mod visibility;

pub use ambient::{AmbientLoopState, AmbientMotionController, LoopSpec};
pub use entrance::{
    EntranceController, EntranceEvent, EntranceState, SequenceBuilder,
    TriggerSignal, TriggerSource,
};
pub use preference::{MotionPreference, SharedPreference};
pub use reveal::{Reveal, RevealStage};
pub use sequence::{AnimationStep, PlayHandle, Sequence, Stagger, StepOffset};
pub use target::{
    AnimatableTarget, LayoutProbe, Mutation, NodeId, Property, Renderer,
};
pub use visibility::{ObserverConfig, VisibilityTracker};
