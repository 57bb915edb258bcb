use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::util::easing::EasingFunction;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Entrance", inline)]
#[serde(default)]
/// Shape of the preset entrance sequences.
pub struct EntranceOptions {
    /// Duration of each step.
    #[schemars(title = "Duration (ms)", range(min = 0, max = 5000), extend("step" = 50))]
    pub duration_ms: u64,
    /// Easing id, e.g. `"power3.out"`.
    #[schemars(title = "Ease", with = "String")]
    pub ease: EasingFunction,
    /// Distance elements rise from, in pixels.
    #[schemars(title = "Distance (px)", range(min = 0.0, max = 200.0), extend("step" = 1.0))]
    pub distance_px: f32,
    /// How far each step overlaps the end of the one before it.
    #[schemars(title = "Overlap (ms)", range(min = 0, max = 5000), extend("step" = 50))]
    pub overlap_ms: u64,
    /// Delay between staggered items.
    #[schemars(title = "Stagger (ms)", range(min = 0, max = 1000), extend("step" = 10))]
    pub stagger_ms: u64,
}

impl Default for EntranceOptions {
    fn default() -> Self {
        Self {
            duration_ms: 800,
            ease: EasingFunction::PowerOut(3),
            distance_px: 40.0,
            overlap_ms: 400,
            stagger_ms: 100,
        }
    }
}

impl EntranceOptions {
    /// Step duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Step overlap.
    pub fn overlap(&self) -> Duration {
        Duration::from_millis(self.overlap_ms)
    }

    /// Item stagger interval.
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}
