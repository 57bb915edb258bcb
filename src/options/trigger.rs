use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::motion::entrance::EntranceTimings;
use crate::motion::visibility::ObserverConfig;
use crate::util::geometry::RootMargin;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Trigger", inline)]
#[serde(default)]
/// When an entrance fires: observer settings plus the fallback timers.
pub struct TriggerOptions {
    /// Fraction of the element that must be visible.
    #[schemars(title = "Threshold", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub threshold: f32,
    /// CSS margin around the viewport, e.g. `"100px"` or `"0px 0px -10%"`.
    #[schemars(title = "Root Margin", with = "String")]
    pub root_margin: RootMargin,
    /// Unconditional trigger after this many milliseconds.
    #[schemars(title = "Safety Timeout (ms)", range(min = 0, max = 10000), extend("step" = 50))]
    pub safety_timeout_ms: u64,
    /// Delay before the second bounding-box poll.
    #[schemars(title = "Poll Retry Delay (ms)", range(min = 0, max = 2000), extend("step" = 10))]
    pub poll_retry_delay_ms: u64,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::default(),
            safety_timeout_ms: 500,
            poll_retry_delay_ms: 100,
        }
    }
}

impl TriggerOptions {
    /// Visibility tracker configuration.
    pub fn observer_config(&self) -> ObserverConfig {
        ObserverConfig {
            threshold: self.threshold,
            root_margin: self.root_margin,
        }
    }

    /// Fallback timer settings.
    pub fn timings(&self) -> EntranceTimings {
        EntranceTimings {
            poll_retry_delay: Duration::from_millis(self.poll_retry_delay_ms),
            safety_timeout: Duration::from_millis(self.safety_timeout_ms),
        }
    }
}
