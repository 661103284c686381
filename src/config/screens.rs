use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;
pub const DEFAULT_MIN_LOADING_MS: u64 = 500;
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_EFFECT_CAPACITY: usize = 64;

/// Timing knobs shared by every screen state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Quiet period before a typed query is searched (default: 1000)
    pub debounce_ms: u64,

    /// Shortest time a loading indicator stays visible (default: 500)
    pub min_loading_ms: u64,

    /// How long UI state keeps being published with no observer (default: 5000)
    pub stop_timeout_ms: u64,

    /// Pending one-shot effects kept before new ones are dropped (default: 64)
    pub effect_capacity: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_loading_ms: DEFAULT_MIN_LOADING_MS,
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
            effect_capacity: DEFAULT_EFFECT_CAPACITY,
        }
    }
}

impl ScreenConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}
