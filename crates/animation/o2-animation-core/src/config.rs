//! Core configuration for o2-animation-core.

use serde::{Deserialize, Serialize};

/// Configuration for component sizing and per-tick limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for the clip table.
    pub clip_capacity: usize,

    /// Maximum clip events retained per tick. Extra events are dropped and logged.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clip_capacity: 16,
            max_events_per_tick: 256,
        }
    }
}
