//! Configuration for the state graph component.

use serde::{Deserialize, Serialize};

/// Sizing and limits for one `AnimationStateGraphComponent`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StateGraphConfig {
    /// Events kept in the component's buffer until drained. Oldest are dropped first.
    /// Zero disables buffering; subscribers still receive every event.
    pub max_buffered_events: usize,

    /// Longest path (in transitions) `go_to_state` will plan. Longer routes count as unreachable.
    pub max_path_hops: usize,
}

impl Default for StateGraphConfig {
    fn default() -> Self {
        Self {
            max_buffered_events: 1024,
            max_path_hops: 64,
        }
    }
}
