use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::StateGraph;
use crate::state::{GraphState, TransitionDef};

/// Stored graph document as written by the asset pipeline.
///
/// ```json
/// { "initialState": "Idle",
///   "states": [ { "name": "Idle", "animations": [ { "name": "idle_body" } ] } ],
///   "transitions": [ { "from": "Idle", "to": "Run", "duration": 0.5 } ] }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
    #[serde(default)]
    pub states: Vec<GraphState>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

impl StoredGraph {
    /// Build a validated graph. Transition ids follow document order.
    pub fn into_graph(self) -> Result<StateGraph> {
        let mut graph = StateGraph::new();
        for state in self.states {
            graph.add_state(state)?;
        }
        for def in self.transitions {
            graph.add_transition(def)?;
        }
        if let Some(initial) = self.initial_state {
            graph.set_initial_state(&initial)?;
        }
        Ok(graph)
    }
}

impl From<&StateGraph> for StoredGraph {
    fn from(graph: &StateGraph) -> Self {
        Self {
            initial_state: graph.initial_state().map(str::to_string),
            states: graph.states().to_vec(),
            transitions: graph
                .transitions()
                .iter()
                .map(|t| TransitionDef {
                    from: t.from.clone(),
                    to: t.to.clone(),
                    duration: t.duration,
                    begin_time_range: t.begin_time_range,
                    end_time_range: t.end_time_range,
                    curve: t.curve.clone(),
                })
                .collect(),
        }
    }
}

impl StateGraph {
    /// Parse and validate a stored graph document.
    pub fn from_json(s: &str) -> Result<StateGraph> {
        let stored: StoredGraph =
            serde_json::from_str(s).map_err(|e| GraphError::Parse(e.to_string()))?;
        stored.into_graph()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&StoredGraph::from(self))
            .map_err(|e| GraphError::Parse(e.to_string()))
    }
}
