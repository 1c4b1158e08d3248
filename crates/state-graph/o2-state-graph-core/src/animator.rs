//! Animator: an actor's clips plus the state graph driving them.

use std::sync::Arc;

use o2_animation_core::{AnimationComponent, Config, Outputs};

use crate::component::AnimationStateGraphComponent;
use crate::config::StateGraphConfig;
use crate::graph::StateGraph;

#[derive(Debug, Default)]
pub struct Animator {
    pub animation: AnimationComponent,
    pub state_graph: AnimationStateGraphComponent,
}

impl Animator {
    pub fn new(animation: Config, state_graph: StateGraphConfig) -> Self {
        Self {
            animation: AnimationComponent::new(animation),
            state_graph: AnimationStateGraphComponent::new(state_graph),
        }
    }

    pub fn set_graph(&mut self, graph: Option<Arc<StateGraph>>) {
        self.state_graph.set_graph(graph, &mut self.animation);
    }

    pub fn go_to_state(&mut self, name: &str) {
        self.state_graph.go_to_state(name, &mut self.animation);
    }

    pub fn force_play_state(&mut self, name: &str) {
        self.state_graph.force_play_state(name, &mut self.animation);
    }

    pub fn stop_transition(&mut self) {
        self.state_graph.stop_transition(&mut self.animation);
    }

    pub fn reset(&mut self) {
        self.state_graph.reset(&mut self.animation);
    }

    pub fn state(&self) -> Option<&str> {
        self.state_graph.state()
    }

    /// Advance clips by `dt`, then let the graph react to the new clip times.
    pub fn update(&mut self, dt: f32) -> &Outputs {
        self.animation.update(dt);
        self.state_graph.update(dt, &mut self.animation);
        self.animation.outputs()
    }
}
