//! AnimationStateGraphComponent: drives an actor through a state graph.
//!
//! The component owns the current and next `StatePlayer`, the in-flight
//! transition and the queue of planned transitions. Every operation that
//! touches playback receives the actor's clips as a `&mut dyn ClipHost`.
//!
//! Per-frame update runs two steps in order:
//! 1. start the head of the queue if the current state's playback ratio is
//!    inside its [begin, end] window;
//! 2. advance the in-flight transition, cross-fading current → next, and
//!    promote next to current once the blend completes.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::StateGraphConfig;
use crate::events::{EventHub, StateGraphEvent};
use crate::graph::StateGraph;
use crate::state::{GraphState, Transition, TransitionId};
use crate::state_player::{ClipHost, StatePlayer};

#[derive(Debug)]
pub struct AnimationStateGraphComponent {
    cfg: StateGraphConfig,
    graph: Option<Arc<StateGraph>>,

    current_state: Option<String>,
    current_player: Option<StatePlayer>,

    next_state: Option<String>,
    next_player: Option<StatePlayer>,

    current_transition: Option<TransitionId>,
    transition_time: f32,
    // Planned but not started; never holds `current_transition`.
    next_transitions: VecDeque<TransitionId>,

    events: Rc<EventHub>,
}

impl Default for AnimationStateGraphComponent {
    fn default() -> Self {
        Self::new(StateGraphConfig::default())
    }
}

impl AnimationStateGraphComponent {
    pub fn new(cfg: StateGraphConfig) -> Self {
        Self {
            events: Rc::new(EventHub::new(cfg.max_buffered_events)),
            cfg,
            graph: None,
            current_state: None,
            current_player: None,
            next_state: None,
            next_player: None,
            current_transition: None,
            transition_time: 0.0,
            next_transitions: VecDeque::new(),
        }
    }

    // --- graph property -------------------------------------------------

    pub fn graph(&self) -> Option<&Arc<StateGraph>> {
        self.graph.as_ref()
    }

    /// Swap the graph asset and restart from its initial state.
    pub fn set_graph(&mut self, graph: Option<Arc<StateGraph>>, host: &mut dyn ClipHost) {
        // Cancellations must resolve against the graph the queued ids came from.
        self.stop_transition(host);
        self.graph = graph;
        self.reset(host);
    }

    // --- State property -------------------------------------------------

    pub fn state(&self) -> Option<&str> {
        self.current_state_name()
    }

    pub fn set_state(&mut self, name: &str, host: &mut dyn ClipHost) {
        self.go_to_state(name, host);
    }

    // --- operations -----------------------------------------------------

    /// Plan a route from the current state to `name`. Playback of the first hop
    /// starts on a later update, once its window is reached.
    pub fn go_to_state(&mut self, name: &str, host: &mut dyn ClipHost) {
        let Some(graph) = self.graph.clone() else {
            log::debug!("go_to_state('{name}'): no graph assigned");
            return;
        };
        let Some(target) = graph.get_state(name) else {
            log::debug!("go_to_state('{name}'): unknown state");
            return;
        };
        let Some(current) = self.current_state.clone() else {
            log::debug!("go_to_state('{name}'): no current state to plan from");
            return;
        };

        self.stop_transition(host);

        let path = graph.calculate_path_bounded(&current, &target.name, self.cfg.max_path_hops);
        if path.is_empty() && current != target.name {
            log::debug!("go_to_state: '{}' is unreachable from '{}'", target.name, current);
        } else {
            log::debug!(
                "go_to_state: planned {} transition(s) from '{}' to '{}'",
                path.len(),
                current,
                target.name
            );
        }
        self.next_transitions = path.iter().copied().collect();
        self.events.emit(StateGraphEvent::TransitionsPlanned {
            target: target.name.clone(),
            path,
        });
    }

    /// Switch to `name` immediately: no blending, pending work is cancelled.
    pub fn force_play_state(&mut self, name: &str, host: &mut dyn ClipHost) {
        let Some(graph) = self.graph.clone() else {
            log::debug!("force_play_state('{name}'): no graph assigned");
            return;
        };
        let Some(state) = graph.get_state(name) else {
            log::debug!("force_play_state('{name}'): unknown state");
            return;
        };

        self.stop_transition(host);
        if let Some(mut player) = self.current_player.take() {
            player.stop(host);
        }

        let mut player = self.spawn_player(host, state);
        player.play(host);
        player.set_weight(host, 1.0);

        log::debug!("force_play_state: now in '{}'", state.name);
        self.current_state = Some(state.name.clone());
        self.current_player = Some(player);
    }

    /// Cancel the in-flight transition and everything queued behind it.
    /// The current state keeps playing at full weight.
    pub fn stop_transition(&mut self, host: &mut dyn ClipHost) {
        let was_blending = self.current_transition.is_some();

        if let Some(id) = self.current_transition.take() {
            self.emit_transition(id, TransitionPhase::Cancelled);
        }
        while let Some(id) = self.next_transitions.pop_front() {
            self.emit_transition(id, TransitionPhase::Cancelled);
        }
        if let Some(mut player) = self.next_player.take() {
            match self.current_player.as_ref() {
                Some(current) => player.stop_except(host, current),
                None => player.stop(host),
            }
        }
        self.next_state = None;
        self.transition_time = 0.0;

        if was_blending {
            if let Some(player) = self.current_player.as_mut() {
                player.set_weight(host, 1.0);
            }
        }
    }

    /// Stop everything and restart from the graph's initial state.
    pub fn reset(&mut self, host: &mut dyn ClipHost) {
        self.stop_transition(host);

        let initial = self
            .graph
            .as_ref()
            .and_then(|g| g.initial_state().map(str::to_string));
        match initial {
            Some(name) => self.force_play_state(&name, host),
            None => {
                if let Some(mut player) = self.current_player.take() {
                    player.stop(host);
                }
                self.current_state = None;
            }
        }
    }

    /// Per-frame entry point.
    pub fn update(&mut self, dt: f32, host: &mut dyn ClipHost) {
        self.check_start_next_transition(host);
        self.update_current_transition(dt, host);
    }

    fn check_start_next_transition(&mut self, host: &mut dyn ClipHost) {
        if self.current_transition.is_some() {
            return;
        }
        let Some(&head) = self.next_transitions.front() else {
            return;
        };
        let Some(current) = self.current_player.as_ref() else {
            return;
        };
        let Some(graph) = self.graph.clone() else {
            return;
        };

        let Some(transition) = graph.transition(head) else {
            log::warn!("dropping planned transition {head:?}: not in graph");
            self.next_transitions.pop_front();
            return;
        };

        let ratio = current.normalized_time(host);
        if !transition.is_eligible(ratio) {
            log::trace!(
                "transition {:?} waiting: ratio {ratio} outside [{}, {}]",
                head,
                transition.begin_time_range,
                transition.end_time_range
            );
            return;
        }

        self.next_transitions.pop_front();
        let Some(destination) = graph.get_state(transition.destination_state()) else {
            log::warn!(
                "transition {head:?}: destination '{}' missing",
                transition.destination_state()
            );
            self.emit_transition(head, TransitionPhase::Cancelled);
            return;
        };

        let mut player = self.spawn_player(host, destination);
        player.play(host);
        player.set_weight(host, 0.0);

        log::debug!(
            "transition {:?} started: '{}' -> '{}' at ratio {ratio}",
            head,
            transition.from,
            transition.to
        );
        self.next_state = Some(destination.name.clone());
        self.next_player = Some(player);
        self.current_transition = Some(head);
        self.transition_time = 0.0;
        self.emit_transition(head, TransitionPhase::Started);
    }

    fn update_current_transition(&mut self, dt: f32, host: &mut dyn ClipHost) {
        let Some(id) = self.current_transition else {
            return;
        };
        if self.current_player.is_none() || self.next_player.is_none() {
            return;
        }
        let Some(graph) = self.graph.clone() else {
            return;
        };
        let Some(transition) = graph.transition(id) else {
            return;
        };

        self.transition_time += dt;
        let (coef, finished) = transition.blend_coefficient(self.transition_time);
        log::trace!("transition {id:?}: t={} coef={coef}", self.transition_time);

        if let (Some(current), Some(next)) =
            (self.current_player.as_mut(), self.next_player.as_mut())
        {
            current.set_weight(host, 1.0 - coef);
            next.set_weight(host, coef);
            // A clip both states drive carries both contributions.
            for clip in current.shared_clips(next) {
                host.set_weight(clip, 1.0);
            }
        }

        if !finished {
            return;
        }

        if let Some(mut previous) = self.current_player.take() {
            match self.next_player.as_ref() {
                Some(next) => previous.stop_except(host, next),
                None => previous.stop(host),
            }
        }
        self.emit_transition(id, TransitionPhase::Finished);

        self.current_state = self.next_state.take();
        self.current_player = self.next_player.take();
        if let Some(player) = self.current_player.as_mut() {
            player.set_weight(host, 1.0);
        }
        self.current_transition = None;
        self.transition_time = 0.0;
        log::debug!(
            "transition {id:?} finished: now in '{}'",
            self.current_state.as_deref().unwrap_or_default()
        );
    }

    fn spawn_player(&self, host: &dyn ClipHost, state: &GraphState) -> StatePlayer {
        StatePlayer::for_state(host, state, Rc::downgrade(&self.events))
    }

    fn emit_transition(&self, id: TransitionId, phase: TransitionPhase) {
        let (from, to) = self
            .graph
            .as_ref()
            .and_then(|g| g.transition(id))
            .map(|t| (t.from.clone(), t.to.clone()))
            .unwrap_or_default();
        let event = match phase {
            TransitionPhase::Started => StateGraphEvent::TransitionStarted {
                transition: id,
                from,
                to,
            },
            TransitionPhase::Finished => StateGraphEvent::TransitionFinished {
                transition: id,
                from,
                to,
            },
            TransitionPhase::Cancelled => StateGraphEvent::TransitionCancelled {
                transition: id,
                from,
                to,
            },
        };
        self.events.emit(event);
    }

    // --- accessors ------------------------------------------------------

    pub fn config(&self) -> &StateGraphConfig {
        &self.cfg
    }

    pub fn current_state(&self) -> Option<&GraphState> {
        let name = self.current_state.as_deref()?;
        self.graph.as_ref()?.get_state(name)
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    pub fn current_player(&self) -> Option<&StatePlayer> {
        self.current_player.as_ref()
    }

    pub fn next_state(&self) -> Option<&GraphState> {
        let name = self.next_state.as_deref()?;
        self.graph.as_ref()?.get_state(name)
    }

    pub fn next_state_name(&self) -> Option<&str> {
        self.next_state.as_deref()
    }

    pub fn next_player(&self) -> Option<&StatePlayer> {
        self.next_player.as_ref()
    }

    pub fn current_transition(&self) -> Option<&Transition> {
        let id = self.current_transition?;
        self.graph.as_ref()?.transition(id)
    }

    pub fn current_transition_id(&self) -> Option<TransitionId> {
        self.current_transition
    }

    pub fn next_transitions(&self) -> &VecDeque<TransitionId> {
        &self.next_transitions
    }

    /// Seconds elapsed in the in-flight transition.
    pub fn transition_time(&self) -> f32 {
        self.transition_time
    }

    pub fn current_weight(&self) -> Option<f32> {
        self.current_player.as_ref().map(StatePlayer::weight)
    }

    pub fn next_weight(&self) -> Option<f32> {
        self.next_player.as_ref().map(StatePlayer::weight)
    }

    pub fn events(&self) -> &Rc<EventHub> {
        &self.events
    }
}

#[derive(Copy, Clone, Debug)]
enum TransitionPhase {
    Started,
    Finished,
    Cancelled,
}
