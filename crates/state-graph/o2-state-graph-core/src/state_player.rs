//! StatePlayer: plays every sub-animation of one graph state in lockstep.
//!
//! The player does not own clips; it holds ids resolved against a `ClipHost`
//! (normally the actor's `AnimationComponent`) and forwards play/stop/weight to
//! all of them. Time and duration are read from the first resolved clip.

use std::rc::Weak;

use o2_animation_core::{AnimationComponent, ClipId};

use crate::events::{EventHub, StateGraphEvent};
use crate::state::{GraphState, SubAnimation};

/// Clip playback surface the state graph drives.
pub trait ClipHost {
    fn resolve(&self, name: &str) -> Option<ClipId>;
    /// Start a clip from its beginning.
    fn play(&mut self, clip: ClipId);
    fn stop(&mut self, clip: ClipId);
    fn set_weight(&mut self, clip: ClipId, weight: f32);
    /// Clip-local time in seconds.
    fn time(&self, clip: ClipId) -> f32;
    fn duration(&self, clip: ClipId) -> f32;
}

impl ClipHost for AnimationComponent {
    fn resolve(&self, name: &str) -> Option<ClipId> {
        self.find(name)
    }

    fn play(&mut self, clip: ClipId) {
        AnimationComponent::play(self, clip);
    }

    fn stop(&mut self, clip: ClipId) {
        AnimationComponent::stop(self, clip);
    }

    fn set_weight(&mut self, clip: ClipId, weight: f32) {
        AnimationComponent::set_weight(self, clip, weight);
    }

    fn time(&self, clip: ClipId) -> f32 {
        AnimationComponent::time(self, clip)
    }

    fn duration(&self, clip: ClipId) -> f32 {
        AnimationComponent::duration(self, clip)
    }
}

#[derive(Debug)]
pub struct StatePlayer {
    state: String,
    entries: Vec<(SubAnimation, ClipId)>,
    owner: Weak<EventHub>,
    weight: f32,
}

impl StatePlayer {
    pub fn new(owner: Weak<EventHub>) -> Self {
        Self {
            state: String::new(),
            entries: Vec::new(),
            owner,
            weight: 1.0,
        }
    }

    /// Create a player already set up for `state`.
    pub fn for_state(host: &dyn ClipHost, state: &GraphState, owner: Weak<EventHub>) -> Self {
        let mut player = Self::new(Weak::new());
        player.setup(host, state, owner);
        player
    }

    /// Rebuild the entry list from the state's sub-animations. Names the host
    /// does not know are skipped.
    pub fn setup(&mut self, host: &dyn ClipHost, state: &GraphState, owner: Weak<EventHub>) {
        self.state = state.name.clone();
        self.owner = owner;
        self.entries.clear();
        for sub in &state.animations {
            match host.resolve(&sub.name) {
                Some(clip) => self.entries.push((sub.clone(), clip)),
                None => log::debug!(
                    "state '{}': sub-animation '{}' not found, skipping",
                    state.name,
                    sub.name
                ),
            }
        }
    }

    pub fn play(&mut self, host: &mut dyn ClipHost) {
        for (_, clip) in &self.entries {
            host.play(*clip);
        }
        self.notify(StateGraphEvent::StateStarted {
            state: self.state.clone(),
        });
    }

    pub fn stop(&mut self, host: &mut dyn ClipHost) {
        for (_, clip) in &self.entries {
            host.stop(*clip);
        }
        self.notify(StateGraphEvent::StateFinished {
            state: self.state.clone(),
        });
    }

    /// Like `stop`, but clips `keep` also drives stay untouched.
    pub fn stop_except(&mut self, host: &mut dyn ClipHost, keep: &StatePlayer) {
        for (_, clip) in &self.entries {
            if !keep.holds(*clip) {
                host.stop(*clip);
            }
        }
        self.notify(StateGraphEvent::StateFinished {
            state: self.state.clone(),
        });
    }

    pub fn holds(&self, clip: ClipId) -> bool {
        self.entries.iter().any(|(_, c)| *c == clip)
    }

    /// Clips driven by both players, in this player's entry order.
    pub fn shared_clips(&self, other: &StatePlayer) -> Vec<ClipId> {
        self.entries
            .iter()
            .map(|(_, c)| *c)
            .filter(|c| other.holds(*c))
            .collect()
    }

    pub fn set_weight(&mut self, host: &mut dyn ClipHost, weight: f32) {
        self.weight = weight;
        for (_, clip) in &self.entries {
            host.set_weight(*clip, weight);
        }
    }

    /// Last weight applied through this player.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn time(&self, host: &dyn ClipHost) -> f32 {
        self.entries
            .first()
            .map(|(_, clip)| host.time(*clip))
            .unwrap_or(0.0)
    }

    pub fn duration(&self, host: &dyn ClipHost) -> f32 {
        self.entries
            .first()
            .map(|(_, clip)| host.duration(*clip))
            .unwrap_or(0.0)
    }

    /// time / duration, with zero-length (or empty) states pinned at 0.
    pub fn normalized_time(&self, host: &dyn ClipHost) -> f32 {
        let duration = self.duration(host);
        if duration > 0.0 {
            self.time(host) / duration
        } else {
            0.0
        }
    }

    pub fn state_name(&self) -> &str {
        &self.state
    }

    pub fn entries(&self) -> &[(SubAnimation, ClipId)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn notify(&self, event: StateGraphEvent) {
        if let Some(hub) = self.owner.upgrade() {
            hub.emit(event);
        }
    }
}
