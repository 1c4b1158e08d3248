//! Output contracts from the animation component.
//!
//! Outputs carry one sample per playing clip for this tick plus a separate
//! list of discrete clip events. Hosts apply the samples to their poses.

use serde::{Deserialize, Serialize};

use crate::ids::ClipId;

/// Time and blend weight of one playing clip this tick.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClipSample {
    pub clip: ClipId,
    pub name: String,
    pub time: f32,
    pub weight: f32,
}

/// Discrete signals emitted while stepping clips.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum ClipEvent {
    ClipStarted { clip: ClipId },
    ClipStopped { clip: ClipId },
    /// A looping clip wrapped past its end.
    ClipLooped { clip: ClipId },
    /// A `Once` clip reached its boundary and stopped advancing.
    ClipEnded { clip: ClipId, time: f32 },
}

/// Outputs returned by AnimationComponent::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub samples: Vec<ClipSample>,
    #[serde(default)]
    pub events: Vec<ClipEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.samples.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_sample(&mut self, sample: ClipSample) {
        self.samples.push(sample);
    }

    #[inline]
    pub fn push_event(&mut self, event: ClipEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.events.is_empty()
    }
}
