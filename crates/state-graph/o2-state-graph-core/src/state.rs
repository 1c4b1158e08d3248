//! Graph data model: states, their sub-animations, and transitions.

use o2_animation_core::Curve;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub u32);

/// A clip reference inside a state, resolved by name against the actor's clips.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubAnimation {
    pub name: String,
}

impl SubAnimation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named bundle of sub-animations that play together.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphState {
    pub name: String,
    #[serde(default)]
    pub animations: Vec<SubAnimation>,
}

impl GraphState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animations: Vec::new(),
        }
    }

    pub fn with_animation(mut self, name: impl Into<String>) -> Self {
        self.animations.push(SubAnimation::new(name));
        self
    }
}

fn default_end_time_range() -> f32 {
    1.0
}

/// Transition definition as authored, before the graph assigns it an id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDef {
    pub from: String,
    pub to: String,
    /// Blend duration in seconds.
    pub duration: f32,
    #[serde(default)]
    pub begin_time_range: f32,
    #[serde(default = "default_end_time_range")]
    pub end_time_range: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<Curve>,
}

impl TransitionDef {
    pub fn new(from: impl Into<String>, to: impl Into<String>, duration: f32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            duration,
            begin_time_range: 0.0,
            end_time_range: default_end_time_range(),
            curve: None,
        }
    }

    pub fn with_window(mut self, begin: f32, end: f32) -> Self {
        self.begin_time_range = begin;
        self.end_time_range = end;
        self
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }
}

/// Directed, timed edge between two states.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: TransitionId,
    pub from: String,
    pub to: String,
    pub duration: f32,
    pub begin_time_range: f32,
    pub end_time_range: f32,
    pub curve: Option<Curve>,
}

impl Transition {
    pub(crate) fn from_def(id: TransitionId, def: TransitionDef) -> Self {
        Self {
            id,
            from: def.from,
            to: def.to,
            duration: def.duration,
            begin_time_range: def.begin_time_range,
            end_time_range: def.end_time_range,
            curve: def.curve,
        }
    }

    pub fn destination_state(&self) -> &str {
        &self.to
    }

    pub fn source_state(&self) -> &str {
        &self.from
    }

    /// Whether a source playback ratio lies inside [begin_time_range, end_time_range].
    #[inline]
    pub fn is_eligible(&self, ratio: f32) -> bool {
        ratio >= self.begin_time_range && ratio <= self.end_time_range
    }

    /// Blend coefficient for the elapsed time, clamped to 1 and eased by the curve.
    /// Returns (coefficient, finished).
    pub fn blend_coefficient(&self, elapsed: f32) -> (f32, bool) {
        let raw = if self.duration > 0.0 {
            (elapsed / self.duration).max(0.0)
        } else {
            1.0
        };
        let finished = raw >= 1.0;
        let raw = raw.min(1.0);
        let coef = match &self.curve {
            Some(curve) => curve.evaluate(raw),
            None => raw,
        };
        (coef, finished)
    }
}
