//! Clip definitions and stored clip documents.
//!
//! A clip is the smallest unit the component plays: a named timeline with a
//! duration, a playback speed, a loop mode and a blend weight. Track sampling
//! lives with the renderer-side consumers; the component only drives time.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    Once,
    #[default]
    Loop,
    #[serde(alias = "ping_pong")]
    PingPong,
}

fn default_speed() -> f32 {
    1.0
}

fn default_weight() -> f32 {
    1.0
}

/// Definition used to register a clip with an `AnimationComponent`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClipCfg {
    pub name: String,
    /// Duration in seconds.
    pub duration: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default)]
    pub mode: LoopMode,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

impl ClipCfg {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            speed: default_speed(),
            mode: LoopMode::default(),
            weight: default_weight(),
        }
    }

    pub fn with_mode(mut self, mode: LoopMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Validate basic invariants (finite, non-negative duration; finite speed).
    pub fn validate_basic(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("clip name must not be empty".into());
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(format!(
                "clip '{}' duration must be finite and >= 0",
                self.name
            ));
        }
        if !self.speed.is_finite() {
            return Err(format!("clip '{}' speed must be finite", self.name));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StoredClips {
    clips: Vec<ClipCfg>,
}

/// Parse a stored clip list (`{ "clips": [ ... ] }`) and validate every entry.
pub fn parse_clips_json(s: &str) -> Result<Vec<ClipCfg>, String> {
    let stored: StoredClips = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;
    for clip in &stored.clips {
        clip.validate_basic()?;
    }
    Ok(stored.clips)
}
