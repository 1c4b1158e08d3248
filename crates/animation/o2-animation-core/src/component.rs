//! AnimationComponent: per-actor clip table with playback state and time math.
//!
//! Methods:
//! - add_clip / remove_clip / find, play / stop / set_weight, update (advance → outputs)

use hashbrown::HashMap;

use crate::clip::{ClipCfg, LoopMode};
use crate::config::Config;
use crate::ids::{ClipId, IdAllocator};
use crate::outputs::{ClipEvent, ClipSample, Outputs};

/// Live playback state of one clip.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    pub id: ClipId,
    pub name: String,
    pub duration: f32,
    pub speed: f32,
    pub weight: f32,
    pub mode: LoopMode,
    pub playing: bool,
    /// Unwrapped player time; loop mode mapping is applied on read.
    cursor: f32,
}

impl ClipPlayer {
    fn new(id: ClipId, cfg: ClipCfg) -> Self {
        Self {
            id,
            name: cfg.name,
            duration: cfg.duration.max(0.0),
            speed: cfg.speed,
            weight: cfg.weight.clamp(0.0, 1.0),
            mode: cfg.mode,
            playing: false,
            cursor: 0.0,
        }
    }

    /// Clip-local time in seconds, in [0, duration].
    pub fn time(&self) -> f32 {
        local_time(self.cursor, self.duration, self.mode)
    }

    /// Playback position normalized by duration; 0 for zero-length clips.
    pub fn normalized_time(&self) -> f32 {
        if self.duration > 0.0 {
            self.time() / self.duration
        } else {
            0.0
        }
    }
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Reflect t into [0, span] with ping-pong behavior, where period = 2 * span.
fn ping_pong(t: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return 0.0;
    }
    let period = 2.0 * span;
    let m = fmod(t, period);
    if m <= span {
        m
    } else {
        period - m
    }
}

fn local_time(cursor: f32, duration: f32, mode: LoopMode) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    match mode {
        LoopMode::Once => cursor.clamp(0.0, duration),
        LoopMode::Loop => fmod(cursor, duration),
        LoopMode::PingPong => ping_pong(cursor, duration),
    }
}

/// Per-actor animation component: owns clip players, advances them each tick.
#[derive(Debug)]
pub struct AnimationComponent {
    cfg: Config,
    ids: IdAllocator,
    clips: Vec<ClipPlayer>,
    by_name: HashMap<String, ClipId>,

    // Events raised between ticks (play/stop), flushed into the next outputs.
    pending: Vec<ClipEvent>,
    outputs: Outputs,
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimationComponent {
    pub fn new(cfg: Config) -> Self {
        Self {
            clips: Vec::with_capacity(cfg.clip_capacity),
            by_name: HashMap::with_capacity(cfg.clip_capacity),
            cfg,
            ids: IdAllocator::new(),
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    /// Register a clip. Re-registering a name replaces the definition and keeps its id.
    pub fn add_clip(&mut self, cfg: ClipCfg) -> ClipId {
        if let Some(&id) = self.by_name.get(&cfg.name) {
            if let Some(slot) = self.clips.iter_mut().find(|c| c.id == id) {
                *slot = ClipPlayer::new(id, cfg);
            }
            return id;
        }
        let id = self.ids.alloc_clip();
        self.by_name.insert(cfg.name.clone(), id);
        self.clips.push(ClipPlayer::new(id, cfg));
        id
    }

    /// Remove a clip by name. Returns false when no such clip exists.
    pub fn remove_clip(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(id) => {
                self.clips.retain(|c| c.id != id);
                true
            }
            None => false,
        }
    }

    pub fn find(&self, name: &str) -> Option<ClipId> {
        self.by_name.get(name).copied()
    }

    pub fn clip(&self, id: ClipId) -> Option<&ClipPlayer> {
        self.clips.iter().find(|c| c.id == id)
    }

    fn clip_mut(&mut self, id: ClipId) -> Option<&mut ClipPlayer> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub fn clips(&self) -> impl Iterator<Item = &ClipPlayer> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Restart a clip from time 0.
    pub fn play(&mut self, id: ClipId) {
        if let Some(c) = self.clip_mut(id) {
            c.cursor = 0.0;
            c.playing = true;
            self.pending.push(ClipEvent::ClipStarted { clip: id });
        }
    }

    /// Stop a clip and rewind it to time 0.
    pub fn stop(&mut self, id: ClipId) {
        if let Some(c) = self.clip_mut(id) {
            c.cursor = 0.0;
            c.playing = false;
            self.pending.push(ClipEvent::ClipStopped { clip: id });
        }
    }

    pub fn set_weight(&mut self, id: ClipId, weight: f32) {
        if let Some(c) = self.clip_mut(id) {
            c.weight = if weight.is_nan() {
                0.0
            } else {
                weight.clamp(0.0, 1.0)
            };
        }
    }

    /// Jump to a clip-local time (seconds). Does not change playing state.
    pub fn seek(&mut self, id: ClipId, time: f32) {
        if let Some(c) = self.clip_mut(id) {
            c.cursor = time.max(0.0);
        }
    }

    pub fn time(&self, id: ClipId) -> f32 {
        self.clip(id).map(ClipPlayer::time).unwrap_or(0.0)
    }

    pub fn duration(&self, id: ClipId) -> f32 {
        self.clip(id).map(|c| c.duration).unwrap_or(0.0)
    }

    pub fn weight(&self, id: ClipId) -> f32 {
        self.clip(id).map(|c| c.weight).unwrap_or(0.0)
    }

    pub fn is_playing(&self, id: ClipId) -> bool {
        self.clip(id).map(|c| c.playing).unwrap_or(false)
    }

    /// Outputs produced by the last update.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Advance every playing clip by dt, producing samples and clip events.
    pub fn update(&mut self, dt: f32) -> &Outputs {
        self.outputs.clear();
        let mut events = std::mem::take(&mut self.pending);

        for c in self.clips.iter_mut().filter(|c| c.playing) {
            let before = c.cursor;
            c.cursor += dt * c.speed;

            match c.mode {
                LoopMode::Once => {
                    if c.cursor >= c.duration || (c.cursor <= 0.0 && c.speed < 0.0) {
                        c.cursor = c.cursor.clamp(0.0, c.duration);
                        c.playing = false;
                        events.push(ClipEvent::ClipEnded {
                            clip: c.id,
                            time: c.cursor,
                        });
                    }
                }
                LoopMode::Loop => {
                    if c.duration > 0.0
                        && (before / c.duration).floor() != (c.cursor / c.duration).floor()
                    {
                        events.push(ClipEvent::ClipLooped { clip: c.id });
                    }
                }
                LoopMode::PingPong => {}
            }

            self.outputs.push_sample(ClipSample {
                clip: c.id,
                name: c.name.clone(),
                time: c.time(),
                weight: c.weight,
            });
        }

        if events.len() > self.cfg.max_events_per_tick {
            log::warn!(
                "dropping {} clip events over the per-tick limit of {}",
                events.len() - self.cfg.max_events_per_tick,
                self.cfg.max_events_per_tick
            );
            events.truncate(self.cfg.max_events_per_tick);
        }
        self.outputs.events = events;

        &self.outputs
    }
}
