//! o2 Animation Core (engine-agnostic)
//!
//! Per-actor clip playback: a table of named clips with time, speed, loop mode
//! and blend weight, advanced once per frame, plus the easing curves used to
//! shape cross-fades. Pose sampling is left to the host.

pub mod clip;
pub mod component;
pub mod config;
pub mod curve;
pub mod ids;
pub mod outputs;

// Re-exports for consumers (state graph, hosts)
pub use clip::{parse_clips_json, ClipCfg, LoopMode};
pub use component::{AnimationComponent, ClipPlayer};
pub use config::Config;
pub use curve::Curve;
pub use ids::{ClipId, IdAllocator};
pub use outputs::{ClipEvent, ClipSample, Outputs};
