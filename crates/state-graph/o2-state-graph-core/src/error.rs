//! Errors raised while building or loading a state graph.
//!
//! Runtime playback never fails; these only cover asset construction.

use thiserror::Error;

use crate::state::TransitionId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("state graph json parse error: {0}")]
    Parse(String),
    #[error("state name must not be empty")]
    EmptyStateName,
    #[error("duplicate state '{0}'")]
    DuplicateState(String),
    #[error("unknown state '{0}'")]
    UnknownState(String),
    #[error("unknown transition {0:?}")]
    UnknownTransition(TransitionId),
    #[error("transition {from} -> {to}: duration must be finite and >= 0 (got {duration})")]
    InvalidDuration {
        from: String,
        to: String,
        duration: f32,
    },
    #[error("transition {from} -> {to}: time range [{begin}, {end}] must satisfy 0 <= begin <= end <= 1")]
    InvalidTimeRange {
        from: String,
        to: String,
        begin: f32,
        end: f32,
    },
}

pub type Result<T> = core::result::Result<T, GraphError>;
