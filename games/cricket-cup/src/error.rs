use thiserror::Error;

use crease_engine::EngineError;

use crate::physics::PhysicsError;
use crate::state::Phase;

/// A transition the match state machine refused.
///
/// Deferred handlers treat every variant as a stale callback and drop it;
/// only direct callers (input, host buttons) ever see these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("{op} is not valid while {phase}")]
    InvalidPhase { op: &'static str, phase: Phase },

    #[error("delivery requested {elapsed_ms} ms after the last one (minimum {min_ms} ms)")]
    TooSoon { elapsed_ms: u64, min_ms: u64 },

    #[error("match is paused")]
    Paused,
}

/// Rejected `MatchConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_overs must be at least 1")]
    ZeroOvers,

    #[error("target range {min}..={max} is empty")]
    EmptyTargetRange { min: u32, max: u32 },

    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),

    #[error("score_commit_delay_ms ({commit}) must be shorter than next_after_hit_ms ({next})")]
    CommitAfterNextDelivery { commit: u64, next: u64 },
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<PhysicsError> for EngineError {
    fn from(err: PhysicsError) -> Self {
        match err {
            PhysicsError::MissingBody(name) => EngineError::MissingEntity(name),
        }
    }
}
