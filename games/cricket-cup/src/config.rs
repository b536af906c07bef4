use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable match rules and timings.
///
/// Every field has a default, so a host may override any subset with JSON:
/// `{"max_overs": 5, "show_keyboard_hint": false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub max_overs: u32,
    /// Inclusive range the chase target is drawn from at match start.
    pub target_min: u32,
    pub target_max: u32,
    /// Delay between match start and the first delivery.
    pub warmup_ms: u64,
    /// Minimum gap between two deliveries.
    pub min_rebowl_interval_ms: u64,
    /// Longest a single ball may stay in flight before it is forced dead.
    pub safety_timeout_ms: u64,
    /// Delay between a scoring swing and the runs landing on the scoreboard.
    pub score_commit_delay_ms: u64,
    pub next_after_hit_ms: u64,
    /// Delay before a near-miss swing is settled as a dot ball.
    pub miss_check_ms: u64,
    pub next_after_miss_ms: u64,
    /// Next-ball delay after grounding, boundaries, dismissals and timeouts.
    pub next_after_dead_ball_ms: u64,
    pub bowl_origin: Vec3,
    pub bowl_velocity: Vec3,
    /// Planar distance from the pitch center beyond which a ball is a boundary.
    pub boundary_radius: f32,
    /// A boundary ball grounding above this height counts six.
    pub six_height: f32,
    pub overs_limit_ends_match: bool,
    pub show_keyboard_hint: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_overs: 20,
            target_min: 120,
            target_max: 180,
            warmup_ms: 2000,
            min_rebowl_interval_ms: 2000,
            safety_timeout_ms: 10_000,
            score_commit_delay_ms: 1000,
            next_after_hit_ms: 3000,
            miss_check_ms: 3000,
            next_after_miss_ms: 3000,
            next_after_dead_ball_ms: 2000,
            bowl_origin: Vec3::new(0.0, 1.0, -5.0),
            bowl_velocity: Vec3::new(0.0, 2.0, 8.0),
            boundary_radius: 60.0,
            six_height: 1.0,
            overs_limit_ends_match: true,
            show_keyboard_hint: true,
        }
    }
}

impl MatchConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_overs == 0 {
            return Err(ConfigError::ZeroOvers);
        }
        if self.target_min > self.target_max {
            return Err(ConfigError::EmptyTargetRange {
                min: self.target_min,
                max: self.target_max,
            });
        }

        let durations = [
            ("min_rebowl_interval_ms", self.min_rebowl_interval_ms),
            ("safety_timeout_ms", self.safety_timeout_ms),
            ("next_after_hit_ms", self.next_after_hit_ms),
            ("miss_check_ms", self.miss_check_ms),
            ("next_after_miss_ms", self.next_after_miss_ms),
            ("next_after_dead_ball_ms", self.next_after_dead_ball_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::NonPositive(*name));
        }
        if self.boundary_radius.is_nan() || self.boundary_radius <= 0.0 {
            return Err(ConfigError::NonPositive("boundary_radius"));
        }

        // The commit moves the phase back to awaiting; the next delivery
        // must not arrive before it.
        if self.score_commit_delay_ms >= self.next_after_hit_ms {
            return Err(ConfigError::CommitAfterNextDelivery {
                commit: self.score_commit_delay_ms,
                next: self.next_after_hit_ms,
            });
        }
        Ok(())
    }
}
