//! Pure scoring rules: hit timing, run awards and scoreboard strings.

use glam::Vec3;

use crease_engine::clamp;

use crate::state::HitQuality;

/// Open interval of axis positions where a swing can connect.
pub const HIT_WINDOW: (f32, f32) = (2.0, 7.0);
/// Wider interval where a failed swing still counts as a genuine miss.
pub const MISS_TOLERANCE: (f32, f32) = (-2.0, 10.0);
/// Distance covered per run for a ball grounded inside the boundary.
const METRES_PER_RUN: f32 = 15.0;

/// Classify a swing by the ball's position along the bowler-to-batter axis.
pub fn classify_hit(z: f32) -> Option<HitQuality> {
    if !(z > HIT_WINDOW.0 && z < HIT_WINDOW.1) {
        return None;
    }
    let quality = if (4.0..=5.0).contains(&z) {
        HitQuality::Perfect
    } else if (z > 3.0 && z < 4.0) || (z > 5.0 && z < 6.0) {
        HitQuality::Good
    } else {
        HitQuality::Regular
    };
    Some(quality)
}

/// Ball has left the playing area: well past the batter, far behind the
/// bowler, or through the floor.
pub fn out_of_play(position: Vec3) -> bool {
    position.z > 30.0 || position.z < -20.0 || position.y < -10.0
}

pub fn in_miss_tolerance(z: f32) -> bool {
    z > MISS_TOLERANCE.0 && z < MISS_TOLERANCE.1
}

/// Horizontal distance from the pitch center.
pub fn planar_distance(position: Vec3) -> f32 {
    (position.x * position.x + position.z * position.z).sqrt()
}

pub fn boundary_runs(height: f32, six_height: f32) -> u32 {
    if height > six_height {
        6
    } else {
        4
    }
}

/// Runs for a hit ball that grounds inside the boundary: one per 15 m, 1 to 3.
pub fn grounded_runs(distance: f32) -> u32 {
    clamp((distance / METRES_PER_RUN).floor(), 1.0, 3.0) as u32
}

pub fn runs_announcement(runs: u32) -> String {
    if runs == 1 {
        "1 RUN!".to_string()
    } else {
        format!("{} RUNS!", runs)
    }
}

/// `"overs.balls"`, e.g. 13 balls is `"2.1"`.
pub fn format_overs(balls: u32) -> String {
    format!("{}.{}", balls / 6, balls % 6)
}

pub fn format_score(runs: u32, wickets: u32) -> String {
    format!("{}/{}", runs, wickets)
}
