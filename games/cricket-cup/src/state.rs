use std::fmt;

use glam::Vec3;
use serde::Serialize;

/// Where the match is in its ball cycle. Pausing is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    NotStarted,
    AwaitingDelivery,
    BallInFlight,
    /// A scoring swing landed; the runs commit after a short delay.
    Resolving,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "not started",
            Phase::AwaitingDelivery => "awaiting delivery",
            Phase::BallInFlight => "ball in flight",
            Phase::Resolving => "resolving",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Timing tier of a swing inside the hit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitQuality {
    Perfect,
    Good,
    Regular,
}

impl HitQuality {
    pub fn runs(self) -> u32 {
        match self {
            HitQuality::Perfect => 6,
            HitQuality::Good => 4,
            HitQuality::Regular => 1,
        }
    }

    /// Upward and forward re-launch speeds. Forward is toward the bowler (-z).
    pub fn launch(self) -> (f32, f32) {
        match self {
            HitQuality::Perfect => (10.0, -20.0),
            HitQuality::Good => (8.0, -18.0),
            HitQuality::Regular => (6.0, -15.0),
        }
    }

    pub fn announcement(self) -> &'static str {
        match self {
            HitQuality::Perfect => "SIX!",
            HitQuality::Good => "FOUR!",
            HitQuality::Regular => "ONE RUN!",
        }
    }
}

/// How a delivery ended. Each delivery gets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Timed swing; runs commit after the score delay.
    Hit { quality: HitQuality },
    Boundary { runs: u32 },
    /// Swung at and grounded inside the rope.
    Ran { runs: u32 },
    Dot,
    Bowled,
}

impl Outcome {
    pub fn runs(self) -> u32 {
        match self {
            Outcome::Hit { quality } => quality.runs(),
            Outcome::Boundary { runs } | Outcome::Ran { runs } => runs,
            Outcome::Dot | Outcome::Bowled => 0,
        }
    }
}

/// Identity of "the current ball" captured when a deferred message is
/// scheduled. A message whose ticket no longer matches is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    /// Bumped on every match start.
    pub epoch: u32,
    /// Sequence number of the latest delivery at scheduling time.
    pub delivery: u32,
}

/// One bowled ball, from launch to resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub seq: u32,
    pub origin: Vec3,
    pub velocity: Vec3,
    pub bowled_at_ms: u64,
    /// The ball has made its first bounce in front of the crease.
    pub pitched: bool,
    /// Bat contact was announced for this ball.
    pub bat_contact: bool,
    pub quality: Option<HitQuality>,
    pub outcome: Option<Outcome>,
}

impl Delivery {
    pub fn new(seq: u32, origin: Vec3, velocity: Vec3, bowled_at_ms: u64) -> Self {
        Self {
            seq,
            origin,
            velocity,
            bowled_at_ms,
            pitched: false,
            bat_contact: false,
            quality: None,
            outcome: None,
        }
    }

    /// Record the outcome. Returns `false` if one was already recorded.
    pub fn resolve(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}

/// The single mutable record of a match.
#[derive(Debug, Clone)]
pub struct MatchState {
    pub phase: Phase,
    pub paused: bool,
    pub runs: u32,
    pub wickets: u32,
    pub balls_bowled: u32,
    pub target: u32,
    pub max_overs: u32,
    pub hit_registered: bool,
    pub swung: bool,
    pub last_delivery_at: Option<u64>,
    pub epoch: u32,
    pub delivery_seq: u32,
    pub delivery: Option<Delivery>,
}

pub const MAX_WICKETS: u32 = 10;

impl MatchState {
    pub fn new(max_overs: u32) -> Self {
        Self {
            phase: Phase::NotStarted,
            paused: false,
            runs: 0,
            wickets: 0,
            balls_bowled: 0,
            target: 0,
            max_overs,
            hit_registered: false,
            swung: false,
            last_delivery_at: None,
            epoch: 0,
            delivery_seq: 0,
            delivery: None,
        }
    }

    /// Fresh innings chasing `target`. Keeps the epoch counter moving so
    /// messages from the previous match go stale.
    pub fn restart(&mut self, target: u32, max_overs: u32) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self::new(max_overs);
        self.epoch = epoch;
        self.target = target;
        self.phase = Phase::AwaitingDelivery;
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            delivery: self.delivery_seq,
        }
    }

    /// Same match and no newer delivery since the ticket was issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket == self.ticket()
    }

    pub fn is_all_out(&self) -> bool {
        self.wickets >= MAX_WICKETS
    }

    pub fn target_reached(&self) -> bool {
        self.runs >= self.target
    }

    /// Legal deliveries in a full innings.
    pub fn max_balls(&self) -> u32 {
        self.max_overs.saturating_mul(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_table() {
        assert_eq!(HitQuality::Perfect.runs(), 6);
        assert_eq!(HitQuality::Good.runs(), 4);
        assert_eq!(HitQuality::Regular.runs(), 1);
        assert_eq!(HitQuality::Good.launch(), (8.0, -18.0));
        assert_eq!(HitQuality::Regular.announcement(), "ONE RUN!");
    }

    #[test]
    fn delivery_resolves_once() {
        let mut d = Delivery::new(1, Vec3::ZERO, Vec3::Z, 0);
        assert!(d.resolve(Outcome::Dot));
        assert!(!d.resolve(Outcome::Bowled));
        assert_eq!(d.outcome, Some(Outcome::Dot));
    }

    #[test]
    fn restart_invalidates_old_tickets() {
        let mut state = MatchState::new(20);
        state.restart(150, 20);
        let old = state.ticket();

        state.runs = 40;
        state.restart(130, 20);
        assert!(!state.is_current(old));
        assert_eq!(state.runs, 0);
        assert_eq!(state.target, 130);
        assert_eq!(state.phase, Phase::AwaitingDelivery);
    }

    #[test]
    fn new_delivery_invalidates_ticket() {
        let mut state = MatchState::new(20);
        state.restart(150, 20);
        let ticket = state.ticket();
        assert!(state.is_current(ticket));
        state.delivery_seq += 1;
        assert!(!state.is_current(ticket));
    }

    #[test]
    fn innings_length_follows_overs() {
        let mut state = MatchState::new(20);
        assert_eq!(state.max_balls(), 120);
        state.restart(150, 2);
        assert_eq!(state.max_balls(), 12);
        state.max_overs = u32::MAX;
        assert_eq!(state.max_balls(), u32::MAX);
    }

    #[test]
    fn outcome_runs() {
        assert_eq!(Outcome::Hit { quality: HitQuality::Perfect }.runs(), 6);
        assert_eq!(Outcome::Boundary { runs: 4 }.runs(), 4);
        assert_eq!(Outcome::Bowled.runs(), 0);
    }
}
