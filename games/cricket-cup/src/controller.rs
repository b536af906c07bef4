//! The match state machine.
//!
//! Every mutation happens through a transition method on `MatchController`.
//! Deferred work (score commits, next deliveries, timeouts) is queued as a
//! `Deferred` message carrying the `Ticket` of the ball it was scheduled
//! for; a message whose ticket is no longer current is dropped.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crease_engine::{clamp, GameClock, Scene, TimerQueue};

use crate::config::MatchConfig;
use crate::error::MatchError;
use crate::models::{self, tags};
use crate::physics::{BallEvent, PhysicsAdapter, BALL_START, STUMPS_POSITION};
use crate::scoring::{
    boundary_runs, classify_hit, format_overs, format_score, grounded_runs, in_miss_tolerance,
    out_of_play, planar_distance, runs_announcement,
};
use crate::state::{Delivery, HitQuality, MatchState, Outcome, Phase, Ticket};
use crate::ui::UiEvent;

const BAT_RETURN_MS: u64 = 300;
const KEYBOARD_HINT: &str = "Press SPACE when ball is close!";
/// Largest lateral launch speed a steered shot can reach.
const MAX_LATERAL: f32 = 6.0;

/// Work scheduled for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    NextDelivery(Ticket),
    ScoreCommit(Ticket),
    MissCheck(Ticket),
    SafetyTimeout(Ticket),
    BatReturn(Ticket),
}

/// Result of a swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swing {
    Hit(HitQuality),
    /// Swing missed. `tracked` when the ball was close enough for the miss
    /// to settle the delivery as a dot ball.
    Miss { tracked: bool },
    /// Not the first swing of this delivery.
    Ignored,
}

pub struct MatchController<P: PhysicsAdapter> {
    config: MatchConfig,
    state: MatchState,
    physics: P,
    timers: TimerQueue<Deferred>,
    clock: GameClock,
    rng: Pcg32,
    outbox: Vec<UiEvent>,
    follow_ball: bool,
}

impl<P: PhysicsAdapter> MatchController<P> {
    pub fn new(config: MatchConfig, physics: P, seed: u64) -> Self {
        let state = MatchState::new(config.max_overs);
        Self {
            config,
            state,
            physics,
            timers: TimerQueue::new(),
            clock: GameClock::new(),
            rng: Pcg32::seed_from_u64(seed),
            outbox: Vec::new(),
            follow_ball: false,
        }
    }

    // -- Accessors --

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Replace the rules. Timings apply immediately; overs and target range
    /// from the next match start.
    pub fn set_config(&mut self, config: MatchConfig) {
        self.config = config;
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Whether the camera should be trailing the ball.
    pub fn follow_ball(&self) -> bool {
        self.follow_ball
    }

    pub fn take_ui_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.outbox)
    }

    // -- Transitions --

    /// Begin a fresh match. Valid before the first match or after one ended.
    pub fn start_match(&mut self, scene: &mut Scene) -> Result<u32, MatchError> {
        match self.state.phase {
            Phase::NotStarted | Phase::Finished => {}
            phase => {
                return Err(MatchError::InvalidPhase {
                    op: "start_match",
                    phase,
                })
            }
        }

        let target = self
            .rng
            .random_range(self.config.target_min..=self.config.target_max);
        self.state.restart(target, self.config.max_overs);
        self.clock.set_paused(false);
        self.follow_ball = false;

        models::reset_positions(scene);
        if let Err(err) = self.physics.reset_ball(BALL_START, Vec3::ZERO) {
            log::warn!("{}; ball not reset for match start", err);
        }
        self.place_ball_model(scene, BALL_START);

        self.outbox.push(UiEvent::StartScreen { visible: false });
        self.outbox.push(UiEvent::EndScreen {
            visible: false,
            result: None,
            final_score: None,
        });
        self.outbox.push(UiEvent::Target { runs: target });
        self.emit_score();
        self.emit_overs();
        if self.config.show_keyboard_hint {
            self.outbox.push(UiEvent::message(KEYBOARD_HINT, 2000));
        }

        let ticket = self.state.ticket();
        self.schedule(self.config.warmup_ms, Deferred::NextDelivery(ticket));
        log::info!("match {} started, chasing {}", self.state.epoch, target);
        Ok(target)
    }

    /// Start again after a finished match.
    pub fn restart(&mut self, scene: &mut Scene) -> Result<u32, MatchError> {
        if self.state.phase != Phase::Finished {
            return Err(MatchError::InvalidPhase {
                op: "restart",
                phase: self.state.phase,
            });
        }
        self.start_match(scene)
    }

    /// Bowl the next ball. Returns the new delivery's sequence number.
    pub fn deliver_ball(&mut self, scene: &mut Scene) -> Result<u32, MatchError> {
        if self.state.paused {
            return Err(MatchError::Paused);
        }
        if self.state.phase != Phase::AwaitingDelivery {
            return Err(MatchError::InvalidPhase {
                op: "deliver_ball",
                phase: self.state.phase,
            });
        }

        let now = self.clock.now_ms();
        if let Some(last) = self.state.last_delivery_at {
            let elapsed_ms = now.saturating_sub(last);
            let min_ms = self.config.min_rebowl_interval_ms;
            if elapsed_ms < min_ms {
                return Err(MatchError::TooSoon { elapsed_ms, min_ms });
            }
        }

        let origin = self.config.bowl_origin;
        let velocity = self.config.bowl_velocity;
        if let Err(err) = self.physics.reset_ball(origin, velocity) {
            // The safety timeout will move the match on.
            log::warn!("{}; delivery bowled without a ball", err);
        }
        self.place_ball_model(scene, origin);

        let state = &mut self.state;
        state.delivery_seq += 1;
        state.balls_bowled += 1;
        state.hit_registered = false;
        state.swung = false;
        state.phase = Phase::BallInFlight;
        state.last_delivery_at = Some(now);
        state.delivery = Some(Delivery::new(state.delivery_seq, origin, velocity, now));
        let seq = state.delivery_seq;

        self.follow_ball = false;
        let ticket = self.state.ticket();
        self.schedule(self.config.safety_timeout_ms, Deferred::SafetyTimeout(ticket));
        self.emit_overs();

        log::info!("ball {} bowled ({})", seq, format_overs(self.state.balls_bowled));
        Ok(seq)
    }

    /// Swing the bat. Only the first swing of a delivery does anything.
    pub fn attempt_hit(&mut self, hint: f32, scene: &mut Scene) -> Result<Swing, MatchError> {
        if self.state.paused {
            return Err(MatchError::Paused);
        }
        if self.state.phase != Phase::BallInFlight {
            return Err(MatchError::InvalidPhase {
                op: "attempt_hit",
                phase: self.state.phase,
            });
        }
        if self.state.swung {
            return Ok(Swing::Ignored);
        }

        self.state.swung = true;
        self.swing_bat(scene);

        let Some(ball) = self.physics.ball_position() else {
            log::warn!("ball body missing; swing has nothing to hit");
            return Ok(Swing::Miss { tracked: false });
        };

        if let Some(quality) = classify_hit(ball.z) {
            self.register_hit(quality, hint);
            return Ok(Swing::Hit(quality));
        }

        if in_miss_tolerance(ball.z) {
            let ticket = self.state.ticket();
            self.schedule(self.config.miss_check_ms, Deferred::MissCheck(ticket));
            log::debug!("missed at z={:.2}", ball.z);
            Ok(Swing::Miss { tracked: true })
        } else {
            Ok(Swing::Miss { tracked: false })
        }
    }

    /// Finish the match. Valid from any state except `Finished`.
    pub fn end_match(&mut self, won: bool) -> Result<(), MatchError> {
        if self.state.phase == Phase::Finished {
            return Err(MatchError::InvalidPhase {
                op: "end_match",
                phase: Phase::Finished,
            });
        }

        self.state.phase = Phase::Finished;
        self.state.paused = false;
        self.clock.set_paused(false);

        let final_score = format!(
            "Final Score: {} ({})",
            format_score(self.state.runs, self.state.wickets),
            format_overs(self.state.balls_bowled)
        );
        let result = if won { "You Won!" } else { "You Lost!" };
        log::info!("match {} over: {} {}", self.state.epoch, result, final_score);

        self.outbox.push(UiEvent::EndScreen {
            visible: true,
            result: Some(result.to_string()),
            final_score: Some(final_score),
        });
        Ok(())
    }

    /// Freeze the match clock. Pending timers keep their remaining delay.
    pub fn pause(&mut self) -> Result<(), MatchError> {
        match self.state.phase {
            Phase::NotStarted | Phase::Finished => Err(MatchError::InvalidPhase {
                op: "pause",
                phase: self.state.phase,
            }),
            _ => {
                if !self.state.paused {
                    self.state.paused = true;
                    self.clock.set_paused(true);
                    log::info!("paused at {} ms", self.clock.now_ms());
                }
                Ok(())
            }
        }
    }

    pub fn resume(&mut self) -> Result<(), MatchError> {
        if self.state.paused {
            self.state.paused = false;
            self.clock.set_paused(false);
            log::info!("resumed at {} ms", self.clock.now_ms());
        }
        Ok(())
    }

    // -- Per-frame work --

    /// Advance the match clock, fire due timers, then check the ball is
    /// still in play. Does nothing while paused.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) {
        if self.state.paused {
            return;
        }
        self.clock.advance(dt);

        let now = self.clock.now_ms();
        while let Some(message) = self.timers.pop_due(now) {
            self.dispatch(message, scene);
        }

        self.poll_bounds();
        if let Some(pos) = self.physics.ball_position() {
            self.place_ball_model(scene, pos);
        }
    }

    /// React to a collision reported by the physics adapter.
    pub fn on_ball_event(&mut self, event: BallEvent) {
        if self.state.paused {
            return;
        }
        match event {
            BallEvent::HitBat => self.on_bat_contact(),
            BallEvent::HitStumps => self.on_stumps_hit(),
            BallEvent::Grounded { position } => self.on_grounded(position),
        }
    }

    fn dispatch(&mut self, message: Deferred, scene: &mut Scene) {
        match message {
            Deferred::NextDelivery(ticket) => self.on_next_delivery(ticket, scene),
            Deferred::ScoreCommit(ticket) => self.on_score_commit(ticket),
            Deferred::MissCheck(ticket) => self.on_miss_check(ticket),
            Deferred::SafetyTimeout(ticket) => self.on_safety_timeout(ticket),
            Deferred::BatReturn(ticket) => {
                if ticket.epoch == self.state.epoch
                    && !scene.set_rotation(tags::BAT, models::bat_rest_rotation())
                {
                    log::warn!("bat model missing; swing not restored");
                }
            }
        }
    }

    // -- Deferred handlers --

    fn on_next_delivery(&mut self, ticket: Ticket, scene: &mut Scene) {
        if !self.state.is_current(ticket) {
            log::debug!("stale next delivery {:?}", ticket);
            return;
        }

        if self.config.overs_limit_ends_match
            && self.state.phase == Phase::AwaitingDelivery
            && self.state.balls_bowled >= self.state.max_balls()
        {
            log::info!("overs complete");
            let won = self.state.target_reached();
            if let Err(err) = self.end_match(won) {
                log::debug!("{}", err);
            }
            return;
        }

        match self.deliver_ball(scene) {
            Ok(_) => {}
            Err(MatchError::TooSoon { elapsed_ms, min_ms }) => {
                log::debug!("re-bowl too soon; retrying in {} ms", min_ms - elapsed_ms);
                self.schedule(min_ms - elapsed_ms, Deferred::NextDelivery(ticket));
            }
            Err(err) => log::debug!("next delivery dropped: {}", err),
        }
    }

    fn on_score_commit(&mut self, ticket: Ticket) {
        if !self.state.is_current(ticket) || self.state.phase != Phase::Resolving {
            log::debug!("stale score commit {:?}", ticket);
            return;
        }
        let Some(quality) = self.state.delivery.as_ref().and_then(|d| d.quality) else {
            return;
        };

        self.state.phase = Phase::AwaitingDelivery;
        self.outbox
            .push(UiEvent::message(quality.announcement(), 1000));
        self.award(quality.runs());
    }

    fn on_miss_check(&mut self, ticket: Ticket) {
        if !self.state.is_current(ticket) || self.state.phase != Phase::BallInFlight {
            log::debug!("stale miss check {:?}", ticket);
            return;
        }
        if self.close_delivery(Outcome::Dot) {
            self.schedule_next(self.config.next_after_miss_ms);
        }
    }

    fn on_safety_timeout(&mut self, ticket: Ticket) {
        if !self.state.is_current(ticket) || self.state.phase != Phase::BallInFlight {
            log::debug!("stale safety timeout {:?}", ticket);
            return;
        }
        log::warn!("ball {} still in flight; forcing next delivery", ticket.delivery);
        if self.close_delivery(Outcome::Dot) {
            self.schedule_next(self.config.next_after_dead_ball_ms);
        }
    }

    // -- Collision handlers --

    fn on_bat_contact(&mut self) {
        if !self.state.swung
            || !matches!(self.state.phase, Phase::BallInFlight | Phase::Resolving)
        {
            return;
        }
        let Some(delivery) = self.state.delivery.as_mut() else {
            return;
        };
        if delivery.bat_contact {
            return;
        }
        delivery.bat_contact = true;
        self.follow_ball = true;
        self.outbox.push(UiEvent::message("Ball hit!", 1000));
    }

    fn on_stumps_hit(&mut self) {
        if self.state.phase != Phase::BallInFlight || !self.close_delivery(Outcome::Bowled) {
            return;
        }

        self.state.wickets += 1;
        self.outbox.push(UiEvent::message("OUT! BOWLED!", 2000));
        self.emit_score();
        log::info!("bowled; {} down", self.state.wickets);

        if self.state.is_all_out() {
            let won = self.state.target_reached();
            if let Err(err) = self.end_match(won) {
                log::debug!("{}", err);
            }
        } else {
            self.schedule_next(self.config.next_after_dead_ball_ms);
        }
    }

    fn on_grounded(&mut self, position: Vec3) {
        if self.state.phase != Phase::BallInFlight {
            return;
        }

        // First bounce in front of the stumps is the ball pitching.
        if let Some(delivery) = self.state.delivery.as_mut() {
            if !delivery.pitched && position.z < STUMPS_POSITION.z {
                delivery.pitched = true;
                log::debug!("pitched at z={:.2}", position.z);
                return;
            }
        }

        let distance = planar_distance(position);
        if distance > self.config.boundary_radius {
            let runs = boundary_runs(position.y, self.config.six_height);
            if self.close_delivery(Outcome::Boundary { runs }) {
                let text = if runs == 6 { "SIX!" } else { "FOUR!" };
                self.outbox.push(UiEvent::message(text, 2000));
                if !self.award(runs) {
                    self.schedule_next(self.config.next_after_dead_ball_ms);
                }
            }
        } else if self.state.swung {
            let runs = grounded_runs(distance);
            if self.close_delivery(Outcome::Ran { runs }) {
                self.outbox
                    .push(UiEvent::message(runs_announcement(runs), 1000));
                if !self.award(runs) {
                    self.schedule_next(self.config.next_after_dead_ball_ms);
                }
            }
        } else if self.close_delivery(Outcome::Dot) {
            self.schedule_next(self.config.next_after_dead_ball_ms);
        }
    }

    // -- Helpers --

    fn register_hit(&mut self, quality: HitQuality, hint: f32) {
        let jitter: f32 = self.rng.random_range(-3.0..3.0);
        let lateral = clamp(jitter + clamp(hint, -1.0, 1.0) * 3.0, -MAX_LATERAL, MAX_LATERAL);
        let (up, forward) = quality.launch();
        let velocity = Vec3::new(lateral, up, forward);
        let spin = Vec3::new(0.0, lateral, 2.0);
        if let Err(err) = self.physics.apply_hit_velocity(velocity, spin) {
            log::warn!("{}; hit scored without re-launch", err);
        }

        self.state.hit_registered = true;
        if let Some(delivery) = self.state.delivery.as_mut() {
            delivery.quality = Some(quality);
            delivery.resolve(Outcome::Hit { quality });
        }
        self.state.phase = Phase::Resolving;
        self.follow_ball = true;

        let ticket = self.state.ticket();
        self.schedule(self.config.score_commit_delay_ms, Deferred::ScoreCommit(ticket));
        self.schedule_next(self.config.next_after_hit_ms);
        log::info!("{:?} hit for {}", quality, quality.runs());
    }

    /// Record the delivery's outcome and stop treating the ball as live.
    /// Returns `false` if the delivery had already been resolved.
    fn close_delivery(&mut self, outcome: Outcome) -> bool {
        let resolved = match self.state.delivery.as_mut() {
            Some(delivery) => delivery.resolve(outcome),
            None => false,
        };
        if resolved {
            self.state.phase = Phase::AwaitingDelivery;
        }
        resolved
    }

    /// Add runs and end the match if the target is reached.
    /// Returns `true` when the match ended.
    fn award(&mut self, runs: u32) -> bool {
        self.state.runs += runs;
        self.emit_score();
        if self.state.target_reached() {
            if let Err(err) = self.end_match(true) {
                log::debug!("{}", err);
            }
            return true;
        }
        false
    }

    fn poll_bounds(&mut self) {
        if self.state.phase != Phase::BallInFlight {
            return;
        }
        let Some(pos) = self.physics.ball_position() else {
            return;
        };
        if out_of_play(pos) {
            log::info!("ball out of play at {}", pos);
            if self.close_delivery(Outcome::Dot) {
                self.schedule_next(self.config.next_after_miss_ms);
            }
        }
    }

    fn swing_bat(&mut self, scene: &mut Scene) {
        if !scene.set_rotation(tags::BAT, models::bat_swing_rotation()) {
            log::warn!("bat model missing; no swing animation");
        }
        let ticket = self.state.ticket();
        self.schedule(BAT_RETURN_MS, Deferred::BatReturn(ticket));
    }

    fn place_ball_model(&self, scene: &mut Scene, pos: Vec3) {
        if !scene.set_position(tags::BALL, pos) {
            log::debug!("ball model missing");
        }
    }

    fn schedule(&mut self, delay_ms: u64, message: Deferred) {
        self.timers.schedule(self.clock.now_ms(), delay_ms, message);
    }

    /// Queue the next delivery for the current ball's successor.
    fn schedule_next(&mut self, delay_ms: u64) {
        debug_assert_ne!(self.state.phase, Phase::BallInFlight);
        let ticket = self.state.ticket();
        self.schedule(delay_ms, Deferred::NextDelivery(ticket));
    }

    fn emit_score(&mut self) {
        self.outbox.push(UiEvent::Score {
            text: format_score(self.state.runs, self.state.wickets),
            runs: self.state.runs,
            wickets: self.state.wickets,
        });
    }

    fn emit_overs(&mut self) {
        self.outbox.push(UiEvent::Overs {
            text: format_overs(self.state.balls_bowled),
            balls: self.state.balls_bowled,
        });
    }
}
