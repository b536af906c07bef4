//! Ball physics behind a narrow adapter so the match logic never sees the
//! solver.

use glam::Vec3;
use thiserror::Error;

use crease_engine::{
    BodyDesc, ColliderDesc, ColliderMaterial, CollisionPair, EngineError, EntityId, PhysicsBody,
    PhysicsWorld,
};

pub const BALL: EntityId = EntityId(1);
pub const BAT: EntityId = EntityId(2);
pub const BOWLER: EntityId = EntityId(3);
pub const STUMPS: EntityId = EntityId(4);
pub const GROUND: EntityId = EntityId(5);

pub const GRAVITY: Vec3 = Vec3::new(0.0, -7.5, 0.0);

pub const BALL_RADIUS: f32 = 0.12;
const BALL_MASS: f32 = 0.2;
const BALL_LINEAR_DAMPING: f32 = 0.01;
const BALL_ANGULAR_DAMPING: f32 = 0.01;
/// Resting spot at the bowler's end before the first delivery.
pub const BALL_START: Vec3 = Vec3::new(0.0, 0.5, -7.0);

pub const BAT_HALF_EXTENTS: Vec3 = Vec3::new(0.1, 0.025, 0.4);
pub const BAT_POSITION: Vec3 = Vec3::new(0.0, 0.5, 6.5);
pub const STUMPS_HALF_EXTENTS: Vec3 = Vec3::new(0.3, 0.35, 0.05);
pub const STUMPS_POSITION: Vec3 = Vec3::new(0.0, 0.35, 7.0);

// Rapier averages the two restitution coefficients of a contact. Against the
// ball (0.8) these give 0.8 off the ground, 0.9 off the bat, 0.5 off the stumps.
const BALL_RESTITUTION: f32 = 0.8;
const GROUND_RESTITUTION: f32 = 0.8;
const BAT_RESTITUTION: f32 = 1.0;
const STUMPS_RESTITUTION: f32 = 0.2;
const GROUND_FRICTION: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("physics body '{0}' is missing")]
    MissingBody(&'static str),
}

/// Collision causes the match cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BallEvent {
    HitBat,
    HitStumps,
    /// Ball touched the ground at `position`.
    Grounded { position: Vec3 },
}

/// What the match controller needs from a physics engine.
pub trait PhysicsAdapter {
    /// Teleport the ball and give it a fresh velocity, clearing spin and forces.
    fn reset_ball(&mut self, position: Vec3, velocity: Vec3) -> Result<(), PhysicsError>;

    fn ball_position(&self) -> Option<Vec3>;

    /// Replace the ball's linear and angular velocity after bat contact.
    fn apply_hit_velocity(&mut self, velocity: Vec3, spin: Vec3) -> Result<(), PhysicsError>;

    fn step(&mut self, dt: f32);

    /// Ball events produced since the last drain, in contact order.
    fn drain_events(&mut self) -> Vec<BallEvent>;
}

/// Rapier-backed pitch: ball, bat, stumps and ground plane.
///
/// The bat collider never moves; swings only animate the bat model.
pub struct PitchPhysics {
    world: PhysicsWorld,
    ball: Option<PhysicsBody>,
    contacts: Vec<CollisionPair>,
    events: Vec<BallEvent>,
}

impl PitchPhysics {
    pub fn new(gravity: Vec3, dt: f32) -> Result<Self, EngineError> {
        if !gravity.is_finite() {
            return Err(EngineError::init("physics", format!("gravity {} is not finite", gravity)));
        }
        if dt.is_nan() || dt <= 0.0 {
            return Err(EngineError::init("physics", format!("timestep {} must be positive", dt)));
        }

        let mut world = PhysicsWorld::new(gravity);
        world.set_dt(dt);

        let ball_volume = 4.0 / 3.0 * std::f32::consts::PI * BALL_RADIUS.powi(3);
        let ball = world.create_body(
            BALL,
            &BodyDesc::dynamic(ColliderDesc::Ball { radius: BALL_RADIUS })
                .with_position(BALL_START)
                .with_linear_damping(BALL_LINEAR_DAMPING)
                .with_angular_damping(BALL_ANGULAR_DAMPING)
                .with_ccd(true),
            ColliderMaterial {
                restitution: BALL_RESTITUTION,
                friction: GROUND_FRICTION,
                density: BALL_MASS / ball_volume,
            },
        );

        world.create_body(
            BAT,
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: BAT_HALF_EXTENTS,
            })
            .with_position(BAT_POSITION),
            ColliderMaterial {
                restitution: BAT_RESTITUTION,
                ..Default::default()
            },
        );

        world.create_body(
            STUMPS,
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: STUMPS_HALF_EXTENTS,
            })
            .with_position(STUMPS_POSITION),
            ColliderMaterial {
                restitution: STUMPS_RESTITUTION,
                ..Default::default()
            },
        );

        world.create_body(
            GROUND,
            &BodyDesc::fixed(ColliderDesc::HalfSpace { normal: Vec3::Y }),
            ColliderMaterial {
                restitution: GROUND_RESTITUTION,
                friction: GROUND_FRICTION,
                density: 1.0,
            },
        );

        Ok(Self {
            world,
            ball: Some(ball),
            contacts: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Take the ball out of the simulation.
    pub fn remove_ball(&mut self) {
        if let Some(ball) = self.ball.take() {
            self.world.remove_body(&ball);
        }
    }

    pub fn ball_velocity(&self) -> Option<Vec3> {
        self.ball.as_ref().and_then(|b| self.world.velocity(b))
    }

    fn ball_body(&self) -> Result<&PhysicsBody, PhysicsError> {
        self.ball.as_ref().ok_or(PhysicsError::MissingBody("ball"))
    }
}

impl PhysicsAdapter for PitchPhysics {
    fn reset_ball(&mut self, position: Vec3, velocity: Vec3) -> Result<(), PhysicsError> {
        let ball = *self.ball_body()?;
        if self.world.reset_body(&ball, position, velocity) {
            Ok(())
        } else {
            Err(PhysicsError::MissingBody("ball"))
        }
    }

    fn ball_position(&self) -> Option<Vec3> {
        let ball = self.ball.as_ref()?;
        self.world.body_position(ball).map(|(pos, _)| pos)
    }

    fn apply_hit_velocity(&mut self, velocity: Vec3, spin: Vec3) -> Result<(), PhysicsError> {
        let ball = *self.ball_body()?;
        if self.world.set_velocity(&ball, velocity) && self.world.set_angular_velocity(&ball, spin) {
            Ok(())
        } else {
            Err(PhysicsError::MissingBody("ball"))
        }
    }

    fn step(&mut self, dt: f32) {
        self.world.set_dt(dt);
        self.world.step_into(&mut self.contacts);

        for pair in self.contacts.drain(..) {
            if !pair.started {
                continue;
            }
            let event = match pair.other(BALL) {
                Some(BAT) => BallEvent::HitBat,
                Some(STUMPS) => BallEvent::HitStumps,
                Some(GROUND) => {
                    let position = match &self.ball {
                        Some(ball) => self.world.body_position(ball).map(|(pos, _)| pos),
                        None => None,
                    };
                    match position {
                        Some(position) => BallEvent::Grounded { position },
                        None => continue,
                    }
                }
                _ => continue,
            };
            self.events.push(event);
        }
    }

    fn drain_events(&mut self) -> Vec<BallEvent> {
        std::mem::take(&mut self.events)
    }
}
