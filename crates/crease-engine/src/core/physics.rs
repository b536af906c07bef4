use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use std::sync::Mutex;

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam to nalgebra and back
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn na_to_vec3(v: &nalgebra::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn na_iso_to_pos_rot(iso: &nalgebra::Isometry3<f32>) -> (Vec3, Quat) {
    let pos = Vec3::new(iso.translation.x, iso.translation.y, iso.translation.z);
    let q = iso.rotation.quaternion();
    let rot = Quat::from_xyzw(q.i, q.j, q.k, q.w);
    (pos, rot)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Infinite plane through the body origin, solid on the side opposite `normal`.
    HalfSpace { normal: Vec3 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ColliderDesc::HalfSpace { normal } => {
                ColliderBuilder::halfspace(nalgebra::Unit::new_normalize(vec3_to_na(normal)))
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub velocity: Vec3,
    pub gravity_scale: f32,
    pub ccd: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Whether the collider reports collision start/stop events.
    pub report_collisions: bool,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            gravity_scale: 1.0,
            ccd: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
            report_collisions: true,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            gravity_scale: 0.0,
            ccd: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
            report_collisions: true,
        }
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Set the linear damping (velocity decay). Higher values slow the body faster.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Set the angular damping (rotation decay).
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }
}

/// Handle pair referencing Rapier internals.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A collision event between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the collision just started, `false` when it ended.
    pub started: bool,
}

impl CollisionPair {
    /// If one side of the pair is `id`, return the other side.
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.entity_a == id {
            Some(self.entity_b)
        } else if self.entity_b == id {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        match self.collisions.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut guard) = self.collisions.lock() {
            guard.push(event);
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
        // Contact forces are not consumed but the trait requires this.
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier3D boilerplate into a single struct.
///
/// Solver tuning (iterations, broadphase) stays in here; callers only see
/// bodies, velocities and collision pairs.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector3<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector (Y-up).
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: vec3_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec3_to_na(desc.position))
            .linvel(vec3_to_na(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .ccd_enabled(desc.ccd)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(false)
            .user_data(entity_id.as_u128())
            .build();

        let body_handle = self.bodies.insert(rb);

        let events = if desc.report_collisions {
            ActiveEvents::COLLISION_EVENTS
        } else {
            ActiveEvents::empty()
        };
        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .active_events(events)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        let removed = self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if removed.is_none() {
            log::warn!("remove_body: {:?} was already removed", body.body_handle);
        }
    }

    /// Step the simulation and collect collision events into the provided Vec.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Drain collision events and resolve entity IDs from user_data
        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                collision_events.push(CollisionPair {
                    entity_a: a,
                    entity_b: b,
                    started,
                });
            }
        }
    }

    /// Teleport a body and zero its velocities, forces and torques.
    /// Returns `false` when the body no longer exists.
    pub fn reset_body(&mut self, body: &PhysicsBody, pos: Vec3, vel: Vec3) -> bool {
        match self.bodies.get_mut(body.body_handle) {
            Some(rb) => {
                rb.set_translation(vec3_to_na(pos), true);
                rb.set_rotation(nalgebra::UnitQuaternion::identity(), true);
                rb.reset_forces(true);
                rb.reset_torques(true);
                rb.set_angvel(nalgebra::Vector3::zeros(), true);
                rb.set_linvel(vec3_to_na(vel), true);
                true
            }
            None => false,
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec3) -> bool {
        match self.bodies.get_mut(body.body_handle) {
            Some(rb) => {
                rb.set_linvel(vec3_to_na(vel), true);
                true
            }
            None => false,
        }
    }

    /// Set the angular velocity of a body directly.
    pub fn set_angular_velocity(&mut self, body: &PhysicsBody, angvel: Vec3) -> bool {
        match self.bodies.get_mut(body.body_handle) {
            Some(rb) => {
                rb.set_angvel(vec3_to_na(angvel), true);
                true
            }
            None => false,
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Option<Vec3> {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.linvel()))
    }

    /// Get the current position and rotation of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_iso_to_pos_rot(rb.position()))
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> BodyDesc {
        BodyDesc::dynamic(ColliderDesc::Ball { radius: 0.5 })
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world.create_body(EntityId(1), &ball(), ColliderMaterial::default());
        assert_eq!(world.body_count(), 1);
        world.remove_body(&body);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.8, 0.0));
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &ball().with_position(Vec3::new(0.0, 10.0, 0.0)),
            ColliderMaterial::default(),
        );

        let mut events = Vec::new();
        for _ in 0..10 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body).unwrap();
        assert!(pos.y < 10.0, "Body should fall: y={}", pos.y);
    }

    #[test]
    fn reset_body_teleports_and_sets_velocity() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &ball().with_velocity(Vec3::new(5.0, 0.0, 0.0)),
            ColliderMaterial::default(),
        );
        let mut events = Vec::new();
        world.step_into(&mut events);

        assert!(world.reset_body(&body, Vec3::new(0.0, 1.0, -5.0), Vec3::new(0.0, 2.0, 8.0)));
        let (pos, _) = world.body_position(&body).unwrap();
        assert_eq!(pos, Vec3::new(0.0, 1.0, -5.0));
        let vel = world.velocity(&body).unwrap();
        assert!((vel.z - 8.0).abs() < 0.001);
    }

    #[test]
    fn removed_body_reports_missing() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world.create_body(EntityId(1), &ball(), ColliderMaterial::default());
        world.remove_body(&body);
        assert!(!world.set_velocity(&body, Vec3::X));
        assert!(world.velocity(&body).is_none());
        assert!(world.body_position(&body).is_none());
    }

    #[test]
    fn fixed_body_does_not_move() {
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.8, 0.0));
        world.set_dt(1.0 / 60.0);
        let body = world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::Cuboid {
                half_extents: Vec3::new(1.0, 0.5, 1.0),
            })
            .with_position(Vec3::new(0.0, 3.0, 0.0)),
            ColliderMaterial::default(),
        );
        let mut events = Vec::new();
        for _ in 0..10 {
            world.step_into(&mut events);
        }
        let (pos, _) = world.body_position(&body).unwrap();
        assert!((pos.y - 3.0).abs() < 0.001, "Fixed body should not move: y={}", pos.y);
    }

    #[test]
    fn ball_dropped_on_ground_reports_collision() {
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.8, 0.0));
        world.set_dt(1.0 / 60.0);
        world.create_body(
            EntityId(1),
            &BodyDesc::fixed(ColliderDesc::HalfSpace { normal: Vec3::Y }),
            ColliderMaterial::default(),
        );
        world.create_body(
            EntityId(2),
            &ball().with_position(Vec3::new(0.0, 2.0, 0.0)),
            ColliderMaterial::default(),
        );

        let mut all_events = Vec::new();
        for _ in 0..120 {
            world.step_into(&mut all_events);
        }

        let started: Vec<_> = all_events.iter().filter(|e| e.started).collect();
        assert!(!started.is_empty(), "Ball should touch the ground");
        assert_eq!(started[0].other(EntityId(2)), Some(EntityId(1)));
    }

    #[test]
    fn collision_pair_other() {
        let pair = CollisionPair {
            entity_a: EntityId(1),
            entity_b: EntityId(2),
            started: true,
        };
        assert_eq!(pair.other(EntityId(1)), Some(EntityId(2)));
        assert_eq!(pair.other(EntityId(2)), Some(EntityId(1)));
        assert_eq!(pair.other(EntityId(3)), None);
    }

    #[test]
    fn builder_pattern() {
        let desc = ball()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_velocity(Vec3::new(0.0, 2.0, 8.0))
            .with_gravity_scale(0.5)
            .with_linear_damping(0.01)
            .with_ccd(true);

        assert_eq!(desc.body_type, BodyType::Dynamic);
        assert_eq!(desc.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(desc.velocity, Vec3::new(0.0, 2.0, 8.0));
        assert!((desc.gravity_scale - 0.5).abs() < 0.001);
        assert!(desc.ccd);

        let stumps = BodyDesc::fixed(ColliderDesc::Ball { radius: 1.0 });
        assert_eq!(stumps.body_type, BodyType::Fixed);
        assert_eq!(stumps.gravity_scale, 0.0);
    }
}
