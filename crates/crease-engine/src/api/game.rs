use glam::Vec3;

use crate::core::scene::Scene;
use crate::api::types::EntityId;
use crate::error::EngineError;
use crate::input::queue::InputQueue;
use crate::renderer::camera::CameraRig;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Frames longer than this (seconds) are dropped instead of simulated.
    pub max_frame_dt: f32,
    /// Maximum number of model instances (default: 64).
    pub max_instances: usize,
    /// Gravity vector for the physics simulation (Y-up).
    pub gravity: Vec3,
    /// Initial camera eye and look-at.
    pub camera_eye: Vec3,
    pub camera_look_at: Vec3,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_frame_dt: 0.1,
            max_instances: 64,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            camera_eye: Vec3::new(0.0, 3.0, 12.0),
            camera_look_at: Vec3::ZERO,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Apply host-supplied JSON settings. Called before init, at most once.
    fn configure(&mut self, _json: &str) -> Result<(), EngineError> {
        Ok(())
    }

    /// Setup initial state, spawn models, build the physics world.
    /// An error here is fatal to the session.
    fn init(&mut self, ctx: &mut EngineContext) -> Result<(), EngineError>;

    /// One fixed-timestep tick.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub camera: CameraRig,
    /// Serialized UI events for the host, drained once per frame.
    pub events: Vec<String>,
    next_id: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    pub fn with_config(config: &GameConfig) -> Self {
        Self {
            scene: Scene::new(),
            camera: CameraRig::new(config.camera_eye, config.camera_look_at),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Queue a serialized event for the host.
    pub fn emit_event(&mut self, event: String) {
        self.events.push(event);
    }

    /// Take all queued host events.
    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ctx = EngineContext::new();
        let a = ctx.next_id();
        let b = ctx.next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn camera_starts_at_configured_eye() {
        let config = GameConfig {
            camera_eye: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let ctx = EngineContext::with_config(&config);
        assert_eq!(ctx.camera.eye, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn take_events_drains() {
        let mut ctx = EngineContext::new();
        ctx.emit_event("{}".to_string());
        assert_eq!(ctx.take_events().len(), 1);
        assert!(ctx.events.is_empty());
    }
}
