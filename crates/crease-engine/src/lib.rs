pub mod api;
pub mod core;
pub mod components;
pub mod error;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::EntityId;
pub use components::entity::Entity;
pub use core::events::{EventBus, SubscriptionId};
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, GameClock};
pub use core::timers::TimerQueue;
pub use error::EngineError;
pub use renderer::instance::{ModelInstance, ModelBuffer};
pub use renderer::camera::{CameraMode, CameraRig};
pub use input::queue::{InputEvent, InputQueue};
pub use systems::render::build_model_buffer;

#[cfg(feature = "physics")]
pub use core::physics::{
    PhysicsWorld, PhysicsBody, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionPair,
};

pub use extensions::{approach_vec3, clamp, lerp, lerp_vec3};
