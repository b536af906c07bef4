// extensions/mod.rs
//
// Optional helpers decoupled from core Entity/Scene.

pub mod easing;

pub use easing::{approach_vec3, clamp, lerp, lerp_vec3};
