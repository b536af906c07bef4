// extensions/easing.rs
//
// Scalar and vector interpolation helpers.
// No dependencies on Entity/Scene, just math.

use glam::Vec3;

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f32::clamp` this never panics: an inverted range returns `min`.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two Vec3 values.
#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    Vec3::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t), lerp(a.z, b.z, t))
}

/// Move `current` toward `target` by a rate-per-second factor.
///
/// The factor is clamped to `[0, 1]` so a long frame snaps instead of
/// overshooting.
#[inline]
pub fn approach_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    lerp_vec3(current, target, clamp(rate * dt, 0.0, 1.0))
}
