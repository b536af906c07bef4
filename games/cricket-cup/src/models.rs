use std::f32::consts::FRAC_PI_2;
use std::f32::consts::FRAC_PI_4;

use glam::{Quat, Vec3};

use crease_engine::{EngineError, Entity, Scene};

use crate::physics::{
    BALL, BALL_RADIUS, BALL_START, BAT, BAT_HALF_EXTENTS, BAT_POSITION, BOWLER, STUMPS,
    STUMPS_HALF_EXTENTS, STUMPS_POSITION,
};

/// Model tags the match writes to.
pub mod tags {
    pub const BALL: &str = "ball";
    pub const BAT: &str = "bat";
    pub const BOWLER: &str = "bowler";
    pub const STUMPS: &str = "stumps";
}

/// Host mesh slots.
mod meshes {
    pub const BALL: u32 = 0;
    pub const BAT: u32 = 1;
    pub const BOWLER: u32 = 2;
    pub const STUMPS: u32 = 3;
}

pub const BOWLER_POSITION: Vec3 = Vec3::new(0.0, 0.0, -7.0);

/// Bat at rest, tilted forward over the crease.
pub fn bat_rest_rotation() -> Quat {
    Quat::from_rotation_x(FRAC_PI_4)
}

/// Bat at the bottom of a swing.
pub fn bat_swing_rotation() -> Quat {
    Quat::from_rotation_x(-FRAC_PI_2)
}

/// Spawn the four presentational models.
pub fn spawn_models(scene: &mut Scene) -> Result<(), EngineError> {
    scene.spawn(
        Entity::new(BALL)
            .with_tag(tags::BALL)
            .with_pos(BALL_START)
            .with_scale(Vec3::splat(BALL_RADIUS * 2.0))
            .with_mesh(meshes::BALL),
    );
    scene.spawn(
        Entity::new(BAT)
            .with_tag(tags::BAT)
            .with_pos(BAT_POSITION)
            .with_rotation(bat_rest_rotation())
            .with_scale(BAT_HALF_EXTENTS * 2.0)
            .with_mesh(meshes::BAT),
    );
    scene.spawn(
        Entity::new(BOWLER)
            .with_tag(tags::BOWLER)
            .with_pos(BOWLER_POSITION)
            .with_mesh(meshes::BOWLER),
    );
    scene.spawn(
        Entity::new(STUMPS)
            .with_tag(tags::STUMPS)
            .with_pos(STUMPS_POSITION)
            .with_scale(STUMPS_HALF_EXTENTS * 2.0)
            .with_mesh(meshes::STUMPS),
    );

    for tag in [tags::BALL, tags::BAT, tags::BOWLER, tags::STUMPS] {
        if scene.find_by_tag(tag).is_none() {
            return Err(EngineError::init("models", format!("model '{}' was not registered", tag)));
        }
    }
    Ok(())
}

/// Put the bat, bowler and stumps back in their starting poses.
/// Missing models are skipped with a warning.
pub fn reset_positions(scene: &mut Scene) {
    if !scene.set_position(tags::BAT, BAT_POSITION) || !scene.set_rotation(tags::BAT, bat_rest_rotation()) {
        log::warn!("bat model missing; skipping reset");
    }
    if !scene.set_position(tags::BOWLER, BOWLER_POSITION) {
        log::warn!("bowler model missing; skipping reset");
    }
    if !scene.set_position(tags::STUMPS, STUMPS_POSITION) {
        log::warn!("stumps model missing; skipping reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawns_all_models() {
        let mut scene = Scene::new();
        spawn_models(&mut scene).unwrap();
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.find_by_tag(tags::STUMPS).unwrap().pos, STUMPS_POSITION);
        assert_eq!(scene.get(BALL).unwrap().tag, tags::BALL);
    }

    #[test]
    fn reset_restores_bat_pose() {
        let mut scene = Scene::new();
        spawn_models(&mut scene).unwrap();
        scene.set_rotation(tags::BAT, bat_swing_rotation());
        scene.set_position(tags::BOWLER, Vec3::ZERO);

        reset_positions(&mut scene);
        let bat = scene.find_by_tag(tags::BAT).unwrap();
        assert!(bat.rotation.abs_diff_eq(bat_rest_rotation(), 1e-6));
        assert_eq!(scene.find_by_tag(tags::BOWLER).unwrap().pos, BOWLER_POSITION);
    }

    #[test]
    fn reset_returns_stumps_to_the_crease() {
        let mut scene = Scene::new();
        spawn_models(&mut scene).unwrap();
        scene.set_position(tags::STUMPS, Vec3::new(1.0, 0.0, 9.0));

        reset_positions(&mut scene);
        assert_eq!(scene.find_by_tag(tags::STUMPS).unwrap().pos, STUMPS_POSITION);
    }

    #[test]
    fn reset_tolerates_missing_models() {
        let mut scene = Scene::new();
        reset_positions(&mut scene);
        assert!(scene.is_empty());
    }
}
