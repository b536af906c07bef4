use crate::components::entity::Entity;
use crate::renderer::instance::{ModelBuffer, ModelInstance};

/// Build the model buffer from a set of entities.
/// Inactive entities and entities without a mesh are skipped.
pub fn build_model_buffer<'a>(entities: impl Iterator<Item = &'a Entity>, buffer: &mut ModelBuffer) {
    buffer.clear();

    for entity in entities {
        if !entity.active {
            continue;
        }

        let mesh = match entity.mesh {
            Some(m) => m,
            None => continue,
        };

        buffer.push(ModelInstance {
            x: entity.pos.x,
            y: entity.pos.y,
            z: entity.pos.z,
            qx: entity.rotation.x,
            qy: entity.rotation.y,
            qz: entity.rotation.z,
            qw: entity.rotation.w,
            sx: entity.scale.x,
            sy: entity.scale.y,
            sz: entity.scale.z,
            mesh: mesh as f32,
        });
    }
}
