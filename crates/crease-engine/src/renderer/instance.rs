use bytemuck::{Pod, Zeroable};

/// Per-model transform data read by the host renderer.
/// Must match the host protocol: 11 floats = 44 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ModelInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Rotation quaternion (x, y, z, w).
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
    /// Host-side mesh slot.
    pub mesh: f32,
}

impl ModelInstance {
    pub const FLOATS: usize = 11;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Model buffer handed to the host once per frame.
pub struct ModelBuffer {
    pub instances: Vec<ModelInstance>,
}

impl ModelBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(16),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: ModelInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for host reads out of wasm memory.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    /// Instance data as a flat float slice.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for ModelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_protocol() {
        assert_eq!(std::mem::size_of::<ModelInstance>(), ModelInstance::STRIDE_BYTES);
    }

    #[test]
    fn floats_view_is_flat() {
        let mut buf = ModelBuffer::new();
        buf.push(ModelInstance {
            z: 7.0,
            qw: 1.0,
            mesh: 3.0,
            ..Default::default()
        });
        let floats = buf.as_floats();
        assert_eq!(floats.len(), ModelInstance::FLOATS);
        assert_eq!(floats[2], 7.0);
        assert_eq!(floats[6], 1.0);
        assert_eq!(floats[10], 3.0);
    }
}
