use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::extensions::easing::approach_vec3;

/// How the rig chooses its target each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    /// Hold a fixed vantage point.
    Fixed { eye: Vec3, look_at: Vec3 },
    /// Trail a moving subject at a fixed offset, looking straight at it.
    Follow { offset: Vec3 },
}

/// Perspective camera that eases toward its current target.
pub struct CameraRig {
    /// Current eye position in world space.
    pub eye: Vec3,
    /// Current look-at point in world space.
    pub look_at: Vec3,
    pub mode: CameraMode,
    /// Fraction of the remaining distance covered per second.
    pub rate: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Column-major, as WebGL `uniformMatrix4fv` expects.
    pub fn to_cols_array(&self) -> [f32; 16] {
        bytemuck::cast(self.view_projection)
    }
}

impl CameraRig {
    pub fn new(eye: Vec3, look_at: Vec3) -> Self {
        Self {
            eye,
            look_at,
            mode: CameraMode::Fixed { eye, look_at },
            rate: 2.0,
            fov_y: 75f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }

    /// Switch to a fixed view. The eye eases there over the next frames.
    pub fn set_fixed(&mut self, eye: Vec3, look_at: Vec3) {
        self.mode = CameraMode::Fixed { eye, look_at };
    }

    /// Switch to a fixed view and jump there immediately.
    pub fn snap_to(&mut self, eye: Vec3, look_at: Vec3) {
        self.set_fixed(eye, look_at);
        self.eye = eye;
        self.look_at = look_at;
    }

    pub fn follow(&mut self, offset: Vec3) {
        self.mode = CameraMode::Follow { offset };
    }

    pub fn is_following(&self) -> bool {
        matches!(self.mode, CameraMode::Follow { .. })
    }

    /// Advance one frame. `subject` is the followed point, if any;
    /// in follow mode without a subject the camera holds still.
    pub fn update(&mut self, subject: Option<Vec3>, dt: f32) {
        match self.mode {
            CameraMode::Fixed { eye, look_at } => {
                self.eye = approach_vec3(self.eye, eye, self.rate, dt);
                self.look_at = approach_vec3(self.look_at, look_at, self.rate, dt);
            }
            CameraMode::Follow { offset } => {
                if let Some(target) = subject {
                    self.eye = approach_vec3(self.eye, target + offset, self.rate, dt);
                    self.look_at = target;
                }
            }
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, 0.1, 1000.0)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_projection: (self.projection_matrix() * self.view_matrix()).to_cols_array_2d(),
        }
    }

    /// Resize the viewport.
    pub fn resize(&mut self, viewport_width: f32, viewport_height: f32) {
        if viewport_width > 0.0 && viewport_height > 0.0 {
            self.aspect = viewport_width / viewport_height;
        }
    }

    /// Eye then look-at, flattened for the host.
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.eye.x,
            self.eye.y,
            self.eye.z,
            self.look_at.x,
            self.look_at.y,
            self.look_at.z,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_eases_toward_target() {
        let mut cam = CameraRig::new(Vec3::ZERO, Vec3::ZERO);
        cam.set_fixed(Vec3::new(0.0, 3.0, 12.0), Vec3::ZERO);
        cam.update(None, 0.1);
        // 2.0 * 0.1 = 20% of the way
        assert!((cam.eye - Vec3::new(0.0, 0.6, 2.4)).length() < 1e-5);
    }

    #[test]
    fn snap_to_moves_immediately() {
        let mut cam = CameraRig::new(Vec3::ZERO, Vec3::ZERO);
        cam.snap_to(Vec3::new(0.0, 3.0, 12.0), Vec3::ZERO);
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, 12.0));
        assert!(!cam.is_following());
    }

    #[test]
    fn follow_looks_at_subject() {
        let mut cam = CameraRig::new(Vec3::new(0.0, 3.0, 12.0), Vec3::ZERO);
        cam.follow(Vec3::new(-5.0, 3.0, -5.0));
        let ball = Vec3::new(1.0, 2.0, 3.0);
        cam.update(Some(ball), 1.0 / 60.0);
        assert_eq!(cam.look_at, ball);
        assert!(cam.is_following());
    }

    #[test]
    fn follow_without_subject_holds() {
        let mut cam = CameraRig::new(Vec3::new(0.0, 3.0, 12.0), Vec3::ZERO);
        cam.follow(Vec3::new(-5.0, 3.0, -5.0));
        cam.update(None, 1.0 / 60.0);
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, 12.0));
    }

    #[test]
    fn uniform_projects_look_at_to_center() {
        let cam = CameraRig::new(Vec3::new(0.0, 3.0, 12.0), Vec3::ZERO);
        let m = Mat4::from_cols_array(&cam.uniform().to_cols_array());
        let clip = m.project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5, "{}", clip);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut cam = CameraRig::new(Vec3::ZERO, Vec3::Z);
        cam.resize(1920.0, 1080.0);
        assert!((cam.aspect - 1920.0 / 1080.0).abs() < 1e-6);
        cam.resize(0.0, 100.0);
        assert!((cam.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
