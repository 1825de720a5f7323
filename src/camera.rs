//! Perspective camera with model framing.
//!
//! # Examples
//! ```
//! use glam::Vec3;
//! use objzip::camera::Camera;
//!
//! let mut camera = Camera::default();
//! assert_eq!(camera.position, Vec3::new(5.0, 5.0, 5.0));
//!
//! camera.frame((Vec3::splat(-1.0), Vec3::splat(1.0)), 0.5);
//! assert_eq!(camera.target, Vec3::ZERO);
//! assert_eq!(camera.position, Vec3::new(1.0, 0.5, 1.0));
//! ```

use glam::{Mat4, Vec3};

/// Distance factor applied to the largest model dimension when a model is
/// first shown.
pub const INSTALL_FRAMING: f32 = 0.6;
/// Distance factor used by the reset control.
pub const RESET_FRAMING: f32 = 0.5;
/// Keyboard movement step in world units.
pub const MOVE_STEP: f32 = 0.5;

const HOME_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);
const MIN_DISTANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: HOME_POSITION,
            target: Vec3::ZERO,
            fov_y: 60.0,
            near: 0.1,
            far: 5000.0,
        }
    }
}

impl Camera {
    /// Returns to `(5, 5, 5)` looking at the origin.
    pub fn go_home(&mut self) {
        self.position = HOME_POSITION;
        self.target = Vec3::ZERO;
    }

    /// Looks at the center of `bounds` from `(d, d/2, d)` away, where `d` is
    /// the largest extent times `factor`.
    pub fn frame(&mut self, bounds: (Vec3, Vec3), factor: f32) {
        let (min, max) = bounds;
        let center = min.lerp(max, 0.5);
        let distance = ((max - min).max_element() * factor).max(MIN_DISTANCE);

        self.target = center;
        self.position = center + Vec3::new(distance, distance * 0.5, distance);
    }

    /// Moves the eye, keeping the target.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(self.fov_y.to_radians(), aspect, self.near, self.far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uses_largest_dimension() {
        let mut camera = Camera::default();
        camera.frame((Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 2.0, 4.0)), INSTALL_FRAMING);
        assert_eq!(camera.target, Vec3::new(5.0, 1.0, 2.0));
        assert_eq!(camera.position, Vec3::new(11.0, 4.0, 8.0));

        camera.go_home();
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_degenerate_bounds_keep_a_distance() {
        let mut camera = Camera::default();
        camera.frame((Vec3::ONE, Vec3::ONE), RESET_FRAMING);
        assert_ne!(camera.position, camera.target);
        assert!(camera.view_proj(1.0).is_finite());
    }
}
