//! Orbit camera framing the merging bodies

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::CameraParameters;

/// Orbit camera that circles a target point, Z up
// put id:'cpu_camera_state', label:'Camera orbit state', input:'phase_effects.internal', output:'frame_snapshot.internal'
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    /// Target point to look at
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Angle around the Z axis, measured from +X (radians)
    pub azimuth: f32,
    /// Angle above the XY plane (radians, clamped)
    pub elevation: f32,
    /// Field of view (radians)
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

/// Elevation stays strictly below the poles to keep `look_at` well defined.
const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

impl CameraRig {
    /// Create a camera from its configuration.
    pub fn new(params: &CameraParameters) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: params.distance.max(0.01),
            azimuth: params.azimuth_deg.to_radians(),
            elevation: params.elevation_deg.to_radians().clamp(-MAX_ELEVATION, MAX_ELEVATION),
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 200.0,
        }
    }

    /// Calculate camera position from orbit parameters
    pub fn position(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        let x = horizontal * self.azimuth.cos();
        let y = horizontal * self.azimuth.sin();
        let z = self.distance * self.elevation.sin();
        self.target + Vec3::new(x, y, z)
    }

    /// Set the azimuth directly (radians)
    pub fn set_azimuth(&mut self, azimuth: f32) {
        self.azimuth = azimuth;
    }

    /// Set aspect ratio (call on window resize)
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Z)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera sweep used by the rotation phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthSweep {
    /// Azimuth before the sweep (radians)
    pub start: f32,
    /// Total angle swept (radians)
    pub sweep: f32,
}

impl AzimuthSweep {
    /// Build from configuration.
    pub fn from_parameters(params: &CameraParameters) -> Self {
        Self {
            start: params.azimuth_deg.to_radians(),
            sweep: params.sweep_deg.to_radians(),
        }
    }

    /// Linear interpolation for a progress in [0, 1].
    pub fn at(&self, progress: f32) -> f32 {
        self.start + self.sweep * progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn camera() -> CameraRig {
        CameraRig::new(&CameraParameters::default())
    }

    #[test]
    fn test_camera_creation() {
        let camera = camera();
        assert!(camera.distance > 0.0);
        assert!((camera.azimuth - 30.0_f32.to_radians()).abs() < 1e-6);
        assert!((camera.elevation - 20.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_camera_position() {
        let camera = camera();
        let pos = camera.position();
        // Should be at distance from target
        assert!((pos.length() - camera.distance).abs() < 0.001);
        assert!(pos.z > 0.0);
    }

    #[test]
    fn test_azimuth_half_turn_mirrors_position() {
        let mut camera = camera();
        let before = camera.position();
        camera.set_azimuth(camera.azimuth + PI);
        let after = camera.position();

        assert!((before.x + after.x).abs() < 1e-4);
        assert!((before.y + after.y).abs() < 1e-4);
        assert!((before.z - after.z).abs() < 1e-4);
    }

    #[test]
    fn test_elevation_is_clamped() {
        let params = CameraParameters {
            elevation_deg: 120.0,
            ..CameraParameters::default()
        };
        let camera = CameraRig::new(&params);
        assert!(camera.elevation < PI / 2.0);
    }

    #[test]
    fn test_view_matrix_is_valid() {
        let camera = camera();
        let view = camera.view_matrix();
        // View matrix should be invertible (determinant != 0)
        let det = view.determinant();
        assert!(det.abs() > 0.001, "View matrix should be invertible");
    }

    #[test]
    fn test_view_projection_matrix_is_valid() {
        let mut camera = camera();
        camera.set_aspect(4.0 / 3.0);
        let det = camera.view_projection_matrix().determinant();
        assert!(det.abs() > 1e-6, "View-projection matrix should be invertible");
    }

    #[test]
    fn test_sweep_interpolation() {
        let sweep = AzimuthSweep::from_parameters(&CameraParameters::default());
        assert!((sweep.at(0.0) - 30.0_f32.to_radians()).abs() < 1e-6);
        assert!((sweep.at(0.5) - 120.0_f32.to_radians()).abs() < 1e-5);
        assert!((sweep.at(1.0) - 210.0_f32.to_radians()).abs() < 1e-5);
        assert!((sweep.at(3.0) - sweep.at(1.0)).abs() < 1e-6);
    }
}
