//! Portrait camera rig and orbit interaction.
//!
//! The rig never rotates the model: view modes store a canonical yaw on the
//! camera, and the viewer applies it to the model group. Orbit controls move
//! the camera around the torso target on top of whatever the rig set.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

/// Requested camera view from the wizard's view-mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Front,
    Back,
    Side,
    #[serde(rename = "3d")]
    Free,
}

impl ViewMode {
    /// Canonical model yaw for this view. Consumed by the rotation composer,
    /// not applied to the camera itself.
    pub fn view_yaw(self) -> f32 {
        match self {
            ViewMode::Front => 0.0,
            ViewMode::Back => PI,
            ViewMode::Side => FRAC_PI_2,
            ViewMode::Free => PI / 6.0,
        }
    }
}

/// Floor for the zoom divisor and the group scale, so zooming out never
/// collapses the model or drives the camera through it.
pub const MIN_ZOOM: f32 = 0.3;

const PORTRAIT_FOV_DEG: f32 = 22.0;
const CAMERA_HEIGHT: f32 = 1.15;
const CAMERA_DISTANCE: f32 = 2.5;
/// Aim point on the subject's torso.
pub const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 1.05, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub target: Vec3,
    /// Canonical yaw of the currently requested view, read by the rotation
    /// composer each frame.
    pub view_yaw: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, CAMERA_HEIGHT, 1.8),
            fov_deg: PORTRAIT_FOV_DEG,
            near: 0.05,
            far: 1000.0,
            target: CAMERA_TARGET,
            view_yaw: 0.0,
        }
    }

    /// Reconfigure for a (view, zoom) change: fixed portrait framing, with
    /// distance inversely scaled by the floored zoom.
    pub fn configure(&mut self, view: ViewMode, zoom: f32) {
        self.position = Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE / zoom.max(MIN_ZOOM));
        self.fov_deg = PORTRAIT_FOV_DEG;
        self.near = 0.05;
        self.far = 1000.0;
        self.target = CAMERA_TARGET;
        self.view_yaw = view.view_yaw();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Interactive orbit layered on top of the rig. Pan is disabled; polar angle
/// and distance are clamped so the subject stays framed.
#[derive(Debug, Clone, Copy)]
pub struct OrbitControls {
    pub target: Vec3,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            target: CAMERA_TARGET,
            rotate_speed: 0.8,
            zoom_speed: 0.8,
            min_polar: 0.0,
            max_polar: FRAC_PI_2,
            min_distance: 0.35,
            max_distance: 4.0,
        }
    }

    /// Drag-to-rotate: swing the camera around the target, keeping distance.
    pub fn orbit(&self, camera: &mut Camera, yaw_delta: f32, pitch_delta: f32) {
        let offset = camera.position - self.target;
        let radius = offset.length().clamp(self.min_distance, self.max_distance);
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius.max(1e-6)).clamp(-1.0, 1.0).acos();

        azimuth += yaw_delta * self.rotate_speed;
        polar = (polar - pitch_delta * self.rotate_speed)
            .clamp(self.min_polar.max(1e-3), self.max_polar);

        let sin_polar = polar.sin();
        camera.position = self.target
            + Vec3::new(
                radius * sin_polar * azimuth.sin(),
                radius * polar.cos(),
                radius * sin_polar * azimuth.cos(),
            );
    }

    /// Scroll-to-zoom: dolly along the view direction, clamped.
    pub fn dolly(&self, camera: &mut Camera, delta: f32) {
        let offset = camera.position - self.target;
        let length = offset.length().max(1e-6);
        let radius =
            (length - delta * self.zoom_speed).clamp(self.min_distance, self.max_distance);
        camera.position = self.target + offset / length * radius;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, OrbitControls, ViewMode, CAMERA_TARGET, MIN_ZOOM};
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn view_yaw_table() {
        assert_eq!(ViewMode::Front.view_yaw(), 0.0);
        assert_eq!(ViewMode::Back.view_yaw(), PI);
        assert_eq!(ViewMode::Side.view_yaw(), FRAC_PI_2);
        assert!((ViewMode::Free.view_yaw() - PI / 6.0).abs() < 1e-6);
    }

    #[test]
    fn view_mode_serde_names() {
        assert_eq!(
            serde_json::from_str::<ViewMode>("\"3d\"").unwrap(),
            ViewMode::Free
        );
        assert_eq!(
            serde_json::to_string(&ViewMode::Front).unwrap(),
            "\"front\""
        );
    }

    #[test]
    fn configure_floors_the_zoom_divisor() {
        let mut camera = Camera::new();
        camera.configure(ViewMode::Front, 0.05);
        // Effective zoom is floored at MIN_ZOOM, never driving the camera
        // through the subject.
        assert!((camera.position.z - 2.5 / MIN_ZOOM).abs() < 1e-5);

        camera.configure(ViewMode::Front, 2.0);
        assert!((camera.position.z - 1.25).abs() < 1e-5);
        assert_eq!(camera.fov_deg, 22.0);
        assert_eq!(camera.target, CAMERA_TARGET);
    }

    #[test]
    fn configure_stores_view_yaw_without_moving_model() {
        let mut camera = Camera::new();
        camera.configure(ViewMode::Back, 1.0);
        assert_eq!(camera.view_yaw, PI);
        // Same position as front: the model turns, not the camera.
        let back_position = camera.position;
        camera.configure(ViewMode::Front, 1.0);
        assert_eq!(camera.position, back_position);
    }

    #[test]
    fn orbit_preserves_distance_and_clamps_polar() {
        let mut camera = Camera::new();
        camera.configure(ViewMode::Front, 1.0);
        let controls = OrbitControls::new();
        let before = (camera.position - controls.target).length();

        controls.orbit(&mut camera, 0.4, 0.2);
        let after = (camera.position - controls.target).length();
        assert!((before - after).abs() < 1e-4);

        // Dragging far past the pole pins the camera at the polar clamp.
        for _ in 0..100 {
            controls.orbit(&mut camera, 0.0, 0.5);
        }
        let offset = camera.position - controls.target;
        assert!(offset.y <= after + 1e-4);
        assert!(camera.position.y.is_finite());

        // Never below the horizontal plane either.
        for _ in 0..100 {
            controls.orbit(&mut camera, 0.0, -0.5);
        }
        assert!(camera.position.y >= controls.target.y - 1e-4);
    }

    #[test]
    fn dolly_clamps_distance() {
        let mut camera = Camera::new();
        camera.configure(ViewMode::Front, 1.0);
        let controls = OrbitControls::new();

        for _ in 0..100 {
            controls.dolly(&mut camera, 1.0);
        }
        let close = (camera.position - controls.target).length();
        assert!((close - controls.min_distance).abs() < 1e-4);

        for _ in 0..100 {
            controls.dolly(&mut camera, -1.0);
        }
        let far = (camera.position - controls.target).length();
        assert!((far - controls.max_distance).abs() < 1e-4);
    }
}
