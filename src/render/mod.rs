//! Avatar viewer composition.
//!
//! [`AvatarViewer`] owns everything one mounted 3D preview needs: the model
//! group, per-instance fit state, the portrait camera rig and orbit
//! controls, the lighting rig, and the paint pass. The host wizard only
//! pushes props (colors, view mode, rotation, zoom) and calls
//! [`AvatarViewer::render_frame`]; nothing flows back except pixels.
//!
//! Frame ordering is fixed: fit (once) before paint, paint before camera and
//! transform composition. The whole frame body runs inside a panic boundary
//! so a malformed asset can never take the surrounding page down.

mod camera;
mod fit;
mod paint;

pub use camera::{Camera, OrbitControls, ViewMode, CAMERA_TARGET, MIN_ZOOM};
pub use fit::{FitState, FRAME_NUDGE, TARGET_HEIGHT};
pub use paint::{
    apply_colors_to_asset, GarmentColors, DEFAULT_BLOUSE_HEX, DEFAULT_BORDER_HEX,
    DEFAULT_SAREE_HEX,
};

use crate::assets::{self, AssetError, LoadedAsset};
use crate::color::ColorInput;
use crate::scene::material::{prepare_scene_for_lighting, MaterialHandle};
use crate::scene::Node;
use glam::Vec3;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Well-known path of the rigged avatar model.
pub const DEFAULT_MODEL_URL: &str = "models/lady_V4.glb";

/// Inputs from the surrounding wizard. These are props, not a wire
/// protocol; unchanged values cause no recompute.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AvatarProps {
    pub model_url: Option<String>,
    pub saree_color: Option<ColorInput>,
    pub blouse_color: Option<ColorInput>,
    pub border_color: Option<ColorInput>,
    pub camera_view: ViewMode,
    /// Manual rotation in degrees, unbounded (wraps visually every 360).
    pub rotation_deg: f32,
    /// Uniform zoom factor, clamped internally to at least [`MIN_ZOOM`].
    pub zoom: f32,
}

impl Default for AvatarProps {
    fn default() -> Self {
        Self {
            model_url: None,
            saree_color: None,
            blouse_color: None,
            border_color: None,
            camera_view: ViewMode::Front,
            rotation_deg: 0.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AmbientLightData {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DirectionalLightData {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointLightData {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
}

/// Fixed three-point-plus-ambient studio rig.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LightRig {
    pub ambient: AmbientLightData,
    pub key: DirectionalLightData,
    pub fill: DirectionalLightData,
    pub top: PointLightData,
}

impl LightRig {
    pub fn studio() -> Self {
        Self {
            ambient: AmbientLightData {
                color: [1.0, 1.0, 1.0],
                intensity: 0.8,
            },
            key: DirectionalLightData {
                color: [1.0, 1.0, 1.0],
                intensity: 1.2,
                position: [5.0, 10.0, 5.0],
                cast_shadow: true,
            },
            fill: DirectionalLightData {
                // #fff5f5
                color: [1.0, 0.961, 0.961],
                intensity: 0.6,
                position: [-5.0, 5.0, -5.0],
                cast_shadow: false,
            },
            top: PointLightData {
                // #fef3c7
                color: [0.996, 0.953, 0.780],
                intensity: 0.4,
                position: [0.0, 5.0, 0.0],
            },
        }
    }
}

/// Viewer lifecycle phase. `Loading` shows the placeholder until the asset
/// resolves; `Failed` shows the textual fallback instead of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerPhase {
    Loading,
    Ready,
    Failed(String),
}

pub struct AvatarViewer {
    props: AvatarProps,
    phase: ViewerPhase,
    group: Node,
    pending_scene: Option<Node>,
    materials: HashMap<String, MaterialHandle>,
    fit: FitState,
    camera: Camera,
    orbit: OrbitControls,
    lights: LightRig,
    applied_colors: Option<GarmentColors>,
    applied_camera: Option<(ViewMode, f32)>,
}

impl AvatarViewer {
    /// Mount a viewer. The asset resolves on the first frame; until then the
    /// phase stays `Loading`.
    pub fn mount(props: AvatarProps) -> Self {
        Self {
            props,
            phase: ViewerPhase::Loading,
            group: Node::new("avatar"),
            pending_scene: None,
            materials: HashMap::new(),
            fit: FitState::default(),
            camera: Camera::new(),
            orbit: OrbitControls::new(),
            lights: LightRig::studio(),
            applied_colors: None,
            applied_camera: None,
        }
    }

    /// Mount with an already-instantiated asset, bypassing the cache. Used
    /// by hosts that build scenes programmatically.
    pub fn mount_with_asset(props: AvatarProps, mut asset: LoadedAsset) -> Self {
        prepare_scene_for_lighting(&mut asset.scene);
        let mut viewer = Self::mount(props);
        viewer.materials = asset.materials;
        viewer.pending_scene = Some(asset.scene);
        viewer.phase = ViewerPhase::Ready;
        viewer
    }

    pub fn props(&self) -> &AvatarProps {
        &self.props
    }

    pub fn phase(&self) -> &ViewerPhase {
        &self.phase
    }

    /// Fallback text replacing the canvas after a contained failure.
    pub fn fallback_message(&self) -> Option<String> {
        match &self.phase {
            ViewerPhase::Failed(msg) => Some(format!("3D preview failed: {}", msg)),
            _ => None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit_mut(&mut self) -> (&OrbitControls, &mut Camera) {
        (&self.orbit, &mut self.camera)
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn group(&self) -> &Node {
        &self.group
    }

    pub fn fit_state(&self) -> &FitState {
        &self.fit
    }

    // Explicit change handlers standing in for prop-driven effects. Each is
    // idempotent when the input is unchanged.

    pub fn set_colors(
        &mut self,
        saree: Option<ColorInput>,
        blouse: Option<ColorInput>,
        border: Option<ColorInput>,
    ) {
        self.props.saree_color = saree;
        self.props.blouse_color = blouse;
        self.props.border_color = border;
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.props.camera_view = view;
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.props.rotation_deg = degrees;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.props.zoom = zoom;
    }

    /// Drive one frame: load/fit as needed, repaint on color change,
    /// reconfigure the camera on view/zoom change, recompose the model
    /// transform. All failures are contained here; a tripped boundary
    /// poisons only this viewer.
    pub fn render_frame(&mut self) {
        if matches!(self.phase, ViewerPhase::Failed(_)) {
            return;
        }
        let outcome = catch_unwind(AssertUnwindSafe(|| self.render_frame_inner()));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                log::error!("3D preview error: {}", err);
                self.phase = ViewerPhase::Failed(err.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload);
                log::error!("3D preview panicked: {}", message);
                self.phase = ViewerPhase::Failed(message);
            }
        }
    }

    fn render_frame_inner(&mut self) -> Result<(), AssetError> {
        self.ensure_asset()?;

        // Fit must precede paint and composition: both assume the scene has
        // been re-parented under the group and scaled into place.
        fit::fit_once(&mut self.group, &mut self.pending_scene, &mut self.fit);
        self.apply_colors_if_changed();
        self.configure_camera_if_changed();
        self.compose_transform();
        Ok(())
    }

    fn ensure_asset(&mut self) -> Result<(), AssetError> {
        if !matches!(self.phase, ViewerPhase::Loading) {
            return Ok(());
        }
        let url = self
            .props
            .model_url
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());
        let document = assets::ensure_loaded(&url)?;
        let mut asset = document.instantiate();
        prepare_scene_for_lighting(&mut asset.scene);
        self.materials = asset.materials;
        self.pending_scene = Some(asset.scene);
        self.phase = ViewerPhase::Ready;
        Ok(())
    }

    fn apply_colors_if_changed(&mut self) {
        let colors = GarmentColors::resolve(
            self.props.saree_color.as_ref(),
            self.props.blouse_color.as_ref(),
            self.props.border_color.as_ref(),
        );
        if self.applied_colors.as_ref() == Some(&colors) {
            return;
        }
        paint::apply_colors(&self.materials, &self.group, &colors);
        self.applied_colors = Some(colors);
    }

    fn configure_camera_if_changed(&mut self) {
        let key = (self.props.camera_view, self.props.zoom);
        if self.applied_camera == Some(key) {
            return;
        }
        self.camera.configure(key.0, key.1);
        self.applied_camera = Some(key);
    }

    /// Rotation composer + zoom scaler. Manual rotation is additive on top
    /// of the view yaw; zoom multiplies on the group, never touching the
    /// fit scale baked into the inner scene root.
    fn compose_transform(&mut self) {
        self.group.rotation.y = self.props.rotation_deg.to_radians() + self.camera.view_yaw;
        self.group.scale = Vec3::splat(self.props.zoom.max(MIN_ZOOM));
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown render error".to_string()
    }
}
