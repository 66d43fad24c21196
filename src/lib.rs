//! Saree Previz - 3D avatar preview core for a custom saree configurator.
//!
//! This crate implements the rendering-side pipeline behind the garment
//! configurator's live preview:
//! - loading a rigged humanoid glTF/GLB model once per URL (process-wide
//!   cache with explicit warm-up via [`assets::preload`])
//! - fitting it deterministically to a stable on-screen size, exactly once
//!   per mounted viewer
//! - re-skinning the saree/blouse/border regions with user-selected colors
//!   as selections change
//! - composing view mode, manual rotation, and zoom without fighting the
//!   interactive orbit controls
//!
//! The host wizard owns the actual render surface and widgets; it feeds
//! props into [`AvatarViewer`] and drives frames. All failures stay
//! contained inside the viewer.

pub mod assets;
pub mod color;
pub mod render;
pub mod scene;

pub use assets::{ensure_loaded, preload, AssetDocument, AssetError, LoadedAsset};
pub use color::{resolve_hex, Color, ColorInput, Swatch};
pub use render::{
    AvatarProps, AvatarViewer, Camera, LightRig, OrbitControls, ViewMode, ViewerPhase,
    DEFAULT_MODEL_URL,
};
