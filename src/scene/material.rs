//! Materials and the paint pass.
//!
//! Exported garments are inconsistent about material kinds, so `Material` is
//! a tagged union over capability sets: `Standard` (PBR: color, texture map,
//! metalness/roughness), `Basic` (color and map only), `Depth` (no color at
//! all). Painting only touches the capabilities a kind actually has and
//! silently skips the rest.

use crate::color::Color;
use crate::scene::{MaterialSlot, Node};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared material handle. Meshes and the asset's name-keyed material map
/// alias the same instances, so a paint through either path is visible to
/// both.
pub type MaterialHandle = Rc<RefCell<Material>>;

pub fn share(material: Material) -> MaterialHandle {
    Rc::new(RefCell::new(material))
}

/// Metalness applied to border trims for the metallic gold/silver look.
pub const SHINY_METALNESS: f32 = 0.55;
pub const SHINY_ROUGHNESS: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Texture map metadata. Pixel data stays on the loader side; the paint pass
/// only needs to know a map is bound and in which color space it samples.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextureMap {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
}

#[derive(Debug, Clone)]
pub struct StandardMaterial {
    pub name: String,
    pub color: Color,
    pub map: Option<TextureMap>,
    pub metalness: f32,
    pub roughness: f32,
    pub needs_upload: bool,
}

impl StandardMaterial {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: Color::WHITE,
            map: None,
            metalness: 0.0,
            roughness: 1.0,
            needs_upload: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasicMaterial {
    pub name: String,
    pub color: Color,
    pub map: Option<TextureMap>,
    pub needs_upload: bool,
}

impl BasicMaterial {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: Color::WHITE,
            map: None,
            needs_upload: false,
        }
    }
}

/// Depth-only material: no color, no map. Exists to exercise the
/// silent-skip path for unsupported capabilities.
#[derive(Debug, Clone)]
pub struct DepthMaterial {
    pub name: String,
    pub needs_upload: bool,
}

impl DepthMaterial {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            needs_upload: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Material {
    Standard(StandardMaterial),
    Basic(BasicMaterial),
    Depth(DepthMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Standard(m) => &m.name,
            Material::Basic(m) => &m.name,
            Material::Depth(m) => &m.name,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Material::Standard(m) => Some(m.color),
            Material::Basic(m) => Some(m.color),
            Material::Depth(_) => None,
        }
    }

    pub fn color_mut(&mut self) -> Option<&mut Color> {
        match self {
            Material::Standard(m) => Some(&mut m.color),
            Material::Basic(m) => Some(&mut m.color),
            Material::Depth(_) => None,
        }
    }

    pub fn map(&self) -> Option<&TextureMap> {
        match self {
            Material::Standard(m) => m.map.as_ref(),
            Material::Basic(m) => m.map.as_ref(),
            Material::Depth(_) => None,
        }
    }

    pub fn map_mut(&mut self) -> Option<&mut TextureMap> {
        match self {
            Material::Standard(m) => m.map.as_mut(),
            Material::Basic(m) => m.map.as_mut(),
            Material::Depth(_) => None,
        }
    }

    /// Unbind the texture map. Returns true when a map was actually bound.
    pub fn clear_map(&mut self) -> bool {
        match self {
            Material::Standard(m) => m.map.take().is_some(),
            Material::Basic(m) => m.map.take().is_some(),
            Material::Depth(_) => false,
        }
    }

    pub fn supports_metal_rough(&self) -> bool {
        matches!(self, Material::Standard(_))
    }

    /// No-op for kinds without a metalness/roughness response.
    pub fn set_metal_rough(&mut self, metalness: f32, roughness: f32) {
        if let Material::Standard(m) = self {
            m.metalness = metalness;
            m.roughness = roughness;
        }
    }

    pub fn needs_upload(&self) -> bool {
        match self {
            Material::Standard(m) => m.needs_upload,
            Material::Basic(m) => m.needs_upload,
            Material::Depth(m) => m.needs_upload,
        }
    }

    /// Flag the material for a GPU re-upload on the next frame.
    pub fn mark_needs_upload(&mut self) {
        match self {
            Material::Standard(m) => m.needs_upload = true,
            Material::Basic(m) => m.needs_upload = true,
            Material::Depth(m) => m.needs_upload = true,
        }
    }
}

/// Paint a mesh's material slot with a flat color.
///
/// Absent target is a no-op. A bound texture map is cleared first (a flat
/// color is invisible while a map is still bound) and the material flagged
/// for re-upload. `shiny` raises metalness and lowers roughness where the
/// kind supports it. Repainting with the same hex is idempotent.
pub fn paint(target: Option<&MaterialSlot>, hex: &str, shiny: bool) {
    let Some(slot) = target else {
        return;
    };
    for handle in slot.handles() {
        paint_one(&mut handle.borrow_mut(), hex, shiny);
    }
}

fn paint_one(material: &mut Material, hex: &str, shiny: bool) {
    if material.clear_map() {
        material.mark_needs_upload();
    }
    if let Some(color) = material.color_mut() {
        color.set(hex);
    }
    if shiny {
        material.set_metal_rough(SHINY_METALNESS, SHINY_ROUGHNESS);
    }
}

/// One-time post-load pass: enable shadows on every mesh node and force any
/// bound base-color map to sample as sRGB, matching how studio lighting
/// expects albedo textures.
pub fn prepare_scene_for_lighting(root: &mut Node) {
    root.traverse_mut(&mut |node| {
        let Some(mesh) = &node.mesh else {
            return;
        };
        node.cast_shadow = true;
        node.receive_shadow = true;
        for handle in mesh.material.handles() {
            let mut material = handle.borrow_mut();
            if let Some(map) = material.map_mut() {
                map.color_space = ColorSpace::Srgb;
            }
        }
    });
}
