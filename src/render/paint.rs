//! Region resolution: mapping semantic garment regions (saree, blouse,
//! border) onto the materials that actually draw them.
//!
//! Exported assets are inconsistent about whether regions are exposed as
//! named materials or only as named meshes sharing a default material. The
//! apply pass therefore paints named materials first and then always runs a
//! mesh-name fallback scan; when both paths hit, the mesh pass wins.

use crate::assets::LoadedAsset;
use crate::color::{resolve_hex, ColorInput};
use crate::scene::material::{paint, MaterialHandle};
use crate::scene::{MaterialSlot, Node};
use std::collections::HashMap;

pub const DEFAULT_SAREE_HEX: &str = "#ffffff";
pub const DEFAULT_BLOUSE_HEX: &str = "#222222";
/// Gold-ish fallback for the border trim.
pub const DEFAULT_BORDER_HEX: &str = "#C9A227";

const SAREE_MATERIAL_NAMES: &[&str] = &["saree", "Saree"];
const BLOUSE_MATERIAL_NAMES: &[&str] = &["blouse", "Blouse"];
const BORDER_MATERIAL_NAMES: &[&str] = &["border", "Border", "SareeBorder"];

/// The three region colors of one paint pass, fully resolved to hex.
#[derive(Debug, Clone, PartialEq)]
pub struct GarmentColors {
    pub saree: String,
    pub blouse: String,
    pub border: String,
}

impl GarmentColors {
    pub fn resolve(
        saree: Option<&ColorInput>,
        blouse: Option<&ColorInput>,
        border: Option<&ColorInput>,
    ) -> Self {
        Self {
            saree: resolve_hex(saree, DEFAULT_SAREE_HEX),
            blouse: resolve_hex(blouse, DEFAULT_BLOUSE_HEX),
            border: resolve_hex(border, DEFAULT_BORDER_HEX),
        }
    }
}

/// Look a region up in the asset's named materials, trying each candidate
/// name as given, lowercased, and uppercased.
fn named_material(
    materials: &HashMap<String, MaterialHandle>,
    names: &[&str],
) -> Option<MaterialSlot> {
    for name in names {
        for candidate in [name.to_string(), name.to_lowercase(), name.to_uppercase()] {
            if let Some(handle) = materials.get(&candidate) {
                return Some(MaterialSlot::Single(handle.clone()));
            }
        }
    }
    None
}

/// Apply one set of garment colors to a mounted asset.
///
/// Regions with no matching material or mesh are silently skipped: partial
/// customization keeps the model's default colors rather than failing.
pub fn apply_colors(
    materials: &HashMap<String, MaterialHandle>,
    root: &Node,
    colors: &GarmentColors,
) {
    paint(
        named_material(materials, SAREE_MATERIAL_NAMES).as_ref(),
        &colors.saree,
        false,
    );
    paint(
        named_material(materials, BLOUSE_MATERIAL_NAMES).as_ref(),
        &colors.blouse,
        false,
    );
    paint(
        named_material(materials, BORDER_MATERIAL_NAMES).as_ref(),
        &colors.border,
        true,
    );

    // Mesh-name fallback, run unconditionally: garments split across
    // several meshes often carry no distinctly named material.
    root.traverse(&mut |node| {
        let Some(mesh) = &node.mesh else {
            return;
        };
        match node.name.to_lowercase().as_str() {
            "saree" => paint(Some(&mesh.material), &colors.saree, false),
            "blouse" => paint(Some(&mesh.material), &colors.blouse, false),
            "border" | "sareeborder" => paint(Some(&mesh.material), &colors.border, true),
            _ => {}
        }
    });
}

/// Convenience entry for hosts holding a [`LoadedAsset`] directly.
pub fn apply_colors_to_asset(asset: &LoadedAsset, colors: &GarmentColors) {
    apply_colors(&asset.materials, &asset.scene, colors);
}

#[cfg(test)]
mod tests {
    use super::{
        apply_colors, GarmentColors, DEFAULT_BLOUSE_HEX, DEFAULT_BORDER_HEX, DEFAULT_SAREE_HEX,
    };
    use crate::scene::material::{
        share, Material, MaterialHandle, StandardMaterial, SHINY_METALNESS,
    };
    use crate::scene::{Aabb, MaterialSlot, Mesh, Node};
    use glam::Vec3;
    use std::collections::HashMap;

    fn handle(name: &str) -> MaterialHandle {
        share(Material::Standard(StandardMaterial::named(name)))
    }

    fn mesh_node(name: &str, material: MaterialHandle) -> Node {
        Node::with_mesh(
            name,
            Mesh {
                local_bounds: Aabb::new(Vec3::ZERO, Vec3::ONE),
                material: MaterialSlot::Single(material),
            },
        )
    }

    fn defaults() -> GarmentColors {
        GarmentColors::resolve(None, None, None)
    }

    #[test]
    fn resolve_falls_back_to_region_defaults() {
        let colors = defaults();
        assert_eq!(colors.saree, DEFAULT_SAREE_HEX);
        assert_eq!(colors.blouse, DEFAULT_BLOUSE_HEX);
        assert_eq!(colors.border, DEFAULT_BORDER_HEX);
    }

    #[test]
    fn named_materials_are_painted_case_insensitively() {
        let saree = handle("SAREE");
        let mut materials = HashMap::new();
        materials.insert("SAREE".to_string(), saree.clone());
        let root = Node::new("Scene");

        let colors = GarmentColors {
            saree: "#112233".to_string(),
            ..defaults()
        };
        apply_colors(&materials, &root, &colors);
        assert_eq!(saree.borrow().color().unwrap().to_hex(), "#112233");
    }

    #[test]
    fn mesh_name_fallback_covers_unnamed_materials() {
        // No named "border" material anywhere, but a mesh literally named
        // "Border": the fallback scan must still recolor it, shiny.
        let border = handle("");
        let mut root = Node::new("Scene");
        root.add_child(mesh_node("Border", border.clone()));

        apply_colors(&HashMap::new(), &root, &defaults());

        let painted = border.borrow();
        assert_eq!(
            painted.color().unwrap().to_hex(),
            DEFAULT_BORDER_HEX.to_lowercase()
        );
        match &*painted {
            Material::Standard(m) => assert_eq!(m.metalness, SHINY_METALNESS),
            _ => unreachable!(),
        }
    }

    #[test]
    fn both_paths_paint_with_mesh_pass_winning() {
        // A named "border" material and a separately-named "Border" mesh
        // with a different material both get painted (last write wins on
        // the shared case below).
        let named = handle("border");
        let mesh_material = handle("");
        let mut materials = HashMap::new();
        materials.insert("border".to_string(), named.clone());
        let mut root = Node::new("Scene");
        root.add_child(mesh_node("Border", mesh_material.clone()));

        let colors = GarmentColors {
            border: "#ab47bc".to_string(),
            ..defaults()
        };
        apply_colors(&materials, &root, &colors);

        assert_eq!(named.borrow().color().unwrap().to_hex(), "#ab47bc");
        assert_eq!(mesh_material.borrow().color().unwrap().to_hex(), "#ab47bc");
    }

    #[test]
    fn missing_regions_are_silently_skipped() {
        let unrelated = handle("skin");
        let mut root = Node::new("Scene");
        root.add_child(mesh_node("Head", unrelated.clone()));

        // Must not panic and must not touch unrelated meshes.
        apply_colors(&HashMap::new(), &root, &defaults());
        assert_eq!(unrelated.borrow().color().unwrap().to_hex(), "#ffffff");
    }

    #[test]
    fn asset_entry_point_paints_instantiated_assets() {
        use crate::assets::{AssetDocument, DocNode, DocPrimitive, MaterialDef};
        use glam::Quat;

        let doc = AssetDocument {
            url: "test://garment".to_string(),
            materials: vec![MaterialDef {
                name: Some("saree".to_string()),
                base_color: [1.0, 1.0, 1.0],
                metalness: 0.0,
                roughness: 1.0,
                base_color_map: None,
            }],
            roots: vec![DocNode {
                name: "Saree".to_string(),
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                primitives: vec![DocPrimitive {
                    bounds: Aabb::new(Vec3::ZERO, Vec3::ONE),
                    material: Some(0),
                }],
                children: Vec::new(),
            }],
        };
        let asset = doc.instantiate();

        let colors = GarmentColors {
            saree: "#4a148c".to_string(),
            ..defaults()
        };
        super::apply_colors_to_asset(&asset, &colors);

        let painted = asset.materials.get("saree").unwrap();
        assert_eq!(painted.borrow().color().unwrap().to_hex(), "#4a148c");
    }

    #[test]
    fn sareeborder_mesh_alias_is_recognized() {
        let trim = handle("");
        let mut root = Node::new("Scene");
        root.add_child(mesh_node("SareeBorder", trim.clone()));

        let colors = GarmentColors {
            border: "#d4af37".to_string(),
            ..defaults()
        };
        apply_colors(&HashMap::new(), &root, &colors);
        assert_eq!(trim.borrow().color().unwrap().to_hex(), "#d4af37");
    }
}
