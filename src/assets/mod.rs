//! Model asset loading and the process-wide cache.
//!
//! A glTF/GLB file is parsed once per URL into an immutable [`AssetDocument`]
//! and shared behind an `Arc`. Each mounted viewer instantiates its own
//! mutable scene graph from the document, so concurrent viewers of the same
//! model never fight over transform or material state.

use crate::scene::material::{
    share, ColorSpace, Material, MaterialHandle, StandardMaterial, TextureMap,
};
use crate::scene::{Aabb, MaterialSlot, Mesh, Node};
use glam::{EulerRot, Quat, Vec3};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load model at {path}: {source}")]
    Import {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("model at {path} contains no scene")]
    EmptyScene { path: String },
}

/// Immutable parse result for one model file.
#[derive(Debug, Clone)]
pub struct AssetDocument {
    pub url: String,
    pub materials: Vec<MaterialDef>,
    pub roots: Vec<DocNode>,
}

#[derive(Debug, Clone)]
pub struct MaterialDef {
    pub name: Option<String>,
    pub base_color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub base_color_map: Option<MapDef>,
}

#[derive(Debug, Clone)]
pub struct MapDef {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct DocPrimitive {
    pub bounds: Aabb,
    /// Index into [`AssetDocument::materials`]; `None` means the glTF
    /// default material.
    pub material: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct DocNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub primitives: Vec<DocPrimitive>,
    pub children: Vec<DocNode>,
}

/// One viewer's private scene graph plus the name-keyed material map used by
/// the region resolver.
#[derive(Debug)]
pub struct LoadedAsset {
    pub scene: Node,
    pub materials: HashMap<String, MaterialHandle>,
}

impl AssetDocument {
    /// Build a fresh mutable scene graph for one viewer instance. Material
    /// handles are shared between the name map and every mesh that uses
    /// them, within this instance only.
    pub fn instantiate(&self) -> LoadedAsset {
        let handles: Vec<MaterialHandle> = self
            .materials
            .iter()
            .map(|def| share(standard_from_def(def)))
            .collect();
        // Primitives without a material share one default instance.
        let default_material = share(Material::Standard(StandardMaterial::named("")));

        let mut by_name = HashMap::new();
        for (def, handle) in self.materials.iter().zip(&handles) {
            if let Some(name) = &def.name {
                by_name.insert(name.clone(), handle.clone());
            }
        }

        let mut scene = Node::new("Scene");
        for root in &self.roots {
            scene.add_child(instantiate_node(root, &handles, &default_material));
        }
        LoadedAsset {
            scene,
            materials: by_name,
        }
    }
}

fn standard_from_def(def: &MaterialDef) -> Material {
    let mut material = StandardMaterial::named(def.name.as_deref().unwrap_or(""));
    material.color = crate::color::Color::new(def.base_color[0], def.base_color[1], def.base_color[2]);
    material.metalness = def.metalness;
    material.roughness = def.roughness;
    material.map = def.base_color_map.as_ref().map(|map| TextureMap {
        name: map.name.clone(),
        width: map.width,
        height: map.height,
        color_space: ColorSpace::Linear,
    });
    Material::Standard(material)
}

fn instantiate_node(
    doc: &DocNode,
    handles: &[MaterialHandle],
    default_material: &MaterialHandle,
) -> Node {
    let mut node = Node::new(&doc.name);
    node.position = doc.translation;
    let (rx, ry, rz) = doc.rotation.to_euler(EulerRot::XYZ);
    node.rotation = Vec3::new(rx, ry, rz);
    node.scale = doc.scale;

    if !doc.primitives.is_empty() {
        let mut slots: Vec<MaterialHandle> = Vec::with_capacity(doc.primitives.len());
        let mut bounds: Option<Aabb> = None;
        for prim in &doc.primitives {
            let handle = match prim.material {
                Some(index) => handles
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| default_material.clone()),
                None => default_material.clone(),
            };
            slots.push(handle);
            bounds = Some(match bounds {
                Some(acc) => acc.union(prim.bounds),
                None => prim.bounds,
            });
        }
        let material = if slots.len() == 1 {
            MaterialSlot::Single(slots.remove(0))
        } else {
            MaterialSlot::Multi(slots)
        };
        node.mesh = Some(Mesh {
            local_bounds: bounds.unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO)),
            material,
        });
    }

    for child in &doc.children {
        node.add_child(instantiate_node(child, handles, default_material));
    }
    node
}

type Cache = Mutex<HashMap<String, Arc<AssetDocument>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock(cache: &Cache) -> MutexGuard<'_, HashMap<String, Arc<AssetDocument>>> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fetch the parsed document for `url`, loading it on first request. The
/// cache is keyed by URL and lives for the process lifetime; there is no
/// eviction (a configurator uses a single avatar model).
pub fn ensure_loaded(url: &str) -> Result<Arc<AssetDocument>, AssetError> {
    if let Some(doc) = lock(cache()).get(url) {
        log::debug!("model cache hit for {}", url);
        return Ok(doc.clone());
    }
    let doc = Arc::new(load_document(url)?);
    log::info!(
        "loaded model {}: {} root nodes, {} materials",
        url,
        doc.roots.len(),
        doc.materials.len()
    );
    let mut map = lock(cache());
    Ok(map.entry(url.to_string()).or_insert(doc).clone())
}

/// Best-effort cache warm-up, called once at startup so the first mounted
/// viewer does not pay the parse cost. Failure is logged, never raised; the
/// viewer surfaces the real error when it actually mounts.
pub fn preload(url: &str) {
    if let Err(err) = ensure_loaded(url) {
        log::warn!("model warm-up failed for {}: {}", url, err);
    }
}

fn load_document(url: &str) -> Result<AssetDocument, AssetError> {
    let (document, _buffers, images) =
        gltf::import(Path::new(url)).map_err(|source| AssetError::Import {
            path: url.to_string(),
            source,
        })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::EmptyScene {
            path: url.to_string(),
        })?;

    let materials = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            let factor = pbr.base_color_factor();
            let base_color_map = pbr.base_color_texture().map(|info| {
                let texture = info.texture();
                let (width, height) = images
                    .get(texture.source().index())
                    .map(|data| (data.width, data.height))
                    .unwrap_or((0, 0));
                MapDef {
                    name: texture.name().unwrap_or("basecolor").to_string(),
                    width,
                    height,
                }
            });
            MaterialDef {
                name: material.name().map(str::to_string),
                base_color: [factor[0], factor[1], factor[2]],
                metalness: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                base_color_map,
            }
        })
        .collect();

    let roots = scene.nodes().map(|node| convert_node(&node)).collect();

    Ok(AssetDocument {
        url: url.to_string(),
        materials,
        roots,
    })
}

fn convert_node(node: &gltf::Node) -> DocNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let primitives = node
        .mesh()
        .map(|mesh| {
            mesh.primitives()
                .map(|prim| {
                    let bounds = prim.bounding_box();
                    DocPrimitive {
                        bounds: Aabb::new(Vec3::from(bounds.min), Vec3::from(bounds.max)),
                        material: prim.material().index(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    DocNode {
        name: node.name().unwrap_or_default().to_string(),
        translation: Vec3::from(translation),
        rotation: Quat::from_xyzw(rotation[0], rotation[1], rotation[2], rotation[3]),
        scale: Vec3::from(scale),
        primitives,
        children: node.children().map(|child| convert_node(&child)).collect(),
    }
}
