//! In-memory scene graph for the avatar preview.
//!
//! Nodes carry a TRS transform (euler rotation, since the viewer composes
//! rotation by writing `rotation.y` directly), an optional mesh, and child
//! nodes. Materials are shared handles so that painting a named material and
//! painting a mesh's slot reach the same instance.

pub mod material;

use glam::{EulerRot, Mat4, Quat, Vec3};
use material::MaterialHandle;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// World-space box of this local box under `matrix` (all eight corners
    /// transformed, then re-boxed).
    pub fn transformed(&self, matrix: Mat4) -> Aabb {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in corners {
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb { min, max }
    }
}

/// The material(s) a mesh draws with. Multi-primitive meshes carry one
/// handle per primitive, mirroring a material array.
#[derive(Debug, Clone)]
pub enum MaterialSlot {
    Single(MaterialHandle),
    Multi(Vec<MaterialHandle>),
}

impl MaterialSlot {
    pub fn handles(&self) -> impl Iterator<Item = &MaterialHandle> {
        match self {
            MaterialSlot::Single(handle) => std::slice::from_ref(handle).iter(),
            MaterialSlot::Multi(handles) => handles.iter(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub local_bounds: Aabb,
    pub material: MaterialSlot,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub position: Vec3,
    /// Euler rotation in radians, XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub mesh: Option<Mesh>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            cast_shadow: false,
            receive_shadow: false,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(name: &str, mesh: Mesh) -> Self {
        let mut node = Self::new(name);
        node.mesh = Some(mesh);
        node
    }

    pub fn local_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    pub fn traverse<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn traverse_mut<F: FnMut(&mut Node)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }
}

/// World-space bounding box of a subtree, including the root's own
/// transform. `None` when the subtree contains no meshes.
pub fn bounding_box(node: &Node) -> Option<Aabb> {
    fn visit(node: &Node, parent: Mat4, out: &mut Option<Aabb>) {
        let world = parent * node.local_matrix();
        if let Some(mesh) = &node.mesh {
            let bounds = mesh.local_bounds.transformed(world);
            *out = Some(match out {
                Some(acc) => acc.union(bounds),
                None => bounds,
            });
        }
        for child in &node.children {
            visit(child, world, out);
        }
    }
    let mut out = None;
    visit(node, Mat4::IDENTITY, &mut out);
    out
}
