//! One-time geometry normalization.
//!
//! Scaling and ground-snapping are relative operations; running them twice
//! would compound (double the scale, sink the model). The `fitted` flag on
//! [`FitState`] is the sole guard, scoped to one mounted viewer instance.

use crate::scene::{bounding_box, Node};

/// Fitted model height in scene units. Larger reads bigger on screen.
pub const TARGET_HEIGHT: f32 = 3.2;
/// Small downward framing nudge so the toolbar does not crop the head.
pub const FRAME_NUDGE: f32 = 0.12;

/// Per-viewer fit state. Created on mount, discarded on unmount; a remount
/// starts unfitted and re-runs the procedure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitState {
    fitted: bool,
    pub scale: f32,
    pub ground_offset: f32,
}

impl FitState {
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }
}

/// Attach the pending scene under `group` and normalize it, exactly once.
///
/// Invoked every frame; returns immediately once fitted, and does nothing
/// until the asset is actually available. Steps: re-parent the scene root,
/// scale its measured height to [`TARGET_HEIGHT`] (degenerate height keeps
/// scale 1), re-measure, drop the lowest point onto the ground plane, then
/// nudge down by [`FRAME_NUDGE`].
pub fn fit_once(group: &mut Node, pending: &mut Option<Node>, fit: &mut FitState) {
    if fit.fitted {
        return;
    }
    let Some(scene) = pending.take() else {
        return;
    };

    group.clear_children();
    group.add_child(scene);
    let Some(root) = group.children.last_mut() else {
        return;
    };

    let height = bounding_box(root).map(|b| b.size().y).unwrap_or(0.0);
    let scale = if height > 0.0 {
        TARGET_HEIGHT / height
    } else {
        1.0
    };
    root.set_uniform_scale(scale);

    let ground = bounding_box(root).map(|b| b.min.y).unwrap_or(0.0);
    root.position.y -= ground;
    root.position.y -= FRAME_NUDGE;

    fit.fitted = true;
    fit.scale = scale;
    fit.ground_offset = -(ground + FRAME_NUDGE);
    log::debug!(
        "fitted model: scale {:.4}, ground offset {:.4}",
        fit.scale,
        fit.ground_offset
    );
}

#[cfg(test)]
mod tests {
    use super::{fit_once, FitState, FRAME_NUDGE, TARGET_HEIGHT};
    use crate::scene::material::{share, BasicMaterial, Material};
    use crate::scene::{bounding_box, Aabb, MaterialSlot, Mesh, Node};
    use glam::Vec3;

    fn body_scene(min_y: f32, max_y: f32) -> Node {
        let mut scene = Node::new("Scene");
        scene.add_child(Node::with_mesh(
            "Body",
            Mesh {
                local_bounds: Aabb::new(Vec3::new(-0.4, min_y, -0.2), Vec3::new(0.4, max_y, 0.2)),
                material: MaterialSlot::Single(share(Material::Basic(BasicMaterial::named("m")))),
            },
        ));
        scene
    }

    #[test]
    fn fit_scales_to_target_height_and_grounds_feet() {
        let mut group = Node::new("avatar");
        let mut pending = Some(body_scene(0.5, 2.5));
        let mut fit = FitState::default();

        fit_once(&mut group, &mut pending, &mut fit);

        assert!(fit.is_fitted());
        assert!((fit.scale - TARGET_HEIGHT / 2.0).abs() < 1e-5);

        let bounds = bounding_box(&group).unwrap();
        assert!((bounds.size().y - TARGET_HEIGHT).abs() < 1e-4);
        assert!((bounds.min.y + FRAME_NUDGE).abs() < 1e-4);
    }

    #[test]
    fn second_fit_is_a_no_op() {
        let mut group = Node::new("avatar");
        let mut pending = Some(body_scene(0.0, 2.0));
        let mut fit = FitState::default();

        fit_once(&mut group, &mut pending, &mut fit);
        let scale_after_first = group.children[0].scale;
        let position_after_first = group.children[0].position;
        let state_after_first = fit;

        // Simulate a re-render that somehow re-supplies the scene: the guard
        // must win and the pending scene must not even be consumed.
        let mut refill = Some(body_scene(0.0, 2.0));
        fit_once(&mut group, &mut refill, &mut fit);

        assert!(refill.is_some());
        assert_eq!(group.children[0].scale, scale_after_first);
        assert_eq!(group.children[0].position, position_after_first);
        assert_eq!(fit.scale, state_after_first.scale);
        assert_eq!(fit.ground_offset, state_after_first.ground_offset);
    }

    #[test]
    fn degenerate_height_falls_back_to_unit_scale() {
        let mut group = Node::new("avatar");
        let mut pending = Some(body_scene(1.0, 1.0));
        let mut fit = FitState::default();

        fit_once(&mut group, &mut pending, &mut fit);

        assert!(fit.is_fitted());
        assert_eq!(fit.scale, 1.0);
        assert!(fit.ground_offset.is_finite());
        let root = &group.children[0];
        assert!(root.position.y.is_finite());
        assert_eq!(root.scale, Vec3::ONE);
    }

    #[test]
    fn fit_waits_for_the_asset() {
        let mut group = Node::new("avatar");
        let mut pending: Option<Node> = None;
        let mut fit = FitState::default();

        fit_once(&mut group, &mut pending, &mut fit);
        assert!(!fit.is_fitted());
        assert!(group.children.is_empty());
    }
}
