//! Headless preview driver.
//!
//! Loads an avatar model, mounts a viewer, and runs a short scripted
//! interaction (view switches, rotation, zoom, recolors), logging the
//! resulting scene state after each step. Useful for smoke-testing a model
//! export without the full configurator UI.

use saree_previz::{
    assets, AvatarProps, AvatarViewer, ColorInput, ViewMode, ViewerPhase, DEFAULT_MODEL_URL,
};

fn log_state(viewer: &AvatarViewer, step: &str) {
    match viewer.phase() {
        ViewerPhase::Failed(_) => {
            log::error!(
                "[{}] {}",
                step,
                viewer
                    .fallback_message()
                    .unwrap_or_else(|| "3D preview failed".to_string())
            );
        }
        phase => {
            let group = viewer.group();
            log::info!(
                "[{}] phase={:?} yaw={:.1}deg group_scale={:.2} fit_scale={:.3} camera_z={:.2}",
                step,
                phase,
                group.rotation.y.to_degrees(),
                group.scale.x,
                viewer.fit_state().scale,
                viewer.camera().position.z,
            );
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let model_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string());
    log::info!("Saree Previz - headless preview of {}", model_url);

    // Warm the cache up front, the way the configurator does at startup.
    assets::preload(&model_url);

    let mut viewer = AvatarViewer::mount(AvatarProps {
        model_url: Some(model_url),
        ..AvatarProps::default()
    });

    viewer.render_frame();
    log_state(&viewer, "mount");
    if matches!(viewer.phase(), ViewerPhase::Failed(_)) {
        std::process::exit(1);
    }

    viewer.set_colors(
        Some(ColorInput::Hex("#8e24aa".to_string())),
        Some(ColorInput::Hex("#311b92".to_string())),
        Some(ColorInput::Hex("#d4af37".to_string())),
    );
    viewer.render_frame();
    log_state(&viewer, "recolor");

    for view in [ViewMode::Back, ViewMode::Side, ViewMode::Free] {
        viewer.set_view(view);
        viewer.render_frame();
        log_state(&viewer, &format!("view {:?}", view));
    }

    viewer.set_view(ViewMode::Front);
    viewer.set_rotation(45.0);
    viewer.render_frame();
    log_state(&viewer, "rotate 45");

    viewer.set_zoom(2.0);
    viewer.render_frame();
    log_state(&viewer, "zoom 2.0");

    viewer.set_zoom(0.1);
    viewer.render_frame();
    log_state(&viewer, "zoom floor");

    log::info!("done");
}
