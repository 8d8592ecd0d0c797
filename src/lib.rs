//! ar-placement
//!
//! Tap-to-place augmented reality. A session detects real-world surfaces with WebXR-style hit
//! testing, shows a ring reticle where a model would land and, on a select gesture, loads a
//! glTF asset and adds it to the scene. Device access and rendering stay behind traits so the
//! same controller runs in the browser (`wasm32`) and headless on native. Drawing is done with
//! wgpu (WebGL2 in the browser).
//!
//! High-level modules
//! - `camera`: perspective camera and viewport
//! - `config`: every constant of a session (asset path, camera, reticle, light, features)
//! - `context`: per-session state owned by the controller
//! - `data_structures`: scene, reticle, light, meshes and transforms
//! - `gpu`: the wgpu renderer
//! - `pipelines`: the render pipeline, its shader and uniforms
//! - `placement`: tap handling and the `AssetLoader` seam
//! - `render`: per-frame draw lists and the `Renderer` seam
//! - `resources`: glTF loading
//! - `session`: the session controller driving everything per frame
//! - `xr`: the `XrSession` seam and the hit-test loop
//! - `web`: browser bindings (wasm32 only)
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod gpu;
pub mod pipelines;
pub mod placement;
pub mod render;
pub mod resources;
pub mod session;
pub mod task;
pub mod xr;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-exports commonly used types for convenience in downstream code.
pub use camera::{PerspectiveCamera, Viewport};
pub use cgmath;
pub use config::{Config, PlacementMode};
pub use gpu::GpuRenderer;
pub use placement::AssetLoader;
pub use render::{DrawList, RenderView, Renderer};
pub use resources::{AssetRoot, GltfLoader};
pub use session::SessionController;
pub use xr::{ReferenceSpaceType, SessionInit, XrSession, hit_test::HitOutcome};

/// Installs the platform logger: `env_logger` on native (honours `RUST_LOG`), the browser
/// console on wasm. Calling it twice is harmless.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            log::debug!("Logger already initialised: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("Logger already initialised");
        }
    }
}
