//! Scene data: transforms, meshes, the reticle, light and the scene that owns them.
//!
//! - `instance` holds position/rotation/scale transforms
//! - `model` contains CPU-side meshes and loaded glTF models
//! - `reticle` builds the ring marker and tracks its pose
//! - `light` is the hemisphere light above the scene
//! - `scene_graph` ties everything together for one session

pub mod instance;
pub mod light;
pub mod model;
pub mod reticle;
pub mod scene_graph;
