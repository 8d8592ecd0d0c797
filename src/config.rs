//! Runtime constants for an AR placement session.
//!
//! Everything the session needs to know up front lives in [`Config`]: which asset is placed on
//! tap, how the camera projects, what the reticle and light look like and which XR features the
//! session has to be started with. [`Config::default`] reproduces the stock demo.

use cgmath::Deg;

/// Where a freshly loaded model ends up in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlacementMode {
    /// Use the reticle pose that was current when the user tapped.
    #[default]
    AtReticle,
    /// Leave the model at the scene's default transform (identity root).
    SceneOrigin,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReticleConfig {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub segments: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub sky_color: u32,
    pub ground_color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Directory the asset is served from. On native this is relative to the asset root.
    pub asset_dir: String,
    pub asset_file: String,
    /// Uniform scale applied to every placed model.
    pub model_scale: f32,
    pub placement: PlacementMode,
    pub camera: CameraConfig,
    pub reticle: ReticleConfig,
    pub light: LightConfig,
    pub required_features: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_dir: "/glTFk/".to_string(),
            asset_file: "MaterialsVariantsShoe.gltf".to_string(),
            model_scale: 1.0,
            placement: PlacementMode::default(),
            camera: CameraConfig {
                fovy: Deg(70.0),
                znear: 0.01,
                zfar: 20.0,
            },
            reticle: ReticleConfig {
                inner_radius: 0.15,
                outer_radius: 0.2,
                segments: 32,
            },
            light: LightConfig {
                sky_color: 0xffffff,
                ground_color: 0xbbbbff,
                intensity: 1.0,
                position: [0.5, 1.0, 0.25],
            },
            required_features: vec!["hit-test".to_string()],
        }
    }
}

impl Config {
    pub fn with_asset(mut self, dir: impl Into<String>, file: impl Into<String>) -> Self {
        self.asset_dir = dir.into();
        self.asset_file = file.into();
        self
    }

    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    /// Full asset path as the loader sees it, e.g. `/glTFk/MaterialsVariantsShoe.gltf`.
    pub fn asset_path(&self) -> String {
        let dir = self.asset_dir.trim_end_matches('/');
        format!("{}/{}", dir, self.asset_file)
    }
}
