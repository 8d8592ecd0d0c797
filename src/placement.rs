//! Tap-to-place: turning a select gesture into a model in the scene.

use cgmath::{Matrix4, SquareMatrix};
use futures::future::LocalBoxFuture;
use instant::Instant;

use crate::{
    config::{Config, PlacementMode},
    data_structures::{
        instance::Instance, model::LoadedModel, reticle::Reticle, scene_graph::Scene,
    },
    task::poll_now,
};

/// Source of placeable models.
///
/// `dir` is the directory the asset lives in (used to resolve buffers the asset references),
/// `file` the asset itself.
pub trait AssetLoader {
    fn load(&self, dir: &str, file: &str) -> LocalBoxFuture<'static, anyhow::Result<LoadedModel>>;
}

struct PendingLoad {
    anchor: Matrix4<f32>,
    started: Instant,
    future: LocalBoxFuture<'static, anyhow::Result<LoadedModel>>,
}

/// Starts one asset load per valid tap and adds finished models to the scene.
pub struct Placer {
    dir: String,
    file: String,
    /// `dir` and `file` joined, for log messages.
    path: String,
    mode: PlacementMode,
    scale: Instance,
    pending: Vec<PendingLoad>,
}

impl Placer {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.asset_dir.clone(),
            file: config.asset_file.clone(),
            path: config.asset_path(),
            mode: config.placement,
            scale: Instance::from_uniform_scale(config.model_scale),
            pending: Vec::new(),
        }
    }

    /// Handles a select gesture. Without a visible reticle there is no surface to place on and
    /// the tap is ignored (`false`).
    pub fn on_select<L: AssetLoader>(&mut self, loader: &L, reticle: &Reticle) -> bool {
        let Some(pose) = reticle.anchor() else {
            log::trace!("Ignoring tap, no surface under the reticle");
            return false;
        };
        let anchor = match self.mode {
            PlacementMode::AtReticle => pose,
            PlacementMode::SceneOrigin => Matrix4::identity(),
        };
        log::debug!("Loading {} for placement", self.path);
        self.pending.push(PendingLoad {
            anchor,
            started: Instant::now(),
            future: loader.load(&self.dir, &self.file),
        });
        true
    }

    /// Polls outstanding loads and places every model that finished. Returns how many models
    /// were added this call.
    pub fn poll(&mut self, scene: &mut Scene) -> usize {
        let mut placed = 0;
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut load in self.pending.drain(..) {
            match poll_now(&mut load.future) {
                None => still_pending.push(load),
                Some(Ok(model)) => {
                    let size = model.bounds().map(|b| b.size());
                    log::info!(
                        "Placed {} ({} vertices, extent {:?}) after {:?}",
                        model.name,
                        model.vertex_count(),
                        size,
                        load.started.elapsed()
                    );
                    let transform = load.anchor * self.scale.to_matrix();
                    scene.add_model(model, transform);
                    placed += 1;
                }
                Some(Err(e)) => {
                    log::warn!("Could not load {}: {:#}", self.path, e);
                }
            }
        }
        self.pending = still_pending;
        placed
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drops all loads in flight. Their results are never placed.
    pub fn cancel(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Dropping {} pending asset loads", self.pending.len());
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use cgmath::Vector3;
    use futures::FutureExt;

    use super::*;

    struct CountingLoader {
        calls: Cell<u32>,
        fail: bool,
    }

    impl CountingLoader {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl AssetLoader for CountingLoader {
        fn load(
            &self,
            _dir: &str,
            file: &str,
        ) -> LocalBoxFuture<'static, anyhow::Result<LoadedModel>> {
            self.calls.set(self.calls.get() + 1);
            let fail = self.fail;
            let name = file.to_string();
            async move {
                if fail {
                    anyhow::bail!("404");
                }
                Ok(LoadedModel {
                    name,
                    meshes: vec![],
                    materials: vec![],
                })
            }
            .boxed_local()
        }
    }

    fn pose() -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(0.5, -1.0, -2.0))
    }

    #[test]
    fn tap_without_surface_is_ignored() {
        let config = Config::default();
        let mut scene = Scene::new(&config);
        let mut placer = Placer::new(&config);
        let loader = CountingLoader::new(false);

        assert!(!placer.on_select(&loader, scene.reticle()));
        assert_eq!(loader.calls.get(), 0);
        assert_eq!(placer.poll(&mut scene), 0);
        assert!(scene.models().is_empty());
    }

    #[test]
    fn one_load_per_tap_placed_at_reticle() {
        let config = Config::default();
        let mut scene = Scene::new(&config);
        scene.reticle_mut().show_at(pose());
        let mut placer = Placer::new(&config);
        let loader = CountingLoader::new(false);

        assert!(placer.on_select(&loader, scene.reticle()));
        assert_eq!(loader.calls.get(), 1);
        assert_eq!(placer.poll(&mut scene), 1);
        assert_eq!(scene.models().len(), 1);
        assert_eq!(scene.models()[0].local_transform(), pose());
        assert_eq!(scene.models()[0].model().name, "MaterialsVariantsShoe.gltf");
    }

    #[test]
    fn scene_origin_mode_ignores_reticle_pose() {
        let config = Config::default().with_placement(PlacementMode::SceneOrigin);
        let mut scene = Scene::new(&config);
        scene.reticle_mut().show_at(pose());
        let mut placer = Placer::new(&config);

        placer.on_select(&CountingLoader::new(false), scene.reticle());
        placer.poll(&mut scene);
        assert_eq!(scene.models()[0].local_transform(), Matrix4::identity());
    }

    #[test]
    fn failed_load_places_nothing() {
        let config = Config::default();
        let mut scene = Scene::new(&config);
        scene.reticle_mut().show_at(pose());
        let mut placer = Placer::new(&config);

        assert!(placer.on_select(&CountingLoader::new(true), scene.reticle()));
        assert_eq!(placer.poll(&mut scene), 0);
        assert_eq!(placer.pending(), 0);
        assert!(scene.models().is_empty());
    }

    #[test]
    fn cancel_drops_pending_loads() {
        let config = Config::default();
        let mut scene = Scene::new(&config);
        scene.reticle_mut().show_at(pose());
        let mut placer = Placer::new(&config);
        let loader = CountingLoader::new(false);
        placer.on_select(&loader, scene.reticle());
        placer.on_select(&loader, scene.reticle());
        assert_eq!(placer.pending(), 2);

        placer.cancel();
        assert_eq!(placer.poll(&mut scene), 0);
        assert!(scene.models().is_empty());
    }
}
