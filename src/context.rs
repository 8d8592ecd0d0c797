use instant::Instant;

use crate::{
    config::Config,
    data_structures::scene_graph::Scene,
    placement::Placer,
    render::RenderView,
    xr::{XrSession, hit_test::HitTester},
};

/// Everything that lives exactly as long as one XR session: the session handle, the scene and
/// the async work started on its behalf. Dropping it ends all of that.
pub struct SessionContext<S: XrSession> {
    pub(crate) xr: S,
    pub(crate) scene: Scene,
    pub(crate) hit_tester: HitTester<S>,
    pub(crate) placer: Placer,
    /// Views of the latest frame, empty until the viewer pose is known.
    pub(crate) views: Vec<RenderView>,
    pub(crate) started: Instant,
    pub(crate) frames: u64,
}

impl<S> SessionContext<S>
where
    S: XrSession + Clone + 'static,
{
    pub fn new(xr: S, config: &Config) -> Self {
        Self {
            xr,
            scene: Scene::new(config),
            hit_tester: HitTester::new(),
            placer: Placer::new(config),
            views: Vec::new(),
            started: Instant::now(),
            frames: 0,
        }
    }

    pub fn xr(&self) -> &S {
        &self.xr
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn views(&self) -> &[RenderView] {
        &self.views
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Cancels in-flight requests and releases the hit-test source.
    pub(crate) fn shutdown(&mut self) {
        self.hit_tester.reset();
        self.placer.cancel();
    }
}
