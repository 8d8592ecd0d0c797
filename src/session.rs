//! Session lifecycle and per-frame driving.
//!
//! [`SessionController`] is the single owner of all program state. The platform layer forwards
//! four kinds of events into it:
//!
//! 1. session start / end ([`SessionController::start_session`], [`SessionController::end_session`])
//! 2. one call per XR frame ([`SessionController::on_frame`])
//! 3. select gestures ([`SessionController::on_select`])
//! 4. viewport changes ([`SessionController::on_resize`])
//!
//! and renders with [`SessionController::render`] after each frame.

use crate::{
    camera::{PerspectiveCamera, Viewport},
    config::Config,
    context::SessionContext,
    data_structures::scene_graph::Scene,
    placement::AssetLoader,
    render::{DrawList, Renderer},
    xr::{SessionInit, XrSession, hit_test::HitOutcome},
};

pub const SESSION_MODE: &str = "immersive-ar";

pub struct SessionController<S: XrSession, L> {
    config: Config,
    loader: L,
    camera: PerspectiveCamera,
    viewport: Viewport,
    session: Option<SessionContext<S>>,
}

impl<S, L> SessionController<S, L>
where
    S: XrSession + Clone + 'static,
    L: AssetLoader,
{
    pub fn new(config: Config, loader: L, viewport: Viewport) -> Self {
        let camera = PerspectiveCamera::from_config(&config.camera, viewport);
        Self {
            config,
            loader,
            camera,
            viewport,
            session: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// What the platform has to request when the user asks to enter AR.
    pub fn session_init(&self) -> SessionInit {
        SessionInit {
            mode: SESSION_MODE,
            required_features: self.config.required_features.clone(),
        }
    }

    /// Takes ownership of a freshly granted session and builds a new scene for it.
    pub fn start_session(&mut self, xr: S) {
        if self.session.is_some() {
            log::warn!("A session was started while another one was running, ending the old one");
            self.end_session();
        }
        log::info!("AR session started");
        self.session = Some(SessionContext::new(xr, &self.config));
    }

    /// Tears down the running session. Returns `false` if there was none.
    pub fn end_session(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        session.shutdown();
        log::info!(
            "AR session ended after {} frames ({:?}), {} models placed",
            session.frames(),
            session.started.elapsed(),
            session.scene().models().len()
        );
        true
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Runs the hit test for `frame`, moves the reticle, places finished models and picks up the
    /// views to render from.
    /// `None` when no session is running.
    pub fn on_frame(&mut self, frame: &S::Frame) -> Option<HitOutcome> {
        let session = self.session.as_mut()?;
        session.frames += 1;
        session.views = session.xr.viewer_views(frame);

        let outcome = session.hit_tester.on_frame(&session.xr, frame);
        match outcome {
            HitOutcome::Hit(pose) => session.scene.reticle_mut().show_at(pose),
            HitOutcome::Miss => session.scene.reticle_mut().hide(),
            HitOutcome::NoSource => {}
        }
        session.placer.poll(&mut session.scene);
        Some(outcome)
    }

    /// Select/tap gesture. Returns whether an asset load was started.
    pub fn on_select(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.placer.on_select(&self.loader, session.scene.reticle())
    }

    /// Window resize. Keeps the camera aspect at `width / height`; empty viewports are ignored.
    pub fn on_resize(&mut self, viewport: Viewport) -> bool {
        if viewport.is_empty() {
            return false;
        }
        self.viewport = viewport;
        self.camera.resize(viewport.width, viewport.height);
        true
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.session.as_ref().map(|s| s.scene())
    }

    pub fn session(&self) -> Option<&SessionContext<S>> {
        self.session.as_ref()
    }

    pub fn hit_test_source(&self) -> Option<&S::HitTestSource> {
        self.session
            .as_ref()
            .and_then(|s| s.hit_tester.source())
    }

    pub fn pending_loads(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.placer.pending())
    }

    pub fn draw_list(&self) -> DrawList<'_> {
        match &self.session {
            Some(session) => {
                DrawList::from_scene(session.scene(), &self.camera, session.views())
            }
            None => DrawList::empty(&self.camera),
        }
    }

    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        renderer.render(&self.draw_list());
    }
}
