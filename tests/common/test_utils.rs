use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use ar_placement::{
    AssetLoader, Config, ReferenceSpaceType, SessionController, Viewport, XrSession,
    cgmath::{Matrix4, Vector3},
    data_structures::model::{LoadedModel, Material, Mesh, ModelVertex},
    render::RenderView,
};
use futures::{
    FutureExt,
    channel::oneshot,
    future::LocalBoxFuture,
};

/// What a scripted session has been asked so far and how it should answer.
#[derive(Default)]
pub struct Script {
    pub space_requests: Vec<ReferenceSpaceType>,
    pub source_requests: u32,
    pub next_source_id: u32,
    pub fail_space: bool,
    /// When set the reference space request only resolves after the sender fires.
    pub space_gate: Option<oneshot::Receiver<()>>,
    /// Reported as the viewer's views on every frame.
    pub views: Vec<RenderView>,
}

/// XR session double. Frames are just the list of hit poses the "device" reports, nearest first.
#[derive(Clone, Default)]
pub struct ScriptedSession(pub Rc<RefCell<Script>>);

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let session = Self::default();
        session.0.borrow_mut().space_gate = Some(rx);
        (session, tx)
    }

    pub fn failing() -> Self {
        let session = Self::default();
        session.0.borrow_mut().fail_space = true;
        session
    }

    pub fn set_views(&self, views: Vec<RenderView>) {
        self.0.borrow_mut().views = views;
    }

    pub fn source_requests(&self) -> u32 {
        self.0.borrow().source_requests
    }
}

impl XrSession for ScriptedSession {
    type Space = ReferenceSpaceType;
    type HitTestSource = u32;
    type Frame = Vec<Matrix4<f32>>;

    fn request_reference_space(
        &self,
        kind: ReferenceSpaceType,
    ) -> LocalBoxFuture<'static, anyhow::Result<Self::Space>> {
        let mut script = self.0.borrow_mut();
        script.space_requests.push(kind);
        let gate = script.space_gate.take();
        let fail = script.fail_space;
        async move {
            if let Some(gate) = gate {
                gate.await?;
            }
            if fail {
                anyhow::bail!("reference space '{}' not supported", kind);
            }
            Ok(kind)
        }
        .boxed_local()
    }

    fn request_hit_test_source(
        &self,
        space: &Self::Space,
    ) -> LocalBoxFuture<'static, anyhow::Result<Self::HitTestSource>> {
        assert_eq!(*space, ReferenceSpaceType::Viewer, "hit tests must be cast from the viewer");
        let mut script = self.0.borrow_mut();
        script.source_requests += 1;
        script.next_source_id += 1;
        let id = script.next_source_id;
        async move { Ok(id) }.boxed_local()
    }

    fn hit_test_poses(
        &self,
        frame: &Self::Frame,
        _source: &Self::HitTestSource,
    ) -> Vec<Matrix4<f32>> {
        frame.clone()
    }

    fn viewer_views(&self, _frame: &Self::Frame) -> Vec<RenderView> {
        self.0.borrow().views.clone()
    }
}

enum Answer {
    Now(bool),
    Later(oneshot::Receiver<anyhow::Result<LoadedModel>>),
}

/// Asset loader double counting every load. Answers immediately by default; queued senders
/// let a test decide when (and how) a load completes.
#[derive(Clone, Default)]
pub struct CountingLoader {
    pub calls: Rc<RefCell<Vec<String>>>,
    answers: Rc<RefCell<VecDeque<Answer>>>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn fail_next(&self) {
        self.answers.borrow_mut().push_back(Answer::Now(false));
    }

    pub fn defer_next(&self) -> oneshot::Sender<anyhow::Result<LoadedModel>> {
        let (tx, rx) = oneshot::channel();
        self.answers.borrow_mut().push_back(Answer::Later(rx));
        tx
    }
}

impl AssetLoader for CountingLoader {
    fn load(&self, dir: &str, file: &str) -> LocalBoxFuture<'static, anyhow::Result<LoadedModel>> {
        self.calls.borrow_mut().push(format!("{}{}", dir, file));
        let name = file.to_string();
        match self.answers.borrow_mut().pop_front() {
            None | Some(Answer::Now(true)) => async move { Ok(model(&name)) }.boxed_local(),
            Some(Answer::Now(false)) => {
                async move { Err(anyhow::anyhow!("{} not found", name)) }.boxed_local()
            }
            Some(Answer::Later(rx)) => async move { rx.await? }.boxed_local(),
        }
    }
}

/// Single triangle model with one material.
pub fn model(name: &str) -> LoadedModel {
    let vertex = |x: f32, y: f32| ModelVertex {
        position: [x, y, 0.0],
        ..Default::default()
    };
    LoadedModel {
        name: name.to_string(),
        meshes: vec![Mesh::new(
            "triangle",
            vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
            vec![0, 1, 2],
        )],
        materials: vec![Material::default()],
    }
}

pub fn pose(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}

pub fn controller(
    loader: CountingLoader,
) -> SessionController<ScriptedSession, CountingLoader> {
    SessionController::new(Config::default(), loader, Viewport::new(800, 600))
}

/// Starts `session` and runs frames until the hit-test source is available.
pub fn start_with_source(
    controller: &mut SessionController<ScriptedSession, CountingLoader>,
    session: ScriptedSession,
) {
    controller.start_session(session);
    controller.on_frame(&vec![]);
    assert!(controller.hit_test_source().is_some());
}
