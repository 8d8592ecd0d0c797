//! What to draw each frame and the seam to whatever draws it.
//!
//! The scene is flattened into a [`DrawList`] (light, reticle, placed meshes with world matrices,
//! the views to render from) and handed to a [`Renderer`].
//!
//! # Key types
//!
//! - [`Draw<'a>`] is one draw: a mesh, its world matrix and material colour
//! - [`RenderView`] is one eye: projection, world-to-view matrix and target rectangle
//! - [`DrawList<'a>`] is the per-frame list plus the light and views
//! - [`Renderer`] is implemented by [`crate::gpu::GpuRenderer`] and [`LogRenderer`]
//! - [`LogRenderer`] is a headless renderer that only traces what it was asked to draw

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    camera::{PerspectiveCamera, Viewport},
    data_structures::{
        light::HemisphereLight,
        model::{Material, Mesh},
        scene_graph::Scene,
    },
};

/// What a draw represents. Renderers typically give the reticle an unlit material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Reticle,
    /// Mesh `mesh` of placed model `model`.
    Placed { model: usize, mesh: usize },
}

#[derive(Clone, Debug)]
pub struct Draw<'a> {
    pub kind: DrawKind,
    pub mesh: &'a Mesh,
    pub world: Matrix4<f32>,
    pub base_color: [f32; 4],
}

/// Pixel rectangle of a render target, origin at the bottom left as in WebGL and WebXR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One view the scene is rendered from: the single camera of a flat screen, or one eye of an
/// XR viewer pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderView {
    pub projection: Matrix4<f32>,
    /// World to view transform, the inverse of the view's pose.
    pub view: Matrix4<f32>,
    /// Part of the target this view covers. `None` is the whole target.
    pub viewport: Option<PixelRect>,
}

impl RenderView {
    /// The controller's camera, looking from the origin down -Z over the whole target.
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            projection: camera.calc_matrix(),
            view: Matrix4::identity(),
            viewport: None,
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

#[derive(Clone, Debug)]
pub struct DrawList<'a> {
    /// Never empty.
    pub views: Vec<RenderView>,
    pub light: Option<&'a HemisphereLight>,
    pub draws: Vec<Draw<'a>>,
}

impl<'a> DrawList<'a> {
    /// Draw list for a frame without an active session: nothing but the camera.
    pub fn empty(camera: &PerspectiveCamera) -> Self {
        Self {
            views: vec![RenderView::from_camera(camera)],
            light: None,
            draws: Vec::new(),
        }
    }

    /// Flattens `scene`. Without `views` (no viewer pose this frame) the scene is drawn from
    /// `camera`.
    pub fn from_scene(scene: &'a Scene, camera: &PerspectiveCamera, views: &[RenderView]) -> Self {
        let mut draws = Vec::new();
        let reticle = scene.reticle();
        if reticle.visible {
            draws.push(Draw {
                kind: DrawKind::Reticle,
                mesh: reticle.mesh(),
                world: scene.root().to_matrix() * reticle.pose(),
                base_color: [1.0, 1.0, 1.0, 1.0],
            });
        }
        for (model_idx, placed) in scene.models().iter().enumerate() {
            let world = scene.world_transform(placed);
            let model = placed.model();
            for (mesh_idx, mesh) in model.meshes.iter().enumerate() {
                let base_color = model
                    .materials
                    .get(mesh.material)
                    .map(|m| m.base_color)
                    .unwrap_or(Material::default().base_color);
                draws.push(Draw {
                    kind: DrawKind::Placed {
                        model: model_idx,
                        mesh: mesh_idx,
                    },
                    mesh,
                    world: world * mesh.transform,
                    base_color,
                });
            }
        }
        let views = if views.is_empty() {
            vec![RenderView::from_camera(camera)]
        } else {
            views.to_vec()
        };
        Self {
            views,
            light: Some(scene.light()),
            draws,
        }
    }

    pub fn reticle(&self) -> Option<&Draw<'a>> {
        self.draws.iter().find(|d| d.kind == DrawKind::Reticle)
    }
}

pub trait Renderer {
    /// Called on start-up and whenever the window is resized.
    fn set_size(&mut self, viewport: Viewport);

    fn render(&mut self, draw_list: &DrawList<'_>);
}

/// Renderer without output. Counts frames and traces draws, useful headless and in tests.
#[derive(Debug, Default)]
pub struct LogRenderer {
    pub frames: u64,
    pub viewport: Option<Viewport>,
    pub last_draw_count: usize,
}

impl Renderer for LogRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        log::debug!(
            "Render surface {}x{} @{}x",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );
        self.viewport = Some(viewport);
    }

    fn render(&mut self, draw_list: &DrawList<'_>) {
        self.frames += 1;
        self.last_draw_count = draw_list.draws.len();
        for draw in &draw_list.draws {
            log::trace!(
                "frame {} ({} views): {:?} '{}' ({} indices)",
                self.frames,
                draw_list.views.len(),
                draw.kind,
                draw.mesh.name,
                draw.mesh.num_elements()
            );
        }
    }
}
