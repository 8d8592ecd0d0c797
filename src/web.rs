//! Browser front end: WebXR session handling, the "START AR" button, the frame loop and the
//! canvas renderer.
//!
//! The WebXR hit-test module is not covered by `web-sys`, so the handful of XR interfaces used
//! here are imported directly with `wasm-bindgen`. All callbacks run on the main thread and share
//! one [`WebApp`] through `Rc<RefCell<_>>`.

use std::{cell::RefCell, rc::Rc};

use anyhow::Context;
use cgmath::Matrix4;
use futures::{FutureExt, future::LocalBoxFuture};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, HtmlButtonElement, HtmlCanvasElement, HtmlElement, WebGl2RenderingContext};

use crate::{
    camera::Viewport,
    config::Config,
    gpu::GpuRenderer,
    render::{DrawList, PixelRect, RenderView, Renderer},
    resources::GltfLoader,
    session::{SESSION_MODE, SessionController},
    xr::{ReferenceSpaceType, SessionInit, XrSession, matrix_from_column_major},
};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = XRSystem)]
    #[derive(Clone, Debug)]
    pub type XrSystem;

    #[wasm_bindgen(method, js_class = "XRSystem", js_name = isSessionSupported)]
    fn is_session_supported(this: &XrSystem, mode: &str) -> js_sys::Promise;

    #[wasm_bindgen(method, js_class = "XRSystem", js_name = requestSession)]
    fn request_session(this: &XrSystem, mode: &str, options: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(extends = web_sys::EventTarget, js_name = XRSession)]
    #[derive(Clone, Debug)]
    pub type XrSessionHandle;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = requestReferenceSpace)]
    fn request_reference_space(this: &XrSessionHandle, kind: &str) -> js_sys::Promise;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = requestHitTestSource)]
    fn request_hit_test_source(this: &XrSessionHandle, options: &JsValue) -> js_sys::Promise;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = requestAnimationFrame)]
    fn request_animation_frame(this: &XrSessionHandle, callback: &js_sys::Function) -> u32;

    #[wasm_bindgen(method, js_class = "XRSession", js_name = updateRenderState)]
    fn update_render_state(this: &XrSessionHandle, state: &JsValue);

    #[wasm_bindgen(method, js_class = "XRSession")]
    fn end(this: &XrSessionHandle) -> js_sys::Promise;

    #[wasm_bindgen(js_name = XRSpace)]
    #[derive(Clone, Debug)]
    pub type XrSpaceHandle;

    #[wasm_bindgen(js_name = XRFrame)]
    #[derive(Clone, Debug)]
    pub type XrFrameHandle;

    #[wasm_bindgen(method, js_class = "XRFrame", js_name = getHitTestResults)]
    fn get_hit_test_results(this: &XrFrameHandle, source: &XrHitTestSourceHandle) -> js_sys::Array;

    #[wasm_bindgen(method, js_class = "XRFrame", js_name = getViewerPose)]
    fn get_viewer_pose(this: &XrFrameHandle, space: &XrSpaceHandle) -> Option<XrViewerPoseHandle>;

    #[wasm_bindgen(js_name = XRViewerPose)]
    type XrViewerPoseHandle;

    #[wasm_bindgen(method, getter, js_class = "XRViewerPose")]
    fn views(this: &XrViewerPoseHandle) -> js_sys::Array;

    #[wasm_bindgen(js_name = XRView)]
    type XrViewHandle;

    #[wasm_bindgen(method, getter, js_class = "XRView", js_name = projectionMatrix)]
    fn projection_matrix(this: &XrViewHandle) -> js_sys::Float32Array;

    #[wasm_bindgen(method, getter, js_class = "XRView", js_name = transform)]
    fn view_transform(this: &XrViewHandle) -> XrRigidTransformHandle;

    #[wasm_bindgen(js_name = XRViewport)]
    type XrViewportHandle;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    fn x(this: &XrViewportHandle) -> i32;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    fn y(this: &XrViewportHandle) -> i32;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    fn width(this: &XrViewportHandle) -> i32;

    #[wasm_bindgen(method, getter, js_class = "XRViewport")]
    fn height(this: &XrViewportHandle) -> i32;

    #[wasm_bindgen(js_name = XRHitTestSource)]
    #[derive(Clone, Debug)]
    type XrHitTestSourceHandle;

    #[wasm_bindgen(catch, method, js_class = "XRHitTestSource")]
    fn cancel(this: &XrHitTestSourceHandle) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = XRHitTestResult)]
    type XrHitTestResultHandle;

    #[wasm_bindgen(method, js_class = "XRHitTestResult", js_name = getPose)]
    fn get_pose(this: &XrHitTestResultHandle, base_space: &XrSpaceHandle) -> Option<XrPoseHandle>;

    #[wasm_bindgen(js_name = XRPose)]
    type XrPoseHandle;

    #[wasm_bindgen(method, getter, js_class = "XRPose")]
    fn transform(this: &XrPoseHandle) -> XrRigidTransformHandle;

    #[wasm_bindgen(js_name = XRRigidTransform)]
    type XrRigidTransformHandle;

    #[wasm_bindgen(method, getter, js_class = "XRRigidTransform")]
    fn matrix(this: &XrRigidTransformHandle) -> js_sys::Float32Array;

    #[wasm_bindgen(method, getter, js_class = "XRRigidTransform")]
    fn inverse(this: &XrRigidTransformHandle) -> XrRigidTransformHandle;

    #[wasm_bindgen(js_name = XRWebGLLayer)]
    #[derive(Clone, Debug)]
    type XrWebGlLayerHandle;

    #[wasm_bindgen(catch, constructor, js_class = "XRWebGLLayer")]
    fn new(
        session: &XrSessionHandle,
        context: &WebGl2RenderingContext,
    ) -> Result<XrWebGlLayerHandle, JsValue>;

    #[wasm_bindgen(method, getter, js_class = "XRWebGLLayer")]
    fn framebuffer(this: &XrWebGlLayerHandle) -> Option<web_sys::WebGlFramebuffer>;

    #[wasm_bindgen(method, getter, js_class = "XRWebGLLayer", js_name = framebufferWidth)]
    fn framebuffer_width(this: &XrWebGlLayerHandle) -> u32;

    #[wasm_bindgen(method, getter, js_class = "XRWebGLLayer", js_name = framebufferHeight)]
    fn framebuffer_height(this: &XrWebGlLayerHandle) -> u32;

    #[wasm_bindgen(method, js_class = "XRWebGLLayer", js_name = getViewport)]
    fn get_viewport(this: &XrWebGlLayerHandle, view: &XrViewHandle) -> Option<XrViewportHandle>;
}

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

/// Hit-test source that is cancelled once nothing refers to it anymore.
pub struct HitTestSourceHandle(XrHitTestSourceHandle);

impl Drop for HitTestSourceHandle {
    fn drop(&mut self) {
        // throws when the session already ended
        if let Err(e) = self.0.cancel() {
            log::debug!("Hit-test source was already cancelled: {:?}", e);
        }
    }
}

/// A granted WebXR session plus the `local` space poses are reported in and the layer it renders
/// to.
#[derive(Clone, Debug)]
pub struct WebXrSession {
    session: XrSessionHandle,
    local_space: XrSpaceHandle,
    layer: Option<XrWebGlLayerHandle>,
}

impl WebXrSession {
    pub fn handle(&self) -> &XrSessionHandle {
        &self.session
    }
}

impl XrSession for WebXrSession {
    type Space = XrSpaceHandle;
    type HitTestSource = HitTestSourceHandle;
    type Frame = XrFrameHandle;

    fn request_reference_space(
        &self,
        kind: ReferenceSpaceType,
    ) -> LocalBoxFuture<'static, anyhow::Result<Self::Space>> {
        let promise = self.session.request_reference_space(kind.as_str());
        async move {
            let space = JsFuture::from(promise).await.map_err(js_err)?;
            Ok(space.unchecked_into())
        }
        .boxed_local()
    }

    fn request_hit_test_source(
        &self,
        space: &Self::Space,
    ) -> LocalBoxFuture<'static, anyhow::Result<Self::HitTestSource>> {
        let options = js_sys::Object::new();
        if let Err(e) = js_sys::Reflect::set(&options, &"space".into(), space) {
            return futures::future::ready(Err(js_err(e))).boxed_local();
        }
        let promise = self.session.request_hit_test_source(&options);
        async move {
            let source = JsFuture::from(promise).await.map_err(js_err)?;
            Ok(HitTestSourceHandle(source.unchecked_into()))
        }
        .boxed_local()
    }

    fn hit_test_poses(
        &self,
        frame: &Self::Frame,
        source: &Self::HitTestSource,
    ) -> Vec<Matrix4<f32>> {
        frame
            .get_hit_test_results(&source.0)
            .iter()
            .filter_map(|result| {
                let result: XrHitTestResultHandle = result.unchecked_into();
                let pose = result.get_pose(&self.local_space)?;
                matrix_from_column_major(&pose.transform().matrix().to_vec())
            })
            .collect()
    }

    fn viewer_views(&self, frame: &Self::Frame) -> Vec<RenderView> {
        let Some(pose) = frame.get_viewer_pose(&self.local_space) else {
            return Vec::new();
        };
        pose.views()
            .iter()
            .filter_map(|view| {
                let view: XrViewHandle = view.unchecked_into();
                let projection = matrix_from_column_major(&view.projection_matrix().to_vec())?;
                let world_to_view =
                    matrix_from_column_major(&view.view_transform().inverse().matrix().to_vec())?;
                let viewport = self
                    .layer
                    .as_ref()
                    .and_then(|layer| layer.get_viewport(&view))
                    .map(|vp| PixelRect {
                        x: vp.x().max(0) as u32,
                        y: vp.y().max(0) as u32,
                        width: vp.width().max(0) as u32,
                        height: vp.height().max(0) as u32,
                    });
                Some(RenderView {
                    projection,
                    view: world_to_view,
                    viewport,
                })
            })
            .collect()
    }
}

/// Draws the scene with [`GpuRenderer`] into the page canvas and, while a session runs, copies
/// every frame into the session's `XRWebGLLayer`.
///
/// wgpu cannot render into the layer's opaque framebuffer directly. It renders to the canvas,
/// which shares its XR compatible WebGL2 context with the layer, and the finished frame is
/// blitted over.
pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    gl: WebGl2RenderingContext,
    gpu: GpuRenderer,
    layer: Option<XrWebGlLayerHandle>,
}

impl WebRenderer {
    pub async fn new(document: &Document) -> anyhow::Result<Self> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| anyhow::anyhow!("created element is not a canvas"))?;
        // wgpu asks the canvas for "webgl2" again and is handed this context
        let options = js_sys::Object::new();
        for flag in ["xrCompatible", "alpha", "premultipliedAlpha"] {
            js_sys::Reflect::set(&options, &flag.into(), &JsValue::TRUE).map_err(js_err)?;
        }
        let gl: WebGl2RenderingContext = canvas
            .get_context_with_context_options("webgl2", &options)
            .map_err(js_err)?
            .context("WebGL2 is not available")?
            .dyn_into()
            .map_err(|_| anyhow::anyhow!("canvas context is not WebGL2"))?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .context("creating the canvas surface")?;
        let gpu =
            GpuRenderer::with_surface(&instance, surface, canvas.width(), canvas.height()).await?;
        Ok(Self {
            canvas,
            gl,
            gpu,
            layer: None,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Creates the session's base layer on the shared context. The layer is also handed to the
    /// [`WebXrSession`], which needs it for per-eye viewports.
    pub fn bind_session(&mut self, session: &XrSessionHandle) -> anyhow::Result<XrWebGlLayerHandle> {
        let layer = XrWebGlLayerHandle::new(session, &self.gl).map_err(js_err)?;
        let state = js_sys::Object::new();
        js_sys::Reflect::set(&state, &"baseLayer".into(), &layer).map_err(js_err)?;
        session.update_render_state(&state);
        self.layer = Some(layer.clone());
        Ok(layer)
    }

    /// Forgets the layer and the meshes of the ended session's scene.
    pub fn release_session(&mut self) {
        self.layer = None;
        self.gpu.clear_meshes();
    }

    fn match_layer_size(&mut self, layer: &XrWebGlLayerHandle) -> (u32, u32) {
        let size = (layer.framebuffer_width(), layer.framebuffer_height());
        if (self.canvas.width(), self.canvas.height()) != size {
            self.canvas.set_width(size.0);
            self.canvas.set_height(size.1);
        }
        self.gpu.resize(size.0, size.1);
        size
    }

    fn copy_to_layer(&self, layer: &XrWebGlLayerHandle, (width, height): (u32, u32)) {
        let gl = &self.gl;
        let (width, height) = (width as i32, height as i32);
        gl.bind_framebuffer(WebGl2RenderingContext::READ_FRAMEBUFFER, None);
        gl.bind_framebuffer(
            WebGl2RenderingContext::DRAW_FRAMEBUFFER,
            layer.framebuffer().as_ref(),
        );
        gl.blit_framebuffer(
            0,
            0,
            width,
            height,
            0,
            0,
            width,
            height,
            WebGl2RenderingContext::COLOR_BUFFER_BIT,
            WebGl2RenderingContext::NEAREST,
        );
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);
    }
}

impl Renderer for WebRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        let ratio = viewport.pixel_ratio;
        let width = format!("{}px", viewport.width);
        let height = format!("{}px", viewport.height);
        style_element(&self.canvas, &[("width", &width), ("height", &height)]);
        // during a session the layer decides the backing size
        if self.layer.is_none() {
            self.canvas
                .set_width((viewport.width as f64 * ratio).round() as u32);
            self.canvas
                .set_height((viewport.height as f64 * ratio).round() as u32);
            self.gpu.set_size(viewport);
        }
    }

    fn render(&mut self, draw_list: &DrawList<'_>) {
        let Some(layer) = self.layer.clone() else {
            self.gpu.render(draw_list);
            return;
        };
        let size = self.match_layer_size(&layer);
        self.gpu.render(draw_list);
        self.copy_to_layer(&layer, size);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64, XrFrameHandle)>>>>;

/// Callbacks registered on one session. They are dropped when the next session starts,
/// never from inside one of them.
struct SessionCallbacks {
    frame: FrameCallback,
    _select: Closure<dyn FnMut(web_sys::Event)>,
    _end: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for SessionCallbacks {
    fn drop(&mut self) {
        // breaks the frame closure's reference to itself
        self.frame.borrow_mut().take();
    }
}

pub struct WebApp {
    controller: SessionController<WebXrSession, GltfLoader>,
    /// `None` until the GPU is set up.
    renderer: Option<WebRenderer>,
    callbacks: Option<SessionCallbacks>,
}

type Shared = Rc<RefCell<WebApp>>;

fn current_viewport(window: &web_sys::Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as u32
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
        .with_pixel_ratio(window.device_pixel_ratio())
}

fn navigator_xr(window: &web_sys::Window) -> Option<XrSystem> {
    let xr = js_sys::Reflect::get(&window.navigator(), &"xr".into()).ok()?;
    if xr.is_undefined() || xr.is_null() {
        return None;
    }
    Some(xr.unchecked_into())
}

fn session_init_object(init: &SessionInit) -> Result<JsValue, JsValue> {
    let features: js_sys::Array = init
        .required_features
        .iter()
        .map(|f| JsValue::from_str(f))
        .collect();
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"requiredFeatures".into(), &features)?;
    Ok(options.into())
}

fn style_element(element: &HtmlElement, rules: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in rules {
        if let Err(e) = style.set_property(name, value) {
            log::debug!("Could not set {}: {:?}", name, e);
        }
    }
}

fn style_button(button: &HtmlButtonElement) {
    style_element(
        button,
        &[
            ("position", "absolute"),
            ("bottom", "20px"),
            ("left", "calc(50% - 50px)"),
            ("width", "100px"),
            ("padding", "12px 6px"),
            ("border", "1px solid #fff"),
            ("border-radius", "4px"),
            ("background", "rgba(0,0,0,0.1)"),
            ("color", "#fff"),
            ("font", "normal 13px sans-serif"),
            ("text-align", "center"),
            ("opacity", "0.5"),
            ("outline", "none"),
            ("z-index", "999"),
        ],
    );
}

fn show_unsupported(button: &HtmlButtonElement, label: &str) {
    button.set_text_content(Some(label));
    button.set_disabled(true);
    button.set_onclick(None);
}

fn show_start_button(button: &HtmlButtonElement, xr: XrSystem, app: Shared) {
    button.set_text_content(Some("START AR"));
    button.set_disabled(false);

    let label = button.clone();
    let on_click = Closure::<dyn FnMut()>::new(move || {
        let running = app
            .borrow()
            .controller
            .session()
            .map(|s| s.xr().handle().clone());
        if let Some(session) = running {
            // the `end` listener does the cleanup
            let _ = session.end();
            return;
        }

        let init = app.borrow().controller.session_init();
        let options = match session_init_object(&init) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Could not build session options: {:?}", e);
                return;
            }
        };
        let promise = xr.request_session(init.mode, &options);
        let app = app.clone();
        let label = label.clone();
        spawn_local(async move {
            match JsFuture::from(promise).await {
                Ok(session) => {
                    if let Err(e) = on_session_started(app, label, session.unchecked_into()).await {
                        log::error!("Could not start the AR session: {:#}", e);
                    }
                }
                Err(e) => log::error!("AR session request was rejected: {:?}", e),
            }
        });
    });
    button.set_onclick(Some(on_click.as_ref().unchecked_ref()));
    on_click.forget();
}

async fn on_session_started(
    app: Shared,
    button: HtmlButtonElement,
    session: XrSessionHandle,
) -> anyhow::Result<()> {
    let local_space = JsFuture::from(session.request_reference_space(ReferenceSpaceType::Local.as_str()))
        .await
        .map_err(js_err)?
        .unchecked_into::<XrSpaceHandle>();

    let layer = match app.borrow_mut().renderer.as_mut() {
        Some(renderer) => match renderer.bind_session(&session) {
            Ok(layer) => Some(layer),
            Err(e) => {
                log::error!("Could not bind the XR layer: {:#}", e);
                None
            }
        },
        None => {
            log::error!("Session started before the renderer was ready, nothing will be drawn");
            None
        }
    };

    let select = {
        let app = app.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().controller.on_select();
        })
    };
    let end = {
        let app = app.clone();
        let button = button.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let mut app = app.borrow_mut();
            app.controller.end_session();
            let viewport = app.controller.viewport();
            if let Some(renderer) = app.renderer.as_mut() {
                renderer.release_session();
                // back to the page size the layer had overridden
                renderer.set_size(viewport);
            }
            button.set_text_content(Some("START AR"));
        })
    };
    session
        .add_event_listener_with_callback("select", select.as_ref().unchecked_ref())
        .map_err(js_err)?;
    session
        .add_event_listener_with_callback("end", end.as_ref().unchecked_ref())
        .map_err(js_err)?;

    let frame: FrameCallback = Rc::new(RefCell::new(None));
    {
        let app = app.clone();
        let next = frame.clone();
        *frame.borrow_mut() = Some(Closure::new(move |_time: f64, xr_frame: XrFrameHandle| {
            let session = {
                let mut app = app.borrow_mut();
                let WebApp {
                    controller,
                    renderer,
                    ..
                } = &mut *app;
                if controller.on_frame(&xr_frame).is_none() {
                    return;
                }
                if let Some(renderer) = renderer {
                    controller.render(renderer);
                }
                controller.session().map(|s| s.xr().handle().clone())
            };
            if let (Some(session), Some(callback)) = (session, next.borrow().as_ref()) {
                session.request_animation_frame(callback.as_ref().unchecked_ref());
            }
        }));
    }

    {
        let mut app = app.borrow_mut();
        app.controller.start_session(WebXrSession {
            session: session.clone(),
            local_space,
            layer,
        });
        if let Some(callback) = frame.borrow().as_ref() {
            session.request_animation_frame(callback.as_ref().unchecked_ref());
        }
        // the previous session's callbacks are dropped here, outside of any of them
        app.callbacks = Some(SessionCallbacks {
            frame,
            _select: select,
            _end: end,
        });
    }
    button.set_text_content(Some("STOP AR"));
    Ok(())
}

/// Entry point: builds the page, the renderer and the controller, then waits for the user to
/// start a session.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    crate::init_logging();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let container = document.create_element("div")?;
    body.append_child(&container)?;

    let viewport = current_viewport(&window);
    let controller = SessionController::new(Config::default(), GltfLoader::default(), viewport);
    let app: Shared = Rc::new(RefCell::new(WebApp {
        controller,
        renderer: None,
        callbacks: None,
    }));

    {
        let app = app.clone();
        let document = document.clone();
        spawn_local(async move {
            let mut renderer = match WebRenderer::new(&document).await {
                Ok(renderer) => renderer,
                Err(e) => {
                    log::error!("Could not set up rendering: {:#}", e);
                    return;
                }
            };
            if let Err(e) = container.append_child(renderer.canvas()) {
                log::error!("Could not attach the canvas: {:?}", e);
            }
            let viewport = app.borrow().controller.viewport();
            renderer.set_size(viewport);
            app.borrow_mut().renderer = Some(renderer);
        });
    }

    let on_resize = {
        let app = app.clone();
        let window = window.clone();
        Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let viewport = current_viewport(&window);
            let mut app = app.borrow_mut();
            let WebApp {
                controller,
                renderer,
                ..
            } = &mut *app;
            if controller.on_resize(viewport) {
                if let Some(renderer) = renderer {
                    renderer.set_size(viewport);
                }
            }
        })
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    let button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
    style_button(&button);
    body.append_child(&button)?;

    let Some(xr) = navigator_xr(&window) else {
        show_unsupported(&button, "WEBXR NOT AVAILABLE");
        return Ok(());
    };
    let supported = xr.is_session_supported(SESSION_MODE);
    spawn_local(async move {
        match JsFuture::from(supported).await {
            Ok(supported) if supported.as_bool() == Some(true) => {
                show_start_button(&button, xr, app)
            }
            Ok(_) => show_unsupported(&button, "AR NOT SUPPORTED"),
            Err(e) => {
                log::warn!("immersive-ar support check failed: {:?}", e);
                show_unsupported(&button, "AR NOT SUPPORTED");
            }
        }
    });

    Ok(())
}
