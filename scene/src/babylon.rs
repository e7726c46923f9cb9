//! Babylon.js implementation of [`SceneEngine`].
//!
//! Babylon is loaded as a global `BABYLON` script (plus the glTF loader and,
//! optionally, the inspector) by the page. This module only declares the small
//! slice of that API the viewer drives.
//!
//! Every closure handed to JavaScript is stored next to the object that calls
//! it: render and resize callbacks on [`BabylonEngine`], camera observers on
//! [`BabylonScene`]. Dropping the owner releases them.

#[cfg(test)]
#[path = "babylon_test.rs"]
mod babylon_test;

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlCanvasElement;

use crate::camera::{CameraPose, Vec3};
use crate::consts::{CAMERA_NAME, FILL_LIGHT_NAME};
use crate::engine::{LoadError, PoseListener, SceneEngine, SceneSettings};

mod js {
    use js_sys::Promise;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    #[wasm_bindgen(js_namespace = BABYLON)]
    extern "C" {
        #[derive(Clone)]
        pub type Engine;

        #[wasm_bindgen(constructor, catch, js_class = "Engine")]
        pub fn new(canvas: &HtmlCanvasElement, antialias: bool) -> Result<Engine, JsValue>;

        #[wasm_bindgen(method, js_name = runRenderLoop)]
        pub fn run_render_loop(this: &Engine, render: &Closure<dyn FnMut()>);

        #[wasm_bindgen(method)]
        pub fn resize(this: &Engine);

        #[derive(Clone)]
        pub type Scene;

        #[wasm_bindgen(constructor)]
        pub fn new(engine: &Engine) -> Scene;

        #[wasm_bindgen(method)]
        pub fn render(this: &Scene);

        #[wasm_bindgen(method)]
        pub fn dispose(this: &Scene);

        #[wasm_bindgen(method, setter, js_name = clearColor)]
        pub fn set_clear_color(this: &Scene, color: &Color4);

        #[wasm_bindgen(method, getter, js_name = activeCamera)]
        pub fn active_camera(this: &Scene) -> Option<Camera>;

        #[wasm_bindgen(method, setter, js_name = activeCamera)]
        pub fn set_active_camera(this: &Scene, camera: &Camera);

        #[wasm_bindgen(method, getter, js_name = debugLayer)]
        pub fn debug_layer(this: &Scene) -> DebugLayer;

        #[derive(Clone)]
        pub type Camera;

        #[wasm_bindgen(method, getter)]
        pub fn position(this: &Camera) -> Vector3;

        #[wasm_bindgen(method, getter, js_name = globalPosition)]
        pub fn global_position(this: &Camera) -> Vector3;

        #[wasm_bindgen(method, catch, js_name = getTarget)]
        pub fn get_target(this: &Camera) -> Result<Vector3, JsValue>;

        #[wasm_bindgen(method, js_name = getDirection)]
        pub fn get_direction(this: &Camera, local_axis: &Vector3) -> Vector3;

        #[wasm_bindgen(method, getter, js_name = onViewMatrixChangedObservable)]
        pub fn on_view_matrix_changed(this: &Camera) -> Observable;

        #[wasm_bindgen(extends = Camera)]
        #[derive(Clone)]
        pub type ArcRotateCamera;

        #[wasm_bindgen(constructor)]
        pub fn new(
            name: &str,
            alpha: f64,
            beta: f64,
            radius: f64,
            target: &Vector3,
            scene: &Scene,
        ) -> ArcRotateCamera;

        #[wasm_bindgen(method, js_name = attachControl)]
        pub fn attach_control(this: &ArcRotateCamera, element: &HtmlCanvasElement, no_prevent_default: bool);

        pub type Vector3;

        #[wasm_bindgen(constructor)]
        pub fn new(x: f64, y: f64, z: f64) -> Vector3;

        #[wasm_bindgen(method, getter)]
        pub fn x(this: &Vector3) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn y(this: &Vector3) -> f64;

        #[wasm_bindgen(method, getter)]
        pub fn z(this: &Vector3) -> f64;

        pub type Color4;

        #[wasm_bindgen(constructor)]
        pub fn new(r: f64, g: f64, b: f64, a: f64) -> Color4;

        pub type HemisphericLight;

        #[wasm_bindgen(constructor)]
        pub fn new(name: &str, direction: &Vector3, scene: &Scene) -> HemisphericLight;

        #[wasm_bindgen(method, setter)]
        pub fn set_intensity(this: &HemisphericLight, intensity: f64);

        pub type Observable;

        #[wasm_bindgen(method)]
        pub fn add(this: &Observable, callback: &Closure<dyn FnMut()>) -> JsValue;

        pub type DebugLayer;

        #[wasm_bindgen(method, catch)]
        pub fn show(this: &DebugLayer, options: &JsValue) -> Result<Promise, JsValue>;

        #[wasm_bindgen(method)]
        pub fn hide(this: &DebugLayer);

        #[wasm_bindgen(method, js_name = isVisible)]
        pub fn is_visible(this: &DebugLayer) -> bool;
    }

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = ["BABYLON", "SceneLoader"], js_name = LoadAsync, catch)]
        pub fn load_async(root_url: &str, file_name: &str, engine: &Engine) -> Result<Promise, JsValue>;
    }
}

/// The Babylon engine could not be created on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("babylon engine unavailable: {0}")]
pub struct EngineUnavailable(pub String);

/// A Babylon scene plus the camera observers registered on it.
pub struct BabylonScene {
    inner: js::Scene,
    observers: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl BabylonScene {
    fn new(inner: js::Scene) -> Self {
        Self { inner, observers: RefCell::new(Vec::new()) }
    }

    /// Whether the scene inspector is currently shown for this scene.
    #[must_use]
    pub fn inspector_visible(&self) -> bool {
        self.inner.debug_layer().is_visible()
    }

    /// Show or hide the scene inspector, embedded in the page.
    pub fn set_inspector_visible(&self, visible: bool) {
        let layer = self.inner.debug_layer();
        if !visible {
            layer.hide();
            return;
        }
        let options = Object::new();
        if let Err(err) = Reflect::set(&options, &JsValue::from_str("embedMode"), &JsValue::TRUE) {
            log::warn!("inspector options rejected: {}", describe(&err));
        }
        if let Err(err) = layer.show(&options) {
            log::warn!("inspector unavailable: {}", describe(&err));
        }
    }
}

/// [`SceneEngine`] backed by a single Babylon `Engine` on one canvas.
pub struct BabylonEngine {
    canvas: HtmlCanvasElement,
    engine: js::Engine,
    /// Scene drawn by the render loop.
    active: Rc<RefCell<Option<js::Scene>>>,
    callbacks: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl BabylonEngine {
    /// Create an antialiased engine on `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineUnavailable`] when Babylon is missing or WebGL cannot
    /// be initialized.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EngineUnavailable> {
        let engine = js::Engine::new(&canvas, true).map_err(|err| EngineUnavailable(describe(&err)))?;
        Ok(Self { canvas, engine, active: Rc::new(RefCell::new(None)), callbacks: RefCell::new(Vec::new()) })
    }
}

impl SceneEngine for BabylonEngine {
    type Scene = BabylonScene;

    fn create_scene(&self) -> BabylonScene {
        BabylonScene::new(js::Scene::new(&self.engine))
    }

    async fn import_scene(&self, url: &str) -> Result<BabylonScene, LoadError> {
        let (root, file) = split_scene_url(url);
        let promise = js::load_async(root, file, &self.engine).map_err(|err| LoadError::classify(url, &describe(&err)))?;
        let loaded = JsFuture::from(promise)
            .await
            .map_err(|err| LoadError::classify(url, &describe(&err)))?;
        Ok(BabylonScene::new(loaded.unchecked_into()))
    }

    fn stage(&self, scene: &BabylonScene, settings: &SceneSettings) {
        let c = settings.clear_color;
        scene.inner.set_clear_color(&js::Color4::new(c.r, c.g, c.b, c.a));

        let d = settings.fill_light_direction;
        let light = js::HemisphericLight::new(FILL_LIGHT_NAME, &js::Vector3::new(d.x, d.y, d.z), &scene.inner);
        light.set_intensity(settings.fill_light_intensity);
    }

    fn camera_pose(&self, scene: &BabylonScene) -> Option<CameraPose> {
        scene.inner.active_camera().and_then(|camera| read_pose(&camera))
    }

    fn install_camera(&self, scene: &BabylonScene, pose: CameraPose, on_view_change: PoseListener) {
        let target = js::Vector3::new(pose.target.x, pose.target.y, pose.target.z);
        let camera = js::ArcRotateCamera::new(CAMERA_NAME, pose.alpha, pose.beta, pose.radius, &target, &scene.inner);
        camera.attach_control(&self.canvas, true);
        scene.inner.set_active_camera(&camera);

        let watched = camera.clone();
        let observer = Closure::<dyn FnMut()>::new(move || {
            if let Some(pose) = read_pose(&watched) {
                on_view_change(pose);
            }
        });
        camera.on_view_matrix_changed().add(&observer);
        scene.observers.borrow_mut().push(observer);
    }

    fn activate(&self, scene: &BabylonScene) {
        *self.active.borrow_mut() = Some(scene.inner.clone());
    }

    fn dispose(&self, scene: BabylonScene) {
        scene.inner.dispose();
    }

    fn start_render_loop(&self) {
        let active = Rc::clone(&self.active);
        let frame = Closure::<dyn FnMut()>::new(move || {
            if let Some(scene) = active.borrow().as_ref() {
                scene.render();
            }
        });
        self.engine.run_render_loop(&frame);
        self.callbacks.borrow_mut().push(frame);
    }

    fn watch_resize(&self) {
        let Some(window) = web_sys::window() else {
            log::warn!("no window; canvas will not follow resizes");
            return;
        };
        let engine = self.engine.clone();
        let on_resize = Closure::<dyn FnMut()>::new(move || engine.resize());
        if let Err(err) = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref()) {
            log::warn!("resize listener rejected: {}", describe(&err));
            return;
        }
        self.callbacks.borrow_mut().push(on_resize);
    }
}

/// Split a scene URL into the root and file name Babylon's loader expects.
///
/// The root keeps its trailing slash; a query string stays on the file name.
#[must_use]
pub fn split_scene_url(url: &str) -> (&str, &str) {
    let path_end = url.find(['?', '#']).unwrap_or(url.len());
    match url[..path_end].rfind('/') {
        Some(slash) => url.split_at(slash + 1),
        None => ("", url),
    }
}

fn read_pose(camera: &js::Camera) -> Option<CameraPose> {
    let target = match camera.get_target() {
        Ok(target) => vec3(&target),
        Err(_) => None,
    };
    let orbit = (number_prop(camera, "alpha"), number_prop(camera, "beta"), number_prop(camera, "radius"));
    if let ((Some(alpha), Some(beta), Some(radius)), Some(target)) = (orbit, target) {
        return Some(CameraPose { alpha, beta, target, radius });
    }
    let forward = camera.get_direction(&js::Vector3::new(0.0, 0.0, 1.0));
    Some(free_camera_pose(
        vec3(&camera.global_position())?,
        vec3(&forward)?,
        vec3(&camera.position())?,
        target?,
    ))
}

/// World-space orbit pose of a free camera.
///
/// Cameras imported from glTF hang under the loader's `__root__` node, which
/// mirrors Z, so their local position and target are in the wrong space. Only
/// the distance between them carries over; the eye and facing come from the
/// world matrix.
#[must_use]
pub fn free_camera_pose(global_position: Vec3, world_forward: Vec3, local_position: Vec3, local_target: Vec3) -> CameraPose {
    let reach = local_target.sub(local_position).length();
    let reach = if reach > f64::EPSILON { reach } else { 1.0 };
    let facing = world_forward.length();
    let direction = if facing > f64::EPSILON { world_forward.scale(1.0 / facing) } else { Vec3::new(0.0, 0.0, 1.0) };
    CameraPose::looking_from(global_position, global_position.add(direction.scale(reach)))
}

fn vec3(v: &js::Vector3) -> Option<Vec3> {
    let (x, y, z) = (v.x(), v.y(), v.z());
    (x.is_finite() && y.is_finite() && z.is_finite()).then(|| Vec3::new(x, y, z))
}

fn number_prop(target: &JsValue, key: &str) -> Option<f64> {
    match Reflect::get(target, &JsValue::from_str(key)) {
        Ok(value) => value.as_f64().filter(|n| n.is_finite()),
        Err(_) => None,
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
