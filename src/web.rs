#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use glam::{Mat4, Vec3};
use gloo_events::EventListener;
use js_sys::{Array, Function, Reflect};
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement, MouseEvent};

use crate::{
    CursorStyle, Intersection, IntersectionProvider, Listener, MatrixCamera, Named,
    PickingRouter, PointerEvent, PointerEventKind, Ray, RenderSurface, Scene, SceneObject,
    SurfaceRect, Target, TargetError,
};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Render surface backed by an HTML canvas.
///
/// Each registered listener owns a DOM event listener; dropping the
/// registration detaches it from the canvas.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    listeners: RefCell<Vec<Registration>>,
}

struct Registration {
    kind: PointerEventKind,
    listener: Listener,
    _dom: EventListener,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn from_element_id(id: &str) -> Result<Self> {
        let document = window()
            .and_then(|win| win.document())
            .ok_or_else(|| anyhow!("document not available"))?;
        let element = document
            .get_element_by_id(id)
            .ok_or_else(|| anyhow!("canvas element {id:?} not found"))?;
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| anyhow!("element {id:?} is not a canvas"))?;
        Ok(Self::new(canvas))
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl RenderSurface for CanvasSurface {
    fn bounding_rect(&self) -> SurfaceRect {
        let rect = self.canvas.get_bounding_client_rect();
        SurfaceRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn set_cursor(&self, cursor: CursorStyle) {
        if let Err(err) = self.canvas.style().set_property("cursor", cursor.as_str()) {
            warn!("failed to set canvas cursor: {err:?}");
        }
    }

    fn add_listener(&self, kind: PointerEventKind, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if listeners
            .iter()
            .any(|r| r.kind == kind && Rc::ptr_eq(&r.listener, listener))
        {
            return;
        }

        let callback = Rc::clone(listener);
        let dom = EventListener::new(&self.canvas, kind.event_name(), move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                callback(&PointerEvent::new(
                    event.client_x() as f32,
                    event.client_y() as f32,
                ));
            }
        });
        listeners.push(Registration {
            kind,
            listener: Rc::clone(listener),
            _dom: dom,
        });
    }

    fn remove_listener(&self, kind: PointerEventKind, listener: &Listener) {
        self.listeners
            .borrow_mut()
            .retain(|r| !(r.kind == kind && Rc::ptr_eq(&r.listener, listener)));
    }
}

/// Delegates ray casting to a JavaScript function.
///
/// The function is called as `(origin, direction, recursive)` with `[x, y, z]`
/// arrays and must return an array of hits, nearest first. A hit may be a
/// name string, an object with a `name` property, or a three.js style
/// `{ object: { name }, distance }` record.
pub struct JsIntersectionProvider {
    function: Function,
}

impl JsIntersectionProvider {
    pub fn new(function: Function) -> Self {
        Self { function }
    }
}

impl IntersectionProvider for JsIntersectionProvider {
    fn intersect_objects(
        &self,
        ray: &Ray,
        _objects: &[SceneObject],
        recursive: bool,
    ) -> Vec<Intersection> {
        let result = self.function.call3(
            &JsValue::NULL,
            &vec3_to_array(ray.origin),
            &vec3_to_array(ray.direction),
            &JsValue::from_bool(recursive),
        );
        match result {
            Ok(value) => parse_hits(&value, ray),
            Err(err) => {
                warn!("intersection callback threw: {err:?}");
                Vec::new()
            }
        }
    }
}

fn vec3_to_array(v: Vec3) -> JsValue {
    Array::of3(&v.x.into(), &v.y.into(), &v.z.into()).into()
}

fn parse_hits(value: &JsValue, ray: &Ray) -> Vec<Intersection> {
    let Some(array) = value.dyn_ref::<Array>() else {
        warn!("intersection callback returned a non-array value");
        return Vec::new();
    };
    array.iter().filter_map(|item| parse_hit(&item, ray)).collect()
}

fn parse_hit(item: &JsValue, ray: &Ray) -> Option<Intersection> {
    if let Some(name) = item.as_string() {
        return Some(Intersection::named(name));
    }
    let object = property(item, "object")
        .filter(JsValue::is_object)
        .unwrap_or_else(|| item.clone());
    let name = property(&object, "name")?.as_string()?;
    let distance = property(item, "distance")
        .and_then(|d| d.as_f64())
        .map(|d| d as f32);
    Some(match distance {
        Some(distance) => Intersection::new(name, distance, ray.at(distance)),
        None => Intersection::named(name),
    })
}

fn property(target: &JsValue, key: &str) -> Option<JsValue> {
    if !target.is_object() {
        return None;
    }
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined())
}

/// Name read from a JS object passed as a target.
struct JsNamed(Option<String>);

impl Named for JsNamed {
    fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Registry key for a target passed from JS: a non-empty string, or an
/// object whose `name` property is a non-empty string.
fn target_key(value: &JsValue) -> Result<String, TargetError> {
    if let Some(name) = value.as_string() {
        return Target::Name(&name).key().map(str::to_owned);
    }
    if !value.is_object() {
        return Err(TargetError::Unsupported);
    }
    let object = JsNamed(property(value, "name").and_then(|name| name.as_string()));
    Target::Object(&object).key().map(str::to_owned)
}

fn handler_function(callback: JsValue) -> Option<Function> {
    callback.dyn_into::<Function>().ok()
}

/// JavaScript facade over [`PickingRouter`] for a canvas element.
#[wasm_bindgen]
pub struct WebPickingRouter {
    router: PickingRouter,
    camera: Rc<RefCell<MatrixCamera>>,
}

#[wasm_bindgen]
impl WebPickingRouter {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, intersect: Function) -> WebPickingRouter {
        Self::with_surface(CanvasSurface::new(canvas), intersect)
    }

    #[wasm_bindgen(js_name = forCanvasId)]
    pub fn for_canvas_id(id: &str, intersect: Function) -> Result<WebPickingRouter, JsValue> {
        let surface = CanvasSurface::from_element_id(id)
            .map_err(|err| JsValue::from_str(&format!("failed to attach picking: {err}")))?;
        Ok(Self::with_surface(surface, intersect))
    }

    fn with_surface(surface: CanvasSurface, intersect: Function) -> WebPickingRouter {
        let surface = Rc::new(surface);
        let rect = surface.bounding_rect();
        let camera = Rc::new(RefCell::new(MatrixCamera::new(Mat4::IDENTITY, Vec3::ZERO)));
        let router = PickingRouter::new(
            Rc::new(Scene::default()),
            surface,
            camera.clone(),
            Rc::new(JsIntersectionProvider::new(intersect)),
        );
        router.set_dimensions(rect.width, rect.height);
        debug!("picking attached to {}x{} canvas", rect.width, rect.height);
        Self { router, camera }
    }

    /// Updates the camera from its world position and a column-major
    /// view-projection matrix.
    #[wasm_bindgen(js_name = setCamera)]
    pub fn set_camera(&self, position: &[f32], view_projection: &[f32]) -> Result<(), JsValue> {
        if position.len() != 3 || view_projection.len() != 16 {
            return Err(JsValue::from_str(
                "setCamera expects a 3 component position and a 16 component matrix",
            ));
        }
        *self.camera.borrow_mut() = MatrixCamera::new(
            Mat4::from_cols_slice(view_projection),
            Vec3::from_slice(position),
        );
        Ok(())
    }

    #[wasm_bindgen(js_name = setDimensions)]
    pub fn set_dimensions(&self, width: f32, height: f32) {
        self.router.set_dimensions(width, height);
    }

    /// Attaches `callback` to a name string or to an object with a `name`.
    ///
    /// Returns `false` when the target is not a usable name or object, or
    /// when `callback` is not a function.
    pub fn connect(&self, target: JsValue, callback: JsValue) -> bool {
        let name = match target_key(&target) {
            Ok(name) => name,
            Err(err) => {
                error!("connect rejected {target:?}: {err}");
                return false;
            }
        };
        let Some(callback) = handler_function(callback) else {
            error!(
                "connect rejected handler for {name}: expected callback to be a function"
            );
            return false;
        };
        let label = name.clone();
        self.router.connect(&name, move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                error!("handler for {label} threw: {err:?}");
            }
        })
    }

    pub fn disconnect(&self, target: JsValue) -> bool {
        match target_key(&target) {
            Ok(name) => self.router.disconnect(&name),
            Err(err) => {
                error!("disconnect rejected {target:?}: {err}");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = disconnectAll)]
    pub fn disconnect_all(&self) {
        self.router.disconnect_all();
    }

    pub fn enable(&self) {
        self.router.enable();
    }

    pub fn disable(&self) {
        self.router.disable();
    }

    #[wasm_bindgen(js_name = resolveHit)]
    pub fn resolve_hit(&self, client_x: f32, client_y: f32) -> Option<String> {
        self.router.resolve_hit(&PointerEvent::new(client_x, client_y))
    }
}
