//! Routes pointer events on a render surface to handlers attached to named
//! scene objects.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec3;
use log::{debug, error, trace};

use crate::camera::Camera;
use crate::config::RouterConfig;
use crate::input::{PointerEvent, PointerEventKind};
use crate::intersect::IntersectionProvider;
use crate::ray::RayQuery;
use crate::registry::{Callback, CallbackRegistry};
use crate::scene::SceneGraph;
use crate::surface::{Listener, RenderSurface};
use crate::target::Target;
use crate::viewport::ViewportDimensions;

/// Picks the nearest connected object under the pointer and runs its handler
/// on click.
///
/// The router registers one click and one move listener on the surface when
/// it is created. [`disable`](Self::disable) removes them again, and so does
/// dropping the router.
pub struct PickingRouter {
    state: Rc<RouterState>,
    on_click: Listener,
    on_move: Listener,
    enabled: Cell<bool>,
}

struct RouterState {
    scene: Rc<dyn SceneGraph>,
    surface: Rc<dyn RenderSurface>,
    camera: Rc<dyn Camera>,
    provider: Rc<dyn IntersectionProvider>,
    config: RouterConfig,
    dimensions: Cell<ViewportDimensions>,
    registry: RefCell<CallbackRegistry>,
}

impl PickingRouter {
    /// Creates a router with the default configuration and enables it.
    pub fn new(
        scene: Rc<dyn SceneGraph>,
        surface: Rc<dyn RenderSurface>,
        camera: Rc<dyn Camera>,
        provider: Rc<dyn IntersectionProvider>,
    ) -> Self {
        Self::with_config(scene, surface, camera, provider, RouterConfig::default())
    }

    /// Creates a router with `config` and enables it.
    pub fn with_config(
        scene: Rc<dyn SceneGraph>,
        surface: Rc<dyn RenderSurface>,
        camera: Rc<dyn Camera>,
        provider: Rc<dyn IntersectionProvider>,
        config: RouterConfig,
    ) -> Self {
        let state = Rc::new(RouterState {
            scene,
            surface,
            camera,
            provider,
            config,
            dimensions: Cell::new(ViewportDimensions::default()),
            registry: RefCell::new(CallbackRegistry::new()),
        });

        // Listeners only hold a weak reference so a surface that outlives the
        // router cannot keep the registry alive.
        let on_click: Listener = {
            let state = Rc::downgrade(&state);
            Rc::new(move |event: &PointerEvent| {
                if let Some(state) = state.upgrade() {
                    state.on_pointer_click(event);
                }
            })
        };
        let on_move: Listener = {
            let state = Rc::downgrade(&state);
            Rc::new(move |event: &PointerEvent| {
                if let Some(state) = state.upgrade() {
                    state.on_pointer_move(event);
                }
            })
        };

        let router = Self {
            state,
            on_click,
            on_move,
            enabled: Cell::new(false),
        };
        router.enable();
        router
    }

    /// Stores the viewport size used to normalize pointer positions. Should
    /// be called whenever the render surface is resized.
    pub fn set_dimensions(&self, width: f32, height: f32) {
        self.state.set_dimensions(width, height);
    }

    /// Returns the last size passed to `set_dimensions`.
    pub fn dimensions(&self) -> ViewportDimensions {
        self.state.dimensions.get()
    }

    /// Returns the configuration the router was built with.
    pub fn config(&self) -> &RouterConfig {
        &self.state.config
    }

    /// Attaches `callback` to the object or name in `target`.
    ///
    /// Returns `false` and leaves the registry unchanged when the target has
    /// no usable name.
    pub fn connect<'a, F>(&self, target: impl Into<Target<'a>>, callback: F) -> bool
    where
        F: Fn() + 'static,
    {
        self.state.connect(target.into(), Rc::new(callback))
    }

    /// Removes the handler for `target`. Disconnecting a name that has no
    /// handler still succeeds.
    pub fn disconnect<'a>(&self, target: impl Into<Target<'a>>) -> bool {
        self.state.disconnect(target.into())
    }

    /// Removes every handler.
    pub fn disconnect_all(&self) {
        self.state.disconnect_all();
    }

    /// Returns whether a handler is attached to `name`.
    pub fn is_connected(&self, name: &str) -> bool {
        self.state.registry.borrow().contains(name)
    }

    /// Returns the names with handlers, sorted.
    pub fn connected_names(&self) -> Vec<String> {
        self.state.registry.borrow().names()
    }

    /// Weak handle for use inside callbacks.
    pub fn handle(&self) -> RouterHandle {
        RouterHandle {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Maps a pointer event into normalized device coordinates.
    pub fn pointer_to_ndc(&self, event: &PointerEvent) -> Vec3 {
        self.state.pointer_to_ndc(event)
    }

    /// Builds the picking ray for a pointer event.
    pub fn ray_query(&self, event: &PointerEvent) -> RayQuery {
        self.state.ray_query(event)
    }

    /// Name of the nearest intersected object that has a handler, updating
    /// the surface cursor as a side effect.
    pub fn resolve_hit(&self, event: &PointerEvent) -> Option<String> {
        self.state.resolve_hit(event)
    }

    /// Runs the handler of the object under the pointer, if any.
    pub fn on_pointer_click(&self, event: &PointerEvent) {
        self.state.on_pointer_click(event);
    }

    /// Updates the cursor for the object under the pointer.
    pub fn on_pointer_move(&self, event: &PointerEvent) {
        self.state.on_pointer_move(event);
    }

    /// Registers the pointer listeners. Does nothing when already enabled.
    pub fn enable(&self) {
        if self.enabled.replace(true) {
            return;
        }
        let surface = &self.state.surface;
        surface.add_listener(PointerEventKind::Click, &self.on_click);
        surface.add_listener(PointerEventKind::Move, &self.on_move);
        debug!("picking listeners enabled");
    }

    /// Removes the pointer listeners. Does nothing when already disabled.
    pub fn disable(&self) {
        if !self.enabled.replace(false) {
            return;
        }
        let surface = &self.state.surface;
        surface.remove_listener(PointerEventKind::Click, &self.on_click);
        surface.remove_listener(PointerEventKind::Move, &self.on_move);
        debug!("picking listeners disabled");
    }

    /// Returns whether the pointer listeners are registered.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl Drop for PickingRouter {
    fn drop(&mut self) {
        self.disable();
    }
}

impl std::fmt::Debug for PickingRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickingRouter")
            .field("dimensions", &self.state.dimensions.get())
            .field("registry", &*self.state.registry.borrow())
            .field("config", &self.state.config)
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

impl RouterState {
    fn set_dimensions(&self, width: f32, height: f32) {
        self.dimensions.set(ViewportDimensions::new(width, height));
    }

    fn connect(&self, target: Target<'_>, callback: Callback) -> bool {
        let name = match target.key() {
            Ok(name) => name,
            Err(err) => {
                error!("connect rejected {target:?}: {err}");
                return false;
            }
        };
        if self.registry.borrow_mut().insert(name, callback).is_some() {
            debug!("replaced handler for {name}");
        } else {
            debug!("connected {name}");
        }
        true
    }

    fn disconnect(&self, target: Target<'_>) -> bool {
        let name = match target.key() {
            Ok(name) => name,
            Err(err) => {
                error!("disconnect rejected {target:?}: {err}");
                return false;
            }
        };
        if self.registry.borrow_mut().remove(name).is_some() {
            debug!("disconnected {name}");
        }
        true
    }

    fn disconnect_all(&self) {
        let mut registry = self.registry.borrow_mut();
        debug!("disconnecting {} handler(s)", registry.len());
        registry.clear();
    }

    fn pointer_to_ndc(&self, event: &PointerEvent) -> Vec3 {
        let rect = self.surface.bounding_rect();
        self.dimensions
            .get()
            .to_ndc(event, &rect, self.config.ndc_depth)
    }

    fn ray_query(&self, event: &PointerEvent) -> RayQuery {
        RayQuery::new(self.camera.as_ref(), self.pointer_to_ndc(event))
    }

    fn resolve_hit(&self, event: &PointerEvent) -> Option<String> {
        let query = self.ray_query(event);
        let hits = self.provider.intersect_objects(
            &query.ray,
            self.scene.children(),
            self.config.recursive,
        );

        let name = {
            let registry = self.registry.borrow();
            hits.into_iter()
                .map(|hit| hit.object_name)
                .find(|name| registry.contains(name))
        };

        let cursor = if name.is_some() {
            self.config.hover_cursor
        } else {
            self.config.idle_cursor
        };
        self.surface.set_cursor(cursor);
        trace!("pointer at ndc {:?} resolved to {name:?}", query.ndc);
        name
    }

    fn on_pointer_click(&self, event: &PointerEvent) {
        let Some(name) = self.resolve_hit(event) else {
            return;
        };
        // Clone the handler out so it can reconnect or disconnect freely.
        let callback = self.registry.borrow().get(&name);
        if let Some(callback) = callback {
            callback();
        }
    }

    fn on_pointer_move(&self, event: &PointerEvent) {
        self.resolve_hit(event);
    }
}

/// Cloneable, non-owning handle to a [`PickingRouter`]'s registry.
///
/// Every operation is a no-op (returning `false` where it returns anything)
/// once the router has been dropped.
#[derive(Clone, Debug)]
pub struct RouterHandle {
    state: Weak<RouterState>,
}

impl RouterHandle {
    /// Attaches a handler, as [`PickingRouter::connect`] does.
    pub fn connect<'a, F>(&self, target: impl Into<Target<'a>>, callback: F) -> bool
    where
        F: Fn() + 'static,
    {
        match self.state.upgrade() {
            Some(state) => state.connect(target.into(), Rc::new(callback)),
            None => false,
        }
    }

    /// Removes a handler, as [`PickingRouter::disconnect`] does.
    pub fn disconnect<'a>(&self, target: impl Into<Target<'a>>) -> bool {
        match self.state.upgrade() {
            Some(state) => state.disconnect(target.into()),
            None => false,
        }
    }

    /// Removes every handler.
    pub fn disconnect_all(&self) {
        if let Some(state) = self.state.upgrade() {
            state.disconnect_all();
        }
    }

    /// Returns whether a handler is attached to `name`.
    pub fn is_connected(&self, name: &str) -> bool {
        self.state
            .upgrade()
            .is_some_and(|state| state.registry.borrow().contains(name))
    }

    /// Stores the viewport size used to normalize pointer positions.
    pub fn set_dimensions(&self, width: f32, height: f32) {
        if let Some(state) = self.state.upgrade() {
            state.set_dimensions(width, height);
        }
    }

    /// Returns whether the router still exists.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }
}
