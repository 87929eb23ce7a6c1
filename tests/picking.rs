use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec3;
use scene_connect::{
    CursorStyle, HeadlessSurface, Intersection, IntersectionProvider, PerspectiveCamera,
    PickingRouter, PointerEvent, PointerEventKind, Ray, RouterConfig, Scene, SceneObject,
    SurfaceRect,
};

const SCENE: &str = r#"<scene>
  <object>
    <name>Camera</name>
    <type>camera</type>
    <position>0 0 10</position>
    <fov>90</fov>
  </object>
  <object>
    <name>Near</name>
    <position>0 0 2</position>
  </object>
  <object>
    <name>Far</name>
    <position>0 0 -2</position>
  </object>
  <object>
    <name>Shelf</name>
    <type>group</type>
    <position>3 0 0</position>
    <object>
      <name>Book</name>
      <position>3 0 0</position>
    </object>
  </object>
</scene>
"#;

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const CENTRE: PointerEvent = PointerEvent::new(400.0, 300.0);
// Projects onto the book: ndc x = 0.225, which is 3 units right at depth 10.
const ON_BOOK: PointerEvent = PointerEvent::new(490.0, 300.0);
const EMPTY_SKY: PointerEvent = PointerEvent::new(20.0, 20.0);

/// Treats every mesh as a sphere around its position.
struct SphereProvider {
    radius: f32,
}

impl SphereProvider {
    fn hit_distance(&self, ray: &Ray, centre: Vec3) -> Option<f32> {
        let oc = ray.origin - centre;
        let b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b - disc.sqrt();
        (t >= 0.0).then_some(t)
    }
}

impl IntersectionProvider for SphereProvider {
    fn intersect_objects(
        &self,
        ray: &Ray,
        objects: &[SceneObject],
        recursive: bool,
    ) -> Vec<Intersection> {
        let mut candidates: Vec<&SceneObject> = Vec::new();
        for object in objects {
            candidates.push(object);
            if recursive {
                candidates.extend(object.descendants());
            }
        }
        let mut hits: Vec<Intersection> = candidates
            .into_iter()
            .filter(|object| object.object_type == "mesh")
            .filter_map(|object| {
                self.hit_distance(ray, object.position)
                    .map(|t| Intersection::new(object.name.clone(), t, ray.at(t)))
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

struct World {
    scene: Rc<Scene>,
    surface: Rc<HeadlessSurface>,
    router: PickingRouter,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn world_with(config: RouterConfig) -> World {
    init_logging();
    let scene = Rc::new(Scene::from_xml(SCENE).expect("scene parses"));
    let rect = SurfaceRect::new(0.0, 0.0, WIDTH, HEIGHT);
    let surface = Rc::new(HeadlessSurface::new(rect));
    let camera = Rc::new(PerspectiveCamera::from_scene(&scene, WIDTH / HEIGHT));
    let router = PickingRouter::with_config(
        scene.clone(),
        surface.clone(),
        camera,
        Rc::new(SphereProvider { radius: 0.5 }),
        config,
    );
    router.set_dimensions(WIDTH, HEIGHT);
    World {
        scene,
        surface,
        router,
    }
}

fn world() -> World {
    world_with(RouterConfig::default())
}

fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> impl Fn() + 'static {
    let log = Rc::clone(log);
    move || log.borrow_mut().push(name)
}

#[test]
fn click_routes_to_nearest_connected_mesh() {
    let w = world();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    assert!(w.router.connect("Far", recorder(&clicks, "Far")));
    let near = w.scene.find("Near").unwrap();
    assert!(w.router.connect(near, recorder(&clicks, "Near")));

    w.surface.dispatch(PointerEventKind::Click, &CENTRE);
    assert_eq!(*clicks.borrow(), ["Near"]);
}

#[test]
fn unconnected_nearer_mesh_does_not_block_farther_one() {
    let w = world();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    w.router.connect("Far", recorder(&clicks, "Far"));

    assert_eq!(w.router.resolve_hit(&CENTRE).as_deref(), Some("Far"));
    w.surface.dispatch(PointerEventKind::Click, &CENTRE);
    assert_eq!(*clicks.borrow(), ["Far"]);
}

#[test]
fn nested_mesh_is_found_through_its_parent() {
    let w = world();
    w.router.connect("Book", || {});
    assert_eq!(w.router.resolve_hit(&ON_BOOK).as_deref(), Some("Book"));
}

#[test]
fn nested_mesh_is_hidden_without_recursion() {
    let w = world_with(RouterConfig {
        recursive: false,
        ..RouterConfig::default()
    });
    w.router.connect("Book", || {});
    assert_eq!(w.router.resolve_hit(&ON_BOOK), None);
    assert_eq!(w.surface.cursor(), Some(CursorStyle::Inherit));
}

#[test]
fn hover_cursor_follows_the_pointer() {
    let w = world();
    let clicked = Rc::new(Cell::new(false));
    let flag = Rc::clone(&clicked);
    w.router.connect("Near", move || flag.set(true));

    w.surface.dispatch(PointerEventKind::Move, &CENTRE);
    assert_eq!(w.surface.cursor(), Some(CursorStyle::Pointer));

    w.surface.dispatch(PointerEventKind::Move, &EMPTY_SKY);
    assert_eq!(w.surface.cursor(), Some(CursorStyle::Inherit));
    assert!(!clicked.get());
}

#[test]
fn handler_may_clear_registry_mid_click() {
    let w = world();
    let handle = w.router.handle();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    w.router.connect("Near", move || {
        counter.set(counter.get() + 1);
        handle.disconnect_all();
    });
    w.router.connect("Far", || {});

    w.surface.dispatch(PointerEventKind::Click, &CENTRE);
    w.surface.dispatch(PointerEventKind::Click, &CENTRE);
    assert_eq!(calls.get(), 1);
    assert!(w.router.connected_names().is_empty());
}

#[test]
fn moved_surface_is_localized_before_picking() {
    let w = world();
    w.router.connect("Near", || {});
    w.surface.set_rect(SurfaceRect::new(100.0, 50.0, WIDTH, HEIGHT));

    assert_eq!(w.router.resolve_hit(&CENTRE), None);
    let shifted = PointerEvent::new(CENTRE.client_x + 100.0, CENTRE.client_y + 50.0);
    assert_eq!(w.router.resolve_hit(&shifted).as_deref(), Some("Near"));
}

#[test]
fn disabled_router_ignores_surface_events() {
    let w = world();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    w.router.connect("Near", move || counter.set(counter.get() + 1));

    w.router.disable();
    w.router.disable();
    assert_eq!(w.surface.dispatch(PointerEventKind::Click, &CENTRE), 0);
    assert_eq!(calls.get(), 0);

    w.router.enable();
    w.surface.dispatch(PointerEventKind::Click, &CENTRE);
    assert_eq!(calls.get(), 1);
}

#[test]
fn dropping_router_detaches_from_surface() {
    let w = world();
    let surface = Rc::clone(&w.surface);
    drop(w);
    for kind in PointerEventKind::ALL {
        assert_eq!(surface.listener_count(kind), 0);
    }
    assert_eq!(surface.dispatch(PointerEventKind::Click, &CENTRE), 0);
}
