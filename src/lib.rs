//! Click and hover routing for named objects in a 3D scene.
//!
//! A [`PickingRouter`] listens for pointer events on a [`RenderSurface`],
//! turns the pointer position into a world-space ray through a [`Camera`],
//! asks an [`IntersectionProvider`] what the ray hits, and runs the handler
//! connected to the nearest hit object that has one.  Ray casting, scene
//! management and rendering stay with the host engine; the crate only
//! defines the seams it needs from them.

pub mod camera;
pub mod config;
pub mod input;
pub mod intersect;
pub mod ray;
pub mod registry;
pub mod router;
pub mod scene;
pub mod surface;
pub mod target;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use camera::{Camera, MatrixCamera, PerspectiveCamera};
pub use config::RouterConfig;
pub use input::{PointerEvent, PointerEventKind};
pub use intersect::{Intersection, IntersectionProvider};
pub use ray::{Ray, RayQuery};
pub use registry::{Callback, CallbackRegistry};
pub use router::{PickingRouter, RouterHandle};
pub use scene::{Named, Scene, SceneGraph, SceneObject};
pub use surface::{CursorStyle, HeadlessSurface, Listener, RenderSurface};
pub use target::{Target, TargetError};
pub use viewport::{SurfaceRect, ViewportDimensions};
