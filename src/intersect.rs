use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ray::Ray;
use crate::scene::SceneObject;

/// One object hit by a picking ray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub object_name: String,
    /// Distance from the ray origin to `point`.
    #[serde(default)]
    pub distance: f32,
    #[serde(default)]
    pub point: Vec3,
}

impl Intersection {
    pub fn new(object_name: impl Into<String>, distance: f32, point: Vec3) -> Self {
        Self {
            object_name: object_name.into(),
            distance,
            point,
        }
    }

    /// Hit record carrying only a name, for providers that do not report
    /// geometry.
    pub fn named(object_name: impl Into<String>) -> Self {
        Self::new(object_name, 0.0, Vec3::ZERO)
    }
}

/// Ray casting capability supplied by the host's 3D engine.
///
/// Implementations must return hits ordered nearest first. With `recursive`
/// set, descendants of `objects` are tested as well as the objects
/// themselves.
pub trait IntersectionProvider {
    fn intersect_objects(
        &self,
        ray: &Ray,
        objects: &[SceneObject],
        recursive: bool,
    ) -> Vec<Intersection>;
}

impl<T> IntersectionProvider for Rc<T>
where
    T: IntersectionProvider + ?Sized,
{
    fn intersect_objects(
        &self,
        ray: &Ray,
        objects: &[SceneObject],
        recursive: bool,
    ) -> Vec<Intersection> {
        (**self).intersect_objects(ray, objects, recursive)
    }
}
