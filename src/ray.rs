use glam::Vec3;

use crate::camera::Camera;

/// Half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero when the ray could not be built.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from the camera position through the unprojected NDC point.
    pub fn from_camera(camera: &dyn Camera, ndc: Vec3) -> Self {
        let origin = camera.position();
        Self::new(origin, camera.unproject(ndc) - origin)
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }
}

/// Everything derived from one pointer event before the intersection query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub ndc: Vec3,
    pub ray: Ray,
}

impl RayQuery {
    pub fn new(camera: &dyn Camera, ndc: Vec3) -> Self {
        Self {
            ndc,
            ray: Ray::from_camera(camera, ndc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;

    #[test]
    fn direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3::new(0.0, 3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn non_finite_direction_collapses_to_zero() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 0.0));
        assert!(ray.is_degenerate());
        assert!(Ray::new(Vec3::ONE, Vec3::ZERO).is_degenerate());
    }

    #[test]
    fn query_starts_at_camera() {
        let camera = PerspectiveCamera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 1.0);
        let query = RayQuery::new(&camera, Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(query.ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert!((query.ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert_eq!(query.ndc, Vec3::new(0.0, 0.0, 0.5));
    }
}
