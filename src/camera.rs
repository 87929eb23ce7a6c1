use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::scene::Scene;

/// Camera as seen by the picking code: a world position plus the inverse of
/// its projection.
pub trait Camera {
    fn position(&self) -> Vec3;

    /// Maps a point in normalized device coordinates back into world space.
    fn unproject(&self, ndc: Vec3) -> Vec3;
}

/// Camera described by a precomputed view-projection matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixCamera {
    pub view_proj: Mat4,
    pub position: Vec3,
}

impl MatrixCamera {
    pub fn new(view_proj: Mat4, position: Vec3) -> Self {
        Self {
            view_proj,
            position,
        }
    }
}

impl Camera for MatrixCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_proj.inverse().project_point3(ndc)
    }
}

/// Right-handed perspective camera using the GL depth range (-1..1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn look_at(position: Vec3, target: Vec3, fov: f32, aspect: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov,
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Builds a camera from the first `camera` object in the scene, falling
    /// back to a default viewpoint above the origin.
    pub fn from_scene(scene: &Scene, aspect: f32) -> Self {
        let default_position = Vec3::new(0.0, 2.0, 6.0);
        let (position, rotation, fov) = scene
            .descendants()
            .find(|o| o.object_type == "camera")
            .map(|camera| (camera.position, camera.rotation, camera.fov))
            .unwrap_or((default_position, Vec3::ZERO, 60.0));

        let rotation_matrix = Mat4::from_rotation_z(rotation.z.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_x(rotation.x.to_radians());
        let forward = rotation_matrix.transform_vector3(Vec3::NEG_Z);
        let up = rotation_matrix.transform_vector3(Vec3::Y);
        let target = if forward.length_squared() > f32::EPSILON {
            position + forward.normalize()
        } else {
            Vec3::ZERO
        };

        Self {
            up,
            ..Self::look_at(position, target, fov, aspect)
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = if height == 0.0 { 1.0 } else { width / height };
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn to_matrix_camera(&self) -> MatrixCamera {
        MatrixCamera::new(self.view_proj(), self.position)
    }
}

impl Camera for PerspectiveCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_proj().inverse().project_point3(ndc)
    }
}

impl<T> Camera for RefCell<T>
where
    T: Camera,
{
    fn position(&self) -> Vec3 {
        self.borrow().position()
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.borrow().unproject(ndc)
    }
}

impl<T> Camera for Rc<T>
where
    T: Camera + ?Sized,
{
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn unproject(&self, ndc: Vec3) -> Vec3 {
        (**self).unproject(ndc)
    }
}
