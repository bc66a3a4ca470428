/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use nalgebra::{vector, Matrix4, UnitQuaternion, Vector3};

use crate::render::CUBE_EXTENT_RADIUS;

/// Vertical field of view in degrees
pub const FOV_Y: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

pub const DEFAULT_DISTANCE: f32 = 4.0;
/// Bounding sphere of the volume stays in front of the near plane
pub const MIN_DISTANCE: f32 = CUBE_EXTENT_RADIUS + NEAR_PLANE + 0.05;
pub const MAX_DISTANCE: f32 = 20.0;

const DRAG_DEGREES_PER_PIXEL: f32 = 0.5;
const AUTO_ROTATE_DEGREES: f32 = 1.0;
/// Relative distance change per wheel notch
const DOLLY_FACTOR: f32 = 0.9;

/// Camera orbiting the volume.
///
/// The eye is fixed at the view space origin looking down `-z`,
/// the volume is rotated by the model matrix and pushed away by the view matrix.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    rotation: UnitQuaternion<f32>,
    distance: f32,
    aspect: f32,
    drag_origin: Option<(f32, f32)>,
}

impl OrbitCamera {
    pub fn new(width: usize, height: usize) -> OrbitCamera {
        let mut camera = OrbitCamera {
            rotation: UnitQuaternion::identity(),
            distance: DEFAULT_DISTANCE,
            aspect: 1.0,
            drag_origin: None,
        };
        camera.resize(width, height);
        camera
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.rotation.to_homogeneous()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&vector![0.0, 0.0, -self.distance])
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, FOV_Y.to_radians(), NEAR_PLANE, FAR_PLANE)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn rotation(&self) -> &UnitQuaternion<f32> {
        &self.rotation
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        // minimised windows report zero height
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag_origin = Some((x, y));
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Rotate by mouse movement since the last call.
    /// Horizontal movement turns around the view Y axis, vertical around view X.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        let (last_x, last_y) = match self.drag_origin {
            Some(origin) => origin,
            None => return,
        };
        let dx = x - last_x;
        let dy = y - last_y;

        self.rotate_view(Vector3::y(), dx * DRAG_DEGREES_PER_PIXEL);
        self.rotate_view(Vector3::x(), dy * DRAG_DEGREES_PER_PIXEL);

        self.drag_origin = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Move the volume closer (positive delta) or away
    pub fn dolly(&mut self, wheel_delta: f32) {
        let distance = self.distance * DOLLY_FACTOR.powf(wheel_delta);
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// One step of automatic rotation
    pub fn tick(&mut self) {
        self.rotate_view(Vector3::y(), AUTO_ROTATE_DEGREES);
    }

    pub fn reset(&mut self) {
        self.rotation = UnitQuaternion::identity();
        self.distance = DEFAULT_DISTANCE;
    }

    // rotation around a view space axis, view has no rotation component
    fn rotate_view(&mut self, axis: Vector3<f32>, degrees: f32) {
        if degrees == 0.0 {
            return;
        }
        let step = UnitQuaternion::from_scaled_axis(axis * degrees.to_radians());
        let mut rotation = step * self.rotation;
        rotation.renormalize_fast();
        self.rotation = rotation;
    }
}
