mod orbit_camera;

pub use orbit_camera::{
    OrbitCamera, DEFAULT_DISTANCE, FAR_PLANE, FOV_Y, MAX_DISTANCE, MIN_DISTANCE, NEAR_PLANE,
};
