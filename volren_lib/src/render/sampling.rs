//! Sampling density of the renderers.
//!
//! Both methods take roughly one sample per voxel along the viewing direction
//! at multiplier 1, `m` samples per voxel at multiplier `m`.

use super::{CUBE_EXTENT_RADIUS, CUBE_HALF_SIZE};
use crate::gpu::{Device, TextureHandle};

// keeps exact multiples from gaining a step through rounding noise
const STEP_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    /// Distance between samples in object space
    pub step: f32,
    pub num_steps: u32,
}

/// Number of `step` long steps needed to cover `length`, at least 1
pub fn steps_to_cover(length: f32, step: f32) -> u32 {
    ((length / step) - STEP_TOLERANCE).ceil().max(1.0) as u32
}

/// Distance between slabs, slabs span the bounding sphere of the cube
pub fn slice_sampling(max_dim: usize, multiplier: u32) -> Sampling {
    let step = CUBE_HALF_SIZE * std::f32::consts::SQRT_2 / samples_per_axis(max_dim, multiplier);
    Sampling {
        step,
        num_steps: steps_to_cover(2.0 * CUBE_EXTENT_RADIUS, step),
    }
}

/// Ray step, `num_steps` covers the cube diagonal
pub fn ray_sampling(max_dim: usize, multiplier: u32) -> Sampling {
    let diagonal = 2.0 * CUBE_HALF_SIZE * 3f32.sqrt();
    let step = 3f32.sqrt() / samples_per_axis(max_dim, multiplier);
    Sampling {
        step,
        num_steps: steps_to_cover(diagonal, step),
    }
}

fn samples_per_axis(max_dim: usize, multiplier: u32) -> f32 {
    (max_dim.max(1) as f32) * (multiplier.max(1) as f32)
}

/// Largest dimension of a texture in the device store
pub fn texture_max_dim(device: &Device, handle: TextureHandle) -> Option<usize> {
    device.textures().get(handle).map(|t| {
        let size = t.size();
        size.x.max(size.y).max(size.z)
    })
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn steps_increase_with_multiplier() {
        for max_dim in [1, 16, 64, 255] {
            let mut previous = (0, 0);
            for m in 1..=8 {
                let slices = slice_sampling(max_dim, m).num_steps;
                let rays = ray_sampling(max_dim, m).num_steps;

                assert!(slices > previous.0, "slices {} m {}", max_dim, m);
                assert!(rays > previous.1, "rays {} m {}", max_dim, m);
                previous = (slices, rays);
            }
        }
    }

    #[test]
    fn ray_steps_cover_diagonal() {
        let sampling = ray_sampling(64, 1);

        assert!((sampling.step - 3f32.sqrt() / 64.0).abs() < 1e-7);
        assert_eq!(sampling.num_steps, 128);
        assert!(sampling.step * sampling.num_steps as f32 >= 2.0 * 3f32.sqrt() - 1e-4);
    }

    #[test]
    fn slice_steps() {
        let sampling = slice_sampling(64, 2);

        // 2 * sqrt(3) / (sqrt(2) / 128) = 313.5
        assert_eq!(sampling.num_steps, 314);
    }

    #[test]
    fn at_least_one_step() {
        assert_eq!(steps_to_cover(0.0, 1.0), 1);
        assert_eq!(steps_to_cover(1.0, 1.0), 1);
        assert_eq!(steps_to_cover(1.5, 1.0), 2);
    }
}
