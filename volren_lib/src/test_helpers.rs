//! Module with helper functions
//! Saves repetition in unit and integration tests

use crate::{
    color,
    gpu::{Device, Framebuffer, Texture, TextureHandle},
    premade::{
        generators::{generate, SphereGenerator},
        opacity::default_opacity,
        palettes::rainbow,
    },
    volumetric::VolumeGrid,
};

/// Cube of `side^3` voxels, 1 in the centre falling to 0 at the faces
pub fn sphere_grid(side: usize) -> VolumeGrid {
    generate(side, &SphereGenerator).unwrap()
}

/// Rainbow palette and default opacity uploaded to the device
pub fn upload_transfer_function(device: &mut Device) -> (TextureHandle, TextureHandle) {
    let colors = device.create_texture(Texture::from_colors(&rainbow()).unwrap());
    let opacities = device.create_texture(Texture::from_values(&default_opacity()).unwrap());
    (colors, opacities)
}

/// Pixels with non-zero alpha
pub fn covered_pixels(framebuffer: &Framebuffer) -> usize {
    framebuffer.pixels().iter().filter(|p| p.w > 0.0).count()
}

/// Luminance weighted centre of the image in pixel coordinates, `(column, row)`
pub fn brightness_centroid(framebuffer: &Framebuffer) -> Option<(f32, f32)> {
    let width = framebuffer.width();
    let mut total = 0.0;
    let mut sum = (0.0, 0.0);

    for (i, pixel) in framebuffer.pixels().iter().enumerate() {
        let weight = color::luminance(pixel);
        let (col, row) = ((i % width) as f32 + 0.5, (i / width) as f32 + 0.5);
        sum.0 += weight * col;
        sum.1 += weight * row;
        total += weight;
    }

    if total <= 0.0 {
        None
    } else {
        Some((sum.0 / total, sum.1 / total))
    }
}
