/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use std::collections::HashMap;

use nalgebra::{vector, Vector3};

use crate::{
    color::{self, RGB, RGBA},
    error::VolumeError,
    volumetric::VolumeGrid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// One float channel, sampled as `(r, 0, 0, 1)`
    R32F,
    /// Three float channels, sampled as `(r, g, b, 1)`
    RGB32F,
}

impl TextureFormat {
    pub fn components(self) -> usize {
        match self {
            TextureFormat::R32F => 1,
            TextureFormat::RGB32F => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    ClampToEdge,
    Repeat,
}

/// Float texture with 1 to 3 dimensions.
///
/// Coordinates are normalized, texel `i` has its centre at `(i + 0.5) / size`.
/// Texels are stored x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    dimensions: usize,
    size: [usize; 3],
    format: TextureFormat,
    filter: Filter,
    wrap: Wrap,
    data: Vec<f32>,
}

impl Texture {
    fn new(dimensions: usize, size: [usize; 3], format: TextureFormat, data: Vec<f32>) -> Result<Texture, VolumeError> {
        if size.iter().any(|&s| s == 0) {
            return Err(VolumeError::EmptyVolume {
                width: size[0],
                height: size[1],
                depth: size[2],
            });
        }
        let expected = size.iter().product::<usize>() * format.components();
        if data.len() != expected {
            return Err(VolumeError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Texture {
            dimensions,
            size,
            format,
            filter: Filter::Linear,
            wrap: Wrap::ClampToEdge,
            data,
        })
    }

    pub fn new_1d(width: usize, format: TextureFormat, data: Vec<f32>) -> Result<Texture, VolumeError> {
        Texture::new(1, [width, 1, 1], format, data)
    }

    pub fn new_2d(width: usize, height: usize, format: TextureFormat, data: Vec<f32>) -> Result<Texture, VolumeError> {
        Texture::new(2, [width, height, 1], format, data)
    }

    /// Volume texture, linear filtering, clamped
    pub fn from_grid(grid: &VolumeGrid) -> Texture {
        Texture {
            dimensions: 3,
            size: [grid.width(), grid.height(), grid.depth()],
            format: TextureFormat::R32F,
            filter: Filter::Linear,
            wrap: Wrap::ClampToEdge,
            data: grid.data().to_vec(),
        }
    }

    /// Color lookup table. Fails on an empty palette.
    pub fn from_colors(colors: &[RGB]) -> Result<Texture, VolumeError> {
        let data = colors.iter().flat_map(|c| [c.x, c.y, c.z]).collect();
        Texture::new_1d(colors.len(), TextureFormat::RGB32F, data)
    }

    /// Scalar lookup table. Fails on an empty table.
    pub fn from_values(values: &[f32]) -> Result<Texture, VolumeError> {
        Texture::new_1d(values.len(), TextureFormat::R32F, values.to_vec())
    }

    pub fn with_filter(mut self, filter: Filter) -> Texture {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: Wrap) -> Texture {
        self.wrap = wrap;
        self
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn size(&self) -> Vector3<usize> {
        vector![self.size[0], self.size[1], self.size[2]]
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    fn texel(&self, x: usize, y: usize, z: usize) -> RGBA {
        let index = (z * self.size[1] * self.size[0] + y * self.size[0] + x) * self.format.components();
        match self.format {
            TextureFormat::R32F => color::new(self.data[index], 0.0, 0.0, 1.0),
            TextureFormat::RGB32F => color::new(
                self.data[index],
                self.data[index + 1],
                self.data[index + 2],
                1.0,
            ),
        }
    }

    fn wrap_index(&self, i: isize, size: usize) -> usize {
        match self.wrap {
            Wrap::ClampToEdge => i.clamp(0, size as isize - 1) as usize,
            Wrap::Repeat => i.rem_euclid(size as isize) as usize,
        }
    }

    // (lower texel, upper texel, weight of upper)
    fn axis_lookup(&self, coord: f32, axis: usize) -> (usize, usize, f32) {
        let size = self.size[axis];
        if axis >= self.dimensions {
            return (0, 0, 0.0);
        }
        let coord = if coord.is_finite() { coord } else { 0.0 };
        match self.filter {
            Filter::Nearest => {
                let i = self.wrap_index((coord * size as f32).floor() as isize, size);
                (i, i, 0.0)
            }
            Filter::Linear => {
                let x = coord * size as f32 - 0.5;
                let low = x.floor();
                let t = x - low;
                let low = low as isize;
                (
                    self.wrap_index(low, size),
                    self.wrap_index(low + 1, size),
                    t,
                )
            }
        }
    }

    /// Filtered lookup, components past the texture dimensionality are ignored
    pub fn sample(&self, coord: Vector3<f32>) -> RGBA {
        let (x0, x1, tx) = self.axis_lookup(coord.x, 0);
        let (y0, y1, ty) = self.axis_lookup(coord.y, 1);
        let (z0, z1, tz) = self.axis_lookup(coord.z, 2);

        if self.filter == Filter::Nearest {
            return self.texel(x0, y0, z0);
        }

        let lerp = |a: RGBA, b: RGBA, t: f32| a * (1.0 - t) + b * t;

        let c00 = lerp(self.texel(x0, y0, z0), self.texel(x1, y0, z0), tx);
        let c10 = lerp(self.texel(x0, y1, z0), self.texel(x1, y1, z0), tx);
        let c0 = lerp(c00, c10, ty);
        if self.dimensions < 3 {
            return c0;
        }

        let c01 = lerp(self.texel(x0, y0, z1), self.texel(x1, y0, z1), tx);
        let c11 = lerp(self.texel(x0, y1, z1), self.texel(x1, y1, z1), tx);
        let c1 = lerp(c01, c11, ty);

        lerp(c0, c1, tz)
    }
}

/// Opaque reference to a texture in a [`TextureStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

/// Owner of all textures.
/// Handles of destroyed textures stay invalid, ids are never reused.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: HashMap<u32, Texture>,
    next_id: u32,
}

impl TextureStore {
    pub fn new() -> TextureStore {
        TextureStore::default()
    }

    pub fn create(&mut self, texture: Texture) -> TextureHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.textures.insert(id, texture);
        TextureHandle(id)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(&handle.0)
    }

    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle.0)
    }

    /// Returns `false` if the handle was already destroyed
    pub fn destroy(&mut self, handle: TextureHandle) -> bool {
        self.textures.remove(&handle.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
