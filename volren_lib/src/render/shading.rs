/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Classification, compositing and lighting shared by the fragment shaders.

use nalgebra::{Point3, Vector3};

use crate::{
    color::{self, RGB, RGBA},
    common::CutoffWindow,
    gpu::{Sampler, Samplers, Uniforms},
};

/// Rays stop once they are this opaque
pub const EARLY_TERMINATION_ALPHA: f32 = 0.99;

/// Opacity of a sample taken `coeff` times the reference step apart.
/// `a' = 1 - (1 - a)^coeff`
pub fn correct_opacity(alpha: f32, coeff: f32) -> f32 {
    1.0 - (1.0 - alpha.clamp(0.0, 1.0)).powf(coeff)
}

/// Maps sample values to color and opacity through the cutoff window and
/// the palette and opacity tables
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    cutoff: CutoffWindow,
    palette: Sampler<'a>,
    opacity: Sampler<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(cutoff: CutoffWindow, palette: Sampler<'a>, opacity: Sampler<'a>) -> Classifier<'a> {
        Classifier {
            cutoff,
            palette,
            opacity,
        }
    }

    /// Classifier configured by the `cutoffLow`, `cutoffHigh`, `palette` and `opacity` uniforms
    pub fn from_uniforms(uniforms: &Uniforms, samplers: &Samplers<'a>) -> Classifier<'a> {
        Classifier::new(
            CutoffWindow::new(uniforms.float("cutoffLow"), uniforms.float("cutoffHigh")),
            samplers.uniform(uniforms, "palette"),
            samplers.uniform(uniforms, "opacity"),
        )
    }

    /// Straight color and opacity, `None` outside of the cutoff window
    pub fn classify(&self, value: f32) -> Option<RGBA> {
        if !self.cutoff.contains(value) {
            return None;
        }
        let t = self.cutoff.normalize(value);
        let rgb = self.palette.sample_1d(t).xyz();
        let alpha = self.opacity.sample_1d(t).x;
        Some(color::new(rgb.x, rgb.y, rgb.z, alpha))
    }
}

/// Front to back compositing of straight colors
#[derive(Debug, Clone, Copy)]
pub struct Accumulator {
    color: RGB,
    alpha: f32,
}

impl Accumulator {
    pub fn new() -> Accumulator {
        Accumulator {
            color: RGB::zeros(),
            alpha: 0.0,
        }
    }

    pub fn add(&mut self, sample: RGBA) {
        let weight = (1.0 - self.alpha) * sample.w;
        self.color += weight * sample.xyz();
        self.alpha += weight;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_saturated(&self) -> bool {
        self.alpha >= EARLY_TERMINATION_ALPHA
    }

    /// Straight color of the accumulated samples, `None` if fully transparent
    pub fn result(&self) -> Option<RGBA> {
        if self.alpha <= 0.0 {
            return None;
        }
        let c = self.color / self.alpha;
        Some(color::new(c.x, c.y, c.z, self.alpha))
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator::new()
    }
}

/// Gradient of a volume texture by central differences, one texel apart
pub fn gradient(volume: &Sampler, coord: Vector3<f32>) -> Vector3<f32> {
    let size = volume.size();
    let mut grad = Vector3::zeros();
    for axis in 0..3 {
        let mut offset = Vector3::zeros();
        offset[axis] = 1.0 / size[axis] as f32;
        let forward = volume.sample(coord + offset).x;
        let backward = volume.sample(coord - offset).x;
        grad[axis] = (forward - backward) / (2.0 * offset[axis]);
    }
    grad
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phong {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Phong {
    pub const DEFAULT: Phong = Phong {
        ambient: 0.2,
        diffuse: 0.7,
        specular: 0.3,
        shininess: 16.0,
    };

    /// Lit color of a point with a white light.
    /// Normal is the negated gradient, a zero gradient leaves `color` unlit.
    pub fn shade(
        &self,
        color: RGB,
        gradient: Vector3<f32>,
        position: &Point3<f32>,
        eye: &Point3<f32>,
        light: &Point3<f32>,
    ) -> RGB {
        let normal = match (-gradient).try_normalize(1e-6) {
            Some(n) => n,
            None => return color,
        };
        let to_light = (light - position).normalize();
        let to_eye = (eye - position).normalize();

        let lambert = normal.dot(&to_light).max(0.0);
        let reflected = 2.0 * normal.dot(&to_light) * normal - to_light;
        let highlight = reflected.dot(&to_eye).max(0.0).powf(self.shininess);

        let lit = color * (self.ambient + self.diffuse * lambert) + RGB::repeat(self.specular * highlight);
        lit.map(|c| c.min(1.0))
    }
}
