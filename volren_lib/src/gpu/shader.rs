//! Shader stages of the software pipeline.
//!
//! A shader is a Rust type describing its interface (inputs, outputs,
//! uniforms) and producing a kernel for each draw call. The kernel holds the
//! uniform values read once per draw and is executed per vertex or fragment.

use std::collections::HashMap;

use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

use super::{mesh::Vertex, texture::Texture, MAX_TEXTURE_UNITS, MAX_VARYINGS};
use crate::color::{self, RGBA};

/// Type of an interface slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Sampler1D,
    Sampler2D,
    Sampler3D,
}

impl ValueKind {
    /// Kinds that can be interpolated across a triangle
    pub fn is_interpolable(self) -> bool {
        matches!(
            self,
            ValueKind::Float | ValueKind::Vec2 | ValueKind::Vec3 | ValueKind::Vec4
        )
    }
}

/// Named variable of a shader interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl Slot {
    pub const fn new(name: &'static str, kind: ValueKind) -> Slot {
        Slot { name, kind }
    }
}

/// Declared variables of one stage.
/// Location of an input or output is its position in the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageInterface {
    pub inputs: Vec<Slot>,
    pub outputs: Vec<Slot>,
    pub uniforms: Vec<Slot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat4(Matrix4<f32>),
}

impl UniformValue {
    /// Samplers are set with the texture unit number
    pub fn fits(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (UniformValue::Float(_), ValueKind::Float)
                | (UniformValue::Int(_), ValueKind::Int)
                | (UniformValue::Int(_), ValueKind::Sampler1D)
                | (UniformValue::Int(_), ValueKind::Sampler2D)
                | (UniformValue::Int(_), ValueKind::Sampler3D)
                | (UniformValue::Bool(_), ValueKind::Bool)
                | (UniformValue::Vec3(_), ValueKind::Vec3)
                | (UniformValue::Vec4(_), ValueKind::Vec4)
                | (UniformValue::Mat4(_), ValueKind::Mat4)
        )
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(v: Vector3<f32>) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Point3<f32>> for UniformValue {
    fn from(v: Point3<f32>) -> Self {
        UniformValue::Vec3(v.coords)
    }
}

impl From<Vector4<f32>> for UniformValue {
    fn from(v: Vector4<f32>) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(v: Matrix4<f32>) -> Self {
        UniformValue::Mat4(v)
    }
}

/// Current uniform values of a program.
/// Reading a uniform that was never set gives zero.
#[derive(Debug, Clone, Default)]
pub struct Uniforms {
    values: HashMap<String, UniformValue>,
}

impl Uniforms {
    pub(super) fn set(&mut self, name: &str, value: UniformValue) {
        self.values.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn float(&self, name: &str) -> f32 {
        match self.get(name) {
            Some(UniformValue::Float(v)) => *v,
            _ => 0.0,
        }
    }

    pub fn int(&self, name: &str) -> i32 {
        match self.get(name) {
            Some(UniformValue::Int(v)) => *v,
            _ => 0,
        }
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some(UniformValue::Bool(true)))
    }

    pub fn vec3(&self, name: &str) -> Vector3<f32> {
        match self.get(name) {
            Some(UniformValue::Vec3(v)) => *v,
            _ => Vector3::zeros(),
        }
    }

    pub fn vec4(&self, name: &str) -> Vector4<f32> {
        match self.get(name) {
            Some(UniformValue::Vec4(v)) => *v,
            _ => Vector4::zeros(),
        }
    }

    pub fn mat4(&self, name: &str) -> Matrix4<f32> {
        match self.get(name) {
            Some(UniformValue::Mat4(v)) => *v,
            _ => Matrix4::zeros(),
        }
    }
}

/// Values passed from the vertex to the fragment stage, one `vec4` per location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Varyings([Vector4<f32>; MAX_VARYINGS]);

impl Varyings {
    pub fn get(&self, location: usize) -> Vector4<f32> {
        self.0[location]
    }

    pub fn vec3(&self, location: usize) -> Vector3<f32> {
        self.0[location].xyz()
    }

    pub fn set(&mut self, location: usize, value: Vector4<f32>) {
        self.0[location] = value;
    }

    pub fn set_vec3(&mut self, location: usize, value: Vector3<f32>) {
        self.0[location] = Vector4::new(value.x, value.y, value.z, 0.0);
    }

    pub(super) fn scaled(&self, s: f32) -> Varyings {
        Varyings(self.0.map(|v| v * s))
    }

    pub(super) fn weighted_sum(parts: [(&Varyings, f32); 3]) -> Varyings {
        let mut out = Varyings::default();
        for (varyings, weight) in parts {
            for (o, v) in out.0.iter_mut().zip(varyings.0.iter()) {
                *o += v * weight;
            }
        }
        out
    }
}

impl Default for Varyings {
    fn default() -> Self {
        Varyings([Vector4::zeros(); MAX_VARYINGS])
    }
}

/// Input of the fragment stage
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    /// Window coordinates of the pixel centre, origin lower left
    pub coord: Point2<f32>,
    /// Window depth in `<0;1>`
    pub depth: f32,
    pub varyings: Varyings,
}

/// Texture bound to a unit, possibly none
#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    texture: Option<&'a Texture>,
}

impl<'a> Sampler<'a> {
    pub fn texture(&self) -> Option<&'a Texture> {
        self.texture
    }

    /// Unbound units give `(0, 0, 0, 1)`
    pub fn sample(&self, coord: Vector3<f32>) -> RGBA {
        match self.texture {
            Some(t) => t.sample(coord),
            None => color::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    pub fn sample_1d(&self, u: f32) -> RGBA {
        self.sample(Vector3::new(u, 0.0, 0.0))
    }

    pub fn sample_2d(&self, u: f32, v: f32) -> RGBA {
        self.sample(Vector3::new(u, v, 0.0))
    }

    /// Texel count along each axis, ones for an unbound unit
    pub fn size(&self) -> Vector3<usize> {
        match self.texture {
            Some(t) => t.size(),
            None => Vector3::repeat(1),
        }
    }
}

/// Textures of all texture units for one draw
#[derive(Debug, Clone, Copy)]
pub struct Samplers<'a> {
    units: [Option<&'a Texture>; MAX_TEXTURE_UNITS],
}

impl<'a> Samplers<'a> {
    pub fn new(units: [Option<&'a Texture>; MAX_TEXTURE_UNITS]) -> Samplers<'a> {
        Samplers { units }
    }

    pub fn unit(&self, unit: i32) -> Sampler<'a> {
        let texture = usize::try_from(unit)
            .ok()
            .and_then(|u| self.units.get(u).copied().flatten());
        Sampler { texture }
    }

    /// Sampler for a sampler uniform
    pub fn uniform(&self, uniforms: &Uniforms, name: &str) -> Sampler<'a> {
        self.unit(uniforms.int(name))
    }
}

pub trait VertexKernel {
    /// Returns clip space position, writes varyings
    fn run(&self, vertex: &Vertex, out: &mut Varyings) -> Vector4<f32>;
}

pub trait FragmentKernel: Sync {
    /// `None` discards the fragment
    fn run(&self, fragment: &Fragment) -> Option<RGBA>;
}

pub trait VertexShader: Send + Sync {
    fn name(&self) -> &str;

    fn interface(&self) -> StageInterface;

    fn prepare<'a>(&'a self, uniforms: &'a Uniforms) -> Box<dyn VertexKernel + 'a>;
}

pub trait FragmentShader: Send + Sync {
    fn name(&self) -> &str;

    fn interface(&self) -> StageInterface;

    fn prepare<'a>(&'a self, uniforms: &'a Uniforms, samplers: Samplers<'a>) -> Box<dyn FragmentKernel + 'a>;
}
