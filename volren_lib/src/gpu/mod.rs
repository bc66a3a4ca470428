//! Software implementation of the programmable graphics pipeline.
//!
//! Vertex and fragment stages are Rust trait objects with declared
//! interfaces, linked into a [`Program`] and executed by [`Device::draw`].

mod device;
mod framebuffer;
mod mesh;
mod program;
mod raster;
mod shader;
mod texture;

pub use device::{Device, DrawStats};
pub use framebuffer::Framebuffer;
pub use mesh::{Mesh, Vertex, VERTEX_ATTRIBUTES};
pub use program::Program;
pub use raster::{Blend, BlendFactor, CullMode, DrawState, FrontFace};
pub use shader::{
    Fragment, FragmentKernel, FragmentShader, Sampler, Samplers, Slot, StageInterface, UniformValue,
    Uniforms, ValueKind, Varyings, VertexKernel, VertexShader,
};
pub use texture::{Filter, Texture, TextureFormat, TextureHandle, TextureStore, Wrap};

pub const MAX_TEXTURE_UNITS: usize = 4;
pub const MAX_VARYINGS: usize = 8;
