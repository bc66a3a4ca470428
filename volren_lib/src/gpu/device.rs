/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use super::{
    framebuffer::Framebuffer,
    mesh::Mesh,
    program::Program,
    raster::{self, ClipVertex, DrawState},
    shader::{Samplers, Varyings},
    texture::{Texture, TextureHandle, TextureStore},
    MAX_TEXTURE_UNITS,
};
use crate::color::RGBA;

/// Counters of the work done since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub draw_calls: usize,
    /// Triangles that survived culling and rejection
    pub triangles: usize,
    pub fragments: usize,
}

/// Software graphics device.
/// Owns the framebuffer, textures, texture units and fixed function state.
#[derive(Debug)]
pub struct Device {
    framebuffer: Framebuffer,
    textures: TextureStore,
    units: [Option<TextureHandle>; MAX_TEXTURE_UNITS],
    state: DrawState,
    stats: DrawStats,
}

impl Device {
    pub fn new(width: usize, height: usize) -> Device {
        Device {
            framebuffer: Framebuffer::new(width, height),
            textures: TextureStore::new(),
            units: [None; MAX_TEXTURE_UNITS],
            state: DrawState::default(),
            stats: DrawStats::default(),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width()
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height()
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.framebuffer.width(), self.framebuffer.height()) {
            self.framebuffer.resize(width, height);
        }
    }

    /// Fill color, reset depth to the far plane
    pub fn clear(&mut self, color: RGBA) {
        self.framebuffer.clear(color);
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn create_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.create(texture)
    }

    /// Destroys the texture and unbinds it from every unit
    pub fn destroy_texture(&mut self, handle: TextureHandle) -> bool {
        for unit in self.units.iter_mut() {
            if *unit == Some(handle) {
                *unit = None;
            }
        }
        self.textures.destroy(handle)
    }

    /// Out of range units are ignored
    pub fn bind_texture(&mut self, unit: usize, handle: Option<TextureHandle>) {
        match self.units.get_mut(unit) {
            Some(slot) => *slot = handle,
            None => log::warn!("Texture unit {} out of range", unit),
        }
    }

    pub fn bound_texture(&self, unit: usize) -> Option<TextureHandle> {
        self.units.get(unit).copied().flatten()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn set_state(&mut self, state: DrawState) {
        self.state = state;
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DrawStats::default();
    }

    /// Run `program` over every triangle of `mesh`, in index order
    pub fn draw(&mut self, program: &Program, mesh: &Mesh) {
        self.stats.draw_calls += 1;

        let textures = &self.textures;
        let units = self.units.map(|handle| handle.and_then(|h| textures.get(h)));

        let vertex_kernel = program.vertex_shader().prepare(program.uniforms());
        let fragment_kernel = program
            .fragment_shader()
            .prepare(program.uniforms(), Samplers::new(units));

        let transformed: Vec<ClipVertex> = mesh
            .vertices()
            .iter()
            .map(|vertex| {
                let mut varyings = Varyings::default();
                let clip = vertex_kernel.run(vertex, &mut varyings);
                ClipVertex { clip, varyings }
            })
            .collect();

        for [a, b, c] in mesh.indices() {
            let triangle = match (
                transformed.get(*a as usize),
                transformed.get(*b as usize),
                transformed.get(*c as usize),
            ) {
                (Some(a), Some(b), Some(c)) => [a, b, c],
                _ => {
                    log::warn!("Index out of range in triangle {:?}", [a, b, c]);
                    continue;
                }
            };

            let written = raster::draw_triangle(
                &mut self.framebuffer,
                &self.state,
                triangle,
                fragment_kernel.as_ref(),
            );
            if written > 0 {
                self.stats.triangles += 1;
                self.stats.fragments += written;
            }
        }
    }
}
