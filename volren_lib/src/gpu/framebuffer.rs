use crate::color::{self, RGBA};

/// Color and depth buffer.
/// Rows are stored top to bottom, window y axis points up.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<RGBA>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Framebuffer {
        Framebuffer {
            width,
            height,
            color: vec![color::zero(); width * height],
            depth: vec![1.0; width * height],
        }
    }

    /// Reallocate, content is lost
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Framebuffer::new(width, height);
    }

    pub fn clear(&mut self, color: RGBA) {
        self.color.fill(color);
        self.depth.fill(1.0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel in column `x` of row `row` (counted from the top)
    pub fn pixel(&self, x: usize, row: usize) -> Option<RGBA> {
        if x >= self.width || row >= self.height {
            return None;
        }
        Some(self.color[row * self.width + x])
    }

    pub fn pixels(&self) -> &[RGBA] {
        &self.color
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub(super) fn buffers_mut(&mut self) -> (&mut [RGBA], &mut [f32]) {
        (&mut self.color, &mut self.depth)
    }

    /// `0RGB` words, top row first, the layout windowing libraries take
    pub fn to_0rgb(&self) -> Vec<u32> {
        self.color
            .iter()
            .map(|c| {
                let (r, g, b) = (
                    color::to_byte(c.x) as u32,
                    color::to_byte(c.y) as u32,
                    color::to_byte(c.z) as u32,
                );
                (r << 16) | (g << 8) | b
            })
            .collect()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn clear_and_export() {
        let mut fb = Framebuffer::new(2, 1);
        fb.clear(color::new(1.0, 0.5, 0.0, 1.0));

        assert_eq!(fb.to_0rgb(), vec![0x00FF8000, 0x00FF8000]);
        assert_eq!(fb.pixel(2, 0), None);

        fb.resize(3, 3);
        assert_eq!(fb.pixels().len(), 9);
        assert_eq!(fb.pixel(2, 2), Some(color::zero()));
    }
}
