use std::ops::Range;

use nalgebra::{point, Point2, Vector2};

// Screen space rectangle described by two points.
// Window coordinates, origin in the lower left corner, y up.
pub struct ViewportBox {
    pub lower: Point2<f32>,
    pub upper: Point2<f32>,
}

impl ViewportBox {
    // Empty box, flipped
    pub fn new() -> Self {
        Self {
            lower: point![f32::INFINITY, f32::INFINITY],
            upper: point![f32::NEG_INFINITY, f32::NEG_INFINITY],
        }
    }

    pub fn add_point(&mut self, x: f32, y: f32) {
        self.upper.x = f32::max(self.upper.x, x);
        self.upper.y = f32::max(self.upper.y, y);
        self.lower.x = f32::min(self.lower.x, x);
        self.lower.y = f32::min(self.lower.y, y);
    }

    pub fn size(&self) -> Vector2<f32> {
        self.upper - self.lower
    }

    /// Columns and rows whose pixel centres can lie inside the box.
    /// Rows are indexed top-down (framebuffer order).
    pub fn get_pixel_range(&self, resolution: (usize, usize)) -> (Range<usize>, Range<usize>) {
        let (width, height) = resolution;
        let height_f = height as f32;

        // pixel column c has its centre at x = c + 0.5
        let cols = clamped_range(self.lower.x - 0.5, self.upper.x - 0.5, width);
        // pixel row r has its centre at y = height - r - 0.5
        let rows = clamped_range(
            height_f - 0.5 - self.upper.y,
            height_f - 0.5 - self.lower.y,
            height,
        );

        (cols, rows)
    }
}

fn clamped_range(low: f32, high: f32, limit: usize) -> Range<usize> {
    if low.is_nan() || high.is_nan() || low > high || high < 0.0 {
        return 0..0;
    }
    let start = f32::max(low.ceil(), 0.0) as usize;
    let end = f32::min(high.floor() + 1.0, limit as f32) as usize;
    start.min(end)..end
}

impl Default for ViewportBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn viewport() {
        let mut vp = ViewportBox::new();

        vp.add_point(0.5, 0.5);

        assert_eq!(vp.lower, point![0.5, 0.5]);
        assert_eq!(vp.upper, point![0.5, 0.5]);

        vp.add_point(0.6, 0.7);
        vp.add_point(0.2, 0.4);

        assert_eq!(vp.lower, point![0.2, 0.4]);
        assert_eq!(vp.upper, point![0.6, 0.7]);
    }

    #[test]
    fn pixel_range_covers_centres() {
        let mut vp = ViewportBox::new();
        vp.add_point(1.0, 1.0);
        vp.add_point(3.0, 2.0);

        // centres x: 1.5, 2.5 | y (up): 1.5 -> row 8 of 10
        let (cols, rows) = vp.get_pixel_range((10, 10));

        assert_eq!(cols, 1..3);
        assert_eq!(rows, 8..9);
    }

    #[test]
    fn pixel_range_clipped() {
        let mut vp = ViewportBox::new();
        vp.add_point(-20.0, -20.0);
        vp.add_point(40.0, 40.0);

        let (cols, rows) = vp.get_pixel_range((16, 8));

        assert_eq!(cols, 0..16);
        assert_eq!(rows, 0..8);

        let empty = ViewportBox::new();
        let (cols, rows) = empty.get_pixel_range((16, 8));
        assert!(cols.is_empty());
        assert!(rows.is_empty());
    }
}
