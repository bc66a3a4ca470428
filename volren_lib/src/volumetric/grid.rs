use nalgebra::{vector, Vector3};

use crate::{common::ValueRange, error::VolumeError};

/// Number of voxels in a `width x height x depth` grid, `None` on overflow
pub fn voxel_count(width: usize, height: usize, depth: usize) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(depth)
}

fn checked_count(width: usize, height: usize, depth: usize) -> Result<usize, VolumeError> {
    if width == 0 || height == 0 || depth == 0 {
        return Err(VolumeError::EmptyVolume {
            width,
            height,
            depth,
        });
    }
    voxel_count(width, height, depth).ok_or(VolumeError::TooLarge {
        width,
        height,
        depth,
    })
}

/// Dense 3D array of scalar samples.
///
/// Samples are stored in depth slices of row-major images,
/// `index = z * width * height + y * width + x`.
/// Never mutated after construction, a new volume replaces the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeGrid {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<f32>,
}

impl VolumeGrid {
    pub fn new(width: usize, height: usize, depth: usize, data: Vec<f32>) -> Result<VolumeGrid, VolumeError> {
        let expected = checked_count(width, height, depth)?;
        if data.len() != expected {
            return Err(VolumeError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(VolumeGrid {
            width,
            height,
            depth,
            data,
        })
    }

    /// Build grid by evaluating `f(x, y, z)` for every voxel
    pub fn from_fn<F>(width: usize, height: usize, depth: usize, mut f: F) -> Result<VolumeGrid, VolumeError>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(checked_count(width, height, depth)?);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    data.push(f(x, y, z));
                }
            }
        }
        VolumeGrid::new(width, height, depth, data)
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.width * self.height + y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || z >= self.depth {
            return None;
        }
        self.data.get(self.index(x, y, z)).copied()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dims(&self) -> Vector3<usize> {
        vector![self.width, self.height, self.depth]
    }

    pub fn max_dim(&self) -> usize {
        self.width.max(self.height).max(self.depth)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value_range(&self) -> ValueRange {
        ValueRange::from_samples(self.data.iter().copied())
    }

    /// Rescale samples so that the smallest is 0 and the largest is 1.
    /// Constant volume becomes all zeros.
    pub fn normalized(self) -> VolumeGrid {
        let range = self.value_range();
        let data = self.data.iter().map(|&v| range.normalize(v)).collect();
        VolumeGrid { data, ..self }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn index_layout() {
        let grid = VolumeGrid::from_fn(3, 2, 4, |x, y, z| (x + 10 * y + 100 * z) as f32).unwrap();

        assert_eq!(grid.len(), 24);
        assert_eq!(grid.index(1, 0, 0), 1);
        assert_eq!(grid.index(0, 1, 0), 3);
        assert_eq!(grid.index(0, 0, 1), 6);
        assert_eq!(grid.get(2, 1, 3), Some(312.0));
        assert_eq!(grid.get(3, 0, 0), None);
        assert_eq!(grid.max_dim(), 4);
    }

    #[test]
    fn size_checks() {
        assert!(matches!(
            VolumeGrid::new(2, 2, 2, vec![0.0; 7]),
            Err(VolumeError::SizeMismatch {
                expected: 8,
                actual: 7
            })
        ));
        assert!(matches!(
            VolumeGrid::new(2, 0, 2, vec![]),
            Err(VolumeError::EmptyVolume { .. })
        ));
        // rejected before anything is allocated or evaluated
        assert!(matches!(
            VolumeGrid::from_fn(usize::MAX, 2, 1, |_, _, _| unreachable!()),
            Err(VolumeError::TooLarge { .. })
        ));
        assert_eq!(voxel_count(1 << 40, 1 << 30, 1), None);
        assert_eq!(voxel_count(3, 4, 5), Some(60));
    }

    #[test]
    fn normalize_range() {
        let grid = VolumeGrid::new(4, 1, 1, vec![-10.0, 0.0, 10.0, 30.0])
            .unwrap()
            .normalized();

        assert_eq!(grid.data(), &[0.0, 0.25, 0.5, 1.0]);

        let constant = VolumeGrid::new(2, 1, 1, vec![7.0, 7.0]).unwrap().normalized();
        assert_eq!(constant.data(), &[0.0, 0.0]);
    }
}
