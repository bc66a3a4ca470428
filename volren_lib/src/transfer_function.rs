/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Color and opacity lookup tables.
//!
//! The two tables are sized independently. Both are sampled with linear
//! filtering at the normalized sample value, see [`crate::gpu::Texture`].

use crate::{color::RGB, error::TransferFunctionError};

/// Samples in a shaped opacity table (table has one more entry)
pub const OPACITY_TABLE_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    colors: Vec<RGB>,
    opacities: Vec<f32>,
}

impl TransferFunction {
    pub fn new(colors: Vec<RGB>, opacities: Vec<f32>) -> Result<TransferFunction, TransferFunctionError> {
        if colors.is_empty() {
            return Err(TransferFunctionError::EmptyColors);
        }
        if opacities.is_empty() {
            return Err(TransferFunctionError::EmptyOpacities);
        }
        Ok(TransferFunction { colors, opacities })
    }

    pub fn colors(&self) -> &[RGB] {
        &self.colors
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn set_colors(&mut self, colors: Vec<RGB>) -> Result<(), TransferFunctionError> {
        if colors.is_empty() {
            return Err(TransferFunctionError::EmptyColors);
        }
        self.colors = colors;
        Ok(())
    }

    pub fn set_opacities(&mut self, opacities: Vec<f32>) -> Result<(), TransferFunctionError> {
        if opacities.is_empty() {
            return Err(TransferFunctionError::EmptyOpacities);
        }
        self.opacities = opacities;
        Ok(())
    }
}

/// Evaluate `shape` at `i / size` for `i` in `0..=size`.
/// Output is not clamped.
pub fn build_opacity_table<F>(size: usize, shape: F) -> Vec<f32>
where
    F: Fn(f32) -> f32,
{
    if size == 0 {
        return vec![shape(0.0)];
    }
    (0..=size).map(|i| shape(i as f32 / size as f32)).collect()
}

/// Shaping functions for opacity tables
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpacityCurve {
    Identity,
    /// `x^n`
    Power(i32),
    /// `ln(x + step) / ln(1 + step)`
    Log { step: f32 },
}

impl OpacityCurve {
    pub fn eval(&self, x: f32) -> f32 {
        match *self {
            OpacityCurve::Identity => x,
            OpacityCurve::Power(n) => x.powi(n),
            OpacityCurve::Log { step } => (x + step).ln() / (1.0 + step).ln(),
        }
    }

    pub fn table(&self, size: usize) -> Vec<f32> {
        build_opacity_table(size, |x| self.eval(x))
    }
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;

    #[test]
    fn identity_table() {
        let table = build_opacity_table(OPACITY_TABLE_SIZE, |x| x);

        assert_eq!(table.len(), OPACITY_TABLE_SIZE + 1);
        assert_eq!(table[0], 0.0);
        assert_eq!(table[OPACITY_TABLE_SIZE], 1.0);
        for (i, v) in table.iter().enumerate() {
            assert_eq!(*v, i as f32 / OPACITY_TABLE_SIZE as f32);
        }
    }

    #[test]
    fn table_not_clamped() {
        let table = build_opacity_table(4, |x| 2.0 * x - 0.5);

        assert_eq!(table, vec![-0.5, 0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn curves() {
        let cube = OpacityCurve::Power(3).table(2);
        assert_eq!(cube, vec![0.0, 0.125, 1.0]);

        let log = OpacityCurve::Log { step: 1.0 };
        assert_eq!(log.eval(0.0), 0.0);
        assert!((log.eval(1.0) - 1.0).abs() < 1e-6);
        assert!(log.eval(0.5) > 0.5);
    }

    #[test]
    fn empty_tables_rejected() {
        assert_eq!(
            TransferFunction::new(vec![], vec![1.0]),
            Err(TransferFunctionError::EmptyColors)
        );
        assert_eq!(
            TransferFunction::new(vec![vector![1.0, 0.0, 0.0]], vec![]),
            Err(TransferFunctionError::EmptyOpacities)
        );

        let mut tf = TransferFunction::new(vec![vector![1.0, 0.0, 0.0]], vec![1.0]).unwrap();
        assert!(tf.set_opacities(vec![]).is_err());
        assert_eq!(tf.opacities(), &[1.0]);
    }
}
