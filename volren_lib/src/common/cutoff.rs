/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

use serde::{Deserialize, Serialize};

/// Windows narrower than this use coefficient 1
pub const CUTOFF_EPSILON: f32 = 1e-6;

/// Band of normalized sample values that is rendered.
/// Samples outside of the band do not contribute to the image.
///
/// `0 <= low <= high <= 1` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoffWindow {
    pub low: f32,
    pub high: f32,
}

impl CutoffWindow {
    pub fn new(low: f32, high: f32) -> CutoffWindow {
        CutoffWindow { low, high }
    }

    /// Scale stretching the window over `<0;1>`.
    /// Never infinite or NaN for finite bounds.
    pub fn coefficient(&self) -> f32 {
        let width = self.high - self.low;
        if width.abs() < CUTOFF_EPSILON {
            1.0
        } else {
            1.0 / width
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f32) -> bool {
        self.low <= value && value <= self.high
    }

    /// Position of `value` inside the window, clamped to `<0;1>`
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.low) * self.coefficient()).clamp(0.0, 1.0)
    }
}

impl Default for CutoffWindow {
    fn default() -> Self {
        CutoffWindow {
            low: 0.0,
            high: 1.0,
        }
    }
}
