use crate::transfer_function::{OpacityCurve, OPACITY_TABLE_SIZE};

/// Multi-step curve, mostly transparent with opaque top end
pub fn default_opacity() -> Vec<f32> {
    vec![0.0, 0.001, 0.002, 0.003, 0.01, 0.02, 0.05, 1.0]
}

/// `x^n` over the whole range
pub fn power_opacity(n: i32) -> Vec<f32> {
    OpacityCurve::Power(n).table(OPACITY_TABLE_SIZE)
}

pub fn log_opacity() -> Vec<f32> {
    OpacityCurve::Log { step: 1.0 }.table(OPACITY_TABLE_SIZE)
}

/// Everything in the cutoff window is opaque
pub fn no_opacity() -> Vec<f32> {
    vec![1.0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacityPreset {
    Default,
    Power(i32),
    Log,
    None,
}

impl OpacityPreset {
    pub fn table(&self) -> Vec<f32> {
        match *self {
            OpacityPreset::Default => default_opacity(),
            OpacityPreset::Power(n) => power_opacity(n),
            OpacityPreset::Log => log_opacity(),
            OpacityPreset::None => no_opacity(),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn presets() {
        let linear = OpacityPreset::Power(1).table();
        assert_eq!(linear.len(), OPACITY_TABLE_SIZE + 1);
        assert_eq!(linear[OPACITY_TABLE_SIZE / 2], 0.5);

        let log = OpacityPreset::Log.table();
        assert_eq!(log[0], 0.0);
        assert!((log[OPACITY_TABLE_SIZE] - 1.0).abs() < 1e-6);

        assert_eq!(OpacityPreset::None.table(), vec![1.0]);
        assert_eq!(*OpacityPreset::Default.table().last().unwrap(), 1.0);
    }
}
