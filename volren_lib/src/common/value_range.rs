/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

/// Closed range of sample values.
/// Used by loaders to rescale raw samples into `<0;1>`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ValueRange {
    /// Lower bound
    pub low: f32,
    /// Upper bound
    pub high: f32,
}

impl ValueRange {
    /// Constructs new, empty range.
    pub fn empty() -> ValueRange {
        ValueRange {
            low: f32::NAN,
            high: f32::NAN,
        }
    }

    /// Constructs minimal range, where all samples from an iterator
    /// are inside the range.
    pub fn from_samples(iter: impl IntoIterator<Item = f32>) -> ValueRange {
        let mut range = ValueRange::empty();
        for val in iter {
            range.extend(val);
        }
        range
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_nan() || self.high.is_nan()
    }

    /// Extend the range with new value.
    /// NaN samples are skipped.
    pub fn extend(&mut self, val: f32) {
        if val.is_nan() {
            return;
        }

        if self.is_empty() {
            self.low = val;
            self.high = val;
        }

        if val > self.high {
            self.high = val;
        }

        if val < self.low {
            self.low = val;
        }
    }

    pub fn span(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.high - self.low
        }
    }

    /// Map `val` linearly so that `low` becomes 0 and `high` becomes 1.
    /// Degenerate (single value or empty) ranges map everything to 0.
    pub fn normalize(&self, val: f32) -> f32 {
        let span = self.span();
        if span > 0.0 {
            (val - self.low) / span
        } else {
            0.0
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn value_range() {
        let values = [1.0, 0.0, 5.0, 3.0, -2.5];

        let mut range = ValueRange::empty();
        for val in values {
            range.extend(val);
        }

        assert_eq!(range.low, -2.5);
        assert_eq!(range.high, 5.0);
        assert_eq!(range.span(), 7.5);
    }

    #[test]
    fn empty_value_range() {
        let mut range = ValueRange::empty();

        assert!(range.is_empty());
        assert_eq!(range.span(), 0.0);

        range.extend(f32::NAN);
        assert!(range.is_empty());

        range.extend(2.0);

        assert!(!range.is_empty());
        assert_eq!(range.low, 2.0);
        assert_eq!(range.high, 2.0);
    }

    #[test]
    fn from_samples() {
        let samples = [1u8, 2, 4, 10, 5, 0];

        let range = ValueRange::from_samples(samples.iter().map(|&v| v as f32));

        assert_eq!(
            range,
            ValueRange {
                low: 0.0,
                high: 10.0
            }
        )
    }

    #[test]
    fn normalize() {
        let range = ValueRange::from_samples([-2.0, 6.0]);

        assert_eq!(range.normalize(-2.0), 0.0);
        assert_eq!(range.normalize(2.0), 0.5);
        assert_eq!(range.normalize(6.0), 1.0);

        let constant = ValueRange::from_samples([3.0, 3.0]);
        assert_eq!(constant.normalize(3.0), 0.0);
    }
}
