//! Summary statistics used in training progress logs.

/// Descriptive statistics of a set of `f64` samples.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Upper median (`sorted[len / 2]`).
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// `std_dev / (max - min)`, or 0 when all samples are equal.
    pub normalized_std_dev: f64,
}

impl DescriptiveStats {
    /// Computes statistics of unsorted values; `None` if there are none.
    ///
    /// # Examples
    ///
    /// ```
    /// # use evotris_training::stats::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let n = sorted_values.len() as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = sorted_values[sorted_values.len() / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();
        let range = max - min;
        let normalized_std_dev = if range <= mean.abs() * f64::EPSILON {
            0.0
        } else {
            std_dev / range
        };

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev,
            normalized_std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(DescriptiveStats::new([]), None);
    }

    #[test]
    fn test_constant_input() {
        let stats = DescriptiveStats::new([2.5; 4]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.normalized_std_dev, 0.0);
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_spread() {
        let stats = DescriptiveStats::new([0.0, 10.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 10.0);
        assert_eq!(stats.std_dev, 5.0);
        assert_eq!(stats.normalized_std_dev, 0.5);
    }
}
