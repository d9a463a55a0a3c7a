/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of commonly used percentile points. Values are computed with linear
/// interpolation between the two closest ranks (see [`compute_percentile`]).
///
/// # Examples
///
/// ```
/// use citystats_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(5.5));
/// assert_eq!(percentiles.get(25.0), Some(3.25));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// Percentile-value pairs in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// Percentile points are kept in the order given, duplicates included.
    /// An empty input produces an empty collection.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use citystats_stats::percentiles::Percentiles;
    ///
    /// let mut values = vec![5.0, 2.0, 8.0, 1.0, 9.0];
    /// values.sort_by(f64::total_cmp);
    /// let percentiles = Percentiles::from_sorted(&values, &[50.0, 90.0]);
    /// assert_eq!(percentiles.get(50.0), Some(5.0));
    /// ```
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .filter_map(|&p| compute_percentile(sorted_values, p).map(|value| (p, value)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values.
    ///
    /// This method will sort the values internally before computing percentiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use citystats_stats::percentiles::Percentiles;
    ///
    /// let values = vec![5.0, 2.0, 8.0, 1.0, 9.0];
    /// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(5.0));
    /// ```
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    ///
    /// # Examples
    ///
    /// ```
    /// use citystats_stats::percentiles::Percentiles;
    ///
    /// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    /// let percentiles = Percentiles::new(&values, &[50.0, 95.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(3.0));
    /// assert_eq!(percentiles.get(25.0), None); // Not precomputed
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }

    /// Returns all percentile-value pairs as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.values
    }

    /// Returns `true` if no percentile could be computed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the closest ranks: the fractional
/// index is `percentile / 100 * (n - 1)` and the result lies on the line
/// between the values at its floor and ceiling. Percentiles outside
/// `0.0..=100.0` are clamped.
///
/// Returns `None` if the input is empty.
///
/// # Examples
///
/// ```
/// use citystats_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), Some(3.5));
/// assert_eq!(compute_percentile(&values, 0.0), Some(1.0));
/// assert_eq!(compute_percentile(&values, 100.0), Some(100.0));
/// assert_eq!(compute_percentile(&[], 50.0), None);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;
    let rank = percentile.clamp(0.0, 100.0) / 100.0 * last as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(last);
    let low_value = sorted_values[lower];
    let high_value = sorted_values[upper];
    let fraction = rank - lower as f64;
    Some(low_value + (high_value - low_value) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_odd_length_is_middle_value() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(compute_percentile(&values, 50.0), Some(3.0));
    }

    #[test]
    fn test_median_of_even_length_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert_eq!(compute_percentile(&values, 50.0), Some(3.5));
    }

    #[test]
    fn test_interpolates_between_ranks() {
        // rank = 0.9 * 9 = 8.1 -> 9 + 0.1 * (10 - 9)
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let p90 = compute_percentile(&values, 90.0).unwrap();
        assert!((p90 - 9.1).abs() < 1e-12);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(compute_percentile(&[42.0], 10.0), Some(42.0));
        assert_eq!(compute_percentile(&[42.0], 99.0), Some(42.0));
    }

    #[test]
    fn test_empty_values_skip_every_point() {
        let percentiles = Percentiles::new(&[], &[10.0, 50.0]);
        assert!(percentiles.is_empty());
        assert_eq!(percentiles.get(50.0), None);
    }

    #[test]
    fn test_keeps_requested_order() {
        let percentiles = Percentiles::new(&[3.0, 1.0, 2.0], &[90.0, 10.0, 50.0]);
        let points: Vec<f64> = percentiles.iter().map(|(p, _)| p).collect();
        assert_eq!(points, vec![90.0, 10.0, 50.0]);
    }
}
