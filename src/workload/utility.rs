/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the sample (n - 1) standard deviation.
/// Returns `None` when fewer than two values are given.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Rounds to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_mean_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
    }

    #[test]
    fn test_sample_stddev_needs_two_values() {
        assert_eq!(sample_stddev(&[]), None);
        assert_eq!(sample_stddev(&[5.0]), None);
    }

    #[test]
    fn test_sample_stddev_values() {
        // mean 5, squared deviations sum 32, n - 1 = 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = sample_stddev(&values).unwrap();
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_stddev_constant_series() {
        assert_eq!(sample_stddev(&[13.0, 13.0, 13.0]), Some(0.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(48.666_666), 48.67);
        assert_eq!(round2(50.0), 50.0);
    }
}
