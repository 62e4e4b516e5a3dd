//! Rating aggregation, kept free of storage concerns so it can be
//! unit-tested against plain slices.

/// Mean of the given rating values, rounded to one decimal place.
/// An empty slice yields 0.0; the division only happens for non-empty
/// input, so no NaN can escape.
#[must_use]
pub fn average(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sum: i32 = values.iter().sum();
    let mean = f64::from(sum) / values.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        assert_eq!(average(&[5, 4]), 4.5);
        assert_eq!(average(&[5, 4, 4]), 4.3);
        assert_eq!(average(&[1, 2]), 1.5);
        assert_eq!(average(&[2, 2, 2]), 2.0);
    }

    #[test]
    fn test_average_single_value() {
        assert_eq!(average(&[3]), 3.0);
        assert_eq!(average(&[5]), 5.0);
    }
}
