//! Summary aggregates for stats cards.
//!
//! All aggregates return 0 on an empty input or a zero denominator instead of
//! producing NaN or panicking.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Integer,
    OneDecimal,
    /// Two decimals, for money.
    Cents,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        let factor = match self {
            Rounding::Integer => 1.0,
            Rounding::OneDecimal => 10.0,
            Rounding::Cents => 100.0,
        };
        (value * factor).round() / factor
    }
}

pub fn count<T>(records: &[T], predicate: impl Fn(&T) -> bool) -> usize {
    records.iter().filter(|r| predicate(r)).count()
}

/// Counts records per key, seeding every key in `keys` with zero so absent
/// buckets still appear in the output.
pub fn count_by<T>(
    records: &[T],
    keys: &[&'static str],
    key_of: impl Fn(&T) -> &'static str,
) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> = keys.iter().map(|k| (*k, 0)).collect();
    for record in records {
        *counts.entry(key_of(record)).or_insert(0) += 1;
    }
    counts
}

pub fn sum(values: impl IntoIterator<Item = f64>, rounding: Rounding) -> f64 {
    rounding.apply(values.into_iter().sum())
}

/// Mean of the values present. Records without a value are skipped rather
/// than counted as zero.
pub fn average(values: impl IntoIterator<Item = f64>, rounding: Rounding) -> f64 {
    let (total, n) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(total, n), v| (total + v, n + 1));
    if n == 0 {
        return 0.0;
    }
    rounding.apply(total / n as f64)
}

/// `used / total` as a percentage in 0–100, one decimal.
pub fn percentage(used: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    Rounding::OneDecimal.apply(used / total * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(average(Vec::<f64>::new(), Rounding::OneDecimal), 0.0);
    }

    #[test]
    fn test_average_one_decimal() {
        // (4.8 + 4.3 + 4.0) / 3 = 4.366..
        assert_eq!(average(vec![4.8, 4.3, 4.0], Rounding::OneDecimal), 4.4);
    }

    #[test]
    fn test_average_integer() {
        assert_eq!(average(vec![7.0, 8.0], Rounding::Integer), 8.0);
        assert_eq!(average(vec![6.0, 7.0, 7.0], Rounding::Integer), 7.0);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(percentage(1.0, 3.0), 33.3);
        assert_eq!(percentage(40.0, 50.0), 80.0);
    }

    #[test]
    fn test_sum_rounds_cents() {
        assert_eq!(sum(vec![0.1, 0.2], Rounding::Cents), 0.3);
        assert_eq!(sum(Vec::<f64>::new(), Rounding::Cents), 0.0);
    }

    #[test]
    fn test_count_by_seeds_missing_keys() {
        let values = vec!["a", "a", "b"];
        let counts = count_by(&values, &["a", "b", "c"], |v| *v);
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.get("c"), Some(&0));
    }

    #[test]
    fn test_count_predicate() {
        assert_eq!(count(&[1, 2, 3, 4], |n| n % 2 == 0), 2);
        assert_eq!(count::<i32>(&[], |_| true), 0);
    }
}
