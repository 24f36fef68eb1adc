//! Shared macro totals value type
//!
//! The calories/protein/carbs/fats quad used for food item values, cached day
//! totals, and statistics sums.

use serde::{Deserialize, Serialize};

/// Calories plus the three tracked macronutrients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fats: f64,    // grams
}

impl MacroTotals {
    /// All-zero totals
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add another set of totals to this one
    pub fn add(&self, other: &MacroTotals) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fats: self.fats + other.fats,
        }
    }

    /// Divide each field by a day count, for per-day averages.
    /// Zero days yields zero totals.
    pub fn per_day(&self, days: i64) -> Self {
        if days <= 0 {
            return Self::zero();
        }
        let n = days as f64;
        Self {
            calories: self.calories / n,
            protein: self.protein / n,
            carbs: self.carbs / n,
            fats: self.fats / n,
        }
    }
}

impl std::ops::Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, other: MacroTotals) -> MacroTotals {
        MacroTotals::add(&self, &other)
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::zero(), |acc, t| acc + t)
    }
}

/// Parse a user-supplied numeric field.
///
/// Free-text inputs arrive straight from form fields; anything missing,
/// unparsable, negative, or non-finite counts as 0 so the sums below never see
/// a null.
pub fn parse_or_zero(input: Option<&str>) -> f64 {
    let value = input
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_all_zero() {
        let z = MacroTotals::zero();
        assert_eq!(z.calories, 0.0);
        assert_eq!(z.protein, 0.0);
        assert_eq!(z.carbs, 0.0);
        assert_eq!(z.fats, 0.0);
    }

    #[test]
    fn test_add_is_field_wise() {
        let a = MacroTotals {
            calories: 100.0,
            protein: 5.0,
            carbs: 10.0,
            fats: 2.0,
        };
        let b = MacroTotals {
            calories: 200.0,
            protein: 10.0,
            carbs: 20.0,
            fats: 5.0,
        };
        let sum = a + b;
        assert_eq!(sum.calories, 300.0);
        assert_eq!(sum.protein, 15.0);
        assert_eq!(sum.carbs, 30.0);
        assert_eq!(sum.fats, 7.0);
    }

    #[test]
    fn test_sum_over_empty_iterator() {
        let sum: MacroTotals = std::iter::empty().sum();
        assert_eq!(sum, MacroTotals::zero());
    }

    #[test]
    fn test_per_day_average() {
        let total = MacroTotals {
            calories: 600.0,
            protein: 30.0,
            carbs: 60.0,
            fats: 15.0,
        };
        let avg = total.per_day(3);
        assert_eq!(avg.calories, 200.0);
        assert_eq!(avg.protein, 10.0);
        assert_eq!(avg.carbs, 20.0);
        assert_eq!(avg.fats, 5.0);
    }

    #[test]
    fn test_per_day_zero_days() {
        let total = MacroTotals {
            calories: 600.0,
            ..MacroTotals::zero()
        };
        assert_eq!(total.per_day(0), MacroTotals::zero());
    }

    #[test]
    fn test_parse_or_zero_valid() {
        assert_eq!(parse_or_zero(Some("150")), 150.0);
        assert_eq!(parse_or_zero(Some(" 12.5 ")), 12.5);
    }

    #[test]
    fn test_parse_or_zero_empty_string() {
        assert_eq!(parse_or_zero(Some("")), 0.0);
    }

    #[test]
    fn test_parse_or_zero_unparsable() {
        assert_eq!(parse_or_zero(Some("abc")), 0.0);
        assert_eq!(parse_or_zero(Some("12g")), 0.0);
    }

    #[test]
    fn test_parse_or_zero_missing() {
        assert_eq!(parse_or_zero(None), 0.0);
    }

    #[test]
    fn test_parse_or_zero_rejects_negative_and_non_finite() {
        assert_eq!(parse_or_zero(Some("-40")), 0.0);
        assert_eq!(parse_or_zero(Some("NaN")), 0.0);
        assert_eq!(parse_or_zero(Some("inf")), 0.0);
    }
}
