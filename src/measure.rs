//! Missing-aware numeric values
//!
//! A [`Measure`] is an optional reading. Arithmetic on measures never fails: any
//! missing operand, a zero divisor, or a non-finite result yields a missing measure.
//! Comparisons against a missing measure are always false.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// An optional numeric reading with missing-propagating arithmetic
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measure(Option<f64>);

impl Measure {
    /// The missing value
    pub const MISSING: Measure = Measure(None);

    /// Wrap a value, treating NaN and infinities as missing
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Measure(Some(value))
        } else {
            Measure(None)
        }
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_missing(self) -> bool {
        self.0.is_none()
    }

    pub fn is_present(self) -> bool {
        self.0.is_some()
    }

    /// True only when present and strictly greater than `threshold`
    pub fn gt(self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v > threshold)
    }

    /// True only when present and strictly less than `threshold`
    pub fn lt(self, threshold: f64) -> bool {
        self.0.is_some_and(|v| v < threshold)
    }

    fn combine(self, rhs: Measure, op: impl FnOnce(f64, f64) -> f64) -> Measure {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Measure::new(op(a, b)),
            _ => Measure::MISSING,
        }
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::new(value)
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Measure::MISSING, Measure::new)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            None => Ok(()),
        }
    }
}

impl Add for Measure {
    type Output = Measure;

    fn add(self, rhs: Measure) -> Measure {
        self.combine(rhs, |a, b| a + b)
    }
}

impl Sub for Measure {
    type Output = Measure;

    fn sub(self, rhs: Measure) -> Measure {
        self.combine(rhs, |a, b| a - b)
    }
}

impl Mul for Measure {
    type Output = Measure;

    fn mul(self, rhs: Measure) -> Measure {
        self.combine(rhs, |a, b| a * b)
    }
}

impl Div for Measure {
    type Output = Measure;

    fn div(self, rhs: Measure) -> Measure {
        match rhs.0 {
            Some(d) if d == 0.0 => Measure::MISSING,
            _ => self.combine(rhs, |a, b| a / b),
        }
    }
}

impl Add<f64> for Measure {
    type Output = Measure;

    fn add(self, rhs: f64) -> Measure {
        self + Measure::new(rhs)
    }
}

impl Sub<f64> for Measure {
    type Output = Measure;

    fn sub(self, rhs: f64) -> Measure {
        self - Measure::new(rhs)
    }
}

impl Mul<f64> for Measure {
    type Output = Measure;

    fn mul(self, rhs: f64) -> Measure {
        self * Measure::new(rhs)
    }
}

impl Div<f64> for Measure {
    type Output = Measure;

    fn div(self, rhs: f64) -> Measure {
        self / Measure::new(rhs)
    }
}

/// Mean of the present values, or `None` when every value is missing
pub fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Measure>,
{
    let (sum, count) = values
        .into_iter()
        .filter_map(Measure::value)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_missing_propagates() {
        let present = Measure::new(10.0);
        assert!((present - Measure::MISSING).is_missing());
        assert!((Measure::MISSING / present).is_missing());
        assert!((Measure::MISSING * 2.0).is_missing());
        assert_eq!((present - 4.0).value(), Some(6.0));
    }

    #[test]
    fn test_division_by_zero_is_missing() {
        assert!((Measure::new(5.0) / 0.0).is_missing());
        assert!((Measure::new(0.0) / Measure::new(0.0)).is_missing());
        assert_eq!((Measure::new(5.0) / 2.0).value(), Some(2.5));
    }

    #[test]
    fn test_non_finite_is_missing() {
        assert!(Measure::new(f64::NAN).is_missing());
        assert!(Measure::new(f64::INFINITY).is_missing());
        assert!(Measure::from(Some(f64::NEG_INFINITY)).is_missing());
    }

    #[test]
    fn test_comparisons_with_missing_are_false() {
        assert!(!Measure::MISSING.gt(5.0));
        assert!(!Measure::MISSING.lt(5.0));
        assert!(Measure::new(6.0).gt(5.0));
        assert!(!Measure::new(5.0).gt(5.0));
        assert!(Measure::new(99.0).lt(100.0));
    }

    #[test]
    fn test_mean_present_ignores_missing() {
        let values = vec![Measure::new(120.0), Measure::MISSING, Measure::new(140.0)];
        assert_eq!(mean_present(values), Some(130.0));
        assert_eq!(mean_present(vec![Measure::MISSING]), None);
        assert_eq!(mean_present(Vec::new()), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{:.2}", Measure::new(1.23456)), "1.23");
        assert_eq!(format!("{}", Measure::MISSING), "");
    }

    proptest! {
        #[test]
        fn test_division_never_produces_non_finite(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let result = Measure::new(a) / Measure::new(b);
            if let Some(v) = result.value() {
                prop_assert!(v.is_finite());
            } else {
                prop_assert!(b == 0.0 || !(a / b).is_finite());
            }
        }
    }
}
