use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair handed to integrator backends.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-6,
            rel: 1e-6,
        }
    }
}

impl Tolerances {
    pub fn validate(self) -> Result<Self, CoreError> {
        if !(self.abs.is_finite() && self.abs > 0.0) {
            return Err(CoreError::InvalidArg {
                what: "absolute tolerance must be positive",
            });
        }
        if !(self.rel.is_finite() && self.rel > 0.0) {
            return Err(CoreError::InvalidArg {
                what: "relative tolerance must be positive",
            });
        }
        Ok(self)
    }
}

/// Every sample must be finite.
pub fn ensure_finite(values: &[Real], what: &'static str) -> Result<(), CoreError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(CoreError::NonFinite {
            what,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Samples must never decrease; equal neighbours are allowed (event restarts).
pub fn ensure_non_decreasing(values: &[Real], what: &'static str) -> Result<(), CoreError> {
    ensure_finite(values, what)?;
    for (i, pair) in values.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(CoreError::NotMonotonic {
                what,
                index: i + 1,
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(&[0.0, Real::NAN], "time").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
        assert!(matches!(err, CoreError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn non_decreasing_allows_repeats() {
        assert!(ensure_non_decreasing(&[0.0, 0.5, 0.5, 1.0], "time").is_ok());
        assert!(ensure_non_decreasing(&[], "time").is_ok());
    }

    #[test]
    fn non_decreasing_reports_first_drop() {
        let err = ensure_non_decreasing(&[0.0, 1.0, 0.9, 0.1], "time").unwrap_err();
        assert_eq!(
            err,
            CoreError::NotMonotonic {
                what: "time",
                index: 2,
                prev: 1.0,
                next: 0.9,
            }
        );
    }

    #[test]
    fn tolerances_reject_non_positive() {
        assert!(Tolerances::default().validate().is_ok());
        assert!(Tolerances { abs: 0.0, rel: 1e-6 }.validate().is_err());
        assert!(
            Tolerances {
                abs: 1e-6,
                rel: Real::NAN
            }
            .validate()
            .is_err()
        );
    }
}
