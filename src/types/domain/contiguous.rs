//! # Contiguous Ranges

use super::{DomainError, ValueSet};
use crate::types::ExtInt;

/// All integers between a lower and an upper end (inclusive), scaled by a
/// multiplier. Either end may be unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContiguousRange {
    lo: ExtInt,
    hi: ExtInt,
    multiplier: i64,
}

impl ContiguousRange {
    /// Creates the closed range `[lo, hi]`
    #[must_use]
    pub fn new(lo: i64, hi: i64) -> Self {
        ContiguousRange {
            lo: ExtInt::Fin(lo),
            hi: ExtInt::Fin(hi),
            multiplier: 1,
        }
    }

    /// Creates a range that may be open at either end
    #[must_use]
    pub fn with_bounds(lo: ExtInt, hi: ExtInt) -> Self {
        ContiguousRange {
            lo,
            hi,
            multiplier: 1,
        }
    }

    /// Creates the range of all integers
    #[must_use]
    pub fn unbounded() -> Self {
        ContiguousRange::with_bounds(ExtInt::NegInf, ExtInt::PosInf)
    }

    /// Creates a range from floating point bounds as they appear in LP
    /// files. Finite bounds are truncated towards zero, infinite ones make
    /// the range open.
    ///
    /// # Errors
    ///
    /// [`DomainError::BadArguments`] if a bound is NaN,
    /// [`DomainError::Overflow`] if a bound does not fit into an `i64`.
    pub fn from_f64(lo: f64, hi: f64) -> Result<Self, DomainError> {
        Ok(ContiguousRange::with_bounds(
            ext_from_f64(lo)?,
            ext_from_f64(hi)?,
        ))
    }

    /// The lower end, before applying the multiplier
    #[must_use]
    pub fn lo(&self) -> ExtInt {
        self.lo
    }

    /// The upper end, before applying the multiplier
    #[must_use]
    pub fn hi(&self) -> ExtInt {
        self.hi
    }

    /// Sets the multiplier
    ///
    /// # Errors
    ///
    /// [`DomainError::ZeroMultiplier`] if `multiplier` is `0`,
    /// [`DomainError::Overflow`] if a scaled end does not fit into an `i64`.
    pub fn with_multiplier(mut self, multiplier: i64) -> Result<Self, DomainError> {
        super::check_multiplier(&self, multiplier)?;
        self.multiplier = multiplier;
        Ok(self)
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub(super) fn ext_from_f64(val: f64) -> Result<ExtInt, DomainError> {
    if val.is_nan() {
        return Err(DomainError::BadArguments("bound is NaN".to_string()));
    }
    if val == f64::INFINITY {
        return Ok(ExtInt::PosInf);
    }
    if val == f64::NEG_INFINITY {
        return Ok(ExtInt::NegInf);
    }
    let val = val.trunc();
    if val < i64::MIN as f64 || val >= i64::MAX as f64 {
        return Err(DomainError::Overflow);
    }
    Ok(ExtInt::Fin(val as i64))
}

impl ValueSet for ContiguousRange {
    fn multiplier(&self) -> i64 {
        self.multiplier
    }

    fn raw_min(&self) -> ExtInt {
        self.lo
    }

    fn raw_max(&self) -> ExtInt {
        self.hi
    }

    fn raw_len(&self) -> Option<usize> {
        let (lo, hi) = (self.lo.finite()?, self.hi.finite()?);
        if hi < lo {
            return Some(0);
        }
        usize::try_from(hi.abs_diff(lo)).ok()?.checked_add(1)
    }

    fn raw_lo_at(&self, k: usize) -> Option<i64> {
        let val = self.lo.finite()?.checked_add(i64::try_from(k).ok()?)?;
        (self.hi >= val).then_some(val)
    }

    fn raw_hi_at(&self, k: usize) -> Option<i64> {
        let val = self.hi.finite()?.checked_sub(i64::try_from(k).ok()?)?;
        (self.lo <= val).then_some(val)
    }

    fn raw_step(&self) -> Option<i64> {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::ContiguousRange;
    use crate::types::{domain::DomainError, ExtInt};

    #[test]
    fn float_bounds() {
        let dom = ContiguousRange::from_f64(-2.7, f64::INFINITY).unwrap();
        assert_eq!(dom.lo(), ExtInt::Fin(-2));
        assert_eq!(dom.hi(), ExtInt::PosInf);
        assert!(matches!(
            ContiguousRange::from_f64(f64::NAN, 1.),
            Err(DomainError::BadArguments(_))
        ));
    }

    #[test]
    fn zero_multiplier() {
        assert_eq!(
            ContiguousRange::new(0, 1).with_multiplier(0),
            Err(DomainError::ZeroMultiplier)
        );
    }
}
