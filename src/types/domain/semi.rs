//! # Semi-Contiguous Ranges
//!
//! A semi-contiguous range is the union of a contiguous range with the value
//! `0`. These are the domains of semi-continuous integer variables in LP
//! files, which are either `0` or within their bounds.

use super::{contiguous::ext_from_f64, DomainError, ValueSet};
use crate::types::ExtInt;

/// The integers in `[lo, hi]` together with `0`, scaled by a multiplier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SemiContiguousRange {
    lo: ExtInt,
    hi: ExtInt,
    multiplier: i64,
}

impl SemiContiguousRange {
    /// Creates the set `[lo, hi] ∪ {0}`
    #[must_use]
    pub fn new(lo: i64, hi: i64) -> Self {
        SemiContiguousRange::with_bounds(ExtInt::Fin(lo), ExtInt::Fin(hi))
    }

    /// Creates the set `[lo, hi] ∪ {0}` where either end may be unbounded
    #[must_use]
    pub fn with_bounds(lo: ExtInt, hi: ExtInt) -> Self {
        SemiContiguousRange {
            lo,
            hi,
            multiplier: 1,
        }
    }

    /// Creates the range from floating point bounds, see
    /// [`super::ContiguousRange::from_f64`]
    ///
    /// # Errors
    ///
    /// If a bound is NaN or does not fit into an `i64`.
    pub fn from_f64(lo: f64, hi: f64) -> Result<Self, DomainError> {
        Ok(SemiContiguousRange::with_bounds(
            ext_from_f64(lo)?,
            ext_from_f64(hi)?,
        ))
    }

    /// The lower end of the range part, before applying the multiplier
    #[must_use]
    pub fn lo(&self) -> ExtInt {
        self.lo
    }

    /// The upper end of the range part, before applying the multiplier
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

    /// `0` lies below the range part
    fn zero_below(&self) -> bool {
        self.lo > 0
    }

    /// `0` lies above the range part
    fn zero_above(&self) -> bool {
        self.hi < 0
    }

    fn range_len(&self) -> Option<usize> {
        let (lo, hi) = (self.lo.finite()?, self.hi.finite()?);
        if hi < lo {
            return Some(0);
        }
        usize::try_from(hi.abs_diff(lo)).ok()?.checked_add(1)
    }
}

impl ValueSet for SemiContiguousRange {
    fn multiplier(&self) -> i64 {
        self.multiplier
    }

    fn raw_min(&self) -> ExtInt {
        if self.zero_below() {
            ExtInt::Fin(0)
        } else {
            self.lo
        }
    }

    fn raw_max(&self) -> ExtInt {
        if self.zero_above() {
            ExtInt::Fin(0)
        } else {
            self.hi
        }
    }

    fn raw_len(&self) -> Option<usize> {
        let len = self.range_len()?;
        if self.zero_below() || self.zero_above() {
            len.checked_add(1)
        } else {
            Some(len)
        }
    }

    fn raw_lo_at(&self, k: usize) -> Option<i64> {
        let lo = self.lo.finite()?;
        let k = i64::try_from(k).ok()?;
        let val = if self.zero_below() {
            if k == 0 {
                return Some(0);
            }
            lo.checked_add(k - 1)?
        } else {
            lo.checked_add(k)?
        };
        if self.hi >= val {
            Some(val)
        } else if self.zero_above() && self.hi + 1 == val {
            Some(0)
        } else {
            None
        }
    }

    fn raw_hi_at(&self, k: usize) -> Option<i64> {
        let hi = self.hi.finite()?;
        let k = i64::try_from(k).ok()?;
        let val = if self.zero_above() {
            if k == 0 {
                return Some(0);
            }
            hi.checked_sub(k - 1)?
        } else {
            hi.checked_sub(k)?
        };
        if self.lo <= val {
            Some(val)
        } else if self.zero_below() && self.lo + (-1) == val {
            Some(0)
        } else {
            None
        }
    }

    fn raw_step(&self) -> Option<i64> {
        (!self.zero_below() && !self.zero_above()).then_some(1)
    }
}
