//! # Monotonic Function Ranges
//!
//! The image of a range of integer indices under a strictly monotonic
//! function. The set of supported functions is closed so that domains stay
//! comparable and can be persisted.

use std::fmt;

use super::{DomainError, ValueSet};
use crate::types::ExtInt;

/// A function from indices to values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonotonicFn {
    /// `slope * i + offset`
    Affine {
        /// Nonzero slope
        slope: i64,
        /// Constant offset
        offset: i64,
    },
    /// `coefficient * i^exponent`
    Power {
        /// Positive exponent
        exponent: u32,
        /// Nonzero coefficient
        coefficient: i64,
    },
    /// `coefficient * base^i` for nonnegative indices
    Exponential {
        /// Base, at least 2
        base: i64,
        /// Nonzero coefficient
        coefficient: i64,
    },
}

impl MonotonicFn {
    /// Evaluates the function, returns `None` on overflow or for negative
    /// indices of an exponential
    #[must_use]
    pub fn eval(&self, idx: i64) -> Option<i64> {
        match *self {
            MonotonicFn::Affine { slope, offset } => slope.checked_mul(idx)?.checked_add(offset),
            MonotonicFn::Power {
                exponent,
                coefficient,
            } => idx.checked_pow(exponent)?.checked_mul(coefficient),
            MonotonicFn::Exponential { base, coefficient } => base
                .checked_pow(u32::try_from(idx).ok()?)?
                .checked_mul(coefficient),
        }
    }

    /// Checks that the function is strictly monotonic on `[lo, hi]` and
    /// returns whether it is increasing
    fn check(&self, lo: i64, hi: ExtInt) -> Result<bool, DomainError> {
        let err = Err(DomainError::NotMonotonic(*self));
        match *self {
            MonotonicFn::Affine { slope, .. } => {
                if slope == 0 {
                    return err;
                }
                Ok(slope > 0)
            }
            MonotonicFn::Power {
                exponent,
                coefficient,
            } => {
                if exponent == 0 || coefficient == 0 {
                    return err;
                }
                if exponent % 2 == 1 {
                    return Ok(coefficient > 0);
                }
                // even powers are only monotonic on one side of 0
                if lo >= 0 {
                    Ok(coefficient > 0)
                } else if hi <= 0 {
                    Ok(coefficient < 0)
                } else {
                    err
                }
            }
            MonotonicFn::Exponential { base, coefficient } => {
                if base < 2 || coefficient == 0 || lo < 0 {
                    return err;
                }
                Ok(coefficient > 0)
            }
        }
    }
}

impl fmt::Display for MonotonicFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonotonicFn::Affine { slope, offset } => write!(f, "{slope}*i + {offset}"),
            MonotonicFn::Power {
                exponent,
                coefficient,
            } => write!(f, "{coefficient}*i^{exponent}"),
            MonotonicFn::Exponential { base, coefficient } => {
                write!(f, "{coefficient}*{base}^i")
            }
        }
    }
}

/// The values `f(i)` for all indices `i` in `[lo_idx, hi_idx]`, scaled by a
/// multiplier. The upper index may be unbounded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MonotonicFunctionRange {
    lo_idx: i64,
    hi_idx: ExtInt,
    func: MonotonicFn,
    increasing: bool,
    multiplier: i64,
}

impl MonotonicFunctionRange {
    /// Creates a new function range
    ///
    /// # Errors
    ///
    /// - [`DomainError::NotMonotonic`] if `func` is not strictly monotonic on
    ///   the index range
    /// - [`DomainError::Empty`] if `hi_idx < lo_idx`
    /// - [`DomainError::Overflow`] if a function value at a finite end
    ///   overflows
    /// - [`DomainError::BadArguments`] if `hi_idx` is negative infinity
    pub fn new(lo_idx: i64, hi_idx: ExtInt, func: MonotonicFn) -> Result<Self, DomainError> {
        if hi_idx == ExtInt::NegInf {
            return Err(DomainError::BadArguments(
                "upper index must not be negative infinity".to_string(),
            ));
        }
        if hi_idx < lo_idx {
            return Err(DomainError::Empty {
                lb: ExtInt::Fin(lo_idx),
                ub: hi_idx,
            });
        }
        let increasing = func.check(lo_idx, hi_idx)?;
        func.eval(lo_idx).ok_or(DomainError::Overflow)?;
        if let ExtInt::Fin(hi) = hi_idx {
            func.eval(hi).ok_or(DomainError::Overflow)?;
        }
        Ok(MonotonicFunctionRange {
            lo_idx,
            hi_idx,
            func,
            increasing,
            multiplier: 1,
        })
    }

    /// The lowest index
    #[must_use]
    pub fn lo_idx(&self) -> i64 {
        self.lo_idx
    }

    /// The highest index
    #[must_use]
    pub fn hi_idx(&self) -> ExtInt {
        self.hi_idx
    }

    /// The function
    #[must_use]
    pub fn func(&self) -> MonotonicFn {
        self.func
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

    /// The `k`-th index from the low end
    fn idx_from_lo(&self, k: usize) -> Option<i64> {
        let idx = self.lo_idx.checked_add(i64::try_from(k).ok()?)?;
        (self.hi_idx >= idx).then_some(idx)
    }

    /// The `k`-th index from the high end
    fn idx_from_hi(&self, k: usize) -> Option<i64> {
        let idx = self.hi_idx.finite()?.checked_sub(i64::try_from(k).ok()?)?;
        (idx >= self.lo_idx).then_some(idx)
    }
}

impl ValueSet for MonotonicFunctionRange {
    fn multiplier(&self) -> i64 {
        self.multiplier
    }

    fn raw_min(&self) -> ExtInt {
        let end = if self.increasing {
            ExtInt::Fin(self.lo_idx)
        } else {
            self.hi_idx
        };
        match end {
            ExtInt::Fin(idx) => self.func.eval(idx).map_or(ExtInt::NegInf, ExtInt::Fin),
            _ => ExtInt::NegInf,
        }
    }

    fn raw_max(&self) -> ExtInt {
        let end = if self.increasing {
            self.hi_idx
        } else {
            ExtInt::Fin(self.lo_idx)
        };
        match end {
            ExtInt::Fin(idx) => self.func.eval(idx).map_or(ExtInt::PosInf, ExtInt::Fin),
            _ => ExtInt::PosInf,
        }
    }

    fn raw_len(&self) -> Option<usize> {
        usize::try_from(self.hi_idx.finite()?.abs_diff(self.lo_idx))
            .ok()?
            .checked_add(1)
    }

    fn raw_lo_at(&self, k: usize) -> Option<i64> {
        let idx = if self.increasing {
            self.idx_from_lo(k)
        } else {
            self.idx_from_hi(k)
        }?;
        self.func.eval(idx)
    }

    fn raw_hi_at(&self, k: usize) -> Option<i64> {
        let idx = if self.increasing {
            self.idx_from_hi(k)
        } else {
            self.idx_from_lo(k)
        }?;
        self.func.eval(idx)
    }

    fn raw_step(&self) -> Option<i64> {
        match self.func {
            MonotonicFn::Affine { slope, .. } => Some(slope.abs()),
            _ => None,
        }
    }
}
