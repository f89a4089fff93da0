//! # Integer Domains
//!
//! A [`Domain`] describes the values an integer variable can attain. The set
//! of representations is closed:
//!
//! - [`ContiguousRange`]: all integers in `[lo, hi]`, either end may be open
//! - [`EnumeratedSet`]: an explicit set of integers
//! - [`MonotonicFunctionRange`]: the image of an index range under a strictly
//!   monotonic [`MonotonicFn`]
//! - [`SemiContiguousRange`]: a contiguous range together with the value `0`
//!
//! Every domain carries a nonzero _multiplier_ that scales each value. A
//! negative multiplier flips the order in which the underlying values are
//! produced, so iteration in ascending order always yields ascending values.
//! Domains are immutable, [`Domain::copy`] and [`Domain::merge`] produce new
//! domains.
//!
//! ## Example Usage
//!
//! ```
//! use orderenc::types::domain::{ContiguousRange, Domain, EnumeratedSet};
//!
//! let dom: Domain = EnumeratedSet::new([1, 3]).into();
//! let merged = dom.merge(&EnumeratedSet::new([10, 20]).into()).unwrap();
//! assert_eq!(merged, Domain::from(EnumeratedSet::new([11, 13, 21, 23])));
//!
//! let range: Domain = ContiguousRange::new(0, 3).into();
//! let scaled = range.copy(-2).unwrap();
//! assert_eq!(scaled.values_asc(0).unwrap().collect::<Vec<_>>(), vec![-6, -4, -2, 0]);
//! ```

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use super::ExtInt;
use crate::utils::{partition_point, unreachable_none};

mod contiguous;
pub use contiguous::ContiguousRange;

mod enumerated;
pub use enumerated::EnumeratedSet;

mod monotonic;
pub use monotonic::{MonotonicFn, MonotonicFunctionRange};

mod semi;
pub use semi::SemiContiguousRange;

/// Domains whose size product is at most this limit are merged exactly,
/// larger ones are approximated by an interval.
pub const MERGE_LIMIT: usize = 10_000;

/// Errors from domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The searched value is larger than the upper bound of the domain
    #[error("value {value} is out of range (upper bound {ub})")]
    OutOfRange {
        /// The searched value
        value: i64,
        /// The upper bound of the domain
        ub: ExtInt,
    },
    /// The domains cannot be merged
    #[error("domains with open bounds can only be merged when they are contiguous")]
    UnsupportedMerge,
    /// Iteration or indexing was requested from an unbounded end
    #[error("cannot enumerate values starting from an unbounded end of the domain")]
    OpenBound,
    /// The domain contains no values
    #[error("domain [{lb}, {ub}] is empty")]
    Empty {
        /// The (raw) lower end
        lb: ExtInt,
        /// The (raw) upper end
        ub: ExtInt,
    },
    /// A multiplier of zero was given
    #[error("domain multipliers must be nonzero")]
    ZeroMultiplier,
    /// The function is not strictly monotonic on the index range
    #[error("{0} is not strictly monotonic on the index range")]
    NotMonotonic(MonotonicFn),
    /// A bound or value does not fit into a 64 bit integer
    #[error("value overflows a 64 bit integer")]
    Overflow,
    /// Unknown variant name when importing a domain
    #[error("unknown domain type `{0}`")]
    UnknownTag(String),
    /// Invalid constructor arguments when importing or converting a domain
    #[error("invalid domain arguments: {0}")]
    BadArguments(String),
}

/// Shared access to the underlying (unscaled) value set of a domain variant.
/// The value set is viewed as a sorted sequence that can be addressed from
/// either end.
pub(crate) trait ValueSet {
    /// The multiplier of the variant
    fn multiplier(&self) -> i64;
    /// The minimum unscaled value
    fn raw_min(&self) -> ExtInt;
    /// The maximum unscaled value
    fn raw_max(&self) -> ExtInt;
    /// The number of unscaled values, `None` if unbounded
    fn raw_len(&self) -> Option<usize>;
    /// The `k`-th smallest unscaled value
    fn raw_lo_at(&self, k: usize) -> Option<i64>;
    /// The `k`-th largest unscaled value
    fn raw_hi_at(&self, k: usize) -> Option<i64>;
    /// The step width, if the unscaled values form an arithmetic progression
    fn raw_step(&self) -> Option<i64>;
}

/// Checks that a multiplier is nonzero and keeps the finite ends of a value
/// set within `i64`. All values lie between the ends, so this holds for
/// every scaled value.
fn check_multiplier(set: &dyn ValueSet, multiplier: i64) -> Result<(), DomainError> {
    if multiplier == 0 {
        return Err(DomainError::ZeroMultiplier);
    }
    if set.raw_min().checked_scale(multiplier).is_none()
        || set.raw_max().checked_scale(multiplier).is_none()
    {
        return Err(DomainError::Overflow);
    }
    Ok(())
}

/// A range `[lo, hi]` without values
fn inverted(lo: ExtInt, hi: ExtInt) -> bool {
    lo == ExtInt::PosInf || hi == ExtInt::NegInf || lo > hi
}

/// The domain of an integer variable
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        into = "crate::instances::DomainRecord",
        try_from = "crate::instances::DomainRecord"
    )
)]
pub enum Domain {
    /// See [`ContiguousRange`]
    Contiguous(ContiguousRange),
    /// See [`EnumeratedSet`]
    Enumerated(EnumeratedSet),
    /// See [`MonotonicFunctionRange`]
    Monotonic(MonotonicFunctionRange),
    /// See [`SemiContiguousRange`]
    SemiContiguous(SemiContiguousRange),
}

impl Domain {
    fn inner(&self) -> &dyn ValueSet {
        match self {
            Domain::Contiguous(dom) => dom,
            Domain::Enumerated(dom) => dom,
            Domain::Monotonic(dom) => dom,
            Domain::SemiContiguous(dom) => dom,
        }
    }

    /// The name of the variant, as used for persistence
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Domain::Contiguous(_) => "ContiguousRange",
            Domain::Enumerated(_) => "EnumeratedSet",
            Domain::Monotonic(_) => "MonotonicFunctionRange",
            Domain::SemiContiguous(_) => "SemiContiguousRange",
        }
    }

    /// The multiplier scaling every value of the domain
    #[must_use]
    pub fn multiplier(&self) -> i64 {
        self.inner().multiplier()
    }

    /// The smallest value in the domain
    #[must_use]
    pub fn lb(&self) -> ExtInt {
        let inner = self.inner();
        if inner.multiplier() > 0 {
            inner.raw_min() * inner.multiplier()
        } else {
            inner.raw_max() * inner.multiplier()
        }
    }

    /// The largest value in the domain
    #[must_use]
    pub fn ub(&self) -> ExtInt {
        let inner = self.inner();
        if inner.multiplier() > 0 {
            inner.raw_max() * inner.multiplier()
        } else {
            inner.raw_min() * inner.multiplier()
        }
    }

    /// The number of values in the domain, `None` if the domain is unbounded
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        self.inner().raw_len()
    }

    /// Checks whether the domain contains no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Checks that the domain has at least one value. Ranges must satisfy
    /// `lo <= hi`, with `lo` not positive and `hi` not negative infinity.
    ///
    /// # Errors
    ///
    /// [`DomainError::Empty`] with the bounds of the domain otherwise.
    pub fn validate(&self) -> Result<(), DomainError> {
        let inverted = match self {
            Domain::Contiguous(dom) => inverted(dom.lo(), dom.hi()),
            Domain::SemiContiguous(dom) => inverted(dom.lo(), dom.hi()),
            Domain::Enumerated(_) | Domain::Monotonic(_) => false,
        };
        if inverted || self.is_empty() {
            return Err(DomainError::Empty {
                lb: self.lb(),
                ub: self.ub(),
            });
        }
        Ok(())
    }

    /// Checks whether at least one end of the domain is unbounded
    #[must_use]
    pub fn has_open_bound(&self) -> bool {
        !self.lb().is_finite() || !self.ub().is_finite()
    }

    /// Gets the `k`-th smallest value of the domain. Returns `None` if there
    /// are less than `k + 1` values or the domain has no lower bound.
    #[must_use]
    pub fn nth_ascending(&self, k: usize) -> Option<i64> {
        let inner = self.inner();
        let m = inner.multiplier();
        if m > 0 {
            inner.raw_lo_at(k)?.checked_mul(m)
        } else {
            inner.raw_hi_at(k)?.checked_mul(m)
        }
    }

    /// Gets the `k`-th largest value of the domain. Returns `None` if there
    /// are less than `k + 1` values or the domain has no upper bound.
    #[must_use]
    pub fn nth_descending(&self, k: usize) -> Option<i64> {
        let inner = self.inner();
        let m = inner.multiplier();
        if m > 0 {
            inner.raw_hi_at(k)?.checked_mul(m)
        } else {
            inner.raw_lo_at(k)?.checked_mul(m)
        }
    }

    /// Iterates over the values in ascending order, skipping the `start`
    /// smallest ones. Calling this again restarts the iteration.
    ///
    /// # Errors
    ///
    /// [`DomainError::OpenBound`] if the domain has no lower bound.
    pub fn values_asc(&self, start: usize) -> Result<Values<'_>, DomainError> {
        if !self.lb().is_finite() {
            return Err(DomainError::OpenBound);
        }
        Ok(Values {
            dom: self,
            next: start,
            ascending: true,
        })
    }

    /// Iterates over the values in descending order, skipping the `start`
    /// largest ones. Calling this again restarts the iteration.
    ///
    /// # Errors
    ///
    /// [`DomainError::OpenBound`] if the domain has no upper bound.
    pub fn values_desc(&self, start: usize) -> Result<Values<'_>, DomainError> {
        if !self.ub().is_finite() {
            return Err(DomainError::OpenBound);
        }
        Ok(Values {
            dom: self,
            next: start,
            ascending: false,
        })
    }

    /// Lower bound, upper bound and step width if the values form an
    /// arithmetic progression
    fn progression(&self) -> Option<(ExtInt, ExtInt, i64)> {
        let inner = self.inner();
        let step = inner.raw_step()?.checked_mul(inner.multiplier())?.checked_abs()?;
        Some((self.lb(), self.ub(), step))
    }

    /// Returns the position at which `val` would be inserted to keep the
    /// ascending order, i.e., the number of values smaller than `val`.
    ///
    /// # Errors
    ///
    /// [`DomainError::OpenBound`] if the domain has no lower bound.
    pub fn index(&self, val: i64) -> Result<usize, DomainError> {
        let ExtInt::Fin(lb) = self.lb() else {
            return Err(DomainError::OpenBound);
        };
        if val <= lb {
            return Ok(0);
        }
        if let Some((_, _, step)) = self.progression() {
            let (diff, step) = (i128::from(val) - i128::from(lb), i128::from(step));
            let idx = usize::try_from((diff + step - 1) / step).map_err(|_| DomainError::Overflow)?;
            return Ok(match self.len() {
                Some(len) => std::cmp::min(idx, len),
                None => idx,
            });
        }
        Ok(partition_point(self.len(), |k| {
            self.nth_ascending(k).is_some_and(|dv| dv < val)
        }))
    }

    /// Returns the smallest value in the domain that is greater or equal to
    /// `val`.
    ///
    /// # Errors
    ///
    /// [`DomainError::OutOfRange`] if `val` is larger than the upper bound.
    pub fn search(&self, val: i64) -> Result<i64, DomainError> {
        let ub = self.ub();
        if ub < val {
            return Err(DomainError::OutOfRange { value: val, ub });
        }
        if let Some((lb, ub, step)) = self.progression() {
            // distance from `val` up to the next value on the grid
            let gap = match (lb, ub) {
                (ExtInt::Fin(lb), _) if val <= lb => return Ok(lb),
                (ExtInt::Fin(lb), _) => {
                    let rem = (i128::from(val) - i128::from(lb)) % i128::from(step);
                    if rem == 0 {
                        0
                    } else {
                        step - unreachable_none!(i64::try_from(rem).ok())
                    }
                }
                (_, ExtInt::Fin(ub)) => {
                    let rem = (i128::from(ub) - i128::from(val)) % i128::from(step);
                    unreachable_none!(i64::try_from(rem).ok())
                }
                _ => (step - val.rem_euclid(step)) % step,
            };
            return val.checked_add(gap).ok_or(DomainError::Overflow);
        }
        if self.lb().is_finite() {
            let idx = self.index(val)?;
            return self
                .nth_ascending(idx)
                .ok_or(DomainError::OutOfRange { value: val, ub });
        }
        // count values >= val from the top, at least the upper bound is
        let above = partition_point(self.len(), |k| {
            self.nth_descending(k).is_some_and(|dv| dv >= val)
        });
        debug_assert!(above > 0);
        Ok(unreachable_none!(self.nth_descending(above - 1)))
    }

    /// Checks whether a value is contained in the domain
    #[must_use]
    pub fn contains(&self, val: i64) -> bool {
        self.search(val) == Ok(val)
    }

    /// Returns a new domain of the same variant with the multiplier composed
    /// with `multiplier`. This is the domain of the term `multiplier * var`.
    ///
    /// # Errors
    ///
    /// [`DomainError::ZeroMultiplier`] if `multiplier` is `0`,
    /// [`DomainError::Overflow`] if a scaled bound does not fit into an
    /// `i64`.
    pub fn copy(&self, multiplier: i64) -> Result<Domain, DomainError> {
        let multiplier = self
            .multiplier()
            .checked_mul(multiplier)
            .ok_or(DomainError::Overflow)?;
        Ok(match self.clone() {
            Domain::Contiguous(dom) => dom.with_multiplier(multiplier)?.into(),
            Domain::Enumerated(dom) => dom.with_multiplier(multiplier)?.into(),
            Domain::Monotonic(dom) => dom.with_multiplier(multiplier)?.into(),
            Domain::SemiContiguous(dom) => dom.with_multiplier(multiplier)?.into(),
        })
    }

    /// A contiguous range with multiplier of magnitude 1
    fn is_unit_range(&self) -> bool {
        matches!(self, Domain::Contiguous(dom) if dom.multiplier().abs() == 1)
    }

    /// Computes the domain of the sum of one value of each operand.
    ///
    /// Two unit contiguous ranges, or operands with open bounds, are merged
    /// to the interval of the summed bounds. Otherwise, if the product of the
    /// operand sizes is at most [`MERGE_LIMIT`], all pairwise sums are
    /// computed and the result is a [`ContiguousRange`] if the sums have no
    /// gaps or an [`EnumeratedSet`] if they do. Larger operands are
    /// approximated by the interval of the summed bounds.
    ///
    /// # Errors
    ///
    /// [`DomainError::UnsupportedMerge`] if an operand with an open bound is
    /// not a [`ContiguousRange`], [`DomainError::Overflow`] if a summed bound
    /// does not fit into an `i64`.
    pub fn merge(&self, other: &Domain) -> Result<Domain, DomainError> {
        if self.has_open_bound() || other.has_open_bound() {
            if [self, other]
                .iter()
                .any(|dom| dom.has_open_bound() && !matches!(dom, Domain::Contiguous(_)))
            {
                return Err(DomainError::UnsupportedMerge);
            }
            return self.interval_sum(other);
        }
        let interval = self.interval_sum(other)?;
        if self.is_unit_range() && other.is_unit_range() {
            return Ok(interval);
        }
        // a closed range of more than `usize::MAX` values has no length
        let size = self
            .len()
            .zip(other.len())
            .map_or(usize::MAX, |(lhs, rhs)| lhs.saturating_mul(rhs));
        if size > MERGE_LIMIT {
            log::warn!(
                "approximating merge of domains with {size} value combinations by an interval"
            );
            return Ok(interval);
        }
        let rhs: Vec<i64> = other.values_asc(0)?.collect();
        // the summed bounds fit, so every sum does
        let sums: Vec<i64> = self
            .values_asc(0)?
            .cartesian_product(rhs)
            .map(|(a, b)| a + b)
            .sorted_unstable()
            .dedup()
            .collect();
        Ok(Domain::from_sorted_values(sums))
    }

    fn interval_sum(&self, other: &Domain) -> Result<Domain, DomainError> {
        let lb = self.lb().checked_add(other.lb());
        let ub = self.ub().checked_add(other.ub());
        match (lb, ub) {
            (Some(lb), Some(ub)) => Ok(ContiguousRange::with_bounds(lb, ub).into()),
            _ => Err(DomainError::Overflow),
        }
    }

    /// Builds a domain from sorted distinct values, preferring a
    /// [`ContiguousRange`] if the values have no gaps
    #[must_use]
    pub fn from_sorted_values(values: Vec<i64>) -> Domain {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        match (values.first(), values.last()) {
            (Some(&first), Some(&last))
                if usize::try_from(last.abs_diff(first)).is_ok_and(|diff| diff < values.len()) =>
            {
                ContiguousRange::new(first, last).into()
            }
            _ => EnumeratedSet::new(values).into(),
        }
    }
}

impl From<ContiguousRange> for Domain {
    fn from(value: ContiguousRange) -> Self {
        Domain::Contiguous(value)
    }
}

impl From<EnumeratedSet> for Domain {
    fn from(value: EnumeratedSet) -> Self {
        Domain::Enumerated(value)
    }
}

impl From<MonotonicFunctionRange> for Domain {
    fn from(value: MonotonicFunctionRange) -> Self {
        Domain::Monotonic(value)
    }
}

impl From<SemiContiguousRange> for Domain {
    fn from(value: SemiContiguousRange) -> Self {
        Domain::SemiContiguous(value)
    }
}

/// Small domains list their values, large ones are abbreviated and open ones
/// are printed as `[...]`
impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.len() {
            None => write!(f, "[...]"),
            Some(len) if len > 20 => {
                let head = (0..5).filter_map(|k| self.nth_ascending(k)).join(", ");
                let tail = (0..5)
                    .rev()
                    .filter_map(|k| self.nth_descending(k))
                    .join(", ");
                write!(f, "[{head}] ... [{tail}] # {len}")
            }
            Some(_) => write!(f, "[{}]", (0..).map_while(|k| self.nth_ascending(k)).join(", ")),
        }
    }
}

/// Iterator over the values of a [`Domain`], created by
/// [`Domain::values_asc`] and [`Domain::values_desc`]
#[derive(Clone, Debug)]
pub struct Values<'dom> {
    dom: &'dom Domain,
    next: usize,
    ascending: bool,
}

impl Iterator for Values<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        let val = if self.ascending {
            self.dom.nth_ascending(self.next)
        } else {
            self.dom.nth_descending(self.next)
        }?;
        self.next += 1;
        Some(val)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.dom.len() {
            Some(len) => {
                let rem = len.saturating_sub(self.next);
                (rem, Some(rem))
            }
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ContiguousRange, Domain, DomainError, EnumeratedSet, MonotonicFn, MonotonicFunctionRange,
        SemiContiguousRange,
    };
    use crate::types::ExtInt;

    fn collect_asc(dom: &Domain) -> Vec<i64> {
        dom.values_asc(0).unwrap().collect()
    }

    fn collect_desc(dom: &Domain) -> Vec<i64> {
        dom.values_desc(0).unwrap().collect()
    }

    #[test]
    fn contiguous_bounds() {
        let dom: Domain = ContiguousRange::new(-2, 3).into();
        assert_eq!(dom.lb(), ExtInt::Fin(-2));
        assert_eq!(dom.ub(), ExtInt::Fin(3));
        assert_eq!(dom.len(), Some(6));
        let neg = dom.copy(-3).unwrap();
        assert_eq!(neg.lb(), ExtInt::Fin(-9));
        assert_eq!(neg.ub(), ExtInt::Fin(6));
        assert_eq!(collect_asc(&neg), vec![-9, -6, -3, 0, 3, 6]);
        assert_eq!(collect_desc(&neg), vec![6, 3, 0, -3, -6, -9]);
    }

    #[test]
    fn copy_composes_multipliers() {
        let dom: Domain = ContiguousRange::new(1, 2).into();
        let twice = dom.copy(-2).unwrap().copy(-3).unwrap();
        assert_eq!(twice.multiplier(), 6);
        assert_eq!(collect_asc(&twice), vec![6, 12]);
    }

    #[test]
    fn start_offsets() {
        let dom: Domain = EnumeratedSet::new([4, 1, 9, 7]).into();
        assert_eq!(
            dom.values_asc(1).unwrap().collect::<Vec<_>>(),
            vec![4, 7, 9]
        );
        assert_eq!(dom.values_desc(3).unwrap().collect::<Vec<_>>(), vec![1]);
        assert_eq!(dom.values_desc(4).unwrap().count(), 0);
    }

    #[test]
    fn index_and_search() {
        let dom: Domain = EnumeratedSet::new([1, 4, 7]).into();
        assert_eq!(dom.index(0), Ok(0));
        assert_eq!(dom.index(1), Ok(0));
        assert_eq!(dom.index(2), Ok(1));
        assert_eq!(dom.index(7), Ok(2));
        assert_eq!(dom.index(8), Ok(3));
        assert_eq!(dom.search(-5), Ok(1));
        assert_eq!(dom.search(5), Ok(7));
        assert_eq!(
            dom.search(8),
            Err(DomainError::OutOfRange {
                value: 8,
                ub: ExtInt::Fin(7)
            })
        );
        let scaled: Domain = ContiguousRange::new(0, 3).into();
        let scaled = scaled.copy(3).unwrap();
        assert_eq!(scaled.index(4), Ok(2));
        assert_eq!(scaled.search(4), Ok(6));
        assert_eq!(scaled.search(9), Ok(9));
    }

    #[test]
    fn open_domains() {
        let dom: Domain = ContiguousRange::with_bounds(ExtInt::NegInf, ExtInt::Fin(5)).into();
        assert!(dom.has_open_bound());
        assert_eq!(dom.len(), None);
        assert_eq!(dom.values_asc(0).unwrap_err(), DomainError::OpenBound);
        assert_eq!(
            dom.values_desc(0).unwrap().take(3).collect::<Vec<_>>(),
            vec![5, 4, 3]
        );
        assert_eq!(dom.search(-100), Ok(-100));
        assert_eq!(dom.index(0), Err(DomainError::OpenBound));
        let free: Domain = ContiguousRange::unbounded().into();
        assert_eq!(free.copy(2).unwrap().search(3), Ok(4));
        assert_eq!(free.copy(2).unwrap().search(-3), Ok(-2));
    }

    #[test]
    fn semi_contiguous() {
        let dom: Domain = SemiContiguousRange::new(3, 5).into();
        assert_eq!(collect_asc(&dom), vec![0, 3, 4, 5]);
        assert_eq!(dom.len(), Some(4));
        assert_eq!(dom.search(1), Ok(3));
        assert_eq!(dom.index(3), Ok(1));
        let neg = dom.copy(-1).unwrap();
        assert_eq!(collect_asc(&neg), vec![-5, -4, -3, 0]);
        assert_eq!(neg.lb(), ExtInt::Fin(-5));
        assert_eq!(neg.ub(), ExtInt::Fin(0));
        let below: Domain = SemiContiguousRange::new(-4, -2).into();
        assert_eq!(collect_desc(&below), vec![0, -2, -3, -4]);
        let around: Domain = SemiContiguousRange::new(-1, 1).into();
        assert_eq!(collect_asc(&around), vec![-1, 0, 1]);
    }

    #[test]
    fn monotonic_function() {
        let dom: Domain = MonotonicFunctionRange::new(
            0,
            ExtInt::Fin(4),
            MonotonicFn::Power {
                exponent: 2,
                coefficient: 1,
            },
        )
        .unwrap()
        .into();
        assert_eq!(collect_asc(&dom), vec![0, 1, 4, 9, 16]);
        assert_eq!(dom.search(5), Ok(9));
        assert_eq!(dom.index(5), Ok(3));
        let dec: Domain = MonotonicFunctionRange::new(
            1,
            ExtInt::Fin(3),
            MonotonicFn::Affine {
                slope: -2,
                offset: 0,
            },
        )
        .unwrap()
        .into();
        assert_eq!(collect_asc(&dec), vec![-6, -4, -2]);
        assert_eq!(dec.index(-3), Ok(2));
        assert_eq!(dec.search(-5), Ok(-4));
    }

    #[test]
    fn merge_contiguous() {
        let a: Domain = ContiguousRange::new(0, 3).into();
        let b: Domain = ContiguousRange::new(0, 2).into();
        assert_eq!(a.merge(&b), Ok(ContiguousRange::new(0, 5).into()));
    }

    #[test]
    fn merge_enumerated() {
        let a: Domain = EnumeratedSet::new([1, 3]).into();
        let b: Domain = EnumeratedSet::new([10, 20]).into();
        assert_eq!(a.merge(&b), Ok(EnumeratedSet::new([11, 13, 21, 23]).into()));
    }

    #[test]
    fn merge_detects_contiguous() {
        let a: Domain = EnumeratedSet::new([0, 2]).into();
        let b: Domain = ContiguousRange::new(0, 1).into();
        assert_eq!(a.merge(&b), Ok(ContiguousRange::new(0, 3).into()));
        let c: Domain = ContiguousRange::new(0, 0).into();
        assert_eq!(a.merge(&c), Ok(EnumeratedSet::new([0, 2]).into()));
    }

    #[test]
    fn merge_interval_fallback() {
        let a: Domain = EnumeratedSet::new((0..200).map(|v| 2 * v)).into();
        let b: Domain = EnumeratedSet::new((0..100).map(|v| 3 * v)).into();
        assert_eq!(a.merge(&b), Ok(ContiguousRange::new(0, 398 + 297).into()));
    }

    #[test]
    fn merge_open() {
        let a: Domain = ContiguousRange::with_bounds(ExtInt::Fin(0), ExtInt::PosInf).into();
        let b: Domain = EnumeratedSet::new([1, 5]).into();
        assert_eq!(
            a.merge(&b),
            Ok(ContiguousRange::with_bounds(ExtInt::Fin(1), ExtInt::PosInf).into())
        );
        let c: Domain = SemiContiguousRange::with_bounds(ExtInt::Fin(2), ExtInt::PosInf).into();
        assert_eq!(c.merge(&b), Err(DomainError::UnsupportedMerge));
    }

    #[test]
    fn scaling_overflow() {
        let big: Domain = ContiguousRange::new(0, 1 << 62).into();
        assert_eq!(big.copy(4), Err(DomainError::Overflow));
        assert_eq!(big.copy(0), Err(DomainError::ZeroMultiplier));
        assert_eq!(big.copy(-2).unwrap().lb(), ExtInt::Fin(i64::MIN));
        assert_eq!(
            ContiguousRange::new(0, 1 << 62).with_multiplier(3),
            Err(DomainError::Overflow)
        );
        let open: Domain = ContiguousRange::with_bounds(ExtInt::Fin(1), ExtInt::PosInf).into();
        assert_eq!(open.copy(i64::MIN).unwrap().ub(), ExtInt::Fin(i64::MIN));
        assert_eq!(open.copy(i64::MIN).unwrap().copy(-1), Err(DomainError::Overflow));
    }

    #[test]
    fn merge_overflow() {
        let near_max: Domain = ContiguousRange::new(0, i64::MAX - 1).into();
        let small: Domain = ContiguousRange::new(0, 5).into();
        assert_eq!(near_max.merge(&small), Err(DomainError::Overflow));
        let sparse: Domain = EnumeratedSet::new([0, i64::MAX]).into();
        let pair: Domain = EnumeratedSet::new([0, 1]).into();
        assert_eq!(sparse.merge(&pair), Err(DomainError::Overflow));
        let open: Domain =
            ContiguousRange::with_bounds(ExtInt::Fin(i64::MAX - 1), ExtInt::PosInf).into();
        assert_eq!(
            open.merge(&EnumeratedSet::new([2, 5]).into()),
            Err(DomainError::Overflow)
        );
        let full: Domain = ContiguousRange::new(i64::MIN, i64::MAX).into();
        assert_eq!(full.len(), None);
        assert_eq!(full.merge(&pair), Err(DomainError::Overflow));
    }

    #[test]
    fn extreme_ranges() {
        let full: Domain = ContiguousRange::new(i64::MIN, i64::MAX).into();
        assert_eq!(full.search(5), Ok(5));
        assert_eq!(full.index(i64::MAX), Ok(usize::MAX));
        let grid: Domain = ContiguousRange::new(i64::MIN / 2, i64::MAX / 2).into();
        let grid = grid.copy(2).unwrap();
        assert_eq!(grid.search(i64::MAX - 2), Ok(i64::MAX - 1));
        assert_eq!(grid.search(i64::MIN + 1), Ok(i64::MIN + 2));
        let upper: Domain = ContiguousRange::with_bounds(ExtInt::NegInf, ExtInt::Fin(0)).into();
        assert_eq!(upper.copy(3).unwrap().search(i64::MIN), Ok(i64::MIN + 2));
        let free: Domain = ContiguousRange::unbounded().into();
        assert_eq!(free.copy(4).unwrap().search(i64::MAX), Err(DomainError::Overflow));
    }

    #[test]
    fn validation() {
        assert_eq!(Domain::from(ContiguousRange::new(0, 0)).validate(), Ok(()));
        assert_eq!(Domain::from(SemiContiguousRange::new(2, 4)).validate(), Ok(()));
        let inverted = [
            (ExtInt::Fin(5), ExtInt::NegInf),
            (ExtInt::PosInf, ExtInt::PosInf),
            (ExtInt::PosInf, ExtInt::Fin(3)),
            (ExtInt::NegInf, ExtInt::NegInf),
            (ExtInt::Fin(2), ExtInt::Fin(1)),
        ];
        for (lo, hi) in inverted {
            let dom: Domain = ContiguousRange::with_bounds(lo, hi).into();
            assert!(
                matches!(dom.validate(), Err(DomainError::Empty { .. })),
                "[{lo}, {hi}]"
            );
            let semi: Domain = SemiContiguousRange::with_bounds(lo, hi).into();
            assert!(matches!(semi.validate(), Err(DomainError::Empty { .. })));
        }
        assert_eq!(
            Domain::from(EnumeratedSet::new([])).validate(),
            Err(DomainError::Empty {
                lb: ExtInt::PosInf,
                ub: ExtInt::NegInf
            })
        );
    }

    #[test]
    fn display() {
        let dom: Domain = ContiguousRange::new(1, 3).into();
        assert_eq!(format!("{dom}"), "[1, 2, 3]");
        let dom: Domain = ContiguousRange::new(1, 30).into();
        assert_eq!(format!("{dom}"), "[1, 2, 3, 4, 5] ... [26, 27, 28, 29, 30] # 30");
        let dom: Domain = ContiguousRange::unbounded().into();
        assert_eq!(format!("{dom}"), "[...]");
    }
}
