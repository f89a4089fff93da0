//! # Enumerated Sets

use itertools::Itertools;

use super::{DomainError, ValueSet};
use crate::types::ExtInt;

/// An explicit set of integers, scaled by a multiplier. The values are kept
/// sorted and without duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumeratedSet {
    values: Vec<i64>,
    multiplier: i64,
}

impl EnumeratedSet {
    /// Creates a set from arbitrary values
    #[must_use]
    pub fn new<I: IntoIterator<Item = i64>>(values: I) -> Self {
        EnumeratedSet {
            values: values.into_iter().sorted_unstable().dedup().collect(),
            multiplier: 1,
        }
    }

    /// The values before applying the multiplier, in ascending order
    #[must_use]
    pub fn values(&self) -> &[i64] {
        &self.values
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

impl ValueSet for EnumeratedSet {
    fn multiplier(&self) -> i64 {
        self.multiplier
    }

    fn raw_min(&self) -> ExtInt {
        self.values.first().map_or(ExtInt::PosInf, |&v| ExtInt::Fin(v))
    }

    fn raw_max(&self) -> ExtInt {
        self.values.last().map_or(ExtInt::NegInf, |&v| ExtInt::Fin(v))
    }

    fn raw_len(&self) -> Option<usize> {
        Some(self.values.len())
    }

    fn raw_lo_at(&self, k: usize) -> Option<i64> {
        self.values.get(k).copied()
    }

    fn raw_hi_at(&self, k: usize) -> Option<i64> {
        let idx = self.values.len().checked_sub(k + 1)?;
        Some(self.values[idx])
    }

    fn raw_step(&self) -> Option<i64> {
        None
    }
}
