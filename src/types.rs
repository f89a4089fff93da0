//! # Common Types for Order Encoding
//!
//! Common types used throughout the library to guarantee type safety.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, Mul, Neg, Not},
};

pub mod constraints;
pub use constraints::{
    Bool2Int, BoolClause, BoolTerm, Clause, LinearConstraint, OrderLit, Reification, Term,
};

pub mod domain;
pub use domain::Domain;

/// The hash map to use throughout the library
#[cfg(feature = "fxhash")]
pub type RsHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fxhash"))]
pub type RsHashMap<K, V> = std::collections::HashMap<K, V>;

/// The hash set to use throughout the library
#[cfg(feature = "fxhash")]
pub type RsHashSet<V> = rustc_hash::FxHashSet<V>;
#[cfg(not(feature = "fxhash"))]
pub type RsHashSet<V> = std::collections::HashSet<V>;

/// Type representing integer variables. Primary variables are declared by
/// readers, internal variables are introduced by the library (e.g., when
/// splitting a constraint). Both kinds share one index space, which starts
/// at 0 and is dense, so the index can be used to address the variable table.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntVar {
    idx: u32,
    internal: bool,
}

impl IntVar {
    /// Creates a primary integer variable with a given index
    #[must_use]
    pub fn new(idx: u32) -> IntVar {
        IntVar {
            idx,
            internal: false,
        }
    }

    /// Creates an internal (auxiliary) integer variable with a given index
    #[must_use]
    pub fn new_internal(idx: u32) -> IntVar {
        IntVar {
            idx,
            internal: true,
        }
    }

    /// Returns the index of the variable
    #[inline]
    #[must_use]
    pub fn idx(&self) -> usize {
        self.idx as usize
    }

    /// Checks whether the variable was introduced by the library
    #[inline]
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

/// Primary variables print as `x<n>`, internal ones as `s<n>` with `n`
/// starting from 1.
impl fmt::Display for IntVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.internal {
            write!(f, "s{}", self.idx + 1)
        } else {
            write!(f, "x{}", self.idx + 1)
        }
    }
}

/// Creates an [`IntVar`] from an index. Mainly used in tests.
///
/// # Examples
///
/// ```
/// use orderenc::{ivar, types::IntVar};
///
/// assert_eq!(ivar![3], IntVar::new(3));
/// ```
#[macro_export]
macro_rules! ivar {
    ($v:expr) => {
        $crate::types::IntVar::new($v)
    };
}

/// Type representing boolean variables. Boolean variables live in their own
/// index space and have no associated domain.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolVar {
    idx: u32,
    internal: bool,
}

impl BoolVar {
    /// Creates a primary boolean variable with a given index
    #[must_use]
    pub fn new(idx: u32) -> BoolVar {
        BoolVar {
            idx,
            internal: false,
        }
    }

    /// Creates an internal boolean variable with a given index
    #[must_use]
    pub fn new_internal(idx: u32) -> BoolVar {
        BoolVar {
            idx,
            internal: true,
        }
    }

    /// Returns the index of the variable
    #[inline]
    #[must_use]
    pub fn idx(&self) -> usize {
        self.idx as usize
    }

    /// Checks whether the variable was introduced by the library
    #[inline]
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Creates a literal that is not negated
    #[inline]
    #[must_use]
    pub fn pos_lit(self) -> BoolLit {
        BoolLit {
            var: self,
            negated: false,
        }
    }

    /// Creates a negated literal
    #[inline]
    #[must_use]
    pub fn neg_lit(self) -> BoolLit {
        BoolLit {
            var: self,
            negated: true,
        }
    }
}

impl fmt::Display for BoolVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.internal {
            write!(f, "_b{}", self.idx + 1)
        } else {
            write!(f, "b{}", self.idx + 1)
        }
    }
}

/// Creates a primary [`BoolVar`] from an index. Mainly used in tests.
#[macro_export]
macro_rules! bvar {
    ($v:expr) => {
        $crate::types::BoolVar::new($v)
    };
}

/// A possibly negated boolean variable
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolLit {
    var: BoolVar,
    negated: bool,
}

impl BoolLit {
    /// Creates a literal of a variable with a given polarity
    #[must_use]
    pub fn new(var: BoolVar, negated: bool) -> BoolLit {
        BoolLit { var, negated }
    }

    /// Gets the variable of the literal
    #[inline]
    #[must_use]
    pub fn var(&self) -> BoolVar {
        self.var
    }

    /// Checks whether the literal is negated
    #[inline]
    #[must_use]
    pub fn is_neg(&self) -> bool {
        self.negated
    }

    /// Checks whether the literal is not negated
    #[inline]
    #[must_use]
    pub fn is_pos(&self) -> bool {
        !self.negated
    }
}

impl Not for BoolLit {
    type Output = BoolLit;

    fn not(self) -> BoolLit {
        BoolLit {
            var: self.var,
            negated: !self.negated,
        }
    }
}

/// Negated literals carry a `-` prefix
impl fmt::Display for BoolLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "-{}", self.var)
        } else {
            write!(f, "{}", self.var)
        }
    }
}

/// An integer extended with the two infinities. Used for the bounds of
/// domains that are open at one or both ends.
///
/// The derived order puts [`ExtInt::NegInf`] below and [`ExtInt::PosInf`]
/// above every finite value.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug)]
pub enum ExtInt {
    /// Negative infinity
    NegInf,
    /// A finite value
    Fin(i64),
    /// Positive infinity
    PosInf,
}

impl ExtInt {
    /// Checks whether the value is finite
    #[must_use]
    pub fn is_finite(self) -> bool {
        matches!(self, ExtInt::Fin(_))
    }

    /// Gets the finite value, if any
    #[must_use]
    pub fn finite(self) -> Option<i64> {
        match self {
            ExtInt::Fin(val) => Some(val),
            _ => None,
        }
    }

    /// Multiplies the value by a nonzero integer. Infinities flip with the
    /// sign of the factor, finite products outside of `i64` saturate to the
    /// infinity of their sign.
    #[must_use]
    pub fn scale(self, factor: i64) -> ExtInt {
        match (self, self.checked_scale(factor)) {
            (_, Some(val)) => val,
            (ExtInt::Fin(val), None) if (val < 0) == (factor < 0) => ExtInt::PosInf,
            (_, None) => ExtInt::NegInf,
        }
    }

    /// Multiplies the value by a nonzero integer, `None` if a finite product
    /// overflows
    #[must_use]
    pub fn checked_scale(self, factor: i64) -> Option<ExtInt> {
        debug_assert_ne!(factor, 0);
        match self {
            ExtInt::Fin(val) => val.checked_mul(factor).map(ExtInt::Fin),
            inf if factor > 0 => Some(inf),
            inf => Some(-inf),
        }
    }

    /// Adds two values, `None` if a finite sum overflows. Opposite
    /// infinities behave as in [`Add`].
    #[must_use]
    pub fn checked_add(self, rhs: ExtInt) -> Option<ExtInt> {
        match (self, rhs) {
            (ExtInt::Fin(a), ExtInt::Fin(b)) => a.checked_add(b).map(ExtInt::Fin),
            _ => Some(self + rhs),
        }
    }
}

impl From<i64> for ExtInt {
    fn from(value: i64) -> Self {
        ExtInt::Fin(value)
    }
}

impl Neg for ExtInt {
    type Output = ExtInt;

    fn neg(self) -> ExtInt {
        match self {
            ExtInt::NegInf => ExtInt::PosInf,
            ExtInt::Fin(val) => ExtInt::Fin(-val),
            ExtInt::PosInf => ExtInt::NegInf,
        }
    }
}

/// Adding opposite infinities is not meaningful, in that case the left
/// operand wins. Finite sums outside of `i64` saturate to the infinity of
/// their sign.
impl Add for ExtInt {
    type Output = ExtInt;

    fn add(self, rhs: ExtInt) -> ExtInt {
        match (self, rhs) {
            (ExtInt::Fin(a), ExtInt::Fin(b)) => match a.checked_add(b) {
                Some(sum) => ExtInt::Fin(sum),
                None if b > 0 => ExtInt::PosInf,
                None => ExtInt::NegInf,
            },
            (ExtInt::Fin(_), inf) => inf,
            (inf, _) => {
                debug_assert!(rhs.is_finite() || rhs == inf);
                inf
            }
        }
    }
}

impl Add<i64> for ExtInt {
    type Output = ExtInt;

    fn add(self, rhs: i64) -> ExtInt {
        self + ExtInt::Fin(rhs)
    }
}

impl Mul<i64> for ExtInt {
    type Output = ExtInt;

    fn mul(self, rhs: i64) -> ExtInt {
        self.scale(rhs)
    }
}

impl Sum for ExtInt {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ExtInt::Fin(0), |acc, val| acc + val)
    }
}

impl PartialEq<i64> for ExtInt {
    fn eq(&self, other: &i64) -> bool {
        *self == ExtInt::Fin(*other)
    }
}

impl PartialOrd<i64> for ExtInt {
    fn partial_cmp(&self, other: &i64) -> Option<std::cmp::Ordering> {
        Some(self.cmp(&ExtInt::Fin(*other)))
    }
}

impl fmt::Display for ExtInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtInt::NegInf => write!(f, "-inf"),
            ExtInt::Fin(val) => write!(f, "{val}"),
            ExtInt::PosInf => write!(f, "inf"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ExtInt {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtInt::NegInf => serializer.serialize_str("-inf"),
            ExtInt::Fin(val) => serializer.serialize_i64(*val),
            ExtInt::PosInf => serializer.serialize_str("inf"),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ExtInt {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Str(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Int(val) => Ok(ExtInt::Fin(val)),
            Repr::Str(s) => match s.as_str() {
                "inf" | "+inf" => Ok(ExtInt::PosInf),
                "-inf" => Ok(ExtInt::NegInf),
                _ => Err(serde::de::Error::custom(format!(
                    "expected an integer or (-)inf, found `{s}`"
                ))),
            },
        }
    }
}

/// A (partial) assignment of integer and boolean variables. Used to evaluate
/// constraints and clauses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    ints: RsHashMap<IntVar, i64>,
    bools: RsHashMap<BoolVar, bool>,
}

impl Assignment {
    /// Creates an empty assignment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a value to an integer variable
    pub fn assign_int(&mut self, var: IntVar, val: i64) {
        self.ints.insert(var, val);
    }

    /// Assigns a value to a boolean variable
    pub fn assign_bool(&mut self, var: BoolVar, val: bool) {
        self.bools.insert(var, val);
    }

    /// Gets the value of an integer variable
    #[must_use]
    pub fn int_value(&self, var: IntVar) -> Option<i64> {
        self.ints.get(&var).copied()
    }

    /// Gets the value of a boolean variable
    #[must_use]
    pub fn bool_value(&self, var: BoolVar) -> Option<bool> {
        self.bools.get(&var).copied()
    }

    /// Gets the value of a boolean literal
    #[must_use]
    pub fn lit_value(&self, lit: BoolLit) -> Option<bool> {
        self.bool_value(lit.var()).map(|val| val != lit.is_neg())
    }
}

impl FromIterator<(IntVar, i64)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (IntVar, i64)>>(iter: T) -> Self {
        Assignment {
            ints: iter.into_iter().collect(),
            bools: RsHashMap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignment, BoolVar, ExtInt, IntVar};

    #[test]
    fn var_display() {
        assert_eq!(format!("{}", IntVar::new(0)), "x1");
        assert_eq!(format!("{}", IntVar::new_internal(4)), "s5");
        assert_eq!(format!("{}", BoolVar::new(1)), "b2");
        assert_eq!(format!("{}", !BoolVar::new_internal(0).pos_lit()), "-_b1");
    }

    #[test]
    fn ext_int_order() {
        assert!(ExtInt::NegInf < ExtInt::Fin(i64::MIN));
        assert!(ExtInt::Fin(i64::MAX) < ExtInt::PosInf);
        assert!(ExtInt::Fin(3) < 4);
        assert!(ExtInt::PosInf > 4);
    }

    #[test]
    fn ext_int_arith() {
        assert_eq!(ExtInt::Fin(3) * -2, ExtInt::Fin(-6));
        assert_eq!(ExtInt::PosInf * -2, ExtInt::NegInf);
        assert_eq!(ExtInt::Fin(3) + ExtInt::PosInf, ExtInt::PosInf);
        let sum: ExtInt = [ExtInt::Fin(1), ExtInt::Fin(2), ExtInt::NegInf]
            .into_iter()
            .sum();
        assert_eq!(sum, ExtInt::NegInf);
    }

    #[test]
    fn ext_int_saturation() {
        assert_eq!(ExtInt::Fin(1 << 62) * 4, ExtInt::PosInf);
        assert_eq!(ExtInt::Fin(1 << 62) * -4, ExtInt::NegInf);
        assert_eq!(ExtInt::Fin(-(1 << 62)) * -4, ExtInt::PosInf);
        assert_eq!(ExtInt::Fin(1 << 62).checked_scale(4), None);
        assert_eq!(ExtInt::PosInf.checked_scale(-4), Some(ExtInt::NegInf));
        assert_eq!(ExtInt::Fin(i64::MAX - 1) + 5, ExtInt::PosInf);
        assert_eq!(ExtInt::Fin(i64::MIN + 1) + -5, ExtInt::NegInf);
        assert_eq!(ExtInt::Fin(i64::MAX - 1).checked_add(ExtInt::Fin(5)), None);
        assert_eq!(
            ExtInt::Fin(i64::MAX).checked_add(ExtInt::NegInf),
            Some(ExtInt::NegInf)
        );
    }

    #[test]
    fn assignment_lits() {
        let mut assign = Assignment::new();
        assign.assign_bool(BoolVar::new(0), true);
        assert_eq!(assign.lit_value(BoolVar::new(0).pos_lit()), Some(true));
        assert_eq!(assign.lit_value(BoolVar::new(0).neg_lit()), Some(false));
        assert_eq!(assign.lit_value(BoolVar::new(1).neg_lit()), None);
    }
}
