//! # Constraint Types
//!
//! The canonical [`LinearConstraint`] `Σ w·x >= bound` that all relational
//! constraints are normalized to, and the [`Clause`] type over
//! [`OrderLit`]s that the order encoding produces. Boolean pass-through
//! clauses ([`BoolClause`]) and boolean-to-integer links ([`Bool2Int`]) are
//! recorded by an instance but not encoded.

use std::{fmt, ops};

use itertools::Itertools;
use thiserror::Error;

use super::{Assignment, BoolLit, BoolVar, IntVar, RsHashSet};

/// A weighted integer variable
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// The variable
    pub var: IntVar,
    /// The (nonzero) weight
    pub weight: i64,
}

/// Error returned when a weight is not an integer
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("weight {0} is not an integer")]
pub struct NonIntegralWeight(pub f64);

impl Term {
    /// Creates a new term
    #[must_use]
    pub fn new(var: IntVar, weight: i64) -> Self {
        Term { var, weight }
    }

    /// Creates a term from a floating point weight as it appears in LP files
    ///
    /// # Errors
    ///
    /// If the weight is not finite or has a fractional part.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn try_from_f64(var: IntVar, weight: f64) -> Result<Self, NonIntegralWeight> {
        if !weight.is_finite()
            || weight.fract() != 0.
            || weight < i64::MIN as f64
            || weight >= i64::MAX as f64
        {
            return Err(NonIntegralWeight(weight));
        }
        Ok(Term::new(var, weight as i64))
    }

    /// The term with negated weight, `None` if the weight is `i64::MIN`
    #[must_use]
    pub fn checked_neg(self) -> Option<Term> {
        Some(Term {
            var: self.var,
            weight: self.weight.checked_neg()?,
        })
    }
}

impl From<(IntVar, i64)> for Term {
    fn from((var, weight): (IntVar, i64)) -> Self {
        Term { var, weight }
    }
}

impl ops::Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term {
            var: self.var,
            weight: -self.weight,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.var, self.weight)
    }
}

/// Links the truth of a constraint to a boolean variable. The literal of the
/// reification is added as a disjunct to every clause of the constraint's
/// encoding, the constraint is therefore enforced whenever this literal is
/// false.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reification {
    /// The boolean variable
    pub var: BoolVar,
    /// The polarity of the variable in the reification literal
    pub polarity: bool,
}

impl Reification {
    /// Creates a new reification
    #[must_use]
    pub fn new(var: BoolVar, polarity: bool) -> Self {
        Reification { var, polarity }
    }

    /// The literal that is added to every clause
    #[must_use]
    pub fn lit(&self) -> BoolLit {
        BoolLit::new(self.var, !self.polarity)
    }
}

/// A linear constraint in canonical form `Σ w·x >= bound`, optionally
/// reified.
#[derive(Eq, PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraint {
    terms: Vec<Term>,
    bound: i64,
    reified: Option<Reification>,
}

impl LinearConstraint {
    /// Creates a new unreified constraint
    #[must_use]
    pub fn new(terms: Vec<Term>, bound: i64) -> Self {
        LinearConstraint {
            terms,
            bound,
            reified: None,
        }
    }

    /// Sets or clears the reification of the constraint
    #[must_use]
    pub fn with_reification(mut self, reified: Option<Reification>) -> Self {
        self.reified = reified;
        self
    }

    /// The weighted terms
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The lower bound of the sum
    #[must_use]
    pub fn bound(&self) -> i64 {
        self.bound
    }

    /// The reification, if any
    #[must_use]
    pub fn reification(&self) -> Option<Reification> {
        self.reified
    }

    /// The number of terms
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Checks whether the constraint has no terms
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Gets the variables of the constraint
    pub fn vars(&self) -> impl Iterator<Item = IntVar> + '_ {
        self.terms.iter().map(|t| t.var)
    }

    /// Evaluates the constraint under an assignment. A reified constraint is
    /// also satisfied if its reification literal is true. Returns `None` if a
    /// needed variable is unassigned.
    #[must_use]
    pub fn evaluate(&self, assign: &Assignment) -> Option<bool> {
        let sum = self
            .terms
            .iter()
            .map(|t| Some(i128::from(t.weight) * i128::from(assign.int_value(t.var)?)))
            .sum::<Option<i128>>()?;
        let holds = sum >= i128::from(self.bound);
        match self.reified {
            Some(reif) if !holds => assign.lit_value(reif.lit()),
            _ => Some(holds),
        }
    }
}

/// Prints as `[(x1, 3), (x2, -1)] >= 7`, reified constraints are followed by
/// `<-> b1` or `<-> -b1`
impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] >= {}", self.terms.iter().format(", "), self.bound)?;
        if let Some(reif) = self.reified {
            if reif.polarity {
                write!(f, " <-> {}", reif.var)?;
            } else {
                write!(f, " <-> -{}", reif.var)?;
            }
        }
        Ok(())
    }
}

/// A literal of the order encoding
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderLit {
    /// A constant
    Const(bool),
    /// The order literal `var >= value`, or `var < value` if negated. `value`
    /// is a value of the variable's domain. `approx` marks literals for which
    /// the requested threshold was not in the domain and got rounded up.
    Ge {
        /// The integer variable
        var: IntVar,
        /// The domain value
        value: i64,
        /// Whether the literal is negated
        negated: bool,
        /// Whether `value` was rounded up from the requested threshold
        approx: bool,
    },
    /// An untranslated literal `var >= threshold`, or `var < threshold` if
    /// negated. In extrema-preserving mode `rounded` holds the domain value
    /// the threshold rounds up to.
    Raw {
        /// The integer variable
        var: IntVar,
        /// The requested threshold
        threshold: i64,
        /// Whether the literal is negated
        negated: bool,
        /// The smallest domain value at least `threshold`
        rounded: Option<i64>,
    },
    /// A boolean literal, used for reifications
    Bool(BoolLit),
}

impl OrderLit {
    /// Evaluates the literal under an assignment. Returns `None` if the
    /// variable is unassigned.
    #[must_use]
    pub fn evaluate(&self, assign: &Assignment) -> Option<bool> {
        match *self {
            OrderLit::Const(val) => Some(val),
            OrderLit::Ge {
                var,
                value: threshold,
                negated,
                ..
            }
            | OrderLit::Raw {
                var,
                threshold,
                negated,
                ..
            } => assign.int_value(var).map(|val| (val >= threshold) != negated),
            OrderLit::Bool(lit) => assign.lit_value(lit),
        }
    }

    /// Checks whether the literal is a constant of a given value
    #[must_use]
    pub fn is_const(&self, val: bool) -> bool {
        *self == OrderLit::Const(val)
    }

    /// Gets the complement of the literal, ignoring annotations
    fn complement(&self) -> OrderLit {
        match *self {
            OrderLit::Const(val) => OrderLit::Const(!val),
            OrderLit::Ge {
                var,
                value,
                negated,
                approx,
            } => OrderLit::Ge {
                var,
                value,
                negated: !negated,
                approx,
            },
            OrderLit::Raw {
                var,
                threshold,
                negated,
                rounded,
            } => OrderLit::Raw {
                var,
                threshold,
                negated: !negated,
                rounded,
            },
            OrderLit::Bool(lit) => OrderLit::Bool(!lit),
        }
    }
}

impl From<BoolLit> for OrderLit {
    fn from(value: BoolLit) -> Self {
        OrderLit::Bool(value)
    }
}

impl fmt::Display for OrderLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderLit::Const(val) => write!(f, "{val}"),
            OrderLit::Ge {
                var,
                value,
                negated,
                ..
            } => write!(f, "{}{var}>={value}", if *negated { "-" } else { "" }),
            OrderLit::Raw {
                var,
                threshold,
                negated,
                ..
            } => write!(f, "({negated}, {var}, {threshold})"),
            OrderLit::Bool(lit) => write!(f, "{lit}"),
        }
    }
}

/// Type representing a clause over order literals.
/// Wrapper around a std collection to allow for changing the data structure.
#[derive(PartialEq, Eq, Clone, Default, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clause {
    lits: Vec<OrderLit>,
}

impl Clause {
    /// Creates a new empty clause
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty clause with at least the specified capacity.
    ///
    /// Uses [`Vec::with_capacity`] internally.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lits: Vec::with_capacity(capacity),
        }
    }

    /// Adds a literal to the clause
    pub fn add(&mut self, lit: OrderLit) {
        self.lits.push(lit);
    }

    /// Gets the length of the clause
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Checks if the clause is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// Gets an iterator over the clause
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, OrderLit> {
        self.lits.iter()
    }

    /// Evaluates the clause under an assignment. The clause is satisfied if
    /// one literal is true, falsified if all literals are false and
    /// undetermined (`None`) otherwise.
    #[must_use]
    pub fn evaluate(&self, assign: &Assignment) -> Option<bool> {
        let mut undetermined = false;
        for lit in &self.lits {
            match lit.evaluate(assign) {
                Some(true) => return Some(true),
                Some(false) => (),
                None => undetermined = true,
            }
        }
        if undetermined {
            None
        } else {
            Some(false)
        }
    }

    /// Simplifies the clause. This removes constant false and duplicate
    /// literals and removes the entire clause if it is a tautology, i.e.,
    /// contains a constant true literal or a literal and its complement. The
    /// order of the remaining literals is preserved.
    #[must_use]
    pub fn simplify(mut self) -> Option<Self> {
        let mut seen = RsHashSet::default();
        let mut idx = 0;
        while idx < self.len() {
            let lit = self.lits[idx];
            if lit.is_const(true) || seen.contains(&strip(lit.complement())) {
                return None;
            }
            if lit.is_const(false) || !seen.insert(strip(lit)) {
                self.lits.remove(idx);
            } else {
                idx += 1;
            }
        }
        Some(self)
    }
}

/// Removes annotations so that literals can be compared logically
fn strip(lit: OrderLit) -> OrderLit {
    match lit {
        OrderLit::Ge {
            var,
            value,
            negated,
            ..
        } => OrderLit::Ge {
            var,
            value,
            negated,
            approx: false,
        },
        OrderLit::Raw {
            var,
            threshold,
            negated,
            ..
        } => OrderLit::Raw {
            var,
            threshold,
            negated,
            rounded: None,
        },
        lit => lit,
    }
}

impl ops::Index<usize> for Clause {
    type Output = OrderLit;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.lits[index]
    }
}

impl IntoIterator for Clause {
    type Item = OrderLit;

    type IntoIter = std::vec::IntoIter<OrderLit>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.lits.into_iter()
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a OrderLit;

    type IntoIter = std::slice::Iter<'a, OrderLit>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.lits.iter()
    }
}

impl FromIterator<OrderLit> for Clause {
    fn from_iter<T: IntoIterator<Item = OrderLit>>(iter: T) -> Self {
        Self {
            lits: Vec::from_iter(iter),
        }
    }
}

impl Extend<OrderLit> for Clause {
    fn extend<T: IntoIterator<Item = OrderLit>>(&mut self, iter: T) {
        self.lits.extend(iter);
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().format(", "))
    }
}

/// Creates a clause from a list of order literals
#[macro_export]
macro_rules! clause {
    () => {
        $crate::types::Clause::new()
    };
    ( $($l:expr),* ) => {
        {
            let mut clause = $crate::types::Clause::new();
            $(
                clause.add($l);
            )*
            clause
        }
    };
}

/// A clause over boolean literals, passed through to writers unchanged
pub type BoolClause = Vec<BoolLit>;

/// The boolean side of a [`Bool2Int`] link
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolTerm {
    /// A boolean variable
    Var(BoolVar),
    /// A constant
    Const(bool),
}

impl fmt::Display for BoolTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolTerm::Var(var) => write!(f, "{var}"),
            BoolTerm::Const(val) => write!(f, "{}", u8::from(*val)),
        }
    }
}

/// States that an integer variable is 1 if the boolean is true and 0
/// otherwise
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bool2Int {
    /// The boolean side
    pub boolean: BoolTerm,
    /// The integer side
    pub int: IntVar,
}

#[cfg(test)]
mod tests {
    use super::{
        Bool2Int, BoolTerm, Clause, LinearConstraint, NonIntegralWeight, OrderLit, Reification,
        Term,
    };
    use crate::{
        bvar, ivar,
        types::{Assignment, BoolVar},
    };

    fn ge(var: u32, value: i64, negated: bool) -> OrderLit {
        OrderLit::Ge {
            var: ivar![var],
            value,
            negated,
            approx: false,
        }
    }

    #[test]
    fn constraint_display() {
        let constr = LinearConstraint::new(vec![Term::new(ivar![0], 3)], 7)
            .with_reification(Some(Reification::new(bvar![0], true)));
        assert_eq!(format!("{constr}"), "[(x1, 3)] >= 7 <-> b1");
        let constr = LinearConstraint::new(vec![(ivar![0], 1).into(), (ivar![1], -2).into()], 0);
        assert_eq!(format!("{constr}"), "[(x1, 1), (x2, -2)] >= 0");
    }

    #[test]
    fn constraint_evaluate() {
        let constr = LinearConstraint::new(vec![(ivar![0], 2).into(), (ivar![1], -1).into()], 3);
        let assign: Assignment = [(ivar![0], 2), (ivar![1], 1)].into_iter().collect();
        assert_eq!(constr.evaluate(&assign), Some(true));
        let assign: Assignment = [(ivar![0], 1), (ivar![1], 1)].into_iter().collect();
        assert_eq!(constr.evaluate(&assign), Some(false));
        let mut assign = assign;
        let constr = constr.with_reification(Some(Reification::new(bvar![0], false)));
        assert_eq!(constr.evaluate(&assign), None);
        assign.assign_bool(bvar![0], false);
        assert_eq!(constr.evaluate(&assign), Some(true));
        assign.assign_bool(bvar![0], true);
        assert_eq!(constr.evaluate(&assign), Some(false));
    }

    #[test]
    fn evaluate_large_values() {
        let constr = LinearConstraint::new(
            vec![(ivar![0], 4).into(), (ivar![1], -4).into()],
            i64::MAX,
        );
        let assign: Assignment = [(ivar![0], 1 << 61), (ivar![1], -(1 << 61))]
            .into_iter()
            .collect();
        assert_eq!(constr.evaluate(&assign), Some(true));
        let assign: Assignment = [(ivar![0], 1 << 61), (ivar![1], 1 << 61)]
            .into_iter()
            .collect();
        assert_eq!(constr.evaluate(&assign), Some(false));
    }

    #[test]
    fn term_negation() {
        assert_eq!(
            Term::new(ivar![0], 3).checked_neg(),
            Some(Term::new(ivar![0], -3))
        );
        assert_eq!(Term::new(ivar![0], i64::MIN).checked_neg(), None);
    }

    #[test]
    fn reification_lit() {
        assert!(Reification::new(bvar![2], true).lit().is_pos());
        assert!(Reification::new(bvar![2], false).lit().is_neg());
    }

    #[test]
    fn clause_evaluate() {
        let cl = clause![ge(0, 3, false), ge(1, 2, true)];
        let assign: Assignment = [(ivar![0], 1), (ivar![1], 2)].into_iter().collect();
        assert_eq!(cl.evaluate(&assign), Some(false));
        let assign: Assignment = [(ivar![0], 1), (ivar![1], 1)].into_iter().collect();
        assert_eq!(cl.evaluate(&assign), Some(true));
        let assign: Assignment = [(ivar![1], 2)].into_iter().collect();
        assert_eq!(cl.evaluate(&assign), None);
    }

    #[test]
    fn clause_simplify() {
        let cl = clause![
            OrderLit::Const(false),
            ge(0, 3, false),
            ge(0, 3, false),
            OrderLit::Bool(BoolVar::new(0).pos_lit())
        ];
        assert_eq!(
            cl.simplify(),
            Some(clause![ge(0, 3, false), OrderLit::Bool(BoolVar::new(0).pos_lit())])
        );
        let taut = clause![ge(0, 3, false), ge(1, 1, false), ge(0, 3, true)];
        assert_eq!(taut.simplify(), None);
        let taut = clause![ge(0, 3, false), OrderLit::Const(true)];
        assert_eq!(taut.simplify(), None);
        assert_eq!(clause![OrderLit::Const(false)].simplify(), Some(Clause::new()));
    }

    #[test]
    fn float_weights() {
        assert_eq!(Term::try_from_f64(ivar![0], -3.0), Ok(Term::new(ivar![0], -3)));
        assert_eq!(
            Term::try_from_f64(ivar![0], 1.5),
            Err(NonIntegralWeight(1.5))
        );
        assert!(Term::try_from_f64(ivar![0], f64::NAN).is_err());
    }

    #[test]
    fn link_display() {
        let link = Bool2Int {
            boolean: BoolTerm::Const(true),
            int: ivar![1],
        };
        assert_eq!(format!("{} -> {}", link.boolean, link.int), "1 -> x2");
    }
}
