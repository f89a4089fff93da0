//! # Constraint Problem Instances
//!
//! The [`CspInstance`] holds everything a reader produces: the variable
//! table, canonical constraints, boolean pass-through clauses, boolean to
//! integer links and an optimization vector. Relational constraints added to
//! the instance are normalized to the canonical form `Σ w·x >= bound`.

use thiserror::Error;

use crate::types::{
    constraints::NonIntegralWeight, domain::DomainError, BoolVar, Domain, IntVar, Term,
};

mod csp;
pub use csp::{CspInstance, NormalizerConfig, SplitStrategy, Stats, MAX_TERMS};

mod opt;
pub use opt::{Objective, Strategy};

pub mod fio;
pub use fio::{DomainArg, DomainRecord, InstanceRecord};

/// Errors from building an instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An integer variable is not in the variable table
    #[error("unknown integer variable {0}")]
    UnknownVariable(IntVar),
    /// A boolean variable is not in the variable table
    #[error("unknown boolean variable {0}")]
    UnknownBooleanVariable(BoolVar),
    /// A value has the wrong type, e.g., a fractional weight
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A constraint got too few arguments
    #[error("{what} needs at least {min} arguments, got {got}")]
    Arity {
        /// The constraint
        what: &'static str,
        /// The minimum number of arguments
        min: usize,
        /// The number of arguments given
        got: usize,
    },
    /// A term has weight zero
    #[error("term with variable {0} has weight 0")]
    ZeroWeight(IntVar),
    /// A domain operation failed
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<NonIntegralWeight> for Error {
    fn from(value: NonIntegralWeight) -> Self {
        Error::TypeMismatch(value.to_string())
    }
}

/// The variable table of an instance. Integer variables map to their
/// [`Domain`], boolean variables have no domain. Primary and internal
/// variables share one index space per kind, indices are assigned in order
/// of creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VarTable {
    ints: Vec<(bool, Domain)>,
    bools: Vec<bool>,
}

impl VarTable {
    /// Creates an empty variable table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new integer variable
    #[allow(clippy::cast_possible_truncation)]
    pub fn new_int(&mut self, domain: Domain, internal: bool) -> IntVar {
        debug_assert!(u32::try_from(self.ints.len()).is_ok());
        let idx = self.ints.len() as u32;
        self.ints.push((internal, domain));
        if internal {
            IntVar::new_internal(idx)
        } else {
            IntVar::new(idx)
        }
    }

    /// Adds a new boolean variable
    #[allow(clippy::cast_possible_truncation)]
    pub fn new_bool(&mut self, internal: bool) -> BoolVar {
        debug_assert!(u32::try_from(self.bools.len()).is_ok());
        let idx = self.bools.len() as u32;
        self.bools.push(internal);
        if internal {
            BoolVar::new_internal(idx)
        } else {
            BoolVar::new(idx)
        }
    }

    /// Gets the domain of an integer variable
    #[must_use]
    pub fn domain(&self, var: IntVar) -> Option<&Domain> {
        match self.ints.get(var.idx()) {
            Some((internal, dom)) if *internal == var.is_internal() => Some(dom),
            _ => None,
        }
    }

    /// Gets the domain of a weighted term, i.e., the domain of the variable
    /// scaled by the weight
    ///
    /// # Errors
    ///
    /// If the variable is unknown, the weight is zero or a scaled bound
    /// overflows.
    pub fn term_domain(&self, term: Term) -> Result<Domain, Error> {
        if term.weight == 0 {
            return Err(Error::ZeroWeight(term.var));
        }
        let dom = self
            .domain(term.var)
            .ok_or(Error::UnknownVariable(term.var))?;
        Ok(dom.copy(term.weight)?)
    }

    /// Checks whether a boolean variable is in the table
    #[must_use]
    pub fn contains_bool(&self, var: BoolVar) -> bool {
        self.bools.get(var.idx()) == Some(&var.is_internal())
    }

    /// The number of integer variables
    #[must_use]
    pub fn n_ints(&self) -> usize {
        self.ints.len()
    }

    /// The number of boolean variables
    #[must_use]
    pub fn n_bools(&self) -> usize {
        self.bools.len()
    }

    /// Iterates over the integer variables and their domains
    pub fn iter_ints(&self) -> impl Iterator<Item = (IntVar, &Domain)> + '_ {
        self.ints.iter().zip(0u32..).map(|((internal, dom), idx)| {
            if *internal {
                (IntVar::new_internal(idx), dom)
            } else {
                (IntVar::new(idx), dom)
            }
        })
    }

    /// Iterates over the boolean variables
    pub fn iter_bools(&self) -> impl Iterator<Item = BoolVar> + '_ {
        self.bools.iter().zip(0u32..).map(|(internal, idx)| {
            if *internal {
                BoolVar::new_internal(idx)
            } else {
                BoolVar::new(idx)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, VarTable};
    use crate::types::{domain::ContiguousRange, BoolVar, IntVar, Term};

    #[test]
    fn shared_index_space() {
        let mut vars = VarTable::new();
        let x = vars.new_int(ContiguousRange::new(0, 1).into(), false);
        let s = vars.new_int(ContiguousRange::new(0, 2).into(), true);
        let y = vars.new_int(ContiguousRange::new(0, 3).into(), false);
        assert_eq!(x, IntVar::new(0));
        assert_eq!(s, IntVar::new_internal(1));
        assert_eq!(y, IntVar::new(2));
        assert!(vars.domain(IntVar::new(1)).is_none());
        assert_eq!(vars.domain(s), Some(&ContiguousRange::new(0, 2).into()));
        assert_eq!(
            vars.iter_ints().map(|(var, _)| var).collect::<Vec<_>>(),
            vec![x, s, y]
        );
    }

    #[test]
    fn bools() {
        let mut vars = VarTable::new();
        let b = vars.new_bool(false);
        let r = vars.new_bool(true);
        assert!(vars.contains_bool(b));
        assert!(vars.contains_bool(r));
        assert!(!vars.contains_bool(BoolVar::new(1)));
        assert!(!vars.contains_bool(BoolVar::new(2)));
    }

    #[test]
    fn term_domains() {
        let mut vars = VarTable::new();
        let x = vars.new_int(ContiguousRange::new(0, 2).into(), false);
        let dom = vars.term_domain(Term::new(x, -2)).unwrap();
        assert_eq!(dom.values_asc(0).unwrap().collect::<Vec<_>>(), vec![-4, -2, 0]);
        assert_eq!(
            vars.term_domain(Term::new(x, 0)),
            Err(Error::ZeroWeight(x))
        );
        assert_eq!(
            vars.term_domain(Term::new(IntVar::new(5), 1)),
            Err(Error::UnknownVariable(IntVar::new(5)))
        );
    }
}
