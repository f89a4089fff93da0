//! # Optimization Vector
//!
//! The objective of an instance is a weighted sum of integer variables that
//! is minimized or maximized. Writers that only support minimization use
//! [`Objective::minimize_vector`].

use super::{Error, VarTable};
use crate::types::{
    domain::{ContiguousRange, MERGE_LIMIT},
    Domain, ExtInt, Term,
};

/// The optimization direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Minimize the objective
    #[default]
    Minimize,
    /// Maximize the objective
    Maximize,
}

/// A linear objective
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    terms: Vec<Term>,
    strategy: Strategy,
}

impl Objective {
    /// Creates an empty minimization objective
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term
    pub fn add(&mut self, term: Term) {
        self.terms.push(term);
    }

    /// Sets the optimization direction
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Gets the optimization direction
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Gets the terms as added
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The number of terms
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Checks whether the objective has no terms
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Gets the terms of the equivalent minimization objective, i.e., the
    /// terms with negated weights if the objective is maximized
    #[must_use]
    pub fn minimize_vector(&self) -> Vec<Term> {
        match self.strategy {
            Strategy::Minimize => self.terms.clone(),
            Strategy::Maximize => self.terms.iter().map(|&t| -t).collect(),
        }
    }

    /// Estimates the domain of the objective value. A single term has the
    /// domain of its variable scaled by its weight. For more terms, the term
    /// domains are merged if the product of their sizes is at most
    /// [`MERGE_LIMIT`], otherwise the result is the interval of the summed
    /// bounds. Returns `None` for an empty objective.
    ///
    /// # Errors
    ///
    /// If a variable is unknown or a merge is unsupported.
    pub fn domain(&self, vars: &VarTable) -> Result<Option<Domain>, Error> {
        let doms = self
            .terms
            .iter()
            .map(|&t| vars.term_domain(t))
            .collect::<Result<Vec<_>, _>>()?;
        if doms.len() <= 1 {
            return Ok(doms.into_iter().next());
        }
        let size = doms
            .iter()
            .try_fold(1usize, |acc, dom| acc.checked_mul(dom.len()?));
        if size.is_some_and(|size| size <= MERGE_LIMIT) {
            let mut doms = doms.into_iter();
            let first = crate::utils::unreachable_none!(doms.next());
            return Ok(Some(doms.try_fold(first, |acc, dom| acc.merge(&dom))?));
        }
        let lb: ExtInt = doms.iter().map(Domain::lb).sum();
        let ub: ExtInt = doms.iter().map(Domain::ub).sum();
        Ok(Some(ContiguousRange::with_bounds(lb, ub).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Objective, Strategy};
    use crate::{
        instances::VarTable,
        types::{
            domain::{ContiguousRange, EnumeratedSet},
            ExtInt, Term,
        },
    };

    #[test]
    fn minimize_vector() {
        let mut vars = VarTable::new();
        let x = vars.new_int(ContiguousRange::new(0, 3).into(), false);
        let mut obj = Objective::new();
        obj.add(Term::new(x, 2));
        assert_eq!(obj.minimize_vector(), vec![Term::new(x, 2)]);
        obj.set_strategy(Strategy::Maximize);
        assert_eq!(obj.minimize_vector(), vec![Term::new(x, -2)]);
    }

    #[test]
    fn domain_estimation() {
        let mut vars = VarTable::new();
        let x = vars.new_int(EnumeratedSet::new([0, 5]).into(), false);
        let y = vars.new_int(EnumeratedSet::new([1, 2]).into(), false);
        let big = vars.new_int(ContiguousRange::new(0, 99_999).into(), false);
        let mut obj = Objective::new();
        assert_eq!(obj.domain(&vars), Ok(None));
        obj.add(Term::new(x, -1));
        let dom = obj.domain(&vars).unwrap().unwrap();
        assert_eq!(dom.multiplier(), -1);
        assert_eq!(dom.values_asc(0).unwrap().collect::<Vec<_>>(), vec![-5, 0]);
        obj.add(Term::new(y, 1));
        assert_eq!(
            obj.domain(&vars),
            Ok(Some(EnumeratedSet::new([-4, -3, 1, 2]).into()))
        );
        obj.add(Term::new(big, 1));
        let dom = obj.domain(&vars).unwrap().unwrap();
        assert_eq!(dom.lb(), ExtInt::Fin(-4));
        assert_eq!(dom.ub(), ExtInt::Fin(100_001));
    }
}
