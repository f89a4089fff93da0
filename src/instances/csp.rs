//! # Finite-Domain Constraint Instances
//!
//! The [`CspInstance`] normalizes relational constraints to the canonical
//! form `Σ w·x >= bound`. Long constraints can optionally be split into
//! chains of constraints with at most [`MAX_TERMS`] terms over auxiliary
//! sum variables, which keeps the order encoding of each piece small.

use itertools::Itertools;

use super::{Error, Objective, Strategy, VarTable};
use crate::types::{
    domain::DomainError, Bool2Int, BoolClause, BoolLit, BoolTerm, BoolVar, Domain, IntVar,
    LinearConstraint, Reification, Term,
};
use crate::utils::unreachable_none;

/// Constraints with more terms than this are split if splitting is enabled
pub const MAX_TERMS: usize = 3;

const OVERFLOW: Error = Error::Domain(DomainError::Overflow);

/// Negates the weights of all terms
fn negated(terms: impl IntoIterator<Item = Term>) -> Result<Vec<Term>, Error> {
    terms
        .into_iter()
        .map(|t| t.checked_neg().ok_or(OVERFLOW))
        .collect()
}

/// How constraints with more than [`MAX_TERMS`] terms are split
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitStrategy {
    /// Constraints are kept as they are
    #[default]
    None,
    /// The two trailing terms are repeatedly replaced by an auxiliary
    /// variable that is constrained to equal their sum
    EqualityChain,
    /// A chain of auxiliary variables bounds the prefix sums of the terms
    /// from above, the last one is then bounded by the target
    PrefixSum,
}

/// Options for normalizing constraints
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizerConfig {
    /// The split strategy for long constraints
    pub split: SplitStrategy,
}

impl NormalizerConfig {
    /// Sets the split strategy
    #[must_use]
    pub fn with_split(mut self, split: SplitStrategy) -> Self {
        self.split = split;
        self
    }
}

/// Size statistics of an instance
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// The number of integer variables, including internal ones
    pub n_ints: usize,
    /// The number of internal integer variables
    pub n_internal_ints: usize,
    /// The number of boolean variables, including internal ones
    pub n_bools: usize,
    /// Whether the instance has domains with open bounds
    pub unbounded_domains: bool,
    /// The number of canonical constraints
    pub n_constraints: usize,
    /// Average number of terms per constraint
    pub avg_constraint_len: f64,
    /// Maximum number of terms per constraint
    pub max_constraint_len: usize,
    /// Median number of terms per constraint
    pub median_constraint_len: usize,
    /// Average domain size, `None` if a domain is unbounded
    pub avg_domain_size: Option<f64>,
    /// Median domain size, `None` if a domain is unbounded
    pub median_domain_size: Option<usize>,
    /// The number of boolean pass-through clauses
    pub n_clauses: usize,
    /// The number of boolean to integer links
    pub n_links: usize,
    /// The number of terms in the optimization vector
    pub n_objective_terms: usize,
}

#[allow(clippy::cast_precision_loss)]
fn avg_median(mut vals: Vec<usize>) -> Option<(f64, usize)> {
    if vals.is_empty() {
        return None;
    }
    vals.sort_unstable();
    let avg = vals.iter().sum::<usize>() as f64 / vals.len() as f64;
    Some((avg, vals[vals.len() / 2]))
}

/// A constraint problem instance. Constraints are added with the `add_*`
/// methods, which return the index of the last canonical constraint they
/// appended.
///
/// ```
/// use orderenc::{instances::CspInstance, types::domain::ContiguousRange};
///
/// let mut inst = CspInstance::new();
/// let x = inst.new_int_variable(ContiguousRange::new(0, 5).into()).unwrap();
/// let y = inst.new_int_variable(ContiguousRange::new(0, 5).into()).unwrap();
/// assert_eq!(inst.add_eq([(x, 1), (y, -1)], 2).unwrap(), 1);
/// assert_eq!(format!("{}", inst.constraints()[1]), "[(x1, -1), (x2, 1)] >= -2");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CspInstance {
    name: Option<String>,
    vars: VarTable,
    constraints: Vec<LinearConstraint>,
    clauses: Vec<BoolClause>,
    links: Vec<Bool2Int>,
    objective: Objective,
    config: NormalizerConfig,
    unbounded: bool,
}

impl CspInstance {
    /// Creates an empty instance that does not split constraints
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty instance with the given options
    #[must_use]
    pub fn with_config(config: NormalizerConfig) -> Self {
        CspInstance {
            config,
            ..Self::default()
        }
    }

    /// Gets the normalization options
    #[must_use]
    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    /// Sets the instance name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = Some(name.into());
    }

    /// Gets the instance name
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Marks the instance as having unbounded domains. This happens
    /// automatically when a variable with an open domain is declared.
    pub fn mark_unbounded(&mut self) {
        self.unbounded = true;
    }

    /// Checks whether the instance has unbounded domains
    #[must_use]
    pub fn has_unbounded_domains(&self) -> bool {
        self.unbounded
    }

    /// Declares a new integer variable
    ///
    /// # Errors
    ///
    /// If the domain has no values, see [`Domain::validate`].
    pub fn new_int_variable(&mut self, domain: Domain) -> Result<IntVar, Error> {
        self.declare_int(domain, false)
    }

    fn declare_int(&mut self, domain: Domain, internal: bool) -> Result<IntVar, Error> {
        domain.validate()?;
        if domain.has_open_bound() {
            self.unbounded = true;
        }
        Ok(self.vars.new_int(domain, internal))
    }

    /// Declares a new boolean variable
    pub fn new_bool_variable(&mut self) -> BoolVar {
        self.vars.new_bool(false)
    }

    /// Gets the variable table
    #[must_use]
    pub fn domains(&self) -> &VarTable {
        &self.vars
    }

    /// Gets the canonical constraints
    #[must_use]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Gets the boolean pass-through clauses
    #[must_use]
    pub fn clauses(&self) -> &[BoolClause] {
        &self.clauses
    }

    /// Gets the boolean to integer links
    #[must_use]
    pub fn links(&self) -> &[Bool2Int] {
        &self.links
    }

    /// Gets the optimization vector
    #[must_use]
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    fn check_terms(&self, terms: &[Term]) -> Result<(), Error> {
        for term in terms {
            if self.vars.domain(term.var).is_none() {
                return Err(Error::UnknownVariable(term.var));
            }
            if term.weight == 0 {
                return Err(Error::ZeroWeight(term.var));
            }
        }
        Ok(())
    }

    /// Adds the constraint `Σ terms >= bound`
    ///
    /// # Errors
    ///
    /// If a variable is unknown, a weight is zero or splitting requires an
    /// unsupported domain merge or overflows.
    pub fn add_ge<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
    ) -> Result<usize, Error> {
        let terms = terms.into_iter().map(Into::into).collect_vec();
        self.check_terms(&terms)?;
        self.push_ge(terms, bound, None)
    }

    /// Adds the constraint `Σ terms >= bound` reified by a boolean
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_ge`], or if the reification variable is unknown.
    pub fn add_reified_ge<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
        reified: Reification,
    ) -> Result<usize, Error> {
        let terms = terms.into_iter().map(Into::into).collect_vec();
        self.check_terms(&terms)?;
        if !self.vars.contains_bool(reified.var) {
            return Err(Error::UnknownBooleanVariable(reified.var));
        }
        self.push_ge(terms, bound, Some(reified))
    }

    /// Adds the constraint `Σ terms <= bound`
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_ge`], or if a weight or the bound is `i64::MIN`.
    pub fn add_le<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
    ) -> Result<usize, Error> {
        let terms = negated(terms.into_iter().map(Into::into))?;
        self.add_ge(terms, bound.checked_neg().ok_or(OVERFLOW)?)
    }

    /// Adds the constraint `Σ terms <= bound` reified by a boolean
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_reified_ge`], or if a weight or the bound is
    /// `i64::MIN`.
    pub fn add_reified_le<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
        reified: Reification,
    ) -> Result<usize, Error> {
        let terms = negated(terms.into_iter().map(Into::into))?;
        self.add_reified_ge(terms, bound.checked_neg().ok_or(OVERFLOW)?, reified)
    }

    /// Adds the constraint `Σ terms > bound`
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_ge`], or if the bound is `i64::MAX`.
    pub fn add_gt<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
    ) -> Result<usize, Error> {
        self.add_ge(terms, bound.checked_add(1).ok_or(OVERFLOW)?)
    }

    /// Adds the constraint `Σ terms < bound`
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_ge`], or if a weight or the bound minus one is
    /// `i64::MIN`.
    pub fn add_lt<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
    ) -> Result<usize, Error> {
        let terms = negated(terms.into_iter().map(Into::into))?;
        self.add_ge(terms, 1i64.checked_sub(bound).ok_or(OVERFLOW)?)
    }

    /// Adds the constraint `Σ terms = bound` as two inequalities
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_le`].
    pub fn add_eq<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
    ) -> Result<usize, Error> {
        let terms = terms.into_iter().map(Into::into).collect_vec();
        self.check_terms(&terms)?;
        self.push_eq(terms, bound)
    }

    fn push_eq(&mut self, terms: Vec<Term>, bound: i64) -> Result<usize, Error> {
        let neg_terms = negated(terms.iter().copied())?;
        let neg_bound = bound.checked_neg().ok_or(OVERFLOW)?;
        self.push_ge(terms, bound, None)?;
        self.push_ge(neg_terms, neg_bound, None)
    }

    /// Adds the constraint `Σ terms != bound`. A fresh internal boolean `r`
    /// selects which of `Σ terms > bound` and `Σ terms < bound` holds.
    ///
    /// # Errors
    ///
    /// As [`CspInstance::add_gt`] and [`CspInstance::add_lt`].
    pub fn add_ne<T: Into<Term>>(
        &mut self,
        terms: impl IntoIterator<Item = T>,
        bound: i64,
    ) -> Result<usize, Error> {
        let terms = terms.into_iter().map(Into::into).collect_vec();
        self.check_terms(&terms)?;
        let neg_terms = negated(terms.iter().copied())?;
        let above = bound.checked_add(1).ok_or(OVERFLOW)?;
        let below = 1i64.checked_sub(bound).ok_or(OVERFLOW)?;
        let r = self.vars.new_bool(true);
        self.push_ge(terms, above, Some(Reification::new(r, true)))?;
        self.push_ge(neg_terms, below, Some(Reification::new(r, false)))
    }

    /// Adds the constraint that all variables take pairwise different
    /// values. Each pair gets a fresh internal boolean selecting the
    /// direction of the strict inequality, so the number of constraints is
    /// quadratic in the number of variables.
    ///
    /// # Errors
    ///
    /// If less than two variables are given or a variable is unknown.
    pub fn add_alldifferent(&mut self, vars: &[IntVar]) -> Result<usize, Error> {
        if vars.len() < 2 {
            return Err(Error::Arity {
                what: "alldifferent",
                min: 2,
                got: vars.len(),
            });
        }
        if let Some(&var) = vars.iter().find(|&&var| self.vars.domain(var).is_none()) {
            return Err(Error::UnknownVariable(var));
        }
        let mut last = 0;
        for (&vi, &vj) in vars.iter().tuple_combinations() {
            let r = self.vars.new_bool(true);
            self.push_ge(
                vec![Term::new(vi, 1), Term::new(vj, -1)],
                1,
                Some(Reification::new(r, true)),
            )?;
            last = self.push_ge(
                vec![Term::new(vi, -1), Term::new(vj, 1)],
                1,
                Some(Reification::new(r, false)),
            )?;
        }
        Ok(last)
    }

    /// Links a boolean to an integer variable, stating that the integer is 1
    /// if the boolean is true and 0 otherwise. Returns the index of the link.
    ///
    /// # Errors
    ///
    /// If either variable is unknown.
    pub fn add_bool2int(&mut self, boolean: BoolTerm, int: IntVar) -> Result<usize, Error> {
        if let BoolTerm::Var(var) = boolean {
            if !self.vars.contains_bool(var) {
                return Err(Error::UnknownBooleanVariable(var));
            }
        }
        if self.vars.domain(int).is_none() {
            return Err(Error::UnknownVariable(int));
        }
        self.links.push(Bool2Int { boolean, int });
        Ok(self.links.len() - 1)
    }

    /// Adds a boolean clause that is passed through to writers. Returns the
    /// index of the clause.
    ///
    /// # Errors
    ///
    /// If a variable is unknown.
    pub fn add_clause<I: IntoIterator<Item = BoolLit>>(&mut self, lits: I) -> Result<usize, Error> {
        let clause: BoolClause = lits.into_iter().collect();
        if let Some(lit) = clause.iter().find(|lit| !self.vars.contains_bool(lit.var())) {
            return Err(Error::UnknownBooleanVariable(lit.var()));
        }
        self.clauses.push(clause);
        Ok(self.clauses.len() - 1)
    }

    /// Adds a term to the optimization vector
    ///
    /// # Errors
    ///
    /// If the variable is unknown.
    pub fn add_to_objective(&mut self, var: IntVar, weight: i64) -> Result<(), Error> {
        if self.vars.domain(var).is_none() {
            return Err(Error::UnknownVariable(var));
        }
        self.objective.add(Term::new(var, weight));
        Ok(())
    }

    /// Sets whether the objective is minimized or maximized
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.objective.set_strategy(strategy);
    }

    /// Estimates the domain of the objective value, `None` if the
    /// optimization vector is empty
    ///
    /// # Errors
    ///
    /// If a domain merge is unsupported.
    pub fn objective_domain(&self) -> Result<Option<Domain>, Error> {
        self.objective.domain(&self.vars)
    }

    /// Appends a checked constraint, splitting it if configured
    fn push_ge(
        &mut self,
        terms: Vec<Term>,
        bound: i64,
        reified: Option<Reification>,
    ) -> Result<usize, Error> {
        if terms.len() <= MAX_TERMS {
            return Ok(self.push_canonical(terms, bound, reified));
        }
        match self.config.split {
            SplitStrategy::None => Ok(self.push_canonical(terms, bound, reified)),
            SplitStrategy::EqualityChain => self.split_equality_chain(terms, bound, reified),
            SplitStrategy::PrefixSum => self.split_prefix_sum(terms, bound, reified),
        }
    }

    fn push_canonical(
        &mut self,
        terms: Vec<Term>,
        bound: i64,
        reified: Option<Reification>,
    ) -> usize {
        self.constraints
            .push(LinearConstraint::new(terms, bound).with_reification(reified));
        self.constraints.len() - 1
    }

    /// Replaces the two trailing terms by a sum variable until at most
    /// [`MAX_TERMS`] terms remain
    fn split_equality_chain(
        &mut self,
        mut terms: Vec<Term>,
        bound: i64,
        reified: Option<Reification>,
    ) -> Result<usize, Error> {
        // compute all sum domains first so that a failing merge leaves the
        // instance untouched
        let mut doms = Vec::with_capacity(terms.len() - MAX_TERMS);
        let mut tail = self.vars.term_domain(terms[terms.len() - 1])?;
        for idx in (MAX_TERMS - 1..terms.len() - 1).rev() {
            tail = self.vars.term_domain(terms[idx])?.merge(&tail)?;
            doms.push(tail.clone());
        }
        for dom in doms {
            let last = unreachable_none!(terms.pop());
            let second = unreachable_none!(terms.pop());
            let sum = self.declare_int(dom, true)?;
            log::debug!("introducing {sum} = {second} + {last}");
            self.push_eq(vec![second, last, Term::new(sum, -1)], 0)?;
            terms.push(Term::new(sum, 1));
        }
        debug_assert_eq!(terms.len(), MAX_TERMS);
        Ok(self.push_canonical(terms, bound, reified))
    }

    /// Bounds each prefix sum from above by an auxiliary variable and bounds
    /// the last one by the target
    fn split_prefix_sum(
        &mut self,
        terms: Vec<Term>,
        bound: i64,
        reified: Option<Reification>,
    ) -> Result<usize, Error> {
        let first_dom = self.vars.term_domain(terms[0])?;
        let mut doms = Vec::with_capacity(terms.len() - 1);
        let mut prefix = first_dom.clone();
        for &term in &terms[1..] {
            prefix = self.vars.term_domain(term)?.merge(&prefix)?;
            doms.push(prefix.clone());
        }
        let first = self.declare_int(first_dom, true)?;
        log::debug!("introducing {first} <= {}", terms[0]);
        self.push_canonical(vec![terms[0], Term::new(first, -1)], 0, None);
        let mut prev = first;
        for (&term, dom) in terms[1..].iter().zip(doms) {
            let next = self.declare_int(dom, true)?;
            log::debug!("introducing {next} <= {prev} + {term}");
            self.push_canonical(
                vec![term, Term::new(prev, 1), Term::new(next, -1)],
                0,
                None,
            );
            prev = next;
        }
        Ok(self.push_canonical(vec![Term::new(prev, 1)], bound, reified))
    }

    /// Computes size statistics of the instance
    #[must_use]
    pub fn stats(&self) -> Stats {
        let constr_lens = avg_median(self.constraints.iter().map(LinearConstraint::len).collect());
        let dom_sizes = self
            .vars
            .iter_ints()
            .map(|(_, dom)| dom.len())
            .collect::<Option<Vec<_>>>()
            .and_then(avg_median);
        Stats {
            n_ints: self.vars.n_ints(),
            n_internal_ints: self
                .vars
                .iter_ints()
                .filter(|(var, _)| var.is_internal())
                .count(),
            n_bools: self.vars.n_bools(),
            unbounded_domains: self.unbounded,
            n_constraints: self.constraints.len(),
            avg_constraint_len: constr_lens.map_or(0., |(avg, _)| avg),
            max_constraint_len: self
                .constraints
                .iter()
                .map(LinearConstraint::len)
                .max()
                .unwrap_or(0),
            median_constraint_len: constr_lens.map_or(0, |(_, median)| median),
            avg_domain_size: dom_sizes.map(|(avg, _)| avg),
            median_domain_size: dom_sizes.map(|(_, median)| median),
            n_clauses: self.clauses.len(),
            n_links: self.links.len(),
            n_objective_terms: self.objective.len(),
        }
    }

    /// Logs the statistics of the instance at info level
    pub fn log_stats(&self) {
        let stats = self.stats();
        let name = self.name().unwrap_or("<unnamed>");
        log::info!("instance {name}");
        log::info!(
            "int variables: {} ({} internal)",
            stats.n_ints,
            stats.n_internal_ints
        );
        if let (Some(avg), Some(median)) = (stats.avg_domain_size, stats.median_domain_size) {
            log::info!("  avg domain size: {avg:.2}");
            log::info!("  median domain size: {median}");
        }
        log::info!("bool variables: {}", stats.n_bools);
        log::info!(
            "unbounded domains: {}",
            if stats.unbounded_domains { "y" } else { "n" }
        );
        log::info!("int constraints: {}", stats.n_constraints);
        log::info!("  avg len: {:.2}", stats.avg_constraint_len);
        log::info!("  max len: {}", stats.max_constraint_len);
        log::info!("  median len: {}", stats.median_constraint_len);
        log::info!("clauses: {}", stats.n_clauses);
        log::info!("bool to int: {}", stats.n_links);
        log::info!("opt vector: {}", stats.n_objective_terms);
    }

    /// Restores an instance from a record, validating every reference
    pub(super) fn from_record(record: super::InstanceRecord) -> Result<Self, Error> {
        let mut inst = CspInstance::new();
        inst.name = record.name;
        for (var, dom) in record.domains {
            if var.idx() != inst.vars.n_ints() {
                return Err(Error::UnknownVariable(var));
            }
            inst.declare_int(dom, var.is_internal())?;
        }
        for var in record.bools {
            if var.idx() != inst.vars.n_bools() {
                return Err(Error::UnknownBooleanVariable(var));
            }
            inst.vars.new_bool(var.is_internal());
        }
        for constr in record.constraints {
            inst.check_terms(constr.terms())?;
            if let Some(reif) = constr.reification() {
                if !inst.vars.contains_bool(reif.var) {
                    return Err(Error::UnknownBooleanVariable(reif.var));
                }
            }
            inst.constraints.push(constr);
        }
        for clause in record.clauses {
            inst.add_clause(clause)?;
        }
        for link in record.links {
            inst.add_bool2int(link.boolean, link.int)?;
        }
        for term in record.objective.terms() {
            inst.add_to_objective(term.var, term.weight)?;
        }
        inst.set_strategy(record.objective.strategy());
        if record.unbounded {
            inst.mark_unbounded();
        }
        Ok(inst)
    }
}
