//! # Order Encoding
//!
//! The order encoding represents an integer variable `x` by the literals
//! `x >= d` for the values `d` of its domain. A canonical constraint
//! `a·x + rest >= c` is encoded by the clauses
//! `x >= d + 1 ∨ (rest >= c - a·d)` for the values `d` of `x` (for `a > 0`,
//! symmetric for `a < 0`), where the residual constraint is encoded
//! recursively. Values for which the residual constraint can never or
//! always holds are skipped.
//!
//! ## References
//!
//! - Naoyuki Tamura, Akiko Taga, Satoshi Kitagawa and Mutsunori Banbara:
//!   _Compiling finite linear CSP into SAT_, Constraints 2009.

use crate::{
    clause,
    instances::VarTable,
    types::{
        domain::DomainError, Clause, Domain, ExtInt, IntVar, LinearConstraint, OrderLit,
        RsHashMap, Term,
    },
    utils::{checked_div_floor, div_ceil},
};

use super::{CollectClauses, EncodeStats, Error};

const OVERFLOW: Error = Error::Domain(DomainError::Overflow);

/// Domains that replace the domains of the variable table when iterating
/// the values of a variable. Literals are still translated over the
/// domains of the variable table.
pub type DomainOverrides = RsHashMap<IntVar, Domain>;

/// Options of the [`OrderEncoder`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// Translate thresholds to literals over domain values. If disabled, the
    /// encoding contains [`OrderLit::Raw`] literals with the requested
    /// thresholds and no constant folding.
    pub translate: bool,
    /// Emit translated literals as [`OrderLit::Raw`] carrying both the
    /// threshold and the domain value it rounds to
    pub raw_output: bool,
    /// Report unreified constraints whose upper bound is below the bound as
    /// [`Translation::Infeasible`]
    pub infeasible_detection: bool,
    /// Skip values that only yield redundant clauses
    pub prune: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            translate: true,
            raw_output: false,
            infeasible_detection: true,
            prune: true,
        }
    }
}

impl EncoderConfig {
    /// Sets whether thresholds are translated
    #[must_use]
    pub fn with_translate(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }

    /// Sets whether translated literals are emitted in raw form
    #[must_use]
    pub fn with_raw_output(mut self, raw_output: bool) -> Self {
        self.raw_output = raw_output;
        self
    }

    /// Sets whether infeasible constraints are detected
    #[must_use]
    pub fn with_infeasible_detection(mut self, infeasible_detection: bool) -> Self {
        self.infeasible_detection = infeasible_detection;
        self
    }

    /// Sets whether redundant values are skipped
    #[must_use]
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }
}

/// The result of encoding a constraint
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Translation {
    /// The conjunction of clauses encoding the constraint
    Clauses(Vec<Clause>),
    /// The constraint can never be satisfied and should be treated as the
    /// constant false
    Infeasible,
}

impl Translation {
    /// Checks whether the constraint was found infeasible
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Translation::Infeasible)
    }

    /// Gets the clauses, `None` if infeasible
    #[must_use]
    pub fn clauses(&self) -> Option<&[Clause]> {
        match self {
            Translation::Clauses(clauses) => Some(clauses),
            Translation::Infeasible => None,
        }
    }

    /// Converts into the clauses, `None` if infeasible
    #[must_use]
    pub fn into_clauses(self) -> Option<Vec<Clause>> {
        match self {
            Translation::Clauses(clauses) => Some(clauses),
            Translation::Infeasible => None,
        }
    }
}

impl EncodeStats for Translation {
    fn n_clauses(&self) -> usize {
        self.clauses().map_or(0, <[Clause]>::len)
    }

    fn n_lits(&self) -> usize {
        self.clauses()
            .map_or(0, |clauses| clauses.iter().map(Clause::len).sum())
    }
}

/// Encoder for canonical constraints over the domains of a variable table.
/// Encoding does not modify the table, so constraints can be encoded
/// independently of each other.
#[derive(Clone, Copy, Debug)]
pub struct OrderEncoder<'vars> {
    vars: &'vars VarTable,
    config: EncoderConfig,
}

impl<'vars> OrderEncoder<'vars> {
    /// Creates an encoder with the default options
    #[must_use]
    pub fn new(vars: &'vars VarTable) -> Self {
        Self::with_config(vars, EncoderConfig::default())
    }

    /// Creates an encoder with the given options
    #[must_use]
    pub fn with_config(vars: &'vars VarTable, config: EncoderConfig) -> Self {
        OrderEncoder { vars, config }
    }

    /// Gets the options
    #[must_use]
    pub fn config(&self) -> EncoderConfig {
        self.config
    }

    fn domain(&self, var: IntVar) -> Result<&'vars Domain, Error> {
        self.vars.domain(var).ok_or(Error::UnknownVariable(var))
    }

    /// Lower and upper bound of a weighted term over the global domain.
    /// Bounds outside of `i64` saturate to infinities.
    fn term_bounds(&self, term: Term) -> Result<(ExtInt, ExtInt), Error> {
        let dom = self.domain(term.var)?;
        let (lb, ub) = (dom.lb() * term.weight, dom.ub() * term.weight);
        if term.weight > 0 {
            Ok((lb, ub))
        } else {
            Ok((ub, lb))
        }
    }

    /// Encodes a constraint
    ///
    /// # Errors
    ///
    /// If a variable is unknown, a domain operation fails, a threshold
    /// overflows or encoding would not terminate on an unbounded domain.
    pub fn encode(&self, constr: &LinearConstraint) -> Result<Translation, Error> {
        self.encode_with_overrides(constr, None)
    }

    /// Encodes a constraint, iterating the values of the variables in
    /// `overrides` over the given domains
    ///
    /// # Errors
    ///
    /// As [`OrderEncoder::encode`].
    pub fn encode_with_overrides(
        &self,
        constr: &LinearConstraint,
        overrides: Option<&DomainOverrides>,
    ) -> Result<Translation, Error> {
        let bounds = constr
            .terms()
            .iter()
            .map(|&t| self.term_bounds(t))
            .collect::<Result<Vec<_>, _>>()?;
        if self.config.infeasible_detection && constr.reification().is_none() {
            let ub: ExtInt = bounds.iter().map(|&(_, ub)| ub).sum();
            if ub < constr.bound() {
                log::debug!("{constr} is infeasible, maximum {ub}");
                return Ok(Translation::Infeasible);
            }
        }
        let mut clauses = if constr.is_empty() {
            if constr.bound() <= 0 {
                vec![]
            } else {
                vec![Clause::new()]
            }
        } else {
            self.encode_terms(constr.terms(), &bounds, constr.bound(), overrides)?
        };
        if let Some(reif) = constr.reification() {
            clauses
                .iter_mut()
                .for_each(|cl| cl.add(OrderLit::Bool(reif.lit())));
        }
        Ok(Translation::Clauses(clauses))
    }

    /// Encodes a constraint into a clause collector. Returns `false` if the
    /// constraint is infeasible, in which case nothing is added.
    ///
    /// # Errors
    ///
    /// As [`OrderEncoder::encode`].
    pub fn encode_into<Col>(
        &self,
        constr: &LinearConstraint,
        collector: &mut Col,
    ) -> Result<bool, Error>
    where
        Col: CollectClauses,
    {
        match self.encode(constr)? {
            Translation::Clauses(clauses) => {
                collector.extend_clauses(clauses);
                Ok(true)
            }
            Translation::Infeasible => Ok(false),
        }
    }

    /// Encodes a list of constraints. With the `parallel` feature the
    /// constraints are encoded on the `rayon` thread pool. The results are
    /// in the order of the input.
    ///
    /// # Errors
    ///
    /// An error of [`OrderEncoder::encode`] on any of the constraints. Which
    /// one is unspecified with the `parallel` feature.
    pub fn encode_all(&self, constrs: &[LinearConstraint]) -> Result<Vec<Translation>, Error> {
        #[cfg(feature = "parallel")]
        let encs: Result<Vec<_>, _> = {
            use rayon::prelude::*;
            constrs.par_iter().map(|constr| self.encode(constr)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let encs: Result<Vec<_>, _> = constrs.iter().map(|constr| self.encode(constr)).collect();
        let encs = encs?;
        log::debug!(
            "encoded {} constraints into {} clauses",
            encs.len(),
            encs.iter().map(EncodeStats::n_clauses).sum::<usize>()
        );
        Ok(encs)
    }

    /// Encodes `Σ terms >= bound` where `bounds` are the term bounds
    fn encode_terms(
        &self,
        terms: &[Term],
        bounds: &[(ExtInt, ExtInt)],
        bound: i64,
        overrides: Option<&DomainOverrides>,
    ) -> Result<Vec<Clause>, Error> {
        let (&Term { var, weight }, rest) = crate::utils::unreachable_none!(terms.split_first());
        if rest.is_empty() {
            let lit = if weight > 0 {
                self.translate(false, var, div_ceil(bound, weight))?
            } else {
                match checked_div_floor(bound, weight).and_then(|quot| quot.checked_add(1)) {
                    Some(threshold) => self.translate(true, var, threshold)?,
                    // x < i64::MAX + 1 always holds
                    None => OrderLit::Const(true),
                }
            };
            return Ok(vec![clause![lit]]);
        }

        let rest_bounds = &bounds[1..];
        let rest_lb: ExtInt = rest_bounds.iter().map(|&(lb, _)| lb).sum();
        let rest_ub: ExtInt = rest_bounds.iter().map(|&(_, ub)| ub).sum();
        let dom = match overrides.and_then(|ov| ov.get(&var)) {
            Some(dom) => dom,
            None => self.domain(var)?,
        };
        let prune = self.config.prune && !dom.has_open_bound();
        // the deficit the term must cover if the rest takes its maximum
        let gap = rest_ub.finite().and_then(|ub| bound.checked_sub(ub));

        let (start, values) = if weight > 0 {
            // x <= d requires rest >= bound - weight * d
            if !dom.ub().is_finite() && !rest_lb.is_finite() {
                return Err(Error::Unbounded(var));
            }
            let start = match gap {
                Some(gap) if prune => dom.index(div_ceil(gap, weight))?.saturating_sub(1),
                _ => 0,
            };
            (start, dom.values_asc(start))
        } else {
            // x >= d requires rest >= bound - weight * d
            if !dom.lb().is_finite() && !rest_lb.is_finite() {
                return Err(Error::Unbounded(var));
            }
            let threshold = gap
                .and_then(|gap| checked_div_floor(gap, weight))
                .and_then(|quot| quot.checked_add(1));
            let start = match (threshold, dom.len()) {
                (Some(threshold), Some(len)) if prune => len
                    .saturating_sub(dom.index(threshold)?)
                    .saturating_sub(1),
                _ => 0,
            };
            (start, dom.values_desc(start))
        };
        let values = values.map_err(|_| Error::Unbounded(var))?;
        log::trace!(
            "iterating {} values of {var} from index {start} (pruning {prune})",
            if weight > 0 { "ascending" } else { "descending" }
        );

        let mut clauses = vec![];
        for val in values {
            let contrib = weight.checked_mul(val).ok_or(OVERFLOW)?;
            if rest_lb + contrib >= bound {
                log::trace!("{var} = {val} satisfies the constraint for any rest, stopping");
                break;
            }
            let lit = match (weight > 0, val.checked_add(1)) {
                (true, Some(above)) => self.translate(false, var, above)?,
                // x >= i64::MAX + 1 never holds
                (true, None) => OrderLit::Const(false),
                (false, _) => self.translate(true, var, val)?,
            };
            let residual = bound.checked_sub(contrib).ok_or(OVERFLOW)?;
            let sub = self.encode_terms(rest, rest_bounds, residual, overrides)?;
            clauses.extend(sub.into_iter().map(|sub_cl| {
                let mut cl = Clause::with_capacity(sub_cl.len() + 1);
                cl.add(lit);
                cl.extend(sub_cl);
                cl
            }));
        }
        Ok(clauses)
    }

    /// Translates the threshold literal `var >= threshold` (or
    /// `var < threshold` if `negated`) over the domain of the variable.
    /// Thresholds at or below the lower bound, or above the upper bound,
    /// yield constants. Other thresholds are rounded up to the next domain
    /// value.
    ///
    /// # Errors
    ///
    /// If the variable is unknown.
    pub fn translate(&self, negated: bool, var: IntVar, threshold: i64) -> Result<OrderLit, Error> {
        if !self.config.translate {
            return Ok(OrderLit::Raw {
                var,
                threshold,
                negated,
                rounded: None,
            });
        }
        let dom = self.domain(var)?;
        if dom.lb() >= threshold {
            return Ok(OrderLit::Const(!negated));
        }
        if dom.ub() < threshold {
            return Ok(OrderLit::Const(negated));
        }
        let value = dom.search(threshold)?;
        if self.config.raw_output {
            return Ok(OrderLit::Raw {
                var,
                threshold,
                negated,
                rounded: Some(value),
            });
        }
        Ok(OrderLit::Ge {
            var,
            value,
            negated,
            approx: value != threshold,
        })
    }
}
