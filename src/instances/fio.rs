//! # Persistence Records
//!
//! Plain records that domains and instances are exported to and imported
//! from. With the `serde` feature, the records (and through them [`Domain`]
//! and [`CspInstance`]) can be serialized. A domain is written as a pair of
//! its variant name and constructor arguments, e.g., in JSON
//! `["ContiguousRange", [0, 5, 1]]`. Open bounds are written as `"inf"` and
//! `"-inf"`.

use super::{CspInstance, Error, Objective};
use crate::types::{
    domain::{
        ContiguousRange, DomainError, EnumeratedSet, MonotonicFn, MonotonicFunctionRange,
        SemiContiguousRange,
    },
    Bool2Int, BoolClause, BoolVar, Domain, ExtInt, IntVar, LinearConstraint,
};

/// A constructor argument of a domain
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum DomainArg {
    /// A bound, index or multiplier
    Int(ExtInt),
    /// A monotonic function
    Func(MonotonicFn),
    /// A list of values
    Values(Vec<i64>),
}

/// A domain as variant name and constructor arguments
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomainRecord(pub String, pub Vec<DomainArg>);

impl Domain {
    /// Exports the domain to a record
    #[must_use]
    pub fn export(&self) -> DomainRecord {
        let m = DomainArg::Int(ExtInt::Fin(self.multiplier()));
        let args = match self {
            Domain::Contiguous(dom) => {
                vec![DomainArg::Int(dom.lo()), DomainArg::Int(dom.hi()), m]
            }
            Domain::Enumerated(dom) => vec![DomainArg::Values(dom.values().to_vec()), m],
            Domain::Monotonic(dom) => vec![
                DomainArg::Int(ExtInt::Fin(dom.lo_idx())),
                DomainArg::Int(dom.hi_idx()),
                DomainArg::Func(dom.func()),
                m,
            ],
            Domain::SemiContiguous(dom) => {
                vec![DomainArg::Int(dom.lo()), DomainArg::Int(dom.hi()), m]
            }
        };
        DomainRecord(self.variant_name().to_string(), args)
    }

    /// Imports a domain from a record
    ///
    /// # Errors
    ///
    /// If the variant name is unknown, the arguments do not fit the variant
    /// or the domain has no values.
    pub fn import(record: &DomainRecord) -> Result<Domain, DomainError> {
        let dom = Domain::from_args(record)?;
        dom.validate()?;
        Ok(dom)
    }

    fn from_args(record: &DomainRecord) -> Result<Domain, DomainError> {
        let DomainRecord(tag, args) = record;
        let bad = || {
            DomainError::BadArguments(format!(
                "{tag} does not take arguments {args:?}"
            ))
        };
        let multiplier = |arg: &DomainArg| match arg {
            DomainArg::Int(ExtInt::Fin(m)) => Ok(*m),
            _ => Err(bad()),
        };
        match (tag.as_str(), args.as_slice()) {
            ("ContiguousRange", [DomainArg::Int(lo), DomainArg::Int(hi), m]) => {
                Ok(ContiguousRange::with_bounds(*lo, *hi)
                    .with_multiplier(multiplier(m)?)?
                    .into())
            }
            ("EnumeratedSet", [DomainArg::Values(values), m]) => {
                Ok(EnumeratedSet::new(values.iter().copied())
                    .with_multiplier(multiplier(m)?)?
                    .into())
            }
            (
                "MonotonicFunctionRange",
                [DomainArg::Int(ExtInt::Fin(lo)), DomainArg::Int(hi), DomainArg::Func(func), m],
            ) => Ok(MonotonicFunctionRange::new(*lo, *hi, *func)?
                .with_multiplier(multiplier(m)?)?
                .into()),
            ("SemiContiguousRange", [DomainArg::Int(lo), DomainArg::Int(hi), m]) => {
                Ok(SemiContiguousRange::with_bounds(*lo, *hi)
                    .with_multiplier(multiplier(m)?)?
                    .into())
            }
            (
                "ContiguousRange"
                | "EnumeratedSet"
                | "MonotonicFunctionRange"
                | "SemiContiguousRange",
                _,
            ) => Err(bad()),
            _ => Err(DomainError::UnknownTag(tag.clone())),
        }
    }
}

impl From<Domain> for DomainRecord {
    fn from(value: Domain) -> Self {
        value.export()
    }
}

impl TryFrom<DomainRecord> for Domain {
    type Error = DomainError;

    fn try_from(value: DomainRecord) -> Result<Self, Self::Error> {
        Domain::import(&value)
    }
}

/// All data of a [`CspInstance`] as a plain record. Variables are listed in
/// order of creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceRecord {
    /// The instance name
    pub name: Option<String>,
    /// Integer variables and their domains
    pub domains: Vec<(IntVar, Domain)>,
    /// Boolean variables
    pub bools: Vec<BoolVar>,
    /// Canonical constraints
    pub constraints: Vec<LinearConstraint>,
    /// Boolean pass-through clauses
    pub clauses: Vec<BoolClause>,
    /// Boolean to integer links
    pub links: Vec<Bool2Int>,
    /// The optimization vector
    pub objective: Objective,
    /// Whether the instance was marked as having unbounded domains
    pub unbounded: bool,
}

impl CspInstance {
    /// Exports the instance to a record
    #[must_use]
    pub fn export(&self) -> InstanceRecord {
        InstanceRecord {
            name: self.name().map(ToString::to_string),
            domains: self
                .domains()
                .iter_ints()
                .map(|(var, dom)| (var, dom.clone()))
                .collect(),
            bools: self.domains().iter_bools().collect(),
            constraints: self.constraints().to_vec(),
            clauses: self.clauses().to_vec(),
            links: self.links().to_vec(),
            objective: self.objective().clone(),
            unbounded: self.has_unbounded_domains(),
        }
    }

    /// Imports an instance from a record. Constraints are taken as they are,
    /// without splitting.
    ///
    /// # Errors
    ///
    /// If variables are not listed in order of creation or a constraint,
    /// clause, link or objective term references an unknown variable.
    pub fn import(record: InstanceRecord) -> Result<CspInstance, Error> {
        CspInstance::from_record(record)
    }
}
