//! # Encodings of Canonical Constraints to Clauses
//!
//! Currently the [order encoding](order) is implemented. Encodings write
//! their clauses to anything that implements [`CollectClauses`].

use thiserror::Error;

use crate::types::{domain::DomainError, Clause, IntVar};

pub mod order;

/// Errors from encodings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A variable of the constraint is not in the variable table
    #[error("unknown integer variable {0}")]
    UnknownVariable(IntVar),
    /// Encoding would enumerate an unbounded domain without ever reaching a
    /// value that satisfies the constraint
    #[error("cannot encode over the unbounded domain of {0}")]
    Unbounded(IntVar),
    /// A domain operation failed
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Trait for all data structures that clauses can be collected in
pub trait CollectClauses {
    /// Gets the number of clauses in the collection
    fn n_clauses(&self) -> usize;

    /// Extends the clause collector with an iterator of clauses
    fn extend_clauses<T>(&mut self, cl_iter: T)
    where
        T: IntoIterator<Item = Clause>;

    /// Adds one clause to the collector
    fn add_clause(&mut self, cl: Clause) {
        self.extend_clauses([cl]);
    }
}

impl CollectClauses for Vec<Clause> {
    fn n_clauses(&self) -> usize {
        self.len()
    }

    fn extend_clauses<T>(&mut self, cl_iter: T)
    where
        T: IntoIterator<Item = Clause>,
    {
        self.extend(cl_iter);
    }

    fn add_clause(&mut self, cl: Clause) {
        self.push(cl);
    }
}

/// Trait for encoding results that track statistics
pub trait EncodeStats {
    /// Gets the number of clauses in the encoding
    fn n_clauses(&self) -> usize;

    /// Gets the total number of literals over all clauses
    fn n_lits(&self) -> usize;
}
