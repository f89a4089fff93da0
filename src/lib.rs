//! # orderenc - Order Encoding of Linear Integer Constraints
//!
//! `orderenc` compiles linear integer and boolean constraint problems
//! (knapsack instances, integer-linear programs, finite-domain CSPs) into
//! propositional clauses via the _order encoding_: every integer variable is
//! represented by a chain of literals "variable >= threshold" and every linear
//! inequality becomes a conjunction of implication clauses over them.
//!
//! The library is organized in three layers:
//!
//! - [`types`] holds identifiers, the [`types::domain::Domain`] abstraction
//!   and the canonical constraint and clause types.
//! - [`instances`] holds the [`instances::CspInstance`], which owns the
//!   variable table and normalizes relational constraints into canonical form.
//! - [`encodings`] holds the [`encodings::order::OrderEncoder`] that turns
//!   canonical constraints into clauses.
//!
//! ## Example Usage
//!
//! ```
//! use orderenc::{
//!     encodings::order::{OrderEncoder, Translation},
//!     instances::CspInstance,
//!     types::domain::ContiguousRange,
//! };
//!
//! let mut inst = CspInstance::new();
//! let x = inst.new_int_variable(ContiguousRange::new(0, 3).into()).unwrap();
//! let y = inst.new_int_variable(ContiguousRange::new(0, 3).into()).unwrap();
//! inst.add_ge(vec![(x, 1), (y, 1)], 4).unwrap();
//!
//! let encoder = OrderEncoder::new(inst.domains());
//! for constr in inst.constraints() {
//!     match encoder.encode(constr).unwrap() {
//!         Translation::Clauses(clauses) => assert!(!clauses.is_empty()),
//!         Translation::Infeasible => unreachable!(),
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! | Feature name | Description |
//! | --- | --- |
//! | `fxhash` | Use the faster firefox hash function from `rustc-hash` for variable tables. |
//! | `serde` | Persistence records for domains and instances, and serde derives on public types. |
//! | `parallel` | Encode constraint lists on a `rayon` thread pool. |
//! | `internals` | Make some internal helpers public. Note that the internal API might change between releases. |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! Currently, the MSRV is 1.76.0.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod encodings;
pub mod instances;
pub mod types;

mod utils;
