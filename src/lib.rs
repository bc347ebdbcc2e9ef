//! # tbdd-rs: Three-Valued Binary Decision Diagrams in Rust
//!
//! **`tbdd-rs`** is a manager-centric library for **three-valued BDDs**:
//! shared, complement-edge decision diagrams over the truth values
//! `{0, 1, ⊥}`, where `⊥` ("unknown") marks the points at which a partial
//! function is undefined. On top of the classical apply algorithms it
//! provides **resource-bounded approximation**: every operation can carry
//! a node budget and fold whatever it cannot afford into `⊥`, trading
//! precision for a hard size bound.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: all operations go through the
//!   [`Bdd`][crate::bdd::Bdd] manager, which guarantees structural sharing
//!   (hash consing) and keeps every function in canonical form --- also in
//!   the presence of the third terminal.
//! - **`⊥` is its own complement**: complement edges never touch the
//!   unknown parts of a function, so negation stays O(1).
//! - **Budgeted operations**: [`and_reduced`][crate::bdd::Bdd::and_reduced],
//!   [`xor_reduced`][crate::bdd::Bdd::xor_reduced],
//!   [`ite_reduced`][crate::bdd::Bdd::ite_reduced] and friends take a node
//!   limit and report whether they had to approximate.
//! - **Pluggable traversal**: a [heuristic][crate::heuristics] decides
//!   which cofactor a budgeted recursion explores first --- random,
//!   one-step greedy, two-step greedy, or your own.
//! - **Valuation restriction**:
//!   [`reduce_by_valuation`][crate::bdd::Bdd::reduce_by_valuation]
//!   specializes a function by a partial assignment that is itself a
//!   three-valued BDD, forgetting variables on the fly.
//!
//! ## Basic Usage
//!
//! ```rust
//! use tbdd_rs::bdd::Bdd;
//! use tbdd_rs::heuristics::TraverseHeuristic;
//! use tbdd_rs::trilean::Trilean;
//!
//! let bdd = Bdd::new();
//! let x1 = bdd.mk_var(1);
//! let x2 = bdd.mk_var(2);
//!
//! // Exact three-valued operations:
//! let f = bdd.apply_and(x1, x2);
//! assert_eq!(bdd.evaluate(f, &[true, true]), Trilean::True);
//!
//! // Forget the satisfying points: they become unknown.
//! let g = bdd.forget_ones(f);
//! assert_eq!(bdd.evaluate(g, &[true, true]), Trilean::Unknown);
//! assert_eq!(bdd.evaluate(g, &[false, true]), Trilean::False);
//!
//! // Approximate under a node budget.
//! let (h, reduced) = bdd.and_reduced(x1, x2, &TraverseHeuristic::GreedyOneStep, 0);
//! assert!(reduced);
//! assert_eq!(h, bdd.unknown());
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: the manager, the node model and the canonical-form
//!   constructor.
//! - **[`heuristics`]**: traversal-order policies for the budgeted
//!   operations.
//! - **[`reduce`]**: approximation of an existing diagram under a node
//!   limit.
//! - **[`apply`]**: the budgeted apply engine and its derived operations.
//! - **[`valuation`]**: restriction by a three-valued partial assignment.
//! - **[`sat`]**: three-valued model counting and witness extraction.
//! - **[`dot`]**: Graphviz export.

pub mod apply;
pub mod bdd;
pub mod cache;
pub mod dot;
pub mod eval;
pub mod heuristics;
pub mod node;
pub mod reduce;
pub mod reference;
pub mod sat;
pub mod subtable;
pub mod trilean;
pub mod types;
pub mod utils;
pub mod valuation;
