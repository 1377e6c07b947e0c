//! Lexer, clause splitter, column rewriter and query-plan compiler for the
//! RBQL query language.
//!
//! This crate owns everything in the "compile" half of the pipeline: raw
//! query text goes in, a [`plan::Query`] comes out (or a [`error::ParseError`]).
//! It has no knowledge of records, files, or the host expression language —
//! those live in `rbql-eval` and `rbql-engine`.

pub mod clauses;
pub mod error;
pub mod join_expr;
pub mod lexer;
pub mod plan;
pub mod rewrite;

pub use error::ParseError;
pub use plan::{compile, JoinMode, JoinPlan, Query, SortDirection};
