//! Executes a compiled RBQL [`rbql_core::Query`] against a delimited input
//! stream using a pluggable [`rbql_eval::Evaluator`].

pub mod error;
pub mod executor;
pub mod join;
pub mod records;
pub mod writer;

pub use error::RuntimeError;
pub use executor::ExecutionPlan;
pub use records::{Record, RecordReader};
pub use writer::{RecordWriter, SimpleWriter, UniqWriter};
