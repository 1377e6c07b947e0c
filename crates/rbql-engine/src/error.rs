use rbql_eval::EvalError;
use thiserror::Error;

/// Failure raised while resolving a join table or executing a query against
/// an input stream.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("No \"a{}\" column at line: {line}", .index + 1)]
    BadFieldA { index: usize, line: u64 },

    #[error("No \"b{}\" column at line: {line} in \"B\" table", .index + 1)]
    BadFieldB { index: usize, line: u64 },

    #[error("Table B: {0} is not accessible")]
    TableBNotAccessible(String),

    #[error("Join column must be unique in right-hand-side \"B\" table")]
    JoinColumnNotUnique,

    #[error(
        "In \"STRICT LEFT JOIN\" mode all A table keys must be present in table B. Key \"{0}\" was not found"
    )]
    StrictLeftJoinKeyNotFound(String),

    #[error("Error at line: {line}, Details: {source}")]
    AtLine {
        line: u64,
        #[source]
        source: EvalError,
    },

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A clause body failed to parse during [`crate::ExecutionPlan::compile`]'s
    /// up-front expression compilation, before any row was read. Callers that
    /// distinguish compile-time from run-time failures (e.g. to choose a
    /// diagnostic prefix) can match on this variant specifically.
    #[error(transparent)]
    CompileTime(#[from] rbql_core::ParseError),
}
