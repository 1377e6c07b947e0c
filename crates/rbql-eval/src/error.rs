use thiserror::Error;

/// Failure raised by the host expression language, either while compiling an
/// expression source string or while evaluating it against a row.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// A `fields[i]` / `bfields[i]` access went out of range. The executor
    /// converts this into the user-facing `"a<k>"`/`"b<k>"` message.
    #[error("bad field index {0}")]
    BadField(usize),

    #[error("expression parse error: {0}")]
    Parse(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("unknown identifier: {0}")]
    UnknownIdent(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{0} takes {1} argument(s)")]
    Arity(&'static str, usize),

    #[error("division by zero")]
    DivByZero,

    #[error("invalid regex pattern: {0}")]
    Regex(String),
}
