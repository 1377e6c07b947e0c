use thiserror::Error;

/// Error raised while compiling raw RBQL source into a [`crate::plan::Query`].
///
/// Parsing errors are always synchronous: no stream is opened and no partial
/// output is produced before one of these is returned.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("In line {line}. Multiline string literals and triple-quoted forms are not allowed in rbql")]
    MultilineLiteral { line: usize },

    #[error("\"SELECT\" statement not found")]
    MissingSelect,

    #[error("\"SELECT\" expression is empty")]
    EmptySelect,

    #[error("More than one \"{clause}\" statements found")]
    DuplicateClause { clause: &'static str },

    #[error("Incorrect join syntax. Must be: \"<JOIN> /path/to/B/table on a<i> == b<j>\"")]
    MalformedJoin,

    /// Raised when a host expression sub-language clause body (`SELECT`,
    /// `WHERE`, `ORDER BY`) fails to parse during up-front compilation,
    /// before any row is read.
    #[error("Invalid RBQL expression: {0}")]
    InvalidExpression(String),
}
