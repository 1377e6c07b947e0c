use crate::error::EvalError;
use crate::value::Value;

/// The per-record environment exposed to the host evaluator.
///
/// `bfields` is `None` when no join is configured, `Some(row)` when a match
/// was found, and a `NULL`-filled row (every element `None`) for an
/// unmatched LEFT JOIN.
pub struct RowContext<'a> {
    pub nr: u64,
    pub fields: &'a [String],
    pub bfields: Option<&'a [Option<String>]>,
    pub star_line: &'a str,
}

impl<'a> RowContext<'a> {
    pub fn nf(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Result<Value, EvalError> {
        self.fields.get(index).cloned().map(Value::Str).ok_or(EvalError::BadField(index))
    }

    pub fn bfield(&self, index: usize) -> Result<Value, EvalError> {
        let row = self
            .bfields
            .ok_or_else(|| EvalError::Type("no join configured for this query".to_string()))?;
        let cell = row.get(index).ok_or(EvalError::BadField(index))?;
        Ok(cell.clone().map(Value::Str).unwrap_or(Value::Null))
    }
}
