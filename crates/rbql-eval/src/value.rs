use std::cmp::Ordering;
use std::fmt;

use crate::error::EvalError;

/// A dynamically typed runtime value produced and consumed by the host
/// expression evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    /// A composite sort key, e.g. the `(a2, int(a1))` built from a
    /// comma-separated `ORDER BY` clause. Never produced by expression
    /// evaluation itself — only assembled by the executor to give a
    /// multi-key `ORDER BY` something to compare.
    Tuple(Vec<Value>),
}

impl Value {
    pub fn as_f64(&self) -> Result<f64, EvalError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            other => Err(EvalError::Type(format!("expected a number, got {other:?}"))),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Null => false,
            Value::Tuple(items) => !items.is_empty(),
        }
    }

    pub fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Tuple(_) => 4,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "None"),
            Value::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_string).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Host-defined total order for ORDER BY keys: numbers compare numerically,
/// strings compare lexicographically, and anything else falls back to a
/// stable cross-type ordering so the sort never panics on mixed key types.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Tuple(xs), Value::Tuple(ys)) => {
            for (x, y) in xs.iter().zip(ys.iter()) {
                let ord = compare(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => a.type_rank().cmp(&b.type_rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_renders_as_none() {
        assert_eq!(Value::Null.to_string(), "None");
    }

    #[test]
    fn numeric_compare_is_numeric_not_lexicographic() {
        assert_eq!(compare(&Value::Int(9), &Value::Int(10)), Ordering::Less);
    }

    #[test]
    fn mixed_type_compare_does_not_panic() {
        let _ = compare(&Value::Int(1), &Value::Str("a".into()));
    }

    #[test]
    fn tuple_compare_is_lexicographic() {
        let a = Value::Tuple(vec![Value::Str("car".into()), Value::Int(5)]);
        let b = Value::Tuple(vec![Value::Str("car".into()), Value::Int(10)]);
        assert_eq!(compare(&a, &b), Ordering::Less);

        let c = Value::Tuple(vec![Value::Str("boat".into()), Value::Int(999)]);
        assert_eq!(compare(&c, &a), Ordering::Less);
    }
}
