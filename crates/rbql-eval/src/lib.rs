//! Pluggable host expression evaluator.
//!
//! A query's `SELECT`, `WHERE` and `ORDER BY` clauses are, after column-variable
//! rewriting, expressions in a small Python-flavoured sub-language. This crate
//! tokenizes, parses and evaluates that sub-language against a [`RowContext`]
//! without depending on anything in `rbql-core` or `rbql-engine`, so a host
//! embedding RBQL can swap in a different evaluator (for example one that
//! compiles expressions to native closures) by implementing [`Evaluator`].

pub mod ast;
pub mod builtins;
pub mod context;
pub mod error;
pub mod parser;
pub mod tokenizer;
pub mod value;

pub use context::RowContext;
pub use error::EvalError;
pub use value::Value;

use ast::{BinOp, Expr, FieldBase, UnaryOp};

/// A compiled, ready-to-evaluate expression.
pub trait CompiledExpr {
    fn eval(&self, ctx: &RowContext<'_>) -> Result<Value, EvalError>;
}

/// Compiles host expression source into zero or more [`CompiledExpr`]s.
///
/// Implementations are free to choose any internal representation; the
/// default [`TreeWalkEvaluator`] compiles straight to an [`Expr`] AST and
/// walks it on every row.
pub trait Evaluator {
    type Compiled: CompiledExpr;

    fn compile(&self, source: &str) -> Result<Self::Compiled, EvalError>;

    fn compile_list(&self, source: &str) -> Result<Vec<Self::Compiled>, EvalError>;
}

/// The tree-walking reference evaluator: parses expression source into an
/// [`Expr`] AST once and re-interprets it for every row.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeWalkEvaluator;

/// A single parsed expression, ready to be evaluated against many rows.
#[derive(Debug, Clone)]
pub struct TreeExpr(Expr);

impl CompiledExpr for TreeExpr {
    fn eval(&self, ctx: &RowContext<'_>) -> Result<Value, EvalError> {
        eval_expr(&self.0, ctx)
    }
}

impl Evaluator for TreeWalkEvaluator {
    type Compiled = TreeExpr;

    fn compile(&self, source: &str) -> Result<TreeExpr, EvalError> {
        Ok(TreeExpr(parser::parse_expr(source)?))
    }

    fn compile_list(&self, source: &str) -> Result<Vec<TreeExpr>, EvalError> {
        Ok(parser::parse_expr_list(source)?.into_iter().map(TreeExpr).collect())
    }
}

fn eval_expr(expr: &Expr, ctx: &RowContext<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Float(x) => Ok(Value::Float(*x)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Ident(name) => eval_ident(name, ctx),
        Expr::FieldIndex(base, index_expr) => {
            let index = eval_expr(index_expr, ctx)?;
            let index = as_index(&index)?;
            match base {
                FieldBase::A => ctx.field(index),
                FieldBase::B => ctx.bfield(index),
            }
        }
        Expr::Unary(UnaryOp::Not, inner) => Ok(Value::Bool(!eval_expr(inner, ctx)?.is_truthy())),
        Expr::Unary(UnaryOp::Neg, inner) => negate(eval_expr(inner, ctx)?),
        Expr::Binary(BinOp::And, lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            if !l.is_truthy() {
                Ok(l)
            } else {
                eval_expr(rhs, ctx)
            }
        }
        Expr::Binary(BinOp::Or, lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            if l.is_truthy() {
                Ok(l)
            } else {
                eval_expr(rhs, ctx)
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            let r = eval_expr(rhs, ctx)?;
            eval_binary(*op, l, r)
        }
        Expr::Call(name, arg_exprs) => {
            let args = arg_exprs.iter().map(|e| eval_expr(e, ctx)).collect::<Result<Vec<_>, _>>()?;
            builtins::call(name, args)
        }
    }
}

fn eval_ident(name: &str, ctx: &RowContext<'_>) -> Result<Value, EvalError> {
    match name {
        "NR" => Ok(Value::Int(ctx.nr as i64)),
        "NF" => Ok(Value::Int(ctx.nf() as i64)),
        "star_line" => Ok(Value::Str(ctx.star_line.to_string())),
        "fields" | "bfields" => {
            Err(EvalError::Type(format!("{name} must be indexed, e.g. {name}[0]")))
        }
        other => Err(EvalError::UnknownIdent(other.to_string())),
    }
}

fn as_index(value: &Value) -> Result<usize, EvalError> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i as usize),
        other => Err(EvalError::Type(format!("field index must be a non-negative integer, got {other:?}"))),
    }
}

fn negate(value: Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(i) => Ok(Value::Int(-i)),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(EvalError::Type(format!("cannot negate {other:?}"))),
    }
}

fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    use BinOp::*;
    match op {
        Add => match (&lhs, &rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => numeric_op(lhs, rhs, |a, b| a + b, i64::checked_add),
        },
        Sub => numeric_op(lhs, rhs, |a, b| a - b, i64::checked_sub),
        Mul => numeric_op(lhs, rhs, |a, b| a * b, i64::checked_mul),
        Div => {
            let a = lhs.as_f64()?;
            let b = rhs.as_f64()?;
            if b == 0.0 {
                return Err(EvalError::DivByZero);
            }
            Ok(Value::Float(a / b))
        }
        Mod => match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err(EvalError::DivByZero);
                }
                Ok(Value::Int(a.rem_euclid(*b)))
            }
            _ => {
                let a = lhs.as_f64()?;
                let b = rhs.as_f64()?;
                if b == 0.0 {
                    return Err(EvalError::DivByZero);
                }
                Ok(Value::Float(a.rem_euclid(b)))
            }
        },
        Eq => Ok(Value::Bool(value::compare(&lhs, &rhs) == std::cmp::Ordering::Equal)),
        Ne => Ok(Value::Bool(value::compare(&lhs, &rhs) != std::cmp::Ordering::Equal)),
        Lt => Ok(Value::Bool(value::compare(&lhs, &rhs) == std::cmp::Ordering::Less)),
        Le => Ok(Value::Bool(value::compare(&lhs, &rhs) != std::cmp::Ordering::Greater)),
        Gt => Ok(Value::Bool(value::compare(&lhs, &rhs) == std::cmp::Ordering::Greater)),
        Ge => Ok(Value::Bool(value::compare(&lhs, &rhs) != std::cmp::Ordering::Less)),
        And | Or => unreachable!("short-circuit operators are handled in eval_expr"),
    }
}

fn numeric_op(
    lhs: Value,
    rhs: Value,
    float_op: impl Fn(f64, f64) -> f64,
    int_op: impl Fn(i64, i64) -> Option<i64>,
) -> Result<Value, EvalError> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => match int_op(*a, *b) {
            Some(result) => Ok(Value::Int(result)),
            None => Ok(Value::Float(float_op(*a as f64, *b as f64))),
        },
        _ => Ok(Value::Float(float_op(lhs.as_f64()?, rhs.as_f64()?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(fields: &'a [String]) -> RowContext<'a> {
        RowContext { nr: 1, fields, bfields: None, star_line: "unused" }
    }

    #[test]
    fn evaluates_field_access() {
        let fields = vec!["10".to_string(), "abc".to_string()];
        let evaluator = TreeWalkEvaluator;
        let compiled = evaluator.compile("fields[0]").unwrap();
        assert_eq!(compiled.eval(&ctx(&fields)).unwrap(), Value::Str("10".to_string()));
    }

    #[test]
    fn evaluates_arithmetic_on_parsed_ints() {
        let fields = vec!["10".to_string()];
        let evaluator = TreeWalkEvaluator;
        let compiled = evaluator.compile("int(fields[0]) + 5").unwrap();
        assert_eq!(compiled.eval(&ctx(&fields)).unwrap(), Value::Int(15));
    }

    #[test]
    fn short_circuits_and() {
        let fields: Vec<String> = vec![];
        let evaluator = TreeWalkEvaluator;
        let compiled = evaluator.compile("NR == 2 and 1 / 0 == 0").unwrap();
        assert_eq!(compiled.eval(&ctx(&fields)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn division_by_zero_surfaces_as_error() {
        let fields: Vec<String> = vec![];
        let evaluator = TreeWalkEvaluator;
        let compiled = evaluator.compile("1 / 0").unwrap();
        assert!(matches!(compiled.eval(&ctx(&fields)), Err(EvalError::DivByZero)));
    }

    #[test]
    fn compiles_select_list() {
        let fields = vec!["a".to_string(), "b".to_string()];
        let evaluator = TreeWalkEvaluator;
        let compiled = evaluator.compile_list("fields[0], fields[1], NR").unwrap();
        let row = ctx(&fields);
        let values: Vec<Value> = compiled.iter().map(|c| c.eval(&row).unwrap()).collect();
        assert_eq!(values, vec![Value::Str("a".into()), Value::Str("b".into()), Value::Int(1)]);
    }
}
