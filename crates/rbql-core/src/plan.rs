//! Compiles raw RBQL source into a [`Query`] plan.

use crate::clauses::{split_clauses, Clause};
use crate::error::ParseError;
use crate::join_expr::parse_join_expression;
use crate::lexer::{join_tokens, lex};
use crate::rewrite::{replace_column_vars, replace_star_vars};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    Inner,
    Left,
    StrictLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    pub mode: JoinMode,
    pub table_b_path: String,
    pub a_side_field: String,
    pub b_side_field: String,
}

/// A fully compiled RBQL query: rewritten expression sources plus the
/// structural flags the executor needs, but no knowledge of the host
/// expression language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub select_expr: String,
    pub distinct: bool,
    pub join: Option<JoinPlan>,
    pub where_expr: Option<String>,
    pub order_by: Option<(String, SortDirection)>,
}

const DESC_SUFFIX: &str = " DESC";
const ASC_SUFFIX: &str = " ASC";

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    if s.len() >= suffix.len() && s[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix) {
        Some(s[..s.len() - suffix.len()].trim_end())
    } else {
        None
    }
}

/// Compiles RBQL source text into a [`Query`].
pub fn compile(source: &str) -> Result<Query, ParseError> {
    let tokens = lex(source)?;
    let mut clauses = split_clauses(&tokens)?;

    let distinct = clauses.contains_key(&Clause::SelectDistinct);
    let select_clause = if distinct { Clause::SelectDistinct } else { Clause::Select };
    let mut select_tokens = clauses.shift_remove(&select_clause).ok_or(ParseError::MissingSelect)?;
    replace_column_vars(&mut select_tokens);
    replace_star_vars(&mut select_tokens);
    let select_expr = join_tokens(&select_tokens);
    if select_expr.is_empty() {
        return Err(ParseError::EmptySelect);
    }

    let join = [
        (Clause::InnerJoin, JoinMode::Inner),
        (Clause::LeftJoin, JoinMode::Left),
        (Clause::StrictLeftJoin, JoinMode::StrictLeft),
    ]
    .into_iter()
    .find_map(|(clause, mode)| clauses.shift_remove(&clause).map(|body| (mode, body)))
    .map(|(mode, body)| -> Result<JoinPlan, ParseError> {
        let expr = parse_join_expression(&body)?;
        Ok(JoinPlan {
            mode,
            table_b_path: expr.table_b_path,
            a_side_field: expr.a_side_field,
            b_side_field: expr.b_side_field,
        })
    })
    .transpose()?;

    let where_expr = clauses.shift_remove(&Clause::Where).map(|mut body| {
        replace_column_vars(&mut body);
        join_tokens(&body)
    });

    let order_by = clauses.shift_remove(&Clause::OrderBy).map(|mut body| {
        replace_column_vars(&mut body);
        let expr = join_tokens(&body);
        if let Some(trimmed) = strip_suffix_ci(&expr, DESC_SUFFIX) {
            (trimmed.to_string(), SortDirection::Descending)
        } else if let Some(trimmed) = strip_suffix_ci(&expr, ASC_SUFFIX) {
            (trimmed.to_string(), SortDirection::Ascending)
        } else {
            (expr, SortDirection::Ascending)
        }
    });

    log::debug!(
        "Compiled clauses: distinct={distinct}, join={}, where={}, order_by={}",
        join.is_some(),
        where_expr.is_some(),
        order_by.is_some()
    );

    Ok(Query {
        select_expr,
        distinct,
        join,
        where_expr,
        order_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compiles_simple_select() {
        let q = compile("select a1, a2 where int(a1) > 5").unwrap();
        assert_eq!(q.select_expr, "fields[0], fields[1]");
        assert_eq!(q.where_expr.as_deref(), Some("int(fields[0]) > 5"));
        assert!(!q.distinct);
        assert!(q.join.is_none());
    }

    #[test]
    fn compiles_distinct_and_order_by_desc() {
        let q = compile("select distinct a1 order by int(a1) desc").unwrap();
        assert!(q.distinct);
        let (expr, dir) = q.order_by.unwrap();
        assert_eq!(expr, "int(fields[0])");
        assert_eq!(dir, SortDirection::Descending);
    }

    #[test]
    fn order_by_asc_suffix_is_stripped() {
        let q = compile("select a1 order by a1 asc").unwrap();
        let (expr, dir) = q.order_by.unwrap();
        assert_eq!(expr, "fields[0]");
        assert_eq!(dir, SortDirection::Ascending);
    }

    #[test]
    fn compiles_inner_join() {
        let q = compile("select * inner join /tmp/b.tsv on a2 == b1 where b2 != \"x\"").unwrap();
        let join = q.join.unwrap();
        assert_eq!(join.mode, JoinMode::Inner);
        assert_eq!(join.table_b_path, "/tmp/b.tsv");
        assert_eq!(join.a_side_field, "fields[1]");
        assert_eq!(join.b_side_field, "bfields[0]");
    }

    #[test]
    fn missing_select_is_an_error() {
        assert_eq!(compile("where a1 > 5").unwrap_err(), ParseError::MissingSelect);
    }

    #[test]
    fn empty_select_is_an_error() {
        assert_eq!(compile("select where a1 > 5").unwrap_err(), ParseError::EmptySelect);
    }
}
