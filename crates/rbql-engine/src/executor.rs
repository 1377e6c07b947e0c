//! Ties record reading, join resolution, expression evaluation and output
//! writing into the per-record execution loop described by the reference
//! implementation's `rb_transform`.

use std::io::BufRead;
use std::path::Path;

use rbql_core::{JoinMode, Query, SortDirection};
use rbql_eval::{value, CompiledExpr, EvalError, Evaluator, RowContext, Value};

use crate::error::RuntimeError;
use crate::join::JoinIndex;
use crate::records::RecordReader;
use crate::writer::RecordWriter;

/// Maps a clause-body compile failure to [`RuntimeError::CompileTime`] rather
/// than the generic [`RuntimeError::Eval`], so callers can tell a
/// syntactically broken query apart from a runtime evaluation failure.
fn invalid_expression(err: EvalError) -> RuntimeError {
    rbql_core::ParseError::InvalidExpression(err.to_string()).into()
}

fn parse_field_index(expr: &str, prefix: &str) -> usize {
    expr.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('['))
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|digits| digits.parse().ok())
        .expect("rbql-core only emits simple fields[N]/bfields[N] join keys")
}

struct CompiledJoin {
    index: JoinIndex,
    a_field_index: usize,
    b_field_index: usize,
    mode: JoinMode,
}

/// A [`Query`] plan bound to a concrete host expression evaluator, ready to
/// run against an input stream.
pub struct ExecutionPlan<C> {
    select: Vec<C>,
    distinct: bool,
    where_expr: Option<C>,
    order_by: Option<(Vec<C>, SortDirection)>,
    join: Option<CompiledJoin>,
    delim: char,
}

impl<C: CompiledExpr> ExecutionPlan<C> {
    pub fn compile<E: Evaluator<Compiled = C>>(
        evaluator: &E,
        query: Query,
        delim: char,
    ) -> Result<Self, RuntimeError> {
        let select = evaluator.compile_list(&query.select_expr).map_err(invalid_expression)?;
        let where_expr = query
            .where_expr
            .as_deref()
            .map(|src| evaluator.compile(src).map_err(invalid_expression))
            .transpose()?;
        // `ORDER BY a2, int(a1)` is a comma-separated tuple of sort keys, exactly
        // like a `SELECT` list, so it is compiled the same way.
        let order_by = query
            .order_by
            .map(|(src, dir)| evaluator.compile_list(&src).map_err(invalid_expression).map(|compiled| (compiled, dir)))
            .transpose()?;
        let join = query
            .join
            .map(|plan| -> Result<CompiledJoin, RuntimeError> {
                let a_field_index = parse_field_index(&plan.a_side_field, "fields");
                let b_field_index = parse_field_index(&plan.b_side_field, "bfields");
                let index = JoinIndex::load(Path::new(&plan.table_b_path), delim, b_field_index, plan.mode)?;
                Ok(CompiledJoin { index, a_field_index, b_field_index, mode: plan.mode })
            })
            .transpose()?;

        log::debug!(
            "Compiled plan: {} select expr(s), distinct={}, join={}, where={}, order_by={}",
            select.len(),
            query.distinct,
            join.is_some(),
            where_expr.is_some(),
            order_by.is_some()
        );

        Ok(Self { select, distinct: query.distinct, where_expr, order_by, join, delim })
    }

    pub fn distinct(&self) -> bool {
        self.distinct
    }

    /// Replaces the already-loaded join table with one read from `reader`
    /// (e.g. after decoding it with a non-default `--join-csv-encoding`). A
    /// no-op if the query has no `JOIN` clause.
    pub fn override_join_table<R: BufRead>(mut self, reader: R, delim: char) -> Result<Self, RuntimeError> {
        if let Some(join) = &mut self.join {
            join.index = JoinIndex::from_reader(reader, delim, join.b_field_index, join.mode)?;
        }
        Ok(self)
    }

    /// Runs the plan against `input`, writing matching records to `writer`.
    pub fn run<R: BufRead>(&self, input: R, writer: &mut dyn RecordWriter) -> Result<(), RuntimeError> {
        let mut reader = RecordReader::new(input);
        let mut sort_buffer: Vec<(Value, String)> = Vec::new();
        let delim_str = self.delim.to_string();

        while let Some(record) = reader.next_record(self.delim)? {
            if record.nr % 100_000 == 0 {
                log::trace!("Processed {} input rows", record.nr);
            }
            let mut star_line = record.line.clone();
            let mut bfields: Option<Vec<Option<String>>> = None;

            if let Some(join) = &self.join {
                let key = record
                    .fields
                    .get(join.a_field_index)
                    .ok_or(RuntimeError::BadFieldA { index: join.a_field_index, line: record.nr })?;
                match join.index.lookup(key)? {
                    None => continue,
                    Some(row) => {
                        star_line = build_star_line(&record.line, &row, &delim_str);
                        bfields = Some(row);
                    }
                }
            }

            let ctx = RowContext {
                nr: record.nr,
                fields: &record.fields,
                bfields: bfields.as_deref(),
                star_line: &star_line,
            };

            if let Some(where_expr) = &self.where_expr {
                let keep = where_expr.eval(&ctx).map_err(|e| wrap_error(record.nr, e))?;
                if !keep.is_truthy() {
                    continue;
                }
            }

            let out_fields = self
                .select
                .iter()
                .map(|c| c.eval(&ctx))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| wrap_error(record.nr, e))?;
            let out_line =
                out_fields.iter().map(Value::to_string).collect::<Vec<_>>().join(&delim_str);

            match &self.order_by {
                Some((key_exprs, _)) => {
                    let mut key_values = key_exprs
                        .iter()
                        .map(|c| c.eval(&ctx))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| wrap_error(record.nr, e))?;
                    let key = if key_values.len() == 1 { key_values.remove(0) } else { Value::Tuple(key_values) };
                    sort_buffer.push((key, out_line));
                }
                None => writer.write_record(&out_line)?,
            }
        }

        if let Some((_, direction)) = &self.order_by {
            sort_buffer.sort_by(|(a, _), (b, _)| match direction {
                SortDirection::Ascending => value::compare(a, b),
                SortDirection::Descending => value::compare(b, a),
            });
            for (_, line) in sort_buffer {
                writer.write_record(&line)?;
            }
        }

        Ok(())
    }
}

fn build_star_line(a_line: &str, bfields: &[Option<String>], delim: &str) -> String {
    let mut parts = vec![a_line.to_string()];
    parts.extend(bfields.iter().map(|f| f.clone().unwrap_or_else(|| "None".to_string())));
    parts.join(delim)
}

fn wrap_error(line: u64, err: EvalError) -> RuntimeError {
    match err {
        EvalError::BadField(index) => RuntimeError::BadFieldA { index, line },
        other => RuntimeError::AtLine { line, source: other },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rbql_eval::TreeWalkEvaluator;

    fn output_of(query_src: &str, input: &str) -> String {
        let query = rbql_core::compile(query_src).unwrap();
        let plan = ExecutionPlan::compile(&TreeWalkEvaluator, query, ',').unwrap();
        let mut out = Vec::new();
        {
            let mut writer = crate::writer::SimpleWriter::new(&mut out);
            plan.run(input.as_bytes(), &mut writer).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn selects_and_filters() {
        let out = output_of("select a1, a2 where int(a2) > 1", "x,1\ny,2\nz,3\n");
        assert_eq!(out, "y,2\nz,3\n");
    }

    #[test]
    fn orders_by_numeric_key_descending() {
        let out = output_of("select a1 order by int(a1) desc", "1\n3\n2\n");
        assert_eq!(out, "3\n2\n1\n");
    }

    #[test]
    fn orders_by_multi_key_tuple_ascending() {
        let out = output_of(
            "select a1, a2 order by a2, int(a1)",
            "10,car\n20,plane\n5,boat\n30,car\n2,plane\n",
        );
        assert_eq!(out, "5,boat\n10,car\n30,car\n2,plane\n20,plane\n");
    }

    #[test]
    fn bad_field_access_reports_a_column_and_line() {
        let query = rbql_core::compile("select a5").unwrap();
        let plan = ExecutionPlan::compile(&TreeWalkEvaluator, query, ',').unwrap();
        let mut out = Vec::new();
        let mut writer = crate::writer::SimpleWriter::new(&mut out);
        let err = plan.run("a,b\n".as_bytes(), &mut writer).unwrap_err();
        assert_eq!(err.to_string(), "No \"a5\" column at line: 1");
    }
}
