use std::io::{Cursor, Read, Write};

use clap::Parser as _;
use rbql_engine::ExecutionPlan;
use rbql_eval::TreeWalkEvaluator;

pub mod commands;
pub mod config;
pub mod encoding;
mod logger;

use crate::commands::Cli;
use crate::config::Config;
use crate::encoding::{EncodedWriter, Encoding};

/// Parses CLI arguments, runs the query and returns the process exit code.
pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let _ = logger::init(cli.verbose);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    let query = match rbql_core::compile(&config.query) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("RBQL Parsing Error: {e}");
            return 1;
        }
    };
    let join_table_path = query.join.as_ref().map(|join| join.table_b_path.clone());

    let plan = match ExecutionPlan::compile(&TreeWalkEvaluator, query, config.delim) {
        Ok(plan) => plan,
        // A `SELECT`/`WHERE`/`ORDER BY` clause body is compiled up front, before
        // any row is read, so a syntactically broken expression is a parsing
        // failure, not a runtime one.
        Err(rbql_engine::RuntimeError::CompileTime(e)) => {
            eprintln!("RBQL Parsing Error: {e}");
            return 1;
        }
        Err(e) => {
            eprintln!("RBQL Runtime Error: {e}");
            return 1;
        }
    };

    let plan = match apply_join_encoding(plan, join_table_path, &config) {
        Ok(plan) => plan,
        Err(code) => return code,
    };

    let input_bytes = match read_all(config.input.as_deref()) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("RBQL Runtime Error: {e}");
            return 1;
        }
    };
    let input_text = match config.csv_encoding.decode(&input_bytes) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("RBQL Runtime Error: {e}");
            return 1;
        }
    };

    let output: Box<dyn Write> = match &config.output {
        Some(path) => match std::fs::File::create(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("RBQL Runtime Error: {e}");
                return 1;
            }
        },
        None => Box::new(std::io::stdout()),
    };
    let encoded_output = EncodedWriter::new(output, config.csv_encoding);

    let run_result = if plan.distinct() {
        let mut writer = rbql_engine::UniqWriter::new(encoded_output);
        plan.run(Cursor::new(input_text.into_bytes()), &mut writer)
    } else {
        let mut writer = rbql_engine::SimpleWriter::new(encoded_output);
        plan.run(Cursor::new(input_text.into_bytes()), &mut writer)
    };

    match run_result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("RBQL Runtime Error: {e}");
            1
        }
    }
}

fn apply_join_encoding<C: rbql_eval::CompiledExpr>(
    plan: ExecutionPlan<C>,
    join_table_path: Option<String>,
    config: &Config,
) -> Result<ExecutionPlan<C>, i32> {
    let Some(path) = join_table_path else {
        return Ok(plan);
    };
    if config.join_csv_encoding == Encoding::Latin1 {
        // `ExecutionPlan::compile` already loaded the table this way.
        return Ok(plan);
    }
    let raw = std::fs::read(&path).map_err(|e| {
        eprintln!("RBQL Runtime Error: {e}");
        1
    })?;
    let decoded = config.join_csv_encoding.decode(&raw).map_err(|e| {
        eprintln!("RBQL Runtime Error: {e}");
        1
    })?;
    plan.override_join_table(Cursor::new(decoded.into_bytes()), config.delim).map_err(|e| {
        eprintln!("RBQL Runtime Error: {e}");
        1
    })
}

fn read_all(path: Option<&std::path::Path>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    match path {
        Some(path) => std::fs::File::open(path)?.read_to_end(&mut buf)?,
        None => std::io::stdin().read_to_end(&mut buf)?,
    };
    Ok(buf)
}
