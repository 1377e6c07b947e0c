use std::path::PathBuf;

use clap::Parser;

use crate::encoding::Encoding;

#[derive(Debug, Parser)]
#[command(name = "rbql")]
#[command(
    about = "Query delimited text records with a SQL-like expression language",
    long_about = None,
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// The RBQL query text.
    #[arg(long)]
    pub query: Option<String>,
    /// Path to a file containing the RBQL query text.
    #[arg(long)]
    pub query_file: Option<PathBuf>,
    /// Field delimiter. Accepts a literal character or the escape `\t`.
    #[arg(long)]
    pub delim: Option<String>,
    /// Input file. Defaults to stdin.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Output file. Defaults to stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Encoding of the input and output streams.
    #[arg(long, value_enum)]
    pub csv_encoding: Option<Encoding>,
    /// Encoding of the JOIN table, if it differs from `--csv-encoding`.
    #[arg(long, value_enum)]
    pub join_csv_encoding: Option<Encoding>,
    /// Raise the log level to debug for this run.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
