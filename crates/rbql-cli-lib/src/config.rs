use std::path::PathBuf;

use crate::encoding::Encoding;

/// Resolved, validated run configuration, built once from [`crate::commands::Cli`]
/// before query compilation starts.
pub struct Config {
    pub query: String,
    pub delim: char,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub csv_encoding: Encoding,
    pub join_csv_encoding: Encoding,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("exactly one of --query or --query-file must be given")]
    AmbiguousQuerySource,
    #[error("failed to read query file: {0}")]
    QueryFile(#[source] std::io::Error),
}

/// Expands the literal two-character escape `\t` the way the original's
/// `normalize_delim` does in reverse, then requires a single character.
pub fn parse_delim(raw: &str) -> char {
    match raw {
        "\\t" => '\t',
        _ => raw.chars().next().unwrap_or('\t'),
    }
}

impl Config {
    pub fn from_cli(cli: &crate::commands::Cli) -> Result<Self, ConfigError> {
        let query = match (&cli.query, &cli.query_file) {
            (Some(q), None) => q.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(ConfigError::QueryFile)?,
            _ => return Err(ConfigError::AmbiguousQuerySource),
        };
        let delim = cli.delim.as_deref().map(parse_delim).unwrap_or('\t');
        let csv_encoding = cli.csv_encoding.unwrap_or_default();
        let join_csv_encoding = cli.join_csv_encoding.unwrap_or(csv_encoding);
        Ok(Self {
            query,
            delim,
            input: cli.input.clone(),
            output: cli.output.clone(),
            csv_encoding,
            join_csv_encoding,
        })
    }
}
