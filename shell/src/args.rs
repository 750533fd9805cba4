use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use websql_sync::{Parameters, RowValues, WebSqlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RunMode {
    /// Run the script as one batch.
    Batch,
    /// Wrap the script in BEGIN/COMMIT.
    Transaction,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a SQL batch and print every result set as JSON")]
pub(crate) struct Args {
    /// Database path; `:memory:` for a throwaway database.
    #[arg(long, default_value = ":memory:")]
    pub(crate) db: String,
    /// SQL text to run.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub(crate) sql: Option<String>,
    /// File holding the SQL text to run.
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "batch")]
    pub(crate) mode: RunMode,
    /// Positional parameter, repeatable; consumed left to right across statements.
    #[arg(long = "param", conflicts_with = "named")]
    pub(crate) params: Vec<String>,
    /// Named parameter as `name=value`, repeatable.
    #[arg(long)]
    pub(crate) named: Vec<String>,
    #[arg(long)]
    pub(crate) wal: bool,
    #[arg(long)]
    pub(crate) pretty: bool,
    /// Also write log output to this file.
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
}

impl Args {
    pub(crate) fn parameters(&self) -> Result<Option<Parameters>, WebSqlError> {
        if !self.named.is_empty() {
            let pairs = self
                .named
                .iter()
                .map(|raw| {
                    raw.split_once('=')
                        .map(|(name, value)| (name.trim().to_string(), parse_value(value)))
                        .filter(|(name, _)| !name.is_empty())
                        .ok_or_else(|| {
                            WebSqlError::ParameterError(format!(
                                "expected name=value, got `{raw}`"
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Some(Parameters::named(pairs)));
        }
        if self.params.is_empty() {
            return Ok(None);
        }
        Ok(Some(Parameters::positional(
            self.params.iter().map(|raw| parse_value(raw)).collect(),
        )))
    }
}

/// Integers, then floats, then `null`; anything else is text.
pub(crate) fn parse_value(raw: &str) -> RowValues {
    if let Ok(i) = raw.parse::<i64>() {
        RowValues::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        RowValues::Float(f)
    } else if raw.eq_ignore_ascii_case("null") {
        RowValues::Null
    } else {
        RowValues::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_values() {
        assert_eq!(parse_value("5"), RowValues::Int(5));
        assert_eq!(parse_value("1.5"), RowValues::Float(1.5));
        assert_eq!(parse_value("NULL"), RowValues::Null);
        assert_eq!(parse_value("arm"), RowValues::Text("arm".into()));
    }

    #[test]
    fn builds_named_parameters() {
        let args = Args::parse_from(["websql-shell", "--sql", "SELECT $x", "--named", "$x=1"]);
        let params = args.parameters().unwrap();
        assert_eq!(params, Some(Parameters::named([("$x", RowValues::Int(1))])));
    }

    #[test]
    fn rejects_malformed_named_parameter() {
        let args = Args::parse_from(["websql-shell", "--sql", "SELECT 1", "--named", "oops"]);
        assert!(matches!(
            args.parameters(),
            Err(WebSqlError::ParameterError(_))
        ));
    }
}
