mod args;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::Level;
use websql_sync::prelude::*;

use crate::args::{Args, RunMode};
use crate::logging::LogWriter;

#[derive(Serialize)]
struct TransactionReport {
    outcome: &'static str,
    results: Vec<Option<BatchResult>>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let writer = LogWriter::new(args.log.clone()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(Level::INFO)
        .init();

    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let sql = match (&args.sql, &args.file) {
        (Some(sql), _) => sql.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("either --sql or --file is required".into()),
    };
    let parameters = args.parameters()?;

    let db = DatabaseOptionsBuilder::new(args.db.clone())
        .wal(args.wal)
        .open()?;
    tracing::info!(db = %args.db, mode = ?args.mode, "running script");

    let json = match args.mode {
        RunMode::Batch => {
            let mut options = QueryOptions::new();
            if let Some(parameters) = parameters {
                options = options.parameters(parameters);
            }
            let batch = db.query(&sql, options)?;
            to_json(&batch, args.pretty)?
        }
        RunMode::Transaction => {
            let mut results = Vec::new();
            let outcome = db.transaction(
                |tx| {
                    let mut options = ExecuteOptions::new();
                    if let Some(parameters) = parameters {
                        options = options.parameters(parameters);
                    }
                    results.push(tx.execute_sql(&sql, options)?);
                    Ok(())
                },
                TransactionCallbacks::new()
                    .on_error(|_| tracing::warn!("transaction rolled back")),
            )?;
            let report = TransactionReport {
                outcome: if outcome.is_committed() {
                    "committed"
                } else {
                    "rolled_back"
                },
                results,
            };
            to_json(&report, args.pretty)?
        }
    };

    db.close()?;
    Ok(json)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
