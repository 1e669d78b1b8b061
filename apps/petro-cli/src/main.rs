//! # petro
//!
//! ```text
//! petro login --name "Dana Field"                      → {"token": ..., "user": ...}
//! petro --token $T shift current --station S1          → current inventory shift
//! petro --token $T reading record --shift X --station S1 --reading N1=1520.5
//! petro --token $T cash deposit --transaction C1 --receipt slip.jpg
//! ```
//!
//! Results go to stdout as JSON. Logs and errors go to stderr; the exit code
//! reflects the error category.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use petro_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let pretty = cli.pretty;

    match petro_cli::run(cli).await {
        Ok(value) => {
            let rendered = if pretty {
                serde_json::to_string_pretty(&value)
            } else {
                serde_json::to_string(&value)
            };
            match rendered {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("{}", petro_cli::error::CliError::from(err).to_json());
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::from(err.exit_code())
        }
    }
}

/// Structured logging on stderr.
///
/// `RUST_LOG` overrides the default of `info,petro=debug,sqlx=warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,petro=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
