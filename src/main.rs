// src/main.rs

use std::process::ExitCode;

use anyhow::Result;
use autowix::cli::{Cli, Paths, USAGE_EXIT_CODE};
use autowix::pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Log to stderr; the manifest itself only ever goes to its file
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let Some(cli) = Cli::from_args(std::env::args_os()) else {
        println!("{}", Cli::usage());
        return ExitCode::from(USAGE_EXIT_CODE);
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<autowix::Error>() {
            Some(fatal) => {
                eprintln!("Error: {}", fatal);
                ExitCode::from(fatal.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::from(1)
            }
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let paths = Paths::derive(&cli.input).map_err(|source| autowix::Error::OpenInput {
        path: cli.input.clone(),
        source,
    })?;

    let summary = pipeline::run(&paths)?;

    if !summary.report.warnings.is_empty() {
        info!("{} warning(s)", summary.report.warnings.len());
    }
    if summary.persisted.is_saved() {
        info!(
            "Saved {} GUID(s) to {}",
            summary.guids,
            paths.persistence.display()
        );
    }
    Ok(())
}
