use clap::Parser;
use console::{Style, Term};
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::process::ExitCode;

mod args;
use crate::commands::*;
use crate::errors::AppError;
use crate::extractor::error_diagnostic;
use args::*;

mod reporter;

mod errors;

mod commands;

mod inference;

mod extractor;

mod image_assets;

mod workout;

pub type AppResult<T> = Result<T, AppError>;

mod common_types;

pub fn config_env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let term = Term::stdout();
    let bold_style = Style::new().bold();

    term.write_line(
        format!(
            "{} v{}",
            bold_style.clone().green().apply_to("Workout Scan"),
            bold_style.apply_to(env!("CARGO_PKG_VERSION"))
        )
        .as_str(),
    )?;

    let cli = CliArgs::parse();
    match handle_args(cli, &term, config_env_var).await {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(err) if err.is_configuration_error() => {
            term.write_line(&error_diagnostic(&err))?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            term.write_line(
                format!(
                    "{}: {}\nDetails: {:?}",
                    bold_style.clone().red().apply_to("Error"),
                    err,
                    err.source()
                )
                .as_str(),
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_args<F>(cli: CliArgs, term: &Term, lookup_env: F) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match cli.command {
        CliCommand::Scan {
            image_path,
            structured,
            extractor_args,
        } => {
            let inference_options = extractor_args.resolve_options(lookup_env)?;
            let scan_result = command_scan(
                term,
                &image_path,
                extraction_mode(structured),
                inference_options,
            )
            .await?;
            Ok(scan_result.text_extracted)
        }
    }
}
