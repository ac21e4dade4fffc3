use clap::Parser;
use console::{Style, Term};
use rvstruct::ValueStruct;
use tracing_subscriber::EnvFilter;

use std::error::Error;

mod args;
use crate::commands::*;
use crate::errors::AppError;
use args::*;

mod reporter;

mod errors;

mod commands;

mod file_tools;

mod ocr;
use crate::ocr::OcrHandle;

mod text_tools;
use crate::text_tools::TextNormalizer;

pub type AppResult<T> = Result<T, AppError>;

mod common_types;

pub fn config_env_var(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|e| format!("{}: {}", name, e))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let term = Term::stdout();
    let err_term = Term::stderr();
    let bold_style = Style::new().bold();

    err_term.write_line(
        format!(
            "{} v{}",
            bold_style.clone().green().apply_to("OCR Match"),
            bold_style.apply_to(env!("CARGO_PKG_VERSION"))
        )
        .as_str(),
    )?;

    let cli = CliArgs::parse();
    if let Err(err) = handle_args(cli, &term, &err_term).await {
        err_term.write_line(
            format!(
                "{}: {}\nDetails: {:?}",
                bold_style.clone().red().apply_to("Error"),
                err,
                err.source()
            )
            .as_str(),
        )?;
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_args(cli: CliArgs, term: &Term, err_term: &Term) -> AppResult<()> {
    match cli.command {
        CliCommand::Compare {
            first_image,
            second_image,
            ocr_args,
            timeout_secs,
            text_args,
        } => {
            let verdict_scheme = text_args.verdict_scheme()?;
            let options = CompareCommandOptions::new(
                TextNormalizer::new(text_args.normalizer_options()),
                verdict_scheme.clone(),
                timeout_from_secs(timeout_secs)?,
            );
            let primary_ocr = OcrHandle::new(ocr_args.to_ocr_options(ocr_args.ocr)?);
            let fallback_ocr = ocr_args
                .fallback_ocr
                .filter(|fallback| *fallback != ocr_args.ocr)
                .map(|fallback| ocr_args.to_ocr_options(fallback))
                .transpose()?
                .map(OcrHandle::new);

            // Progress goes to stderr when stdout carries JSON.
            let progress_term = if text_args.json { err_term } else { term };
            let compare_result = command_compare(
                progress_term,
                &first_image,
                &second_image,
                options,
                &primary_ocr,
                fallback_ocr.as_ref(),
            )
            .await?;
            if text_args.json {
                term.write_line(serde_json::to_string_pretty(&compare_result)?.as_str())?;
            } else {
                write_compare_result(term, &compare_result, &verdict_scheme)?;
            }
        }
        CliCommand::Score {
            first_text,
            second_text,
            text_args,
        } => {
            let verdict_scheme = text_args.verdict_scheme()?;
            let options = ScoreCommandOptions {
                normalizer: TextNormalizer::new(text_args.normalizer_options()),
                verdict_scheme: verdict_scheme.clone(),
            };
            let score_result = command_score(&first_text, &second_text, &options);
            if text_args.json {
                term.write_line(serde_json::to_string_pretty(&score_result)?.as_str())?;
            } else {
                term.write_line(
                    format!(
                        "Normalized: {} | {}",
                        Style::new()
                            .bold()
                            .apply_to(score_result.comparison.first_normalized.value()),
                        Style::new()
                            .bold()
                            .apply_to(score_result.comparison.second_normalized.value()),
                    )
                    .as_str(),
                )?;
                write_score_and_verdict(
                    term,
                    &score_result.comparison.score,
                    &score_result.comparison.verdict,
                    &verdict_scheme,
                )?;
            }
        }
        CliCommand::Normalize {
            text,
            transliterate,
        } => {
            let normalizer =
                TextNormalizer::new(text_tools::TextNormalizerOptions { transliterate });
            let normalized = command_normalize(&text, &normalizer);
            term.write_line(normalized.value())?;
        }
    }

    Ok(())
}
