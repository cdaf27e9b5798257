mod cli;

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use content_safety::{Analysis, ContentGuard};

use crate::cli::{Cli, Command, InputArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let guard = ContentGuard::new().context("failed to compile the built-in pattern catalogue")?;

    match cli.command {
        Command::Scan { input, json } => {
            let text = read_input(&input)?;
            let analysis = guard.analyze(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_summary(&analysis);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Metadata { input } => {
            let text = read_input(&input)?;
            let meta = guard.safety_metadata(&text);
            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Redact { input } => {
            let text = read_input(&input)?;
            println!("{}", guard.redact_critical(&text));
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { input } => {
            let text = read_input(&input)?;
            match guard.validate_for_post(&text) {
                None => Ok(ExitCode::SUCCESS),
                Some(notice) => {
                    eprintln!("{}", notice.message);
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}

/// Resolve the input text: positional argument, then `--file`, then stdin.
fn read_input(input: &InputArgs) -> Result<String> {
    if let Some(ref text) = input.text {
        return Ok(text.clone());
    }
    if let Some(ref path) = input.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file: {}", path.display()));
    }
    debug!("no text or file argument; reading from stdin");
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read from stdin")?;
    Ok(buf)
}

fn print_summary(analysis: &Analysis) {
    println!(
        "recommendation: {}  (score {}/100)",
        analysis.recommendation, analysis.score
    );
    if analysis.findings.is_empty() {
        println!("no findings");
        return;
    }
    println!("findings:");
    for f in &analysis.findings {
        println!(
            "  [{}] {}  {:?}",
            f.severity, f.category, f.matched_text
        );
    }
}
