use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use otelcolconvert::{Diagnostics, Severity};

#[derive(Parser, Debug)]
#[command(name = "otelcol2alloy")]
#[command(about = "Convert OpenTelemetry Collector configuration to Alloy")]
#[command(version)]
struct Cli {
    /// Collector YAML to convert (reads stdin if omitted)
    input: Option<PathBuf>,

    /// Where to write the Alloy configuration (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the output even when errors were reported
    #[arg(long)]
    bypass_errors: bool,

    /// Also write the diagnostics to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let input = match &cli.input {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            buf
        }
    };

    let (output, diags) = otelcolconvert::convert(&input, &[]);
    log::debug!("conversion produced {} diagnostics", diags.len());

    for diag in &diags {
        eprintln!("{}", diag);
    }
    if let Some(report) = &cli.report {
        write_report(report, &diags)?;
    }

    let has_errors = diags.has_severity_at_least(Severity::Error);
    if has_errors && !cli.bypass_errors {
        std::process::exit(1);
    }

    // Critical diagnostics never produce output, even with --bypass-errors.
    let Some(output) = output else {
        if diags.has_critical() {
            std::process::exit(1);
        }
        return Ok(());
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("writing {}", path.display()))?
        }
        None => io::stdout().write_all(&output).context("writing stdout")?,
    }
    Ok(())
}

fn write_report(path: &Path, diags: &Diagnostics) -> Result<()> {
    let mut report = diags.to_string();
    if !report.is_empty() {
        report.push('\n');
    }
    fs::write(path, report).with_context(|| format!("writing report {}", path.display()))
}
