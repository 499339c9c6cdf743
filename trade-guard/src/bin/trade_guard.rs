//! trade-guard command line
//!
//! Validates one or more transaction exports and prints a report per file.
//! Exit status: 0 when every report passed, 1 when any failed, 2 when the
//! command line itself could not be honored.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use trade_guard::core::{ValidationContext, ValidationReport, Validator, ValidatorConfig};
use trade_guard::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ResultFormatter};
use trade_guard::logging::setup::{init_logging, LoggingConfig};
use trade_guard::logging::LogConfig;
use trade_guard::sources::expand_globs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Sectioned console report
    Human,
    /// One JSON report per line
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Export files or glob patterns to validate
    #[arg(required = true)]
    files: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Disable ANSI colors in human output
    #[arg(long)]
    no_color: bool,

    /// Log level for trade-guard internals (logs go to stderr)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Warn when the data spans more than this many days
    #[arg(long)]
    max_date_span_days: Option<i64>,

    /// Warn about transactions whose absolute amount exceeds this value
    #[arg(long)]
    extreme_amount: Option<Decimal>,
}

impl Args {
    fn validator_config(&self) -> ValidatorConfig {
        let mut config = ValidatorConfig::default();
        if let Some(days) = self.max_date_span_days {
            config = config.with_max_date_span_days(days);
        }
        if let Some(amount) = self.extreme_amount {
            config = config.with_extreme_amount(amount);
        }
        config
    }

    fn log_config(&self) -> LogConfig {
        if self.log_level >= tracing::Level::DEBUG {
            LogConfig::verbose()
        } else {
            LogConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let outcome = run(args).await;
    if let Err(e) = &outcome {
        eprintln!("error: {e:#}");
    }
    ExitCode::from(exit_status(&outcome))
}

/// 0 when every report passed, 1 when any failed, 2 when the run itself
/// failed.
fn exit_status(outcome: &Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Returns whether every report passed.
async fn run(args: Args) -> Result<bool> {
    init_logging(
        LoggingConfig::default()
            .with_crate_level(args.log_level)
            .with_json_format(args.json_logs),
    )
    .context("failed to initialize logging")?;

    let files = expand_globs(&args.files)?;
    let validator = Validator::builder()
        .config(args.validator_config())
        .log_config(args.log_config())
        .build()
        .context("invalid validator configuration")?;

    let paths = files.into_iter().map(PathBuf::from).collect();
    let reports = Arc::new(validator)
        .validate_all(paths, ValidationContext::now())
        .await;

    let use_colors = !args.no_color && std::io::stdout().is_terminal();
    let mut out = std::io::stdout().lock();
    print_reports(&mut out, &reports, args.format, use_colors)?;

    Ok(reports.iter().all(ValidationReport::passed))
}

/// Human reports are separated by a blank line; JSON reports are written
/// one compact object per line.
fn print_reports(
    out: &mut impl Write,
    reports: &[ValidationReport],
    format: OutputFormat,
    use_colors: bool,
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            let formatter =
                HumanFormatter::with_config(FormatterConfig::default().with_colors(use_colors));
            for (idx, report) in reports.iter().enumerate() {
                if idx > 0 {
                    writeln!(out)?;
                }
                write!(out, "{}", report.format_with(&formatter)?)?;
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new().with_pretty(false);
            for report in reports {
                writeln!(out, "{}", report.format_with(&formatter)?)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
