//! The validation pipeline: detect, load, check, summarize.

use super::{Check, Dataset, Finding, ValidationContext, ValidationReport, ValidatorConfig};
use crate::analyzers::SummaryAggregator;
use crate::logging::{truncate_field, LogConfig};
use crate::prelude::*;
use crate::sources::{canonicalize, sniff_file, NewFormatTransformer, RowTransformer, SchemaVariant};
use crate::{log_constraint, log_data_op, perf_debug};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Name recorded on errors raised while reading or sniffing the file.
pub const FORMAT_STAGE: &str = "file_format";
/// Name recorded on errors raised while loading rows.
pub const LOAD_STAGE: &str = "data_loading";

/// Runs the full validation pipeline over export files.
///
/// A `Validator` holds no per-run state, so one instance can validate many
/// files, including concurrently from several threads.
///
/// ```rust,no_run
/// use trade_guard::core::Validator;
///
/// # fn example() -> trade_guard::prelude::Result<()> {
/// let validator = Validator::builder().build()?;
/// let report = validator.validate("history.csv");
/// println!("{}", report.to_human()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Validator {
    config: ValidatorConfig,
    transformer: Arc<dyn RowTransformer>,
    log_config: LogConfig,
    quality: Check,
    consistency: Check,
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates `path` against the current local time.
    pub fn validate(&self, path: impl AsRef<Path>) -> ValidationReport {
        self.validate_with_context(path, &ValidationContext::now())
    }

    /// Validates `path` treating `reference_time` as "now".
    pub fn validate_at(
        &self,
        path: impl AsRef<Path>,
        reference_time: NaiveDateTime,
    ) -> ValidationReport {
        self.validate_with_context(path, &ValidationContext::new(reference_time))
    }

    /// Validates `path` with an explicit context, so "future" is decided by
    /// the caller's reference time.
    #[instrument(skip(self, path, ctx), fields(path = %path.as_ref().display()))]
    pub fn validate_with_context(
        &self,
        path: impl AsRef<Path>,
        ctx: &ValidationContext,
    ) -> ValidationReport {
        let path = path.as_ref();
        let source = path.display().to_string();
        log_data_op!(self.log_config, source = %source, "Validating export");

        let variant = match sniff_file(path) {
            Ok(variant) => variant,
            Err(e) => return self.abort(source, None, e),
        };

        let dataset = match canonicalize(
            path,
            variant,
            self.transformer.as_ref(),
            &self.config.default_currency,
        ) {
            Ok(dataset) => dataset,
            Err(e) => return self.abort(source, Some(variant), e),
        };

        perf_debug!(
            self.log_config,
            rows = dataset.len(),
            coercion_failures = dataset.coercion_failures().len(),
            "Dataset canonicalized"
        );

        let warnings = self.check(&dataset, ctx);
        let stats = SummaryAggregator::summarize(&dataset);

        if self.log_config.log_metrics {
            info!(
                format = %variant,
                transactions = stats.total_transactions,
                warnings = warnings.len(),
                "Validation completed"
            );
        }
        ValidationReport::completed(source, variant, warnings, stats)
    }

    /// Runs the quality rules, then the consistency rules, over a loaded
    /// dataset.
    pub fn check(&self, dataset: &Dataset, ctx: &ValidationContext) -> Vec<Finding> {
        let mut findings = self.quality.run(dataset, ctx);
        findings.extend(self.consistency.run(dataset, ctx));

        for finding in &findings {
            log_constraint!(
                self.log_config,
                check = %finding.check,
                message = %truncate_field(&finding.message, self.log_config.max_field_length),
                "Finding recorded"
            );
        }
        findings
    }

    /// Validates several files on the blocking thread pool.
    ///
    /// Reports are returned in the order of `paths`, whatever order the
    /// runs finish in.
    pub async fn validate_all(
        self: Arc<Self>,
        paths: Vec<PathBuf>,
        ctx: ValidationContext,
    ) -> Vec<ValidationReport> {
        let handles: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let validator = Arc::clone(&self);
                let source = path.display().to_string();
                let handle = tokio::task::spawn_blocking(move || {
                    validator.validate_with_context(&path, &ctx)
                });
                (source, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (source, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    warn!(source = %source, error = %e, "Validation task failed");
                    ValidationReport::aborted(
                        source,
                        None,
                        Finding::error(LOAD_STAGE, format!("Validation task failed: {e}")),
                    )
                }
            };
            reports.push(report);
        }
        reports
    }

    /// Folds a fatal error into a one-error report, named after the stage
    /// the error belongs to.
    fn abort(
        &self,
        source: String,
        format: Option<SchemaVariant>,
        error: GuardError,
    ) -> ValidationReport {
        let stage = if error.is_format_error() {
            FORMAT_STAGE
        } else {
            LOAD_STAGE
        };
        warn!(source = %source, stage, error = %error, "Validation aborted");
        ValidationReport::aborted(
            source,
            format,
            Finding::error(stage, error.to_finding_message()),
        )
    }
}

/// Builder for [`Validator`].
#[derive(Debug, Default)]
pub struct ValidatorBuilder {
    config: Option<ValidatorConfig>,
    transformer: Option<Arc<dyn RowTransformer>>,
    log_config: Option<LogConfig>,
}

impl ValidatorBuilder {
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the built-in [`NewFormatTransformer`].
    pub fn transformer(mut self, transformer: impl RowTransformer + 'static) -> Self {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = Some(log_config);
        self
    }

    /// Validates the configuration and builds the checks.
    pub fn build(self) -> Result<Validator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Validator {
            quality: Check::quality(&config)?,
            consistency: Check::consistency(&config),
            transformer: self
                .transformer
                .unwrap_or_else(|| Arc::new(NewFormatTransformer::new())),
            log_config: self.log_config.unwrap_or_default(),
            config,
        })
    }
}
