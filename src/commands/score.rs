use super::Host;
use crate::Result;
use crate::config::{
    DEFAULT_CLONE_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_HUB_URL, DEFAULT_LOG_TIMEOUT_SECS, DEFAULT_WORKERS, RunConfig,
};
use crate::metrics::{
    BusFactorMetric, CodeQualityMetric, DatasetCodeMetric, DatasetQualityMetric, LicenseMetric, MetricRegistry,
    PerformanceClaimsMetric, RampUpMetric, SizeFitMetric,
};
use crate::model::{Category, Target};
use crate::orchestrator::Orchestrator;
use crate::reports::write_ndjson;
use crate::sources::{GitCli, HttpHubClient};
use camino::Utf8PathBuf;
use chrono::Utc;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use std::io::Write;
use std::sync::Arc;
use url::Url;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// File listing targets to score, one `CATEGORY URL` pair per line
    #[arg(value_name = "TARGETS_FILE")]
    pub targets_file: Utf8PathBuf,

    /// Number of targets scored concurrently
    #[arg(long, value_name = "COUNT", env = "MODEL_RANK_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Base URL of the artifact hub
    #[arg(long, value_name = "URL", env = "MODEL_RANK_HUB_URL", default_value = DEFAULT_HUB_URL)]
    pub hub_url: Url,

    /// Per-request timeout for hub API calls, in seconds
    #[arg(long, value_name = "SECONDS", env = "MODEL_RANK_HTTP_TIMEOUT", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout: u64,

    /// Timeout for one git clone, in seconds
    #[arg(long, value_name = "SECONDS", env = "MODEL_RANK_CLONE_TIMEOUT", default_value_t = DEFAULT_CLONE_TIMEOUT_SECS)]
    pub clone_timeout: u64,

    /// Timeout for one git log query, in seconds
    #[arg(long, value_name = "SECONDS", env = "MODEL_RANK_LOG_TIMEOUT", default_value_t = DEFAULT_LOG_TIMEOUT_SECS)]
    pub log_timeout: u64,

    /// Level of detail for diagnostic output
    #[arg(long, value_name = "LEVEL", value_enum, default_value = "none")]
    pub log_level: LogLevel,
}

impl ScoreArgs {
    fn to_config(&self) -> RunConfig {
        RunConfig {
            workers: self.workers,
            hub_url: self.hub_url.clone(),
            http_timeout: Duration::from_secs(self.http_timeout),
            clone_timeout: Duration::from_secs(self.clone_timeout),
            log_timeout: Duration::from_secs(self.log_timeout),
        }
    }
}

/// Score every target in the input file and emit one NDJSON record per
/// completed target, in completion order.
///
/// # Errors
///
/// Returns an error when the input file cannot be read or parsed, or when
/// the pipeline cannot be assembled. Per-target failures are reported to the
/// host's error stream and turn into a non-zero exit code instead.
pub async fn process_score<H: Host>(host: &mut H, args: &ScoreArgs) -> Result<()> {
    init_logging(args.log_level);

    let content = std::fs::read_to_string(&args.targets_file)
        .into_app_err_with(|| format!("could not read targets file '{}'", args.targets_file))?;
    let targets = parse_targets(&content)?;

    if targets.is_empty() {
        log::info!("No targets to score");
        return Ok(());
    }

    let config = args.to_config();
    let registry = build_registry(&config)?;
    let orchestrator = Orchestrator::new(Arc::new(registry), config.workers)?;

    let outcome = orchestrator.compute_all(targets).await;

    write_ndjson(&mut host.output(), &outcome.results)?;

    if !outcome.errors.is_empty() {
        let mut report = format!("Unable to score {} target(s)\n", outcome.errors.len());
        for error in &outcome.errors {
            report.push_str(&format!("  {error}\n"));
        }
        let _ = write!(host.error(), "{report}");
        host.exit(1);
    }

    Ok(())
}

/// Parse the targets file: one `CATEGORY URL` (or `CATEGORY,URL`) pair per
/// line, blank lines and `#` comments skipped.
///
/// # Errors
///
/// Returns an error naming the offending line when a line is malformed.
pub fn parse_targets(content: &str) -> Result<Vec<Target>> {
    let mut targets = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (category, url) = line
            .split_once(',')
            .or_else(|| line.split_once(char::is_whitespace))
            .ok_or_else(|| app_err!("line {}: expected 'CATEGORY URL', got '{line}'", index + 1))?;

        let category: Category = category
            .trim()
            .parse()
            .map_err(|e| app_err!("line {}: {e}", index + 1))?;
        let target = Target::parse(url.trim(), category).map_err(|e| app_err!("line {}: {e}", index + 1))?;
        targets.push(target);
    }

    Ok(targets)
}

/// Assemble the full plugin registry over shared hub and git collaborators.
///
/// Registration order is the per-target execution order.
fn build_registry(config: &RunConfig) -> Result<MetricRegistry> {
    let hub = Arc::new(HttpHubClient::new(config)?);
    let git = Arc::new(GitCli::new(config.clone_timeout, config.log_timeout));
    let now = Utc::now();

    let mut registry = MetricRegistry::new();
    registry.register(Arc::new(RampUpMetric::new(hub.clone())))?;
    registry.register(Arc::new(BusFactorMetric::new(git.clone(), now)))?;
    registry.register(Arc::new(PerformanceClaimsMetric::new(hub.clone())))?;
    registry.register(Arc::new(LicenseMetric::new(hub.clone())))?;
    registry.register(Arc::new(SizeFitMetric::new(hub.clone())))?;
    registry.register(Arc::new(DatasetCodeMetric::new(hub.clone())))?;
    registry.register(Arc::new(DatasetQualityMetric::new(hub)))?;
    registry.register(Arc::new(CodeQualityMetric::new(git, now)))?;

    Ok(registry)
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets_space_and_comma_forms() {
        let content = "MODEL https://huggingface.co/org/model\nDATASET,https://huggingface.co/datasets/org/data\n";
        let targets = parse_targets(content).unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name(), "org/model");
        assert_eq!(targets[0].category(), Category::Model);
        assert_eq!(targets[1].name(), "org/data");
        assert_eq!(targets[1].category(), Category::Dataset);
    }

    #[test]
    fn test_parse_targets_skips_blanks_and_comments() {
        let content = "# scored nightly\n\nCODE https://github.com/owner/repo\n   \n";
        let targets = parse_targets(content).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].category(), Category::Code);
    }

    #[test]
    fn test_parse_targets_category_is_case_insensitive() {
        let targets = parse_targets("model https://huggingface.co/org/model\n").unwrap();
        assert_eq!(targets[0].category(), Category::Model);
    }

    #[test]
    fn test_parse_targets_rejects_malformed_lines() {
        assert!(parse_targets("justoneword\n").is_err());
        assert!(parse_targets("GADGET https://huggingface.co/org/model\n").is_err());
        assert!(parse_targets("MODEL notaurl\n").is_err());
    }

    #[test]
    fn test_build_registry_holds_every_plugin() {
        let registry = build_registry(&RunConfig::default()).unwrap();
        assert_eq!(registry.len(), 8);

        let names: Vec<&str> = registry.all_metrics().iter().map(|m| m.name()).collect();
        assert_eq!(names[0], "ramp_up_time");
        assert_eq!(names[4], "size_score");
        assert_eq!(names[7], "code_quality");
    }
}
