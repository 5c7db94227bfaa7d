//! Parallel scoring orchestrator
//!
//! Fans targets out to a bounded pool of worker tasks. Each worker runs the
//! target's contributing plugins sequentially in registration order, folds
//! their partial results together, and derives the weighted net score.
//! Results are yielded in completion order, never input order.

use crate::metrics::{MetricRegistry, clamp01};
use crate::model::{MetricResult, Target};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

const LOG_TARGET: &str = "orchestrator";

/// Net-score weights per dimension. They sum to 1.0; `size_score`
/// contributes through its `desktop_pc` entry.
const RAMP_UP_WEIGHT: f64 = 0.15;
const BUS_FACTOR_WEIGHT: f64 = 0.15;
const PERFORMANCE_CLAIMS_WEIGHT: f64 = 0.10;
const LICENSE_WEIGHT: f64 = 0.10;
const SIZE_WEIGHT: f64 = 0.10;
const DATASET_CODE_WEIGHT: f64 = 0.10;
const DATASET_QUALITY_WEIGHT: f64 = 0.15;
const CODE_QUALITY_WEIGHT: f64 = 0.15;

/// A target that could not be scored, with the reason.
#[derive(Debug, Clone)]
pub struct TargetError {
    pub target: Target,
    pub message: String,
}

impl core::fmt::Display for TargetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.target, self.message)
    }
}

/// The outcome of one batch: completed results in completion order, plus the
/// targets that failed. Every input target lands in exactly one of the two.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<MetricResult>,
    pub errors: Vec<TargetError>,
}

/// Drives plugin execution for batches of targets.
pub struct Orchestrator {
    registry: Arc<MetricRegistry>,
    workers: usize,
}

impl Orchestrator {
    /// # Errors
    ///
    /// Returns an error when the registry is empty or the worker count is
    /// zero, both of which are startup misconfigurations.
    pub fn new(registry: Arc<MetricRegistry>, workers: usize) -> crate::Result<Self> {
        if registry.is_empty() {
            ohno::bail!("cannot orchestrate with an empty metric registry");
        }

        if workers == 0 {
            ohno::bail!("worker count must be at least 1");
        }

        Ok(Self { registry, workers })
    }

    /// Score a batch of targets with bounded parallelism.
    ///
    /// Targets run concurrently up to the worker limit; the plugins for any
    /// single target run sequentially. A plugin failure fails only its own
    /// target.
    pub async fn compute_all(&self, targets: Vec<Target>) -> BatchOutcome {
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut in_flight: FuturesUnordered<_> = targets
            .into_iter()
            .map(|target| {
                let registry = Arc::clone(&self.registry);
                let semaphore = Arc::clone(&semaphore);

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore must not be closed");
                    score_target(&registry, &target).await.map_err(|message| TargetError { target, message })
                })
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        while let Some(task_result) = in_flight.next().await {
            match task_result.expect("tasks must not panic") {
                Ok(result) => outcome.results.push(result),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Failed to score '{}': {}", e.target, e.message);
                    outcome.errors.push(e);
                }
            }
        }

        outcome
    }
}

/// Run every contributing plugin for one target, in registration order, and
/// fold the partials into a finished result.
async fn score_target(registry: &MetricRegistry, target: &Target) -> Result<MetricResult, String> {
    let contributing = registry.supported_metrics(target);
    if contributing.is_empty() {
        return Err("no metric supports this target".to_string());
    }

    let mut merged = MetricResult::new(target.name(), target.category());
    for metric in contributing {
        log::debug!(target: LOG_TARGET, "Running '{}' against '{target}'", metric.name());
        let partial = metric.compute(target).await.map_err(|e| e.to_string())?;
        merged = merged.merge(&partial);
    }

    merged.net_score = net_score(&merged);
    merged.net_score_latency = 0;
    Ok(merged)
}

/// Weighted reduction of the per-dimension scores, clamped into [0,1].
#[must_use]
pub fn net_score(result: &MetricResult) -> f64 {
    clamp01(
        RAMP_UP_WEIGHT * result.ramp_up_time
            + BUS_FACTOR_WEIGHT * result.bus_factor
            + PERFORMANCE_CLAIMS_WEIGHT * result.performance_claims
            + LICENSE_WEIGHT * result.license
            + SIZE_WEIGHT * result.size_score.desktop_pc
            + DATASET_CODE_WEIGHT * result.dataset_and_code_score
            + DATASET_QUALITY_WEIGHT * result.dataset_quality
            + CODE_QUALITY_WEIGHT * result.code_quality,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Metric, MetricError};
    use crate::model::Category;
    use async_trait::async_trait;

    struct FixedMetric {
        name: &'static str,
        category: Category,
        score: f64,
    }

    #[async_trait]
    impl Metric for FixedMetric {
        fn name(&self) -> &'static str {
            self.name
        }

        fn supports(&self, target: &Target) -> bool {
            target.category() == self.category
        }

        async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
            let mut result = MetricResult::new(target.name(), target.category());
            match self.name {
                "bus_factor" => result.bus_factor = self.score,
                "ramp_up_time" => result.ramp_up_time = self.score,
                _ => result.license = self.score,
            }
            Ok(result)
        }
    }

    fn model_target(name: &str) -> Target {
        Target::parse(&format!("https://huggingface.co/org/{name}"), Category::Model).unwrap()
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = RAMP_UP_WEIGHT
            + BUS_FACTOR_WEIGHT
            + PERFORMANCE_CLAIMS_WEIGHT
            + LICENSE_WEIGHT
            + SIZE_WEIGHT
            + DATASET_CODE_WEIGHT
            + DATASET_QUALITY_WEIGHT
            + CODE_QUALITY_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_net_score_is_clamped() {
        let mut result = MetricResult::new("org/model", Category::Model);
        result.ramp_up_time = 1.0;
        result.bus_factor = 1.0;
        result.performance_claims = 1.0;
        result.license = 1.0;
        result.size_score.desktop_pc = 1.0;
        result.dataset_and_code_score = 1.0;
        result.dataset_quality = 1.0;
        result.code_quality = 1.0;

        assert!((net_score(&result) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let result = Orchestrator::new(Arc::new(MetricRegistry::new()), 4);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_workers_are_rejected() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(FixedMetric {
                name: "bus_factor",
                category: Category::Model,
                score: 0.5,
            }))
            .unwrap();

        assert!(Orchestrator::new(Arc::new(registry), 0).is_err());
    }

    #[tokio::test]
    async fn test_unsupported_target_becomes_an_error() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(FixedMetric {
                name: "bus_factor",
                category: Category::Dataset,
                score: 0.5,
            }))
            .unwrap();

        let orchestrator = Orchestrator::new(Arc::new(registry), 2).unwrap();
        let outcome = orchestrator.compute_all(vec![model_target("unsupported")]).await;

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("no metric supports"));
    }

    #[tokio::test]
    async fn test_partials_merge_into_one_result() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(FixedMetric {
                name: "bus_factor",
                category: Category::Model,
                score: 0.6,
            }))
            .unwrap();
        registry
            .register(Arc::new(FixedMetric {
                name: "ramp_up_time",
                category: Category::Model,
                score: 0.8,
            }))
            .unwrap();

        let orchestrator = Orchestrator::new(Arc::new(registry), 2).unwrap();
        let outcome = orchestrator.compute_all(vec![model_target("merged")]).await;

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.results.len(), 1);
        let result = &outcome.results[0];
        assert_eq!(result.bus_factor, 0.6);
        assert_eq!(result.ramp_up_time, 0.8);
        let expected = RAMP_UP_WEIGHT * 0.8 + BUS_FACTOR_WEIGHT * 0.6;
        assert!((result.net_score - expected).abs() < 1e-12);
        assert_eq!(result.net_score_latency, 0);
    }

    #[tokio::test]
    async fn test_every_target_lands_exactly_once() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(FixedMetric {
                name: "bus_factor",
                category: Category::Model,
                score: 0.4,
            }))
            .unwrap();

        let orchestrator = Orchestrator::new(Arc::new(registry), 3).unwrap();
        let targets: Vec<Target> = (0..7).map(|i| model_target(&format!("m{i}"))).collect();
        let outcome = orchestrator.compute_all(targets).await;

        assert_eq!(outcome.results.len() + outcome.errors.len(), 7);
        let mut names: Vec<&str> = outcome.results.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 7);
    }
}
