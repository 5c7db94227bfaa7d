//! Integration tests for the fan-out/merge pipeline over stub plugins,
//! checking the batch partition guarantee and the NDJSON output shape.

use async_trait::async_trait;
use model_rank::metrics::{Metric, MetricError, MetricRegistry};
use model_rank::model::{Category, MetricResult, Target};
use model_rank::orchestrator::Orchestrator;
use model_rank::reports::write_ndjson;
use std::collections::HashSet;
use std::sync::Arc;

/// Scores `bus_factor` at a fixed value, failing targets whose name carries
/// a marker substring.
struct FlakyBusFactor;

#[async_trait]
impl Metric for FlakyBusFactor {
    fn name(&self) -> &'static str {
        "bus_factor"
    }

    fn supports(&self, _target: &Target) -> bool {
        true
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        if target.name().contains("broken") {
            return Err(MetricError::service("stub", Some(500), "upstream unavailable"));
        }

        let mut result = MetricResult::new(target.name(), target.category());
        result.bus_factor = 0.6;
        result.bus_factor_latency = 3;
        Ok(result)
    }
}

struct FixedRampUp;

#[async_trait]
impl Metric for FixedRampUp {
    fn name(&self) -> &'static str {
        "ramp_up_time"
    }

    fn supports(&self, target: &Target) -> bool {
        target.category() == Category::Model
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let mut result = MetricResult::new(target.name(), target.category());
        result.ramp_up_time = 0.8;
        result.ramp_up_time_latency = 5;
        Ok(result)
    }
}

fn registry() -> Arc<MetricRegistry> {
    let mut registry = MetricRegistry::new();
    registry.register(Arc::new(FlakyBusFactor)).unwrap();
    registry.register(Arc::new(FixedRampUp)).unwrap();
    Arc::new(registry)
}

fn model(name: &str) -> Target {
    Target::parse(&format!("https://huggingface.co/org/{name}"), Category::Model).unwrap()
}

#[tokio::test]
async fn batch_partitions_into_disjoint_results_and_errors() {
    let orchestrator = Orchestrator::new(registry(), 3).unwrap();

    let targets = vec![
        model("alpha"),
        model("broken-one"),
        model("beta"),
        model("gamma"),
        model("broken-two"),
        model("delta"),
        model("epsilon"),
    ];
    let outcome = orchestrator.compute_all(targets).await;

    assert_eq!(outcome.results.len(), 5);
    assert_eq!(outcome.errors.len(), 2);

    let succeeded: HashSet<&str> = outcome.results.iter().map(|r| r.name.as_str()).collect();
    let failed: HashSet<String> = outcome.errors.iter().map(|e| e.target.name().to_string()).collect();
    assert!(succeeded.iter().all(|name| !failed.contains(*name)));
    assert!(failed.iter().all(|name| name.contains("broken")));
}

#[tokio::test]
async fn merged_result_carries_every_contributing_dimension() {
    let orchestrator = Orchestrator::new(registry(), 2).unwrap();
    let outcome = orchestrator.compute_all(vec![model("solo")]).await;

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert_eq!(result.bus_factor, 0.6);
    assert_eq!(result.ramp_up_time, 0.8);
    assert!(result.net_score > 0.0);
    assert_eq!(result.net_score_latency, 0);
}

#[tokio::test]
async fn ndjson_output_round_trips_per_line() {
    let orchestrator = Orchestrator::new(registry(), 2).unwrap();
    let outcome = orchestrator.compute_all(vec![model("alpha"), model("beta")]).await;

    let mut buffer = Vec::new();
    write_ndjson(&mut buffer, &outcome.results).unwrap();

    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    for line in lines {
        let parsed: MetricResult = serde_json::from_str(line).unwrap();
        assert_eq!(parsed.category, Category::Model);
        assert_eq!(parsed.bus_factor, 0.6);
    }
}

#[tokio::test]
async fn plugin_error_fails_only_its_own_target() {
    let orchestrator = Orchestrator::new(registry(), 1).unwrap();
    let outcome = orchestrator.compute_all(vec![model("broken-solo"), model("fine")]).await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].name, "org/fine");
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].message.contains("upstream unavailable"));
}
