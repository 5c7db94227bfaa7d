use super::{Metric, MetricError, clamp01, elapsed_ms};
use crate::model::{Category, MetricResult, Target};
use crate::sources::HubClient;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

/// Evidence keywords for benchmark and evaluation claims.
const CLAIM_KEYWORDS: [&str; 10] = [
    "benchmark",
    "evaluation",
    "results",
    "accuracy",
    "f1",
    "bleu",
    "rouge",
    "leaderboard",
    "state-of-the-art",
    "sota",
];

/// Quantitative results: percentages or decimal metric values.
static QUANTITATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(\.\d+)?\s*%|\b0\.\d{2,}\b").expect("quantitative pattern must compile"));

const KEYWORD_WEIGHT: f64 = 0.6;
const QUANTITATIVE_WEIGHT: f64 = 0.4;

/// Scores the strength of performance claims in a model's README: variety of
/// benchmark/evaluation vocabulary plus the presence of quantitative results.
pub struct PerformanceClaimsMetric {
    hub: Arc<dyn HubClient>,
}

impl PerformanceClaimsMetric {
    #[must_use]
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Metric for PerformanceClaimsMetric {
    fn name(&self) -> &'static str {
        "performance_claims"
    }

    fn supports(&self, target: &Target) -> bool {
        target.category() == Category::Model
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();
        let descriptor = self.hub.descriptor(target).await?;

        let mut result = MetricResult::new(target.name(), target.category());
        result.performance_claims = score_claims(descriptor.readme.as_deref().unwrap_or(""));
        result.performance_claims_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Claim-strength score over README text.
#[must_use]
pub fn score_claims(readme: &str) -> f64 {
    if readme.trim().is_empty() {
        return 0.0;
    }

    let text = readme.to_lowercase();
    let hits = CLAIM_KEYWORDS.iter().filter(|k| text.contains(*k)).count();
    let keyword_part = KEYWORD_WEIGHT * (hits as f64 / CLAIM_KEYWORDS.len() as f64);
    let quantitative_part = if QUANTITATIVE.is_match(&text) { QUANTITATIVE_WEIGHT } else { 0.0 };

    clamp01(keyword_part + quantitative_part)
}
