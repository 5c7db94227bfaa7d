use super::{Metric, MetricError, clamp01, elapsed_ms};
use crate::model::{Category, MetricResult, Target};
use crate::sources::HubClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Documentation keys a well-curated dataset card is expected to cover.
const QUALITY_KEYS: [&str; 8] = ["train", "test", "validation", "split", "license", "citation", "doi", "benchmark"];

/// Floor awarded to any dataset with a non-empty card.
const BASE_SCORE: f64 = 0.3;
const COVERAGE_WEIGHT: f64 = 0.7;

/// Scores dataset curation quality from card coverage: split documentation,
/// licensing, citation, and benchmark references.
pub struct DatasetQualityMetric {
    hub: Arc<dyn HubClient>,
}

impl DatasetQualityMetric {
    #[must_use]
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Metric for DatasetQualityMetric {
    fn name(&self) -> &'static str {
        "dataset_quality"
    }

    fn supports(&self, target: &Target) -> bool {
        target.category() == Category::Dataset
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();
        let descriptor = self.hub.descriptor(target).await?;

        let mut result = MetricResult::new(target.name(), target.category());
        result.dataset_quality = score_card(descriptor.readme.as_deref().unwrap_or(""));
        result.dataset_quality_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Coverage score over a dataset card: a base floor plus a bonus proportional
/// to how many of the expected documentation keys appear.
#[must_use]
pub fn score_card(card: &str) -> f64 {
    if card.trim().is_empty() {
        return 0.0;
    }

    let text = card.to_lowercase();
    let hits = QUALITY_KEYS.iter().filter(|k| text.contains(*k)).count();
    clamp01(BASE_SCORE + COVERAGE_WEIGHT * (hits as f64 / QUALITY_KEYS.len() as f64))
}
