use super::{Metric, MetricError, elapsed_ms};
use crate::model::{Category, MetricResult, Target};
use crate::sources::{ArtifactDescriptor, HubClient};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

const DATASET_SIGNALS: [&str; 3] = ["dataset", "training data", "trained on"];
const CODE_SIGNALS: [&str; 3] = ["github.com", "gitlab.com", "example code"];

const DATASET_HALF: f64 = 0.5;
const CODE_HALF: f64 = 0.5;

/// Scores whether a model documents both its training data and runnable
/// example code. Each half contributes 0.5: dataset provenance from card
/// text or dataset tags, code availability from repository links or code
/// blocks.
pub struct DatasetCodeMetric {
    hub: Arc<dyn HubClient>,
}

impl DatasetCodeMetric {
    #[must_use]
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Metric for DatasetCodeMetric {
    fn name(&self) -> &'static str {
        "dataset_and_code_score"
    }

    fn supports(&self, target: &Target) -> bool {
        target.category() == Category::Model
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();
        let descriptor = self.hub.descriptor(target).await?;

        let mut result = MetricResult::new(target.name(), target.category());
        result.dataset_and_code_score = score_descriptor(&descriptor);
        result.dataset_and_code_score_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Sum of the dataset-provenance and code-availability halves.
#[must_use]
pub fn score_descriptor(descriptor: &ArtifactDescriptor) -> f64 {
    let text = descriptor.readme.as_deref().unwrap_or("").to_lowercase();

    let documents_dataset = DATASET_SIGNALS.iter().any(|s| text.contains(s))
        || descriptor.tags.iter().any(|t| t.starts_with("dataset:"));
    let provides_code = CODE_SIGNALS.iter().any(|s| text.contains(s)) || text.contains("```");

    let mut score = 0.0;
    if documents_dataset {
        score += DATASET_HALF;
    }
    if provides_code {
        score += CODE_HALF;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(readme: &str, tags: &[&str]) -> ArtifactDescriptor {
        ArtifactDescriptor {
            readme: (!readme.is_empty()).then(|| readme.to_string()),
            license: None,
            downloads: 0,
            likes: 0,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    #[test]
    fn test_nothing_documented_scores_zero() {
        assert_eq!(score_descriptor(&descriptor("just a title", &[])), 0.0);
        assert_eq!(score_descriptor(&descriptor("", &[])), 0.0);
    }

    #[test]
    fn test_dataset_only_scores_half() {
        assert_eq!(score_descriptor(&descriptor("Trained on a large dataset.", &[])), 0.5);
        assert_eq!(score_descriptor(&descriptor("a model", &["dataset:squad"])), 0.5);
    }

    #[test]
    fn test_code_only_scores_half() {
        assert_eq!(score_descriptor(&descriptor("See https://github.com/org/repo", &[])), 0.5);
        assert_eq!(score_descriptor(&descriptor("```python\nimport x\n```", &[])), 0.5);
    }

    #[test]
    fn test_both_halves_score_one() {
        let d = descriptor("Trained on the squad dataset.\n```python\nimport x\n```", &[]);
        assert_eq!(score_descriptor(&d), 1.0);
    }
}
