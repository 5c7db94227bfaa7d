use super::{Metric, MetricError, clamp01, elapsed_ms};
use crate::model::{Category, MetricResult, Target};
use crate::sources::HubClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// README length (in characters) considered substantial documentation.
const SUBSTANTIAL_README_LEN: usize = 2_000;
const MINIMAL_README_LEN: usize = 500;

const INSTALL_SIGNALS: [&str; 4] = ["pip install", "installation", "requirements", "setup"];
const QUICKSTART_SIGNALS: [&str; 3] = ["quick start", "quickstart", "getting started"];
const USAGE_SIGNALS: [&str; 3] = ["usage", "how to use", "example"];

/// Download count at which the popularity curve reaches 0.5.
const DOWNLOADS_HALF_SATURATION: f64 = 10_000.0;

/// Like count at which the popularity curve reaches 0.5.
const LIKES_HALF_SATURATION: f64 = 100.0;

/// Scores how easily a developer can get started with an artifact, from the
/// completeness of its README: documentation volume, installation
/// instructions, a quick-start path, usage guidance, and runnable code
/// blocks. Also attaches a `popularity` entry to the extras map, derived
/// from the hub's download and like counts.
pub struct RampUpMetric {
    hub: Arc<dyn HubClient>,
}

impl RampUpMetric {
    #[must_use]
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Metric for RampUpMetric {
    fn name(&self) -> &'static str {
        "ramp_up_time"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target.category(), Category::Model | Category::Dataset)
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();
        let descriptor = self.hub.descriptor(target).await?;

        let mut result = MetricResult::new(target.name(), target.category());
        result.ramp_up_time = score_readme(descriptor.readme.as_deref().unwrap_or(""));
        result.ramp_up_time_latency = elapsed_ms(start);
        let _ = result.extras.insert("popularity".to_string(), popularity(descriptor.downloads, descriptor.likes));
        Ok(result)
    }
}

/// Community-adoption signal from download and like counts, each squashed
/// through `n / (n + k)` so early counts matter most and the curve
/// saturates toward 1.0.
#[must_use]
pub fn popularity(downloads: u64, likes: u64) -> f64 {
    fn squash(n: f64, k: f64) -> f64 {
        n / (n + k)
    }

    clamp01(0.5 * squash(downloads as f64, DOWNLOADS_HALF_SATURATION) + 0.5 * squash(likes as f64, LIKES_HALF_SATURATION))
}

/// Weighted README completeness score.
#[must_use]
pub fn score_readme(readme: &str) -> f64 {
    let text = readme.to_lowercase();
    if text.trim().is_empty() {
        return 0.0;
    }

    let volume = if text.len() >= SUBSTANTIAL_README_LEN {
        0.3
    } else if text.len() >= MINIMAL_README_LEN {
        0.2
    } else {
        0.1
    };

    let install = if INSTALL_SIGNALS.iter().any(|s| text.contains(s)) { 0.2 } else { 0.0 };
    let quickstart = if QUICKSTART_SIGNALS.iter().any(|s| text.contains(s)) { 0.2 } else { 0.0 };
    let usage = if USAGE_SIGNALS.iter().any(|s| text.contains(s)) { 0.15 } else { 0.0 };
    let code_blocks = if text.contains("```") { 0.15 } else { 0.0 };

    clamp01(volume + install + quickstart + usage + code_blocks)
}
