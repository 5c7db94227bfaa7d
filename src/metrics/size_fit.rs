use super::{Metric, MetricError, clamp01, elapsed_ms};
use crate::model::{Category, DeviceClass, MetricResult, SizeScore, Target};
use crate::sources::{FileEntry, HubClient};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

const LOG_TARGET: &str = "size_fit";

/// Score at the capacity knee (`r = 1`).
const S_KNEE: f64 = 0.60;

/// Score at the end of the tolerance band (`r = 1 + TOL`).
const PLATEAU: f64 = 0.45;

/// Width of the linear tolerance band past the knee.
const TOL: f64 = 0.15;

/// Shape exponent of the under-capacity segment.
const GAMMA: f64 = 1.0;

/// Decay rate of the over-tolerance exponential tail.
const DECAY_K: f64 = 1.6;

/// Neutral per-class score when the artifact size cannot be determined.
const NEUTRAL_SCORE: f64 = 0.5;

/// File extensions counted as weight-bearing.
const WEIGHT_EXTENSIONS: [&str; 3] = ["bin", "safetensors", "h5"];

const BYTES_PER_MB: f64 = 1_000_000.0;

/// Scores how well an artifact's weight-file footprint fits each device
/// class's capacity budget.
///
/// The curve is piecewise continuous in the capacity ratio `r = size/max`:
/// a shaped descent from 1.0 to [`S_KNEE`] under capacity, a linear
/// tolerance band down to [`PLATEAU`], then exponential decay toward zero.
/// The branches agree exactly at both knees.
pub struct SizeFitMetric {
    hub: Arc<dyn HubClient>,
}

impl SizeFitMetric {
    #[must_use]
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Metric for SizeFitMetric {
    fn name(&self) -> &'static str {
        "size_score"
    }

    fn supports(&self, target: &Target) -> bool {
        target.category() == Category::Model
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();

        let size_score = match self.hub.file_manifest(target).await {
            Ok(manifest) => {
                let size_mb = weight_file_mb(&manifest);
                log::debug!(target: LOG_TARGET, "'{}' carries {size_mb:.1} MB of weight files", target.name());
                score_all_classes(size_mb)
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not determine size of '{}', using neutral scores: {e}", target.name());
                SizeScore::uniform(NEUTRAL_SCORE)
            }
        };

        let mut result = MetricResult::new(target.name(), target.category());
        result.size_score = size_score;
        result.size_score_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Total megabytes of weight-bearing files in a manifest.
#[must_use]
pub fn weight_file_mb(manifest: &[FileEntry]) -> f64 {
    let bytes: u64 = manifest
        .iter()
        .filter(|entry| entry.extension().is_some_and(|ext| WEIGHT_EXTENSIONS.contains(&ext.as_str())))
        .map(|entry| entry.size_bytes)
        .sum();

    bytes as f64 / BYTES_PER_MB
}

/// Fit score of `size_mb` against a capacity budget of `max_mb`.
///
/// Clamped to [0,1] and rounded to 2 decimals. Continuity at the knees is a
/// correctness requirement: the value is exactly [`S_KNEE`] at `r = 1` and
/// exactly [`PLATEAU`] at `r = 1 + TOL`.
#[must_use]
pub fn fit_score(size_mb: f64, max_mb: f64) -> f64 {
    let r = size_mb / max_mb;

    let raw = if r <= 1.0 {
        S_KNEE + (1.0 - r).powf(GAMMA) * (1.0 - S_KNEE)
    } else if r <= 1.0 + TOL {
        S_KNEE - (S_KNEE - PLATEAU) * ((r - 1.0) / TOL)
    } else {
        PLATEAU * (-DECAY_K * (r - (1.0 + TOL))).exp()
    };

    round2(clamp01(raw))
}

/// Score one artifact size against every recognized device class.
#[must_use]
pub fn score_all_classes(size_mb: f64) -> SizeScore {
    let mut scores = SizeScore::default();
    for class in DeviceClass::ALL {
        scores.set(class, fit_score(size_mb, class.max_mb()));
    }
    scores
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
