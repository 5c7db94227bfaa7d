use super::{Metric, MetricError, clamp01, elapsed_ms};
use crate::metrics::bus_factor::{authorship_counts, recency};
use crate::model::{Category, MetricResult, Target};
use crate::sources::{CommitHistory, CommitLog};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::time::Instant;

const LOG_TARGET: &str = "code_quality";

/// Trailing window for commit-rate measurement, in days.
const ACTIVITY_WINDOW_DAYS: i64 = 90;

/// Trailing window for contributor counting, in days.
const AUTHOR_WINDOW_DAYS: i64 = 180;

/// Commit count at which the activity term saturates.
const FULL_ACTIVITY_COMMITS: f64 = 50.0;

/// Author count at which the contributor term saturates.
const FULL_AUTHOR_COUNT: f64 = 5.0;

/// Neutral score returned when history cannot be queried at all.
const NEUTRAL_SCORE: f64 = 0.3;

const RECENCY_WEIGHT: f64 = 0.45;
const ACTIVITY_WEIGHT: f64 = 0.35;
const AUTHOR_WEIGHT: f64 = 0.20;

/// Approximates engineering health of a code repository from its commit
/// history: freshness of the latest commit, recent commit rate, and recent
/// contributor count. Failures to query history degrade to a neutral score.
pub struct CodeQualityMetric {
    source: Arc<dyn CommitLog>,
    now: DateTime<Utc>,
}

impl CodeQualityMetric {
    #[must_use]
    pub fn new(source: Arc<dyn CommitLog>, now: DateTime<Utc>) -> Self {
        Self { source, now }
    }
}

#[async_trait]
impl Metric for CodeQualityMetric {
    fn name(&self) -> &'static str {
        "code_quality"
    }

    fn supports(&self, target: &Target) -> bool {
        target.category() == Category::Code
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();

        let score = match self.source.history(target).await {
            Ok(history) => score_history(&history, self.now),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not query history for '{target}', using neutral score: {e}");
                NEUTRAL_SCORE
            }
        };

        let mut result = MetricResult::new(target.name(), target.category());
        result.code_quality = score;
        result.code_quality_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Score a commit history as of `now`.
///
/// Weighted blend of the staleness multiplier, the 90-day commit rate, and
/// the 180-day contributor count. An empty history yields the neutral
/// default.
#[must_use]
pub fn score_history(history: &CommitHistory, now: DateTime<Utc>) -> f64 {
    let Some(last_commit_at) = history.last_commit_at() else {
        return NEUTRAL_SCORE;
    };

    let days_since_last = ((now - last_commit_at).num_seconds().max(0) as f64) / 86_400.0;

    let activity_cutoff = now - Duration::days(ACTIVITY_WINDOW_DAYS);
    let recent_commits = history.commits.iter().filter(|c| c.timestamp >= activity_cutoff).count();

    let author_cutoff = now - Duration::days(AUTHOR_WINDOW_DAYS);
    let recent_authors = authorship_counts(history.commits.iter().filter(|c| c.timestamp >= author_cutoff)).len();

    let activity = clamp01(recent_commits as f64 / FULL_ACTIVITY_COMMITS);
    let contributors = clamp01(recent_authors as f64 / FULL_AUTHOR_COUNT);

    clamp01(RECENCY_WEIGHT * recency(days_since_last) + ACTIVITY_WEIGHT * activity + AUTHOR_WEIGHT * contributors)
}
