use super::{Metric, MetricError, clamp01, elapsed_ms};
use crate::model::{Category, MetricResult, Target};
use crate::sources::{CommitHistory, CommitLog};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

const LOG_TARGET: &str = "bus_factor";

/// Trailing authorship window, in days.
const WINDOW_DAYS: i64 = 180;

/// Staleness horizon: a repository whose last commit is this old scores 0.
const STALE_DAYS: f64 = 365.0;

/// Author count at which the diversity bonus saturates.
const FULL_DIVERSITY_AUTHORS: f64 = 5.0;

/// Neutral score returned when history cannot be queried at all.
const NEUTRAL_SCORE: f64 = 0.3;

const CONCENTRATION_WEIGHT: f64 = 0.7;
const DIVERSITY_WEIGHT: f64 = 0.3;

/// Approximates key-person risk from the commit authorship distribution.
///
/// Authorship concentration is measured with the Herfindahl-Hirschman index
/// over per-author commit shares in a trailing 180-day window (full history
/// when the window is empty), blended with an author-count diversity bonus
/// and multiplied by a staleness factor. Any failure to query history
/// degrades to a neutral score instead of failing the target.
pub struct BusFactorMetric {
    source: Arc<dyn CommitLog>,
    now: DateTime<Utc>,
}

impl BusFactorMetric {
    #[must_use]
    pub fn new(source: Arc<dyn CommitLog>, now: DateTime<Utc>) -> Self {
        Self { source, now }
    }
}

#[async_trait]
impl Metric for BusFactorMetric {
    fn name(&self) -> &'static str {
        "bus_factor"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target.category(), Category::Model | Category::Dataset)
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
        result.bus_factor = score;
        result.bus_factor_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Commit counts per author, deduplicated case-insensitively by email.
pub fn authorship_counts<'a>(commits: impl Iterator<Item = &'a crate::sources::CommitRecord>) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for commit in commits {
        let email = commit.author_email.trim().to_lowercase();
        if !email.is_empty() {
            *counts.entry(email).or_insert(0) += 1;
        }
    }
    counts
}

/// Authorship spread as `1 - HHI`: 0.0 for a single dominant author, rising
/// toward 1.0 as authorship spreads evenly.
#[must_use]
pub fn concentration(counts: &HashMap<String, u64>) -> f64 {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let hhi: f64 = counts
        .values()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let share = count as f64 / total;
            share * share
        })
        .sum();

    clamp01(1.0 - hhi)
}

/// Diversity bonus, saturating at [`FULL_DIVERSITY_AUTHORS`] authors.
#[must_use]
pub fn diversity(author_count: usize) -> f64 {
    clamp01(author_count as f64 / FULL_DIVERSITY_AUTHORS)
}

/// Staleness multiplier: 1.0 for a fresh repository, 0.0 at 365+ days.
#[must_use]
pub fn recency(days_since_last_commit: f64) -> f64 {
    clamp01(1.0 - days_since_last_commit / STALE_DAYS)
}

/// Score a commit history as of `now`.
///
/// Uses authors in the trailing 180-day window, falling back to full history
/// when the window is empty; an entirely empty history yields the neutral
/// default.
#[must_use]
pub fn score_history(history: &CommitHistory, now: DateTime<Utc>) -> f64 {
    let Some(last_commit_at) = history.last_commit_at() else {
        return NEUTRAL_SCORE;
    };

    let days_since_last = ((now - last_commit_at).num_seconds().max(0) as f64) / 86_400.0;

    let cutoff = now - Duration::days(WINDOW_DAYS);
    let mut counts = authorship_counts(history.commits.iter().filter(|c| c.timestamp >= cutoff));
    if counts.is_empty() {
        counts = authorship_counts(history.commits.iter());
    }

    let base = CONCENTRATION_WEIGHT * concentration(&counts) + DIVERSITY_WEIGHT * diversity(counts.len());
    clamp01(base * recency(days_since_last))
}
