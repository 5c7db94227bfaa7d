use super::{Metric, MetricError, elapsed_ms};
use crate::model::{Category, MetricResult, Target};
use crate::sources::HubClient;
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

/// Licenses compatible with LGPL-2.1.
const COMPATIBLE_LICENSES: [&str; 6] = ["lgpl-2.1", "mit", "apache-2.0", "bsd-2-clause", "bsd-3-clause", "mpl-2.0"];

/// Detection patterns, most specific first.
static LICENSE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?is)\blgpl\s*[- ]?2\.1\b", "lgpl-2.1"),
        (r"(?is)\bgnu\s+lesser\s+general\s+public\s+license\b.*\b2\.1\b", "lgpl-2.1"),
        (r"(?is)\bapache\b.*\b2\.0\b", "apache-2.0"),
        (r"(?is)\bmit\b", "mit"),
        (r"(?is)\bbsd\b.*\b3\b", "bsd-3-clause"),
        (r"(?is)\bbsd\b.*\b2\b", "bsd-2-clause"),
        (r"(?is)\bmozilla public license\b.*\b2\.0\b|\bmpl\s*[- ]?2\.0\b", "mpl-2.0"),
    ]
    .into_iter()
    .map(|(pattern, id)| (Regex::new(pattern).expect("license pattern must compile"), id))
    .collect()
});

static LICENSE_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)##\s*license\s+(.+?)(\n##\s|\z)").expect("section pattern must compile"));

/// Scores license compatibility against the LGPL-2.1-compatible set: 1.0 for
/// a recognized compatible license, 0.5 when license text exists but is not
/// recognized, 0.0 when it is absent or incompatible.
pub struct LicenseMetric {
    hub: Arc<dyn HubClient>,
}

impl LicenseMetric {
    #[must_use]
    pub fn new(hub: Arc<dyn HubClient>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl Metric for LicenseMetric {
    fn name(&self) -> &'static str {
        "license"
    }

    fn supports(&self, target: &Target) -> bool {
        matches!(target.category(), Category::Model | Category::Dataset)
    }

    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
        let start = Instant::now();
        let descriptor = self.hub.descriptor(target).await?;

        let mut result = MetricResult::new(target.name(), target.category());
        result.license = score_license(descriptor.license.as_deref(), descriptor.readme.as_deref());
        result.license_latency = elapsed_ms(start);
        Ok(result)
    }
}

/// Detect a normalized license identifier in free-form text.
#[must_use]
pub fn detect_license(text: &str) -> Option<&'static str> {
    LICENSE_PATTERNS.iter().find_map(|(pattern, id)| pattern.is_match(text).then_some(*id))
}

/// The `## License` section of a README, if present.
#[must_use]
pub fn extract_license_section(readme: &str) -> Option<&str> {
    LICENSE_SECTION
        .captures(readme)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Score from an explicit license tag, falling back to the README section.
#[must_use]
pub fn score_license(tag: Option<&str>, readme: Option<&str>) -> f64 {
    if let Some(tag) = tag {
        let normalized = tag.trim().to_lowercase();
        return if COMPATIBLE_LICENSES.contains(&normalized.as_str()) {
            1.0
        } else {
            // Recognized metadata naming an incompatible license.
            0.0
        };
    }

    match readme.and_then(extract_license_section) {
        Some(section) => match detect_license(section) {
            Some(id) if COMPATIBLE_LICENSES.contains(&id) => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        },
        None => 0.0,
    }
}
