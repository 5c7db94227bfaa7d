//! Metric plugins and their registry
//!
//! Each scoring dimension is owned by one plugin implementing the [`Metric`]
//! trait. Plugins are registered once at startup into a [`MetricRegistry`],
//! which the orchestrator consults to resolve the contributing plugins for
//! each target. The registry is read-only after startup and safe for
//! unlimited concurrent reads.
//!
//! Two plugins carry real algorithmic weight: [`bus_factor`] (commit
//! concentration) and [`size_fit`] (device-capacity curve). The remaining
//! plugins are documentation and metadata heuristics over the typed hub
//! descriptor.

use crate::model::{MetricResult, Target};
use async_trait::async_trait;
use ohno::bail;
use std::sync::Arc;
use std::time::Instant;

pub mod bus_factor;
pub mod code_quality;
pub mod dataset_code;
pub mod dataset_quality;
mod error;
pub mod license;
pub mod performance_claims;
pub mod ramp_up;
pub mod size_fit;

pub use bus_factor::BusFactorMetric;
pub use code_quality::CodeQualityMetric;
pub use dataset_code::DatasetCodeMetric;
pub use dataset_quality::DatasetQualityMetric;
pub use error::MetricError;
pub use license::LicenseMetric;
pub use performance_claims::PerformanceClaimsMetric;
pub use ramp_up::RampUpMetric;
pub use size_fit::SizeFitMetric;

/// A scoring plugin computing one or more dimensions of a [`MetricResult`].
#[async_trait]
pub trait Metric: Send + Sync {
    /// Stable plugin name, unique within a registry.
    fn name(&self) -> &'static str;

    /// Whether this plugin can score the given target.
    fn supports(&self, target: &Target) -> bool;

    /// Compute a partial result populating only the field(s) this plugin owns.
    async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError>;
}

/// Ordered collection of scoring plugins, populated once at startup and
/// injected into the orchestrator.
#[derive(Default)]
pub struct MetricRegistry {
    metrics: Vec<Arc<dyn Metric>>,
}

impl core::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.metrics.iter().map(|m| m.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl MetricRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin to the ordered list.
    ///
    /// # Errors
    ///
    /// Returns a fatal configuration error when the plugin name is empty or
    /// already registered. This is a startup failure, never a per-request one.
    pub fn register(&mut self, metric: Arc<dyn Metric>) -> crate::Result<()> {
        if metric.name().trim().is_empty() {
            bail!("cannot register a metric with an empty name");
        }

        if self.metrics.iter().any(|m| m.name() == metric.name()) {
            bail!("metric '{}' is already registered", metric.name());
        }

        self.metrics.push(metric);
        Ok(())
    }

    /// Order-preserving snapshot of every registered plugin.
    #[must_use]
    pub fn all_metrics(&self) -> Vec<Arc<dyn Metric>> {
        self.metrics.clone()
    }

    /// Order-preserving snapshot of the plugins supporting `target`.
    #[must_use]
    pub fn supported_metrics(&self, target: &Target) -> Vec<Arc<dyn Metric>> {
        self.metrics.iter().filter(|m| m.supports(target)).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Clamp a score into the valid [0,1] range.
#[must_use]
pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Milliseconds elapsed since `start`, saturated into the latency field width.
pub(crate) fn elapsed_ms(start: Instant) -> u32 {
    u32::try_from(start.elapsed().as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    struct StubMetric {
        name: &'static str,
        category: Category,
    }

    #[async_trait]
    impl Metric for StubMetric {
        fn name(&self) -> &'static str {
            self.name
        }

        fn supports(&self, target: &Target) -> bool {
            target.category() == self.category
        }

        async fn compute(&self, target: &Target) -> Result<MetricResult, MetricError> {
            Ok(MetricResult::new(target.name(), target.category()))
        }
    }

    fn model_target() -> Target {
        Target::parse("https://huggingface.co/org/model", Category::Model).unwrap()
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(StubMetric {
                name: "first",
                category: Category::Model,
            }))
            .unwrap();
        registry
            .register(Arc::new(StubMetric {
                name: "second",
                category: Category::Model,
            }))
            .unwrap();

        let names: Vec<&str> = registry.all_metrics().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut registry = MetricRegistry::new();
        let result = registry.register(Arc::new(StubMetric {
            name: "",
            category: Category::Model,
        }));
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(StubMetric {
                name: "dup",
                category: Category::Model,
            }))
            .unwrap();
        let result = registry.register(Arc::new(StubMetric {
            name: "dup",
            category: Category::Dataset,
        }));
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_supported_metrics_filters_by_target() {
        let mut registry = MetricRegistry::new();
        registry
            .register(Arc::new(StubMetric {
                name: "models_only",
                category: Category::Model,
            }))
            .unwrap();
        registry
            .register(Arc::new(StubMetric {
                name: "datasets_only",
                category: Category::Dataset,
            }))
            .unwrap();

        let supported = registry.supported_metrics(&model_target());
        assert_eq!(supported.len(), 1);
        assert_eq!(supported[0].name(), "models_only");
    }

    #[test]
    fn test_clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.5), 0.5);
        assert_eq!(clamp01(1.5), 1.0);
    }
}
