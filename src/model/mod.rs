//! Scoring data model
//!
//! The core type is [`MetricResult`], one record per scored target. Each
//! metric plugin produces a partial `MetricResult` populating only the
//! field(s) it owns; the orchestrator folds partials together with
//! [`MetricResult::merge`] and fills in the aggregate `net_score`.
//!
//! Field names on [`MetricResult`] and [`SizeScore`] are the wire
//! compatibility surface: they serialize directly into the NDJSON output.

mod category;
mod device_class;
mod result;
mod target;

pub use category::Category;
pub use device_class::DeviceClass;
pub use result::{MetricResult, SizeScore};
pub use target::Target;
