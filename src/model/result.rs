use super::{Category, DeviceClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-device-class size-fit scores.
///
/// Always carries all recognized device-class keys, even when the size-fit
/// metric did not contribute (the keys then hold the zero default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeScore {
    pub raspberry_pi: f64,
    pub jetson_nano: f64,
    pub desktop_pc: f64,
    pub aws_server: f64,
}

impl SizeScore {
    /// Build a size score holding `value` for every device class.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            raspberry_pi: value,
            jetson_nano: value,
            desktop_pc: value,
            aws_server: value,
        }
    }

    #[must_use]
    pub const fn get(&self, class: DeviceClass) -> f64 {
        match class {
            DeviceClass::RaspberryPi => self.raspberry_pi,
            DeviceClass::JetsonNano => self.jetson_nano,
            DeviceClass::DesktopPc => self.desktop_pc,
            DeviceClass::AwsServer => self.aws_server,
        }
    }

    pub const fn set(&mut self, class: DeviceClass, value: f64) {
        match class {
            DeviceClass::RaspberryPi => self.raspberry_pi = value,
            DeviceClass::JetsonNano => self.jetson_nano = value,
            DeviceClass::DesktopPc => self.desktop_pc = value,
            DeviceClass::AwsServer => self.aws_server = value,
        }
    }
}

/// One scoring record per target.
///
/// A metric plugin returns a partial `MetricResult` populating only the
/// field(s) it owns; unpopulated fields stay at the zero default. Scores are
/// in [0,1], latencies are milliseconds spent computing the owning field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub name: String,
    pub category: Category,
    pub net_score: f64,
    pub net_score_latency: u32,
    pub ramp_up_time: f64,
    pub ramp_up_time_latency: u32,
    pub bus_factor: f64,
    pub bus_factor_latency: u32,
    pub performance_claims: f64,
    pub performance_claims_latency: u32,
    pub license: f64,
    pub license_latency: u32,
    pub size_score: SizeScore,
    pub size_score_latency: u32,
    pub dataset_and_code_score: f64,
    pub dataset_and_code_score_latency: u32,
    pub dataset_quality: f64,
    pub dataset_quality_latency: u32,
    pub code_quality: f64,
    pub code_quality_latency: u32,

    /// Open extension map for plugin-specific extras.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, f64>,
}

/// Fold one scalar dimension of `add` into `base`: a later non-zero score
/// overwrites, zero never does; latencies take the max.
macro_rules! fold_dimension {
    ($base:ident, $add:ident, $score:ident, $latency:ident) => {
        if $add.$score != 0.0 {
            $base.$score = $add.$score;
        }
        $base.$latency = $base.$latency.max($add.$latency);
    };
}

impl MetricResult {
    /// A fresh result for `name`/`category` with every field at its zero default.
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            net_score: 0.0,
            net_score_latency: 0,
            ramp_up_time: 0.0,
            ramp_up_time_latency: 0,
            bus_factor: 0.0,
            bus_factor_latency: 0,
            performance_claims: 0.0,
            performance_claims_latency: 0,
            license: 0.0,
            license_latency: 0,
            size_score: SizeScore::default(),
            size_score_latency: 0,
            dataset_and_code_score: 0.0,
            dataset_and_code_score_latency: 0,
            dataset_quality: 0.0,
            dataset_quality_latency: 0,
            code_quality: 0.0,
            code_quality_latency: 0,
            extras: BTreeMap::new(),
        }
    }

    /// Merge a later partial into this one.
    ///
    /// For every scalar score a non-zero value from `add` overwrites the
    /// current value and zero never does; for every latency the maximum wins.
    /// The `size_score` map applies the scalar rule per device-class key.
    #[must_use]
    pub fn merge(mut self, add: &Self) -> Self {
        fold_dimension!(self, add, ramp_up_time, ramp_up_time_latency);
        fold_dimension!(self, add, bus_factor, bus_factor_latency);
        fold_dimension!(self, add, performance_claims, performance_claims_latency);
        fold_dimension!(self, add, license, license_latency);
        fold_dimension!(self, add, dataset_and_code_score, dataset_and_code_score_latency);
        fold_dimension!(self, add, dataset_quality, dataset_quality_latency);
        fold_dimension!(self, add, code_quality, code_quality_latency);

        for class in DeviceClass::ALL {
            let value = add.size_score.get(class);
            if value != 0.0 {
                self.size_score.set(class, value);
            }
        }
        self.size_score_latency = self.size_score_latency.max(add.size_score_latency);

        for (key, value) in &add.extras {
            let _ = self.extras.insert(key.clone(), *value);
        }

        self
    }
}
