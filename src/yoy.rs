use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest magnitude a percentage change is reported with.
pub const MAX_CHANGE_PCT: f64 = 999.0;

/// Outcome of comparing a value against its year-over-year baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum YoyChange {
    /// No usable baseline.
    NoData,
    /// Zero baseline with a positive current value.
    New,
    /// Negative baseline: a data-quality signal, not a ratio.
    Anomalous,
    /// Signed change in percent, saturated at ±999.
    Percent(f64),
}

impl YoyChange {
    pub fn percent(&self) -> Option<f64> {
        match self {
            YoyChange::Percent(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for YoyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YoyChange::NoData => f.write_str("n/a"),
            YoyChange::New => f.write_str("new"),
            YoyChange::Anomalous => f.write_str("anomalous"),
            YoyChange::Percent(value) => write!(f, "{:+.1}%", value),
        }
    }
}

pub fn compare_yoy(current: f64, baseline: Option<f64>) -> YoyChange {
    let Some(baseline) = baseline else {
        return YoyChange::NoData;
    };

    if baseline < 0.0 {
        return YoyChange::Anomalous;
    }

    if baseline == 0.0 {
        return if current > 0.0 {
            YoyChange::New
        } else {
            YoyChange::NoData
        };
    }

    let change = ((current / baseline) - 1.0) * 100.0;
    YoyChange::Percent(change.clamp(-MAX_CHANGE_PCT, MAX_CHANGE_PCT))
}
