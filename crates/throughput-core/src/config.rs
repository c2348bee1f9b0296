use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};

pub const DEFAULT_TARGET_W2S: f64 = 350.0;
pub const DEFAULT_SNAPSHOT_ROWS: usize = 10;

pub const DATA_DIR_ENV: &str = "THROUGHPUT_DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "THROUGHPUT_OUTPUT_DIR";
pub const DEFAULT_DATA_DIR: &str = ".";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Picks a directory: the command-line flag, then the environment value, then
/// `fallback`. An empty environment value counts as unset.
pub fn resolve_dir(flag: Option<PathBuf>, env_value: Option<String>, fallback: &str) -> PathBuf {
    flag.or_else(|| env_value.filter(|value| !value.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// Inclusive range of hours of day, e.g. the 1 AM–3 AM collapse window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start: i64,
    pub end: i64,
}

impl HourWindow {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: i64) -> bool {
        self.start <= hour && hour <= self.end
    }

    pub fn validate(&self) -> Result<()> {
        if self.start < 0 || self.end > 23 || self.start > self.end {
            return Err(AnalysisError::Config(format!(
                "collapse window {}..={} must satisfy 0 <= start <= end <= 23",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

impl Default for HourWindow {
    fn default() -> Self {
        Self::new(1, 3)
    }
}

/// What to do with picking samples that report zero (or negative) active pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPickerPolicy {
    /// Keep the row with a null ratio and leave it out of every w2s aggregate.
    #[default]
    Exclude,
    /// Fail the analysis.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Units per picker a fully staffed hour should sustain.
    pub target_w2s: f64,
    /// Phantom pickers added in the counterfactual `w2s_plus_k` columns.
    pub scenario_extra_pickers: Vec<u32>,
    /// Rows shown in each console snapshot of the collapse window.
    pub snapshot_rows: usize,
    pub zero_picker_policy: ZeroPickerPolicy,
    /// Pins the backlog chart's highlight band to a single date. When unset the band
    /// is drawn on every date in the plotted range. Accepts a bare TOML date
    /// (`2025-01-01`) or the quoted form.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_band_date"
    )]
    pub backlog_band_date: Option<NaiveDate>,
    pub collapse_window: HourWindow,
}

fn deserialize_band_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<toml::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(toml::Value::String(text)) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(|err| D::Error::custom(format!("invalid date '{text}': {err}"))),
        Some(toml::Value::Datetime(value)) => match (value.date, value.time, value.offset) {
            (Some(date), None, None) => NaiveDate::from_ymd_opt(
                i32::from(date.year),
                u32::from(date.month),
                u32::from(date.day),
            )
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date '{value}'"))),
            _ => Err(D::Error::custom(format!(
                "expected a date without time, got '{value}'"
            ))),
        },
        Some(other) => Err(D::Error::custom(format!(
            "expected a date, got {}",
            other.type_str()
        ))),
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_w2s: DEFAULT_TARGET_W2S,
            scenario_extra_pickers: vec![1, 2, 3],
            snapshot_rows: DEFAULT_SNAPSHOT_ROWS,
            zero_picker_policy: ZeroPickerPolicy::default(),
            backlog_band_date: None,
            collapse_window: HourWindow::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration file when one is given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("no configuration file supplied; using defaults");
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|source| AnalysisError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&content)
    }

    /// Loads the file (or defaults), applies the command-line override and
    /// validates the result.
    pub fn resolve(path: Option<&Path>, target_w2s: Option<f64>) -> Result<Self> {
        Self::load(path)?.with_target_w2s(target_w2s)
    }

    pub fn with_target_w2s(mut self, target_w2s: Option<f64>) -> Result<Self> {
        if let Some(target) = target_w2s {
            debug!(target, "overriding target_w2s");
            self.target_w2s = target;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.target_w2s.is_finite() || self.target_w2s <= 0.0 {
            return Err(AnalysisError::Config(format!(
                "target_w2s must be a positive number, got {}",
                self.target_w2s
            )));
        }
        if self.scenario_extra_pickers.contains(&0) {
            return Err(AnalysisError::Config(
                "scenario_extra_pickers entries must be at least 1".to_string(),
            ));
        }
        self.collapse_window.validate()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| AnalysisError::Config(err.to_string()))
    }
}
