//! Chart-data requests and their validated configuration

use super::dependencies_of;
use crate::error::{DashboardError, Result};
use crate::state::{AppState, ChartId, ChartType, Selection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of request options understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigKey {
    #[serde(rename = "event")]
    Event,
    #[serde(rename = "bucketsize")]
    BucketSize,
    #[serde(rename = "pipelines")]
    Pipelines,
    #[serde(rename = "operators")]
    Operators,
    #[serde(rename = "from")]
    TimeFrom,
    #[serde(rename = "to")]
    TimeTo,
    #[serde(rename = "memoryfrom")]
    MemoryFrom,
    #[serde(rename = "memoryto")]
    MemoryTo,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::Event,
        ConfigKey::BucketSize,
        ConfigKey::Pipelines,
        ConfigKey::Operators,
        ConfigKey::TimeFrom,
        ConfigKey::TimeTo,
        ConfigKey::MemoryFrom,
        ConfigKey::MemoryTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Event => "event",
            ConfigKey::BucketSize => "bucketsize",
            ConfigKey::Pipelines => "pipelines",
            ConfigKey::Operators => "operators",
            ConfigKey::TimeFrom => "from",
            ConfigKey::TimeTo => "to",
            ConfigKey::MemoryFrom => "memoryfrom",
            ConfigKey::MemoryTo => "memoryto",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConfigKey::BucketSize
                | ConfigKey::TimeFrom
                | ConfigKey::TimeTo
                | ConfigKey::MemoryFrom
                | ConfigKey::MemoryTo
        )
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String-keyed options of one chart request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestConfig(BTreeMap<ConfigKey, String>);

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the config of `chart_type` from the current selection context
    pub fn for_chart(chart_type: ChartType, state: &AppState) -> Result<Self> {
        let mut config = Self::new();
        for &key in dependencies_of(chart_type).config_keys {
            let value = match key {
                ConfigKey::Event => state.current_event.clone(),
                ConfigKey::BucketSize => format_number(state.current_bucket_size),
                ConfigKey::Pipelines => state.current_pipeline.to_config_value(),
                ConfigKey::Operators => state.current_operator.to_config_value(),
                ConfigKey::TimeFrom => format_number(state.current_time_bucket_selection_tuple[0]),
                ConfigKey::TimeTo => format_number(state.current_time_bucket_selection_tuple[1]),
                ConfigKey::MemoryFrom => {
                    format_number(state.current_memory_address_selection_tuple[0])
                }
                ConfigKey::MemoryTo => {
                    format_number(state.current_memory_address_selection_tuple[1])
                }
            };
            config.0.insert(key, value);
        }
        config.validate(chart_type)?;
        Ok(config)
    }

    /// Build a config from raw name/value pairs, rejecting unknown names
    pub fn from_pairs<'a>(
        chart_type: ChartType,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut config = Self::new();
        for (name, value) in pairs {
            let key = ConfigKey::parse(name).ok_or_else(|| DashboardError::UnrecognizedConfigKey {
                chart_type: chart_type.to_string(),
                key: name.to_string(),
            })?;
            config.0.insert(key, value.to_string());
        }
        config.validate(chart_type)?;
        Ok(config)
    }

    pub fn insert(&mut self, key: ConfigKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    /// Exactly the keys recognized by `chart_type`, all numeric ones parseable
    pub fn validate(&self, chart_type: ChartType) -> Result<()> {
        let recognized = dependencies_of(chart_type).config_keys;

        if let Some(key) = self.0.keys().find(|k| !recognized.contains(k)) {
            return Err(DashboardError::UnrecognizedConfigKey {
                chart_type: chart_type.to_string(),
                key: key.to_string(),
            });
        }
        if let Some(key) = recognized.iter().find(|k| !self.0.contains_key(k)) {
            return Err(DashboardError::MissingConfigKey {
                chart_type: chart_type.to_string(),
                key: key.to_string(),
            });
        }
        for (key, value) in &self.0 {
            if key.is_numeric() {
                parse_number(*key, value)?;
            }
        }
        Ok(())
    }

    pub fn number(&self, key: ConfigKey) -> Result<f64> {
        let value = self.get(key).ok_or_else(|| DashboardError::MissingConfigKey {
            chart_type: "request".to_string(),
            key: key.to_string(),
        })?;
        parse_number(key, value)
    }

    pub fn bucket_size(&self) -> Result<f64> {
        let size = self.number(ConfigKey::BucketSize)?;
        if size <= 0.0 {
            return Err(DashboardError::InvalidConfigValue {
                key: ConfigKey::BucketSize.to_string(),
                value: format_number(size),
            });
        }
        Ok(size)
    }

    pub fn time_range(&self) -> Result<[f64; 2]> {
        Ok([
            self.number(ConfigKey::TimeFrom)?,
            self.number(ConfigKey::TimeTo)?,
        ])
    }

    pub fn memory_range(&self) -> Result<[f64; 2]> {
        Ok([
            self.number(ConfigKey::MemoryFrom)?,
            self.number(ConfigKey::MemoryTo)?,
        ])
    }

    /// Empty event means every event
    pub fn event(&self) -> Option<&str> {
        self.get(ConfigKey::Event).filter(|e| !e.is_empty())
    }

    pub fn pipelines(&self) -> Selection {
        self.get(ConfigKey::Pipelines)
            .map(Selection::from_config_value)
            .unwrap_or_default()
    }

    pub fn operators(&self) -> Selection {
        self.get(ConfigKey::Operators)
            .map(Selection::from_config_value)
            .unwrap_or_default()
    }
}

fn parse_number(key: ConfigKey, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DashboardError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Shortest decimal form: `0.5` → "0.5", `1.0` → "1"
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// One chart-data request routed back to `chart_id` by its response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub chart_id: ChartId,
    pub chart_type: ChartType,
    /// Stamped by the store when the request is issued
    pub sequence: u64,
    pub config: RequestConfig,
}

impl ChartRequest {
    pub fn new(chart_id: ChartId, chart_type: ChartType, config: RequestConfig) -> Result<Self> {
        config.validate(chart_type)?;
        Ok(Self {
            chart_id,
            chart_type,
            sequence: 0,
            config,
        })
    }
}
