use crate::constants::profile::*;
use crate::error::{DashboardError, Result};
use crate::state::{ProfileSummary, QueryPlan};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Distinct values of the selectable columns, sorted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universes {
    pub events: Vec<String>,
    pub operators: Vec<String>,
    pub pipelines: Vec<String>,
}

/// Loaded profiler samples, normalized to the columns the charts query
pub struct ProfileSource {
    frame: DataFrame,
    query_plan: Option<QueryPlan>,
}

impl ProfileSource {
    /// Load a profiler CSV export and its optional query plan
    pub fn load(path: &Path, separator: u8) -> Result<Self> {
        profiling::scope!("ProfileSource::load");

        let raw = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_separator(separator)
            .with_infer_schema_length(Some(100))
            .finish()?
            .collect()?;

        Self::from_dataframe(raw, load_query_plan(path))
    }

    /// Wrap an already-loaded frame. Every required column must be present.
    pub fn from_dataframe(df: DataFrame, query_plan: Option<QueryPlan>) -> Result<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|c| !names.iter().any(|n| n == *c))
        {
            return Err(DashboardError::ColumnNotFound {
                column: missing.to_string(),
            });
        }

        let frame = df
            .lazy()
            .select([
                col(COL_OPERATOR).cast(DataType::String),
                col(COL_EVENT).cast(DataType::String),
                col(COL_TIME).cast(DataType::Float64),
                col(COL_PIPELINE).cast(DataType::String),
                col(COL_ADDRESS).cast(DataType::Int64),
                col(COL_UIR).cast(DataType::String),
                col(COL_SRCLINE).cast(DataType::Int64),
            ])
            .collect()?;

        Ok(Self { frame, query_plan })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.frame
    }

    pub fn query_plan(&self) -> Option<&QueryPlan> {
        self.query_plan.as_ref()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn chunk_count(&self) -> usize {
        self.height().div_ceil(PARSE_CHUNK_ROWS).max(1)
    }

    /// Collect event/operator/pipeline universes chunk by chunk,
    /// reporting the number of chunks done after each one
    pub fn collect_universes(&self, mut on_chunk: impl FnMut(usize)) -> Result<Universes> {
        profiling::scope!("ProfileSource::collect_universes");

        let mut events = BTreeSet::new();
        let mut operators = BTreeSet::new();
        let mut pipelines = BTreeSet::new();

        for chunk in 0..self.chunk_count() {
            let slice = self
                .frame
                .slice((chunk * PARSE_CHUNK_ROWS) as i64, PARSE_CHUNK_ROWS);
            collect_distinct(&slice, COL_EVENT, &mut events)?;
            collect_distinct(&slice, COL_OPERATOR, &mut operators)?;
            collect_distinct(&slice, COL_PIPELINE, &mut pipelines)?;
            on_chunk(chunk + 1);
        }

        Ok(Universes {
            events: events.into_iter().collect(),
            operators: operators.into_iter().collect(),
            pipelines: pipelines.into_iter().collect(),
        })
    }

    pub fn summary(&self) -> Result<ProfileSummary> {
        let time = self.frame.column(COL_TIME)?.as_materialized_series().f64()?;
        let addr = self
            .frame
            .column(COL_ADDRESS)?
            .as_materialized_series()
            .i64()?;
        let bucket = |a: i64| (a / MEMORY_ADDRESS_DIVISOR) as f64;

        Ok(ProfileSummary {
            rows: self.height(),
            time_domain: [time.min().unwrap_or(0.0), time.max().unwrap_or(0.0)],
            memory_domain: [
                addr.min().map(bucket).unwrap_or(0.0),
                addr.max().map(bucket).unwrap_or(0.0),
            ],
            query_plan: self.query_plan.clone(),
        })
    }
}

fn collect_distinct(df: &DataFrame, column: &str, into: &mut BTreeSet<String>) -> Result<()> {
    let values = df.column(column)?.as_materialized_series().str()?;
    for value in values.into_iter().flatten() {
        if !into.contains(value) {
            into.insert(value.to_string());
        }
    }
    Ok(())
}

/// `<csv>.plan.json` next to the profile
pub fn query_plan_path(csv: &Path) -> PathBuf {
    let mut name = csv.as_os_str().to_owned();
    name.push(".");
    name.push(QUERY_PLAN_SUFFIX);
    PathBuf::from(name)
}

/// Read the query plan stored next to `csv`. A missing file is normal; a
/// malformed one is logged and ignored.
pub fn load_query_plan(csv: &Path) -> Option<QueryPlan> {
    let path = query_plan_path(csv);
    let text = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&text) {
        Ok(plan) => Some(plan),
        Err(e) => {
            log::warn!("ignoring malformed query plan {}: {}", path.display(), e);
            None
        }
    }
}
