//! Per-chart aggregations over the loaded profile

use super::ProfileSource;
use crate::charts::{ChartRequest, ConfigKey, RequestConfig};
use crate::constants::charts::PLAN_TOOLTIP_UIR_LINES;
use crate::constants::profile::*;
use crate::constants::state::UNBOUNDED;
use crate::error::{DashboardError, Result};
use crate::state::{
    ActivityHistogramData, BarChartData, ChartDataVariant, ChartType, MemoryAccessHeatmapData,
    QueryPlanData, Selection, SunburstData, SwimLanesAbsoluteData, SwimLanesData, UirViewerData,
};
use polars::prelude::*;
use std::collections::HashMap;

const BUCKET: &str = "bucket";
const MEMORY: &str = "memory";
const COUNT: &str = "count";
const SHARE: &str = "share";

/// Compute the payload answering `request`
pub fn chart_data(source: &ProfileSource, request: &ChartRequest) -> Result<ChartDataVariant> {
    profiling::scope!("chart_data");
    let df = source.dataframe();
    let config = &request.config;

    let data = match request.chart_type {
        ChartType::BarChart => ChartDataVariant::BarChart(bar_chart(df, config)?),
        ChartType::ActivityHistogram => {
            ChartDataVariant::ActivityHistogram(activity_histogram(df, config)?)
        }
        ChartType::SwimLanes => ChartDataVariant::SwimLanes(swim_lanes(df, config)?),
        ChartType::MemoryAccessHeatmap => {
            ChartDataVariant::MemoryAccessHeatmap(memory_heatmap(df, config)?)
        }
        ChartType::UirViewer => ChartDataVariant::UirViewer(uir_viewer(df, config)?),
        ChartType::QueryPlan => ChartDataVariant::QueryPlan(query_plan(source, config)?),
        ChartType::Sunburst => ChartDataVariant::Sunburst(sunburst(df, config)?),
        ChartType::SwimLanesAbsolute => {
            ChartDataVariant::SwimLanesAbsolute(swim_lanes_absolute(df, config)?)
        }
    };
    Ok(data)
}

/// Row filter from the keys present in `config`
fn row_filter(config: &RequestConfig) -> Result<Option<Expr>> {
    let mut predicates = Vec::new();

    if let Some(event) = config.event() {
        predicates.push(col(COL_EVENT).eq(lit(event.to_string())));
    }
    if config.get(ConfigKey::Pipelines).is_some() {
        if let Some(expr) = any_of(COL_PIPELINE, &config.pipelines()) {
            predicates.push(expr);
        }
    }
    if config.get(ConfigKey::TimeFrom).is_some() {
        let [from, to] = config.time_range()?;
        if from != UNBOUNDED {
            predicates.push(col(COL_TIME).gt_eq(lit(from)));
        }
        if to != UNBOUNDED {
            predicates.push(col(COL_TIME).lt_eq(lit(to)));
        }
    }

    Ok(predicates.into_iter().reduce(|acc, p| acc.and(p)))
}

/// `column` equals one of the selected values; `None` when everything is
/// selected. An empty selection matches no row.
fn any_of(column: &str, selection: &Selection) -> Option<Expr> {
    match selection {
        Selection::All => None,
        Selection::Only(items) => Some(
            items
                .iter()
                .map(|item| col(column).eq(lit(item.clone())))
                .reduce(|acc, p| acc.or(p))
                .unwrap_or_else(|| lit(false)),
        ),
    }
}

fn filtered(df: &DataFrame, config: &RequestConfig) -> Result<LazyFrame> {
    let lf = df.clone().lazy();
    Ok(match row_filter(config)? {
        Some(predicate) => lf.filter(predicate),
        None => lf,
    })
}

/// Start of the time bucket a sample falls into
fn time_bucket(bucket_size: f64) -> Expr {
    ((col(COL_TIME) / lit(bucket_size))
        .cast(DataType::Int64)
        .cast(DataType::Float64)
        * lit(bucket_size))
    .alias(BUCKET)
}

/// Truncate to two decimals
fn truncate_2(expr: Expr) -> Expr {
    (expr * lit(100.0)).cast(DataType::Int64).cast(DataType::Float64) / lit(100.0)
}

fn counts() -> Expr {
    len().cast(DataType::Float64).alias(COUNT)
}

pub fn bar_chart(df: &DataFrame, config: &RequestConfig) -> Result<BarChartData> {
    let out = filtered(df, config)?
        .group_by([col(COL_OPERATOR)])
        .agg([counts()])
        .sort([COL_OPERATOR], SortMultipleOptions::default())
        .collect()?;

    Ok(BarChartData {
        operators: strings(&out, COL_OPERATOR)?,
        frequency: numbers(&out, COUNT)?,
    })
}

pub fn activity_histogram(df: &DataFrame, config: &RequestConfig) -> Result<ActivityHistogramData> {
    let bucket_size = config.bucket_size()?;
    let out = filtered(df, config)?
        .with_column(time_bucket(bucket_size))
        .group_by([col(BUCKET)])
        .agg([counts()])
        .sort([BUCKET], SortMultipleOptions::default())
        .collect()?;

    Ok(ActivityHistogramData {
        buckets: numbers(&out, BUCKET)?,
        occurrences: numbers(&out, COUNT)?,
    })
}

/// Sample counts per `(bucket, operator)` after the operator selection
fn lane_counts(df: &DataFrame, config: &RequestConfig) -> Result<LazyFrame> {
    let bucket_size = config.bucket_size()?;
    let mut lf = filtered(df, config)?;
    if let Some(predicate) = any_of(COL_OPERATOR, &config.operators()) {
        lf = lf.filter(predicate);
    }

    Ok(lf
        .with_column(time_bucket(bucket_size))
        .group_by([col(BUCKET), col(COL_OPERATOR)])
        .agg([counts()]))
}

/// Share of each operator's samples within its time bucket
pub fn swim_lanes(df: &DataFrame, config: &RequestConfig) -> Result<SwimLanesData> {
    let out = lane_counts(df, config)?
        .with_column(
            truncate_2(col(COUNT) / col(COUNT).sum().over([col(BUCKET)])).alias(SHARE),
        )
        .sort([BUCKET, COL_OPERATOR], SortMultipleOptions::default())
        .collect()?;

    Ok(SwimLanesData {
        buckets: numbers(&out, BUCKET)?,
        operators: strings(&out, COL_OPERATOR)?,
        relative_frequencies: numbers(&out, SHARE)?,
    })
}

/// Raw sample counts per bucket and operator, selected pipelines combined
pub fn swim_lanes_absolute(
    df: &DataFrame,
    config: &RequestConfig,
) -> Result<SwimLanesAbsoluteData> {
    let out = lane_counts(df, config)?
        .sort([BUCKET, COL_OPERATOR], SortMultipleOptions::default())
        .collect()?;

    Ok(SwimLanesAbsoluteData {
        buckets: numbers(&out, BUCKET)?,
        operators: strings(&out, COL_OPERATOR)?,
        occurrences: numbers(&out, COUNT)?,
    })
}

/// Sample counts per pipeline and operator
pub fn sunburst(df: &DataFrame, config: &RequestConfig) -> Result<SunburstData> {
    let out = filtered(df, config)?
        .group_by([col(COL_PIPELINE), col(COL_OPERATOR)])
        .agg([counts()])
        .sort([COL_PIPELINE, COL_OPERATOR], SortMultipleOptions::default())
        .collect()?;

    Ok(SunburstData {
        pipelines: strings(&out, COL_PIPELINE)?,
        operators: strings(&out, COL_OPERATOR)?,
        occurrences: numbers(&out, COUNT)?,
    })
}

pub fn memory_heatmap(df: &DataFrame, config: &RequestConfig) -> Result<MemoryAccessHeatmapData> {
    let bucket_size = config.bucket_size()?;
    let [memory_from, memory_to] = config.memory_range()?;

    let mut lf = filtered(df, config)?
        .with_column(time_bucket(bucket_size))
        .with_column(
            (col(COL_ADDRESS).cast(DataType::Float64) / lit(MEMORY_ADDRESS_DIVISOR as f64))
                .cast(DataType::Int64)
                .cast(DataType::Float64)
                .alias(MEMORY),
        );
    if memory_from != UNBOUNDED {
        lf = lf.filter(col(MEMORY).gt_eq(lit(memory_from)));
    }
    if memory_to != UNBOUNDED {
        lf = lf.filter(col(MEMORY).lt_eq(lit(memory_to)));
    }

    let out = lf
        .group_by([col(COL_OPERATOR), col(BUCKET), col(MEMORY)])
        .agg([counts()])
        .sort([COL_OPERATOR, BUCKET, MEMORY], SortMultipleOptions::default())
        .collect()?;

    Ok(MemoryAccessHeatmapData {
        operator: strings(&out, COL_OPERATOR)?,
        buckets: numbers(&out, BUCKET)?,
        memory_address: numbers(&out, MEMORY)?,
        occurrences: numbers(&out, COUNT)?,
    })
}

/// Sample count per UIR line. Lines are keyed and ordered by their line
/// number in the dump, so identical text on two lines stays two entries.
pub fn uir_viewer(df: &DataFrame, config: &RequestConfig) -> Result<UirViewerData> {
    let out = filtered(df, config)?
        .group_by([col(COL_SRCLINE), col(COL_UIR)])
        .agg([counts()])
        .with_column(truncate_2(col(COUNT) / col(COUNT).sum() * lit(100.0)).alias(SHARE))
        .sort([COL_SRCLINE, COL_UIR], SortMultipleOptions::default())
        .collect()?;

    Ok(UirViewerData {
        srclines: line_numbers(&out, COL_SRCLINE)?,
        uir_lines: strings(&out, COL_UIR)?,
        occurrences: numbers(&out, COUNT)?,
        percentages: numbers(&out, SHARE)?,
    })
}

pub fn query_plan(source: &ProfileSource, config: &RequestConfig) -> Result<QueryPlanData> {
    let plan = source.query_plan().cloned().ok_or_else(|| {
        DashboardError::Custom("No query plan was found next to the profile".to_string())
    })?;
    let df = source.dataframe();
    let totals = bar_chart(df, config)?;

    // Hottest lines first within each operator
    let lines = filtered(df, config)?
        .group_by([col(COL_OPERATOR), col(COL_SRCLINE), col(COL_UIR)])
        .agg([counts()])
        .with_column(
            truncate_2(col(COUNT) / col(COUNT).sum().over([col(COL_OPERATOR)]) * lit(100.0))
                .alias(SHARE),
        )
        .sort(
            [COL_OPERATOR, COUNT, COL_SRCLINE],
            SortMultipleOptions::default().with_order_descending_multi([false, true, false]),
        )
        .collect()?;

    let operators = strings(&lines, COL_OPERATOR)?;
    let srclines = line_numbers(&lines, COL_SRCLINE)?;
    let texts = strings(&lines, COL_UIR)?;
    let shares = numbers(&lines, SHARE)?;

    let mut data = QueryPlanData {
        plan,
        operators: totals.operators,
        occurrences: totals.frequency,
        uir_operators: Vec::new(),
        uir_srclines: Vec::new(),
        uir_lines: Vec::new(),
        uir_percentages: Vec::new(),
    };
    let mut listed: HashMap<&str, usize> = HashMap::new();
    for (i, operator) in operators.iter().enumerate() {
        let count = listed.entry(operator.as_str()).or_insert(0);
        if *count == PLAN_TOOLTIP_UIR_LINES {
            continue;
        }
        *count += 1;
        data.uir_operators.push(operator.clone());
        data.uir_srclines.push(srclines[i]);
        data.uir_lines.push(texts[i].clone());
        data.uir_percentages.push(shares[i]);
    }
    Ok(data)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| DashboardError::ColumnNotFound {
            column: name.to_string(),
        })
}

fn strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let values = column(df, name)?.str()?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn numbers(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let values = column(df, name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

/// Source line numbers; missing or negative entries become 0
fn line_numbers(df: &DataFrame, name: &str) -> Result<Vec<u32>> {
    let values = column(df, name)?.cast(&DataType::Int64)?;
    Ok(values
        .i64()?
        .into_iter()
        .map(|v| v.and_then(|n| u32::try_from(n).ok()).unwrap_or(0))
        .collect())
}
