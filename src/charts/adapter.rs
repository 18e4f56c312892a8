//! Column-oriented payloads → grouped, row-oriented chart models
//!
//! Malformed payloads never panic: they degrade to [`ChartModel::Empty`]
//! with a logged reason, so one bad chart cannot take down the dashboard.

use crate::constants::charts::{PLAN_TOOLTIP_LINE_CHARS, PROPORTION_DOMAIN, UIR_HOT_THRESHOLD};
use crate::state::{
    ActivityHistogramData, AppState, BarChartData, ChartDataVariant, Interpolation,
    MemoryAccessHeatmapData, QueryPlanData, Selection, SunburstData, SwimLanesAbsoluteData,
    SwimLanesData, UirViewerData,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Closed numeric interval of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn fixed([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }

    /// Min/max of the finite values present
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Domain>, v| match acc {
                None => Some(Domain { min: v, max: v }),
                Some(d) => Some(Domain {
                    min: d.min.min(v),
                    max: d.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Render-time settings read from the selection context
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdapterOptions {
    pub interpolation: Interpolation,
    /// Heatmap cells as deviation from the per-cell mean across operators
    pub difference: bool,
    /// Operators highlighted in the query plan and the sunburst
    pub operators: Selection,
    /// Pipelines highlighted in the sunburst
    pub pipelines: Selection,
}

impl AdapterOptions {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            interpolation: state.current_interpolation,
            difference: state.memory_heatmaps_difference_representation,
            operators: state.current_operator.clone(),
            pipelines: state.current_pipeline.clone(),
        }
    }
}

/// Highlight only what a narrowed selection names
fn marked(selection: &Selection, item: &str) -> bool {
    !selection.is_all() && selection.contains(item)
}

/// Why a chart has nothing to draw
#[derive(Debug, Clone, PartialEq)]
pub enum EmptyReason {
    NoData,
    /// Parallel arrays disagree in length
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Every group had an all-zero signal
    AllZero,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoData => write!(f, "No data for the current selection"),
            EmptyReason::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Malformed payload: '{}' has {} entries, expected {}",
                field, actual, expected
            ),
            EmptyReason::AllZero => write!(f, "No activity for the current selection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarModel {
    /// `(operator, frequency)` sorted by operator
    pub bars: Vec<(String, f64)>,
    pub domain: Domain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramModel {
    /// `[bucket start, occurrences]`, sorted by bucket
    pub bins: Vec<[f64; 2]>,
    pub bucket_width: f64,
    pub x_domain: Domain,
    pub y_domain: Domain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwimLane {
    pub operator: String,
    /// `[bucket, relative frequency]`, sorted by bucket
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwimLanesModel {
    pub lanes: Vec<SwimLane>,
    pub x_domain: Domain,
    pub y_domain: Domain,
    pub interpolation: Interpolation,
    /// Points are running totals over the lanes before them
    pub stacked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapCell {
    pub bucket: f64,
    pub address: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPanel {
    pub operator: String,
    pub cells: Vec<HeatmapCell>,
}

/// One panel per operator, all sharing the same axes
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapModel {
    pub panels: Vec<HeatmapPanel>,
    pub bucket_width: f64,
    pub x_domain: Domain,
    pub y_domain: Domain,
    pub value_domain: Domain,
    pub difference: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UirLine {
    /// Line number in the UIR dump
    pub number: u32,
    pub text: String,
    pub occurrences: f64,
    pub percentage: f64,
    pub hot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UirModel {
    pub lines: Vec<UirLine>,
    pub total: f64,
}

/// One UIR line listed in a plan node's tooltip
#[derive(Debug, Clone, PartialEq)]
pub struct PlanLine {
    pub number: u32,
    pub text: String,
    /// Share of the operator's own samples
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub operator: String,
    pub label: String,
    pub occurrences: f64,
    /// Share of all samples of the current event, in percent
    pub total_percentage: f64,
    pub top_lines: Vec<PlanLine>,
    pub depth: usize,
    pub highlighted: bool,
}

/// Parent → child, as indices into `QueryPlanModel::nodes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEdge {
    pub parent: usize,
    pub child: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlanModel {
    /// Pre-order
    pub nodes: Vec<PlanNode>,
    pub edges: Vec<PlanEdge>,
    pub occurrence_domain: Domain,
}

/// One arc of a sunburst ring
#[derive(Debug, Clone, PartialEq)]
pub struct SunburstSegment {
    pub label: String,
    pub value: f64,
    /// Angular extent as fractions of the full turn
    pub start: f64,
    pub end: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunburstModel {
    /// Inner ring
    pub pipelines: Vec<SunburstSegment>,
    /// Outer ring; every operator arc lies inside its pipeline's arc
    pub operators: Vec<SunburstSegment>,
    pub total: f64,
}

/// Render-ready form of a chart payload
#[derive(Debug, Clone, PartialEq)]
pub enum ChartModel {
    Bar(BarModel),
    Histogram(HistogramModel),
    SwimLanes(SwimLanesModel),
    Heatmap(HeatmapModel),
    Uir(UirModel),
    QueryPlan(QueryPlanModel),
    Sunburst(SunburstModel),
    Empty(EmptyReason),
}

impl ChartModel {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartModel::Empty(_))
    }
}

/// Shape `data` for rendering
pub fn adapt(data: &ChartDataVariant, options: &AdapterOptions) -> ChartModel {
    profiling::scope!("adapt");

    let model = match data {
        ChartDataVariant::BarChart(d) => bar(d),
        ChartDataVariant::ActivityHistogram(d) => histogram(d),
        ChartDataVariant::SwimLanes(d) => swim_lanes(d, options.interpolation),
        ChartDataVariant::MemoryAccessHeatmap(d) => heatmap(d, options.difference),
        ChartDataVariant::UirViewer(d) => uir(d),
        ChartDataVariant::QueryPlan(d) => query_plan(d, &options.operators),
        ChartDataVariant::Sunburst(d) => sunburst(d, options),
        ChartDataVariant::SwimLanesAbsolute(d) => stacked_lanes(d, options.interpolation),
    };

    model.unwrap_or_else(|reason| {
        if let EmptyReason::LengthMismatch { .. } = reason {
            log::warn!("{} chart: {}", data.chart_type(), reason);
        }
        ChartModel::Empty(reason)
    })
}

/// All parallel columns must be as long as the first one, which must not be empty
fn check_lengths(columns: &[(&'static str, usize)]) -> Result<usize, EmptyReason> {
    let Some(&(_, expected)) = columns.first() else {
        return Err(EmptyReason::NoData);
    };
    if let Some(&(field, actual)) = columns.iter().find(|(_, len)| *len != expected) {
        return Err(EmptyReason::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    if expected == 0 {
        return Err(EmptyReason::NoData);
    }
    Ok(expected)
}

/// Smallest positive gap between the distinct values; 1 when there is none
fn min_step(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let step = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 1.0 }
}

fn domain_of(values: impl IntoIterator<Item = f64>) -> Result<Domain, EmptyReason> {
    Domain::of(values).ok_or(EmptyReason::NoData)
}

fn bar(d: &BarChartData) -> Result<ChartModel, EmptyReason> {
    check_lengths(&[
        ("operators", d.operators.len()),
        ("frequency", d.frequency.len()),
    ])?;

    let grouped: BTreeMap<&str, f64> = d
        .operators
        .iter()
        .zip(&d.frequency)
        .fold(BTreeMap::new(), |mut acc, (op, f)| {
            *acc.entry(op.as_str()).or_insert(0.0) += f;
            acc
        });
    let bars: Vec<(String, f64)> = grouped
        .into_iter()
        .map(|(op, f)| (op.to_string(), f))
        .collect();

    // Bars grow from zero
    let domain = domain_of(bars.iter().map(|(_, f)| *f).chain([0.0]))?;
    Ok(ChartModel::Bar(BarModel { bars, domain }))
}

fn histogram(d: &ActivityHistogramData) -> Result<ChartModel, EmptyReason> {
    check_lengths(&[
        ("buckets", d.buckets.len()),
        ("occurrences", d.occurrences.len()),
    ])?;

    let mut bins: Vec<[f64; 2]> = d
        .buckets
        .iter()
        .zip(&d.occurrences)
        .map(|(b, o)| [*b, *o])
        .collect();
    bins.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let bucket_width = min_step(bins.iter().map(|b| b[0]));

    Ok(ChartModel::Histogram(HistogramModel {
        x_domain: domain_of(bins.iter().map(|b| b[0]))?,
        y_domain: domain_of(bins.iter().map(|b| b[1]).chain([0.0]))?,
        bins,
        bucket_width,
    }))
}

fn swim_lanes(d: &SwimLanesData, interpolation: Interpolation) -> Result<ChartModel, EmptyReason> {
    check_lengths(&[
        ("buckets", d.buckets.len()),
        ("operators", d.operators.len()),
        ("relative_frequencies", d.relative_frequencies.len()),
    ])?;

    let mut groups: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for ((bucket, op), freq) in d.buckets.iter().zip(&d.operators).zip(&d.relative_frequencies) {
        groups.entry(op.as_str()).or_default().push([*bucket, *freq]);
    }

    let lanes: Vec<SwimLane> = groups
        .into_iter()
        .filter(|(_, points)| points.iter().any(|p| p[1] != 0.0))
        .map(|(op, mut points)| {
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            SwimLane {
                operator: op.to_string(),
                points,
            }
        })
        .collect();
    if lanes.is_empty() {
        return Err(EmptyReason::AllZero);
    }

    Ok(ChartModel::SwimLanes(SwimLanesModel {
        x_domain: domain_of(d.buckets.iter().copied())?,
        y_domain: Domain::fixed(PROPORTION_DOMAIN),
        lanes,
        interpolation,
        stacked: false,
    }))
}

/// Absolute counts stacked operator over operator. Buckets an operator has no
/// samples in count as zero so every band spans the same buckets.
fn stacked_lanes(
    d: &SwimLanesAbsoluteData,
    interpolation: Interpolation,
) -> Result<ChartModel, EmptyReason> {
    check_lengths(&[
        ("buckets", d.buckets.len()),
        ("operators", d.operators.len()),
        ("occurrences", d.occurrences.len()),
    ])?;

    let mut buckets: Vec<f64> = d.buckets.iter().copied().filter(|b| b.is_finite()).collect();
    buckets.sort_by(f64::total_cmp);
    buckets.dedup();

    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for ((bucket, op), count) in d.buckets.iter().zip(&d.operators).zip(&d.occurrences) {
        let Ok(slot) = buckets.binary_search_by(|b| b.total_cmp(bucket)) else {
            continue;
        };
        groups
            .entry(op.as_str())
            .or_insert_with(|| vec![0.0; buckets.len()])[slot] += count;
    }
    groups.retain(|_, counts| counts.iter().any(|c| *c != 0.0));
    if groups.is_empty() {
        return Err(EmptyReason::AllZero);
    }

    let mut running = vec![0.0; buckets.len()];
    let mut lanes = Vec::with_capacity(groups.len());
    for (op, counts) in groups {
        for (total, count) in running.iter_mut().zip(&counts) {
            *total += count;
        }
        lanes.push(SwimLane {
            operator: op.to_string(),
            points: buckets.iter().zip(&running).map(|(b, t)| [*b, *t]).collect(),
        });
    }

    Ok(ChartModel::SwimLanes(SwimLanesModel {
        x_domain: domain_of(buckets.iter().copied())?,
        y_domain: domain_of(running.iter().copied().chain([0.0]))?,
        lanes,
        interpolation,
        stacked: true,
    }))
}

fn heatmap(d: &MemoryAccessHeatmapData, difference: bool) -> Result<ChartModel, EmptyReason> {
    let rows = check_lengths(&[
        ("operator", d.operator.len()),
        ("buckets", d.buckets.len()),
        ("memory_address", d.memory_address.len()),
        ("occurrences", d.occurrences.len()),
    ])?;

    let mut groups: BTreeMap<&str, Vec<HeatmapCell>> = BTreeMap::new();
    for i in 0..rows {
        groups.entry(d.operator[i].as_str()).or_default().push(HeatmapCell {
            bucket: d.buckets[i],
            address: d.memory_address[i],
            value: d.occurrences[i],
        });
    }
    groups.retain(|_, cells| cells.iter().any(|c| c.value != 0.0));
    if groups.is_empty() {
        return Err(EmptyReason::AllZero);
    }

    if difference {
        // Operators without samples in a cell count as zero there
        let operators = groups.len() as f64;
        let mut totals: HashMap<(u64, u64), f64> = HashMap::new();
        for cell in groups.values().flatten() {
            *totals
                .entry((cell.bucket.to_bits(), cell.address.to_bits()))
                .or_insert(0.0) += cell.value;
        }
        for cell in groups.values_mut().flatten() {
            let total = totals[&(cell.bucket.to_bits(), cell.address.to_bits())];
            cell.value -= total / operators;
        }
    }

    let panels: Vec<HeatmapPanel> = groups
        .into_iter()
        .map(|(op, cells)| HeatmapPanel {
            operator: op.to_string(),
            cells,
        })
        .collect();
    let cells = || panels.iter().flat_map(|p| p.cells.iter());

    Ok(ChartModel::Heatmap(HeatmapModel {
        bucket_width: min_step(cells().map(|c| c.bucket)),
        x_domain: domain_of(cells().map(|c| c.bucket))?,
        y_domain: domain_of(cells().map(|c| c.address))?,
        value_domain: domain_of(cells().map(|c| c.value))?,
        panels,
        difference,
    }))
}

fn uir(d: &UirViewerData) -> Result<ChartModel, EmptyReason> {
    check_lengths(&[
        ("uir_lines", d.uir_lines.len()),
        ("srclines", d.srclines.len()),
        ("occurrences", d.occurrences.len()),
        ("percentages", d.percentages.len()),
    ])?;

    let mut lines: Vec<UirLine> = d
        .srclines
        .iter()
        .zip(&d.uir_lines)
        .zip(&d.occurrences)
        .zip(&d.percentages)
        .map(|(((number, text), occurrences), percentage)| UirLine {
            number: *number,
            text: text.trim_end().to_string(),
            occurrences: *occurrences,
            percentage: *percentage,
            hot: *percentage > UIR_HOT_THRESHOLD,
        })
        .collect();
    lines.sort_by_key(|l| l.number);

    Ok(ChartModel::Uir(UirModel {
        total: lines.iter().map(|l| l.occurrences).sum(),
        lines,
    }))
}

/// Percent with two decimals, truncated
fn percent_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        (part / total * 10_000.0).trunc() / 100.0
    } else {
        0.0
    }
}

/// Cut `text` to `max_chars`, marking the cut with an ellipsis
fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}...", kept)
}

/// A missing optional column group is fine; a ragged one is not
fn optional_lengths(columns: &[(&'static str, usize)]) -> Result<usize, EmptyReason> {
    check_lengths(columns).or_else(|reason| match reason {
        EmptyReason::NoData => Ok(0),
        other => Err(other),
    })
}

fn query_plan(d: &QueryPlanData, highlighted: &Selection) -> Result<ChartModel, EmptyReason> {
    // A plan without samples still has a shape to draw
    optional_lengths(&[
        ("operators", d.operators.len()),
        ("occurrences", d.occurrences.len()),
    ])?;
    let listed = optional_lengths(&[
        ("uir_operators", d.uir_operators.len()),
        ("uir_srclines", d.uir_srclines.len()),
        ("uir_lines", d.uir_lines.len()),
        ("uir_percentages", d.uir_percentages.len()),
    ])?;

    let occurrences: HashMap<&str, f64> = d
        .operators
        .iter()
        .map(String::as_str)
        .zip(d.occurrences.iter().copied())
        .collect();
    let total: f64 = d.occurrences.iter().sum();

    let mut top_lines: HashMap<&str, Vec<PlanLine>> = HashMap::new();
    for i in 0..listed {
        top_lines
            .entry(d.uir_operators[i].as_str())
            .or_default()
            .push(PlanLine {
                number: d.uir_srclines[i],
                text: shorten(d.uir_lines[i].trim_end(), PLAN_TOOLTIP_LINE_CHARS),
                percentage: d.uir_percentages[i],
            });
    }

    let mut nodes: Vec<PlanNode> = Vec::new();
    let mut edges = Vec::new();

    // Parents always precede their children in the walk
    for (index, (node, parent)) in d.plan.walk().into_iter().enumerate() {
        let depth = parent.map(|p| nodes[p].depth + 1).unwrap_or(0);
        let operator = node.operator.as_str();
        let count = occurrences.get(operator).copied().unwrap_or(0.0);

        nodes.push(PlanNode {
            operator: node.operator.clone(),
            label: if node.label.is_empty() {
                node.operator.clone()
            } else {
                node.label.clone()
            },
            occurrences: count,
            total_percentage: percent_of(count, total),
            top_lines: top_lines.get(operator).cloned().unwrap_or_default(),
            depth,
            highlighted: marked(highlighted, operator),
        });
        if let Some(parent) = parent {
            edges.push(PlanEdge {
                parent,
                child: index,
            });
        }
    }

    Ok(ChartModel::QueryPlan(QueryPlanModel {
        occurrence_domain: domain_of(nodes.iter().map(|n| n.occurrences).chain([0.0]))?,
        nodes,
        edges,
    }))
}

/// Pipelines on the inner ring, their operators on the outer ring
fn sunburst(d: &SunburstData, options: &AdapterOptions) -> Result<ChartModel, EmptyReason> {
    check_lengths(&[
        ("pipelines", d.pipelines.len()),
        ("operators", d.operators.len()),
        ("occurrences", d.occurrences.len()),
    ])?;

    let mut groups: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for ((pipeline, op), count) in d.pipelines.iter().zip(&d.operators).zip(&d.occurrences) {
        if *count > 0.0 {
            *groups
                .entry(pipeline.as_str())
                .or_default()
                .entry(op.as_str())
                .or_insert(0.0) += count;
        }
    }
    let total: f64 = groups.values().flat_map(|ops| ops.values()).sum();
    if total <= 0.0 {
        return Err(EmptyReason::AllZero);
    }

    let mut pipelines = Vec::with_capacity(groups.len());
    let mut operators = Vec::new();
    let mut cursor = 0.0;
    for (pipeline, ops) in groups {
        let start = cursor;
        let mut value = 0.0;
        for (op, count) in ops {
            let end = cursor + count / total;
            operators.push(SunburstSegment {
                label: op.to_string(),
                value: count,
                start: cursor,
                end,
                highlighted: marked(&options.operators, op),
            });
            value += count;
            cursor = end;
        }
        pipelines.push(SunburstSegment {
            label: pipeline.to_string(),
            value,
            start,
            end: cursor,
            highlighted: marked(&options.pipelines, pipeline),
        });
    }

    Ok(ChartModel::Sunburst(SunburstModel {
        pipelines,
        operators,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{QueryPlan, QueryPlanNode};

    fn s(items: &[&str]) -> Vec<String> {
        items.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_mismatched_lengths_degrade_to_empty() {
        let data = ChartDataVariant::SwimLanes(SwimLanesData {
            buckets: vec![0.0, 1.0],
            operators: s(&["scan", "scan"]),
            relative_frequencies: vec![0.5],
        });

        let model = adapt(&data, &AdapterOptions::default());
        assert_eq!(
            model,
            ChartModel::Empty(EmptyReason::LengthMismatch {
                field: "relative_frequencies",
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_empty_payload_is_no_data() {
        let data = ChartDataVariant::BarChart(BarChartData::default());
        assert_eq!(
            adapt(&data, &AdapterOptions::default()),
            ChartModel::Empty(EmptyReason::NoData)
        );
    }

    #[test]
    fn test_swim_lane_groups_are_stable_and_sorted() {
        let data = ChartDataVariant::SwimLanes(SwimLanesData {
            buckets: vec![1.0, 0.0, 1.0, 0.0, 0.0],
            operators: s(&["scan", "scan", "join", "join", "sort"]),
            relative_frequencies: vec![0.5, 0.66, 0.5, 0.33, 0.0],
        });

        let first = adapt(&data, &AdapterOptions::default());
        let second = adapt(&data, &AdapterOptions::default());
        assert_eq!(first, second);

        let ChartModel::SwimLanes(model) = first else {
            panic!("expected swim lanes");
        };
        let operators: Vec<&str> = model.lanes.iter().map(|l| l.operator.as_str()).collect();
        // "sort" has only zero frequencies and is omitted
        assert_eq!(operators, vec!["join", "scan"]);
        assert_eq!(model.lanes[1].points, vec![[0.0, 0.66], [1.0, 0.5]]);
        assert_eq!(model.y_domain, Domain { min: 0.0, max: 1.0 });
        assert_eq!(model.x_domain, Domain { min: 0.0, max: 1.0 });
    }

    #[test]
    fn test_all_zero_swim_lanes_are_empty() {
        let data = ChartDataVariant::SwimLanes(SwimLanesData {
            buckets: vec![0.0],
            operators: s(&["scan"]),
            relative_frequencies: vec![0.0],
        });
        assert_eq!(
            adapt(&data, &AdapterOptions::default()),
            ChartModel::Empty(EmptyReason::AllZero)
        );
    }

    #[test]
    fn test_bar_domain_from_data() {
        let data = ChartDataVariant::BarChart(BarChartData {
            operators: s(&["scan", "join"]),
            frequency: vec![7.0, 3.0],
        });

        let ChartModel::Bar(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected bar chart");
        };
        assert_eq!(model.bars, vec![("join".to_string(), 3.0), ("scan".to_string(), 7.0)]);
        assert_eq!(model.domain, Domain { min: 0.0, max: 7.0 });
    }

    #[test]
    fn test_histogram_bucket_width() {
        let data = ChartDataVariant::ActivityHistogram(ActivityHistogramData {
            buckets: vec![1.0, 0.0, 2.5],
            occurrences: vec![4.0, 2.0, 1.0],
        });

        let ChartModel::Histogram(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected histogram");
        };
        assert_eq!(model.bins, vec![[0.0, 2.0], [1.0, 4.0], [2.5, 1.0]]);
        assert_eq!(model.bucket_width, 1.0);
        assert_eq!(model.x_domain, Domain { min: 0.0, max: 2.5 });
    }

    #[test]
    fn test_heatmap_panels_and_difference() {
        let data = ChartDataVariant::MemoryAccessHeatmap(MemoryAccessHeatmapData {
            operator: s(&["scan", "join", "scan", "idle"]),
            buckets: vec![0.0, 0.0, 1.0, 1.0],
            memory_address: vec![1.0, 1.0, 2.0, 2.0],
            occurrences: vec![6.0, 2.0, 4.0, 0.0],
        });

        let ChartModel::Heatmap(absolute) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected heatmap");
        };
        let operators: Vec<&str> = absolute.panels.iter().map(|p| p.operator.as_str()).collect();
        assert_eq!(operators, vec!["join", "scan"]);
        assert_eq!(absolute.value_domain, Domain { min: 2.0, max: 6.0 });

        let options = AdapterOptions {
            difference: true,
            ..AdapterOptions::default()
        };
        let ChartModel::Heatmap(diff) = adapt(&data, &options) else {
            panic!("expected heatmap");
        };
        assert!(diff.difference);
        assert_eq!(diff.bucket_width, 1.0);
        // Cell (0, 1): scan 6, join 2 → mean 4
        assert_eq!(diff.panels[0].cells[0].value, -2.0);
        assert_eq!(diff.panels[1].cells[0].value, 2.0);
        // Cell (1, 2): only scan has samples → mean 2
        assert_eq!(diff.panels[1].cells[1].value, 2.0);
    }

    #[test]
    fn test_uir_hot_lines() {
        let data = ChartDataVariant::UirViewer(UirViewerData {
            uir_lines: s(&["%1 = load\n", "%2 = add\n"]),
            occurrences: vec![19.0, 1.0],
            percentages: vec![95.0, 5.0],
            srclines: vec![4, 9],
        });

        let ChartModel::Uir(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected uir");
        };
        assert_eq!(model.total, 20.0);
        assert_eq!(model.lines[0].text, "%1 = load");
        assert!(model.lines[0].hot);
        assert!(!model.lines[1].hot, "threshold is exclusive");
        assert_eq!(model.lines[1].number, 9);
    }

    #[test]
    fn test_uir_lines_numbered_and_ordered_by_srcline() {
        let data = ChartDataVariant::UirViewer(UirViewerData {
            srclines: vec![12, 3, 7],
            uir_lines: s(&["%5 = add", "%1 = load", "%5 = add"]),
            occurrences: vec![1.0, 2.0, 1.0],
            percentages: vec![25.0, 50.0, 25.0],
        });

        let ChartModel::Uir(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected uir");
        };
        let numbered: Vec<(u32, &str)> = model
            .lines
            .iter()
            .map(|l| (l.number, l.text.as_str()))
            .collect();
        assert_eq!(numbered, vec![(3, "%1 = load"), (7, "%5 = add"), (12, "%5 = add")]);
    }

    #[test]
    fn test_uir_without_srclines_is_malformed() {
        let data = ChartDataVariant::UirViewer(UirViewerData {
            srclines: vec![],
            uir_lines: s(&["%1 = load"]),
            occurrences: vec![1.0],
            percentages: vec![100.0],
        });
        assert!(matches!(
            adapt(&data, &AdapterOptions::default()),
            ChartModel::Empty(EmptyReason::LengthMismatch { field: "srclines", .. })
        ));
    }

    #[test]
    fn test_query_plan_nodes_edges_and_highlight() {
        let plan = QueryPlan {
            root: QueryPlanNode {
                operator: "join".to_string(),
                label: "hashjoin".to_string(),
                children: vec![
                    QueryPlanNode {
                        operator: "scan_a".to_string(),
                        label: String::new(),
                        children: vec![],
                    },
                    QueryPlanNode {
                        operator: "scan_b".to_string(),
                        label: "tablescan".to_string(),
                        children: vec![],
                    },
                ],
            },
        };
        let data = ChartDataVariant::QueryPlan(QueryPlanData {
            plan,
            operators: s(&["join", "scan_a"]),
            occurrences: vec![5.0, 9.0],
            ..plan_data(vec![])
        });
        let options = AdapterOptions {
            operators: Selection::Only(s(&["scan_a"])),
            ..AdapterOptions::default()
        };

        let ChartModel::QueryPlan(model) = adapt(&data, &options) else {
            panic!("expected query plan");
        };
        let labels: Vec<&str> = model.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["hashjoin", "scan_a", "tablescan"]);
        assert_eq!(
            model.edges,
            vec![PlanEdge { parent: 0, child: 1 }, PlanEdge { parent: 0, child: 2 }]
        );
        assert_eq!(model.nodes[1].depth, 1);
        assert_eq!(model.nodes[2].occurrences, 0.0);
        assert!(model.nodes[1].highlighted);
        assert!(!model.nodes[0].highlighted);
        assert_eq!(model.occurrence_domain, Domain { min: 0.0, max: 9.0 });
    }

    #[test]
    fn test_plan_without_selection_highlights_nothing() {
        let data = ChartDataVariant::QueryPlan(plan_data(vec![node("scan", vec![])]));

        let ChartModel::QueryPlan(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected query plan");
        };
        assert!(!model.nodes[0].highlighted);

        // Nothing selected highlights nothing either
        let none = AdapterOptions {
            operators: Selection::Only(vec![]),
            ..AdapterOptions::default()
        };
        let ChartModel::QueryPlan(model) = adapt(&data, &none) else {
            panic!("expected query plan");
        };
        assert!(!model.nodes[0].highlighted);
    }

    fn node(operator: &str, children: Vec<QueryPlanNode>) -> QueryPlanNode {
        QueryPlanNode {
            operator: operator.to_string(),
            label: String::new(),
            children,
        }
    }

    /// Plan whose root has `children`; no samples, no UIR lines
    fn plan_data(children: Vec<QueryPlanNode>) -> QueryPlanData {
        QueryPlanData {
            plan: QueryPlan {
                root: node("root", children),
            },
            operators: vec![],
            occurrences: vec![],
            uir_operators: vec![],
            uir_srclines: vec![],
            uir_lines: vec![],
            uir_percentages: vec![],
        }
    }

    #[test]
    fn test_plan_edges_follow_tree_with_repeated_operator_names() {
        // root ─ scan ─ scan
        //      └ scan
        let data = ChartDataVariant::QueryPlan(plan_data(vec![
            node("scan", vec![node("scan", vec![])]),
            node("scan", vec![]),
        ]));

        let ChartModel::QueryPlan(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected query plan");
        };
        let depths: Vec<usize> = model.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1]);
        assert_eq!(
            model.edges,
            vec![
                PlanEdge { parent: 0, child: 1 },
                PlanEdge { parent: 1, child: 2 },
                PlanEdge { parent: 0, child: 3 },
            ]
        );
    }

    #[test]
    fn test_plan_node_tooltip_lines_and_total_share() {
        let long_line = "x".repeat(80);
        let data = ChartDataVariant::QueryPlan(QueryPlanData {
            operators: s(&["root", "scan"]),
            occurrences: vec![1.0, 2.0],
            uir_operators: s(&["scan", "scan", "root"]),
            uir_srclines: vec![7, 3, 1],
            uir_lines: vec!["%4 = load\n".to_string(), long_line, "%1 = br".to_string()],
            uir_percentages: vec![50.0, 50.0, 100.0],
            ..plan_data(vec![node("scan", vec![])])
        });

        let ChartModel::QueryPlan(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected query plan");
        };
        let scan = &model.nodes[1];
        assert_eq!(scan.total_percentage, 66.66);
        assert_eq!(scan.top_lines.len(), 2);
        assert_eq!(scan.top_lines[0].number, 7);
        assert_eq!(scan.top_lines[0].text, "%4 = load");
        assert_eq!(scan.top_lines[1].text.chars().count(), 67);
        assert!(scan.top_lines[1].text.ends_with("..."));
        assert_eq!(model.nodes[0].top_lines[0].percentage, 100.0);
        assert_eq!(model.nodes[0].total_percentage, 33.33);
    }

    #[test]
    fn test_ragged_plan_lines_degrade_to_empty() {
        let data = ChartDataVariant::QueryPlan(QueryPlanData {
            uir_operators: s(&["scan"]),
            uir_srclines: vec![],
            ..plan_data(vec![])
        });
        assert!(matches!(
            adapt(&data, &AdapterOptions::default()),
            ChartModel::Empty(EmptyReason::LengthMismatch { field: "uir_srclines", .. })
        ));
    }

    #[test]
    fn test_sunburst_rings_nest_operators_in_pipelines() {
        let data = ChartDataVariant::Sunburst(SunburstData {
            pipelines: s(&["p1", "p0", "p0", "p1"]),
            operators: s(&["join", "scan", "filter", "sort"]),
            occurrences: vec![1.0, 4.0, 2.0, 0.0],
        });
        let options = AdapterOptions {
            pipelines: Selection::Only(s(&["p1"])),
            operators: Selection::Only(s(&["scan"])),
            ..AdapterOptions::default()
        };

        let ChartModel::Sunburst(model) = adapt(&data, &options) else {
            panic!("expected sunburst");
        };
        assert_eq!(model.total, 7.0);

        let inner: Vec<(&str, f64, bool)> = model
            .pipelines
            .iter()
            .map(|p| (p.label.as_str(), p.value, p.highlighted))
            .collect();
        assert_eq!(inner, vec![("p0", 6.0, false), ("p1", 1.0, true)]);

        let outer: Vec<&str> = model.operators.iter().map(|o| o.label.as_str()).collect();
        // Zero-count "sort" has no arc
        assert_eq!(outer, vec!["filter", "scan", "join"]);
        assert!(model.operators[1].highlighted);
        assert_eq!(model.operators[0].start, model.pipelines[0].start);
        assert_eq!(model.operators[1].end, model.pipelines[0].end);
        assert_eq!(model.operators[2].end, model.pipelines[1].end);
    }

    #[test]
    fn test_all_zero_sunburst_is_empty() {
        let data = ChartDataVariant::Sunburst(SunburstData {
            pipelines: s(&["p0"]),
            operators: s(&["scan"]),
            occurrences: vec![0.0],
        });
        assert_eq!(
            adapt(&data, &AdapterOptions::default()),
            ChartModel::Empty(EmptyReason::AllZero)
        );
    }

    #[test]
    fn test_absolute_lanes_stack_and_fill_gaps() {
        let data = ChartDataVariant::SwimLanesAbsolute(SwimLanesAbsoluteData {
            buckets: vec![0.0, 0.0, 1.0, 2.0],
            operators: s(&["scan", "join", "scan", "join"]),
            occurrences: vec![2.0, 1.0, 3.0, 4.0],
        });

        let ChartModel::SwimLanes(model) = adapt(&data, &AdapterOptions::default()) else {
            panic!("expected swim lanes");
        };
        assert!(model.stacked);
        assert_eq!(model.lanes[0].operator, "join");
        assert_eq!(model.lanes[0].points, vec![[0.0, 1.0], [1.0, 0.0], [2.0, 4.0]]);
        assert_eq!(model.lanes[1].operator, "scan");
        assert_eq!(model.lanes[1].points, vec![[0.0, 3.0], [1.0, 3.0], [2.0, 4.0]]);
        assert_eq!(model.y_domain, Domain { min: 0.0, max: 4.0 });
    }
}
