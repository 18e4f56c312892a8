//! Chart types and their fetched payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Integer handle of one mounted chart instance and its data slot
pub type ChartId = u32;

/// Closed enumeration of chart kinds, shared with the fetch collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartType {
    BarChart,
    ActivityHistogram,
    SwimLanes,
    MemoryAccessHeatmap,
    UirViewer,
    QueryPlan,
    #[serde(rename = "SUNBURST_CHART")]
    Sunburst,
    /// Absolute sample counts per operator, every selected pipeline combined
    #[serde(rename = "SWIM_LANES_COMBINED_MULTIPLE_PIPELINES_ABSOLUTE")]
    SwimLanesAbsolute,
}

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::BarChart,
        ChartType::ActivityHistogram,
        ChartType::SwimLanes,
        ChartType::MemoryAccessHeatmap,
        ChartType::UirViewer,
        ChartType::QueryPlan,
        ChartType::Sunburst,
        ChartType::SwimLanesAbsolute,
    ];

    /// Wire tag of the chart type
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::BarChart => "BAR_CHART",
            ChartType::ActivityHistogram => "ACTIVITY_HISTOGRAM",
            ChartType::SwimLanes => "SWIM_LANES",
            ChartType::MemoryAccessHeatmap => "MEMORY_ACCESS_HEATMAP",
            ChartType::UirViewer => "UIR_VIEWER",
            ChartType::QueryPlan => "QUERY_PLAN",
            ChartType::Sunburst => "SUNBURST_CHART",
            ChartType::SwimLanesAbsolute => "SWIM_LANES_COMBINED_MULTIPLE_PIPELINES_ABSOLUTE",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            ChartType::BarChart => "Event Occurrences",
            ChartType::ActivityHistogram => "Activity Histogram",
            ChartType::SwimLanes => "Operator Swim Lanes",
            ChartType::MemoryAccessHeatmap => "Memory Access Heatmap",
            ChartType::UirViewer => "UIR Viewer",
            ChartType::QueryPlan => "Query Plan",
            ChartType::Sunburst => "Pipelines and Operators",
            ChartType::SwimLanesAbsolute => "Operator Activity (absolute)",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarChartData {
    pub operators: Vec<String>,
    pub frequency: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityHistogramData {
    pub buckets: Vec<f64>,
    pub occurrences: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwimLanesData {
    pub buckets: Vec<f64>,
    pub operators: Vec<String>,
    pub relative_frequencies: Vec<f64>,
}

/// Sample counts per `(bucket, operator)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwimLanesAbsoluteData {
    pub buckets: Vec<f64>,
    pub operators: Vec<String>,
    pub occurrences: Vec<f64>,
}

/// Sample counts per `(pipeline, operator)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SunburstData {
    pub pipelines: Vec<String>,
    pub operators: Vec<String>,
    pub occurrences: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryAccessHeatmapData {
    pub operator: Vec<String>,
    pub buckets: Vec<f64>,
    pub memory_address: Vec<f64>,
    pub occurrences: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UirViewerData {
    /// Line number of each entry in the UIR dump
    pub srclines: Vec<u32>,
    pub uir_lines: Vec<String>,
    pub occurrences: Vec<f64>,
    pub percentages: Vec<f64>,
}

/// One operator node of a physical query plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlanNode {
    /// Operator identifier as it appears in the profiler's `operator` column
    pub operator: String,
    /// Display label (e.g. "hashjoin", "tablescan lineitem")
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub children: Vec<QueryPlanNode>,
}

/// Physical query plan tree loaded next to the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub root: QueryPlanNode,
}

impl QueryPlan {
    /// Pre-order walk of the plan yielding `(node, parent position)`, the
    /// parent given as its index in the returned list
    pub fn walk(&self) -> Vec<(&QueryPlanNode, Option<usize>)> {
        let mut out = Vec::new();
        let mut stack: Vec<(&QueryPlanNode, Option<usize>)> = vec![(&self.root, None)];
        while let Some((node, parent)) = stack.pop() {
            let index = out.len();
            out.push((node, parent));
            for child in node.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlanData {
    pub plan: QueryPlan,
    pub operators: Vec<String>,
    pub occurrences: Vec<f64>,
    /// Hottest UIR lines per operator: `(operator, srcline, line, percent of
    /// the operator's samples)`, hottest first within each operator
    #[serde(default)]
    pub uir_operators: Vec<String>,
    #[serde(default)]
    pub uir_srclines: Vec<u32>,
    #[serde(default)]
    pub uir_lines: Vec<String>,
    #[serde(default)]
    pub uir_percentages: Vec<f64>,
}

/// Fetched payload of a chart, tagged by chart type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chartType", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChartDataVariant {
    BarChart(BarChartData),
    ActivityHistogram(ActivityHistogramData),
    SwimLanes(SwimLanesData),
    MemoryAccessHeatmap(MemoryAccessHeatmapData),
    UirViewer(UirViewerData),
    QueryPlan(QueryPlanData),
    #[serde(rename = "SUNBURST_CHART")]
    Sunburst(SunburstData),
    #[serde(rename = "SWIM_LANES_COMBINED_MULTIPLE_PIPELINES_ABSOLUTE")]
    SwimLanesAbsolute(SwimLanesAbsoluteData),
}

impl ChartDataVariant {
    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartDataVariant::BarChart(_) => ChartType::BarChart,
            ChartDataVariant::ActivityHistogram(_) => ChartType::ActivityHistogram,
            ChartDataVariant::SwimLanes(_) => ChartType::SwimLanes,
            ChartDataVariant::MemoryAccessHeatmap(_) => ChartType::MemoryAccessHeatmap,
            ChartDataVariant::UirViewer(_) => ChartType::UirViewer,
            ChartDataVariant::QueryPlan(_) => ChartType::QueryPlan,
            ChartDataVariant::Sunburst(_) => ChartType::Sunburst,
            ChartDataVariant::SwimLanesAbsolute(_) => ChartType::SwimLanesAbsolute,
        }
    }
}

/// Data slot of one chart id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataObject {
    pub chart_id: ChartId,
    /// Sequence number of the request this payload answers
    #[serde(default)]
    pub sequence: u64,
    pub chart_data: Arc<ChartDataVariant>,
}

impl ChartDataObject {
    pub fn new(chart_id: ChartId, sequence: u64, chart_data: ChartDataVariant) -> Self {
        Self {
            chart_id,
            sequence,
            chart_data: Arc::new(chart_data),
        }
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_data.chart_type()
    }

    /// Whether two slots hold the very same payload (no deep comparison)
    pub fn same_payload(a: Option<&Self>, b: Option<&Self>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.sequence == b.sequence && Arc::ptr_eq(&a.chart_data, &b.chart_data)
            }
            _ => false,
        }
    }
}

/// Chart id → data slot
pub type ChartDataKeyValue = BTreeMap<ChartId, ChartDataObject>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_tag_matches_chart_type() {
        let variant = ChartDataVariant::SwimLanes(SwimLanesData::default());
        assert_eq!(variant.chart_type(), ChartType::SwimLanes);

        let json = serde_json::to_value(&variant).unwrap();
        assert_eq!(json["chartType"], "SWIM_LANES");
        assert_eq!(json["data"]["relative_frequencies"], serde_json::json!([]));
    }

    #[test]
    fn test_same_payload_uses_identity() {
        let a = ChartDataObject::new(0, 1, ChartDataVariant::BarChart(BarChartData::default()));
        let copy = a.clone();
        let rebuilt = ChartDataObject::new(0, 1, ChartDataVariant::BarChart(BarChartData::default()));

        assert!(ChartDataObject::same_payload(Some(&a), Some(&copy)));
        assert!(!ChartDataObject::same_payload(Some(&a), Some(&rebuilt)));
        assert!(!ChartDataObject::same_payload(Some(&a), None));
        assert!(ChartDataObject::same_payload(None, None));
    }

    #[test]
    fn test_query_plan_walk_is_preorder() {
        let plan: QueryPlan = serde_json::from_str(
            r#"{"root": {"operator": "join1", "label": "hashjoin", "children": [
                {"operator": "scan1", "label": "tablescan"},
                {"operator": "scan2", "label": "tablescan"}
            ]}}"#,
        )
        .unwrap();

        let walked: Vec<(&str, Option<usize>)> = plan
            .walk()
            .into_iter()
            .map(|(n, p)| (n.operator.as_str(), p))
            .collect();
        assert_eq!(
            walked,
            vec![("join1", None), ("scan1", Some(0)), ("scan2", Some(0))]
        );
    }

    #[test]
    fn test_walk_parents_are_positions_not_names() {
        let plan: QueryPlan = serde_json::from_str(
            r#"{"root": {"operator": "scan", "children": [
                {"operator": "scan", "children": [{"operator": "scan"}]},
                {"operator": "filter"}
            ]}}"#,
        )
        .unwrap();

        let parents: Vec<Option<usize>> = plan.walk().into_iter().map(|(_, p)| p).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_new_chart_types_use_their_wire_tags() {
        for chart_type in [ChartType::Sunburst, ChartType::SwimLanesAbsolute] {
            let json = serde_json::to_value(chart_type).unwrap();
            assert_eq!(json, chart_type.as_str());
        }

        let variant = ChartDataVariant::Sunburst(SunburstData::default());
        let json = serde_json::to_value(&variant).unwrap();
        assert_eq!(json["chartType"], "SUNBURST_CHART");
        let back: ChartDataVariant = serde_json::from_value(json).unwrap();
        assert_eq!(back.chart_type(), ChartType::Sunburst);
    }

    #[test]
    fn test_plan_payload_without_uir_lines_still_parses() {
        let data: QueryPlanData = serde_json::from_str(
            r#"{"plan": {"root": {"operator": "scan"}}, "operators": ["scan"], "occurrences": [3]}"#,
        )
        .unwrap();
        assert!(data.uir_operators.is_empty());
        assert!(data.uir_percentages.is_empty());
    }
}
