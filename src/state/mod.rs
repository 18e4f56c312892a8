//! Application state management
//!
//! `AppState` is an immutable-per-update record: the store never edits it in
//! place, it swaps in the value returned by [`reduce`] for every mutation.

mod chart_data;
mod mutation;
mod store;

pub use chart_data::{
    ActivityHistogramData, BarChartData, ChartDataKeyValue, ChartDataObject, ChartDataVariant,
    ChartId, ChartType, MemoryAccessHeatmapData, QueryPlan, QueryPlanData, QueryPlanNode,
    SunburstData, SwimLanesAbsoluteData, SwimLanesData, UirViewerData,
};
pub use mutation::{reduce, KeyValue, StateMutation};
pub use store::{FetchOutcome, Store, SubscriptionId, Transition};

use crate::charts::ChartRequest;
use crate::constants::state::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Operator or pipeline selection: everything, or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    All,
    Only(Vec<String>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

impl Selection {
    /// Only `All` selects everything; an empty `Only` selects nothing
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn contains(&self, item: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(items) => items.iter().any(|i| i == item),
        }
    }

    /// Config wire form: `All`, or a comma-joined list (empty when nothing is selected)
    pub fn to_config_value(&self) -> String {
        match self {
            Selection::All => "All".to_string(),
            Selection::Only(items) => items.join(","),
        }
    }

    pub fn from_config_value(value: &str) -> Self {
        match value {
            "All" => Selection::All,
            "" => Selection::Only(Vec::new()),
            _ => Selection::Only(value.split(',').map(|s| s.trim().to_string()).collect()),
        }
    }

    /// Toggle one item. `All` expands to the universe first; covering the
    /// whole universe again collapses back to `All`.
    pub fn toggle(&self, item: &str, universe: &[String]) -> Self {
        let mut items: Vec<String> = match self {
            Selection::All => universe.to_vec(),
            Selection::Only(items) => items.clone(),
        };
        if let Some(pos) = items.iter().position(|i| i == item) {
            items.remove(pos);
        } else {
            items.push(item.to_string());
        }
        if !universe.is_empty()
            && items.len() == universe.len()
            && universe.iter().all(|u| items.contains(u))
        {
            Selection::All
        } else {
            Selection::Only(items)
        }
    }
}

/// Line interpolation of the swim-lane areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Basis,
    Linear,
    Step,
    Monotone,
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Basis
    }
}

impl Interpolation {
    pub const ALL: [Interpolation; 4] = [
        Interpolation::Basis,
        Interpolation::Linear,
        Interpolation::Step,
        Interpolation::Monotone,
    ];
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interpolation::Basis => "basis",
            Interpolation::Linear => "linear",
            Interpolation::Step => "step",
            Interpolation::Monotone => "monotone",
        };
        f.write_str(name)
    }
}

/// Summary of the parsed profiling dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub rows: usize,
    pub time_domain: [f64; 2],
    /// Range of memory-address buckets
    pub memory_domain: [f64; 2],
    pub query_plan: Option<QueryPlan>,
}

/// Available dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardKind {
    Overview,
    MultipleEvents,
    MemoryAccess,
    Uir,
}

impl DashboardKind {
    pub const ALL: [DashboardKind; 4] = [
        DashboardKind::Overview,
        DashboardKind::MultipleEvents,
        DashboardKind::MemoryAccess,
        DashboardKind::Uir,
    ];

    /// Charts mounted by this dashboard, in layout order
    pub fn charts(&self) -> &'static [ChartType] {
        match self {
            DashboardKind::Overview => &[ChartType::BarChart, ChartType::SwimLanes],
            DashboardKind::MultipleEvents => &[
                ChartType::ActivityHistogram,
                ChartType::Sunburst,
                ChartType::QueryPlan,
                ChartType::SwimLanesAbsolute,
            ],
            DashboardKind::MemoryAccess => &[ChartType::MemoryAccessHeatmap],
            DashboardKind::Uir => &[ChartType::UirViewer],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DashboardKind::Overview => "Overview",
            DashboardKind::MultipleEvents => "Multiple Events",
            DashboardKind::MemoryAccess => "Memory Access",
            DashboardKind::Uir => "UIR Profiling",
        }
    }
}

/// Layout state of the mounted dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub kind: DashboardKind,
    pub chart_ids: Vec<ChartId>,
}

/// Main application state container
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    // Upload / parse lifecycle
    pub file_name: Option<String>,
    pub file: Option<PathBuf>,
    pub file_loading: bool,
    pub csv_parsing_finished: bool,
    pub result: Option<ProfileSummary>,
    /// Loading flag per chart id
    pub result_loading: BTreeMap<ChartId, bool>,
    pub chunks_number: usize,

    // Selection context
    pub current_chart: Option<ChartType>,
    pub current_event: String,
    pub current_pipeline: Selection,
    pub current_operator: Selection,
    pub current_request: Option<ChartRequest>,

    // Universes of selectable values, populated once data is available
    pub events: Option<Vec<String>>,
    pub pipelines: Option<Vec<String>>,
    pub operators: Option<Vec<String>>,

    // Chart registry and data slots
    pub chart_id_counter: ChartId,
    pub chart_registry: BTreeMap<ChartId, ChartType>,
    pub chart_data: ChartDataKeyValue,
    pub chart_errors: BTreeMap<ChartId, String>,
    /// Newest request sequence issued per chart id
    pub request_sequence: BTreeMap<ChartId, u64>,

    // Multi-chart dashboards
    pub multiple_chart_data_length: i32,
    pub dashboard_state: Option<DashboardState>,

    // Widget settings that double as fetch parameters
    pub current_interpolation: Interpolation,
    pub current_bucket_size: f64,
    pub current_time_bucket_selection_tuple: [f64; 2],

    // Memory heatmaps
    pub current_memory_address_selection_tuple: [f64; 2],
    pub memory_heatmaps_difference_representation: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            file_name: None,
            file: None,
            file_loading: false,
            csv_parsing_finished: false,
            result: None,
            result_loading: BTreeMap::new(),
            chunks_number: 0,

            current_chart: None,
            current_event: String::new(),
            current_pipeline: Selection::All,
            current_operator: Selection::All,
            current_request: None,

            events: None,
            pipelines: None,
            operators: None,

            chart_id_counter: 0,
            chart_registry: BTreeMap::new(),
            chart_data: BTreeMap::new(),
            chart_errors: BTreeMap::new(),
            request_sequence: BTreeMap::new(),

            multiple_chart_data_length: UNSET_MULTIPLE_CHART_DATA_LENGTH,
            dashboard_state: None,

            current_interpolation: Interpolation::default(),
            current_bucket_size: DEFAULT_BUCKET_SIZE,
            current_time_bucket_selection_tuple: UNSET_SELECTION,

            current_memory_address_selection_tuple: UNSET_SELECTION,
            memory_heatmaps_difference_representation: false,
        }
    }
}

impl AppState {
    /// Loading flag of one chart; charts that never fetched are not loading
    pub fn is_loading(&self, chart_id: ChartId) -> bool {
        self.result_loading.get(&chart_id).copied().unwrap_or(false)
    }

    pub fn chart_slot(&self, chart_id: ChartId) -> Option<&ChartDataObject> {
        self.chart_data.get(&chart_id)
    }

    pub fn chart_type_of(&self, chart_id: ChartId) -> Option<ChartType> {
        self.chart_registry.get(&chart_id).copied()
    }

    /// Check if a profile has been parsed
    pub fn has_data(&self) -> bool {
        self.csv_parsing_finished && self.result.is_some()
    }
}
