//! Typed state mutations and the reducer applying them

use super::{
    AppState, ChartDataKeyValue, ChartId, ChartType, DashboardState, Interpolation,
    ProfileSummary, Selection,
};
use crate::charts::ChartRequest;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Payload of keyed mutations: one map entry to overwrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue<T> {
    pub key: ChartId,
    pub value: T,
}

impl<T> KeyValue<T> {
    pub fn new(key: ChartId, value: T) -> Self {
        Self { key, value }
    }
}

/// One atomic state change. This enum is the entire write API of `AppState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StateMutation {
    #[serde(rename = "SET_FILENAME")]
    SetFileName(String),
    #[serde(rename = "SET_FILE")]
    SetFile(Option<PathBuf>),
    #[serde(rename = "SET_FILELOADING")]
    SetFileLoading(bool),
    #[serde(rename = "SET_RESULTLOADING")]
    SetResultLoading(KeyValue<bool>),
    #[serde(rename = "SET_RESULT")]
    SetResult(Option<ProfileSummary>),
    #[serde(rename = "SET_CHUNKSNUMBER")]
    SetChunksNumber(usize),
    #[serde(rename = "SET_CSVPARSINGFINISHED")]
    SetCsvParsingFinished(bool),
    #[serde(rename = "RESET_STATE")]
    ResetState,
    #[serde(rename = "SET_CURRENTCHART")]
    SetCurrentChart(Option<ChartType>),
    #[serde(rename = "SET_CURRENTEVENT")]
    SetCurrentEvent(String),
    #[serde(rename = "SET_CURRENTPIPELINE")]
    SetCurrentPipeline(Selection),
    #[serde(rename = "SET_CURRENTOPERATOR")]
    SetCurrentOperator(Selection),
    #[serde(rename = "SET_CURRENTREQUEST")]
    SetCurrentRequest(Option<ChartRequest>),
    #[serde(rename = "SET_EVENTS")]
    SetEvents(Vec<String>),
    #[serde(rename = "SET_PIPELINES")]
    SetPipelines(Vec<String>),
    #[serde(rename = "SET_OPERATORS")]
    SetOperators(Vec<String>),
    #[serde(rename = "SET_CHARTIDCOUNTER")]
    SetChartIdCounter(ChartId),
    #[serde(rename = "REGISTER_CHART")]
    RegisterChart(KeyValue<ChartType>),
    #[serde(rename = "SET_CHARTDATA")]
    SetChartData(ChartDataKeyValue),
    #[serde(rename = "SET_CHARTERROR")]
    SetChartError(KeyValue<Option<String>>),
    #[serde(rename = "SET_REQUESTSEQUENCE")]
    SetRequestSequence(KeyValue<u64>),
    #[serde(rename = "SET_MULTIPLECHARTDATALENGTH")]
    SetMultipleChartDataLength(i32),
    #[serde(rename = "SET_DASHBOARDSTATE")]
    SetDashboardState(Option<DashboardState>),
    #[serde(rename = "SET_CURRENTINTERPOLATION")]
    SetCurrentInterpolation(Interpolation),
    #[serde(rename = "SET_CURRENTBUCKETSIZE")]
    SetCurrentBucketSize(f64),
    #[serde(rename = "SET_CURRENTTIMEBUCKETSELECTIONTUPLE")]
    SetCurrentTimeBucketSelectionTuple([f64; 2]),
    #[serde(rename = "SET_CURRENTMEMORYADDRESSSELECTIONTUPLE")]
    SetCurrentMemoryAddressSelectionTuple([f64; 2]),
    #[serde(rename = "SET_MEMORYHEATMAPSDIFFERENCEREPRESENTATION")]
    SetMemoryHeatmapsDifferenceRepresentation(bool),
}

impl StateMutation {
    /// Parse a `{type, data}` record. Unknown types and malformed data are
    /// programming errors and are reported, never skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| DashboardError::InvalidMutation(e.to_string()))?;

        // RESET_STATE ignores whatever data it carries
        if value.get("type").and_then(|t| t.as_str()) == Some("RESET_STATE") {
            return Ok(StateMutation::ResetState);
        }

        serde_json::from_value(value).map_err(|e| DashboardError::InvalidMutation(e.to_string()))
    }

    /// Wire tag of the mutation
    pub fn name(&self) -> &'static str {
        match self {
            StateMutation::SetFileName(_) => "SET_FILENAME",
            StateMutation::SetFile(_) => "SET_FILE",
            StateMutation::SetFileLoading(_) => "SET_FILELOADING",
            StateMutation::SetResultLoading(_) => "SET_RESULTLOADING",
            StateMutation::SetResult(_) => "SET_RESULT",
            StateMutation::SetChunksNumber(_) => "SET_CHUNKSNUMBER",
            StateMutation::SetCsvParsingFinished(_) => "SET_CSVPARSINGFINISHED",
            StateMutation::ResetState => "RESET_STATE",
            StateMutation::SetCurrentChart(_) => "SET_CURRENTCHART",
            StateMutation::SetCurrentEvent(_) => "SET_CURRENTEVENT",
            StateMutation::SetCurrentPipeline(_) => "SET_CURRENTPIPELINE",
            StateMutation::SetCurrentOperator(_) => "SET_CURRENTOPERATOR",
            StateMutation::SetCurrentRequest(_) => "SET_CURRENTREQUEST",
            StateMutation::SetEvents(_) => "SET_EVENTS",
            StateMutation::SetPipelines(_) => "SET_PIPELINES",
            StateMutation::SetOperators(_) => "SET_OPERATORS",
            StateMutation::SetChartIdCounter(_) => "SET_CHARTIDCOUNTER",
            StateMutation::RegisterChart(_) => "REGISTER_CHART",
            StateMutation::SetChartData(_) => "SET_CHARTDATA",
            StateMutation::SetChartError(_) => "SET_CHARTERROR",
            StateMutation::SetRequestSequence(_) => "SET_REQUESTSEQUENCE",
            StateMutation::SetMultipleChartDataLength(_) => "SET_MULTIPLECHARTDATALENGTH",
            StateMutation::SetDashboardState(_) => "SET_DASHBOARDSTATE",
            StateMutation::SetCurrentInterpolation(_) => "SET_CURRENTINTERPOLATION",
            StateMutation::SetCurrentBucketSize(_) => "SET_CURRENTBUCKETSIZE",
            StateMutation::SetCurrentTimeBucketSelectionTuple(_) => {
                "SET_CURRENTTIMEBUCKETSELECTIONTUPLE"
            }
            StateMutation::SetCurrentMemoryAddressSelectionTuple(_) => {
                "SET_CURRENTMEMORYADDRESSSELECTIONTUPLE"
            }
            StateMutation::SetMemoryHeatmapsDifferenceRepresentation(_) => {
                "SET_MEMORYHEATMAPSDIFFERENCEREPRESENTATION"
            }
        }
    }
}

/// Apply one mutation. Pure: `state` is left untouched and a new value is returned.
pub fn reduce(state: &AppState, mutation: StateMutation) -> AppState {
    let mut next = state.clone();
    match mutation {
        StateMutation::SetFileName(name) => next.file_name = Some(name),
        StateMutation::SetFile(file) => next.file = file,
        StateMutation::SetFileLoading(loading) => next.file_loading = loading,
        StateMutation::SetResultLoading(KeyValue { key, value }) => {
            next.result_loading.insert(key, value);
        }
        StateMutation::SetResult(result) => next.result = result,
        StateMutation::SetChunksNumber(n) => next.chunks_number = n,
        StateMutation::SetCsvParsingFinished(done) => next.csv_parsing_finished = done,
        StateMutation::ResetState => next = AppState::default(),
        StateMutation::SetCurrentChart(chart) => next.current_chart = chart,
        StateMutation::SetCurrentEvent(event) => next.current_event = event,
        StateMutation::SetCurrentPipeline(selection) => next.current_pipeline = selection,
        StateMutation::SetCurrentOperator(selection) => next.current_operator = selection,
        StateMutation::SetCurrentRequest(request) => next.current_request = request,
        StateMutation::SetEvents(events) => next.events = Some(events),
        StateMutation::SetPipelines(pipelines) => next.pipelines = Some(pipelines),
        StateMutation::SetOperators(operators) => next.operators = Some(operators),
        StateMutation::SetChartIdCounter(counter) => next.chart_id_counter = counter,
        StateMutation::RegisterChart(KeyValue { key, value }) => {
            next.chart_registry.insert(key, value);
        }
        StateMutation::SetChartData(data) => next.chart_data = data,
        StateMutation::SetChartError(KeyValue { key, value }) => match value {
            Some(message) => {
                next.chart_errors.insert(key, message);
            }
            None => {
                next.chart_errors.remove(&key);
            }
        },
        StateMutation::SetRequestSequence(KeyValue { key, value }) => {
            next.request_sequence.insert(key, value);
        }
        StateMutation::SetMultipleChartDataLength(len) => next.multiple_chart_data_length = len,
        StateMutation::SetDashboardState(dashboard) => next.dashboard_state = dashboard,
        StateMutation::SetCurrentInterpolation(interpolation) => {
            next.current_interpolation = interpolation
        }
        StateMutation::SetCurrentBucketSize(size) => next.current_bucket_size = size,
        StateMutation::SetCurrentTimeBucketSelectionTuple(tuple) => {
            next.current_time_bucket_selection_tuple = tuple
        }
        StateMutation::SetCurrentMemoryAddressSelectionTuple(tuple) => {
            next.current_memory_address_selection_tuple = tuple
        }
        StateMutation::SetMemoryHeatmapsDifferenceRepresentation(enabled) => {
            next.memory_heatmaps_difference_representation = enabled
        }
    }
    next
}
