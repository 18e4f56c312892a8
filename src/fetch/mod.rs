//! Fetch collaborator: computes chart payloads away from the UI thread
//!
//! The UI fires requests and later polls [`FetchEvent`]s; nothing here ever
//! touches the store. [`apply_event`] is the one place events become mutations.

mod worker;

pub use worker::BackgroundFetcher;

use crate::charts::ChartRequest;
use crate::state::{
    ChartDataVariant, ChartId, ChartType, FetchOutcome, ProfileSummary, StateMutation, Store,
};
use std::path::PathBuf;

/// Answer to one [`ChartRequest`], routed back by chart id and sequence
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataResponse {
    pub chart_id: ChartId,
    pub chart_type: ChartType,
    pub sequence: u64,
    pub result: Result<ChartDataVariant, String>,
}

impl ChartDataResponse {
    pub fn ok(request: &ChartRequest, data: ChartDataVariant) -> Self {
        Self {
            chart_id: request.chart_id,
            chart_type: request.chart_type,
            sequence: request.sequence,
            result: Ok(data),
        }
    }

    pub fn failed(request: &ChartRequest, message: impl Into<String>) -> Self {
        Self {
            chart_id: request.chart_id,
            chart_type: request.chart_type,
            sequence: request.sequence,
            result: Err(message.into()),
        }
    }
}

/// Results produced by a fetcher
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// Profile parsed; universes are sorted and deduplicated
    ProfileLoaded {
        summary: ProfileSummary,
        events: Vec<String>,
        operators: Vec<String>,
        pipelines: Vec<String>,
    },
    /// Progress while collecting universes
    ChunkParsed { chunks: usize },
    ChartData(ChartDataResponse),
    /// Profile could not be loaded
    Error { message: String },
}

/// Backend computing chart payloads. Requests are fire-and-forget.
pub trait ChartDataFetcher {
    fn load_profile(&self, path: PathBuf);

    fn request_chart_data(&self, request: ChartRequest);

    /// Next finished result, if any (non-blocking)
    fn poll(&self) -> Option<FetchEvent>;
}

/// Turn one fetch event into store mutations
pub fn apply_event(store: &mut Store, event: FetchEvent) -> Option<FetchOutcome> {
    match event {
        FetchEvent::ProfileLoaded {
            summary,
            events,
            operators,
            pipelines,
        } => {
            log::info!(
                "profile loaded: {} rows, {} events, {} operators",
                summary.rows,
                events.len(),
                operators.len()
            );
            let first_event = events.first().cloned();

            store.dispatch(StateMutation::SetResult(Some(summary)));
            store.dispatch(StateMutation::SetPipelines(pipelines));
            store.dispatch(StateMutation::SetOperators(operators));
            store.dispatch(StateMutation::SetEvents(events));
            if store.state().current_event.is_empty() {
                if let Some(event) = first_event {
                    store.dispatch(StateMutation::SetCurrentEvent(event));
                }
            }
            store.dispatch(StateMutation::SetCsvParsingFinished(true));
            store.dispatch(StateMutation::SetFileLoading(false));
            None
        }
        FetchEvent::ChunkParsed { chunks } => {
            store.dispatch(StateMutation::SetChunksNumber(chunks));
            None
        }
        FetchEvent::ChartData(response) => Some(store.complete_fetch(response)),
        FetchEvent::Error { message } => {
            log::error!("profile load failed: {}", message);
            store.dispatch(StateMutation::SetFileLoading(false));
            None
        }
    }
}

/// Fetcher that records requests and replays queued events
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingFetcher {
    pub requests: std::cell::RefCell<Vec<ChartRequest>>,
    pub loads: std::cell::RefCell<Vec<PathBuf>>,
    pub events: std::cell::RefCell<std::collections::VecDeque<FetchEvent>>,
}

#[cfg(test)]
impl RecordingFetcher {
    pub fn take(&self) -> Vec<ChartRequest> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }

    pub fn push_event(&self, event: FetchEvent) {
        self.events.borrow_mut().push_back(event);
    }
}

#[cfg(test)]
impl ChartDataFetcher for RecordingFetcher {
    fn load_profile(&self, path: PathBuf) {
        self.loads.borrow_mut().push(path);
    }

    fn request_chart_data(&self, request: ChartRequest) {
        self.requests.borrow_mut().push(request);
    }

    fn poll(&self) -> Option<FetchEvent> {
        self.events.borrow_mut().pop_front()
    }
}
