//! Per-chart render and refetch decisions

use super::{dependencies_of, ChartDependencies, ChartRequest, RequestConfig};
use crate::error::Result;
use crate::state::{AppState, ChartDataObject, ChartId, ChartType};

/// What a chart does in response to one state transition
#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub render: bool,
    pub fetch: Option<ChartRequest>,
}

/// What a chart can show for a given state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartStatus<'a> {
    /// Prerequisites absent, request in flight, or no data yet
    Loading,
    /// Last request failed
    Failed(&'a str),
    Ready(&'a ChartDataObject),
}

/// Readiness logic of one mounted chart, driven by its declared dependencies
#[derive(Debug, Clone)]
pub struct ReadinessCoordinator {
    chart_id: ChartId,
    chart_type: ChartType,
    deps: &'static ChartDependencies,
}

impl ReadinessCoordinator {
    pub fn new(chart_id: ChartId, chart_type: ChartType) -> Self {
        Self {
            chart_id,
            chart_type,
            deps: dependencies_of(chart_type),
        }
    }

    pub fn chart_id(&self) -> ChartId {
        self.chart_id
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn dependencies(&self) -> &'static ChartDependencies {
        self.deps
    }

    pub fn prerequisites_met(&self, state: &AppState) -> bool {
        self.deps.prerequisites.iter().all(|p| p.present(state))
    }

    /// Whether anything this chart reads differs between the two snapshots.
    /// Entries of other chart ids are never consulted.
    pub fn should_render(&self, prev: &AppState, next: &AppState) -> bool {
        let id = self.chart_id;

        prev.result_loading.get(&id) != next.result_loading.get(&id)
            || prev.chart_errors.get(&id) != next.chart_errors.get(&id)
            || !ChartDataObject::same_payload(prev.chart_slot(id), next.chart_slot(id))
            || self.deps.watched().any(|d| d.changed(prev, next))
            || self.deps.prerequisites.iter().any(|p| p.changed(prev, next))
    }

    /// Whether the displayed data is stale: prerequisites present and some
    /// fetch parameter or prerequisite universe changed
    pub fn needs_fetch(&self, prev: &AppState, next: &AppState) -> bool {
        if !self.prerequisites_met(next) {
            return false;
        }

        self.deps.fetch_params.iter().any(|d| d.changed(prev, next))
            || self.deps.prerequisites.iter().any(|p| p.changed(prev, next))
    }

    /// Request to issue for this transition, if any
    pub fn fetch_request(&self, prev: &AppState, next: &AppState) -> Result<Option<ChartRequest>> {
        if !self.needs_fetch(prev, next) {
            return Ok(None);
        }
        self.build_request(next).map(Some)
    }

    /// Request to issue right after mount, when the data is already there
    pub fn initial_request(&self, state: &AppState) -> Result<Option<ChartRequest>> {
        if !self.prerequisites_met(state) {
            return Ok(None);
        }
        self.build_request(state).map(Some)
    }

    pub fn build_request(&self, state: &AppState) -> Result<ChartRequest> {
        let config = RequestConfig::for_chart(self.chart_type, state)?;
        ChartRequest::new(self.chart_id, self.chart_type, config)
    }

    /// Render decision first, then refetch decision
    pub fn evaluate(&self, prev: &AppState, next: &AppState) -> Result<Readiness> {
        Ok(Readiness {
            render: self.should_render(prev, next),
            fetch: self.fetch_request(prev, next)?,
        })
    }

    pub fn status<'a>(&self, state: &'a AppState) -> ChartStatus<'a> {
        if !self.prerequisites_met(state) || state.is_loading(self.chart_id) {
            return ChartStatus::Loading;
        }
        if let Some(message) = state.chart_errors.get(&self.chart_id) {
            return ChartStatus::Failed(message);
        }
        match state.chart_slot(self.chart_id) {
            Some(slot) => ChartStatus::Ready(slot),
            None => ChartStatus::Loading,
        }
    }
}
