//! Explicit application store: dispatch, subscriptions, chart registry and
//! request sequencing

use super::{reduce, AppState, ChartDataObject, ChartId, ChartType, KeyValue, StateMutation};
use crate::charts::ChartRequest;
use crate::error::{DashboardError, Result};
use crate::fetch::ChartDataResponse;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type SubscriptionId = u64;

/// A `(prev, next)` snapshot pair recorded for one subscriber
#[derive(Debug, Clone)]
pub struct Transition {
    pub prev: Arc<AppState>,
    pub next: Arc<AppState>,
    /// Wire tag of the mutation that produced `next`
    pub mutation: &'static str,
}

/// What happened to a response handed to [`Store::complete_fetch`]
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied,
    /// Superseded by a newer request for the same chart; state untouched
    Stale,
    Failed(String),
}

/// Owner of the current `AppState` snapshot
pub struct Store {
    state: Arc<AppState>,
    subscribers: BTreeMap<SubscriptionId, Vec<Transition>>,
    next_subscription: SubscriptionId,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            subscribers: BTreeMap::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shared handle to the current snapshot
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Apply one mutation and record the transition for every subscriber
    pub fn dispatch(&mut self, mutation: StateMutation) {
        let name = mutation.name();
        log::trace!("dispatch {}", name);

        let next = Arc::new(reduce(&self.state, mutation));
        for queue in self.subscribers.values_mut() {
            queue.push(Transition {
                prev: Arc::clone(&self.state),
                next: Arc::clone(&next),
                mutation: name,
            });
        }
        self.state = next;
    }

    /// Dispatch a mutation in its `{type, data}` JSON form
    pub fn dispatch_json(&mut self, json: &str) -> Result<()> {
        let mutation = StateMutation::from_json(json)?;
        self.dispatch(mutation);
        Ok(())
    }

    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.insert(id, Vec::new());
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.remove(&id);
    }

    /// Drain the transitions recorded for `id` since its last call
    pub fn take_transitions(&mut self, id: SubscriptionId) -> Vec<Transition> {
        self.subscribers
            .get_mut(&id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Allocate the next chart id and register its chart type.
    /// Reading and bumping the counter happen in this one call.
    pub fn claim_chart_id(&mut self, chart_type: ChartType) -> ChartId {
        let id = self.state.chart_id_counter;
        self.dispatch(StateMutation::SetChartIdCounter(id + 1));
        self.dispatch(StateMutation::RegisterChart(KeyValue::new(id, chart_type)));
        log::debug!("chart {} claimed by {}", id, chart_type);
        id
    }

    /// Stamp `request` with the next sequence of its chart and mark it loading
    pub fn begin_fetch(&mut self, mut request: ChartRequest) -> Result<ChartRequest> {
        let id = request.chart_id;
        let registered = self
            .state
            .chart_type_of(id)
            .ok_or(DashboardError::UnknownChart(id))?;
        if registered != request.chart_type {
            return Err(DashboardError::ChartTypeMismatch {
                chart_id: id,
                expected: registered.to_string(),
                actual: request.chart_type.to_string(),
            });
        }
        request.config.validate(request.chart_type)?;

        request.sequence = self.state.request_sequence.get(&id).copied().unwrap_or(0) + 1;

        self.dispatch(StateMutation::SetRequestSequence(KeyValue::new(
            id,
            request.sequence,
        )));
        self.dispatch(StateMutation::SetResultLoading(KeyValue::new(id, true)));
        self.dispatch(StateMutation::SetCurrentRequest(Some(request.clone())));

        log::debug!(
            "chart {} request #{} ({})",
            id,
            request.sequence,
            request.chart_type
        );
        Ok(request)
    }

    /// Route a response back to its chart slot
    pub fn complete_fetch(&mut self, response: ChartDataResponse) -> FetchOutcome {
        let id = response.chart_id;
        let newest = self.state.request_sequence.get(&id).copied();
        if newest != Some(response.sequence) {
            log::debug!(
                "dropping stale response #{} for chart {} (newest {:?})",
                response.sequence,
                id,
                newest
            );
            return FetchOutcome::Stale;
        }

        let data = match response.result {
            Ok(data) => data,
            Err(message) => return self.fail(id, message),
        };

        if let Some(registered) = self.state.chart_type_of(id) {
            if registered != data.chart_type() {
                let err = DashboardError::MalformedPayload(format!(
                    "chart {} expects {} data, got {}",
                    id,
                    registered,
                    data.chart_type()
                ));
                return self.fail(id, err.to_string());
            }
        }

        let mut slots = self.state.chart_data.clone();
        slots.insert(id, ChartDataObject::new(id, response.sequence, data));

        self.dispatch(StateMutation::SetChartData(slots));
        self.dispatch(StateMutation::SetChartError(KeyValue::new(id, None)));
        self.dispatch(StateMutation::SetResultLoading(KeyValue::new(id, false)));
        FetchOutcome::Applied
    }

    fn fail(&mut self, chart_id: ChartId, message: String) -> FetchOutcome {
        log::warn!("chart {} could not load: {}", chart_id, message);
        self.dispatch(StateMutation::SetChartError(KeyValue::new(
            chart_id,
            Some(message.clone()),
        )));
        self.dispatch(StateMutation::SetResultLoading(KeyValue::new(chart_id, false)));
        FetchOutcome::Failed(message)
    }
}
