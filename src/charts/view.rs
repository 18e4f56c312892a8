//! A mounted chart: coordinator + store subscription + cached model

use super::{adapt, AdapterOptions, ChartModel, ChartStatus, ReadinessCoordinator};
use crate::error::Result;
use crate::fetch::ChartDataFetcher;
use crate::state::{AppState, ChartId, ChartType, StateMutation, Store, SubscriptionId};

/// What one [`ChartView::sync`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub rendered: bool,
    /// Sequence of the request issued, if any
    pub fetched: Option<u64>,
}

pub struct ChartView {
    coordinator: ReadinessCoordinator,
    subscription: SubscriptionId,
    model: Option<ChartModel>,
    dirty: bool,
}

impl ChartView {
    /// Claim an id, mark the chart type as the current one, subscribe to the
    /// store and fetch right away if the profile is already loaded
    pub fn mount(
        store: &mut Store,
        chart_type: ChartType,
        fetcher: &dyn ChartDataFetcher,
    ) -> Result<Self> {
        let chart_id = store.claim_chart_id(chart_type);
        store.dispatch(StateMutation::SetCurrentChart(Some(chart_type)));
        let subscription = store.subscribe();
        let coordinator = ReadinessCoordinator::new(chart_id, chart_type);

        if let Some(request) = coordinator.initial_request(store.state())? {
            let request = store.begin_fetch(request)?;
            fetcher.request_chart_data(request);
        }
        // Mount-time mutations are already reflected in the first render
        store.take_transitions(subscription);

        Ok(Self {
            coordinator,
            subscription,
            model: None,
            dirty: true,
        })
    }

    pub fn chart_id(&self) -> ChartId {
        self.coordinator.chart_id()
    }

    pub fn chart_type(&self) -> ChartType {
        self.coordinator.chart_type()
    }

    pub fn coordinator(&self) -> &ReadinessCoordinator {
        &self.coordinator
    }

    /// Consume pending transitions. Several parameter changes between two
    /// syncs produce a single request built from the newest state.
    pub fn sync(
        &mut self,
        store: &mut Store,
        fetcher: &dyn ChartDataFetcher,
    ) -> Result<SyncReport> {
        let transitions = store.take_transitions(self.subscription);
        if transitions.is_empty() {
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        let mut stale = false;
        for t in &transitions {
            report.rendered |= self.coordinator.should_render(&t.prev, &t.next);
            stale |= self.coordinator.needs_fetch(&t.prev, &t.next);
        }

        // Recorded before the fetch so a failed request still re-renders
        self.dirty |= report.rendered;

        if stale && self.coordinator.prerequisites_met(store.state()) {
            let request = self.coordinator.build_request(store.state())?;
            let request = store.begin_fetch(request)?;
            report.fetched = Some(request.sequence);
            fetcher.request_chart_data(request);

            // Own loading flag flipped
            store.take_transitions(self.subscription);
            report.rendered = true;
            self.dirty = true;
        }

        Ok(report)
    }

    pub fn status<'a>(&self, state: &'a AppState) -> ChartStatus<'a> {
        self.coordinator.status(state)
    }

    /// Render model of the current payload; rebuilt only after a sync asked
    /// for a render
    pub fn model(&mut self, state: &AppState) -> Option<&ChartModel> {
        let ChartStatus::Ready(slot) = self.coordinator.status(state) else {
            return None;
        };
        if self.dirty || self.model.is_none() {
            self.model = Some(adapt(&slot.chart_data, &AdapterOptions::from_state(state)));
            self.dirty = false;
        }
        self.model.as_ref()
    }

    /// Stop observing the store. The registry entry and data slot stay.
    pub fn unmount(self, store: &mut Store) {
        store.unsubscribe(self.subscription);
        log::debug!("chart {} unmounted", self.chart_id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{ChartDataResponse, RecordingFetcher};
    use crate::state::{BarChartData, ChartDataVariant, FetchOutcome, Interpolation, SwimLanesData};

    fn bar_data() -> ChartDataVariant {
        ChartDataVariant::BarChart(BarChartData {
            operators: vec!["scan".to_string(), "join".to_string()],
            frequency: vec![3.0, 1.0],
        })
    }

    #[test]
    fn test_mount_to_render_scenario() {
        let mut store = Store::new();
        let fetcher = RecordingFetcher::default();

        let mut view = ChartView::mount(&mut store, ChartType::BarChart, &fetcher).unwrap();
        assert_eq!(view.chart_id(), 0);
        assert_eq!(store.state().chart_id_counter, 1);
        assert_eq!(store.state().current_chart, Some(ChartType::BarChart));
        assert!(fetcher.take().is_empty(), "no events yet, nothing to fetch");
        assert_eq!(view.status(store.state()), ChartStatus::Loading);

        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string(), "L2".to_string()]));
        let report = view.sync(&mut store, &fetcher).unwrap();
        assert_eq!(report.fetched, Some(1));

        let requests = fetcher.take();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].chart_id, 0);
        assert!(store.state().is_loading(0));

        let outcome = store.complete_fetch(ChartDataResponse::ok(&requests[0], bar_data()));
        assert_eq!(outcome, FetchOutcome::Applied);
        assert!(!store.state().is_loading(0));

        let report = view.sync(&mut store, &fetcher).unwrap();
        assert!(report.rendered);
        assert_eq!(report.fetched, None);

        match view.model(store.state()) {
            Some(ChartModel::Bar(model)) => assert_eq!(model.bars[1], ("scan".to_string(), 3.0)),
            other => panic!("expected bar model, got {:?}", other),
        }
    }

    #[test]
    fn test_mount_with_loaded_profile_fetches_immediately() {
        let mut store = Store::new();
        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string()]));
        let fetcher = RecordingFetcher::default();

        let mut view = ChartView::mount(&mut store, ChartType::UirViewer, &fetcher).unwrap();
        assert_eq!(fetcher.take().len(), 1);

        let report = view.sync(&mut store, &fetcher).unwrap();
        assert_eq!(report, SyncReport::default());
    }

    #[test]
    fn test_changes_between_syncs_coalesce() {
        let mut store = Store::new();
        let fetcher = RecordingFetcher::default();
        let mut view = ChartView::mount(&mut store, ChartType::SwimLanes, &fetcher).unwrap();

        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string()]));
        store.dispatch(StateMutation::SetOperators(vec!["scan".to_string()]));
        store.dispatch(StateMutation::SetCurrentBucketSize(0.2));
        store.dispatch(StateMutation::SetCurrentBucketSize(0.5));

        let report = view.sync(&mut store, &fetcher).unwrap();
        assert_eq!(report.fetched, Some(1));

        let requests = fetcher.take();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].config.bucket_size().unwrap(), 0.5);
    }

    #[test]
    fn test_render_only_change_rebuilds_model_without_fetch() {
        let mut store = Store::new();
        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string()]));
        store.dispatch(StateMutation::SetOperators(vec!["scan".to_string()]));
        let fetcher = RecordingFetcher::default();
        let mut view = ChartView::mount(&mut store, ChartType::SwimLanes, &fetcher).unwrap();

        let request = fetcher.take().remove(0);
        let data = ChartDataVariant::SwimLanes(SwimLanesData {
            buckets: vec![0.0],
            operators: vec!["scan".to_string()],
            relative_frequencies: vec![1.0],
        });
        store.complete_fetch(ChartDataResponse::ok(&request, data));
        view.sync(&mut store, &fetcher).unwrap();
        assert!(view.model(store.state()).is_some());

        store.dispatch(StateMutation::SetCurrentInterpolation(Interpolation::Step));
        let report = view.sync(&mut store, &fetcher).unwrap();
        assert!(report.rendered);
        assert_eq!(report.fetched, None);

        match view.model(store.state()) {
            Some(ChartModel::SwimLanes(model)) => {
                assert_eq!(model.interpolation, Interpolation::Step)
            }
            other => panic!("expected swim lanes, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_refetch_keeps_pending_render() {
        let mut store = Store::new();
        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string()]));
        store.dispatch(StateMutation::SetOperators(vec!["scan".to_string()]));
        let fetcher = RecordingFetcher::default();
        let mut view = ChartView::mount(&mut store, ChartType::SwimLanes, &fetcher).unwrap();

        let request = fetcher.take().remove(0);
        let data = ChartDataVariant::SwimLanes(SwimLanesData {
            buckets: vec![0.0],
            operators: vec!["scan".to_string()],
            relative_frequencies: vec![1.0],
        });
        store.complete_fetch(ChartDataResponse::ok(&request, data));
        view.sync(&mut store, &fetcher).unwrap();
        assert!(view.model(store.state()).is_some());

        // The render-only change lands in the same batch as an unbuildable request
        store.dispatch(StateMutation::SetCurrentInterpolation(Interpolation::Step));
        store.dispatch(StateMutation::SetCurrentBucketSize(f64::NAN));
        assert!(view.sync(&mut store, &fetcher).is_err());
        assert!(fetcher.take().is_empty());

        match view.model(store.state()) {
            Some(ChartModel::SwimLanes(model)) => {
                assert_eq!(model.interpolation, Interpolation::Step)
            }
            other => panic!("expected swim lanes, got {:?}", other),
        }
    }

    #[test]
    fn test_mount_marks_current_chart() {
        let mut store = Store::new();
        let fetcher = RecordingFetcher::default();
        ChartView::mount(&mut store, ChartType::UirViewer, &fetcher).unwrap();
        ChartView::mount(&mut store, ChartType::QueryPlan, &fetcher).unwrap();

        assert_eq!(store.state().current_chart, Some(ChartType::QueryPlan));
    }

    #[test]
    fn test_unrelated_chart_does_not_disturb() {
        let mut store = Store::new();
        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string()]));
        let fetcher = RecordingFetcher::default();

        let mut first = ChartView::mount(&mut store, ChartType::BarChart, &fetcher).unwrap();
        let _second = ChartView::mount(&mut store, ChartType::UirViewer, &fetcher).unwrap();
        let requests = fetcher.take();
        assert_eq!(requests.len(), 2);

        // Only the second chart's slot and loading flag change
        store.complete_fetch(ChartDataResponse::failed(&requests[1], "boom"));
        let report = first.sync(&mut store, &fetcher).unwrap();
        assert!(!report.rendered);
        assert_eq!(report.fetched, None);
    }

    #[test]
    fn test_unmount_keeps_registry_entry() {
        let mut store = Store::new();
        let fetcher = RecordingFetcher::default();
        let view = ChartView::mount(&mut store, ChartType::BarChart, &fetcher).unwrap();
        let id = view.chart_id();

        view.unmount(&mut store);
        store.dispatch(StateMutation::SetEvents(vec!["L1".to_string()]));
        assert_eq!(store.state().chart_type_of(id), Some(ChartType::BarChart));
    }
}
