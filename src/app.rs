use std::path::PathBuf;

use eframe::egui;

use crate::charts::ChartView;
use crate::config::DashboardConfig;
use crate::constants::layout::CONTROLS_PANEL_WIDTH;
use crate::fetch::{self, BackgroundFetcher, ChartDataFetcher, FetchEvent};
use crate::state::{DashboardKind, DashboardState, StateMutation, Store};
use crate::ui;

pub struct ProfileOxide {
    pub store: Store,
    pub fetcher: Box<dyn ChartDataFetcher>,
    /// Views of the mounted dashboard, in layout order
    pub views: Vec<ChartView>,
    pub dashboard: DashboardKind,
    pub config: DashboardConfig,
    pub config_path: PathBuf,
    pub error: Option<String>,
}

impl ProfileOxide {
    pub fn new(config: DashboardConfig, config_path: PathBuf) -> Self {
        let fetcher = BackgroundFetcher::spawn(config.separator_byte());
        Self::with_fetcher(config, config_path, Box::new(fetcher))
    }

    pub fn with_fetcher(
        config: DashboardConfig,
        config_path: PathBuf,
        fetcher: Box<dyn ChartDataFetcher>,
    ) -> Self {
        let mut app = Self {
            store: Store::new(),
            fetcher,
            views: Vec::new(),
            dashboard: config.dashboard,
            config,
            config_path,
            error: None,
        };
        for mutation in app.config.initial_mutations() {
            app.store.dispatch(mutation);
        }
        app.mount_dashboard(app.dashboard);
        app
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Drain worker results, then let every mounted chart react
    pub fn pump(&mut self) {
        profiling::scope!("pump");

        while let Some(event) = self.fetcher.poll() {
            if let FetchEvent::Error { message } = &event {
                self.error = Some(message.clone());
            }
            fetch::apply_event(&mut self.store, event);
        }

        for view in &mut self.views {
            if let Err(e) = view.sync(&mut self.store, self.fetcher.as_ref()) {
                log::warn!("chart {} sync failed: {}", view.chart_id(), e);
                self.error = Some(e.user_message());
            }
        }
    }

    /// Start loading a profile. Everything derived from the previous file is dropped.
    pub fn open_file(&mut self, path: PathBuf) {
        self.reset();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.store.dispatch(StateMutation::SetFileName(name));
        self.store.dispatch(StateMutation::SetFile(Some(path.clone())));
        self.store.dispatch(StateMutation::SetFileLoading(true));
        self.fetcher.load_profile(path);
    }

    /// Unmount the current charts and mount the ones of `kind` under fresh ids
    pub fn switch_dashboard(&mut self, kind: DashboardKind) {
        if kind == self.dashboard && !self.views.is_empty() {
            return;
        }
        self.unmount_all();
        self.mount_dashboard(kind);
    }

    /// Back to the default state, keeping the configured preferences and dashboard
    pub fn reset(&mut self) {
        self.unmount_all();
        self.store.dispatch(StateMutation::ResetState);
        for mutation in self.config.initial_mutations() {
            self.store.dispatch(mutation);
        }
        self.error = None;
        self.mount_dashboard(self.dashboard);
    }

    /// Add `operator` to the operator selection or drop it from it
    pub fn toggle_operator(&mut self, operator: &str) {
        let state = self.store.state();
        let Some(universe) = state.operators.as_deref() else {
            return;
        };
        let selection = state.current_operator.toggle(operator, universe);
        self.store.dispatch(StateMutation::SetCurrentOperator(selection));
    }

    pub fn save_config(&mut self) {
        self.config.dashboard = self.dashboard;
        self.config.interpolation = self.store.state().current_interpolation;
        self.config.bucket_size = self.store.state().current_bucket_size;

        match self.config.save(&self.config_path) {
            Ok(()) => log::info!("configuration saved to {}", self.config_path.display()),
            Err(e) => self.set_error(format!("Failed to save config: {}", e.user_message())),
        }
    }

    fn mount_dashboard(&mut self, kind: DashboardKind) {
        self.dashboard = kind;

        let mut chart_ids = Vec::new();
        for &chart_type in kind.charts() {
            match ChartView::mount(&mut self.store, chart_type, self.fetcher.as_ref()) {
                Ok(view) => {
                    chart_ids.push(view.chart_id());
                    self.views.push(view);
                }
                Err(e) => self.set_error(e.user_message()),
            }
        }

        self.store
            .dispatch(StateMutation::SetMultipleChartDataLength(chart_ids.len() as i32));
        self.store
            .dispatch(StateMutation::SetDashboardState(Some(DashboardState { kind, chart_ids })));
        log::debug!("mounted dashboard {}", kind.title());
    }

    fn unmount_all(&mut self) {
        for view in self.views.drain(..) {
            view.unmount(&mut self.store);
        }
    }
}

impl eframe::App for ProfileOxide {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();

        if self.config.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        self.pump();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::render_toolbar(self, ctx, ui);
        });

        egui::SidePanel::left("controls")
            .default_width(CONTROLS_PANEL_WIDTH)
            .show(ctx, |ui| {
                ui::render_controls(self, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::render_dashboard(self, ui);
        });

        ui::render_error_window(self, ctx);

        // Worker results arrive without input events
        let state = self.store.state();
        if state.file_loading || state.result_loading.values().any(|loading| *loading) {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{ChartDataResponse, RecordingFetcher};
    use crate::state::{BarChartData, ChartDataVariant, ChartType, ProfileSummary, Selection};
    use std::rc::Rc;

    /// Lets the test keep a handle on the fetcher the app owns
    struct Shared(Rc<RecordingFetcher>);

    impl ChartDataFetcher for Shared {
        fn load_profile(&self, path: PathBuf) {
            self.0.load_profile(path)
        }

        fn request_chart_data(&self, request: crate::charts::ChartRequest) {
            self.0.request_chart_data(request)
        }

        fn poll(&self) -> Option<FetchEvent> {
            self.0.poll()
        }
    }

    fn app() -> (ProfileOxide, Rc<RecordingFetcher>) {
        let fetcher = Rc::new(RecordingFetcher::default());
        let app = ProfileOxide::with_fetcher(
            DashboardConfig::default(),
            PathBuf::from("unused.json"),
            Box::new(Shared(Rc::clone(&fetcher))),
        );
        (app, fetcher)
    }

    fn loaded() -> FetchEvent {
        FetchEvent::ProfileLoaded {
            summary: ProfileSummary {
                rows: 2,
                time_domain: [0.0, 1.0],
                memory_domain: [0.0, 0.0],
                query_plan: None,
            },
            events: vec!["L1".to_string()],
            operators: vec!["scan".to_string(), "join".to_string()],
            pipelines: vec!["p0".to_string()],
        }
    }

    #[test]
    fn test_startup_mounts_configured_dashboard() {
        let (app, _) = app();
        let state = app.store.state();

        assert_eq!(app.views.len(), 2);
        assert_eq!(state.chart_id_counter, 2);
        assert_eq!(state.multiple_chart_data_length, 2);
        assert_eq!(
            state.dashboard_state,
            Some(DashboardState {
                kind: DashboardKind::Overview,
                chart_ids: vec![0, 1],
            })
        );
        assert_eq!(state.current_chart, Some(ChartType::SwimLanes));
    }

    #[test]
    fn test_open_file_then_load_fetches_every_chart() {
        let (mut app, fetcher) = app();
        app.open_file(PathBuf::from("/tmp/run.csv"));
        assert!(app.store.state().file_loading);
        assert_eq!(fetcher.loads.borrow().len(), 1);

        fetcher.push_event(loaded());
        app.pump();

        let requests = fetcher.take();
        let types: Vec<ChartType> = requests.iter().map(|r| r.chart_type).collect();
        assert_eq!(types, vec![ChartType::BarChart, ChartType::SwimLanes]);
        assert!(!app.store.state().file_loading);

        fetcher.push_event(FetchEvent::ChartData(ChartDataResponse::ok(
            &requests[0],
            ChartDataVariant::BarChart(BarChartData {
                operators: vec!["scan".to_string()],
                frequency: vec![2.0],
            }),
        )));
        app.pump();
        assert!(app.store.state().chart_slot(requests[0].chart_id).is_some());
    }

    #[test]
    fn test_switch_dashboard_uses_fresh_ids() {
        let (mut app, _) = app();
        app.switch_dashboard(DashboardKind::MultipleEvents);

        let ids: Vec<_> = app.views.iter().map(|v| v.chart_id()).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
        assert_eq!(app.store.state().multiple_chart_data_length, 4);
    }

    #[test]
    fn test_reset_restarts_ids_and_keeps_preferences() {
        let fetcher = Rc::new(RecordingFetcher::default());
        let config = DashboardConfig {
            bucket_size: 5.0,
            ..DashboardConfig::default()
        };
        let mut app = ProfileOxide::with_fetcher(
            config,
            PathBuf::from("unused.json"),
            Box::new(Shared(Rc::clone(&fetcher))),
        );
        app.store.dispatch(StateMutation::SetCurrentBucketSize(0.1));
        app.reset();

        assert_eq!(app.store.state().current_bucket_size, 5.0);
        let ids: Vec<_> = app.views.iter().map(|v| v.chart_id()).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_plan_click_toggles_operator() {
        let (mut app, fetcher) = app();
        app.toggle_operator("scan");
        assert!(app.store.state().current_operator.is_all());

        fetcher.push_event(loaded());
        app.pump();
        app.toggle_operator("scan");
        assert_eq!(
            app.store.state().current_operator,
            Selection::Only(vec!["join".to_string()])
        );

        app.toggle_operator("scan");
        assert!(app.store.state().current_operator.is_all());
    }

    #[test]
    fn test_load_error_surfaces() {
        let (mut app, fetcher) = app();
        fetcher.push_event(FetchEvent::Error {
            message: "Column 'ev_name' not found".to_string(),
        });
        app.pump();
        assert_eq!(app.error.as_deref(), Some("Column 'ev_name' not found"));
    }
}
