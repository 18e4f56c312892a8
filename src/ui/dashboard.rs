use crate::app::ProfileOxide;
use crate::charts::{ChartModel, ChartStatus};
use crate::constants::layout::{HEATMAP_PANEL_MIN_WIDTH, MIN_PLOT_HEIGHT};
use eframe::egui;

use super::charts::{render_chart, ChartAction};
use super::placeholder::{render_placeholder, Placeholder};

/// Space available to a dashboard or one chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Gap between stacked charts, title row included
const CHART_SPACING: f32 = 28.0;

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn of(ui: &egui::Ui) -> Self {
        let size = ui.available_size();
        Self::new(size.x, size.y)
    }

    /// Per-chart viewport when `count` charts are stacked vertically
    pub fn stacked(&self, count: usize) -> Viewport {
        let count = count.max(1) as f32;
        let height = (self.height - CHART_SPACING * count) / count;
        Viewport::new(self.width, height.max(MIN_PLOT_HEIGHT))
    }

    /// Heatmap panels per row
    pub fn heatmap_columns(&self, panels: usize) -> usize {
        let fit = (self.width / HEATMAP_PANEL_MIN_WIDTH).floor() as usize;
        fit.clamp(1, panels.max(1))
    }

    pub fn with_height(&self, height: f32) -> Viewport {
        Viewport::new(self.width, height)
    }
}

pub fn render_dashboard(app: &mut ProfileOxide, ui: &mut egui::Ui) {
    profiling::scope!("render_dashboard");

    let state = app.store.snapshot();
    if !state.has_data() && !state.file_loading {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("No profile loaded");
            ui.label("Open a profiler CSV export or drop it onto the window");
        });
        return;
    }

    let viewport = Viewport::of(ui).stacked(app.views.len());

    let mut actions = Vec::new();
    egui::ScrollArea::vertical().show(ui, |ui| {
        for view in &mut app.views {
            ui.strong(view.chart_type().title());

            match view.status(&state) {
                ChartStatus::Loading => render_placeholder(ui, Placeholder::Loading, viewport),
                ChartStatus::Failed(message) => {
                    render_placeholder(ui, Placeholder::Failed(message), viewport)
                }
                ChartStatus::Ready(_) => {
                    let chart_id = view.chart_id();
                    match view.model(&state) {
                        Some(ChartModel::Empty(reason)) => {
                            render_placeholder(ui, Placeholder::Empty(reason), viewport)
                        }
                        Some(model) => actions.extend(render_chart(ui, chart_id, model, viewport)),
                        None => render_placeholder(ui, Placeholder::Loading, viewport),
                    }
                }
            }

            ui.add_space(8.0);
        }
    });

    for action in actions {
        match action {
            ChartAction::ToggleOperator(operator) => app.toggle_operator(&operator),
        }
    }
}
