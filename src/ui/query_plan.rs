use crate::charts::{PlanNode, QueryPlanModel};
use crate::state::ChartId;
use eframe::egui::{self, RichText};

use super::dashboard::Viewport;

const INDENT: f32 = 18.0;

/// Indented operator tree; the bar shows each operator's share of the busiest one.
/// Returns the operator whose label was clicked.
pub fn render_query_plan(
    ui: &mut egui::Ui,
    chart_id: ChartId,
    model: &QueryPlanModel,
    viewport: Viewport,
) -> Option<String> {
    let max = model.occurrence_domain.max.max(1.0);
    let highlight = ui.visuals().selection.bg_fill;
    let mut clicked = None;

    egui::ScrollArea::vertical()
        .id_salt(("query_plan", chart_id))
        .max_height(viewport.height)
        .show(ui, |ui| {
            for node in &model.nodes {
                ui.horizontal(|ui| {
                    ui.add_space(node.depth as f32 * INDENT);

                    let mut label = RichText::new(&node.label);
                    if node.highlighted {
                        label = label.strong().background_color(highlight);
                    }
                    let response = ui
                        .add(egui::Label::new(label).sense(egui::Sense::click()))
                        .on_hover_ui(|ui| plan_tooltip(ui, node));
                    if response.clicked() {
                        clicked = Some(node.operator.clone());
                    }

                    ui.add(
                        egui::ProgressBar::new((node.occurrences / max) as f32)
                            .desired_width(120.0)
                            .text(format!("{}", node.occurrences)),
                    );
                });
            }
        });

    clicked
}

/// Hottest UIR lines of the operator and its share of all samples
fn plan_tooltip(ui: &mut egui::Ui, node: &PlanNode) {
    if node.label == node.operator {
        ui.strong(&node.label);
    } else {
        ui.strong(format!("{} ({})", node.label, node.operator));
    }

    if !node.top_lines.is_empty() {
        egui::Grid::new("plan_tooltip_lines")
            .striped(true)
            .show(ui, |ui| {
                ui.strong("No.");
                ui.strong("UIR Line");
                ui.strong("Freq.");
                ui.end_row();
                for line in &node.top_lines {
                    ui.monospace(line.number.to_string());
                    ui.monospace(&line.text);
                    ui.label(format!("{:.2}%", line.percentage));
                    ui.end_row();
                }
            });
    }

    ui.label(format!("Total Frequency: {:.2}%", node.total_percentage));
}
