use crate::charts::UirModel;
use eframe::egui::{self, RichText};
use egui_extras::{Column, TableBuilder};

use super::dashboard::Viewport;

/// UIR listing with per-line sample share; hot lines stand out
pub fn render_uir_viewer(ui: &mut egui::Ui, model: &UirModel, viewport: Viewport) {
    let row_height = 18.0;
    let hot = ui.visuals().warn_fg_color;

    ui.label(format!("{} samples over {} lines", model.total, model.lines.len()));

    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(viewport.height)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::initial(50.0).resizable(false))
        .column(Column::initial(70.0).resizable(false))
        .column(Column::initial(80.0).resizable(true))
        .column(Column::remainder().clip(true))
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Share");
            });
            header.col(|ui| {
                ui.strong("Samples");
            });
            header.col(|ui| {
                ui.strong("UIR");
            });
        })
        .body(|body| {
            body.rows(row_height, model.lines.len(), |mut row| {
                let Some(line) = model.lines.get(row.index()) else {
                    return;
                };
                let text = |s: String| {
                    let text = RichText::new(s).monospace();
                    if line.hot { text.color(hot).strong() } else { text }
                };

                row.col(|ui| {
                    ui.label(text(line.number.to_string()));
                });
                row.col(|ui| {
                    ui.label(text(format!("{:.2}%", line.percentage)));
                });
                row.col(|ui| {
                    ui.label(text(format!("{}", line.occurrences)));
                });
                row.col(|ui| {
                    ui.label(text(line.text.clone()));
                });
            });
        });
}
