use crate::charts::EmptyReason;
use eframe::egui;

use super::dashboard::Viewport;

/// Everything a chart shows instead of its plot
pub enum Placeholder<'a> {
    Loading,
    Failed(&'a str),
    Empty(&'a EmptyReason),
}

/// Shared loading / "could not load" box, sized like the chart it stands for
pub fn render_placeholder(ui: &mut egui::Ui, placeholder: Placeholder<'_>, viewport: Viewport) {
    let size = egui::vec2(ui.available_width().min(viewport.width), viewport.height);

    ui.allocate_ui(size, |ui| {
        ui.set_min_size(size);
        ui.centered_and_justified(|ui| match placeholder {
            Placeholder::Loading => {
                ui.spinner();
            }
            Placeholder::Failed(message) => {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    format!("Could not load chart: {}", message),
                );
            }
            Placeholder::Empty(reason) => {
                ui.weak(reason.to_string());
            }
        });
    });
}
