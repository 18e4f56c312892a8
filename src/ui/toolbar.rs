use crate::app::ProfileOxide;
use crate::state::DashboardKind;
use eframe::egui::{self, ComboBox};

/// Render the top toolbar: file, dashboard picker, reset and load progress
pub fn render_toolbar(app: &mut ProfileOxide, ctx: &egui::Context, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        if ui.button("📂").on_hover_text("Open profile").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Profiler export", &["csv"])
                .pick_file()
            {
                app.open_file(path);
            }
        }

        let state = app.store.snapshot();
        if let Some(name) = &state.file_name {
            let label = ui.label(format!("📄 {}", name));
            if let Some(file) = &state.file {
                label.on_hover_text(file.display().to_string());
            }
        }

        ui.separator();

        let mut kind = app.dashboard;
        ComboBox::from_id_salt("dashboard")
            .selected_text(kind.title())
            .show_ui(ui, |ui| {
                for option in DashboardKind::ALL {
                    ui.selectable_value(&mut kind, option, option.title());
                }
            });
        if kind != app.dashboard {
            app.switch_dashboard(kind);
        }

        if ui.button("⟲").on_hover_text("Reset").clicked() {
            app.reset();
        }

        ui.separator();

        if state.file_loading {
            ui.spinner();
            ui.label(format!("Parsing… {} chunks", state.chunks_number));
        } else if let Some(summary) = &state.result {
            ui.label(format!(
                "{} samples | {} events",
                summary.rows,
                state.events.as_ref().map_or(0, |e| e.len())
            ));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("💾").on_hover_text("Save preferences").clicked() {
                app.save_config();
            }
            let theme = if app.config.dark_mode { "☀" } else { "🌙" };
            if ui.button(theme).on_hover_text("Toggle theme").clicked() {
                app.config.dark_mode = !app.config.dark_mode;
            }
        });
    });

    // Drag and drop
    if let Some(path) = ctx.input(|i| {
        i.raw
            .dropped_files
            .first()
            .and_then(|f| f.path.clone())
    }) {
        app.open_file(path);
    }
}

pub fn render_error_window(app: &mut ProfileOxide, ctx: &egui::Context) {
    let Some(message) = app.error.clone() else {
        return;
    };

    let mut open = true;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(message);
            if ui.button("Dismiss").clicked() {
                app.error = None;
            }
        });
    if !open {
        app.error = None;
    }
}
