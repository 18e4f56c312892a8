use crate::app::ProfileOxide;
use crate::charts::format_number;
use crate::constants::widgets::BUCKET_SIZES;
use crate::state::{Interpolation, StateMutation};
use crate::widgets::{RangeInput, SelectionFilter};
use eframe::egui::{self, ComboBox};

/// Selection-context controls. Every change is dispatched as a mutation;
/// the mounted charts decide for themselves whether to refetch.
pub fn render_controls(app: &mut ProfileOxide, ui: &mut egui::Ui) {
    let state = app.store.snapshot();
    let mut mutations = Vec::new();

    ui.heading("Selection");
    if !state.has_data() {
        ui.label("Open a profile to start");
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        // Event
        let events = state.events.as_deref().unwrap_or_default();
        let selected = if state.current_event.is_empty() {
            "All events"
        } else {
            state.current_event.as_str()
        };
        ComboBox::from_label("Event")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for event in events {
                    if ui
                        .selectable_label(*event == state.current_event, event)
                        .clicked()
                    {
                        mutations.push(StateMutation::SetCurrentEvent(event.clone()));
                    }
                }
            });

        ui.separator();

        ComboBox::from_label("Bucket size")
            .selected_text(format!("{} s", format_number(state.current_bucket_size)))
            .show_ui(ui, |ui| {
                for size in BUCKET_SIZES {
                    if ui
                        .selectable_label(size == state.current_bucket_size, format_number(size))
                        .clicked()
                    {
                        mutations.push(StateMutation::SetCurrentBucketSize(size));
                    }
                }
            });

        ComboBox::from_label("Interpolation")
            .selected_text(state.current_interpolation.to_string())
            .show_ui(ui, |ui| {
                for option in Interpolation::ALL {
                    if ui
                        .selectable_label(option == state.current_interpolation, option.to_string())
                        .clicked()
                    {
                        mutations.push(StateMutation::SetCurrentInterpolation(option));
                    }
                }
            });

        ui.separator();

        let [t_min, t_max] = state.result.as_ref().map_or([0.0, 0.0], |r| r.time_domain);
        let mut time = state.current_time_bucket_selection_tuple;
        if RangeInput::new("Time", &mut time)
            .defaults(t_min, t_max)
            .speed(0.1)
            .show(ui)
            .changed()
        {
            mutations.push(StateMutation::SetCurrentTimeBucketSelectionTuple(time));
        }

        let [m_min, m_max] = state.result.as_ref().map_or([0.0, 0.0], |r| r.memory_domain);
        let mut memory = state.current_memory_address_selection_tuple;
        if RangeInput::new("Memory", &mut memory)
            .defaults(m_min, m_max)
            .speed(1.0)
            .show(ui)
            .changed()
        {
            mutations.push(StateMutation::SetCurrentMemoryAddressSelectionTuple(memory));
        }

        let mut difference = state.memory_heatmaps_difference_representation;
        if ui
            .checkbox(&mut difference, "Heatmap difference")
            .on_hover_text("Show each operator relative to the mean of all operators")
            .changed()
        {
            mutations.push(StateMutation::SetMemoryHeatmapsDifferenceRepresentation(
                difference,
            ));
        }

        ui.separator();

        if let Some(operators) = state.operators.as_deref() {
            if let Some(selection) =
                SelectionFilter::new("Operators", &state.current_operator, operators).show(ui)
            {
                mutations.push(StateMutation::SetCurrentOperator(selection));
            }
        }
        if let Some(pipelines) = state.pipelines.as_deref() {
            if let Some(selection) =
                SelectionFilter::new("Pipelines", &state.current_pipeline, pipelines).show(ui)
            {
                mutations.push(StateMutation::SetCurrentPipeline(selection));
            }
        }
    });

    for mutation in mutations {
        app.store.dispatch(mutation);
    }
}
