//! Operator / pipeline selection widget

use crate::state::Selection;
use egui::Ui;

/// Checkbox list over a universe of values, edited as a [`Selection`]
pub struct SelectionFilter<'a> {
    label: &'a str,
    selection: &'a Selection,
    universe: &'a [String],
}

impl<'a> SelectionFilter<'a> {
    pub fn new(label: &'a str, selection: &'a Selection, universe: &'a [String]) -> Self {
        Self {
            label,
            selection,
            universe,
        }
    }

    /// Show the list; returns the new selection when the user changed it
    pub fn show(self, ui: &mut Ui) -> Option<Selection> {
        let mut updated = None;

        egui::CollapsingHeader::new(format!(
            "{} ({})",
            self.label,
            summary(self.selection, self.universe.len())
        ))
        .id_salt(self.label)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if ui.small_button("Select all").clicked() && !self.selection.is_all() {
                    updated = Some(Selection::All);
                }
                if ui.small_button("Select none").clicked() {
                    updated = Some(Selection::Only(Vec::new()));
                }
            });

            egui::ScrollArea::vertical()
                .id_salt(self.label)
                .max_height(160.0)
                .show(ui, |ui| {
                    for item in self.universe {
                        let mut checked = self.selection.contains(item);
                        if ui.checkbox(&mut checked, item.as_str()).changed() {
                            updated = Some(self.selection.toggle(item, self.universe));
                        }
                    }
                });
        });

        updated
    }
}

fn summary(selection: &Selection, universe: usize) -> String {
    match selection {
        Selection::All => "all".to_string(),
        Selection::Only(items) if items.is_empty() => "none".to_string(),
        Selection::Only(items) => format!("{}/{}", items.len(), universe),
    }
}
