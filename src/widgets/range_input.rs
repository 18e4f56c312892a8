//! Range input widget for selection tuples where `-1` marks an unbounded side

use crate::constants::state::UNBOUNDED;
use egui::{Response, Ui};

/// Edits a `[from, to]` selection tuple; each side can be switched off
pub struct RangeInput<'a> {
    label: &'a str,
    range: &'a mut [f64; 2],
    default_min: f64,
    default_max: f64,
    speed: f64,
}

impl<'a> RangeInput<'a> {
    pub fn new(label: &'a str, range: &'a mut [f64; 2]) -> Self {
        Self {
            label,
            range,
            default_min: 0.0,
            default_max: 100.0,
            speed: 0.1,
        }
    }

    /// Values a side takes when it gets enabled
    pub fn defaults(mut self, min: f64, max: f64) -> Self {
        self.default_min = min;
        self.default_max = max;
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn show(self, ui: &mut Ui) -> Response {
        let before = *self.range;
        let defaults = [self.default_min, self.default_max];

        let mut response = ui
            .horizontal(|ui| {
                ui.label(self.label);
                for (side, name) in ["From", "To"].into_iter().enumerate() {
                    let mut enabled = is_bounded(self.range[side]);
                    ui.checkbox(&mut enabled, name);
                    if enabled {
                        let mut value = if is_bounded(self.range[side]) {
                            self.range[side]
                        } else {
                            defaults[side]
                        };
                        ui.add(
                            egui::DragValue::new(&mut value)
                                .speed(self.speed)
                                .range(0.0..=f64::MAX),
                        );
                        self.range[side] = value;
                    } else {
                        self.range[side] = UNBOUNDED;
                    }
                }
            })
            .response;

        if *self.range != before {
            response.mark_changed();
        }
        response
    }
}

/// Negative bounds are the unbounded sentinel
pub fn is_bounded(value: f64) -> bool {
    value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_unbounded() {
        assert!(!is_bounded(UNBOUNDED));
        assert!(is_bounded(0.0));
        assert!(is_bounded(12.5));
    }
}
