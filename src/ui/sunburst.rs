//! Two-ring sunburst: pipelines inside, their operators outside

use crate::charts::{SunburstModel, SunburstSegment};
use eframe::egui::{self, Color32, Pos2, Sense, Shape, Stroke, Vec2};
use std::f64::consts::TAU;

use super::charts::series_color;
use super::dashboard::Viewport;

/// Ring bounds as fractions of the chart radius
const INNER_RING: [f32; 2] = [0.30, 0.62];
const OUTER_RING: [f32; 2] = [0.66, 1.0];

/// Polygon steps for a full turn
const STEPS_PER_TURN: f64 = 96.0;

const DIMMED: f32 = 0.35;

/// Point on the circle, clockwise from twelve o'clock
fn polar(center: Pos2, radius: f32, fraction: f64) -> Pos2 {
    let angle = (fraction * TAU) as f32;
    center + Vec2::new(angle.sin(), -angle.cos()) * radius
}

/// An annular sector split into convex quads
fn arc_quads(center: Pos2, [inner, outer]: [f32; 2], segment: &SunburstSegment) -> Vec<Vec<Pos2>> {
    let steps = ((segment.end - segment.start) * STEPS_PER_TURN).ceil().max(1.0) as usize;
    let step = (segment.end - segment.start) / steps as f64;

    (0..steps)
        .map(|i| {
            let a = segment.start + step * i as f64;
            let b = a + step;
            vec![
                polar(center, inner, a),
                polar(center, outer, a),
                polar(center, outer, b),
                polar(center, inner, b),
            ]
        })
        .collect()
}

/// Segment under `offset`, given relative to the center in units of the chart radius
pub fn segment_at(model: &SunburstModel, offset: Vec2) -> Option<&SunburstSegment> {
    let radius = offset.length();
    let ring = if (INNER_RING[0]..=INNER_RING[1]).contains(&radius) {
        &model.pipelines
    } else if (OUTER_RING[0]..=OUTER_RING[1]).contains(&radius) {
        &model.operators
    } else {
        return None;
    };

    let fraction = (offset.x as f64).atan2(-offset.y as f64) / TAU;
    let fraction = fraction.rem_euclid(1.0);
    ring.iter()
        .find(|segment| segment.start <= fraction && fraction < segment.end)
}

pub fn render_sunburst(ui: &mut egui::Ui, model: &SunburstModel, viewport: Viewport) {
    let side = viewport.width.min(viewport.height);
    let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
    let center = response.rect.center();
    let radius = side / 2.0;
    let stroke = Stroke::new(1.0, ui.visuals().panel_fill);

    let mut operator_names: Vec<&str> = model.operators.iter().map(|s| s.label.as_str()).collect();
    operator_names.sort_unstable();
    operator_names.dedup();

    // Pipelines are colored by position, operators by name so repeats match
    let rings = [
        (INNER_RING, &model.pipelines, false),
        (OUTER_RING, &model.operators, true),
    ];
    for (bounds, segments, by_name) in rings {
        let any_highlighted = segments.iter().any(|s| s.highlighted);
        let bounds = [bounds[0] * radius, bounds[1] * radius];

        for (i, segment) in segments.iter().enumerate() {
            let index = if by_name {
                operator_names
                    .binary_search(&segment.label.as_str())
                    .unwrap_or(i)
            } else {
                i
            };
            let mut color: Color32 = series_color(index);
            if any_highlighted && !segment.highlighted {
                color = color.gamma_multiply(DIMMED);
            }

            for quad in arc_quads(center, bounds, segment) {
                painter.add(Shape::convex_polygon(quad, color, Stroke::NONE));
            }
            painter.line_segment(
                [
                    polar(center, bounds[0], segment.start),
                    polar(center, bounds[1], segment.start),
                ],
                stroke,
            );
        }
    }

    if let Some(pointer) = response.hover_pos() {
        let offset = (pointer - center) / radius;
        if let Some(segment) = segment_at(model, offset) {
            let share = segment.value / model.total * 100.0;
            response.on_hover_text(format!(
                "{}\n{} samples ({:.2}%)",
                segment.label, segment.value, share
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(label: &str, value: f64, start: f64, end: f64) -> SunburstSegment {
        SunburstSegment {
            label: label.to_string(),
            value,
            start,
            end,
            highlighted: false,
        }
    }

    fn model() -> SunburstModel {
        SunburstModel {
            pipelines: vec![segment("p0", 3.0, 0.0, 0.75), segment("p1", 1.0, 0.75, 1.0)],
            operators: vec![
                segment("scan", 2.0, 0.0, 0.5),
                segment("join", 1.0, 0.5, 0.75),
                segment("scan", 1.0, 0.75, 1.0),
            ],
            total: 4.0,
        }
    }

    #[test]
    fn test_segment_at_picks_ring_by_radius() {
        let model = model();
        // Right of center is a quarter turn clockwise
        let inner = segment_at(&model, Vec2::new(0.5, 0.0)).map(|s| s.label.as_str());
        let outer = segment_at(&model, Vec2::new(0.8, 0.0)).map(|s| s.label.as_str());
        assert_eq!(inner, Some("p0"));
        assert_eq!(outer, Some("scan"));
    }

    #[test]
    fn test_segment_at_wraps_past_three_quarters() {
        let model = model();
        // Left of center: three quarters of a turn
        let hit = segment_at(&model, Vec2::new(-0.8, -0.01)).map(|s| s.value);
        assert_eq!(hit, Some(1.0));
        let below = segment_at(&model, Vec2::new(0.0, 0.8)).map(|s| s.label.as_str());
        assert_eq!(below, Some("join"));
    }

    #[test]
    fn test_segment_at_ignores_hole_and_gap() {
        let model = model();
        assert!(segment_at(&model, Vec2::new(0.1, 0.0)).is_none());
        assert!(segment_at(&model, Vec2::new(0.0, -0.64)).is_none());
        assert!(segment_at(&model, Vec2::new(1.2, 0.0)).is_none());
    }

    #[test]
    fn test_arc_quads_cover_the_segment() {
        let quads = arc_quads(Pos2::ZERO, [1.0, 2.0], &segment("p0", 1.0, 0.0, 0.5));
        assert_eq!(quads.len(), 48);
        let first = &quads[0];
        assert!((first[0] - Pos2::new(0.0, -1.0)).length() < 1e-5);
        let last = &quads[quads.len() - 1];
        assert!((last[2] - Pos2::new(0.0, 2.0)).length() < 1e-5);
    }
}
