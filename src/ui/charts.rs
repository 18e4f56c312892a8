//! egui_plot rendering of the shaped chart models

use crate::charts::{
    BarModel, ChartModel, Domain, HeatmapModel, HeatmapPanel, HistogramModel, SwimLanesModel,
};
use crate::constants::layout::{HEATMAP_MAX_TEXTURE_SIDE, HEATMAP_PANEL_HEIGHT};
use crate::state::{ChartId, Interpolation};
use eframe::egui::{self, Color32, ColorImage, TextureHandle, TextureOptions};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotImage, PlotPoint, PlotPoints};
use std::hash::{DefaultHasher, Hash, Hasher};

use super::dashboard::Viewport;
use super::placeholder::{render_placeholder, Placeholder};
use super::query_plan::render_query_plan;
use super::sunburst::render_sunburst;
use super::uir_viewer::render_uir_viewer;

/// Interaction a chart hands back to the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartAction {
    /// Add the operator to the operator selection, or drop it
    ToggleOperator(String),
}

pub fn series_color(index: usize) -> Color32 {
    let colors = [
        Color32::from_rgb(31, 119, 180),  // Blue
        Color32::from_rgb(255, 127, 14),  // Orange
        Color32::from_rgb(44, 160, 44),   // Green
        Color32::from_rgb(214, 39, 40),   // Red
        Color32::from_rgb(148, 103, 189), // Purple
        Color32::from_rgb(140, 86, 75),   // Brown
        Color32::from_rgb(227, 119, 194), // Pink
        Color32::from_rgb(127, 127, 127), // Gray
        Color32::from_rgb(188, 189, 34),  // Yellow
        Color32::from_rgb(23, 190, 207),  // Cyan
    ];
    colors[index % colors.len()]
}

pub fn render_chart(
    ui: &mut egui::Ui,
    chart_id: ChartId,
    model: &ChartModel,
    viewport: Viewport,
) -> Option<ChartAction> {
    profiling::scope!("render_chart");

    match model {
        ChartModel::Bar(m) => render_bars(ui, chart_id, m, viewport),
        ChartModel::Histogram(m) => render_histogram(ui, chart_id, m, viewport),
        ChartModel::SwimLanes(m) => render_swim_lanes(ui, chart_id, m, viewport),
        ChartModel::Heatmap(m) => render_heatmaps(ui, chart_id, m, viewport),
        ChartModel::Uir(m) => render_uir_viewer(ui, m, viewport),
        ChartModel::QueryPlan(m) => {
            return render_query_plan(ui, chart_id, m, viewport).map(ChartAction::ToggleOperator);
        }
        ChartModel::Sunburst(m) => render_sunburst(ui, m, viewport),
        ChartModel::Empty(reason) => render_placeholder(ui, Placeholder::Empty(reason), viewport),
    }
    None
}

fn render_bars(ui: &mut egui::Ui, chart_id: ChartId, model: &BarModel, viewport: Viewport) {
    let labels: Vec<String> = model.bars.iter().map(|(op, _)| op.clone()).collect();
    let bars: Vec<Bar> = model
        .bars
        .iter()
        .enumerate()
        .map(|(i, (op, freq))| {
            Bar::new(i as f64, *freq)
                .width(0.7)
                .name(op)
                .fill(series_color(i))
        })
        .collect();

    Plot::new(("bar_chart", chart_id))
        .height(viewport.height)
        .allow_scroll(false)
        .include_y(model.domain.min)
        .include_y(model.domain.max)
        .x_axis_formatter(move |mark, _range| {
            let index = mark.value.round();
            if (mark.value - index).abs() > f64::EPSILON || index < 0.0 {
                return String::new();
            }
            labels.get(index as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("Samples", bars));
        });
}

fn render_histogram(ui: &mut egui::Ui, chart_id: ChartId, model: &HistogramModel, viewport: Viewport) {
    let width = model.bucket_width;
    let bars: Vec<Bar> = model
        .bins
        .iter()
        .map(|&[bucket, count]| Bar::new(bucket + width / 2.0, count).width(width * 0.95))
        .collect();

    Plot::new(("activity_histogram", chart_id))
        .height(viewport.height)
        .allow_scroll(false)
        .include_y(model.y_domain.min)
        .include_y(model.y_domain.max)
        .x_axis_label("time (s)")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("Samples", bars).color(series_color(0)));
        });
}

fn render_swim_lanes(ui: &mut egui::Ui, chart_id: ChartId, model: &SwimLanesModel, viewport: Viewport) {
    Plot::new(("swim_lanes", chart_id))
        .height(viewport.height)
        .allow_scroll(false)
        .legend(Legend::default().position(egui_plot::Corner::RightTop))
        .include_x(model.x_domain.min)
        .include_x(model.x_domain.max)
        .include_y(model.y_domain.min)
        .include_y(model.y_domain.max)
        .x_axis_label("time (s)")
        .y_axis_label(if model.stacked { "samples" } else { "share" })
        .show(ui, |plot_ui| {
            // Stacked bands are drawn top-down so each lower band covers the one above it
            let mut order: Vec<usize> = (0..model.lanes.len()).collect();
            if model.stacked {
                order.reverse();
            }
            for i in order {
                let lane = &model.lanes[i];
                let points = interpolate(&lane.points, model.interpolation);
                plot_ui.line(
                    Line::new(lane.operator.clone(), PlotPoints::from(points))
                        .color(series_color(i))
                        .fill(0.0),
                );
            }
        });
}

fn render_heatmaps(ui: &mut egui::Ui, chart_id: ChartId, model: &HeatmapModel, viewport: Viewport) {
    let columns = viewport.heatmap_columns(model.panels.len());
    let panel_width = viewport.width / columns as f32 - ui.spacing().item_spacing.x;

    // The image spans every cell of the shared axes
    let x_max = model.x_domain.max + model.bucket_width;
    let y_max = model.y_domain.max + 1.0;
    let center = PlotPoint::new(
        (model.x_domain.min + x_max) / 2.0,
        (model.y_domain.min + y_max) / 2.0,
    );
    let size = egui::vec2(
        (x_max - model.x_domain.min) as f32,
        (y_max - model.y_domain.min) as f32,
    );

    for (row, panels) in model.panels.chunks(columns).enumerate() {
        ui.horizontal(|ui| {
            for (col, panel) in panels.iter().enumerate() {
                let index = row * columns + col;
                let texture = heatmap_texture(
                    ui,
                    egui::Id::new(("heatmap_texture", chart_id, index)),
                    heatmap_image(panel, model),
                );

                ui.vertical(|ui| {
                    ui.set_width(panel_width);
                    ui.label(&panel.operator);

                    Plot::new(("heatmap", chart_id, index))
                        .width(panel_width)
                        .height(HEATMAP_PANEL_HEIGHT)
                        .allow_scroll(false)
                        .include_x(model.x_domain.min)
                        .include_x(x_max)
                        .include_y(model.y_domain.min)
                        .include_y(y_max)
                        .show(ui, |plot_ui| {
                            plot_ui.image(PlotImage::new(&panel.operator, &texture, center, size));
                        });
                });
            }
        });
    }
}

/// Uploaded texture of one heatmap panel, replaced only when its pixels change
fn heatmap_texture(ui: &egui::Ui, id: egui::Id, image: ColorImage) -> TextureHandle {
    let mut hasher = DefaultHasher::new();
    image.size.hash(&mut hasher);
    image.pixels.hash(&mut hasher);
    let key = hasher.finish();

    let cached = ui.data_mut(|data| data.get_temp::<(u64, TextureHandle)>(id));
    let texture = match cached {
        Some((cached_key, texture)) if cached_key == key => return texture,
        Some((_, mut texture)) => {
            texture.set(image, TextureOptions::NEAREST);
            texture
        }
        None => ui
            .ctx()
            .load_texture(format!("heatmap-{:?}", id), image, TextureOptions::NEAREST),
    };
    ui.data_mut(|data| data.insert_temp(id, (key, texture.clone())));
    texture
}

/// One pixel per `(bucket, address)` cell, highest address on the top row.
/// Axes too long for one texture are binned; a binned pixel shows its
/// strongest cell.
pub fn heatmap_image(panel: &HeatmapPanel, model: &HeatmapModel) -> ColorImage {
    let cells_x = (model.x_domain.span() / model.bucket_width).round() as usize + 1;
    let cells_y = model.y_domain.span().round() as usize + 1;
    let stride_x = cells_x.div_ceil(HEATMAP_MAX_TEXTURE_SIDE);
    let stride_y = cells_y.div_ceil(HEATMAP_MAX_TEXTURE_SIDE);
    let [width, height] = [cells_x.div_ceil(stride_x), cells_y.div_ceil(stride_y)];

    let mut strongest: Vec<Option<f64>> = vec![None; width * height];
    for cell in &panel.cells {
        let x = ((cell.bucket - model.x_domain.min) / model.bucket_width).round();
        let y = (model.y_domain.max - cell.address).round();
        if !(x >= 0.0 && y >= 0.0) {
            continue;
        }
        let [x, y] = [x as usize / stride_x, y as usize / stride_y];
        if x >= width || y >= height {
            continue;
        }
        let slot = &mut strongest[y * width + x];
        if slot.is_none_or(|v| cell.value.abs() > v.abs()) {
            *slot = Some(cell.value);
        }
    }

    let rgba: Vec<u8> = strongest
        .iter()
        .flat_map(|value| match value {
            Some(v) => heat_color(*v, model.value_domain, model.difference).to_srgba_unmultiplied(),
            None => [0, 0, 0, 0],
        })
        .collect();
    ColorImage::from_rgba_unmultiplied([width, height], &rgba)
}

/// Sequential scale for counts, diverging scale around zero for differences
pub fn heat_color(value: f64, domain: Domain, difference: bool) -> Color32 {
    let lerp = |a: Color32, b: Color32, t: f64| {
        let t = t.clamp(0.0, 1.0) as f32;
        Color32::from_rgb(
            (a.r() as f32 + (b.r() as f32 - a.r() as f32) * t) as u8,
            (a.g() as f32 + (b.g() as f32 - a.g() as f32) * t) as u8,
            (a.b() as f32 + (b.b() as f32 - a.b() as f32) * t) as u8,
        )
    };

    if difference {
        let extent = domain.min.abs().max(domain.max.abs());
        if extent == 0.0 {
            return Color32::WHITE;
        }
        let t = value / extent;
        if t < 0.0 {
            lerp(Color32::WHITE, Color32::from_rgb(33, 102, 172), -t)
        } else {
            lerp(Color32::WHITE, Color32::from_rgb(178, 24, 43), t)
        }
    } else {
        let t = if domain.span() > 0.0 {
            (value - domain.min) / domain.span()
        } else {
            1.0
        };
        lerp(Color32::from_rgb(68, 1, 84), Color32::from_rgb(253, 231, 37), t)
    }
}

/// Resample lane points for the chosen curve shape
pub fn interpolate(points: &[[f64; 2]], interpolation: Interpolation) -> Vec<[f64; 2]> {
    if points.len() < 2 {
        return points.to_vec();
    }

    match interpolation {
        Interpolation::Linear | Interpolation::Monotone => points.to_vec(),
        Interpolation::Step => {
            let mut out = Vec::with_capacity(points.len() * 2);
            for pair in points.windows(2) {
                out.push(pair[0]);
                out.push([pair[1][0], pair[0][1]]);
            }
            out.extend(points.last().copied());
            out
        }
        Interpolation::Basis => {
            // Two rounds of corner cutting, endpoints pinned
            let mut current = points.to_vec();
            for _ in 0..2 {
                let mut next = Vec::with_capacity(current.len() * 2);
                next.extend(current.first().copied());
                for pair in current.windows(2) {
                    let [a, b] = [pair[0], pair[1]];
                    next.push([0.75 * a[0] + 0.25 * b[0], 0.75 * a[1] + 0.25 * b[1]]);
                    next.push([0.25 * a[0] + 0.75 * b[0], 0.25 * a[1] + 0.75 * b[1]]);
                }
                next.extend(current.last().copied());
                current = next;
            }
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::HeatmapCell;

    fn heatmap(cells: Vec<HeatmapCell>, bucket_width: f64) -> (HeatmapPanel, HeatmapModel) {
        let panel = HeatmapPanel {
            operator: "scan".to_string(),
            cells,
        };
        let model = HeatmapModel {
            x_domain: Domain::of(panel.cells.iter().map(|c| c.bucket)).unwrap(),
            y_domain: Domain::of(panel.cells.iter().map(|c| c.address)).unwrap(),
            value_domain: Domain::of(panel.cells.iter().map(|c| c.value)).unwrap(),
            panels: vec![panel.clone()],
            bucket_width,
            difference: false,
        };
        (panel, model)
    }

    #[test]
    fn test_heatmap_image_has_one_pixel_per_cell() {
        let (panel, model) = heatmap(
            vec![
                HeatmapCell { bucket: 0.0, address: 1.0, value: 2.0 },
                HeatmapCell { bucket: 1.0, address: 3.0, value: 8.0 },
            ],
            0.5,
        );

        let image = heatmap_image(&panel, &model);
        assert_eq!(image.size, [3, 3]);
        // Highest address on the top row
        assert_eq!(image.pixels[2], heat_color(8.0, model.value_domain, false));
        assert_eq!(image.pixels[6], heat_color(2.0, model.value_domain, false));
        assert_eq!(image.pixels[4], Color32::TRANSPARENT);
    }

    #[test]
    fn test_long_heatmap_axis_is_binned() {
        let last = (HEATMAP_MAX_TEXTURE_SIDE * 2) as f64;
        let (panel, model) = heatmap(
            vec![
                HeatmapCell { bucket: 0.0, address: 0.0, value: 1.0 },
                HeatmapCell { bucket: 1.0, address: 0.0, value: 5.0 },
                HeatmapCell { bucket: last, address: 0.0, value: 3.0 },
            ],
            1.0,
        );

        let image = heatmap_image(&panel, &model);
        assert!(image.size[0] <= HEATMAP_MAX_TEXTURE_SIDE);
        assert_eq!(image.size[1], 1);
        assert_eq!(image.pixels[0], heat_color(5.0, model.value_domain, false));
    }

    #[test]
    fn test_step_interpolation() {
        let points = [[0.0, 1.0], [1.0, 0.5], [2.0, 0.25]];
        assert_eq!(
            interpolate(&points, Interpolation::Step),
            vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.5], [2.0, 0.5], [2.0, 0.25]]
        );
    }

    #[test]
    fn test_basis_keeps_endpoints() {
        let points = [[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]];
        let smooth = interpolate(&points, Interpolation::Basis);
        assert_eq!(smooth.first(), Some(&[0.0, 0.0]));
        assert_eq!(smooth.last(), Some(&[2.0, 0.0]));
        assert!(smooth.iter().all(|p| p[1] <= 1.0));
        assert!(smooth.len() > points.len());
    }

    #[test]
    fn test_single_point_unchanged() {
        assert_eq!(interpolate(&[[1.0, 1.0]], Interpolation::Basis), vec![[1.0, 1.0]]);
    }

    #[test]
    fn test_heat_color_scales() {
        let domain = Domain { min: -2.0, max: 4.0 };
        assert_eq!(heat_color(0.0, domain, true), Color32::WHITE);
        assert_eq!(heat_color(4.0, domain, true), Color32::from_rgb(178, 24, 43));

        let counts = Domain { min: 0.0, max: 10.0 };
        assert_eq!(heat_color(0.0, counts, false), Color32::from_rgb(68, 1, 84));
        assert_eq!(heat_color(10.0, counts, false), Color32::from_rgb(253, 231, 37));
    }
}
