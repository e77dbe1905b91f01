use eframe::egui::{self, Color32, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, PlotUi, Points,
};

use crate::chart::{Axis, Chart, Series, build_chart};
use crate::color::ColorMap;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 480.0;
const MIN_PAIR_CELL: f32 = 120.0;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render the configured chart, or a hint when nothing is loaded.
pub fn chart_view(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(
                    "Please upload a file (File → Open…), enter data manually, or use the example dataset.",
                );
            });
            return;
        }
    };

    ui.heading(format!("{} Plot", state.plot_kind));
    if dataset.is_empty() {
        ui.label("The dataset has no rows to plot.");
    }
    match build_chart(state.plot_kind, &state.selection, dataset) {
        Ok(chart) => draw_chart(ui, &chart),
        Err(e) => {
            log::warn!("Chart not drawn: {e}");
            ui.label(egui::RichText::new(format!("Error generating plot: {e}")).color(Color32::RED));
        }
    }
}

fn draw_chart(ui: &mut Ui, chart: &Chart) {
    match chart {
        Chart::Scatter {
            x_axis,
            y_label,
            series,
        } => {
            let colors = group_colors(series);
            show_plot(ui, "scatter", x_axis, y_label, |plot_ui| {
                for s in series {
                    plot_ui.points(
                        Points::new(to_points(&s.points))
                            .radius(3.0)
                            .color(colors.color_for(s.group.as_ref()))
                            .name(series_name(s, y_label)),
                    );
                }
            });
        }
        Chart::Line {
            x_axis,
            y_label,
            series,
        } => {
            show_plot(ui, "line", x_axis, y_label, |plot_ui| {
                plot_ui.line(
                    Line::new(to_points(&series.points))
                        .name(y_label)
                        .color(Color32::LIGHT_BLUE)
                        .width(1.5),
                );
            });
        }
        Chart::Bar {
            x_axis,
            y_label,
            series,
        } => {
            let colors = group_colors(series);
            let width = bar_width(series.iter().flat_map(|s| s.points.iter().map(|p| p[0])));
            let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());
            for s in series {
                let bars = s.points.iter().map(|&[x, y]| Bar::new(x, y).width(width)).collect();
                let below: Vec<&BarChart> = charts.iter().collect();
                let chart = BarChart::new(bars)
                    .name(series_name(s, y_label))
                    .color(colors.color_for(s.group.as_ref()))
                    .stack_on(&below);
                charts.push(chart);
            }
            show_plot(ui, "bar", x_axis, y_label, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
        }
        Chart::Histogram { x_axis, bins } => {
            let bars = bins
                .iter()
                .map(|b| Bar::new(b.center, b.count as f64).width(b.width))
                .collect();
            show_plot(ui, "histogram", x_axis, "count", |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("count").color(Color32::LIGHT_BLUE));
            });
        }
        Chart::Box {
            x_axis,
            y_label,
            boxes,
        } => {
            let elems = boxes
                .iter()
                .map(|b| {
                    BoxElem::new(
                        b.position,
                        BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                    )
                    .name(&b.label)
                    .box_width(0.5)
                })
                .collect();
            let outliers: Vec<[f64; 2]> = boxes
                .iter()
                .flat_map(|b| b.outliers.iter().map(move |&v| [b.position, v]))
                .collect();
            show_plot(ui, "box", x_axis, y_label, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(elems).name(y_label).color(Color32::LIGHT_BLUE));
                plot_ui.points(
                    Points::new(to_points(&outliers))
                        .radius(2.5)
                        .color(Color32::LIGHT_BLUE)
                        .name("outliers"),
                );
            });
        }
        Chart::PairPlot { dimensions, cells } => draw_pair_plot(ui, dimensions, cells),
    }
}

/// Grid of small scatter plots, one per (row, column) pair of dimensions.
fn draw_pair_plot(ui: &mut Ui, dimensions: &[String], cells: &[Vec<Vec<[f64; 2]>>]) {
    let n = dimensions.len();
    let spacing = ui.spacing().item_spacing.x;
    let size = ((ui.available_width() - spacing * n as f32) / n as f32).max(MIN_PAIR_CELL);

    egui::ScrollArea::both().id_salt("pair_plot").show(ui, |ui: &mut Ui| {
        egui::Grid::new("pair_grid").show(ui, |ui: &mut Ui| {
            for (row, row_cells) in cells.iter().enumerate() {
                for (col, points) in row_cells.iter().enumerate() {
                    let mut plot = Plot::new(("pair", row, col))
                        .width(size)
                        .height(size)
                        .allow_scroll(false)
                        .show_x(false)
                        .show_y(false);
                    if row + 1 == n {
                        plot = plot.x_axis_label(dimensions[col].clone());
                    }
                    if col == 0 {
                        plot = plot.y_axis_label(dimensions[row].clone());
                    }
                    plot.show(ui, |plot_ui| {
                        plot_ui.points(
                            Points::new(to_points(points))
                                .radius(1.5)
                                .color(Color32::LIGHT_BLUE),
                        );
                    });
                }
                ui.end_row();
            }
        });
    });
}

// -- helpers --

/// A zoomable plot with axis labels; categorical x axes show their labels
/// at integer ticks.
fn show_plot(ui: &mut Ui, id: &str, x_axis: &Axis, y_label: &str, add: impl FnOnce(&mut PlotUi)) {
    let mut plot = Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(x_axis.label.clone())
        .y_axis_label(y_label.to_string())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);

    if x_axis.categories.is_some() {
        let axis = x_axis.clone();
        plot = plot.x_axis_formatter(move |mark, _range| {
            axis.category_at(mark.value)
                .map(str::to_string)
                .unwrap_or_default()
        });
    }
    plot.show(ui, add);
}

fn to_points(points: &[[f64; 2]]) -> PlotPoints<'static> {
    points.iter().copied().collect()
}

fn group_colors(series: &[Series]) -> ColorMap {
    ColorMap::new(series.iter().filter_map(|s| s.group.as_ref()))
}

fn series_name(series: &Series, fallback: &str) -> String {
    series
        .group
        .as_ref()
        .map_or_else(|| fallback.to_string(), |g| g.to_string())
}

/// 80% of the smallest gap between distinct bar positions.
fn bar_width(positions: impl Iterator<Item = f64>) -> f64 {
    let mut xs: Vec<f64> = positions.collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    xs.windows(2)
        .map(|w| w[1] - w[0])
        .fold(None, |min: Option<f64>, gap| Some(min.map_or(gap, |m| m.min(gap))))
        .unwrap_or(1.0)
        * 0.8
}
