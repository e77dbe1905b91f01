use std::fmt;

use thiserror::Error;

use crate::data::model::{CellValue, Column, ColumnKind, Dataset};

/// Upper bound on histogram bins for numeric columns.
const MAX_HISTOGRAM_BINS: usize = 50;

/// Number of numeric columns preselected for a pair plot.
const DEFAULT_PAIR_DIMENSIONS: usize = 3;

/// Numeric colour fields with more distinct values than this are cut into
/// this many equal-width ranges.
const COLOR_BUCKETS: usize = 5;

// ---------------------------------------------------------------------------
// Plot kinds and field selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotKind {
    #[default]
    Scatter,
    Line,
    Bar,
    Histogram,
    Box,
    PairPlot,
}

impl PlotKind {
    pub const ALL: [PlotKind; 6] = [
        PlotKind::Scatter,
        PlotKind::Line,
        PlotKind::Bar,
        PlotKind::Histogram,
        PlotKind::Box,
        PlotKind::PairPlot,
    ];

    /// Whether the plot draws a numeric Y field.
    pub fn uses_y(self) -> bool {
        matches!(self, PlotKind::Scatter | PlotKind::Line | PlotKind::Bar | PlotKind::Box)
    }

    /// Whether the plot accepts an optional colour-grouping field.
    pub fn uses_color(self) -> bool {
        matches!(self, PlotKind::Scatter | PlotKind::Bar)
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlotKind::Scatter => "Scatter",
            PlotKind::Line => "Line",
            PlotKind::Bar => "Bar",
            PlotKind::Histogram => "Histogram",
            PlotKind::Box => "Box",
            PlotKind::PairPlot => "Pair Plot",
        };
        write!(f, "{label}")
    }
}

/// Column names the shell may offer for each picker of a plot kind.
/// Pickers a kind does not use are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub color: Vec<String>,
    pub dimensions: Vec<String>,
}

impl FieldOptions {
    pub fn for_kind(kind: PlotKind, dataset: &Dataset) -> Self {
        let all = dataset.column_names();
        let numeric = dataset.numeric_column_names();
        match kind {
            PlotKind::Scatter | PlotKind::Bar => FieldOptions {
                x: all.clone(),
                y: numeric,
                color: all,
                ..Default::default()
            },
            PlotKind::Line => FieldOptions {
                x: all,
                y: numeric,
                ..Default::default()
            },
            PlotKind::Histogram => FieldOptions {
                x: all,
                ..Default::default()
            },
            PlotKind::Box => FieldOptions {
                x: dataset.categorical_column_names(),
                y: numeric,
                ..Default::default()
            },
            PlotKind::PairPlot => FieldOptions {
                dimensions: numeric,
                ..Default::default()
            },
        }
    }
}

/// The user's current picks. `color: None` means no grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSelection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub dimensions: Vec<String>,
}

impl ChartSelection {
    /// First option of every picker, no colour, and the first numeric
    /// columns as pair-plot dimensions whatever the kind, so switching to a
    /// pair plot starts populated.
    pub fn defaults(kind: PlotKind, dataset: &Dataset) -> Self {
        let options = FieldOptions::for_kind(kind, dataset);
        ChartSelection {
            x: options.x.first().cloned(),
            y: options.y.first().cloned(),
            color: None,
            dimensions: dataset
                .numeric_column_names()
                .into_iter()
                .take(DEFAULT_PAIR_DIMENSIONS)
                .collect(),
        }
    }

    /// Keep picks that are still offered for `kind`; fall back to the
    /// default for the rest.
    pub fn reconcile(&mut self, kind: PlotKind, dataset: &Dataset) {
        fn offered(pick: &Option<String>, options: &[String]) -> bool {
            pick.as_ref().is_some_and(|p| options.contains(p))
        }

        let options = FieldOptions::for_kind(kind, dataset);
        let fallback = Self::defaults(kind, dataset);
        if !offered(&self.x, &options.x) {
            self.x = fallback.x;
        }
        if !offered(&self.y, &options.y) {
            self.y = fallback.y;
        }
        if self.color.is_some() && !offered(&self.color, &options.color) {
            self.color = None;
        }
        let numeric = dataset.numeric_column_names();
        self.dimensions.retain(|d| numeric.contains(d));
    }

    /// Check or uncheck a pair-plot dimension. The result follows the order
    /// of `offered`, not the order of clicks.
    pub fn toggle_dimension(&mut self, name: &str, checked: bool, offered: &[String]) {
        self.dimensions = offered
            .iter()
            .filter(|d| {
                if d.as_str() == name {
                    checked
                } else {
                    self.dimensions.contains(d)
                }
            })
            .cloned()
            .collect();
    }
}

// ---------------------------------------------------------------------------
// Render-ready chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("no {0} field selected")]
    MissingField(&'static str),
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{0}' is not categorical")]
    NotCategorical(String),
    #[error("select at least one dimension")]
    NoDimensions,
}

/// An axis. Categorical axes place category `i` at position `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub label: String,
    pub categories: Option<Vec<String>>,
}

impl Axis {
    /// Label for a tick at `position`, if the axis is categorical and the
    /// position lands on a category.
    pub fn category_at(&self, position: f64) -> Option<&str> {
        let categories = self.categories.as_ref()?;
        let rounded = position.round();
        if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
            return None;
        }
        categories.get(rounded as usize).map(String::as_str)
    }
}

/// Points sharing one colour group (`group: None` when ungrouped).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub group: Option<CellValue>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub center: f64,
    pub width: f64,
    pub count: usize,
}

/// Tukey box for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub position: f64,
    pub label: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Scatter {
        x_axis: Axis,
        y_label: String,
        series: Vec<Series>,
    },
    Line {
        x_axis: Axis,
        y_label: String,
        series: Series,
    },
    /// Bars are `[position, height]`; later series stack on earlier ones.
    Bar {
        x_axis: Axis,
        y_label: String,
        series: Vec<Series>,
    },
    Histogram {
        x_axis: Axis,
        bins: Vec<HistogramBin>,
    },
    Box {
        x_axis: Axis,
        y_label: String,
        boxes: Vec<BoxStats>,
    },
    /// `cells[row][col]` plots `dimensions[col]` (x) against `dimensions[row]` (y).
    PairPlot {
        dimensions: Vec<String>,
        cells: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

/// Validate `selection` for `kind` and compute what the plot draws.
pub fn build_chart(
    kind: PlotKind,
    selection: &ChartSelection,
    dataset: &Dataset,
) -> Result<Chart, ChartError> {
    match kind {
        PlotKind::Scatter | PlotKind::Bar => {
            let x = field(dataset, selection.x.as_deref(), "X")?;
            let y = numeric(field(dataset, selection.y.as_deref(), "Y")?)?;
            let color = selection
                .color
                .as_deref()
                .map(|name| field(dataset, Some(name), "color"))
                .transpose()?;
            let (x_axis, xs) = positions(x);
            let ys: Vec<Option<f64>> = y.values.iter().map(CellValue::as_f64).collect();
            let series = match color {
                Some(col) => {
                    let (keys, order) = color_keys(col);
                    let mut series = grouped_points(&xs, &ys, Some(&keys));
                    if !order.is_empty() {
                        series.sort_by_key(|s| {
                            s.group.as_ref().and_then(|g| order.iter().position(|k| k == g))
                        });
                    }
                    series
                }
                None => grouped_points(&xs, &ys, None),
            };

            if kind == PlotKind::Scatter {
                Ok(Chart::Scatter {
                    x_axis,
                    y_label: y.name.clone(),
                    series,
                })
            } else {
                Ok(Chart::Bar {
                    x_axis,
                    y_label: y.name.clone(),
                    series: series.into_iter().map(sum_by_position).collect(),
                })
            }
        }
        PlotKind::Line => {
            let x = field(dataset, selection.x.as_deref(), "X")?;
            let y = numeric(field(dataset, selection.y.as_deref(), "Y")?)?;
            let (x_axis, xs) = positions(x);
            let ys: Vec<Option<f64>> = y.values.iter().map(CellValue::as_f64).collect();
            let mut series = grouped_points(&xs, &ys, None);
            Ok(Chart::Line {
                x_axis,
                y_label: y.name.clone(),
                series: series.pop().unwrap_or(Series {
                    group: None,
                    points: Vec::new(),
                }),
            })
        }
        PlotKind::Histogram => {
            let x = field(dataset, selection.x.as_deref(), "X")?;
            let (x_axis, xs) = positions(x);
            let bins = if x_axis.categories.is_some() {
                category_counts(&xs)
            } else {
                numeric_bins(&xs.into_iter().flatten().collect::<Vec<_>>())
            };
            Ok(Chart::Histogram { x_axis, bins })
        }
        PlotKind::Box => {
            let x = field(dataset, selection.x.as_deref(), "X")?;
            if x.kind != ColumnKind::Categorical {
                return Err(ChartError::NotCategorical(x.name.clone()));
            }
            let y = numeric(field(dataset, selection.y.as_deref(), "Y")?)?;
            let (x_axis, xs) = positions(x);
            let labels = x_axis.categories.clone().unwrap_or_default();
            let boxes = labels
                .iter()
                .enumerate()
                .filter_map(|(idx, label)| {
                    let values: Vec<f64> = xs
                        .iter()
                        .zip(&y.values)
                        .filter(|(pos, _)| **pos == Some(idx as f64))
                        .filter_map(|(_, v)| v.as_f64())
                        .collect();
                    box_stats(idx as f64, label, values)
                })
                .collect();
            Ok(Chart::Box {
                x_axis,
                y_label: y.name.clone(),
                boxes,
            })
        }
        PlotKind::PairPlot => {
            if selection.dimensions.is_empty() {
                return Err(ChartError::NoDimensions);
            }
            let columns: Vec<Vec<Option<f64>>> = selection
                .dimensions
                .iter()
                .map(|name| -> Result<Vec<Option<f64>>, ChartError> {
                    let col = numeric(field(dataset, Some(name.as_str()), "dimension")?)?;
                    Ok(col.values.iter().map(CellValue::as_f64).collect())
                })
                .collect::<Result<_, ChartError>>()?;

            let cells: Vec<Vec<Vec<[f64; 2]>>> = columns
                .iter()
                .map(|ys| {
                    columns
                        .iter()
                        .map(|xs| {
                            xs.iter()
                                .zip(ys)
                                .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
                                .collect()
                        })
                        .collect()
                })
                .collect();
            Ok(Chart::PairPlot {
                dimensions: selection.dimensions.clone(),
                cells,
            })
        }
    }
}

// -- helpers --

fn field<'a>(
    dataset: &'a Dataset,
    name: Option<&str>,
    role: &'static str,
) -> Result<&'a Column, ChartError> {
    let name = name.ok_or(ChartError::MissingField(role))?;
    dataset
        .column(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
}

fn numeric(col: &Column) -> Result<&Column, ChartError> {
    if col.is_numeric() {
        Ok(col)
    } else {
        Err(ChartError::NotNumeric(col.name.clone()))
    }
}

/// Map a column onto plot coordinates. Categorical columns get one integer
/// position per distinct value, in order of first appearance.
fn positions(col: &Column) -> (Axis, Vec<Option<f64>>) {
    if col.is_numeric() {
        let axis = Axis {
            label: col.name.clone(),
            categories: None,
        };
        return (axis, col.values.iter().map(CellValue::as_f64).collect());
    }

    let mut categories: Vec<String> = Vec::new();
    let xs = col
        .values
        .iter()
        .map(|v| {
            if v.is_null() {
                return None;
            }
            let label = v.to_string();
            let idx = match categories.iter().position(|c| *c == label) {
                Some(idx) => idx,
                None => {
                    categories.push(label);
                    categories.len() - 1
                }
            };
            Some(idx as f64)
        })
        .collect();
    let axis = Axis {
        label: col.name.clone(),
        categories: Some(categories),
    };
    (axis, xs)
}

/// Colour key of every row, plus the keys in ascending order when the column
/// is numeric. Numeric columns with more than [`COLOR_BUCKETS`] distinct
/// values are cut into equal-width ranges labelled `low to high`.
fn color_keys(col: &Column) -> (Vec<CellValue>, Vec<CellValue>) {
    if !col.is_numeric() {
        return (col.values.clone(), Vec::new());
    }
    let mut distinct: Vec<f64> = col.values.iter().filter_map(CellValue::as_f64).collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();

    if distinct.len() <= COLOR_BUCKETS {
        let mut order: Vec<CellValue> = Vec::new();
        for v in &col.values {
            if !v.is_null() && !order.contains(v) {
                order.push(v.clone());
            }
        }
        order.sort_by(|a, b| a.as_f64().unwrap_or(0.0).total_cmp(&b.as_f64().unwrap_or(0.0)));
        return (col.values.clone(), order);
    }

    let (min, max) = (distinct[0], distinct[distinct.len() - 1]);
    let width = (max - min) / COLOR_BUCKETS as f64;
    let labels: Vec<CellValue> = (0..COLOR_BUCKETS)
        .map(|i| {
            let low = min + width * i as f64;
            CellValue::String(format!("{low:.2} to {:.2}", low + width))
        })
        .collect();
    let keys = col
        .values
        .iter()
        .map(|v| match v.as_f64() {
            Some(v) => {
                let idx = (((v - min) / width).floor() as usize).min(COLOR_BUCKETS - 1);
                labels[idx].clone()
            }
            None => CellValue::Null,
        })
        .collect();
    (keys, labels)
}

/// Zip coordinates into points, one series per distinct colour key in
/// order of first appearance. Rows with a missing coordinate are dropped.
fn grouped_points(xs: &[Option<f64>], ys: &[Option<f64>], color: Option<&[CellValue]>) -> Vec<Series> {
    let Some(color) = color else {
        let points = xs
            .iter()
            .zip(ys)
            .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
            .collect();
        return vec![Series {
            group: None,
            points,
        }];
    };

    let mut series: Vec<Series> = Vec::new();
    for ((x, y), group) in xs.iter().zip(ys).zip(color) {
        let (Some(x), Some(y)) = (x, y) else {
            continue;
        };
        let idx = match series.iter().position(|s| s.group.as_ref() == Some(group)) {
            Some(idx) => idx,
            None => {
                series.push(Series {
                    group: Some(group.clone()),
                    points: Vec::new(),
                });
                series.len() - 1
            }
        };
        series[idx].points.push([*x, *y]);
    }
    series
}

/// Collapse points sharing an x position into one bar holding their sum.
fn sum_by_position(series: Series) -> Series {
    let mut bars: Vec<[f64; 2]> = Vec::new();
    for [x, y] in series.points {
        match bars.iter_mut().find(|b| b[0] == x) {
            Some(bar) => bar[1] += y,
            None => bars.push([x, y]),
        }
    }
    Series {
        group: series.group,
        points: bars,
    }
}

fn category_counts(xs: &[Option<f64>]) -> Vec<HistogramBin> {
    let mut bins: Vec<HistogramBin> = Vec::new();
    for x in xs.iter().flatten() {
        match bins.iter_mut().find(|b| b.center == *x) {
            Some(bin) => bin.count += 1,
            None => bins.push(HistogramBin {
                center: *x,
                width: 0.8,
                count: 1,
            }),
        }
    }
    bins
}

/// Equal-width bins over the value range, `ceil(sqrt(n))` of them.
fn numeric_bins(values: &[f64]) -> Vec<HistogramBin> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if values.is_empty() {
        return Vec::new();
    }
    if max - min <= f64::EPSILON {
        return vec![HistogramBin {
            center: min,
            width: 1.0,
            count: values.len(),
        }];
    }

    let n_bins = ((values.len() as f64).sqrt().ceil() as usize).clamp(1, MAX_HISTOGRAM_BINS);
    let width = (max - min) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            center: min + width * (i as f64 + 0.5),
            width,
            count,
        })
        .collect()
}

/// Quartiles by linear interpolation; whiskers reach the furthest values
/// within 1.5 IQR of the box.
fn box_stats(position: f64, label: &str, mut values: Vec<f64>) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let median = quantile(&values, 0.5);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = || values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside().fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxStats {
        position,
        label: label.to_string(),
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// `p`-quantile of sorted, non-empty `values`.
fn quantile(values: &[f64], p: f64) -> f64 {
    let rank = p * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (rank - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example;
    use crate::data::loader::load_text;

    fn sample() -> Dataset {
        load_text("g,v,w,flag\na,1,10,true\nb,2,20,false\na,3,,true\nc,4,40,false\n").unwrap()
    }

    fn select(x: &str, y: &str) -> ChartSelection {
        ChartSelection {
            x: Some(x.into()),
            y: Some(y.into()),
            ..Default::default()
        }
    }

    #[test]
    fn options_follow_column_kinds() {
        let ds = sample();
        let scatter = FieldOptions::for_kind(PlotKind::Scatter, &ds);
        assert_eq!(scatter.x, vec!["g", "v", "w", "flag"]);
        assert_eq!(scatter.y, vec!["v", "w"]);
        assert_eq!(scatter.color, scatter.x);

        let line = FieldOptions::for_kind(PlotKind::Line, &ds);
        assert!(line.color.is_empty());

        let boxed = FieldOptions::for_kind(PlotKind::Box, &ds);
        assert_eq!(boxed.x, vec!["g", "flag"]);

        let hist = FieldOptions::for_kind(PlotKind::Histogram, &ds);
        assert!(hist.y.is_empty());

        let pair = FieldOptions::for_kind(PlotKind::PairPlot, &ds);
        assert_eq!(pair.dimensions, vec!["v", "w"]);
        assert!(pair.x.is_empty());
    }

    #[test]
    fn pair_plot_defaults_to_first_three_numeric_columns() {
        let ds = load_text("a,b,c,d,e\n1,2,3,4,x\n").unwrap();
        let sel = ChartSelection::defaults(PlotKind::PairPlot, &ds);
        assert_eq!(sel.dimensions, vec!["a", "b", "c"]);
        assert_eq!(sel.x, None);
    }

    #[test]
    fn reconcile_keeps_valid_picks() {
        let ds = sample();
        let mut sel = ChartSelection {
            x: Some("v".into()),
            y: Some("w".into()),
            color: Some("g".into()),
            dimensions: vec!["w".into(), "g".into()],
        };
        sel.reconcile(PlotKind::Box, &ds);
        assert_eq!(sel.x.as_deref(), Some("g"));
        assert_eq!(sel.y.as_deref(), Some("w"));
        assert_eq!(sel.color, None);
        assert_eq!(sel.dimensions, vec!["w"]);
    }

    #[test]
    fn scatter_groups_by_color_and_skips_nulls() {
        let ds = sample();
        let sel = ChartSelection {
            color: Some("g".into()),
            ..select("v", "w")
        };
        let Chart::Scatter { series, y_label, .. } = build_chart(PlotKind::Scatter, &sel, &ds).unwrap() else {
            panic!("expected scatter");
        };
        assert_eq!(y_label, "w");
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].group, Some(CellValue::String("a".into())));
        assert_eq!(series[0].points, vec![[1.0, 10.0]]);
        assert_eq!(series[2].points, vec![[4.0, 40.0]]);
    }

    #[test]
    fn numeric_color_with_few_values_keeps_them_in_order() {
        let ds = load_text("x,y,c\n1,1,30\n2,2,10\n3,3,\n4,4,30\n").unwrap();
        let sel = ChartSelection {
            color: Some("c".into()),
            ..select("x", "y")
        };
        let Chart::Scatter { series, .. } = build_chart(PlotKind::Scatter, &sel, &ds).unwrap() else {
            panic!("expected scatter");
        };
        let groups: Vec<Option<CellValue>> = series.iter().map(|s| s.group.clone()).collect();
        assert_eq!(
            groups,
            vec![
                Some(CellValue::Null),
                Some(CellValue::Integer(10)),
                Some(CellValue::Integer(30)),
            ]
        );
        assert_eq!(series[2].points, vec![[1.0, 1.0], [4.0, 4.0]]);
    }

    #[test]
    fn numeric_color_with_many_values_is_bucketed() {
        let text: String = std::iter::once("x,y,c".to_string())
            .chain((0..=10).map(|i| format!("{i},{i},{i}")))
            .collect::<Vec<_>>()
            .join("\n");
        let ds = load_text(&text).unwrap();
        let sel = ChartSelection {
            color: Some("c".into()),
            ..select("x", "y")
        };
        let Chart::Bar { series, .. } = build_chart(PlotKind::Bar, &sel, &ds).unwrap() else {
            panic!("expected bar");
        };
        let labels: Vec<String> = series
            .iter()
            .map(|s| s.group.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["0.00 to 2.00", "2.00 to 4.00", "4.00 to 6.00", "6.00 to 8.00", "8.00 to 10.00"]
        );
        assert_eq!(series[4].points.len(), 3);
        assert_eq!(series.iter().map(|s| s.points.len()).sum::<usize>(), 11);
    }

    #[test]
    fn toggled_dimensions_follow_column_order() {
        let offered: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let mut sel = ChartSelection {
            dimensions: offered.clone(),
            ..Default::default()
        };
        sel.toggle_dimension("a", false, &offered);
        assert_eq!(sel.dimensions, vec!["b", "c"]);
        sel.toggle_dimension("a", true, &offered);
        assert_eq!(sel.dimensions, vec!["a", "b", "c"]);
        sel.toggle_dimension("z", true, &offered);
        assert_eq!(sel.dimensions, vec!["a", "b", "c"]);
    }

    #[test]
    fn categorical_x_maps_to_positions() {
        let ds = sample();
        let Chart::Line { x_axis, series, .. } = build_chart(PlotKind::Line, &select("g", "v"), &ds).unwrap() else {
            panic!("expected line");
        };
        assert_eq!(x_axis.categories, Some(vec!["a".into(), "b".into(), "c".into()]));
        assert_eq!(series.points, vec![[0.0, 1.0], [1.0, 2.0], [0.0, 3.0], [2.0, 4.0]]);
        assert_eq!(x_axis.category_at(1.0), Some("b"));
        assert_eq!(x_axis.category_at(1.5), None);
        assert_eq!(x_axis.category_at(7.0), None);
    }

    #[test]
    fn bar_sums_per_category() {
        let ds = sample();
        let Chart::Bar { series, .. } = build_chart(PlotKind::Bar, &select("g", "v"), &ds).unwrap() else {
            panic!("expected bar");
        };
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![[0.0, 4.0], [1.0, 2.0], [2.0, 4.0]]);
    }

    #[test]
    fn histogram_bins_numeric_and_counts_categories() {
        let ds = sample();
        let sel = ChartSelection {
            x: Some("v".into()),
            ..Default::default()
        };
        let Chart::Histogram { bins, .. } = build_chart(PlotKind::Histogram, &sel, &ds).unwrap() else {
            panic!("expected histogram");
        };
        assert_eq!(bins.len(), 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);

        let sel = ChartSelection {
            x: Some("g".into()),
            ..Default::default()
        };
        let Chart::Histogram { bins, .. } = build_chart(PlotKind::Histogram, &sel, &ds).unwrap() else {
            panic!("expected histogram");
        };
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 1, 1]);
    }

    #[test]
    fn box_plot_quartiles() {
        let ds = load_text("g,v\na,1\na,2\na,3\na,4\na,100\nb,5\n").unwrap();
        let Chart::Box { boxes, .. } = build_chart(PlotKind::Box, &select("g", "v"), &ds).unwrap() else {
            panic!("expected box");
        };
        assert_eq!(boxes.len(), 2);
        let a = &boxes[0];
        assert_eq!((a.q1, a.median, a.q3), (2.0, 3.0, 4.0));
        assert_eq!((a.lower_whisker, a.upper_whisker), (1.0, 4.0));
        assert_eq!(a.outliers, vec![100.0]);
        assert_eq!(boxes[1].label, "b");
        assert_eq!(boxes[1].median, 5.0);
    }

    #[test]
    fn invalid_selections_are_reported() {
        let ds = sample();
        assert_eq!(
            build_chart(PlotKind::Scatter, &ChartSelection::default(), &ds),
            Err(ChartError::MissingField("X"))
        );
        assert_eq!(
            build_chart(PlotKind::Scatter, &select("g", "g"), &ds),
            Err(ChartError::NotNumeric("g".into()))
        );
        assert_eq!(
            build_chart(PlotKind::Line, &select("nope", "v"), &ds),
            Err(ChartError::UnknownColumn("nope".into()))
        );
        assert_eq!(
            build_chart(PlotKind::Box, &select("v", "w"), &ds),
            Err(ChartError::NotCategorical("v".into()))
        );
        assert_eq!(
            build_chart(PlotKind::PairPlot, &ChartSelection::default(), &ds),
            Err(ChartError::NoDimensions)
        );
    }

    #[test]
    fn pair_plot_over_tips() {
        let ds = example::tips();
        let sel = ChartSelection::defaults(PlotKind::PairPlot, &ds);
        let Chart::PairPlot { dimensions, cells } = build_chart(PlotKind::PairPlot, &sel, &ds).unwrap() else {
            panic!("expected pair plot");
        };
        assert_eq!(dimensions, vec!["total_bill", "tip", "size"]);
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|row| row.len() == 3));
        assert_eq!(cells[1][0].len(), ds.len());
        assert_eq!(cells[1][0][0], [16.99, 1.01]);
    }
}
