// src/charts/series.rs
use crate::aggregation::discovery::ConditionValue;
use crate::aggregation::table::{DegreeTable, RunTable, TableRecord, WinTable};
use crate::charts::spec::{ChartSpec, PlotStyle};
use crate::config::ChartSettings;

pub const LEGEND_TITLE: &str = "Defence Strategies";

/// One x-axis position, labelled with its condition value
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub label: String,
    pub position: f64,
}

/// Observations of one series at one category
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub category: usize,
    pub values: Vec<f64>,
}

impl SeriesPoint {
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

/// Everything the renderer needs; carries no reference to the source tables
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: Option<String>,
    pub style: PlotStyle,
    pub categories: Vec<Category>,
    pub series: Vec<Series>,
    pub font_size: u32,
    pub width: u32,
    pub height: u32,
}

impl RenderRequest {
    /// Labels shown in the legend, one per series
    pub fn legend_labels(&self) -> Vec<&str> {
        if self.legend_title.is_none() {
            return Vec::new();
        }
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    /// Smallest and largest plotted value, or None when nothing is plotted
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .flat_map(|p| p.values.iter().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Replace hue names with display labels by position.
///
/// Categories beyond the supplied labels keep their own names.
pub fn relabel_hues(hues: &[String], labels: &[String]) -> Vec<String> {
    hues.iter()
        .enumerate()
        .map(|(i, hue)| labels.get(i).cloned().unwrap_or_else(|| hue.clone()))
        .collect()
}

/// Hue categories in encounter order, or numerically sorted when all are numbers
pub fn hue_order<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hues: Vec<String> = Vec::new();
    for value in values {
        if !hues.iter().any(|h| h == value) {
            hues.push(value.to_string());
        }
    }

    let numeric: Option<Vec<f64>> = hues.iter().map(|h| h.parse::<f64>().ok()).collect();
    if let Some(numbers) = numeric {
        let mut paired: Vec<(f64, String)> = numbers.into_iter().zip(hues).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));
        hues = paired.into_iter().map(|(_, h)| h).collect();
    }

    hues
}

/// Sorted distinct conditions of a table and their axis positions.
///
/// Numeric conditions sit at their value; as soon as one is a label every
/// condition is placed at its index instead.
pub fn condition_axis<R: TableRecord>(rows: &[R]) -> (Vec<ConditionValue>, Vec<Category>) {
    let mut values: Vec<ConditionValue> = Vec::new();
    for value in rows.iter().filter_map(|r| r.condition()) {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
    values.sort();

    let all_numeric = values.iter().all(|v| v.as_f64().is_some());
    let categories = values
        .iter()
        .enumerate()
        .map(|(i, v)| Category {
            label: v.raw().to_string(),
            position: if all_numeric {
                v.as_f64().unwrap_or(i as f64)
            } else {
                i as f64
            },
        })
        .collect();

    (values, categories)
}

fn grouped_series<R, H, V>(
    rows: &[R],
    conditions: &[ConditionValue],
    hues: &[String],
    hue_of: H,
    value_of: V,
) -> Vec<Vec<SeriesPoint>>
where
    R: TableRecord,
    H: Fn(&R) -> &str,
    V: Fn(&R) -> f64,
{
    hues.iter()
        .map(|hue| {
            conditions
                .iter()
                .enumerate()
                .filter_map(|(idx, condition)| {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter(|r| hue_of(*r) == hue.as_str() && r.condition() == Some(condition))
                        .map(&value_of)
                        .collect();
                    if values.is_empty() {
                        None
                    } else {
                        Some(SeriesPoint {
                            category: idx,
                            values,
                        })
                    }
                })
                .collect()
        })
        .collect()
}

fn assemble(
    settings: &ChartSettings,
    spec: &ChartSpec,
    title: String,
    y_label: &str,
    categories: Vec<Category>,
    labels: Vec<String>,
    points: Vec<Vec<SeriesPoint>>,
    legend: bool,
) -> RenderRequest {
    RenderRequest {
        title,
        x_label: settings.axis_label(),
        y_label: y_label.to_string(),
        legend_title: legend.then(|| LEGEND_TITLE.to_string()),
        style: spec.style,
        categories,
        series: labels
            .into_iter()
            .zip(points)
            .map(|(label, points)| Series { label, points })
            .collect(),
        font_size: settings.font_size,
        width: settings.width,
        height: settings.height,
    }
}

fn allocation_suffix(spec: &ChartSpec) -> String {
    spec.allocation
        .map(|a| format!(" ({} protection allocation)", a))
        .unwrap_or_default()
}

/// Win counts by condition, one series per defence strategy
pub fn win_request(table: &WinTable, spec: &ChartSpec, settings: &ChartSettings) -> RenderRequest {
    let rows = table.rows();
    let (conditions, categories) = condition_axis(rows);
    let hues = hue_order(rows.iter().map(|r| r.defence_strategy.as_str()));
    let points = grouped_series(
        rows,
        &conditions,
        &hues,
        |r| r.defence_strategy.as_str(),
        |r| r.wins,
    );

    assemble(
        settings,
        spec,
        format!("Winners for each defence strategy{}", allocation_suffix(spec)),
        "Number of wins",
        categories,
        relabel_hues(&hues, &settings.defence_labels),
        points,
        true,
    )
}

/// Infected share of the graph by condition, one series per strategy
pub fn infection_request(
    table: &RunTable,
    spec: &ChartSpec,
    settings: &ChartSettings,
) -> RenderRequest {
    let rows = table.rows();
    let vertex_count = settings.vertex_count.max(1) as f64;
    let (conditions, categories) = condition_axis(rows);
    let hues = hue_order(rows.iter().map(|r| r.strategy.as_str()));
    let points = grouped_series(
        rows,
        &conditions,
        &hues,
        |r| r.strategy.as_str(),
        |r| r.infected / vertex_count,
    );

    assemble(
        settings,
        spec,
        format!("Percentage infections by defence{}", allocation_suffix(spec)),
        "Percent of graph infected",
        categories,
        relabel_hues(&hues, &settings.defence_labels),
        points,
        true,
    )
}

/// Degree distribution per condition as a single series
pub fn degree_request(
    table: &DegreeTable,
    spec: &ChartSpec,
    settings: &ChartSettings,
) -> RenderRequest {
    let rows = table.rows();
    let (conditions, categories) = condition_axis(rows);
    let hues = vec!["Degree".to_string()];
    let points = grouped_series(rows, &conditions, &hues, |_| "Degree", |r| r.degree as f64);

    assemble(
        settings,
        spec,
        format!("Degree distribution ({})", spec.value_range),
        "Degree",
        categories,
        hues,
        points,
        false,
    )
}
