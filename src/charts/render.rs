// src/charts/render.rs
use crate::charts::dispatcher::ChartRenderer;
use crate::charts::series::{Category, RenderRequest};
use crate::charts::spec::PlotStyle;
use crate::error::{AggregationError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

/// Renders charts to bitmap files with plotters; the format follows the
/// output file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

impl ChartRenderer for PlottersRenderer {
    fn render(&self, request: &RenderRequest, output: &Path) -> Result<()> {
        draw_chart(request, output).map_err(|e| AggregationError::Render {
            path: output.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn draw_chart(request: &RenderRequest, output: &Path) -> DrawResult<()> {
    let root = BitMapBackend::new(output, (request.width, request.height)).into_drawing_area();
    root.fill(&WHITE)?;

    match request.style {
        PlotStyle::Line | PlotStyle::Scatter => draw_xy(&root, request)?,
        PlotStyle::Box => draw_boxes(&root, request)?,
    }

    root.present()?;
    Ok(())
}

fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).mix(0.8)
}

// Label of the category sitting at `x`, or the number itself on numeric axes
fn label_at(categories: &[Category], x: f64) -> String {
    if let Some(category) = categories.iter().find(|c| (c.position - x).abs() < 1e-9) {
        return category.label.clone();
    }
    let numeric = categories.iter().all(|c| c.label.parse::<f64>().is_ok());
    if numeric {
        format!("{}", (x * 1000.0).round() / 1000.0)
    } else {
        String::new()
    }
}

fn padded_range(lo: f64, hi: f64, floor_at_zero: bool) -> (f64, f64) {
    let lo = if floor_at_zero { lo.min(0.0) } else { lo };
    let pad = ((hi - lo).abs() * 0.1).max(1e-3);
    (if floor_at_zero { lo } else { lo - pad }, hi + pad)
}

// Pixel offsets inside the plotting area of the legend title and of the
// series labels drawn under it
fn legend_offsets(font: f64) -> ((i32, i32), (i32, i32)) {
    let inset = 12;
    let title_height = (font * 0.8).ceil() as i32;
    ((inset, inset), (inset, inset + title_height + 6))
}

fn draw_legend_title(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    font: f64,
    at: (i32, i32),
) -> DrawResult<()> {
    area.draw(&Text::new(title, at, ("serif", font * 0.8).into_font()))?;
    Ok(())
}

fn draw_xy(root: &DrawingArea<BitMapBackend<'_>, Shift>, request: &RenderRequest) -> DrawResult<()> {
    let font = request.font_size as f64;
    let (lo, hi) = request.value_bounds().unwrap_or((0.0, 1.0));
    let (y_min, y_max) = padded_range(lo, hi, true);

    let positions: Vec<f64> = request.categories.iter().map(|c| c.position).collect();
    let x_lo = positions.iter().copied().fold(f64::INFINITY, f64::min);
    let x_hi = positions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (x_lo, x_hi) = if x_lo.is_finite() { (x_lo, x_hi) } else { (0.0, 1.0) };
    let x_pad = ((x_hi - x_lo) * 0.05).max(0.5);

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, ("serif", font).into_font())
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d((x_lo - x_pad)..(x_hi + x_pad), y_min..y_max)?;

    let formatter = |x: &f64| label_at(&request.categories, *x);
    chart
        .configure_mesh()
        .x_desc(request.x_label.as_str())
        .y_desc(request.y_label.as_str())
        .axis_desc_style(("serif", font).into_font())
        .label_style(("serif", font * 0.75).into_font())
        .x_labels(request.categories.len().max(2))
        .x_label_formatter(&formatter)
        .draw()?;

    for (idx, series) in request.series.iter().enumerate() {
        let color = series_color(idx);
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .filter_map(|p| {
                let x = request.categories.get(p.category)?.position;
                Some((x, p.mean()?))
            })
            .collect();

        let anno = match request.style {
            PlotStyle::Line => chart.draw_series(LineSeries::new(points, color.stroke_width(5)))?,
            _ => {
                let dots: Vec<(f64, f64)> = series
                    .points
                    .iter()
                    .filter_map(|p| request.categories.get(p.category).map(|c| (c.position, p)))
                    .flat_map(|(x, p)| p.values.iter().map(move |v| (x, *v)))
                    .collect();
                chart.draw_series(dots.into_iter().map(|pt| Circle::new(pt, 6, color.filled())))?
            }
        };
        anno.label(series.label.as_str()).legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(4))
        });
    }

    if let Some(title) = &request.legend_title {
        let (title_at, labels_at) = legend_offsets(font);
        draw_legend_title(&chart.plotting_area().strip_coord_spec(), title, font, title_at)?;
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::Coordinate(labels_at.0, labels_at.1))
            .label_font(("serif", font * 0.75).into_font())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

fn draw_boxes(root: &DrawingArea<BitMapBackend<'_>, Shift>, request: &RenderRequest) -> DrawResult<()> {
    let font = request.font_size as f64;
    let (lo, hi) = request.value_bounds().unwrap_or((0.0, 1.0));
    let (y_min, y_max) = padded_range(lo, hi, false);

    // Integer ranges are inclusive once segmented
    let count = request.categories.len().max(1) as u32;
    let last = (count - 1).max(1);

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, ("serif", font).into_font())
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..last).into_segmented(), (y_min as f32)..(y_max as f32))?;

    let formatter = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => request
            .categories
            .get(*i as usize)
            .map(|c| c.label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(request.x_label.as_str())
        .y_desc(request.y_label.as_str())
        .axis_desc_style(("serif", font).into_font())
        .label_style(("serif", font * 0.75).into_font())
        .x_label_formatter(&formatter)
        .draw()?;

    let groups = request.series.len().max(1) as f64;
    let slot = request.width as f64 * 0.75 / (last + 1) as f64;
    let box_width = (slot / groups * 0.7).max(4.0);

    for (idx, series) in request.series.iter().enumerate() {
        let color = series_color(idx);
        let offset = (idx as f64 - (groups - 1.0) / 2.0) * box_width * 1.15;
        let boxes: Vec<_> = series
            .points
            .iter()
            .map(|p| {
                let quartiles = Quartiles::new(&p.values);
                Boxplot::new_vertical(SegmentValue::CenterOf(p.category as u32), &quartiles)
                    .width(box_width as u32)
                    .whisker_width(0.5)
                    .style(&color)
                    .offset(offset)
            })
            .collect();

        chart
            .draw_series(boxes)?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
    }

    if let Some(title) = &request.legend_title {
        let (title_at, labels_at) = legend_offsets(font);
        draw_legend_title(&chart.plotting_area().strip_coord_spec(), title, font, title_at)?;
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::Coordinate(labels_at.0, labels_at.1))
            .label_font(("serif", font * 0.75).into_font())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}
