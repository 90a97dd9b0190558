// src/graph/draw.rs
use crate::aggregation::loader::matching_files;
use crate::error::{AggregationError, Result};
use crate::graph::layout::{spring_layout, LayoutParams};
use crate::graph::matrix::AdjacencyMatrix;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct GraphStyle {
    pub node_color: RGBColor,
    pub edge_color: RGBColor,
    pub node_radius: u32,
    pub edge_width: u32,
    pub with_labels: bool,
    pub font_size: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            node_color: RGBColor(0x00, 0x7a, 0x5a),
            edge_color: RGBColor(0x1f, 0x4d, 0x3c),
            node_radius: 14,
            edge_width: 2,
            with_labels: true,
            font_size: 14,
            width: 1400,
            height: 1000,
        }
    }
}

/// Draw `graph` with a spring layout into `output`
pub fn draw_graph(graph: &AdjacencyMatrix, output: &Path, style: &GraphStyle) -> Result<()> {
    let positions = spring_layout(graph, LayoutParams::default());
    draw_positions(graph, &positions, output, style).map_err(|e| AggregationError::Render {
        path: output.to_path_buf(),
        message: e.to_string(),
    })
}

fn draw_positions(
    graph: &AdjacencyMatrix,
    positions: &[(f64, f64)],
    output: &Path,
    style: &GraphStyle,
) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(output, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .build_cartesian_2d(-1.1f64..1.1f64, -1.1f64..1.1f64)?;

    chart.draw_series(graph.edges().into_iter().filter(|(a, b)| a != b).map(|(a, b)| {
        PathElement::new(
            vec![positions[a], positions[b]],
            style.edge_color.stroke_width(style.edge_width),
        )
    }))?;

    chart.draw_series(
        positions
            .iter()
            .map(|p| Circle::new(*p, style.node_radius, style.node_color.filled())),
    )?;

    if style.with_labels {
        let font = ("sans-serif", style.font_size as f64).into_font().color(&WHITE);
        chart.draw_series(positions.iter().enumerate().map(|(i, p)| {
            Text::new(
                i.to_string(),
                *p,
                font.pos(Pos::new(HPos::Center, VPos::Center)),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}

/// Image path written next to an adjacency-matrix file
pub fn image_path_for(source: &Path) -> PathBuf {
    source.with_extension("jpg")
}

/// Read an adjacency-matrix CSV and draw it to `{stem}.jpg` beside it
pub fn draw_graph_from_file(source: &Path, style: &GraphStyle) -> Result<PathBuf> {
    let graph = AdjacencyMatrix::from_csv(source)?;
    let output = image_path_for(source);
    draw_graph(&graph, &output, style)?;
    info!(
        "Drew {} vertices from {} to {}",
        graph.size(),
        source.display(),
        output.display()
    );
    Ok(output)
}

/// Draw every `*.csv` matrix directly inside `dir`, continuing past failures
pub fn draw_graphs_in_dir(dir: &Path, style: &GraphStyle) -> Result<Vec<PathBuf>> {
    let files = matching_files(dir, "*.csv")?;
    if files.is_empty() {
        return Err(AggregationError::MissingInput {
            path: dir.join("*.csv"),
        });
    }

    let mut written = Vec::new();
    for file in files {
        match draw_graph_from_file(&file, style) {
            Ok(path) => written.push(path),
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }
    Ok(written)
}
