// src/charts/spec.rs
use crate::aggregation::table::Column;
use crate::aggregation::Allocation;
use crate::config::ChartSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Win,
    PercentInfected,
    DegreeDistribution,
}

impl ChartKind {
    /// Output subfolder under the output root
    pub fn folder(&self) -> &'static str {
        match self {
            ChartKind::Win => "winners",
            ChartKind::PercentInfected => "percent_infected",
            ChartKind::DegreeDistribution => "degrees",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Win => write!(f, "win"),
            ChartKind::PercentInfected => write!(f, "percent_infected"),
            ChartKind::DegreeDistribution => write!(f, "degree_distribution"),
        }
    }
}

/// How series are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotStyle {
    Line,
    Scatter,
    Box,
}

/// One chart to produce: what to plot and where it goes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
    pub hue_field: Option<String>,
    pub allocation: Option<Allocation>,
    pub value_range: String,
    pub style: PlotStyle,
    pub output_path: PathBuf,
}

impl ChartSpec {
    /// Win counts by condition, hued by defence strategy.
    /// Written to `{out}/winners/{range}/{allocation}.jpg`.
    pub fn win(
        settings: &ChartSettings,
        allocation: Allocation,
        value_range: &str,
        output_root: &Path,
    ) -> Self {
        Self {
            kind: ChartKind::Win,
            x_field: settings.parameter_label.clone(),
            y_field: Column::NumberOfWins.header().to_string(),
            hue_field: Some(Column::DefenceStrategy.header().to_string()),
            allocation: Some(allocation),
            value_range: value_range.to_string(),
            style: settings.win_style,
            output_path: allocation_chart_path(output_root, ChartKind::Win, value_range, allocation),
        }
    }

    /// Share of the graph infected by condition, hued by strategy.
    /// Written to `{out}/percent_infected/{range}/{allocation}.jpg`.
    pub fn percent_infected(
        settings: &ChartSettings,
        allocation: Allocation,
        value_range: &str,
        output_root: &Path,
    ) -> Self {
        Self {
            kind: ChartKind::PercentInfected,
            x_field: settings.parameter_label.clone(),
            y_field: Column::Infected.header().to_string(),
            hue_field: Some(Column::Strategy.header().to_string()),
            allocation: Some(allocation),
            value_range: value_range.to_string(),
            style: settings.infection_style,
            output_path: allocation_chart_path(
                output_root,
                ChartKind::PercentInfected,
                value_range,
                allocation,
            ),
        }
    }

    /// Vertex degrees by condition. Written to `{out}/degrees/{range}/Degrees.jpg`.
    pub fn degree_distribution(
        settings: &ChartSettings,
        value_range: &str,
        output_root: &Path,
    ) -> Self {
        Self {
            kind: ChartKind::DegreeDistribution,
            x_field: settings.parameter_label.clone(),
            y_field: "DEGREE".to_string(),
            hue_field: None,
            allocation: None,
            value_range: value_range.to_string(),
            style: PlotStyle::Box,
            output_path: output_root
                .join(ChartKind::DegreeDistribution.folder())
                .join(value_range)
                .join("Degrees.jpg"),
        }
    }
}

fn allocation_chart_path(
    output_root: &Path,
    kind: ChartKind,
    value_range: &str,
    allocation: Allocation,
) -> PathBuf {
    output_root
        .join(kind.folder())
        .join(value_range)
        .join(format!("{}.jpg", allocation))
}
