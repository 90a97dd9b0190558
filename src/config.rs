// src/config.rs
use crate::aggregation::Allocation;
use crate::charts::spec::PlotStyle;
use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_NAME: &str = "charts";

/// Everything one aggregation-and-render pass needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the result tree
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,
    /// Graph families, e.g. "Preferential Attachment"
    #[serde(default = "default_graph_types")]
    pub graph_types: Vec<String>,
    /// Range labels, e.g. "1 - 4"
    #[serde(default = "default_parameter_ranges")]
    pub parameter_ranges: Vec<String>,
    #[serde(
        default = "default_allocations",
        deserialize_with = "deserialize_allocations"
    )]
    pub allocation_strategies: Vec<Allocation>,
    /// Where charts, logs and the run summary are written
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    #[serde(default)]
    pub chart: ChartSettings,
}

/// Presentation settings shared by every chart of a pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// Name of the condition column, e.g. "P VALUE" or "MIN DEGREE"
    pub parameter_label: String,
    /// Vertices per simulated graph; infection counts are divided by this
    pub vertex_count: usize,
    pub font_size: u32,
    /// Legend labels substituted positionally for the hue categories
    pub defence_labels: Vec<String>,
    pub win_style: PlotStyle,
    pub infection_style: PlotStyle,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            parameter_label: "MIN DEGREE".to_string(),
            vertex_count: 50,
            font_size: 20,
            defence_labels: vec![
                "Proximity".to_string(),
                "Degree".to_string(),
                "Protection".to_string(),
            ],
            win_style: PlotStyle::Line,
            infection_style: PlotStyle::Box,
            width: 1400,
            height: 1000,
        }
    }
}

impl ChartSettings {
    /// Condition column name in title case, for axis labels
    pub fn axis_label(&self) -> String {
        title_case(&self.parameter_label)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            graph_types: default_graph_types(),
            parameter_ranges: default_parameter_ranges(),
            allocation_strategies: default_allocations(),
            output_root: default_output_root(),
            chart: ChartSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then the config file, then `CHARTS_*` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        builder = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                builder.add_source(File::from(path).required(true))
            }
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("CHARTS")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings = builder.build().context("Failed to build configuration")?;
        let config: PipelineConfig = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        let config = config.normalized()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Drop duplicate entries (keeping first occurrences) and reject empty lists
    pub fn normalized(mut self) -> Result<Self> {
        dedup_in_order(&mut self.graph_types);
        dedup_in_order(&mut self.parameter_ranges);
        dedup_in_order(&mut self.allocation_strategies);

        if self.graph_types.is_empty() {
            return Err(anyhow!("At least one graph type must be configured"));
        }
        if self.parameter_ranges.is_empty() {
            return Err(anyhow!("At least one parameter range must be configured"));
        }
        if self.allocation_strategies.is_empty() {
            return Err(anyhow!("At least one allocation strategy must be configured"));
        }
        if self.chart.vertex_count == 0 {
            return Err(anyhow!("chart.vertex_count must be greater than zero"));
        }
        if self.chart.parameter_label.trim().is_empty() {
            return Err(anyhow!("chart.parameter_label cannot be empty"));
        }

        Ok(self)
    }
}

fn default_root_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("charts")
}

fn default_graph_types() -> Vec<String> {
    vec!["Preferential Attachment".to_string()]
}

fn default_parameter_ranges() -> Vec<String> {
    vec!["1 - 4".to_string()]
}

fn default_allocations() -> Vec<Allocation> {
    Allocation::ALL.to_vec()
}

fn deserialize_allocations<'de, D>(deserializer: D) -> std::result::Result<Vec<Allocation>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    names
        .iter()
        .map(|name| name.parse::<Allocation>().map_err(serde::de::Error::custom))
        .collect()
}

fn dedup_in_order<T: PartialEq + Clone>(items: &mut Vec<T>) {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    *items = kept;
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn title_cases_column_names() {
        assert_eq!(title_case("MIN DEGREE"), "Min Degree");
        assert_eq!(title_case("NUMBER OF EDGES"), "Number Of Edges");
        assert_eq!(title_case("P VALUE"), "P Value");
    }

    #[test]
    fn loads_file_over_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edges.toml");
        fs::write(
            &path,
            r#"
root_path = "/results"
graph_types = ["Erdos Renyi", "Erdos Renyi"]
parameter_ranges = ["25-250"]
allocation_strategies = ["mixed", "Random"]

[chart]
parameter_label = "NUMBER OF EDGES"
font_size = 14
"#,
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.root_path, PathBuf::from("/results"));
        assert_eq!(config.graph_types, vec!["Erdos Renyi".to_string()]);
        assert_eq!(
            config.allocation_strategies,
            vec![Allocation::Mixed, Allocation::Random]
        );
        assert_eq!(config.chart.parameter_label, "NUMBER OF EDGES");
        assert_eq!(config.chart.font_size, 14);
        assert_eq!(config.chart.vertex_count, 50);
        assert_eq!(config.output_root, PathBuf::from("charts"));
    }

    #[test]
    fn rejects_unknown_allocation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "allocation_strategies = [\"Greedy\"]\n").unwrap();
        assert!(PipelineConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn rejects_empty_lists() {
        let config = PipelineConfig {
            graph_types: Vec::new(),
            ..PipelineConfig::default()
        };
        assert!(config.normalized().is_err());
    }
}
