// src/cli.rs
use crate::aggregation::AggregationEngine;
use crate::charts::PlottersRenderer;
use crate::config::PipelineConfig;
use crate::graph::{draw_graph_from_file, draw_graphs_in_dir, GraphStyle};
use crate::pipeline::{write_summary, ReportPipeline};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "defence-chart-aggregator")]
#[command(about = "Aggregate defence simulation results into comparison charts", long_about = None)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON); defaults to ./charts.* when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate every configured result set and render all charts
    Run {
        /// Override the result tree root
        #[arg(long)]
        root: Option<PathBuf>,

        /// Override the output folder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the conditions of one graph type and range in plotting order
    Discover {
        /// Graph type (e.g., "Preferential Attachment")
        #[arg(short, long)]
        graph_type: String,

        /// Range label (e.g., "1 - 4")
        #[arg(short, long)]
        range: String,

        /// Override the result tree root
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Draw adjacency-matrix CSV files, or every CSV in a directory
    Graph {
        /// Files or directories to draw
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Leave vertex numbers off the drawing
        #[arg(long)]
        no_labels: bool,
    },
}

/// Execute a command from the CLI
pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { root, output } => {
            let mut config = PipelineConfig::load(cli.config.as_deref())?;
            if let Some(root) = root {
                config.root_path = root;
            }
            if let Some(output) = output {
                config.output_root = output;
            }

            let output_root = config.output_root.clone();
            let pipeline = ReportPipeline::new(config, PlottersRenderer);
            let summary = pipeline.run();
            let summary_path = write_summary(&summary, &output_root)?;

            println!(
                "{} charts written, {} skipped, {} failed",
                summary.written().len(),
                summary.skipped(),
                summary.failures().len()
            );
            for failure in summary.failures() {
                println!("  failed: {}", failure.job);
            }
            info!("Run summary saved to {}", summary_path.display());
        }

        Commands::Discover {
            graph_type,
            range,
            root,
        } => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            let root = root.unwrap_or(config.root_path);
            let engine = AggregationEngine::new(root, config.chart.parameter_label);

            let conditions = engine
                .conditions(&graph_type, &range)
                .context(format!("Failed to list conditions for {} {}", graph_type, range))?;

            if conditions.is_empty() {
                println!("No conditions found for {} {}", graph_type, range);
                return Ok(());
            }

            println!("{:12} | DIRECTORY", engine.parameter_label());
            println!("{}", "-".repeat(60));
            for condition in conditions {
                println!(
                    "{:12} | {}",
                    condition.value.to_string(),
                    condition.directory.display()
                );
            }
        }

        Commands::Graph { paths, no_labels } => {
            let style = GraphStyle {
                with_labels: !no_labels,
                ..GraphStyle::default()
            };

            let mut drawn = 0;
            for path in paths {
                if path.is_dir() {
                    let written = draw_graphs_in_dir(&path, &style)
                        .context(format!("Failed to draw graphs in {}", path.display()))?;
                    drawn += written.len();
                } else if path.is_file() {
                    match draw_graph_from_file(&path, &style) {
                        Ok(output) => {
                            println!("{}", output.display());
                            drawn += 1;
                        }
                        Err(e) => warn!("Skipping {}: {}", path.display(), e),
                    }
                } else {
                    warn!("{} does not exist", path.display());
                }
            }

            if drawn == 0 {
                bail!("No graphs were drawn");
            }
            println!("Drew {} graphs", drawn);
        }
    }

    Ok(())
}
