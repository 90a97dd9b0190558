// src/pipeline/runner.rs
use crate::aggregation::AggregationEngine;
use crate::charts::{ChartData, ChartDispatcher, ChartKind, ChartRenderer, ChartSpec};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::job::{ChartJob, JobOutcome, JobReport};
use crate::utils::log_utils::log_to_file;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

pub const SUMMARY_FILE: &str = "summary.json";
pub const LOG_DIR: &str = "logs";

/// Outcome of one full pass over the configured result tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub root_path: PathBuf,
    pub output_root: PathBuf,
    pub jobs: Vec<JobReport>,
}

impl RunSummary {
    pub fn written(&self) -> Vec<&str> {
        self.jobs
            .iter()
            .filter_map(|r| match &r.outcome {
                JobOutcome::Written { path } => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&JobReport> {
        self.jobs
            .iter()
            .filter(|r| matches!(r.outcome, JobOutcome::Failed { .. }))
            .collect()
    }

    pub fn skipped(&self) -> usize {
        self.jobs
            .iter()
            .filter(|r| matches!(r.outcome, JobOutcome::Skipped { .. }))
            .count()
    }
}

/// Runs every chart job a configuration describes
pub struct ReportPipeline<R> {
    config: PipelineConfig,
    engine: AggregationEngine,
    dispatcher: ChartDispatcher<R>,
}

impl<R: ChartRenderer> ReportPipeline<R> {
    pub fn new(config: PipelineConfig, renderer: R) -> Self {
        let engine = AggregationEngine::new(
            config.root_path.clone(),
            config.chart.parameter_label.clone(),
        );
        let dispatcher = ChartDispatcher::new(renderer, config.chart.clone());
        Self {
            config,
            engine,
            dispatcher,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &ChartDispatcher<R> {
        &self.dispatcher
    }

    /// Produce every win, infection and degree chart. A failing job is
    /// logged and recorded; the rest of the batch still runs.
    #[instrument(skip(self), fields(root = %self.config.root_path.display()))]
    pub fn run(&self) -> RunSummary {
        let started_at = Utc::now();
        let mut reports = Vec::new();

        info!(
            "Starting chart pass: {} graph types, {} ranges, {} allocations",
            self.config.graph_types.len(),
            self.config.parameter_ranges.len(),
            self.config.allocation_strategies.len()
        );

        self.win_charts(&mut reports);
        self.infection_charts(&mut reports);
        self.degree_charts(&mut reports);

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            root_path: self.config.root_path.clone(),
            output_root: self.config.output_root.clone(),
            jobs: reports,
        };

        info!(
            "Chart pass finished: {} written, {} skipped, {} failed",
            summary.written().len(),
            summary.skipped(),
            summary.failures().len()
        );
        summary
    }

    fn win_charts(&self, reports: &mut Vec<JobReport>) {
        for graph_type in &self.config.graph_types {
            for allocation in &self.config.allocation_strategies {
                for range in &self.config.parameter_ranges {
                    let job = ChartJob::new(ChartKind::Win, graph_type, range, Some(*allocation));
                    let outcome = self
                        .engine
                        .winners(graph_type, range, *allocation)
                        .and_then(|winners| match winners {
                            Some(table) => {
                                let spec = ChartSpec::win(
                                    &self.config.chart,
                                    *allocation,
                                    range,
                                    &self.config.output_root,
                                );
                                self.dispatcher.render(ChartData::Wins(&table), &spec).map(Some)
                            }
                            None => Ok(None),
                        });
                    reports.push(self.settle(job, outcome, "no winner file"));
                }
            }
        }
    }

    fn infection_charts(&self, reports: &mut Vec<JobReport>) {
        let allocations = &self.config.allocation_strategies;
        for graph_type in &self.config.graph_types {
            for range in &self.config.parameter_ranges {
                let conditions = match self.engine.conditions(graph_type, range) {
                    Ok(conditions) => conditions,
                    Err(e) => {
                        // Nothing under this pair can be read
                        let message = e.to_string();
                        for allocation in allocations {
                            let job = ChartJob::new(
                                ChartKind::PercentInfected,
                                graph_type,
                                range,
                                Some(*allocation),
                            );
                            reports.push(self.fail(job, &message));
                        }
                        continue;
                    }
                };

                for allocation in allocations {
                    let job = ChartJob::new(
                        ChartKind::PercentInfected,
                        graph_type,
                        range,
                        Some(*allocation),
                    );
                    let outcome = self
                        .engine
                        .load_allocation(&conditions, *allocation)
                        .and_then(|table| {
                            if table.is_empty() {
                                return Ok(None);
                            }
                            let spec = ChartSpec::percent_infected(
                                &self.config.chart,
                                *allocation,
                                range,
                                &self.config.output_root,
                            );
                            self.dispatcher
                                .render(ChartData::Infections(&table), &spec)
                                .map(Some)
                        });
                    reports.push(self.settle(job, outcome, "no data files"));
                }
            }
        }
    }

    fn degree_charts(&self, reports: &mut Vec<JobReport>) {
        for graph_type in &self.config.graph_types {
            for range in &self.config.parameter_ranges {
                let job = ChartJob::new(ChartKind::DegreeDistribution, graph_type, range, None);
                let outcome = self.engine.degrees(graph_type, range).and_then(|table| {
                    if table.is_empty() {
                        return Ok(None);
                    }
                    let spec = ChartSpec::degree_distribution(
                        &self.config.chart,
                        range,
                        &self.config.output_root,
                    );
                    self.dispatcher
                        .render(ChartData::Degrees(&table), &spec)
                        .map(Some)
                });
                reports.push(self.settle(job, outcome, "no graph files"));
            }
        }
    }

    fn settle(&self, job: ChartJob, outcome: Result<Option<PathBuf>>, skip_reason: &str) -> JobReport {
        match outcome {
            Ok(Some(path)) => JobReport {
                job,
                outcome: JobOutcome::Written {
                    path: path.display().to_string(),
                },
            },
            Ok(None) => {
                warn!("Skipping {}: {}", job, skip_reason);
                JobReport {
                    job,
                    outcome: JobOutcome::Skipped {
                        reason: skip_reason.to_string(),
                    },
                }
            }
            Err(e) => self.fail(job, &e.to_string()),
        }
    }

    fn fail(&self, job: ChartJob, message: &str) -> JobReport {
        error!("Failed {}: {}", job, message);
        let log_dir = self.config.output_root.join(LOG_DIR);
        if let Err(e) = log_to_file(&log_dir, &format!("{}: {}", job.key(), message)) {
            warn!("Failed to append to failure log: {}", e);
        }
        JobReport {
            job,
            outcome: JobOutcome::Failed {
                error: message.to_string(),
            },
        }
    }
}

/// Write `summary` as pretty JSON to `{output_root}/summary.json`
pub fn write_summary(summary: &RunSummary, output_root: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_root)
        .context(format!("Failed to create {}", output_root.display()))?;
    let path = output_root.join(SUMMARY_FILE);
    let body = serde_json::to_string_pretty(summary)?;
    fs::write(&path, body).context(format!("Failed to write {}", path.display()))?;
    Ok(path)
}
