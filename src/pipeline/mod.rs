// src/pipeline/mod.rs
pub mod job;
pub mod runner;

pub use job::{ChartJob, JobOutcome, JobReport};
pub use runner::{write_summary, ReportPipeline, RunSummary};
