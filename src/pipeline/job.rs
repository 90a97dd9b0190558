// src/pipeline/job.rs
use crate::aggregation::Allocation;
use crate::charts::ChartKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One chart to produce in a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartJob {
    pub kind: ChartKind,
    pub graph_type: String,
    pub range: String,
    pub allocation: Option<Allocation>,
}

impl ChartJob {
    pub fn new(
        kind: ChartKind,
        graph_type: impl Into<String>,
        range: impl Into<String>,
        allocation: Option<Allocation>,
    ) -> Self {
        Self {
            kind,
            graph_type: graph_type.into(),
            range: range.into(),
            allocation,
        }
    }

    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.kind,
            self.graph_type,
            self.range,
            self.allocation
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}

impl fmt::Display for ChartJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} chart for {} {}", self.kind, self.graph_type, self.range)?;
        if let Some(allocation) = self.allocation {
            write!(f, " ({})", allocation)?;
        }
        Ok(())
    }
}

/// What happened to a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Written { path: String },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(flatten)]
    pub job: ChartJob,
    pub outcome: JobOutcome,
}
