// src/aggregation/engine.rs
use crate::aggregation::allocation::Allocation;
use crate::aggregation::discovery::{discover, Condition};
use crate::aggregation::loader;
use crate::aggregation::table::{DegreeTable, RunTable, WinTable};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Which aggregated table a set of rows belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableKey {
    pub graph_type: String,
    pub range: String,
    pub allocation: Allocation,
}

impl TableKey {
    pub fn new(graph_type: &str, range: &str, allocation: Allocation) -> Self {
        Self {
            graph_type: graph_type.to_string(),
            range: range.to_string(),
            allocation,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.graph_type, self.range, self.allocation)
    }
}

/// Builds per-allocation tables from the result tree under `root`
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    root: PathBuf,
    parameter_label: String,
}

impl AggregationEngine {
    pub fn new(root: impl Into<PathBuf>, parameter_label: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            parameter_label: parameter_label.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn parameter_label(&self) -> &str {
        &self.parameter_label
    }

    /// Conditions of one (graph type, range) pair in natural order
    pub fn conditions(&self, graph_type: &str, range_label: &str) -> Result<Vec<Condition>> {
        discover(&self.root, graph_type, range_label, &self.parameter_label)
    }

    /// One table per (graph type, range, allocation).
    ///
    /// Rows of each table follow ascending condition order. Every requested
    /// combination gets a table, even when no files were found for it.
    pub fn aggregate(
        &self,
        graph_types: &[String],
        ranges: &[String],
        allocations: &[Allocation],
    ) -> Result<BTreeMap<TableKey, RunTable>> {
        let mut tables = BTreeMap::new();

        for graph_type in graph_types {
            for range_label in ranges {
                let conditions = self.conditions(graph_type, range_label)?;
                for allocation in allocations {
                    let table = self.load_allocation(&conditions, *allocation)?;
                    tables.insert(TableKey::new(graph_type, range_label, *allocation), table);
                }
            }
        }

        Ok(tables)
    }

    /// Per-allocation tables for a single (graph type, range) pair
    #[instrument(skip(self, allocations), fields(root = %self.root.display()))]
    pub fn aggregate_pair(
        &self,
        graph_type: &str,
        range_label: &str,
        allocations: &[Allocation],
    ) -> Result<BTreeMap<Allocation, RunTable>> {
        let conditions = self.conditions(graph_type, range_label)?;
        let mut tables = BTreeMap::new();
        for allocation in allocations {
            tables.insert(*allocation, self.load_allocation(&conditions, *allocation)?);
        }

        info!(
            "Aggregated {} conditions for {} {}: {}",
            conditions.len(),
            graph_type,
            range_label,
            tables
                .iter()
                .map(|(a, t)| format!("{}={}", a, t.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(tables)
    }

    /// Table of one allocation for a single (graph type, range) pair
    pub fn aggregate_allocation(
        &self,
        graph_type: &str,
        range_label: &str,
        allocation: Allocation,
    ) -> Result<RunTable> {
        let conditions = self.conditions(graph_type, range_label)?;
        self.load_allocation(&conditions, allocation)
    }

    /// Stack the per-run files of `allocation` across already discovered
    /// conditions, in the order they are given
    pub fn load_allocation(&self, conditions: &[Condition], allocation: Allocation) -> Result<RunTable> {
        let mut table = RunTable::new(self.parameter_label.as_str());
        for condition in conditions {
            let fragment = loader::load(condition, allocation, &allocation.data_file_pattern())?;
            debug!(
                "{} {} = {}: {} rows for {}",
                condition.graph_type,
                self.parameter_label,
                condition.value,
                fragment.len(),
                allocation
            );
            table.append(fragment)?;
        }
        Ok(table)
    }

    /// Consolidated win counts, read straight from the winner file
    pub fn winners(
        &self,
        graph_type: &str,
        range_label: &str,
        allocation: Allocation,
    ) -> Result<Option<WinTable>> {
        loader::load_winners(
            &self.root,
            graph_type,
            range_label,
            allocation,
            &self.parameter_label,
        )
    }

    /// Degree sequences of every condition of one (graph type, range) pair
    pub fn degrees(&self, graph_type: &str, range_label: &str) -> Result<DegreeTable> {
        let mut table = DegreeTable::new(self.parameter_label.as_str());
        for condition in self.conditions(graph_type, range_label)? {
            table.append(loader::load_degrees(&condition)?)?;
        }
        Ok(table)
    }
}
