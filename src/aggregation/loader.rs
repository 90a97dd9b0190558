// src/aggregation/loader.rs
use crate::aggregation::allocation::Allocation;
use crate::aggregation::discovery::{condition_set_dir, Condition};
use crate::aggregation::natural_key::sort_naturally;
use crate::aggregation::table::{
    ConditionSource, DegreeRecord, DegreeTable, RunTable, WinTable,
};
use crate::error::{AggregationError, Result};
use crate::graph::matrix::AdjacencyMatrix;
use glob::Pattern;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subfolder of a condition holding its generated graphs
pub const GRAPHS_DIR: &str = "graphs";

/// Files directly inside `dir` whose names match `pattern`, in natural order.
///
/// A missing directory has no matches.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Pattern::new(pattern).map_err(|e| AggregationError::Pattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AggregationError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AggregationError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if matcher.matches(&entry.file_name().to_string_lossy()) {
            files.push(path);
        }
    }

    sort_naturally(&mut files, |p| p.to_string_lossy().into_owned());
    Ok(files)
}

/// Load every per-run file of one allocation under a condition.
///
/// Each file's rows are tagged with the condition value before they are
/// concatenated in natural file-name order. No matching files gives an empty
/// table.
pub fn load(condition: &Condition, allocation: Allocation, pattern: &str) -> Result<RunTable> {
    let strategy_dir = condition.directory.join(allocation.as_str());
    let files = matching_files(&strategy_dir, pattern)?;

    let mut fragment = RunTable::new(condition.parameter_label.as_str());
    if files.is_empty() {
        debug!(
            "No {} files for {} in {}",
            pattern,
            allocation,
            strategy_dir.display()
        );
        return Ok(fragment);
    }

    for file in &files {
        let table = RunTable::read_csv(
            file,
            &condition.parameter_label,
            ConditionSource::Injected(condition.value.clone()),
        )?;
        debug!("Loaded {} rows from {}", table.len(), file.display());
        fragment.append(table)?;
    }

    Ok(fragment)
}

/// Path of the consolidated winner file for one allocation
pub fn winner_file(root: &Path, graph_type: &str, range_label: &str, allocation: Allocation) -> PathBuf {
    condition_set_dir(root, graph_type, range_label).join(allocation.winner_file_name())
}

/// Read the winner file of one allocation if it exists
pub fn load_winners(
    root: &Path,
    graph_type: &str,
    range_label: &str,
    allocation: Allocation,
    condition_column: &str,
) -> Result<Option<WinTable>> {
    let path = winner_file(root, graph_type, range_label, allocation);
    if !path.is_file() {
        debug!("No winner file at {}, skipping", path.display());
        return Ok(None);
    }

    let table = WinTable::read_csv(&path, condition_column, ConditionSource::InFile)?;
    Ok(Some(table))
}

/// Degree sequences of every adjacency matrix under `{condition}/graphs/`
pub fn load_degrees(condition: &Condition) -> Result<DegreeTable> {
    let graphs_dir = condition.directory.join(GRAPHS_DIR);
    let mut table = DegreeTable::new(condition.parameter_label.as_str());

    for file in matching_files(&graphs_dir, "*.csv")? {
        let matrix = AdjacencyMatrix::from_csv(&file)?;
        for degree in matrix.degree_sequence() {
            table.push(DegreeRecord {
                condition: Some(condition.value.clone()),
                degree,
            });
        }
        table.add_source(file);
    }

    Ok(table)
}
