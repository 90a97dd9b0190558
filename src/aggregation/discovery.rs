// src/aggregation/discovery.rs
use crate::aggregation::natural_key::{natural_key, NaturalKey};
use crate::error::{AggregationError, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifying value of a condition, parsed from a directory name or a CSV cell
#[derive(Debug, Clone)]
pub enum ConditionValue {
    Numeric { value: f64, raw: String },
    Label(String),
}

impl ConditionValue {
    /// Parse as a float when possible, otherwise keep the text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => ConditionValue::Numeric {
                value,
                raw: trimmed.to_string(),
            },
            _ => ConditionValue::Label(trimmed.to_string()),
        }
    }

    /// Text as it appeared on disk
    pub fn raw(&self) -> &str {
        match self {
            ConditionValue::Numeric { raw, .. } => raw,
            ConditionValue::Label(label) => label,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConditionValue::Numeric { value, .. } => Some(*value),
            ConditionValue::Label(_) => None,
        }
    }

    pub fn sort_key(&self) -> NaturalKey {
        natural_key(self.raw())
    }
}

impl PartialEq for ConditionValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ConditionValue {}

impl Ord for ConditionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for ConditionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}

impl Serialize for ConditionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.raw())
    }
}

/// One experimental setting discovered under a (graph type, range) folder
#[derive(Debug, Clone, Serialize)]
pub struct Condition {
    pub graph_type: String,
    pub parameter_label: String,
    pub value: ConditionValue,
    pub directory: PathBuf,
}

impl Condition {
    pub fn raw_identifier(&self) -> &str {
        self.value.raw()
    }
}

/// Folder holding every condition of one (graph type, range) pair
pub fn condition_set_dir(root: &Path, graph_type: &str, range_label: &str) -> PathBuf {
    root.join(format!("{} {}", graph_type, range_label))
}

/// List the immediate subdirectories of `{root}/{graph_type} {range_label}`
/// as conditions, in ascending natural-key order of their names.
///
/// A missing folder yields no conditions. Other I/O failures are returned.
pub fn discover(
    root: &Path,
    graph_type: &str,
    range_label: &str,
    parameter_label: &str,
) -> Result<Vec<Condition>> {
    let base = condition_set_dir(root, graph_type, range_label);

    let entries = match fs::read_dir(&base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No condition folder at {}, skipping", base.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(AggregationError::io(&base, e)),
    };

    let mut found: Vec<(NaturalKey, Condition)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AggregationError::io(&base, e))?;
        let path = entry.path();
        // Follows symlinks, so linked condition folders count too
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        found.push((
            natural_key(&name),
            Condition {
                graph_type: graph_type.to_string(),
                parameter_label: parameter_label.to_string(),
                value: ConditionValue::parse(&name),
                directory: path,
            },
        ));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(
        "Discovered {} conditions under {}",
        found.len(),
        base.display()
    );

    Ok(found.into_iter().map(|(_, condition)| condition).collect())
}
