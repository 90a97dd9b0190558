// src/aggregation/table.rs
use crate::aggregation::discovery::ConditionValue;
use crate::error::{AggregationError, Result};
use csv::{ReaderBuilder, Trim};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Columns the result files are known to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Strategy,
    DefenceStrategy,
    Infected,
    NumberOfWins,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Strategy => "STRATEGY",
            Column::DefenceStrategy => "DEFENCE STRATEGY",
            Column::Infected => "INFECTED",
            Column::NumberOfWins => "NUMBER OF WINS",
        }
    }
}

/// Where a row's condition value comes from
#[derive(Debug, Clone)]
pub enum ConditionSource {
    /// Tag every row with this value; the file must not carry the column already
    Injected(ConditionValue),
    /// Read the value from the condition column of the file
    InFile,
}

/// Row type stored in a [`Table`]
pub trait TableRecord: Clone {
    fn condition(&self) -> Option<&ConditionValue>;
}

/// Row type that can be read from a result CSV
pub trait CsvRecord: TableRecord + Sized {
    /// The fixed columns, deserialized by header name
    type Fields: DeserializeOwned;

    const REQUIRED: &'static [Column];

    fn assemble(
        fields: Self::Fields,
        condition: ConditionValue,
        extra: BTreeMap<String, String>,
    ) -> Self;
}

// Rejects NaN and infinities, which parse as floats but cannot be plotted
fn finite<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(de::Error::custom(format!("'{}' is not a finite number", value)))
    }
}

#[derive(Debug, Deserialize)]
pub struct RunFields {
    #[serde(rename = "STRATEGY")]
    pub strategy: String,
    #[serde(rename = "INFECTED", deserialize_with = "finite")]
    pub infected: f64,
}

#[derive(Debug, Deserialize)]
pub struct WinFields {
    #[serde(rename = "DEFENCE STRATEGY")]
    pub defence_strategy: String,
    #[serde(rename = "NUMBER OF WINS", deserialize_with = "finite")]
    pub wins: f64,
}

/// Per-run outcome of one defence strategy
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub condition: Option<ConditionValue>,
    pub strategy: String,
    pub infected: f64,
    pub extra: BTreeMap<String, String>,
}

/// Win count of one defence strategy under one condition
#[derive(Debug, Clone, PartialEq)]
pub struct WinRecord {
    pub condition: Option<ConditionValue>,
    pub defence_strategy: String,
    pub wins: f64,
    pub extra: BTreeMap<String, String>,
}

/// Degree of one vertex of a graph generated under a condition
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeRecord {
    pub condition: Option<ConditionValue>,
    pub degree: usize,
}

impl TableRecord for RunRecord {
    fn condition(&self) -> Option<&ConditionValue> {
        self.condition.as_ref()
    }
}

impl CsvRecord for RunRecord {
    type Fields = RunFields;

    const REQUIRED: &'static [Column] = &[Column::Strategy, Column::Infected];

    fn assemble(fields: RunFields, condition: ConditionValue, extra: BTreeMap<String, String>) -> Self {
        Self {
            condition: Some(condition),
            strategy: fields.strategy,
            infected: fields.infected,
            extra,
        }
    }
}

impl TableRecord for WinRecord {
    fn condition(&self) -> Option<&ConditionValue> {
        self.condition.as_ref()
    }
}

impl CsvRecord for WinRecord {
    type Fields = WinFields;

    const REQUIRED: &'static [Column] = &[Column::DefenceStrategy, Column::NumberOfWins];

    fn assemble(fields: WinFields, condition: ConditionValue, extra: BTreeMap<String, String>) -> Self {
        Self {
            condition: Some(condition),
            defence_strategy: fields.defence_strategy,
            wins: fields.wins,
            extra,
        }
    }
}

impl TableRecord for DegreeRecord {
    fn condition(&self) -> Option<&ConditionValue> {
        self.condition.as_ref()
    }
}

/// Rows of one kind sharing a condition column, built up fragment by fragment
#[derive(Debug, Clone)]
pub struct Table<R> {
    condition_column: String,
    extra_columns: Vec<String>,
    sources: Vec<PathBuf>,
    rows: Vec<R>,
}

pub type RunTable = Table<RunRecord>;
pub type WinTable = Table<WinRecord>;
pub type DegreeTable = Table<DegreeRecord>;

impl<R: TableRecord> Table<R> {
    pub fn new(condition_column: impl Into<String>) -> Self {
        Self {
            condition_column: condition_column.into(),
            extra_columns: Vec::new(),
            sources: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn condition_column(&self) -> &str {
        &self.condition_column
    }

    /// Columns beyond the fixed schema, in the order they were first seen
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Files the rows were read from
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn add_source(&mut self, path: impl Into<PathBuf>) {
        self.sources.push(path.into());
    }

    /// Distinct condition values in row order
    pub fn conditions(&self) -> Vec<ConditionValue> {
        let mut seen: Vec<ConditionValue> = Vec::new();
        for value in self.rows.iter().filter_map(|r| r.condition()) {
            if !seen.contains(value) {
                seen.push(value.clone());
            }
        }
        seen
    }

    /// Concatenate `other` after the existing rows.
    ///
    /// Rows keep their order; extra columns are unioned. Fragments keyed by a
    /// different condition column cannot be merged.
    pub fn append(&mut self, other: Table<R>) -> Result<()> {
        if other.condition_column != self.condition_column {
            let path = other.sources.first().cloned().unwrap_or_default();
            return Err(AggregationError::schema(
                path,
                format!(
                    "condition column '{}' does not match '{}'",
                    other.condition_column, self.condition_column
                ),
            ));
        }

        for column in other.extra_columns {
            if !self.extra_columns.contains(&column) {
                self.extra_columns.push(column);
            }
        }
        self.sources.extend(other.sources);
        self.rows.extend(other.rows);
        Ok(())
    }
}

impl<R: CsvRecord> Table<R> {
    /// Read one result file into a table.
    ///
    /// Fixed columns are deserialized by header name; any other column except
    /// the condition column is kept as an extra.
    pub fn read_csv(path: &Path, condition_column: &str, source: ConditionSource) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| AggregationError::csv(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| AggregationError::csv(path, e))?
            .clone();

        for column in R::REQUIRED {
            if !headers.iter().any(|h| h == column.header()) {
                return Err(AggregationError::schema(
                    path,
                    format!("missing column '{}'", column.header()),
                ));
            }
        }

        let condition_idx = headers.iter().position(|h| h == condition_column);
        match (&source, condition_idx) {
            (ConditionSource::Injected(_), Some(_)) => {
                return Err(AggregationError::schema(
                    path,
                    format!("column '{}' already present", condition_column),
                ));
            }
            (ConditionSource::InFile, None) => {
                return Err(AggregationError::schema(
                    path,
                    format!("missing column '{}'", condition_column),
                ));
            }
            _ => {}
        }

        let extras: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                Some(*idx) != condition_idx && !R::REQUIRED.iter().any(|c| c.header() == *name)
            })
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut table = Table::new(condition_column);
        table.extra_columns = extras.iter().map(|(_, name)| name.clone()).collect();
        table.add_source(path);

        for record in reader.records() {
            let record = record.map_err(|e| AggregationError::csv(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let malformed = |reason: String| AggregationError::MalformedRecord {
                path: path.to_path_buf(),
                line,
                reason,
            };

            let fields: R::Fields = record
                .deserialize(Some(&headers))
                .map_err(|e| malformed(e.to_string()))?;

            let condition = match &source {
                ConditionSource::Injected(value) => value.clone(),
                ConditionSource::InFile => {
                    let cell = condition_idx.and_then(|idx| record.get(idx)).unwrap_or("");
                    if cell.is_empty() {
                        return Err(malformed("empty condition value".to_string()));
                    }
                    ConditionValue::parse(cell)
                }
            };

            let extra = extras
                .iter()
                .filter_map(|(idx, name)| record.get(*idx).map(|v| (name.clone(), v.to_string())))
                .collect();

            table.push(R::assemble(fields, condition, extra));
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn injects_condition_and_keeps_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MixedData1.csv");
        fs::write(&path, "STRATEGY,INFECTED,ROUNDS\n0,12,4\n1,20,5\n").unwrap();

        let value = ConditionValue::parse("0.05");
        let table =
            RunTable::read_csv(&path, "P VALUE", ConditionSource::Injected(value.clone())).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.extra_columns(), &["ROUNDS".to_string()]);
        assert!(table.rows().iter().all(|r| r.condition.as_ref() == Some(&value)));
        assert_eq!(table.rows()[1].infected, 20.0);
        assert_eq!(table.rows()[1].extra.get("ROUNDS").map(String::as_str), Some("5"));
    }

    #[test]
    fn missing_required_column_is_schema_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("RandomData1.csv");
        fs::write(&path, "STRATEGY,ROUNDS\n0,4\n").unwrap();

        let err = RunTable::read_csv(
            &path,
            "P VALUE",
            ConditionSource::Injected(ConditionValue::parse("1")),
        )
        .unwrap_err();
        assert!(matches!(err, AggregationError::SchemaMismatch { .. }));
    }

    #[test]
    fn duplicate_injected_column_is_schema_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MixedData1.csv");
        fs::write(&path, "P VALUE,STRATEGY,INFECTED\n0.1,0,3\n").unwrap();

        let err = RunTable::read_csv(
            &path,
            "P VALUE",
            ConditionSource::Injected(ConditionValue::parse("0.1")),
        )
        .unwrap_err();
        assert!(matches!(err, AggregationError::SchemaMismatch { .. }));
    }

    #[test]
    fn non_numeric_cell_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MixedData1.csv");
        fs::write(&path, "STRATEGY,INFECTED\n0,many\n").unwrap();

        let err = RunTable::read_csv(
            &path,
            "P VALUE",
            ConditionSource::Injected(ConditionValue::parse("0.1")),
        )
        .unwrap_err();
        match err {
            AggregationError::MalformedRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn winner_file_reads_condition_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("DeterministicWinner.csv");
        fs::write(
            &path,
            "MIN DEGREE,DEFENCE STRATEGY,NUMBER OF WINS\n1,0,14\n2,1,9\n",
        )
        .unwrap();

        let table = WinTable::read_csv(&path, "MIN DEGREE", ConditionSource::InFile).unwrap();
        let conditions: Vec<String> = table.conditions().iter().map(|c| c.to_string()).collect();
        assert_eq!(conditions, vec!["1", "2"]);
        assert!(table.extra_columns().is_empty());
    }

    #[test]
    fn append_unions_columns_and_preserves_order() {
        let mut left = RunTable::new("P VALUE");
        left.push(RunRecord {
            condition: Some(ConditionValue::parse("0.05")),
            strategy: "0".into(),
            infected: 1.0,
            extra: BTreeMap::new(),
        });
        let mut right = RunTable::new("P VALUE");
        right.extra_columns.push("ROUNDS".into());
        right.push(RunRecord {
            condition: Some(ConditionValue::parse("0.10")),
            strategy: "1".into(),
            infected: 2.0,
            extra: BTreeMap::new(),
        });

        left.append(right).unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(left.extra_columns(), &["ROUNDS".to_string()]);
        assert_eq!(left.rows()[1].infected, 2.0);

        let other = RunTable::new("MIN DEGREE");
        assert!(matches!(
            left.append(other),
            Err(AggregationError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn non_finite_numbers_are_malformed() {
        let dir = tempdir().unwrap();
        for (name, body) in [
            ("RandomData1.csv", "STRATEGY,INFECTED\n0,3\n0,NaN\n"),
            ("RandomData2.csv", "STRATEGY,INFECTED\n0,inf\n"),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            let err = RunTable::read_csv(
                &path,
                "P VALUE",
                ConditionSource::Injected(ConditionValue::parse("0.1")),
            )
            .unwrap_err();
            assert!(matches!(err, AggregationError::MalformedRecord { .. }), "{name}: {err}");
        }

        let path = dir.path().join("MixedWinner.csv");
        fs::write(&path, "P VALUE,DEFENCE STRATEGY,NUMBER OF WINS\n0.1,0,NaN\n").unwrap();
        assert!(matches!(
            WinTable::read_csv(&path, "P VALUE", ConditionSource::InFile),
            Err(AggregationError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn numeric_looking_strategy_names_stay_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MixedData1.csv");
        fs::write(&path, "ROUNDS,STRATEGY,INFECTED\n7,2,4.5\n").unwrap();

        let table = RunTable::read_csv(
            &path,
            "P VALUE",
            ConditionSource::Injected(ConditionValue::parse("0.1")),
        )
        .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.strategy, "2");
        assert_eq!(row.infected, 4.5);
        assert_eq!(row.extra.get("ROUNDS").map(String::as_str), Some("7"));
    }
}
