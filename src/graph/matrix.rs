// src/graph/matrix.rs
use crate::error::{AggregationError, Result};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Undirected graph read from a square adjacency matrix.
///
/// Any non-zero cell marks an edge; weights are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl AdjacencyMatrix {
    pub fn from_rows(rows: Vec<Vec<i64>>) -> std::result::Result<Self, String> {
        let size = rows.len();
        let mut cells = vec![false; size * size];

        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(format!(
                    "row {} has {} cells, expected {}",
                    i + 1,
                    row.len(),
                    size
                ));
            }
            for (j, value) in row.iter().enumerate() {
                if *value != 0 {
                    cells[i * size + j] = true;
                    cells[j * size + i] = true;
                }
            }
        }

        Ok(Self { size, cells })
    }

    /// Read a header-less, comma separated matrix of integers
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AggregationError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| AggregationError::csv(path, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AggregationError::csv(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let row = record
                .iter()
                .filter(|cell| !cell.is_empty())
                .map(|cell| {
                    cell.parse::<i64>().map_err(|_| AggregationError::MalformedRecord {
                        path: path.to_path_buf(),
                        line,
                        reason: format!("'{}' is not an integer", cell),
                    })
                })
                .collect::<Result<Vec<i64>>>()?;
            if !row.is_empty() {
                rows.push(row);
            }
        }

        Self::from_rows(rows).map_err(|reason| AggregationError::schema(path, reason))
    }

    /// Number of vertices
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        i < self.size && j < self.size && self.cells[i * self.size + j]
    }

    /// Each undirected edge once, as (low, high)
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for i in 0..self.size {
            for j in i..self.size {
                if self.has_edge(i, j) {
                    edges.push((i, j));
                }
            }
        }
        edges
    }

    /// Degree of every vertex; a self-loop counts twice
    pub fn degree_sequence(&self) -> Vec<usize> {
        (0..self.size)
            .map(|i| {
                (0..self.size)
                    .filter(|&j| self.has_edge(i, j))
                    .map(|j| if i == j { 2 } else { 1 })
                    .sum()
            })
            .collect()
    }
}
