// src/charts/dispatcher.rs
use crate::aggregation::table::{DegreeTable, RunTable, WinTable};
use crate::charts::series::{degree_request, infection_request, win_request, RenderRequest};
use crate::charts::spec::{ChartKind, ChartSpec};
use crate::config::ChartSettings;
use crate::error::{AggregationError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Draws a prepared request into an image file
pub trait ChartRenderer {
    fn render(&self, request: &RenderRequest, output: &Path) -> Result<()>;
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for &T {
    fn render(&self, request: &RenderRequest, output: &Path) -> Result<()> {
        (**self).render(request, output)
    }
}

/// Aggregated input for one chart
#[derive(Debug, Clone, Copy)]
pub enum ChartData<'a> {
    Wins(&'a WinTable),
    Infections(&'a RunTable),
    Degrees(&'a DegreeTable),
}

impl ChartData<'_> {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Wins(_) => ChartKind::Win,
            ChartData::Infections(_) => ChartKind::PercentInfected,
            ChartData::Degrees(_) => ChartKind::DegreeDistribution,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ChartData::Wins(t) => t.len(),
            ChartData::Infections(t) => t.len(),
            ChartData::Degrees(t) => t.len(),
        }
    }
}

/// Turns aggregated tables into chart files through a [`ChartRenderer`]
pub struct ChartDispatcher<R> {
    renderer: R,
    settings: ChartSettings,
}

impl<R: ChartRenderer> ChartDispatcher<R> {
    pub fn new(renderer: R, settings: ChartSettings) -> Self {
        Self { renderer, settings }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Build the request for `spec`, without rendering it
    pub fn prepare(&self, data: ChartData<'_>, spec: &ChartSpec) -> Result<RenderRequest> {
        if data.kind() != spec.kind {
            return Err(AggregationError::InvalidChart(format!(
                "{} chart requested for {} data",
                spec.kind,
                data.kind()
            )));
        }

        let request = match data {
            ChartData::Wins(table) => win_request(table, spec, &self.settings),
            ChartData::Infections(table) => infection_request(table, spec, &self.settings),
            ChartData::Degrees(table) => degree_request(table, spec, &self.settings),
        };
        Ok(request)
    }

    /// Render one chart and return the path it was written to.
    ///
    /// Missing output folders are created first.
    pub fn render(&self, data: ChartData<'_>, spec: &ChartSpec) -> Result<PathBuf> {
        let request = self.prepare(data, spec)?;
        if request.is_empty() {
            return Err(AggregationError::InvalidChart(format!(
                "no rows to plot for {}",
                spec.output_path.display()
            )));
        }

        if let Some(parent) = spec.output_path.parent() {
            fs::create_dir_all(parent).map_err(|source| AggregationError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        debug!(
            "Rendering {} chart from {} rows to {}",
            spec.kind,
            data.row_count(),
            spec.output_path.display()
        );
        self.renderer.render(&request, &spec.output_path)?;
        info!("Wrote {}", spec.output_path.display());

        Ok(spec.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::discovery::ConditionValue;
    use crate::aggregation::table::DegreeRecord;
    use crate::aggregation::Allocation;
    use std::cell::RefCell;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(PathBuf, RenderRequest)>>,
    }

    impl ChartRenderer for Recorder {
        fn render(&self, request: &RenderRequest, output: &Path) -> Result<()> {
            fs::write(output, b"chart").map_err(|source| AggregationError::Write {
                path: output.to_path_buf(),
                source,
            })?;
            self.calls
                .borrow_mut()
                .push((output.to_path_buf(), request.clone()));
            Ok(())
        }
    }

    fn degree_table() -> DegreeTable {
        let mut table = DegreeTable::new("MIN DEGREE");
        for (condition, degree) in [("1", 1), ("1", 2), ("2", 3)] {
            table.push(DegreeRecord {
                condition: Some(ConditionValue::parse(condition)),
                degree,
            });
        }
        table
    }

    #[test]
    fn creates_missing_folders_and_writes_one_file() {
        let out = tempdir().unwrap();
        let settings = ChartSettings::default();
        let dispatcher = ChartDispatcher::new(Recorder::default(), settings.clone());
        let spec = ChartSpec::degree_distribution(&settings, "1 - 4", out.path());

        let table = degree_table();
        let written = dispatcher.render(ChartData::Degrees(&table), &spec).unwrap();

        assert_eq!(written, out.path().join("degrees/1 - 4/Degrees.jpg"));
        assert!(written.is_file());
        let calls = dispatcher.renderer().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.legend_labels().is_empty());
    }

    #[test]
    fn rejects_mismatched_kind() {
        let out = tempdir().unwrap();
        let settings = ChartSettings::default();
        let dispatcher = ChartDispatcher::new(Recorder::default(), settings.clone());
        let spec = ChartSpec::win(&settings, Allocation::Random, "1 - 4", out.path());

        let table = degree_table();
        let err = dispatcher.render(ChartData::Degrees(&table), &spec).unwrap_err();
        assert!(matches!(err, AggregationError::InvalidChart(_)));
        assert!(dispatcher.renderer().calls.borrow().is_empty());
    }

    #[test]
    fn empty_table_is_not_rendered() {
        let out = tempdir().unwrap();
        let settings = ChartSettings::default();
        let dispatcher = ChartDispatcher::new(Recorder::default(), settings.clone());
        let spec = ChartSpec::percent_infected(&settings, Allocation::Mixed, "1 - 4", out.path());

        let table = RunTable::new("MIN DEGREE");
        assert!(dispatcher.render(ChartData::Infections(&table), &spec).is_err());
        assert!(!spec.output_path.exists());
    }
}
