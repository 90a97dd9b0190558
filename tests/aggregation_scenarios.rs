// tests/aggregation_scenarios.rs
use defence_chart_aggregator::aggregation::{AggregationEngine, Allocation, TableKey};
use defence_chart_aggregator::charts::{
    ChartData, ChartDispatcher, ChartKind, ChartRenderer, ChartSpec, RenderRequest,
};
use defence_chart_aggregator::charts::series::condition_axis;
use defence_chart_aggregator::config::{ChartSettings, PipelineConfig};
use defence_chart_aggregator::error::Result;
use defence_chart_aggregator::pipeline::{write_summary, JobOutcome, ReportPipeline};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingRenderer {
    calls: RefCell<Vec<(PathBuf, RenderRequest)>>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, request: &RenderRequest, output: &Path) -> Result<()> {
        fs::write(output, b"image").expect("output folder should exist");
        self.calls
            .borrow_mut()
            .push((output.to_path_buf(), request.clone()));
        Ok(())
    }
}

fn write_file(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn condition_dir(root: &Path, graph: &str, range: &str, condition: &str) -> PathBuf {
    root.join(format!("{} {}", graph, range)).join(condition)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn mixed_rows_are_stacked_in_condition_order() {
    let root = TempDir::new().unwrap();
    // Created out of order on purpose
    for condition in ["1.00", "0.05", "0.10"] {
        write_file(
            &condition_dir(root.path(), "Erdos Renyi", "0 - 1", condition).join("Mixed/MixedData1.csv"),
            "STRATEGY,INFECTED\n0,5\n1,10\n2,15\n",
        );
    }

    let engine = AggregationEngine::new(root.path(), "P VALUE");
    let tables = engine
        .aggregate(&strings(&["Erdos Renyi"]), &strings(&["0 - 1"]), &[Allocation::Mixed])
        .unwrap();
    let mixed = &tables[&TableKey::new("Erdos Renyi", "0 - 1", Allocation::Mixed)];

    assert_eq!(mixed.condition_column(), "P VALUE");
    assert_eq!(mixed.len(), 9);
    let tags: Vec<&str> = mixed
        .rows()
        .iter()
        .map(|r| r.condition.as_ref().unwrap().raw())
        .collect();
    assert_eq!(
        tags,
        vec!["0.05", "0.05", "0.05", "0.10", "0.10", "0.10", "1.00", "1.00", "1.00"]
    );
}

#[test]
fn row_count_is_the_sum_of_fragments() {
    let root = TempDir::new().unwrap();
    let set = [("2", 4), ("10", 1), ("3", 2)];
    for (condition, rows) in set {
        let mut body = String::from("STRATEGY,INFECTED,TIME\n");
        for i in 0..rows {
            body.push_str(&format!("{},{},{}\n", i % 3, i + 1, i * 7));
        }
        let dir = condition_dir(root.path(), "Tree", "1 - 10", condition).join("Random");
        write_file(&dir.join("RandomData1.csv"), &body);
        write_file(&dir.join("RandomData2.csv"), "STRATEGY,INFECTED\n0,1\n");
    }

    let engine = AggregationEngine::new(root.path(), "MIN DEGREE");
    let tables = engine
        .aggregate(&strings(&["Tree"]), &strings(&["1 - 10"]), &[Allocation::Random])
        .unwrap();
    let random = &tables[&TableKey::new("Tree", "1 - 10", Allocation::Random)];

    assert_eq!(random.len(), 4 + 1 + 2 + 3);
    assert_eq!(random.extra_columns(), ["TIME".to_string()]);
    let order: Vec<String> = random.conditions().iter().map(|c| c.to_string()).collect();
    assert_eq!(order, vec!["2", "3", "10"]);
}

#[test]
fn missing_allocation_folder_gives_an_empty_table() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(condition_dir(root.path(), "Random Graph", "5 - 250", "25-250").join("Mixed"))
        .unwrap();

    let engine = AggregationEngine::new(root.path(), "NUMBER OF EDGES");
    let tables = engine
        .aggregate_pair("Random Graph", "5 - 250", &[Allocation::Deterministic])
        .unwrap();

    assert!(tables[&Allocation::Deterministic].is_empty());
    assert_eq!(engine.conditions("Random Graph", "5 - 250").unwrap().len(), 1);
}

#[test]
fn winner_file_renders_one_relabelled_chart() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_file(
        &root.path().join("Tree 1 - 4").join("DeterministicWinner.csv"),
        "MIN DEGREE,DEFENCE STRATEGY,NUMBER OF WINS\n\
         1,0,12\n1,1,5\n1,2,3\n\
         2,0,8\n2,1,9\n2,2,3\n",
    );

    let settings = ChartSettings::default();
    let engine = AggregationEngine::new(root.path(), settings.parameter_label.as_str());
    let table = engine
        .winners("Tree", "1 - 4", Allocation::Deterministic)
        .unwrap()
        .expect("winner file is present");

    let dispatcher = ChartDispatcher::new(RecordingRenderer::default(), settings.clone());
    let spec = ChartSpec::win(&settings, Allocation::Deterministic, "1 - 4", out.path());
    let written = dispatcher.render(ChartData::Wins(&table), &spec).unwrap();

    let expected = out.path().join("winners/1 - 4/Deterministic.jpg");
    assert_eq!(written, expected);
    assert!(expected.is_file());

    let calls = dispatcher.renderer().calls.borrow();
    assert_eq!(calls.len(), 1);
    let request = &calls[0].1;
    assert_eq!(request.legend_labels(), vec!["Proximity", "Degree", "Protection"]);
    assert_eq!(request.legend_title.as_deref(), Some("Defence Strategies"));
    assert_eq!(request.y_label, "Number of wins");
    assert_eq!(request.categories.len(), 2);
}

#[test]
fn full_pass_continues_past_a_malformed_file() {
    let root = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    write_file(
        &condition_dir(root.path(), "Tree", "1 - 4", "1").join("Mixed/MixedData1.csv"),
        "STRATEGY,INFECTED\n0,10\n1,20\n2,30\n",
    );
    write_file(
        &condition_dir(root.path(), "Tree", "5 - 8", "5").join("Mixed/MixedData1.csv"),
        "STRATEGY,INFECTED\n0,ten\n",
    );
    write_file(
        &condition_dir(root.path(), "Tree", "1 - 4", "1").join("graphs/g1.csv"),
        "0,1,1\n1,0,0\n1,0,0\n",
    );

    let config = PipelineConfig {
        root_path: root.path().to_path_buf(),
        output_root: out.path().to_path_buf(),
        graph_types: strings(&["Tree"]),
        parameter_ranges: strings(&["1 - 4", "5 - 8"]),
        allocation_strategies: vec![Allocation::Mixed],
        ..PipelineConfig::default()
    };
    let pipeline = ReportPipeline::new(config, RecordingRenderer::default());
    let summary = pipeline.run();

    let written = summary.written();
    assert_eq!(written.len(), 2);
    assert!(out.path().join("percent_infected/1 - 4/Mixed.jpg").is_file());
    assert!(out.path().join("degrees/1 - 4/Degrees.jpg").is_file());

    let failures = summary.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].job.kind, ChartKind::PercentInfected);
    assert_eq!(failures[0].job.range, "5 - 8");
    match &failures[0].outcome {
        JobOutcome::Failed { error } => assert!(error.contains("MixedData1.csv")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(out.path().join("logs/chart_failures.log").is_file());

    let summary_path = write_summary(&summary, out.path()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(summary_path).unwrap()).unwrap();
    assert_eq!(json["jobs"].as_array().unwrap().len(), summary.jobs.len());
}

#[test]
fn mixed_numeric_and_label_conditions_order_and_place_by_index() {
    let root = TempDir::new().unwrap();
    for condition in ["abc", "25-250", "1.5", "0.05"] {
        write_file(
            &condition_dir(root.path(), "Random Graph", "mixed", condition)
                .join("Random/RandomData1.csv"),
            "STRATEGY,INFECTED\n0,5\n",
        );
    }

    let engine = AggregationEngine::new(root.path(), "NUMBER OF EDGES");
    let conditions = engine.conditions("Random Graph", "mixed").unwrap();
    let names: Vec<&str> = conditions.iter().map(|c| c.raw_identifier()).collect();
    assert_eq!(names, vec!["0.05", "1.5", "25-250", "abc"]);
    assert!(conditions.windows(2).all(|w| w[0].value < w[1].value));
    assert_eq!(conditions[1].value.as_f64(), Some(1.5));
    assert_eq!(conditions[2].value.as_f64(), None);

    let table = engine.load_allocation(&conditions, Allocation::Random).unwrap();
    let (values, categories) = condition_axis(table.rows());
    assert_eq!(values.len(), 4);
    let labels: Vec<&str> = categories.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, names);
    let positions: Vec<f64> = categories.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0.0, 1.0, 2.0, 3.0]);
}
