//! End-to-end tests for the phonecsv row pipeline.
//!
//! Each test writes a small CSV fixture to its own `TempDir`, runs it through
//! the same path the CLI takes (read, resolve columns, run the pipeline,
//! write) and reads the output back with the `csv` crate.
//!
//! Data-row order in the output follows worker completion by default, so
//! tests compare rows as sets unless they request input order explicitly.

use phonecsv::fields::resolve_indexes;
use phonecsv::identifier::{IdSource, RandomUuid};
use phonecsv::models::OutputOrder;
use phonecsv::pipeline::{run_pipeline, run_pipeline_with, PipelineConfig};
use phonecsv::stats::PipelineStats;
use phonecsv::{sink, source};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes `contents` to `name` inside `dir` and returns the path.
fn fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read_back(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn is_uuid_v4(s: &str) -> bool {
    uuid::Uuid::parse_str(s)
        .map(|u| u.get_version_num() == 4)
        .unwrap_or(false)
        && s.len() == 36
}

fn process(input: &Path, output: &Path, columns: &[&str], config: &PipelineConfig) {
    let table = source::read_table(input).unwrap();
    let targets = resolve_indexes(&table.header, columns);
    let outcome = run_pipeline(table, &targets, config).unwrap();
    sink::write_matrix(output, &outcome.matrix).unwrap();
}

#[test]
fn single_contact_is_normalized_and_tagged() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path(), "in.csv", "name,phone\nAl,(555) 123-4567\n");
    let output = dir.path().join("out.csv");

    process(&input, &output, &["phone"], &PipelineConfig::default());

    let rows = read_back(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec!["name", "phone", "uuid"]);
    assert_eq!(rows[1][..2], ["Al", "5551234567"]);
    assert!(is_uuid_v4(&rows[1][2]));
}

#[test]
fn multiple_columns_and_untouched_fields() {
    let dir = TempDir::new().unwrap();
    let input = fixture(
        dir.path(),
        "in.csv",
        "name,home,note,mobile\n\
         Al,555-0100,call after 5,+1 (206) 555-0199\n\
         Bo,n/a,\"x, y\",206.555.0111\n",
    );
    let output = dir.path().join("out.csv");

    process(&input, &output, &["mobile", "home"], &PipelineConfig::default());

    let rows = read_back(&output);
    assert_eq!(rows[0], vec!["name", "home", "note", "mobile", "uuid"]);

    let data: HashSet<Vec<String>> = rows[1..].iter().map(|r| r[..4].to_vec()).collect();
    let expected: HashSet<Vec<String>> = [
        vec!["Al", "5550100", "call after 5", "12065550199"],
        vec!["Bo", "", "x, y", "2065550111"],
    ]
    .into_iter()
    .map(|r| r.into_iter().map(str::to_string).collect())
    .collect();
    assert_eq!(data, expected);
}

#[test]
fn blank_lines_never_reach_output() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path(), "in.csv", "name,phone\n\nAl,1\n\n\nBo,2\n\n");
    let output = dir.path().join("out.csv");

    process(&input, &output, &["phone"], &PipelineConfig::default());

    let rows = read_back(&output);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.len() == 3));
}

#[test]
fn unknown_column_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path(), "in.csv", "name,phone\nAl,(555) 123-4567\n");
    let output = dir.path().join("out.csv");

    process(&input, &output, &["fax"], &PipelineConfig::default());

    let rows = read_back(&output);
    assert_eq!(rows[1][..2], ["Al", "(555) 123-4567"]);
}

#[test]
fn large_file_keeps_every_row_once() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("id,phone\n");
    for i in 0..2000 {
        contents.push_str(&format!("{i},({:03}) 555-{:04}\n", i % 1000, i));
    }
    let input = fixture(dir.path(), "in.csv", &contents);
    let output = dir.path().join("out.csv");

    let config = PipelineConfig {
        workers: 16,
        ..PipelineConfig::default()
    };
    process(&input, &output, &["phone"], &config);

    let rows = read_back(&output);
    assert_eq!(rows.len(), 2001);

    let ids: HashSet<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids.len(), 2000);
    let uuids: HashSet<&str> = rows[1..].iter().map(|r| r[2].as_str()).collect();
    assert_eq!(uuids.len(), 2000);
    assert!(rows[1..]
        .iter()
        .all(|r| r[1].chars().all(|c| c.is_ascii_digit())));
}

#[test]
fn preserve_order_matches_input() {
    let dir = TempDir::new().unwrap();
    let mut contents = String::from("id,phone\n");
    for i in 0..500 {
        contents.push_str(&format!("{i},555-{i}\n"));
    }
    let input = fixture(dir.path(), "in.csv", &contents);
    let output = dir.path().join("out.csv");

    let config = PipelineConfig {
        workers: 8,
        order: OutputOrder::Input,
        show_progress: false,
    };
    process(&input, &output, &["phone"], &config);

    let rows = read_back(&output);
    for (i, row) in rows[1..].iter().enumerate() {
        assert_eq!(row[0], i.to_string());
        assert_eq!(row[1], format!("555{i}"));
    }
}

#[test]
fn generation_failure_leaves_no_output() {
    struct NoEntropy;

    impl IdSource for NoEntropy {
        fn next_id(&self) -> anyhow::Result<String> {
            anyhow::bail!("getrandom failed")
        }
    }

    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path(), "in.csv", "name,phone\nAl,1\nBo,2\n");
    let output = dir.path().join("out.csv");

    let table = source::read_table(&input).unwrap();
    let targets = resolve_indexes(&table.header, &["phone"]);
    let result = run_pipeline_with(
        table,
        &targets,
        &NoEntropy,
        &PipelineConfig::default(),
        &PipelineStats::new(),
    );

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("getrandom failed"));
    assert!(!output.exists());
}

#[test]
fn stats_track_the_run() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path(), "in.csv", "a,b,c\n1-1,2-2,3-3\n4-4,5-5,6-6\n");

    let table = source::read_table(&input).unwrap();
    let targets = resolve_indexes(&table.header, &["a", "c"]);
    let stats = PipelineStats::new();
    let outcome = run_pipeline_with(
        table,
        &targets,
        &RandomUuid,
        &PipelineConfig::default(),
        &stats,
    )
    .unwrap();

    assert_eq!(outcome.matrix.row_count(), 3);
    assert_eq!(stats.seeded(), 2);
    assert_eq!(stats.transformed(), 2);
    assert_eq!(stats.collected(), 2);
    assert_eq!(stats.normalized(), 4);
}

#[test]
fn malformed_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = fixture(dir.path(), "in.csv", "name,phone\nAl,1,extra\n");
    assert!(source::read_table(&input).is_err());
}

#[test]
fn latin1_name_does_not_block_normalization() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.csv");
    fs::write(&input, b"name,phone\nJos\xe9,(555) 123-4567\nAl,555.987.6543\n").unwrap();
    let output = dir.path().join("out.csv");

    process(&input, &output, &["phone"], &PipelineConfig::default());

    let rows = read_back(&output);
    assert_eq!(rows.len(), 3);
    let phones: HashSet<(String, String)> = rows[1..]
        .iter()
        .map(|r| (r[0].clone(), r[1].clone()))
        .collect();
    assert!(phones.contains(&("Jos\u{FFFD}".to_string(), "5551234567".to_string())));
    assert!(phones.contains(&("Al".to_string(), "5559876543".to_string())));
}
