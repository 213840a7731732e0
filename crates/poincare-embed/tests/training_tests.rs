//! End-to-end training runs against files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use poincare_embed::{
    checkpoint_path, poincare_distance, read_vectors, EmbedError, TrainConfig, Trainer,
};

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

const TRIANGLE: &str = "A\tB\nB\tC\nA\tC\n";

fn write_graph(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("graph.tsv");
    fs::write(&path, text).unwrap();
    path
}

fn config(dir: &Path, graph: PathBuf, output: &str) -> TrainConfig {
    TrainConfig {
        graph,
        output_vectors: dir.join(output),
        dimension: 2,
        epochs: 1,
        threads: 1,
        number_negatives: 1,
        distribution_power: 0.0,
        seed: 7,
        negative_table_size: 1_000,
        ..Default::default()
    }
}

fn load_all(path: &Path) -> Vec<(String, Vec<f64>)> {
    read_vectors(path).unwrap().map(|r| r.unwrap()).collect()
}

// ─────────────────────────────────────────────
// Determinism and output format
// ─────────────────────────────────────────────

#[test]
fn single_thread_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);

    Trainer::run(config(dir.path(), graph.clone(), "first.vec")).unwrap();
    Trainer::run(config(dir.path(), graph, "second.vec")).unwrap();

    let first = fs::read(dir.path().join("first.vec")).unwrap();
    let second = fs::read(dir.path().join("second.vec")).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn output_lists_every_node_in_first_seen_order() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);
    let cfg = config(dir.path(), graph, "out.vec");
    let output = cfg.output_vectors.clone();

    let report = Trainer::run(cfg).unwrap();
    assert_eq!(report.edges_per_epoch, 3);

    let rows = load_all(&output);
    let names: Vec<&str> = rows.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    for (_, coords) in &rows {
        assert_eq!(coords.len(), 2);
        let sq: f64 = coords.iter().map(|c| c * c).sum();
        assert!(sq < 1.0);
    }
}

#[test]
fn different_seeds_give_different_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);

    Trainer::run(config(dir.path(), graph.clone(), "a.vec")).unwrap();
    let cfg = TrainConfig { seed: 8, ..config(dir.path(), graph, "b.vec") };
    Trainer::run(cfg).unwrap();

    let a = fs::read(dir.path().join("a.vec")).unwrap();
    let b = fs::read(dir.path().join("b.vec")).unwrap();
    assert_ne!(a, b);
}

// ─────────────────────────────────────────────
// Input vectors
// ─────────────────────────────────────────────

#[test]
fn zero_epochs_preserve_input_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);
    let input = dir.path().join("input.vec");
    fs::write(&input, "A 0.1 -0.2\n").unwrap();

    let cfg = TrainConfig {
        epochs: 0,
        input_vectors: Some(input),
        ..config(dir.path(), graph, "out.vec")
    };
    let output = cfg.output_vectors.clone();
    let report = Trainer::run(cfg).unwrap();
    assert_eq!(report.epochs, 0);
    assert!(report.final_performance.is_none());

    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().next(), Some("A 0.1 -0.2"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn input_vectors_naming_unknown_node_fail() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);
    let input = dir.path().join("input.vec");
    fs::write(&input, "Z 0.1 0.1\n").unwrap();

    let cfg = TrainConfig {
        input_vectors: Some(input),
        ..config(dir.path(), graph, "out.vec")
    };
    let output = cfg.output_vectors.clone();
    let err = Trainer::run(cfg).unwrap_err();
    assert!(matches!(err, EmbedError::UnknownNode(ref n) if n == "Z"));
    assert!(!output.exists());
}

// ─────────────────────────────────────────────
// Checkpoints
// ─────────────────────────────────────────────

#[test]
fn checkpoint_every_epoch_writes_three_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);
    let cfg = TrainConfig {
        epochs: 3,
        checkpoint_interval: Some(1),
        ..config(dir.path(), graph, "out.vec")
    };
    let output = cfg.output_vectors.clone();

    let report = Trainer::run(cfg).unwrap();
    let expected: Vec<PathBuf> = (1..=3).map(|e| checkpoint_path(&output, e)).collect();
    assert_eq!(report.checkpoints, expected);

    for path in &expected {
        assert_eq!(load_all(path).len(), 3);
    }
    assert!(dir.path().join("out.vec-after-000003-epochs").exists());
    assert!(!dir.path().join("out.vec-after-000000-epochs").exists());

    // final checkpoint and output hold the same table
    assert_eq!(fs::read(&expected[2]).unwrap(), fs::read(&output).unwrap());

    let files = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(files, 1 + 1 + 3, "graph, output and three checkpoints");
}

// ─────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────

#[test]
fn malformed_graph_fails_without_output() {
    for text in ["A\tB\tC\n", "A\tB\nA\n"] {
        let dir = tempfile::tempdir().unwrap();
        let graph = write_graph(dir.path(), text);
        let cfg = config(dir.path(), graph, "out.vec");
        let output = cfg.output_vectors.clone();

        let err = Trainer::run(cfg).unwrap_err();
        assert!(matches!(err, EmbedError::Format { .. }), "{text:?}: {err}");
        assert!(!output.exists());
    }
}

#[test]
fn triangle_at_power_one_is_refused_without_output() {
    // A is never a target, so at power 1 it gets no table slots and
    // A has no candidate negatives left once B and C are excluded
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), TRIANGLE);
    let cfg = TrainConfig {
        distribution_power: 1.0,
        ..config(dir.path(), graph, "out.vec")
    };
    let output = cfg.output_vectors.clone();

    let err = Trainer::run(cfg).unwrap_err();
    assert!(
        matches!(err, EmbedError::SamplerExhaustion { ref node, .. } if node == "A"),
        "{err}"
    );
    assert!(!output.exists());
}

#[test]
fn empty_graph_writes_empty_output() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), "");
    let cfg = config(dir.path(), graph, "out.vec");
    let output = cfg.output_vectors.clone();

    let report = Trainer::run(cfg).unwrap();
    assert_eq!(report.edges_per_epoch, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn missing_graph_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), dir.path().join("absent.tsv"), "out.vec");
    assert!(matches!(Trainer::run(cfg), Err(EmbedError::Io { .. })));
}

// ─────────────────────────────────────────────
// Embedding quality
// ─────────────────────────────────────────────

#[test]
fn linked_nodes_end_up_closer_than_unlinked_ones() {
    // two disjoint stars: hub → leaves
    let mut text = String::new();
    for leaf in 0..6 {
        text.push_str(&format!("x\tx{leaf}\n"));
        text.push_str(&format!("y\ty{leaf}\n"));
    }
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), &text);
    let cfg = TrainConfig {
        dimension: 5,
        epochs: 200,
        number_negatives: 5,
        init_range: 1e-3,
        start_lr: 0.3,
        end_lr: 0.05,
        ..config(dir.path(), graph, "out.vec")
    };
    let output = cfg.output_vectors.clone();
    Trainer::run(cfg).unwrap();

    let rows = load_all(&output);
    let get = |name: &str| {
        rows.iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.clone())
            .unwrap()
    };
    let x = get("x");
    let linked: f64 = (0..6).map(|i| poincare_distance(&x, &get(&format!("x{i}")))).sum();
    let unlinked: f64 = (0..6).map(|i| poincare_distance(&x, &get(&format!("y{i}")))).sum();
    assert!(linked < unlinked, "linked={linked} unlinked={unlinked}");
}
