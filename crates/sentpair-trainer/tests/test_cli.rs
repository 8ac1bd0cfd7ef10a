mod common;

use clap::Parser;
use sentpair_trainer::checkpoint::{sidecar_path, tensor_names};
use sentpair_trainer::cli::{run, Cli};
use sentpair_trainer::scalars::ScalarRecord;

fn cli_for(task: &str, dir: &std::path::Path, extra: &[&str]) -> Cli {
    let data_dir = dir.to_string_lossy().to_string();
    let outfile = dir.join("models").join("best.safetensors");
    let outfile = outfile.to_string_lossy().to_string();
    let scalars = dir.join("scalars.jsonl");
    let scalars = scalars.to_string_lossy().to_string();

    let mut args = vec![
        "train",
        "--task",
        task,
        "--data-dir",
        data_dir.as_str(),
        "--model-outfile",
        outfile.as_str(),
        "--scalar-log",
        scalars.as_str(),
        "--epochs",
        "2",
        "--batch-size",
        "8",
    ];
    args.extend_from_slice(extra);
    Cli::parse_from(args)
}

#[test]
fn trecqa_run_writes_checkpoint_and_scalars() {
    let dir = tempfile::tempdir().unwrap();
    common::write_splits(dir.path(), true);

    let cli = cli_for("trecqa", dir.path(), &[]);
    let report = run(&cli).unwrap();
    assert!(report.best_epoch.is_some());

    let weights = dir.path().join("models").join("best.safetensors");
    assert!(weights.exists());
    assert!(sidecar_path(&weights).exists());
    assert!(tensor_names(&weights)
        .unwrap()
        .contains(&"hidden.weight".to_string()));

    let records: Vec<ScalarRecord> = std::fs::read_to_string(dir.path().join("scalars.jsonl"))
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let tags: Vec<&str> = records.iter().map(|r| r.tag.as_str()).collect();
    assert!(tags.contains(&"trecqa/train/map"));
    assert!(tags.contains(&"trecqa/train/cross_entropy_loss"));
    assert!(tags.contains(&"trecqa/dev/mrr"));
    assert!(tags.contains(&"trecqa/lr"));
    assert!(records.iter().all(|r| r.step >= 1 && r.step <= 2));
}

#[test]
fn msrp_run_with_sgd_and_no_test() {
    let dir = tempfile::tempdir().unwrap();
    common::write_splits(dir.path(), false);
    std::fs::remove_file(dir.path().join("test.jsonl")).unwrap();

    let cli = cli_for("msrp", dir.path(), &["--optimizer", "sgd", "--skip-test"]);
    let report = run(&cli).unwrap();
    assert!(report.epochs_run >= 1);
    assert!(report.history[0].dev.get("f1").is_some());
}

#[test]
fn missing_dev_split_fails() {
    let dir = tempfile::tempdir().unwrap();
    common::write_splits(dir.path(), false);
    std::fs::remove_file(dir.path().join("dev.jsonl")).unwrap();

    let cli = cli_for("msrp", dir.path(), &[]);
    let err = run(&cli).unwrap_err();
    assert!(err.to_string().contains("dev split not found"));
}
