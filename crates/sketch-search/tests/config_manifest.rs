mod common;

use std::fs;

use common::{matmul_relu_task, seeded_config};
use sketch_search::{
    load_sketches, write_sketches, SearchConfig, SearchSpace, SketchManifest, SketchRecord,
    TuneTask,
};
use tempfile::tempdir;

#[test]
fn yaml_fields_default_when_missing() {
    let config = SearchConfig::from_yaml_str("init_sketch_random_depth: 3\n").unwrap();
    assert_eq!(config.init_sketch_random_depth, 3);
    assert!(!config.use_cost_model);
    assert_eq!(config.init_sketch_strategy, "rule_prune");
    assert_eq!(config.random_prune_probability, 1.0);
    assert_eq!(config.output.manifest_file.to_str(), Some("manifest.json"));
}

#[test]
fn yaml_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("search.yaml");
    let mut config = seeded_config(77);
    config.use_cost_model = true;
    config.seed_policy.label = Some("conv".into());
    fs::write(&path, config.to_yaml().unwrap()).unwrap();
    assert_eq!(SearchConfig::load(&path).unwrap(), config);
}

#[test]
fn invalid_probability_is_rejected() {
    let err = SearchConfig::from_yaml_str("random_prune_probability: 1.5\n").unwrap_err();
    assert!(err.is_config());
    assert_eq!(err.info().code, "invalid-probability");
    let err = SearchConfig::from_yaml_str("init_sketch_random_depth: [1]\n").unwrap_err();
    assert_eq!(err.info().code, "config-parse");
}

#[test]
fn task_json_round_trip() {
    let task = matmul_relu_task();
    let json = task.to_json().unwrap();
    assert_eq!(TuneTask::from_json(&json).unwrap(), task);
}

#[test]
fn manifest_and_sketches_round_trip() {
    let dir = tempdir().unwrap();
    let config = seeded_config(12);
    let mut space = SearchSpace::new(matmul_relu_task(), config.clone()).unwrap();
    let sketches = space.get_initial_sketch(3, "rule_prune").unwrap();
    let records: Vec<SketchRecord> = sketches
        .iter()
        .enumerate()
        .map(|(index, state)| SketchRecord::from_state(index, state))
        .collect();

    let sketches_path = dir.path().join("out").join("sketches.json");
    write_sketches(&sketches_path, &records).unwrap();
    assert_eq!(load_sketches(&sketches_path).unwrap(), records);

    let manifest = SketchManifest {
        task: space.task().name.clone(),
        config,
        master_seed: 12,
        strategy: "rule_prune".into(),
        sketch_hashes: records.iter().map(|record| record.hash.clone()).collect(),
        sketches_file: Some("sketches.json".into()),
    };
    let manifest_path = dir.path().join("out").join("manifest.json");
    manifest.write(&manifest_path).unwrap();
    assert_eq!(SketchManifest::load(&manifest_path).unwrap(), manifest);
}

#[test]
fn missing_manifest_is_a_serde_error() {
    let dir = tempdir().unwrap();
    let err = SketchManifest::load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.info().code, "manifest-read");
}

#[test]
fn unnamed_tensors_are_rejected_at_load() {
    use sketch_core::Target;
    use sketch_ir::{Loop, LoweredFunc, ModuleExpr, ScheduleBlock};

    let producer = ScheduleBlock::new("P", vec![Loop::spatial("i", 8)], vec![], "", "1");
    let consumer = ScheduleBlock::new(
        "Q",
        vec![Loop::spatial("i", 8)],
        vec![String::new()],
        "Q",
        "[i] + 1",
    );
    let module = ModuleExpr::new(vec![LoweredFunc::new("fn_unnamed", vec![producer, consumer])]);
    let task = TuneTask::from_module("unnamed", Target::host(), module, vec!["Q".into()]);

    let err = TuneTask::from_json(&task.to_json().unwrap()).unwrap_err();
    assert!(err.is_config());
    assert_eq!(err.info().code, "empty-tensor-name");
    assert_eq!(err.info().context["field"], "write");

    let err = SearchSpace::new(task, seeded_config(1)).unwrap_err();
    assert_eq!(err.info().code, "empty-tensor-name");
}
