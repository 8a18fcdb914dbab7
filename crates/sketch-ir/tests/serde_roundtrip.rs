use sketch_ir::{
    canonical_hash, matmul_relu, module_from_bytes, module_from_json, module_to_bytes,
    module_to_json, IrSchedule,
};

#[test]
fn module_roundtrips_through_json_and_bytes() {
    let mut schedule = IrSchedule::new(matmul_relu(32, 32, 8));
    schedule.split("C", 1, &[4, 8]).unwrap();
    schedule.annotate_loop("D", 0, "auto_unroll_max_step", "16").unwrap();

    let json = module_to_json(schedule.module()).unwrap();
    let from_json = IrSchedule::new(module_from_json(&json).unwrap());
    assert_eq!(canonical_hash(&schedule), canonical_hash(&from_json));

    let bytes = module_to_bytes(schedule.module()).unwrap();
    let from_bytes = IrSchedule::new(module_from_bytes(&bytes).unwrap());
    assert_eq!(schedule, from_bytes);
}

#[test]
fn hash_tracks_structure() {
    let base = IrSchedule::new(matmul_relu(32, 32, 8));
    let mut changed = base.clone();
    assert_eq!(canonical_hash(&base), canonical_hash(&changed));
    changed.annotate_block("D", "note", "x").unwrap();
    assert_ne!(canonical_hash(&base), canonical_hash(&changed));
    assert_eq!(canonical_hash(&base).len(), 64);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = module_from_json("{not json").unwrap_err();
    assert_eq!(err.info().code, "deserialize-json");
}
