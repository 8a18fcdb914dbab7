use sketch_ir::{
    elementwise_chain, matmul, matmul_relu, IrSchedule, LoopKind, INLINED_ANNOTATION,
};

#[test]
fn blocks_enumerate_in_declaration_order() {
    let schedule = IrSchedule::new(matmul_relu(64, 64, 32));
    assert_eq!(schedule.block_names(), vec!["C", "D"]);
    assert!(schedule.has_block("C"));
    assert!(!schedule.has_block("E"));
    let consumers = schedule.consumers("C").unwrap();
    assert_eq!(consumers.len(), 1);
    assert_eq!(consumers[0].name, "D");
}

#[test]
fn compute_inline_rewrites_consumers() {
    let mut schedule = IrSchedule::new(elementwise_chain(3, 16, 16).unwrap());
    schedule.compute_inline("T0").unwrap();
    assert_eq!(schedule.block_names(), vec!["T1", "T2"]);
    let t1 = schedule.get_block("T1").unwrap();
    assert_eq!(t1.reads, vec!["X"]);
    assert_eq!(t1.body, "(X[i, j] * 2)[i, j] + 1");
    assert_eq!(t1.annotation(INLINED_ANNOTATION), Some("T0"));

    schedule.compute_inline("T1").unwrap();
    let t2 = schedule.get_block("T2").unwrap();
    assert_eq!(t2.annotation(INLINED_ANNOTATION), Some("T1"));
    assert_eq!(t2.reads, vec!["X"]);
}

#[test]
fn compute_inline_rejects_reductions() {
    let mut schedule = IrSchedule::new(matmul_relu(8, 8, 8));
    let err = schedule.compute_inline("C").unwrap_err();
    assert_eq!(err.info().code, "inline-reduction");
    assert!(schedule.has_block("C"));
}

#[test]
fn split_and_reorder_preserve_iteration_space() {
    let mut schedule = IrSchedule::new(matmul(64, 32, 16));
    let before = schedule.get_block("C").unwrap().iteration_count();
    let vars = schedule.split("C", 0, &[8, 8]).unwrap();
    assert_eq!(vars, vec!["i_0", "i_1"]);
    schedule.reorder("C", &[0, 2, 1, 3]).unwrap();
    let block = schedule.get_block("C").unwrap();
    assert_eq!(block.iteration_count(), before);
    let order: Vec<&str> = block.loops.iter().map(|lp| lp.var.as_str()).collect();
    assert_eq!(order, vec!["i_0", "j", "i_1", "k"]);
    assert_eq!(block.loops[3].kind, LoopKind::Reduce);
}

#[test]
fn split_rejects_bad_factors() {
    let mut schedule = IrSchedule::new(matmul(64, 32, 16));
    assert_eq!(
        schedule.split("C", 0, &[7, 9]).unwrap_err().info().code,
        "factor-mismatch"
    );
    assert_eq!(
        schedule.split("C", 0, &[]).unwrap_err().info().code,
        "invalid-factors"
    );
    assert_eq!(
        schedule.split("C", 5, &[64]).unwrap_err().info().code,
        "loop-out-of-range"
    );
    assert_eq!(
        schedule.split("Z", 0, &[64]).unwrap_err().info().code,
        "unknown-block"
    );
    assert_eq!(
        schedule.reorder("C", &[0, 0, 1]).unwrap_err().info().code,
        "invalid-permutation"
    );
}

#[test]
fn clones_are_independent() {
    let original = IrSchedule::new(matmul_relu(16, 16, 16));
    let mut branch = original.clone();
    branch.annotate_block("C", "tiled", "4").unwrap();
    branch.annotate_loop("D", 0, "unroll", "16").unwrap();
    assert!(original.get_block("C").unwrap().annotations.is_empty());
    assert!(original.get_block("D").unwrap().loops[0].annotations.is_empty());
    assert_ne!(original, branch);
}

#[test]
fn debug_string_renders_nest() {
    let mut schedule = IrSchedule::new(matmul(4, 4, 4));
    schedule.annotate_block("C", "tiled", "2").unwrap();
    let rendered = schedule.debug_string();
    assert!(rendered.starts_with("func fn_matmul {\n  block C [tiled=2] {\n"));
    assert!(rendered.contains("for (k, 0, 4) reduce"));
    assert!(rendered.contains("// reads: A, B"));
}

#[test]
fn inlining_an_unnamed_tensor_is_rejected() {
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
    let mut schedule = IrSchedule::new(module);
    let err = schedule.compute_inline("P").unwrap_err();
    assert_eq!(err.info().code, "empty-tensor-name");
    assert_eq!(schedule.block_names(), vec!["P", "Q"]);
}
