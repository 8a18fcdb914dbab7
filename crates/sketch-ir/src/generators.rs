use rand::Rng;
use sketch_core::errors::{ErrorInfo, SketchError};

use crate::ir::{Loop, LoweredFunc, ModuleExpr, ScheduleBlock};

const ELEMENTWISE_OPS: [&str; 4] = ["{x} * 2", "{x} + 1", "max({x}, 0)", "exp({x})"];

/// Builds `C[i, j] += A[i, k] * B[k, j]` as a single reduction block named `C`.
pub fn matmul(m: u64, n: u64, k: u64) -> ModuleExpr {
    ModuleExpr::new(vec![LoweredFunc::new("fn_matmul", vec![matmul_block(m, n, k)])])
}

/// Builds a matmul followed by an elementwise ReLU block `D` reading `C`.
pub fn matmul_relu(m: u64, n: u64, k: u64) -> ModuleExpr {
    let relu = ScheduleBlock::new(
        "D",
        vec![Loop::spatial("i", m), Loop::spatial("j", n)],
        vec!["C".to_string()],
        "D",
        "max(C[i, j], 0)",
    );
    ModuleExpr::new(vec![LoweredFunc::new(
        "fn_matmul_relu",
        vec![matmul_block(m, n, k), relu],
    )])
}

/// Builds a chain `T0 = X * 2, T1 = T0 + 1, ...` over a 2-D iteration space.
///
/// Block `T{len-1}` writes the chain's output tensor.
pub fn elementwise_chain(len: usize, rows: u64, cols: u64) -> Result<ModuleExpr, SketchError> {
    let ops: Vec<&str> = (0..len)
        .map(|idx| ELEMENTWISE_OPS[idx % ELEMENTWISE_OPS.len()])
        .collect();
    build_chain(&ops, rows, cols)
}

/// Builds an elementwise chain with operations and extents drawn from `rng`.
pub fn gen_random_chain<R: Rng>(
    len: usize,
    rng: &mut R,
) -> Result<ModuleExpr, SketchError> {
    const EXTENTS: [u64; 5] = [8, 16, 24, 32, 64];
    let rows = EXTENTS[rng.gen_range(0..EXTENTS.len())];
    let cols = EXTENTS[rng.gen_range(0..EXTENTS.len())];
    let ops: Vec<&str> = (0..len)
        .map(|_| ELEMENTWISE_OPS[rng.gen_range(0..ELEMENTWISE_OPS.len())])
        .collect();
    build_chain(&ops, rows, cols)
}

fn build_chain(ops: &[&str], rows: u64, cols: u64) -> Result<ModuleExpr, SketchError> {
    if ops.is_empty() {
        return Err(SketchError::Schedule(ErrorInfo::new(
            "empty-chain",
            "elementwise chain requires at least one block",
        )));
    }
    let mut blocks = Vec::with_capacity(ops.len());
    let mut input = "X".to_string();
    for (idx, op) in ops.iter().enumerate() {
        let name = format!("T{idx}");
        let body = op.replace("{x}", &format!("{input}[i, j]"));
        blocks.push(ScheduleBlock::new(
            name.clone(),
            vec![Loop::spatial("i", rows), Loop::spatial("j", cols)],
            vec![input.clone()],
            name.clone(),
            body,
        ));
        input = name;
    }
    Ok(ModuleExpr::new(vec![LoweredFunc::new("fn_chain", blocks)]))
}

fn matmul_block(m: u64, n: u64, k: u64) -> ScheduleBlock {
    ScheduleBlock::new(
        "C",
        vec![Loop::spatial("i", m), Loop::spatial("j", n), Loop::reduce("k", k)],
        vec!["A".to_string(), "B".to_string()],
        "C",
        "C[i, j] + A[i, k] * B[k, j]",
    )
}
