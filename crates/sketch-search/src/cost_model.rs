use sketch_core::Target;
use sketch_ir::{ModuleExpr, ScheduleBlock};

use crate::auto_unroll::UNROLL_ANNOTATION;
use crate::multi_level_tiling::TILING_ANNOTATION;

/// Predicts the execution cost of a scheduled module; lower is better.
pub trait ExprCostModel {
    /// Returns the predicted cost of `module` on `target`.
    fn predict(&self, module: &ModuleExpr, target: &Target) -> f64;
}

/// Reference model scoring each block by its iteration count.
///
/// Tiled blocks and blocks carrying an unroll budget are discounted, and the
/// sum is spread over the target's threads on GPUs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopCostModel {
    /// Multiplier applied to blocks annotated by tiling.
    pub tiling_discount: f64,
    /// Multiplier applied to blocks whose root loop carries an unroll budget.
    pub unroll_discount: f64,
}

impl Default for LoopCostModel {
    fn default() -> Self {
        Self {
            tiling_discount: 0.5,
            unroll_discount: 0.8,
        }
    }
}

impl LoopCostModel {
    fn block_cost(&self, block: &ScheduleBlock) -> f64 {
        let mut cost = block.iteration_count() as f64;
        if block.annotation(TILING_ANNOTATION).is_some() {
            cost *= self.tiling_discount;
        }
        let unrolled = block
            .loops
            .first()
            .map_or(false, |root| root.annotations.contains_key(UNROLL_ANNOTATION));
        if unrolled {
            cost *= self.unroll_discount;
        }
        cost
    }
}

impl ExprCostModel for LoopCostModel {
    fn predict(&self, module: &ModuleExpr, target: &Target) -> f64 {
        let total: f64 = module.blocks().map(|block| self.block_cost(block)).sum();
        if target.is_gpu() {
            total / f64::from(target.max_threads.max(1))
        } else {
            total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_ir::{matmul, IrSchedule};

    #[test]
    fn tiling_lowers_predicted_cost() {
        let model = LoopCostModel::default();
        let mut schedule = IrSchedule::new(matmul(32, 32, 8));
        let base = model.predict(schedule.module(), &Target::host());
        assert_eq!(base, (32 * 32 * 8) as f64);
        schedule.annotate_block("C", TILING_ANNOTATION, "8").unwrap();
        let tiled = model.predict(schedule.module(), &Target::host());
        assert!(tiled < base);
    }
}
