use sketch_core::{SketchError, Target};
use sketch_ir::{IrSchedule, ScheduleBlock};

use crate::rule::{check_apply_index, AutoGenRule, RuleApplyType};
use crate::state::SearchState;

/// Loop annotation holding the maximum unroll step of a nest.
pub const UNROLL_ANNOTATION: &str = "auto_unroll_max_step";

const HOST_MAX_STEPS: [u32; 2] = [16, 64];
const GPU_MAX_STEPS: [u32; 2] = [64, 512];

/// Attaches an unroll budget to the outermost loop of a block.
///
/// Unrolling closes the transformation of a nest, so whole-schedule init
/// reports [`RuleApplyType::ApplyAndSkipThisRule`].
#[derive(Debug, Clone)]
pub struct AutoUnroll {
    target: Target,
    candidates: Vec<(String, u32)>,
}

impl AutoUnroll {
    /// Creates the rule for `target`.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            candidates: Vec::new(),
        }
    }

    /// Unroll budgets tried on the configured target.
    pub fn max_steps(&self) -> &'static [u32] {
        if self.target.is_gpu() {
            &GPU_MAX_STEPS
        } else {
            &HOST_MAX_STEPS
        }
    }

    fn eligible(block: &ScheduleBlock) -> bool {
        block
            .loops
            .first()
            .map_or(false, |root| !root.annotations.contains_key(UNROLL_ANNOTATION))
    }

    fn block_eligible(schedule: &IrSchedule, block_name: &str) -> bool {
        schedule
            .get_block(block_name)
            .map(Self::eligible)
            .unwrap_or(false)
    }
}

fn unroll_block(schedule: &mut IrSchedule, block_name: &str, step: u32) -> Result<(), SketchError> {
    schedule.annotate_loop(block_name, 0, UNROLL_ANNOTATION, step.to_string())
}

impl AutoGenRule for AutoUnroll {
    fn name(&self) -> &str {
        "AutoUnroll"
    }

    fn init(&mut self, schedule: &IrSchedule) -> RuleApplyType {
        let steps = self.max_steps();
        self.candidates = schedule
            .get_all_blocks()
            .into_iter()
            .filter(|block| Self::eligible(block))
            .flat_map(|block| steps.iter().map(move |step| (block.name.clone(), *step)))
            .collect();
        if self.candidates.is_empty() {
            RuleApplyType::CannotApply
        } else {
            RuleApplyType::ApplyAndSkipThisRule
        }
    }

    fn number_applicable(&self) -> usize {
        self.candidates.len()
    }

    fn apply(&mut self, schedule: &mut IrSchedule, index: usize) -> Result<(), SketchError> {
        check_apply_index(self.name(), index, self.candidates.len())?;
        let (block_name, step) = &self.candidates[index];
        unroll_block(schedule, block_name, *step)
    }

    fn analyse_apply_type(&self, state: &SearchState, block_name: &str) -> RuleApplyType {
        if Self::block_eligible(&state.schedule, block_name) {
            RuleApplyType::ApplyAndSkipThisRule
        } else {
            RuleApplyType::CannotApply
        }
    }

    fn apply_on_block(
        &self,
        state: &SearchState,
        block_name: &str,
    ) -> Result<Vec<SearchState>, SketchError> {
        self.max_steps()
            .iter()
            .map(|step| {
                let mut next = state.clone();
                unroll_block(&mut next.schedule, block_name, *step)?;
                next.predicted_cost = None;
                Ok(next)
            })
            .collect()
    }
}
