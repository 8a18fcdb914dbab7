use std::collections::BTreeSet;

use sketch_core::SketchError;
use sketch_ir::IrSchedule;

use crate::rule::{check_apply_index, AutoGenRule, RuleApplyType};
use crate::state::SearchState;

/// Inlines elementwise producers into their consumers.
///
/// A block is a candidate when it has no reduction loop, does not write a task
/// output and is read by at least one other block.
#[derive(Debug, Clone)]
pub struct AutoInline {
    output_names: BTreeSet<String>,
    candidates: Vec<String>,
}

impl AutoInline {
    /// Creates the rule; blocks writing any of `output_names` are never inlined.
    pub fn new<I, S>(output_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            output_names: output_names.into_iter().map(Into::into).collect(),
            candidates: Vec::new(),
        }
    }

    fn can_inline(&self, schedule: &IrSchedule, block_name: &str) -> bool {
        let Ok(block) = schedule.get_block(block_name) else {
            return false;
        };
        if block.write.is_empty()
            || block.has_reduction()
            || self.output_names.contains(&block.write)
        {
            return false;
        }
        schedule
            .consumers(block_name)
            .map(|consumers| !consumers.is_empty())
            .unwrap_or(false)
    }
}

impl AutoGenRule for AutoInline {
    fn name(&self) -> &str {
        "AutoInline"
    }

    fn init(&mut self, schedule: &IrSchedule) -> RuleApplyType {
        self.candidates = schedule
            .block_names()
            .into_iter()
            .filter(|name| self.can_inline(schedule, name))
            .collect();
        if self.candidates.is_empty() {
            RuleApplyType::CannotApply
        } else {
            RuleApplyType::Applicable
        }
    }

    fn number_applicable(&self) -> usize {
        self.candidates.len()
    }

    fn apply(&mut self, schedule: &mut IrSchedule, index: usize) -> Result<(), SketchError> {
        check_apply_index(self.name(), index, self.candidates.len())?;
        schedule.compute_inline(&self.candidates[index])
    }

    fn analyse_apply_type(&self, state: &SearchState, block_name: &str) -> RuleApplyType {
        if self.can_inline(&state.schedule, block_name) {
            RuleApplyType::ApplyAndSkipAllRules
        } else {
            RuleApplyType::CannotApply
        }
    }

    fn apply_on_block(
        &self,
        state: &SearchState,
        block_name: &str,
    ) -> Result<Vec<SearchState>, SketchError> {
        let mut next = state.clone();
        next.schedule.compute_inline(block_name)?;
        next.predicted_cost = None;
        Ok(vec![next])
    }
}
