use sketch_core::SketchError;
use sketch_ir::IrSchedule;

use crate::rule::{check_apply_index, AutoGenRule, RuleApplyType};
use crate::state::SearchState;

/// Pseudo-rule whose single candidate leaves the schedule untouched.
///
/// Kept last in the canonical rule list: during unguided mutation it gives
/// every step a chance to end without a transformation. Pruned generation
/// excludes it.
#[derive(Debug, Clone, Default)]
pub struct SkipRule;

impl SkipRule {
    /// Creates the rule.
    pub fn new() -> Self {
        Self
    }
}

impl AutoGenRule for SkipRule {
    fn name(&self) -> &str {
        "SkipRule"
    }

    fn init(&mut self, _schedule: &IrSchedule) -> RuleApplyType {
        RuleApplyType::Applicable
    }

    fn number_applicable(&self) -> usize {
        1
    }

    fn apply(&mut self, _schedule: &mut IrSchedule, index: usize) -> Result<(), SketchError> {
        check_apply_index(self.name(), index, 1)
    }

    fn analyse_apply_type(&self, _state: &SearchState, _block_name: &str) -> RuleApplyType {
        RuleApplyType::Applicable
    }

    fn apply_on_block(
        &self,
        state: &SearchState,
        _block_name: &str,
    ) -> Result<Vec<SearchState>, SketchError> {
        Ok(vec![state.clone()])
    }
}
