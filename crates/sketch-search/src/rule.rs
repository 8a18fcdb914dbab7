use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_ir::IrSchedule;

use crate::state::SearchState;

/// Stable identifier of a rule inside the owning [`crate::SearchSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleId(usize);

impl RuleId {
    /// Creates an identifier from a position in the rule list.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position of the rule in the owning rule list.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// How a rule relates to a schedule or to one block of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleApplyType {
    /// The rule is irrelevant here.
    CannotApply,
    /// The rule may apply and stays a candidate afterwards.
    #[default]
    Applicable,
    /// The rule may apply once; drop it from the branch's candidates afterwards.
    ApplyAndSkipThisRule,
    /// The rule may apply; afterwards no further rule is considered for the branch.
    ApplyAndSkipAllRules,
}

impl RuleApplyType {
    /// Returns false only for [`RuleApplyType::CannotApply`].
    pub fn can_apply(&self) -> bool {
        !matches!(self, RuleApplyType::CannotApply)
    }
}

/// Contract shared by every scheduling rule.
///
/// The whole-schedule methods follow an init/apply protocol: [`init`] inspects
/// a schedule and caches the candidate transformations, after which
/// [`apply`] must be handed that same schedule together with a candidate
/// index in `[0, number_applicable())`. The block-scoped methods are pure with
/// respect to their input state.
///
/// [`init`]: AutoGenRule::init
/// [`apply`]: AutoGenRule::apply
pub trait AutoGenRule: Send + Sync {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    /// Binds the rule to `schedule`, caching its candidates.
    fn init(&mut self, schedule: &IrSchedule) -> RuleApplyType;

    /// Number of candidates found by the last [`AutoGenRule::init`].
    fn number_applicable(&self) -> usize;

    /// Applies candidate `index` to the schedule passed to the last init.
    fn apply(&mut self, schedule: &mut IrSchedule, index: usize) -> Result<(), SketchError>;

    /// Reports whether and how the rule applies to `block_name` in `state`.
    fn analyse_apply_type(&self, state: &SearchState, block_name: &str) -> RuleApplyType;

    /// Applies the rule to one block, returning one state per alternative.
    fn apply_on_block(
        &self,
        state: &SearchState,
        block_name: &str,
    ) -> Result<Vec<SearchState>, SketchError>;
}

/// Rejects candidate indices outside `[0, count)`.
pub fn check_apply_index(rule: &str, index: usize, count: usize) -> Result<(), SketchError> {
    if index >= count {
        return Err(SketchError::Contract(
            ErrorInfo::new("index-out-of-range", "apply index exceeds applicable count")
                .with_context("rule", rule)
                .with_context("index", index.to_string())
                .with_context("count", count.to_string()),
        ));
    }
    Ok(())
}

/// Cumulative weight table mapping running weight offsets to rules.
///
/// Entries are keyed by the cumulative weight before the rule was added, so
/// the first key is always zero and the total equals the sum of all weights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightTable {
    entries: BTreeMap<usize, RuleId>,
    total: usize,
}

impl WeightTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `rule` at the current cumulative weight and advances it by `weight`.
    ///
    /// A zero-weight entry is shadowed by whichever rule is pushed next.
    pub fn push(&mut self, rule: RuleId, weight: usize) {
        self.entries.insert(self.total, rule);
        self.total += weight;
    }

    /// Sum of all recorded weights.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns true when no rule was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded `(offset, rule)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, RuleId)> + '_ {
        self.entries.iter().map(|(offset, rule)| (*offset, *rule))
    }

    /// Resolves a draw in `[0, total)` to the owning rule and the offset within it.
    pub fn locate(&self, draw: usize) -> Option<(RuleId, usize)> {
        if draw >= self.total {
            return None;
        }
        self.entries
            .range(..=draw)
            .next_back()
            .map(|(offset, rule)| (*rule, draw - offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_steps_back_to_owning_entry() {
        let a = RuleId::from_index(0);
        let b = RuleId::from_index(1);
        let mut table = WeightTable::new();
        table.push(a, 3);
        table.push(b, 1);
        assert_eq!(table.total(), 4);
        assert_eq!(table.entries().collect::<Vec<_>>(), vec![(0, a), (3, b)]);
        assert_eq!(table.locate(0), Some((a, 0)));
        assert_eq!(table.locate(2), Some((a, 2)));
        assert_eq!(table.locate(3), Some((b, 0)));
        assert_eq!(table.locate(4), None);
    }

    #[test]
    fn zero_weight_entries_are_shadowed() {
        let mut table = WeightTable::new();
        table.push(RuleId::from_index(0), 0);
        table.push(RuleId::from_index(1), 2);
        assert_eq!(table.locate(0), Some((RuleId::from_index(1), 0)));
        assert_eq!(table.entries().count(), 1);
    }

    #[test]
    fn index_check_is_a_contract_error() {
        assert!(check_apply_index("r", 2, 3).is_ok());
        let err = check_apply_index("r", 3, 3).unwrap_err();
        assert!(err.is_contract());
        assert_eq!(err.info().context["rule"], "r");
    }
}
