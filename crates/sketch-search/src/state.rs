use std::fmt;

use sketch_ir::{canonical_hash, IrSchedule};

use crate::rule::RuleId;

/// A branchable snapshot of one point in the schedule space.
///
/// Cloning copies the schedule and the candidate rule list; the rules
/// themselves stay in the owning [`crate::SearchSpace`] and are referenced by
/// [`RuleId`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Schedule reached by this branch.
    pub schedule: IrSchedule,
    /// Cost predicted by a cost model, `None` until one has run.
    pub predicted_cost: Option<f64>,
    /// Rules still considered relevant to this branch, in priority order.
    pub applicable_rules: Vec<RuleId>,
}

impl SearchState {
    /// Creates an unscored state.
    pub fn new(schedule: IrSchedule, applicable_rules: Vec<RuleId>) -> Self {
        Self {
            schedule,
            predicted_cost: None,
            applicable_rules,
        }
    }

    /// Returns true once a cost model scored this state.
    pub fn has_cost(&self) -> bool {
        self.predicted_cost.is_some()
    }

    /// Canonical hash of the schedule.
    pub fn schedule_hash(&self) -> String {
        canonical_hash(&self.schedule)
    }

    /// Human readable rendering used for logging.
    pub fn debug_string(&self) -> String {
        let cost = match self.predicted_cost {
            Some(cost) => format!("{cost}"),
            None => "not-init".to_string(),
        };
        let rules: Vec<String> = self
            .applicable_rules
            .iter()
            .map(|id| id.index().to_string())
            .collect();
        format!(
            "predicted_cost: {cost}\napplicable_rules: [{}]\nschedule:\n{}",
            rules.join(", "),
            self.schedule.debug_string()
        )
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_string())
    }
}
