use sketch_core::{SketchError, Target};
use sketch_ir::{IrSchedule, LoopKind, ScheduleBlock};

use crate::rule::{check_apply_index, AutoGenRule, RuleApplyType};
use crate::state::SearchState;

/// Block annotation recording the inner tile size chosen for a block.
pub const TILING_ANNOTATION: &str = "multi_level_tiling";

const HOST_TILE_FACTORS: [u64; 3] = [4, 8, 16];
const GPU_TILE_FACTORS: [u64; 3] = [8, 16, 32];

/// Two-level spatial tiling.
///
/// Every spatial loop divisible by the chosen factor is split into an outer
/// and an inner loop, then the nest is reordered to outer spatial loops,
/// reduction loops and inner spatial loops.
#[derive(Debug, Clone)]
pub struct MultiLevelTiling {
    target: Target,
    candidates: Vec<(String, u64)>,
}

impl MultiLevelTiling {
    /// Creates the rule for `target`.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            candidates: Vec::new(),
        }
    }

    /// Inner tile sizes tried on the configured target.
    pub fn tile_factors(&self) -> &'static [u64] {
        if self.target.is_gpu() {
            &GPU_TILE_FACTORS
        } else {
            &HOST_TILE_FACTORS
        }
    }

    fn valid_factors(&self, block: &ScheduleBlock) -> Vec<u64> {
        if block.annotation(TILING_ANNOTATION).is_some() {
            return Vec::new();
        }
        self.tile_factors()
            .iter()
            .copied()
            .filter(|factor| {
                block
                    .loops
                    .iter()
                    .any(|lp| splits_evenly(lp.kind, lp.extent, *factor))
            })
            .collect()
    }

    fn block_factors(&self, schedule: &IrSchedule, block_name: &str) -> Vec<u64> {
        schedule
            .get_block(block_name)
            .map(|block| self.valid_factors(block))
            .unwrap_or_default()
    }
}

fn splits_evenly(kind: LoopKind, extent: u64, factor: u64) -> bool {
    kind == LoopKind::Spatial && extent > factor && extent % factor == 0
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Level {
    Outer,
    Reduce,
    Inner,
}

/// Tiles `block_name` with inner tile size `factor`.
fn tile_block(schedule: &mut IrSchedule, block_name: &str, factor: u64) -> Result<(), SketchError> {
    let loops = schedule.get_block(block_name)?.loops.clone();
    let mut levels = Vec::with_capacity(loops.len() * 2);
    for lp in &loops {
        if splits_evenly(lp.kind, lp.extent, factor) {
            levels.push(Level::Outer);
            levels.push(Level::Inner);
        } else if lp.kind == LoopKind::Reduce {
            levels.push(Level::Reduce);
        } else {
            levels.push(Level::Outer);
        }
    }
    // Split back to front so earlier loop indices stay valid.
    for (index, lp) in loops.iter().enumerate().rev() {
        if splits_evenly(lp.kind, lp.extent, factor) {
            schedule.split(block_name, index, &[lp.extent / factor, factor])?;
        }
    }
    let order: Vec<usize> = [Level::Outer, Level::Reduce, Level::Inner]
        .iter()
        .flat_map(|wanted| {
            levels
                .iter()
                .enumerate()
                .filter(move |(_, level)| *level == wanted)
                .map(|(index, _)| index)
        })
        .collect();
    schedule.reorder(block_name, &order)?;
    schedule.annotate_block(block_name, TILING_ANNOTATION, factor.to_string())
}

impl AutoGenRule for MultiLevelTiling {
    fn name(&self) -> &str {
        "MultiLevelTiling"
    }

    fn init(&mut self, schedule: &IrSchedule) -> RuleApplyType {
        self.candidates = schedule
            .get_all_blocks()
            .into_iter()
            .flat_map(|block| {
                self.valid_factors(block)
                    .into_iter()
                    .map(move |factor| (block.name.clone(), factor))
            })
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
        let (block_name, factor) = &self.candidates[index];
        tile_block(schedule, block_name, *factor)
    }

    fn analyse_apply_type(&self, state: &SearchState, block_name: &str) -> RuleApplyType {
        if self.block_factors(&state.schedule, block_name).is_empty() {
            RuleApplyType::CannotApply
        } else {
            RuleApplyType::ApplyAndSkipAllRules
        }
    }

    fn apply_on_block(
        &self,
        state: &SearchState,
        block_name: &str,
    ) -> Result<Vec<SearchState>, SketchError> {
        self.block_factors(&state.schedule, block_name)
            .into_iter()
            .map(|factor| {
                let mut next = state.clone();
                tile_block(&mut next.schedule, block_name, factor)?;
                next.predicted_cost = None;
                Ok(next)
            })
            .collect()
    }
}
