#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sketch_core::{SketchError, Target};
use sketch_ir::{elementwise_chain, matmul, matmul_relu, IrSchedule};
use sketch_search::{
    check_apply_index, AutoGenRule, RuleApplyType, SearchConfig, SearchState, TuneTask,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn matmul_task() -> TuneTask {
    TuneTask::from_module("matmul", Target::host(), matmul(64, 32, 16), vec!["C".into()])
}

pub fn matmul_relu_task() -> TuneTask {
    TuneTask::from_module(
        "matmul_relu",
        Target::host(),
        matmul_relu(64, 64, 32),
        vec!["D".into()],
    )
}

pub fn chain_task() -> TuneTask {
    let module = elementwise_chain(3, 32, 32).unwrap();
    TuneTask::from_module("chain", Target::host(), module, vec!["T2".into()])
}

pub fn seeded_config(seed: i64) -> SearchConfig {
    let mut config = SearchConfig::default();
    config.seed_policy.master_seed = seed;
    config
}

/// Rule with a fixed applicable count that records every applied index.
pub struct FixedRule {
    name: String,
    init_type: RuleApplyType,
    count: usize,
    block_type: RuleApplyType,
    branches: usize,
    applied: Arc<Mutex<Vec<usize>>>,
}

impl FixedRule {
    pub fn new(name: &str, init_type: RuleApplyType, count: usize) -> Self {
        Self {
            name: name.to_string(),
            init_type,
            count,
            block_type: RuleApplyType::Applicable,
            branches: 1,
            applied: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn on_block(mut self, block_type: RuleApplyType, branches: usize) -> Self {
        self.block_type = block_type;
        self.branches = branches;
        self
    }

    pub fn applied(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.applied)
    }
}

impl AutoGenRule for FixedRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, _schedule: &IrSchedule) -> RuleApplyType {
        self.init_type
    }

    fn number_applicable(&self) -> usize {
        self.count
    }

    fn apply(&mut self, _schedule: &mut IrSchedule, index: usize) -> Result<(), SketchError> {
        check_apply_index(&self.name, index, self.count)?;
        self.applied.lock().unwrap().push(index);
        Ok(())
    }

    fn analyse_apply_type(&self, _state: &SearchState, _block_name: &str) -> RuleApplyType {
        self.block_type
    }

    fn apply_on_block(
        &self,
        state: &SearchState,
        block_name: &str,
    ) -> Result<Vec<SearchState>, SketchError> {
        (0..self.branches)
            .map(|branch| {
                let mut next = state.clone();
                next.schedule
                    .annotate_block(block_name, &self.name, branch.to_string())?;
                Ok(next)
            })
            .collect()
    }
}
