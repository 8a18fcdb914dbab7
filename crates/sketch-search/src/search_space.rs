use std::fmt;
use std::str::FromStr;

use log::{debug, info, trace};
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_core::{fork_random_state, sample_uniform_double, sample_uniform_int, RandomState};
use sketch_ir::IrSchedule;

use crate::auto_inline::AutoInline;
use crate::auto_unroll::AutoUnroll;
use crate::block_sampler::make_block_sampler;
use crate::config::SearchConfig;
use crate::cost_model::ExprCostModel;
use crate::determinism;
use crate::multi_level_tiling::MultiLevelTiling;
use crate::mutation::{IdentityMutation, ManualMutation};
use crate::rule::{AutoGenRule, RuleApplyType, RuleId, WeightTable};
use crate::rule_sampler::{make_rule_sampler, RuleSampler};
use crate::skip_rule::SkipRule;
use crate::state::SearchState;
use crate::task::TuneTask;

/// Pruned generator used by [`SearchSpace::get_initial_sketch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSketchStrategy {
    /// Rule-dictated pruning over blocks in reverse declaration order.
    RulePrune,
    /// Random step budgets with probability-driven pruning.
    RandomPrune,
}

impl InitialSketchStrategy {
    /// Name accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RulePrune => "rule_prune",
            Self::RandomPrune => "random_prune",
        }
    }
}

impl FromStr for InitialSketchStrategy {
    type Err = SketchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rule_prune" => Ok(Self::RulePrune),
            "random_prune" => Ok(Self::RandomPrune),
            other => Err(SketchError::Config(
                ErrorInfo::new("unknown-strategy", "unrecognised initial sketch strategy")
                    .with_context("strategy", other)
                    .with_hint("use `rule_prune` or `random_prune`"),
            )),
        }
    }
}

impl fmt::Display for InitialSketchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns the rule set of one tuning task and generates sketches from it.
///
/// Every random decision is drawn from, or seeded by forking, the single
/// random state created from the configured seed policy, so a run is
/// reproducible from its root seed.
pub struct SearchSpace {
    task: TuneTask,
    config: SearchConfig,
    rules: Vec<Box<dyn AutoGenRule>>,
    manual: Box<dyn ManualMutation>,
    rand_state: RandomState,
}

impl SearchSpace {
    /// Builds the space with the canonical rule list for `task`.
    pub fn new(task: TuneTask, config: SearchConfig) -> Result<Self, SketchError> {
        let rules = Self::default_rules(&task);
        Self::with_rules(task, config, rules)
    }

    /// Builds the space with a caller supplied rule list.
    ///
    /// The last rule plays the terminal role the skip rule has in the
    /// canonical list: pruned generation never samples it.
    pub fn with_rules(
        task: TuneTask,
        config: SearchConfig,
        rules: Vec<Box<dyn AutoGenRule>>,
    ) -> Result<Self, SketchError> {
        config.validate()?;
        task.validate()?;
        let rand_state = determinism::run_state(&config.seed_policy)?;
        debug!(
            "search space for task `{}` with {} rules, root state {rand_state}",
            task.name,
            rules.len()
        );
        Ok(Self {
            task,
            config,
            rules,
            manual: Box::new(IdentityMutation),
            rand_state,
        })
    }

    /// Replaces the manual mutation policy.
    pub fn with_manual_mutation(mut self, manual: Box<dyn ManualMutation>) -> Self {
        self.manual = manual;
        self
    }

    /// Canonical rule list: inlining, multi-level tiling, auto-unroll, skip.
    pub fn default_rules(task: &TuneTask) -> Vec<Box<dyn AutoGenRule>> {
        vec![
            Box::new(AutoInline::new(task.output_names.iter().cloned())),
            Box::new(MultiLevelTiling::new(task.target.clone())),
            Box::new(AutoUnroll::new(task.target.clone())),
            Box::new(SkipRule::new()),
        ]
    }

    /// Task the space was built for.
    pub fn task(&self) -> &TuneTask {
        &self.task
    }

    /// Generation parameters.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Current value of the space's random state.
    pub fn rand_state(&self) -> RandomState {
        self.rand_state
    }

    /// Identifiers of every owned rule, in priority order.
    pub fn rule_ids(&self) -> Vec<RuleId> {
        (0..self.rules.len()).map(RuleId::from_index).collect()
    }

    /// Diagnostic name of rule `id`.
    pub fn rule_name(&self, id: RuleId) -> Result<&str, SketchError> {
        Ok(lookup_rule(&self.rules, id)?.name())
    }

    /// Fresh state over the task's lowered loop nest carrying the full rule list.
    pub fn initial_state(&self) -> SearchState {
        SearchState::new(
            IrSchedule::new(self.task.lowered_module()),
            self.rule_ids(),
        )
    }

    /// Produces `num` independent sketches by repeated random mutation.
    ///
    /// Each sketch starts from a fresh initial state and is mutated at most
    /// `init_sketch_random_depth` times, stopping early once its candidate rule
    /// list is empty. Sketches are not deduplicated.
    pub fn get_random_initial_sketch(
        &mut self,
        num: usize,
    ) -> Result<Vec<SearchState>, SketchError> {
        info!("generating {num} random initial sketches");
        let mut result = Vec::with_capacity(num);
        for index in 0..num {
            let mut state = self.initial_state();
            for _ in 0..self.config.init_sketch_random_depth {
                if state.applicable_rules.is_empty() {
                    break;
                }
                state = self.random_schedule_mutate(&state)?;
            }
            debug!("random sketch {index}: {}", state.schedule_hash());
            result.push(state);
        }
        Ok(result)
    }

    /// Single mutation step: the manual policy first, random mutation otherwise.
    ///
    /// A manual result is returned as the policy built it. Only a random
    /// mutation is scored by `cost_model`, and only with `use_cost_model` enabled.
    pub fn get_schedule_mutate(
        &mut self,
        state: &SearchState,
        cost_model: &dyn ExprCostModel,
    ) -> Result<SearchState, SketchError> {
        if let Some(manual) = self.manual.mutate(state) {
            trace!("manual mutation policy produced the next state");
            return Ok(manual);
        }
        let mut next = self.random_schedule_mutate(state)?;
        if self.config.use_cost_model {
            let cost = cost_model.predict(next.schedule.module(), &self.task.target);
            trace!("predicted cost {cost}");
            next.predicted_cost = Some(cost);
        }
        Ok(next)
    }

    /// Weighted single-step mutation.
    ///
    /// Rules in the state's candidate list are initialised against its
    /// schedule; each applicable rule contributes its applicable count to a
    /// cumulative weight table. Rules signalling skip-this-rule leave the list,
    /// skip-all-rules clears it and ends the scan. One draw over the table
    /// picks the rule and candidate index to apply. Without any weight the
    /// schedule is returned unchanged.
    pub fn random_schedule_mutate(
        &mut self,
        state: &SearchState,
    ) -> Result<SearchState, SketchError> {
        let mut next = state.clone();
        let candidates = std::mem::take(&mut next.applicable_rules);
        let mut kept = Vec::with_capacity(candidates.len());
        let mut table = WeightTable::new();
        for id in candidates {
            let rule = lookup_rule_mut(&mut self.rules, id)?;
            let apply_type = rule.init(&next.schedule);
            trace!("rule {} init: {apply_type:?}", rule.name());
            if !apply_type.can_apply() {
                kept.push(id);
                continue;
            }
            table.push(id, rule.number_applicable());
            match apply_type {
                RuleApplyType::ApplyAndSkipThisRule => {}
                RuleApplyType::ApplyAndSkipAllRules => {
                    kept.clear();
                    break;
                }
                _ => kept.push(id),
            }
        }
        next.applicable_rules = kept;

        if table.total() == 0 {
            return Ok(next);
        }
        let draw = sample_uniform_int(0, table.total() as i64, &mut self.rand_state)?;
        let (id, offset) = table.locate(draw as usize).ok_or_else(|| {
            SketchError::Contract(
                ErrorInfo::new("weight-table-gap", "draw did not resolve to a rule")
                    .with_context("draw", draw.to_string())
                    .with_context("total", table.total().to_string()),
            )
        })?;
        let rule = lookup_rule_mut(&mut self.rules, id)?;
        trace!("draw {draw} of {} -> {} candidate {offset}", table.total(), rule.name());
        rule.apply(&mut next.schedule, offset)?;
        next.predicted_cost = None;
        Ok(next)
    }

    /// Directed generation with random step budgets and probabilistic pruning.
    ///
    /// Blocks are drawn uniformly without replacement. Each block receives a
    /// step budget in `[1, rule_count]`, capped by the depth still available
    /// out of `init_sketch_random_depth`; generation stops when the depth is
    /// spent or every block was visited. Returns the final layer.
    pub fn get_random_pruned_initial_sketch(&mut self) -> Result<Vec<SearchState>, SketchError> {
        let rules = self.pruned_rules()?;
        let initial = self.initial_state();
        let blocks = initial.schedule.block_names();
        let block_seed = fork_random_state(&mut self.rand_state);
        let mut block_sampler = make_block_sampler(&blocks, "probabilistic", block_seed)?;
        let probability = self.config.random_prune_probability;
        let mut remaining = self.config.init_sketch_random_depth;
        let mut layer = vec![initial];

        while remaining > 0 {
            let Some(block_name) = block_sampler.next_block() else {
                break;
            };
            let budget = sample_uniform_int(1, rules.len() as i64 + 1, &mut self.rand_state)?;
            let steps = (budget as usize).min(remaining);
            remaining -= steps;
            let mut next_layer = Vec::new();
            for state in &layer {
                let weights = self.rule_weights(&rules, &state.schedule)?;
                let sampler_seed = fork_random_state(&mut self.rand_state);
                let mut sampler =
                    make_rule_sampler(&rules, &weights, "probabilistic", sampler_seed)?;
                next_layer.extend(self.collect_state_transfer(
                    state,
                    &block_name,
                    sampler.as_mut(),
                    steps,
                    false,
                    probability,
                )?);
            }
            debug!(
                "random prune: block {block_name} steps {steps} layer {} -> {}",
                layer.len(),
                next_layer.len()
            );
            layer = next_layer;
        }
        Ok(layer)
    }

    /// Directed generation with rule-dictated pruning.
    ///
    /// Blocks are visited in reverse declaration order; every non-terminal rule
    /// is tried once per block and state. Returns the final layer.
    pub fn get_rule_pruned_initial_sketch(&mut self) -> Result<Vec<SearchState>, SketchError> {
        let rules = self.pruned_rules()?;
        let initial = self.initial_state();
        let mut blocks = initial.schedule.block_names();
        blocks.reverse();
        let block_seed = fork_random_state(&mut self.rand_state);
        let mut block_sampler = make_block_sampler(&blocks, "traversal", block_seed)?;
        let mut layer = vec![initial];

        while let Some(block_name) = block_sampler.next_block() {
            let mut next_layer = Vec::new();
            for state in &layer {
                let sampler_seed = fork_random_state(&mut self.rand_state);
                let mut sampler = make_rule_sampler(&rules, &[], "traversal", sampler_seed)?;
                next_layer.extend(self.collect_state_transfer(
                    state,
                    &block_name,
                    sampler.as_mut(),
                    0,
                    true,
                    0.0,
                )?);
            }
            debug!(
                "rule prune: block {block_name} layer {} -> {}",
                layer.len(),
                next_layer.len()
            );
            layer = next_layer;
        }
        Ok(layer)
    }

    /// Accumulates pruned sketches until exactly `num` are available.
    ///
    /// Each batch is consumed from its last state backwards. A batch with no
    /// states is reported as a configuration error.
    pub fn get_initial_sketch(
        &mut self,
        num: usize,
        strategy: &str,
    ) -> Result<Vec<SearchState>, SketchError> {
        let strategy: InitialSketchStrategy = strategy.parse()?;
        info!("generating {num} initial sketches with {strategy}");
        let mut result = Vec::with_capacity(num);
        while result.len() < num {
            let batch = match strategy {
                InitialSketchStrategy::RulePrune => self.get_rule_pruned_initial_sketch()?,
                InitialSketchStrategy::RandomPrune => self.get_random_pruned_initial_sketch()?,
            };
            if batch.is_empty() {
                return Err(SketchError::Config(
                    ErrorInfo::new("empty-sketch-batch", "sketch generator produced no states")
                        .with_context("strategy", strategy.as_str()),
                ));
            }
            let wanted = num - result.len();
            result.extend(batch.into_iter().rev().take(wanted));
        }
        for (index, state) in result.iter().enumerate() {
            debug!("initial sketch {index}: {}", state.schedule_hash());
        }
        Ok(result)
    }

    /// Expands `state` on `block_name` with rules pulled from `rule_sampler`.
    ///
    /// Runs at most `steps` iterations, or until the sampler is exhausted when
    /// `steps` is zero. Each iteration applies the pulled rule to every state
    /// of the layer that still has the block. A state the rule applied to is
    /// pruned when the rule signals skip-all-rules (`prune_by_rule`) or when a
    /// coin flip falls below `prune_probability`. States produced during an
    /// iteration are appended to the layer after it; the whole layer is
    /// returned.
    pub fn collect_state_transfer(
        &mut self,
        state: &SearchState,
        block_name: &str,
        rule_sampler: &mut dyn RuleSampler,
        steps: usize,
        prune_by_rule: bool,
        prune_probability: f64,
    ) -> Result<Vec<SearchState>, SketchError> {
        let mut layer = vec![state.clone()];
        let mut iteration = 0;
        while steps == 0 || iteration < steps {
            let Some(id) = rule_sampler.next_rule() else {
                break;
            };
            iteration += 1;
            let rule = lookup_rule(&self.rules, id)?;
            let mut survivors = Vec::with_capacity(layer.len());
            let mut produced = Vec::new();
            for current in layer {
                if !current.schedule.has_block(block_name) {
                    survivors.push(current);
                    continue;
                }
                let apply_type = rule.analyse_apply_type(&current, block_name);
                if !apply_type.can_apply() {
                    survivors.push(current);
                    continue;
                }
                produced.extend(rule.apply_on_block(&current, block_name)?);
                let prune = if prune_by_rule {
                    apply_type == RuleApplyType::ApplyAndSkipAllRules
                } else {
                    sample_uniform_double(0.0, 1.0, &mut self.rand_state)? < prune_probability
                };
                if !prune {
                    survivors.push(current);
                }
            }
            trace!(
                "{} on {block_name}: {} kept, {} produced",
                rule.name(),
                survivors.len(),
                produced.len()
            );
            survivors.extend(produced);
            layer = survivors;
        }
        Ok(layer)
    }

    /// Applicable count of each rule in `rules` against `schedule`; zero when
    /// the rule cannot apply.
    pub fn rule_weights(
        &mut self,
        rules: &[RuleId],
        schedule: &IrSchedule,
    ) -> Result<Vec<usize>, SketchError> {
        rules
            .iter()
            .map(|id| {
                let rule = lookup_rule_mut(&mut self.rules, *id)?;
                Ok(if rule.init(schedule).can_apply() {
                    rule.number_applicable()
                } else {
                    0
                })
            })
            .collect()
    }

    fn pruned_rules(&self) -> Result<Vec<RuleId>, SketchError> {
        if self.rules.len() <= 1 {
            return Err(SketchError::Config(
                ErrorInfo::new("empty-rule-set", "no rule left after excluding the terminal rule")
                    .with_context("rules", self.rules.len().to_string()),
            ));
        }
        Ok((0..self.rules.len() - 1).map(RuleId::from_index).collect())
    }
}

impl fmt::Debug for SearchSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("SearchSpace")
            .field("task", &self.task.name)
            .field("rules", &names)
            .field("rand_state", &self.rand_state)
            .finish()
    }
}

fn unknown_rule(id: RuleId, count: usize) -> SketchError {
    SketchError::Contract(
        ErrorInfo::new("unknown-rule", "rule id does not name an owned rule")
            .with_context("rule", id.index().to_string())
            .with_context("count", count.to_string()),
    )
}

fn lookup_rule(rules: &[Box<dyn AutoGenRule>], id: RuleId) -> Result<&dyn AutoGenRule, SketchError> {
    rules
        .get(id.index())
        .map(|rule| &**rule)
        .ok_or_else(|| unknown_rule(id, rules.len()))
}

fn lookup_rule_mut(
    rules: &mut [Box<dyn AutoGenRule>],
    id: RuleId,
) -> Result<&mut Box<dyn AutoGenRule>, SketchError> {
    let count = rules.len();
    rules
        .get_mut(id.index())
        .ok_or_else(|| unknown_rule(id, count))
}
