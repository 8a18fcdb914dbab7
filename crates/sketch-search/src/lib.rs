#![deny(missing_docs)]

//! Sketch generation and mutation over loop-nest schedules.
//!
//! A [`SearchSpace`] owns the rule set of one [`TuneTask`] and produces
//! candidate schedules ("sketches") either by repeated weighted random
//! mutation or by block-by-block breadth-first expansion with pruning.

/// Producer inlining rule.
pub mod auto_inline;
/// Unroll budget rule.
pub mod auto_unroll;
/// Block samplers.
pub mod block_sampler;
/// YAML configuration schema and defaults.
pub mod config;
/// Cost model seam and the reference loop cost model.
pub mod cost_model;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Sketch manifest and listing serialization helpers.
pub mod manifest;
/// Two-level spatial tiling rule.
pub mod multi_level_tiling;
/// Manual mutation policy seam.
pub mod mutation;
/// Rule contract, identifiers and the cumulative weight table.
pub mod rule;
/// Rule samplers and the sampler strategy selector.
pub mod rule_sampler;
/// Sketch generation orchestrator.
pub mod search_space;
/// Terminal no-op rule.
pub mod skip_rule;
/// Branchable search state.
pub mod state;
/// Tuning task description.
pub mod task;

pub use auto_inline::AutoInline;
pub use auto_unroll::{AutoUnroll, UNROLL_ANNOTATION};
pub use block_sampler::{
    make_block_sampler, BlockSampler, ProbabilisticBlockSampler, TraversalBlockSampler,
};
pub use config::{OutputConfig, SearchConfig, SeedPolicy, RANDOM_PRUNE_PROBABILITY};
pub use cost_model::{ExprCostModel, LoopCostModel};
pub use manifest::{load_sketches, write_sketches, SketchManifest, SketchRecord};
pub use multi_level_tiling::{MultiLevelTiling, TILING_ANNOTATION};
pub use mutation::{IdentityMutation, ManualMutation};
pub use rule::{check_apply_index, AutoGenRule, RuleApplyType, RuleId, WeightTable};
pub use rule_sampler::{
    make_rule_sampler, ProbabilisticRuleSampler, RuleSampler, SamplerStrategy,
    TraversalRuleSampler,
};
pub use search_space::{InitialSketchStrategy, SearchSpace};
pub use skip_rule::SkipRule;
pub use state::SearchState;
pub use task::TuneTask;
