use std::str::FromStr;

use log::trace;
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_core::{sample_uniform_int, LinearRandomEngine, RandomState};

use crate::rule::{RuleId, WeightTable};

/// Selection strategy shared by rule and block samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerStrategy {
    /// Every candidate exactly once, in input order.
    Traversal,
    /// Random selection; weighted with replacement for rules, uniform without
    /// replacement for blocks.
    Probabilistic,
}

impl FromStr for SamplerStrategy {
    type Err = SketchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "traversal" => Ok(Self::Traversal),
            "probabilistic" => Ok(Self::Probabilistic),
            other => Err(SketchError::Config(
                ErrorInfo::new("unknown-sampler-strategy", "unrecognised sampler strategy")
                    .with_context("strategy", other)
                    .with_hint("use `traversal` or `probabilistic`"),
            )),
        }
    }
}

/// Yields rules one at a time; `None` once the sampler is exhausted.
pub trait RuleSampler {
    /// Next rule to try, or `None` when no rule remains.
    fn next_rule(&mut self) -> Option<RuleId>;
}

/// Yields every rule once in input order.
#[derive(Debug, Clone)]
pub struct TraversalRuleSampler {
    rules: Vec<RuleId>,
    cursor: usize,
}

impl TraversalRuleSampler {
    /// Creates a sampler over `rules`.
    pub fn new(rules: Vec<RuleId>) -> Self {
        Self { rules, cursor: 0 }
    }
}

impl RuleSampler for TraversalRuleSampler {
    fn next_rule(&mut self) -> Option<RuleId> {
        let rule = self.rules.get(self.cursor).copied();
        if rule.is_some() {
            self.cursor += 1;
        }
        rule
    }
}

/// Samples rules with replacement, weighted by their applicable counts.
#[derive(Debug, Clone)]
pub struct ProbabilisticRuleSampler {
    table: WeightTable,
    rand_state: RandomState,
}

impl ProbabilisticRuleSampler {
    /// Creates a sampler where `rules[i]` has weight `weights[i]`.
    ///
    /// Rules with weight zero are never drawn. A sampler whose total weight is
    /// zero is exhausted from the start. The seed is normalized, so a zero fork
    /// behaves like seed one.
    pub fn new(
        rules: &[RuleId],
        weights: &[usize],
        rand_state: RandomState,
    ) -> Result<Self, SketchError> {
        if rules.len() != weights.len() {
            return Err(SketchError::Contract(
                ErrorInfo::new("weight-mismatch", "one weight is required per rule")
                    .with_context("rules", rules.len().to_string())
                    .with_context("weights", weights.len().to_string()),
            ));
        }
        let mut table = WeightTable::new();
        for (rule, weight) in rules.iter().zip(weights) {
            if *weight > 0 {
                table.push(*rule, *weight);
            }
        }
        Ok(Self {
            table,
            rand_state: LinearRandomEngine::normalize_state(rand_state)?,
        })
    }

    /// Cumulative table the sampler draws from.
    pub fn table(&self) -> &WeightTable {
        &self.table
    }
}

impl RuleSampler for ProbabilisticRuleSampler {
    fn next_rule(&mut self) -> Option<RuleId> {
        if self.table.total() == 0 {
            return None;
        }
        let draw = sample_uniform_int(0, self.table.total() as i64, &mut self.rand_state).ok()?;
        let (rule, offset) = self.table.locate(draw as usize)?;
        trace!("rule sampler draw {draw} -> rule {} offset {offset}", rule.index());
        Some(rule)
    }
}

/// Builds a rule sampler for `strategy`.
///
/// `weights` is only consulted by the probabilistic strategy, which also takes
/// ownership of `rand_state`.
pub fn make_rule_sampler(
    rules: &[RuleId],
    weights: &[usize],
    strategy: &str,
    rand_state: RandomState,
) -> Result<Box<dyn RuleSampler>, SketchError> {
    match strategy.parse::<SamplerStrategy>()? {
        SamplerStrategy::Traversal => Ok(Box::new(TraversalRuleSampler::new(rules.to_vec()))),
        SamplerStrategy::Probabilistic => Ok(Box::new(ProbabilisticRuleSampler::new(
            rules, weights, rand_state,
        )?)),
    }
}
