use sketch_core::errors::SketchError;
use sketch_core::{sample_uniform_int, LinearRandomEngine, RandomState};

use crate::rule_sampler::SamplerStrategy;

/// Yields block names one at a time; `None` once the sampler is exhausted.
pub trait BlockSampler {
    /// Next block to expand, or `None` when every block was visited.
    fn next_block(&mut self) -> Option<String>;
}

/// Yields every block once in input order.
#[derive(Debug, Clone)]
pub struct TraversalBlockSampler {
    blocks: Vec<String>,
    cursor: usize,
}

impl TraversalBlockSampler {
    /// Creates a sampler over `blocks`.
    pub fn new(blocks: Vec<String>) -> Self {
        Self { blocks, cursor: 0 }
    }
}

impl BlockSampler for TraversalBlockSampler {
    fn next_block(&mut self) -> Option<String> {
        let block = self.blocks.get(self.cursor).cloned();
        if block.is_some() {
            self.cursor += 1;
        }
        block
    }
}

/// Draws blocks uniformly, removing each drawn block from the pool.
#[derive(Debug, Clone)]
pub struct ProbabilisticBlockSampler {
    remaining: Vec<String>,
    rand_state: RandomState,
}

impl ProbabilisticBlockSampler {
    /// Creates a sampler over `blocks` seeded with `rand_state`.
    ///
    /// The seed is normalized first, so a zero fork behaves like seed one.
    pub fn new(blocks: Vec<String>, rand_state: RandomState) -> Result<Self, SketchError> {
        Ok(Self {
            remaining: blocks,
            rand_state: LinearRandomEngine::normalize_state(rand_state)?,
        })
    }
}

impl BlockSampler for ProbabilisticBlockSampler {
    fn next_block(&mut self) -> Option<String> {
        if self.remaining.is_empty() {
            return None;
        }
        let pick = sample_uniform_int(0, self.remaining.len() as i64, &mut self.rand_state).ok()?;
        Some(self.remaining.remove(pick as usize))
    }
}

/// Builds a block sampler for `strategy`.
pub fn make_block_sampler(
    blocks: &[String],
    strategy: &str,
    rand_state: RandomState,
) -> Result<Box<dyn BlockSampler>, SketchError> {
    match strategy.parse::<SamplerStrategy>()? {
        SamplerStrategy::Traversal => Ok(Box::new(TraversalBlockSampler::new(blocks.to_vec()))),
        SamplerStrategy::Probabilistic => Ok(Box::new(ProbabilisticBlockSampler::new(
            blocks.to_vec(),
            rand_state,
        )?)),
    }
}
