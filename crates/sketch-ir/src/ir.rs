use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Iteration semantics of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopKind {
    /// Independent iterations writing distinct output elements.
    Spatial,
    /// Iterations accumulating into the same output element.
    Reduce,
}

/// One level of a loop nest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loop {
    /// Induction variable name, unique within its block.
    pub var: String,
    /// Trip count.
    pub extent: u64,
    /// Iteration semantics.
    pub kind: LoopKind,
    /// Free-form annotations (unroll pragmas, binding hints, ...).
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Loop {
    /// Creates a spatial loop.
    pub fn spatial(var: impl Into<String>, extent: u64) -> Self {
        Self {
            var: var.into(),
            extent,
            kind: LoopKind::Spatial,
            annotations: BTreeMap::new(),
        }
    }

    /// Creates a reduction loop.
    pub fn reduce(var: impl Into<String>, extent: u64) -> Self {
        Self {
            var: var.into(),
            extent,
            kind: LoopKind::Reduce,
            annotations: BTreeMap::new(),
        }
    }

    /// Returns true for reduction loops.
    pub fn is_reduce(&self) -> bool {
        self.kind == LoopKind::Reduce
    }
}

/// A named computational unit: a loop nest computing one tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleBlock {
    /// Block name, unique within a module.
    pub name: String,
    /// Loops enclosing the block body, outermost first.
    pub loops: Vec<Loop>,
    /// Tensors read by the body.
    pub reads: Vec<String>,
    /// Tensor written by the body.
    pub write: String,
    /// Body expression in textual form.
    pub body: String,
    /// Block level annotations recorded by schedule primitives.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ScheduleBlock {
    /// Creates a block without annotations.
    pub fn new(
        name: impl Into<String>,
        loops: Vec<Loop>,
        reads: Vec<String>,
        write: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            loops,
            reads,
            write: write.into(),
            body: body.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Returns true when any enclosing loop is a reduction.
    pub fn has_reduction(&self) -> bool {
        self.loops.iter().any(Loop::is_reduce)
    }

    /// Product of all loop extents.
    pub fn iteration_count(&self) -> u64 {
        self.loops
            .iter()
            .fold(1u64, |acc, lp| acc.saturating_mul(lp.extent))
    }

    /// Returns the block annotation stored under `key`.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// A lowered function body: an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoweredFunc {
    /// Function name.
    pub name: String,
    /// Blocks in declaration order.
    pub blocks: Vec<ScheduleBlock>,
}

impl LoweredFunc {
    /// Creates a function from its blocks.
    pub fn new(name: impl Into<String>, blocks: Vec<ScheduleBlock>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }
}

/// The program under transformation: one or more lowered function bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ModuleExpr {
    /// Function bodies in lowering order.
    pub funcs: Vec<LoweredFunc>,
}

impl ModuleExpr {
    /// Creates a module from lowered function bodies.
    pub fn new(funcs: Vec<LoweredFunc>) -> Self {
        Self { funcs }
    }

    /// Iterates over all blocks in declaration order.
    pub fn blocks(&self) -> impl Iterator<Item = &ScheduleBlock> {
        self.funcs.iter().flat_map(|func| func.blocks.iter())
    }

    pub(crate) fn blocks_mut(&mut self) -> impl Iterator<Item = &mut ScheduleBlock> {
        self.funcs.iter_mut().flat_map(|func| func.blocks.iter_mut())
    }
}
