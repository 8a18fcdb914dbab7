use std::collections::BTreeSet;
use std::fmt::Write as _;

use log::trace;
use sketch_core::errors::{ErrorInfo, SketchError};

use crate::ir::{Loop, LoopKind, ModuleExpr, ScheduleBlock};

/// Annotation key recording which producers were inlined into a block.
pub const INLINED_ANNOTATION: &str = "inlined";

/// Mutable schedule over a [`ModuleExpr`].
///
/// Cloning performs a deep copy, so branches derived from one schedule never
/// observe each other's transformations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IrSchedule {
    module: ModuleExpr,
}

impl IrSchedule {
    /// Wraps a module for scheduling.
    pub fn new(module: ModuleExpr) -> Self {
        Self { module }
    }

    /// Returns the scheduled module.
    pub fn module(&self) -> &ModuleExpr {
        &self.module
    }

    /// Consumes the schedule and returns the module.
    pub fn into_module(self) -> ModuleExpr {
        self.module
    }

    /// All blocks in declaration order.
    pub fn get_all_blocks(&self) -> Vec<&ScheduleBlock> {
        self.module.blocks().collect()
    }

    /// Names of all blocks in declaration order.
    pub fn block_names(&self) -> Vec<String> {
        self.module.blocks().map(|block| block.name.clone()).collect()
    }

    /// Returns true when a block with the given name is still present.
    pub fn has_block(&self, name: &str) -> bool {
        self.module.blocks().any(|block| block.name == name)
    }

    /// Looks up a block by name.
    pub fn get_block(&self, name: &str) -> Result<&ScheduleBlock, SketchError> {
        self.module
            .blocks()
            .find(|block| block.name == name)
            .ok_or_else(|| unknown_block(name))
    }

    fn get_block_mut(&mut self, name: &str) -> Result<&mut ScheduleBlock, SketchError> {
        self.module
            .blocks_mut()
            .find(|block| block.name == name)
            .ok_or_else(|| unknown_block(name))
    }

    /// Blocks reading the tensor written by `name`.
    pub fn consumers(&self, name: &str) -> Result<Vec<&ScheduleBlock>, SketchError> {
        let tensor = self.get_block(name)?.write.clone();
        Ok(self
            .module
            .blocks()
            .filter(|block| block.name != name && block.reads.iter().any(|read| *read == tensor))
            .collect())
    }

    /// Inlines the body of `name` into every consumer and removes the block.
    pub fn compute_inline(&mut self, name: &str) -> Result<(), SketchError> {
        let producer = self.get_block(name)?.clone();
        if producer.write.is_empty() {
            return Err(SketchError::Schedule(
                ErrorInfo::new("empty-tensor-name", "producer writes an unnamed tensor")
                    .with_context("block", name),
            ));
        }
        if producer.has_reduction() {
            return Err(SketchError::Schedule(
                ErrorInfo::new("inline-reduction", "cannot inline a reduction block")
                    .with_context("block", name),
            ));
        }
        for block in self.module.blocks_mut() {
            if block.name == producer.name || !block.reads.contains(&producer.write) {
                continue;
            }
            let mut reads = Vec::with_capacity(block.reads.len() + producer.reads.len());
            for read in &block.reads {
                if *read == producer.write {
                    reads.extend(producer.reads.iter().cloned());
                } else {
                    reads.push(read.clone());
                }
            }
            let mut seen = BTreeSet::new();
            reads.retain(|read| seen.insert(read.clone()));
            block.reads = reads;
            block.body = substitute_identifier(
                &block.body,
                &producer.write,
                &format!("({})", producer.body),
            );
            let entry = block
                .annotations
                .entry(INLINED_ANNOTATION.to_string())
                .or_default();
            if !entry.is_empty() {
                entry.push(',');
            }
            entry.push_str(&producer.name);
        }
        for func in &mut self.module.funcs {
            func.blocks.retain(|block| block.name != producer.name);
        }
        trace!("compute_inline removed block {name}");
        Ok(())
    }

    /// Splits loop `loop_index` of block `name` into nested loops with the given extents.
    ///
    /// The product of `factors` must equal the original extent. Returns the
    /// variable names of the new loops, outermost first.
    pub fn split(
        &mut self,
        name: &str,
        loop_index: usize,
        factors: &[u64],
    ) -> Result<Vec<String>, SketchError> {
        let block = self.get_block_mut(name)?;
        let original = block
            .loops
            .get(loop_index)
            .cloned()
            .ok_or_else(|| loop_out_of_range(name, loop_index, block.loops.len()))?;
        if factors.is_empty() || factors.contains(&0) {
            return Err(SketchError::Schedule(
                ErrorInfo::new("invalid-factors", "split factors must be non-empty and positive")
                    .with_context("block", name)
                    .with_context("factors", format!("{factors:?}")),
            ));
        }
        let product = factors
            .iter()
            .try_fold(1u64, |acc, factor| acc.checked_mul(*factor));
        if product != Some(original.extent) {
            return Err(SketchError::Schedule(
                ErrorInfo::new("factor-mismatch", "split factors must multiply to the loop extent")
                    .with_context("block", name)
                    .with_context("extent", original.extent.to_string())
                    .with_context("factors", format!("{factors:?}")),
            ));
        }
        let new_loops: Vec<Loop> = factors
            .iter()
            .enumerate()
            .map(|(level, extent)| Loop {
                var: format!("{}_{level}", original.var),
                extent: *extent,
                kind: original.kind,
                annotations: if level == 0 {
                    original.annotations.clone()
                } else {
                    Default::default()
                },
            })
            .collect();
        let vars = new_loops.iter().map(|lp| lp.var.clone()).collect();
        block.loops.splice(loop_index..=loop_index, new_loops);
        trace!("split {name} loop {loop_index} into {factors:?}");
        Ok(vars)
    }

    /// Permutes the loops of block `name`; `order[i]` is the old index of the new loop `i`.
    pub fn reorder(&mut self, name: &str, order: &[usize]) -> Result<(), SketchError> {
        let block = self.get_block_mut(name)?;
        let mut seen = vec![false; block.loops.len()];
        let valid = order.len() == block.loops.len()
            && order
                .iter()
                .all(|&idx| idx < seen.len() && !std::mem::replace(&mut seen[idx], true));
        if !valid {
            return Err(SketchError::Schedule(
                ErrorInfo::new("invalid-permutation", "reorder expects a permutation of all loops")
                    .with_context("block", name)
                    .with_context("order", format!("{order:?}")),
            ));
        }
        block.loops = order.iter().map(|&idx| block.loops[idx].clone()).collect();
        Ok(())
    }

    /// Records a block level annotation.
    pub fn annotate_block(
        &mut self,
        name: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SketchError> {
        let block = self.get_block_mut(name)?;
        block.annotations.insert(key.into(), value.into());
        Ok(())
    }

    /// Records an annotation on loop `loop_index` of block `name`.
    pub fn annotate_loop(
        &mut self,
        name: &str,
        loop_index: usize,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), SketchError> {
        let block = self.get_block_mut(name)?;
        let count = block.loops.len();
        let target = block
            .loops
            .get_mut(loop_index)
            .ok_or_else(|| loop_out_of_range(name, loop_index, count))?;
        target.annotations.insert(key.into(), value.into());
        Ok(())
    }

    /// Renders the module as indented pseudo code for logs and hashing.
    pub fn debug_string(&self) -> String {
        let mut out = String::new();
        for func in &self.module.funcs {
            let _ = writeln!(out, "func {} {{", func.name);
            for block in &func.blocks {
                render_block(block, &mut out);
            }
            out.push_str("}\n");
        }
        out
    }
}

impl From<ModuleExpr> for IrSchedule {
    fn from(module: ModuleExpr) -> Self {
        Self::new(module)
    }
}

fn render_block(block: &ScheduleBlock, out: &mut String) {
    let _ = write!(out, "  block {}", block.name);
    render_annotations(&block.annotations, out);
    out.push_str(" {\n");
    let mut depth = 2;
    for lp in &block.loops {
        let kind = match lp.kind {
            LoopKind::Spatial => "spatial",
            LoopKind::Reduce => "reduce",
        };
        let _ = write!(
            out,
            "{}for ({}, 0, {}) {kind}",
            "  ".repeat(depth),
            lp.var,
            lp.extent
        );
        render_annotations(&lp.annotations, out);
        out.push('\n');
        depth += 1;
    }
    let _ = writeln!(
        out,
        "{}{} = {}  // reads: {}",
        "  ".repeat(depth),
        block.write,
        block.body,
        block.reads.join(", ")
    );
    out.push_str("  }\n");
}

fn render_annotations(annotations: &std::collections::BTreeMap<String, String>, out: &mut String) {
    if annotations.is_empty() {
        return;
    }
    let rendered: Vec<String> = annotations
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    let _ = write!(out, " [{}]", rendered.join(", "));
}

/// Replaces whole-identifier occurrences of `ident` in `text`.
fn substitute_identifier(text: &str, ident: &str, replacement: &str) -> String {
    let is_ident_char = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut out = String::with_capacity(text.len());
    if ident.is_empty() {
        return text.to_string();
    }
    let mut rest = text;
    let mut prev: Option<char> = None;
    while let Some(pos) = rest.find(ident) {
        let before = rest[..pos].chars().last().or(prev);
        let after = rest[pos + ident.len()..].chars().next();
        out.push_str(&rest[..pos]);
        if before.map_or(false, is_ident_char) || after.map_or(false, is_ident_char) {
            out.push_str(ident);
        } else {
            out.push_str(replacement);
        }
        prev = ident.chars().last();
        rest = &rest[pos + ident.len()..];
    }
    out.push_str(rest);
    out
}

fn unknown_block(name: &str) -> SketchError {
    SketchError::Schedule(
        ErrorInfo::new("unknown-block", "no block with this name in the schedule")
            .with_context("block", name),
    )
}

fn loop_out_of_range(name: &str, loop_index: usize, count: usize) -> SketchError {
    SketchError::Schedule(
        ErrorInfo::new("loop-out-of-range", "loop index exceeds nest depth")
            .with_context("block", name)
            .with_context("loop", loop_index.to_string())
            .with_context("depth", count.to_string()),
    )
}
