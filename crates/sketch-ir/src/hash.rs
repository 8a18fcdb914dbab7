use sha2::{Digest, Sha256};

use crate::ir::{Loop, LoopKind, ScheduleBlock};
use crate::schedule::IrSchedule;

/// Computes the canonical structural hash for the provided schedule.
pub fn canonical_hash(schedule: &IrSchedule) -> String {
    let mut hasher = Sha256::new();
    let funcs = &schedule.module().funcs;
    hasher.update((funcs.len() as u64).to_le_bytes());
    for func in funcs {
        update_str(&func.name, &mut hasher);
        hasher.update((func.blocks.len() as u64).to_le_bytes());
        for block in &func.blocks {
            encode_block(block, &mut hasher);
        }
    }
    format!("{:x}", hasher.finalize())
}

fn encode_block(block: &ScheduleBlock, hasher: &mut Sha256) {
    update_str(&block.name, hasher);
    update_str(&block.write, hasher);
    update_str(&block.body, hasher);
    hasher.update((block.reads.len() as u64).to_le_bytes());
    for read in &block.reads {
        update_str(read, hasher);
    }
    hasher.update((block.loops.len() as u64).to_le_bytes());
    for lp in &block.loops {
        encode_loop(lp, hasher);
    }
    encode_annotations(block.annotations.iter(), hasher);
}

fn encode_loop(lp: &Loop, hasher: &mut Sha256) {
    update_str(&lp.var, hasher);
    hasher.update(lp.extent.to_le_bytes());
    match lp.kind {
        LoopKind::Spatial => hasher.update(b"spatial"),
        LoopKind::Reduce => hasher.update(b"reduce"),
    }
    encode_annotations(lp.annotations.iter(), hasher);
}

fn encode_annotations<'a>(
    annotations: impl ExactSizeIterator<Item = (&'a String, &'a String)>,
    hasher: &mut Sha256,
) {
    hasher.update((annotations.len() as u64).to_le_bytes());
    for (key, value) in annotations {
        update_str(key, hasher);
        update_str(value, hasher);
    }
}

fn update_str(value: &str, hasher: &mut Sha256) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
