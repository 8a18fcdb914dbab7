#![deny(missing_docs)]

//! Loop-nest representation and schedule primitives consumed by the sketch search rules.
//!
//! A [`ModuleExpr`] holds lowered function bodies made of named
//! [`ScheduleBlock`]s. [`IrSchedule`] owns a module and exposes the
//! transformations (inlining, splitting, reordering, annotating) together with
//! the structural queries the search engine relies on. Cloning an
//! [`IrSchedule`] is always a deep copy.

mod generators;
mod hash;
mod ir;
mod schedule;
mod serialization;

pub use generators::{elementwise_chain, gen_random_chain, matmul, matmul_relu};
pub use hash::canonical_hash;
pub use ir::{Loop, LoopKind, LoweredFunc, ModuleExpr, ScheduleBlock};
pub use schedule::{IrSchedule, INLINED_ANNOTATION};
pub use serialization::{
    module_from_bytes, module_from_json, module_to_bytes, module_to_json, schedule_to_json,
};
