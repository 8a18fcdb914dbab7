use sketch_core::errors::{ErrorInfo, SketchError};

use crate::ir::ModuleExpr;
use crate::schedule::IrSchedule;

/// Serializes the module to a compact binary representation using `bincode`.
pub fn module_to_bytes(module: &ModuleExpr) -> Result<Vec<u8>, SketchError> {
    bincode::serialize(module)
        .map_err(|err| SketchError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a module from its binary representation.
pub fn module_from_bytes(bytes: &[u8]) -> Result<ModuleExpr, SketchError> {
    bincode::deserialize(bytes)
        .map_err(|err| SketchError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))
}

/// Serializes the module to a JSON string.
pub fn module_to_json(module: &ModuleExpr) -> Result<String, SketchError> {
    serde_json::to_string_pretty(module)
        .map_err(|err| SketchError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a module from a JSON string.
pub fn module_from_json(json: &str) -> Result<ModuleExpr, SketchError> {
    serde_json::from_str(json)
        .map_err(|err| SketchError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))
}

/// Serializes the scheduled module of `schedule` to JSON.
pub fn schedule_to_json(schedule: &IrSchedule) -> Result<String, SketchError> {
    module_to_json(schedule.module())
}
