use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_core::Target;
use sketch_ir::{LoweredFunc, ModuleExpr};

/// Read-only description of one tuning task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneTask {
    /// Human readable task name used in logs and manifests.
    #[serde(default)]
    pub name: String,
    /// Device the task is tuned for.
    pub target: Target,
    /// Lowered function bodies forming the initial loop nest.
    pub lowered_funcs: Vec<LoweredFunc>,
    /// Tensors produced by the task; blocks writing them are never inlined.
    pub output_names: Vec<String>,
}

impl TuneTask {
    /// Creates a task from its parts.
    pub fn new(
        name: impl Into<String>,
        target: Target,
        lowered_funcs: Vec<LoweredFunc>,
        output_names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            lowered_funcs,
            output_names,
        }
    }

    /// Creates a task from an already assembled module.
    pub fn from_module(
        name: impl Into<String>,
        target: Target,
        module: ModuleExpr,
        output_names: Vec<String>,
    ) -> Self {
        Self::new(name, target, module.funcs, output_names)
    }

    /// Assembles the lowered bodies into a fresh module.
    pub fn lowered_module(&self) -> ModuleExpr {
        ModuleExpr::new(self.lowered_funcs.clone())
    }

    /// Parses and validates a task from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SketchError> {
        let task: Self = serde_json::from_str(json)
            .map_err(|err| SketchError::Serde(ErrorInfo::new("task-parse", err.to_string())))?;
        task.validate()?;
        Ok(task)
    }

    /// Rejects blocks with an empty name, written tensor or read tensor.
    pub fn validate(&self) -> Result<(), SketchError> {
        for block in self.lowered_funcs.iter().flat_map(|func| &func.blocks) {
            let field = if block.name.is_empty() {
                Some("name")
            } else if block.write.is_empty() {
                Some("write")
            } else if block.reads.iter().any(String::is_empty) {
                Some("reads")
            } else {
                None
            };
            if let Some(field) = field {
                return Err(SketchError::Config(
                    ErrorInfo::new("empty-tensor-name", "block names and tensors must be non-empty")
                        .with_context("block", block.name.as_str())
                        .with_context("field", field),
                ));
            }
        }
        Ok(())
    }

    /// Loads a task from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SketchError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SketchError::Serde(
                ErrorInfo::new("task-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_json(&contents)
    }

    /// Serializes the task to pretty JSON.
    pub fn to_json(&self) -> Result<String, SketchError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| SketchError::Serde(ErrorInfo::new("task-serialize", err.to_string())))
    }
}
