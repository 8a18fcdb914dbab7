use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_core::RandomState;

use crate::config::SearchConfig;
use crate::state::SearchState;

/// Serializable summary of one generated sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchRecord {
    /// Position of the sketch in the generated batch.
    pub index: usize,
    /// Canonical hash of the sketch's schedule.
    pub hash: String,
    /// Cost predicted during generation, if a cost model ran.
    pub predicted_cost: Option<f64>,
    /// Rendered schedule.
    pub debug: String,
}

impl SketchRecord {
    /// Summarises `state` as the `index`-th sketch of a batch.
    pub fn from_state(index: usize, state: &SearchState) -> Self {
        Self {
            index,
            hash: state.schedule_hash(),
            predicted_cost: state.predicted_cost,
            debug: state.schedule.debug_string(),
        }
    }
}

/// Structured manifest describing a sketch generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchManifest {
    /// Name of the tuned task.
    pub task: String,
    /// Configuration used for the run.
    pub config: SearchConfig,
    /// Root seed of the run.
    pub master_seed: RandomState,
    /// Generation strategy (`rule_prune`, `random_prune` or `random`).
    pub strategy: String,
    /// Canonical hashes of the generated sketches, in output order.
    pub sketch_hashes: Vec<String>,
    /// Sketch listing written next to the manifest (relative to the run directory).
    pub sketches_file: Option<PathBuf>,
}

impl SketchManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SketchError> {
        write_json(path, self, "manifest")
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SketchError> {
        read_json(path, "manifest")
    }
}

/// Writes sketch records as a pretty JSON array.
pub fn write_sketches(path: &Path, records: &[SketchRecord]) -> Result<(), SketchError> {
    write_json(path, records, "sketches")
}

/// Loads sketch records written by [`write_sketches`].
pub fn load_sketches(path: &Path) -> Result<Vec<SketchRecord>, SketchError> {
    read_json(path, "sketches")
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, kind: &str) -> Result<(), SketchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            SketchError::Serde(
                ErrorInfo::new(format!("{kind}-mkdir"), err.to_string())
                    .with_context("path", parent.display().to_string()),
            )
        })?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|err| {
        SketchError::Serde(
            ErrorInfo::new(format!("{kind}-serialize"), err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    fs::write(path, json).map_err(|err| {
        SketchError::Serde(
            ErrorInfo::new(format!("{kind}-write"), err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

fn read_json<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<T, SketchError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        SketchError::Serde(
            ErrorInfo::new(format!("{kind}-read"), err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    serde_json::from_str(&contents).map_err(|err| {
        SketchError::Serde(
            ErrorInfo::new(format!("{kind}-parse"), err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}
