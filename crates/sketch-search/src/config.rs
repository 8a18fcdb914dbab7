use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_core::RandomState;

/// Pruning probability used by random-pruned sketch generation.
pub const RANDOM_PRUNE_PROBABILITY: f64 = 1.0;

/// YAML-configurable parameters governing sketch generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of mutation steps for an unguided sketch, also the
    /// global step budget of random-pruned generation.
    #[serde(default = "default_random_depth")]
    pub init_sketch_random_depth: usize,
    /// Score every mutated state with the cost model.
    #[serde(default)]
    pub use_cost_model: bool,
    /// Strategy passed to initial sketch generation by front-ends.
    #[serde(default = "default_strategy")]
    pub init_sketch_strategy: String,
    /// Probability of pruning a state after a rule applied in random-pruned generation.
    #[serde(default = "default_prune_probability")]
    pub random_prune_probability: f64,
    /// Root seed and substream label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output layout used by the command line front-end.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_random_depth() -> usize {
    6
}

fn default_strategy() -> String {
    "rule_prune".to_string()
}

fn default_prune_probability() -> f64 {
    RANDOM_PRUNE_PROBABILITY
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            init_sketch_random_depth: default_random_depth(),
            use_cost_model: false,
            init_sketch_strategy: default_strategy(),
            random_prune_probability: default_prune_probability(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SketchError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|err| SketchError::Serde(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, SketchError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SketchError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, SketchError> {
        serde_yaml::to_string(self)
            .map_err(|err| SketchError::Serde(ErrorInfo::new("config-serialize", err.to_string())))
    }

    /// Rejects values no generation run can use.
    pub fn validate(&self) -> Result<(), SketchError> {
        if !(0.0..=1.0).contains(&self.random_prune_probability) {
            return Err(SketchError::Config(
                ErrorInfo::new("invalid-probability", "prune probability must lie in [0, 1]")
                    .with_context("value", self.random_prune_probability.to_string()),
            ));
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Root seed of the run; `-1` requests system entropy.
    #[serde(default = "default_master_seed")]
    pub master_seed: RandomState,
    /// Optional label mixed into the root seed to decorrelate named runs.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> RandomState {
    0x5EED
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for artefacts. Created if it does not exist.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Sketch listing filename relative to `run_directory`.
    #[serde(default = "default_sketches_filename")]
    pub sketches_file: PathBuf,
    /// Manifest filename relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
}

fn default_sketches_filename() -> PathBuf {
    PathBuf::from("sketches.json")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            sketches_file: default_sketches_filename(),
            manifest_file: default_manifest_filename(),
        }
    }
}
