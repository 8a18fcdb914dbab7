use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use log::info;
use sketch_core::errors::{ErrorInfo, SketchError};
use sketch_search::{
    write_sketches, ExprCostModel, LoopCostModel, SearchConfig, SearchSpace, SearchState,
    SketchManifest, SketchRecord, TuneTask,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON file describing the tuning task.
    #[arg(long)]
    pub task: PathBuf,
    /// Optional YAML search configuration; defaults apply when absent.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of sketches to produce.
    #[arg(long, default_value_t = 8)]
    pub count: usize,
    /// `rule_prune`, `random_prune` or `random`; defaults to the configured strategy.
    #[arg(long)]
    pub strategy: Option<String>,
    /// Overrides the configured root seed.
    #[arg(long)]
    pub seed: Option<i64>,
    /// Output directory; defaults to the configured run directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let task = TuneTask::load(&args.task)?;
    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed_policy.master_seed = seed;
    }
    let out = args
        .out
        .clone()
        .or_else(|| config.output.run_directory.clone())
        .ok_or_else(|| {
            SketchError::Config(
                ErrorInfo::new("missing-output", "no output directory given")
                    .with_hint("pass --out or set output.run_directory"),
            )
        })?;
    let strategy = args
        .strategy
        .clone()
        .unwrap_or_else(|| config.init_sketch_strategy.clone());

    info!(
        "task `{}` on {}: {} sketches with {strategy}",
        task.name, task.target, args.count
    );
    let sketches = generate(task.clone(), config.clone(), &strategy, args.count)?;
    let records: Vec<SketchRecord> = sketches
        .iter()
        .enumerate()
        .map(|(index, state)| SketchRecord::from_state(index, state))
        .collect();

    fs::create_dir_all(&out)?;
    write_sketches(&out.join(&config.output.sketches_file), &records)?;
    fs::write(out.join("config.yaml"), config.to_yaml()?)?;
    let manifest = SketchManifest {
        task: task.name.clone(),
        master_seed: config.seed_policy.master_seed,
        strategy,
        sketch_hashes: records.iter().map(|record| record.hash.clone()).collect(),
        sketches_file: Some(config.output.sketches_file.clone()),
        config: config.clone(),
    };
    manifest.write(&out.join(&config.output.manifest_file))?;
    println!("wrote {} sketches to {}", records.len(), out.display());
    Ok(())
}

/// Runs one generation strategy; `random` selects unguided mutation.
fn generate(
    task: TuneTask,
    config: SearchConfig,
    strategy: &str,
    count: usize,
) -> Result<Vec<SearchState>, SketchError> {
    let target = task.target.clone();
    let score = config.use_cost_model;
    let mut space = SearchSpace::new(task, config)?;
    let mut sketches = if strategy == "random" {
        space.get_random_initial_sketch(count)?
    } else {
        space.get_initial_sketch(count, strategy)?
    };
    if score {
        let model = LoopCostModel::default();
        for state in &mut sketches {
            state.predicted_cost = Some(model.predict(state.schedule.module(), &target));
        }
    }
    Ok(sketches)
}
