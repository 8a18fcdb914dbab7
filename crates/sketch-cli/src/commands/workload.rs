use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use sketch_core::Target;
use sketch_ir::{elementwise_chain, matmul, matmul_relu};
use sketch_search::TuneTask;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Workload {
    Matmul,
    MatmulRelu,
    Chain,
}

#[derive(Args, Debug)]
pub struct WorkloadArgs {
    /// Workload to emit.
    #[arg(long, value_enum)]
    pub kind: Workload,
    /// Problem size: `m = n = size`, `k = size / 2`; rows and columns for chains.
    #[arg(long, default_value_t = 64)]
    pub size: u64,
    /// Chain length for the `chain` workload.
    #[arg(long, default_value_t = 3)]
    pub len: usize,
    /// Tune for the GPU target instead of the host.
    #[arg(long)]
    pub gpu: bool,
    /// Destination task JSON file.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &WorkloadArgs) -> Result<(), Box<dyn Error>> {
    let task = build_task(args)?;
    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.out, task.to_json()?)?;
    println!("wrote task `{}` to {}", task.name, args.out.display());
    Ok(())
}

fn build_task(args: &WorkloadArgs) -> Result<TuneTask, Box<dyn Error>> {
    let target = if args.gpu { Target::nvgpu() } else { Target::host() };
    let size = args.size;
    let (name, module, output) = match args.kind {
        Workload::Matmul => ("matmul", matmul(size, size, size / 2), "C".to_string()),
        Workload::MatmulRelu => ("matmul_relu", matmul_relu(size, size, size / 2), "D".to_string()),
        Workload::Chain => (
            "chain",
            elementwise_chain(args.len, size, size)?,
            format!("T{}", args.len.saturating_sub(1)),
        ),
    };
    Ok(TuneTask::from_module(name, target, module, vec![output]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_output_is_last_block() {
        let args = WorkloadArgs {
            kind: Workload::Chain,
            size: 16,
            len: 4,
            gpu: true,
            out: PathBuf::from("unused.json"),
        };
        let task = build_task(&args).unwrap();
        assert_eq!(task.output_names, vec!["T3"]);
        assert!(task.target.is_gpu());
    }
}
